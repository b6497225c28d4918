// fl-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, Area as UomArea, DynamicViscosity as UomDynamicViscosity,
    Length as UomLength, MassDensity as UomMassDensity, MassRate as UomMassRate,
    Pressure as UomPressure, Ratio as UomRatio, SpecificHeatCapacity as UomSpecificHeatCapacity,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Area = UomArea;
pub type DynVisc = UomDynamicViscosity;
pub type Length = UomLength;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
/// Specific gas constant R/M, J/(kg·K).
pub type GasConstant = UomSpecificHeatCapacity;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn pas(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::pascal_second;
    DynVisc::new::<pascal_second>(v)
}

#[inline]
pub fn jpkgk(v: f64) -> GasConstant {
    use uom::si::specific_heat_capacity::joule_per_kilogram_kelvin;
    GasConstant::new::<joule_per_kilogram_kelvin>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Angle expressed in degrees.
#[inline]
pub fn to_deg(a: Angle) -> f64 {
    use uom::si::angle::degree;
    a.get::<degree>()
}

/// Pressure expressed in bar.
#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

pub mod constants {
    /// Pascals per bar.
    pub const PA_PER_BAR: f64 = 1e5;

    /// Specific gas constant of dry air, J/(kg·K).
    pub const R_AIR: f64 = 287.0;

    /// Reference density of water for specific gravity, kg/m³.
    pub const RHO_WATER: f64 = 1000.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(300.0);
        let _mdot = kgps(1.2);
        let _l = m(2.0);
        let _dt = s(0.1);
        let _r = unitless(0.5);
        let _v = m3(5e-3);
        let _rho = kgpm3(1000.0);
        let _mu = pas(8.9e-4);
        let _r_gas = jpkgk(287.0);
    }

    #[test]
    fn scaled_constructors_store_si() {
        assert!((bar(1.0).value - 1e5).abs() < 1e-9);
        assert!((mm(16.0).value - 0.016).abs() < 1e-12);
        assert!((deg(180.0).value - core::f64::consts::PI).abs() < 1e-12);
        assert!((to_deg(deg(90.0)) - 90.0).abs() < 1e-9);
        assert!((to_bar(pa(2.5e5)) - 2.5).abs() < 1e-12);
    }
}
