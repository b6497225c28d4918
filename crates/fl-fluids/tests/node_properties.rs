//! Node behaviour as seen by the chain: pressure updates and phase-dependent density.

use std::sync::Arc;

use fl_core::units::{jpkgk, k, kgpm3, kgps, pa, pas};
use fl_fluids::{FluidError, Gas, Liquid, Node, Substance, SubstanceRef};
use proptest::prelude::*;

fn nitrogen() -> SubstanceRef {
    Arc::new(Substance::from(
        Gas::new("Nitrogen", jpkgk(296.8), pas(17.5e-6)).unwrap(),
    ))
}

fn ethanol() -> SubstanceRef {
    Arc::new(Substance::from(
        Liquid::new("Ethanol", kgpm3(789.0), pas(1.2e-3)).unwrap(),
    ))
}

#[test]
fn added_pressure_keeps_substance_and_flow() {
    let node = Node::new(pa(2e5), kgps(0.3), ethanol(), k(290.0)).unwrap();
    let up = node.with_added_pressure(pa(5e4)).unwrap();
    assert_eq!(up.pressure().value, 2.5e5);
    assert_eq!(up.mass_flow().value, 0.3);
    assert_eq!(up.substance().name(), "Ethanol");
    assert_eq!(node.pressure().value, 2e5);
}

#[test]
fn pressure_cannot_drop_below_zero() {
    let node = Node::new(pa(1e5), kgps(0.1), ethanol(), k(290.0)).unwrap();
    let err = node.with_added_pressure(pa(-2e5)).unwrap_err();
    assert!(matches!(err, FluidError::NonPhysical { .. }));
}

#[test]
fn gas_node_density_tracks_pressure() {
    let low = Node::new(pa(1e6), kgps(0.01), nitrogen(), k(293.0)).unwrap();
    let high = low.with_pressure(pa(2e6)).unwrap();
    let ratio = high.density().unwrap().value / low.density().unwrap().value;
    assert!((ratio - 2.0).abs() < 1e-12);
}

#[test]
fn substance_is_shared_not_copied() {
    let gas = nitrogen();
    let node = Node::new(pa(1e6), kgps(0.01), gas.clone(), k(293.0)).unwrap();
    let next = node.with_mass_flow(kgps(0.02)).unwrap();
    assert!(Arc::ptr_eq(next.substance_ref(), &gas));
}

proptest! {
    #[test]
    fn liquid_density_is_state_independent(p in 1e3f64..1e8, t in 200.0f64..400.0) {
        let node = Node::new(pa(p), kgps(0.5), ethanol(), k(t)).unwrap();
        prop_assert_eq!(node.density().unwrap().value, 789.0);
    }
}
