//! End-to-end propagation and flow search over a complete feed line.

use std::sync::Arc;

use fl_components::{
    Conduit, Cylinder, Elbow, Injector, Material, PressureCurve, PressureReducer, Tank, Valve,
    ValveType,
};
use fl_core::units::{deg, jpkgk, k, kgpm3, kgps, m3, mm, pa, pas};
use fl_fluids::{Gas, Liquid, Node, Substance, SubstanceRef};
use fl_solver::{
    ChainState, FlowSolverConfig, HydraulicChain, PropagationOptions, SolverError, StepKind,
    propagate, propagate_with_state, solve_flow_rate,
};
use proptest::prelude::*;

fn water() -> SubstanceRef {
    Arc::new(Substance::from(
        Liquid::new("Water", kgpm3(1000.0), pas(8.9e-4)).unwrap(),
    ))
}

fn air() -> SubstanceRef {
    Arc::new(Substance::from(
        Gas::new("Air", jpkgk(287.0), pas(1.8e-5)).unwrap(),
    ))
}

fn aluminium() -> Material {
    Material::new("Aluminium", mm(0.0001)).unwrap()
}

fn flat_curve(input: f64, output: f64) -> PressureCurve {
    PressureCurve::new(
        pa(input),
        vec![kgps(0.0), kgps(1.0)],
        vec![pa(output), pa(output)],
    )
    .unwrap()
}

fn test_bench(reducer: PressureReducer) -> HydraulicChain {
    HydraulicChain::new()
        .with(Cylinder::new("R1", pa(15e5), m3(5e-3)).unwrap())
        .with(Conduit::new("C1", mm(91.0), mm(16.0), aluminium()).unwrap())
        .with(reducer)
        .with(Conduit::new("C2", mm(62.0), mm(5.0), aluminium()).unwrap())
        .with(
            Valve::new("SV1", ValveType::Solenoid, mm(64.0))
                .unwrap()
                .with_flow_coefficient(0.15),
        )
        .with(
            Elbow::new("B1", mm(752.0), mm(10.0), aluminium(), deg(90.0), mm(479.0)).unwrap(),
        )
        .with(
            Tank::new(
                "R2",
                pa(1e5),
                m3(5e-3),
                mm(160.0),
                mm(64.0),
                mm(64.0),
                air(),
                water(),
            )
            .unwrap(),
        )
        .with(Conduit::new("C8", mm(79.0), mm(6.0), aluminium()).unwrap())
        .with(
            Valve::new("MV4", ValveType::Ball, mm(4.0))
                .unwrap()
                .with_flow_coefficient(-1.0),
        )
        .with(Elbow::new("B2", mm(40.0), mm(4.0), aluminium(), deg(90.0), mm(25.0)).unwrap())
        .with(Conduit::new("C9", mm(150.0), mm(16.0), aluminium()).unwrap())
        .with(Injector::new("I1", 0.2269, 0.4459).unwrap())
}

fn rig_chain() -> HydraulicChain {
    test_bench(
        PressureReducer::new("PR1", vec![flat_curve(400e5, 120e5), flat_curve(1e5, 1e5)])
            .unwrap(),
    )
}

fn boundary(mdot: f64) -> Node {
    Node::new(pa(1e5), kgps(mdot), water(), k(293.0)).unwrap()
}

#[test]
fn rig_pressures_rise_toward_source() {
    let chain = rig_chain();
    let opts = PropagationOptions {
        record_trace: true,
        ..Default::default()
    };
    let out = propagate(&chain, &boundary(0.378), &opts).unwrap();

    let source = out.source.as_ref().unwrap();
    assert_eq!(source.name, "R1");
    assert_eq!(source.nominal_pressure, Some(pa(15e5)));

    let trace = out.trace.as_ref().unwrap();
    let pressures = trace.pressures();
    for w in pressures.windows(2) {
        assert!(w[1] >= w[0], "pressure fell: {:?} -> {:?}", w[0], w[1]);
    }
    assert_eq!(trace.records.len(), chain.len());
    assert_eq!(trace.records.last().unwrap().step, StepKind::Source);

    // tank hands over to the pressurant
    let tank = trace.records.iter().find(|r| r.name == "R2").unwrap();
    assert_eq!(tank.step, StepKind::Replace);
    assert!(out.node.substance().as_gas().is_some());
    assert!(out.mass_flow().value < 0.378);
}

#[test]
fn high_reynolds_tubing_warns_but_completes() {
    let out = propagate(&rig_chain(), &boundary(0.378), &Default::default()).unwrap();
    assert!(out.warnings.iter().any(|w| w.component() == "C8"));
}

#[test]
fn flow_search_meets_source_pressure() {
    let chain = rig_chain();
    let target = pa(100e5);
    let sol = solve_flow_rate(&chain, &boundary(0.378), target, &FlowSolverConfig::default())
        .unwrap();
    assert!(sol.rel_error <= 0.05);
    assert!((sol.source_pressure.value - 100e5).abs() <= 0.05 * 100e5);
    assert!(sol.mass_flow.value > 0.5 && sol.mass_flow.value < 1.0);
}

#[test]
fn reducer_without_compatible_curve_is_configuration_error() {
    // covers only up to 0.001 kg/s of pressurant
    let narrow = PressureCurve::new(
        pa(400e5),
        vec![kgps(0.0), kgps(0.001)],
        vec![pa(120e5), pa(120e5)],
    )
    .unwrap();
    let chain = test_bench(PressureReducer::new("PR1", vec![narrow]).unwrap());
    let err = propagate(&chain, &boundary(0.378), &Default::default()).unwrap_err();
    match err {
        SolverError::Configuration {
            component,
            position,
            ..
        } => {
            assert_eq!(component, "PR1");
            assert_eq!(position, 2);
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn repeated_runs_do_not_drift() {
    let chain = rig_chain();
    let a = propagate(&chain, &boundary(0.378), &Default::default()).unwrap();
    let b = propagate(&chain, &boundary(0.378), &Default::default()).unwrap();
    assert_eq!(a.pressure(), b.pressure());
    assert_eq!(a.state, b.state);
}

#[test]
fn carried_state_advances_the_tank() {
    let chain = rig_chain();
    let first = propagate(&chain, &boundary(0.378), &Default::default()).unwrap();
    let second = propagate_with_state(
        &chain,
        &boundary(0.378),
        first.state.clone(),
        &Default::default(),
    )
    .unwrap();
    assert_ne!(first.state, second.state);
    assert_ne!(first.state, ChainState::fresh(&chain));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn source_pressure_grows_with_mass_flow(lo in 0.05f64..0.9, extra in 0.01f64..0.1) {
        let chain = rig_chain();
        let a = propagate(&chain, &boundary(lo), &Default::default()).unwrap();
        let b = propagate(&chain, &boundary(lo + extra), &Default::default()).unwrap();
        prop_assert!(b.pressure() >= a.pressure());
    }
}
