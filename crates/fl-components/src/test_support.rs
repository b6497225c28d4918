use std::sync::Arc;

use crate::diagnostics::EvalContext;
use crate::material::Material;
use fl_core::units::{jpkgk, k, kgpm3, kgps, m, pa, pas, s};
use fl_fluids::{Gas, Liquid, Node, Substance, SubstanceRef};

pub fn water() -> SubstanceRef {
    Arc::new(Substance::from(
        Liquid::new("Water", kgpm3(1000.0), pas(8.9e-4)).unwrap(),
    ))
}

pub fn air() -> SubstanceRef {
    Arc::new(Substance::from(
        Gas::new("Air", jpkgk(287.0), pas(1.8e-5)).unwrap(),
    ))
}

pub fn aluminium() -> Material {
    Material::new("Aluminium", m(0.1e-6)).unwrap()
}

pub fn ctx() -> EvalContext {
    EvalContext::new(s(0.1))
}

pub fn liquid_node(p: f64, mdot: f64) -> Node {
    Node::new(pa(p), kgps(mdot), water(), k(293.0)).unwrap()
}

pub fn gas_node(p: f64, mdot: f64) -> Node {
    Node::new(pa(p), kgps(mdot), air(), k(293.0)).unwrap()
}
