//! fl-components: component library for feed-line chains.
//!
//! Every component is immutable configuration implementing
//! [`ChainComponent`]. A traversal walks the chain from its terminal end and
//! asks each component for a [`Step`]:
//! - pressure-delta elements (conduits, bends, tees, valves, filters, relief
//!   devices, injectors) return [`Step::Drop`]
//! - pressure reducers fix the inlet pressure with [`Step::Override`]
//! - tanks switch substance and mass flow with [`Step::Replace`]
//! - cylinders end the traversal with [`Step::Source`]
//!
//! Mutable run state (tank interface, burst-disk latch) lives in
//! [`ComponentState`], created fresh per traversal. Non-fatal model
//! conditions are collected in the [`EvalContext`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fl_components::{ChainComponent, ComponentState, Conduit, EvalContext, Material, Step};
//! use fl_core::units::{k, kgps, kgpm3, mm, pa, pas, s};
//! use fl_fluids::{Liquid, Node, Substance};
//!
//! let water = Arc::new(Substance::from(
//!     Liquid::new("Water", kgpm3(1000.0), pas(8.9e-4)).unwrap(),
//! ));
//! let node = Node::new(pa(1e5), kgps(0.2), water, k(293.0)).unwrap();
//!
//! let tube = Conduit::new("C1", mm(150.0), mm(16.0), Material::smooth("Aluminium")).unwrap();
//! let mut ctx = EvalContext::new(s(0.1));
//! let mut state = tube.initial_state();
//!
//! match tube.step(&node, &mut state, &mut ctx).unwrap() {
//!     Step::Drop(dp) => println!("C1 dP = {} Pa", dp.value),
//!     other => unreachable!("{other:?}"),
//! }
//! ```

pub mod common;
pub mod conduit;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod friction;
pub mod injector;
pub mod material;
pub mod reducer;
pub mod relief;
pub mod source;
pub mod state;
pub mod tank;
pub mod traits;
pub mod valve;

#[cfg(test)]
pub(crate) mod test_support;

pub use conduit::{Conduit, Elbow, Tee};
pub use diagnostics::{EvalContext, ModelWarning};
pub use error::{ComponentError, ComponentResult};
pub use filter::Filter;
pub use friction::{FlowRegime, FrictionFactor, darcy_friction_factor};
pub use injector::Injector;
pub use material::Material;
pub use reducer::{PressureCurve, PressureReducer};
pub use relief::BurstDisk;
pub use source::Cylinder;
pub use state::{ComponentState, ReliefState, TankState};
pub use tank::Tank;
pub use traits::{ChainComponent, PressureDrop, Step};
pub use valve::{Actuation, CheckValve, Valve, ValveType};
