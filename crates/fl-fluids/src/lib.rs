//! fl-fluids: working-substance models for feedline.
//!
//! Provides:
//! - Incompressible liquid and ideal-gas substance models
//! - `Node`, the fluid state carried along a hydraulic chain
//!
//! Substances are immutable property bags. Gas density is never stored; it is
//! derived from local pressure and temperature through the ideal-gas law.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fl_core::units::{jpkgk, k, kgps, pa, pas};
//! use fl_fluids::{Gas, Node, Substance};
//!
//! let nitrogen = Arc::new(Substance::Gas(Gas::new("Nitrogen", jpkgk(296.8), pas(17.5e-6)).unwrap()));
//! let node = Node::new(pa(30e5), kgps(0.02), nitrogen, k(293.0)).unwrap();
//! let rho = node.density().unwrap();
//! assert!(rho.value > 30.0 && rho.value < 40.0);
//! ```

pub mod error;
pub mod state;
pub mod substance;

// Re-exports for ergonomics
pub use error::{FluidError, FluidResult};
pub use state::Node;
pub use substance::{Gas, Liquid, Substance, SubstanceRef};
