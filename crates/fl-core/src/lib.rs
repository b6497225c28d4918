//! fl-core: stable foundation for feedline.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for chain positions)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FlError, FlResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
