//! Wall materials for tubing.

use crate::common::check_positive;
use crate::error::ComponentResult;
use fl_core::units::Length;

/// Tube wall material; only the surface roughness enters the loss model.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    roughness: Length,
}

impl Material {
    pub fn new(name: impl Into<String>, roughness: Length) -> ComponentResult<Self> {
        if roughness.value != 0.0 {
            check_positive(roughness.value, "roughness must be non-negative and finite")?;
        }
        Ok(Self {
            name: name.into(),
            roughness,
        })
    }

    /// Hydraulically smooth wall.
    pub fn smooth(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roughness: Length::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roughness(&self) -> Length {
        self.roughness
    }
}
