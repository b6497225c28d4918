use core::fmt;
use core::num::NonZeroU32;

use crate::error::{FlError, FlResult};

/// Compact, stable identifier for a position in a hydraulic chain.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    ///
    /// Saturates at `u32::MAX - 1`.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Create an Id from a 0-based `usize` position, rejecting positions that do not fit.
    pub fn from_position(position: usize) -> FlResult<Self> {
        let index = u32::try_from(position)
            .ok()
            .filter(|i| *i < u32::MAX)
            .ok_or(FlError::IndexOob {
                what: "chain position",
                index: position,
                len: u32::MAX as usize,
            })?;
        Ok(Self::from_index(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Recover the 0-based index as a `usize` for slice access.
    pub fn position(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Identifier of a component by its position in the chain.
pub type CompId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
            assert_eq!(id.position(), i as usize);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    fn from_position_rejects_overflow() {
        assert!(Id::from_position(3).is_ok());
        assert!(Id::from_position(u32::MAX as usize).is_err());
    }
}
