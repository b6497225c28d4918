//! Ordered component chain and its per-run state.

use crate::error::{SolverError, SolverResult};
use fl_components::{ChainComponent, ComponentState};
use fl_core::CompId;
use std::collections::HashSet;

/// Components in flow-path order, from the pressurant source to the terminal element.
#[derive(Debug, Default)]
pub struct HydraulicChain {
    components: Vec<Box<dyn ChainComponent>>,
}

impl HydraulicChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component at the downstream end.
    pub fn push(&mut self, component: Box<dyn ChainComponent>) {
        self.components.push(component);
    }

    pub fn with(mut self, component: impl ChainComponent + 'static) -> Self {
        self.push(Box::new(component));
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&dyn ChainComponent> {
        self.components.get(position).map(|c| c.as_ref())
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &dyn ChainComponent> + ExactSizeIterator + '_ {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Position of the component named `name`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name() == name)
    }

    /// Reject empty chains and duplicate names.
    pub fn validate(&self) -> SolverResult<()> {
        if self.components.is_empty() {
            return Err(SolverError::InvalidInput {
                what: "chain has no components".into(),
            });
        }
        let mut seen = HashSet::new();
        for c in &self.components {
            if !seen.insert(c.name()) {
                return Err(SolverError::InvalidInput {
                    what: format!("duplicate component name '{}'", c.name()),
                });
            }
        }
        Ok(())
    }
}

/// Run state of every component of a chain, indexed by chain position.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState {
    states: Vec<ComponentState>,
}

impl ChainState {
    /// Initial state of every component.
    pub fn fresh(chain: &HydraulicChain) -> Self {
        Self {
            states: chain.iter().map(|c| c.initial_state()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, id: CompId) -> Option<&ComponentState> {
        self.states.get(id.position())
    }

    pub fn get_mut(&mut self, id: CompId) -> Option<&mut ComponentState> {
        self.states.get_mut(id.position())
    }

    /// States with their chain ids. Positions beyond the `CompId` range are
    /// not addressable and end the iteration.
    pub fn iter(&self) -> impl Iterator<Item = (CompId, &ComponentState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map_while(|(i, s)| CompId::from_position(i).ok().map(|id| (id, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_components::{BurstDisk, Conduit, Cylinder, Material};
    use fl_core::units::{m3, mm, pa};

    fn small_chain() -> HydraulicChain {
        HydraulicChain::new()
            .with(Cylinder::new("R1", pa(15e5), m3(5e-3)).unwrap())
            .with(BurstDisk::new("BD1", pa(100e5)).unwrap())
            .with(Conduit::new("C1", mm(100.0), mm(8.0), Material::smooth("Al")).unwrap())
    }

    #[test]
    fn fresh_state_follows_components() {
        let chain = small_chain();
        let state = ChainState::fresh(&chain);
        assert_eq!(state.len(), 3);
        let bd = CompId::from_position(1).unwrap();
        assert!(state.get(bd).unwrap().as_relief().is_some());
        assert_eq!(chain.position_of("C1"), Some(2));
    }

    #[test]
    fn state_ids_match_chain_positions() {
        let chain = small_chain();
        let state = ChainState::fresh(&chain);
        let ids: Vec<usize> = state.iter().map(|(id, _)| id.position()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        for (id, s) in state.iter() {
            assert_eq!(state.get(id), Some(s));
        }
    }

    #[test]
    fn validate_rejects_duplicates_and_empty() {
        assert!(HydraulicChain::new().validate().is_err());
        let dup = small_chain().with(Cylinder::new("R1", pa(1e5), m3(1e-3)).unwrap());
        assert!(dup.validate().is_err());
        assert!(small_chain().validate().is_ok());
    }
}
