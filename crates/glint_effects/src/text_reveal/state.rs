//! Per-element reveal state

use glint_core::NodeId;
use indexmap::IndexMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Unplayed,
    Played,
}

/// Reveal state of every discovered element, in discovery order
#[derive(Debug, Default)]
pub struct RevealSet {
    states: IndexMap<NodeId, RevealState>,
}

impl RevealSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element as unplayed. Registering twice keeps the
    /// existing state.
    pub fn insert(&mut self, element: NodeId) {
        self.states.entry(element).or_default();
    }

    pub fn state(&self, element: NodeId) -> Option<RevealState> {
        self.states.get(&element).copied()
    }

    /// Transition `element` to `Played`
    ///
    /// Returns true only for the call that performed the transition.
    pub fn mark_played(&mut self, element: NodeId) -> bool {
        match self.states.get_mut(&element) {
            Some(state @ RevealState::Unplayed) => {
                *state = RevealState::Played;
                true
            }
            _ => false,
        }
    }

    pub fn is_played(&self, element: NodeId) -> bool {
        self.state(element) == Some(RevealState::Played)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, RevealState)> + '_ {
        self.states.iter().map(|(id, state)| (*id, *state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::Document;

    #[test]
    fn test_played_exactly_once() {
        let mut doc = Document::new();
        let el = doc.create_element("p");
        let mut set = RevealSet::new();

        set.insert(el);
        assert_eq!(set.state(el), Some(RevealState::Unplayed));
        assert!(set.mark_played(el));
        assert!(!set.mark_played(el));
        assert!(set.is_played(el));

        set.insert(el);
        assert!(set.is_played(el));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unknown_element() {
        let mut doc = Document::new();
        let el = doc.create_element("p");
        let mut set = RevealSet::new();

        assert!(set.is_empty());
        assert_eq!(set.state(el), None);
        assert!(!set.mark_played(el));
    }
}
