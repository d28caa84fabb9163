//! Transition tables of tabular environments.

/// One possible outcome of taking an action in a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Probability of this outcome.
    pub probability: f64,

    /// State reached.
    pub next_state: usize,

    /// Reward received.
    pub reward: f64,

    /// Whether the episode ends in `next_state`.
    pub done: bool,
}

impl Transition {
    /// Constructs a [`Transition`].
    pub fn new(probability: f64, next_state: usize, reward: f64, done: bool) -> Self {
        Self {
            probability,
            next_state,
            reward,
            done,
        }
    }
}

/// Exhaustive `(state, action) -> outcomes` mapping of a discrete MDP.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    n_states: usize,
    n_actions: usize,

    /// Indexed by `state * n_actions + action`.
    entries: Vec<Vec<Transition>>,
}

impl TransitionTable {
    /// A table where every `(state, action)` pair has no outcome yet.
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            entries: vec![vec![]; n_states * n_actions],
        }
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Appends an outcome to the entry of `(state, action)`.
    ///
    /// Panics if `state` or `action` is out of range.
    pub fn push(&mut self, state: usize, action: usize, transition: Transition) {
        assert!(state < self.n_states && action < self.n_actions);
        self.entries[state * self.n_actions + action].push(transition);
    }

    /// Sets the outcomes of `(state, action)`, replacing the previous ones.
    pub fn with_entry(mut self, state: usize, action: usize, transitions: Vec<Transition>) -> Self {
        assert!(state < self.n_states && action < self.n_actions);
        self.entries[state * self.n_actions + action] = transitions;
        self
    }

    /// Outcomes of taking `action` in `state`, `None` if the pair is out of range.
    pub fn get(&self, state: usize, action: usize) -> Option<&[Transition]> {
        if state >= self.n_states || action >= self.n_actions {
            return None;
        }
        Some(&self.entries[state * self.n_actions + action])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get() {
        let table = TransitionTable::new(8, 2).with_entry(
            2,
            1,
            vec![
                Transition::new(0.5, 5, -1.0, false),
                Transition::new(0.5, 6, 10.0, true),
            ],
        );
        let outcomes = table.get(2, 1).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].next_state, 6);
        assert!(table.get(2, 0).unwrap().is_empty());
        assert!(table.get(8, 0).is_none());
        assert!(table.get(0, 2).is_none());
    }
}
