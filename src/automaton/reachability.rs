use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::debug;

use crate::prelude::*;

/// Iterator over the states of a [`Dfa`] that are reachable from a given origin, in the order
/// in which a breadth-first search visits them. The origin always comes first.
#[derive(Debug, Clone)]
pub struct ReachableStates<'a> {
    dfa: &'a Dfa,
    seen: BitSet,
    queue: VecDeque<StateId>,
}

impl<'a> ReachableStates<'a> {
    fn new(dfa: &'a Dfa, origin: StateId) -> Self {
        let mut seen = BitSet::with_capacity(dfa.size());
        let mut queue = VecDeque::new();
        if origin < dfa.size() as StateId {
            seen.insert(origin as usize);
            queue.push_back(origin);
        }
        Self { dfa, seen, queue }
    }
}

impl Iterator for ReachableStates<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        let state = self.queue.pop_front()?;
        for symbol in self.dfa.symbols() {
            let target = self.dfa.delta(symbol, state);
            if self.seen.insert(target as usize) {
                self.queue.push_back(target);
            }
        }
        Some(state)
    }
}

impl Dfa {
    /// Returns an iterator over the states that are reachable from the initial state.
    pub fn reachable_states(&self) -> ReachableStates<'_> {
        ReachableStates::new(self, self.initial())
    }

    /// Returns an iterator over the states that are reachable from `origin`. The iterator is
    /// empty if `origin` is not a state.
    pub fn reachable_states_from(&self, origin: StateId) -> ReachableStates<'_> {
        ReachableStates::new(self, origin)
    }

    /// Returns the number of states that cannot be reached from the initial state.
    pub fn unreachable_count(&self) -> usize {
        self.size() - self.reachable_states().count()
    }

    /// Removes all states that are not reachable from the initial state. If every state is
    /// reachable, `self` is returned unchanged. Otherwise the remaining states are renumbered
    /// densely in the order in which a breadth-first search from the initial state first visits
    /// them, which makes the initial state `0`.
    ///
    /// # Example
    /// ```
    /// use dfamin::prelude::*;
    ///
    /// let dfa = Dfa::builder()
    ///     .with_state_colors([false, true, true])
    ///     .with_transitions([(0, 0, 1), (1, 0, 1), (2, 0, 0)])
    ///     .into_dfa(0)
    ///     .unwrap();
    /// let pruned = dfa.prune();
    /// assert_eq!(pruned.size(), 2);
    /// assert!(pruned.accepts([0]));
    /// ```
    pub fn prune(self) -> Dfa {
        let order: Vec<StateId> = self.reachable_states().collect();
        if order.len() == self.size() {
            return self;
        }
        self.restrict_to(&order)
    }

    /// Same as [`Dfa::prune`], but leaves `self` untouched and clones if there is nothing to
    /// remove.
    pub fn pruned(&self) -> Dfa {
        let order: Vec<StateId> = self.reachable_states().collect();
        if order.len() == self.size() {
            return self.clone();
        }
        self.restrict_to(&order)
    }

    /// Builds the automaton on the states in `order`, which must be closed under transitions
    /// and contain the initial state. State `order[i]` becomes state `i`.
    fn restrict_to(&self, order: &[StateId]) -> Dfa {
        debug!(
            "removing {} of {} states that are unreachable",
            self.size() - order.len(),
            self.size()
        );

        let mut renumbered = vec![EMPTY_STATE; self.size()];
        for (new, &old) in order.iter().enumerate() {
            renumbered[old as usize] = new as StateId;
        }

        let mut transitions = Vec::with_capacity(self.alphabet_size() * order.len());
        for symbol in self.symbols() {
            transitions.extend(
                order
                    .iter()
                    .map(|&old| renumbered[self.delta(symbol, old) as usize]),
            );
        }
        let accepting = order.iter().map(|&old| self.is_accepting(old)).collect();

        Dfa::from_verified_parts(
            self.alphabet_size() as u32,
            order.len() as u32,
            renumbered[self.initial() as usize],
            transitions,
            accepting,
        )
    }
}
