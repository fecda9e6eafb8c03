use std::{collections::hash_map::Entry, fmt::Display};

use bit_set::BitSet;
use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::{math::Map, prelude::*};

/// The subset construction represents sets of states as `u64` bitmasks.
pub const MAX_DETERMINIZED_SIZE: usize = u64::BITS as usize;

/// A nondeterministic finite automaton without epsilon transitions. Every state has a (possibly
/// empty) set of successors for every symbol, and there can be several initial states. A word is
/// accepted if some run on it ends in an accepting state.
///
/// Successor sets are kept sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    alphabet_size: u32,
    size: u32,
    initial: Vec<StateId>,
    successors: Vec<Vec<StateId>>,
    accepting: Vec<bool>,
}

impl Nfa {
    /// Creates an NFA from its parts, where `delta[state][symbol]` lists the successors of
    /// `state` under `symbol`. Duplicated initial states or successors are collapsed.
    ///
    /// Fails with [`Error::MalformedInput`] if there are no states or no initial state, if
    /// `delta` or `accepting` do not have one entry per state, if some entry of `delta` does
    /// not have one successor set per symbol, or if a state is out of range.
    pub fn from_parts(
        alphabet_size: u32,
        size: u32,
        initial: Vec<StateId>,
        delta: Vec<Vec<Vec<StateId>>>,
        accepting: Vec<bool>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::malformed("an automaton needs at least one state"));
        }
        if delta.len() != size as usize {
            return Err(Error::malformed(format!(
                "transition relation lists {} states but there are {size}",
                delta.len()
            )));
        }
        if accepting.len() != size as usize {
            return Err(Error::malformed(format!(
                "acceptance vector has {} entries but there are {size} states",
                accepting.len()
            )));
        }
        if initial.is_empty() {
            return Err(Error::malformed("an NFA needs at least one initial state"));
        }
        if let Some(state) = initial.iter().find(|&&state| state >= size) {
            return Err(Error::malformed(format!(
                "initial state {state} is out of range for {size} states"
            )));
        }

        let mut successors = Vec::with_capacity(size as usize * alphabet_size as usize);
        for (state, row) in delta.into_iter().enumerate() {
            if row.len() != alphabet_size as usize {
                return Err(Error::malformed(format!(
                    "state {state} has successor sets for {} symbols, expected {alphabet_size}",
                    row.len()
                )));
            }
            for (symbol, mut targets) in row.into_iter().enumerate() {
                if let Some(target) = targets.iter().find(|&&target| target >= size) {
                    return Err(Error::malformed(format!(
                        "transition of state {state} on symbol {symbol} leads to {target}, which is out of range for {size} states"
                    )));
                }
                targets.sort_unstable();
                targets.dedup();
                successors.push(targets);
            }
        }

        let mut initial = initial;
        initial.sort_unstable();
        initial.dedup();

        Ok(Self {
            alphabet_size,
            size,
            initial,
            successors,
            accepting,
        })
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Returns the number of symbols in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size as usize
    }

    /// Returns the initial states in ascending order.
    pub fn initial_states(&self) -> &[StateId] {
        &self.initial
    }

    /// Returns the successors of `state` under `symbol`, or `None` if either is out of range.
    pub fn successors(&self, state: StateId, symbol: Symbol) -> Option<&[StateId]> {
        if state < self.size && symbol < self.alphabet_size {
            Some(&self.successors[self.slot(state, symbol)])
        } else {
            None
        }
    }

    #[inline]
    fn slot(&self, state: StateId, symbol: Symbol) -> usize {
        state as usize * self.alphabet_size as usize + symbol as usize
    }

    /// Returns `true` if `state` is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.get(state as usize).copied().unwrap_or(false)
    }

    /// Returns `true` if some run on `word` ends in an accepting state. Words with symbols
    /// outside of the alphabet are rejected.
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = Symbol>,
    {
        let mut current: BitSet = self.initial.iter().map(|&q| q as usize).collect();
        for symbol in word {
            if symbol >= self.alphabet_size {
                return false;
            }
            let mut next = BitSet::with_capacity(self.size());
            for state in current.iter() {
                next.extend(
                    self.successors[self.slot(state as StateId, symbol)]
                        .iter()
                        .map(|&q| q as usize),
                );
            }
            current = next;
        }
        current.iter().any(|state| self.accepting[state])
    }

    /// Turns the NFA into an equivalent [`Dfa`] with the subset construction. Only the subsets
    /// that are reachable from the set of initial states become states, numbered in the order
    /// in which a breadth-first search discovers them, so the initial subset is state `0`. If
    /// the empty subset is reachable it becomes a rejecting sink.
    ///
    /// Fails with [`Error::UnsupportedSize`] if the NFA has more than
    /// [`MAX_DETERMINIZED_SIZE`] states.
    ///
    /// # Example
    /// ```
    /// use dfamin::prelude::*;
    ///
    /// // words over {0, 1} whose second to last symbol is 1
    /// let nfa = Nfa::from_parts(
    ///     2,
    ///     3,
    ///     vec![0],
    ///     vec![vec![vec![0], vec![0, 1]], vec![vec![2], vec![2]], vec![vec![], vec![]]],
    ///     vec![false, false, true],
    /// )
    /// .unwrap();
    /// let dfa = nfa.determinize().unwrap();
    /// assert_eq!(dfa.size(), 4);
    /// assert!(dfa.accepts([0, 1, 0]));
    /// assert!(!dfa.accepts([1, 0, 0]));
    /// ```
    pub fn determinize(&self) -> Result<Dfa> {
        if self.size() > MAX_DETERMINIZED_SIZE {
            return Err(Error::UnsupportedSize {
                states: self.size(),
                limit: MAX_DETERMINIZED_SIZE,
            });
        }

        let masks: Vec<u64> = self
            .successors
            .iter()
            .map(|targets| targets.iter().fold(0u64, |mask, &q| mask | (1 << q)))
            .collect();
        let accepting_mask = self
            .accepting
            .iter()
            .enumerate()
            .filter(|&(_, &acc)| acc)
            .fold(0u64, |mask, (q, _)| mask | (1 << q));
        let initial_mask = self.initial.iter().fold(0u64, |mask, &q| mask | (1 << q));

        let mut subsets = vec![initial_mask];
        let mut ids: Map<u64, StateId> = Map::default();
        ids.insert(initial_mask, 0);
        let mut table: Vec<Vec<StateId>> = vec![Vec::new(); self.alphabet_size()];

        let mut next = 0;
        while next < subsets.len() {
            let subset = subsets[next];
            next += 1;
            for (symbol, row) in table.iter_mut().enumerate() {
                let mut target = 0u64;
                let mut remaining = subset;
                while remaining != 0 {
                    let state = remaining.trailing_zeros() as usize;
                    remaining &= remaining - 1;
                    target |= masks[state * self.alphabet_size() + symbol];
                }
                let id = match ids.entry(target) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        let id = subsets.len() as StateId;
                        subsets.push(target);
                        *entry.insert(id)
                    }
                };
                row.push(id);
            }
        }

        debug!(
            "subset construction turned {} nfa states into {} dfa states",
            self.size(),
            subsets.len()
        );
        let accepting = subsets
            .iter()
            .map(|&subset| subset & accepting_mask != 0)
            .collect();
        Dfa::from_parts(
            self.alphabet_size,
            subsets.len() as u32,
            0,
            table,
            accepting,
        )
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "SIZE: {}  LEN_ALPHABET: {} STARTING_NODES: {}",
            self.size,
            self.alphabet_size,
            self.initial.iter().join(", ")
        )?;
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string())
                .chain((0..self.alphabet_size).map(|symbol| symbol.to_string()))
                .chain(std::iter::once("Type".to_string())),
        );
        for state in 0..self.size {
            let name = if self.initial.binary_search(&state).is_ok() {
                format!("{}", state.bold())
            } else {
                state.to_string()
            };
            let kind = if self.accepting[state as usize] {
                format!("{}", "ACC".green())
            } else {
                "REJ".to_string()
            };
            builder.push_record(
                std::iter::once(name)
                    .chain((0..self.alphabet_size).map(|symbol| {
                        let successors = &self.successors[self.slot(state, symbol)];
                        format!("{{{}}}", successors.iter().join(", "))
                    }))
                    .chain(std::iter::once(kind)),
            );
        }
        writeln!(
            f,
            "{}",
            builder.build().with(tabled::settings::Style::rounded())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::MAX_DETERMINIZED_SIZE;
    use crate::{prelude::*, tests::words_up_to};

    /// Words over {0, 1} that end in `0 1`.
    fn ends_with_01() -> Nfa {
        Nfa::from_parts(
            2,
            3,
            vec![0],
            vec![
                vec![vec![0, 1], vec![0]],
                vec![vec![], vec![2]],
                vec![vec![], vec![]],
            ],
            vec![false, false, true],
        )
        .unwrap()
    }

    #[test]
    fn rejects_malformed_parts() {
        let no_initial = Nfa::from_parts(1, 1, vec![], vec![vec![vec![0]]], vec![true]);
        assert!(matches!(no_initial, Err(Error::MalformedInput(_))));

        let bad_target = Nfa::from_parts(1, 1, vec![0], vec![vec![vec![1]]], vec![true]);
        assert!(matches!(bad_target, Err(Error::MalformedInput(_))));

        let bad_row = Nfa::from_parts(2, 1, vec![0], vec![vec![vec![0]]], vec![true]);
        assert!(matches!(bad_row, Err(Error::MalformedInput(_))));

        let bad_initial = Nfa::from_parts(1, 1, vec![3], vec![vec![vec![0]]], vec![true]);
        assert!(matches!(bad_initial, Err(Error::MalformedInput(_))));
    }

    #[test_log::test]
    fn subset_construction_preserves_language() {
        let nfa = ends_with_01();
        let dfa = nfa.determinize().unwrap();
        // {0}, {0, 1}, {0, 2}
        assert_eq!(dfa.size(), 3);
        assert_eq!(dfa.initial(), 0);
        for word in words_up_to(2, 7) {
            assert_eq!(nfa.accepts(word.iter().copied()), dfa.accepts(word));
        }
        assert!(dfa.is_minimal());
    }

    #[test]
    fn empty_subset_becomes_sink() {
        let nfa = Nfa::from_parts(
            1,
            2,
            vec![0, 0],
            vec![vec![vec![1]], vec![vec![]]],
            vec![false, true],
        )
        .unwrap();
        assert_eq!(nfa.initial_states(), &[0]);
        let dfa = nfa.determinize().unwrap();
        assert_eq!(dfa.size(), 3);
        let sink = dfa.reached_state([0, 0]).unwrap();
        assert!(!dfa.is_accepting(sink));
        assert_eq!(dfa.successor(sink, 0), Some(sink));
        assert!(dfa.accepts([0]));
    }

    #[test]
    fn several_initial_states() {
        // 0 accepts after reading 0, 1 accepts after reading 1
        let nfa = Nfa::from_parts(
            2,
            3,
            vec![1, 0],
            vec![
                vec![vec![2], vec![]],
                vec![vec![], vec![2]],
                vec![vec![], vec![]],
            ],
            vec![false, false, true],
        )
        .unwrap();
        assert!(nfa.accepts([0]));
        assert!(nfa.accepts([1]));
        assert!(!nfa.accepts([]));
        assert!(!nfa.accepts([0, 1]));
        assert!(!nfa.accepts([2]));
        let dfa = nfa.determinize().unwrap();
        assert!(dfa.accepts([1]));
        assert_eq!(dfa.minimize().size(), 3);
    }

    #[test]
    fn too_many_states_for_bitmasks() {
        let size = MAX_DETERMINIZED_SIZE as u32 + 1;
        let nfa = Nfa::from_parts(
            1,
            size,
            vec![0],
            (0..size).map(|q| vec![vec![(q + 1) % size]]).collect(),
            vec![false; size as usize],
        )
        .unwrap();
        assert!(matches!(
            nfa.determinize(),
            Err(Error::UnsupportedSize { states: 65, limit: 64 })
        ));
    }

    #[test]
    fn display_lists_successor_sets() {
        let shown = ends_with_01().to_string();
        assert!(shown.starts_with("SIZE: 3  LEN_ALPHABET: 2 STARTING_NODES: 0"));
        assert!(shown.contains("{0, 1}"));
        assert!(shown.contains("{}"));
    }
}
