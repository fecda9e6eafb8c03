use std::collections::{hash_map::Entry, VecDeque};

use crate::{
    math::{Bijection, Map},
    prelude::*,
};

impl Dfa {
    /// Checks whether `self` and `other` are the same automaton up to renaming of states. A
    /// simultaneous breadth-first search from both initial states extends a bijection between
    /// the states pair by pair and fails as soon as the bijection would stop being one, or as
    /// soon as two related states disagree on acceptance. Automata with different sizes or
    /// alphabets are never isomorphic, and neither are automata with unreachable states that
    /// the search cannot relate.
    ///
    /// For minimal automata this coincides with language equivalence, which makes it the test
    /// oracle for minimization.
    pub fn is_isomorphic_to(&self, other: &Dfa) -> bool {
        if self.alphabet_size() != other.alphabet_size() || self.size() != other.size() {
            return false;
        }

        let mut bijection: Bijection<StateId, StateId> = Bijection::new();
        let mut queue = VecDeque::new();
        bijection.insert(self.initial(), other.initial());
        queue.push_back((self.initial(), other.initial()));

        while let Some((left, right)) = queue.pop_front() {
            if self.is_accepting(left) != other.is_accepting(right) {
                return false;
            }
            for symbol in self.symbols() {
                let left_target = self.delta(symbol, left);
                let right_target = other.delta(symbol, right);
                match (
                    bijection.get_by_left(&left_target),
                    bijection.get_by_right(&right_target),
                ) {
                    (None, None) => {
                        bijection.insert(left_target, right_target);
                        queue.push_back((left_target, right_target));
                    }
                    (Some(&mapped), _) if mapped == right_target => {}
                    _ => return false,
                }
            }
        }

        bijection.len() == self.size()
    }

    /// Decides whether `self` and `other` accept the same language, by a breadth-first search
    /// over pairs of states. Unlike [`Dfa::is_isomorphic_to`] this works for automata that are
    /// not minimal. Automata over alphabets of different size are never equivalent.
    pub fn equivalent(&self, other: &Dfa) -> bool {
        self.alphabet_size() == other.alphabet_size() && self.separate(other).is_none()
    }

    /// Returns a shortest word over the symbols that both alphabets share on which `self` and
    /// `other` disagree, or `None` if there is no such word.
    ///
    /// # Example
    /// ```
    /// use dfamin::prelude::*;
    ///
    /// let three = generate::bamboo(3, 1).unwrap();
    /// let four = generate::bamboo(4, 1).unwrap();
    /// assert_eq!(three.separate(&four), Some(vec![0, 0]));
    /// assert_eq!(four.separate(&four.clone().minimize()), None);
    /// ```
    pub fn separate(&self, other: &Dfa) -> Option<Vec<Symbol>> {
        shortest_separating_word(self, self.initial(), other, other.initial())
    }

    /// Returns a shortest word that leads to an accepting state from exactly one of `p` and
    /// `q`, or `None` if the two states are language equivalent.
    ///
    /// # Panics
    /// If `p` or `q` is not a state.
    pub fn separate_states(&self, p: StateId, q: StateId) -> Option<Vec<Symbol>> {
        assert!(
            p < self.size() as StateId && q < self.size() as StateId,
            "states {p} and {q} do not both exist"
        );
        shortest_separating_word(self, p, self, q)
    }
}

fn shortest_separating_word(
    left: &Dfa,
    left_origin: StateId,
    right: &Dfa,
    right_origin: StateId,
) -> Option<Vec<Symbol>> {
    let shared = left.alphabet_size().min(right.alphabet_size()) as Symbol;
    let origin = (left_origin, right_origin);

    // pair -> (predecessor pair, symbol) on a shortest path from the origin
    let mut parent: Map<(StateId, StateId), Option<((StateId, StateId), Symbol)>> =
        Map::default();
    let mut queue = VecDeque::new();
    parent.insert(origin, None);
    queue.push_back(origin);

    while let Some(pair @ (l, r)) = queue.pop_front() {
        if left.is_accepting(l) != right.is_accepting(r) {
            let mut word = Vec::new();
            let mut current = pair;
            while let Some(&Some((previous, symbol))) = parent.get(&current) {
                word.push(symbol);
                current = previous;
            }
            word.reverse();
            return Some(word);
        }
        for symbol in 0..shared {
            let next = (left.delta(symbol, l), right.delta(symbol, r));
            if let Entry::Vacant(entry) = parent.entry(next) {
                entry.insert(Some((pair, symbol)));
                queue.push_back(next);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn isomorphism_is_up_to_renaming() {
        let dfa = Dfa::from_parts(
            2,
            3,
            0,
            vec![vec![1, 2, 2], vec![0, 0, 2]],
            vec![false, false, true],
        )
        .unwrap();
        // swap states 1 and 2
        let renamed = Dfa::from_parts(
            2,
            3,
            0,
            vec![vec![2, 1, 1], vec![0, 1, 0]],
            vec![false, true, false],
        )
        .unwrap();
        assert!(dfa.is_isomorphic_to(&renamed));
        assert!(renamed.is_isomorphic_to(&dfa));
        assert!(dfa.equivalent(&renamed));

        let flipped = Dfa::from_parts(
            2,
            3,
            0,
            vec![vec![1, 2, 2], vec![0, 0, 2]],
            vec![false, true, false],
        )
        .unwrap();
        assert!(!dfa.is_isomorphic_to(&flipped));
        assert_eq!(dfa.separate(&flipped), Some(vec![0]));
    }

    #[test]
    fn isomorphism_needs_every_state_related() {
        // state 2 is unreachable in both, so the search cannot relate it
        let left = Dfa::from_parts(1, 3, 0, vec![vec![1, 0, 2]], vec![false, true, true]).unwrap();
        assert!(!left.is_isomorphic_to(&left.clone()));
        assert!(left.equivalent(&left.pruned()));
        assert!(!left.is_isomorphic_to(&left.pruned()));
    }

    #[test]
    fn equivalence_of_non_minimal_automata() {
        let dfa = crate::tests::wiki_dfa();
        let min = dfa.minimized();
        assert!(!dfa.is_isomorphic_to(&min));
        assert!(dfa.equivalent(&min));
        assert_eq!(dfa.separate(&min), None);

        assert_eq!(dfa.separate_states(0, 1), None);
        assert_eq!(dfa.separate_states(0, 2), Some(vec![]));
        assert_eq!(dfa.separate_states(0, 5), Some(vec![1]));
    }

    #[test]
    fn different_alphabets_are_never_equivalent() {
        let unary = Dfa::from_parts(1, 1, 0, vec![vec![0]], vec![true]).unwrap();
        let binary = Dfa::from_parts(2, 1, 0, vec![vec![0], vec![0]], vec![true]).unwrap();
        assert_eq!(unary.separate(&binary), None);
        assert!(!unary.equivalent(&binary));
        assert!(!unary.is_isomorphic_to(&binary));
    }
}
