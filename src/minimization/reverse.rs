use tracing::trace;

use crate::prelude::*;

/// Reverse transition index of a [`Dfa`] in compressed sparse row layout.
///
/// For every symbol `a` and state `q` it stores the predecessors `{ p | delta(p, a) = q }` as
/// one contiguous slice. Since the transition function is total, every symbol contributes
/// exactly `size` predecessor entries, so the entries of symbol `a` occupy
/// `predecessors[a * size .. (a + 1) * size]`. Within that range the slice of state `q` is
/// bracketed by `offsets[a * (size + 1) + q]` and `offsets[a * (size + 1) + q + 1]`; the
/// offsets are relative to the start of the symbol's range and thus fit in a `u32`.
///
/// Predecessor slices are sorted ascendingly.
#[derive(Debug, Clone)]
pub struct ReverseIndex {
    size: usize,
    alphabet_size: usize,
    offsets: Vec<u32>,
    predecessors: Vec<StateId>,
}

impl ReverseIndex {
    /// Builds the index for `dfa` by counting the in-degree of every state per symbol,
    /// prefix-summing the counts into offsets and then scattering the sources into their slots.
    pub fn build(dfa: &Dfa) -> Self {
        let size = dfa.size();
        let alphabet_size = dfa.alphabet_size();
        let row = size + 1;

        let mut offsets = vec![0u32; alphabet_size * row];
        let mut predecessors = vec![0 as StateId; alphabet_size * size];
        let mut cursor: Vec<u32> = Vec::with_capacity(size);

        for symbol in dfa.symbols() {
            let targets = &dfa.transition_table_flat()[symbol as usize * size..][..size];
            let offsets = &mut offsets[symbol as usize * row..][..row];

            for &target in targets {
                offsets[target as usize + 1] += 1;
            }
            for q in 0..size {
                offsets[q + 1] += offsets[q];
            }
            debug_assert_eq!(offsets[size] as usize, size);

            cursor.clear();
            cursor.extend_from_slice(&offsets[..size]);
            let slots = &mut predecessors[symbol as usize * size..][..size];
            for (source, &target) in targets.iter().enumerate() {
                let slot = &mut cursor[target as usize];
                slots[*slot as usize] = source as StateId;
                *slot += 1;
            }
        }

        trace!(
            "built reverse index with {} entries for {} states and {} symbols",
            predecessors.len(),
            size,
            alphabet_size
        );

        Self {
            size,
            alphabet_size,
            offsets,
            predecessors,
        }
    }

    #[inline]
    fn bounds(&self, symbol: Symbol, state: StateId) -> (usize, usize) {
        let position = symbol as usize * (self.size + 1) + state as usize;
        (
            self.offsets[position] as usize,
            self.offsets[position + 1] as usize,
        )
    }

    /// Returns the states that reach `state` by reading `symbol`.
    #[inline]
    pub fn predecessors(&self, symbol: Symbol, state: StateId) -> &[StateId] {
        let (start, end) = self.bounds(symbol, state);
        let base = symbol as usize * self.size;
        &self.predecessors[base + start..base + end]
    }

    /// Returns the number of states that reach `state` by reading `symbol`.
    #[inline]
    pub fn in_degree(&self, symbol: Symbol, state: StateId) -> usize {
        let (start, end) = self.bounds(symbol, state);
        end - start
    }

    /// Returns `true` if some state reaches `state` by reading `symbol`.
    #[inline]
    pub fn has_predecessors(&self, symbol: Symbol, state: StateId) -> bool {
        self.in_degree(symbol, state) > 0
    }

    /// Returns the number of states of the indexed automaton.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the alphabet size of the indexed automaton.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }
}

#[cfg(test)]
mod tests {
    use super::ReverseIndex;
    use crate::prelude::*;

    #[test]
    fn predecessor_slices() {
        // symbol 0: 0 -> 1, 1 -> 2, 2 -> 2; symbol 1: everything -> 0
        let dfa = Dfa::from_parts(
            2,
            3,
            0,
            vec![vec![1, 2, 2], vec![0, 0, 0]],
            vec![false, false, true],
        )
        .unwrap();
        let index = ReverseIndex::build(&dfa);

        assert_eq!(index.predecessors(0, 0), &[] as &[StateId]);
        assert_eq!(index.predecessors(0, 1), &[0]);
        assert_eq!(index.predecessors(0, 2), &[1, 2]);
        assert_eq!(index.predecessors(1, 0), &[0, 1, 2]);
        assert!(index.predecessors(1, 1).is_empty());
        assert!(!index.has_predecessors(1, 2));
        assert_eq!(index.in_degree(0, 2), 2);
    }

    #[test]
    fn every_symbol_has_size_many_predecessors() {
        let dfa = crate::tests::wiki_dfa();
        let index = ReverseIndex::build(&dfa);
        for symbol in dfa.symbols() {
            let total: usize = dfa
                .states()
                .map(|state| index.in_degree(symbol, state))
                .sum();
            assert_eq!(total, dfa.size());
            for state in dfa.states() {
                for &source in index.predecessors(symbol, state) {
                    assert_eq!(dfa.successor(source, symbol), Some(state));
                }
            }
        }
    }
}
