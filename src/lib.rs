//! Library for building, pruning and minimizing deterministic finite automata (DFA).
//!
//! The central type is [`Dfa`], a deterministic automaton over the alphabet `0..alphabet_size`
//! whose transition function is total: every state has exactly one successor for every symbol.
//! Transitions are stored in one flat table (symbol-major), acceptance as one flag per state.
//! A `Dfa` allocates no per-state heap objects, which keeps automata with millions of
//! states workable.
//!
//! Minimization runs as a pipeline over an immutable input:
//! 1. unreachable states are removed ([`Dfa::prune`]),
//! 2. a reverse transition index in CSR layout is built once (`minimization::reverse`),
//! 3. Hopcroft's partition refinement computes the coarsest partition that is compatible with
//!    acceptance and with all transitions, where blocks and the per-(symbol, block) predecessor
//!    sets are intrusive doubly linked lists over dense state ids,
//! 4. the stable partition is collapsed into a new automaton.
//!
//! The entry point is [`Dfa::minimize`], or [`minimization::Minimizer`] when the caller wants
//! the statistics of a run or debug tracing of the partition classes.
//!
//! Around the engine the crate provides the collaborators that feed it and consume its output:
//! - [`Nfa`] and its subset construction ([`Nfa::determinize`]),
//! - the binary file layout and the `dfa_string`/`nfa_string` grammars in [`encoding`],
//! - generators for families of automata in [`generate`],
//! - [`Dfa::is_isomorphic_to`] and [`Dfa::equivalent`] for comparing automata.
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use dfamin::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::{Dfa, DfaBuilder, Nfa, ReachableStates},
        encoding::{binary, text},
        error::{Error, Result},
        generate, math,
        minimization::{MinimizationReport, MinimizeOptions, Minimized, Minimizer},
        StateId, Symbol, EMPTY_STATE,
    };
}

/// Collection aliases and the [`math::Partition`] type that is used to report state partitions.
pub mod math;

/// The error type that is shared by all fallible operations.
pub mod error;
pub use error::{Error, Result};

/// Deterministic and nondeterministic automata together with the operations on them that are
/// not part of minimization proper (runs, pruning, comparison, subset construction).
#[allow(clippy::upper_case_acronyms)]
pub mod automaton;
pub use automaton::{Dfa, Nfa};

/// Hopcroft minimization of [`Dfa`]s.
pub mod minimization;

/// Reading and writing automata in the binary file layout and in the compact string grammars.
pub mod encoding;

/// Generators for parameterized families of automata and, with the `random` feature, for random
/// automata.
pub mod generate;

/// Index of a state. States of an automaton with `n` states are `0..n`.
pub type StateId = u32;

/// Index of an alphabet symbol. The alphabet of an automaton of alphabet size `k` is `0..k`.
pub type Symbol = u32;

/// Sentinel that stands for "no state", used as the terminator of all intrusive lists.
pub const EMPTY_STATE: StateId = u32::MAX;

#[cfg(test)]
pub(crate) mod tests {
    use crate::prelude::*;

    /// Returns all words over `0..alphabet_size` of length at most `max_length`, shortest first.
    pub fn words_up_to(alphabet_size: u32, max_length: usize) -> Vec<Vec<Symbol>> {
        let mut words = vec![vec![]];
        let mut frontier = 0;
        for _ in 0..max_length {
            let end = words.len();
            for i in frontier..end {
                for symbol in 0..alphabet_size {
                    let mut word = words[i].clone();
                    word.push(symbol);
                    words.push(word);
                }
            }
            frontier = end;
        }
        words
    }

    /// The DFA from the wikipedia article on DFA minimization, over `a = 0` and `b = 1`.
    pub fn wiki_dfa() -> Dfa {
        Dfa::builder()
            .with_state_colors([false, false, true, true, true, false])
            .with_transitions([
                (0, 0, 1),
                (0, 1, 2),
                (1, 0, 0),
                (1, 1, 3),
                (2, 0, 4),
                (2, 1, 5),
                (3, 0, 4),
                (3, 1, 5),
                (4, 0, 4),
                (4, 1, 5),
                (5, 0, 5),
                (5, 1, 5),
            ])
            .into_dfa(0)
            .unwrap()
    }

    #[test]
    fn wiki_dfa_minimizes_to_three_states() {
        let dfa = wiki_dfa();
        let min = dfa.clone().minimize();
        assert_eq!(min.size(), 3);
        assert!(min.equivalent(&dfa));
        assert!(min.accepts([1]));
        assert!(min.accepts([0, 0, 1, 0]));
        assert!(!min.accepts([1, 1]));
    }
}
