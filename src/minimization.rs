use std::fmt::Display;

use tracing::{debug, trace};

use crate::prelude::*;

/// Reverse transition index in compressed sparse row layout.
pub mod reverse;
pub use reverse::ReverseIndex;

pub(crate) mod partition_refinement;
use partition_refinement::PartitionRefiner;

mod lists;
mod quotient;

/// Runtime options of a [`Minimizer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimizeOptions {
    /// Emit the stable partition classes and the `B_cap` lists at trace level once refinement
    /// is done. Has no influence on the result.
    pub trace_classes: bool,
}

/// Statistics of one minimization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimizationReport {
    /// Number of states of the input.
    pub original_size: usize,
    /// Number of states that are reachable from the initial state.
    pub reachable_size: usize,
    /// Number of states of the minimal automaton.
    pub minimal_size: usize,
    /// Number of splitters that were processed.
    pub iterations: usize,
    /// Number of block splits.
    pub splits: usize,
}

impl Display for MinimizationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} states, {} reachable, {} after minimization ({} splitters, {} splits)",
            self.original_size,
            self.reachable_size,
            self.minimal_size,
            self.iterations,
            self.splits
        )
    }
}

/// The outcome of [`Minimizer::run`].
#[derive(Debug, Clone)]
pub struct Minimized {
    /// The minimal automaton.
    pub dfa: Dfa,
    /// Statistics of the run.
    pub report: MinimizationReport,
}

/// Runs the minimization pipeline on a borrowed [`Dfa`]: unreachable states are pruned, the
/// reverse index is built, the partition is refined to a fixed point and collapsed into the
/// minimal automaton.
///
/// # Example
/// ```
/// use dfamin::prelude::*;
///
/// // words of odd length over a unary alphabet, with twice as many states as needed
/// let dfa = Dfa::from_parts(1, 4, 0, vec![vec![1, 2, 3, 2]], vec![false, true, false, true])
///     .unwrap();
/// let Minimized { dfa: minimal, report } = Minimizer::new(&dfa).run();
/// assert_eq!(report.original_size, 4);
/// assert_eq!(minimal.size(), 2);
/// assert!(minimal.equivalent(&dfa));
/// ```
#[derive(Debug, Clone)]
pub struct Minimizer<'a> {
    dfa: &'a Dfa,
    options: MinimizeOptions,
}

impl<'a> Minimizer<'a> {
    /// Creates a minimizer with default options.
    pub fn new(dfa: &'a Dfa) -> Self {
        Self::with_options(dfa, MinimizeOptions::default())
    }

    /// Creates a minimizer with the given options.
    pub fn with_options(dfa: &'a Dfa, options: MinimizeOptions) -> Self {
        Self { dfa, options }
    }

    /// Computes the minimal automaton together with the statistics of the run.
    pub fn run(&self) -> Minimized {
        minimize_pruned(self.dfa.size(), self.dfa.pruned(), self.options)
    }
}

/// Minimizes an automaton that has no unreachable states. Automata with fewer than two states
/// and automata whose partition refines to singletons are returned unchanged.
fn minimize_pruned(original_size: usize, dfa: Dfa, options: MinimizeOptions) -> Minimized {
    let mut report = MinimizationReport {
        original_size,
        reachable_size: dfa.size(),
        minimal_size: dfa.size(),
        ..Default::default()
    };
    if dfa.size() < 2 {
        trace!("automaton with {} states is minimal", dfa.size());
        debug!("minimization: {report}");
        return Minimized { dfa, report };
    }

    let reverse = ReverseIndex::build(&dfa);
    let mut refiner = PartitionRefiner::seed(&dfa, &reverse);
    refiner.refine();
    if options.trace_classes {
        trace!("stable partition: {}", refiner.classes());
        refiner.trace_classes();
    }

    report.iterations = refiner.iterations();
    report.splits = refiner.splits();
    report.minimal_size = refiner.block_count();

    let minimal = if refiner.block_count() == dfa.size() {
        drop(refiner);
        dfa
    } else {
        quotient::rebuild(&dfa, &refiner)
    };
    debug!("minimization: {report}");
    Minimized {
        dfa: minimal,
        report,
    }
}

impl Dfa {
    /// Returns the minimal automaton that accepts the same language, computed with Hopcroft's
    /// partition refinement after removing unreachable states. The result is unique up to
    /// renaming of states.
    ///
    /// # Example
    /// ```
    /// use dfamin::prelude::*;
    ///
    /// // both states accept, so one state suffices
    /// let dfa = Dfa::from_parts(1, 2, 0, vec![vec![1, 0]], vec![true, true]).unwrap();
    /// assert_eq!(dfa.minimize().size(), 1);
    /// ```
    pub fn minimize(self) -> Dfa {
        let original_size = self.size();
        minimize_pruned(original_size, self.prune(), MinimizeOptions::default()).dfa
    }

    /// Same as [`Dfa::minimize`] but leaves `self` untouched.
    pub fn minimized(&self) -> Dfa {
        Minimizer::new(self).run().dfa
    }

    /// Returns `true` if no automaton with fewer states accepts the same language, that is if
    /// every state is reachable and no two states are language equivalent.
    pub fn is_minimal(&self) -> bool {
        Minimizer::new(self).run().report.minimal_size == self.size()
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test_log::test]
    fn unary_chain_is_already_minimal() {
        let chain = Dfa::from_parts(1, 3, 0, vec![vec![1, 2, 2]], vec![false, false, true])
            .unwrap();
        let min = chain.clone().minimize();
        assert_eq!(min.size(), 3);
        assert!(min.accepts([0, 0]));
        assert!(min.accepts([0, 0, 0]));
        assert!(!min.accepts([0]));
        assert!(chain.is_minimal());
    }

    #[test_log::test]
    fn unary_chain_with_accepting_tail_collapses() {
        let chain =
            Dfa::from_parts(1, 3, 0, vec![vec![1, 2, 2]], vec![false, true, true]).unwrap();
        let min = chain.minimize();
        assert_eq!(min.size(), 2);
        let accepting = min.reached_state([0, 0]).unwrap();
        assert!(min.is_accepting(accepting));
        assert_eq!(min.reached_state([0, 0, 0]), Some(accepting));
        assert_eq!(min.successor(accepting, 0), Some(accepting));
        assert!(!min.is_accepting(min.initial()));
    }

    #[test]
    fn bamboo_and_circle_do_not_collapse() {
        let bamboo = generate::bamboo(5, 1).unwrap();
        assert_eq!(bamboo.minimize().size(), 5);

        let circle = generate::circle(4, 1).unwrap();
        assert_eq!(circle.accepting_states().count(), 1);
        let min = circle.clone().minimize();
        assert_eq!(min.size(), 4);
        assert!(min.is_isomorphic_to(&circle));
    }

    #[test_log::test]
    fn contains_ab_from_two_encodings() {
        let compact = text::parse_dfa_string("001_101222").unwrap();
        let redundant = Dfa::builder()
            .with_state_colors([false, false, true, false, false, true])
            .with_transitions([
                (0, 0, 1),
                (0, 1, 3),
                (1, 0, 4),
                (1, 1, 2),
                (2, 0, 2),
                (2, 1, 5),
                (3, 0, 1),
                (3, 1, 0),
                (4, 0, 4),
                (4, 1, 2),
                (5, 0, 5),
                (5, 1, 2),
            ])
            .into_dfa(0)
            .unwrap();
        assert!(!redundant.is_isomorphic_to(&compact));

        let left = compact.minimize();
        let right = redundant.minimize();
        assert_eq!(left.size(), 3);
        assert_eq!(right.size(), 3);
        assert!(left.is_isomorphic_to(&right));
        assert!(right.accepts([1, 1, 0, 0, 1, 0]));
        assert!(!right.accepts([1, 1, 0, 0]));
    }

    #[test_log::test]
    fn unreachable_state_is_pruned_before_minimization() {
        let dfa = Dfa::from_parts(
            1,
            4,
            0,
            vec![vec![1, 2, 2, 0]],
            vec![false, true, true, false],
        )
        .unwrap();
        assert_eq!(dfa.unreachable_count(), 1);
        let pruned = dfa.pruned();
        assert_eq!(pruned.size(), 3);

        let Minimized { dfa: min, report } = Minimizer::new(&dfa).run();
        assert_eq!(report.original_size, 4);
        assert_eq!(report.reachable_size, 3);
        assert_eq!(report.minimal_size, 2);
        let reference =
            Dfa::from_parts(1, 3, 0, vec![vec![1, 2, 2]], vec![false, true, true]).unwrap();
        assert!(min.is_isomorphic_to(&reference.minimize()));
        assert!(!dfa.is_minimal());
    }

    #[test]
    fn single_state_and_uniform_acceptance() {
        let single = Dfa::from_parts(2, 1, 0, vec![vec![0], vec![0]], vec![false]).unwrap();
        let Minimized { dfa, report } = Minimizer::new(&single).run();
        assert_eq!(dfa, single);
        assert_eq!(report.iterations, 0);

        let bamboo = generate::bamboo(4, 2).unwrap();
        let everything =
            Dfa::from_flat_parts(2, 4, 0, bamboo.transition_table_flat().to_vec(), vec![true; 4])
                .unwrap();
        let min = everything.minimize();
        assert_eq!(min.size(), 1);
        assert!(min.accepts([1, 0, 1]));
    }

    #[test_log::test]
    fn traced_run_has_same_result() {
        let dfa = crate::tests::wiki_dfa();
        let plain = Minimizer::new(&dfa).run();
        let traced =
            Minimizer::with_options(&dfa, MinimizeOptions { trace_classes: true }).run();
        assert_eq!(plain.dfa, traced.dfa);
        assert_eq!(plain.report, traced.report);
        assert_eq!(plain.report.splits, 1);
    }

    #[test]
    fn minimal_automata_keep_their_numbering() {
        let circle = generate::circle(6, 2).unwrap();
        assert_eq!(circle.minimized(), circle);
        assert!(circle.is_minimal());
    }

    /// Returns `dfa` with its states renamed by a random permutation.
    #[cfg(feature = "random")]
    fn shuffled(rng: &mut fastrand::Rng, dfa: &Dfa) -> Dfa {
        let mut permutation: Vec<StateId> = dfa.states().collect();
        rng.shuffle(&mut permutation);
        let table = dfa
            .symbols()
            .map(|symbol| {
                let mut row = vec![0; dfa.size()];
                for state in dfa.states() {
                    row[permutation[state as usize] as usize] =
                        permutation[dfa.successor(state, symbol).unwrap() as usize];
                }
                row
            })
            .collect();
        let mut accepting = vec![false; dfa.size()];
        for state in dfa.states() {
            accepting[permutation[state as usize] as usize] = dfa.is_accepting(state);
        }
        Dfa::from_parts(
            dfa.alphabet_size() as u32,
            dfa.size() as u32,
            permutation[dfa.initial() as usize],
            table,
            accepting,
        )
        .unwrap()
    }

    #[cfg(feature = "random")]
    #[test]
    fn random_automata_minimize_correctly() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..60 {
            let alphabet_size = rng.u32(1..4);
            let size = rng.u32(1..30);
            let dfa = generate::random_dfa_with_rng(&mut rng, alphabet_size, size).unwrap();
            let min = dfa.minimized();

            // language preservation
            for word in crate::tests::words_up_to(alphabet_size, 5) {
                assert_eq!(dfa.accepts(word.iter().copied()), min.accepts(word));
            }
            assert!(min.equivalent(&dfa));

            // minimality
            assert_eq!(min.unreachable_count(), 0);
            for p in min.states() {
                for q in min.states().filter(|&q| q != p) {
                    assert!(min.separate_states(p, q).is_some());
                }
            }

            // idempotence
            let again = min.minimized();
            assert_eq!(again.size(), min.size());
            assert!(again.is_isomorphic_to(&min));

            // independence of the numbering
            let renamed = shuffled(&mut rng, &dfa).minimize();
            assert!(renamed.is_isomorphic_to(&min));
        }
    }

    #[cfg(feature = "random")]
    #[test]
    fn oracle_agrees_with_language_equivalence() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut equal_pairs = 0;
        for _ in 0..200 {
            let (left_size, right_size) = (rng.u32(1..5), rng.u32(1..5));
            let left = generate::random_dfa_with_rng(&mut rng, 2, left_size).unwrap();
            let right = generate::random_dfa_with_rng(&mut rng, 2, right_size).unwrap();
            let same_language = crate::tests::words_up_to(2, 8)
                .into_iter()
                .all(|word| left.accepts(word.iter().copied()) == right.accepts(word));
            let isomorphic = left.minimized().is_isomorphic_to(&right.minimized());
            assert_eq!(isomorphic, same_language, "{left:?} vs {right:?}");
            assert_eq!(isomorphic, left.equivalent(&right));
            equal_pairs += usize::from(isomorphic);
        }
        assert!(equal_pairs > 0);
    }
}
