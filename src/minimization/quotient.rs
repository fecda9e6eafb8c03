use tracing::trace;

use super::partition_refinement::PartitionRefiner;
use crate::prelude::*;

/// Collapses the stable partition of `refiner` into a new automaton. Block `b` becomes state
/// `b`, its transitions and acceptance are taken from the head of its member list, and the new
/// initial state is the block of the old one.
pub(crate) fn rebuild(dfa: &Dfa, refiner: &PartitionRefiner<'_>) -> Dfa {
    let block_count = refiner.block_count();
    let representatives: Vec<StateId> = (0..block_count as u32)
        .map(|block| refiner.representative(block))
        .collect();
    debug_assert!(representatives.iter().all(|&q| q != EMPTY_STATE));

    let mut transitions = Vec::with_capacity(dfa.alphabet_size() * block_count);
    for symbol in dfa.symbols() {
        transitions.extend(
            representatives
                .iter()
                .map(|&q| refiner.block_of(dfa.delta(symbol, q))),
        );
    }
    let accepting = representatives
        .iter()
        .map(|&q| dfa.is_accepting(q))
        .collect();

    trace!("collapsed {} states into {block_count} blocks", dfa.size());
    Dfa::from_verified_parts(
        dfa.alphabet_size() as u32,
        block_count as u32,
        refiner.block_of(dfa.initial()),
        transitions,
        accepting,
    )
}

#[cfg(test)]
mod tests {
    use super::rebuild;
    use crate::{
        minimization::{partition_refinement::PartitionRefiner, reverse::ReverseIndex},
        prelude::*,
    };

    #[test]
    fn collapses_equivalent_states() {
        // 1 and 2 both loop into the accepting sink 3
        let dfa = Dfa::builder()
            .with_state_colors([false, false, false, true])
            .with_transitions([
                (0, 0, 1),
                (0, 1, 2),
                (1, 0, 3),
                (1, 1, 3),
                (2, 0, 3),
                (2, 1, 3),
                (3, 0, 3),
                (3, 1, 3),
            ])
            .into_dfa(0)
            .unwrap();
        let reverse = ReverseIndex::build(&dfa);
        let mut refiner = PartitionRefiner::seed(&dfa, &reverse);
        refiner.refine();
        let quotient = rebuild(&dfa, &refiner);

        assert_eq!(quotient.size(), 3);
        assert_eq!(quotient.initial(), refiner.block_of(0));
        assert_eq!(
            quotient.successor(quotient.initial(), 0),
            quotient.successor(quotient.initial(), 1)
        );
        assert!(quotient.accepts([1, 0]));
        assert!(!quotient.accepts([1]));
        assert!(quotient.equivalent(&dfa));
    }
}
