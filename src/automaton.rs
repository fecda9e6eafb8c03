mod dfa;
pub use dfa::Dfa;

mod builder;
pub use builder::DfaBuilder;

mod reachability;
pub use reachability::ReachableStates;

mod equivalence;

/// Nondeterministic automata and the subset construction that turns them into [`Dfa`]s.
pub mod nfa;
pub use nfa::Nfa;
