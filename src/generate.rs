use crate::prelude::*;

fn chain(size: u32, alphabet_size: u32, last_target: StateId) -> Result<Dfa> {
    if size < 2 {
        return Err(Error::malformed(format!(
            "too small ({size} states) dfa, at least two states are needed"
        )));
    }
    if alphabet_size == 0 {
        return Err(Error::malformed("alphabet size must not be zero"));
    }
    let mut transitions = Vec::with_capacity(size as usize * alphabet_size as usize);
    for _ in 0..alphabet_size {
        transitions.extend(1..size);
        transitions.push(last_target);
    }
    let mut accepting = vec![false; size as usize];
    accepting[size as usize - 1] = true;
    Dfa::from_flat_parts(alphabet_size, size, 0, transitions, accepting)
}

/// Builds the chain `0 → 1 → … → size - 1` in which every symbol moves one step forward and
/// the last state, the only accepting one, loops. It accepts the words of length at least
/// `size - 1` and is minimal.
///
/// Fails with [`Error::MalformedInput`] if `size < 2` or `alphabet_size == 0`.
pub fn bamboo(size: u32, alphabet_size: u32) -> Result<Dfa> {
    chain(size, alphabet_size, size.saturating_sub(1))
}

/// Same as [`bamboo`], but the last state moves back to `0`, so the automaton is a single cycle
/// that accepts the words whose length is `size - 1` modulo `size`.
///
/// # Example
/// ```
/// use dfamin::prelude::*;
///
/// let circle = generate::circle(3, 1).unwrap();
/// assert!(circle.accepts([0, 0]));
/// assert!(circle.accepts([0; 5]));
/// assert!(!circle.accepts([0; 3]));
/// ```
pub fn circle(size: u32, alphabet_size: u32) -> Result<Dfa> {
    chain(size, alphabet_size, 0)
}

/// Builds a unary cycle of `size` states in which state `s` accepts iff `s + 1` is a multiple of
/// `cycle`. The acceptance pattern repeats `size / cycle` times, so the minimal automaton has
/// `cycle` states.
///
/// Fails with [`Error::MalformedInput`] if `cycle` is zero or does not divide `size`, or if
/// `size` is zero.
pub fn repeated_cycle(size: u32, cycle: u32) -> Result<Dfa> {
    if cycle == 0 {
        return Err(Error::malformed("cycle length must not be zero"));
    }
    if size == 0 || size % cycle != 0 {
        return Err(Error::malformed(format!(
            "size {size} is not a positive multiple of the cycle length {cycle}"
        )));
    }
    let transitions = (1..size).chain(std::iter::once(0)).collect();
    let accepting = (0..size).map(|s| (s + 1) % cycle == 0).collect();
    Dfa::from_flat_parts(1, size, 0, transitions, accepting)
}

/// Draws a DFA with `size` states over `alphabet_size` symbols whose targets and acceptance
/// flags are uniformly random, using the thread-local generator of `fastrand`. The initial
/// state is `0`; depending on the draw some states may be unreachable.
#[cfg(feature = "random")]
pub fn random_dfa(alphabet_size: u32, size: u32) -> Result<Dfa> {
    random_dfa_with_rng(&mut fastrand::Rng::new(), alphabet_size, size)
}

/// Works as [`random_dfa`] but draws from `rng`, so a seeded generator gives reproducible
/// automata.
#[cfg(feature = "random")]
pub fn random_dfa_with_rng(rng: &mut fastrand::Rng, alphabet_size: u32, size: u32) -> Result<Dfa> {
    if size == 0 {
        return Err(Error::malformed("an automaton needs at least one state"));
    }
    let transitions = (0..alphabet_size as usize * size as usize)
        .map(|_| rng.u32(..size))
        .collect();
    let accepting = (0..size).map(|_| rng.bool()).collect();
    tracing::trace!("drew random dfa with {size} states over {alphabet_size} symbols");
    Dfa::from_flat_parts(alphabet_size, size, 0, transitions, accepting)
}
