use crate::prelude::*;

/// Helper struct for the construction of [`Dfa`]s. It stores a list of transitions, a list of
/// state colors (acceptance flags) and an optional default color.
///
/// The number of states is the larger of the number of given colors and one more than the
/// largest state mentioned in a transition. The alphabet size is taken from
/// [`DfaBuilder::with_alphabet_size`] or, if that is not given, is one more than the largest
/// symbol that appears on a transition.
///
/// # Example
///
/// We want to create a DFA with two states 0 and 1 over the alphabet `{0, 1}` that accepts the
/// words ending in `1`:
/// ```
/// use dfamin::prelude::*;
///
/// let dfa = Dfa::builder()
///     .with_state_colors([false, true])
///     .with_transitions([(0, 0, 0), (0, 1, 1), (1, 0, 0), (1, 1, 1)])
///     .into_dfa(0)
///     .unwrap();
/// assert!(dfa.accepts([0, 0, 1]));
/// assert!(!dfa.accepts([1, 0]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DfaBuilder {
    alphabet_size: Option<u32>,
    colors: Vec<bool>,
    default: Option<bool>,
    transitions: Vec<(StateId, Symbol, StateId)>,
}

impl DfaBuilder {
    /// Fixes the alphabet size. Transitions on symbols outside of `0..alphabet_size` make
    /// [`DfaBuilder::into_dfa`] fail.
    pub fn with_alphabet_size(mut self, alphabet_size: u32) -> Self {
        self.alphabet_size = Some(alphabet_size);
        self
    }

    /// Sets the acceptance flags of the states `0, 1, ...` in the order in which they are given.
    pub fn with_state_colors<I: IntoIterator<Item = bool>>(mut self, iter: I) -> Self {
        self.colors.extend(iter);
        self
    }

    /// Sets the acceptance flag for states that have no color specified.
    pub fn default_color(mut self, color: bool) -> Self {
        self.default = Some(color);
        self
    }

    /// Adds transitions given as `(source, symbol, target)` triples.
    pub fn with_transitions<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (StateId, Symbol, StateId)>,
    {
        self.transitions.extend(iter);
        self
    }

    /// Builds the [`Dfa`] with the given initial state. Fails with [`Error::MalformedInput`]
    /// if some state misses a transition, if two different transitions are given for the same
    /// state and symbol, if a state has no color and there is no default color, or if a symbol
    /// lies outside of a fixed alphabet.
    pub fn into_dfa(self, initial: StateId) -> Result<Dfa> {
        let mentioned = self
            .transitions
            .iter()
            .map(|&(source, _, target)| source.max(target) as usize + 1)
            .chain(std::iter::once(initial as usize + 1))
            .max()
            .unwrap_or(0);
        let size = mentioned.max(self.colors.len());
        let size = u32::try_from(size)
            .map_err(|_| Error::malformed(format!("{size} states do not fit state indices")))?;

        let alphabet_size = match self.alphabet_size {
            Some(alphabet_size) => {
                if let Some(&(source, symbol, _)) = self
                    .transitions
                    .iter()
                    .find(|&&(_, symbol, _)| symbol >= alphabet_size)
                {
                    return Err(Error::malformed(format!(
                        "transition from {source} uses symbol {symbol}, but the alphabet has {alphabet_size} symbols"
                    )));
                }
                alphabet_size
            }
            None => self
                .transitions
                .iter()
                .map(|&(_, symbol, _)| symbol.saturating_add(1))
                .max()
                .unwrap_or(0),
        };

        let mut table = vec![EMPTY_STATE; alphabet_size as usize * size as usize];
        for (source, symbol, target) in self.transitions {
            let slot = &mut table[symbol as usize * size as usize + source as usize];
            if *slot != EMPTY_STATE && *slot != target {
                return Err(Error::malformed(format!(
                    "state {source} has two transitions on symbol {symbol}, to {} and to {target}",
                    *slot
                )));
            }
            *slot = target;
        }
        if let Some(position) = table.iter().position(|&target| target == EMPTY_STATE) {
            return Err(Error::malformed(format!(
                "state {} has no transition on symbol {}",
                position % size as usize,
                position / size as usize
            )));
        }

        let mut accepting = Vec::with_capacity(size as usize);
        for state in 0..size as usize {
            match self.colors.get(state).copied().or(self.default) {
                Some(color) => accepting.push(color),
                None => {
                    return Err(Error::malformed(format!(
                        "state {state} has no color and no default color is set"
                    )))
                }
            }
        }

        Dfa::from_flat_parts(alphabet_size, size, initial, table, accepting)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn builder_checks_totality() {
        let missing = Dfa::builder()
            .with_state_colors([false, true])
            .with_transitions([(0, 0, 1), (1, 0, 1), (0, 1, 0)])
            .into_dfa(0);
        assert!(matches!(missing, Err(Error::MalformedInput(_))));

        let conflicting = Dfa::builder()
            .with_state_colors([false, true])
            .with_transitions([(0, 0, 1), (0, 0, 0), (1, 0, 1)])
            .into_dfa(0);
        assert!(matches!(conflicting, Err(Error::MalformedInput(_))));

        let uncolored = Dfa::builder()
            .with_state_colors([false])
            .with_transitions([(0, 0, 1), (1, 0, 1)])
            .into_dfa(0);
        assert!(matches!(uncolored, Err(Error::MalformedInput(_))));

        let outside_alphabet = Dfa::builder()
            .with_alphabet_size(1)
            .default_color(false)
            .with_transitions([(0, 0, 0), (0, 1, 0)])
            .into_dfa(0);
        assert!(matches!(outside_alphabet, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn builder_with_default_color() {
        let dfa = Dfa::builder()
            .default_color(true)
            .with_state_colors([false])
            .with_transitions([(0, 0, 1), (1, 0, 2), (2, 0, 2)])
            .into_dfa(0)
            .unwrap();
        assert_eq!(dfa.size(), 3);
        assert_eq!(dfa.alphabet_size(), 1);
        assert_eq!(dfa.accepting_states().collect::<Vec<_>>(), vec![1, 2]);
    }
}
