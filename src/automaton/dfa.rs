use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::prelude::*;

/// Automata above this size are not rendered as a table by [`Display`].
const MAX_PRINTED_SIZE: usize = 50;

/// A deterministic finite automaton (DFA) over the alphabet `0..alphabet_size` with states
/// `0..size`. It accepts a finite word if the state reached by reading it from the initial state
/// is accepting.
///
/// The transition function is total and stored as one flat table in symbol-major order, i.e.
/// the successor of `state` under `symbol` lives at `symbol * size + state`. This is the same
/// order that the binary file layout uses (see [`binary`]).
///
/// A `Dfa` is immutable once built. Operations like [`Dfa::prune`] and [`Dfa::minimize`] consume
/// or borrow it and produce a new automaton.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dfa {
    alphabet_size: u32,
    size: u32,
    initial: StateId,
    transitions: Vec<StateId>,
    accepting: Vec<bool>,
}

impl Dfa {
    /// Creates a [`DfaBuilder`] for assembling an automaton transition by transition.
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// Creates a DFA from a transition table that is indexed as `table[symbol][state]`.
    ///
    /// Fails with [`Error::MalformedInput`] if the table does not have `alphabet_size` rows of
    /// `size` entries each, if `accepting` does not have `size` entries, if `size` is zero or if
    /// the initial state or some transition target is not a state.
    ///
    /// # Example
    /// ```
    /// use dfamin::prelude::*;
    ///
    /// // accepts words over {0} of length at least two
    /// let dfa = Dfa::from_parts(1, 3, 0, vec![vec![1, 2, 2]], vec![false, false, true]).unwrap();
    /// assert!(dfa.accepts([0, 0]));
    /// assert!(!dfa.accepts([0]));
    /// assert!(Dfa::from_parts(1, 3, 0, vec![vec![1, 2, 3]], vec![false, false, true]).is_err());
    /// ```
    pub fn from_parts(
        alphabet_size: u32,
        size: u32,
        initial: StateId,
        table: Vec<Vec<StateId>>,
        accepting: Vec<bool>,
    ) -> Result<Self> {
        if table.len() != alphabet_size as usize {
            return Err(Error::malformed(format!(
                "transition table has {} rows but the alphabet has {alphabet_size} symbols",
                table.len()
            )));
        }
        if let Some((symbol, row)) = table
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != size as usize)
        {
            return Err(Error::malformed(format!(
                "row of symbol {symbol} has {} entries but there are {size} states",
                row.len()
            )));
        }
        Self::from_flat_parts(
            alphabet_size,
            size,
            initial,
            table.into_iter().flatten().collect(),
            accepting,
        )
    }

    /// Creates a DFA from a flat transition table in symbol-major order, that is the successor
    /// of `state` under `symbol` must be at position `symbol * size + state`. Validation is the
    /// same as for [`Dfa::from_parts`].
    pub fn from_flat_parts(
        alphabet_size: u32,
        size: u32,
        initial: StateId,
        transitions: Vec<StateId>,
        accepting: Vec<bool>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::malformed("an automaton needs at least one state"));
        }
        let expected = alphabet_size as u64 * size as u64;
        if transitions.len() as u64 != expected {
            return Err(Error::malformed(format!(
                "transition table has {} entries, expected {alphabet_size} * {size} = {expected}",
                transitions.len()
            )));
        }
        if accepting.len() != size as usize {
            return Err(Error::malformed(format!(
                "acceptance vector has {} entries but there are {size} states",
                accepting.len()
            )));
        }
        if initial >= size {
            return Err(Error::malformed(format!(
                "initial state {initial} is out of range for {size} states"
            )));
        }
        if let Some(position) = transitions.iter().position(|&target| target >= size) {
            return Err(Error::malformed(format!(
                "transition of state {} on symbol {} leads to {}, which is out of range for {size} states",
                position % size as usize,
                position / size as usize,
                transitions[position]
            )));
        }

        Ok(Self {
            alphabet_size,
            size,
            initial,
            transitions,
            accepting,
        })
    }

    /// Assembles a DFA from parts that are known to be well-formed, used by the operations of
    /// this crate that derive a new automaton from an existing one.
    pub(crate) fn from_verified_parts(
        alphabet_size: u32,
        size: u32,
        initial: StateId,
        transitions: Vec<StateId>,
        accepting: Vec<bool>,
    ) -> Self {
        debug_assert!(size > 0 && initial < size);
        debug_assert_eq!(transitions.len(), alphabet_size as usize * size as usize);
        debug_assert_eq!(accepting.len(), size as usize);
        debug_assert!(transitions.iter().all(|&target| target < size));
        Self {
            alphabet_size,
            size,
            initial,
            transitions,
            accepting,
        }
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Returns the number of symbols in the alphabet.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size as usize
    }

    /// Returns the initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Returns an iterator over all states.
    pub fn states(&self) -> std::ops::Range<StateId> {
        0..self.size
    }

    /// Returns an iterator over all symbols of the alphabet.
    pub fn symbols(&self) -> std::ops::Range<Symbol> {
        0..self.alphabet_size
    }

    /// Returns the successor of `state` under `symbol`, or `None` if either is out of range.
    pub fn successor(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        if state < self.size && symbol < self.alphabet_size {
            Some(self.delta(symbol, state))
        } else {
            None
        }
    }

    /// Unchecked successor lookup for states and symbols that are known to be in range.
    #[inline]
    pub(crate) fn delta(&self, symbol: Symbol, state: StateId) -> StateId {
        self.transitions[symbol as usize * self.size as usize + state as usize]
    }

    /// Returns the targets of all transitions on `symbol`, indexed by their source state.
    pub fn transitions_for(&self, symbol: Symbol) -> Option<&[StateId]> {
        if symbol >= self.alphabet_size {
            return None;
        }
        let size = self.size as usize;
        let start = symbol as usize * size;
        Some(&self.transitions[start..start + size])
    }

    /// Returns the whole transition table in symbol-major order.
    pub fn transition_table_flat(&self) -> &[StateId] {
        &self.transitions
    }

    /// Returns `true` if `state` is accepting. States that do not exist are not accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.get(state as usize).copied().unwrap_or(false)
    }

    /// Returns the acceptance flag of every state, indexed by state.
    pub fn acceptance(&self) -> &[bool] {
        &self.accepting
    }

    /// Returns the indices of all states that are accepting.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states().filter(|&q| self.accepting[q as usize])
    }

    /// Returns the indices of all states that are rejecting.
    pub fn rejecting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states().filter(|&q| !self.accepting[q as usize])
    }

    /// Returns the state that is reached when reading `word` from `origin`. Returns `None` if
    /// `origin` is not a state or the word contains a symbol outside of the alphabet.
    pub fn reached_state_from<W>(&self, origin: StateId, word: W) -> Option<StateId>
    where
        W: IntoIterator<Item = Symbol>,
    {
        word.into_iter()
            .try_fold(origin, |state, symbol| self.successor(state, symbol))
    }

    /// Returns the state that is reached when reading `word` from the initial state.
    pub fn reached_state<W>(&self, word: W) -> Option<StateId>
    where
        W: IntoIterator<Item = Symbol>,
    {
        self.reached_state_from(self.initial, word)
    }

    /// Returns `true` if `word` leads from the initial state to an accepting state. Words that
    /// use symbols outside of the alphabet are rejected.
    ///
    /// # Example
    /// ```
    /// use dfamin::prelude::*;
    ///
    /// let dfa = generate::bamboo(3, 2).unwrap();
    /// assert!(dfa.accepts([0, 1]));
    /// assert!(dfa.accepts([1, 1, 0, 1]));
    /// assert!(!dfa.accepts([1]));
    /// assert!(!dfa.accepts([0, 2]));
    /// ```
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator<Item = Symbol>,
    {
        self.reached_state(word)
            .map(|state| self.is_accepting(state))
            .unwrap_or(false)
    }

    /// Renders the transition table. The initial state is printed in bold, accepting states
    /// are marked in the `Type` column.
    pub fn transition_table(&self) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string())
                .chain(self.symbols().map(|symbol| symbol.to_string()))
                .chain(std::iter::once("Type".to_string())),
        );
        for state in self.states() {
            let name = if state == self.initial {
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
                    .chain(
                        self.symbols()
                            .map(|symbol| self.delta(symbol, state).to_string()),
                    )
                    .chain(std::iter::once(kind)),
            );
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl std::fmt::Debug for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dfa")
            .field("size", &self.size)
            .field("alphabet_size", &self.alphabet_size)
            .field("initial", &self.initial)
            .field("accepting", &self.accepting_states().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "SIZE: {}  LEN_ALPHABET: {} STARTING_NODE: {}",
            self.size, self.alphabet_size, self.initial
        )?;
        if self.size() > MAX_PRINTED_SIZE {
            return writeln!(f, "Too big dfa to print in stdout");
        }
        writeln!(f, "{}", self.transition_table())
    }
}
