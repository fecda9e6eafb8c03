use thiserror::Error;

/// Errors produced while constructing, converting, reading or writing automata.
///
/// All of them abort the operation that raised them, nothing is partially built.
#[derive(Error, Debug)]
pub enum Error {
    /// The input does not describe a well-formed automaton: dimensions of the transition table
    /// disagree with the declared sizes, a transition or the start state is out of range, or a
    /// textual encoding violates its grammar.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// An operation that relies on a bit-packed representation was asked to handle more
    /// states than the representation can hold.
    #[error("unsupported size: {states} states exceed the limit of {limit}")]
    UnsupportedSize {
        /// Number of states of the offending automaton.
        states: usize,
        /// Largest number of states the operation supports.
        limit: usize,
    },
    /// Reading from or writing to a file or stream failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedInput(message.into())
    }
}

/// Result type with [`Error`] as the default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;
