//! Two compact grammars for small automata, with states written as single base-62 digits
//! (`0-9`, `a-z`, `A-Z`).
//!
//! A `dfa_string` like `001_101222` consists of one `0`/`1` acceptance flag per state, an
//! underscore, and the transition targets in state-major order: first the successors of state
//! `0` under every symbol, then those of state `1`, and so on. The alphabet size is the number of
//! targets divided by the number of states, the initial state is `0`.
//!
//! An `nfa_string` like `>{01}0{}2{}{}--+` lists one successor group per state and symbol in
//! state-major order, where a group is a single digit or a possibly empty set `{...}` of digits.
//! A `>` in front of the first group of a state makes it initial; without any `>` the only
//! initial state is `0`. The string ends with one `+` (accepting) or `-` (rejecting) per state.

use itertools::Itertools;

use super::{digit_char, digit_value, MAX_TEXT_SIZE};
use crate::prelude::*;

/// Parses a `dfa_string`.
///
/// # Example
/// ```
/// use dfamin::prelude::*;
///
/// // words over {0, 1} that contain `0 1`
/// let dfa = text::parse_dfa_string("001_101222").unwrap();
/// assert_eq!(dfa.size(), 3);
/// assert_eq!(dfa.alphabet_size(), 2);
/// assert!(dfa.accepts([1, 0, 0, 1, 1]));
/// ```
pub fn parse_dfa_string(input: &str) -> Result<Dfa> {
    let Some((flags, targets)) = input.split_once('_') else {
        return Err(Error::malformed("dfa string has no `_` separator"));
    };

    let accepting = flags
        .chars()
        .enumerate()
        .map(|(position, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(Error::malformed(format!(
                "expected acceptance flag `0` or `1` at position {position}, found `{c}`"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    let size = accepting.len();
    if size == 0 {
        return Err(Error::malformed("dfa string has no acceptance flags"));
    }

    let offset = size + 1;
    let targets = targets
        .chars()
        .enumerate()
        .map(|(index, c)| match digit_value(c) {
            Some(target) if (target as usize) < size => Ok(target),
            Some(target) => Err(Error::malformed(format!(
                "target {target} at position {} is out of range for {size} states",
                offset + index
            ))),
            None => Err(Error::malformed(format!(
                "expected a state digit at position {}, found `{c}`",
                offset + index
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    if targets.is_empty() || targets.len() % size != 0 {
        return Err(Error::malformed(format!(
            "{} targets are not a positive multiple of the {size} states",
            targets.len()
        )));
    }
    let alphabet_size = targets.len() / size;

    let mut transitions = vec![0; targets.len()];
    for (index, target) in targets.into_iter().enumerate() {
        let (state, symbol) = (index / alphabet_size, index % alphabet_size);
        transitions[symbol * size + state] = target;
    }
    Dfa::from_flat_parts(alphabet_size as u32, size as u32, 0, transitions, accepting)
}

/// Renders `dfa` as a `dfa_string`. As the grammar fixes the initial state to `0`, an automaton
/// with another initial state is written with that state and state `0` swapped.
///
/// Fails with [`Error::UnsupportedSize`] for more than [`MAX_TEXT_SIZE`] states and with
/// [`Error::MalformedInput`] for an empty alphabet, which the grammar cannot express.
pub fn format_dfa_string(dfa: &Dfa) -> Result<String> {
    if dfa.size() > MAX_TEXT_SIZE {
        return Err(Error::UnsupportedSize {
            states: dfa.size(),
            limit: MAX_TEXT_SIZE,
        });
    }
    if dfa.alphabet_size() == 0 {
        return Err(Error::malformed("a dfa string cannot express an empty alphabet"));
    }

    let initial = dfa.initial();
    let rename = |state: StateId| match state {
        0 => initial,
        q if q == initial => 0,
        q => q,
    };

    let mut out = String::with_capacity(dfa.size() * (dfa.alphabet_size() + 1) + 1);
    for state in dfa.states() {
        out.push(if dfa.is_accepting(rename(state)) { '1' } else { '0' });
    }
    out.push('_');
    for state in dfa.states() {
        for symbol in dfa.symbols() {
            let target = rename(dfa.delta(symbol, rename(state)));
            out.extend(digit_char(target));
        }
    }
    Ok(out)
}

/// Parses an `nfa_string`.
///
/// # Example
/// ```
/// use dfamin::prelude::*;
///
/// // words over {0, 1} that end in `0 1`
/// let nfa = text::parse_nfa_string("{01}0{}2{}{}--+").unwrap();
/// assert_eq!(nfa.size(), 3);
/// assert!(nfa.accepts([1, 1, 0, 1]));
/// assert!(!nfa.accepts([0, 1, 0]));
/// ```
pub fn parse_nfa_string(input: &str) -> Result<Nfa> {
    let split = input
        .find(|c: char| c == '+' || c == '-')
        .ok_or_else(|| Error::malformed("nfa string has no acceptance markers `+`/`-`"))?;
    let (body, markers) = input.split_at(split);
    let accepting = markers
        .chars()
        .enumerate()
        .map(|(index, c)| match c {
            '+' => Ok(true),
            '-' => Ok(false),
            _ => Err(Error::malformed(format!(
                "expected `+` or `-` at position {}, found `{c}`",
                split + index
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    let size = accepting.len();

    // successor groups and the group indices that follow a `>`
    let mut groups: Vec<Vec<StateId>> = Vec::new();
    let mut initial_marks: Vec<(usize, usize)> = Vec::new();
    let mut open: Option<Vec<StateId>> = None;
    let mut last_was_mark = false;
    for (position, c) in body.char_indices() {
        match c {
            '>' if open.is_some() => {
                return Err(Error::malformed(format!(
                    "`>` inside of a group at position {position}"
                )))
            }
            '>' if last_was_mark => {
                return Err(Error::malformed(format!("repeated `>` at position {position}")))
            }
            '>' => initial_marks.push((groups.len(), position)),
            '{' if open.is_some() => {
                return Err(Error::malformed(format!("nested `{{` at position {position}")))
            }
            '{' => open = Some(Vec::new()),
            '}' => match open.take() {
                Some(group) => groups.push(group),
                None => {
                    return Err(Error::malformed(format!(
                        "unmatched `}}` at position {position}"
                    )))
                }
            },
            _ => {
                let state = digit_value(c).ok_or_else(|| {
                    Error::malformed(format!("unexpected character `{c}` at position {position}"))
                })?;
                match open.as_mut() {
                    Some(group) => group.push(state),
                    None => groups.push(vec![state]),
                }
            }
        }
        last_was_mark = c == '>';
    }
    if open.is_some() {
        return Err(Error::malformed("unterminated `{` group"));
    }
    if groups.is_empty() || groups.len() % size != 0 {
        return Err(Error::malformed(format!(
            "{} successor groups are not a positive multiple of the {size} states",
            groups.len()
        )));
    }
    let alphabet_size = groups.len() / size;

    let mut initial = Vec::with_capacity(initial_marks.len().max(1));
    for (group, position) in initial_marks {
        if group % alphabet_size != 0 || group == groups.len() {
            return Err(Error::malformed(format!(
                "`>` at position {position} does not precede the first group of a state"
            )));
        }
        initial.push((group / alphabet_size) as StateId);
    }
    if initial.is_empty() {
        initial.push(0);
    }

    let delta = groups
        .into_iter()
        .chunks(alphabet_size)
        .into_iter()
        .map(|row| row.collect())
        .collect();
    Nfa::from_parts(
        alphabet_size as u32,
        size as u32,
        initial,
        delta,
        accepting,
    )
}

/// Renders `nfa` as an `nfa_string`, writing single successors without braces. Every initial
/// state is marked with `>` unless state `0` is the only one.
///
/// Fails with [`Error::UnsupportedSize`] for more than [`MAX_TEXT_SIZE`] states and with
/// [`Error::MalformedInput`] for an empty alphabet.
pub fn format_nfa_string(nfa: &Nfa) -> Result<String> {
    if nfa.size() > MAX_TEXT_SIZE {
        return Err(Error::UnsupportedSize {
            states: nfa.size(),
            limit: MAX_TEXT_SIZE,
        });
    }
    if nfa.alphabet_size() == 0 {
        return Err(Error::malformed("an nfa string cannot express an empty alphabet"));
    }

    let mark_initial = nfa.initial_states() != [0];
    let mut out = String::new();
    for state in 0..nfa.size() as StateId {
        if mark_initial && nfa.initial_states().binary_search(&state).is_ok() {
            out.push('>');
        }
        for symbol in 0..nfa.alphabet_size() as Symbol {
            let successors = nfa.successors(state, symbol).unwrap_or_default();
            match successors {
                [single] => out.extend(digit_char(*single)),
                _ => {
                    out.push('{');
                    out.extend(successors.iter().filter_map(|&q| digit_char(q)));
                    out.push('}');
                }
            }
        }
    }
    out.extend(
        (0..nfa.size() as StateId).map(|q| if nfa.is_accepting(q) { '+' } else { '-' }),
    );
    Ok(out)
}
