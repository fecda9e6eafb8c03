/// The binary file layout: a little-endian header of three `u32`s (size, alphabet size, initial
/// state), the transition table in symbol-major order and the acceptance flags packed into bytes.
pub mod binary;

/// The compact string grammars `dfa_string` and `nfa_string`.
pub mod text;

/// Characters of the base-62 digit set that the string grammars use for states, in the order
/// of their value.
const DIGITS: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The largest number of states that the string grammars can express.
pub const MAX_TEXT_SIZE: usize = DIGITS.len();

fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 36),
        _ => None,
    }
}

fn digit_char(value: u32) -> Option<char> {
    DIGITS.get(value as usize).map(|&b| b as char)
}

#[cfg(test)]
mod tests {
    use super::{digit_char, digit_value, MAX_TEXT_SIZE};

    #[test]
    fn base62_digits() {
        for value in 0..MAX_TEXT_SIZE as u32 {
            let c = digit_char(value).unwrap();
            assert_eq!(digit_value(c), Some(value));
        }
        assert_eq!(digit_value('a'), Some(10));
        assert_eq!(digit_value('Z'), Some(61));
        assert_eq!(digit_value('_'), None);
        assert_eq!(digit_char(62), None);
    }
}
