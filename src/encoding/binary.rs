use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use tracing::debug;

use crate::prelude::*;

const WORD: usize = std::mem::size_of::<u32>();

/// Writes `dfa` in the binary layout: `size`, `alphabet_size` and the initial state as
/// little-endian `u32`s, then the `alphabet_size * size` transition targets in symbol-major
/// order, then `ceil(size / 8)` bytes of acceptance flags where state `i` is bit `i % 8` of
/// byte `i / 8`.
pub fn write_dfa<W: Write>(dfa: &Dfa, mut writer: W) -> Result<()> {
    writer.write_all(&(dfa.size() as u32).to_le_bytes())?;
    writer.write_all(&(dfa.alphabet_size() as u32).to_le_bytes())?;
    writer.write_all(&dfa.initial().to_le_bytes())?;

    let mut table = Vec::with_capacity(dfa.transition_table_flat().len() * WORD);
    for &target in dfa.transition_table_flat() {
        table.extend_from_slice(&target.to_le_bytes());
    }
    writer.write_all(&table)?;

    let mut flags = vec![0u8; dfa.size().div_ceil(8)];
    for state in dfa.accepting_states() {
        flags[state as usize / 8] |= 1 << (state % 8);
    }
    writer.write_all(&flags)?;
    writer.flush()?;
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buffer = [0u8; WORD];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

/// Reads exactly `len` bytes. The buffer grows with the data that actually arrives, so a
/// corrupted header cannot trigger a huge allocation up front.
fn read_bytes<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.take(len).read_to_end(&mut buffer)?;
    if (buffer.len() as u64) < len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes but the input ended after {}", buffer.len()),
        )
        .into());
    }
    Ok(buffer)
}

/// Reads a DFA in the layout written by [`write_dfa`]. Truncated input surfaces as
/// [`Error::Io`], a well-formed layout that describes an invalid automaton (a target or the
/// initial state out of range, no states) as [`Error::MalformedInput`]. Trailing bytes are
/// ignored.
pub fn read_dfa<R: Read>(mut reader: R) -> Result<Dfa> {
    let size = read_u32(&mut reader)?;
    let alphabet_size = read_u32(&mut reader)?;
    let initial = read_u32(&mut reader)?;

    let entries = size as u64 * alphabet_size as u64;
    let table = read_bytes(&mut reader, entries * WORD as u64)?;
    let transitions = table
        .chunks_exact(WORD)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    let flags = read_bytes(&mut reader, (size as u64).div_ceil(8))?;
    let accepting = (0..size as usize)
        .map(|state| flags[state / 8] & (1 << (state % 8)) != 0)
        .collect();

    Dfa::from_flat_parts(alphabet_size, size, initial, transitions, accepting)
}

/// Writes `dfa` to the file at `path`, creating or truncating it.
pub fn save<P: AsRef<Path>>(dfa: &Dfa, path: P) -> Result<()> {
    let path = path.as_ref();
    write_dfa(dfa, BufWriter::new(File::create(path)?))?;
    debug!("saved dfa with {} states to {}", dfa.size(), path.display());
    Ok(())
}

/// Reads a DFA from the file at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Dfa> {
    let path = path.as_ref();
    let dfa = read_dfa(BufReader::new(File::open(path)?))?;
    debug!("loaded dfa with {} states from {}", dfa.size(), path.display());
    Ok(dfa)
}

#[cfg(test)]
mod tests {
    use super::{read_dfa, write_dfa};
    use crate::prelude::*;

    #[test]
    fn layout_is_little_endian_and_lsb_first() {
        let dfa = Dfa::from_parts(
            2,
            3,
            1,
            vec![vec![1, 2, 2], vec![0, 0, 2]],
            vec![true, false, true],
        )
        .unwrap();
        let mut bytes = Vec::new();
        write_dfa(&dfa, &mut bytes).unwrap();

        let mut expected = Vec::new();
        for value in [3u32, 2, 1, 1, 2, 2, 0, 0, 2] {
            expected.extend_from_slice(&value.to_le_bytes());
        }
        expected.push(0b101);
        assert_eq!(bytes, expected);
        assert_eq!(read_dfa(bytes.as_slice()).unwrap(), dfa);
    }

    #[test]
    fn truncated_and_invalid_input() {
        let mut bytes = Vec::new();
        write_dfa(&generate::bamboo(9, 2).unwrap(), &mut bytes).unwrap();
        // 9 states need two bytes of flags
        assert_eq!(bytes.len(), 3 * 4 + 18 * 4 + 2);

        let truncated = read_dfa(&bytes[..bytes.len() - 1]);
        assert!(matches!(truncated, Err(Error::Io(_))));
        assert!(matches!(read_dfa(&bytes[..5]), Err(Error::Io(_))));

        // initial state 9 is out of range
        bytes[8] = 9;
        assert!(matches!(read_dfa(bytes.as_slice()), Err(Error::MalformedInput(_))));
    }

    #[test_log::test]
    fn minimized_automaton_survives_a_file() {
        let dfa = crate::tests::wiki_dfa().minimize();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki.bin");

        binary::save(&dfa, &path).unwrap();
        let loaded = binary::load(&path).unwrap();
        assert_eq!(loaded.size(), dfa.size());
        assert!(loaded.is_isomorphic_to(&dfa));
        assert_eq!(loaded, dfa);

        assert!(matches!(
            binary::load(dir.path().join("missing.bin")),
            Err(Error::Io(_))
        ));
    }
}
