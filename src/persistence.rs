// Saving and restoring search state.
//
// Transposition table contents are only meaningful against the Zobrist
// keys that produced the stored hashes, so the two travel together as
// one blob: 3 x MAX_HEROES little-endian keys, then 2^20 little-endian
// packed table entries. Loading one without the other would silently
// corrupt search results. A failed load leaves the engine's search
// state unspecified; callers should clear_tt and regenerate keys or
// retry the load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::Ordering;

use crate::draft_repr::MAX_HEROES;
use crate::engine::Engine;
use crate::errors::DraftError;
use crate::search::{KeyRow, TT_ENTRIES};
use log::debug;

const KEY_ROWS: [KeyRow; 3] = [KeyRow::A, KeyRow::B, KeyRow::Ban];

/// Exact size of a saved search state.
pub const SEARCH_STATE_BYTES: u64 = ((3 * MAX_HEROES + TT_ENTRIES) * 8) as u64;

impl Engine {
    /// Write the Zobrist keys and transposition table to `writer`.
    /// Succeeds only if every byte was written.
    pub fn save_search_state<W: Write>(&self, writer: &mut W) -> Result<(), DraftError> {
        for row in KEY_ROWS {
            for &key in self.zobrist.row(row) {
                writer.write_all(&key.to_le_bytes())?;
            }
        }

        for entry in self.tt.entries() {
            writer.write_all(&entry.load(Ordering::Relaxed).to_le_bytes())?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Restore Zobrist keys and transposition table from `reader`.
    /// Succeeds only if every expected byte was read.
    pub fn load_search_state<R: Read>(&mut self, reader: &mut R) -> Result<(), DraftError> {
        let mut buf = [0u8; 8];

        for row in KEY_ROWS {
            for key in self.zobrist.row_mut(row) {
                reader.read_exact(&mut buf)?;
                *key = u64::from_le_bytes(buf);
            }
        }

        for entry in self.tt.entries() {
            reader.read_exact(&mut buf)?;
            entry.store(u64::from_le_bytes(buf), Ordering::Relaxed);
        }

        Ok(())
    }

    /// Save the search state to a file.
    pub fn save_search_state_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), DraftError> {
        let mut writer = BufWriter::new(File::create(&path)?);
        self.save_search_state(&mut writer)?;
        debug!("saved search state to {}", path.as_ref().display());
        Ok(())
    }

    /// Load the search state from a file.
    pub fn load_search_state_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(), DraftError> {
        let mut reader = BufReader::new(File::open(&path)?);
        self.load_search_state(&mut reader)?;
        debug!("loaded search state from {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft_repr::Team;
    use crate::search::Flag;
    use std::io::Cursor;

    #[test]
    fn test_saved_blob_has_exact_size() {
        let eng = Engine::new();
        let mut blob = Vec::new();
        eng.save_search_state(&mut blob).unwrap();
        assert_eq!(blob.len() as u64, SEARCH_STATE_BYTES);
    }

    #[test]
    fn test_round_trip_restores_keys_and_entries() {
        let mut eng = Engine::new();
        eng.set_zobrist_key(KeyRow::Ban, 7, 0x0123_4567_89AB_CDEF)
            .unwrap();
        let hash = 0x9E37_79B9_7F4A_7C15;
        eng.tt.store(hash, Flag::LowerBound, -123);

        let mut blob = Vec::new();
        eng.save_search_state(&mut blob).unwrap();

        let mut restored = Engine::new();
        restored.set_zobrist_key(KeyRow::Ban, 7, 0).unwrap();
        restored.clear_tt();
        restored
            .load_search_state(&mut Cursor::new(&blob))
            .unwrap();

        assert_eq!(restored.zobrist.ban(7), 0x0123_4567_89AB_CDEF);
        assert_eq!(restored.zobrist.pick(Team::A, 0), eng.zobrist.pick(Team::A, 0));
        assert_eq!(restored.tt.probe(hash), Some((Flag::LowerBound, -123)));
    }

    #[test]
    fn test_short_blob_fails_to_load() {
        let eng = Engine::new();
        let mut blob = Vec::new();
        eng.save_search_state(&mut blob).unwrap();
        blob.truncate(blob.len() - 1);

        let mut restored = Engine::new();
        let result = restored.load_search_state(&mut Cursor::new(&blob));
        assert!(matches!(result, Err(DraftError::Io(_))));
    }
}
