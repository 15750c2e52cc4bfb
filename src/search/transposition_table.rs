use crate::draft_repr::{Team, MAX_HEROES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

/// Zobrist keys for draft states
///
/// Three rows of random 64-bit values: heroes picked by team A, heroes
/// picked by team B, and banned heroes. A state's hash is the XOR of
/// the keys for every selection on the path to it. Bans hash through
/// the ban row no matter which team banned, so equivalent ban orders
/// collapse to one hash.
pub struct ZobristKeys {
    /// [row][hero] - rows indexed by KeyRow
    keys: [[u64; MAX_HEROES]; 3],
}

/// Key row selector: which kind of selection a key encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRow {
    A = 0,
    B = 1,
    Ban = 2,
}

impl ZobristKeys {
    /// Generate keys from a seeded random number generator so the
    /// table is random but reproducible across runs.
    pub fn generate() -> Self {
        let mut rng = StdRng::seed_from_u64(0x2b7e_1516_28ae_d2a6);

        let mut keys = [[0u64; MAX_HEROES]; 3];
        for row in &mut keys {
            for key in row.iter_mut() {
                *key = rng.gen();
            }
        }

        Self { keys }
    }

    /// Key for `hero` being picked by `team`.
    #[inline(always)]
    pub fn pick(&self, team: Team, hero: usize) -> u64 {
        let row = match team {
            Team::A => KeyRow::A,
            Team::B => KeyRow::B,
        };
        self.keys[row as usize][hero]
    }

    /// Key for `hero` being banned by either team.
    #[inline(always)]
    pub fn ban(&self, hero: usize) -> u64 {
        self.keys[KeyRow::Ban as usize][hero]
    }

    /// Replace one key. Drivers that persist search state across
    /// processes install their saved keys through this.
    pub fn set(&mut self, row: KeyRow, hero: usize, key: u64) {
        self.keys[row as usize][hero] = key;
    }

    pub(crate) fn row(&self, row: KeyRow) -> &[u64; MAX_HEROES] {
        &self.keys[row as usize]
    }

    pub(crate) fn row_mut(&mut self, row: KeyRow) -> &mut [u64; MAX_HEROES] {
        &mut self.keys[row as usize]
    }
}

/// Number of entries in the transposition table.
pub const TT_ENTRIES: usize = 1 << 20;

/// Low bits of the hash that index the table; the rest form the tag.
const TT_IDX_MASK: u64 = TT_ENTRIES as u64 - 1;
const TT_TAG_SHIFT: u32 = 20;

/// Deepest stage whose results are cached. Nodes below this are too
/// numerous and too cheap for caching to pay for the evictions it
/// causes.
pub const MAX_TT_STAGE: usize = 7;

/// Bound kind of a stored value relative to the search window
///
/// - Exact: the position was fully searched inside the window
/// - LowerBound: a beta cutoff occurred; the true value is at least this
/// - UpperBound: every move failed low; the true value is at most this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Exact = 0,
    LowerBound = 1,
    UpperBound = 2,
}

/// Transposition table with packed lock-free entries
///
/// A fixed array of 2^20 entries, each one u64 packing
/// `{tag: 46 bits, flag: 2 bits, value: 16 bits signed}`. Entries are
/// read and written with single atomic loads and stores, so concurrent
/// root workers share results without locks; a torn or foreign entry
/// cannot be mistaken for a hit because its tag will not match the
/// probing hash. Replacement is always-replace.
pub struct TranspositionTable {
    entries: Box<[AtomicU64]>,
}

impl TranspositionTable {
    /// Allocate the table once, all entries empty.
    pub fn new() -> Self {
        let entries = (0..TT_ENTRIES).map(|_| AtomicU64::new(0)).collect();
        Self { entries }
    }

    #[inline(always)]
    fn pack(hash: u64, flag: Flag, value: i32) -> u64 {
        debug_assert!(i16::try_from(value).is_ok());
        ((hash >> TT_TAG_SHIFT) << 18) | ((flag as u64) << 16) | (value as i16 as u16 as u64)
    }

    /// Look up `hash`. Returns the stored flag and value when the
    /// entry's tag matches the upper bits of `hash`, otherwise None.
    #[inline]
    pub fn probe(&self, hash: u64) -> Option<(Flag, i32)> {
        let entry = self.entries[(hash & TT_IDX_MASK) as usize].load(Ordering::Relaxed);
        if entry >> 18 != hash >> TT_TAG_SHIFT {
            return None;
        }

        let flag = match (entry >> 16) & 0b11 {
            0 => Flag::Exact,
            1 => Flag::LowerBound,
            _ => Flag::UpperBound,
        };
        Some((flag, entry as u16 as i16 as i32))
    }

    /// Store `value` for `hash`, unconditionally replacing whatever
    /// occupied the slot.
    #[inline]
    pub fn store(&self, hash: u64, flag: Flag, value: i32) {
        self.entries[(hash & TT_IDX_MASK) as usize]
            .store(Self::pack(hash, flag, value), Ordering::Relaxed);
    }

    /// Empty every slot. Required whenever rewards or Zobrist keys
    /// change, since stored values are only meaningful against the
    /// tables they were computed from.
    pub fn clear(&self) {
        for entry in self.entries.iter() {
            entry.store(0, Ordering::Relaxed);
        }
    }

    pub(crate) fn entries(&self) -> &[AtomicU64] {
        &self.entries
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
