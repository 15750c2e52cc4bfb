// Lineup quadruple for flex search.
//
// A hero picked in the real draft may play several roles, each with its
// own index; the team's true composition is then one of several
// lineups. The flex search carries every still-possible lineup of a
// side as a small set of these records.

use smallvec::SmallVec;

/// One possible composition of a side: its team bitset, its remaining
/// legal pool, the A-relative sum of role rewards for its picks so
/// far, and the XOR of Zobrist pick keys for those picks. Bans are
/// tracked separately because they are lineup-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lineup {
    pub team: u64,
    pub legal: u64,
    pub rr_value: i32,
    pub hash: u64,
}

/// Inline-capacity set of lineups. A side with one flex hero of K
/// roles has K lineups; sets beyond the inline capacity spill but
/// never on the single-lineup fast path.
pub type LineupSet = SmallVec<[Lineup; 8]>;

/// Union of the legal pools across a set of lineups; the candidate
/// mask for selections that only need legality in some lineup.
#[inline]
pub fn union_legal(lineups: &[Lineup]) -> u64 {
    lineups.iter().fold(0, |acc, l| acc | l.legal)
}
