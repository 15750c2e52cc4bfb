// Draft representation
//
// Heroes are numbered by reward potential, with a distinct index for
// each role a hero can play. Teams and legal pools are u64 bitsets over
// those indices, so applying a selection is a handful of AND/OR ops and
// testing membership is a single mask.

mod bitsets;
mod lineup;
mod rewards;

pub use bitsets::*;
pub use lineup::*;
pub use rewards::*;

/// Hard limit imposed by the 64-bit team/legality encoding.
pub const MAX_HEROES: usize = 64;
pub const MAX_SYNERGIES: usize = 50;
pub const MAX_COUNTERS: usize = 50;
pub const MAX_DRAFT_LEN: usize = 24;

/// Sentinel value strictly outside any reachable score.
pub const INF: i32 = 30_000;

/// The two drafting sides. Reward values and Zobrist pick keys are
/// stored per side; search values are signed from A's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn opposite(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// What a stage of the draft lets the selecting team do. Double
/// selections occupy two stage slots but are searched as one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Pick,
    Ban,
    PickPick,
    PickBan,
    BanPick,
    BanBan,
}

impl Selection {
    /// Number of stage slots this selection advances the draft by.
    pub fn slots(&self) -> usize {
        match self {
            Self::Pick | Self::Ban => 1,
            _ => 2,
        }
    }

    pub fn is_double(&self) -> bool {
        self.slots() == 2
    }
}

/// One entry of the draft schedule: who selects and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftStage {
    pub team: Team,
    pub selection: Selection,
}

impl Default for DraftStage {
    fn default() -> Self {
        Self {
            team: Team::A,
            selection: Selection::Pick,
        }
    }
}

/// Per-index legality masks, precomputed by the driver's preprocessor.
///
/// `diff_role_and_h` is the complement of every index sharing this
/// index's role or underlying hero; ANDed into the selecting team's
/// pool after a pick it retires the filled role and all role variants
/// of the picked hero. `diff_h` is the complement of the underlying
/// hero's variants only, applied to the other pools after any pick or
/// to both pools after a ban.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroInfo {
    pub diff_role_and_h: u64,
    pub diff_h: u64,
}

impl Default for HeroInfo {
    fn default() -> Self {
        // complements of the empty union: nothing becomes illegal
        Self {
            diff_role_and_h: !0,
            diff_h: !0,
        }
    }
}
