use thiserror::Error;

/// Everything the engine can reject. Setup calls validate their
/// arguments up front and leave the engine unchanged on failure;
/// search-entry validation covers the pieces only visible once all
/// inputs meet (lineup shapes, schedule position).
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("hero index {hero} out of range (num_heroes = {num_heroes})")]
    HeroOutOfRange { hero: usize, num_heroes: usize },

    #[error("{kind} slot {slot} out of range (configured {len})")]
    SlotOutOfRange {
        kind: &'static str,
        slot: usize,
        len: usize,
    },

    #[error("stage index {stage} out of range (draft length {draft_len})")]
    StageOutOfRange { stage: usize, draft_len: usize },

    #[error("{kind} size {requested} exceeds limit {limit}")]
    SizeLimitExceeded {
        kind: &'static str,
        requested: usize,
        limit: usize,
    },

    #[error("draft already complete at stage {stage} (length {draft_len})")]
    DraftComplete { stage: usize, draft_len: usize },

    #[error("a side must provide at least one starting lineup")]
    NoLineups,

    #[error("starting lineups of one side differ in length")]
    LineupMismatch,

    #[error(
        "schedule entries at stages {stage} and {next_stage} select for the same team; \
         consecutive same-team selections must use a double stage"
    )]
    NonAlternatingSchedule { stage: usize, next_stage: usize },

    #[error("search state i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
