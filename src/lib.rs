pub mod draft_repr;
pub mod engine;
pub mod errors;
pub mod persistence;
pub mod search;

pub use draft_repr::{Selection, Team, INF, MAX_DRAFT_LEN, MAX_HEROES};
pub use engine::Engine;
pub use errors::DraftError;
pub use persistence::SEARCH_STATE_BYTES;
pub use search::{BestMove, KeyRow, SearchResult};
