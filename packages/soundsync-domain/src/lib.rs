//! Pure recommendation logic: no I/O lives in this crate.

pub mod candidate;
pub mod catalog;
pub mod filters;
pub mod intent;
pub mod ranking;
pub mod song;

pub use candidate::CandidateQuery;
pub use filters::ValidatedFilters;
pub use intent::QueryIntent;
pub use song::{ScoredResult, Song};
