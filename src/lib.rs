//! # psyclean
//!
//! Signal-preserving text cleaning for personality-classification datasets.
//!
//! Raw social-media text is cleaned through a configurable pipeline of pure
//! stages: noise removal (markup, URLs, boilerplate), marker encoding
//! (emphasis runs, shouted words, emoticons, repeated punctuation), and a
//! final normalization pass. Stage ordering is declarative and validated at
//! pipeline construction, so a marker is always encoded before the stage
//! that would erase it runs.
//!
//! See the [clean] module for the architecture overview.

pub mod clean;

pub use clean::config::{CleanConfig, Loader};
pub use clean::pipeline::{Pipeline, Summary};
pub use clean::record::{CleanedRecord, MarkerKind, Record};
