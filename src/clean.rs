//! Signal-preserving text cleaning
//!
//! Social-media text destined for personality classifiers cannot be cleaned
//! naively: lowercasing, stripping punctuation, and collapsing repeated
//! characters destroy exactly the psycholinguistic markers (shouting,
//! emphasis runs, emoticons, punctuation rhythm) that correlate with the
//! traits being predicted. This module implements a pipeline of selective,
//! order-sensitive stages that remove noise while rewriting those markers
//! into stable canonical tokens that survive the destructive passes.
//!
//! # Architecture
//!
//! - [`stage`]: the `Stage` trait and the working record threaded through it
//! - [`stages`]: the concrete noise-removal, marker-encoder, social, and
//!   normalization stages
//! - [`registry`]: the table of known stage types with priorities and
//!   built-in ordering constraints
//! - [`ordering`]: constraint resolution (topological order, priority
//!   tie-break)
//! - [`pipeline`]: construction and record/batch application
//! - [`config`]: the declarative configuration surface and its loader
//! - [`lexicon`] / [`protect`]: the emoticon lexicon and the protected-span
//!   scanner destructive stages consult
//! - [`record`] / [`error`]: data model and error taxonomy

pub mod config;
pub mod error;
pub mod lexicon;
pub mod ordering;
pub mod pipeline;
pub mod protect;
pub mod record;
pub mod registry;
pub mod stage;
pub mod stages;

pub use self::config::{CleanConfig, Loader};
pub use self::error::{ConfigError, RecordError};
pub use self::pipeline::{Pipeline, Summary};
pub use self::record::{CleanedRecord, MarkerKind, Record};
