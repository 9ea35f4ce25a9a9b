//! Concrete cleaning stages
//!
//! Grouped by responsibility: noise removal, marker encoding, social-media
//! normalization, and the final destructive pass. Each stage implements the
//! [`Stage`](crate::clean::stage::Stage) trait; ordering requirements live
//! in the [registry](crate::clean::registry).

pub mod markers;
pub mod noise;
pub mod normalize;
pub mod social;

pub use markers::{AllcapsEncoder, EmoticonEncoder, RepeatPunctEncoder, RepeatedLetterEncoder};
pub use noise::{BoilerplateStrip, HtmlStrip, UrlRemoval, WhitespaceCollapse};
pub use normalize::{CaseFold, DropEmpty, PunctStrip};
pub use social::{HashtagSplit, MentionEncoder, NfkcNormalize, SlangExpand};
