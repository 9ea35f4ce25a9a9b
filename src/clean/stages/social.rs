//! Social-media normalization stages
//!
//! Mentions, hashtags, shorthand slang, and Unicode compatibility forms all
//! carry their signal in ways the destructive stages would mangle. These
//! stages rewrite them early: mentions become an anonymized canonical token,
//! camel-case hashtags are split into words while capitalization still
//! exists, and shorthand is expanded before case folding.

use crate::clean::stage::{Outcome, Stage, WorkRecord};
use crate::clean::protect::token_spans;
use crate::clean::record::MarkerKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").unwrap());
static CAMEL_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]+").unwrap());

/// Replace `@handle` with the `[MENTION]` token and count it.
pub struct MentionEncoder;

impl MentionEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MentionEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for MentionEncoder {
    fn name(&self) -> &'static str {
        "mention"
    }

    fn description(&self) -> &'static str {
        "Replace @handles with [MENTION] and count MENTION"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let mut count = 0u32;
        let text = MENTION_RE
            .replace_all(&record.text, |_: &regex::Captures<'_>| {
                count += 1;
                "[MENTION]"
            })
            .into_owned();
        record.bump(MarkerKind::Mention, count);
        record.text = text;
        Outcome::Next(record)
    }
}

/// Split camel-case hashtags into words and count them.
///
/// `#CrazyDay` becomes `Crazy Day`; a hashtag with no internal capitals
/// keeps its term as-is, minus the `#`. Runs before case folding because
/// the split keys off capital letters.
pub struct HashtagSplit;

impl HashtagSplit {
    pub fn new() -> Self {
        Self
    }

    fn split_term(term: &str) -> String {
        let spaced = CAMEL_WORD_RE
            .replace_all(term, |caps: &regex::Captures<'_>| format!(" {}", &caps[0]));
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for HashtagSplit {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for HashtagSplit {
    fn name(&self) -> &'static str {
        "hashtag"
    }

    fn description(&self) -> &'static str {
        "Split camel-case hashtags into words and count HASHTAG"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let mut count = 0u32;
        let text = HASHTAG_RE
            .replace_all(&record.text, |caps: &regex::Captures<'_>| {
                count += 1;
                Self::split_term(&caps[0][1..])
            })
            .into_owned();
        record.bump(MarkerKind::Hashtag, count);
        record.text = text;
        Outcome::Next(record)
    }
}

/// Expand whole-token social-media shorthand from a configured table.
///
/// Lookup is exact and case-sensitive, so `U` survives until case folding
/// while `u` expands to `you`. Declared after `repeated_letter` so emphasis
/// runs are encoded before any spelling-correction-like rewriting.
pub struct SlangExpand {
    table: BTreeMap<String, String>,
}

impl SlangExpand {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self { table }
    }

    /// The expansion table of the original cleaner.
    pub fn default_table() -> BTreeMap<String, String> {
        [
            ("u", "you"),
            ("gr8", "great"),
            ("np", "no problem"),
            ("idk", "i do not know"),
            ("imo", "in my opinion"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

impl Stage for SlangExpand {
    fn name(&self) -> &'static str {
        "slang"
    }

    fn description(&self) -> &'static str {
        "Expand whole-token social-media shorthand from a configured table"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let text = &record.text;
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in token_spans(text) {
            out.push_str(&text[cursor..span.start]);
            let token = &text[span.clone()];
            match self.table.get(token) {
                Some(expansion) => out.push_str(expansion),
                None => out.push_str(token),
            }
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        record.text = out;
        Outcome::Next(record)
    }
}

/// NFKC-normalize the text so compatibility characters (fullwidth forms,
/// ligatures) match the patterns the other stages declare.
pub struct NfkcNormalize;

impl NfkcNormalize {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NfkcNormalize {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for NfkcNormalize {
    fn name(&self) -> &'static str {
        "unicode_nfkc"
    }

    fn description(&self) -> &'static str {
        "Apply Unicode NFKC normalization"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        record.text = record.text.nfkc().collect();
        Outcome::Next(record)
    }
}
