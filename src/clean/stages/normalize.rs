//! Normalization stages
//!
//! The final destructive pass. Case folding and punctuation stripping both
//! consult the protected-span scanner so canonical marker tokens, emoticons,
//! and emoji survive byte-for-byte; everything the marker encoders did not
//! protect is fair game. The empty-result policy lives here too: a record
//! whose text is empty or whitespace-only after cleaning is dropped, with
//! its markers still reported for diagnostics.

use crate::clean::lexicon::EmoticonLexicon;
use crate::clean::protect::{is_punct_char, rewrite_unprotected, ProtectedSpans};
use crate::clean::stage::{Outcome, Stage, WorkRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static X_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[X[0-9]+\]").unwrap());
static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Lowercase everything outside protected spans.
pub struct CaseFold {
    lexicon: Arc<EmoticonLexicon>,
}

impl CaseFold {
    pub fn new(lexicon: Arc<EmoticonLexicon>) -> Self {
        Self { lexicon }
    }
}

impl Stage for CaseFold {
    fn name(&self) -> &'static str {
        "case_fold"
    }

    fn description(&self) -> &'static str {
        "Lowercase text outside canonical tokens, emoticons, and emoji"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let protected = ProtectedSpans::scan(&record.text, &self.lexicon);
        record.text = rewrite_unprotected(&record.text, &protected, |seg, out| {
            out.push_str(&seg.to_lowercase());
        });
        Outcome::Next(record)
    }
}

/// Strip punctuation not protected or encoded by the marker stages.
///
/// The two-character canonical form directly preceding a `[XN]` count tag
/// is treated as part of the encoding and kept. Whitespace artifacts left
/// by the stripping are collapsed in the same pass.
pub struct PunctStrip {
    lexicon: Arc<EmoticonLexicon>,
}

impl PunctStrip {
    pub fn new(lexicon: Arc<EmoticonLexicon>) -> Self {
        Self { lexicon }
    }
}

impl Stage for PunctStrip {
    fn name(&self) -> &'static str {
        "punct_strip"
    }

    fn description(&self) -> &'static str {
        "Remove unprotected punctuation and tidy the whitespace it leaves"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let mut protected = ProtectedSpans::scan(&record.text, &self.lexicon);
        for m in X_TAG_RE.find_iter(&record.text) {
            let mut rev = record.text[..m.start()].chars().rev();
            if let (Some(last), Some(prev)) = (rev.next(), rev.next()) {
                if last == prev && is_punct_char(last) {
                    let start = m.start() - last.len_utf8() - prev.len_utf8();
                    protected.add(start..m.start());
                }
            }
        }

        let stripped = rewrite_unprotected(&record.text, &protected, |seg, out| {
            for c in seg.chars() {
                if !is_punct_char(c) {
                    out.push(c);
                }
            }
        });
        record.text = WS_RUN_RE.replace_all(&stripped, " ").trim().to_string();
        Outcome::Next(record)
    }
}

/// Drop records whose text is empty or whitespace-only after cleaning.
pub struct DropEmpty;

impl DropEmpty {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DropEmpty {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for DropEmpty {
    fn name(&self) -> &'static str {
        "drop_empty"
    }

    fn description(&self) -> &'static str {
        "Drop records that are empty or whitespace-only after cleaning"
    }

    fn apply(&self, record: WorkRecord) -> Outcome {
        if record.text.trim().is_empty() {
            Outcome::Drop(record, "empty after cleaning".into())
        } else {
            Outcome::Next(record)
        }
    }
}
