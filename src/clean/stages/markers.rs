//! Marker encoder stages
//!
//! These stages detect psycholinguistic patterns that a later destructive
//! stage would erase, rewrite them into stable canonical tokens, and count
//! them in the record's marker side channel. Every encoder runs before the
//! stage that would destroy its input pattern; the registry's constraint
//! sets enforce that at pipeline construction.
//!
//! Canonical forms:
//! - repeated-letter emphasis: `soooo` becomes `so[EMPH]`
//! - shouted words: `HAPPY` becomes `HAPPY[CAPS]` (case folding later
//!   lowers the word but not the tag)
//! - repeated punctuation: `!!!` becomes `!![X3]`
//! - emoticons and emoji are counted and left untouched

use crate::clean::lexicon::{is_emoji, EmoticonLexicon};
use crate::clean::protect::{is_punct_char, rewrite_unprotected, token_spans, ProtectedSpans};
use crate::clean::record::MarkerKind;
use crate::clean::stage::{Outcome, Stage, WorkRecord};
use std::sync::Arc;

/// Tag shouted words before case folding erases them.
pub struct AllcapsEncoder {
    min_token_length: usize,
    lexicon: Arc<EmoticonLexicon>,
}

impl AllcapsEncoder {
    pub fn new(min_token_length: usize, lexicon: Arc<EmoticonLexicon>) -> Self {
        Self {
            min_token_length,
            lexicon,
        }
    }

    /// The shouted core of a token: non-alphanumeric edges trimmed, and the
    /// remainder only qualifies when it is entirely alphabetic, entirely
    /// uppercase, and long enough. All-punctuation and all-digit tokens are
    /// never candidates.
    fn shouted_core(&self, token: &str) -> Option<std::ops::Range<usize>> {
        let mut start = 0;
        let mut end = token.len();
        for (i, c) in token.char_indices() {
            if is_punct_char(c) {
                start = i + c.len_utf8();
            } else {
                start = i;
                break;
            }
        }
        for (i, c) in token.char_indices().rev() {
            if i < start {
                return None;
            }
            if is_punct_char(c) {
                end = i;
            } else {
                break;
            }
        }
        if start >= end {
            return None;
        }
        let core = &token[start..end];
        let long_enough = core.chars().count() >= self.min_token_length;
        if long_enough
            && core.chars().all(char::is_alphabetic)
            && core.chars().all(char::is_uppercase)
        {
            Some(start..end)
        } else {
            None
        }
    }
}

impl Stage for AllcapsEncoder {
    fn name(&self) -> &'static str {
        "allcaps_marker"
    }

    fn description(&self) -> &'static str {
        "Tag fully-uppercase words with [CAPS] and count ALLCAPS_WORD"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let protected = ProtectedSpans::scan(&record.text, &self.lexicon);
        let mut insertions: Vec<usize> = Vec::new();
        for span in token_spans(&record.text) {
            if protected.overlaps(&span) {
                continue;
            }
            if let Some(core) = self.shouted_core(&record.text[span.clone()]) {
                insertions.push(span.start + core.end);
            }
        }
        if insertions.is_empty() {
            return Outcome::Next(record);
        }

        let mut out = String::with_capacity(record.text.len() + insertions.len() * 6);
        let mut cursor = 0;
        for at in &insertions {
            out.push_str(&record.text[cursor..*at]);
            out.push_str("[CAPS]");
            cursor = *at;
        }
        out.push_str(&record.text[cursor..]);

        record.bump(MarkerKind::AllcapsWord, insertions.len() as u32);
        record.text = out;
        Outcome::Next(record)
    }
}

/// Collapse repeated-letter emphasis runs to one letter plus `[EMPH]`.
pub struct RepeatedLetterEncoder {
    min_run_length: usize,
    lexicon: Arc<EmoticonLexicon>,
}

impl RepeatedLetterEncoder {
    pub fn new(min_run_length: usize, lexicon: Arc<EmoticonLexicon>) -> Self {
        Self {
            min_run_length,
            lexicon,
        }
    }
}

impl Stage for RepeatedLetterEncoder {
    fn name(&self) -> &'static str {
        "repeated_letter"
    }

    fn description(&self) -> &'static str {
        "Collapse letter runs to one copy plus [EMPH] and count REPEATED_LETTER"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let protected = ProtectedSpans::scan(&record.text, &self.lexicon);
        let mut count = 0u32;
        let text = rewrite_unprotected(&record.text, &protected, |seg, out| {
            let chars: Vec<char> = seg.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                let c = chars[i];
                let mut j = i + 1;
                while j < chars.len() && chars[j] == c {
                    j += 1;
                }
                if c.is_alphabetic() && j - i >= self.min_run_length {
                    out.push(c);
                    out.push_str("[EMPH]");
                    count += 1;
                } else {
                    for _ in i..j {
                        out.push(c);
                    }
                }
                i = j;
            }
        });
        record.bump(MarkerKind::RepeatedLetter, count);
        record.text = text;
        Outcome::Next(record)
    }
}

/// Count emoticons and emoji; optionally rewrite table emoji into affect
/// tokens. Lexicon emoticons are always left untouched.
pub struct EmoticonEncoder {
    lexicon: Arc<EmoticonLexicon>,
}

impl EmoticonEncoder {
    pub fn new(lexicon: Arc<EmoticonLexicon>) -> Self {
        Self { lexicon }
    }
}

impl Stage for EmoticonEncoder {
    fn name(&self) -> &'static str {
        "emoticon_lexicon"
    }

    fn description(&self) -> &'static str {
        "Count emoticons and emoji under EMOTICON, leaving them untouched"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let mut count = 0u32;
        for span in token_spans(&record.text) {
            if self.lexicon.is_emoticon_token(&record.text[span]) {
                count += 1;
            }
        }

        // Joiners and variation selectors are protected but are not
        // emoticons of their own.
        let counts_as_emoji =
            |c: char| is_emoji(c) && !matches!(c, '\u{FE0F}' | '\u{200D}');

        if self.lexicon.map_emoji() {
            let mut out = String::with_capacity(record.text.len());
            for c in record.text.chars() {
                if counts_as_emoji(c) {
                    count += 1;
                }
                match self.lexicon.emoji_replacement(c) {
                    Some(token) => out.push_str(token),
                    None => out.push(c),
                }
            }
            record.text = out;
        } else {
            count += record.text.chars().filter(|c| counts_as_emoji(*c)).count() as u32;
        }

        record.bump(MarkerKind::Emoticon, count);
        Outcome::Next(record)
    }
}

/// Collapse repeated punctuation to its two-character canonical form plus a
/// `[XN]` count tag.
pub struct RepeatPunctEncoder {
    min_run_length: usize,
    lexicon: Arc<EmoticonLexicon>,
}

impl RepeatPunctEncoder {
    pub fn new(min_run_length: usize, lexicon: Arc<EmoticonLexicon>) -> Self {
        Self {
            min_run_length,
            lexicon,
        }
    }
}

impl Stage for RepeatPunctEncoder {
    fn name(&self) -> &'static str {
        "repeat_punct"
    }

    fn description(&self) -> &'static str {
        "Collapse punctuation runs to two characters plus [XN] and count REPEAT_PUNCT"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let protected = ProtectedSpans::scan(&record.text, &self.lexicon);
        let mut count = 0u32;
        let text = rewrite_unprotected(&record.text, &protected, |seg, out| {
            let chars: Vec<char> = seg.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                let c = chars[i];
                let mut j = i + 1;
                while j < chars.len() && chars[j] == c {
                    j += 1;
                }
                let run = j - i;
                if is_punct_char(c) && run >= self.min_run_length {
                    out.push(c);
                    out.push(c);
                    out.push_str(&format!("[X{}]", run));
                    count += 1;
                } else {
                    for _ in i..j {
                        out.push(c);
                    }
                }
                i = j;
            }
        });
        record.bump(MarkerKind::RepeatPunct, count);
        record.text = text;
        Outcome::Next(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::record::Record;

    fn lexicon() -> Arc<EmoticonLexicon> {
        Arc::new(EmoticonLexicon::default_lexicon())
    }

    fn apply(stage: &dyn Stage, text: &str) -> WorkRecord {
        match stage.apply(WorkRecord::from_record(&Record::new("t", text))) {
            Outcome::Next(record) => record,
            Outcome::Drop(..) => panic!("marker stages never drop"),
        }
    }

    #[test]
    fn test_allcaps_tags_and_counts() {
        let stage = AllcapsEncoder::new(2, lexicon());
        let record = apply(&stage, "I AM SO HAPPY");
        assert_eq!(record.text, "I AM[CAPS] SO[CAPS] HAPPY[CAPS]");
        assert_eq!(record.markers[&MarkerKind::AllcapsWord], 3);
    }

    #[test]
    fn test_allcaps_trims_edge_punctuation() {
        let stage = AllcapsEncoder::new(2, lexicon());
        let record = apply(&stage, "HAPPY!!!");
        assert_eq!(record.text, "HAPPY[CAPS]!!!");
        assert_eq!(record.markers[&MarkerKind::AllcapsWord], 1);
    }

    #[test]
    fn test_allcaps_skips_short_mixed_and_digit_tokens() {
        let stage = AllcapsEncoder::new(2, lexicon());
        let record = apply(&stage, "I Mixed AB3 1234 !!!");
        assert_eq!(record.text, "I Mixed AB3 1234 !!!");
        assert!(record.markers.is_empty());
    }

    #[test]
    fn test_allcaps_skips_marker_tokens_and_emoticons() {
        let stage = AllcapsEncoder::new(2, lexicon());
        let record = apply(&stage, "[MENTION] said XD loudly");
        assert_eq!(record.text, "[MENTION] said XD loudly");
        assert!(record.markers.is_empty());
    }

    #[test]
    fn test_repeated_letter_collapses_run() {
        let stage = RepeatedLetterEncoder::new(3, lexicon());
        let record = apply(&stage, "soooo happy");
        assert_eq!(record.text, "so[EMPH] happy");
        assert_eq!(record.markers[&MarkerKind::RepeatedLetter], 1);
    }

    #[test]
    fn test_repeated_letter_threshold() {
        let stage = RepeatedLetterEncoder::new(3, lexicon());
        let record = apply(&stage, "good cool");
        assert_eq!(record.text, "good cool");
        assert!(record.markers.is_empty());
    }

    #[test]
    fn test_repeated_letter_ignores_punctuation_runs() {
        let stage = RepeatedLetterEncoder::new(3, lexicon());
        let record = apply(&stage, "wait!!!");
        assert_eq!(record.text, "wait!!!");
        assert!(record.markers.is_empty());
    }

    #[test]
    fn test_repeated_letter_counts_multiple_runs() {
        let stage = RepeatedLetterEncoder::new(3, lexicon());
        let record = apply(&stage, "yaaaay nooooo");
        assert_eq!(record.text, "ya[EMPH]y no[EMPH]");
        assert_eq!(record.markers[&MarkerKind::RepeatedLetter], 2);
    }

    #[test]
    fn test_emoticon_counts_tokens() {
        let stage = EmoticonEncoder::new(lexicon());
        let record = apply(&stage, "fun :) :) xD");
        assert_eq!(record.text, "fun :) :) xD");
        assert_eq!(record.markers[&MarkerKind::Emoticon], 3);
    }

    #[test]
    fn test_emoticon_counts_emoji_without_rewriting() {
        let stage = EmoticonEncoder::new(lexicon());
        let record = apply(&stage, "on fire 🔥🔥");
        assert_eq!(record.text, "on fire 🔥🔥");
        assert_eq!(record.markers[&MarkerKind::Emoticon], 2);
    }

    #[test]
    fn test_emoticon_maps_emoji_when_enabled() {
        let mapping = Arc::new(EmoticonLexicon::from_parts(None, None, true).unwrap());
        let stage = EmoticonEncoder::new(mapping);
        let record = apply(&stage, "on fire 🔥");
        assert_eq!(record.text, "on fire [EMOJI_INTENSITY]");
        assert_eq!(record.markers[&MarkerKind::Emoticon], 1);
    }

    #[test]
    fn test_repeat_punct_canonical_form() {
        let stage = RepeatPunctEncoder::new(2, lexicon());
        let record = apply(&stage, "what!!! really...");
        assert_eq!(record.text, "what!![X3] really..[X3]");
        assert_eq!(record.markers[&MarkerKind::RepeatPunct], 2);
    }

    #[test]
    fn test_repeat_punct_run_of_two() {
        let stage = RepeatPunctEncoder::new(2, lexicon());
        let record = apply(&stage, "no?? way");
        assert_eq!(record.text, "no??[X2] way");
        assert_eq!(record.markers[&MarkerKind::RepeatPunct], 1);
    }

    #[test]
    fn test_repeat_punct_leaves_single_punctuation() {
        let stage = RepeatPunctEncoder::new(2, lexicon());
        let record = apply(&stage, "done. sure!");
        assert_eq!(record.text, "done. sure!");
        assert!(record.markers.is_empty());
    }

    #[test]
    fn test_repeat_punct_spares_emoticons() {
        // ":((" is not in the lexicon, but ":(" is; the token ":((" is not
        // protected so its parenthesis run may collapse, while a bare ":("
        // token survives.
        let stage = RepeatPunctEncoder::new(2, lexicon());
        let record = apply(&stage, "sad :( end");
        assert_eq!(record.text, "sad :( end");
        assert!(record.markers.is_empty());
    }

    #[test]
    fn test_encoders_are_total_on_empty_and_whitespace() {
        for text in ["", "   ", "\n\t"] {
            let record = apply(&AllcapsEncoder::new(2, lexicon()), text);
            assert_eq!(record.text, text);
            let record = apply(&RepeatedLetterEncoder::new(3, lexicon()), text);
            assert_eq!(record.text, text);
            let record = apply(&RepeatPunctEncoder::new(2, lexicon()), text);
            assert_eq!(record.text, text);
        }
    }
}
