//! Protected spans
//!
//! Marker encoders rewrite signal into bracketed canonical tokens, and
//! emoticons/emoji must survive cleaning byte-for-byte. Every destructive
//! stage therefore consults one shared scanner that marks the byte ranges no
//! stage may modify: canonical tags, lexicon emoticon tokens, and emoji.

use crate::clean::lexicon::{is_emoji, EmoticonLexicon};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Canonical marker tokens: `[EMPH]`, `[CAPS]`, `[MENTION]`, `[X3]`,
/// `[EMOJI_AFFECTION]`, ...
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[A-Z][A-Z0-9_]*\]").unwrap());

/// Punctuation in the marker sense: neither alphanumeric nor whitespace.
pub fn is_punct_char(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Byte spans of whitespace-delimited tokens.
pub fn token_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push(s..i);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}

/// Sorted, merged set of byte ranges that destructive stages must skip.
#[derive(Debug, Clone, Default)]
pub struct ProtectedSpans {
    spans: Vec<Range<usize>>,
}

impl ProtectedSpans {
    /// Scan a text for canonical tags, lexicon emoticon tokens, and emoji.
    pub fn scan(text: &str, lexicon: &EmoticonLexicon) -> Self {
        let mut spans: Vec<Range<usize>> = Vec::new();

        for m in TAG_RE.find_iter(text) {
            spans.push(m.start()..m.end());
        }

        for span in token_spans(text) {
            if lexicon.is_emoticon_token(&text[span.clone()]) {
                spans.push(span);
            }
        }

        for (i, c) in text.char_indices() {
            if is_emoji(c) {
                spans.push(i..i + c.len_utf8());
            }
        }

        spans.sort_by_key(|r| (r.start, r.end));
        let mut merged: Vec<Range<usize>> = Vec::new();
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }

        ProtectedSpans { spans: merged }
    }

    /// Extend the protected set with an extra range, keeping spans merged.
    pub fn add(&mut self, span: Range<usize>) {
        self.spans.push(span);
        self.spans.sort_by_key(|r| (r.start, r.end));
        let mut merged: Vec<Range<usize>> = Vec::new();
        for span in self.spans.drain(..) {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => {
                    last.end = last.end.max(span.end);
                }
                _ => merged.push(span),
            }
        }
        self.spans = merged;
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// True when the given range intersects any protected span.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.spans
            .iter()
            .any(|s| s.start < range.end && range.start < s.end)
    }

    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }
}

/// Rebuild `text`, copying protected spans verbatim and passing each
/// unprotected segment to `f` to append its replacement onto the output.
pub fn rewrite_unprotected<F>(text: &str, protected: &ProtectedSpans, mut f: F) -> String
where
    F: FnMut(&str, &mut String),
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in protected.spans() {
        if cursor < span.start {
            f(&text[cursor..span.start], &mut out);
        }
        out.push_str(&text[span.clone()]);
        cursor = span.end;
    }
    if cursor < text.len() {
        f(&text[cursor..], &mut out);
    }
    out
}
