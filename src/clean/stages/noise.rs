//! Noise-removal stages
//!
//! These stages strip content with no linguistic signal value: markup,
//! URLs, platform boilerplate, and duplicate whitespace. Removal is
//! exact-match on declared patterns only; anything ambiguous (bare `www.`
//! without a scheme) is behind a configuration switch, never hardcoded.
//! All of them run before the whitespace-tokenizing stages and before case
//! folding.

use crate::clean::error::ConfigError;
use crate::clean::stage::{Outcome, Stage, WorkRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z][a-zA-Z0-9+.-]*://[^\s]+").unwrap());
static BARE_WWW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bwww\.[^\s]+").unwrap());
static RETWEET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^RT @\w+:\s*").unwrap());
static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&nbsp;", " "),
];

/// Unescape common HTML entities, then remove leftover markup tags.
pub struct HtmlStrip;

impl HtmlStrip {
    pub fn new() -> Self {
        Self
    }

    fn unescape(text: &str) -> String {
        let mut text = text.to_string();
        for (entity, plain) in NAMED_ENTITIES {
            if text.contains(entity) {
                text = text.replace(entity, plain);
            }
        }
        NUMERIC_ENTITY_RE
            .replace_all(&text, |caps: &regex::Captures<'_>| {
                let body = &caps[1];
                let parsed = if let Some(hex) = body.strip_prefix('x') {
                    u32::from_str_radix(hex, 16)
                } else {
                    body.parse::<u32>()
                };
                match parsed.ok().and_then(char::from_u32) {
                    Some(c) => c.to_string(),
                    // Unrepresentable reference: leave the source text alone
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for HtmlStrip {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for HtmlStrip {
    fn name(&self) -> &'static str {
        "html_strip"
    }

    fn description(&self) -> &'static str {
        "Unescape HTML entities and remove markup tags"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let unescaped = Self::unescape(&record.text);
        record.text = TAG_MARKUP_RE.replace_all(&unescaped, "").into_owned();
        Outcome::Next(record)
    }
}

/// Remove `scheme://...` URLs; bare `www.` URLs only when configured.
pub struct UrlRemoval {
    strip_bare_www: bool,
}

impl UrlRemoval {
    pub fn new(strip_bare_www: bool) -> Self {
        Self { strip_bare_www }
    }
}

impl Stage for UrlRemoval {
    fn name(&self) -> &'static str {
        "url_removal"
    }

    fn description(&self) -> &'static str {
        "Remove URLs (scheme://... and, optionally, bare www. hosts)"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let mut text = URL_RE.replace_all(&record.text, "").into_owned();
        if self.strip_bare_www {
            text = BARE_WWW_RE.replace_all(&text, "").into_owned();
        }
        record.text = text;
        Outcome::Next(record)
    }
}

/// Remove platform boilerplate: the retweet prefix plus any configured
/// extra patterns.
#[derive(Debug)]
pub struct BoilerplateStrip {
    patterns: Vec<Regex>,
}

impl BoilerplateStrip {
    /// Compile extra removal patterns. Invalid regexes are a construction
    /// error, surfaced before any record is processed.
    pub fn from_patterns(patterns: &[String]) -> Result<Self, ConfigError> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|err| ConfigError::InvalidParameter {
                    stage: "boilerplate_strip".into(),
                    message: format!("pattern {:?} does not compile: {}", p, err),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns: compiled })
    }
}

impl Stage for BoilerplateStrip {
    fn name(&self) -> &'static str {
        "boilerplate_strip"
    }

    fn description(&self) -> &'static str {
        "Remove platform boilerplate such as RT @user: retweet prefixes"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        let mut text = RETWEET_RE.replace(&record.text, "").into_owned();
        for pattern in &self.patterns {
            text = pattern.replace_all(&text, "").into_owned();
        }
        record.text = text;
        Outcome::Next(record)
    }
}

/// Collapse whitespace runs to a single space and trim the ends.
pub struct WhitespaceCollapse;

impl WhitespaceCollapse {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WhitespaceCollapse {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for WhitespaceCollapse {
    fn name(&self) -> &'static str {
        "whitespace_collapse"
    }

    fn description(&self) -> &'static str {
        "Collapse whitespace runs to a single space and trim the ends"
    }

    fn apply(&self, mut record: WorkRecord) -> Outcome {
        record.text = WS_RUN_RE.replace_all(&record.text, " ").trim().to_string();
        Outcome::Next(record)
    }
}
