//! Emoticon lexicon and emoji recognition
//!
//! Emoticons are case- and punctuation-sensitive, so they are matched as
//! whole whitespace-delimited tokens against a configured lexicon and exempted
//! from every destructive stage. Emoji are recognized by code-point range.
//! An optional replacement table rewrites selected emoji into stable affect
//! tokens, mirroring the replacement table of the original cleaner.

use crate::clean::error::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

/// Emoticons recognized out of the box.
pub const DEFAULT_EMOTICONS: &[&str] = &[
    ":)", ":-)", ":(", ":-(", ":D", ":-D", ":P", ":-P", ";)", ";-)", ":/", ":-/", ":'(", ":o",
    ":O", "xD", "XD", ":3", "<3", "^^", "o_O", "O_o", ":|",
];

/// Emoji to affect-token replacement table, applied only when `map_emoji`
/// is enabled.
pub const DEFAULT_EMOJI_AFFECT: &[(char, &str)] = &[
    ('\u{2764}', "[EMOJI_AFFECTION]"),  // ❤
    ('\u{1F525}', "[EMOJI_INTENSITY]"), // 🔥
    ('\u{1F604}', "[EMOJI_HAPPINESS]"), // 😄
    ('\u{1F600}', "[EMOJI_JOY]"),       // 😀
    ('\u{1F44D}', "[EMOJI_APPROVAL]"),  // 👍
    ('\u{1F44F}', "[EMOJI_ACKNOWLEDGMENT]"), // 👏
    ('\u{1F60E}', "[EMOJI_COOL]"),      // 😎
    ('\u{1F62D}', "[EMOJI_SADNESS]"),   // 😭
    ('\u{1F622}', "[EMOJI_TEAR]"),      // 😢
    ('\u{1F4AA}', "[EMOJI_STRENGTH]"),  // 💪
    ('\u{1F4AF}', "[EMOJI_PERFECTION]"), // 💯
    ('\u{2728}', "[EMOJI_EXCITEMENT]"), // ✨
    ('\u{1F494}', "[EMOJI_HEARTBREAK]"), // 💔
    ('\u{1F929}', "[EMOJI_ADORATION]"), // 🤩
    ('\u{1F440}', "[EMOJI_ATTENTION]"), // 👀
    ('\u{1F609}', "[EMOJI_FLIRTATION]"), // 😉
    ('\u{1F60A}', "[EMOJI_EMBARRASSMENT]"), // 😊
    ('\u{270C}', "[EMOJI_PEACE]"),      // ✌
    ('\u{1F47D}', "[EMOJI_WEIRDNESS]"), // 👽
    ('\u{2600}', "[EMOJI_POSITIVITY]"), // ☀
    ('\u{1F30D}', "[EMOJI_GLOBAL]"),    // 🌍
    ('\u{1F3C6}', "[EMOJI_ACHIEVEMENT]"), // 🏆
    ('\u{1F47B}', "[EMOJI_SPOOKY]"),    // 👻
    ('\u{1F916}', "[EMOJI_TECHNOLOGY]"), // 🤖
    ('\u{1F308}', "[EMOJI_DIVERSITY]"), // 🌈
    ('\u{1F91F}', "[EMOJI_AFFECTION]"), // 🤟
];

/// True for characters in the recognized emoji code-point ranges.
pub fn is_emoji(c: char) -> bool {
    matches!(u32::from(c),
        0x1F300..=0x1F5FF   // symbols and pictographs
        | 0x1F600..=0x1F64F // emoticon faces
        | 0x1F680..=0x1F6FF // transport and map
        | 0x1F900..=0x1F9FF // supplemental symbols
        | 0x1FA70..=0x1FAFF // extended pictographs
        | 0x1F1E6..=0x1F1FF // regional indicators
        | 0x2600..=0x26FF   // miscellaneous symbols
        | 0x2700..=0x27BF   // dingbats
        | 0x2B00..=0x2BFF   // arrows and stars
        | 0xFE0F            // variation selector
        | 0x200D            // zero-width joiner
    )
}

/// The resolved emoticon lexicon shared by the encoder stage and every
/// destructive stage that must leave emoticons untouched.
#[derive(Debug, Clone)]
pub struct EmoticonLexicon {
    entries: Vec<String>,
    emoji_affect: BTreeMap<char, String>,
    map_emoji: bool,
}

impl EmoticonLexicon {
    /// Build the lexicon from configuration parts.
    ///
    /// `inline` replaces the default entry list when present; `path` points
    /// at a newline-separated lexicon file whose entries are appended.
    /// `#`-prefixed lines and blank lines in the file are skipped.
    pub fn from_parts(
        inline: Option<&[String]>,
        path: Option<&Path>,
        map_emoji: bool,
    ) -> Result<Self, ConfigError> {
        let mut entries: Vec<String> = match inline {
            Some(list) => list.iter().map(|s| s.trim().to_string()).collect(),
            None => DEFAULT_EMOTICONS.iter().map(|s| s.to_string()).collect(),
        };

        if let Some(path) = path {
            let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::InvalidParameter {
                stage: "emoticon_lexicon".into(),
                message: format!("cannot read lexicon file {}: {}", path.display(), err),
            })?;
            entries.extend(
                raw.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string),
            );
        }

        entries.retain(|e| !e.is_empty());
        if entries.iter().any(|e| e.chars().any(char::is_whitespace)) {
            return Err(ConfigError::InvalidParameter {
                stage: "emoticon_lexicon".into(),
                message: "lexicon entries must not contain whitespace".into(),
            });
        }
        entries.sort();
        entries.dedup();

        Ok(EmoticonLexicon {
            entries,
            emoji_affect: DEFAULT_EMOJI_AFFECT
                .iter()
                .map(|(c, tok)| (*c, tok.to_string()))
                .collect(),
            map_emoji,
        })
    }

    /// The default lexicon with emoji mapping disabled.
    pub fn default_lexicon() -> Self {
        Self::from_parts(None, None, false).expect("default lexicon is valid")
    }

    pub fn is_emoticon_token(&self, token: &str) -> bool {
        self.entries.binary_search_by(|e| e.as_str().cmp(token)).is_ok()
    }

    pub fn map_emoji(&self) -> bool {
        self.map_emoji
    }

    /// Affect token for an emoji character, when mapping is enabled and the
    /// character is in the table.
    pub fn emoji_replacement(&self, c: char) -> Option<&str> {
        if !self.map_emoji {
            return None;
        }
        self.emoji_affect.get(&c).map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
