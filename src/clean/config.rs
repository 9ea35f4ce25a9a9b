//! Cleaning configuration
//!
//! `defaults/psyclean.default.toml` is embedded into the binary so that docs
//! and runtime behavior stay in sync. Callers layer user files and key
//! overrides on top of those defaults via [`Loader`] before deserializing
//! into [`CleanConfig`]. The configuration is an explicit immutable value:
//! it is validated once, handed to pipeline construction, and never mutated
//! afterwards, so multiple pipelines with different configurations can
//! coexist.

use crate::clean::error::ConfigError;
use crate::clean::stages::social::SlangExpand;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use config::builder::DefaultState;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../../defaults/psyclean.default.toml");

fn enabled_default() -> bool {
    true
}

fn min_token_length_default() -> usize {
    2
}

fn repeated_letter_run_default() -> usize {
    3
}

fn repeat_punct_run_default() -> usize {
    2
}

/// Switch plus optional extra ordering constraints; used by stages without
/// parameters of their own.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Toggle {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Toggle {
    pub fn on() -> Self {
        Toggle {
            enabled: true,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn off() -> Self {
        Toggle {
            enabled: false,
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlRemovalConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Whether a bare `www.` host with no scheme counts as a URL.
    #[serde(default)]
    pub strip_bare_www: bool,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for UrlRemovalConfig {
    fn default() -> Self {
        UrlRemovalConfig {
            enabled: true,
            strip_bare_www: false,
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoilerplateConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Extra removal patterns (regexes) applied after the built-in retweet
    /// prefix.
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for BoilerplateConfig {
    fn default() -> Self {
        BoilerplateConfig {
            enabled: true,
            patterns: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllcapsConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Shortest token that can count as shouting; the default excludes "I".
    #[serde(default = "min_token_length_default")]
    pub min_token_length: usize,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for AllcapsConfig {
    fn default() -> Self {
        AllcapsConfig {
            enabled: true,
            min_token_length: min_token_length_default(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatedLetterConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default = "repeated_letter_run_default")]
    pub min_run_length: usize,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for RepeatedLetterConfig {
    fn default() -> Self {
        RepeatedLetterConfig {
            enabled: true,
            min_run_length: repeated_letter_run_default(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatPunctConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default = "repeat_punct_run_default")]
    pub min_run_length: usize,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for RepeatPunctConfig {
    fn default() -> Self {
        RepeatPunctConfig {
            enabled: true,
            min_run_length: repeat_punct_run_default(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmoticonConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Inline lexicon, replacing the built-in entries when present.
    #[serde(default)]
    pub inline: Option<Vec<String>>,
    /// Newline-separated lexicon file, appended to the entries.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Rewrite table emoji into `[EMOJI_...]` affect tokens.
    #[serde(default)]
    pub map_emoji: bool,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for EmoticonConfig {
    fn default() -> Self {
        EmoticonConfig {
            enabled: true,
            inline: None,
            path: None,
            map_emoji: false,
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlangConfig {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Shorthand expansion table; the built-in table when absent.
    #[serde(default)]
    pub table: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

impl Default for SlangConfig {
    fn default() -> Self {
        SlangConfig {
            enabled: true,
            table: None,
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

impl SlangConfig {
    pub fn resolved_table(&self) -> BTreeMap<String, String> {
        self.table
            .clone()
            .unwrap_or_else(SlangExpand::default_table)
    }
}

/// Top-level cleaning configuration: one table per stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanConfig {
    pub html_strip: Toggle,
    pub url_removal: UrlRemovalConfig,
    pub boilerplate_strip: BoilerplateConfig,
    pub whitespace_collapse: Toggle,
    pub mention: Toggle,
    pub hashtag: Toggle,
    pub unicode_nfkc: Toggle,
    pub allcaps_marker: AllcapsConfig,
    pub repeated_letter: RepeatedLetterConfig,
    pub emoticon_lexicon: EmoticonConfig,
    pub repeat_punct: RepeatPunctConfig,
    pub slang: SlangConfig,
    pub case_fold: Toggle,
    pub punct_strip: Toggle,
    pub drop_empty: Toggle,
}

impl Default for CleanConfig {
    fn default() -> Self {
        CleanConfig {
            html_strip: Toggle::on(),
            url_removal: UrlRemovalConfig::default(),
            boilerplate_strip: BoilerplateConfig::default(),
            whitespace_collapse: Toggle::on(),
            mention: Toggle::on(),
            hashtag: Toggle::on(),
            unicode_nfkc: Toggle::off(),
            allcaps_marker: AllcapsConfig::default(),
            repeated_letter: RepeatedLetterConfig::default(),
            emoticon_lexicon: EmoticonConfig::default(),
            repeat_punct: RepeatPunctConfig::default(),
            slang: SlangConfig::default(),
            case_fold: Toggle::on(),
            punct_strip: Toggle::off(),
            drop_empty: Toggle::on(),
        }
    }
}

impl CleanConfig {
    /// Parse a YAML rendition of the configuration. Missing tables fall back
    /// to their defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CleanConfig =
            serde_yaml::from_str(source).map_err(|err| ConfigError::Load(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Per-stage activation plus merged user ordering constraints, by
    /// registry name.
    pub fn stage_settings(&self, name: &str) -> Option<(bool, &[String], &[String])> {
        match name {
            "html_strip" => Some((self.html_strip.enabled, &self.html_strip.before, &self.html_strip.after)),
            "url_removal" => Some((self.url_removal.enabled, &self.url_removal.before, &self.url_removal.after)),
            "boilerplate_strip" => Some((
                self.boilerplate_strip.enabled,
                &self.boilerplate_strip.before,
                &self.boilerplate_strip.after,
            )),
            "whitespace_collapse" => Some((
                self.whitespace_collapse.enabled,
                &self.whitespace_collapse.before,
                &self.whitespace_collapse.after,
            )),
            "mention" => Some((self.mention.enabled, &self.mention.before, &self.mention.after)),
            "hashtag" => Some((self.hashtag.enabled, &self.hashtag.before, &self.hashtag.after)),
            "unicode_nfkc" => Some((
                self.unicode_nfkc.enabled,
                &self.unicode_nfkc.before,
                &self.unicode_nfkc.after,
            )),
            "allcaps_marker" => Some((
                self.allcaps_marker.enabled,
                &self.allcaps_marker.before,
                &self.allcaps_marker.after,
            )),
            "repeated_letter" => Some((
                self.repeated_letter.enabled,
                &self.repeated_letter.before,
                &self.repeated_letter.after,
            )),
            "emoticon_lexicon" => Some((
                self.emoticon_lexicon.enabled,
                &self.emoticon_lexicon.before,
                &self.emoticon_lexicon.after,
            )),
            "repeat_punct" => Some((
                self.repeat_punct.enabled,
                &self.repeat_punct.before,
                &self.repeat_punct.after,
            )),
            "slang" => Some((self.slang.enabled, &self.slang.before, &self.slang.after)),
            "case_fold" => Some((self.case_fold.enabled, &self.case_fold.before, &self.case_fold.after)),
            "punct_strip" => Some((self.punct_strip.enabled, &self.punct_strip.before, &self.punct_strip.after)),
            "drop_empty" => Some((self.drop_empty.enabled, &self.drop_empty.before, &self.drop_empty.after)),
            _ => None,
        }
    }

    /// Range-check parameters and compile declared patterns. Called before
    /// any record is processed; nothing here can fail mid-batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeated_letter.min_run_length < 2 {
            return Err(ConfigError::InvalidParameter {
                stage: "repeated_letter".into(),
                message: format!(
                    "min_run_length must be at least 2, got {}",
                    self.repeated_letter.min_run_length
                ),
            });
        }
        if self.repeat_punct.min_run_length < 2 {
            return Err(ConfigError::InvalidParameter {
                stage: "repeat_punct".into(),
                message: format!(
                    "min_run_length must be at least 2, got {}",
                    self.repeat_punct.min_run_length
                ),
            });
        }
        if self.allcaps_marker.min_token_length < 1 {
            return Err(ConfigError::InvalidParameter {
                stage: "allcaps_marker".into(),
                message: "min_token_length must be at least 1".into(),
            });
        }
        for pattern in &self.boilerplate_strip.patterns {
            regex::Regex::new(pattern).map_err(|err| ConfigError::InvalidParameter {
                stage: "boilerplate_strip".into(),
                message: format!("pattern {:?} does not compile: {}", pattern, err),
            })?;
        }
        if let Some(table) = &self.slang.table {
            if table.keys().any(|k| k.is_empty() || k.chars().any(char::is_whitespace)) {
                return Err(ConfigError::InvalidParameter {
                    stage: "slang".into(),
                    message: "table keys must be single non-empty tokens".into(),
                });
            }
        }
        Ok(())
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder, deserialize, and validate the configuration.
    pub fn build(self) -> Result<CleanConfig, ConfigError> {
        let config: CleanConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CleanConfig, ConfigError> {
    Loader::new().build()
}
