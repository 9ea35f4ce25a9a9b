//! Stage registry
//!
//! The registry is the single table of known stage types. Each entry carries
//! the stage's name, its fixed declaration priority, and its built-in
//! ordering constraints. Ordering is declarative: every marker encoder names
//! the destructive stage(s) that would erase its input pattern, and the
//! resolver enforces the constraints at construction time. Ties among stages
//! with no relative constraint are broken by the priority number, so the
//! resolved order never depends on how a user lists tables in a config file.

use crate::clean::config::CleanConfig;
use crate::clean::error::ConfigError;
use crate::clean::lexicon::EmoticonLexicon;
use crate::clean::stage::Stage;
use crate::clean::stages::markers::{
    AllcapsEncoder, EmoticonEncoder, RepeatPunctEncoder, RepeatedLetterEncoder,
};
use crate::clean::stages::noise::{BoilerplateStrip, HtmlStrip, UrlRemoval, WhitespaceCollapse};
use crate::clean::stages::normalize::{CaseFold, DropEmpty, PunctStrip};
use crate::clean::stages::social::{HashtagSplit, MentionEncoder, NfkcNormalize, SlangExpand};
use std::sync::Arc;

/// Registry entry for one stage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub name: &'static str,
    /// Tie-break among stages with no relative constraint. Lower runs first.
    pub priority: u32,
    /// Stages this one must run before, when they are active.
    pub before: &'static [&'static str],
    /// Stages this one must run after, when they are active.
    pub after: &'static [&'static str],
}

/// All known stage types, in priority order.
pub const STAGE_SPECS: &[StageSpec] = &[
    StageSpec {
        name: "unicode_nfkc",
        priority: 5,
        before: &["allcaps_marker", "repeated_letter", "emoticon_lexicon"],
        after: &[],
    },
    StageSpec {
        name: "html_strip",
        priority: 10,
        before: &["allcaps_marker", "case_fold"],
        after: &[],
    },
    StageSpec {
        name: "url_removal",
        priority: 20,
        before: &["whitespace_collapse", "allcaps_marker", "case_fold"],
        after: &[],
    },
    StageSpec {
        name: "boilerplate_strip",
        priority: 30,
        before: &["allcaps_marker", "case_fold"],
        after: &[],
    },
    StageSpec {
        name: "mention",
        priority: 40,
        before: &["allcaps_marker", "punct_strip"],
        after: &[],
    },
    StageSpec {
        name: "hashtag",
        priority: 50,
        before: &["whitespace_collapse", "case_fold"],
        after: &[],
    },
    StageSpec {
        name: "whitespace_collapse",
        priority: 60,
        before: &["allcaps_marker", "slang", "case_fold"],
        after: &[],
    },
    StageSpec {
        name: "allcaps_marker",
        priority: 70,
        before: &["case_fold"],
        after: &[],
    },
    StageSpec {
        name: "repeated_letter",
        priority: 80,
        before: &["case_fold", "slang"],
        after: &[],
    },
    StageSpec {
        name: "emoticon_lexicon",
        priority: 90,
        before: &["case_fold", "punct_strip"],
        after: &[],
    },
    StageSpec {
        name: "repeat_punct",
        priority: 100,
        before: &["punct_strip"],
        after: &[],
    },
    StageSpec {
        name: "slang",
        priority: 110,
        before: &["case_fold"],
        after: &[],
    },
    StageSpec {
        name: "case_fold",
        priority: 120,
        before: &[],
        after: &[],
    },
    StageSpec {
        name: "punct_strip",
        priority: 130,
        before: &[],
        after: &["case_fold"],
    },
    StageSpec {
        name: "drop_empty",
        priority: 140,
        before: &[],
        after: &["case_fold", "punct_strip", "whitespace_collapse"],
    },
];

pub fn spec(name: &str) -> Option<&'static StageSpec> {
    STAGE_SPECS.iter().find(|s| s.name == name)
}

pub fn is_known(name: &str) -> bool {
    spec(name).is_some()
}

/// One resolved, active stage: its registry entry, its merged constraint
/// sets, and the stage instance itself.
pub struct ActiveStage {
    pub spec: &'static StageSpec,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub stage: Box<dyn Stage>,
}

impl std::fmt::Debug for ActiveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveStage")
            .field("spec", &self.spec)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("stage", &format_args!("<dyn Stage>"))
            .finish()
    }
}

fn build_stage(
    name: &'static str,
    config: &CleanConfig,
    lexicon: &Arc<EmoticonLexicon>,
) -> Result<Box<dyn Stage>, ConfigError> {
    Ok(match name {
        "unicode_nfkc" => Box::new(NfkcNormalize::new()),
        "html_strip" => Box::new(HtmlStrip::new()),
        "url_removal" => Box::new(UrlRemoval::new(config.url_removal.strip_bare_www)),
        "boilerplate_strip" => {
            Box::new(BoilerplateStrip::from_patterns(&config.boilerplate_strip.patterns)?)
        }
        "mention" => Box::new(MentionEncoder::new()),
        "hashtag" => Box::new(HashtagSplit::new()),
        "whitespace_collapse" => Box::new(WhitespaceCollapse::new()),
        "allcaps_marker" => Box::new(AllcapsEncoder::new(
            config.allcaps_marker.min_token_length,
            Arc::clone(lexicon),
        )),
        "repeated_letter" => Box::new(RepeatedLetterEncoder::new(
            config.repeated_letter.min_run_length,
            Arc::clone(lexicon),
        )),
        "emoticon_lexicon" => Box::new(EmoticonEncoder::new(Arc::clone(lexicon))),
        "repeat_punct" => Box::new(RepeatPunctEncoder::new(
            config.repeat_punct.min_run_length,
            Arc::clone(lexicon),
        )),
        "slang" => Box::new(SlangExpand::new(config.slang.resolved_table())),
        "case_fold" => Box::new(CaseFold::new(Arc::clone(lexicon))),
        "punct_strip" => Box::new(PunctStrip::new(Arc::clone(lexicon))),
        "drop_empty" => Box::new(DropEmpty::new()),
        other => unreachable!("stage '{}' is in STAGE_SPECS but has no builder", other),
    })
}

/// Instantiate every active stage with its merged constraint sets.
///
/// User-supplied constraint names must exist in the registry; references to
/// known-but-inactive stages are legal and impose no edge.
pub fn active_stages(config: &CleanConfig) -> Result<Vec<ActiveStage>, ConfigError> {
    let lexicon = Arc::new(EmoticonLexicon::from_parts(
        config.emoticon_lexicon.inline.as_deref(),
        config.emoticon_lexicon.path.as_deref(),
        config.emoticon_lexicon.map_emoji,
    )?);

    let mut active = Vec::new();
    for spec in STAGE_SPECS {
        let (enabled, user_before, user_after) = config
            .stage_settings(spec.name)
            .expect("every registry stage has a config table");
        if !enabled {
            continue;
        }

        for referenced in user_before.iter().chain(user_after.iter()) {
            if !is_known(referenced) {
                return Err(ConfigError::UnknownStage {
                    stage: referenced.clone(),
                    referenced_by: spec.name.to_string(),
                });
            }
        }

        let mut before: Vec<String> = spec.before.iter().map(|s| s.to_string()).collect();
        before.extend(user_before.iter().cloned());
        before.sort();
        before.dedup();

        let mut after: Vec<String> = spec.after.iter().map(|s| s.to_string()).collect();
        after.extend(user_after.iter().cloned());
        after.sort();
        after.dedup();

        active.push(ActiveStage {
            spec,
            before,
            after,
            stage: build_stage(spec.name, config, &lexicon)?,
        });
    }
    Ok(active)
}
