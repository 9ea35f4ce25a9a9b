//! The cleaning pipeline
//!
//! A [`Pipeline`] is built once from a [`CleanConfig`] and reused for every
//! record in a batch. Construction validates parameters, instantiates the
//! active stages, and resolves their declarative ordering constraints;
//! every configuration problem surfaces here, before the first record.
//!
//! Application is synchronous and stateless across records: stages are pure
//! string transforms, so sharing one immutable pipeline across threads is
//! safe and the output order always matches the input order.
//!
//! # Usage
//!
//! ```rust
//! use psyclean::clean::config::CleanConfig;
//! use psyclean::clean::pipeline::Pipeline;
//! use psyclean::clean::record::Record;
//!
//! let pipeline = Pipeline::from_config(&CleanConfig::default()).unwrap();
//! let cleaned = pipeline.clean(&Record::new("r1", "Sooooo happy!!!"));
//! assert!(!cleaned.dropped);
//! ```

use crate::clean::config::CleanConfig;
use crate::clean::error::ConfigError;
use crate::clean::ordering::resolve_order;
use crate::clean::record::{CleanedRecord, MarkerCounts, Record};
use crate::clean::registry::{active_stages, ActiveStage};
use crate::clean::stage::{Outcome, WorkRecord};
use std::fmt;

/// An immutable, ordered sequence of resolved stages.
pub struct Pipeline {
    stages: Vec<ActiveStage>,
}

impl Pipeline {
    /// Build a pipeline from a configuration.
    ///
    /// Fails with a [`ConfigError`] on out-of-range parameters, unknown
    /// stage references, or cyclic ordering constraints; never fails once
    /// records are flowing.
    pub fn from_config(config: &CleanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut stages = active_stages(config)?;
        let order = resolve_order(&stages)?;

        let mut by_position: Vec<(usize, ActiveStage)> = Vec::with_capacity(stages.len());
        for stage in stages.drain(..) {
            by_position.push((0, stage));
        }
        for (position, index) in order.iter().enumerate() {
            by_position[*index].0 = position;
        }
        by_position.sort_by_key(|(position, _)| *position);

        Ok(Pipeline {
            stages: by_position.into_iter().map(|(_, stage)| stage).collect(),
        })
    }

    /// The default pipeline.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::from_config(&CleanConfig::default())
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.spec.name).collect()
    }

    /// (name, description) pairs in execution order, for listings.
    pub fn stage_listing(&self) -> Vec<(&'static str, &'static str)> {
        self.stages
            .iter()
            .map(|s| (s.stage.name(), s.stage.description()))
            .collect()
    }

    /// Clean one record. Total: every record produces a [`CleanedRecord`],
    /// dropped or kept, with the input's record identity.
    pub fn clean(&self, record: &Record) -> CleanedRecord {
        let mut work = WorkRecord::from_record(record);
        for stage in &self.stages {
            match stage.stage.apply(work) {
                Outcome::Next(next) => work = next,
                Outcome::Drop(dropped, reason) => return dropped.into_dropped(reason),
            }
        }
        work.into_cleaned()
    }

    /// Clean a batch, preserving input order.
    pub fn clean_batch<I>(&self, records: I) -> Vec<CleanedRecord>
    where
        I: IntoIterator<Item = Record>,
    {
        records.into_iter().map(|r| self.clean(&r)).collect()
    }

    /// Clean a batch while accumulating a run summary.
    pub fn clean_batch_with_summary<I>(&self, records: I) -> (Vec<CleanedRecord>, Summary)
    where
        I: IntoIterator<Item = Record>,
    {
        let mut summary = Summary::default();
        let cleaned: Vec<CleanedRecord> = records
            .into_iter()
            .map(|r| {
                let out = self.clean(&r);
                summary.observe(&out);
                out
            })
            .collect();
        (cleaned, summary)
    }

    /// Streaming adapter: lazily cleans records in input order.
    pub fn clean_iter<I>(&self, records: I) -> CleanStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Record>,
    {
        CleanStream {
            pipeline: self,
            records: records.into_iter(),
        }
    }
}

/// Iterator returned by [`Pipeline::clean_iter`].
pub struct CleanStream<'a, I> {
    pipeline: &'a Pipeline,
    records: I,
}

impl<I> Iterator for CleanStream<'_, I>
where
    I: Iterator<Item = Record>,
{
    type Item = CleanedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|r| self.pipeline.clean(&r))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

/// Per-batch accounting reported by the batch driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub kept: usize,
    pub dropped: usize,
    /// Records that failed to decode before reaching the pipeline.
    pub decode_errors: usize,
    pub marker_totals: MarkerCounts,
}

impl Summary {
    pub fn observe(&mut self, cleaned: &CleanedRecord) {
        self.processed += 1;
        if cleaned.dropped {
            self.dropped += 1;
        } else {
            self.kept += 1;
        }
        for (kind, count) in &cleaned.markers {
            *self.marker_totals.entry(*kind).or_insert(0) += count;
        }
    }

    /// Account for a record that never reached the pipeline.
    pub fn record_error(&mut self) {
        self.processed += 1;
        self.dropped += 1;
        self.decode_errors += 1;
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} kept={} dropped={} decode_errors={}",
            self.processed, self.kept, self.dropped, self.decode_errors
        )?;
        for (kind, count) in &self.marker_totals {
            write!(f, " {}={}", kind, count)?;
        }
        Ok(())
    }
}
