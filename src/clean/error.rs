//! Error types for pipeline construction and record handling

use std::fmt;

/// Errors raised while building a [`Pipeline`](crate::clean::pipeline::Pipeline)
/// from a configuration.
///
/// All variants are fatal at construction time and are surfaced before any
/// record is processed; nothing in this enum can occur mid-batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An ordering constraint references a stage name that is not in the
    /// stage registry.
    UnknownStage {
        stage: String,
        referenced_by: String,
    },
    /// The active stages' before/after constraints admit no ordering.
    ConstraintCycle { stages: Vec<String> },
    /// A stage parameter is out of range or otherwise unusable.
    InvalidParameter { stage: String, message: String },
    /// The configuration source failed to load or deserialize.
    Load(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownStage {
                stage,
                referenced_by,
            } => {
                write!(
                    f,
                    "Unknown stage '{}' referenced by constraint on '{}'",
                    stage, referenced_by
                )
            }
            ConfigError::ConstraintCycle { stages } => {
                write!(
                    f,
                    "Ordering constraints form a cycle involving: {}",
                    stages.join(", ")
                )
            }
            ConfigError::InvalidParameter { stage, message } => {
                write!(f, "Invalid parameter for stage '{}': {}", stage, message)
            }
            ConfigError::Load(msg) => write!(f, "Configuration failed to load: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Per-record failure on the input boundary.
///
/// Recovered locally: the offending record is emitted as a dropped
/// [`CleanedRecord`](crate::clean::record::CleanedRecord) with a diagnostic
/// reason and the batch continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The raw bytes of a record are not valid UTF-8.
    InvalidEncoding { record_id: String, message: String },
}

impl RecordError {
    /// Identity of the record that failed, preserved so the failure can be
    /// joined back to the input.
    pub fn record_id(&self) -> &str {
        match self {
            RecordError::InvalidEncoding { record_id, .. } => record_id,
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::InvalidEncoding { record_id, message } => {
                write!(f, "Record '{}' is not valid text: {}", record_id, message)
            }
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_stage_display() {
        let err = ConfigError::UnknownStage {
            stage: "sentiment".into(),
            referenced_by: "url_removal".into(),
        };
        assert_eq!(
            format!("{}", err),
            "Unknown stage 'sentiment' referenced by constraint on 'url_removal'"
        );
    }

    #[test]
    fn test_cycle_display_names_stages() {
        let err = ConfigError::ConstraintCycle {
            stages: vec!["case_fold".into(), "repeated_letter".into()],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("case_fold"));
        assert!(msg.contains("repeated_letter"));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = ConfigError::InvalidParameter {
            stage: "repeated_letter".into(),
            message: "min_run_length must be at least 2".into(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid parameter for stage 'repeated_letter': min_run_length must be at least 2"
        );
    }

    #[test]
    fn test_record_error_keeps_identity() {
        let err = RecordError::InvalidEncoding {
            record_id: "r17".into(),
            message: "invalid utf-8 sequence".into(),
        };
        assert_eq!(err.record_id(), "r17");
        assert!(format!("{}", err).contains("r17"));
    }
}
