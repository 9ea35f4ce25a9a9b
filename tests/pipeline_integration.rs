//! End-to-end pipeline behavior over the public API
//!
//! These tests pin the contract the cleaning core guarantees to its
//! collaborators: marker encoding survives the destructive passes, record
//! identity survives everything, configuration problems fail construction
//! before any record is processed, and batches come back in input order.

use psyclean::clean::config::CleanConfig;
use psyclean::clean::error::ConfigError;
use psyclean::clean::pipeline::Pipeline;
use psyclean::clean::record::{MarkerKind, Record};
use psyclean::clean::stage::{Outcome, Stage, WorkRecord};
use psyclean::clean::stages::noise::UrlRemoval;

fn apply_stage(stage: &dyn Stage, text: &str) -> String {
    match stage.apply(WorkRecord::from_record(&Record::new("t", text))) {
        Outcome::Next(record) => record.text,
        Outcome::Drop(..) => panic!("unexpected drop"),
    }
}

#[test]
fn url_removal_is_idempotent() {
    let stage = UrlRemoval::new(true);
    for text in [
        "plain text",
        "see https://example.com/x?q=1 and www.other.org/page",
        "ftp://host/file at the start",
        "",
    ] {
        let once = apply_stage(&stage, text);
        let twice = apply_stage(&stage, &once);
        assert_eq!(once, twice, "second application changed {:?}", text);
    }
}

#[test]
fn emphasis_marker_survives_case_folding() {
    let pipeline = Pipeline::with_defaults().unwrap();
    let cleaned = pipeline.clean(&Record::new("r1", "Sooooo happy!!!"));

    assert_eq!(cleaned.marker(MarkerKind::RepeatedLetter), 1);
    assert!(cleaned.text.contains("so[EMPH]"), "text: {}", cleaned.text);
}

#[test]
fn disabling_case_fold_does_not_change_marker_detection() {
    let mut config = CleanConfig::default();
    config.case_fold.enabled = false;
    let unfolded = Pipeline::from_config(&config).unwrap();
    let folded = Pipeline::with_defaults().unwrap();

    let record = Record::new("r1", "Sooooo happy!!!");
    let with_fold = folded.clean(&record);
    let without_fold = unfolded.clean(&record);

    assert_eq!(
        with_fold.marker(MarkerKind::RepeatedLetter),
        without_fold.marker(MarkerKind::RepeatedLetter)
    );
    assert_eq!(
        with_fold.marker(MarkerKind::RepeatPunct),
        without_fold.marker(MarkerKind::RepeatPunct)
    );
    // only the casing differs
    assert!(without_fold.text.contains("So[EMPH]"));
    assert!(with_fold.text.contains("so[EMPH]"));
}

#[test]
fn marker_counting_on_reference_input() {
    let pipeline = Pipeline::with_defaults().unwrap();
    let cleaned = pipeline.clean(&Record::new("r1", "I AM SO HAPPY!!! :) :)"));

    // "I" is excluded by min_token_length = 2
    assert_eq!(cleaned.marker(MarkerKind::AllcapsWord), 3);
    assert_eq!(cleaned.marker(MarkerKind::RepeatPunct), 1);
    assert_eq!(cleaned.marker(MarkerKind::Emoticon), 2);
    assert!(!cleaned.dropped);
}

#[test]
fn record_identity_is_preserved_for_all_records() {
    let pipeline = Pipeline::with_defaults().unwrap();
    let records = vec![
        Record::new("kept-1", "some actual words"),
        Record::new("dropped-1", "https://only-a-url.example"),
        Record::new("kept-2", "MORE words :)"),
    ];
    let cleaned = pipeline.clean_batch(records);

    assert_eq!(cleaned[0].record_id, "kept-1");
    assert_eq!(cleaned[1].record_id, "dropped-1");
    assert_eq!(cleaned[2].record_id, "kept-2");
    assert!(cleaned[1].dropped);
}

#[test]
fn url_only_record_is_dropped_empty() {
    let pipeline = Pipeline::with_defaults().unwrap();
    let cleaned = pipeline.clean(&Record::new("r1", "https://example.com"));

    assert!(cleaned.dropped);
    assert!(cleaned.text.is_empty());
    assert_eq!(cleaned.drop_reason.as_deref(), Some("empty after cleaning"));
}

#[test]
fn disabling_drop_empty_keeps_empty_records() {
    let mut config = CleanConfig::default();
    config.drop_empty.enabled = false;
    let pipeline = Pipeline::from_config(&config).unwrap();
    let cleaned = pipeline.clean(&Record::new("r1", "https://example.com"));

    assert!(!cleaned.dropped);
    assert!(cleaned.text.is_empty());
}

#[test]
fn constraint_cycle_fails_at_construction() {
    let mut config = CleanConfig::default();
    // repeated_letter already declares before: case_fold; closing the loop
    // must fail before any record is processed
    config.case_fold.before = vec!["repeated_letter".into()];

    match Pipeline::from_config(&config) {
        Err(ConfigError::ConstraintCycle { stages }) => {
            assert!(stages.contains(&"case_fold".to_string()));
            assert!(stages.contains(&"repeated_letter".to_string()));
        }
        other => panic!("expected ConstraintCycle, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unknown_constraint_fails_at_construction() {
    let mut config = CleanConfig::default();
    config.hashtag.after = vec!["stemming".into()];

    match Pipeline::from_config(&config) {
        Err(ConfigError::UnknownStage {
            stage,
            referenced_by,
        }) => {
            assert_eq!(stage, "stemming");
            assert_eq!(referenced_by, "hashtag");
        }
        other => panic!("expected UnknownStage, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn batch_output_is_in_input_order() {
    let pipeline = Pipeline::with_defaults().unwrap();
    let records: Vec<Record> = (0..20)
        .map(|i| Record::new(format!("r{i}"), format!("record number {i}")))
        .collect();

    let cleaned = pipeline.clean_batch(records);
    for (i, record) in cleaned.iter().enumerate() {
        assert_eq!(record.record_id, format!("r{i}"));
    }
}

#[test]
fn emoticons_survive_the_full_default_pipeline() {
    let pipeline = Pipeline::with_defaults().unwrap();
    let cleaned = pipeline.clean(&Record::new("r1", "WELL thats GREAT xD <3"));

    assert_eq!(cleaned.marker(MarkerKind::Emoticon), 2);
    assert!(cleaned.text.contains("xD"));
    assert!(cleaned.text.contains("<3"));
}

#[test]
fn punct_strip_when_enabled_spares_encoded_punctuation() {
    let mut config = CleanConfig::default();
    config.punct_strip.enabled = true;
    let pipeline = Pipeline::from_config(&config).unwrap();

    let cleaned = pipeline.clean(&Record::new("r1", "Wait... what? :)"));
    assert_eq!(cleaned.marker(MarkerKind::RepeatPunct), 1);
    assert_eq!(cleaned.marker(MarkerKind::Emoticon), 1);
    // "..." survives in canonical form, the lone "?" does not
    assert_eq!(cleaned.text, "wait..[X3] what :)");
}

#[test]
fn metadata_on_input_records_is_left_to_the_caller() {
    // the pipeline consumes raw_text and record_id only; metadata stays on
    // the input record for the caller to join back by id
    let pipeline = Pipeline::with_defaults().unwrap();
    let record = Record::new("r1", "hello").with_metadata("source", "forum");
    let cleaned = pipeline.clean(&record);
    assert_eq!(cleaned.record_id, record.record_id);
    assert_eq!(record.metadata["source"], "forum");
}
