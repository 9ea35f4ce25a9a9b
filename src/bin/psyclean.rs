//! Command-line interface for psyclean
//!
//! Reads raw records (a JSON array or JSON-lines file), runs the cleaning
//! pipeline over them in input order, and writes cleaned records as JSON
//! lines.
//!
//! Usage:
//!   psyclean `<path>` [--config `<file>`] [--output `<file>`]   - Clean a batch of records
//!   psyclean --list-stages [--config `<file>`]                 - Show the resolved stage order

use clap::{Arg, ArgAction, Command};
use psyclean::clean::config::{CleanConfig, Loader};
use psyclean::clean::pipeline::{Pipeline, Summary};
use psyclean::clean::record::{CleanedRecord, Record};
use std::io::Write;
use std::path::Path;

fn main() {
    tracing_subscriber::fmt::init();

    let matches = Command::new("psyclean")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Clean social-media text while preserving psycholinguistic signal")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the raw records (JSON array or JSON lines)")
                .required_unless_present("list-stages")
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults (.toml, .yaml, or .yml)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file for cleaned records (default: stdout)"),
        )
        .arg(
            Arg::new("list-stages")
                .long("list-stages")
                .help("List the resolved stage order for the active configuration")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = load_config(matches.get_one::<String>("config").map(String::as_str));
    let pipeline = Pipeline::from_config(&config).unwrap_or_else(|err| {
        eprintln!("Configuration error: {}", err);
        std::process::exit(1);
    });

    if matches.get_flag("list-stages") {
        handle_list_stages(&pipeline);
        return;
    }

    let path = matches
        .get_one::<String>("path")
        .expect("path is required unless listing stages");
    let output = matches.get_one::<String>("output").map(String::as_str);
    handle_clean_command(&pipeline, path, output);
}

/// Load configuration, layering a user file over the embedded defaults.
fn load_config(path: Option<&str>) -> CleanConfig {
    let result = match path {
        None => Loader::new().build(),
        Some(path) if is_yaml(path) => std::fs::read_to_string(path)
            .map_err(|err| {
                psyclean::clean::error::ConfigError::Load(format!(
                    "cannot read {}: {}",
                    path, err
                ))
            })
            .and_then(|source| CleanConfig::from_yaml_str(&source)),
        Some(path) => Loader::new().with_file(path).build(),
    };

    result.unwrap_or_else(|err| {
        eprintln!("Configuration error: {}", err);
        std::process::exit(1);
    })
}

fn is_yaml(path: &str) -> bool {
    matches!(
        Path::new(path).extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Print the resolved stage order with descriptions.
fn handle_list_stages(pipeline: &Pipeline) {
    for (index, (name, description)) in pipeline.stage_listing().iter().enumerate() {
        println!("{:2}. {:20} {}", index + 1, name, description);
    }
}

/// Clean a batch of records and write them as JSON lines.
fn handle_clean_command(pipeline: &Pipeline, path: &str, output: Option<&str>) {
    let raw = std::fs::read(path).unwrap_or_else(|err| {
        eprintln!("Cannot read {}: {}", path, err);
        std::process::exit(1);
    });

    let mut summary = Summary::default();
    let cleaned = decode_and_clean(pipeline, &raw, &mut summary);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path).unwrap_or_else(|err| {
            eprintln!("Cannot create {}: {}", path, err);
            std::process::exit(1);
        })),
        None => Box::new(std::io::stdout().lock()),
    };

    for record in &cleaned {
        let line = serde_json::to_string(record).expect("cleaned records serialize");
        if let Err(err) = writeln!(writer, "{}", line) {
            eprintln!("Write failed: {}", err);
            std::process::exit(1);
        }
    }

    tracing::info!(%summary, "batch complete");
}

/// Decode a JSON array or JSON-lines payload, cleaning records in input
/// order. A record that fails to decode becomes a dropped output record
/// with a diagnostic reason; it never aborts the batch.
fn decode_and_clean(pipeline: &Pipeline, raw: &[u8], summary: &mut Summary) -> Vec<CleanedRecord> {
    if looks_like_json_array(raw) {
        let records: Vec<Record> = match serde_json::from_slice(raw) {
            Ok(records) => records,
            Err(err) => {
                eprintln!("Cannot parse input as a JSON array of records: {}", err);
                std::process::exit(1);
            }
        };
        let (cleaned, batch_summary) = pipeline.clean_batch_with_summary(records);
        *summary = batch_summary;
        return cleaned;
    }

    let mut cleaned = Vec::new();
    for (number, line) in raw.split(|b| *b == b'\n').enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let line_id = format!("line-{}", number + 1);
        let text = match Record::from_utf8(line_id.clone(), line.to_vec()) {
            Ok(record) => record.raw_text,
            Err(err) => {
                tracing::warn!(record_id = %err.record_id(), "skipping undecodable record: {}", err);
                summary.record_error();
                cleaned.push(CleanedRecord::from(&err));
                continue;
            }
        };
        match serde_json::from_str::<Record>(&text) {
            Ok(record) => {
                let out = pipeline.clean(&record);
                summary.observe(&out);
                cleaned.push(out);
            }
            Err(err) => {
                tracing::warn!(record_id = %line_id, "skipping malformed record: {}", err);
                summary.record_error();
                cleaned.push(CleanedRecord::dropped_with_reason(
                    line_id,
                    format!("malformed record: {}", err),
                ));
            }
        }
    }
    cleaned
}

fn looks_like_json_array(raw: &[u8]) -> bool {
    raw.iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|b| *b == b'[')
        .unwrap_or(false)
}
