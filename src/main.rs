//! Hunt Reader
//!
//! Reads a screenshot of the treasure-hunt clue panel and prints the parsed
//! record as JSON. With a candidate file, also prints the candidate that
//! matches the last hint.
//!
//! Usage: `hunt-reader <screenshot> [candidates.json]`

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use hunt_reader::paths;
use hunt_reader::{
    get_config, init_config, match_last_hint, read_hunt_with_retry, HuntError, HuntRecord,
    JsonCandidateFile, TesseractEngine,
};

const LOG_FILE: &str = "hunt_reader.log";

/// Logs to stderr and to the log file with a wall-clock timestamp.
///
/// Stdout is reserved for the JSON output.
fn init_logging() -> Result<()> {
    let log_path = paths::get_logs_dir().join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_ansi(false)
        .with_writer(std::io::stderr.and(Mutex::new(file)))
        .init();
    Ok(())
}

/// Console-only logging when the log file cannot be opened.
fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    // Route panics through the logger so they reach the log file
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        error!("[PANIC]{} {}", location, msg);
    }));

    let logging = paths::ensure_directories()
        .context("Failed to create output directories")
        .and_then(|_| init_logging());
    if let Err(e) = logging {
        init_console_logging();
        warn!("File logging disabled: {:#}", e);
    }

    info!("Session started {}", Local::now().format("%Y-%m-%d"));
    init_config();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<ExitCode> {
    let Some(screenshot) = args.get(1) else {
        let program = args.first().map_or("hunt-reader", String::as_str);
        eprintln!("Usage: {} <screenshot> [candidates.json]", program);
        return Ok(ExitCode::from(2));
    };

    let record = match read_screenshot(screenshot) {
        Ok(record) => record,
        Err(e) => return report(&e),
    };
    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Some(candidates) = args.get(2) {
        let config = get_config();
        let source = JsonCandidateFile::new(candidates);
        match match_last_hint(&record, &source, config.match_threshold) {
            Ok(outcome) => {
                let matched = serde_json::json!({
                    "hintText": record.last_hint().map(|h| h.text.as_str()),
                    "candidate": outcome.candidate,
                    "score": outcome.score,
                });
                println!("{}", serde_json::to_string_pretty(&matched)?);
            }
            Err(e) => return report(&e),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Reads the screenshot, reloading it from disk before every attempt.
fn read_screenshot(path: &str) -> hunt_reader::Result<HuntRecord> {
    let config = get_config();
    let engine = TesseractEngine::from_config(&config.ocr)?;
    read_hunt_with_retry(
        || {
            info!("Reading {}", path);
            Ok(image::open(path)?.to_rgba8())
        },
        &engine,
        config,
        config.retry_attempts,
    )
}

/// Prints the error envelope and, for incomplete reads, logs the partial record.
fn report(e: &HuntError) -> Result<ExitCode> {
    if let Some(partial) = e.partial_record() {
        warn!("Partial record: {}", serde_json::to_string(partial)?);
    }
    error!("{}", e);
    println!("{}", serde_json::to_string_pretty(&e.to_json())?);
    Ok(ExitCode::FAILURE)
}
