//! Run intake submissions through the pipeline and print the render jobs.
//!
//! Usage: `generate-jobs [submission.json]`. Reads stdin when no path is
//! given. The input may be one submission object or an array of them.

use pipeline::config::{load_registry, load_settings, log_settings_source, settings};
use pipeline::{PipelineOutput, Registry};
use serde::Serialize;
use shared_types::{AppSettings, PipelineError, RawSubmission};
use std::io::Read;
use std::process::ExitCode;

#[derive(Serialize)]
#[serde(untagged)]
enum CaseResult {
    Ok(PipelineOutput),
    Err { error: PipelineError },
}

fn main() -> ExitCode {
    load_settings();
    let settings = settings();
    init_logging(settings);
    log_settings_source();

    match generate(settings) {
        Ok(all_ok) => {
            shutdown_logging(settings);
            if all_ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            log::error!("{e}");
            shutdown_logging(settings);
            ExitCode::FAILURE
        }
    }
}

fn generate(settings: &AppSettings) -> Result<bool, PipelineError> {
    let input = read_input()?;
    let submissions = parse_submissions(&input)?;
    let registry = load_registry(settings)?;

    let audit = registry.audit();
    for (document_type, flag) in &audit.unknown_profile_flags {
        log::warn!("{document_type} profile counts '{flag}', which no stage sets");
    }
    for (category, option) in &audit.unmapped_form_options {
        log::warn!("Form option '{option}' under '{category}' has no flag mapping");
    }

    let results = run_all(&submissions, &registry, settings);
    let all_ok = results.iter().all(|r| matches!(r, CaseResult::Ok(_)));

    let json = match results.as_slice() {
        [one] => serde_json::to_string_pretty(one),
        all => serde_json::to_string_pretty(all),
    }
    .map_err(|e| PipelineError::configuration(format!("Failed to serialize output: {e}")))?;
    println!("{json}");

    Ok(all_ok)
}

#[cfg(feature = "telemetry")]
fn run_all(subs: &[RawSubmission], registry: &Registry, settings: &AppSettings) -> Vec<CaseResult> {
    if settings.features.telemetry {
        return subs
            .iter()
            .map(|raw| to_case_result(pipeline::telemetry::run_traced(raw, registry, settings)))
            .collect();
    }
    pipeline::run_batch(subs, registry, settings)
        .into_iter()
        .map(to_case_result)
        .collect()
}

#[cfg(not(feature = "telemetry"))]
fn run_all(subs: &[RawSubmission], registry: &Registry, settings: &AppSettings) -> Vec<CaseResult> {
    pipeline::run_batch(subs, registry, settings)
        .into_iter()
        .map(to_case_result)
        .collect()
}

fn to_case_result(result: Result<PipelineOutput, PipelineError>) -> CaseResult {
    match result {
        Ok(output) => CaseResult::Ok(output),
        Err(error) => {
            log::error!("Case failed: {error}");
            CaseResult::Err { error }
        }
    }
}

fn read_input() -> Result<String, PipelineError> {
    let mut input = String::new();
    match std::env::args().nth(1) {
        Some(path) => {
            input = std::fs::read_to_string(&path).map_err(|e| {
                PipelineError::configuration(format!("Cannot read {path}: {e}"))
            })?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| PipelineError::configuration(format!("Cannot read stdin: {e}")))?;
        }
    }
    Ok(input)
}

fn parse_submissions(input: &str) -> Result<Vec<RawSubmission>, PipelineError> {
    let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
        PipelineError::validation(format!("Input is not valid JSON: {e}"), Default::default())
    })?;
    let parsed = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|one| vec![one])
    };
    parsed.map_err(|e| {
        PipelineError::validation(format!("Input is not a submission: {e}"), Default::default())
    })
}

#[cfg(feature = "telemetry")]
fn init_logging(settings: &AppSettings) {
    if settings.features.telemetry && pipeline::telemetry::init_telemetry() {
        return;
    }
    init_console_logging();
}

#[cfg(not(feature = "telemetry"))]
fn init_logging(_settings: &AppSettings) {
    init_console_logging();
}

fn init_console_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .try_init();
}

#[cfg(feature = "telemetry")]
fn shutdown_logging(settings: &AppSettings) {
    if settings.features.telemetry {
        pipeline::telemetry::shutdown_telemetry();
    }
}

#[cfg(not(feature = "telemetry"))]
fn shutdown_logging(_settings: &AppSettings) {}
