use opentelemetry::{
    global,
    trace::{Span, SpanKind, Status, Tracer},
    KeyValue,
};
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use shared_types::{AppSettings, PipelineError, RawSubmission};
use std::sync::OnceLock;

use crate::engine::{self, PipelineOutput};
use crate::registry::Registry;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Keep the providers alive for the process lifetime.
static LOGGER_PROVIDER: OnceLock<opentelemetry_sdk::logs::SdkLoggerProvider> = OnceLock::new();
static TRACER_PROVIDER: OnceLock<opentelemetry_sdk::trace::SdkTracerProvider> = OnceLock::new();

/// Tokio runtime for the OTLP gRPC exporters. Tonic's `connect_lazy()`
/// calls `tokio::spawn`, and the pipeline itself runs without a runtime.
static OTEL_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Set up OTLP trace and log export.
///
/// Reads config from environment:
///   - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector gRPC address, e.g. `http://localhost:4317`
///   - `OTEL_SERVICE_NAME`: service name tag (default: `discovery-pipeline`)
///   - `SIGNOZ_INGESTION_KEY`: ingestion token sent as gRPC metadata (optional)
///   - `DEPLOY_ENV`: deployment environment tag (default: `development`)
///
/// Returns `false` when export is not configured or any exporter fails to
/// build; the caller then falls back to console logging.
pub fn init_telemetry() -> bool {
    let _ = dotenvy::dotenv();

    let endpoint = match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(ep) => ep,
        Err(_) => {
            eprintln!("OTEL_EXPORTER_OTLP_ENDPOINT not set, skipping OTLP telemetry");
            return false;
        }
    };

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "discovery-pipeline".to_string());
    let environment = std::env::var("DEPLOY_ENV").unwrap_or_else(|_| "development".to_string());

    let Some(rt) = otel_runtime() else {
        return false;
    };
    let _guard = rt.enter();

    let metadata = ingestion_metadata();
    let tls = endpoint.starts_with("https://");

    let mut span_builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint);
    if tls {
        span_builder = span_builder.with_tls_config(
            opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_native_roots(),
        );
    }
    if let Some(md) = metadata.clone() {
        span_builder = span_builder.with_metadata(md);
    }
    let span_exporter = match span_builder.build() {
        Ok(exporter) => exporter,
        Err(e) => {
            eprintln!("Failed to create OTLP span exporter: {e}");
            return false;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", APP_VERSION))
        .with_attribute(KeyValue::new("deployment.environment", environment))
        .build();

    let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource.clone())
        .build();
    global::set_tracer_provider(tracer_provider.clone());
    let _ = TRACER_PROVIDER.set(tracer_provider);

    // -- Log exporter (uses the `log` crate; `tracing` events reach it via its `log` feature) --
    let mut log_builder = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint);
    if tls {
        log_builder = log_builder.with_tls_config(
            opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_native_roots(),
        );
    }
    if let Some(md) = metadata {
        log_builder = log_builder.with_metadata(md);
    }
    let log_exporter = match log_builder.build() {
        Ok(exporter) => exporter,
        Err(e) => {
            eprintln!("Failed to create OTLP log exporter: {e}");
            return false;
        }
    };

    let logger_provider = opentelemetry_sdk::logs::SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();
    let provider = LOGGER_PROVIDER.get_or_init(|| logger_provider);

    let bridge = opentelemetry_appender_log::OpenTelemetryLogBridge::new(provider);
    match log::set_boxed_logger(Box::new(bridge)) {
        Ok(()) => {
            log::set_max_level(log::LevelFilter::Info);
        }
        Err(_) => {
            eprintln!("Log bridge skipped, log crate logger already set");
            return false;
        }
    }

    eprintln!("Telemetry initialized v{APP_VERSION}, traces + logs exporting to {endpoint}");
    true
}

/// Flush and stop the exporters. Call before process exit.
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Trace provider shutdown failed: {e}");
        }
    }
    if let Some(provider) = LOGGER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Log provider shutdown failed: {e}");
        }
    }
}

/// `engine::run` inside an OpenTelemetry span carrying the case outcome.
pub fn run_traced(
    raw: &RawSubmission,
    registry: &Registry,
    settings: &AppSettings,
) -> Result<PipelineOutput, PipelineError> {
    let tracer = global::tracer("discovery-pipeline");
    let mut span = tracer
        .span_builder("pipeline.run")
        .with_kind(SpanKind::Internal)
        .with_attributes(vec![
            KeyValue::new("pipeline.plaintiffs", raw.plaintiffs.len() as i64),
            KeyValue::new("pipeline.defendants", raw.defendants.len() as i64),
            KeyValue::new("pipeline.set_cap", i64::from(settings.pipeline.set_cap)),
        ])
        .start(&tracer);

    let result = engine::run(raw, registry, settings);

    match &result {
        Ok(output) => {
            span.set_attribute(KeyValue::new("case.id", output.case.case_id.to_string()));
            span.set_attribute(KeyValue::new("pipeline.jobs", output.jobs.len() as i64));
            span.set_attribute(KeyValue::new("pipeline.failures", output.failures.len() as i64));
            span.set_attribute(KeyValue::new(
                "pipeline.unmapped_items",
                output.coverage.unmapped_items.len() as i64,
            ));
        }
        Err(e) => {
            span.set_attribute(KeyValue::new("error.type", e.kind.to_string()));
            span.set_status(Status::error(e.message.clone()));
        }
    }
    span.end();
    result
}

fn otel_runtime() -> Option<&'static tokio::runtime::Runtime> {
    if let Some(rt) = OTEL_RUNTIME.get() {
        return Some(rt);
    }
    match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .build()
    {
        Ok(rt) => Some(OTEL_RUNTIME.get_or_init(|| rt)),
        Err(e) => {
            eprintln!("Failed to create OTEL runtime: {e}");
            None
        }
    }
}

fn ingestion_metadata() -> Option<opentelemetry_otlp::tonic_types::metadata::MetadataMap> {
    let key = std::env::var("SIGNOZ_INGESTION_KEY").ok().filter(|k| !k.is_empty())?;
    let value = match key.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Invalid SIGNOZ_INGESTION_KEY value, sending without it");
            return None;
        }
    };
    let mut metadata = opentelemetry_otlp::tonic_types::metadata::MetadataMap::new();
    metadata.insert("signoz-ingestion-key", value);
    Some(metadata)
}
