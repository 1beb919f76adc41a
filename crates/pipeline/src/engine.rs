//! Discovery pipeline engine, 5 stages
//!
//! Stateless driver that:
//! 1. Normalizes and validates the raw submission
//! 2. Expands head-of-household plaintiffs × defendants into datasets
//! 3. Derives the flag set of every dataset
//! 4. Applies the profile of every requested document type
//! 5. Splits each filtered dataset into capped sets and emits render jobs
//!
//! Stages 1–4 fail the whole case. A split failure only drops that one
//! (dataset, document type) pair and is reported next to the jobs that
//! did succeed.

use rayon::prelude::*;
use serde::Serialize;
use shared_types::{
    AppSettings, Case, DatasetKey, DocumentSet, DocumentType, FilteredDataset, FlaggedDataset,
    MappingCoverageReport, PartyCaption, PipelineError, RawSubmission, RenderJob,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::registry::Registry;
use crate::stages::{expand, filter_all, flag_processor, normalize, resolve_selections, split};

/// A (dataset, document type) pair that could not be split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitFailure {
    pub dataset: DatasetKey,
    pub plaintiff: String,
    pub defendant: String,
    pub document_type: DocumentType,
    pub error: PipelineError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub datasets: usize,
    pub filtered_datasets: usize,
    pub jobs: usize,
    pub failures: usize,
}

/// Everything one case produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub case: Arc<Case>,
    pub jobs: Vec<RenderJob>,
    pub failures: Vec<SplitFailure>,
    pub coverage: MappingCoverageReport,
    pub stats: PipelineStats,
}

/// Run one submission through every stage.
#[tracing::instrument(skip_all, fields(case_id))]
pub fn run(
    raw: &RawSubmission,
    registry: &Registry,
    settings: &AppSettings,
) -> Result<PipelineOutput, PipelineError> {
    let normalized = normalize(raw, registry, &settings.pipeline.default_document_types)?;
    tracing::Span::current().record("case_id", tracing::field::display(normalized.case.case_id));

    let datasets = expand(&normalized.case, &normalized.plaintiffs, &normalized.defendants)?;

    // Selections depend only on the plaintiff; resolve each one once.
    let mut coverage = normalized.coverage;
    let mut specific_flags: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for plaintiff in normalized.plaintiffs.iter().filter(|p| p.is_head_of_household) {
        let resolved = resolve_selections(plaintiff, registry);
        coverage.merge(resolved.coverage);
        specific_flags.insert(plaintiff.index, resolved.flags);
    }

    if settings.features.strict_mappings && !coverage.is_complete() {
        return Err(strict_mapping_error(&coverage));
    }

    let no_flags = BTreeSet::new();
    let flagged: Vec<FlaggedDataset> = datasets
        .into_iter()
        .map(|dataset| {
            let specific = specific_flags
                .get(&dataset.key.plaintiff_index)
                .unwrap_or(&no_flags);
            let flags = flag_processor::flags_for(&dataset, specific, registry);
            FlaggedDataset {
                dataset: Arc::new(dataset),
                flags,
            }
        })
        .collect();

    let filtered = filter_all(&flagged, &normalized.document_types, registry)?;

    let mut jobs = Vec::new();
    let mut failures = Vec::new();
    for f in &filtered {
        match split(f, settings.pipeline.set_cap) {
            Ok(sets) => jobs.extend(build_jobs(f, &sets)),
            Err(e) if e.aborts_case() => return Err(e),
            Err(e) => {
                tracing::warn!(dataset = %f.dataset.key, document_type = %f.document_type, "{e}");
                failures.push(SplitFailure {
                    dataset: f.dataset.key,
                    plaintiff: f.plaintiff_name().to_string(),
                    defendant: f.defendant_name().to_string(),
                    document_type: f.document_type,
                    error: e,
                });
            }
        }
    }

    let stats = PipelineStats {
        datasets: flagged.len(),
        filtered_datasets: filtered.len(),
        jobs: jobs.len(),
        failures: failures.len(),
    };
    tracing::info!(
        datasets = stats.datasets,
        jobs = stats.jobs,
        failures = stats.failures,
        unmapped = coverage.unmapped_items.len(),
        "Case processed"
    );

    Ok(PipelineOutput {
        case: normalized.case,
        jobs,
        failures,
        coverage,
        stats,
    })
}

/// Run independent submissions in parallel. Results keep input order.
pub fn run_batch(
    raws: &[RawSubmission],
    registry: &Registry,
    settings: &AppSettings,
) -> Vec<Result<PipelineOutput, PipelineError>> {
    raws.par_iter().map(|raw| run(raw, registry, settings)).collect()
}

/// One render job per set of a filtered dataset.
pub fn build_jobs(filtered: &FilteredDataset, sets: &[DocumentSet]) -> Vec<RenderJob> {
    let dataset = &filtered.dataset;
    let plaintiff = PartyCaption {
        name: dataset.plaintiff.name.clone(),
        kind: dataset.plaintiff.plaintiff_type.as_str().to_string(),
        unit_number: dataset.plaintiff.unit_number.clone(),
    };
    let defendant = PartyCaption {
        name: dataset.defendant.name.clone(),
        kind: dataset.defendant.entity_type.as_str().to_string(),
        unit_number: None,
    };

    sets.iter()
        .map(|set| RenderJob {
            job_id: format!(
                "{}/{}/{}/{}",
                dataset.case.case_id, dataset.key, filtered.document_type, set.set_number
            ),
            case_id: dataset.case.case_id,
            document_type: filtered.document_type,
            template: filtered.template.clone(),
            filename: set.filename.clone(),
            set_number: set.set_number,
            total_sets: set.total_sets,
            first_item_number: set.first_item_number,
            item_count: set.count,
            plaintiff: plaintiff.clone(),
            defendant: defendant.clone(),
            context: (*dataset.context).clone(),
            flags: set.flags.iter().map(|f| (f.flag.clone(), f.count)).collect(),
        })
        .collect()
}

fn strict_mapping_error(coverage: &MappingCoverageReport) -> PipelineError {
    let mut field_errors = BTreeMap::new();
    for category in &coverage.unmapped_categories {
        field_errors.insert(
            format!("plaintiffs[{}].discovery.{}", category.plaintiff_index, category.raw_name),
            "Unknown discovery category".to_string(),
        );
    }
    for warning in &coverage.unmapped_items {
        let path = format!("plaintiffs[{}].discovery.{}", warning.plaintiff_index, warning.category);
        let entry = field_errors
            .entry(path)
            .or_insert_with(|| "No flag mapped for".to_string());
        entry.push_str(&format!(" '{}'", warning.item));
    }
    PipelineError::validation("Discovery selections without a flag mapping", field_errors)
}
