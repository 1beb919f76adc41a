//! Stage 4: narrow a flagged dataset to one document type.

use shared_types::{
    total_count, DocumentProfile, DocumentType, FilteredDataset, FlagCount, FlagSet,
    FlaggedDataset, PipelineError,
};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::registry::Registry;

/// True flags the profile counts, with their counts, in profile order.
///
/// True flags the profile does not list are dropped; so are flags counted 0.
pub fn filter_flags(flags: &FlagSet, profile: &DocumentProfile) -> Vec<FlagCount> {
    let mut seen = BTreeSet::new();
    profile
        .applicable_flags()
        .filter(|(name, _)| flags.is_set(name) && seen.insert(*name))
        .map(|(name, count)| FlagCount::new(name, count))
        .collect()
}

/// Apply one profile to one flagged dataset.
pub fn filter(flagged: &FlaggedDataset, profile: &DocumentProfile) -> FilteredDataset {
    let flags = filter_flags(&flagged.flags, profile);
    let total_interrogatories = total_count(&flags);

    FilteredDataset {
        dataset: Arc::clone(&flagged.dataset),
        document_type: profile.document_type,
        suffix: profile.suffix.clone(),
        template: profile.template.clone(),
        first_set_only: profile.first_set_only.clone(),
        flags,
        total_interrogatories,
    }
}

/// Every (dataset, document type) pair, dataset-major.
#[tracing::instrument(skip_all, fields(datasets = flagged.len(), document_types = document_types.len()))]
pub fn filter_all(
    flagged: &[FlaggedDataset],
    document_types: &[DocumentType],
    registry: &Registry,
) -> Result<Vec<FilteredDataset>, PipelineError> {
    let profiles = document_types
        .iter()
        .map(|dt| registry.profile(*dt))
        .collect::<Result<Vec<_>, _>>()?;

    let filtered: Vec<FilteredDataset> = flagged
        .iter()
        .flat_map(|f| profiles.iter().map(move |profile| filter(f, profile)))
        .collect();

    for f in &filtered {
        tracing::debug!(
            dataset = %f.dataset.key,
            document_type = %f.document_type,
            flags = f.flags.len(),
            total = f.total_interrogatories,
            "Profile applied"
        );
    }
    Ok(filtered)
}
