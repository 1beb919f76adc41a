//! Stage 2: head-of-household plaintiffs × defendants.

use shared_types::{Case, CaseContext, Dataset, DatasetKey, Defendant, PipelineError, Plaintiff};
use std::sync::Arc;

/// One dataset per (head-of-household plaintiff, defendant) pair,
/// plaintiff-major.
#[tracing::instrument(skip_all, fields(case_id = %case.case_id))]
pub fn expand(
    case: &Arc<Case>,
    plaintiffs: &[Plaintiff],
    defendants: &[Defendant],
) -> Result<Vec<Dataset>, PipelineError> {
    let heads: Vec<&Plaintiff> = plaintiffs.iter().filter(|p| p.is_head_of_household).collect();

    if heads.is_empty() {
        return Err(PipelineError::empty_expansion(
            "No head-of-household plaintiff on the case",
        ));
    }
    if defendants.is_empty() {
        return Err(PipelineError::empty_expansion("No defendants on the case"));
    }

    let context = Arc::new(CaseContext {
        plaintiff_names: plaintiffs.iter().map(|p| p.name.clone()).collect(),
        defendant_names: defendants.iter().map(|d| d.name.clone()).collect(),
        property_address: case.property.one_line(),
        jurisdiction: case.jurisdiction.clone(),
    });

    let datasets: Vec<Dataset> = heads
        .iter()
        .flat_map(|plaintiff| {
            defendants.iter().map(|defendant| Dataset {
                key: DatasetKey {
                    plaintiff_index: plaintiff.index,
                    defendant_index: defendant.index,
                },
                case: Arc::clone(case),
                context: Arc::clone(&context),
                plaintiff: (*plaintiff).clone(),
                defendant: defendant.clone(),
            })
        })
        .collect();

    tracing::debug!(
        heads = heads.len(),
        defendants = defendants.len(),
        datasets = datasets.len(),
        "Expanded case"
    );
    Ok(datasets)
}
