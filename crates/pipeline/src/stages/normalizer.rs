//! Stage 1: raw form submission → canonical case and party records.
//!
//! This is the only place the submission is validated. Everything after
//! it works on typed records.

use shared_types::{
    Case, Contact, Defendant, DiscoveryMap, DocumentType, Jurisdiction, MappingCoverageReport,
    PipelineError, Plaintiff, PropertyAddress, RawPlaintiff, RawSubmission, UnmappedCategory,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::registry::Registry;

/// Canonical records for one case.
#[derive(Debug, Clone)]
pub struct NormalizedSubmission {
    pub case: Arc<Case>,
    pub plaintiffs: Vec<Plaintiff>,
    pub defendants: Vec<Defendant>,
    pub document_types: Vec<DocumentType>,
    /// Raw categories that matched nothing. Item-level gaps are added by
    /// the flag processor.
    pub coverage: MappingCoverageReport,
}

/// Validate and canonicalize a submission.
///
/// `default_document_types` is used when the submission requests none.
#[tracing::instrument(
    skip_all,
    fields(plaintiffs = raw.plaintiffs.len(), defendants = raw.defendants.len())
)]
pub fn normalize(
    raw: &RawSubmission,
    registry: &Registry,
    default_document_types: &[DocumentType],
) -> Result<NormalizedSubmission, PipelineError> {
    let mut field_errors = match raw.validate() {
        Ok(()) => BTreeMap::new(),
        Err(errors) => PipelineError::from(errors).field_errors,
    };

    if clean(&raw.property.street_address).is_empty() {
        field_errors
            .entry("property.street_address".to_string())
            .or_insert_with(|| "Property street address is required".to_string());
    }
    if let Some(email) = clean_opt(raw.submitter.email.as_deref()) {
        if !email.validate_email() {
            field_errors.insert(
                "submitter.email".to_string(),
                "Submitter email is not a valid address".to_string(),
            );
        }
    }

    let plaintiff_names: Vec<String> = raw.plaintiffs.iter().map(RawPlaintiff::display_name).collect();
    let defendant_names: Vec<String> = raw.defendants.iter().map(|d| d.display_name()).collect();

    for (idx, name) in plaintiff_names.iter().enumerate() {
        if name.is_empty() {
            field_errors.insert(format!("plaintiffs[{idx}].name"), "Plaintiff name is required".to_string());
        }
    }
    for (idx, name) in defendant_names.iter().enumerate() {
        if name.is_empty() {
            field_errors.insert(format!("defendants[{idx}].name"), "Defendant name is required".to_string());
        }
    }

    let document_types = requested_document_types(&raw.document_types, default_document_types);
    if document_types.is_empty() {
        field_errors.insert(
            "document_types".to_string(),
            "At least one document type is required".to_string(),
        );
    }

    if !field_errors.is_empty() {
        tracing::warn!(errors = field_errors.len(), "Submission rejected");
        return Err(PipelineError::validation("Submission failed validation", field_errors));
    }

    let property = PropertyAddress {
        street: clean(&raw.property.street_address),
        unit: clean_opt(raw.property.unit.as_deref()),
        city: clean(&raw.property.city),
        state: clean(&raw.property.state),
        zip_code: clean(&raw.property.zip_code),
    };

    let case_id = raw
        .case_id
        .unwrap_or_else(|| derive_case_id(&property, &plaintiff_names, &defendant_names));

    let case = Arc::new(Case {
        case_id,
        property,
        jurisdiction: Jurisdiction {
            city: clean(&raw.filing.city),
            county: clean(&raw.filing.county),
        },
        submitter: Contact {
            name: clean(&raw.submitter.name),
            email: clean_opt(raw.submitter.email.as_deref()),
            phone: clean_opt(raw.submitter.phone.as_deref()),
        },
        submitted_at: raw.submitted_at,
    });

    let mut coverage = MappingCoverageReport::default();
    let plaintiffs = raw
        .plaintiffs
        .iter()
        .zip(plaintiff_names)
        .enumerate()
        .map(|(index, (p, name))| normalize_plaintiff(index, p, name, registry, &mut coverage))
        .collect();

    let defendants = raw
        .defendants
        .iter()
        .zip(defendant_names)
        .enumerate()
        .map(|(index, (d, name))| Defendant {
            index,
            name,
            entity_type: d.entity_type.clone(),
            role: d.role,
        })
        .collect();

    tracing::debug!(case_id = %case.case_id, ?document_types, "Submission normalized");

    Ok(NormalizedSubmission {
        case,
        plaintiffs,
        defendants,
        document_types,
        coverage,
    })
}

fn normalize_plaintiff(
    index: usize,
    raw: &RawPlaintiff,
    name: String,
    registry: &Registry,
    coverage: &mut MappingCoverageReport,
) -> Plaintiff {
    let is_head_of_household = raw.head_of_household.unwrap_or(false);
    let mut discovery = DiscoveryMap::new();

    if is_head_of_household {
        for (raw_name, items) in &raw.discovery {
            match registry.category_for_raw(raw_name) {
                Some(category) => discovery.extend(category, items),
                None => {
                    let dropped_items = items.iter().filter(|i| !i.trim().is_empty()).count();
                    if dropped_items == 0 {
                        continue;
                    }
                    tracing::warn!(
                        plaintiff = %name,
                        category = %raw_name,
                        dropped_items,
                        "Unknown discovery category"
                    );
                    coverage.selections_seen += dropped_items;
                    coverage.unmapped_categories.push(UnmappedCategory {
                        plaintiff_index: index,
                        raw_name: raw_name.clone(),
                        dropped_items,
                    });
                }
            }
        }
    } else if raw.discovery.values().any(|items| !items.is_empty()) {
        tracing::debug!(plaintiff = %name, "Dropping discovery data of non head-of-household plaintiff");
    }

    Plaintiff {
        index,
        name,
        plaintiff_type: raw.plaintiff_type,
        age_category: raw.age_category,
        unit_number: clean_opt(raw.unit_number.as_deref()),
        is_head_of_household,
        discovery,
    }
}

/// Requested types in first-seen order without repeats, or the defaults.
fn requested_document_types(
    requested: &[DocumentType],
    defaults: &[DocumentType],
) -> Vec<DocumentType> {
    let source = if requested.is_empty() { defaults } else { requested };
    let mut out = Vec::with_capacity(source.len());
    for dt in source {
        if !out.contains(dt) {
            out.push(*dt);
        }
    }
    out
}

/// Stable id for a submission that arrived without one.
fn derive_case_id(property: &PropertyAddress, plaintiffs: &[String], defendants: &[String]) -> Uuid {
    let key = format!(
        "{}|{}|{}",
        property.one_line(),
        plaintiffs.join(";"),
        defendants.join(";")
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

fn clean(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_opt(s: Option<&str>) -> Option<String> {
    s.map(clean).filter(|s| !s.is_empty())
}
