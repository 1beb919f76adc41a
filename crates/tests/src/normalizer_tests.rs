use crate::common::*;
use pipeline::stages::normalize;
use pretty_assertions::assert_eq;
use shared_types::{Category, DefendantRole, DocumentType, PipelineErrorKind};
use uuid::Uuid;

#[test]
fn clark_kent_normalizes() {
    let n = normalize(&clark_kent_submission(), registry(), &[]).unwrap();
    assert_eq!(n.plaintiffs.len(), 2);
    assert_eq!(n.defendants.len(), 1);
    assert_eq!(n.plaintiffs[0].name, "Clark Kent");
    assert_eq!(n.defendants[0].name, "htd ewt");
    assert_eq!(n.defendants[0].role, DefendantRole::Manager);
    assert_eq!(n.document_types, vec![DocumentType::Interrogatories]);
    assert_eq!(n.case.property.street, "1938 Sullivan Lane");
    assert_eq!(n.case.jurisdiction.county, "New Troy");
    assert_eq!(n.plaintiffs[0].discovery.items(Category::Vermin), ["Rats/Mice"]);
    assert_eq!(
        n.plaintiffs[0].discovery.items(Category::Plumbing),
        ["Sewage coming out"]
    );
}

#[test]
fn missing_street_address_is_validation_error() {
    let mut raw = clark_kent_submission();
    raw.property.street_address = String::new();
    let err = normalize(&raw, registry(), &[]).unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::ValidationError);
    assert_eq!(
        err.field_errors.get("property.street_address").map(String::as_str),
        Some("Property street address is required")
    );
}

#[test]
fn blank_street_address_is_validation_error() {
    let mut raw = clark_kent_submission();
    raw.property.street_address = "   ".to_string();
    let err = normalize(&raw, registry(), &[]).unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::ValidationError);
    assert_eq!(
        err.field_errors.get("property.street_address").map(String::as_str),
        Some("Property street address is required")
    );
}

#[test]
fn missing_parties_reported_together() {
    let raw = raw_submission(vec![], vec![], vec![DocumentType::Interrogatories]);
    let err = normalize(&raw, registry(), &[]).unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::ValidationError);
    assert!(err.field_errors.contains_key("plaintiffs"));
    assert!(err.field_errors.contains_key("defendants"));
}

#[test]
fn blank_party_names_reported_by_path() {
    let raw = raw_submission(
        vec![
            raw_plaintiff("Clark", "Kent", true, &[]),
            raw_plaintiff("  ", "", false, &[]),
        ],
        vec![raw_defendant("   ", DefendantRole::Owner)],
        vec![],
    );
    let err = normalize(&raw, registry(), &DocumentType::ALL).unwrap_err();
    assert_eq!(
        err.field_errors.keys().cloned().collect::<Vec<_>>(),
        vec!["defendants[0].name".to_string(), "plaintiffs[1].name".to_string()]
    );
}

#[test]
fn invalid_submitter_email_rejected() {
    let mut raw = clark_kent_submission();
    raw.submitter.email = Some("not-an-email".to_string());
    let err = normalize(&raw, registry(), &[]).unwrap_err();
    assert!(err.field_errors.contains_key("submitter.email"));
}

#[test]
fn blank_submitter_email_treated_as_absent() {
    for blank in ["", "   "] {
        let mut raw = clark_kent_submission();
        raw.submitter.email = Some(blank.to_string());
        let n = normalize(&raw, registry(), &[]).unwrap();
        assert_eq!(n.case.submitter.email, None);
    }
}

#[test]
fn submitter_email_trimmed() {
    let mut raw = clark_kent_submission();
    raw.submitter.email = Some("  lois@dailyplanet.example ".to_string());
    let n = normalize(&raw, registry(), &[]).unwrap();
    assert_eq!(
        n.case.submitter.email.as_deref(),
        Some("lois@dailyplanet.example")
    );
}

#[test]
fn non_head_of_household_discovery_dropped() {
    let raw = raw_submission(
        vec![
            raw_plaintiff("Clark", "Kent", true, &[("Vermin", &["Bats"])]),
            raw_plaintiff("Jonathan", "Kent", false, &[("Vermin", &["Rats/Mice"])]),
        ],
        vec![raw_defendant("htd ewt", DefendantRole::Owner)],
        vec![],
    );
    let n = normalize(&raw, registry(), &DocumentType::ALL).unwrap();
    assert!(n.plaintiffs[0].is_head_of_household);
    assert!(!n.plaintiffs[1].is_head_of_household);
    assert!(n.plaintiffs[1].discovery.is_empty());
}

#[test]
fn absent_head_of_household_means_false() {
    let mut plaintiff = raw_plaintiff("Clark", "Kent", true, &[("Vermin", &["Bats"])]);
    plaintiff.head_of_household = None;
    let raw = raw_submission(
        vec![plaintiff],
        vec![raw_defendant("htd ewt", DefendantRole::Owner)],
        vec![],
    );
    let n = normalize(&raw, registry(), &DocumentType::ALL).unwrap();
    assert!(!n.plaintiffs[0].is_head_of_household);
    assert!(n.plaintiffs[0].discovery.is_empty());
}

#[test]
fn raw_category_names_resolve_case_insensitively() {
    let raw = raw_submission(
        vec![raw_plaintiff(
            "Clark",
            "Kent",
            true,
            &[
                ("Fire Hazard", &["Smoke Alarms"]),
                ("trash problems", &["Inadequate number of receptacles"]),
                ("Specific Government Entity Contacted", &["Health Department"]),
            ],
        )],
        vec![raw_defendant("htd ewt", DefendantRole::Owner)],
        vec![],
    );
    let n = normalize(&raw, registry(), &DocumentType::ALL).unwrap();
    let discovery = &n.plaintiffs[0].discovery;
    assert_eq!(discovery.items(Category::FireHazard), ["Smoke Alarms"]);
    assert_eq!(
        discovery.items(Category::Trash),
        ["Inadequate number of receptacles"]
    );
    assert_eq!(
        discovery.items(Category::GovernmentEntities),
        ["Health Department"]
    );
    assert!(discovery.items(Category::Insects).is_empty());
}

#[test]
fn items_trimmed_and_deduplicated() {
    let raw = raw_submission(
        vec![raw_plaintiff(
            "Clark",
            "Kent",
            true,
            &[("Vermin", &[" Bats ", "Bats", "", "Skunks", "Bats"])],
        )],
        vec![raw_defendant("htd ewt", DefendantRole::Owner)],
        vec![],
    );
    let n = normalize(&raw, registry(), &DocumentType::ALL).unwrap();
    assert_eq!(n.plaintiffs[0].discovery.items(Category::Vermin), ["Bats", "Skunks"]);
}

#[test]
fn unknown_category_recorded_not_fatal() {
    let raw = raw_submission(
        vec![raw_plaintiff(
            "Clark",
            "Kent",
            true,
            &[("Pets", &["Dog", "Cat"]), ("Vermin", &["Bats"])],
        )],
        vec![raw_defendant("htd ewt", DefendantRole::Owner)],
        vec![],
    );
    let n = normalize(&raw, registry(), &DocumentType::ALL).unwrap();
    assert_eq!(n.coverage.unmapped_categories.len(), 1);
    assert_eq!(n.coverage.unmapped_categories[0].raw_name, "Pets");
    assert_eq!(n.coverage.unmapped_categories[0].dropped_items, 2);
    assert_eq!(n.plaintiffs[0].discovery.selection_count(), 1);
}

#[test]
fn document_type_aliases_deduplicated() {
    let mut raw = clark_kent_submission();
    raw.document_types = serde_json::from_str(r#"["SROGs", "RFAs", "Interrogatories", "PODs"]"#).unwrap();
    let n = normalize(&raw, registry(), &[]).unwrap();
    assert_eq!(
        n.document_types,
        vec![
            DocumentType::Interrogatories,
            DocumentType::Admissions,
            DocumentType::ProductionRequests,
        ]
    );
}

#[test]
fn no_document_types_uses_defaults_or_fails() {
    let mut raw = clark_kent_submission();
    raw.document_types.clear();

    let n = normalize(&raw, registry(), &[DocumentType::Admissions]).unwrap();
    assert_eq!(n.document_types, vec![DocumentType::Admissions]);

    let err = normalize(&raw, registry(), &[]).unwrap_err();
    assert!(err.field_errors.contains_key("document_types"));
}

#[test]
fn case_id_derived_deterministically() {
    let a = normalize(&clark_kent_submission(), registry(), &[]).unwrap();
    let b = normalize(&clark_kent_submission(), registry(), &[]).unwrap();
    assert_eq!(a.case.case_id, b.case.case_id);
    assert_ne!(a.case.case_id, Uuid::nil());
}

#[test]
fn supplied_case_id_kept() {
    let id = Uuid::from_u128(0x1938);
    let mut raw = clark_kent_submission();
    raw.case_id = Some(id);
    let n = normalize(&raw, registry(), &[]).unwrap();
    assert_eq!(n.case.case_id, id);
}
