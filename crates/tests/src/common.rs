use pipeline::Registry;
use serde_json::json;
use shared_types::{
    AgeCategory, AppSettings, Case, CaseContext, Contact, Dataset, DatasetKey, Defendant,
    DefendantRole, DiscoveryMap, DocumentType, EntityType, FilteredDataset, FlagCount,
    Jurisdiction, Plaintiff, PlaintiffType, PropertyAddress, RawDefendant, RawPlaintiff,
    RawSubmission,
};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Registry over the embedded tables, built once per test binary.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry::embedded().expect("embedded tables must load"))
}

/// Default settings with every document type as the fallback request.
pub fn settings() -> AppSettings {
    let mut settings = AppSettings::default();
    settings.pipeline.default_document_types = DocumentType::ALL.to_vec();
    settings
}

pub fn raw_plaintiff(
    first: &str,
    last: &str,
    head_of_household: bool,
    discovery: &[(&str, &[&str])],
) -> RawPlaintiff {
    RawPlaintiff {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        head_of_household: Some(head_of_household),
        discovery: discovery
            .iter()
            .map(|(category, items)| {
                (
                    category.to_string(),
                    items.iter().map(|i| i.to_string()).collect(),
                )
            })
            .collect(),
        ..Default::default()
    }
}

pub fn raw_defendant(full_name: &str, role: DefendantRole) -> RawDefendant {
    RawDefendant {
        full_name: Some(full_name.to_string()),
        role,
        ..Default::default()
    }
}

pub fn raw_submission(
    plaintiffs: Vec<RawPlaintiff>,
    defendants: Vec<RawDefendant>,
    document_types: Vec<DocumentType>,
) -> RawSubmission {
    let mut raw: RawSubmission = serde_json::from_value(json!({
        "property": {
            "street_address": "1938 Sullivan Lane",
            "city": "Metropolis",
            "state": "NY",
            "zip_code": "10001"
        },
        "filing": { "city": "Metropolis", "county": "New Troy" },
        "submitter": { "name": "Lois Lane", "email": "lois@dailyplanet.example" }
    }))
    .expect("fixture submission parses");
    raw.plaintiffs = plaintiffs;
    raw.defendants = defendants;
    raw.document_types = document_types;
    raw
}

/// The reference scenario: one head-of-household plaintiff with rats and a
/// sewage backup, a non-head child, and one manager defendant.
pub fn clark_kent_submission() -> RawSubmission {
    serde_json::from_value(json!({
        "property": {
            "street_address": "1938 Sullivan Lane",
            "unit": "3",
            "city": "Metropolis",
            "state": "NY",
            "zip_code": "10001"
        },
        "filing": { "city": "Metropolis", "county": "New Troy" },
        "submitter": { "name": "Lois Lane", "email": "lois@dailyplanet.example" },
        "plaintiffs": [
            {
                "first_name": "Clark",
                "last_name": "Kent",
                "unit_number": "3",
                "head_of_household": true,
                "discovery": {
                    "Vermin": ["Rats/Mice"],
                    "Plumbing": ["Sewage coming out"]
                }
            },
            {
                "first_name": "Jonathan",
                "last_name": "Kent",
                "age_category": "Minor",
                "head_of_household": false
            }
        ],
        "defendants": [
            { "first_name": "htd", "last_name": "ewt", "role": "Manager" }
        ],
        "document_types": ["SROGs"]
    }))
    .expect("fixture submission parses")
}

/// A standalone dataset for stage-level tests.
pub fn dataset(plaintiff: &str, defendant: &str, role: DefendantRole, discovery: DiscoveryMap) -> Dataset {
    let case = Arc::new(Case {
        case_id: uuid::Uuid::nil(),
        property: PropertyAddress {
            street: "1938 Sullivan Lane".to_string(),
            unit: None,
            city: "Metropolis".to_string(),
            state: "NY".to_string(),
            zip_code: "10001".to_string(),
        },
        jurisdiction: Jurisdiction::default(),
        submitter: Contact::default(),
        submitted_at: None,
    });
    let context = Arc::new(CaseContext {
        plaintiff_names: vec![plaintiff.to_string()],
        defendant_names: vec![defendant.to_string()],
        property_address: case.property.one_line(),
        jurisdiction: Jurisdiction::default(),
    });
    Dataset {
        key: DatasetKey {
            plaintiff_index: 0,
            defendant_index: 0,
        },
        case,
        context,
        plaintiff: Plaintiff {
            index: 0,
            name: plaintiff.to_string(),
            plaintiff_type: PlaintiffType::Individual,
            age_category: AgeCategory::Adult,
            unit_number: None,
            is_head_of_household: true,
            discovery,
        },
        defendant: Defendant {
            index: 0,
            name: defendant.to_string(),
            entity_type: EntityType::Individual,
            role,
        },
    }
}

/// A filtered interrogatories dataset with the given flags, in order.
pub fn filtered(flags: &[(&str, u32)], first_set_only: &[&str]) -> FilteredDataset {
    let flags: Vec<FlagCount> = flags.iter().map(|(f, c)| FlagCount::new(*f, *c)).collect();
    let total_interrogatories = flags.iter().map(|f| f.count).sum();
    FilteredDataset {
        dataset: Arc::new(dataset(
            "Clark Kent",
            "htd ewt",
            DefendantRole::Manager,
            DiscoveryMap::new(),
        )),
        document_type: DocumentType::Interrogatories,
        suffix: "Discovery Propounded SROGs".to_string(),
        template: "SROGsMaster.docx".to_string(),
        first_set_only: first_set_only.iter().map(|f| f.to_string()).collect(),
        flags,
        total_interrogatories,
    }
}

/// The Clark Kent interrogatory flags in profile order.
pub fn clark_kent_flags() -> Vec<(&'static str, u32)> {
    vec![
        ("SROGsGeneral", 56),
        ("IsManager", 20),
        ("HasVermin", 20),
        ("HasRatsMice", 18),
        ("HasPlumbingIssues", 12),
        ("HasSewageComingOut", 15),
    ]
}

pub const SROGS_FIRST_SET_ONLY: &[&str] = &["SROGsGeneral", "IsOwner", "IsManager"];

/// Flag → count map of a set, for compact assertions.
pub fn counts(flags: &[FlagCount]) -> BTreeMap<String, u32> {
    flags.iter().map(|f| (f.flag.clone(), f.count)).collect()
}
