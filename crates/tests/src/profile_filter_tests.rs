use crate::common::*;
use pipeline::stages::{filter, filter_all, process};
use pretty_assertions::assert_eq;
use shared_types::{
    Category, DefendantRole, DiscoveryMap, DocumentType, FlagCount, FlaggedDataset,
    PipelineErrorKind,
};
use std::sync::Arc;

fn clark_kent_flagged() -> FlaggedDataset {
    let mut discovery = DiscoveryMap::new();
    discovery.extend(Category::Vermin, ["Rats/Mice"]);
    discovery.extend(Category::Plumbing, ["Sewage coming out"]);
    let d = dataset("Clark Kent", "htd ewt", DefendantRole::Manager, discovery);
    let flags = process(&d, registry());
    FlaggedDataset {
        dataset: Arc::new(d),
        flags,
    }
}

#[test]
fn clark_kent_interrogatories() {
    let profile = registry().profile(DocumentType::Interrogatories).unwrap();
    let f = filter(&clark_kent_flagged(), profile);
    assert_eq!(
        f.flags,
        clark_kent_flags()
            .into_iter()
            .map(|(flag, count)| FlagCount::new(flag, count))
            .collect::<Vec<_>>()
    );
    assert_eq!(f.total_interrogatories, 141);
    assert_eq!(f.suffix, "Discovery Propounded SROGs");
    assert_eq!(f.template, "SROGsMaster.docx");
}

#[test]
fn other_document_types_keep_only_their_own_general_flag() {
    let flagged = clark_kent_flagged();
    let pods = filter(&flagged, registry().profile(DocumentType::ProductionRequests).unwrap());
    assert!(pods.flags.iter().any(|f| f.flag == "PODsGeneral"));
    assert!(!pods.flags.iter().any(|f| f.flag == "SROGsGeneral"));
    assert_eq!(pods.total_interrogatories, 62);

    let rfas = filter(&flagged, registry().profile(DocumentType::Admissions).unwrap());
    assert_eq!(rfas.flags[0], FlagCount::new("AdmissionsGeneral", 23));
    assert_eq!(rfas.total_interrogatories, 36);
}

#[test]
fn true_flags_missing_from_profile_excluded() {
    let mut discovery = DiscoveryMap::new();
    discovery.extend(Category::GovernmentEntities, ["Health Department"]);
    let d = dataset("Clark Kent", "htd ewt", DefendantRole::Other, discovery);
    let flagged = FlaggedDataset {
        flags: process(&d, registry()),
        dataset: Arc::new(d),
    };
    assert!(flagged.flags.is_set("HasHealthDepartmentContacted"));

    let rfas = filter(&flagged, registry().profile(DocumentType::Admissions).unwrap());
    assert_eq!(rfas.flags, vec![FlagCount::new("AdmissionsGeneral", 23)]);
}

#[test]
fn refiltering_is_a_no_op() {
    let profile = registry().profile(DocumentType::Interrogatories).unwrap();
    let once = filter(&clark_kent_flagged(), profile);
    let again = filter(
        &FlaggedDataset {
            dataset: Arc::clone(&once.dataset),
            flags: once.flag_set(),
        },
        profile,
    );
    assert_eq!(once, again);
}

#[test]
fn filter_all_is_dataset_major() {
    let a = clark_kent_flagged();
    let b = clark_kent_flagged();
    let types = [DocumentType::Admissions, DocumentType::Interrogatories];
    let filtered = filter_all(&[a, b], &types, registry()).unwrap();
    assert_eq!(filtered.len(), 4);
    let order: Vec<DocumentType> = filtered.iter().map(|f| f.document_type).collect();
    assert_eq!(
        order,
        vec![
            DocumentType::Admissions,
            DocumentType::Interrogatories,
            DocumentType::Admissions,
            DocumentType::Interrogatories,
        ]
    );
    assert!(filtered.iter().all(|f| f.computed_total() == f.total_interrogatories));
}

#[test]
fn filter_all_without_profile_is_configuration_error() {
    let mut sources = pipeline::registry::TableSources::embedded();
    sources.profiles.retain(|(name, _)| name != "admissions.toml");
    let registry = pipeline::Registry::from_sources(&sources).unwrap();
    let err = filter_all(&[clark_kent_flagged()], &[DocumentType::Admissions], &registry).unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::ConfigurationError);
}
