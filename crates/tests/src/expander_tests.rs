use crate::common::*;
use pipeline::stages::{expand, normalize};
use pretty_assertions::assert_eq;
use shared_types::{DefendantRole, DocumentType, PipelineErrorKind};
use std::sync::Arc;

fn normalized(heads: usize, others: usize, defendants: usize) -> pipeline::stages::NormalizedSubmission {
    let mut plaintiffs = Vec::new();
    for i in 0..heads {
        plaintiffs.push(raw_plaintiff("Head", &format!("Tenant{i}"), true, &[("Vermin", &["Bats"])]));
    }
    for i in 0..others {
        plaintiffs.push(raw_plaintiff("Other", &format!("Tenant{i}"), false, &[]));
    }
    let defendants = (0..defendants)
        .map(|i| raw_defendant(&format!("Landlord {i}"), DefendantRole::Owner))
        .collect();
    let raw = raw_submission(plaintiffs, defendants, vec![DocumentType::Interrogatories]);
    normalize(&raw, registry(), &[]).unwrap()
}

#[test]
fn dataset_count_is_heads_times_defendants() {
    let n = normalized(3, 2, 4);
    let datasets = expand(&n.case, &n.plaintiffs, &n.defendants).unwrap();
    assert_eq!(datasets.len(), 12);
    assert!(datasets.iter().all(|d| d.plaintiff.is_head_of_household));
}

#[test]
fn plaintiff_major_defendant_minor_order() {
    let n = normalized(2, 0, 2);
    let datasets = expand(&n.case, &n.plaintiffs, &n.defendants).unwrap();
    let keys: Vec<String> = datasets.iter().map(|d| d.key.to_string()).collect();
    assert_eq!(keys, vec!["p0-d0", "p0-d1", "p1-d0", "p1-d1"]);
}

#[test]
fn non_heads_only_in_context() {
    let n = normalize(&clark_kent_submission(), registry(), &[]).unwrap();
    let datasets = expand(&n.case, &n.plaintiffs, &n.defendants).unwrap();
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0].plaintiff.name, "Clark Kent");
    assert_eq!(
        datasets[0].context.plaintiff_names,
        vec!["Clark Kent".to_string(), "Jonathan Kent".to_string()]
    );
    assert_eq!(datasets[0].context.defendant_names, vec!["htd ewt".to_string()]);
}

#[test]
fn case_and_context_shared_not_copied() {
    let n = normalized(2, 0, 3);
    let datasets = expand(&n.case, &n.plaintiffs, &n.defendants).unwrap();
    assert!(datasets.iter().all(|d| Arc::ptr_eq(&d.case, &n.case)));
    assert!(datasets.windows(2).all(|w| Arc::ptr_eq(&w[0].context, &w[1].context)));
}

#[test]
fn no_head_of_household_is_empty_expansion() {
    let n = normalized(0, 2, 1);
    let err = expand(&n.case, &n.plaintiffs, &n.defendants).unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::EmptyExpansionError);
}

#[test]
fn no_defendants_is_empty_expansion() {
    let n = normalized(1, 0, 1);
    let err = expand(&n.case, &n.plaintiffs, &[]).unwrap_err();
    assert_eq!(err.kind, PipelineErrorKind::EmptyExpansionError);
}
