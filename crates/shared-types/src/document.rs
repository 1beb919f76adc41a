//! Records produced by the expansion, filtering and splitting stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::case::{Case, CaseContext};
use crate::flags::{total_count, FlagCount, FlagSet};
use crate::party::{Defendant, Plaintiff};
use crate::profile::DocumentType;

// ─── Datasets ──────────────────────────────────────────────────

/// Identifies a dataset by the submission positions of its two parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub plaintiff_index: usize,
    pub defendant_index: usize,
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}-d{}", self.plaintiff_index, self.defendant_index)
    }
}

/// One head-of-household plaintiff paired with one defendant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub key: DatasetKey,
    pub case: Arc<Case>,
    pub context: Arc<CaseContext>,
    pub plaintiff: Plaintiff,
    pub defendant: Defendant,
}

/// A dataset with its derived flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedDataset {
    pub dataset: Arc<Dataset>,
    pub flags: FlagSet,
}

/// A dataset narrowed to one document type.
///
/// `flags` holds only true flags with a non-zero count, in profile order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredDataset {
    pub dataset: Arc<Dataset>,
    pub document_type: DocumentType,
    pub suffix: String,
    pub template: String,
    pub first_set_only: Vec<String>,
    pub flags: Vec<FlagCount>,
    pub total_interrogatories: u32,
}

impl FilteredDataset {
    pub fn plaintiff_name(&self) -> &str {
        &self.dataset.plaintiff.name
    }

    pub fn defendant_name(&self) -> &str {
        &self.dataset.defendant.name
    }

    /// Surviving flags as a flag set, all true.
    pub fn flag_set(&self) -> FlagSet {
        self.flags.iter().map(|f| (f.flag.clone(), true)).collect()
    }

    /// Recomputes the total from `flags`.
    pub fn computed_total(&self) -> u32 {
        total_count(&self.flags)
    }
}

// ─── Document Sets ─────────────────────────────────────────────

/// Filename for one set: `Set {n} - {plaintiff} v {defendant} - {suffix}`.
pub fn set_filename(set_number: usize, plaintiff: &str, defendant: &str, suffix: &str) -> String {
    format!("Set {} - {} v {} - {}", set_number, plaintiff, defendant, suffix)
}

/// One capped partition of a filtered dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    /// 1-based, contiguous.
    pub set_number: usize,
    pub total_sets: usize,
    pub flags: Vec<FlagCount>,
    /// Sum of `flags` counts.
    pub count: u32,
    /// Number of the first interrogatory in this set (running offset + 1).
    pub first_item_number: u32,
    pub filename: String,
}

impl DocumentSet {
    pub fn contains(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.flag == flag)
    }
}

// ─── Render Jobs ───────────────────────────────────────────────

/// Party identity printed in the document caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyCaption {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
}

/// Self-contained job handed to the rendering collaborator, one per set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Stable across re-runs: `{case_id}/{dataset}/{document_type}/{set}`.
    pub job_id: String,
    pub case_id: Uuid,
    pub document_type: DocumentType,
    pub template: String,
    pub filename: String,
    pub set_number: usize,
    pub total_sets: usize,
    pub first_item_number: u32,
    pub item_count: u32,
    pub plaintiff: PartyCaption,
    pub defendant: PartyCaption,
    pub context: CaseContext,
    pub flags: BTreeMap<String, u32>,
}
