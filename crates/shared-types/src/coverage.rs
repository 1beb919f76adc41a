//! Mapping coverage report. Makes flag-mapping gaps visible instead of
//! letting selections disappear between the form and the document.

use serde::{Deserialize, Serialize};

use crate::discovery::Category;

/// A discovery selection with no flag mapping. Logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedFlagWarning {
    pub plaintiff_index: usize,
    pub plaintiff_name: String,
    pub category: Category,
    pub item: String,
}

/// A raw category name on the form that matches no canonical category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedCategory {
    pub plaintiff_index: usize,
    pub raw_name: String,
    pub dropped_items: usize,
}

/// A selection that only matched after case/whitespace folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldedMatch {
    pub category: Category,
    pub item: String,
    pub matched_label: String,
    pub flag: String,
}

/// Per-case record of everything the flag mapping could not resolve cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingCoverageReport {
    pub selections_seen: usize,
    pub selections_mapped: usize,
    pub unmapped_items: Vec<UnmappedFlagWarning>,
    pub unmapped_categories: Vec<UnmappedCategory>,
    pub folded_matches: Vec<FoldedMatch>,
}

impl MappingCoverageReport {
    /// True when every selection resolved to a flag.
    pub fn is_complete(&self) -> bool {
        self.unmapped_items.is_empty() && self.unmapped_categories.is_empty()
    }

    /// Fold another report (e.g. from a second plaintiff) into this one.
    /// Identical warnings are kept once.
    pub fn merge(&mut self, other: MappingCoverageReport) {
        self.selections_seen += other.selections_seen;
        self.selections_mapped += other.selections_mapped;
        for warning in other.unmapped_items {
            if !self.unmapped_items.contains(&warning) {
                self.unmapped_items.push(warning);
            }
        }
        self.unmapped_categories.extend(other.unmapped_categories);
        for folded in other.folded_matches {
            if !self.folded_matches.contains(&folded) {
                self.folded_matches.push(folded);
            }
        }
    }
}

/// Configuration gaps between the flag tables and the profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAudit {
    /// Profile entries naming a flag no stage ever sets.
    pub unknown_profile_flags: Vec<(String, String)>,
    /// Specific flags with no count in any profile.
    pub uncounted_flags: Vec<String>,
    /// (form category, option) pairs the flag table cannot resolve.
    pub unmapped_form_options: Vec<(String, String)>,
}
