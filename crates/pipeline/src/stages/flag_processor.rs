//! Stage 3: discovery selections and defendant role → flags.
//!
//! Four kinds of flag, applied in this order:
//! 1. specific flags, one per mapped (category, item) selection
//! 2. aggregate flags, true when any constituent is true
//! 3. `IsOwner` / `IsManager` from the defendant's role
//! 4. the general flag of every document type, always true

use shared_types::{
    Dataset, FlagSet, FoldedMatch, MappingCoverageReport, Plaintiff, UnmappedFlagWarning,
};
use std::collections::BTreeSet;

use crate::registry::{AggregateRule, FlagLookup, Registry};

/// Specific flags a plaintiff's selections map to, and what failed to map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSelections {
    pub flags: BTreeSet<String>,
    pub coverage: MappingCoverageReport,
}

/// Map every discovery selection of one plaintiff to its specific flag.
///
/// Depends only on the plaintiff, so the engine runs it once per plaintiff
/// rather than once per dataset.
#[tracing::instrument(skip_all, fields(plaintiff = %plaintiff.name))]
pub fn resolve_selections(plaintiff: &Plaintiff, registry: &Registry) -> ResolvedSelections {
    let mut resolved = ResolvedSelections::default();

    for (category, items) in plaintiff.discovery.iter() {
        for item in items {
            resolved.coverage.selections_seen += 1;
            match registry.lookup(category, item) {
                FlagLookup::Exact(flag) => {
                    resolved.coverage.selections_mapped += 1;
                    resolved.flags.insert(flag.to_string());
                }
                FlagLookup::Folded { label, flag } => {
                    tracing::debug!(%category, item = %item, matched = label, "Case-folded flag match");
                    resolved.coverage.selections_mapped += 1;
                    resolved.coverage.folded_matches.push(FoldedMatch {
                        category,
                        item: item.clone(),
                        matched_label: label.to_string(),
                        flag: flag.to_string(),
                    });
                    resolved.flags.insert(flag.to_string());
                }
                FlagLookup::Unmapped => {
                    tracing::warn!(%category, item = %item, "No flag mapped for discovery item");
                    resolved.coverage.unmapped_items.push(UnmappedFlagWarning {
                        plaintiff_index: plaintiff.index,
                        plaintiff_name: plaintiff.name.clone(),
                        category,
                        item: item.clone(),
                    });
                }
            }
        }
    }

    resolved
}

/// True when any constituent of `rule` is set.
pub fn aggregate_value(rule: &AggregateRule, flags: &FlagSet) -> bool {
    rule.members.iter().any(|member| flags.is_set(member))
}

/// Full flag set for a dataset from its plaintiff's resolved selections.
pub fn flags_for(dataset: &Dataset, specific: &BTreeSet<String>, registry: &Registry) -> FlagSet {
    let mut flags = FlagSet::seeded(registry.known_flags().iter().cloned());

    for flag in specific {
        flags.set(flag.clone(), true);
    }

    let aggregates: Vec<(&str, bool)> = registry
        .aggregates()
        .iter()
        .map(|rule| (rule.name.as_str(), aggregate_value(rule, &flags)))
        .collect();
    for (name, value) in aggregates {
        flags.set(name, value);
    }

    for role_flag in dataset.defendant.role.role_flags() {
        flags.set(*role_flag, true);
    }

    for general in registry.general_flags() {
        flags.set(general, true);
    }

    flags
}

/// Derive every flag for one dataset.
#[tracing::instrument(skip_all, fields(dataset = %dataset.key))]
pub fn process(dataset: &Dataset, registry: &Registry) -> FlagSet {
    let resolved = resolve_selections(&dataset.plaintiff, registry);
    let flags = flags_for(dataset, &resolved.flags, registry);
    tracing::debug!(true_flags = flags.true_count(), "Flags derived");
    flags
}
