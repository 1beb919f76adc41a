//! Stage 5: pack a filtered dataset into capped, numbered document sets.
//!
//! `SplitPlan` (partitioned) → `ValidatedPlan` (every constraint checked)
//! → `Vec<DocumentSet>`. Nothing is emitted from a plan that failed
//! validation, so a dataset either splits completely or not at all.
//!
//! Packing is first-fit in profile order. Set 1 opens with every reserved
//! (first-set-only) flag; each distributable flag then goes to the
//! lowest-numbered set with room, opening a new set when none has.

use shared_types::{
    set_filename, total_count, DocumentSet, FilteredDataset, FlagCount, PipelineError,
};

/// Flags partitioned into the set-1 block and the rest.
#[derive(Debug)]
pub struct SplitPlan<'a> {
    source: &'a FilteredDataset,
    reserved: Vec<FlagCount>,
    distributable: Vec<FlagCount>,
}

/// A plan whose flags are known to fit under `cap`.
#[derive(Debug)]
pub struct ValidatedPlan<'a> {
    plan: SplitPlan<'a>,
    cap: u32,
}

impl<'a> SplitPlan<'a> {
    pub fn new(source: &'a FilteredDataset) -> Self {
        let (reserved, distributable): (Vec<FlagCount>, Vec<FlagCount>) = source
            .flags
            .iter()
            .cloned()
            .partition(|f| source.first_set_only.contains(&f.flag));
        Self {
            source,
            reserved,
            distributable,
        }
    }

    pub fn reserved(&self) -> &[FlagCount] {
        &self.reserved
    }

    pub fn distributable(&self) -> &[FlagCount] {
        &self.distributable
    }

    /// Check the cap against every flag and against the reserved block.
    pub fn validate(self, cap: u32) -> Result<ValidatedPlan<'a>, PipelineError> {
        if cap == 0 {
            return Err(PipelineError::configuration("Set cap must be greater than zero"));
        }

        if let Some(oversized) = self.source.flags.iter().find(|f| f.count > cap) {
            return Err(PipelineError::oversized_flag(format!(
                "{} for {} v {} carries {} interrogatories, over the cap of {}",
                oversized.flag,
                self.source.plaintiff_name(),
                self.source.defendant_name(),
                oversized.count,
                cap
            )));
        }

        let reserved_total = total_count(&self.reserved);
        if reserved_total > cap {
            let names: Vec<&str> = self.reserved.iter().map(|f| f.flag.as_str()).collect();
            return Err(PipelineError::oversized_flag(format!(
                "First-set-only flags [{}] for {} v {} total {}, over the cap of {}",
                names.join(", "),
                self.source.plaintiff_name(),
                self.source.defendant_name(),
                reserved_total,
                cap
            )));
        }

        Ok(ValidatedPlan { plan: self, cap })
    }
}

impl ValidatedPlan<'_> {
    /// Pack and number the sets.
    pub fn into_sets(self) -> Vec<DocumentSet> {
        let ValidatedPlan {
            plan:
                SplitPlan {
                    source,
                    reserved,
                    distributable,
                },
            cap,
        } = self;

        let mut bins: Vec<(Vec<FlagCount>, u32)> = Vec::new();
        if !reserved.is_empty() {
            let total = total_count(&reserved);
            bins.push((reserved, total));
        }

        for flag in distributable {
            match bins.iter_mut().find(|(_, total)| *total + flag.count <= cap) {
                Some((flags, total)) => {
                    *total += flag.count;
                    flags.push(flag);
                }
                None => {
                    let total = flag.count;
                    bins.push((vec![flag], total));
                }
            }
        }

        let total_sets = bins.len();
        let mut next_item: u32 = 1;
        bins.into_iter()
            .enumerate()
            .map(|(idx, (flags, count))| {
                let set_number = idx + 1;
                let set = DocumentSet {
                    set_number,
                    total_sets,
                    flags,
                    count,
                    first_item_number: next_item,
                    filename: set_filename(
                        set_number,
                        source.plaintiff_name(),
                        source.defendant_name(),
                        &source.suffix,
                    ),
                };
                next_item += count;
                set
            })
            .collect()
    }
}

/// Split one filtered dataset into sets of at most `cap` interrogatories.
///
/// A dataset with no surviving flags yields no sets.
#[tracing::instrument(
    skip_all,
    fields(dataset = %filtered.dataset.key, document_type = %filtered.document_type, cap = cap)
)]
pub fn split(filtered: &FilteredDataset, cap: u32) -> Result<Vec<DocumentSet>, PipelineError> {
    let sets = SplitPlan::new(filtered).validate(cap)?.into_sets();
    tracing::debug!(
        sets = sets.len(),
        total = filtered.total_interrogatories,
        "Dataset split"
    );
    Ok(sets)
}
