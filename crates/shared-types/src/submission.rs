//! Raw intake-form submission as received from the web layer.
//!
//! Loosely shaped on purpose: the normalizer is the single place that
//! checks it and turns it into canonical records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::party::{AgeCategory, DefendantRole, EntityType, PlaintiffType};
use crate::profile::DocumentType;

/// Property block of the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct RawProperty {
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Property street address is required"))
    )]
    pub street_address: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Filing venue block of the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFiling {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub county: String,
}

/// Submitter contact block of the form. Blank email is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSubmitter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One plaintiff row. `discovery` is keyed by the raw form category name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlaintiff {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Organization name, or a pre-joined full name.
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, rename = "type")]
    pub plaintiff_type: PlaintiffType,
    #[serde(default)]
    pub age_category: AgeCategory,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default, alias = "HeadOfHousehold")]
    pub head_of_household: Option<bool>,
    #[serde(default)]
    pub discovery: BTreeMap<String, Vec<String>>,
}

/// One defendant row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDefendant {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub entity_type: EntityType,
    #[serde(default)]
    pub role: DefendantRole,
}

/// The whole submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct RawSubmission {
    /// Caller-assigned case identifier. Derived deterministically when absent.
    #[serde(default)]
    pub case_id: Option<Uuid>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[cfg_attr(feature = "validation", validate(nested))]
    pub property: RawProperty,
    #[serde(default)]
    pub filing: RawFiling,
    #[serde(default)]
    pub submitter: RawSubmitter,
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "At least one plaintiff is required"))
    )]
    pub plaintiffs: Vec<RawPlaintiff>,
    #[serde(default)]
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "At least one defendant is required"))
    )]
    pub defendants: Vec<RawDefendant>,
    #[serde(default)]
    pub document_types: Vec<DocumentType>,
}

/// Display name from a raw party row: `full_name` wins, else first + last.
pub fn display_name(
    full_name: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> String {
    if let Some(full) = full_name.map(str::trim).filter(|s| !s.is_empty()) {
        return collapse_whitespace(full);
    }
    let joined = [first_name, last_name]
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl RawPlaintiff {
    pub fn display_name(&self) -> String {
        display_name(
            self.full_name.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}

impl RawDefendant {
    pub fn display_name(&self) -> String {
        display_name(
            self.full_name.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }
}
