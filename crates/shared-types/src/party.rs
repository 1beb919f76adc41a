use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryMap;

// ---------------------------------------------------------------------------
// Party Enums
// ---------------------------------------------------------------------------

/// Plaintiff party type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlaintiffType {
    #[default]
    Individual,
    #[serde(alias = "Business")]
    Organization,
}

/// Age category recorded on the intake form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AgeCategory {
    #[default]
    Adult,
    #[serde(alias = "Child")]
    Minor,
}

/// Legal entity type of a defendant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EntityType {
    #[default]
    Individual,
    #[serde(rename = "LLC")]
    Llc,
    Corporation,
    Partnership,
    Trust,
    #[serde(rename = "Government Entity", alias = "Government")]
    GovernmentEntity,
    Other,
}

/// Defendant role. Drives the `IsOwner` / `IsManager` flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DefendantRole {
    Owner,
    Manager,
    #[serde(rename = "Owner & Manager", alias = "OwnerManager", alias = "Owner/Manager")]
    OwnerAndManager,
    #[default]
    Other,
}

pub const IS_OWNER_FLAG: &str = "IsOwner";
pub const IS_MANAGER_FLAG: &str = "IsManager";

/// Every role-derived flag name.
pub const ROLE_FLAGS: &[&str] = &[IS_OWNER_FLAG, IS_MANAGER_FLAG];

impl PlaintiffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Organization => "Organization",
        }
    }
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Llc => "LLC",
            Self::Corporation => "Corporation",
            Self::Partnership => "Partnership",
            Self::Trust => "Trust",
            Self::GovernmentEntity => "Government Entity",
            Self::Other => "Other",
        }
    }
}

impl DefendantRole {
    /// Flags set true for this role.
    pub fn role_flags(&self) -> &'static [&'static str] {
        match self {
            Self::Owner => &[IS_OWNER_FLAG],
            Self::Manager => &[IS_MANAGER_FLAG],
            Self::OwnerAndManager => &[IS_OWNER_FLAG, IS_MANAGER_FLAG],
            Self::Other => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Manager => "Manager",
            Self::OwnerAndManager => "Owner & Manager",
            Self::Other => "Other",
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical Party Records
// ---------------------------------------------------------------------------

/// A plaintiff after normalization.
///
/// `discovery` is always empty unless `is_head_of_household` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plaintiff {
    /// Position in the submission, used in diagnostics and dataset keys.
    pub index: usize,
    pub name: String,
    pub plaintiff_type: PlaintiffType,
    pub age_category: AgeCategory,
    pub unit_number: Option<String>,
    pub is_head_of_household: bool,
    pub discovery: DiscoveryMap,
}

/// A defendant after normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Defendant {
    pub index: usize,
    pub name: String,
    pub entity_type: EntityType,
    pub role: DefendantRole,
}
