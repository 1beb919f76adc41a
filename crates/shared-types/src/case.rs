use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Street address of the rental property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl PropertyAddress {
    /// Single-line form used in captions: `123 Main St, Unit 4, Los Angeles, CA 90012`.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.clone()];
        if let Some(unit) = &self.unit {
            parts.push(format!("Unit {}", unit));
        }
        if !self.city.is_empty() {
            parts.push(self.city.clone());
        }
        let tail = [self.state.as_str(), self.zip_code.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if !tail.is_empty() {
            parts.push(tail);
        }
        parts.join(", ")
    }
}

/// Court venue the case is filed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Jurisdiction {
    pub city: String,
    pub county: String,
}

/// Person who submitted the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Contact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Case-level facts shared by every dataset derived from one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: Uuid,
    pub property: PropertyAddress,
    pub jurisdiction: Jurisdiction,
    pub submitter: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Names of every party on the case, for document captions.
///
/// Includes plaintiffs who do not head a household and so never get their
/// own dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseContext {
    pub plaintiff_names: Vec<String>,
    pub defendant_names: Vec<String>,
    pub property_address: String,
    pub jurisdiction: Jurisdiction,
}
