//! Canonical discovery categories and the per-plaintiff selection map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The 21 canonical discovery categories.
///
/// Raw form names ("Fire Hazard", "Specific Government Entity Contacted")
/// are resolved to these keys through `config/categories.toml`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Vermin,
    Insects,
    Hvac,
    Electrical,
    FireHazard,
    GovernmentEntities,
    Plumbing,
    Cabinets,
    Flooring,
    Windows,
    Doors,
    Structure,
    CommonAreas,
    Nuisance,
    HealthHazard,
    Harassment,
    Notices,
    Utilities,
    Safety,
    Appliances,
    Trash,
}

impl Category {
    pub const ALL: [Category; 21] = [
        Category::Vermin,
        Category::Insects,
        Category::Hvac,
        Category::Electrical,
        Category::FireHazard,
        Category::GovernmentEntities,
        Category::Plumbing,
        Category::Cabinets,
        Category::Flooring,
        Category::Windows,
        Category::Doors,
        Category::Structure,
        Category::CommonAreas,
        Category::Nuisance,
        Category::HealthHazard,
        Category::Harassment,
        Category::Notices,
        Category::Utilities,
        Category::Safety,
        Category::Appliances,
        Category::Trash,
    ];

    /// Canonical key as it appears in the lookup tables.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Vermin => "vermin",
            Self::Insects => "insects",
            Self::Hvac => "hvac",
            Self::Electrical => "electrical",
            Self::FireHazard => "fire_hazard",
            Self::GovernmentEntities => "government_entities",
            Self::Plumbing => "plumbing",
            Self::Cabinets => "cabinets",
            Self::Flooring => "flooring",
            Self::Windows => "windows",
            Self::Doors => "doors",
            Self::Structure => "structure",
            Self::CommonAreas => "common_areas",
            Self::Nuisance => "nuisance",
            Self::HealthHazard => "health_hazard",
            Self::Harassment => "harassment",
            Self::Notices => "notices",
            Self::Utilities => "utilities",
            Self::Safety => "safety",
            Self::Appliances => "appliances",
            Self::Trash => "trash",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl TryFrom<&str> for Category {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == value)
            .ok_or_else(|| format!("Unknown discovery category '{}'", value))
    }
}

/// Category → ordered issue labels selected on the intake form.
///
/// Only categories with at least one selection are stored; a missing
/// category reads as an empty slice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DiscoveryMap(BTreeMap<Category, Vec<String>>);

impl DiscoveryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append labels to a category, trimming, skipping blanks and
    /// keeping the first occurrence of duplicates.
    pub fn extend<I, S>(&mut self, category: Category, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.0.entry(category).or_default();
        for item in items {
            let item = item.as_ref().trim();
            if item.is_empty() || entry.iter().any(|existing| existing == item) {
                continue;
            }
            entry.push(item.to_string());
        }
        if entry.is_empty() {
            self.0.remove(&category);
        }
    }

    pub fn items(&self, category: Category) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty categories in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.0.iter().map(|(c, items)| (*c, items.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn selection_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}
