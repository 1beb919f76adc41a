use serde::{Deserialize, Serialize};
use std::fmt;

/// Discovery document types the pipeline can produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentType {
    /// Special interrogatories (SROGs).
    #[serde(alias = "SROGs", alias = "srogs")]
    Interrogatories,
    /// Requests for production of documents (PODs).
    #[serde(alias = "PODs", alias = "pods", alias = "Production Requests")]
    ProductionRequests,
    /// Requests for admission.
    #[serde(alias = "RFAs", alias = "ADMISSIONS", alias = "admissions")]
    Admissions,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Interrogatories,
        DocumentType::ProductionRequests,
        DocumentType::Admissions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interrogatories => "Interrogatories",
            Self::ProductionRequests => "ProductionRequests",
            Self::Admissions => "Admissions",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interrogatory-count table for one document type.
///
/// `counts` is kept in declaration order; that order is the packing order
/// used when splitting into sets. Flags absent from `counts`, or mapped to
/// zero, do not apply to this document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub document_type: DocumentType,
    /// Always-true flag naming this document type (`SROGsGeneral`).
    pub general_flag: String,
    /// Filename suffix, e.g. `Discovery Propounded SROGs`.
    pub suffix: String,
    /// Template selector handed to the renderer.
    #[serde(default)]
    pub template: String,
    /// Flags that may only ever appear in set 1.
    #[serde(default)]
    pub first_set_only: Vec<String>,
    #[serde(default)]
    pub counts: Vec<(String, u32)>,
}

impl DocumentProfile {
    pub fn new(
        document_type: DocumentType,
        general_flag: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        let general_flag = general_flag.into();
        Self {
            document_type,
            first_set_only: vec![general_flag.clone()],
            general_flag,
            suffix: suffix.into(),
            template: String::new(),
            counts: Vec::new(),
        }
    }

    pub fn with_count(mut self, flag: impl Into<String>, count: u32) -> Self {
        self.counts.push((flag.into(), count));
        self
    }

    pub fn with_first_set_only(mut self, flag: impl Into<String>) -> Self {
        let flag = flag.into();
        if !self.first_set_only.contains(&flag) {
            self.first_set_only.push(flag);
        }
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Interrogatory count for a flag, zero when the flag does not apply.
    pub fn count_for(&self, flag: &str) -> u32 {
        self.counts
            .iter()
            .find(|(name, _)| name == flag)
            .map_or(0, |(_, count)| *count)
    }

    pub fn is_first_set_only(&self, flag: &str) -> bool {
        self.first_set_only.iter().any(|f| f == flag)
    }

    /// Flags with a non-zero count, in declaration order.
    pub fn applicable_flags(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| (name.as_str(), *count))
    }
}
