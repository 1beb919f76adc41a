use serde::{Deserialize, Serialize};

use crate::profile::DocumentType;

/// Per-set interrogatory cap applied when `config.toml` does not override it.
pub const DEFAULT_SET_CAP: u32 = 120;

/// Feature flags controlling optional pipeline behaviour.
///
/// Every field defaults to `false` so that a missing or incomplete config
/// file leaves the pipeline in its plain, lenient mode.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Export logs and traces over OTLP.
    #[serde(default)]
    pub telemetry: bool,
    /// Reject a case when any discovery item has no flag mapping.
    #[serde(default)]
    pub strict_mappings: bool,
}

/// Tunables for the pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSettings {
    #[serde(default = "default_set_cap")]
    pub set_cap: u32,
    /// Directory holding the lookup tables. Embedded defaults are used when unset.
    #[serde(default)]
    pub tables_dir: Option<String>,
    /// Used when a submission does not name any document types.
    #[serde(default)]
    pub default_document_types: Vec<DocumentType>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            set_cap: DEFAULT_SET_CAP,
            tables_dir: None,
            default_document_types: Vec::new(),
        }
    }
}

fn default_set_cap() -> u32 {
    DEFAULT_SET_CAP
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub features: FeatureFlags,
}
