use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Categorization of pipeline errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// Malformed or incomplete submission. Not retried.
    ValidationError,
    /// Zero head-of-household plaintiffs or zero defendants.
    EmptyExpansionError,
    /// A flag (or the first-set-only block) cannot fit under the set cap.
    OversizedFlagError,
    /// Lookup tables or profiles are malformed or inconsistent.
    ConfigurationError,
}

impl fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineErrorKind::ValidationError => write!(f, "ValidationError"),
            PipelineErrorKind::EmptyExpansionError => write!(f, "EmptyExpansionError"),
            PipelineErrorKind::OversizedFlagError => write!(f, "OversizedFlagError"),
            PipelineErrorKind::ConfigurationError => write!(f, "ConfigurationError"),
        }
    }
}

/// Structured error surfaced by every pipeline stage.
///
/// `field_errors` is keyed by a path into the submission
/// (`plaintiffs[0].name`) and is only populated for validation failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineError {
    pub kind: PipelineErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, String>,
}

impl PipelineError {
    pub fn validation(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        Self {
            kind: PipelineErrorKind::ValidationError,
            message: message.into(),
            field_errors,
        }
    }

    pub fn empty_expansion(message: impl Into<String>) -> Self {
        Self {
            kind: PipelineErrorKind::EmptyExpansionError,
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn oversized_flag(message: impl Into<String>) -> Self {
        Self {
            kind: PipelineErrorKind::OversizedFlagError,
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: PipelineErrorKind::ConfigurationError,
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Fatal for the whole case. Only split failures are scoped to one dataset.
    pub fn aborts_case(&self) -> bool {
        !matches!(self.kind, PipelineErrorKind::OversizedFlagError)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PipelineError {}

#[cfg(feature = "validation")]
impl From<validator::ValidationErrors> for PipelineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = BTreeMap::new();
        collect_validation_errors("", &errors, &mut field_errors);
        PipelineError::validation("Submission failed validation", field_errors)
    }
}

/// Flatten nested struct/list validation errors into dotted paths.
#[cfg(feature = "validation")]
fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut BTreeMap<String, String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                if let Some(first) = errs.first() {
                    let msg = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", path));
                    out.insert(path, msg);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_validation_errors(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}
