use shared_types::{AppSettings, PipelineError};
use std::path::Path;
use std::sync::OnceLock;

use crate::registry::Registry;

static SETTINGS: OnceLock<LoadedSettings> = OnceLock::new();

#[derive(Debug)]
struct LoadedSettings {
    settings: AppSettings,
    /// Why the defaults are in use, when the file was not applied.
    fallback: Option<PipelineError>,
}

/// Path to the config file, relative to the working directory.
pub const CONFIG_PATH: &str = "config.toml";

/// Parse settings from a TOML file.
pub fn settings_from_path(path: &Path) -> Result<AppSettings, PipelineError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::configuration(format!("Cannot read {}: {}", path.display(), e))
    })?;
    toml::from_str(&contents).map_err(|e| {
        PipelineError::configuration(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Read `config.toml` into the global `OnceLock`. Only the first call has
/// effect.
///
/// A missing or unparseable file leaves every setting at its default. Runs
/// before any logger exists, so the outcome is reported by
/// [`log_settings_source`].
pub fn load_settings() -> &'static AppSettings {
    &SETTINGS
        .get_or_init(|| match settings_from_path(Path::new(CONFIG_PATH)) {
            Ok(settings) => LoadedSettings {
                settings,
                fallback: None,
            },
            Err(e) => LoadedSettings {
                settings: AppSettings::default(),
                fallback: Some(e),
            },
        })
        .settings
}

/// Log where the loaded settings came from. Call once logging is set up.
pub fn log_settings_source() {
    match SETTINGS.get() {
        Some(LoadedSettings {
            settings,
            fallback: None,
        }) => tracing::info!(
            set_cap = settings.pipeline.set_cap,
            features = ?settings.features,
            "Loaded {CONFIG_PATH}"
        ),
        Some(LoadedSettings {
            fallback: Some(e), ..
        }) => tracing::warn!("{e}; using default settings"),
        None => tracing::debug!("Settings not loaded; using defaults"),
    }
}

/// Loaded settings, or defaults if `load_settings()` hasn't run yet.
pub fn settings() -> &'static AppSettings {
    static DEFAULT: OnceLock<AppSettings> = OnceLock::new();
    SETTINGS
        .get()
        .map(|loaded| &loaded.settings)
        .unwrap_or_else(|| DEFAULT.get_or_init(AppSettings::default))
}

/// Registry for the configured tables: `tables_dir` when set, else the
/// embedded defaults.
pub fn load_registry(settings: &AppSettings) -> Result<Registry, PipelineError> {
    match &settings.pipeline.tables_dir {
        Some(dir) => {
            tracing::info!(tables_dir = %dir, "Loading lookup tables");
            Registry::load_dir(Path::new(dir))
        }
        None => Registry::embedded(),
    }
}
