//! Configuration management for the forms engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (forms.toml)
//! - Environment variables (`FORMS__SUBMIT__POLICY=always`)
//!
//! ## Example config file (forms.toml):
//! ```toml
//! [submit]
//! policy = "when-valid"
//! value_mode = "raw"
//!
//! [catalog]
//! include_builtin = true
//! schema_dirs = ["./forms"]
//!
//! [logging]
//! filter = "reactive_forms=debug"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::submit::{SubmitOptions, SubmitPolicy, ValueMode};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormsConfig {
    /// Overrides for the submit options carried by each schema
    #[serde(default)]
    pub submit: SubmitConfig,

    /// Where form schemas come from
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Log filter used when RUST_LOG is not set
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Submit overrides. Unset values keep what the schema says.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<SubmitPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_mode: Option<ValueMode>,
}

impl SubmitConfig {
    /// Apply the overrides on top of a schema's submit options
    pub fn apply(&self, options: SubmitOptions) -> SubmitOptions {
        SubmitOptions {
            policy: self.policy.unwrap_or(options.policy),
            value_mode: self.value_mode.unwrap_or(options.value_mode),
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Include the presets compiled into the crate
    #[serde(default = "default_true")]
    pub include_builtin: bool,

    /// Directories scanned for `*.json` form schemas
    #[serde(default)]
    pub schema_dirs: Vec<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            schema_dirs: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl FormsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["forms.toml", ".forms.toml", "config/forms.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "forms") {
            let xdg_config = config_dir.config_dir().join("forms.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (FORMS__*)
        builder = builder.add_source(
            Environment::with_prefix("FORMS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormsConfig::default();
        assert!(config.catalog.include_builtin);
        assert!(config.submit.policy.is_none());
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_serialize_config() {
        let config = FormsConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_submit_overrides() {
        let schema_options = SubmitOptions {
            policy: SubmitPolicy::WhenValid,
            value_mode: ValueMode::Raw,
        };
        let overrides = SubmitConfig {
            policy: Some(SubmitPolicy::Always),
            value_mode: None,
        };
        let applied = overrides.apply(schema_options);
        assert_eq!(applied.policy, SubmitPolicy::Always);
        assert_eq!(applied.value_mode, ValueMode::Raw);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[submit]\npolicy = \"always\"\n\n[catalog]\ninclude_builtin = false\nschema_dirs = [\"schemas\"]\n",
        )
        .unwrap();

        let config = FormsConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.submit.policy, Some(SubmitPolicy::Always));
        assert!(!config.catalog.include_builtin);
        assert_eq!(config.catalog.schema_dirs, vec![PathBuf::from("schemas")]);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = FormsConfig::default();
        config.submit.value_mode = Some(ValueMode::Raw);
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = FormsConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.submit.value_mode, Some(ValueMode::Raw));
    }
}
