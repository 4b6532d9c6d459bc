//! Configuration schema types for `animate-upgrade.toml`

use serde::{Deserialize, Serialize};

use crate::emit::DEFAULT_RUNTIME_IMPORT;
use crate::models::OutputMode;

/// Settings for the emitted module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Export convention used until a mode selector appears on the command line
    #[serde(default)]
    pub mode: OutputMode,
    /// Module imported in es6-autorun output
    #[serde(default = "default_runtime_import")]
    pub runtime_import: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { mode: OutputMode::default(), runtime_import: default_runtime_import() }
    }
}

fn default_runtime_import() -> String {
    DEFAULT_RUNTIME_IMPORT.to_string()
}

/// Settings for shape file migration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapesConfig {
    /// Migrate shape files referenced by the asset manifest
    #[serde(default = "default_true")]
    pub migrate: bool,
}

impl Default for ShapesConfig {
    fn default() -> Self {
        Self { migrate: true }
    }
}

fn default_true() -> bool {
    true
}

/// Complete animate-upgrade.toml configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpgradeConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub shapes: ShapesConfig,
}

/// Validation error for config fields
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "output.runtime_import")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "animate-upgrade.toml: '{}' {}", self.field, self.message)
    }
}

impl UpgradeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.output.runtime_import.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "output.runtime_import".to_string(),
                message: "must be a non-empty module name".to_string(),
            });
        }

        if self.output.runtime_import.contains('\'') {
            errors.push(ConfigValidationError {
                field: "output.runtime_import".to_string(),
                message: "must not contain quotes".to_string(),
            });
        }

        errors
    }
}
