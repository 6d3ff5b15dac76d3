//! Configuration validation for cklb-sync.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{AppConfig, DiffDefaults, MergeDefaults, NamingConfig, OutputConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.merge.validate());
        errors.extend(self.naming.validate());
        errors.extend(self.output.validate());
        errors.extend(self.diff.validate());
        errors
    }
}

impl Validatable for MergeDefaults {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(prefix) = &self.prefix {
            if prefix.trim().is_empty() {
                errors.push(ConfigError::new("merge.prefix", "Prefix must not be blank"));
            } else if prefix.contains(['/', '\\']) {
                errors.push(ConfigError::new(
                    "merge.prefix",
                    format!("Prefix '{prefix}' must not contain path separators"),
                ));
            }
        }
        if self.threads == Some(0) {
            errors.push(ConfigError::new("merge.threads", "Thread count must be at least 1"));
        }
        errors
    }
}

impl Validatable for NamingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_suffix == 0 {
            errors.push(ConfigError::new("naming.max_suffix", "Must be at least 1"));
        }
        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                errors.push(ConfigError::new(
                    "naming.output_dir",
                    format!("Not a directory: {}", dir.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.title_width < 10 {
            errors.push(ConfigError::new(
                "output.title_width",
                format!("Title width must be at least 10, got {}", self.title_width),
            ));
        }
        errors
    }
}

impl Validatable for DiffDefaults {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}
