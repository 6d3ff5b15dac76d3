//! Configuration module for cklb-sync.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cklb_sync::config::{AppConfig, Validatable};
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .prefix(Some("lab".to_string()))
//!     .fail_on_change(true)
//!     .build();
//! assert!(config.is_valid());
//!
//! // Load from file
//! use cklb_sync::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None)?;
//! ```
//!
//! # Configuration File
//!
//! Place a `.cklb-sync.yaml` file in your working directory or `~/.config/cklb-sync/`:
//!
//! ```yaml
//! naming:
//!   output_dir: ./merged
//! output:
//!   format: json
//! ```

pub mod file;
mod types;
mod validation;

// Re-export main types
pub use types::{
    AppConfig, AppConfigBuilder, BatchMergeConfig, DiffConfig, DiffDefaults, DiffPaths,
    MergeConfig, MergeDefaults, NamingConfig, OutputConfig, ParseConfig, ValidateConfig,
};
pub use validation::{ConfigError, Validatable};

// Re-export file utilities
pub use file::{
    discover_config_file, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.cklb-sync.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = generate_json_schema();
        let value: serde_json::Value = serde_json::from_str(&schema).unwrap();
        let properties = value["properties"].as_object().unwrap();
        for section in ["merge", "naming", "output", "diff"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
