//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".cklb-sync.yaml",
    ".cklb-sync.yml",
    "cklb-sync.yaml",
    "cklb-sync.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/cklb-sync/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2-5. Standard locations
    search_dirs()
        .iter()
        .find_map(|dir| find_config_in_dir(dir))
}

/// Directories searched for a config file, in order.
#[must_use]
pub fn search_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Some(git_root) = find_git_root() {
        if !candidates.contains(&git_root) {
            candidates.push(git_root);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("cklb-sync"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home);
    }
    candidates
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
///
/// An explicit path that does not exist or does not parse is an error;
/// a discovered file that fails to load is skipped with a warning.
pub fn load_or_default(
    explicit_path: Option<&Path>,
) -> Result<(AppConfig, Option<PathBuf>), ConfigFileError> {
    if let Some(path) = explicit_path {
        let config = load_config_file(path)?;
        tracing::debug!("Loaded config from {}", path.display());
        return Ok((config, Some(path.to_path_buf())));
    }

    Ok(discover_config_file(None).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    ))
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override; this is used to
    /// layer CLI args over file config.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        // Merge defaults
        if other.merge.prefix.is_some() {
            self.merge.prefix.clone_from(&other.merge.prefix);
        }
        if other.merge.threads.is_some() {
            self.merge.threads = other.merge.threads;
        }

        // Naming
        if other.naming.output_dir.is_some() {
            self.naming.output_dir.clone_from(&other.naming.output_dir);
        }
        if other.naming.max_suffix != defaults.naming.max_suffix {
            self.naming.max_suffix = other.naming.max_suffix;
        }

        // Output - only override if explicitly set
        if other.output.format != defaults.output.format {
            self.output.format = other.output.format;
        }
        if other.output.no_color {
            self.output.no_color = true;
        }
        if other.output.title_width != defaults.output.title_width {
            self.output.title_width = other.output.title_width;
        }

        // Diff
        if other.diff.fail_on_change {
            self.diff.fail_on_change = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> Result<(Self, Option<PathBuf>), ConfigFileError> {
        let (mut config, loaded_from) = load_or_default(config_path)?;
        config.merge(cli_overrides);
        Ok((config, loaded_from))
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# cklb-sync Configuration File
# =============================
#
# Place it at:
#   - .cklb-sync.yaml in your working directory or repository root
#   - ~/.config/cklb-sync/cklb-sync.yaml for global config
#
# CLI arguments always override file settings.

# Merge defaults
# merge:
#   # Identifier used when an old checklist records no host name
#   prefix: lab-site
#   # Worker threads for batch-merge (defaults to the number of CPUs)
#   threads: 4

# Output file naming
naming:
  # Directory merged checklists are written to (defaults to the working directory)
  # output_dir: ./merged
  # Highest numeric suffix tried when an output name is taken
  max_suffix: 9999

# Report output
output:
  # Format: summary, json
  format: summary
  # Disable colored output
  no_color: false
  # Truncate rule titles longer than this in summary reports
  title_width: 70

# Diff defaults
diff:
  # Exit with code 1 if any differences are found
  fail_on_change: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
