//! Unified error types for cklb-sync.
//!
//! Every fallible operation in the library returns [`CklbError`]. Variants
//! carry the paths, identities and counts a caller needs to render a precise
//! message without inspecting internals.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for checklist operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CklbError {
    /// An input file does not exist
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Malformed JSON input
    #[error("Invalid JSON ({context}): {message}")]
    InvalidJson { context: String, message: String },

    /// Malformed XML input, or XML that is not an XCCDF benchmark
    #[error("Invalid XML ({context}): {message}")]
    InvalidXml { context: String, message: String },

    /// Well-formed JSON that is missing required checklist structure
    #[error("Checklist schema invalid ({context})")]
    SchemaInvalid {
        context: String,
        #[source]
        source: SchemaErrorKind,
    },

    /// Old and new checklists instantiate different benchmarks
    #[error(
        "STIG identity mismatch: old checklist is '{old}', new template is '{new}' \
         ({added_rule_count} rules would be added); rerun with force to merge anyway"
    )]
    StigIdentityMismatch {
        old: String,
        new: String,
        added_rule_count: usize,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific schema violation kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaErrorKind {
    #[error("document root is not a JSON object")]
    NotAnObject,

    #[error("missing required key '{key}' in {location}")]
    MissingKey { key: String, location: String },

    #[error("key '{key}' in {location} must be {expected}")]
    WrongType {
        key: String,
        location: String,
        expected: String,
    },

    #[error("{0}")]
    Deserialize(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for checklist operations
pub type Result<T> = std::result::Result<T, CklbError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl CklbError {
    /// Create a not-found error for a path
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an invalid JSON error
    pub fn invalid_json(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidJson {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid XML error
    pub fn invalid_xml(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidXml {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a schema error with context
    pub fn schema(context: impl Into<String>, source: SchemaErrorKind) -> Self {
        Self::SchemaInvalid {
            context: context.into(),
            source,
        }
    }

    /// Create a schema error for a missing key
    pub fn missing_key(key: impl Into<String>, location: impl Into<String>) -> Self {
        Self::schema(
            "shape validation",
            SchemaErrorKind::MissingKey {
                key: key.into(),
                location: location.into(),
            },
        )
    }

    /// Create an IO error with path context.
    ///
    /// A `NotFound` IO error becomes [`CklbError::NotFound`] so callers can
    /// branch on a missing input without inspecting the IO error kind.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error is the STIG identity gate
    #[must_use]
    pub const fn is_identity_mismatch(&self) -> bool {
        matches!(self, Self::StigIdentityMismatch { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for CklbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CklbError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            Self::schema("deserialization", SchemaErrorKind::Deserialize(err.to_string()))
        } else {
            Self::invalid_json("JSON deserialization", err.to_string())
        }
    }
}

impl From<quick_xml::Error> for CklbError {
    fn from(err: quick_xml::Error) -> Self {
        Self::invalid_xml("XML reader", err.to_string())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are prepended to any existing context so the final
/// message shows the path through the code:
///
/// ```ignore
/// use cklb_sync::error::ErrorContext;
///
/// let checklist = load_str(&content)
///     .with_context(|| format!("loading {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<CklbError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// `NotFound` and `StigIdentityMismatch` already carry their full context
/// as structured fields and pass through unchanged.
fn add_context_to_error(err: CklbError, new_ctx: &str) -> CklbError {
    match err {
        CklbError::InvalidJson { context, message } => CklbError::InvalidJson {
            context: chain_context(new_ctx, &context),
            message,
        },
        CklbError::InvalidXml { context, message } => CklbError::InvalidXml {
            context: chain_context(new_ctx, &context),
            message,
        },
        CklbError::SchemaInvalid { context, source } => CklbError::SchemaInvalid {
            context: chain_context(new_ctx, &context),
            source,
        },
        CklbError::Io {
            path,
            message,
            source,
        } => CklbError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        CklbError::Config(msg) => CklbError::Config(chain_context(new_ctx, &msg)),
        other @ (CklbError::NotFound { .. } | CklbError::StigIdentityMismatch { .. }) => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
