//! Error types for ccrn-directory

use thiserror::Error;

/// Result type for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Errors raised by type directories and the orchestrator
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DirectoryError {
    /// Type key is not known to the directory
    #[error("resource type '{type_key}' not found")]
    NotFound { type_key: String },

    /// The type exists but carries no URN template for the version
    #[error("URN template annotation '{annotation}' not found for '{type_name}'")]
    TemplateNotFound {
        type_name: String,
        annotation: String,
    },

    /// No compiled validator is cached for the type
    #[error("no schema validator available for '{type_key}'")]
    NoValidator { type_key: String },

    /// The value was rejected by the type's schema
    #[error("validation failed for '{type_key}': {message}")]
    SchemaViolation { type_key: String, message: String },

    /// An entire source yielded no usable types
    #[error("failed to load any resource types from '{origin}': {message}")]
    LoadFailed { origin: String, message: String },

    /// A source pattern resolved to no files
    #[error("no files found matching pattern '{pattern}'")]
    NoMatchingFiles { pattern: String },

    /// A source pattern could not be compiled
    #[error("invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A document is not a usable type definition
    #[error("invalid type definition: {0}")]
    InvalidDefinition(String),

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Rendering left placeholders without a value
    #[error("incomplete conversion of '{input}': no value for {}", .placeholders.iter().map(|p| format!("<{}>", p)).collect::<Vec<_>>().join(", "))]
    IncompleteConversion {
        input: String,
        placeholders: Vec<String>,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A directory lock was poisoned by a panicking writer
    #[error("directory index lock poisoned")]
    LockPoisoned,
}

impl DirectoryError {
    /// The value itself was rejected, as opposed to a directory failure
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, DirectoryError::SchemaViolation { .. })
    }

    /// The type key is unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound { .. })
    }

    pub(crate) fn not_found(type_key: impl Into<String>) -> Self {
        DirectoryError::NotFound {
            type_key: type_key.into(),
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for DirectoryError {
    fn from(e: serde_yaml::Error) -> Self {
        DirectoryError::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DirectoryError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        DirectoryError::LockPoisoned
    }
}
