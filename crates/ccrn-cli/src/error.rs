//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use ccrn_directory::{DirectoryError, InvalidReason, ValidationResult};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// The input is not a valid resource name
    #[error("Validation failed: {message}")]
    #[diagnostic(code(ccrn::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The type directory could not be built or queried
    #[error("Directory error: {message}")]
    #[diagnostic(code(ccrn::cli::directory))]
    Directory {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(ccrn::cli::io))]
    Io { message: String },

    /// Invalid combination of arguments
    #[error("{message}")]
    #[diagnostic(code(ccrn::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(ccrn::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Directory { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a validation error from a rejected result
    pub fn rejected(result: &ValidationResult) -> Self {
        let message = if result.errors.is_empty() {
            match result.reason {
                Some(reason) => format!("{:?}", reason),
                None => "invalid input".to_string(),
            }
        } else {
            result.errors.join("; ")
        };
        Self::Validation {
            message,
            help: result.reason.map(hint).map(String::from),
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            e @ (DirectoryError::NoMatchingFiles { .. } | DirectoryError::LoadFailed { .. }) => {
                CliError::Io {
                    message: e.to_string(),
                }
            }
            e @ (DirectoryError::InvalidConfig(_) | DirectoryError::InvalidPattern { .. }) => {
                CliError::Usage {
                    message: e.to_string(),
                    help: None,
                }
            }
            e @ DirectoryError::Api(_) => CliError::Directory {
                message: e.to_string(),
                help: Some("check the current kube context or use --crds/--crd-dir".to_string()),
            },
            e => CliError::Directory {
                message: e.to_string(),
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("failed to serialize output: {}", err))
    }
}

/// What to try next for each rejection reason
pub fn hint(reason: InvalidReason) -> &'static str {
    match reason {
        InvalidReason::UnknownFormat => {
            "use a field list 'ccrn=<kind>.<group>/<version>, key=value' or a 'urn:ccrn:' URN"
        }
        InvalidReason::MalformedInput => "field lists are comma-separated key=value pairs",
        InvalidReason::MissingRequiredField => {
            "a field list needs a 'ccrn' field naming the resource type"
        }
        InvalidReason::TemplateMismatch | InvalidReason::SegmentCountMismatch => {
            "the URN needs one segment per placeholder of the type's URN template"
        }
        InvalidReason::UnsupportedType => "run 'ccrn types' to list the known resource types",
        InvalidReason::TemplateUnavailable => {
            "the type has no URN template; use the field list form instead"
        }
        InvalidReason::SchemaViolation => "field values must satisfy the type's schema",
        InvalidReason::Backend => {
            "check the type definitions or the connection to the control plane"
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
