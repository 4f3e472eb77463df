//! Parse error types

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while parsing either surface syntax
///
/// Every message names the offending fragment because these strings are
/// shown verbatim to whoever submitted the identifier.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CcrnError {
    /// Input does not follow the surface grammar
    #[error("malformed input: {message}")]
    #[diagnostic(code(ccrn::parse::malformed))]
    MalformedInput { message: String },

    /// Input parsed but a mandatory field is absent or empty
    #[error("missing required field: {field}")]
    #[diagnostic(
        code(ccrn::parse::missing_field),
        help("every identifier must carry a non-empty `ccrn=<type>.<group>/<version>` entry")
    )]
    MissingRequiredField { field: String },

    /// A literal URN segment differs from the template
    #[error("URN segment '{actual}' does not match template segment '{expected}'")]
    #[diagnostic(code(ccrn::parse::template_mismatch))]
    TemplateMismatch { expected: String, actual: String },

    /// The URN has fewer segments than the template needs
    #[error("URN '{input}' has {found} segment(s) after the type key, template '{template}' expects {expected}")]
    #[diagnostic(code(ccrn::parse::segment_count))]
    SegmentCountMismatch {
        template: String,
        input: String,
        expected: usize,
        found: usize,
    },

    /// Neither `ccrn=` nor `urn:ccrn:` prefix
    #[error("unknown format: '{input}' must start with 'ccrn=' or 'urn:ccrn:'")]
    #[diagnostic(code(ccrn::parse::unknown_format))]
    UnknownFormat { input: String },
}

impl CcrnError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }
}

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, CcrnError>;
