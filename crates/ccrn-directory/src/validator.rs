//! Validation orchestrator
//!
//! Ties the surface-syntax parsers to a [`TypeDirectory`]:
//!
//! 1. Detect the surface syntax from its prefix
//! 2. For URNs without a caller-supplied template, extract the type key,
//!    ask the directory for the type's template and parse again with it
//! 3. Check the type key is known to the directory
//! 4. Let the directory validate the value
//!
//! Every call produces a fresh [`ValidationResult`]; nothing is cached here.

use std::sync::Arc;

use ccrn_core::{
    CcrnError, Format, ParsedResource, detect_format, parse_field_list, parse_urn,
    parse_urn_type_key, unresolved_placeholders,
};
use serde::Serialize;

use crate::directory::TypeDirectory;
use crate::error::{DirectoryError, Result};

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvalidReason {
    UnknownFormat,
    MalformedInput,
    MissingRequiredField,
    TemplateMismatch,
    SegmentCountMismatch,
    /// The type key is not known to the directory
    UnsupportedType,
    /// The type has no URN template to parse with
    TemplateUnavailable,
    /// The value was rejected by the type's schema
    SchemaViolation,
    /// The directory failed for reasons unrelated to the value
    Backend,
}

impl From<&CcrnError> for InvalidReason {
    fn from(e: &CcrnError) -> Self {
        match e {
            CcrnError::MalformedInput { .. } => InvalidReason::MalformedInput,
            CcrnError::MissingRequiredField { .. } => InvalidReason::MissingRequiredField,
            CcrnError::TemplateMismatch { .. } => InvalidReason::TemplateMismatch,
            CcrnError::SegmentCountMismatch { .. } => InvalidReason::SegmentCountMismatch,
            CcrnError::UnknownFormat { .. } => InvalidReason::UnknownFormat,
        }
    }
}

impl From<&DirectoryError> for InvalidReason {
    fn from(e: &DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound { .. } => InvalidReason::UnsupportedType,
            DirectoryError::TemplateNotFound { .. } => InvalidReason::TemplateUnavailable,
            DirectoryError::SchemaViolation { .. } => InvalidReason::SchemaViolation,
            _ => InvalidReason::Backend,
        }
    }
}

/// Both surface forms of a validated resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub field_list: String,
    /// `None` when the type has no URN template
    pub urn: Option<String>,
}

/// Verdict for one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_resource: Option<ParsedResource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<Conversion>,
}

impl ValidationResult {
    fn valid(parsed: ParsedResource) -> Self {
        Self {
            valid: true,
            parsed_resource: Some(parsed),
            errors: Vec::new(),
            warnings: Vec::new(),
            reason: None,
            conversion: None,
        }
    }

    fn invalid(reason: InvalidReason, error: impl ToString) -> Self {
        Self {
            valid: false,
            parsed_resource: None,
            errors: vec![error.to_string()],
            warnings: Vec::new(),
            reason: Some(reason),
            conversion: None,
        }
    }

    /// Attach the partially parsed resource to a rejection
    fn with_parsed(mut self, parsed: ParsedResource) -> Self {
        self.parsed_resource = Some(parsed);
        self
    }
}

/// Validates CCRN and URN inputs against a directory
#[derive(Clone)]
pub struct CcrnValidator {
    directory: Arc<dyn TypeDirectory>,
}

impl CcrnValidator {
    pub fn new(directory: Arc<dyn TypeDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Arc<dyn TypeDirectory> {
        &self.directory
    }

    /// Validate an input, resolving URN templates from the directory
    pub async fn validate(&self, input: &str) -> ValidationResult {
        self.validate_with_template(input, "").await
    }

    /// Validate an input, parsing URNs with `template` unless it is empty
    pub async fn validate_with_template(&self, input: &str, template: &str) -> ValidationResult {
        let parsed = match self.parse(input, template).await {
            Ok(parsed) => parsed,
            Err(rejection) => return rejection,
        };

        let type_key = parsed.type_key().to_string();
        if let Err(e) = self.directory.get_type(&type_key).await {
            tracing::debug!(type_key = %type_key, error = %e, "type lookup failed");
            return lookup_failure(&type_key, &e).with_parsed(parsed);
        }

        if let Err(e) = self.directory.validate_value(&type_key, &parsed).await {
            tracing::debug!(type_key = %type_key, error = %e, "value rejected");
            return ValidationResult::invalid(InvalidReason::from(&e), e).with_parsed(parsed);
        }

        tracing::debug!(type_key = %type_key, format = %parsed.format, "input is valid");
        ValidationResult::valid(parsed)
    }

    /// Validate, then render both surface forms of a valid input
    ///
    /// A conversion that cannot be completed leaves `conversion` empty and
    /// records why in `warnings`; a valid input stays valid.
    pub async fn complete(&self, input: &str) -> ValidationResult {
        let mut result = self.validate(input).await;
        let Some(parsed) = result.parsed_resource.as_ref().filter(|_| result.valid) else {
            return result;
        };

        match self.convert(parsed).await {
            Ok(conversion) => {
                if conversion.urn.is_none() {
                    result.warnings.push(format!(
                        "type '{}' has no URN template, only the field-list form is available",
                        parsed.type_key()
                    ));
                }
                result.conversion = Some(conversion);
            }
            Err(e) => result.warnings.push(e.to_string()),
        }
        result
    }

    /// Render both surface forms of a parsed resource
    ///
    /// The URN form uses the template the resource was parsed with, or the
    /// type's template from the directory. Placeholders without a field
    /// value fail with [`DirectoryError::IncompleteConversion`].
    pub async fn convert(&self, parsed: &ParsedResource) -> Result<Conversion> {
        let field_list = parsed.to_field_list();

        let template = if parsed.urn_template_used.is_empty() {
            match self
                .directory
                .get_urn_template(parsed.type_name(), parsed.version())
                .await
            {
                Ok(template) => Some(template),
                Err(DirectoryError::TemplateNotFound { .. }) => None,
                Err(e) => return Err(e),
            }
        } else {
            Some(parsed.urn_template_used.clone())
        };

        let urn = match template {
            Some(template) => {
                let rendered = parsed.to_urn(&template).unwrap_or_default();
                let missing = unresolved_placeholders(&rendered);
                if !missing.is_empty() {
                    return Err(DirectoryError::IncompleteConversion {
                        input: parsed.raw_input.clone(),
                        placeholders: missing,
                    });
                }
                Some(rendered)
            }
            None => None,
        };

        Ok(Conversion { field_list, urn })
    }

    /// Detect the surface syntax and parse, resolving the URN template if needed
    async fn parse(
        &self,
        input: &str,
        template: &str,
    ) -> std::result::Result<ParsedResource, ValidationResult> {
        let format = detect_format(input).map_err(rejected)?;

        match format {
            Format::FieldList => parse_field_list(input).map_err(rejected),
            Format::Urn if !template.is_empty() => parse_urn(input, template).map_err(rejected),
            Format::Urn => {
                let type_key = parse_urn_type_key(input).map_err(rejected)?;
                let (type_name, version) = type_key.split_once('/').unwrap_or((&type_key, ""));

                let template = self
                    .directory
                    .get_urn_template(type_name, version)
                    .await
                    .map_err(|e| lookup_failure(&type_key, &e))?;

                parse_urn(input, &template).map_err(rejected)
            }
        }
    }
}

fn rejected(e: CcrnError) -> ValidationResult {
    ValidationResult::invalid(InvalidReason::from(&e), e)
}

/// Unknown types stay distinguishable from a directory that could not answer
fn lookup_failure(type_key: &str, e: &DirectoryError) -> ValidationResult {
    let reason = InvalidReason::from(e);
    if reason == InvalidReason::UnsupportedType {
        ValidationResult::invalid(reason, format!("unsupported resource type '{}'", type_key))
    } else {
        ValidationResult::invalid(reason, e)
    }
}
