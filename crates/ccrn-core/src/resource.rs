//! Structured resource identity shared by both surface syntaxes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CcrnError, Result};
use crate::fieldlist::{FIELD_LIST_PREFIX, render_field_list};
use crate::urn::{URN_PREFIX, render_urn};

/// Name of the mandatory field carrying the type key
pub const CCRN_FIELD: &str = "ccrn";

/// Field name reserved for object metadata when materializing a value map
const METADATA_FIELD: &str = "metadata";

/// Mapping from field name to field value
///
/// Field order carries no meaning; a sorted map keeps rendering deterministic.
pub type Fields = BTreeMap<String, String>;

/// Surface syntax an identifier was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// `ccrn=<type>.<group>/<version>, key=value, ...`
    #[serde(rename = "CCRN")]
    FieldList,
    /// `urn:ccrn:<type>.<group>/<version>/...`
    #[serde(rename = "URN")]
    Urn,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::FieldList => write!(f, "CCRN"),
            Format::Urn => write!(f, "URN"),
        }
    }
}

/// Sniff the surface syntax from the literal prefix
pub fn detect_format(input: &str) -> Result<Format> {
    if input.starts_with(FIELD_LIST_PREFIX) {
        Ok(Format::FieldList)
    } else if input.starts_with(URN_PREFIX) {
        Ok(Format::Urn)
    } else {
        Err(CcrnError::UnknownFormat {
            input: input.to_string(),
        })
    }
}

/// Normalized result of parsing either surface form
///
/// A value of this type always holds a non-empty `ccrn` field; the parsers
/// fail rather than hand out a partially populated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResource {
    /// Surface syntax of the raw input
    pub format: Format,
    /// Field values keyed by field name
    pub fields: Fields,
    /// Original input, kept for diagnostics
    pub raw_input: String,
    /// Template applied during URN parsing (empty for field lists)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub urn_template_used: String,
}

impl ParsedResource {
    pub(crate) fn new(format: Format, fields: Fields, raw_input: &str) -> Result<Self> {
        match fields.get(CCRN_FIELD) {
            Some(value) if !value.is_empty() => Ok(Self {
                format,
                fields,
                raw_input: raw_input.to_string(),
                urn_template_used: String::new(),
            }),
            _ => Err(CcrnError::missing(CCRN_FIELD)),
        }
    }

    /// Type key: `<type-name>.<group>/<version>`
    pub fn type_key(&self) -> &str {
        self.fields.get(CCRN_FIELD).map(String::as_str).unwrap_or("")
    }

    /// Type name half of the type key (`pod.k8s-registry.ccrn.example.com`)
    pub fn type_name(&self) -> &str {
        let key = self.type_key();
        key.split_once('/').map(|(name, _)| name).unwrap_or(key)
    }

    /// Version half of the type key (`v1`)
    pub fn version(&self) -> &str {
        self.type_key()
            .split_once('/')
            .map(|(_, version)| version)
            .unwrap_or("")
    }

    /// Kind: the type name up to its first dot
    pub fn kind(&self) -> &str {
        let name = self.type_name();
        name.split_once('.').map(|(kind, _)| kind).unwrap_or(name)
    }

    /// Group: the type name after its first dot
    pub fn group(&self) -> &str {
        let name = self.type_name();
        name.split_once('.').map(|(_, group)| group).unwrap_or(name)
    }

    /// Look up a single field value
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Render the field-list surface form
    pub fn to_field_list(&self) -> String {
        render_field_list(&self.fields)
    }

    /// Render the URN surface form
    ///
    /// An empty `template` falls back to the template used while parsing.
    /// Returns `None` when neither is available. The result may still hold
    /// `<placeholder>` tokens; see [`crate::unresolved_placeholders`].
    pub fn to_urn(&self, template: &str) -> Option<String> {
        let template = if template.is_empty() {
            self.urn_template_used.as_str()
        } else {
            template
        };
        if template.is_empty() {
            return None;
        }
        Some(render_urn(&self.fields, template))
    }

    /// Materialize the value map validated against a type's schema
    ///
    /// Fields land at the top level next to `ccrn` and a `metadata` block;
    /// a user field named `metadata` is dropped.
    pub fn to_object(&self, namespace: &str, name: &str) -> JsonValue {
        let mut object = serde_json::Map::new();
        object.insert(
            CCRN_FIELD.to_string(),
            JsonValue::String(self.type_key().to_string()),
        );
        object.insert(
            METADATA_FIELD.to_string(),
            serde_json::json!({
                "name": name,
                "namespace": namespace,
            }),
        );
        for (key, value) in &self.fields {
            if key == CCRN_FIELD || key == METADATA_FIELD {
                continue;
            }
            object.insert(key.clone(), JsonValue::String(value.clone()));
        }
        JsonValue::Object(object)
    }
}
