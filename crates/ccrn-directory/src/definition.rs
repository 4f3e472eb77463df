//! Type definition document parser
//!
//! Type definitions are CustomResourceDefinition manifests. Only the parts
//! the directory needs are read: group, names, served versions with their
//! `openAPIV3Schema`, and the per-version URN template annotations.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{DirectoryError, Result};
use crate::types::{TypeInfo, urn_template_annotation};

const DEFINITION_KIND: &str = "CustomResourceDefinition";

/// A parsed type definition document
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub group: String,
    pub kind: String,
    pub plural: String,
    pub singular: String,
    pub annotations: BTreeMap<String, String>,
    pub versions: Vec<DefinitionVersion>,
}

/// One version entry of a type definition
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionVersion {
    pub name: String,
    pub served: bool,
    pub schema: Option<Value>,
}

/// Outcome of reading one document for a naming authority
#[derive(Debug)]
pub enum Extracted {
    /// The group does not belong to the naming authority
    Irrelevant { group: String },
    /// One descriptor per served version
    Types(Vec<TypeInfo>),
}

impl TypeDefinition {
    /// Descriptors for every served version
    ///
    /// A served version without a schema still gets a descriptor; its
    /// `value_schema` is null and no validator can be compiled for it.
    pub fn descriptors(&self) -> Vec<TypeInfo> {
        self.versions
            .iter()
            .filter(|v| v.served)
            .map(|v| TypeInfo {
                name: self.name.clone(),
                group: self.group.clone(),
                kind: self.kind.clone(),
                version: v.name.clone(),
                plural_name: self.plural.clone(),
                singular_name: self.singular.clone(),
                value_schema: v.schema.clone().unwrap_or(Value::Null),
                urn_template: self
                    .annotations
                    .get(&urn_template_annotation(&v.name))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Parser for type definition manifests
pub struct DefinitionParser;

impl DefinitionParser {
    /// Parse a single YAML document
    pub fn parse(yaml: &str) -> Result<TypeDefinition> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| DirectoryError::Serialization(format!("failed to parse YAML: {}", e)))?;

        Self::parse_value(&value)
    }

    /// Parse from a JSON value (documents listed from a control plane)
    pub fn parse_value(value: &Value) -> Result<TypeDefinition> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing 'kind' field"))?;

        if kind != DEFINITION_KIND {
            return Err(invalid(format!(
                "expected {}, got {}",
                DEFINITION_KIND, kind
            )));
        }

        let metadata = value
            .get("metadata")
            .ok_or_else(|| invalid("missing 'metadata' field"))?;

        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let annotations = metadata
            .get("annotations")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let spec = value
            .get("spec")
            .ok_or_else(|| invalid(format!("'{}' is missing 'spec'", name)))?;

        let group = spec
            .get("group")
            .and_then(Value::as_str)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| invalid(format!("'{}' is missing 'spec.group'", name)))?
            .to_string();

        let names = spec
            .get("names")
            .ok_or_else(|| invalid(format!("'{}' is missing 'spec.names'", name)))?;

        let kind = names
            .get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| invalid(format!("'{}' is missing 'spec.names.kind'", name)))?
            .to_string();

        let plural = names
            .get("plural")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| kind.to_lowercase());

        let singular = names
            .get("singular")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| kind.to_lowercase());

        let versions = Self::parse_versions(&name, spec.get("versions"))?;

        if !versions.iter().any(|v| v.served && v.schema.is_some()) {
            return Err(invalid(format!(
                "'{}' has no served version with a structural schema",
                name
            )));
        }

        Ok(TypeDefinition {
            name,
            group,
            kind,
            plural,
            singular,
            annotations,
            versions,
        })
    }

    fn parse_versions(name: &str, versions: Option<&Value>) -> Result<Vec<DefinitionVersion>> {
        let versions = versions
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(format!("'{}' is missing 'spec.versions'", name)))?;

        versions
            .iter()
            .map(|version| {
                let version_name = version
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| invalid(format!("'{}' has a version without 'name'", name)))?;

                Ok(DefinitionVersion {
                    name: version_name.to_string(),
                    served: version
                        .get("served")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                    schema: version
                        .get("schema")
                        .and_then(|s| s.get("openAPIV3Schema"))
                        .cloned(),
                })
            })
            .collect()
    }
}

/// Read a document for `authority`
///
/// Structure is checked first, so a malformed document is an error even when
/// its group lies outside the authority.
pub fn extract_types(value: &Value, authority: &str) -> Result<Extracted> {
    let definition = DefinitionParser::parse_value(value)?;
    if !is_relevant(&definition.group, authority) {
        return Ok(Extracted::Irrelevant {
            group: definition.group,
        });
    }
    Ok(Extracted::Types(definition.descriptors()))
}

/// Substring match of the naming authority in a group
pub fn is_relevant(group: &str, authority: &str) -> bool {
    group.contains(authority)
}

/// Split a multi-document YAML stream
///
/// Separator lines start with `---`. Empty and comment-only documents are
/// dropped; the returned index is the document's position in the stream.
pub fn split_documents(content: &str) -> Vec<(usize, String)> {
    let mut documents = Vec::new();
    let mut current = String::new();
    let mut index = 0;

    let mut flush = |current: &mut String, index: usize| {
        if current
            .lines()
            .any(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        {
            documents.push((index, std::mem::take(current)));
        } else {
            current.clear();
        }
    };

    for line in content.lines() {
        if line.starts_with("---") {
            flush(&mut current, index);
            index += 1;
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    flush(&mut current, index);

    documents
}

fn invalid(message: impl Into<String>) -> DirectoryError {
    DirectoryError::InvalidDefinition(message.into())
}
