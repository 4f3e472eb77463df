//! Resource type descriptors and the shared lookup index

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DirectoryError, Result};

/// One served schema version of one resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    /// Name of the defining document (`<plural>.<group>`)
    pub name: String,
    pub group: String,
    pub kind: String,
    pub version: String,
    pub plural_name: String,
    #[serde(default)]
    pub singular_name: String,
    /// Structural schema for values of this type
    pub value_schema: JsonValue,
    /// Empty when the type only supports the field-list form
    #[serde(default)]
    pub urn_template: String,
}

impl TypeInfo {
    /// Canonical lookup key: lowercase `kind.group/version`
    pub fn type_key(&self) -> String {
        type_key(&self.kind, &self.group, &self.version)
    }

    /// Lowercase `kind.group`
    pub fn type_name(&self) -> String {
        format!("{}.{}", self.kind, self.group).to_ascii_lowercase()
    }

    pub fn has_urn_template(&self) -> bool {
        !self.urn_template.is_empty()
    }

    /// Annotation the URN template of this version is read from
    pub fn template_annotation(&self) -> String {
        urn_template_annotation(&self.version)
    }
}

/// Build a type key from its parts
pub fn type_key(kind: &str, group: &str, version: &str) -> String {
    format!("{}.{}/{}", kind, group, version).to_ascii_lowercase()
}

/// Normalize a caller-supplied type key for lookup
pub fn normalize_type_key(type_key: &str) -> String {
    type_key.trim().to_ascii_lowercase()
}

/// `ccrn/<version>.urn-template`
pub fn urn_template_annotation(version: &str) -> String {
    format!("ccrn/{}.urn-template", version)
}

/// Type-key to descriptor map shared by both directory implementations
///
/// Instances are built whole during a load or refresh pass and then
/// published behind an `Arc`; they are never mutated once readers can
/// see them.
#[derive(Debug, Default, Clone)]
pub(crate) struct TypeIndex {
    types: HashMap<String, TypeInfo>,
}

impl TypeIndex {
    pub fn insert(&mut self, info: TypeInfo) -> String {
        let key = info.type_key();
        self.types.insert(key.clone(), info);
        key
    }

    /// Take over every descriptor of `other`, replacing equal keys
    pub fn merge(&mut self, other: TypeIndex) {
        self.types.extend(other.types);
    }

    pub fn get(&self, type_key: &str) -> Option<&TypeInfo> {
        self.types.get(&normalize_type_key(type_key))
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.get(type_key).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.types.keys()
    }

    /// Type keys in sorted order
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.types.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Descriptors in type-key order
    pub fn sorted_types(&self) -> Vec<TypeInfo> {
        let mut types: Vec<TypeInfo> = self.types.values().cloned().collect();
        types.sort_by_key(TypeInfo::type_key);
        types
    }

    /// Resolve the URN template of `type_name` at `version`
    ///
    /// `type_name` is either the `kind.group` half of a type key or the
    /// name of the defining document.
    pub fn urn_template(&self, type_name: &str, version: &str) -> Result<String> {
        let info = self
            .get(&format!("{}/{}", type_name, version))
            .or_else(|| {
                self.types.values().find(|info| {
                    info.name.eq_ignore_ascii_case(type_name) && info.version == version
                })
            })
            .ok_or_else(|| DirectoryError::not_found(format!("{}/{}", type_name, version)))?;

        if info.has_urn_template() {
            Ok(info.urn_template.clone())
        } else {
            Err(DirectoryError::TemplateNotFound {
                type_name: type_name.to_string(),
                annotation: info.template_annotation(),
            })
        }
    }
}
