//! The resource type directory capability
//!
//! Directory implementations answer which resource types exist, what their
//! URN template is, and whether a value is acceptable for a type:
//! - [`StaticDirectory`](crate::StaticDirectory): definitions loaded from files,
//!   values validated locally
//! - [`LiveDirectory`](crate::LiveDirectory): definitions mirrored from a
//!   control plane, values validated by the control plane itself

use std::sync::Arc;

use async_trait::async_trait;
use ccrn_core::ParsedResource;

use crate::error::Result;
use crate::types::TypeInfo;

/// Source of truth for resource types
///
/// Implementations must be Send + Sync; one instance is shared by every
/// concurrent validation call.
#[async_trait]
pub trait TypeDirectory: Send + Sync {
    /// Descriptor for a type key
    async fn get_type(&self, type_key: &str) -> Result<TypeInfo>;

    /// Check a parsed value against the type's schema
    async fn validate_value(&self, type_key: &str, value: &ParsedResource) -> Result<()>;

    /// URN template of `type_name` (the `kind.group` half of a type key) at `version`
    async fn get_urn_template(&self, type_name: &str, version: &str) -> Result<String>;

    /// Reload every type definition from the backing source
    async fn refresh(&self) -> Result<()>;

    /// All known descriptors, ordered by type key
    async fn list_types(&self) -> Result<Vec<TypeInfo>>;

    /// Whether the type key is known
    async fn is_type_supported(&self, type_key: &str) -> bool {
        self.get_type(type_key).await.is_ok()
    }

    /// Whether values of the type can be validated
    async fn has_validator(&self, type_key: &str) -> bool {
        self.is_type_supported(type_key).await
    }
}

/// A directory shared across tasks
pub type SharedDirectory = Arc<dyn TypeDirectory>;
