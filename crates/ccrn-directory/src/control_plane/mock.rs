//! In-memory control plane for testing
//!
//! Serves a fixed set of type definition documents and admits objects by
//! checking them against the type's schema locally, so live-directory
//! behavior can be exercised without a cluster.

use async_trait::async_trait;
use kube::core::ErrorResponse;
use serde_json::Value as JsonValue;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::ControlPlane;
use crate::error::{DirectoryError, Result};
use crate::types::TypeInfo;

/// In-memory control plane
#[derive(Clone, Default)]
pub struct MockControlPlane {
    definitions: Arc<RwLock<Vec<JsonValue>>>,
    created: Arc<RwLock<Vec<CreatedObject>>>,
    calls: Arc<RwLock<CallCounts>>,
    unavailable: Arc<RwLock<bool>>,
    latency: Arc<RwLock<Duration>>,
}

/// Counts of calls made, for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub lists: usize,
    pub creates: usize,
}

/// An object admitted by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedObject {
    pub type_key: String,
    pub namespace: String,
    pub name: String,
    pub object: JsonValue,
}

impl MockControlPlane {
    /// Create with no definitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create serving the given definition documents
    pub fn with_definitions(definitions: Vec<JsonValue>) -> Self {
        let control_plane = Self::new();
        control_plane.set_definitions(definitions);
        control_plane
    }

    /// Replace the served definitions
    pub fn set_definitions(&self, definitions: Vec<JsonValue>) {
        *self
            .definitions
            .write()
            .unwrap_or_else(|e| e.into_inner()) = definitions;
    }

    /// Add one definition document
    pub fn add_definition(&self, definition: JsonValue) {
        self.definitions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(definition);
    }

    /// Make every call fail with a 503 until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().unwrap_or_else(|e| e.into_inner()) = unavailable;
    }

    /// Delay every listing by `latency`
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    pub fn call_counts(&self) -> CallCounts {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn reset_counts(&self) {
        *self.calls.write().unwrap_or_else(|e| e.into_inner()) = CallCounts::default();
    }

    /// Objects admitted so far
    pub fn created_objects(&self) -> Vec<CreatedObject> {
        self.created
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check_available(&self) -> Result<()> {
        if *self.unavailable.read()? {
            return Err(DirectoryError::Api(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: "control plane unavailable".to_string(),
                reason: "ServiceUnavailable".to_string(),
                code: 503,
            })));
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn list_type_definitions(&self) -> Result<Vec<JsonValue>> {
        self.calls.write()?.lists += 1;
        let latency = *self.latency.read()?;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.check_available()?;
        Ok(self.definitions.read()?.clone())
    }

    async fn create_object(
        &self,
        info: &TypeInfo,
        namespace: &str,
        name: &str,
        object: JsonValue,
    ) -> Result<()> {
        self.calls.write()?.creates += 1;
        self.check_available()?;

        let validator = jsonschema::validator_for(&info.value_schema).map_err(|e| {
            DirectoryError::InvalidDefinition(format!(
                "schema of '{}' does not compile: {}",
                info.type_key(),
                e
            ))
        })?;

        if !validator.is_valid(&object) {
            let message = validator
                .iter_errors(&object)
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DirectoryError::SchemaViolation {
                type_key: info.type_key(),
                message,
            });
        }

        self.created.write()?.push(CreatedObject {
            type_key: info.type_key(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            object,
        });
        Ok(())
    }
}
