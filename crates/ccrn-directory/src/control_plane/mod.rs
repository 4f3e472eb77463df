//! Control plane access for the live directory
//!
//! The live directory needs two things from a cluster: the current set of
//! type definitions, and a way to submit an object so the cluster's own
//! admission path can accept or reject it.

mod cluster;
mod mock;

pub use cluster::KubeControlPlane;
pub use mock::{CallCounts, CreatedObject, MockControlPlane};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::types::TypeInfo;

/// Remote source of type definitions and delegated validation
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Every type definition document the control plane serves
    async fn list_type_definitions(&self) -> Result<Vec<JsonValue>>;

    /// Submit an object of type `info` named `name` in `namespace`
    ///
    /// `object` holds the value fields; metadata is set by the
    /// implementation. A rejection by the control plane's admission path
    /// is reported as [`DirectoryError::SchemaViolation`](crate::DirectoryError::SchemaViolation).
    async fn create_object(
        &self,
        info: &TypeInfo,
        namespace: &str,
        name: &str,
        object: JsonValue,
    ) -> Result<()>;
}
