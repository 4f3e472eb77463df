//! Live directory mirroring a control plane
//!
//! Type definitions are re-listed from the control plane on every refresh
//! and the index is replaced in one write. Lookups that miss trigger one
//! on-demand refresh before giving up. Values are validated by creating an
//! object in the control plane and letting its admission path decide.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use ccrn_core::ParsedResource;
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::control_plane::ControlPlane;
use crate::definition::{Extracted, extract_types};
use crate::directory::TypeDirectory;
use crate::error::{DirectoryError, Result};
use crate::types::{TypeIndex, TypeInfo};

/// Directory backed by a control plane
pub struct LiveDirectory<C> {
    control_plane: C,
    authority: String,
    namespace: String,
    index: RwLock<Arc<TypeIndex>>,
    /// Serializes refreshes
    refresh_lock: Mutex<()>,
    /// Completed refreshes
    generation: AtomicU64,
}

impl<C: ControlPlane> LiveDirectory<C> {
    /// Create an empty directory; call [`refresh`](TypeDirectory::refresh) to populate it
    pub fn new(control_plane: C, authority: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            control_plane,
            authority: authority.into(),
            namespace: namespace.into(),
            index: RwLock::new(Arc::new(TypeIndex::default())),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn control_plane(&self) -> &C {
        &self.control_plane
    }

    /// Namespace validation objects are created in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn naming_authority(&self) -> &str {
        &self.authority
    }

    /// Number of refreshes completed so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Mirrored type keys, sorted
    pub fn loaded_types(&self) -> Result<Vec<String>> {
        Ok(self.index()?.sorted_keys())
    }

    /// Re-list type definitions and replace the index
    ///
    /// Only one refresh runs at a time. A caller that had to wait for a
    /// refresh which completed in the meantime returns without listing
    /// again.
    pub async fn refresh_now(&self) -> Result<()> {
        let observed = self.generation();
        let _guard = self.refresh_lock.lock().await;
        if self.generation() != observed {
            tracing::debug!("refresh completed while waiting, skipping");
            return Ok(());
        }

        let definitions = self.control_plane.list_type_definitions().await?;

        let mut next = TypeIndex::default();
        let mut skipped = 0usize;
        for definition in &definitions {
            match extract_types(definition, &self.authority) {
                Ok(Extracted::Irrelevant { .. }) => skipped += 1,
                Ok(Extracted::Types(types)) => {
                    for info in types {
                        let key = next.insert(info);
                        tracing::debug!(type_key = %key, "found resource type");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "ignoring malformed type definition"),
            }
        }

        let count = next.len();
        self.publish(next)?;
        tracing::info!(count, skipped, "refreshed resource types from control plane");
        Ok(())
    }

    /// Refresh in the background every `interval`
    ///
    /// The task holds only a weak reference and ends once the directory is
    /// dropped. Failures are logged and retried on the next tick.
    pub fn spawn_refresh_loop(self: &Arc<Self>, interval: Duration) -> JoinHandle<()>
    where
        C: 'static,
    {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                let Some(directory) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = directory.refresh_now().await {
                    tracing::error!(error = %e, "periodic refresh failed");
                }
            }
        })
    }

    fn index(&self) -> Result<Arc<TypeIndex>> {
        Ok(Arc::clone(&*self.index.read()?))
    }

    fn publish(&self, next: TypeIndex) -> Result<()> {
        *self.index.write()? = Arc::new(next);
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn lookup(&self, type_key: &str) -> Result<Option<TypeInfo>> {
        Ok(self.index()?.get(type_key).cloned())
    }

    /// Look up a type, refreshing once on a miss
    async fn resolve(&self, type_key: &str) -> Result<TypeInfo> {
        if let Some(info) = self.lookup(type_key)? {
            return Ok(info);
        }

        tracing::debug!(type_key, "type not cached, refreshing");
        self.refresh_now().await?;
        self.lookup(type_key)?
            .ok_or_else(|| DirectoryError::not_found(type_key))
    }
}

/// `<kind>-<4 random chars>-<unix seconds>`
fn object_name(kind: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!(
        "{}-{}-{}",
        kind.to_lowercase(),
        suffix.to_lowercase(),
        chrono::Utc::now().timestamp()
    )
}

#[async_trait]
impl<C: ControlPlane> TypeDirectory for LiveDirectory<C> {
    async fn get_type(&self, type_key: &str) -> Result<TypeInfo> {
        self.resolve(type_key).await
    }

    async fn validate_value(&self, type_key: &str, value: &ParsedResource) -> Result<()> {
        let info = self.resolve(type_key).await?;
        let name = object_name(&info.kind);

        let mut object = value.to_object(&self.namespace, &name);
        if let Some(map) = object.as_object_mut() {
            // Metadata is set by the control plane client
            map.remove("metadata");
        }

        self.control_plane
            .create_object(&info, &self.namespace, &name, object)
            .await
    }

    async fn get_urn_template(&self, type_name: &str, version: &str) -> Result<String> {
        let cached = self.index()?.urn_template(type_name, version);
        match cached {
            Err(e) if e.is_not_found() => {
                tracing::debug!(type_name, version, "template not cached, refreshing");
                self.refresh_now().await?;
                self.index()?.urn_template(type_name, version)
            }
            other => other,
        }
    }

    async fn refresh(&self) -> Result<()> {
        self.refresh_now().await
    }

    async fn list_types(&self) -> Result<Vec<TypeInfo>> {
        Ok(self.index()?.sorted_types())
    }
}
