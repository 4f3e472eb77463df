//! Directory configuration
//!
//! Selects and builds one [`TypeDirectory`] implementation from YAML:
//!
//! ```yaml
//! namingAuthority: ccrn.example.com
//! backend:
//!   type: live
//!   namespace: ccrn-validation
//!   refreshInterval: 5m
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::control_plane::KubeControlPlane;
use crate::directory::TypeDirectory;
use crate::error::{DirectoryError, Result};
use crate::live::LiveDirectory;
use crate::static_dir::StaticDirectory;

/// Authority used when none is configured
pub const DEFAULT_NAMING_AUTHORITY: &str = "ccrn.example.com";

/// Directory configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryConfig {
    /// Only type definitions whose group contains this are indexed
    #[serde(default = "default_naming_authority")]
    pub naming_authority: String,

    pub backend: BackendConfig,
}

/// Backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BackendConfig {
    /// Definitions loaded from files
    #[serde(rename_all = "camelCase")]
    Static {
        /// Glob patterns
        #[serde(default)]
        sources: Vec<String>,

        /// Directories searched recursively for YAML files
        #[serde(default)]
        directories: Vec<PathBuf>,
    },

    /// Definitions mirrored from the cluster in the current kube context
    #[serde(rename_all = "camelCase")]
    Live {
        /// Namespace validation objects are created in
        #[serde(default = "default_namespace")]
        namespace: String,

        #[serde(default = "default_refresh_interval", with = "humantime_serde")]
        refresh_interval: Duration,

        /// Submit validation objects as server-side dry runs
        #[serde(default)]
        dry_run: bool,
    },
}

fn default_naming_authority() -> String {
    DEFAULT_NAMING_AUTHORITY.to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(300)
}

impl DirectoryConfig {
    /// Static backend over the given patterns and directories
    pub fn static_backend(sources: Vec<String>, directories: Vec<PathBuf>) -> Self {
        Self {
            naming_authority: default_naming_authority(),
            backend: BackendConfig::Static {
                sources,
                directories,
            },
        }
    }

    /// Live backend with default refresh interval
    pub fn live_backend(namespace: impl Into<String>) -> Self {
        Self {
            naming_authority: default_naming_authority(),
            backend: BackendConfig::Live {
                namespace: namespace.into(),
                refresh_interval: default_refresh_interval(),
                dry_run: false,
            },
        }
    }

    pub fn with_naming_authority(mut self, authority: impl Into<String>) -> Self {
        self.naming_authority = authority.into();
        self
    }

    /// Load configuration from a YAML file
    ///
    /// Relative static sources are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_relative_to(base))
    }

    fn resolve_relative_to(mut self, base: &Path) -> Self {
        if let BackendConfig::Static {
            sources,
            directories,
        } = &mut self.backend
        {
            for source in sources.iter_mut() {
                if Path::new(source.as_str()).is_relative() {
                    *source = base.join(&*source).to_string_lossy().into_owned();
                }
            }
            for dir in directories.iter_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        self
    }

    /// Check the configuration can be built
    pub fn validate(&self) -> Result<()> {
        if self.naming_authority.trim().is_empty() {
            return Err(DirectoryError::InvalidConfig(
                "namingAuthority must not be empty".to_string(),
            ));
        }
        match &self.backend {
            BackendConfig::Static {
                sources,
                directories,
            } if sources.is_empty() && directories.is_empty() => Err(DirectoryError::InvalidConfig(
                "static backend needs at least one source or directory".to_string(),
            )),
            BackendConfig::Live {
                namespace,
                refresh_interval,
                ..
            } => {
                if namespace.is_empty() {
                    return Err(DirectoryError::InvalidConfig(
                        "live backend namespace must not be empty".to_string(),
                    ));
                }
                if refresh_interval.is_zero() {
                    return Err(DirectoryError::InvalidConfig(
                        "refreshInterval must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
            BackendConfig::Static { .. } => Ok(()),
        }
    }

    /// Build the configured directory
    ///
    /// A live directory is populated once before returning; a failed initial
    /// population is logged and left to the periodic refresh.
    pub async fn build(&self) -> Result<Arc<dyn TypeDirectory>> {
        self.validate()?;

        match &self.backend {
            BackendConfig::Static {
                sources,
                directories,
            } => {
                let directory = StaticDirectory::new(&self.naming_authority);
                for pattern in sources {
                    directory.load(pattern)?;
                }
                for dir in directories {
                    directory.load_dir(dir)?;
                }
                Ok(Arc::new(directory))
            }
            BackendConfig::Live {
                namespace,
                refresh_interval,
                dry_run,
            } => {
                let control_plane = KubeControlPlane::try_default()
                    .await?
                    .with_dry_run(*dry_run);
                let directory = Arc::new(LiveDirectory::new(
                    control_plane,
                    &self.naming_authority,
                    namespace,
                ));

                if let Err(e) = directory.refresh_now().await {
                    tracing::warn!(error = %e, "initial type refresh failed");
                }
                directory.spawn_refresh_loop(*refresh_interval);

                Ok(directory)
            }
        }
    }
}
