//! CCRN Directory - resource type directories and validation
//!
//! This crate answers which resource types exist and whether a parsed
//! identifier names a valid resource of one of them:
//! - `TypeDirectory`: the directory capability
//! - `StaticDirectory`: types loaded from definition files, validated locally
//! - `LiveDirectory`: types mirrored from a cluster, validated by the cluster
//! - `CcrnValidator`: parse, resolve, check and convert in one call
//! - `DirectoryConfig`: builds a directory from YAML configuration

pub mod config;
pub mod control_plane;
pub mod definition;
pub mod directory;
pub mod error;
pub mod live;
pub mod static_dir;
pub mod types;
pub mod validator;

pub use config::{BackendConfig, DEFAULT_NAMING_AUTHORITY, DirectoryConfig};
pub use control_plane::{CallCounts, ControlPlane, CreatedObject, KubeControlPlane, MockControlPlane};
pub use definition::{DefinitionParser, DefinitionVersion, Extracted, TypeDefinition};
pub use directory::{SharedDirectory, TypeDirectory};
pub use error::{DirectoryError, Result};
pub use live::LiveDirectory;
pub use static_dir::{DirectoryStats, IndexSnapshot, LoadIssue, LoadSummary, StaticDirectory};
pub use types::{TypeInfo, normalize_type_key, type_key, urn_template_annotation};
pub use validator::{CcrnValidator, Conversion, InvalidReason, ValidationResult};
