//! CLI commands

pub mod convert;
pub mod types;
pub mod validate;

use ccrn_directory::{DirectoryConfig, SharedDirectory};
use std::path::PathBuf;

use crate::error::{CliError, Result};

/// Flags selecting the type directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryArgs {
    pub crds: Vec<String>,
    pub crd_dirs: Vec<PathBuf>,
    pub authority: Option<String>,
    pub live: bool,
    pub namespace: String,
    pub config: Option<PathBuf>,
}

/// Resolve the directory configuration from flags
///
/// A configuration file takes precedence over source flags; `--authority`
/// overrides the file's authority.
pub fn directory_config(args: &DirectoryArgs) -> Result<DirectoryConfig> {
    let config = if let Some(path) = &args.config {
        DirectoryConfig::from_file(path)?
    } else if args.live {
        DirectoryConfig::live_backend(&args.namespace)
    } else if !args.crds.is_empty() || !args.crd_dirs.is_empty() {
        DirectoryConfig::static_backend(args.crds.clone(), args.crd_dirs.clone())
    } else {
        return Err(CliError::usage_with_help(
            "no type definitions to validate against",
            "pass --crds <PATTERN>, --crd-dir <DIR>, --live or --config <FILE>",
        ));
    };

    Ok(match &args.authority {
        Some(authority) => config.with_naming_authority(authority),
        None => config,
    })
}

/// Build the directory selected by the flags
pub async fn build_directory(args: &DirectoryArgs) -> Result<SharedDirectory> {
    let config = directory_config(args)?;
    tracing::debug!(
        authority = %config.naming_authority,
        backend = ?config.backend,
        "building type directory"
    );
    Ok(config.build().await?)
}
