//! Static directory backed by type definition files
//!
//! Definitions are read from YAML files matched by glob patterns or found
//! below a directory. Each accepted source is remembered so that a refresh
//! can replay it. Values are checked locally against a JSON Schema
//! validator compiled from each type's structural schema.
//!
//! The whole index lives behind one `Arc` that is swapped under the write
//! lock. Readers clone the `Arc` and release the lock immediately, so a
//! lookup always sees descriptors and validators from the same pass.
//! Loads and reloads are serialized with each other so that neither can
//! overwrite a source the other just committed.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use ccrn_core::ParsedResource;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::definition::{Extracted, extract_types, split_documents};
use crate::directory::TypeDirectory;
use crate::error::{DirectoryError, Result};
use crate::types::{TypeIndex, TypeInfo, normalize_type_key};

/// Namespace written into values validated locally
const VALIDATION_NAMESPACE: &str = "default";

/// A replayable origin of type definitions
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Pattern(String),
    Directory(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Pattern(pattern) => write!(f, "{}", pattern),
            Source::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

impl Source {
    /// YAML files this source currently covers, sorted
    fn resolve(&self) -> Result<Vec<PathBuf>> {
        match self {
            Source::Pattern(pattern) => {
                let files = glob_yaml_files(pattern)?;
                if files.is_empty() {
                    return Err(DirectoryError::NoMatchingFiles {
                        pattern: pattern.clone(),
                    });
                }
                Ok(files)
            }
            Source::Directory(dir) => {
                let root = glob::Pattern::escape(&dir.to_string_lossy());
                let mut files = Vec::new();
                for ext in ["yaml", "yml"] {
                    files.extend(glob_yaml_files(&format!("{}/**/*.{}", root, ext))?);
                }
                files.sort();
                files.dedup();
                if files.is_empty() {
                    return Err(DirectoryError::NoMatchingFiles {
                        pattern: format!("{}/**/*.{{yaml,yml}}", dir.display()),
                    });
                }
                Ok(files)
            }
        }
    }
}

fn glob_yaml_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| DirectoryError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() && is_yaml(&path) => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(pattern, error = %e, "skipping unreadable path"),
        }
    }
    files.sort();
    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Outcome of loading one source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadSummary {
    /// Files read
    pub files: usize,
    /// Non-empty documents seen
    pub definitions: usize,
    /// Type keys indexed, in load order
    pub loaded: Vec<String>,
    /// Documents outside the naming authority
    pub skipped: usize,
    /// Documents rejected as malformed
    pub errors: Vec<LoadIssue>,
}

/// A rejected document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadIssue {
    pub source: String,
    /// Position of the document in its file
    pub document: usize,
    pub message: String,
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (document {}): {}", self.source, self.document, self.message)
    }
}

/// Counts describing the current index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryStats {
    pub types: usize,
    pub validators: usize,
    pub sources: usize,
    pub naming_authority: String,
}

/// Type and validator keys captured from a single index pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub type_keys: Vec<String>,
    pub validator_keys: Vec<String>,
}

type Validators = HashMap<String, Arc<jsonschema::Validator>>;

#[derive(Default, Clone)]
struct Index {
    types: TypeIndex,
    validators: Validators,
    sources: Vec<Source>,
}

impl Index {
    fn absorb(&mut self, batch: Batch) {
        for key in batch.types.keys() {
            self.validators.remove(key);
        }
        self.types.merge(batch.types);
        self.validators.extend(batch.validators);
    }
}

struct Batch {
    types: TypeIndex,
    validators: Validators,
    summary: LoadSummary,
}

/// Directory built from type definition files
pub struct StaticDirectory {
    authority: String,
    state: RwLock<Arc<Index>>,
    /// Serializes writers
    load_lock: Mutex<()>,
}

impl StaticDirectory {
    /// Create an empty directory for a naming authority
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            state: RwLock::new(Arc::new(Index::default())),
            load_lock: Mutex::new(()),
        }
    }

    pub fn naming_authority(&self) -> &str {
        &self.authority
    }

    /// Load definitions from every YAML file matching a glob pattern
    ///
    /// Types are merged into the index. Fails only if the pattern matches
    /// nothing, or if no type at all was loaded and some document was
    /// rejected.
    pub fn load(&self, pattern: &str) -> Result<LoadSummary> {
        self.load_source(Source::Pattern(pattern.to_string()))
    }

    /// Load every `*.yaml` and `*.yml` file below a directory
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<LoadSummary> {
        self.load_source(Source::Directory(dir.as_ref().to_path_buf()))
    }

    fn load_source(&self, source: Source) -> Result<LoadSummary> {
        let _guard = self.load_lock.lock()?;
        let batch = self.read_source(&source)?;
        let summary = batch.summary.clone();

        {
            let mut state = self.state.write()?;
            let mut next = Index::clone(&state);
            next.absorb(batch);
            if !next.sources.contains(&source) {
                next.sources.push(source.clone());
            }
            *state = Arc::new(next);
        }

        tracing::info!(
            source = %source,
            loaded = summary.loaded.len(),
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "loaded resource type definitions"
        );
        Ok(summary)
    }

    /// Rebuild the index from every previously loaded source
    ///
    /// The replacement is built without holding the index lock and published
    /// in a single write. Concurrent loads wait until it is published. A source that now fails is kept for the next refresh
    /// and reported in the returned error; the other sources still apply.
    pub fn reload(&self) -> Result<()> {
        let _guard = self.load_lock.lock()?;
        let sources = self.index()?.sources.clone();
        if sources.is_empty() {
            tracing::debug!("no sources to reload");
            return Ok(());
        }

        let mut next = Index::default();
        let mut failures = Vec::new();
        for source in sources {
            match self.read_source(&source) {
                Ok(batch) => next.absorb(batch),
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "failed to reload source");
                    failures.push(format!("{}: {}", source, e));
                }
            }
            next.sources.push(source);
        }

        let count = next.types.len();
        *self.state.write()? = Arc::new(next);
        tracing::info!(count, "reloaded resource type definitions");

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DirectoryError::LoadFailed {
                origin: "refresh".to_string(),
                message: failures.join("; "),
            })
        }
    }

    /// Loaded type keys, sorted
    pub fn loaded_types(&self) -> Result<Vec<String>> {
        Ok(self.index()?.types.sorted_keys())
    }

    pub fn statistics(&self) -> Result<DirectoryStats> {
        let index = self.index()?;
        Ok(DirectoryStats {
            types: index.types.len(),
            validators: index.validators.len(),
            sources: index.sources.len(),
            naming_authority: self.authority.clone(),
        })
    }

    /// Keys of both maps taken from one consistent view
    pub fn snapshot(&self) -> Result<IndexSnapshot> {
        let index = self.index()?;
        let mut validator_keys: Vec<String> = index.validators.keys().cloned().collect();
        validator_keys.sort();
        Ok(IndexSnapshot {
            type_keys: index.types.sorted_keys(),
            validator_keys,
        })
    }

    fn index(&self) -> Result<Arc<Index>> {
        Ok(Arc::clone(&*self.state.read()?))
    }

    fn read_source(&self, source: &Source) -> Result<Batch> {
        let files = source.resolve()?;

        let mut batch = Batch {
            types: TypeIndex::default(),
            validators: Validators::new(),
            summary: LoadSummary::default(),
        };

        for file in &files {
            let origin = file.display().to_string();
            batch.summary.files += 1;

            let content = match std::fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) => {
                    batch.summary.errors.push(LoadIssue {
                        source: origin,
                        document: 0,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            for (document, yaml) in split_documents(&content) {
                batch.summary.definitions += 1;
                if let Err(message) = self.read_document(&mut batch, &yaml) {
                    tracing::warn!(source = %origin, document, error = %message, "rejected type definition");
                    batch.summary.errors.push(LoadIssue {
                        source: origin.clone(),
                        document,
                        message,
                    });
                }
            }
        }

        if batch.summary.loaded.is_empty() && !batch.summary.errors.is_empty() {
            let message = batch
                .summary
                .errors
                .iter()
                .map(LoadIssue::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DirectoryError::LoadFailed {
                origin: source.to_string(),
                message,
            });
        }

        Ok(batch)
    }

    fn read_document(&self, batch: &mut Batch, yaml: &str) -> std::result::Result<(), String> {
        let value: JsonValue =
            serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse YAML: {}", e))?;

        match extract_types(&value, &self.authority).map_err(|e| e.to_string())? {
            Extracted::Irrelevant { group } => {
                tracing::debug!(group = %group, "skipping definition outside naming authority");
                batch.summary.skipped += 1;
            }
            Extracted::Types(types) => {
                for info in types {
                    let validator = compile_validator(&info);
                    let key = batch.types.insert(info);
                    if let Some(validator) = validator {
                        batch.validators.insert(key.clone(), Arc::new(validator));
                    }
                    batch.summary.loaded.push(key);
                }
            }
        }
        Ok(())
    }
}

fn compile_validator(info: &TypeInfo) -> Option<jsonschema::Validator> {
    if info.value_schema.is_null() {
        tracing::warn!(type_key = %info.type_key(), "served version has no schema");
        return None;
    }
    match jsonschema::validator_for(&info.value_schema) {
        Ok(validator) => Some(validator),
        Err(e) => {
            tracing::warn!(
                type_key = %info.type_key(),
                error = %e,
                "failed to build schema validator"
            );
            None
        }
    }
}

#[async_trait]
impl TypeDirectory for StaticDirectory {
    async fn get_type(&self, type_key: &str) -> Result<TypeInfo> {
        self.index()?
            .types
            .get(type_key)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(type_key))
    }

    async fn validate_value(&self, type_key: &str, value: &ParsedResource) -> Result<()> {
        let key = normalize_type_key(type_key);
        let (validator, kind) = {
            let index = self.index()?;
            let info = index
                .types
                .get(&key)
                .ok_or_else(|| DirectoryError::not_found(type_key))?;
            (index.validators.get(&key).cloned(), info.kind.to_lowercase())
        };
        let validator = validator.ok_or_else(|| DirectoryError::NoValidator {
            type_key: key.clone(),
        })?;

        let instance = value.to_object(VALIDATION_NAMESPACE, &format!("{}-validation", kind));
        if validator.is_valid(&instance) {
            tracing::debug!(type_key = %key, "value validated against schema");
            return Ok(());
        }

        let message = validator
            .iter_errors(&instance)
            .map(|e| {
                let path = e.instance_path.to_string();
                let detail = e.to_string().replace('"', "'");
                if path.is_empty() {
                    detail
                } else {
                    format!("{}: {}", path, detail)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");

        Err(DirectoryError::SchemaViolation {
            type_key: key,
            message,
        })
    }

    async fn get_urn_template(&self, type_name: &str, version: &str) -> Result<String> {
        self.index()?.types.urn_template(type_name, version)
    }

    async fn refresh(&self) -> Result<()> {
        self.reload()
    }

    async fn list_types(&self) -> Result<Vec<TypeInfo>> {
        Ok(self.index()?.types.sorted_types())
    }

    async fn is_type_supported(&self, type_key: &str) -> bool {
        self.index()
            .map(|index| index.types.contains(type_key))
            .unwrap_or(false)
    }

    async fn has_validator(&self, type_key: &str) -> bool {
        self.index()
            .map(|index| index.validators.contains_key(&normalize_type_key(type_key)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{CcrnValidator, InvalidReason};
    use ccrn_core::parse_field_list;
    use std::fs;
    use tempfile::TempDir;

    const AUTHORITY: &str = "ccrn.example.com";

    fn fixtures_path() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures"))
    }

    fn crds_dir() -> PathBuf {
        fixtures_path().join("crds")
    }

    fn loaded() -> StaticDirectory {
        let directory = StaticDirectory::new(AUTHORITY);
        directory.load_dir(crds_dir()).unwrap();
        directory
    }

    #[test]
    fn test_load_dir() {
        let directory = StaticDirectory::new(AUTHORITY);
        let summary = directory.load_dir(crds_dir()).unwrap();

        assert_eq!(summary.files, 4);
        assert_eq!(summary.definitions, 5);
        assert_eq!(summary.skipped, 1);
        assert!(summary.errors.is_empty());
        assert_eq!(
            directory.loaded_types().unwrap(),
            vec![
                "pod.k8s-registry.tr.ccrn.example.com/v1",
                "testresource.tr.ccrn.example.com/v1",
                "testurn.tr.ccrn.example.com/v1",
                "testurn2.tr.ccrn.example.com/v1",
            ]
        );
    }

    #[test]
    fn test_load_single_file() {
        let directory = StaticDirectory::new(AUTHORITY);
        let pattern = crds_dir().join("minimal_crd.yaml");
        let summary = directory.load(&pattern.to_string_lossy()).unwrap();
        assert_eq!(summary.loaded, vec!["testresource.tr.ccrn.example.com/v1"]);
    }

    #[test]
    fn test_loads_merge() {
        let directory = StaticDirectory::new(AUTHORITY);
        directory
            .load(&crds_dir().join("minimal_crd.yaml").to_string_lossy())
            .unwrap();
        directory
            .load(&crds_dir().join("testpod_crd.yaml").to_string_lossy())
            .unwrap();

        let stats = directory.statistics().unwrap();
        assert_eq!(stats.types, 2);
        assert_eq!(stats.validators, 2);
        assert_eq!(stats.sources, 2);
        assert_eq!(stats.naming_authority, AUTHORITY);
    }

    #[test]
    fn test_no_matching_files() {
        let directory = StaticDirectory::new(AUTHORITY);
        let pattern = crds_dir().join("nonexistent_*.yaml");
        let err = directory.load(&pattern.to_string_lossy()).unwrap_err();
        assert!(err.to_string().contains("no files found matching pattern"));

        let err = directory.load_dir("/non/existent/path").unwrap_err();
        assert!(matches!(err, DirectoryError::NoMatchingFiles { .. }));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "not yaml").unwrap();
        let err = StaticDirectory::new(AUTHORITY).load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no files found matching pattern"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = StaticDirectory::new(AUTHORITY).load("crds/[*.yaml").unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidPattern { .. }));
    }

    #[test]
    fn test_all_documents_invalid() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad1.yaml"), "not: valid: yaml").unwrap();
        fs::write(dir.path().join("bad2.yaml"), "also: bad: yaml").unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        let pattern = dir.path().join("*.yaml");
        let err = directory.load(&pattern.to_string_lossy()).unwrap_err();
        assert!(matches!(err, DirectoryError::LoadFailed { .. }));
        assert!(err.to_string().contains("failed to parse YAML"));
        assert!(directory.loaded_types().unwrap().is_empty());
        assert_eq!(directory.statistics().unwrap().sources, 0);
    }

    #[test]
    fn test_partial_success() {
        let dir = TempDir::new().unwrap();
        fs::copy(crds_dir().join("minimal_crd.yaml"), dir.path().join("good.yaml")).unwrap();
        fs::write(dir.path().join("bad.yaml"), "kind: CustomResourceDefinition\nmetadata:\n  name: broken.ccrn.example.com\nspec:\n  group: ccrn.example.com\n").unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        let summary = directory.load_dir(dir.path()).unwrap();
        assert_eq!(summary.loaded.len(), 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].source.ends_with("bad.yaml"));
        assert!(summary.errors[0].message.contains("spec.names"));
    }

    #[test]
    fn test_yml_extension_and_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::copy(crds_dir().join("minimal_crd.yaml"), nested.join("minimal.yml")).unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        let summary = directory.load_dir(dir.path()).unwrap();
        assert_eq!(summary.loaded, vec!["testresource.tr.ccrn.example.com/v1"]);
    }

    #[test]
    fn test_authority_filter() {
        let directory = StaticDirectory::new("tr.ccrn.example.com");
        let summary = directory.load_dir(crds_dir()).unwrap();
        assert_eq!(summary.loaded.len(), 4);

        let directory = StaticDirectory::new("k8s-registry");
        let summary = directory.load_dir(crds_dir()).unwrap();
        assert_eq!(summary.loaded, vec!["pod.k8s-registry.tr.ccrn.example.com/v1"]);
        assert_eq!(summary.skipped, 4);
    }

    #[tokio::test]
    async fn test_get_type() {
        let directory = loaded();
        let info = directory
            .get_type("pod.k8s-registry.tr.ccrn.example.com/v1")
            .await
            .unwrap();
        assert_eq!(info.kind, "Pod");
        assert_eq!(info.plural_name, "pods");

        let err = directory.get_type("unknown.tr.ccrn.example.com/v1").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!directory.is_type_supported("unknown.tr.ccrn.example.com/v1").await);
        assert!(directory.is_type_supported("testresource.tr.ccrn.example.com/v1").await);
        assert!(directory.has_validator("testresource.tr.ccrn.example.com/v1").await);
    }

    #[tokio::test]
    async fn test_get_urn_template() {
        let directory = loaded();
        assert_eq!(
            directory
                .get_urn_template("testurn.tr.ccrn.example.com", "v1")
                .await
                .unwrap(),
            "urn:ccrn:testurn.tr.ccrn.example.com/v1/<name>"
        );

        let err = directory
            .get_urn_template("testurn2.tr.ccrn.example.com", "v1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("URN template"));

        let err = directory.get_urn_template("doesnotexist", "v1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_validate_value() {
        let directory = loaded();
        let key = "pod.k8s-registry.tr.ccrn.example.com/v1";

        let valid = parse_field_list(
            "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=eu-de-1, namespace=default, name=my-pod",
        )
        .unwrap();
        directory.validate_value(key, &valid).await.unwrap();

        let wildcard = parse_field_list(
            "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=*, namespace=*, name=*",
        )
        .unwrap();
        directory.validate_value(key, &wildcard).await.unwrap();

        let missing = parse_field_list(
            "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=eu-de-1, name=my-pod",
        )
        .unwrap();
        let err = directory.validate_value(key, &missing).await.unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err.to_string().contains("namespace"));

        let bad_value = parse_field_list(
            "ccrn=pod.k8s-registry.tr.ccrn.example.com/v1, cluster=INVALID!, namespace=default, name=my-pod",
        )
        .unwrap();
        let err = directory.validate_value(key, &bad_value).await.unwrap_err();
        assert!(err.is_schema_violation());
        assert!(err.to_string().contains("/cluster"));
    }

    #[tokio::test]
    async fn test_validate_unknown_type() {
        let directory = loaded();
        let parsed = parse_field_list("ccrn=unknown.tr.ccrn.example.com/v1, name=x").unwrap();
        let err = directory
            .validate_value("unknown.tr.ccrn.example.com/v1", &parsed)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_validator() {
        let dir = TempDir::new().unwrap();
        let crd = fs::read_to_string(crds_dir().join("minimal_crd.yaml"))
            .unwrap()
            .replace("type: object", "type: 12");
        fs::write(dir.path().join("broken_schema.yaml"), crd).unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        directory.load_dir(dir.path()).unwrap();

        let key = "testresource.tr.ccrn.example.com/v1";
        assert!(directory.is_type_supported(key).await);
        assert!(!directory.has_validator(key).await);

        let parsed = parse_field_list("ccrn=testresource.tr.ccrn.example.com/v1").unwrap();
        let err = directory.validate_value(key, &parsed).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NoValidator { .. }));
        assert!(!err.is_schema_violation());
    }

    #[tokio::test]
    async fn test_refresh_replaces_index() {
        let dir = TempDir::new().unwrap();
        fs::copy(crds_dir().join("minimal_crd.yaml"), dir.path().join("a.yaml")).unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        directory.load_dir(dir.path()).unwrap();
        assert_eq!(directory.loaded_types().unwrap().len(), 1);

        fs::remove_file(dir.path().join("a.yaml")).unwrap();
        fs::copy(crds_dir().join("testpod_crd.yaml"), dir.path().join("b.yaml")).unwrap();
        directory.refresh().await.unwrap();

        assert_eq!(
            directory.loaded_types().unwrap(),
            vec!["pod.k8s-registry.tr.ccrn.example.com/v1"]
        );
        assert_eq!(directory.statistics().unwrap().sources, 1);
    }

    #[test]
    fn test_reload_keeps_failing_source() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.yaml");
        fs::copy(crds_dir().join("minimal_crd.yaml"), &file).unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        directory.load(&file.to_string_lossy()).unwrap();
        directory.load_dir(crds_dir()).unwrap();

        fs::remove_file(&file).unwrap();
        let err = directory.reload().unwrap_err();
        assert!(matches!(err, DirectoryError::LoadFailed { .. }));
        assert!(err.to_string().contains("no files found"));

        // The other source still applied
        assert_eq!(directory.loaded_types().unwrap().len(), 4);
        assert_eq!(directory.statistics().unwrap().sources, 2);
    }

    #[test]
    fn test_reload_without_sources() {
        StaticDirectory::new(AUTHORITY).reload().unwrap();
    }

    #[test]
    fn test_readers_never_see_half_built_index() {
        let directory = Arc::new(loaded());
        let expected = directory.snapshot().unwrap();
        assert_eq!(expected.type_keys, expected.validator_keys);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let directory = Arc::clone(&directory);
                let expected = expected.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = directory.snapshot().unwrap();
                        assert_eq!(snapshot, expected);
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            directory.reload().unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_malformed_foreign_definition_fails_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("bad.yaml"),
            "kind: CustomResourceDefinition\nmetadata:\n  name: bad.example.org\nspec:\n  group: example.org\n",
        )
        .unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        let err = directory.load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DirectoryError::LoadFailed { .. }));
        assert!(err.to_string().contains("spec.names"));
        assert_eq!(directory.statistics().unwrap().sources, 0);
    }

    #[tokio::test]
    async fn test_served_version_without_schema() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("thing.yaml"),
            r#"
kind: CustomResourceDefinition
metadata:
  name: things.ccrn.example.com
spec:
  group: ccrn.example.com
  names:
    kind: Thing
  versions:
    - name: v1
      served: true
    - name: v2
      served: true
      schema:
        openAPIV3Schema:
          type: object
"#,
        )
        .unwrap();

        let directory = StaticDirectory::new(AUTHORITY);
        let summary = directory.load_dir(dir.path()).unwrap();
        assert_eq!(summary.loaded.len(), 2);

        let key = "thing.ccrn.example.com/v1";
        assert!(directory.is_type_supported(key).await);
        assert!(!directory.has_validator(key).await);

        let parsed = parse_field_list("ccrn=thing.ccrn.example.com/v1").unwrap();
        let err = directory.validate_value(key, &parsed).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NoValidator { .. }));

        let validator = CcrnValidator::new(Arc::new(directory));
        let result = validator.validate("ccrn=thing.ccrn.example.com/v1").await;
        assert_eq!(result.reason, Some(InvalidReason::Backend));
    }

    #[test]
    fn test_load_during_reload_is_kept() {
        let first = TempDir::new().unwrap();
        fs::copy(crds_dir().join("minimal_crd.yaml"), first.path().join("a.yaml")).unwrap();
        let second = TempDir::new().unwrap();
        fs::copy(crds_dir().join("testpod_crd.yaml"), second.path().join("b.yaml")).unwrap();

        let directory = Arc::new(StaticDirectory::new(AUTHORITY));
        directory.load_dir(first.path()).unwrap();

        let reloader = {
            let directory = Arc::clone(&directory);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    directory.reload().unwrap();
                }
            })
        };
        directory.load_dir(second.path()).unwrap();
        reloader.join().unwrap();

        assert_eq!(directory.statistics().unwrap().sources, 2);
        assert_eq!(
            directory.loaded_types().unwrap(),
            vec![
                "pod.k8s-registry.tr.ccrn.example.com/v1",
                "testresource.tr.ccrn.example.com/v1",
            ]
        );
    }

    #[test]
    fn test_independent_instances() {
        let a = StaticDirectory::new(AUTHORITY);
        let b = StaticDirectory::new(AUTHORITY);
        a.load_dir(crds_dir()).unwrap();
        assert_eq!(a.loaded_types().unwrap().len(), 4);
        assert!(b.loaded_types().unwrap().is_empty());
    }
}
