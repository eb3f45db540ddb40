//! Where asset bytes come from
//!
//! The loader only needs two things from a source: a stable cache key for a
//! relative path and the raw bytes behind it.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::core::RackError;

/// A provider of raw asset bytes addressed by catalog-relative paths
pub trait AssetSource: Send + Sync {
    /// Stable identifier for `path`, used as the cache key
    fn resolve(&self, path: &str) -> String;

    /// Fetch the bytes behind `path`
    fn fetch(&self, path: &str) -> Result<Vec<u8>, RackError>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Assets stored under a base directory on disk
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    base_dir: PathBuf,
}

impl FsAssetSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Catalog paths must stay inside the base directory
    fn checked_path(&self, path: &str) -> Result<PathBuf, RackError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.is_empty() {
            return Err(RackError::asset_error(
                path,
                "asset paths must be relative and stay inside the asset directory",
            ));
        }
        Ok(self.base_dir.join(relative))
    }
}

impl AssetSource for FsAssetSource {
    fn resolve(&self, path: &str) -> String {
        self.base_dir.join(path).to_string_lossy().into_owned()
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>, RackError> {
        let full = self.checked_path(path)?;
        std::fs::read(&full)
            .map_err(|e| RackError::asset_error(full.to_string_lossy(), e.to_string()))
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

/// Assets held in memory, keyed by their catalog path
///
/// Used by browser builds, where assets arrive through JavaScript, and by
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Vec<u8>>,
}

/// Assets shipped with the crate, keyed by catalog path
const BUNDLED_ASSETS: &[(&str, &[u8])] = &[(
    "switches/cisco-c9200l-24t-4g.svg",
    include_bytes!("../../assets/switches/cisco-c9200l-24t-4g.svg"),
)];

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assets referenced by the bundled catalog
    pub fn bundled() -> Self {
        BUNDLED_ASSETS
            .iter()
            .fold(Self::new(), |source, (path, bytes)| source.with_asset(*path, *bytes))
    }

    /// Add or replace the bytes for `path`
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(path.into(), bytes.into());
    }

    pub fn with_asset(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.assets.remove(path)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetSource for MemoryAssetSource {
    fn resolve(&self, path: &str) -> String {
        format!("memory://{}", path)
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>, RackError> {
        self.assets
            .get(path)
            .cloned()
            .ok_or_else(|| RackError::asset_error(path, "no such asset"))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
