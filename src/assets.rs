// src/assets.rs

//! Versioned offline cache for the app's static files.
//!
//! Each generation lives in its own directory `<root>/<name>-v<version>` holding the
//! fetched blobs and an `index.json` that maps asset paths to blob file names. Only the
//! install step writes into a generation; lookups that miss go to the origin and the
//! response is handed back without being stored.

use crate::error::{PdError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDEX_FILE: &str = "index.json";

/// Where assets come from when they are not cached ("the network").
pub trait AssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Serves assets from a local directory, resolving paths relative to it.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        if relative.split('/').any(|part| part == "..") {
            return Err(PdError::AssetUnavailable(format!(
                "{} escapes the asset root",
                path
            )));
        }
        let file = if relative.is_empty() {
            self.root.join("index.html")
        } else {
            self.root.join(relative)
        };
        fs::read(&file).map_err(|e| PdError::AssetUnavailable(format!("{}: {}", path, e)))
    }
}

pub struct AssetCache {
    root: PathBuf,
    name: String,
    version: u32,
    manifest: Vec<String>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>, name: &str, version: u32, manifest: Vec<String>) -> Self {
        Self {
            root: root.into(),
            name: name.to_string(),
            version,
            manifest,
        }
    }

    /// Name of this cache generation, e.g. `pd-tracker-v3`.
    pub fn generation(&self) -> String {
        format!("{}-v{}", self.name, self.version)
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(self.generation())
    }

    pub fn is_installed(&self) -> bool {
        self.generation_dir().join(INDEX_FILE).is_file()
    }

    /// Fetches every manifest path and stores them as the current generation.
    ///
    /// Blobs are staged in a scratch directory first; the generation only appears once
    /// every fetch succeeded. Returns the number of cached assets.
    pub fn install(&self, source: &dyn AssetSource) -> Result<usize> {
        fs::create_dir_all(&self.root)?;
        let staging = self.root.join(format!(".{}.staging", self.generation()));
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        if let Err(e) = self.fill(&staging, source) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        let target = self.generation_dir();
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staging, &target)?;
        info!(generation = %self.generation(), assets = self.manifest.len(), "asset cache installed");
        Ok(self.manifest.len())
    }

    fn fill(&self, staging: &Path, source: &dyn AssetSource) -> Result<()> {
        let mut index = BTreeMap::new();
        for (n, path) in self.manifest.iter().enumerate() {
            let body = source.fetch(path)?;
            let blob = format!("{}.bin", n);
            fs::write(staging.join(&blob), body)?;
            index.insert(path.clone(), blob);
        }
        let json = serde_json::to_vec_pretty(&index)
            .map_err(|e| PdError::AssetUnavailable(format!("index: {}", e)))?;
        fs::write(staging.join(INDEX_FILE), json)?;
        Ok(())
    }

    /// True for `<name>-v<N>` directory names belonging to this cache.
    fn is_generation_name(&self, dir_name: &str) -> bool {
        dir_name
            .strip_prefix(self.name.as_str())
            .and_then(|rest| rest.strip_prefix("-v"))
            .is_some_and(|n| !n.is_empty() && n.parse::<u32>().is_ok())
    }

    /// Deletes older generations of this cache and returns their names.
    /// Anything else under the root is left alone.
    pub fn activate(&self) -> Result<Vec<String>> {
        let current = self.generation();
        let mut removed = Vec::new();
        if !self.root.exists() {
            return Ok(removed);
        }
        for dirent in fs::read_dir(&self.root)? {
            let dirent = dirent?;
            let name = dirent.file_name().to_string_lossy().to_string();
            if name == current || !self.is_generation_name(&name) || !dirent.file_type()?.is_dir() {
                continue;
            }
            fs::remove_dir_all(dirent.path())?;
            info!(generation = %name, "stale asset cache removed");
            removed.push(name);
        }
        removed.sort();
        Ok(removed)
    }

    /// Cache first, falling back to `source` on a miss. Misses are never written back.
    pub fn fetch(&self, path: &str, source: &dyn AssetSource) -> Result<Vec<u8>> {
        if let Some(blob) = self.lookup(path)? {
            debug!(path, "asset cache hit");
            return Ok(fs::read(self.generation_dir().join(blob))?);
        }
        debug!(path, "asset cache miss");
        source.fetch(path)
    }

    fn lookup(&self, path: &str) -> Result<Option<String>> {
        let index_path = self.generation_dir().join(INDEX_FILE);
        if !index_path.is_file() {
            return Ok(None);
        }
        let raw = fs::read(&index_path)?;
        let mut index: BTreeMap<String, String> = serde_json::from_slice(&raw)
            .map_err(|e| PdError::AssetUnavailable(format!("corrupt cache index: {}", e)))?;
        Ok(index.remove(path))
    }
}
