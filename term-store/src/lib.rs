//! Per-category files under a data directory:
//!
//! - `data_raw_<category>.json`: fetched posts
//! - `data_terms_<category>.json`: aggregated term counts
//! - `outputs/<category>.png`: cached word cloud
//!
//! Writes go through a temporary file in the target directory and an atomic
//! rename, so readers see either the old file or the complete new one.

use cloudword_core::{CoreError, Post, StorageError, TermFrequency};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};


const RAW_PREFIX: &str = "data_raw_";
const TERMS_PREFIX: &str = "data_terms_";
const JSON_SUFFIX: &str = ".json";
const OUTPUT_DIR: &str = "outputs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Raw,
    Terms,
}

impl DataKind {
    fn prefix(&self) -> &'static str {
        match self {
            DataKind::Raw => RAW_PREFIX,
            DataKind::Terms => TERMS_PREFIX,
        }
    }
}

#[derive(Debug, Default)]
pub struct DataStore {
    root: PathBuf,
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_path(&self, kind: DataKind, category: &str) -> PathBuf {
        self.root
            .join(format!("{}{}{}", kind.prefix(), category, JSON_SUFFIX))
    }

    pub fn raw_path(&self, category: &str) -> PathBuf {
        self.data_path(DataKind::Raw, category)
    }

    pub fn terms_path(&self, category: &str) -> PathBuf {
        self.data_path(DataKind::Terms, category)
    }

    pub fn image_path(&self, category: &str) -> PathBuf {
        self.root.join(OUTPUT_DIR).join(format!("{category}.png"))
    }

    pub async fn save_raw(&self, category: &str, posts: &[Post]) -> Result<PathBuf, CoreError> {
        validate_category(category)?;
        let path = self.raw_path(category);
        write_atomic(&path, serde_json::to_vec_pretty(posts)?).await?;
        info!("Saved {} posts to {}", posts.len(), path.display());
        Ok(path)
    }

    pub async fn load_raw(&self, category: &str) -> Result<Vec<Post>, CoreError> {
        validate_category(category)?;
        read_json(&self.raw_path(category)).await
    }

    pub async fn save_terms(
        &self,
        category: &str,
        terms: &TermFrequency,
    ) -> Result<PathBuf, CoreError> {
        validate_category(category)?;
        let path = self.terms_path(category);
        write_atomic(&path, serde_json::to_vec_pretty(terms)?).await?;
        info!("Saved {} terms to {}", terms.len(), path.display());
        Ok(path)
    }

    pub async fn load_terms(&self, category: &str) -> Result<TermFrequency, CoreError> {
        validate_category(category)?;
        read_json(&self.terms_path(category)).await
    }

    /// Categories that have a file of `kind`, sorted by name.
    pub async fn list_categories(&self, kind: DataKind) -> Result<Vec<String>, CoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut categories = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(category) = name
                .strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_suffix(JSON_SUFFIX))
                .filter(|category| validate_category(category).is_ok())
            {
                categories.push(category.to_string());
            }
        }
        categories.sort();
        Ok(categories)
    }

    /// One lock per category, created on first use.
    pub fn category_lock(&self, category: &str) -> Arc<Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(category.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// The cached PNG for `category`, rendering it from the terms file first
    /// when it does not exist yet. Concurrent callers for the same category
    /// wait for a single render.
    pub async fn cached_image<F>(&self, category: &str, render: F) -> Result<Vec<u8>, CoreError>
    where
        F: FnOnce(TermFrequency) -> Result<Vec<u8>, CoreError> + Send + 'static,
    {
        validate_category(category)?;
        let lock = self.category_lock(category);
        let _guard = lock.lock().await;

        let image_path = self.image_path(category);
        match tokio::fs::read(&image_path).await {
            Ok(bytes) => {
                debug!("Serving cached image {}", image_path.display());
                return Ok(bytes);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let terms = self.load_terms(category).await?;
        info!("Rendering image for category '{}'", category);
        let png = tokio::task::spawn_blocking(move || render(terms))
            .await
            .map_err(|e| CoreError::Internal {
                message: format!("Render task failed: {e}"),
            })??;

        write_atomic(&image_path, png.clone()).await?;
        Ok(png)
    }

    pub async fn save_image(&self, category: &str, png: Vec<u8>) -> Result<PathBuf, CoreError> {
        validate_category(category)?;
        let lock = self.category_lock(category);
        let _guard = lock.lock().await;

        let path = self.image_path(category);
        write_atomic(&path, png).await?;
        info!("Saved image to {}", path.display());
        Ok(path)
    }
}

/// Category names become file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    let valid = !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::invalid_input(format!(
            "Invalid category name: {category}"
        )))
    }
}

async fn read_json<T>(path: &Path) -> Result<T, CoreError>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Data file missing: {}", path.display());
            return Err(StorageError::DataMissing {
                path: path.display().to_string(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        StorageError::CorruptData {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Write `bytes` to `path` through a sibling temporary file and a rename.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), CoreError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &bytes))
        .await
        .map_err(|e| CoreError::Internal {
            message: format!("Write task failed: {e}"),
        })?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let write_failed = |reason: String| StorageError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| write_failed(e.to_string()))?;

    let mut file = NamedTempFile::new_in(&dir).map_err(|e| write_failed(e.to_string()))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| write_failed(e.to_string()))?;
    file.persist(path)
        .map_err(|e| write_failed(e.error.to_string()))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
