//! Flat-file JSON collections.
//!
//! Each store owns one file holding a JSON array. Reads are fail-open: a missing or
//! corrupted file reads as an empty collection. Updates only fail open on those two cases;
//! any other read error aborts them, so an unreadable file is never replaced. Writes go to
//! a sibling `.tmp` file that is then renamed over the target, so readers never observe a
//! half-written array.
//!
//! Every load-mutate-save cycle runs under the store's mutex (see [`JsonFileStore::update`]),
//! which makes the store single-writer within the process.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::error::AppError;

/// A whole-file JSON array of `T`, shared between workers by cloning.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFileStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            write_lock: Arc::clone(&self.write_lock),
            _marker: PhantomData,
        }
    }
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full collection. Absent or unparseable files yield an empty `Vec`, and so
    /// does any other read failure, which is logged.
    pub async fn load(&self) -> Vec<T> {
        match self.try_load().await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to read store file {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Like [`load`](Self::load), but I/O failures other than a missing file are returned.
    async fn try_load(&self) -> Result<Vec<T>, AppError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&data) {
            Ok(items) => Ok(items),
            Err(e) => {
                log::warn!(
                    "Ignoring malformed store file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the full collection on disk.
    ///
    /// Callers that derive `items` from a previous [`load`](Self::load) should use
    /// [`update`](Self::update) instead, otherwise concurrent writers can lose updates.
    pub async fn save(&self, items: &[T]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_string_pretty(items)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, data.as_bytes()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        log::debug!("Wrote {} records to {}", items.len(), self.path.display());
        Ok(())
    }

    /// Runs `f` against the current collection inside the store's critical section.
    ///
    /// The collection is written back only if `f` returns `Ok`; its result is passed through.
    /// A file that exists but cannot be read fails the update instead of being overwritten.
    pub async fn update<F, R>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.try_load().await?;
        let result = f(&mut items)?;
        self.save(&items).await?;
        Ok(result)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
