use std::fmt;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// What a load does when the backing file is missing or unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Log and serve the document's empty default.
    #[default]
    FailOpen,
    /// Propagate the failure to the caller.
    Strict,
}

impl FromStr for ReadPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_open" | "fail-open" => Ok(ReadPolicy::FailOpen),
            "strict" => Ok(ReadPolicy::Strict),
            other => Err(anyhow::anyhow!("unknown read policy '{other}'")),
        }
    }
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPolicy::FailOpen => f.write_str("fail_open"),
            ReadPolicy::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },

    #[error("write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Repository over a single JSON file holding a whole document of type `T`.
///
/// Every mutation is load → change in memory → `replace`. There is no lock
/// spanning that sequence: two writers that load the same version race, and
/// the last `replace` wins. `replace` itself is atomic (temp file + rename).
pub struct JsonDocument<T> {
    path: PathBuf,
    policy: ReadPolicy,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonDocument<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            policy: self.policy,
            _doc: PhantomData,
        }
    }
}

impl<T> fmt::Debug for JsonDocument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDocument")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>, policy: ReadPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            _doc: PhantomData,
        }
    }

    /// Reads and parses the whole document.
    pub async fn load(&self) -> Result<T, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return self.degrade(StoreError::Missing(self.path.clone()));
            }
            Err(source) => {
                return self.degrade(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(doc) => Ok(doc),
            Err(source) => self.degrade(StoreError::Parse {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrites the whole document. The parent directory is created if absent.
    pub async fn replace(&self, doc: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes)).await??;
        debug!("Rewrote {}", self.path.display());
        Ok(())
    }

    fn degrade(&self, err: StoreError) -> Result<T, StoreError> {
        match self.policy {
            ReadPolicy::FailOpen => {
                warn!("{err}; serving empty document");
                Ok(T::default())
            }
            ReadPolicy::Strict => Err(err),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.as_file_mut().write_all(bytes).map_err(write_err)?;
    tmp.as_file_mut().flush().map_err(write_err)?;
    tmp.as_file_mut().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
