//! Upload backends. `AppState` carries one as `Arc<dyn UploadStore>`, chosen at
//! startup from `UPLOAD_STORAGE`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::upload::{NewUpload, UploadedFile};
use crate::uploads::validation::{content_type_for, extension_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadBackend {
    #[default]
    Memory,
    Disk,
}

impl FromStr for UploadBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(UploadBackend::Memory),
            "disk" => Ok(UploadBackend::Disk),
            other => Err(anyhow::anyhow!("unknown upload storage '{other}'")),
        }
    }
}

impl fmt::Display for UploadBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadBackend::Memory => f.write_str("memory"),
            UploadBackend::Disk => f.write_str("disk"),
        }
    }
}

/// Storage for profile photos. Implementations choose nothing about naming:
/// `save` is handed the final filename.
#[async_trait]
pub trait UploadStore: Send + Sync {
    fn backend(&self) -> UploadBackend;

    async fn save(&self, filename: &str, upload: NewUpload) -> Result<()>;

    /// `Ok(None)` for names the backend does not know.
    async fn open(&self, filename: &str) -> Result<Option<UploadedFile>>;
}

/// `profile-<uuid>` followed by the original extension (with dot, case kept).
pub fn profile_filename(original_name: &str) -> String {
    format!("profile-{}{}", Uuid::new_v4(), extension_of(original_name))
}

/// Rejects anything that could leave the upload namespace.
fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\'])
}

pub fn build_upload_store(backend: UploadBackend, upload_dir: PathBuf) -> Arc<dyn UploadStore> {
    match backend {
        UploadBackend::Memory => Arc::new(MemoryUploadStore::new()),
        UploadBackend::Disk => Arc::new(DiskUploadStore::new(upload_dir)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Memory backend
// ────────────────────────────────────────────────────────────────────────────

/// Process-local photo store. No eviction or size cap; contents vanish on restart.
#[derive(Debug, Default)]
pub struct MemoryUploadStore {
    files: DashMap<String, UploadedFile>,
}

impl MemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[async_trait]
impl UploadStore for MemoryUploadStore {
    fn backend(&self) -> UploadBackend {
        UploadBackend::Memory
    }

    async fn save(&self, filename: &str, upload: NewUpload) -> Result<()> {
        let NewUpload {
            original_name,
            mimetype,
            bytes,
        } = upload;
        debug!("Caching {} bytes as {filename}", bytes.len());
        self.files.insert(
            filename.to_string(),
            UploadedFile {
                bytes,
                mimetype,
                original_name,
                uploaded_at: Utc::now(),
            },
        );
        info!("Memory upload store now holds {} files", self.len());
        Ok(())
    }

    async fn open(&self, filename: &str) -> Result<Option<UploadedFile>> {
        Ok(self.files.get(filename).map(|entry| entry.value().clone()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Disk backend
// ────────────────────────────────────────────────────────────────────────────

/// Writes photos under a directory created on first use.
#[derive(Debug, Clone)]
pub struct DiskUploadStore {
    dir: PathBuf,
}

impl DiskUploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    fn backend(&self) -> UploadBackend {
        UploadBackend::Disk
    }

    async fn save(&self, filename: &str, upload: NewUpload) -> Result<()> {
        if !is_plain_filename(filename) {
            anyhow::bail!("refusing to write upload named {filename:?}");
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.dir.join(filename);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(
            "Wrote {} ({} bytes, from {})",
            path.display(),
            upload.bytes.len(),
            upload.original_name
        );
        Ok(())
    }

    async fn open(&self, filename: &str) -> Result<Option<UploadedFile>> {
        if !is_plain_filename(filename) {
            return Ok(None);
        }
        let path = self.dir.join(filename);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let uploaded_at = tokio::fs::metadata(&path)
            .await
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(UploadedFile {
            bytes,
            mimetype: content_type_for(filename).to_string(),
            original_name: filename.to_string(),
            uploaded_at,
        }))
    }
}
