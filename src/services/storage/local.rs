use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::{prepare_upload_blocking, ResizeTarget, StorageGateway, UploadFile};
use crate::error::Result;

/// Filesystem backend storing media under a single directory.
///
/// Files are written to a temporary file in the same directory and renamed
/// into place; the temporary file is removed on every failure path.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, base_url: String) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a stored file on disk
    pub fn path_for(&self, file_id: &str) -> PathBuf {
        self.root.join(file_id)
    }
}

fn file_id_for(filename: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{}", id, ext),
        None => id,
    }
}

fn write_atomically(root: &Path, file_id: &str, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(root)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(root.join(file_id)).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl StorageGateway for LocalStorage {
    async fn upload(
        &self,
        file: UploadFile,
        permissions: &[String],
        resize_to: Option<ResizeTarget>,
    ) -> Option<String> {
        if !permissions.is_empty() {
            tracing::debug!("Local storage ignores permissions {:?}", permissions);
        }

        let file = prepare_upload_blocking(file, resize_to).await;
        let file_id = file_id_for(&file.filename);
        let root = self.root.clone();
        let target_id = file_id.clone();

        let result =
            tokio::task::spawn_blocking(move || write_atomically(&root, &target_id, &file.bytes))
                .await;

        match result {
            Ok(Ok(())) => Some(file_id),
            Ok(Err(e)) => {
                tracing::error!("Failed to store media file {}: {}", file_id, e);
                None
            }
            Err(e) => {
                tracing::error!("Media write task failed for {}: {}", file_id, e);
                None
            }
        }
    }

    fn file_url(&self, file_id: &str) -> Option<String> {
        if file_id.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.base_url, file_id))
    }
}
