//! Object storage gateway
//!
//! Media (avatars, memories, QR codes) is stored through a [`StorageGateway`].
//! An upload never fails the caller: a missing id means "no media attached".

mod appwrite;
mod local;
mod resize;

pub use appwrite::AppwriteStorage;
pub use local::LocalStorage;
pub use resize::{prepare_upload, prepare_upload_blocking};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::storage::{StorageBackend, StorageConfig};
use crate::error::Result;

/// Permission granted to uploads when the caller does not specify any
pub const DEFAULT_PERMISSION: &str = r#"read("any")"#;

/// File content handed to the gateway
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Bounding box an image is shrunk into before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    pub width: u32,
    pub height: u32,
}

impl ResizeTarget {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Store a file and return its id, or `None` when the upload failed
    async fn upload(
        &self,
        file: UploadFile,
        permissions: &[String],
        resize_to: Option<ResizeTarget>,
    ) -> Option<String>;

    /// Public URL of a stored file; `None` for an empty id
    fn file_url(&self, file_id: &str) -> Option<String>;
}

pub type SharedStorage = Arc<dyn StorageGateway>;

pub fn default_permissions() -> Vec<String> {
    vec![DEFAULT_PERMISSION.to_string()]
}

/// Build the configured storage backend
pub fn build_storage(config: &StorageConfig) -> Result<SharedStorage> {
    match config.backend {
        StorageBackend::Appwrite => {
            tracing::info!(
                "Using Appwrite storage (bucket {})",
                config.appwrite.bucket_id
            );
            Ok(Arc::new(AppwriteStorage::new(config.appwrite.clone())?))
        }
        StorageBackend::Local => {
            tracing::info!("Using local media storage at {}", config.media_dir.display());
            Ok(Arc::new(LocalStorage::new(
                config.media_dir.clone(),
                config.media_base_url.clone(),
            )?))
        }
    }
}
