use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{prepare_upload_blocking, ResizeTarget, StorageGateway, UploadFile};
use crate::config::storage::AppwriteConfig;
use crate::error::{AppError, Result};

/// Appwrite Storage backend
pub struct AppwriteStorage {
    config: AppwriteConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CreatedFile {
    #[serde(rename = "$id")]
    id: String,
}

impl AppwriteStorage {
    pub fn new(config: AppwriteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build storage HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    async fn create_file(&self, file: UploadFile, permissions: &[String]) -> Result<String> {
        let mut part = Part::bytes(file.bytes).file_name(file.filename);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().text("fileId", "unique()").part("file", part);
        for permission in permissions {
            form = form.text("permissions[]", permission.clone());
        }

        let url = format!(
            "{}/storage/buckets/{}/files",
            self.endpoint(),
            self.config.bucket_id
        );

        let response = self
            .client
            .post(&url)
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Key", &self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Appwrite returned {}: {}",
                status, body
            )));
        }

        let created: CreatedFile = response.json().await?;
        Ok(created.id)
    }
}

#[async_trait]
impl StorageGateway for AppwriteStorage {
    async fn upload(
        &self,
        file: UploadFile,
        permissions: &[String],
        resize_to: Option<ResizeTarget>,
    ) -> Option<String> {
        let file = prepare_upload_blocking(file, resize_to).await;
        let filename = file.filename.clone();

        match self.create_file(file, permissions).await {
            Ok(id) => {
                tracing::debug!("Uploaded {} to Appwrite as {}", filename, id);
                Some(id)
            }
            Err(e) => {
                tracing::error!("Failed to upload {} to Appwrite: {}", filename, e);
                None
            }
        }
    }

    fn file_url(&self, file_id: &str) -> Option<String> {
        if file_id.is_empty() {
            return None;
        }
        Some(format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint(),
            self.config.bucket_id,
            file_id,
            self.config.project_id
        ))
    }
}
