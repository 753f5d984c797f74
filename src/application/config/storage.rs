use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Appwrite,
    Local,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "appwrite" => Some(StorageBackend::Appwrite),
            "local" => Some(StorageBackend::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub bucket_id: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub appwrite: AppwriteConfig,
    /// Directory used by the local backend
    pub media_dir: PathBuf,
    /// Public prefix of files stored by the local backend
    pub media_base_url: String,
}

impl StorageConfig {
    pub fn from_env(public_base_url: &str) -> Self {
        let backend = env::var("INVITE_STORAGE_BACKEND")
            .ok()
            .and_then(|v| StorageBackend::parse(&v))
            .unwrap_or(StorageBackend::Local);

        Self {
            backend,
            appwrite: AppwriteConfig {
                endpoint: env::var("APPWRITE_ENDPOINT")
                    .unwrap_or_else(|_| "https://cloud.appwrite.io/v1".to_string()),
                project_id: env::var("APPWRITE_PROJECT_ID").unwrap_or_default(),
                api_key: env::var("APPWRITE_API_KEY").unwrap_or_default(),
                bucket_id: env::var("APPWRITE_BUCKET_ID").unwrap_or_default(),
            },
            media_dir: env::var("INVITE_MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media")),
            media_base_url: env::var("INVITE_MEDIA_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("{}/media", public_base_url)),
        }
    }
}
