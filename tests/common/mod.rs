//! Test helpers shared by the integration tests.
//!
//! Provides an in-memory SQLite database with migrations applied, a clock
//! that only moves when told to, an in-memory storage gateway that records
//! every upload, and fixtures for guests and invites.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use parking_lot::{Mutex, RwLock};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt;

use digital_invite::migrations::Migrator;
use digital_invite::models::{guest, invite};
use digital_invite::services::cache::InviteCache;
use digital_invite::services::clock::{Clock, SharedClock};
use digital_invite::services::storage::{ResizeTarget, StorageGateway, UploadFile};
use digital_invite::state::AppState;

pub const STAFF_TOKEN: &str = "staff-secret";
pub const PUBLIC_BASE_URL: &str = "http://invite.test";
pub const STORAGE_URL: &str = "https://storage.test";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

// ============================================================================
// Clock
// ============================================================================

pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

/// Clock that stands still until advanced
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: RwLock::new(start),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

// ============================================================================
// Storage
// ============================================================================

/// One recorded call to [`MemoryStorage::upload`]
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub id: Option<String>,
    pub file: UploadFile,
    pub permissions: Vec<String>,
    pub resize_to: Option<ResizeTarget>,
}

/// Storage gateway keeping uploads in memory.
///
/// Uploads whose filename contains one of the `failing` fragments return no id.
#[derive(Default)]
pub struct MemoryStorage {
    uploads: Mutex<Vec<RecordedUpload>>,
    failing: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_uploads_named(&self, fragment: &str) {
        self.failing.lock().push(fragment.to_string());
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl StorageGateway for MemoryStorage {
    async fn upload(
        &self,
        file: UploadFile,
        permissions: &[String],
        resize_to: Option<ResizeTarget>,
    ) -> Option<String> {
        let fails = self
            .failing
            .lock()
            .iter()
            .any(|fragment| file.filename.contains(fragment.as_str()));
        let id = if fails {
            None
        } else {
            Some(format!(
                "file-{}",
                self.counter.fetch_add(1, Ordering::SeqCst) + 1
            ))
        };

        self.uploads.lock().push(RecordedUpload {
            id: id.clone(),
            file,
            permissions: permissions.to_vec(),
            resize_to,
        });
        id
    }

    fn file_url(&self, file_id: &str) -> Option<String> {
        if file_id.is_empty() {
            return None;
        }
        Some(format!(
            "{}/files/{}/view?project=test",
            STORAGE_URL, file_id
        ))
    }
}

pub fn file_url(file_id: &str) -> String {
    format!("{}/files/{}/view?project=test", STORAGE_URL, file_id)
}

// ============================================================================
// Application state
// ============================================================================

pub struct TestContext {
    pub db: DatabaseConnection,
    pub clock: Arc<ManualClock>,
    pub storage: Arc<MemoryStorage>,
    pub state: AppState,
}

impl TestContext {
    pub fn router(&self) -> Router {
        digital_invite::endpoints::create_router(self.state.clone())
    }
}

/// Build application state around a fresh database with a 15 minute cache
pub async fn build_test_context() -> TestContext {
    build_test_context_with_ttl(900).await
}

pub async fn build_test_context_with_ttl(ttl_secs: u64) -> TestContext {
    let db = create_test_db().await;
    let clock = ManualClock::new(test_start());
    let storage = MemoryStorage::new();

    let shared_clock: SharedClock = clock.clone();
    let state = AppState::new(
        db.clone(),
        storage.clone(),
        shared_clock.clone(),
        InviteCache::new(ttl_secs, shared_clock),
        PUBLIC_BASE_URL,
        Some(STAFF_TOKEN.to_string()),
    );

    TestContext {
        db,
        clock,
        storage,
        state,
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub async fn create_guest(db: &DatabaseConnection, first_name: &str) -> guest::Model {
    create_guest_with_media(db, first_name, None, "[]").await
}

pub async fn create_guest_with_media(
    db: &DatabaseConnection,
    first_name: &str,
    avatar_id: Option<&str>,
    memories: &str,
) -> guest::Model {
    guest::ActiveModel {
        token: Set(uuid::Uuid::new_v4().to_string()),
        first_name: Set(first_name.to_string()),
        avatar_id: Set(avatar_id.map(String::from)),
        memories: Set(memories.to_string()),
        created_at: Set(test_start()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test guest")
}

pub async fn create_invite(db: &DatabaseConnection, guest: &guest::Model) -> invite::Model {
    create_invite_with(db, guest, |_| {}).await
}

/// Create an active, pending, non-expiring invite, adjusted by `customize`
pub async fn create_invite_with(
    db: &DatabaseConnection,
    guest: &guest::Model,
    customize: impl FnOnce(&mut invite::ActiveModel),
) -> invite::Model {
    let mut invite = invite::ActiveModel {
        guest_id: Set(guest.id),
        token: Set(uuid::Uuid::new_v4().to_string()),
        expiration_date: Set(None),
        is_active: Set(true),
        created_at: Set(test_start()),
        invitation_status: Set("pending".to_string()),
        interactions_count: Set(0),
        ..Default::default()
    };
    customize(&mut invite);
    invite.insert(db).await.expect("Failed to create test invite")
}

// ============================================================================
// Images
// ============================================================================

pub fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn opaque_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([180, 40, 90]))),
        ImageFormat::Png,
    )
}

pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            width,
            height,
            Rgba([20, 120, 200, 100]),
        )),
        ImageFormat::Png,
    )
}

// ============================================================================
// HTTP
// ============================================================================

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send(app, request).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request carrying the staff bearer token
pub fn staff_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", STAFF_TOKEN));

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Minimal multipart/form-data encoder for the guest forms
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----digital-invite-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: &str, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", STAFF_TOKEN))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
