//! Staff guest administration (multipart forms with media uploads)

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::guest::{self, Gender};
use crate::schemas::{GuestFields, GuestResponse};
use crate::services::media::media_for;
use crate::services::storage::UploadFile;
use crate::state::AppState;

/// Largest accepted form body (avatar plus several photos)
const MAX_FORM_BYTES: usize = 50 * 1024 * 1024;

/// Create the guest administration routes
pub fn guest_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_guests).post(create_guest))
        .route(
            "/{token}",
            get(get_guest).post(update_guest).delete(delete_guest),
        )
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(state)
}

/// Parsed guest form
#[derive(Debug, Default)]
struct GuestUpload {
    fields: GuestFields,
    avatar: Option<UploadFile>,
    memories: Vec<UploadFile>,
}

async fn read_guest_form(mut multipart: Multipart) -> Result<GuestUpload> {
    let mut form = GuestUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "first_name" => form.fields.first_name = read_text(field).await?,
            "last_name" => form.fields.last_name = Some(read_text(field).await?),
            "nickname" => form.fields.nickname = Some(read_text(field).await?),
            "emoji" => form.fields.emoji = Some(read_text(field).await?),
            "gender" => {
                let value = read_text(field).await?;
                form.fields.gender = if value.trim().is_empty() {
                    None
                } else {
                    Some(Gender::parse(&value).ok_or_else(|| {
                        AppError::BadRequest(format!("Invalid gender: {}", value))
                    })?)
                };
            }
            "avatar" => form.avatar = read_image(field).await?,
            "memories_upload" => {
                if let Some(file) = read_image(field).await? {
                    form.memories.push(file);
                }
            }
            _ => tracing::debug!("Ignoring unknown form field {}", name),
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))
}

/// Read an uploaded image; an empty file input yields `None`
async fn read_image(field: Field<'_>) -> Result<Option<UploadFile>> {
    let filename = field
        .file_name()
        .filter(|n| !n.is_empty())
        .unwrap_or("upload")
        .to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {}", e)))?;

    if bytes.is_empty() {
        return Ok(None);
    }
    if image::guess_format(&bytes).is_err() {
        return Err(AppError::BadRequest(format!("{} is not an image", filename)));
    }

    let mut file = UploadFile::new(filename, bytes.to_vec());
    if let Some(content_type) = content_type {
        file = file.with_content_type(content_type);
    }
    Ok(Some(file))
}

fn to_response(state: &AppState, guest: &guest::Model) -> GuestResponse {
    GuestResponse::from_guest(guest, media_for(guest, state.storage.as_ref()))
}

#[utoipa::path(
    get,
    path = "/api/guests",
    tag = "Guests",
    responses(
        (status = 200, body = Vec<GuestResponse>)
    )
)]
pub async fn list_guests(State(state): State<AppState>) -> Result<Json<Vec<GuestResponse>>> {
    let guests = state.guests.list().await?;
    Ok(Json(guests.iter().map(|g| to_response(&state, g)).collect()))
}

/// Create a guest from a multipart form.
///
/// Fields: `first_name`, `last_name`, `nickname`, `gender`, `emoji`, `avatar`
/// (required) and any number of `memories_upload` files.
#[utoipa::path(
    post,
    path = "/api/guests",
    tag = "Guests",
    responses(
        (status = 201, body = GuestResponse),
        (status = 400, description = "Invalid form")
    )
)]
pub async fn create_guest(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<GuestResponse>)> {
    let form = read_guest_form(multipart).await?;
    let avatar = form
        .avatar
        .ok_or_else(|| AppError::BadRequest("Avatar is required".to_string()))?;

    let guest = state
        .guests
        .create(form.fields, avatar, form.memories)
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, &guest))))
}

#[utoipa::path(
    get,
    path = "/api/guests/{token}",
    tag = "Guests",
    params(("token" = String, Path, description = "Guest token")),
    responses(
        (status = 200, body = GuestResponse),
        (status = 404, description = "Unknown guest")
    )
)]
pub async fn get_guest(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<GuestResponse>> {
    let guest = state.guests.get_by_token(&token).await?;
    Ok(Json(to_response(&state, &guest)))
}

/// Edit a guest; a new avatar replaces the old one, new memories are appended
#[utoipa::path(
    post,
    path = "/api/guests/{token}",
    tag = "Guests",
    params(("token" = String, Path, description = "Guest token")),
    responses(
        (status = 200, body = GuestResponse),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Unknown guest")
    )
)]
pub async fn update_guest(
    State(state): State<AppState>,
    Path(token): Path<String>,
    multipart: Multipart,
) -> Result<Json<GuestResponse>> {
    let form = read_guest_form(multipart).await?;
    let guest = state
        .guests
        .update(&token, form.fields, form.avatar, form.memories)
        .await?;
    Ok(Json(to_response(&state, &guest)))
}

/// Delete a guest and all of its invites
#[utoipa::path(
    delete,
    path = "/api/guests/{token}",
    tag = "Guests",
    params(("token" = String, Path, description = "Guest token")),
    responses(
        (status = 204, description = "Guest deleted"),
        (status = 404, description = "Unknown guest")
    )
)]
pub async fn delete_guest(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    let invite_tokens = state.guests.delete(&token).await?;
    state
        .invites
        .invalidate(invite_tokens.iter().map(String::as_str));
    Ok(StatusCode::NO_CONTENT)
}
