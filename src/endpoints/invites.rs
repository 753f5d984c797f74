//! Staff invite administration

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::models::{guest, invite};
use crate::schemas::{CreateInviteRequest, InviteResponse, UpdateInviteRequest};
use crate::state::AppState;

/// Create the invite administration routes
pub fn invite_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_invites).post(create_invite))
        .route(
            "/{token}",
            get(get_invite).patch(update_invite).delete(delete_invite),
        )
        .with_state(state)
}

fn to_response(state: &AppState, invite: invite::Model, guest: &guest::Model) -> InviteResponse {
    let qr_code_url = state.invites.qr_code_url(&invite);
    let detail_url = state.invites.detail_link(&invite.token);
    InviteResponse::new(invite, guest, qr_code_url, detail_url)
}

/// List invites, newest first
#[utoipa::path(
    get,
    path = "/api/invites",
    tag = "Invites",
    responses(
        (status = 200, body = Vec<InviteResponse>)
    )
)]
pub async fn list_invites(State(state): State<AppState>) -> Result<Json<Vec<InviteResponse>>> {
    let invites = state.invites.list().await?;
    Ok(Json(
        invites
            .into_iter()
            .map(|(invite, guest)| to_response(&state, invite, &guest))
            .collect(),
    ))
}

/// Create an invite and its QR code
#[utoipa::path(
    post,
    path = "/api/invites",
    tag = "Invites",
    request_body = CreateInviteRequest,
    responses(
        (status = 201, body = InviteResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown guest")
    )
)]
pub async fn create_invite(
    State(state): State<AppState>,
    Json(req): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>)> {
    let (invite, guest) = state.invites.create(req).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, invite, &guest))))
}

#[utoipa::path(
    get,
    path = "/api/invites/{token}",
    tag = "Invites",
    params(("token" = String, Path, description = "Invite token")),
    responses(
        (status = 200, body = InviteResponse),
        (status = 404, description = "Unknown invite")
    )
)]
pub async fn get_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InviteResponse>> {
    let invite = state.invites.get_by_token(&token).await?;
    let guest = state.invites.guest_of(&invite).await?;
    Ok(Json(to_response(&state, invite, &guest)))
}

/// Change activation, expiration or message
#[utoipa::path(
    patch,
    path = "/api/invites/{token}",
    tag = "Invites",
    params(("token" = String, Path, description = "Invite token")),
    request_body = UpdateInviteRequest,
    responses(
        (status = 200, body = InviteResponse),
        (status = 404, description = "Unknown invite")
    )
)]
pub async fn update_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<UpdateInviteRequest>,
) -> Result<Json<InviteResponse>> {
    let invite = state.invites.update(&token, req).await?;
    let guest = state.invites.guest_of(&invite).await?;
    Ok(Json(to_response(&state, invite, &guest)))
}

#[utoipa::path(
    delete,
    path = "/api/invites/{token}",
    tag = "Invites",
    params(("token" = String, Path, description = "Invite token")),
    responses(
        (status = 204, description = "Invite deleted"),
        (status = 404, description = "Unknown invite")
    )
)]
pub async fn delete_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    state.invites.delete(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
