//! Guest-facing invitation endpoints

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use serde::de::DeserializeOwned;

use crate::endpoints::extractors::ClientIp;
use crate::error::{AppError, Result};
use crate::models::invite::InvitationStatus;
use crate::schemas::{
    CompleteProfileRequest, CompleteProfileResponse, DetailQuery, GamificationResponse,
    GuestProfile, InviteDetailResponse, QrSvgQuery, RsvpRequest, RsvpResponse,
};
use crate::services::media::{media_for, video_embed_url};
use crate::services::qr;
use crate::state::AppState;

/// Create the invitation routes
pub fn invitation_routes(state: AppState) -> Router {
    Router::new()
        .route("/detail/{token}/", get(invite_detail))
        .route("/detail/{token}/complete_profile/", post(complete_profile))
        .route("/detail/{token}/qr.png", get(qr_png))
        .route("/detail/{token}/qr.svg", get(qr_svg))
        .route("/respond/{token}/", post(respond_invite))
        .with_state(state)
}

fn detail_path(token: &str) -> String {
    format!("/invitations/detail/{}/", token)
}

/// Decode a JSON request body, reporting any malformed payload as a 400
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|_| AppError::BadRequest("Invalid JSON".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Invitation page data; every successful view is counted
#[utoipa::path(
    get,
    path = "/invitations/detail/{token}/",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invite token"), DetailQuery),
    responses(
        (status = 200, body = InviteDetailResponse),
        (status = 403, description = "Invite inactive or expired"),
        (status = 404, description = "Unknown or inactive invite")
    )
)]
pub async fn invite_detail(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<DetailQuery>,
    client_ip: ClientIp,
) -> Result<Json<InviteDetailResponse>> {
    let invite = state
        .invites
        .get_with_cache(&token, client_ip.as_deref())
        .await?;
    state.invites.validate_access(&invite)?;

    let guest = state.invites.guest_of(&invite).await?;
    let media = media_for(&guest, state.storage.as_ref()).with_avatar_fallback();

    let show_profile_modal = (invite.status() == InvitationStatus::Accepted
        && guest.profile_incomplete())
        || query.forces_profile_modal();

    let gamification = state
        .gamification
        .find_by_invite(invite.id)
        .await?
        .map(|ledger| GamificationResponse::new(&ledger, &invite.token));

    let qr_code_url = state.invites.qr_code_url(&invite);

    Ok(Json(InviteDetailResponse {
        token: invite.token,
        invitation_status: invite.invitation_status,
        expiration_date: invite.expiration_date,
        response_date: invite.response_date,
        decline_reason: invite.decline_reason,
        personalized_message: invite.personalized_message,
        pre_confirmation_video_url: invite
            .pre_confirmation_video_url
            .as_deref()
            .map(video_embed_url),
        thank_you_video_url: invite.thank_you_video_url.as_deref().map(video_embed_url),
        guest: GuestProfile::from(&guest),
        media,
        show_profile_modal,
        qr_code_url,
        gamification,
    }))
}

/// Accept or decline an invitation
#[utoipa::path(
    post,
    path = "/invitations/respond/{token}/",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invite token")),
    request_body = RsvpRequest,
    responses(
        (status = 200, body = RsvpResponse),
        (status = 400, description = "Invalid JSON, invalid status or invitation already declined"),
        (status = 403, description = "Invite inactive or expired"),
        (status = 404, description = "Unknown or inactive invite")
    )
)]
pub async fn respond_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<RsvpResponse>> {
    let invite = state.invites.get_active(&token).await?;
    state.invites.validate_access(&invite)?;

    let req: RsvpRequest = parse_json(&body)?;

    let outcome = state
        .invites
        .respond(&invite, &req.status, req.decline_reason.as_deref())
        .await?;
    if !outcome.ok {
        return Err(AppError::BadRequest(outcome.message));
    }

    let updated = outcome.invite.unwrap_or(invite);
    let mut redirect_url = detail_path(&updated.token);
    if updated.status() == InvitationStatus::Accepted {
        let guest = state.invites.guest_of(&updated).await?;
        if guest.profile_incomplete() {
            redirect_url.push_str("?profile_modal=1");
        }
    }

    Ok(Json(RsvpResponse {
        success: true,
        message: outcome.message,
        invitation_status: updated.invitation_status,
        redirect_url,
    }))
}

/// Save the guest's questionnaire answers
#[utoipa::path(
    post,
    path = "/invitations/detail/{token}/complete_profile/",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invite token")),
    request_body = CompleteProfileRequest,
    responses(
        (status = 200, body = CompleteProfileResponse),
        (status = 400, description = "Invalid JSON"),
        (status = 403, description = "Invite inactive or expired"),
        (status = 404, description = "Unknown or inactive invite")
    )
)]
pub async fn complete_profile(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<CompleteProfileResponse>> {
    let invite = state.invites.get_active(&token).await?;
    state.invites.validate_access(&invite)?;

    let profile: CompleteProfileRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CompleteProfileRequest::default()
    } else {
        parse_json(&body)?
    };

    state
        .guests
        .complete_profile(invite.guest_id, profile)
        .await?;

    Ok(Json(CompleteProfileResponse { success: true }))
}

/// QR code of the invitation link as PNG
#[utoipa::path(
    get,
    path = "/invitations/detail/{token}/qr.png",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invite token")),
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 404, description = "Unknown or inactive invite")
    )
)]
pub async fn qr_png(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let invite = state.invites.get_active(&token).await?;
    let png = qr::generate_png(&state.invites.detail_link(&invite.token))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// QR code of the invitation link as inline-ready SVG
#[utoipa::path(
    get,
    path = "/invitations/detail/{token}/qr.svg",
    tag = "Invitations",
    params(("token" = String, Path, description = "Invite token"), QrSvgQuery),
    responses(
        (status = 200, description = "SVG markup", content_type = "image/svg+xml"),
        (status = 400, description = "Invalid fill colour"),
        (status = 404, description = "Unknown or inactive invite")
    )
)]
pub async fn qr_svg(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<QrSvgQuery>,
) -> Result<impl IntoResponse> {
    let invite = state.invites.get_active(&token).await?;
    let fill = query.fill.as_deref().unwrap_or(qr::DEFAULT_FILL);
    let svg = qr::generate_svg(&state.invites.detail_link(&invite.token), fill)?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
