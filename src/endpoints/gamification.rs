//! Points and badges endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::schemas::{GamificationResponse, LeaderboardEntry};
use crate::services::gamification::LEADERBOARD_SIZE;
use crate::state::AppState;

/// Create the gamification routes
pub fn gamification_routes(state: AppState) -> Router {
    Router::new()
        .route("/leaderboard/", get(leaderboard))
        .route("/achievements/{token}/", get(achievements))
        .with_state(state)
}

/// Top guests by points
#[utoipa::path(
    get,
    path = "/gamification/leaderboard/",
    tag = "Gamification",
    responses(
        (status = 200, body = Vec<LeaderboardEntry>)
    )
)]
pub async fn leaderboard(State(state): State<AppState>) -> Result<Json<Vec<LeaderboardEntry>>> {
    let rows = state.gamification.leaderboard(LEADERBOARD_SIZE).await?;
    Ok(Json(rows.into_iter().map(LeaderboardEntry::from).collect()))
}

/// Ledger of one invite; redirects to the invitation page when there is none yet
#[utoipa::path(
    get,
    path = "/gamification/achievements/{token}/",
    tag = "Gamification",
    params(("token" = String, Path, description = "Invite token")),
    responses(
        (status = 200, body = GamificationResponse),
        (status = 303, description = "No ledger yet, redirect to the invitation page"),
        (status = 404, description = "Unknown invite")
    )
)]
pub async fn achievements(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response> {
    let invite = state.invites.get_by_token(&token).await?;

    match state.gamification.find_by_invite(invite.id).await? {
        Some(ledger) => Ok(Json(GamificationResponse::new(&ledger, &invite.token)).into_response()),
        None => Ok(Redirect::to(&format!("/invitations/detail/{}/", invite.token)).into_response()),
    }
}
