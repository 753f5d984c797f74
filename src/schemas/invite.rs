use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{guest, invite};
use crate::schemas::gamification::GamificationResponse;
use crate::schemas::guest::GuestProfile;
use crate::services::media::MediaUrls;

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateInviteRequest {
    /// Token of the guest the invite is for
    #[validate(length(min = 1, message = "Guest token is required"))]
    pub guest_token: String,
    pub expiration_date: Option<DateTime<Utc>>,
    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub personalized_message: Option<String>,
    #[validate(url(message = "Invalid video URL"))]
    pub pre_confirmation_video_url: Option<String>,
    #[validate(url(message = "Invalid video URL"))]
    pub thank_you_video_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateInviteRequest {
    pub is_active: Option<bool>,
    pub expiration_date: Option<DateTime<Utc>>,
    /// Remove the expiration date; wins over `expiration_date`
    #[serde(default)]
    pub clear_expiration: bool,
    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub personalized_message: Option<String>,
}

/// Invite as returned by the staff API
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct InviteResponse {
    pub token: String,
    pub guest_token: String,
    pub guest_name: String,
    pub invitation_status: String,
    pub is_active: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub response_date: Option<DateTime<Utc>>,
    pub last_access: Option<DateTime<Utc>>,
    pub interactions_count: i32,
    pub decline_reason: Option<String>,
    pub personalized_message: Option<String>,
    pub pre_confirmation_video_url: Option<String>,
    pub thank_you_video_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub detail_url: String,
}

impl InviteResponse {
    pub fn new(
        invite: invite::Model,
        guest: &guest::Model,
        qr_code_url: Option<String>,
        detail_url: String,
    ) -> Self {
        Self {
            token: invite.token,
            guest_token: guest.token.clone(),
            guest_name: guest.display_name(),
            invitation_status: invite.invitation_status,
            is_active: invite.is_active,
            expiration_date: invite.expiration_date,
            created_at: invite.created_at,
            response_date: invite.response_date,
            last_access: invite.last_access,
            interactions_count: invite.interactions_count,
            decline_reason: invite.decline_reason,
            personalized_message: invite.personalized_message,
            pre_confirmation_video_url: invite.pre_confirmation_video_url,
            thank_you_video_url: invite.thank_you_video_url,
            qr_code_url,
            detail_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct RsvpRequest {
    /// `accepted` or `declined`
    #[serde(alias = "invitation_status")]
    pub status: String,
    pub decline_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RsvpResponse {
    pub success: bool,
    pub message: String,
    pub invitation_status: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DetailQuery {
    pub profile_modal: Option<String>,
}

impl DetailQuery {
    pub fn forces_profile_modal(&self) -> bool {
        matches!(
            self.profile_modal.as_deref().map(str::trim),
            Some("1") | Some("true") | Some("yes")
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrSvgQuery {
    pub fill: Option<String>,
}

/// Everything the invitation page renders
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct InviteDetailResponse {
    pub token: String,
    pub invitation_status: String,
    pub expiration_date: Option<DateTime<Utc>>,
    pub response_date: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    pub personalized_message: Option<String>,
    pub pre_confirmation_video_url: Option<String>,
    pub thank_you_video_url: Option<String>,
    pub guest: GuestProfile,
    pub media: MediaUrls,
    pub show_profile_modal: bool,
    pub qr_code_url: Option<String>,
    pub gamification: Option<GamificationResponse>,
}
