use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::guest::{self, Gender};
use crate::services::media::MediaUrls;

/// Staff-editable guest fields, collected from the multipart form
#[derive(Debug, Clone, Default, Validate)]
pub struct GuestFields {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 50, message = "Nickname must be at most 50 characters"))]
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    #[validate(length(max = 10, message = "Emoji must be at most 10 characters"))]
    pub emoji: Option<String>,
}

/// Guest-submitted answers to the post-acceptance questionnaire
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct CompleteProfileRequest {
    pub dietary: Option<String>,
    pub music: Option<String>,
    /// `male`/`m` or `female`/`f`; any other non-empty value clears the gender
    pub gender: Option<String>,
    pub favorite_dish: Option<String>,
    pub favorite_drink: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CompleteProfileResponse {
    pub success: bool,
}

/// Guest as shown on the invitation page
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct GuestProfile {
    pub first_name: String,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub display_name: String,
    pub gender: Option<String>,
    pub emoji: Option<String>,
    pub favorite_dish: Option<String>,
    pub favorite_drink: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub music_suggestion: Option<String>,
}

impl From<&guest::Model> for GuestProfile {
    fn from(guest: &guest::Model) -> Self {
        Self {
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            nickname: guest.nickname.clone(),
            display_name: guest.display_name(),
            gender: guest.gender.clone(),
            emoji: guest.emoji.clone(),
            favorite_dish: guest.favorite_dish.clone(),
            favorite_drink: guest.favorite_drink.clone(),
            dietary_restrictions: guest.dietary_restrictions.clone(),
            music_suggestion: guest.music_suggestion.clone(),
        }
    }
}

/// Guest as returned by the staff API
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct GuestResponse {
    pub token: String,
    #[serde(flatten)]
    pub profile: GuestProfile,
    pub avatar_id: Option<String>,
    pub memory_ids: Vec<String>,
    pub media: MediaUrls,
    pub created_at: DateTime<Utc>,
}

impl GuestResponse {
    pub fn from_guest(guest: &guest::Model, media: MediaUrls) -> Self {
        Self {
            token: guest.token.clone(),
            profile: GuestProfile::from(guest),
            avatar_id: guest.avatar_id.clone(),
            memory_ids: guest
                .memory_ids()
                .into_iter()
                .flatten()
                .filter(|id| !id.is_empty())
                .collect(),
            media,
            created_at: guest.created_at,
        }
    }
}
