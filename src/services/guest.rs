use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::guest::{self, encode_memories, Gender};
use crate::models::invite;
use crate::models::prelude::*;
use crate::schemas::guest::{CompleteProfileRequest, GuestFields};
use crate::services::clock::SharedClock;
use crate::services::storage::{default_permissions, ResizeTarget, SharedStorage, UploadFile};

/// Bounding box for avatars
pub const AVATAR_SIZE: ResizeTarget = ResizeTarget::new(500, 500);
/// Bounding box for memory photos
pub const MEMORY_SIZE: ResizeTarget = ResizeTarget::new(800, 800);

/// Limits applied to guest-submitted profile answers
pub const PROFILE_TEXT_LIMIT: usize = 200;
pub const FAVORITE_TEXT_LIMIT: usize = 100;

/// Guest records and their media
#[derive(Clone)]
pub struct GuestService {
    db: DbConn,
    storage: SharedStorage,
    clock: SharedClock,
}

impl GuestService {
    pub fn new(db: DbConn, storage: SharedStorage, clock: SharedClock) -> Self {
        Self { db, storage, clock }
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    pub async fn get_by_token(&self, token: &str) -> Result<guest::Model> {
        Guest::find()
            .filter(guest::Column::Token.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<guest::Model> {
        Guest::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<guest::Model>> {
        Ok(Guest::find()
            .order_by_asc(guest::Column::FirstName)
            .order_by_asc(guest::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Create a guest, uploading the avatar and any memory photos first.
    ///
    /// Uploads that return no id are left out; the guest is still created.
    pub async fn create(
        &self,
        fields: GuestFields,
        avatar: UploadFile,
        memories: Vec<UploadFile>,
    ) -> Result<guest::Model> {
        let fields = normalize_fields(fields)?;

        let avatar_id = self.upload_avatar(avatar).await;
        let memory_ids = self.upload_memories(memories).await;

        let guest = guest::ActiveModel {
            token: Set(uuid::Uuid::new_v4().to_string()),
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            nickname: Set(fields.nickname),
            gender: Set(fields.gender.map(|g| g.as_str().to_string())),
            avatar_id: Set(avatar_id),
            emoji: Set(fields.emoji),
            memories: Set(encode_memories(&memory_ids)),
            created_at: Set(self.clock.now()),
            ..Default::default()
        };

        let guest = guest.insert(&self.db).await?;
        tracing::info!("Created guest {} ({})", guest.display_name(), guest.token);
        Ok(guest)
    }

    /// Update a guest's fields; a new avatar replaces the old one and new
    /// memories are appended to the existing list
    pub async fn update(
        &self,
        token: &str,
        fields: GuestFields,
        avatar: Option<UploadFile>,
        memories: Vec<UploadFile>,
    ) -> Result<guest::Model> {
        let fields = normalize_fields(fields)?;
        let guest = self.get_by_token(token).await?;

        let new_avatar = match avatar {
            Some(file) => self.upload_avatar(file).await,
            None => None,
        };
        let mut memory_ids = guest.memory_ids();
        memory_ids.extend(self.upload_memories(memories).await);

        let mut active = guest.into_active_model();
        active.first_name = Set(fields.first_name);
        active.last_name = Set(fields.last_name);
        active.nickname = Set(fields.nickname);
        active.gender = Set(fields.gender.map(|g| g.as_str().to_string()));
        active.emoji = Set(fields.emoji);
        active.memories = Set(encode_memories(&memory_ids));
        if let Some(avatar_id) = new_avatar {
            active.avatar_id = Set(Some(avatar_id));
        }

        Ok(active.update(&self.db).await?)
    }

    /// Delete a guest and, through the foreign key, its invites.
    ///
    /// Returns the tokens of the deleted invites so callers can evict them
    /// from the lookup cache.
    pub async fn delete(&self, token: &str) -> Result<Vec<String>> {
        let guest = self.get_by_token(token).await?;

        let invite_tokens: Vec<String> = Invite::find()
            .filter(invite::Column::GuestId.eq(guest.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| i.token)
            .collect();

        Guest::delete_by_id(guest.id).exec(&self.db).await?;
        tracing::info!(
            "Deleted guest {} with {} invite(s)",
            guest.token,
            invite_tokens.len()
        );
        Ok(invite_tokens)
    }

    /// Apply the post-acceptance questionnaire to a guest.
    ///
    /// Absent fields are left untouched. Free text is trimmed and cut to its
    /// limit. An unrecognised non-empty gender clears the stored value.
    pub async fn complete_profile(
        &self,
        guest_id: i64,
        profile: CompleteProfileRequest,
    ) -> Result<guest::Model> {
        let guest = self.get_by_id(guest_id).await?;
        let mut active = guest.into_active_model();

        if let Some(dietary) = profile.dietary {
            active.dietary_restrictions = Set(Some(truncate(&dietary, PROFILE_TEXT_LIMIT)));
        }
        if let Some(music) = profile.music {
            active.music_suggestion = Set(Some(truncate(&music, PROFILE_TEXT_LIMIT)));
        }
        if let Some(dish) = profile.favorite_dish {
            active.favorite_dish = Set(Some(truncate(&dish, FAVORITE_TEXT_LIMIT)));
        }
        if let Some(drink) = profile.favorite_drink {
            active.favorite_drink = Set(Some(truncate(&drink, FAVORITE_TEXT_LIMIT)));
        }
        if let Some(gender) = profile.gender.as_deref().filter(|g| !g.trim().is_empty()) {
            active.gender = Set(Gender::parse(gender).map(|g| g.as_str().to_string()));
        }

        Ok(active.update(&self.db).await?)
    }

    async fn upload_avatar(&self, file: UploadFile) -> Option<String> {
        let id = self
            .storage
            .upload(file, &default_permissions(), Some(AVATAR_SIZE))
            .await;
        if id.is_none() {
            tracing::warn!("Avatar upload failed, guest saved without avatar");
        }
        id
    }

    async fn upload_memories(&self, files: Vec<UploadFile>) -> Vec<Option<String>> {
        let permissions = default_permissions();
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            let filename = file.filename.clone();
            match self
                .storage
                .upload(file, &permissions, Some(MEMORY_SIZE))
                .await
            {
                Some(id) => ids.push(Some(id)),
                None => tracing::warn!("Skipping memory {} after failed upload", filename),
            }
        }
        ids
    }
}

fn normalize_fields(fields: GuestFields) -> Result<GuestFields> {
    let fields = GuestFields {
        first_name: fields.first_name.trim().to_string(),
        last_name: non_empty(fields.last_name),
        nickname: non_empty(fields.nickname),
        gender: fields.gender,
        emoji: non_empty(fields.emoji),
    };
    fields
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid guest: {}", e)))?;
    Ok(fields)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim and keep at most `limit` characters
pub fn truncate(value: &str, limit: usize) -> String {
    value.trim().chars().take(limit).collect()
}
