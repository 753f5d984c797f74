//! Invitation lifecycle: cached lookup, access telemetry, access policy, RSVP

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::invite::{self, InvitationStatus};
use crate::models::prelude::*;
use crate::models::guest;
use crate::schemas::invite::{CreateInviteRequest, UpdateInviteRequest};
use crate::services::access::{self, AccessDenial};
use crate::services::cache::InviteCache;
use crate::services::clock::SharedClock;
use crate::services::gamification::GamificationService;
use crate::services::qr;
use crate::services::storage::{default_permissions, SharedStorage, UploadFile};

pub const ACCEPTED_MESSAGE: &str = "Thank you for confirming your attendance!";
pub const DECLINED_MESSAGE: &str = "Thank you for letting us know.";
pub const INVALID_STATUS_MESSAGE: &str = "Invalid status";
pub const ALREADY_DECLINED_MESSAGE: &str = "This invitation has already been declined";

/// Result of an RSVP attempt.
///
/// Business-rule rejections come back as `ok == false` with a message;
/// only infrastructure faults are returned as errors.
#[derive(Debug, Clone)]
pub struct RsvpOutcome {
    pub ok: bool,
    pub message: String,
    pub invite: Option<invite::Model>,
}

impl RsvpOutcome {
    fn rejected(message: &str) -> Self {
        Self {
            ok: false,
            message: message.to_string(),
            invite: None,
        }
    }
}

#[derive(Clone)]
pub struct InviteService {
    db: DbConn,
    cache: InviteCache,
    clock: SharedClock,
    storage: SharedStorage,
    gamification: GamificationService,
    public_base_url: String,
}

impl InviteService {
    pub fn new(
        db: DbConn,
        cache: InviteCache,
        clock: SharedClock,
        storage: SharedStorage,
        gamification: GamificationService,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            cache,
            clock,
            storage,
            gamification,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn cache(&self) -> &InviteCache {
        &self.cache
    }

    /// Look up an active invite through the cache and record the view.
    ///
    /// A miss loads the invite from the database (active only) and caches it.
    /// Every call, hit or miss, bumps the access telemetry once.
    pub async fn get_with_cache(
        &self,
        token: &str,
        client_ip: Option<&str>,
    ) -> Result<invite::Model> {
        let invite = match self.cache.get(token) {
            Some(invite) => invite,
            None => {
                let invite = self.get_active(token).await?;
                self.cache.insert(invite.clone());
                invite
            }
        };

        Ok(self.register_access(invite, client_ip).await)
    }

    pub async fn find_active(&self, token: &str) -> Result<Option<invite::Model>> {
        Ok(Invite::find()
            .filter(invite::Column::Token.eq(token))
            .filter(invite::Column::IsActive.eq(true))
            .one(&self.db)
            .await?)
    }

    /// Active invite by token, bypassing the cache
    pub async fn get_active(&self, token: &str) -> Result<invite::Model> {
        self.find_active(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invite not found".to_string()))
    }

    /// Invite by token whatever its state
    pub async fn get_by_token(&self, token: &str) -> Result<invite::Model> {
        Invite::find()
            .filter(invite::Column::Token.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Invite not found".to_string()))
    }

    /// Stamp `last_access` and increment `interactions_count`.
    ///
    /// Failures are logged and the invite is returned as it was.
    pub async fn register_access(
        &self,
        invite: invite::Model,
        client_ip: Option<&str>,
    ) -> invite::Model {
        let now = self.clock.now();
        let result = Invite::update_many()
            .col_expr(
                invite::Column::InteractionsCount,
                Expr::col(invite::Column::InteractionsCount).add(1),
            )
            .col_expr(invite::Column::LastAccess, Expr::value(now))
            .filter(invite::Column::Id.eq(invite.id))
            .exec(&self.db)
            .await;

        match result {
            Ok(res) if res.rows_affected > 0 => {
                tracing::debug!(
                    "Invite {} viewed from {}",
                    invite.token,
                    client_ip.unwrap_or("unknown")
                );
                let updated = invite::Model {
                    last_access: Some(now),
                    interactions_count: invite.interactions_count + 1,
                    ..invite
                };
                self.cache.refresh(&updated);
                updated
            }
            Ok(_) => {
                tracing::warn!("Invite {} vanished before access was recorded", invite.token);
                invite
            }
            Err(e) => {
                tracing::warn!("Failed to record access for invite {}: {}", invite.token, e);
                invite
            }
        }
    }

    pub fn validate_access(&self, invite: &invite::Model) -> std::result::Result<(), AccessDenial> {
        access::validate_access(invite, self.clock.now())
    }

    /// Apply a guest's accept/decline answer.
    ///
    /// Acceptance creates the gamification ledger on first use and grants the
    /// starter reward exactly once. The lookup cache entry is dropped after
    /// the status is saved.
    pub async fn respond(
        &self,
        invite: &invite::Model,
        status: &str,
        decline_reason: Option<&str>,
    ) -> Result<RsvpOutcome> {
        let status = match InvitationStatus::parse(status.trim()) {
            Some(status @ (InvitationStatus::Accepted | InvitationStatus::Declined)) => status,
            _ => return Ok(RsvpOutcome::rejected(INVALID_STATUS_MESSAGE)),
        };

        if invite.status() == InvitationStatus::Declined {
            return Ok(RsvpOutcome::rejected(ALREADY_DECLINED_MESSAGE));
        }

        let mut active = invite.clone().into_active_model();
        active.invitation_status = Set(status.as_str().to_string());
        active.response_date = Set(Some(self.clock.now()));
        if status == InvitationStatus::Declined {
            if let Some(reason) = decline_reason.map(str::trim).filter(|r| !r.is_empty()) {
                active.decline_reason = Set(Some(reason.to_string()));
            }
        }

        let updated = active.update(&self.db).await.map_err(|e| {
            tracing::error!("Failed to save RSVP for invite {}: {}", invite.token, e);
            AppError::from(e)
        })?;
        self.cache.invalidate(&updated.token);

        let message = match status {
            InvitationStatus::Accepted => {
                self.gamification.award_first_acceptance(updated.id).await?;
                ACCEPTED_MESSAGE
            }
            _ => DECLINED_MESSAGE,
        };

        tracing::info!("Invite {} answered {}", updated.token, status);
        Ok(RsvpOutcome {
            ok: true,
            message: message.to_string(),
            invite: Some(updated),
        })
    }

    /// Public link of an invite's detail page, as encoded in its QR code
    pub fn detail_link(&self, token: &str) -> String {
        format!("{}/invitations/detail/{}/", self.public_base_url, token)
    }

    pub fn qr_code_url(&self, invite: &invite::Model) -> Option<String> {
        invite
            .qr_code_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| self.storage.file_url(id))
    }

    /// Create an invite for a guest and upload its QR code.
    ///
    /// A failed QR upload leaves `qr_code_id` empty; the invite is kept.
    pub async fn create(&self, request: CreateInviteRequest) -> Result<(invite::Model, guest::Model)> {
        request
            .validate()
            .map_err(|e| AppError::BadRequest(format!("Invalid invite: {}", e)))?;

        let guest = Guest::find()
            .filter(guest::Column::Token.eq(request.guest_token.trim()))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))?;

        let token = uuid::Uuid::new_v4().to_string();
        let png = qr::generate_png(&self.detail_link(&token))?;
        let qr_code_id = self
            .storage
            .upload(
                UploadFile::new(format!("qrcode_{}.png", token), png).with_content_type("image/png"),
                &default_permissions(),
                None,
            )
            .await;
        if qr_code_id.is_none() {
            tracing::warn!("QR code upload failed for invite {}", token);
        }

        let invite = invite::ActiveModel {
            guest_id: Set(guest.id),
            token: Set(token),
            expiration_date: Set(request.expiration_date),
            is_active: Set(true),
            created_at: Set(self.clock.now()),
            qr_code_id: Set(qr_code_id),
            invitation_status: Set(InvitationStatus::Pending.as_str().to_string()),
            interactions_count: Set(0),
            personalized_message: Set(non_empty(request.personalized_message)),
            pre_confirmation_video_url: Set(non_empty(request.pre_confirmation_video_url)),
            thank_you_video_url: Set(non_empty(request.thank_you_video_url)),
            ..Default::default()
        };

        let invite = invite.insert(&self.db).await?;
        tracing::info!("Created invite {} for guest {}", invite.token, guest.token);
        Ok((invite, guest))
    }

    /// Invites with their guests, newest first
    pub async fn list(&self) -> Result<Vec<(invite::Model, guest::Model)>> {
        let rows = Invite::find()
            .find_also_related(Guest)
            .order_by_desc(invite::Column::CreatedAt)
            .order_by_desc(invite::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(invite, guest)| guest.map(|g| (invite, g)))
            .collect())
    }

    pub async fn guest_of(&self, invite: &invite::Model) -> Result<guest::Model> {
        Guest::find_by_id(invite.guest_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))
    }

    pub async fn update(&self, token: &str, request: UpdateInviteRequest) -> Result<invite::Model> {
        request
            .validate()
            .map_err(|e| AppError::BadRequest(format!("Invalid invite: {}", e)))?;

        let invite = self.get_by_token(token).await?;
        let mut active = invite.into_active_model();

        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if request.clear_expiration {
            active.expiration_date = Set(None);
        } else if let Some(expiration) = request.expiration_date {
            active.expiration_date = Set(Some(expiration));
        }
        if let Some(message) = request.personalized_message {
            active.personalized_message = Set(non_empty(Some(message)));
        }

        let updated = active.update(&self.db).await?;
        self.cache.invalidate(&updated.token);
        Ok(updated)
    }

    pub async fn delete(&self, token: &str) -> Result<()> {
        let invite = self.get_by_token(token).await?;
        Invite::delete_by_id(invite.id).exec(&self.db).await?;
        self.cache.invalidate(token);
        tracing::info!("Deleted invite {}", token);
        Ok(())
    }

    /// Evict cached entries, e.g. after their guest was deleted
    pub fn invalidate<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) {
        for token in tokens {
            self.cache.invalidate(token);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
