use std::path::PathBuf;

use sea_orm::DatabaseConnection;

use crate::services::cache::InviteCache;
use crate::services::clock::SharedClock;
use crate::services::gamification::GamificationService;
use crate::services::guest::GuestService;
use crate::services::invite::InviteService;
use crate::services::storage::SharedStorage;

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub invites: InviteService,
    pub guests: GuestService,
    pub gamification: GamificationService,
    pub storage: SharedStorage,
    /// Bearer token accepted by the staff API; `None` closes it
    pub staff_token: Option<String>,
    /// Directory served under `/media` when media is stored locally
    pub media_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        db: DbConn,
        storage: SharedStorage,
        clock: SharedClock,
        cache: InviteCache,
        public_base_url: &str,
        staff_token: Option<String>,
    ) -> Self {
        let gamification = GamificationService::new(db.clone(), clock.clone());
        let guests = GuestService::new(db.clone(), storage.clone(), clock.clone());
        let invites = InviteService::new(
            db.clone(),
            cache,
            clock,
            storage.clone(),
            gamification.clone(),
            public_base_url,
        );

        Self {
            db,
            invites,
            guests,
            gamification,
            storage,
            staff_token,
            media_dir: None,
        }
    }

    pub fn with_media_dir(mut self, media_dir: PathBuf) -> Self {
        self.media_dir = Some(media_dir);
        self
    }
}
