pub mod access;
pub mod cache;
pub mod clock;
pub mod gamification;
pub mod guest;
pub mod invite;
pub mod media;
pub mod qr;
pub mod storage;

pub use access::{validate_access, AccessDenial};
pub use cache::InviteCache;
pub use clock::{system_clock, Clock, SharedClock, SystemClock};
pub use gamification::GamificationService;
pub use guest::GuestService;
pub use invite::{InviteService, RsvpOutcome};
pub use storage::{SharedStorage, StorageGateway};
