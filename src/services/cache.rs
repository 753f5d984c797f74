use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::models::invite;
use crate::services::clock::SharedClock;

/// Cached invite with its absolute expiry
#[derive(Clone)]
struct CachedInvite {
    invite: invite::Model,
    expires_at: DateTime<Utc>,
}

/// Process-wide cache of active invites keyed by public token.
///
/// Entries expire a fixed TTL after insertion; refreshing an entry's telemetry
/// does not extend its lifetime. A disabled cache stores nothing.
#[derive(Clone)]
pub struct InviteCache {
    entries: Arc<RwLock<HashMap<String, CachedInvite>>>,
    ttl: Duration,
    clock: SharedClock,
    enabled: bool,
}

impl InviteCache {
    pub fn new(ttl_seconds: u64, clock: SharedClock) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_seconds.min(i64::MAX as u64) as i64),
            clock,
            enabled: ttl_seconds > 0,
        }
    }

    /// Cache that never holds an entry
    pub fn disabled(clock: SharedClock) -> Self {
        Self::new(0, clock)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get a cached invite if present and not expired
    pub fn get(&self, token: &str) -> Option<invite::Model> {
        if !self.enabled {
            return None;
        }
        let now = self.clock.now();
        let cache = self.entries.read();
        cache
            .get(token)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.invite.clone())
    }

    /// Cache an invite under its token, replacing any previous entry
    pub fn insert(&self, invite: invite::Model) {
        if !self.enabled {
            return;
        }
        let now = self.clock.now();
        let mut cache = self.entries.write();
        cache.retain(|_, entry| entry.expires_at > now);
        cache.insert(
            invite.token.clone(),
            CachedInvite {
                invite,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Replace the cached copy of an invite, keeping its original expiry
    pub fn refresh(&self, invite: &invite::Model) {
        let mut cache = self.entries.write();
        if let Some(entry) = cache.get_mut(&invite.token) {
            entry.invite = invite.clone();
        }
    }

    /// Drop the entry for a token (e.g., after its state changed)
    pub fn invalidate(&self, token: &str) {
        let mut cache = self.entries.write();
        cache.remove(token);
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::Clock;
    use chrono::TimeZone;

    struct FrozenClock(RwLock<DateTime<Utc>>);

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.read()
        }
    }

    fn sample_invite(token: &str) -> invite::Model {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        invite::Model {
            id: 1,
            guest_id: 1,
            token: token.to_string(),
            expiration_date: None,
            is_active: true,
            created_at: created,
            qr_code_id: None,
            invitation_status: "pending".to_string(),
            response_date: None,
            last_access: None,
            interactions_count: 0,
            personalized_message: None,
            pre_confirmation_video_url: None,
            thank_you_video_url: None,
            decline_reason: None,
        }
    }

    fn frozen_at(start: DateTime<Utc>) -> Arc<FrozenClock> {
        Arc::new(FrozenClock(RwLock::new(start)))
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let clock = frozen_at(start);
        let cache = InviteCache::new(900, clock.clone());

        cache.insert(sample_invite("t1"));
        assert!(cache.get("t1").is_some());

        *clock.0.write() = start + Duration::seconds(899);
        assert!(cache.get("t1").is_some());

        *clock.0.write() = start + Duration::seconds(900);
        assert!(cache.get("t1").is_none());
    }

    #[test]
    fn test_refresh_keeps_expiry() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let clock = frozen_at(start);
        let cache = InviteCache::new(60, clock.clone());

        cache.insert(sample_invite("t1"));
        *clock.0.write() = start + Duration::seconds(30);

        let mut updated = sample_invite("t1");
        updated.interactions_count = 5;
        cache.refresh(&updated);
        assert_eq!(cache.get("t1").unwrap().interactions_count, 5);

        *clock.0.write() = start + Duration::seconds(61);
        assert!(cache.get("t1").is_none());
    }

    #[test]
    fn test_refresh_does_not_insert() {
        let clock = frozen_at(Utc::now());
        let cache = InviteCache::new(60, clock);
        cache.refresh(&sample_invite("t1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let clock = frozen_at(Utc::now());
        let cache = InviteCache::new(60, clock);
        cache.insert(sample_invite("t1"));
        cache.insert(sample_invite("t2"));
        cache.invalidate("t1");

        assert!(cache.get("t1").is_none());
        assert!(cache.get("t2").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let clock = frozen_at(Utc::now());
        let cache = InviteCache::disabled(clock);
        cache.insert(sample_invite("t1"));

        assert!(!cache.is_enabled());
        assert!(cache.get("t1").is_none());
        assert!(cache.is_empty());
    }
}
