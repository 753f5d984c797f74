use std::env;

/// Default lifetime of an invite lookup cache entry (15 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;

#[derive(Debug, Clone)]
pub struct InvitesConfig {
    /// Absolute origin used to build the links encoded in QR codes
    pub public_base_url: String,
    pub cache_ttl_secs: u64,
    /// Bearer token required by the staff API; staff routes are closed when unset
    pub staff_token: Option<String>,
}

impl InvitesConfig {
    pub fn from_env() -> Self {
        Self {
            public_base_url: env::var("INVITE_PUBLIC_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            cache_ttl_secs: env::var("INVITE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            staff_token: env::var("INVITE_STAFF_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}
