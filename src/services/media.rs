//! Media URL assembly for guest-facing pages

use reqwest::Url;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::guest;
use crate::services::storage::StorageGateway;

/// Query parameters appended to a full URL to request a thumbnail rendition
pub const THUMBNAIL_PARAMS: &str = "width=300&height=300&quality=80";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MediaUrls {
    pub avatar_url: Option<String>,
    pub memory_urls: Vec<String>,
    pub memory_thumbnails: Vec<String>,
}

impl MediaUrls {
    /// Use the avatar as the single memory slide when no memory resolved
    pub fn with_avatar_fallback(mut self) -> Self {
        if self.memory_urls.is_empty() {
            if let Some(avatar) = self.avatar_url.clone() {
                self.memory_thumbnails = vec![thumbnail_url(&avatar)];
                self.memory_urls = vec![avatar];
            }
        }
        self
    }
}

/// Resolve a guest's avatar and memories into URLs.
///
/// Null and empty storage ids are skipped, so the output lists only contain
/// resolvable entries, in stored order.
pub fn media_for(guest: &guest::Model, storage: &dyn StorageGateway) -> MediaUrls {
    let avatar_url = guest
        .avatar_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .and_then(|id| storage.file_url(id));

    let memory_urls: Vec<String> = guest
        .memory_ids()
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .filter_map(|id| storage.file_url(&id))
        .collect();

    let memory_thumbnails = memory_urls.iter().map(|url| thumbnail_url(url)).collect();

    MediaUrls {
        avatar_url,
        memory_urls,
        memory_thumbnails,
    }
}

/// Display hint only; the backend may ignore the parameters
pub fn thumbnail_url(full_url: &str) -> String {
    let separator = if full_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", full_url, separator, THUMBNAIL_PARAMS)
}

/// Convert YouTube and Vimeo page links into their embeddable player URLs.
/// Anything else is returned unchanged.
pub fn video_embed_url(url: &str) -> String {
    let trimmed = url.trim();
    let Ok(parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    let host = parsed
        .host_str()
        .unwrap_or_default()
        .trim_start_matches("www.")
        .trim_start_matches("m.");
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let youtube_id = match host {
        "youtu.be" => segments.first().map(|s| s.to_string()),
        "youtube.com" => match segments.as_slice() {
            ["watch"] => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            ["shorts", id, ..] | ["embed", id, ..] | ["live", id, ..] => Some(id.to_string()),
            _ => None,
        },
        _ => None,
    };
    if let Some(id) = youtube_id.filter(|id| !id.is_empty()) {
        return format!(
            "https://www.youtube.com/embed/{}?rel=0&modestbranding=1",
            id
        );
    }

    if host == "vimeo.com" || host == "player.vimeo.com" {
        if let Some(id) = segments
            .iter()
            .rev()
            .find(|seg| seg.chars().all(|c| c.is_ascii_digit()))
        {
            return format!("https://player.vimeo.com/video/{}", id);
        }
    }

    trimmed.to_string()
}
