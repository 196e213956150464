// Common data models for downloader

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;
use super::platform::Platform;

/// Raw URL typed or pasted by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Only validation performed before dispatch
    pub fn is_empty(&self) -> bool {
        self.url.trim().is_empty()
    }
}

/// Normalized response handed to the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Backend code path that produced the result, e.g. "graphql-api"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<MediaData>,
}

impl DownloadResult {
    pub fn succeeded(data: MediaData) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_method(mut self, method: Option<String>) -> Self {
        self.method = method;
        self
    }

    pub fn failed(error: &DownloadError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            retry_after: error.retry_after().map(str::to_string),
            ..Default::default()
        }
    }

    pub fn platform(&self) -> Option<Platform> {
        self.data.as_ref().map(MediaData::platform)
    }

    pub fn download_url(&self) -> Option<&str> {
        self.data.as_ref().and_then(MediaData::download_url)
    }
}

impl From<DownloadError> for DownloadResult {
    fn from(error: DownloadError) -> Self {
        Self::failed(&error)
    }
}

/// Platform payload, tagged by `platform` so consumers switch on the variant
/// instead of probing for field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum MediaData {
    Tiktok(TikTokMedia),
    Youtube(YouTubeMedia),
    Facebook(FacebookMedia),
    Instagram(InstagramMedia),
}

impl MediaData {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Tiktok(_) => Platform::TikTok,
            Self::Youtube(_) => Platform::YouTube,
            Self::Facebook(_) => Platform::Facebook,
            Self::Instagram(_) => Platform::Instagram,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Tiktok(m) => &m.title,
            Self::Youtube(m) => &m.title,
            Self::Facebook(m) => &m.title,
            Self::Instagram(m) => &m.title,
        }
    }

    /// Final binary link, if the backend resolved one
    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::Tiktok(m) => m.download_url.as_deref().or(m.video_url.as_deref()),
            Self::Youtube(m) => m.download_url.as_deref().or(m.direct_url.as_deref()),
            Self::Facebook(m) => m.download_url.as_deref(),
            Self::Instagram(m) => m.download_url.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// TikTok
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokMedia {
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub title: String,
    pub download_url: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
    pub author: Option<TikTokAuthor>,
    pub statistics: Option<TikTokStatistics>,
    pub music: Option<TikTokMusic>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub create_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub hashtags: Vec<String>,
    #[serde(rename = "isADS")]
    pub is_ads: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokAuthor {
    #[serde(default, deserialize_with = "lenient::opt_string_or_number")]
    pub uid: Option<String>,
    pub username: Option<String>,
    pub unique_id: Option<String>,
    pub nickname: Option<String>,
    pub signature: Option<String>,
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub avatar_thumb: Vec<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub avatar_medium: Vec<String>,
    pub avatar: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TikTokStatistics {
    #[serde(default, deserialize_with = "lenient::number")]
    pub play_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub like_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub share_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub comment_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub download_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TikTokMusic {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub title: String,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// YouTube
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeMedia {
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub description: Option<String>,
    /// Seconds
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub upload_date: Option<String>,
    pub category: Option<String>,
    pub author: Option<YouTubeChannel>,
    pub statistics: Option<YouTubeStatistics>,
    pub format: Option<YouTubeFormat>,
    /// Only present once the slow download step has run
    pub download_url: Option<String>,
    pub direct_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub original_url_length: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub short_url_length: Option<u64>,
    pub compression_ratio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeChannel {
    pub name: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub url: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YouTubeStatistics {
    #[serde(default, deserialize_with = "lenient::number")]
    pub views: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeFormat {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub quality: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub container: String,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string_or_number")]
    pub filesize: Option<String>,
}

// ---------------------------------------------------------------------------
// Facebook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookMedia {
    pub id: String,
    pub title: String,
    pub safe_title: String,
    /// `hd` when available, otherwise `sd`
    pub download_url: Option<String>,
    pub hd: Option<String>,
    pub sd: Option<String>,
    #[serde(rename = "downloadUrlHD")]
    pub download_url_hd: Option<String>,
    #[serde(rename = "downloadUrlSD")]
    pub download_url_sd: Option<String>,
    pub qualities: Qualities,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualities {
    #[serde(default)]
    pub hd: bool,
    #[serde(default)]
    pub sd: bool,
}

// ---------------------------------------------------------------------------
// Instagram
// ---------------------------------------------------------------------------

/// Flattened Instagram post: primary fields, the GraphQL node under its
/// native names, and the legacy aliases older render paths read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramMedia {
    pub id: String,
    pub title: String,
    /// "video" or "image"
    #[serde(rename = "type")]
    pub media_type: String,
    pub download_url: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,

    #[serde(flatten)]
    pub node: InstagramNode,

    // Legacy aliases
    pub post_id: Option<String>,
    pub safe_title: Option<String>,
    pub url: Option<String>,
    pub post_url: Option<String>,
    pub create_time: Option<i64>,
}

impl InstagramMedia {
    pub fn is_video(&self) -> bool {
        self.node.is_video.unwrap_or(false)
    }
}

/// GraphQL shortcode media node as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstagramNode {
    /// Node id; kept out of serialized output so it never shadows `id`
    #[serde(rename = "id", default, skip_serializing)]
    pub node_id: Option<String>,
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub shortcode: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub display_url: Option<String>,
    pub has_audio: Option<bool>,
    pub video_url: Option<String>,
    pub video_view_count: Option<u64>,
    pub video_play_count: Option<u64>,
    pub is_video: Option<bool>,
    pub caption: Option<String>,
    pub is_paid_partnership: Option<bool>,
    pub location: Option<serde_json::Value>,
    pub owner: Option<InstagramOwner>,
    pub product_type: Option<String>,
    pub video_duration: Option<f64>,
    pub thumbnail_src: Option<String>,
    pub clips_music_attribution_info: Option<MusicAttribution>,
    pub sidecar: Option<Vec<SidecarItem>>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub taken_at_timestamp: Option<i64>,
    pub accessibility_caption: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramOwner {
    pub id: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub is_verified: Option<bool>,
    pub is_private: Option<bool>,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub post_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicAttribution {
    pub artist_name: Option<String>,
    pub song_name: Option<String>,
    pub uses_original_audio: Option<bool>,
    pub should_mute_audio: Option<bool>,
    pub audio_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarItem {
    #[serde(default)]
    pub is_video: bool,
    pub video_url: Option<String>,
    #[serde(default)]
    pub display_url: String,
    pub thumbnail_src: Option<String>,
}

// ---------------------------------------------------------------------------
// Tolerant field decoding for passed-through payloads
// ---------------------------------------------------------------------------

mod lenient {
    use std::str::FromStr;

    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// `null` reads as the type's default
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Identifier sent either as a string or as a bare number
    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
    }

    /// Number, numeric string or `null`; anything unreadable becomes `None`
    pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + FromStr,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(value @ Value::Number(_)) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Two-step flow and health
// ---------------------------------------------------------------------------

/// Outcome of the info-then-resolve flow.
///
/// For single-request platforms both halves point at the same result.
/// For YouTube `download` stays empty until the slow step is resolved.
#[derive(Debug, Clone)]
pub struct TwoStepResult {
    pub info: Arc<DownloadResult>,
    pub download: Option<Arc<DownloadResult>>,
}

impl TwoStepResult {
    pub fn single(result: DownloadResult) -> Self {
        let shared = Arc::new(result);
        Self {
            info: Arc::clone(&shared),
            download: Some(shared),
        }
    }

    pub fn info_only(info: DownloadResult) -> Self {
        Self {
            info: Arc::new(info),
            download: None,
        }
    }

    /// True while the final link still has to be fetched
    pub fn needs_resolution(&self) -> bool {
        self.info.success && self.download.is_none()
    }

    pub fn resolved(mut self, download: DownloadResult) -> Self {
        self.download = Some(Arc::new(download));
        self
    }
}

/// Reachability of the download backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendHealth {
    #[default]
    Checking,
    Online,
    Offline,
}

impl fmt::Display for BackendHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "checking"),
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_carries_retry_after_only_when_rate_limited() {
        let result = DownloadResult::from(DownloadError::RateLimited {
            message: "slow down".to_string(),
            retry_after: Some("30s".to_string()),
        });
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("slow down"));
        assert_eq!(result.retry_after.as_deref(), Some("30s"));

        let result = DownloadResult::from(DownloadError::Rejected("nope".to_string()));
        assert_eq!(result.retry_after, None);
        assert!(result.data.is_none());
    }

    #[test]
    fn test_result_serializes_with_platform_tag() {
        let result = DownloadResult::succeeded(MediaData::Facebook(FacebookMedia {
            id: "facebook-video".to_string(),
            title: "Facebook Video".to_string(),
            safe_title: "Facebook_Video".to_string(),
            download_url: Some("A".to_string()),
            hd: Some("A".to_string()),
            ..Default::default()
        }));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"]["platform"], json!("facebook"));
        assert_eq!(value["data"]["downloadUrl"], json!("A"));
        assert!(value.get("retryAfter").is_none());
    }

    #[test]
    fn test_instagram_node_id_does_not_shadow_primary_id() {
        let media = InstagramMedia {
            id: "ABC".to_string(),
            title: "t".to_string(),
            media_type: "video".to_string(),
            node: InstagramNode {
                node_id: Some("123456".to_string()),
                shortcode: Some("ABC".to_string()),
                ..Default::default()
            },
            post_id: Some("ABC".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(MediaData::Instagram(media)).unwrap();
        assert_eq!(value["id"], json!("ABC"));
        assert_eq!(value["platform"], json!("instagram"));
        assert_eq!(value["postId"], json!("ABC"));
        assert_eq!(value["shortcode"], json!("ABC"));
    }

    #[test]
    fn test_tiktok_payload_tolerates_nulls_and_numeric_ids() {
        let media: TikTokMedia = serde_json::from_value(json!({
            "id": 7312345678901234567u64,
            "title": null,
            "hashtags": null,
            "downloadUrl": "https://dl/1",
            "createTime": "1700000000",
            "author": { "uid": 42, "avatarThumb": null },
            "statistics": { "playCount": "1234", "likeCount": null },
            "music": { "title": null }
        }))
        .unwrap();

        assert_eq!(media.id, "7312345678901234567");
        assert_eq!(media.title, "");
        assert!(media.hashtags.is_empty());
        assert_eq!(media.create_time, Some(1_700_000_000));
        assert_eq!(media.author.unwrap().uid.as_deref(), Some("42"));
        let stats = media.statistics.unwrap();
        assert_eq!(stats.play_count, Some(1234));
        assert_eq!(stats.like_count, None);
        assert_eq!(media.music.unwrap().title, "");
    }

    #[test]
    fn test_youtube_payload_tolerates_nulls_and_numeric_ids() {
        let media: YouTubeMedia = serde_json::from_value(json!({
            "id": 12345,
            "title": null,
            "duration": "212",
            "statistics": { "views": 10, "likes": null },
            "format": { "quality": null, "container": "mp4", "filesize": 1048576 }
        }))
        .unwrap();

        assert_eq!(media.id, "12345");
        assert_eq!(media.title, "");
        assert_eq!(media.duration, Some(212.0));
        assert_eq!(media.statistics.unwrap().views, Some(10));
        let format = media.format.unwrap();
        assert_eq!(format.quality, "");
        assert_eq!(format.filesize.as_deref(), Some("1048576"));
    }

    #[test]
    fn test_two_step_single_shares_result() {
        let two_step = TwoStepResult::single(DownloadResult::default());
        let download = two_step.download.as_ref().unwrap();
        assert!(Arc::ptr_eq(&two_step.info, download));
        assert!(!two_step.needs_resolution());
    }

    #[test]
    fn test_empty_request_detection() {
        assert!(DownloadRequest::new("").is_empty());
        assert!(DownloadRequest::new("   ").is_empty());
        assert!(!DownloadRequest::new("https://www.tiktok.com/@a/video/1").is_empty());
    }
}
