// Downloader backends, one per platform

pub mod facebook;
pub mod instagram;
pub mod tiktok;
pub mod youtube;

pub use facebook::FacebookBackend;
pub use instagram::InstagramBackend;
pub use tiktok::TikTokBackend;
pub use youtube::YouTubeBackend;

use serde::de::DeserializeOwned;

use crate::downloader::errors::{DownloadError, GENERIC_FAILURE};
use crate::downloader::http::{ApiResponse, Envelope};
use crate::downloader::models::{DownloadResult, MediaData};

/// Map a backend response whose success envelope is returned as-is.
///
/// Used by backends that already speak the shared result shape; only the
/// payload is decoded into its platform variant.
pub(crate) fn passthrough<T, F>(response: ApiResponse, wrap: F) -> Result<DownloadResult, DownloadError>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> MediaData,
{
    if let Some(err) = response.status_error() {
        return Err(err);
    }

    let envelope: Envelope<T> = response.decode()?;
    if !envelope.success {
        return Err(DownloadError::Rejected(
            envelope
                .error_text()
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        ));
    }

    Ok(DownloadResult {
        success: true,
        message: envelope.message,
        method: envelope.method,
        data: envelope.data.map(wrap),
        ..Default::default()
    })
}

/// JS-style "truthy" string: present and non-empty
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
