use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::downloader::errors::DownloadError;
use crate::downloader::http::{ApiClient, Envelope};
use crate::downloader::models::{DownloadResult, FacebookMedia, MediaData, Qualities};
use crate::downloader::platform::Platform;
use crate::downloader::traits::DownloaderBackend;

use super::present;

pub const FACEBOOK_UNAVAILABLE: &str = "Facebook video service temporarily unavailable. \
     The API service is currently down. Please try again later.";

const FACEBOOK_FAILED: &str = "Facebook video download failed";

/// Native Facebook payload with its `{hd, sd}` quality pair
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacebookPayload {
    url: Option<String>,
    title: Option<String>,
    safe_title: Option<String>,
    hd: Option<String>,
    sd: Option<String>,
    download_url: Option<String>,
    #[serde(rename = "downloadUrlHD")]
    download_url_hd: Option<String>,
    #[serde(rename = "downloadUrlSD")]
    download_url_sd: Option<String>,
    qualities: Option<Qualities>,
}

impl FacebookPayload {
    /// Fold the quality pair into `downloadUrl`, preferring HD
    fn into_media(self) -> FacebookMedia {
        let hd = present(self.hd);
        let sd = present(self.sd);

        let qualities = self.qualities.unwrap_or(Qualities {
            hd: hd.is_some(),
            sd: sd.is_some(),
        });

        FacebookMedia {
            id: present(self.url).unwrap_or_else(|| "facebook-video".to_string()),
            title: present(self.title).unwrap_or_else(|| "Facebook Video".to_string()),
            safe_title: present(self.safe_title).unwrap_or_else(|| "Facebook_Video".to_string()),
            download_url: hd
                .clone()
                .or_else(|| sd.clone())
                .or_else(|| present(self.download_url)),
            download_url_hd: present(self.download_url_hd).or_else(|| hd.clone()),
            download_url_sd: present(self.download_url_sd).or_else(|| sd.clone()),
            hd,
            sd,
            qualities,
        }
    }
}

pub struct FacebookBackend {
    client: ApiClient,
}

impl FacebookBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DownloaderBackend for FacebookBackend {
    fn name(&self) -> &'static str {
        "facebook"
    }

    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        log::info!("[Facebook] Sending download request for: {}", url);

        let route = &self.client.config().routes.facebook_download;
        let response = self.client.post_json(route, &json!({ "url": url })).await?;

        // Known upstream instability; the body is not trusted here
        if response.status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(DownloadError::ServiceUnavailable(FACEBOOK_UNAVAILABLE.to_string()));
        }
        if let Some(err) = response.status_error() {
            return Err(err);
        }

        let envelope: Envelope<FacebookPayload> = response.decode()?;
        let error = envelope.error_text();
        match envelope.data {
            Some(payload) if envelope.success => {
                Ok(DownloadResult::succeeded(MediaData::Facebook(payload.into_media()))
                    .with_message(envelope.message))
            }
            _ => Err(DownloadError::Rejected(
                error.unwrap_or_else(|| FACEBOOK_FAILED.to_string()),
            )),
        }
    }
}
