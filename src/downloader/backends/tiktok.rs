use async_trait::async_trait;
use serde_json::{json, Value};

use crate::downloader::errors::DownloadError;
use crate::downloader::http::ApiClient;
use crate::downloader::models::{DownloadResult, MediaData};
use crate::downloader::platform::Platform;
use crate::downloader::traits::DownloaderBackend;

use super::passthrough;

pub struct TikTokBackend {
    client: ApiClient,
}

impl TikTokBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// API usage statistics; `None` on any failure
    pub async fn stats(&self) -> Option<Value> {
        let route = &self.client.config().routes.tiktok_stats;
        match self.client.get(route, &[]).await {
            Ok(response) if response.is_success() => {
                log::debug!("[TikTok] API stats: {:?}", response.body);
                response.body
            }
            Ok(response) => {
                log::warn!("[TikTok] Failed to fetch API stats: {}", response.status);
                None
            }
            Err(e) => {
                log::warn!("[TikTok] API stats fetch failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl DownloaderBackend for TikTokBackend {
    fn name(&self) -> &'static str {
        "tiktok"
    }

    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        log::info!("[TikTok] Sending download request for: {}", url);

        let route = &self.client.config().routes.tiktok_download;
        let response = self.client.post_json(route, &json!({ "url": url })).await?;

        passthrough(response, MediaData::Tiktok)
    }
}
