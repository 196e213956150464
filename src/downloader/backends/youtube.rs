use async_trait::async_trait;
use serde_json::json;

use crate::downloader::errors::DownloadError;
use crate::downloader::http::ApiClient;
use crate::downloader::models::{DownloadResult, MediaData};
use crate::downloader::platform::Platform;
use crate::downloader::traits::DownloaderBackend;

use super::passthrough;

/// YouTube splits metadata (fast) from link resolution (slow extraction)
/// across two endpoints.
pub struct YouTubeBackend {
    client: ApiClient,
}

impl YouTubeBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DownloaderBackend for YouTubeBackend {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        log::info!("[YouTube] Sending download request for: {}", url);

        let route = &self.client.config().routes.youtube_download;
        let response = self.client.post_json(route, &json!({ "url": url })).await?;

        passthrough(response, MediaData::Youtube)
    }

    async fn info(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        log::info!("[YouTube] Sending info request for: {}", url);

        let route = &self.client.config().routes.youtube_info;
        let response = self.client.post_json(route, &json!({ "url": url })).await?;

        passthrough(response, MediaData::Youtube)
    }
}
