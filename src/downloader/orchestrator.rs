// Orchestrator: platform dispatch and result normalization

use serde_json::Value;

use super::backends::{FacebookBackend, InstagramBackend, TikTokBackend, YouTubeBackend};
use super::errors::DownloadError;
use super::http::ApiClient;
use super::models::{DownloadResult, TwoStepResult};
use super::platform::Platform;
use super::traits::DownloaderBackend;

pub struct Downloader {
    client: ApiClient,
    backends: Vec<Box<dyn DownloaderBackend>>,
}

impl Downloader {
    /// Orchestrator with the four standard backends registered
    pub fn new(client: ApiClient) -> Self {
        let mut downloader = Self::empty(client.clone());
        downloader.add_backend(Box::new(TikTokBackend::new(client.clone())));
        downloader.add_backend(Box::new(YouTubeBackend::new(client.clone())));
        downloader.add_backend(Box::new(FacebookBackend::new(client.clone())));
        downloader.add_backend(Box::new(InstagramBackend::new(client)));
        downloader
    }

    pub fn empty(client: ApiClient) -> Self {
        Self {
            client,
            backends: Vec::new(),
        }
    }

    /// Register a backend, replacing any earlier one for the same platform
    pub fn add_backend(&mut self, backend: Box<dyn DownloaderBackend>) {
        let platform = backend.platform();
        self.backends.retain(|b| b.platform() != platform);
        self.backends.push(backend);
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn backend_for(&self, url: &str) -> Result<&dyn DownloaderBackend, DownloadError> {
        if url.trim().is_empty() {
            return Err(DownloadError::EmptyUrl);
        }

        let platform = match Platform::from_url(url) {
            Some(platform) => platform,
            None => {
                log::warn!(
                    "[Downloader] No platform marker in {}, falling back to {}",
                    url,
                    Platform::TikTok
                );
                Platform::TikTok
            }
        };

        self.backends
            .iter()
            .find(|b| b.platform() == platform)
            .map(|b| b.as_ref())
            .ok_or_else(|| {
                DownloadError::Config(format!("No backend registered for {}", platform))
            })
    }

    /// Detect the platform and fetch metadata plus the final link.
    pub async fn download(&self, url: &str) -> DownloadResult {
        let outcome = match self.backend_for(url) {
            Ok(backend) => {
                log::info!("[Downloader] Dispatching to {}", backend.name());
                backend.download(url).await
            }
            Err(e) => Err(e),
        };
        finish("download", outcome)
    }

    /// Info first, link later.
    ///
    /// Two-phase platforms (YouTube) only run the fast info request here and
    /// leave `download` empty for [`Downloader::resolve_download`]. Every
    /// other platform performs exactly one request and shares the result
    /// between both halves.
    pub async fn download_two_step(&self, url: &str) -> TwoStepResult {
        let backend = match self.backend_for(url) {
            Ok(backend) => backend,
            Err(e) => return TwoStepResult::info_only(finish("two-step", Err(e))),
        };

        if backend.platform().has_two_phase_backend() {
            log::info!("[Downloader] Two-step: info request via {}", backend.name());
            let info = finish("info", backend.info(url).await);
            TwoStepResult::info_only(info)
        } else {
            log::info!("[Downloader] Two-step: single request via {}", backend.name());
            TwoStepResult::single(finish("download", backend.download(url).await))
        }
    }

    /// Second, slow step of the two-step flow.
    pub async fn resolve_download(&self, url: &str) -> DownloadResult {
        self.download(url).await
    }

    /// Complete a pending two-step result; already resolved results are
    /// returned untouched.
    pub async fn complete_two_step(&self, url: &str, pending: TwoStepResult) -> TwoStepResult {
        if !pending.needs_resolution() {
            return pending;
        }
        let download = self.resolve_download(url).await;
        pending.resolved(download)
    }

    /// Instagram link lookup through the simple endpoint
    pub async fn instagram_video_url(&self, url: &str) -> DownloadResult {
        if url.trim().is_empty() {
            return finish("instagram-video", Err(DownloadError::EmptyUrl));
        }
        let backend = InstagramBackend::new(self.client.clone());
        finish("instagram-video", backend.video_url(url).await)
    }

    /// Backend usage statistics
    pub async fn api_stats(&self) -> Option<Value> {
        TikTokBackend::new(self.client.clone()).stats().await
    }
}

/// Normalize a backend outcome into the UI result shape
fn finish(step: &str, outcome: Result<DownloadResult, DownloadError>) -> DownloadResult {
    match outcome {
        Ok(result) => {
            log::info!("[Downloader] ✓ {} succeeded", step);
            result
        }
        Err(e) => {
            log::warn!("[Downloader] ✗ {} failed: {}", step, e);
            DownloadResult::from(e)
        }
    }
}
