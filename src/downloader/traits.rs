// Downloader backend trait definition

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::DownloadResult;
use super::platform::Platform;

/// Trait for per-platform backend adapters.
///
/// `Ok` is always a successful result; every failure, including a 2xx body
/// that declares failure, comes back as `Err` and is normalized by the
/// orchestrator.
#[async_trait]
pub trait DownloaderBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Platform this backend serves
    fn platform(&self) -> Platform;

    /// Fetch metadata together with the final download link
    async fn download(&self, url: &str) -> Result<DownloadResult, DownloadError>;

    /// Fast metadata lookup.
    ///
    /// Single-phase backends already return the link with the metadata,
    /// so the default is the full download.
    async fn info(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        self.download(url).await
    }
}
