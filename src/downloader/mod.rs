// Downloader module - client-side orchestration over the download backend

pub mod backends;
pub mod config;
pub mod errors;
pub mod health;
pub mod http;
pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod traits;
pub mod utils;

pub use config::{ApiConfig, Environment};
pub use errors::DownloadError;
pub use health::{check_backend_health, HealthPoller};
pub use http::ApiClient;
pub use models::{BackendHealth, DownloadRequest, DownloadResult, MediaData, TwoStepResult};
pub use orchestrator::Downloader;
pub use platform::Platform;
pub use traits::DownloaderBackend;
