// Backend endpoint configuration
//
// Layering, lowest to highest:
// built-in defaults -> JSON config file -> environment -> CLI flags

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;

pub const PRODUCTION_BASE_URL: &str = "https://tiktokreels-backend.vercel.app";
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";

pub const ENV_ENVIRONMENT: &str = "SOCIAL_DL_ENV";
pub const ENV_API_URL: &str = "SOCIAL_DL_API_URL";
pub const ENV_PROXY: &str = "SOCIAL_DL_PROXY";

/// Build environment that selects the default base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
}

impl Default for Environment {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_BASE_URL,
            Self::Development => DEVELOPMENT_BASE_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "local" => Ok(Self::Development),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Endpoint paths relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRoutes {
    pub tiktok_download: String,
    pub tiktok_stats: String,
    pub youtube_info: String,
    pub youtube_download: String,
    pub facebook_download: String,
    pub instagram_media: String,
    pub instagram_video: String,
    /// `/health`, or `/api/health` on the older backend revision
    pub health: String,
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self {
            tiktok_download: "/api/v1/tiktok/download".to_string(),
            tiktok_stats: "/api/v1/tiktok/stats".to_string(),
            youtube_info: "/api/v1/youtube/info".to_string(),
            youtube_download: "/api/v1/youtube/download".to_string(),
            facebook_download: "/api/v1/facebook/download".to_string(),
            instagram_media: "/api/v1/instagram/media".to_string(),
            instagram_video: "/api/v1/instagram/video".to_string(),
            health: "/health".to_string(),
        }
    }
}

/// Configuration for the download backend client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub environment: Environment,
    /// Overrides the environment's base URL
    pub base_url: Option<String>,
    pub routes: ApiRoutes,
    /// Bound on a single health probe
    pub health_timeout_ms: u64,
    /// Delay between health probes
    pub health_interval_ms: u64,
    /// Bound on platform calls; `None` leaves it to the backend
    pub request_timeout_ms: Option<u64>,
    /// HTTP or SOCKS5 proxy URL (e.g., "socks5h://127.0.0.1:1080")
    pub proxy: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            routes: ApiRoutes::default(),
            health_timeout_ms: 5_000,
            health_interval_ms: 30_000,
            request_timeout_ms: None,
            proxy: None,
        }
    }
}

impl ApiConfig {
    /// `<config_dir>/social-downloader/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("social-downloader").join("config.json"))
    }

    /// Load from an explicit file, or from the default location when present.
    pub fn load(path: Option<&Path>) -> Result<Self, DownloadError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, DownloadError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DownloadError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            DownloadError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        log::debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Apply `SOCIAL_DL_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, DownloadError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, DownloadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = env.parse().map_err(DownloadError::Config)?;
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(proxy) = lookup(ENV_PROXY).filter(|p| !p.trim().is_empty()) {
            self.proxy = Some(proxy);
        }
        Ok(self)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.base_url = base_url;
        }
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        if proxy.is_some() {
            self.proxy = proxy;
        }
        self
    }

    pub fn with_health_route(mut self, route: impl Into<String>) -> Self {
        self.routes.health = route.into();
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_health_interval(mut self, interval: Duration) -> Self {
        self.health_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    /// Effective base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url(), route)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_match_backend_contract() {
        let config = ApiConfig::default().with_environment(Environment::Production);
        assert_eq!(config.base_url(), PRODUCTION_BASE_URL);
        assert_eq!(
            config.endpoint(&config.routes.tiktok_download),
            "https://tiktokreels-backend.vercel.app/api/v1/tiktok/download"
        );
        assert_eq!(config.health_timeout(), Duration::from_secs(5));
        assert_eq!(config.health_interval(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_explicit_base_url_wins_and_is_trimmed() {
        let config = ApiConfig::default().with_base_url(Some("http://127.0.0.1:9000/".to_string()));
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
        assert_eq!(config.endpoint("/health"), "http://127.0.0.1:9000/health");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_ENVIRONMENT, "development"),
            (ENV_PROXY, "socks5h://127.0.0.1:1080"),
        ]
        .into_iter()
        .collect();

        let config = ApiConfig::default()
            .with_environment(Environment::Production)
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.base_url(), DEVELOPMENT_BASE_URL);
        assert_eq!(config.proxy.as_deref(), Some("socks5h://127.0.0.1:1080"));
    }

    #[test]
    fn test_invalid_env_is_config_error() {
        let result = ApiConfig::default().apply_env_from(|key| {
            (key == ENV_ENVIRONMENT).then(|| "staging".to_string())
        });
        assert!(matches!(result, Err(DownloadError::Config(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"base_url": "http://backend.local", "routes": {{"health": "/api/health"}}}}"#
        )
        .unwrap();

        let config = ApiConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.base_url(), "http://backend.local");
        assert_eq!(config.routes.health, "/api/health");
        assert_eq!(config.routes.youtube_info, "/api/v1/youtube/info");
        assert_eq!(config.health_interval_ms, 30_000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = ApiConfig::load(Some(Path::new("/definitely/not/here.json")));
        assert!(matches!(result, Err(DownloadError::Config(_))));
    }
}
