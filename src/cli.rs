// CLI command structure using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::downloader::{ApiConfig, DownloadError, Environment};

#[derive(Parser)]
#[command(name = "social-downloader")]
#[command(version, about = "Fetch TikTok, Instagram, Facebook and YouTube download links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON config file (defaults to <config dir>/social-downloader/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the environment default
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// production or development
    #[arg(long, global = true)]
    pub env: Option<Environment>,

    /// HTTP or SOCKS5 proxy URL
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch metadata and download link in one go
    Download { url: String },

    /// Two-step flow: fast info first, link later
    Info {
        url: String,

        /// Also resolve the download link when it comes separately
        #[arg(long)]
        resolve: bool,
    },

    /// Instagram link lookup through the simple endpoint
    InstagramVideo { url: String },

    /// Show which platform a URL is routed to
    Detect { url: String },

    /// Check backend health
    Health {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// Show backend usage statistics
    Stats,

    /// Read URLs from stdin and download them as they arrive
    Interactive,
}

impl Cli {
    /// Defaults, then config file, then environment, then flags
    pub fn api_config(&self) -> Result<ApiConfig, DownloadError> {
        let mut config = ApiConfig::load(self.config.as_deref())?.apply_env()?;

        if let Some(env) = self.env {
            config = config.with_environment(env);
        }

        Ok(config
            .with_base_url(self.api_url.clone())
            .with_proxy(self.proxy.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "social-downloader",
            "--env",
            "production",
            "--api-url",
            "http://127.0.0.1:8080",
            "download",
            "https://youtu.be/x",
        ]);

        let config = cli.api_config().unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert!(matches!(cli.command, Some(Commands::Download { .. })));
    }

    #[test]
    fn test_info_resolve_flag() {
        let cli = Cli::parse_from(["social-downloader", "info", "--resolve", "https://youtu.be/x"]);
        match cli.command {
            Some(Commands::Info { url, resolve }) => {
                assert_eq!(url, "https://youtu.be/x");
                assert!(resolve);
            }
            _ => panic!("expected info command"),
        }
    }
}
