use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::models::Provider;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueryConfig {
    pub provider: Provider,
    pub debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    pub notice_ttl_ms: u64,
    pub download_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub query: QueryConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the query service
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Translation backend used for queries
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Directory that exported CSV files are written to
    #[arg(long)]
    pub download_dir: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config_builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = vec!["nlq.toml", "config/nlq.toml"];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // NLQ__SERVICE__BASE_URL and friends
        config_builder = config_builder.add_source(Environment::with_prefix("NLQ").separator("__"));

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(base_url) = &args.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(provider) = args.provider {
            config.query.provider = provider;
        }
        if let Some(download_dir) = &args.download_dir {
            config.ui.download_dir = download_dir.clone();
        }
        if args.log_json {
            config.logging.json = true;
        }

        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.query.debounce_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.ui.notice_ttl_ms)
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
            },
            query: QueryConfig {
                provider: Provider::OpenAi,
                debounce_ms: 400,
            },
            ui: UiConfig {
                notice_ttl_ms: 3000,
                download_dir: "downloads".to_string(),
            },
            logging: LoggingConfig { json: false },
        }
    }
}
