//! Client configuration.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The file path
//! defaults to `config.yaml` but can be given with `-f` or the `PHOTO_SEARCH_CONFIG` environment
//! variable. A missing file is not an error as long as the required values come from the
//! environment.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PHOTO_SEARCH_` override YAML values
//!
//! ## Example
//!
//! ```yaml
//! api_url: https://abc123.execute-api.us-east-1.amazonaws.com/v1
//! bucket: image-search-data
//! storage_url: https://image-search-data.s3.us-east-1.amazonaws.com
//! request_timeout: 30s
//! ```
//!
//! ```bash
//! PHOTO_SEARCH_API_URL=http://localhost:3000 photo-search search "dogs on the beach"
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::Error;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PHOTO_SEARCH_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search photos with a natural-language query
    Search {
        /// Query text, e.g. "dogs and cats"
        query: String,
    },
    /// Upload a photo with optional custom labels
    Upload {
        /// Image file to upload
        file: PathBuf,

        /// Comma-separated custom labels stored with the photo
        #[arg(short, long, default_value = "")]
        labels: String,
    },
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the API gateway stage exposing `/search` and `/upload`
    pub api_url: Option<Url>,
    /// Storage bucket uploads are written to
    pub bucket: String,
    /// Public base URL images are served from; result keys are appended to it
    pub storage_url: Url,
    /// Per-request timeout. Unset means the transport default
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            bucket: "image-search-data".to_string(),
            storage_url: Url::parse("https://image-search-data.s3.us-east-1.amazonaws.com").expect("valid default storage URL"),
            request_timeout: None,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("PHOTO_SEARCH_").split("__").ignore(&["config"]))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        let Some(api_url) = &self.api_url else {
            return Err(Error::InvalidInput(
                "Config validation: api_url is not configured. Set PHOTO_SEARCH_API_URL or add api_url to the config file.".to_string(),
            ));
        };

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "Config validation: api_url must be an http(s) URL, got '{api_url}'"
            )));
        }

        if !matches!(self.storage_url.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "Config validation: storage_url must be an http(s) URL, got '{}'",
                self.storage_url
            )));
        }

        if self.bucket.trim().is_empty() {
            return Err(Error::InvalidInput("Config validation: bucket cannot be empty".to_string()));
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidInput(
                "Config validation: request_timeout must be positive; remove it to use the transport default".to_string(),
            ));
        }

        Ok(())
    }

    /// Storage base URL without a trailing slash, ready to have keys appended.
    pub fn storage_base(&self) -> String {
        self.storage_url.as_str().trim_end_matches('/').to_string()
    }
}
