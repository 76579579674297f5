//! # photo-search: client for a photo album service
//!
//! The service is two endpoints behind an API gateway: a natural-language image search
//! (`GET /search?q=`) that returns object-storage keys, and an upload endpoint
//! (`PUT /upload/{bucket}/{key}`) that stores a base64-encoded image with custom labels
//! attached as metadata. Labelling and indexing happen in the backend.
//!
//! ## Architecture
//!
//! - [`api`] defines the [`PhotoApi`] trait with a reqwest implementation and a mock.
//! - [`search`] and [`upload`] are the two flows. Each takes a view handle ([`view`]), performs
//!   one remote call and renders the outcome. Failures are logged and shown as a single static
//!   message; they never propagate past the flow.
//! - [`encoding`] shapes upload bodies (data-URL stripping, base64 padding).
//! - [`config`] loads YAML + environment configuration with figment.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use photo_search::{Application, Config, view::TerminalView};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = photo_search::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     photo_search::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config)?;
//!     let outcome = app.search(&TerminalView::new(), "dogs on the beach").await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod encoding;
pub mod error;
pub mod models;
pub mod search;
pub mod telemetry;
pub mod upload;
pub mod view;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

pub use api::{MockPhotoApi, PhotoApi, ReqwestPhotoApi};
pub use config::Config;
pub use error::{Error, Result};
pub use search::{SearchFlow, SearchOutcome};
pub use upload::{UploadFlow, UploadOutcome};

/// Both flows wired to one API client.
pub struct Application<A = ReqwestPhotoApi> {
    search: SearchFlow<A>,
    upload: UploadFlow<A>,
}

impl Application<ReqwestPhotoApi> {
    /// Build the production client from validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        debug!("Starting photo-search with configuration: {:#?}", config);

        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| Error::InvalidInput("api_url is not configured".to_string()))?;
        let api = ReqwestPhotoApi::new(api_url, config.request_timeout)?;

        Ok(Self::with_api(Arc::new(api), &config))
    }
}

impl<A: PhotoApi> Application<A> {
    /// Wire the flows to an arbitrary API implementation.
    pub fn with_api(api: Arc<A>, config: &Config) -> Self {
        Self {
            search: SearchFlow::new(api.clone(), config.storage_base()),
            upload: UploadFlow::new(api, config.bucket.clone()),
        }
    }

    pub async fn search<V: view::SearchView + ?Sized>(&self, view: &V, query: &str) -> SearchOutcome {
        self.search.run(view, query).await
    }

    pub async fn upload<V: view::UploadView + ?Sized>(&self, view: &V, file: &Path, labels: &str) -> UploadOutcome {
        self.upload.run(view, file, labels).await
    }

    /// Search with the text currently in the page's query input.
    pub async fn search_page(&self, page: &view::Page) -> SearchOutcome {
        let query = page.query();
        self.search.run(page, &query).await
    }

    /// Upload the page's selected file. Nothing selected counts as a failed upload.
    pub async fn upload_page(&self, page: &view::Page, labels: &str) -> UploadOutcome {
        match page.file_selection() {
            Some(file) => self.upload.run(page, &file, labels).await,
            None => {
                tracing::error!("Upload requested without a selected file");
                view::UploadView::show_status(page, upload::UPLOAD_ERROR_MESSAGE);
                UploadOutcome::Failed
            }
        }
    }
}
