pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;

use std::sync::Arc;
use jobs::JobRegistry;

pub use error::{AppError, Result};
pub use models::{Driver, ScrapeJobSpec, ScrapedRecord};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobRegistry>,
}
