//! Image search backends.
//!
//! A [SearchProvider] turns a free-text query into an ordered list of
//! [Candidate]s. URL-mode backends hand back remote image URLs for the
//! [crate::fetch::Fetcher], stage-mode backends download into a scratch
//! directory themselves and hand back the local file.

pub mod bing;
pub mod duckduckgo;
pub mod staged;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::constants::{REQUEST_TIMEOUT, STAGE_MODE_MAX_RESULTS, URL_MODE_MAX_RESULTS};
use crate::error::SeederError;
use crate::fetch::Fetcher;

/// Something we can try to turn into a persisted file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Candidate {
    /// Remote image URL, needs fetching.
    Remote(String),
    /// Already downloaded into the scratch directory.
    Staged(PathBuf),
}

/// Filters passed along with every query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchFilters {
    /// Ask the provider to filter adult content.
    pub safe_search: bool,
    /// Size class, eg `Large`.
    pub size: Option<String>,
    /// Color constraint, eg `color` or `Monochrome`.
    pub color: Option<String>,
    /// Content type, eg `photo`.
    pub image_type: Option<String>,
    /// Result cap.
    pub max_results: usize,
    /// Per-request timeout used by stagers that download on their own.
    pub timeout: Duration,
}

/// Which backend to search with.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Backend {
    /// General web image search, returns URLs.
    #[default]
    Duckduckgo,
    /// Bing image downloader, stages files locally.
    Bing,
}

impl Backend {
    /// The filters each backend was tuned with.
    pub fn default_filters(self) -> SearchFilters {
        match self {
            Backend::Duckduckgo => SearchFilters {
                safe_search: false,
                size: Some("Large".to_string()),
                color: Some("color".to_string()),
                image_type: Some("photo".to_string()),
                max_results: URL_MODE_MAX_RESULTS,
                timeout: REQUEST_TIMEOUT,
            },
            Backend::Bing => SearchFilters {
                safe_search: true,
                size: None,
                color: None,
                image_type: None,
                max_results: STAGE_MODE_MAX_RESULTS,
                timeout: REQUEST_TIMEOUT,
            },
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Duckduckgo => write!(f, "DuckDuckGo"),
            Backend::Bing => write!(f, "Bing"),
        }
    }
}

/// Finds candidate images for a query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human readable backend name for log lines.
    fn name(&self) -> &str;

    /// Ordered by provider relevance, at most `filters.max_results` long.
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, SeederError>;
}

/// Builds the provider for `backend`.
pub fn provider_for(
    backend: Backend,
    client: reqwest::Client,
    fetcher: Fetcher,
    scratch_dir: PathBuf,
) -> Box<dyn SearchProvider> {
    match backend {
        Backend::Duckduckgo => Box::new(duckduckgo::DuckDuckGo::new(client)),
        Backend::Bing => Box::new(staged::StagedSearch::new(
            bing::BingStager::new(client, fetcher),
            scratch_dir,
        )),
    }
}
