//! DuckDuckGo image search (URL-mode).

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::REFERER;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Candidate, SearchFilters, SearchProvider};
use crate::constants::MAX_SEARCH_PAGES;
use crate::error::SeederError;

/// Production endpoint.
pub const DUCKDUCKGO_BASE_URL: &str = "https://duckduckgo.com/";

static VQD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"vqd=["']?([0-9A-Za-z_-]+)"#).ok());

#[derive(Debug, Deserialize)]
struct ImagesPage {
    #[serde(default)]
    results: Vec<ImageResult>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    image: String,
}

/// Searches `i.js` after fetching the per-query `vqd` token.
#[derive(Clone, Debug)]
pub struct DuckDuckGo {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGo {
    /// Talks to the real DuckDuckGo.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DUCKDUCKGO_BASE_URL)
    }

    /// Talks to something that looks like DuckDuckGo, eg a local test server.
    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self { client, base_url }
    }

    async fn vqd(&self, query: &str) -> Result<String, SeederError> {
        let url = Url::parse_with_params(&self.base_url, &[("q", query)])?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_vqd(&body)
            .ok_or_else(|| SeederError::Search(format!("no vqd token returned for {query:?}")))
    }

    async fn page(&self, url: Url) -> Result<ImagesPage, SeederError> {
        debug!("Requesting {url}");
        Ok(self
            .client
            .get(url)
            .header(REFERER, self.base_url.as_str())
            .send()
            .await?
            .error_for_status()?
            .json::<ImagesPage>()
            .await?)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGo {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, SeederError> {
        let vqd = self.vqd(query).await?;
        let base = Url::parse(&self.base_url)?;
        let filter_param = filter_param(filters);
        let safe_search = if filters.safe_search { "1" } else { "-1" };
        let mut next_url = Some(Url::parse_with_params(
            base.join("i.js")?.as_str(),
            &[
                ("l", "wt-wt"),
                ("o", "json"),
                ("q", query),
                ("vqd", vqd.as_str()),
                ("f", filter_param.as_str()),
                ("p", safe_search),
            ],
        )?);

        let mut candidates = Vec::new();
        let mut pages = 0;
        while let Some(url) = next_url.take() {
            if candidates.len() >= filters.max_results || pages >= MAX_SEARCH_PAGES {
                break;
            }
            pages += 1;
            let page = self.page(url).await?;
            candidates.extend(
                page.results
                    .into_iter()
                    .filter(|result| !result.image.is_empty())
                    .map(|result| Candidate::Remote(result.image)),
            );
            next_url = match page.next {
                Some(next) => Some(next_page_url(&base, &next, &vqd)?),
                None => None,
            };
        }
        candidates.truncate(filters.max_results);
        Ok(candidates)
    }
}

/// Pulls the `vqd` token out of the landing page HTML.
pub fn extract_vqd(body: &str) -> Option<String> {
    VQD_PATTERN
        .as_ref()?
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
}

/// `timelimit,size:S,color:C,type:T,layout,license`
fn filter_param(filters: &SearchFilters) -> String {
    let size = filters
        .size
        .as_deref()
        .map(|size| format!("size:{size}"))
        .unwrap_or_default();
    let color = filters
        .color
        .as_deref()
        .map(|color| format!("color:{color}"))
        .unwrap_or_default();
    let image_type = filters
        .image_type
        .as_deref()
        .map(|image_type| format!("type:{image_type}"))
        .unwrap_or_default();
    format!(",{size},{color},{image_type},,")
}

/// The `next` link is relative and sometimes drops the token.
fn next_page_url(base: &Url, next: &str, vqd: &str) -> Result<Url, SeederError> {
    let mut url = base.join(next)?;
    if !url.query_pairs().any(|(key, _)| key == "vqd") {
        url.query_pairs_mut().append_pair("vqd", vqd);
    }
    Ok(url)
}
