//! Bing image downloader, the stage-mode helper.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::fs;
use tracing::{info, warn};
use url::Url;

use super::SearchFilters;
use super::staged::ImageStager;
use crate::constants::MAX_SEARCH_PAGES;
use crate::error::SeederError;
use crate::fetch::Fetcher;

/// Production endpoint.
pub const BING_BASE_URL: &str = "https://www.bing.com/";

/// Extensions kept as-is when naming staged files.
const KNOWN_EXTENSIONS: &[&str] = &[
    "jpe", "jpeg", "jfif", "exif", "tiff", "gif", "bmp", "png", "webp", "jpg",
];

static MURL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"murl&quot;:&quot;(.*?)&quot;").ok());

/// Scrapes Bing's async results page and downloads the hits into a directory.
#[derive(Clone, Debug)]
pub struct BingStager {
    client: reqwest::Client,
    fetcher: Fetcher,
    base_url: String,
}

impl BingStager {
    /// Talks to the real Bing.
    pub fn new(client: reqwest::Client, fetcher: Fetcher) -> Self {
        Self::with_base_url(client, fetcher, BING_BASE_URL)
    }

    /// Talks to something that looks like Bing, eg a local test server.
    pub fn with_base_url(client: reqwest::Client, fetcher: Fetcher, base_url: &str) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self {
            client,
            fetcher,
            base_url,
        }
    }

    fn page_url(
        &self,
        query: &str,
        page: usize,
        filters: &SearchFilters,
    ) -> Result<Url, SeederError> {
        let endpoint = Url::parse(&self.base_url)?.join("images/async")?;
        let first = page.to_string();
        let count = filters.max_results.to_string();
        let adult = if filters.safe_search { "on" } else { "off" };
        let qft = filter_param(filters);
        Ok(Url::parse_with_params(
            endpoint.as_str(),
            &[
                ("q", query),
                ("first", first.as_str()),
                ("count", count.as_str()),
                ("adlt", adult),
                ("qft", qft.as_str()),
            ],
        )?)
    }
}

#[async_trait]
impl ImageStager for BingStager {
    fn name(&self) -> &str {
        "Bing"
    }

    async fn stage(
        &self,
        query: &str,
        filters: &SearchFilters,
        dest: &Path,
    ) -> Result<usize, SeederError> {
        fs::create_dir_all(dest).await?;

        let limit = filters.max_results;
        let mut seen = HashSet::new();
        let mut saved = 0;
        let mut page = 0;
        while saved < limit && page < MAX_SEARCH_PAGES {
            let html = self
                .client
                .get(self.page_url(query, page, filters)?)
                .timeout(filters.timeout)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            page += 1;

            let fresh: Vec<String> = extract_links(&html)
                .into_iter()
                .filter(|link| seen.insert(link.clone()))
                .collect();
            if fresh.is_empty() {
                break;
            }

            for link in fresh {
                if saved >= limit {
                    break;
                }
                info!("Downloading: {link}");
                let Some(bytes) = self.fetcher.fetch(&link, 1).await else {
                    warn!("Issue getting {link}");
                    continue;
                };
                saved += 1;
                let path = dest.join(format!("Image_{saved}.{}", link_extension(&link)));
                fs::write(&path, bytes).await?;
            }
        }
        Ok(saved)
    }
}

/// Image URLs from the `murl` fields of the results markup, in page order.
pub fn extract_links(html: &str) -> Vec<String> {
    let Some(pattern) = MURL_PATTERN.as_ref() else {
        return Vec::new();
    };
    pattern
        .captures_iter(html)
        .filter_map(|captures| captures.get(1))
        .map(|link| html_escape::decode_html_entities(link.as_str()).to_string())
        .filter(|link| !link.is_empty())
        .collect()
}

/// Extension from the URL path, `jpg` unless it's one we know.
fn link_extension(link: &str) -> String {
    let ext = Url::parse(link)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_default();
    if KNOWN_EXTENSIONS.contains(&ext.as_str()) {
        ext
    } else {
        "jpg".to_string()
    }
}

fn filter_param(filters: &SearchFilters) -> String {
    let mut qft = String::new();
    if let Some(image_type) = filters.image_type.as_deref() {
        let token = match image_type.to_ascii_lowercase().as_str() {
            "line" => "linedrawing".to_string(),
            "gif" => "animatedgif".to_string(),
            other => other.to_string(),
        };
        qft.push_str(&format!("+filterui:photo-{token}"));
    }
    if let Some(size) = filters.size.as_deref() {
        qft.push_str(&format!("+filterui:imagesize-{}", size.to_ascii_lowercase()));
    }
    if let Some(color) = filters.color.as_deref() {
        qft.push_str(&format!("+filterui:color2-{}", color.to_ascii_lowercase()));
    }
    qft
}
