//! Downloads candidate images with a bounded number of attempts.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::constants::{DEFAULT_EXTENSION, USER_AGENT};
use crate::error::SeederError;

/// Builds the HTTP client shared by the fetcher and the search backends.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, SeederError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(SeederError::from)
}

/// GETs image bytes, retrying on anything but a 200.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Wraps an existing client, see [build_client].
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Makes up to `max_attempts` sequential requests and returns the first 200 body.
    ///
    /// Transport errors and non-200 statuses are treated the same way: the attempt
    /// is counted and we go again. Nothing is propagated to the caller.
    pub async fn fetch(&self, url: &str, max_attempts: u32) -> Option<Vec<u8>> {
        for attempt in 1..=max_attempts {
            match self.attempt(url).await {
                Ok(bytes) => return Some(bytes),
                Err(reason) => {
                    debug!("Attempt {attempt}/{max_attempts} for {url} failed: {reason}");
                }
            }
        }
        None
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("status {status}"));
        }
        let bytes = response.bytes().await.map_err(|err| err.to_string())?;
        Ok(bytes.to_vec())
    }
}

/// Guesses the file extension from the URL alone, no content sniffing.
pub fn infer_extension(url: &str) -> &'static str {
    if url.to_lowercase().contains(".png") {
        ".png"
    } else {
        DEFAULT_EXTENSION
    }
}
