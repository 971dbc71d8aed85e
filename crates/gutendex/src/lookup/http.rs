//! HTTP lookup against a Gutendex-compatible endpoint.

use super::Lookup;
use crate::error::{ErrorKind, Result};
use crate::models::Candidate;
use crate::parse::parse_search_text;
use async_trait::async_trait;
use exn::ResultExt;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://gutendex.com/books/";
pub const DEFAULT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Lookup backed by the Gutendex JSON API.
///
/// Requests are single-shot: no retries, no pagination beyond the first page.
#[derive(Debug, Clone)]
pub struct GutendexClient {
    http: reqwest::Client,
    base_url: String,
}

impl GutendexClient {
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            exn::bail!(ErrorKind::Configuration("base URL must not be empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|err| ErrorKind::Configuration(err.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Client for the public instance at [`DEFAULT_BASE_URL`].
    pub fn public() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Lookup for GutendexClient {
    fn name(&self) -> &str {
        "gutendex"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn search(&self, title: &str) -> Result<Vec<Candidate>> {
        tracing::debug!(title, "querying search endpoint");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("search", title)])
            .send()
            .await
            .map_err(|err| ErrorKind::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|err| ErrorKind::Network(err.to_string()))?;
        let page = parse_search_text(&body).or_raise(|| ErrorKind::MalformedJson(format!("search for {title:?}")))?;
        tracing::debug!(title, total = page.count, returned = page.results.len(), "search complete");
        Ok(page.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_base_url() {
        let err = GutendexClient::new("  ", DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(*err, ErrorKind::Configuration(_)));
    }

    #[test]
    fn test_public_client() {
        let client = GutendexClient::public().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.name(), "gutendex");
    }
}
