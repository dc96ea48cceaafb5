use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use reqwest::Url;

use crate::models::{CreateRequest, Filter, ListResponse, Record, SearchResponse};

/// HTTP client backend that delegates store operations to a running
/// `stringstore` daemon.
pub struct HttpStoreBackend {
    client: Client,
    base_url: String,
}

impl HttpStoreBackend {
    /// Create a new HTTP backend targeting the given base URL
    /// (e.g. "http://127.0.0.1:7878").
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Analyze and store a value via `POST /v1/strings`.
    pub fn create(&self, value: &str) -> Result<Record> {
        let url = self.url_for("/v1/strings")?;
        let response = self
            .client
            .post(url.clone())
            .json(&CreateRequest {
                value: value.to_string(),
            })
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        decode_json(check_status(response)?)
    }

    /// Fetch a record via `GET /v1/strings/{value}`.
    pub fn get(&self, value: &str) -> Result<Record> {
        let url = self.record_url(value)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        decode_json(check_status(response)?)
    }

    /// Remove a record via `DELETE /v1/strings/{value}`.
    pub fn delete(&self, value: &str) -> Result<()> {
        let url = self.record_url(value)?;
        let response = self
            .client
            .delete(url.clone())
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        check_status(response)?;
        Ok(())
    }

    /// List records via `GET /v1/strings` with filter query parameters.
    pub fn list(&self, filter: &Filter) -> Result<ListResponse> {
        let mut url = self.url_for("/v1/strings")?;

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(raw) = &filter.is_palindrome {
                pairs.append_pair("is_palindrome", raw);
            }
            if let Some(raw) = &filter.min_length {
                pairs.append_pair("min_length", raw);
            }
            if let Some(raw) = &filter.max_length {
                pairs.append_pair("max_length", raw);
            }
            if let Some(raw) = &filter.word_count {
                pairs.append_pair("word_count", raw);
            }
            if let Some(raw) = &filter.contains_character {
                pairs.append_pair("contains_character", raw);
            }
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        decode_json(check_status(response)?)
    }

    /// Run a natural-language search via `GET /v1/strings/search`.
    pub fn search(&self, query: &str) -> Result<SearchResponse> {
        let mut url = self.url_for("/v1/strings/search")?;
        url.query_pairs_mut().append_pair("q", query);

        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        decode_json(check_status(response)?)
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).with_context(|| format!("invalid server URL {raw}"))
    }

    fn record_url(&self, value: &str) -> Result<Url> {
        let mut url = self.url_for("/v1/strings")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("server URL cannot carry path segments"))?
            .push(value);
        Ok(url)
    }
}

/// Surface the server's JSON error message instead of a bare status
/// code when a request fails.
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let message = response
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| status_fallback_message(status));

    bail!("server returned {status}: {message}");
}

fn status_fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

fn decode_json<R: serde::de::DeserializeOwned>(response: Response) -> Result<R> {
    response
        .json::<R>()
        .context("failed to decode JSON response from server")
}
