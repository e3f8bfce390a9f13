// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! JSON fetch primitive used by the client
//!
//! `JsonFetcher` is the seam between query logic and transport. Errors must
//! carry the HTTP status (see `ResultsError::status`) so that the client can
//! tell a missing path from a failed request.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, trace};

use super::error::{Result, ResultsError};

/// Timeout for connecting to the Results service
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a whole request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// GET `path` (path and query, relative to the service root) and parse JSON
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value>;
}

/// `JsonFetcher` over HTTP
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher for `base_url` (scheme and host, optionally a path)
    ///
    /// The bearer token, when given, is sent with every request.
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ResultsError::Config("bearer token contains invalid characters".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn full_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.full_url(path);
        trace!(url = %url, "GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Results request failed");
            return Err(ResultsError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}
