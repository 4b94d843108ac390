//! Document store client configuration.

use pagegraph_core::defaults;
use pagegraph_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection settings for [`crate::HttpDocumentStore`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Session token sent as the `token_v2` cookie; public pages need none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub page_chunk_limit: u32,
    pub search_limit: u32,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("page_chunk_limit", &self.page_chunk_limit)
            .field("search_limit", &self.search_limit)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            auth_token: None,
            timeout_secs: defaults::API_TIMEOUT_SECS,
            page_chunk_limit: defaults::PAGE_CHUNK_LIMIT,
            search_limit: defaults::SEARCH_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `PAGEGRAPH_API_BASE` | `https://www.notion.so/api/v3` | Store API base URL |
    /// | `PAGEGRAPH_TOKEN` | unset | Session token for private pages |
    /// | `PAGEGRAPH_TIMEOUT_SECS` | `30` | Request timeout |
    pub fn from_env() -> Self {
        let base_url = std::env::var("PAGEGRAPH_API_BASE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults::API_BASE_URL.to_string());

        let auth_token = std::env::var("PAGEGRAPH_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());

        let timeout_secs = std::env::var("PAGEGRAPH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::API_TIMEOUT_SECS);

        Self {
            base_url,
            auth_token,
            timeout_secs,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// URL of one API endpoint.
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must be an http(s) URL, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.page_chunk_limit == 0 {
            return Err(Error::Config(
                "page_chunk_limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
