//! Rendering configuration.
//!
//! Every derivation takes its configuration explicitly; nothing is read from
//! ambient state. Values come from [`RenderConfig::default`], builder
//! methods, or the environment via [`RenderConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::defaults;
use crate::error::{Error, Result};
use crate::ids::parse_page_id;

/// Knobs shared by the table of contents, scroll spy and page resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Minimum heading count before a table of contents is shown.
    pub min_toc_items: usize,
    /// Scroll-spy recomputation window in milliseconds.
    pub scroll_spy_window_ms: u64,
    /// Lower bound of the heading activation offset, in pixels.
    pub activation_offset_floor_px: f64,
    /// Page served for the site root (`/` or `index`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_page_id: Option<String>,
    /// Friendly path segment to page id, consulted when a raw id does not
    /// parse.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub page_url_overrides: HashMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_toc_items: defaults::MIN_TOC_ITEMS,
            scroll_spy_window_ms: defaults::SCROLL_SPY_WINDOW_MS,
            activation_offset_floor_px: defaults::ACTIVATION_OFFSET_FLOOR_PX,
            root_page_id: None,
            page_url_overrides: HashMap::new(),
        }
    }
}

impl RenderConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `PAGEGRAPH_MIN_TOC_ITEMS` | `3` | Headings needed to show a TOC |
    /// | `PAGEGRAPH_SCROLL_SPY_WINDOW_MS` | `100` | Scroll-spy rate limit window |
    /// | `PAGEGRAPH_ROOT_PAGE_ID` | unset | Root page id |
    /// | `PAGEGRAPH_PAGE_URL_OVERRIDES` | `{}` | JSON object of path → page id |
    pub fn from_env() -> Self {
        let min_toc_items = std::env::var("PAGEGRAPH_MIN_TOC_ITEMS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::MIN_TOC_ITEMS);

        let scroll_spy_window_ms = std::env::var("PAGEGRAPH_SCROLL_SPY_WINDOW_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::SCROLL_SPY_WINDOW_MS);

        let root_page_id = std::env::var("PAGEGRAPH_ROOT_PAGE_ID")
            .ok()
            .filter(|v| !v.is_empty());

        let page_url_overrides = std::env::var("PAGEGRAPH_PAGE_URL_OVERRIDES")
            .ok()
            .and_then(|v| serde_json::from_str::<HashMap<String, String>>(&v).ok())
            .unwrap_or_default();

        debug!(
            min_toc_items,
            scroll_spy_window_ms,
            overrides = page_url_overrides.len(),
            "Render config loaded from environment"
        );

        Self {
            min_toc_items,
            scroll_spy_window_ms,
            root_page_id,
            page_url_overrides,
            ..Self::default()
        }
    }

    /// Set the minimum heading count for a table of contents.
    pub fn with_min_toc_items(mut self, min: usize) -> Self {
        self.min_toc_items = min;
        self
    }

    /// Set the scroll-spy recomputation window.
    pub fn with_scroll_spy_window_ms(mut self, ms: u64) -> Self {
        self.scroll_spy_window_ms = ms;
        self
    }

    pub fn with_root_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.root_page_id = Some(page_id.into());
        self
    }

    /// Add a friendly path override.
    pub fn with_page_url_override(
        mut self,
        path: impl Into<String>,
        page_id: impl Into<String>,
    ) -> Self {
        self.page_url_overrides.insert(path.into(), page_id.into());
        self
    }

    pub fn scroll_spy_window(&self) -> Duration {
        Duration::from_millis(self.scroll_spy_window_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.scroll_spy_window_ms == 0 {
            return Err(Error::Config(
                "scroll_spy_window_ms must be greater than zero".to_string(),
            ));
        }

        if !self.activation_offset_floor_px.is_finite() || self.activation_offset_floor_px < 0.0
        {
            return Err(Error::Config(format!(
                "activation_offset_floor_px must be a non-negative number, got: {}",
                self.activation_offset_floor_px
            )));
        }

        if let Some(root) = &self.root_page_id {
            if parse_page_id(root).is_none() {
                return Err(Error::Config(format!(
                    "root_page_id is not a page id: {root}"
                )));
            }
        }

        for (path, page_id) in &self.page_url_overrides {
            if parse_page_id(page_id).is_none() {
                return Err(Error::Config(format!(
                    "page_url_overrides[{path}] is not a page id: {page_id}"
                )));
            }
        }

        Ok(())
    }
}
