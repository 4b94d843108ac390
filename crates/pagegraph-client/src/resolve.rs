//! Page resolution: raw page id from a URL to a fetched record map.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use pagegraph_core::defaults::INDEX_PAGE;
use pagegraph_core::{parse_page_id, DocumentStore, PageView, RecordMap, RenderConfig};

use crate::error::PageError;

/// A page and the record map it was fetched with.
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    /// Dashed page id.
    pub page_id: String,
    pub record_map: RecordMap,
}

/// Resolves raw page ids (compact or dashed ids, slugs, friendly paths) and
/// fetches the page from the document store.
pub struct PageResolver {
    store: Arc<dyn DocumentStore>,
    config: RenderConfig,
}

impl PageResolver {
    pub fn new(store: Arc<dyn DocumentStore>, config: RenderConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Page id a raw id refers to: the id embedded in it, else the id of a
    /// configured path override.
    pub fn page_id_for(&self, raw_page_id: &str) -> Option<String> {
        parse_page_id(raw_page_id).or_else(|| {
            self.config
                .page_url_overrides
                .get(raw_page_id)
                .and_then(|id| parse_page_id(id))
        })
    }

    /// Resolve and fetch a page. `None`, empty and `"index"` mean the site's
    /// root page.
    #[instrument(skip(self), fields(subsystem = "client", component = "resolver", op = "resolve"))]
    pub async fn resolve(&self, raw_page_id: Option<&str>) -> Result<ResolvedPage, PageError> {
        let raw = raw_page_id.filter(|raw| !raw.is_empty() && *raw != INDEX_PAGE);

        let Some(raw) = raw else {
            return self.resolve_root().await;
        };

        let Some(page_id) = self.page_id_for(raw) else {
            info!(raw_page_id = raw, status_code = 404u16, "Unknown page");
            return Err(PageError::NotFound(format!("Not found \"{}\"", raw)));
        };

        match self.store.fetch_page(&page_id).await {
            Ok(record_map) => Ok(ResolvedPage {
                page_id,
                record_map,
            }),
            Err(e) => {
                warn!(page_id = %page_id, error = %e, status_code = 500u16, "Error fetching page");
                Err(PageError::FetchFailed(format!(
                    "Error fetching page \"{}\"",
                    raw
                )))
            }
        }
    }

    async fn resolve_root(&self) -> Result<ResolvedPage, PageError> {
        let root_error = || PageError::FetchFailed("Error fetching root page".to_string());

        let Some(root) = self.config.root_page_id.as_deref() else {
            warn!("Root page id is not configured");
            return Err(root_error());
        };
        let page_id = parse_page_id(root).unwrap_or_else(|| root.to_string());

        match self.store.fetch_page(&page_id).await {
            Ok(record_map) => Ok(ResolvedPage {
                page_id,
                record_map,
            }),
            Err(e) => {
                warn!(page_id = %page_id, error = %e, status_code = 500u16, "Error fetching root page");
                Err(root_error())
            }
        }
    }

    /// Resolve a page and derive its view.
    pub async fn page_view(&self, raw_page_id: Option<&str>) -> Result<PageView, PageError> {
        let resolved = self.resolve(raw_page_id).await?;
        PageView::derive(&resolved.record_map, &resolved.page_id, &self.config).ok_or_else(|| {
            PageError::NotFound(format!(
                "Not found \"{}\"",
                raw_page_id.unwrap_or(resolved.page_id.as_str())
            ))
        })
    }
}
