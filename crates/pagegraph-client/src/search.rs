//! Site search.

use std::sync::Arc;
use tracing::{instrument, warn};

use pagegraph_core::{parse_page_id, DocumentStore, SearchResults};

use crate::error::PageError;

/// Full-text search over the pages below the site's root page.
pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    root_page_id: Option<String>,
}

impl SearchService {
    pub fn new(store: Arc<dyn DocumentStore>, root_page_id: Option<&str>) -> Self {
        let root_page_id =
            root_page_id.map(|root| parse_page_id(root).unwrap_or_else(|| root.to_string()));
        Self {
            store,
            root_page_id,
        }
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "search", op = "search"))]
    pub async fn search(&self, query: &str) -> Result<SearchResults, PageError> {
        if query.trim().is_empty() {
            return Err(PageError::InvalidInput("Query is required".to_string()));
        }

        self.store
            .search(query, self.root_page_id.as_deref())
            .await
            .map_err(|e| {
                warn!(error = %e, status_code = 500u16, "Search error");
                PageError::FetchFailed("Failed to search".to_string())
            })
    }
}
