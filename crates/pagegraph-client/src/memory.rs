//! In-memory document store.
//!
//! Serves record maps held in memory: per-page maps registered with
//! [`MemoryDocumentStore::with_page`], or one shared map (a page loaded
//! from disk) registered with [`MemoryDocumentStore::with_record_map`].
//! Every call is logged, which makes it a test double as well.
//!
//! ## Usage
//!
//! ```rust
//! use pagegraph_client::MemoryDocumentStore;
//! use pagegraph_core::{DocumentStore, RecordMap};
//!
//! # tokio_test_block_on(async {
//! let store = MemoryDocumentStore::new().with_page("page-1", RecordMap::default());
//! assert!(store.fetch_page("page-1").await.is_ok());
//! assert_eq!(store.calls(), vec!["fetch_page:page-1".to_string()]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use pagegraph_core::{DocumentStore, Error, RecordMap, Result, SearchResults};

/// Document store serving fixed record maps.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    pages: Arc<HashMap<String, RecordMap>>,
    shared: Option<Arc<RecordMap>>,
    search_results: Option<Arc<SearchResults>>,
    failing: bool,
    call_log: Arc<Mutex<Vec<String>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `record_map` for `page_id`.
    pub fn with_page(mut self, page_id: impl Into<String>, record_map: RecordMap) -> Self {
        Arc::make_mut(&mut self.pages).insert(page_id.into(), record_map);
        self
    }

    /// Serve `record_map` for every block it holds.
    pub fn with_record_map(mut self, record_map: RecordMap) -> Self {
        self.shared = Some(Arc::new(record_map));
        self
    }

    pub fn with_search_results(mut self, results: SearchResults) -> Self {
        self.search_results = Some(Arc::new(results));
        self
    }

    /// Fail every request with a request error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Calls received so far, as `"<op>:<argument>"`.
    pub fn calls(&self) -> Vec<String> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_page(&self, page_id: &str) -> Result<RecordMap> {
        self.record(format!("fetch_page:{}", page_id));
        if self.failing {
            return Err(Error::Request("document store unavailable".to_string()));
        }
        if let Some(record_map) = self.pages.get(page_id) {
            return Ok(record_map.clone());
        }
        self.shared
            .as_deref()
            .filter(|record_map| record_map.block_by_id(page_id).is_some())
            .cloned()
            .ok_or_else(|| Error::PageNotFound(page_id.to_string()))
    }

    async fn search(&self, query: &str, scope_id: Option<&str>) -> Result<SearchResults> {
        self.record(format!("search:{}:{}", query, scope_id.unwrap_or_default()));
        if self.failing {
            return Err(Error::Request("document store unavailable".to_string()));
        }
        Ok(self
            .search_results
            .as_deref()
            .cloned()
            .unwrap_or_default())
    }
}
