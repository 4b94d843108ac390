//! HTTP document store backend.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn, Span};

use pagegraph_core::{defaults, logging};
use pagegraph_core::{
    BlockType, CollectionQueryResult, DocumentStore, Error, RecordMap, Result, SearchResults,
};

use crate::config::ClientConfig;

#[derive(Debug, Deserialize)]
struct RecordMapResponse {
    #[serde(rename = "recordMap", default)]
    record_map: RecordMap,
}

#[derive(Debug, Deserialize)]
struct QueryCollectionResponse {
    #[serde(default)]
    result: Option<QueryCollectionResult>,
    #[serde(rename = "recordMap", default)]
    record_map: RecordMap,
}

#[derive(Debug, Deserialize)]
struct QueryCollectionResult {
    #[serde(rename = "reducerResults", default)]
    reducer_results: Option<CollectionQueryResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ancestor_id: Option<&'a str>,
    limit: u32,
}

/// Document store reached over its HTTP API.
///
/// `fetch_page` loads the page chunk, fetches content blocks the chunk left
/// out, then queries every collection view found so the record map carries
/// the query results the collection engines need.
pub struct HttpDocumentStore {
    client: Client,
    config: ClientConfig,
}

impl HttpDocumentStore {
    /// Create a new store client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "client",
            component = "http_store",
            base_url = %config.base_url,
            authenticated = config.auth_token.is_some(),
            "Initializing document store client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B, resource: &str) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(self.config.endpoint(endpoint)).json(body);
        if let Some(token) = &self.config.auth_token {
            request = request.header(header::COOKIE, format!("token_v2={}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::PageNotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "Document store returned {} for {}: {}",
                status, endpoint, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse response: {}", e)))
    }

    async fn load_page_chunk(&self, page_id: &str) -> Result<RecordMap> {
        let body = json!({
            "pageId": page_id,
            "limit": self.config.page_chunk_limit,
            "chunkNumber": 0,
            "cursor": { "stack": [] },
            "verticalColumns": false,
        });
        let chunk: RecordMapResponse = self.post("loadPageChunk", &body, page_id).await?;
        Ok(chunk.record_map)
    }

    async fn sync_blocks(&self, ids: &[String]) -> Result<RecordMap> {
        let requests: Vec<_> = ids
            .iter()
            .map(|id| json!({ "pointer": { "table": "block", "id": id }, "version": -1 }))
            .collect();
        let body = json!({ "requests": requests });
        let response: RecordMapResponse =
            self.post("syncRecordValues", &body, "blocks").await?;
        Ok(response.record_map)
    }

    /// Fetch content blocks referenced by the page but missing from the
    /// chunk, round by round until none are left. Each id is requested once;
    /// a failed round stops the follow-up and keeps what was loaded.
    async fn load_missing_blocks(&self, record_map: &mut RecordMap, page_id: &str) {
        let mut requested = HashSet::new();

        for round in 0..defaults::MISSING_BLOCK_ROUNDS {
            let missing: Vec<String> = missing_content_ids(record_map, page_id)
                .into_iter()
                .filter(|id| requested.insert(id.clone()))
                .collect();
            if missing.is_empty() {
                return;
            }

            debug!(round, missing = missing.len(), "Fetching missing blocks");
            match self.sync_blocks(&missing).await {
                Ok(records) => record_map.merge(records),
                Err(e) => {
                    warn!(
                        subsystem = "client",
                        component = "http_store",
                        page_id = %page_id,
                        error = %e,
                        "Missing block fetch failed, page left partial"
                    );
                    return;
                }
            }
        }
    }

    #[instrument(
        skip(self),
        fields(subsystem = "client", component = "http_store", op = "query_collection")
    )]
    async fn query_collection(
        &self,
        collection_id: &str,
        view_id: &str,
    ) -> Result<(Option<CollectionQueryResult>, RecordMap)> {
        let body = json!({
            "collectionId": collection_id,
            "collectionViewId": view_id,
            "loader": { "type": "reducer" },
        });
        let response: QueryCollectionResponse =
            self.post("queryCollection", &body, collection_id).await?;
        let result = response.result.and_then(|r| r.reducer_results);
        Ok((result, response.record_map))
    }

    /// Query every collection view of the record map and merge the results
    /// in. A failed query leaves that view without results.
    async fn load_collection_queries(&self, record_map: &mut RecordMap) {
        let mut targets: Vec<(String, String)> = record_map
            .block
            .values()
            .filter_map(|entry| entry.value.as_ref())
            .filter(|block| block.block_type.is_collection_view())
            .filter_map(|block| {
                Some((block.collection_id.clone()?, block.view_ids.first()?.clone()))
            })
            .collect();
        targets.sort();
        targets.dedup();

        for (collection_id, view_id) in targets {
            match self.query_collection(&collection_id, &view_id).await {
                Ok((result, records)) => {
                    record_map.merge(records);
                    if let Some(result) = result {
                        record_map
                            .collection_query
                            .entry(collection_id)
                            .or_default()
                            .insert(view_id, result);
                    }
                }
                Err(e) => {
                    warn!(
                        subsystem = "client",
                        component = "http_store",
                        collection_id = %collection_id,
                        view_id = %view_id,
                        error = %e,
                        "Collection query failed, view left empty"
                    );
                }
            }
        }
    }
}

/// Content ids of the page and its non-page descendants that the record map
/// does not hold. Subpage contents are never followed.
fn missing_content_ids(record_map: &RecordMap, page_id: &str) -> Vec<String> {
    let mut missing: Vec<String> = record_map
        .block
        .values()
        .filter_map(|entry| entry.value.as_ref())
        .filter(|block| block.id == page_id || block.block_type != BlockType::Page)
        .flat_map(|block| block.content.iter())
        .filter(|id| record_map.block_by_id(id).is_none())
        .cloned()
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    #[instrument(
        skip(self),
        fields(
            subsystem = "client",
            component = "http_store",
            op = "fetch_page",
            block_count = tracing::field::Empty,
            duration_ms = tracing::field::Empty
        )
    )]
    async fn fetch_page(&self, page_id: &str) -> Result<RecordMap> {
        let start = Instant::now();

        let mut record_map = self.load_page_chunk(page_id).await?;
        if record_map.block_by_id(page_id).is_none() {
            return Err(Error::PageNotFound(page_id.to_string()));
        }
        self.load_missing_blocks(&mut record_map, page_id).await;
        self.load_collection_queries(&mut record_map).await;

        let span = Span::current();
        span.record(logging::BLOCK_COUNT, record_map.block.len());
        span.record(logging::DURATION_MS, start.elapsed().as_millis() as u64);
        debug!("Page fetched");

        Ok(record_map)
    }

    #[instrument(
        skip(self),
        fields(
            subsystem = "client",
            component = "http_store",
            op = "search",
            result_count = tracing::field::Empty
        )
    )]
    async fn search(&self, query: &str, scope_id: Option<&str>) -> Result<SearchResults> {
        let request = SearchRequest {
            query,
            ancestor_id: scope_id,
            limit: self.config.search_limit,
        };
        let results: SearchResults = self.post("search", &request, query).await?;

        Span::current().record(logging::RESULT_COUNT, results.results.len());
        debug!(total = results.total, "Search complete");

        Ok(results)
    }
}
