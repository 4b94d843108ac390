//! Integration tests for the HTTP document store against a mock server.

use pagegraph_client::{ClientConfig, HttpDocumentStore};
use pagegraph_core::{DocumentStore, Error};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "0b6a2f1e-3c4d-4e5f-8a9b-0c1d2e3f4a5b";

fn store(server: &MockServer) -> HttpDocumentStore {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_timeout_secs(5);
    HttpDocumentStore::new(config).expect("Failed to create store")
}

fn page_chunk() -> serde_json::Value {
    json!({
        "recordMap": {
            "block": {
                PAGE: { "role": "reader", "value": { "id": PAGE, "type": "page",
                    "properties": { "title": [["Roadmap"]] },
                    "content": ["tasks", "notes"] } },
                "tasks": { "role": "reader", "value": { "id": "tasks", "type": "collection_view",
                    "collection_id": "coll", "view_ids": ["v-board", "v-table"] } },
                "notes": { "role": "reader", "value": { "id": "notes", "type": "collection_view",
                    "collection_id": "coll-notes", "view_ids": ["v-notes"] } }
            }
        }
    })
}

#[tokio::test]
async fn test_fetch_page_merges_collection_queries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .and(body_partial_json(json!({ "pageId": PAGE, "chunkNumber": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_chunk()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/queryCollection"))
        .and(body_partial_json(json!({
            "collectionId": "coll",
            "collectionViewId": "v-board",
            "loader": { "type": "reducer" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "reducerResults": {
                    "collection_group_results": { "type": "results", "blockIds": ["t1", "t2"] },
                    "results:select:Doing": { "blockIds": ["t1"] }
                }
            },
            "recordMap": {
                "block": {
                    "t1": { "value": { "id": "t1", "type": "page" } },
                    "t2": { "value": { "id": "t2", "type": "page" } }
                },
                "collection": {
                    "coll": { "value": { "id": "coll", "name": [["Tasks"]], "schema": {} } }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/queryCollection"))
        .and(body_partial_json(json!({ "collectionId": "coll-notes" })))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let record_map = store(&server).fetch_page(PAGE).await.unwrap();

    assert!(record_map.block_by_id(PAGE).is_some());
    assert!(record_map.block_by_id("t1").is_some());
    assert!(record_map.collection_by_id("coll").is_some());

    let result = record_map.query_result("coll", "v-board").unwrap();
    assert_eq!(result.bucket("results:select:Doing"), Some(vec!["t1".to_string()]));
    assert_eq!(result.group_result_ids().map(<[String]>::len), Some(2));

    // The failed query leaves that view without results.
    assert!(record_map.query_result("coll-notes", "v-notes").is_none());
}

#[tokio::test]
async fn test_fetch_page_loads_blocks_beyond_the_chunk() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordMap": {
                "block": {
                    PAGE: { "value": { "id": PAGE, "type": "page", "content": ["h1", "list"] } },
                    "h1": { "value": { "id": "h1", "type": "header" } }
                }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/syncRecordValues"))
        .and(body_partial_json(json!({
            "requests": [{ "pointer": { "table": "block", "id": "list" }, "version": -1 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordMap": {
                "block": {
                    "list": { "value": { "id": "list", "type": "bulleted_list", "content": ["item"] } }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/syncRecordValues"))
        .and(body_partial_json(json!({
            "requests": [{ "pointer": { "id": "item" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordMap": {
                "block": { "item": { "value": { "id": "item", "type": "text" } } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record_map = store(&server).fetch_page(PAGE).await.unwrap();

    assert!(record_map.block_by_id("h1").is_some());
    assert!(record_map.block_by_id("list").is_some());
    assert!(record_map.block_by_id("item").is_some());
}

#[tokio::test]
async fn test_unreturned_block_is_requested_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordMap": {
                "block": {
                    PAGE: { "value": { "id": PAGE, "type": "page", "content": ["gone"] } }
                }
            }
        })))
        .mount(&server)
        .await;

    // An id the store never returns is asked for only once.
    Mock::given(method("POST"))
        .and(path("/syncRecordValues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "recordMap": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let record_map = store(&server).fetch_page(PAGE).await.unwrap();
    assert!(record_map.block_by_id(PAGE).is_some());
    assert!(record_map.block_by_id("gone").is_none());
}

#[tokio::test]
async fn test_auth_token_sent_as_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .and(header("cookie", "token_v2=secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordMap": {
                "block": { PAGE: { "value": { "id": PAGE, "type": "page" } } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_auth_token("secret-token");
    let store = HttpDocumentStore::new(config).unwrap();

    assert!(store.fetch_page(PAGE).await.is_ok());
}

#[tokio::test]
async fn test_not_found_status_is_page_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store(&server).fetch_page(PAGE).await.unwrap_err();
    assert!(matches!(err, Error::PageNotFound(id) if id == PAGE));
}

#[tokio::test]
async fn test_chunk_without_the_page_is_page_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "recordMap": {} })))
        .mount(&server)
        .await;

    let err = store(&server).fetch_page(PAGE).await.unwrap_err();
    assert!(matches!(err, Error::PageNotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_request_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = store(&server).fetch_page(PAGE).await.unwrap_err();
    match err {
        Error::Request(msg) => {
            assert!(msg.contains("500"), "unexpected message: {}", msg);
            assert!(msg.contains("loadPageChunk"));
            assert!(msg.contains("upstream down"));
        }
        other => panic!("expected request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/loadPageChunk"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = store(&server).fetch_page(PAGE).await.unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_search_scoped_to_ancestor() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "query": "roadmap",
            "ancestorId": PAGE,
            "limit": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": "t1", "isNavigable": true, "score": 12.5,
                  "highlight": { "text": "the <gzkNfoUU>roadmap</gzkNfoUU>" } }
            ],
            "total": 1,
            "recordMap": {
                "block": { "t1": { "value": { "id": "t1", "type": "page" } } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = store(&server).search("roadmap", Some(PAGE)).await.unwrap();

    assert_eq!(results.total, 1);
    assert_eq!(results.results.len(), 1);
    assert_eq!(results.results[0].id, "t1");
    assert!(results.results[0].is_navigable);
    assert!(results.record_map.block_by_id("t1").is_some());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = ClientConfig::default().with_base_url("ftp://example.test");
    assert!(matches!(
        HttpDocumentStore::new(config),
        Err(Error::Config(_))
    ));
}
