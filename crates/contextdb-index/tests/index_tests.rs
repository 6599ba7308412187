use httpmock::prelude::*;

use contextdb_core::config::IndexConfig;
use contextdb_core::filter::{Condition, Filter};
use contextdb_core::traits::VectorIndex;
use contextdb_core::types::{DistanceMetric, IndexPoint, PointPayload};
use contextdb_core::Error;
use contextdb_index::{point_id, QdrantIndex};

fn index_for(server: &MockServer) -> QdrantIndex {
    QdrantIndex::new(&IndexConfig {
        url: server.base_url(),
        collection: "chunks".to_string(),
        timeout_secs: 5,
    })
    .expect("client")
}

fn payload(document_id: &str, chunk_index: usize) -> PointPayload {
    PointPayload {
        document_id: document_id.to_string(),
        chunk_index,
        text: "chunk text".to_string(),
        title: "Doc title".to_string(),
        char_count: 10,
        position: 0.0,
        total_chunks: 1,
        extra: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn ensure_collection_is_idempotent_when_present() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/collections/chunks");
        then.status(200).json_body(serde_json::json!({"result": {"status": "green"}}));
    });
    let create = server.mock(|when, then| {
        when.method(PUT).path("/collections/chunks");
        then.status(200).json_body(serde_json::json!({"result": true}));
    });

    index_for(&server)
        .ensure_collection(768, DistanceMetric::Cosine)
        .await
        .expect("ensure");
    lookup.assert();
    create.assert_hits(0);
}

#[tokio::test]
async fn ensure_collection_creates_when_absent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/collections/chunks");
        then.status(404);
    });
    let create = server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/chunks")
            .json_body(serde_json::json!({
                "vectors": {"size": 768, "distance": "Cosine"}
            }));
        then.status(200).json_body(serde_json::json!({"result": true}));
    });

    index_for(&server)
        .ensure_collection(768, DistanceMetric::Cosine)
        .await
        .expect("ensure");
    create.assert();
}

#[tokio::test]
async fn ensure_collection_tolerates_concurrent_creation() {
    // two callers both saw 404; the loser's create comes back 409
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/collections/chunks");
        then.status(404);
    });
    let create = server.mock(|when, then| {
        when.method(PUT).path("/collections/chunks");
        then.status(409).json_body(serde_json::json!({
            "status": {"error": "Collection `chunks` already exists!"},
            "time": 0.0
        }));
    });

    index_for(&server)
        .ensure_collection(768, DistanceMetric::Cosine)
        .await
        .expect("losing the create race must not fail the caller");
    create.assert();
}

#[tokio::test]
async fn upsert_ships_sanitized_points() {
    let server = MockServer::start();
    let id = point_id("doc-1", 0);
    let upsert = server.mock(|when, then| {
        when.method(PUT)
            .path("/collections/chunks/points")
            .query_param("wait", "true")
            .json_body_partial(format!(
                r#"{{"points": [{{"id": {id}, "payload": {{"document_id": "doc-1"}}}}]}}"#
            ));
        then.status(200).json_body(serde_json::json!({"result": {"status": "ok"}}));
    });

    let point = IndexPoint {
        id,
        vector: vec![0.1, 0.2],
        payload: payload("doc-1", 0),
    };
    index_for(&server).upsert(vec![point]).await.expect("upsert");
    upsert.assert();
}

#[tokio::test]
async fn search_returns_descending_results_with_payload_echo() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/collections/chunks/points/search");
        then.status(200).json_body(serde_json::json!({
            "result": [
                {"id": 11, "score": 0.91, "payload": {
                    "document_id": "doc-1", "chunk_index": 0, "text": "first",
                    "title": "T", "char_count": 5, "position": 0.0, "total_chunks": 2,
                    "section": "intro"
                }},
                {"id": 12, "score": 0.40, "payload": {
                    "document_id": "doc-1", "chunk_index": 1, "text": "second",
                    "title": "T", "char_count": 6, "position": 0.5, "total_chunks": 2
                }}
            ]
        }));
    });

    let results = index_for(&server)
        .search(&[0.1, 0.2], 5, Some(Filter::for_document(&"doc-1".to_string())))
        .await
        .expect("search");
    assert_eq!(results.len(), 2);
    assert!(results[0].score > results[1].score);
    assert_eq!(results[0].payload.text, "first");
    // unknown payload keys land in `extra`
    assert_eq!(
        results[0].payload.extra.get("section"),
        Some(&serde_json::json!("intro"))
    );
}

#[tokio::test]
async fn search_sends_typed_filter_clauses() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(POST)
            .path("/collections/chunks/points/search")
            .json_body_partial(
                r#"{"filter": {"must": [{"key": "document_id", "match": {"value": "doc-9"}},
                                         {"key": "chunk_index", "match": {"value": 4}}]}}"#,
            );
        then.status(200).json_body(serde_json::json!({"result": []}));
    });

    let filter = Filter::new()
        .must(Condition::equals("document_id", "doc-9"))
        .must(Condition::equals("chunk_index", 4i64));
    index_for(&server)
        .search(&[0.5], 3, Some(filter))
        .await
        .expect("search");
    search.assert();
}

#[tokio::test]
async fn delete_with_empty_filter_fails_without_touching_backend() {
    let server = MockServer::start();
    let any = server.mock(|_when, then| {
        then.status(200);
    });

    let err = index_for(&server)
        .delete_by_filter(Filter::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Index(_)), "got {err:?}");
    any.assert_hits(0);
}

#[tokio::test]
async fn delete_by_filter_reports_scoped_count() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/collections/chunks/points/count");
        then.status(200).json_body(serde_json::json!({"result": {"count": 7}}));
    });
    let delete = server.mock(|when, then| {
        when.method(POST)
            .path("/collections/chunks/points/delete")
            .query_param("wait", "true");
        then.status(200).json_body(serde_json::json!({"result": {"status": "ok"}}));
    });

    let deleted = index_for(&server)
        .delete_by_filter(Filter::for_document(&"doc-1".to_string()))
        .await
        .expect("delete");
    assert_eq!(deleted, 7);
    delete.assert();
}

#[tokio::test]
async fn backend_failure_is_index_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/collections/chunks/points/search");
        then.status(503).body("overloaded");
    });

    let err = index_for(&server)
        .search(&[0.1], 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Index(_)));
}

#[tokio::test]
async fn count_applies_optional_filter() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/collections/chunks/points/count")
            .json_body_partial(r#"{"exact": true}"#);
        then.status(200).json_body(serde_json::json!({"result": {"count": 3}}));
    });

    let count = index_for(&server).count(None).await.expect("count");
    assert_eq!(count, 3);
}
