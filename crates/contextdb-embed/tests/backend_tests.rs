use httpmock::prelude::*;

use contextdb_core::config::EmbeddingConfig;
use contextdb_core::settings::EmbeddingSettings;
use contextdb_core::traits::{BackendSelector, EmbeddingBackend};
use contextdb_core::Error;
use contextdb_embed::{BackendFactory, OllamaBackend, OpenAiBackend};

fn config_for(server: &MockServer) -> EmbeddingConfig {
    EmbeddingConfig {
        ollama_url: server.base_url(),
        openai_url: server.base_url(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
    }
}

fn settings(provider: &str) -> EmbeddingSettings {
    EmbeddingSettings {
        provider: provider.to_string(),
        model: "test-model".to_string(),
        dimension: 4,
    }
}

#[tokio::test]
async fn ollama_embed_round_trip() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/embeddings")
            .json_body(serde_json::json!({"model": "test-model", "prompt": "hello"}));
        then.status(200)
            .json_body(serde_json::json!({"embedding": [0.1, 0.2, 0.3, 0.4]}));
    });

    let backend = OllamaBackend::new(&config_for(&server)).expect("backend");
    let vector = backend.embed("test-model", "hello").await.expect("embed");
    assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);
    mock.assert();
}

#[tokio::test]
async fn ollama_empty_embedding_is_provider_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(serde_json::json!({"embedding": []}));
    });

    let backend = OllamaBackend::new(&config_for(&server)).expect("backend");
    let err = backend.embed("test-model", "hello").await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)), "got {err:?}");
}

#[tokio::test]
async fn ollama_non_2xx_is_provider_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(500).body("model blew up");
    });

    let backend = OllamaBackend::new(&config_for(&server)).expect("backend");
    let err = backend.embed("test-model", "hello").await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn ollama_lists_model_tags() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tags");
        then.status(200).json_body(serde_json::json!({
            "models": [{"name": "nomic-embed-text"}, {"name": "all-minilm"}]
        }));
    });

    let backend = OllamaBackend::new(&config_for(&server)).expect("backend");
    let models = backend.list_models().await.expect("list");
    assert_eq!(models, vec!["nomic-embed-text", "all-minilm"]);
}

#[tokio::test]
async fn openai_embed_sends_bearer_and_parses_rows() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/embeddings")
            .header("authorization", "Bearer test-key");
        then.status(200).json_body(serde_json::json!({
            "data": [{"embedding": [1.0, 0.0, 0.0, 0.0], "index": 0}],
            "model": "test-model"
        }));
    });

    let backend = OpenAiBackend::new(&config_for(&server)).expect("backend");
    let vector = backend.embed("test-model", "hello").await.expect("embed");
    assert_eq!(vector.len(), 4);
    mock.assert();
}

#[tokio::test]
async fn openai_zero_rows_is_provider_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200).json_body(serde_json::json!({"data": []}));
    });

    let backend = OpenAiBackend::new(&config_for(&server)).expect("backend");
    let err = backend.embed("test-model", "hello").await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn openai_lists_models() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/models");
        then.status(200).json_body(serde_json::json!({
            "data": [{"id": "text-embedding-3-small"}]
        }));
    });

    let backend = OpenAiBackend::new(&config_for(&server)).expect("backend");
    let models = backend.list_models().await.expect("list");
    assert_eq!(models, vec!["text-embedding-3-small"]);
}

#[test]
fn factory_selects_by_provider_string() {
    let factory = BackendFactory::new(EmbeddingConfig::default());
    assert_eq!(factory.select(&settings("stub")).expect("stub").provider(), "stub");
    assert_eq!(
        factory.select(&settings("ollama")).expect("ollama").provider(),
        "ollama"
    );
    assert_eq!(
        factory.select(&settings("openai")).expect("openai").provider(),
        "openai"
    );
}

#[test]
fn factory_rejects_unknown_provider() {
    let factory = BackendFactory::new(EmbeddingConfig::default());
    let err = factory.select(&settings("cursed-backend")).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}
