//! HTTP generator client against a mock Messages endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streakplan_core::remote::{
    GenerationRequest, GenerativeClient, HttpClientConfig, HttpGenerativeClient, RemoteError,
};

fn client(server: &MockServer) -> HttpGenerativeClient {
    HttpGenerativeClient::new(HttpClientConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
        model: "test-model".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        system: "be brief".into(),
        prompt: "plan my week".into(),
        max_tokens: 256,
    }
}

#[tokio::test]
async fn concatenates_text_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 256,
            "system": "be brief",
            "messages": [{"role": "user", "content": "plan my week"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "{\"streak_habits\": "},
                {"type": "text", "text": "[]}"}
            ],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server).generate(request()).await.unwrap();
    assert_eq!(text, "{\"streak_habits\": []}");
}

#[tokio::test]
async fn error_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client(&server).generate(request()).await.unwrap_err();
    match err {
        RemoteError::Api { status, message } => {
            assert_eq!(status, 529);
            assert_eq!(message, "overloaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn response_without_text_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .mount(&server)
        .await;

    let err = client(&server).generate(request()).await.unwrap_err();
    assert!(matches!(err, RemoteError::EmptyResponse));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client(&server).generate(request()).await.unwrap_err();
    assert_eq!(err.reason(), "invalid_response");
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let client = HttpGenerativeClient::new(HttpClientConfig {
        // Port 9 (discard) is closed on test machines.
        base_url: "http://127.0.0.1:9".into(),
        api_key: "k".into(),
        model: "m".into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let err = client.generate(request()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}
