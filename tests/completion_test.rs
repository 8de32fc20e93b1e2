//! Integration tests for the completion client against a mocked OpenRouter API.

use scriba::OpenRouterClient;
use scriba::error::ApiError;
use scriba::tokens::{MESSAGE_OVERHEAD_TOKENS, estimate_tokens};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a model catalog with a single model on the mock server.
async fn mount_catalog(server: &MockServer, id: &str, context_length: u64) {
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": id, "context_length": context_length}]
        })))
        .mount(server)
        .await;
}

/// Mount a successful completion response with the given content.
async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": content}}]
        })))
        .mount(server)
        .await;
}

/// The JSON body of the last completion request the server received.
async fn last_completion_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.expect("requests recorded");
    let request = requests
        .iter()
        .filter(|r| r.url.path().ends_with("/chat/completions"))
        .next_back()
        .expect("a completion request was sent");
    serde_json::from_slice(&request.body).expect("completion body is JSON")
}

#[tokio::test]
async fn success_returns_generated_text() {
    let server = MockServer::start().await;
    mount_completion(&server, "feat: add parser").await;

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    let result = client
        .generate_completion("qwen/qwen3-30b-a3b:free", "system", "user", None, false)
        .await;

    assert_eq!(result.unwrap(), "feat: add parser");
}

#[tokio::test]
async fn request_carries_bearer_token_and_message_sequence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    client
        .generate_completion("qwen/test", "the system prompt", "the user prompt", Some(0.8), false)
        .await
        .unwrap();

    let body = last_completion_body(&server).await;
    assert_eq!(body["model"], "qwen/test");
    assert_eq!(body["stream"], false);
    assert_eq!(body["temperature"], 0.8);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(
        messages[0]["content"],
        "Parse the following messages as markdown."
    );
    assert_eq!(messages[1]["role"], "system");
    assert_eq!(messages[1]["content"], "the system prompt");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"], "the user prompt");
}

#[tokio::test]
async fn small_input_gets_no_transforms() {
    let server = MockServer::start().await;
    mount_completion(&server, "ok").await;

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    client
        .generate_completion("qwen/test", "short", "tiny", None, false)
        .await
        .unwrap();

    let body = last_completion_body(&server).await;
    assert!(body.get("transforms").is_none());
    assert!(body.get("temperature").is_none());
}

#[tokio::test]
async fn oversized_input_is_trimmed_and_compressed() {
    let server = MockServer::start().await;
    mount_catalog(&server, "test/small-model", 4096).await;
    mount_completion(&server, "feat: huge change").await;

    // 50k-char instruction text and 2k-char task text against a 4096 budget.
    let system = "s".repeat(50_000);
    let user = "u".repeat(2_000);

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    let result = client
        .generate_completion("test/small-model", &system, &user, None, false)
        .await;
    assert_eq!(result.unwrap(), "feat: huge change");

    let body = last_completion_body(&server).await;

    // Compression directive attached
    assert_eq!(body["transforms"], json!(["middle-out"]));

    // The system prompt was trimmed with a visible marker; the small user
    // prompt went through untouched.
    let sent_system = body["messages"][1]["content"].as_str().unwrap();
    let sent_user = body["messages"][2]["content"].as_str().unwrap();
    assert!(sent_system.contains("[...content trimmed due to length constraints...]"));
    assert!(sent_system.len() < system.len());
    assert_eq!(sent_user, user);

    // Combined estimate fits within budget minus formatting overhead.
    let combined = estimate_tokens(sent_system) + estimate_tokens(sent_user);
    assert!(combined <= 4096 - MESSAGE_OVERHEAD_TOKENS);
}

#[tokio::test]
async fn near_budget_input_gets_transforms_without_trimming() {
    let server = MockServer::start().await;
    mount_catalog(&server, "test/small-model", 4096).await;
    mount_completion(&server, "ok").await;

    // ~3800 tokens estimated + 200 overhead: over 90% of 4096 but under it.
    let system = "s".repeat(400);
    let user = "u".repeat(14_800);

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    client
        .generate_completion("test/small-model", &system, &user, None, false)
        .await
        .unwrap();

    let body = last_completion_body(&server).await;
    assert_eq!(body["transforms"], json!(["middle-out"]));
    assert_eq!(body["messages"][1]["content"].as_str().unwrap(), system);
    assert_eq!(body["messages"][2]["content"].as_str().unwrap(), user);
}

#[tokio::test]
async fn context_length_error_is_classified_with_overage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "This endpoint's maximum context length is exceeded: \
                input (5000 tokens) is longer than the model's context length (4096 tokens)."}
        })))
        .mount(&server)
        .await;

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    let err = client
        .generate_completion("openai/gpt-4", "system", "user", None, false)
        .await
        .unwrap_err();

    match err {
        ApiError::ContextLengthExceeded {
            model,
            input_tokens,
            context_length,
            exceeded_by,
            ..
        } => {
            assert_eq!(model, "gpt-4");
            assert_eq!(input_tokens, 5000);
            assert_eq!(context_length, 4096);
            assert_eq!(exceeded_by, 904);
        }
        other => panic!("Expected ContextLengthExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn generic_provider_error_carries_raw_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API key"}
        })))
        .mount(&server)
        .await;

    let client = OpenRouterClient::with_base_url("bad-token", &server.uri());
    let err = client
        .generate_completion("qwen/test", "s", "u", None, false)
        .await
        .unwrap_err();

    match err {
        ApiError::RequestFailed(message) => assert_eq!(message, "Invalid API key"),
        other => panic!("Expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    let err = client
        .generate_completion("qwen/test", "s", "u", None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_connectivity_error() {
    // Nothing listens on port 9 (discard); the connection is refused.
    let client = OpenRouterClient::with_base_url("test-token", "http://127.0.0.1:9");
    let err = client
        .generate_completion("qwen/test", "s", "u", None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Connectivity(_)));
}

#[tokio::test]
async fn stream_flag_is_forwarded() {
    let server = MockServer::start().await;
    mount_completion(&server, "ok").await;

    let client = OpenRouterClient::with_base_url("test-token", &server.uri());
    client
        .generate_completion("qwen/test", "s", "u", None, true)
        .await
        .unwrap();

    let body = last_completion_body(&server).await;
    assert_eq!(body["stream"], true);
}
