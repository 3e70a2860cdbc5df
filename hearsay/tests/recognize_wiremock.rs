//! Recognition client tests against a mocked speech backend.

use hearsay::{Error, Recognizer};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn recognize_joins_segments_with_newlines() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "config": {
                "encoding": "WEBM_OPUS",
                "sampleRateHertz": 48000,
                "languageCode": "en-US",
                "audioChannelCount": 2,
                "model": "video"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"alternatives": [{"transcript": "hello"}, {"transcript": "jello"}]},
                {"alternatives": [{"transcript": "world"}]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = Recognizer::with_base_url("test-key", server.uri());
    let transcript = recognizer
        .recognize(b"fake-webm-opus-audio", "en-US")
        .await
        .expect("recognition should succeed");

    assert_eq!(transcript, "hello\nworld");
}

#[tokio::test]
async fn recognize_empty_results_is_empty_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let recognizer = Recognizer::with_base_url("test-key", server.uri());
    let transcript = recognizer
        .recognize(b"silence", "en-US")
        .await
        .expect("zero segments is not an error");

    assert_eq!(transcript, "");
}

#[tokio::test]
async fn recognize_backend_failure_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let recognizer = Recognizer::with_base_url("test-key", server.uri());
    let result = recognizer.recognize(b"audio", "en-US").await;

    assert!(matches!(result, Err(Error::Recognition(_))));
}

#[tokio::test]
async fn recognize_sends_requested_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .and(body_partial_json(json!({
            "config": {"languageCode": "hi-IN"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"alternatives": [{"transcript": "नमस्ते"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = Recognizer::with_base_url("test-key", server.uri());
    let transcript = recognizer.recognize(b"audio", "hi-IN").await.unwrap();

    assert_eq!(transcript, "नमस्ते");
}
