use std::time::Duration;

use httpmock::prelude::*;
use reqwest::Client;
use serde_json::json;
use xenofont::FallbackRequester;
use xenofont::config::LlmConfig;
use xenofont::error::TIMEOUT_APOLOGY;
use xenofont::fallback::NO_ANSWER;
use xenofont::transport::generate_url;

fn requester(base_url: &str, timeout: Duration) -> FallbackRequester {
    let llm = LlmConfig::default();
    FallbackRequester::new(
        Client::new(),
        generate_url(base_url).unwrap(),
        llm.fallback_profile(),
        timeout,
    )
}

#[tokio::test]
async fn asks_without_streaming_and_cleans_markup() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate").json_body_partial(
                json!({
                    "stream": false,
                    "options": {"num_predict": 300, "temperature": 0.3}
                })
                .to_string(),
            );
            then.status(200).json_body(json!({
                "response": "**Москва** это `столица`\n\nРоссии.",
                "done": true
            }));
        })
        .await;

    let answer = requester(&server.base_url(), Duration::from_secs(5))
        .request("столица России")
        .await;

    mock.assert_async().await;
    assert_eq!(answer, "Москва это столица России.");
}

#[tokio::test]
async fn missing_response_field_gives_placeholder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200).json_body(json!({"done": true}));
        })
        .await;

    let answer = requester(&server.base_url(), Duration::from_secs(5))
        .request("q")
        .await;
    assert_eq!(answer, NO_ANSWER);
}

#[tokio::test]
async fn error_status_is_spoken() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(503).body("overloaded");
        })
        .await;

    let answer = requester(&server.base_url(), Duration::from_secs(5))
        .request("q")
        .await;
    assert_eq!(answer, "Ошибка API: 503");
}

#[tokio::test]
async fn slow_answer_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({"response": "поздно", "done": true}));
        })
        .await;

    let answer = requester(&server.base_url(), Duration::from_millis(200))
        .request("q")
        .await;
    assert_eq!(answer, TIMEOUT_APOLOGY);
}

#[tokio::test]
async fn other_failures_are_truncated() {
    let answer = requester("http://127.0.0.1:1", Duration::from_secs(5))
        .request("q")
        .await;
    assert!(answer.starts_with("Ошибка: "), "{answer}");
    assert!(answer.chars().count() <= "Ошибка: ".chars().count() + 50);
}
