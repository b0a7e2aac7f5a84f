use httpmock::prelude::*;
use serde_json::json;
use tracing_test::traced_test;
use xenofont::Responder;
use xenofont::config::LlmConfig;
use xenofont::error::TIMEOUT_APOLOGY;
use xenofont::mouth::LoggingMouth;
use xenofont::responder::THINKING;

fn config(base_url: String) -> LlmConfig {
    LlmConfig {
        base_url,
        request_timeout_secs: 1,
        idle_timeout_secs: 1,
        fallback_timeout_secs: 5,
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn streamed_answer_is_spoken_without_fallback() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let streamed = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"stream":true}"#);
            then.status(200).body(concat!(
                "{\"response\":\"Сейчас лето. \",\"done\":false}\n",
                "{\"response\":\"Жарко!\",\"done\":true}\n",
            ));
        })
        .await;
    let single = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"stream":false}"#);
            then.status(200).json_body(json!({"response": "не нужно"}));
        })
        .await;

    let responder = Responder::from_config(&config(server.base_url()))?;
    let (mouth, log) = LoggingMouth::new();
    let delivery = responder.respond("какое время года", &mouth).await;

    streamed.assert_async().await;
    single.assert_hits_async(0).await;
    assert_eq!(delivery.sentences, 2);
    assert!(!delivery.used_fallback);
    assert_eq!(log.phrases(), vec![THINKING, "Сейчас лето.", "Жарко!"]);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn stalled_stream_falls_back_to_single_request() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"stream":true}"#);
            then.status(200)
                .delay(std::time::Duration::from_secs(3))
                .body("{\"response\":\"Поздно.\",\"done\":true}\n");
        })
        .await;
    let single = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"stream":false}"#);
            then.status(200)
                .json_body(json!({"response": "Ответ *без* разметки.", "done": true}));
        })
        .await;

    let responder = Responder::from_config(&config(server.base_url()))?;
    let (mouth, log) = LoggingMouth::new();
    let delivery = responder.respond("вопрос", &mouth).await;

    single.assert_async().await;
    assert!(delivery.used_fallback);
    assert_eq!(delivery.sentences, 0);
    assert_eq!(
        log.phrases(),
        vec![THINKING, TIMEOUT_APOLOGY, "Ответ без разметки."]
    );
    assert!(logs_contain("stream gave no content"));
    Ok(())
}

#[tokio::test]
async fn empty_stream_falls_back() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"stream":true}"#);
            then.status(200)
                .body("{\"response\":\"  \",\"done\":false}\n{\"response\":\"\",\"done\":true}\n");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/generate")
                .json_body_partial(r#"{"stream":false}"#);
            then.status(200).json_body(json!({"response": "Запасной ответ."}));
        })
        .await;

    let responder = Responder::from_config(&config(server.base_url()))?;
    let (mouth, log) = LoggingMouth::new();
    let delivery = responder.respond("вопрос", &mouth).await;

    assert!(delivery.used_fallback);
    assert_eq!(log.last().as_deref(), Some("Запасной ответ."));
    assert_eq!(log.phrases().len(), 2);
    Ok(())
}

#[test]
fn rejects_unparseable_base_url() {
    let cfg = LlmConfig {
        base_url: "not a url".into(),
        ..LlmConfig::default()
    };
    assert!(Responder::from_config(&cfg).is_err());
}
