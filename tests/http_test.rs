//! HTTP boundary tests: envelope intake and health

mod fixtures;
mod helpers;

use async_ocr_worker::models::outcome::{Outcome, ProcessingSummary};
use async_ocr_worker::routes;
use fixtures::*;
use helpers::*;
use serde_json::json;

async fn serve(harness: &Harness) -> String {
    let app = routes::router(harness.state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_health_check() {
    let harness = Harness::new(FakeRecognition::new());
    let base_url = serve(&harness).await;

    let response = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_post_object_create_then_timer() {
    let harness = Harness::new(FakeRecognition::new().with_tokens(&["op-123"]));
    write_object(&harness.bucket_root(), "inbox/photo.jpg", 2048);
    let base_url = serve(&harness).await;
    let client = reqwest::Client::new();

    let envelope = json!({
        "messages": [{
            "event_metadata": {
                "event_id": "e1",
                "event_type": "yandex.cloud.events.storage.ObjectCreate",
                "created_at": "2024-01-01T00:00:00Z"
            },
            "details": {"bucket_id": BUCKET, "object_id": "inbox/photo.jpg"}
        }]
    });
    let summary: ProcessingSummary = client
        .post(format!("{}/", base_url))
        .json(&envelope)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary.message, "OCR recognition tasks submitted");
    assert_eq!(summary.results[0].operation_id(), Some("op-123"));

    harness
        .ocr
        .script("op-123", Scripted::Done(single_page("Hello World")));
    let timer = json!({
        "messages": [{
            "event_metadata": {"event_type": "yandex.cloud.events.serverless.triggers.TimerMessage"},
            "details": {"trigger_id": "t1"}
        }]
    });
    let body: serde_json::Value = client
        .post(format!("{}/", base_url))
        .json(&timer)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["message"], "Processed pending OCR operations");
    assert_eq!(body["results"][0]["status"], "completed");
    assert_eq!(body["results"][0]["operation_id"], "op-123");
    let saved_to = body["results"][0]["saved_to"].as_str().unwrap();
    assert!(saved_to.ends_with("photo.jpg.txt"));
    assert!(std::fs::read_to_string(saved_to).unwrap().contains("Hello World"));
}

#[tokio::test]
async fn test_unknown_event_returns_empty_results() {
    let harness = Harness::new(FakeRecognition::new());
    let base_url = serve(&harness).await;

    let summary: ProcessingSummary = reqwest::Client::new()
        .post(format!("{}/", base_url))
        .json(&json!({"messages": [{"event_metadata": {"event_type": "other"}}]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary.results, Vec::<Outcome>::new());
}
