mod common;

use botpro::server::{create_router, ApiState};
use botpro::BotPro;
use common::{credentials, setup_with_broker, ScriptedBroker};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::sync::Arc;

async fn spawn(app: BotPro) -> String {
    let router = create_router(ApiState::new(Arc::new(app)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn upload(text: &str) -> Form {
    Form::new().part("file", Part::text(text.to_string()).file_name("trades.csv"))
}

#[tokio::test]
async fn test_health_is_independent_of_session() {
    let (_dir, app, _broker) = setup_with_broker(credentials(), ScriptedBroker::failing());
    let base = spawn(app).await;
    let client = reqwest::Client::new();

    let connect = client.post(format!("{base}/connect")).send().await.unwrap();
    assert_eq!(connect.status(), 502);
    let body: Value = connect.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["connected"], false);

    let health = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(health.status(), 200);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ingest_then_query() {
    let (_dir, app) = common::setup();
    let base = spawn(app).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/ingest"))
        .multipart(upload("AAPL bought at 100\n\nMSFT sold at 200\n"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["lines"], 2);

    let resp = client
        .post(format!("{base}/query"))
        .json(&serde_json::json!({ "q": "how did I do?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["sources"],
        serde_json::json!(["MSFT sold at 200", "AAPL bought at 100"])
    );
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("how did I do?"));
    assert!(answer.contains("AAPL bought at 100"));
}

#[tokio::test]
async fn test_ingest_csv_alias_with_source() {
    let (_dir, app) = common::setup();
    let base = spawn(app).await;
    let client = reqwest::Client::new();

    let form = upload("note one\nnote two").text("source", "journal");
    let resp = client
        .post(format!("{base}/ingest/csv"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let stats: Value = client
        .get(format!("{base}/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total_documents"], 2);
    assert_eq!(stats["by_source"][0][0], "journal");
}

#[tokio::test]
async fn test_ingest_without_file_is_bad_request() {
    let (_dir, app) = common::setup();
    let base = spawn(app).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/ingest"))
        .multipart(Form::new().text("source", "trades"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_query_missing_q_is_bad_request() {
    let (_dir, app) = common::setup();
    let base = spawn(app).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/query"))
        .json(&serde_json::json!({ "question": "wrong field" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_recent_and_search_endpoints() {
    let (_dir, app) = common::setup();
    app.ingest("trades", "AAPL bought at 100\nMSFT sold at 200\nAAPL sold at 120").unwrap();
    let base = spawn(app).await;
    let client = reqwest::Client::new();

    let recent: Value = client
        .get(format!("{base}/recent?n=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recent.as_array().unwrap().len(), 2);
    assert_eq!(recent[0]["text"], "AAPL sold at 120");

    let resp = client.get(format!("{base}/recent?n=0")).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    let hits: Value = client
        .get(format!("{base}/search?q=MSFT"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let resp = client.get(format!("{base}/search")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_session_endpoints() {
    let (_dir, app, broker) = setup_with_broker(credentials(), ScriptedBroker::new());
    let base = spawn(app).await;
    let client = reqwest::Client::new();

    let status: Value = client
        .get(format!("{base}/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["connected"], false);
    assert_eq!(broker.logins(), 0);

    let balance = client.get(format!("{base}/balance")).send().await.unwrap();
    assert_eq!(balance.status(), 200);
    let body: Value = balance.json().await.unwrap();
    assert_eq!(body["data"]["net"], "5000.00");

    let connect: Value = client
        .get(format!("{base}/connect"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(connect["status"], "ok");
    assert_eq!(connect["connected"], true);
    let preview = connect["token_preview"].as_str().unwrap();
    assert!(preview.ends_with("..."));
    assert_eq!(broker.logins(), 2);

    let resp = client
        .post(format!("{base}/ltp"))
        .json(&serde_json::json!({
            "exchange": "NSE",
            "tradingsymbol": "NIFTY 50",
            "symboltoken": "26000"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let status: Value = client
        .get(format!("{base}/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["connected"], false);
}
