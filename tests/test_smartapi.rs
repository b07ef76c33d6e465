//! SmartAPI adapter against a local mock of the brokerage endpoints.

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use botpro::domain::entities::credentials::Credentials;
use botpro::domain::error::DomainError;
use botpro::domain::ports::broker::{BrokerClient, QuoteRequest};
use botpro::infrastructure::broker::smartapi::SmartApiBroker;
use serde_json::{json, Value};
use std::time::Duration;

async fn mock_login(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let key_ok = headers.get("X-PrivateKey").and_then(|v| v.to_str().ok()) == Some("api-key");
    if key_ok && body["password"] == "1234" && body["totp"].as_str().map(str::len) == Some(6) {
        Json(json!({
            "status": true,
            "message": "SUCCESS",
            "errorcode": "",
            "data": {
                "jwtToken": "Bearer eyJhbGciOiJIUzUxMiJ9.jwt",
                "refreshToken": "refresh-abc",
                "feedToken": "feed-xyz"
            }
        }))
    } else {
        Json(json!({
            "status": false,
            "message": "Invalid totp",
            "errorcode": "AB1050",
            "data": null
        }))
    }
}

async fn mock_rms(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let auth = headers.get("Authorization").and_then(|v| v.to_str().ok());
    if auth != Some("Bearer eyJhbGciOiJIUzUxMiJ9.jwt") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "status": true,
        "message": "SUCCESS",
        "errorcode": "",
        "data": { "net": "9999.00" }
    })))
}

async fn mock_ltp() -> Json<Value> {
    Json(json!({
        "status": false,
        "message": "Invalid Token",
        "errorcode": "AG8001",
        "data": null
    }))
}

async fn spawn_mock() -> String {
    let router = Router::new()
        .route("/rest/auth/angelbroking/user/v1/loginByPassword", post(mock_login))
        .route("/rest/secure/angelbroking/user/v1/getRMS", get(mock_rms))
        .route("/rest/secure/angelbroking/order/v1/getLtpData", post(mock_ltp));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn credentials(password: &str) -> Credentials {
    Credentials::new("api-key", "A100", password, "GEZDGNBVGY3TQOJQ")
}

#[tokio::test]
async fn test_login_and_balance() {
    let base = spawn_mock().await;
    let broker = SmartApiBroker::new(base, "api-key", Duration::from_secs(5));

    let session = broker.login(&credentials("1234"), "123456").await.unwrap();
    assert_eq!(session.access_token, "eyJhbGciOiJIUzUxMiJ9.jwt");
    assert_eq!(session.feed_token, "feed-xyz");

    let balance = broker.balance(&session).await.unwrap();
    assert_eq!(balance["net"], "9999.00");
}

#[tokio::test]
async fn test_login_rejected() {
    let base = spawn_mock().await;
    let broker = SmartApiBroker::new(base, "api-key", Duration::from_secs(5));

    let err = broker.login(&credentials("wrong"), "123456").await.unwrap_err();
    assert!(matches!(err, DomainError::Session(_)));
    assert!(err.to_string().contains("Invalid totp"));
}

#[tokio::test]
async fn test_expired_token_detected() {
    let base = spawn_mock().await;
    let broker = SmartApiBroker::new(base, "api-key", Duration::from_secs(5));
    let session = broker.login(&credentials("1234"), "123456").await.unwrap();

    let quote = QuoteRequest {
        exchange: "NSE".into(),
        tradingsymbol: "NIFTY 50".into(),
        symboltoken: "26000".into(),
    };
    let err = broker.ltp(&session, &quote).await.unwrap_err();
    assert!(matches!(err, DomainError::SessionExpired(_)));

    let stale = botpro::domain::entities::session::Session::new(
        "stale".into(),
        "r".into(),
        "f".into(),
    );
    let err = broker.balance(&stale).await.unwrap_err();
    assert!(matches!(err, DomainError::SessionExpired(_)));
}

#[tokio::test]
async fn test_unreachable_broker_is_session_error() {
    let broker = SmartApiBroker::new("http://127.0.0.1:9", "api-key", Duration::from_secs(2));
    let err = broker.login(&credentials("1234"), "123456").await.unwrap_err();
    assert!(matches!(err, DomainError::Session(_) | DomainError::Timeout(_)));
}
