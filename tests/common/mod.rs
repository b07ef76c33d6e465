//! Shared test helpers.
#![allow(dead_code)]

use botpro::config::AppConfig;
use botpro::domain::entities::credentials::Credentials;
use botpro::domain::entities::session::Session;
use botpro::domain::error::DomainError;
use botpro::domain::ports::broker::{BrokerClient, OptionChainRequest, QuoteRequest};
use botpro::BotPro;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const SEED: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

pub fn credentials() -> Credentials {
    Credentials::new("api-key", "A100", "1234", SEED)
}

pub fn config(dir: &TempDir) -> AppConfig {
    AppConfig {
        db_path: dir.path().join("knowledge.db").to_string_lossy().into_owned(),
        login_timeout: Duration::from_secs(2),
        store_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    }
}

/// A store-only instance; the broker is never reached.
pub fn setup() -> (TempDir, BotPro) {
    let (dir, app, _) = setup_with_broker(Credentials::default(), ScriptedBroker::new());
    (dir, app)
}

pub fn setup_with_broker(
    credentials: Credentials,
    broker: ScriptedBroker,
) -> (TempDir, BotPro, Arc<ScriptedBroker>) {
    let dir = tempfile::tempdir().unwrap();
    let broker = Arc::new(broker);
    let app = BotPro::with_providers(&config(&dir), credentials, broker.clone()).unwrap();
    (dir, app, broker)
}

/// Broker double that counts calls and fails on demand.
#[derive(Default)]
pub struct ScriptedBroker {
    pub login_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub fail_login: AtomicBool,
    pub expire_balance: AtomicBool,
    pub login_delay: Duration,
    pub balance_delay: Duration,
}

impl ScriptedBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let broker = Self::default();
        broker.fail_login.store(true, Ordering::SeqCst);
        broker
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            login_delay: delay,
            ..Self::default()
        }
    }

    pub fn with_balance_delay(mut self, delay: Duration) -> Self {
        self.balance_delay = delay;
        self
    }

    pub fn logins(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BrokerClient for ScriptedBroker {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn login(&self, credentials: &Credentials, otp: &str) -> Result<Session, DomainError> {
        let n = self.login_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(DomainError::Session("Invalid totp".into()));
        }
        assert_eq!(otp.len(), 6);
        Ok(Session::new(
            format!("access-{}-{n}", credentials.client_id),
            format!("refresh-{n}"),
            format!("feed-{n}"),
        ))
    }

    async fn logout(&self, _credentials: &Credentials, _session: &Session) -> Result<(), DomainError> {
        Ok(())
    }

    async fn balance(&self, _session: &Session) -> Result<serde_json::Value, DomainError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if !self.balance_delay.is_zero() {
            tokio::time::sleep(self.balance_delay).await;
        }
        if self.expire_balance.swap(false, Ordering::SeqCst) {
            return Err(DomainError::SessionExpired("Invalid Token (AG8001)".into()));
        }
        Ok(serde_json::json!({ "net": "5000.00" }))
    }

    async fn ltp(&self, _session: &Session, quote: &QuoteRequest) -> Result<serde_json::Value, DomainError> {
        Ok(serde_json::json!({ "tradingsymbol": quote.tradingsymbol, "ltp": 21500.5 }))
    }

    async fn option_chain(
        &self,
        _session: &Session,
        request: &OptionChainRequest,
    ) -> Result<serde_json::Value, DomainError> {
        Ok(serde_json::json!({ "name": request.name, "strikes": [] }))
    }
}
