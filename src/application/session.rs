use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::session::Session;
use crate::domain::error::DomainError;
use crate::domain::ports::broker::{BrokerClient, OptionChainRequest, QuoteRequest};
use crate::domain::values::totp;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Result of a login attempt. The manager reports failures here instead of
/// returning an error so callers can always render something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectOutcome {
    pub connected: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectOutcome {
    fn connected(session: &Session, message: impl Into<String>) -> Self {
        Self {
            connected: true,
            message: message.into(),
            token_preview: Some(session.token_preview()),
            error: None,
        }
    }

    fn failed(err: &DomainError) -> Self {
        Self {
            connected: false,
            message: err.to_string(),
            token_preview: None,
            error: Some(err.kind().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub connected: bool,
    pub broker: String,
    pub created_at: Option<DateTime<Utc>>,
    pub token_preview: Option<String>,
    pub feed_token_preview: Option<String>,
}

/// Owns the brokerage credentials and the live session derived from them.
///
/// `login_lock` stays held for the whole login round-trip, so concurrent
/// triggers never issue two logins at once. The session itself sits behind a
/// separate short-held lock that is only written once a login resolves, so
/// status reads never wait on the network.
pub struct SessionManager {
    credentials: Credentials,
    broker: Arc<dyn BrokerClient>,
    login_lock: Mutex<()>,
    session: RwLock<Option<Session>>,
    call_timeout: Duration,
}

impl SessionManager {
    pub fn new(credentials: Credentials, broker: Arc<dyn BrokerClient>, call_timeout: Duration) -> Self {
        Self {
            credentials,
            broker,
            login_lock: Mutex::new(()),
            session: RwLock::new(None),
            call_timeout,
        }
    }

    /// Logs in again, replacing any existing session.
    pub async fn connect(&self) -> ConnectOutcome {
        let _login = self.login_lock.lock().await;
        match self.login_and_store().await {
            Ok(session) => ConnectOutcome::connected(&session, "connected"),
            Err(e) => ConnectOutcome::failed(&e),
        }
    }

    /// Logs in only if there is no session yet.
    pub async fn ensure_connected(&self) -> ConnectOutcome {
        match self.active_session().await {
            Ok(session) => ConnectOutcome::connected(&session, "connected"),
            Err(e) => ConnectOutcome::failed(&e),
        }
    }

    pub fn get_feed_token(&self) -> Result<String, DomainError> {
        self.current()
            .map(|s| s.feed_token)
            .ok_or_else(|| DomainError::Session("not connected".into()))
    }

    pub fn status(&self) -> SessionStatus {
        let current = self.current();
        SessionStatus {
            connected: current.is_some(),
            broker: self.broker.name().to_string(),
            created_at: current.as_ref().map(|s| s.created_at),
            token_preview: current.as_ref().map(Session::token_preview),
            feed_token_preview: current.as_ref().map(Session::feed_token_preview),
        }
    }

    /// Clears the session. The broker is told about it when possible, but the
    /// local session is dropped even if that call fails.
    pub async fn logout(&self) -> Result<(), DomainError> {
        let _login = self.login_lock.lock().await;
        let Some(session) = self.store(None) else {
            return Ok(());
        };
        let result = self
            .with_timeout("logout", self.broker.logout(&self.credentials, &session))
            .await;
        match &result {
            Ok(()) => info!(broker = self.broker.name(), "Logged out"),
            Err(e) => warn!(broker = self.broker.name(), error = %e, "Broker logout failed, session cleared locally"),
        }
        result
    }

    pub async fn balance(&self) -> Result<serde_json::Value, DomainError> {
        let session = self.active_session().await?;
        let result = self.with_timeout("balance", self.broker.balance(&session)).await;
        self.observe(result, &session)
    }

    pub async fn ltp(&self, quote: &QuoteRequest) -> Result<serde_json::Value, DomainError> {
        let session = self.active_session().await?;
        let result = self.with_timeout("ltp", self.broker.ltp(&session, quote)).await;
        self.observe(result, &session)
    }

    pub async fn option_chain(&self, request: &OptionChainRequest) -> Result<serde_json::Value, DomainError> {
        let session = self.active_session().await?;
        let result = self
            .with_timeout("option chain", self.broker.option_chain(&session, request))
            .await;
        self.observe(result, &session)
    }

    async fn active_session(&self) -> Result<Session, DomainError> {
        if let Some(session) = self.current() {
            return Ok(session);
        }
        let _login = self.login_lock.lock().await;
        // Another caller may have finished logging in while we waited.
        if let Some(session) = self.current() {
            return Ok(session);
        }
        self.login_and_store().await
    }

    fn current(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the stored session, returning the previous one.
    fn store(&self, session: Option<Session>) -> Option<Session> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, session)
    }

    /// Caller must hold `login_lock`.
    async fn login_and_store(&self) -> Result<Session, DomainError> {
        match self.login().await {
            Ok(session) => {
                info!(
                    broker = self.broker.name(),
                    client_id = %self.credentials.client_id,
                    token = %session.token_preview(),
                    "Broker login succeeded"
                );
                self.store(Some(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!(
                    broker = self.broker.name(),
                    client_id = %self.credentials.client_id,
                    error = %e,
                    "Broker login failed"
                );
                self.store(None);
                Err(e)
            }
        }
    }

    async fn login(&self) -> Result<Session, DomainError> {
        let missing = self.credentials.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::Session(format!(
                "missing credentials: {}",
                missing.join(", ")
            )));
        }
        let otp = totp::generate_now(&self.credentials.totp_seed)
            .map_err(|e| DomainError::Session(format!("cannot generate OTP: {e}")))?;
        self.with_timeout("login", self.broker.login(&self.credentials, &otp))
            .await
    }

    async fn with_timeout<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Timeout(format!(
                "broker {what} exceeded {}s",
                self.call_timeout.as_secs_f64()
            ))),
        }
    }

    /// Drops the session when the broker says the token used for `result` is
    /// no longer valid, so the next call logs in again. A session that was
    /// replaced while the call was in flight is left alone.
    fn observe<T>(&self, result: Result<T, DomainError>, used: &Session) -> Result<T, DomainError> {
        if let Err(DomainError::SessionExpired(msg)) = &result {
            let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
            if guard.as_ref().map(|s| &s.access_token) == Some(&used.access_token) {
                warn!(broker = self.broker.name(), error = %msg, "Session expired, clearing");
                *guard = None;
            }
        }
        result
    }
}
