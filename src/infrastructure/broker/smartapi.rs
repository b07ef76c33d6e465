use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::session::Session;
use crate::domain::error::DomainError;
use crate::domain::ports::broker::{BrokerClient, OptionChainRequest, QuoteRequest};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://apiconnect.angelone.in";

const LOGIN_PATH: &str = "/rest/auth/angelbroking/user/v1/loginByPassword";
const LOGOUT_PATH: &str = "/rest/secure/angelbroking/user/v1/logout";
const RMS_PATH: &str = "/rest/secure/angelbroking/user/v1/getRMS";
const LTP_PATH: &str = "/rest/secure/angelbroking/order/v1/getLtpData";
const OPTION_GREEK_PATH: &str = "/rest/secure/angelbroking/marketData/v1/optionGreek";

/// Error codes SmartAPI uses for a missing, invalid or expired JWT.
const EXPIRED_TOKEN_CODES: &[&str] = &["AG8001", "AG8002", "AG8003"];

/// Angel One SmartAPI REST client.
pub struct SmartApiBroker {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    clientcode: &'a str,
    password: &'a str,
    totp: &'a str,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    clientcode: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    jwt_token: String,
    refresh_token: String,
    feed_token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errorcode: Option<String>,
    data: Option<T>,
}

impl SmartApiBroker {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("botpro/0.1")
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_headers(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-UserType", "USER")
            .header("X-SourceID", "WEB")
            .header("X-ClientLocalIP", "127.0.0.1")
            .header("X-ClientPublicIP", "127.0.0.1")
            .header("X-MACAddress", "00:00:00:00:00:00")
            .header("X-PrivateKey", &self.api_key)
    }

    fn authorized(&self, req: RequestBuilder, session: &Session) -> RequestBuilder {
        self.with_headers(req).bearer_auth(&session.access_token)
    }

    /// Sends a request and unwraps the SmartAPI `{status, message, errorcode, data}` envelope.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<Option<T>, DomainError> {
        let resp = req.send().await.map_err(|e| request_error(what, e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::SessionExpired(format!("SmartAPI {what} {status}: {body}")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Session(format!("SmartAPI {what} {status}: {body}")));
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| DomainError::Session(format!("SmartAPI {what} parse error: {e}")))?;
        if !envelope.status {
            let code = envelope.errorcode.unwrap_or_default();
            let message = envelope.message.unwrap_or_else(|| "no message".into());
            let detail = format!("SmartAPI {what} rejected: {message} ({code})");
            if EXPIRED_TOKEN_CODES.contains(&code.as_str()) {
                return Err(DomainError::SessionExpired(detail));
            }
            return Err(DomainError::Session(detail));
        }
        Ok(envelope.data)
    }
}

fn request_error(what: &str, e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::Timeout(format!("SmartAPI {what}: {e}"))
    } else {
        DomainError::Session(format!("SmartAPI {what} request failed: {e}"))
    }
}

fn strip_bearer(token: String) -> String {
    match token.strip_prefix("Bearer ") {
        Some(rest) => rest.to_string(),
        None => token,
    }
}

#[async_trait]
impl BrokerClient for SmartApiBroker {
    fn name(&self) -> &str {
        "smartapi"
    }

    async fn login(&self, credentials: &Credentials, otp: &str) -> Result<Session, DomainError> {
        let req = self.with_headers(self.client.post(self.url(LOGIN_PATH))).json(&LoginRequest {
            clientcode: &credentials.client_id,
            password: &credentials.password,
            totp: otp,
        });
        let data: LoginData = self
            .send(req, "login")
            .await?
            .ok_or_else(|| DomainError::Session("SmartAPI login returned no tokens".into()))?;

        Ok(Session::new(
            strip_bearer(data.jwt_token),
            data.refresh_token,
            data.feed_token,
        ))
    }

    async fn logout(&self, credentials: &Credentials, session: &Session) -> Result<(), DomainError> {
        let req = self
            .authorized(self.client.post(self.url(LOGOUT_PATH)), session)
            .json(&LogoutRequest {
                clientcode: &credentials.client_id,
            });
        self.send::<serde_json::Value>(req, "logout").await?;
        Ok(())
    }

    async fn balance(&self, session: &Session) -> Result<serde_json::Value, DomainError> {
        let req = self.authorized(self.client.get(self.url(RMS_PATH)), session);
        Ok(self.send(req, "balance").await?.unwrap_or_default())
    }

    async fn ltp(&self, session: &Session, quote: &QuoteRequest) -> Result<serde_json::Value, DomainError> {
        let req = self
            .authorized(self.client.post(self.url(LTP_PATH)), session)
            .json(quote);
        Ok(self.send(req, "ltp").await?.unwrap_or_default())
    }

    async fn option_chain(
        &self,
        session: &Session,
        request: &OptionChainRequest,
    ) -> Result<serde_json::Value, DomainError> {
        let req = self
            .authorized(self.client.post(self.url(OPTION_GREEK_PATH)), session)
            .json(request);
        Ok(self.send(req, "option chain").await?.unwrap_or_default())
    }
}
