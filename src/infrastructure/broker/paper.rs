use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::session::Session;
use crate::domain::error::DomainError;
use crate::domain::ports::broker::{BrokerClient, OptionChainRequest, QuoteRequest};
use async_trait::async_trait;
use serde_json::json;

/// Offline stand-in for the brokerage. Accepts any well-formed login and
/// answers every data call with fixed fixture payloads.
pub struct PaperBroker;

#[async_trait]
impl BrokerClient for PaperBroker {
    fn name(&self) -> &str {
        "paper"
    }

    async fn login(&self, credentials: &Credentials, otp: &str) -> Result<Session, DomainError> {
        if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::Session(format!("paper login: malformed OTP '{otp}'")));
        }
        Ok(Session::new(
            format!("paper-access-{}", credentials.client_id),
            format!("paper-refresh-{}", credentials.client_id),
            format!("paper-feed-{}", credentials.client_id),
        ))
    }

    async fn logout(&self, _credentials: &Credentials, _session: &Session) -> Result<(), DomainError> {
        Ok(())
    }

    async fn balance(&self, _session: &Session) -> Result<serde_json::Value, DomainError> {
        Ok(json!({
            "net": "100000.00",
            "availablecash": "100000.00",
            "utiliseddebits": "0.00",
            "fixture": true
        }))
    }

    async fn ltp(&self, _session: &Session, quote: &QuoteRequest) -> Result<serde_json::Value, DomainError> {
        Ok(json!({
            "exchange": quote.exchange,
            "tradingsymbol": quote.tradingsymbol,
            "symboltoken": quote.symboltoken,
            "ltp": 0.0,
            "fixture": true
        }))
    }

    async fn option_chain(
        &self,
        _session: &Session,
        request: &OptionChainRequest,
    ) -> Result<serde_json::Value, DomainError> {
        Ok(json!({
            "name": request.name,
            "expiry": request.expirydate,
            "strikes": [],
            "fixture": true
        }))
    }
}
