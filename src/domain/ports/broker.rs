use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::session::Session;
use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// Instrument to price, as the brokerage identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub exchange: String,
    pub tradingsymbol: String,
    pub symboltoken: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChainRequest {
    pub name: String,
    pub expirydate: String,
}

/// Brokerage API the session manager talks to. Payloads are passed through
/// as JSON since this service does not interpret them.
#[async_trait::async_trait]
pub trait BrokerClient: Send + Sync {
    fn name(&self) -> &str;

    async fn login(&self, credentials: &Credentials, otp: &str) -> Result<Session, DomainError>;

    async fn logout(&self, credentials: &Credentials, session: &Session) -> Result<(), DomainError>;

    async fn balance(&self, session: &Session) -> Result<serde_json::Value, DomainError>;

    async fn ltp(
        &self,
        session: &Session,
        quote: &QuoteRequest,
    ) -> Result<serde_json::Value, DomainError>;

    async fn option_chain(
        &self,
        session: &Session,
        request: &OptionChainRequest,
    ) -> Result<serde_json::Value, DomainError>;
}
