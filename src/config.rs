//! Process configuration, read from environment variables at startup.

use crate::domain::entities::credentials::Credentials;
use crate::domain::error::DomainError;
use crate::infrastructure::broker::smartapi::DEFAULT_BASE_URL;
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_VAR: &str = "ANGEL_API_KEY";
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const PASSWORD_VAR: &str = "ANGEL_API_SECRET";
pub const TOTP_SEED_VAR: &str = "ANGEL_TOTP_SEED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerKind {
    SmartApi,
    Paper,
}

impl FromStr for BrokerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smartapi" | "angel" => Ok(BrokerKind::SmartApi),
            "paper" => Ok(BrokerKind::Paper),
            _ => Err(format!("Unknown broker: '{s}'. Use 'smartapi' or 'paper'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub broker: BrokerKind,
    pub broker_base_url: String,
    pub login_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "./knowledge.db".into(),
            bind_addr: "0.0.0.0:8000".into(),
            broker: BrokerKind::SmartApi,
            broker_base_url: DEFAULT_BASE_URL.into(),
            login_timeout: Duration::from_secs(15),
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup("BOTPRO_DB") {
            config.db_path = path;
        }
        if let Some(addr) = lookup("BOTPRO_BIND") {
            config.bind_addr = addr;
        }
        if let Some(kind) = lookup("BOTPRO_BROKER") {
            config.broker = kind.parse().map_err(DomainError::Configuration)?;
        }
        if let Some(url) = lookup("BOTPRO_BROKER_URL") {
            config.broker_base_url = url;
        }
        if let Some(secs) = lookup("BOTPRO_LOGIN_TIMEOUT_SECS") {
            config.login_timeout = parse_secs("BOTPRO_LOGIN_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("BOTPRO_STORE_TIMEOUT_SECS") {
            config.store_timeout = parse_secs("BOTPRO_STORE_TIMEOUT_SECS", &secs)?;
        }
        Ok(config)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, DomainError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(DomainError::Configuration(format!(
            "{key} must be a positive number of seconds, got '{value}'"
        ))),
    }
}

/// Every credential variable is required; blank counts as missing.
pub fn credentials_from_lookup<F>(lookup: F) -> Result<Credentials, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let vars = [API_KEY_VAR, CLIENT_ID_VAR, PASSWORD_VAR, TOTP_SEED_VAR];
    let missing: Vec<&str> = vars
        .iter()
        .copied()
        .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::Configuration(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    let get = |key: &str| lookup(key).unwrap_or_default().trim().to_string();
    Ok(Credentials::new(
        get(API_KEY_VAR),
        get(CLIENT_ID_VAR),
        get(PASSWORD_VAR),
        get(TOTP_SEED_VAR),
    ))
}

/// Seed used by the paper broker when no real credentials are configured.
const PAPER_TOTP_SEED: &str = "JBSWY3DPEHPK3PXP";

pub fn broker_credentials_from_env(kind: BrokerKind) -> Result<Credentials, DomainError> {
    broker_credentials_from_lookup(kind, |key| std::env::var(key).ok())
}

/// The SmartAPI broker needs every credential variable. The paper broker
/// uses them when all are set and falls back to placeholders otherwise.
pub fn broker_credentials_from_lookup<F>(kind: BrokerKind, lookup: F) -> Result<Credentials, DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    match kind {
        BrokerKind::SmartApi => credentials_from_lookup(lookup),
        BrokerKind::Paper => {
            let get = |key: &str| lookup(key).unwrap_or_default().trim().to_string();
            let creds = Credentials::new(
                get(API_KEY_VAR),
                get(CLIENT_ID_VAR),
                get(PASSWORD_VAR),
                get(TOTP_SEED_VAR),
            );
            if creds.is_complete() {
                return Ok(creds);
            }
            let client_id = match get(CLIENT_ID_VAR) {
                id if id.is_empty() => "PAPER".to_string(),
                id => id,
            };
            Ok(Credentials::new("paper", client_id, "paper", PAPER_TOTP_SEED))
        }
    }
}
