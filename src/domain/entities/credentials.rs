use std::fmt;

/// Login material for the brokerage account. Loaded once at startup and never
/// mutated afterwards.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub client_id: String,
    pub password: String,
    pub totp_seed: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        client_id: impl Into<String>,
        password: impl Into<String>,
        totp_seed: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: client_id.into(),
            password: password.into(),
            totp_seed: totp_seed.into(),
        }
    }

    /// Names of the fields that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("api_key", &self.api_key),
            ("client_id", &self.client_id),
            ("password", &self.password),
            ("totp_seed", &self.totp_seed),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("password", &"<redacted>")
            .field("totp_seed", &"<redacted>")
            .finish()
    }
}
