use chrono::{DateTime, Utc};
use std::fmt;

/// Tokens returned by a successful brokerage login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub feed_token: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: String, refresh_token: String, feed_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            feed_token,
            created_at: Utc::now(),
        }
    }

    pub fn token_preview(&self) -> String {
        token_preview(&self.access_token)
    }

    pub fn feed_token_preview(&self) -> String {
        token_preview(&self.feed_token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.token_preview())
            .field("refresh_token", &"<redacted>")
            .field("feed_token", &self.feed_token_preview())
            .field("created_at", &self.created_at)
            .finish()
    }
}

const PREVIEW_CHARS: usize = 8;

/// First few characters of a token, safe to log or return to clients.
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}
