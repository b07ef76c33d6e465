use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl DomainError {
    /// Stable snake_case code reported to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Configuration(_) => "configuration_error",
            DomainError::Session(_) => "session_error",
            DomainError::SessionExpired(_) => "session_expired",
            DomainError::Storage(_) => "storage_error",
            DomainError::Validation(_) => "validation_error",
            DomainError::Timeout(_) => "timeout",
        }
    }

    pub fn is_caller_fault(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}
