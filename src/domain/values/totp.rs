use crate::domain::error::DomainError;
use chrono::Utc;
use data_encoding::Specification;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub const STEP_SECONDS: u64 = 30;
pub const DIGITS: u32 = 6;

/// Decodes a base32 TOTP seed. Case, spaces and `=` padding are ignored and
/// unused trailing bits are tolerated, since brokers hand out seeds whose
/// length is not always a multiple of 8 characters.
pub fn decode_seed(seed: &str) -> Result<Vec<u8>, DomainError> {
    let cleaned: String = seed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return Err(DomainError::Validation("TOTP seed is empty".into()));
    }

    let mut alphabet = Specification::new();
    alphabet.symbols.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567");
    alphabet.check_trailing_bits = false;
    let encoding = alphabet
        .encoding()
        .map_err(|e| DomainError::Configuration(format!("base32 alphabet: {e}")))?;

    encoding
        .decode(cleaned.as_bytes())
        .map_err(|e| DomainError::Validation(format!("TOTP seed is not valid base32: {e}")))
}

/// RFC 6238 code (HMAC-SHA1, 30 s step, 6 digits) for the given unix time.
pub fn generate_at(seed: &str, unix_secs: u64) -> Result<String, DomainError> {
    let key = decode_seed(seed)?;
    let counter = unix_secs / STEP_SECONDS;

    let mut mac = HmacSha1::new_from_slice(&key)
        .map_err(|e| DomainError::Validation(format!("TOTP key rejected: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation (RFC 4226 §5.3)
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = binary % 10u32.pow(DIGITS);
    Ok(format!("{code:0width$}", width = DIGITS as usize))
}

pub fn generate_now(seed: &str) -> Result<String, DomainError> {
    let now = Utc::now().timestamp().max(0) as u64;
    generate_at(seed, now)
}
