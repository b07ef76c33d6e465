pub mod recent_limit;
pub mod totp;
