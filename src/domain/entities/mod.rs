pub mod credentials;
pub mod document;
pub mod session;
