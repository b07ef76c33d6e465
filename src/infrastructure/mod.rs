pub mod broker;
pub mod sqlite;
