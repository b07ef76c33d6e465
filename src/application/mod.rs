pub mod answer;
pub mod ingest;
pub mod recent;
pub mod search;
pub mod session;
pub mod stats;
