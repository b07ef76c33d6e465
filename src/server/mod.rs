pub mod api;

pub use api::{create_router, run_server, ApiState};
