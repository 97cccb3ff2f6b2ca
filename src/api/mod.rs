//! HTTP API Module
//! Mission: Route wiring, handlers, and the error-to-status taxonomy

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use routes::{create_router, AppState};
