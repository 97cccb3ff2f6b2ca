//! HTTP Middleware
//! Mission: Cross-cutting request concerns

pub mod logging;

pub use logging::request_logging;
