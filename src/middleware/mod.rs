//! Middleware for observability.
//!
//! Request logging with latency tracking and request ids. Authentication
//! stages live in [`crate::auth::middleware`].

pub mod logging;

pub use logging::request_logging;
