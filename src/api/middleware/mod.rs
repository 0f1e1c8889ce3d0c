//! API middleware components

pub mod identity;
pub mod logging;
pub mod security;

pub use identity::{extract_bearer_token, RequireSubject};
pub use logging::logging_middleware;
pub use security::{security_headers_middleware, MAX_BODY_SIZE};
