// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `accountd` HTTP server.

pub mod session;

pub use session::{require_session, Session};
