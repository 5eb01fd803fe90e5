// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const ACCOUNT_REGISTERED: &str = "account.registered";
pub const LOGIN_SUCCEEDED: &str = "account.login.succeeded";
pub const LOGIN_FAILED: &str = "account.login.failed";
pub const ACCOUNT_UPDATED: &str = "account.updated";
pub const ACCOUNT_REMOVED: &str = "account.removed";
pub const TOKEN_ISSUED: &str = "token.issued";
