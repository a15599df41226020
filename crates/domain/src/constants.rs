//! Request layer constants
//!
//! Centralized location for the defaults and wire-level sentinels shared by
//! every crate in the workspace.

// Environment defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:8090";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

// Upstream envelope contract
pub const OK_CODE: i64 = 200;
pub const DEFAULT_BUSINESS_ERROR_MSG: &str = "request failed";

// Headers
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

// User-facing notice text
pub const NOT_FOUND_NOTICE: &str = "Requested endpoint not found";
pub const GENERIC_FAILURE_NOTICE: &str = "Request failed, please try again later";
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired, please sign in again";

// Throttle helper
pub const DEFAULT_THROTTLE_MS: u64 = 100;
