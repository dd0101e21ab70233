//! Application constants
//!
//! Centralized location for the status-code boundaries, envelope keys and
//! configuration defaults shared by the handlers and the transport.

// HTTP status boundaries used by the response handlers
pub const HTTP_CREATED: u16 = 201;
pub const HTTP_REDIRECT: u16 = 300;
pub const HTTP_NOT_FOUND: u16 = 404;
pub const HTTP_INTERNAL_SERVER_ERROR: u16 = 500;

// Backend error envelope keys
pub const ERROR_CODE_KEY: &str = "code";
pub const ERROR_MESSAGE_KEY: &str = "message";
pub const ATTRIBUTE_ERRORS_KEY: &str = "attribute_errors";
pub const ATTRIBUTE_ERRORS_RESPONSE_KEY: &str = "attributes_error_response";

// Backend paths
pub const RECEIPTS_PATH: &str = "/receipts";
pub const IDENTIFY_PATH: &str = "/subscribers/identify";
pub const OFFERS_PATH: &str = "/offers";

// Configuration defaults
pub const DEFAULT_BASE_URL: &str = "https://api.revenuecat.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 200;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_USER_AGENT: &str = concat!("purchases-rs/", env!("CARGO_PKG_VERSION"));
