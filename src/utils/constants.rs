//! Shared constants and invariants

pub const SIGN_IN_PATH: &str = "/access/api/auth/sign_in";
pub const DEFAULT_SIGN_IN_ACCEPT: &str = "application/vnd.mbapi.v2+json";
pub const OUTGOING_ACCEPT: &str = "application/json";

// Token set headers, lowercase as `http::HeaderName` stores them
pub const HEADER_ACCESS_TOKEN: &str = "access-token";
pub const HEADER_CLIENT: &str = "client";
pub const HEADER_EXPIRY: &str = "expiry";
pub const HEADER_UID: &str = "uid";
pub const HEADER_TOKEN_TYPE: &str = "token-type";
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 900;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const DEFAULT_CONFLICT_RETRY_DELAY_MS: u64 = 5000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30000;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_FACTOR: u32 = 2;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;
