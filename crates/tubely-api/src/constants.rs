//! Route prefixes and HTTP limits

/// Prefix for JSON endpoints
pub const API_PREFIX: &str = "/api";

/// Prefix under which the local backend serves signed objects
pub const ASSETS_PREFIX: &str = "/assets";

/// Room for multipart boundaries and part headers on top of the file limit.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Upper bound for `Cache-Control: max-age` on served assets.
pub const ASSET_CACHE_MAX_AGE_SECS: u64 = 300;
