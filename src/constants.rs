use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Cookie carrying the signed session token.
pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Lifetime of every issued session token: 2 hours.
pub const SESSION_LIFETIME_SECS: i64 = 2 * 60 * 60;

/// Tokens with less than this many seconds left are silently reissued.
pub const RENEWAL_WINDOW_SECS: i64 = 10 * 60;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Largest accepted upload, 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Thumbnails fit inside a square of this many pixels.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 200;
