//! Constants for the download module (timeouts, request headers, naming).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default stall timeout: longest wait for response headers or for the next body chunk.
pub const STALL_TIMEOUT: Duration = Duration::from_secs(300);

/// `Accept` header tuned to media responses.
pub const MEDIA_ACCEPT: &str =
    "video/webm,video/ogg,video/*;q=0.9,image/avif,image/webp,image/apng,image/*,*/*;q=0.8";

/// Maximum sanitized filename length, applied before collision suffixing.
pub const MAX_FILENAME_LEN: usize = 100;
