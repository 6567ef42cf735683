//! Constants for the download module (timeouts, politeness, endpoints).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Upper bound (exclusive) of the randomized politeness delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(2000);

/// Granularity at which a politeness delay reports progress.
pub const WAIT_TICK: Duration = Duration::from_millis(200);

/// Book host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://books.google.se";

/// Width requested for the "large" page image variant.
pub const LARGE_PAGE_WIDTH: u32 = 1280;
