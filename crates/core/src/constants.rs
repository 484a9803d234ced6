/// Username used when a payload carries no donor name.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// Number of leaderboard entries returned to the polling client.
pub const TOP_SPENDERS_LIMIT: usize = 10;

/// Default bound of the in-memory queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

/// Delivered donations are kept this long before the sweep drops them.
pub const DEFAULT_DELIVERED_RETENTION_SECS: u64 = 5 * 60;

/// Any donation older than this is dropped, delivered or not.
pub const DEFAULT_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Period of the cleanup sweep.
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;
