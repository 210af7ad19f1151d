use crate::connection_settings::ConnectionSettings;
use std::time::Duration;

#[derive(Debug)]
pub struct ReadTimeRangeQueryInternal {
    pub connection_settings: ConnectionSettings,
    pub topic: String,
    pub time_range: TimeRange,
    pub limits: ConsumeLimits,
}

/// Closed interval in epoch milliseconds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Debug, Copy, Clone)]
pub struct ConsumeLimits {
    /// Upper bound for consuming all partitions of one query.
    pub consume_timeout: Duration,
    /// How long a single poll may block before the deadline and cancellation
    /// are checked again.
    pub poll_interval: Duration,
}
