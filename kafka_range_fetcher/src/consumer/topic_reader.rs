use crate::connection_settings::ConnectionSettings;
use std::collections::HashMap;
use std::time::Duration;

/// Raw record as it comes from the broker, before payload decoding.
#[derive(Debug, Clone)]
pub struct ConsumedMessage {
    pub partition: i32,
    pub offset: i64,
    pub timestamp_ms: Option<i64>,
    pub payload: Option<Vec<u8>>,
}

/// Blocking view of a single topic on a broker connection.
///
/// A reader is owned by exactly one request and dropped when the request
/// finishes, which closes the underlying connection.
pub trait TopicReader {
    /// Partition ids of the topic in broker metadata order. Empty when the
    /// topic doesn't exist.
    fn fetch_partition_ids(&self, topic: &str) -> Result<Vec<i32>, anyhow::Error>;

    /// Offset of the earliest message with timestamp >= `timestamp_ms` for
    /// every requested partition, `None` when there is no such message.
    fn offsets_for_timestamp(
        &self,
        topic: &str,
        partitions: &[i32],
        timestamp_ms: i64,
    ) -> Result<HashMap<i32, Option<i64>>, anyhow::Error>;

    /// Replaces the current assignment with the single partition, positioned
    /// at `offset`.
    fn assign_partition(&self, topic: &str, partition: i32, offset: i64)
        -> Result<(), anyhow::Error>;

    /// Waits up to `timeout` for the next message. `Ok(None)` means nothing
    /// arrived in time.
    fn poll_message(&self, timeout: Duration) -> Result<Option<ConsumedMessage>, anyhow::Error>;
}

pub trait TopicReaderFactory: Send + Sync + 'static {
    type Reader: TopicReader;

    fn create_reader(&self, settings: &ConnectionSettings) -> Result<Self::Reader, anyhow::Error>;
}
