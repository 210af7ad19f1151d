use crate::consumer::PartitionOffset;
use std::string::FromUtf8Error;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Topic {0} does not exist or has no available partitions")]
    TopicNotFound(String),

    #[error("No messages found in the requested time range")]
    NoMessagesInRange,

    #[error("Partition {partition} didn't reach the end of the range within {timeout:?}")]
    ConsumeTimeout { partition: i32, timeout: Duration },

    #[error("Consuming was cancelled")]
    Cancelled,

    #[error("Message payload at {partition_offset:?} is not valid UTF-8")]
    InvalidPayload {
        partition_offset: PartitionOffset,
        #[source]
        source: FromUtf8Error,
    },

    #[error(transparent)]
    Broker(#[from] anyhow::Error),
}
