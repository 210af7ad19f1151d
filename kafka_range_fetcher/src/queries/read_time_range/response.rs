use crate::consumer::PartitionOffset;
use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct ReadTimeRangeQueryInternalResponse {
    pub partitions: Vec<PartitionMessages>,
}

#[derive(Debug)]
pub struct PartitionMessages {
    pub partition: i32,
    pub messages: Vec<KafkaMessage>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct KafkaMessage {
    pub partition_offset: PartitionOffset,
    pub timestamp: DateTime<Utc>,
    pub body: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PartitionOffsetBounds {
    pub partition_id: i32,
    pub start_offset: Option<i64>,
    pub end_offset: Option<i64>,
}
