use serde::{Deserialize, Serialize};

/// Every field is optional so that a missing one can be reported by name.
#[derive(Deserialize, Debug, Default)]
pub struct FetchRequestDto {
    pub bootstrap_servers: Option<String>,
    pub topic: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub security_protocol: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct FetchResponseDto {
    pub data: Vec<PartitionMessagesDto>,
}

#[derive(Serialize, Debug)]
pub struct PartitionMessagesDto {
    pub partition: i32,
    pub messages: Vec<MessageDto>,
}

#[derive(Serialize, Debug)]
pub struct MessageDto {
    pub offset: i64,
    pub value: Option<String>,
    pub timestamp: String,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponseDto {
    pub error: String,
}

#[derive(Serialize, Debug)]
pub struct EmptyResultDto {
    pub message: String,
}
