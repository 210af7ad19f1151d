use crate::app_config::FetchSettings;
use crate::error::ApplicationError;
use crate::fetch_api::{FetchRequestDto, FetchResponseDto, MessageDto, PartitionMessagesDto};
use crate::time_util::{DateTimeConvert, ReadableTimeConvert};
use kafka_range_fetcher::connection_settings::ConnectionSettings;
use kafka_range_fetcher::consumer::SecurityProtocol;
use kafka_range_fetcher::queries::read_time_range::{
    KafkaMessage, PartitionMessages, ReadTimeRangeQueryInternal,
    ReadTimeRangeQueryInternalResponse, TimeRange,
};

pub const INVALID_TIME_FORMAT_MESSAGE: &str =
    "Invalid time format. Use 'YYYY-MM-DD HH:MM:SS' (UTC).";

pub fn dto_fetch_request_to_internal(
    dto: FetchRequestDto,
    settings: &FetchSettings,
) -> Result<ReadTimeRangeQueryInternal, ApplicationError> {
    let bootstrap_servers = required_field(dto.bootstrap_servers, "bootstrap_servers")?;
    let topic = required_field(dto.topic, "topic")?;
    let start_time = required_field(dto.start_time, "start_time")?;
    let end_time = required_field(dto.end_time, "end_time")?;

    let time_range = time_strings_to_range(&start_time, &end_time)?;

    let brokers = bootstrap_servers
        .split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if brokers.is_empty() {
        return Err(invalid_argument("bootstrap_servers can't be empty"));
    }

    if topic.trim().is_empty() {
        return Err(invalid_argument("topic can't be empty"));
    }

    let security_protocol = match dto.security_protocol {
        None => SecurityProtocol::default(),
        Some(protocol) => protocol
            .parse()
            .map_err(|e: anyhow::Error| invalid_argument(e.to_string()))?,
    };

    Ok(ReadTimeRangeQueryInternal {
        connection_settings: ConnectionSettings {
            brokers,
            security_protocol,
        },
        topic,
        time_range,
        limits: settings.consume_limits(),
    })
}

fn required_field(value: Option<String>, name: &str) -> Result<String, ApplicationError> {
    value.ok_or_else(|| invalid_argument(format!("Missing required parameter: {name}")))
}

fn time_strings_to_range(start_time: &str, end_time: &str) -> Result<TimeRange, ApplicationError> {
    let (Ok(start), Ok(end)) = (start_time.to_utc_date_time(), end_time.to_utc_date_time()) else {
        return Err(invalid_argument(INVALID_TIME_FORMAT_MESSAGE));
    };

    if start > end {
        return Err(invalid_argument(format!(
            "start_time '{start_time}' is later than end_time '{end_time}'"
        )));
    }

    Ok(TimeRange {
        start_ms: start.timestamp() * 1000,
        end_ms: end.timestamp() * 1000,
    })
}

fn invalid_argument(message: impl Into<String>) -> ApplicationError {
    ApplicationError::InvalidArgument(message.into())
}

pub fn time_range_response_to_dto(response: ReadTimeRangeQueryInternalResponse) -> FetchResponseDto {
    FetchResponseDto {
        data: response
            .partitions
            .into_iter()
            .map(partition_messages_to_dto)
            .collect(),
    }
}

fn partition_messages_to_dto(model: PartitionMessages) -> PartitionMessagesDto {
    PartitionMessagesDto {
        partition: model.partition,
        messages: model.messages.into_iter().map(kafka_message_to_dto).collect(),
    }
}

fn kafka_message_to_dto(model: KafkaMessage) -> MessageDto {
    MessageDto {
        offset: *model.partition_offset.offset(),
        value: model.body,
        timestamp: model.timestamp.to_readable_time(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FetchRequestDto {
        FetchRequestDto {
            bootstrap_servers: Some("kafka-1:9092, kafka-2:9092".to_owned()),
            topic: Some("orders".to_owned()),
            start_time: Some("2024-03-05 07:08:09".to_owned()),
            end_time: Some("2024-03-05 08:00:00".to_owned()),
            security_protocol: None,
        }
    }

    fn error_text(result: Result<ReadTimeRangeQueryInternal, ApplicationError>) -> String {
        match result {
            Err(ApplicationError::InvalidArgument(message)) => message,
            other => panic!("Expected invalid argument, got {other:?}"),
        }
    }

    #[test]
    fn converts_valid_request() {
        let query = dto_fetch_request_to_internal(request(), &FetchSettings::default()).unwrap();

        assert_eq!(
            query.connection_settings.brokers,
            vec!["kafka-1:9092".to_owned(), "kafka-2:9092".to_owned()]
        );
        assert_eq!(
            query.connection_settings.security_protocol,
            SecurityProtocol::Plaintext
        );
        assert_eq!(query.topic, "orders");
        assert_eq!(
            query.time_range,
            TimeRange {
                start_ms: 1_709_622_489_000,
                end_ms: 1_709_625_600_000,
            }
        );
    }

    #[test]
    fn reports_first_missing_field() {
        let mut dto = request();
        dto.topic = None;
        dto.end_time = None;

        let message = error_text(dto_fetch_request_to_internal(dto, &FetchSettings::default()));

        assert_eq!(message, "Missing required parameter: topic");
    }

    #[test]
    fn rejects_reversed_range() {
        let mut dto = request();
        dto.start_time = Some("2024-03-06 00:00:00".to_owned());

        let message = error_text(dto_fetch_request_to_internal(dto, &FetchSettings::default()));

        assert!(message.contains("later than end_time"));
    }

    #[test]
    fn accepts_equal_bounds() {
        let mut dto = request();
        dto.end_time = dto.start_time.clone();

        let query = dto_fetch_request_to_internal(dto, &FetchSettings::default()).unwrap();

        assert_eq!(query.time_range.start_ms, query.time_range.end_ms);
    }

    #[test]
    fn rejects_blank_brokers_and_unknown_protocol() {
        let mut dto = request();
        dto.bootstrap_servers = Some(" , ".to_owned());
        assert_eq!(
            error_text(dto_fetch_request_to_internal(dto, &FetchSettings::default())),
            "bootstrap_servers can't be empty"
        );

        let mut dto = request();
        dto.security_protocol = Some("sasl_ssl".to_owned());
        assert!(dto_fetch_request_to_internal(dto, &FetchSettings::default()).is_err());
    }
}
