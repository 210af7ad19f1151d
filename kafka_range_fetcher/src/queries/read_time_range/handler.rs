use crate::consumer::{ConsumedMessage, PartitionOffset, TopicReader, TopicReaderFactory};
use crate::error::FetchError;
use crate::queries::read_time_range::{
    KafkaMessage, PartitionMessages, PartitionOffsetBounds, ReadTimeRangeQueryInternal,
    ReadTimeRangeQueryInternalResponse, TimeRange,
};
use anyhow::Context;
use chrono::DateTime;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, Span};

#[tracing::instrument(skip_all, fields(topic = %query.topic))]
pub async fn read_time_range<F: TopicReaderFactory>(
    reader_factory: Arc<F>,
    query: ReadTimeRangeQueryInternal,
    cancellation_token: CancellationToken,
) -> Result<ReadTimeRangeQueryInternalResponse, FetchError> {
    let span = Span::current();
    let handle = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let reader = reader_factory
            .create_reader(&query.connection_settings)
            .context("While creating consumer")?;

        read_time_range_blocking(&reader, &query, &cancellation_token)
    });

    handle.await.context("While joining blocking handle")?
}

/// Resolves offset bounds for every partition and reads them one by one.
/// The reader is only borrowed, the caller decides when the connection closes.
pub fn read_time_range_blocking<R: TopicReader>(
    reader: &R,
    query: &ReadTimeRangeQueryInternal,
    cancellation_token: &CancellationToken,
) -> Result<ReadTimeRangeQueryInternalResponse, FetchError> {
    let topic = &query.topic;
    let deadline = Instant::now() + query.limits.consume_timeout;

    let partitions = reader
        .fetch_partition_ids(topic)
        .with_context(|| format!("While fetching partitions for topic '{topic}'"))?;

    if partitions.is_empty() {
        return Err(FetchError::TopicNotFound(topic.clone()));
    }

    let bounds = resolve_offset_bounds(reader, topic, &partitions, &query.time_range)?;

    let mut results = Vec::new();
    for partition_bounds in bounds {
        let (Some(start_offset), Some(end_offset)) =
            (partition_bounds.start_offset, partition_bounds.end_offset)
        else {
            debug!(
                "Skipping partition {}, no offsets for range: {:?}",
                partition_bounds.partition_id, partition_bounds
            );
            continue;
        };

        let messages = consume_partition(
            reader,
            query,
            partition_bounds.partition_id,
            start_offset,
            end_offset,
            deadline,
            cancellation_token,
        )?;

        if !messages.is_empty() {
            results.push(PartitionMessages {
                partition: partition_bounds.partition_id,
                messages,
            });
        }
    }

    if results.is_empty() {
        return Err(FetchError::NoMessagesInRange);
    }

    info!(
        "Read {} messages from {} partitions",
        results.iter().map(|x| x.messages.len()).sum::<usize>(),
        results.len()
    );

    Ok(ReadTimeRangeQueryInternalResponse {
        partitions: results,
    })
}

fn resolve_offset_bounds<R: TopicReader>(
    reader: &R,
    topic: &str,
    partitions: &[i32],
    time_range: &TimeRange,
) -> Result<Vec<PartitionOffsetBounds>, anyhow::Error> {
    let start_offsets = reader
        .offsets_for_timestamp(topic, partitions, time_range.start_ms)
        .context("While resolving start offsets")?;
    let end_offsets = reader
        .offsets_for_timestamp(topic, partitions, time_range.end_ms)
        .context("While resolving end offsets")?;

    let bounds = partitions
        .iter()
        .map(|&partition_id| PartitionOffsetBounds {
            partition_id,
            start_offset: start_offsets.get(&partition_id).copied().flatten(),
            end_offset: end_offsets.get(&partition_id).copied().flatten(),
        })
        .collect::<Vec<_>>();

    trace!("Resolved offset bounds: {bounds:?}");

    Ok(bounds)
}

fn consume_partition<R: TopicReader>(
    reader: &R,
    query: &ReadTimeRangeQueryInternal,
    partition: i32,
    start_offset: i64,
    end_offset: i64,
    deadline: Instant,
    cancellation_token: &CancellationToken,
) -> Result<Vec<KafkaMessage>, FetchError> {
    reader
        .assign_partition(&query.topic, partition, start_offset)
        .with_context(|| format!("While seeking partition {partition} to {start_offset}"))?;

    debug!("Consuming partition {partition} from offset {start_offset} up to {end_offset}");

    let mut messages = Vec::new();
    loop {
        if cancellation_token.is_cancelled() {
            info!("Consuming was cancelled");
            return Err(FetchError::Cancelled);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(FetchError::ConsumeTimeout {
                partition,
                timeout: query.limits.consume_timeout,
            });
        }

        let wait = query.limits.poll_interval.min(deadline - now);
        let Some(consumed) = reader
            .poll_message(wait)
            .with_context(|| format!("While polling partition {partition}"))?
        else {
            continue;
        };

        if consumed.partition != partition {
            trace!(
                "Ignoring message from partition {} while reading {partition}",
                consumed.partition
            );
            continue;
        }

        trace!(
            "New message. Partition: {}, offset: {}",
            consumed.partition,
            consumed.offset
        );

        let reached_end = is_end_of_range(&consumed, end_offset, query.time_range.end_ms);
        messages.push(convert_message(consumed)?);

        if reached_end {
            break;
        }
    }

    Ok(messages)
}

/// The message at `end_offset - 1` is the last one read even when its
/// timestamp is already past the range.
fn is_end_of_range(message: &ConsumedMessage, end_offset: i64, end_ms: i64) -> bool {
    message.offset >= end_offset - 1 || message.timestamp_ms.is_some_and(|ts| ts > end_ms)
}

fn convert_message(message: ConsumedMessage) -> Result<KafkaMessage, FetchError> {
    let partition_offset = PartitionOffset::new(message.partition, message.offset);
    let timestamp = message
        .timestamp_ms
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH);

    let body = message
        .payload
        .map(String::from_utf8)
        .transpose()
        .map_err(|source| FetchError::InvalidPayload {
            partition_offset,
            source,
        })?;

    Ok(KafkaMessage {
        partition_offset,
        timestamp,
        body,
    })
}
