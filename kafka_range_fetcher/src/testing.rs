//! In-memory broker used by tests in place of a real Kafka cluster.

use crate::connection_settings::ConnectionSettings;
use crate::consumer::{ConsumedMessage, TopicReader, TopicReaderFactory};
use anyhow::{bail, Context};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub offset: i64,
    pub timestamp_ms: Option<i64>,
    pub payload: Option<Vec<u8>>,
}

impl StoredMessage {
    pub fn text(offset: i64, timestamp_ms: i64, payload: &str) -> Self {
        Self {
            offset,
            timestamp_ms: Some(timestamp_ms),
            payload: Some(payload.as_bytes().to_vec()),
        }
    }

    pub fn tombstone(offset: i64, timestamp_ms: i64) -> Self {
        Self {
            offset,
            timestamp_ms: Some(timestamp_ms),
            payload: None,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredPartition {
    id: i32,
    messages: Vec<StoredMessage>,
    /// Messages from this offset on are visible to timestamp lookups but
    /// never delivered by `poll_message`.
    unfetchable_from: Option<i64>,
}

#[derive(Debug, Default)]
struct ConnectionCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

#[derive(Debug, Default)]
pub struct InMemoryTopicReaderFactory {
    topics: HashMap<String, Vec<StoredPartition>>,
    broken_connection: bool,
    counters: Arc<ConnectionCounters>,
}

impl InMemoryTopicReaderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitions are reported in the given order.
    pub fn with_topic(mut self, topic: &str, partitions: Vec<(i32, Vec<StoredMessage>)>) -> Self {
        let partitions = partitions
            .into_iter()
            .map(|(id, messages)| StoredPartition {
                id,
                messages,
                unfetchable_from: None,
            })
            .collect();
        self.topics.insert(topic.to_owned(), partitions);
        self
    }

    pub fn with_unfetchable_from(mut self, topic: &str, partition: i32, offset: i64) -> Self {
        if let Some(stored) = self
            .topics
            .get_mut(topic)
            .and_then(|p| p.iter_mut().find(|x| x.id == partition))
        {
            stored.unfetchable_from = Some(offset);
        }
        self
    }

    pub fn with_broken_connection(mut self) -> Self {
        self.broken_connection = true;
        self
    }

    pub fn opened_connections(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn open_connections(&self) -> usize {
        self.opened_connections() - self.counters.closed.load(Ordering::SeqCst)
    }
}

impl TopicReaderFactory for InMemoryTopicReaderFactory {
    type Reader = InMemoryTopicReader;

    fn create_reader(&self, settings: &ConnectionSettings) -> Result<Self::Reader, anyhow::Error> {
        if self.broken_connection {
            bail!("Broker transport failure: {:?}", settings.brokers)
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);

        Ok(InMemoryTopicReader {
            topics: self.topics.clone(),
            cursor: RefCell::new(None),
            counters: self.counters.clone(),
        })
    }
}

#[derive(Debug)]
struct Cursor {
    topic: String,
    partition: i32,
    position: usize,
}

pub struct InMemoryTopicReader {
    topics: HashMap<String, Vec<StoredPartition>>,
    cursor: RefCell<Option<Cursor>>,
    counters: Arc<ConnectionCounters>,
}

impl InMemoryTopicReader {
    fn partition(&self, topic: &str, partition: i32) -> Result<&StoredPartition, anyhow::Error> {
        self.topics
            .get(topic)
            .and_then(|p| p.iter().find(|x| x.id == partition))
            .with_context(|| format!("Unknown partition {partition} of topic '{topic}'"))
    }
}

impl Drop for InMemoryTopicReader {
    fn drop(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl TopicReader for InMemoryTopicReader {
    fn fetch_partition_ids(&self, topic: &str) -> Result<Vec<i32>, anyhow::Error> {
        Ok(self
            .topics
            .get(topic)
            .map(|p| p.iter().map(|x| x.id).collect())
            .unwrap_or_default())
    }

    fn offsets_for_timestamp(
        &self,
        topic: &str,
        partitions: &[i32],
        timestamp_ms: i64,
    ) -> Result<HashMap<i32, Option<i64>>, anyhow::Error> {
        partitions
            .iter()
            .map(|&partition| -> Result<(i32, Option<i64>), anyhow::Error> {
                let stored = self.partition(topic, partition)?;
                let offset = stored
                    .messages
                    .iter()
                    .find(|m| m.timestamp_ms.is_some_and(|ts| ts >= timestamp_ms))
                    .map(|m| m.offset);
                Ok((partition, offset))
            })
            .collect()
    }

    fn assign_partition(
        &self,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> Result<(), anyhow::Error> {
        let stored = self.partition(topic, partition)?;
        let position = stored
            .messages
            .iter()
            .position(|m| m.offset >= offset)
            .unwrap_or(stored.messages.len());

        *self.cursor.borrow_mut() = Some(Cursor {
            topic: topic.to_owned(),
            partition,
            position,
        });

        Ok(())
    }

    fn poll_message(&self, timeout: Duration) -> Result<Option<ConsumedMessage>, anyhow::Error> {
        let mut guard = self.cursor.borrow_mut();
        let Some(cursor) = guard.as_mut() else {
            bail!("Consumer has no assigned partition")
        };

        let stored = self.partition(&cursor.topic, cursor.partition)?;
        let next = stored.messages.get(cursor.position).filter(|m| {
            stored
                .unfetchable_from
                .map_or(true, |unfetchable| m.offset < unfetchable)
        });

        let Some(message) = next else {
            std::thread::sleep(timeout);
            return Ok(None);
        };

        cursor.position += 1;

        Ok(Some(ConsumedMessage {
            partition: stored.id,
            offset: message.offset,
            timestamp_ms: message.timestamp_ms,
            payload: message.payload.clone(),
        }))
    }
}
