use crate::connection_settings::ConnectionSettings;
use crate::consumer::{ConsumedMessage, TopicReader, TopicReaderFactory};
use anyhow::Context;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::util::Timeout;
use rdkafka::{ClientConfig, Message, Offset, TopicPartitionList};
use std::collections::HashMap;
use std::ops::Deref;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

pub struct ConsumerWrapper {
    consumer: BaseConsumer,
    metadata_timeout: Duration,
}

impl ConsumerWrapper {
    pub fn create_for_range_reading(
        settings: &ConnectionSettings,
        metadata_timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let group = format!("kafka-range-fetcher-{}", Uuid::now_v7());
        let mut config =
            ClientConfig::try_from(settings).context("While building client config")?;

        // https://raw.githubusercontent.com/confluentinc/librdkafka/master/CONFIGURATION.md
        let consumer: BaseConsumer = config
            .set("group.id", &group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "10000")
            .set("receive.message.max.bytes", "2147483647")
            .create()
            .context("While creating kafka BaseConsumer")?;

        debug!("Created consumer {group} for brokers {:?}", settings.brokers);

        Ok(Self {
            consumer,
            metadata_timeout,
        })
    }
}

impl Deref for ConsumerWrapper {
    type Target = BaseConsumer;

    fn deref(&self) -> &Self::Target {
        &self.consumer
    }
}

impl Drop for ConsumerWrapper {
    fn drop(&mut self) {
        debug!("Closing consumer");
    }
}

impl TopicReader for ConsumerWrapper {
    fn fetch_partition_ids(&self, topic: &str) -> Result<Vec<i32>, anyhow::Error> {
        let metadata = self
            .fetch_metadata(Some(topic), Timeout::After(self.metadata_timeout))
            .with_context(|| format!("While fetching topic '{topic}' metadata"))?;

        let Some(topic_metadata) = metadata.topics().iter().find(|t| t.name() == topic) else {
            return Ok(vec![]);
        };

        if let Some(error) = topic_metadata.error() {
            debug!("Broker reported error for topic '{topic}': {error:?}");
        }

        let partitions = topic_metadata
            .partitions()
            .iter()
            .map(|x| x.id())
            .collect::<Vec<_>>();

        trace!("Topic '{topic}' partitions: {partitions:?}");

        Ok(partitions)
    }

    fn offsets_for_timestamp(
        &self,
        topic: &str,
        partitions: &[i32],
        timestamp_ms: i64,
    ) -> Result<HashMap<i32, Option<i64>>, anyhow::Error> {
        let mut tpl = TopicPartitionList::with_capacity(partitions.len());
        for partition in partitions {
            tpl.add_partition_offset(topic, *partition, Offset::Offset(timestamp_ms))
                .with_context(|| format!("While adding partition {partition} to lookup"))?;
        }

        let resolved = self
            .offsets_for_times(tpl, Timeout::After(self.metadata_timeout))
            .with_context(|| format!("While resolving offsets for timestamp {timestamp_ms}"))?;

        let mut offsets = HashMap::with_capacity(partitions.len());
        for element in resolved.elements_for_topic(topic) {
            element.error().with_context(|| {
                format!(
                    "While resolving offset for timestamp {timestamp_ms} in partition {}",
                    element.partition()
                )
            })?;

            let offset = match element.offset() {
                Offset::Offset(offset) => Some(offset),
                _ => None,
            };
            offsets.insert(element.partition(), offset);
        }

        Ok(offsets)
    }

    fn assign_partition(
        &self,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> Result<(), anyhow::Error> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(topic, partition, Offset::Offset(offset))
            .with_context(|| format!("While building assignment for partition {partition}"))?;

        self.assign(&tpl)
            .with_context(|| format!("While assigning partition {partition} at offset {offset}"))?;

        Ok(())
    }

    fn poll_message(&self, timeout: Duration) -> Result<Option<ConsumedMessage>, anyhow::Error> {
        let Some(result) = self.poll(timeout) else {
            return Ok(None);
        };

        let message = result.context("While reading message from kafka consumer")?;

        Ok(Some(ConsumedMessage {
            partition: message.partition(),
            offset: message.offset(),
            timestamp_ms: message.timestamp().to_millis(),
            payload: message.payload().map(<[u8]>::to_vec),
        }))
    }
}

/// Opens a fresh rdkafka consumer per request.
#[derive(Debug, Clone)]
pub struct KafkaTopicReaderFactory {
    metadata_timeout: Duration,
}

impl KafkaTopicReaderFactory {
    pub fn new(metadata_timeout: Duration) -> Self {
        Self { metadata_timeout }
    }
}

impl TopicReaderFactory for KafkaTopicReaderFactory {
    type Reader = ConsumerWrapper;

    fn create_reader(&self, settings: &ConnectionSettings) -> Result<Self::Reader, anyhow::Error> {
        ConsumerWrapper::create_for_range_reading(settings, self.metadata_timeout)
    }
}
