use anyhow::Context;
use config::Config;
use kafka_range_fetcher::queries::read_time_range::ConsumeLimits;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub fetch: FetchSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FetchSettings {
    pub metadata_timeout_ms: u64,
    pub consume_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl FetchSettings {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn consume_limits(&self) -> ConsumeLimits {
        ConsumeLimits {
            consume_timeout: Duration::from_millis(self.consume_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            metadata_timeout_ms: 5_000,
            consume_timeout_ms: 30_000,
            poll_interval_ms: 100,
        }
    }
}

impl AppConfig {
    pub fn build() -> Result<Self, anyhow::Error> {
        let defaults = FetchSettings::default();
        let config = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("fetch.metadata_timeout_ms", defaults.metadata_timeout_ms)?
            .set_default("fetch.consume_timeout_ms", defaults.consume_timeout_ms)?
            .set_default("fetch.poll_interval_ms", defaults.poll_interval_ms)?
            .add_source(config::File::with_name("appsettings").required(false))
            .add_source(config::Environment::with_prefix("App").separator("__"))
            .build()
            .context("While building config")?;

        let deserialized_config = config
            .try_deserialize()
            .context("While deserializing config")?;

        info!("App config: {deserialized_config:?}");

        Ok(deserialized_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_milliseconds_to_limits() {
        let settings = FetchSettings {
            metadata_timeout_ms: 1_500,
            consume_timeout_ms: 60_000,
            poll_interval_ms: 250,
        };

        let limits = settings.consume_limits();

        assert_eq!(settings.metadata_timeout(), Duration::from_millis(1_500));
        assert_eq!(limits.consume_timeout, Duration::from_secs(60));
        assert_eq!(limits.poll_interval, Duration::from_millis(250));
    }
}
