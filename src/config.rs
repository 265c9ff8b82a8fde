//! Environment-driven configuration.
//!
//! Every key is read from the process environment (after `.env` is loaded);
//! durations accept either bare seconds or a unit suffix such as `90s`, `5m`.

use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::Env;
use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer};

use crate::data::EnrichmentMode;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base level for this crate's log targets; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Root document of the upstream artist API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout for upstream and geocoder calls.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub refresh_interval: Duration,
    /// Grace period for in-flight requests after a shutdown signal.
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
    #[serde(default)]
    pub enrichment: EnrichmentMode,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    #[serde(default = "default_geocoder_user_agent")]
    pub geocoder_user_agent: String,
    /// Minimum spacing between geocoder requests.
    #[serde(
        default = "default_geocode_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub geocode_interval: Duration,
}

impl Config {
    /// Read the configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Self = figment.extract().context("Failed to load config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.refresh_interval.is_zero(),
            "refresh_interval must be greater than zero"
        );
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    "https://groupietrackers.herokuapp.com/api".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_geocoder_user_agent() -> String {
    "GroupieTracker/1.0".to_string()
}

fn default_geocode_interval() -> Duration {
    Duration::from_secs(1)
}

const TIME_UNITS: [TimeUnit; 4] = [
    TimeUnit::MilliSecond,
    TimeUnit::Second,
    TimeUnit::Minute,
    TimeUnit::Hour,
];

fn parse_duration(value: &str) -> Result<Duration, String> {
    let parsed = DurationParser::with_time_units(&TIME_UNITS)
        .parse(value.trim())
        .map_err(|e| format!("invalid duration {value:?}: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration {value:?}: {e}"))
}

/// Accepts integer seconds or a fundu duration string.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{Error, Visitor};

    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a number of seconds or a duration string like \"30s\" or \"5m\"")
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<Duration, E> {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("duration cannot be negative: {value}")))
        }

        fn visit_f64<E: Error>(self, value: f64) -> Result<Duration, E> {
            Duration::try_from_secs_f64(value).map_err(E::custom)
        }

        fn visit_str<E: Error>(self, value: &str) -> Result<Duration, E> {
            parse_duration(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Toml};

    #[test]
    fn defaults_apply_to_empty_input() {
        let config = Config::from_figment(Figment::new()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
        assert_eq!(config.geocode_interval, Duration::from_secs(1));
        assert_eq!(config.enrichment, EnrichmentMode::PerArtist);
        assert_eq!(config.geocoder_user_agent, "GroupieTracker/1.0");
    }

    #[test]
    fn durations_accept_units_and_bare_seconds() {
        let figment = Figment::from(Toml::string(
            r#"
            request_timeout = 3
            refresh_interval = "15m"
            geocode_interval = "1500ms"
            shutdown_timeout = "2.5s"
            enrichment = "bulk"
            "#,
        ));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.refresh_interval, Duration::from_secs(15 * 60));
        assert_eq!(config.geocode_interval, Duration::from_millis(1500));
        assert_eq!(config.shutdown_timeout, Duration::from_millis(2500));
        assert_eq!(config.enrichment, EnrichmentMode::Bulk);
    }

    #[test]
    fn malformed_duration_is_an_error() {
        let figment = Figment::from(Toml::string(r#"refresh_interval = "soon""#));
        assert!(Config::from_figment(figment).is_err());
    }

    #[test]
    fn zero_refresh_interval_is_an_error() {
        for value in ["refresh_interval = 0", r#"refresh_interval = "0s""#] {
            let figment = Figment::from(Toml::string(value));
            let err = Config::from_figment(figment).unwrap_err();
            assert!(err.to_string().contains("refresh_interval"), "{err}");
        }
    }
}
