use serde::{Deserialize, Serialize};

use crate::types::FeedTime;

/// Wire shape of the durable config file: a single ordered list of
/// `"HH:MM"` strings. One malformed entry makes the whole file malformed,
/// which the store answers by resetting to empty and rewriting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTimes {
    pub times: Vec<FeedTime>,
}

impl StoredTimes {
    pub fn new(times: Vec<FeedTime>) -> Self {
        Self { times }
    }
}

/// Deploy-time constants plus their environment overrides. None of these
/// are persisted; the config file only ever holds the feed-time list.
#[derive(Debug, Clone)]
pub struct FeederSettings {
    pub http_port: u16,
    pub sensor_port: u16,
    pub weight_threshold_g: f32,
    pub tick_interval_ms: u64,
    pub utc_offset_secs: i32,
    pub wifi_timeout_secs: u64,
    pub tare_burst_count: u32,
    pub tare_burst_spacing_ms: u64,
}

impl Default for FeederSettings {
    fn default() -> Self {
        Self {
            http_port: 8080,
            sensor_port: 12345,
            weight_threshold_g: 10.0,
            tick_interval_ms: 50,
            utc_offset_secs: -7 * 3600,
            wifi_timeout_secs: 30,
            tare_burst_count: 5,
            tare_burst_spacing_ms: 100,
        }
    }
}

impl FeederSettings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.http_port = env_parsed("FEEDER_HTTP_PORT").unwrap_or(settings.http_port);
        settings.sensor_port = env_parsed("FEEDER_SENSOR_PORT").unwrap_or(settings.sensor_port);
        settings.weight_threshold_g =
            env_parsed("FEEDER_WEIGHT_THRESHOLD_G").unwrap_or(settings.weight_threshold_g);
        settings.tick_interval_ms =
            env_parsed("FEEDER_TICK_INTERVAL_MS").unwrap_or(settings.tick_interval_ms);
        settings.utc_offset_secs =
            env_parsed("FEEDER_UTC_OFFSET_SECS").unwrap_or(settings.utc_offset_secs);
        settings.wifi_timeout_secs =
            env_parsed("FEEDER_WIFI_TIMEOUT_SECS").unwrap_or(settings.wifi_timeout_secs);
        settings
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}
