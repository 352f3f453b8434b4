//! Layered settings: built-in defaults, an optional TOML file, then
//! `HOTEL_WEATHER__*` environment variables. Command-line flags are applied
//! on top by the caller.

use crate::error::Result;
use crate::models::FailurePolicy;
use crate::utils::constants::{
    DEFAULT_GEOCODER_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECS, DEFAULT_UNITS,
    DEFAULT_USER_AGENT, DEFAULT_WEATHER_URL, ENV_PREFIX,
};
use crate::utils::retry::{
    RetryConfig, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
};
use ::config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeocoderSettings {
    #[validate(length(min = 1))]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub user_agent: String,

    pub language: String,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WeatherSettings {
    #[validate(length(min = 1))]
    pub base_url: String,

    pub api_key: String,

    pub units: String,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl From<&RetrySettings> for RetryConfig {
    fn from(s: &RetrySettings) -> Self {
        RetryConfig::new(s.max_retries, s.initial_delay_ms, s.max_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub geocoder: GeocoderSettings,

    #[validate(nested)]
    pub weather: WeatherSettings,

    #[validate(nested)]
    pub retry: RetrySettings,

    #[validate(range(min = 1))]
    pub workers: usize,

    pub failure_policy: FailurePolicy,
}

impl Settings {
    /// Load defaults, then `file` if it exists, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, None)
    }

    /// As [`Settings::load`], reading `HOTEL_WEATHER__*` variables from `env`
    /// instead of the process environment when given
    pub fn load_with_env(file: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("geocoder.base_url", DEFAULT_GEOCODER_URL)?
            .set_default("geocoder.user_agent", DEFAULT_USER_AGENT)?
            .set_default("geocoder.language", DEFAULT_LANGUAGE)?
            .set_default("geocoder.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("weather.base_url", DEFAULT_WEATHER_URL)?
            .set_default("weather.api_key", "")?
            .set_default("weather.units", DEFAULT_UNITS)?
            .set_default("weather.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("retry.max_retries", DEFAULT_MAX_RETRIES as u64)?
            .set_default("retry.initial_delay_ms", DEFAULT_INITIAL_DELAY_MS)?
            .set_default("retry.max_delay_ms", DEFAULT_MAX_DELAY_MS)?
            .set_default("workers", num_cpus::get() as u64)?
            .set_default("failure_policy", FailurePolicy::default().to_string())?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder.timeout_secs)
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::from(&self.retry)
    }
}
