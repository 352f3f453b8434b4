//! Historical and forecast temperature retrieval per city centre.

pub mod fetcher;
pub mod openweather;

pub use fetcher::WeatherFetcher;
pub use openweather::OpenWeatherClient;

use crate::error::Result;
use chrono::{DateTime, Utc};

/// One 3-hourly forecast sample
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
}

/// One historical day: the reading at the requested time plus the day's
/// hourly readings
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDay {
    pub timestamp: DateTime<Utc>,
    pub current_temp: f64,
    pub hourly_temps: Vec<f64>,
}

/// A non-blocking weather service. Futures are polled on one thread, so
/// implementations need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait WeatherService {
    /// 5-day forecast at 3-hour resolution
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastSample>>;

    /// Conditions for the single day containing `at`
    async fn historical(
        &self,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> Result<HistoricalDay>;
}
