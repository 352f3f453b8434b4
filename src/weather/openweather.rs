use crate::error::{ProcessingError, Result};
use crate::utils::retry::{is_transient_http, is_transient_status};
use crate::weather::{ForecastSample, HistoricalDay, WeatherService};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct TimeMachineResponse {
    current: TimeMachineReading,
    #[serde(default)]
    hourly: Vec<TimeMachineReading>,
}

#[derive(Debug, Deserialize)]
struct TimeMachineReading {
    dt: i64,
    temp: f64,
}

/// Async OpenWeatherMap client for the forecast and time-machine endpoints
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, units: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            units: units.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        latitude: f64,
        longitude: f64,
        extra: &[(&str, String)],
    ) -> Result<T> {
        let location = format!("({}, {})", latitude, longitude);
        let url = format!("{}/{}", self.base_url, path);

        let mut params = vec![
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", self.units.clone()),
        ];
        params.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| ProcessingError::Weather {
                location: location.clone(),
                message: e.to_string(),
                transient: is_transient_http(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProcessingError::Weather {
                location,
                message: format!("{} returned {}", path, status),
                transient: is_transient_status(status),
            });
        }

        response.json::<T>().await.map_err(|e| ProcessingError::Weather {
            location,
            message: format!("malformed {} response: {}", path, e),
            transient: false,
        })
    }
}

fn timestamp(seconds: i64, location: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| ProcessingError::Weather {
        location: location.to_string(),
        message: format!("timestamp {} out of range", seconds),
        transient: false,
    })
}

impl WeatherService for OpenWeatherClient {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastSample>> {
        let body: ForecastResponse = self.get_json("forecast", latitude, longitude, &[]).await?;
        let location = format!("({}, {})", latitude, longitude);

        body.list
            .into_iter()
            .map(|entry| {
                Ok(ForecastSample {
                    timestamp: timestamp(entry.dt, &location)?,
                    temp: entry.main.temp,
                    temp_min: entry.main.temp_min,
                    temp_max: entry.main.temp_max,
                })
            })
            .collect()
    }

    async fn historical(
        &self,
        latitude: f64,
        longitude: f64,
        at: DateTime<Utc>,
    ) -> Result<HistoricalDay> {
        let body: TimeMachineResponse = self
            .get_json(
                "onecall/timemachine",
                latitude,
                longitude,
                &[("dt", at.timestamp().to_string())],
            )
            .await?;
        let location = format!("({}, {})", latitude, longitude);

        Ok(HistoricalDay {
            timestamp: timestamp(body.current.dt, &location)?,
            current_temp: body.current.temp,
            hourly_temps: body.hourly.into_iter().map(|h| h.temp).collect(),
        })
    }
}
