use crate::error::{ProcessingError, Result};
use crate::models::{
    CityCentroid, FailurePolicy, ObservationSource, Stage, StageOutput, WeatherObservation,
};
use crate::utils::constants::{FORECAST_SAMPLE_COUNT, FORECAST_SAMPLE_INDICES, HISTORICAL_DAYS};
use crate::utils::progress::ProgressReporter;
use crate::utils::retry::{retry_async, RetryConfig};
use crate::weather::{ForecastSample, HistoricalDay, WeatherService};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::{join_all, try_join, try_join_all};

/// Fetches 5 historical days and 6 forecast days for every city centre.
///
/// All requests for all cities are issued together and polled on the
/// caller's task; the result is released only once every request has
/// finished.
pub struct WeatherFetcher<S> {
    service: S,
    retry: RetryConfig,
    policy: FailurePolicy,
    reference_time: Option<DateTime<Utc>>,
}

impl<S: WeatherService> WeatherFetcher<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            retry: RetryConfig::default(),
            policy: FailurePolicy::default(),
            reference_time: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fix "now" for the historical lookback
    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Request times for the historical days, oldest first
    pub fn historical_timestamps(&self) -> Vec<DateTime<Utc>> {
        let now = self.reference_time.unwrap_or_else(Utc::now);
        (1..=HISTORICAL_DAYS)
            .rev()
            .map(|days_ago| now - Duration::days(days_ago))
            .collect()
    }

    pub async fn fetch_all(
        &self,
        centroids: &[CityCentroid],
        progress: Option<&ProgressReporter>,
    ) -> Result<StageOutput<WeatherObservation>> {
        tracing::info!("Fetching weather for {} cities", centroids.len());
        let timestamps = self.historical_timestamps();

        let city_tasks = centroids.iter().map(|centroid| {
            let timestamps = &timestamps;
            async move {
                let outcome = self.fetch_city(centroid, timestamps).await;
                if let Some(p) = progress {
                    p.increment(1);
                }
                outcome
            }
        });

        let per_city: Vec<(String, Result<Vec<WeatherObservation>>)> = match self.policy {
            // First failure drops every in-flight sibling
            FailurePolicy::Abort => try_join_all(city_tasks)
                .await?
                .into_iter()
                .zip(centroids)
                .map(|(observations, c)| (c.key.to_string(), Ok(observations)))
                .collect(),
            FailurePolicy::Skip => join_all(city_tasks)
                .await
                .into_iter()
                .zip(centroids)
                .map(|(outcome, c)| (c.key.to_string(), outcome))
                .collect(),
        };

        let per_city = StageOutput::collect(per_city, Stage::Weather, self.policy)?;
        let output = StageOutput {
            completed: per_city.completed.into_iter().flatten().collect(),
            failures: per_city.failures,
        };

        tracing::info!(
            "Collected {} observations ({} cities skipped)",
            output.completed.len(),
            output.failures.len()
        );

        Ok(output)
    }

    /// All 11 observations for one city, or the first error
    pub async fn fetch_city(
        &self,
        centroid: &CityCentroid,
        timestamps: &[DateTime<Utc>],
    ) -> Result<Vec<WeatherObservation>> {
        let (lat, lon) = (centroid.center_lat, centroid.center_lon);
        let label = centroid.key.to_string();

        let historical = try_join_all(timestamps.iter().map(|at| {
            let label = &label;
            async move {
                let day = retry_async(&self.retry, &format!("Historical {} {}", label, at), || {
                    self.service.historical(lat, lon, *at)
                })
                .await?;
                self.historical_observation(centroid, day)
            }
        }));

        let forecast = async {
            let samples = retry_async(&self.retry, &format!("Forecast {}", label), || {
                self.service.forecast(lat, lon)
            })
            .await?;
            self.forecast_observations(centroid, &samples)
        };

        let (mut observations, forecast) = try_join(historical, forecast)
            .await
            .map_err(|e| relabel(e, &label))?;
        observations.extend(forecast);

        tracing::debug!("{}: {} observations", label, observations.len());
        Ok(observations)
    }

    fn historical_observation(
        &self,
        centroid: &CityCentroid,
        day: HistoricalDay,
    ) -> Result<WeatherObservation> {
        let min = day.hourly_temps.iter().copied().reduce(f64::min);
        let max = day.hourly_temps.iter().copied().reduce(f64::max);

        match (min, max) {
            (Some(temp_min), Some(temp_max)) => Ok(WeatherObservation::new(
                centroid.key.clone(),
                day.timestamp.date_naive(),
                day.current_temp,
                temp_min,
                temp_max,
                ObservationSource::Historical,
            )),
            _ => Err(ProcessingError::Weather {
                location: centroid.key.to_string(),
                message: format!("historical day {} has no hourly samples", day.timestamp),
                transient: false,
            }),
        }
    }

    /// Sample the 3-hourly series at fixed indices, one per day
    fn forecast_observations(
        &self,
        centroid: &CityCentroid,
        samples: &[ForecastSample],
    ) -> Result<Vec<WeatherObservation>> {
        if samples.len() < FORECAST_SAMPLE_COUNT {
            return Err(ProcessingError::Weather {
                location: centroid.key.to_string(),
                message: format!(
                    "forecast has {} samples, expected {}",
                    samples.len(),
                    FORECAST_SAMPLE_COUNT
                ),
                transient: false,
            });
        }

        Ok(FORECAST_SAMPLE_INDICES
            .iter()
            .map(|&i| {
                let sample = &samples[i];
                WeatherObservation::new(
                    centroid.key.clone(),
                    sample.timestamp.date_naive(),
                    sample.temp,
                    sample.temp_min,
                    sample.temp_max,
                    ObservationSource::Forecast,
                )
            })
            .collect())
    }
}

/// Name the city in errors raised with only coordinates
fn relabel(error: ProcessingError, city: &str) -> ProcessingError {
    match error {
        ProcessingError::Weather {
            location,
            message,
            transient,
        } if !location.contains(city) => ProcessingError::Weather {
            location: format!("{} {}", city, location),
            message,
            transient,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, CityKey};
    use crate::utils::constants::OBSERVATIONS_PER_CITY;
    use chrono::{NaiveDate, TimeZone};
    use std::cell::{Cell, RefCell};

    struct FakeService {
        forecast_len: usize,
        failing_lat: Option<f64>,
        failing_historical: Option<(f64, DateTime<Utc>)>,
        empty_hourly_lat: Option<f64>,
        calls: Cell<usize>,
        historical_requests: RefCell<Vec<DateTime<Utc>>>,
    }

    impl FakeService {
        fn new() -> Self {
            Self {
                forecast_len: 40,
                failing_lat: None,
                failing_historical: None,
                empty_hourly_lat: None,
                calls: Cell::new(0),
                historical_requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl WeatherService for FakeService {
        async fn forecast(&self, latitude: f64, _longitude: f64) -> Result<Vec<ForecastSample>> {
            self.calls.set(self.calls.get() + 1);
            tokio::task::yield_now().await;
            if Some(latitude) == self.failing_lat {
                return Err(ProcessingError::Weather {
                    location: "fake".to_string(),
                    message: "forecast down".to_string(),
                    transient: false,
                });
            }
            let start = Utc.with_ymd_and_hms(2021, 5, 25, 0, 0, 0).unwrap();
            Ok((0..self.forecast_len)
                .map(|i| ForecastSample {
                    timestamp: start + Duration::hours(3 * i as i64),
                    temp: i as f64,
                    temp_min: i as f64 - 1.0,
                    temp_max: i as f64 + 1.0,
                })
                .collect())
        }

        async fn historical(&self, latitude: f64, _longitude: f64, at: DateTime<Utc>) -> Result<HistoricalDay> {
            self.calls.set(self.calls.get() + 1);
            self.historical_requests.borrow_mut().push(at);
            tokio::task::yield_now().await;
            if Some((latitude, at)) == self.failing_historical {
                return Err(ProcessingError::Weather {
                    location: "fake".to_string(),
                    message: "timemachine down".to_string(),
                    transient: false,
                });
            }
            let hourly_temps = if Some(latitude) == self.empty_hourly_lat {
                Vec::new()
            } else {
                vec![4.0, 12.5, 8.0]
            };
            Ok(HistoricalDay {
                timestamp: at,
                current_temp: 10.0,
                hourly_temps,
            })
        }
    }

    fn centroid(country: &str, city: &str, lat: f64) -> CityCentroid {
        CityCentroid::new(CityKey::new(country, city), BoundingBox::from_point(lat, 10.0), 1)
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 25, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_city_yields_five_historical_then_six_forecast() {
        let fetcher = WeatherFetcher::new(FakeService::new()).with_reference_time(reference());
        let output = fetcher.fetch_all(&[centroid("AT", "Vienna", 48.2)], None).await.unwrap();

        assert_eq!(output.completed.len(), OBSERVATIONS_PER_CITY);
        assert!(output.failures.is_empty());
        assert_eq!(fetcher.service.calls.get(), 6);

        let historical: Vec<_> = output.completed[..5].iter().collect();
        assert!(historical.iter().all(|o| o.source == ObservationSource::Historical));
        assert_eq!(historical[0].day, NaiveDate::from_ymd_opt(2021, 5, 20).unwrap());
        assert_eq!(historical[4].day, NaiveDate::from_ymd_opt(2021, 5, 24).unwrap());
        assert_eq!((historical[0].temp_min, historical[0].temp_max), (4.0, 12.5));

        let forecast_temps: Vec<f64> = output.completed[5..].iter().map(|o| o.temp).collect();
        assert_eq!(forecast_temps, vec![0.0, 8.0, 16.0, 24.0, 32.0, 39.0]);
    }

    #[tokio::test]
    async fn test_all_cities_fetched() {
        let fetcher = WeatherFetcher::new(FakeService::new()).with_reference_time(reference());
        let centroids = vec![centroid("AT", "Vienna", 48.2), centroid("FR", "Paris", 48.85)];
        let output = fetcher.fetch_all(&centroids, None).await.unwrap();

        assert_eq!(output.completed.len(), 2 * OBSERVATIONS_PER_CITY);
        assert_eq!(fetcher.service.historical_requests.borrow().len(), 10);
        assert_eq!(output.completed[0].city, centroids[0].key);
        assert_eq!(output.completed[OBSERVATIONS_PER_CITY].city, centroids[1].key);
    }

    #[tokio::test]
    async fn test_failed_city_contributes_nothing_under_skip() {
        let mut service = FakeService::new();
        service.failing_lat = Some(48.85);
        let fetcher = WeatherFetcher::new(service)
            .with_reference_time(reference())
            .with_retry(RetryConfig::disabled());

        let centroids = vec![centroid("AT", "Vienna", 48.2), centroid("FR", "Paris", 48.85)];
        let output = fetcher.fetch_all(&centroids, None).await.unwrap();

        assert_eq!(output.completed.len(), OBSERVATIONS_PER_CITY);
        assert!(output.completed.iter().all(|o| o.city.city == "Vienna"));
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].subject, "FR/Paris");
    }

    #[tokio::test]
    async fn test_failed_city_aborts_under_abort_policy() {
        let mut service = FakeService::new();
        service.failing_lat = Some(48.85);
        let fetcher = WeatherFetcher::new(service)
            .with_reference_time(reference())
            .with_failure_policy(FailurePolicy::Abort);

        let centroids = vec![centroid("AT", "Vienna", 48.2), centroid("FR", "Paris", 48.85)];
        let result = fetcher.fetch_all(&centroids, None).await;
        match result {
            Err(ProcessingError::Weather { location, .. }) => assert!(location.contains("FR/Paris")),
            other => panic!("expected weather error, got {:?}", other.map(|o| o.completed.len())),
        }
    }

    #[tokio::test]
    async fn test_short_forecast_is_malformed() {
        let mut service = FakeService::new();
        service.forecast_len = 39;
        let fetcher = WeatherFetcher::new(service).with_reference_time(reference());

        let result = fetcher
            .fetch_city(&centroid("AT", "Vienna", 48.2), &fetcher.historical_timestamps())
            .await;
        assert!(matches!(result, Err(ProcessingError::Weather { transient: false, .. })));
    }

    #[test]
    fn test_historical_timestamps_oldest_first() {
        let fetcher = WeatherFetcher::new(FakeService::new()).with_reference_time(reference());
        let stamps = fetcher.historical_timestamps();
        assert_eq!(stamps.len(), 5);
        assert_eq!(stamps[0], reference() - Duration::days(5));
        assert_eq!(stamps[4], reference() - Duration::days(1));
    }

    #[tokio::test]
    async fn test_one_failed_historical_day_drops_the_whole_city() {
        let mut service = FakeService::new();
        service.failing_historical = Some((48.85, reference() - Duration::days(3)));
        let fetcher = WeatherFetcher::new(service)
            .with_reference_time(reference())
            .with_retry(RetryConfig::disabled());

        let centroids = vec![centroid("AT", "Vienna", 48.2), centroid("FR", "Paris", 48.85)];
        let output = fetcher.fetch_all(&centroids, None).await.unwrap();

        assert_eq!(output.completed.len(), OBSERVATIONS_PER_CITY);
        assert!(output.completed.iter().all(|o| o.city == centroids[0].key));
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].subject, "FR/Paris");
        assert!(output.failures[0].message.contains("timemachine down"));
    }

    #[tokio::test]
    async fn test_historical_day_without_hourly_samples_drops_the_city() {
        let mut service = FakeService::new();
        service.empty_hourly_lat = Some(48.85);
        let fetcher = WeatherFetcher::new(service).with_reference_time(reference());

        let centroids = vec![centroid("AT", "Vienna", 48.2), centroid("FR", "Paris", 48.85)];
        let output = fetcher.fetch_all(&centroids, None).await.unwrap();

        assert_eq!(output.completed.len(), OBSERVATIONS_PER_CITY);
        assert!(output.completed.iter().all(|o| o.city.city == "Vienna"));
        assert_eq!(output.failures.len(), 1);
        assert!(output.failures[0].message.contains("no hourly samples"));
    }
}
