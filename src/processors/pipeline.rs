use crate::analyzers::{AnalyticsResult, ClimateAnalyzer};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::geocoding::{AddressResolver, Geocoder, NominatimClient};
use crate::models::{CityCentroid, ResolvedHotel, StageFailure, WeatherObservation};
use crate::processors::CentroidAggregator;
use crate::readers::SourceLoader;
use crate::utils::progress::ProgressReporter;
use crate::weather::{OpenWeatherClient, WeatherFetcher, WeatherService};
use std::path::Path;

#[derive(Debug)]
pub struct PipelineOutput {
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub hotels: Vec<ResolvedHotel>,
    pub centroids: Vec<CityCentroid>,
    pub observations: Vec<WeatherObservation>,
    pub analytics: AnalyticsResult,
    pub failures: Vec<StageFailure>,
}

impl PipelineOutput {
    pub fn summary(&self) -> String {
        format!(
            "=== Pipeline Report ===\n\
            Files read: {}\n\
            Rows read: {} ({} dropped for invalid coordinates)\n\
            Hotels resolved: {}\n\
            Cities: {}\n\
            Observations: {}\n\
            Skipped records/cities: {}\n\n{}",
            self.files_read,
            self.rows_read,
            self.rows_dropped,
            self.hotels.len(),
            self.centroids.len(),
            self.observations.len(),
            self.failures.len(),
            self.analytics.summary()
        )
    }
}

/// Load → geocode → aggregate → fetch → analyze. Each stage's output is fully
/// materialized before the next stage starts.
pub struct Pipeline<G, W> {
    loader: SourceLoader,
    resolver: AddressResolver<G>,
    aggregator: CentroidAggregator,
    fetcher: WeatherFetcher<W>,
    analyzer: ClimateAnalyzer,
    silent: bool,
}

impl Pipeline<NominatimClient, OpenWeatherClient> {
    /// Pipeline backed by the Nominatim and OpenWeatherMap HTTP clients
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if settings.weather.api_key.trim().is_empty() {
            return Err(ProcessingError::Config(
                "weather.api_key is required (set HOTEL_WEATHER__WEATHER__API_KEY or --api-key)"
                    .to_string(),
            ));
        }

        let geocoder = NominatimClient::new(
            &settings.geocoder.base_url,
            &settings.geocoder.user_agent,
            &settings.geocoder.language,
            settings.geocoder_timeout(),
        )?;
        let weather = OpenWeatherClient::new(
            &settings.weather.base_url,
            &settings.weather.api_key,
            &settings.weather.units,
            settings.weather_timeout(),
        )?;

        Ok(Self::new(geocoder, weather, settings))
    }
}

impl<G: Geocoder, W: WeatherService> Pipeline<G, W> {
    pub fn new(geocoder: G, weather: W, settings: &Settings) -> Self {
        let resolver = AddressResolver::new(geocoder, settings.workers)
            .with_retry(settings.retry_config())
            .with_failure_policy(settings.failure_policy);
        let fetcher = WeatherFetcher::new(weather)
            .with_retry(settings.retry_config())
            .with_failure_policy(settings.failure_policy);

        Self::from_parts(resolver, fetcher)
    }

    pub fn from_parts(resolver: AddressResolver<G>, fetcher: WeatherFetcher<W>) -> Self {
        Self {
            loader: SourceLoader::new(),
            resolver,
            aggregator: CentroidAggregator::new(),
            fetcher,
            analyzer: ClimateAnalyzer::new(),
            silent: false,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn run(&self, input: &Path) -> Result<PipelineOutput> {
        let load = self.loader.load(input)?;
        let (files_read, rows_read, rows_dropped) =
            (load.files_read, load.rows_read, load.rows_dropped);

        let progress = ProgressReporter::new(load.records.len() as u64, "Geocoding hotels...", self.silent);
        let resolved = self.resolver.resolve_all(load.records, Some(&progress))?;
        progress.finish_with_message(&format!("Geocoded {} hotels", resolved.completed.len()));

        let centroids = self.aggregator.compute_centroids(&resolved.completed);
        if centroids.is_empty() {
            return Err(ProcessingError::MissingData(
                "No hotel could be geocoded into a city".to_string(),
            ));
        }

        let observations = self.fetch_weather(&centroids)?;

        let analytics = self.analyzer.analyze(&observations.completed)?;

        let mut failures = resolved.failures;
        failures.extend(observations.failures);

        Ok(PipelineOutput {
            files_read,
            rows_read,
            rows_dropped,
            hotels: resolved.completed,
            centroids,
            observations: observations.completed,
            analytics,
            failures,
        })
    }

    /// The cooperative fetch stage runs on its own single-threaded runtime,
    /// created after the geocoding pool has been torn down.
    fn fetch_weather(
        &self,
        centroids: &[CityCentroid],
    ) -> Result<crate::models::StageOutput<WeatherObservation>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let progress = ProgressReporter::new(centroids.len() as u64, "Fetching weather...", self.silent);
        let observations = runtime.block_on(self.fetcher.fetch_all(centroids, Some(&progress)))?;
        progress.finish_with_message(&format!("Fetched {} observations", observations.completed.len()));

        Ok(observations)
    }
}
