use crate::error::Result;
use crate::geocoding::Geocoder;
use crate::models::{FailurePolicy, RawLocationRecord, ResolvedHotel, Stage, StageOutput};
use crate::utils::progress::ProgressReporter;
use crate::utils::retry::{retry_blocking, RetryConfig};
use rayon::prelude::*;

/// Resolves every cleaned record through a geocoder on a fixed-size worker
/// pool. Each worker blocks on its own request; workers only share the
/// geocoder and their own input/output.
pub struct AddressResolver<G> {
    geocoder: G,
    max_workers: usize,
    retry: RetryConfig,
    policy: FailurePolicy,
}

impl<G: Geocoder> AddressResolver<G> {
    pub fn new(geocoder: G, max_workers: usize) -> Self {
        Self {
            geocoder,
            max_workers: max_workers.max(1),
            retry: RetryConfig::default(),
            policy: FailurePolicy::default(),
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

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Resolve one record: country from the service, city by precedence
    pub fn resolve_one(&self, record: RawLocationRecord) -> Result<ResolvedHotel> {
        let label = format!("Reverse geocode ({})", record.coordinates_label());
        let address = retry_blocking(&self.retry, &label, || {
            self.geocoder.reverse(record.latitude, record.longitude)
        })?;

        let country = address.normalized_country();
        let city = address
            .locality(record.city.as_deref())
            .unwrap_or_default()
            .to_string();

        Ok(ResolvedHotel::from_raw(
            record,
            address.display_address,
            country,
            city,
        ))
    }

    /// Resolve all records. Output keeps input order; the call returns only
    /// after every worker is done. Under `Abort` workers stop taking new
    /// records once one has failed.
    pub fn resolve_all(
        &self,
        records: Vec<RawLocationRecord>,
        progress: Option<&ProgressReporter>,
    ) -> Result<StageOutput<ResolvedHotel>> {
        let total = records.len();
        tracing::info!(
            "Geocoding {} hotels on {} workers",
            total,
            self.max_workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()?;

        let output = pool.install(|| match self.policy {
            FailurePolicy::Abort => records
                .into_par_iter()
                .map(|record| self.resolve_tracked(record, progress).1)
                .collect::<Result<Vec<_>>>()
                .map(|completed| StageOutput {
                    completed,
                    failures: Vec::new(),
                }),
            FailurePolicy::Skip => {
                let outcomes: Vec<(String, Result<ResolvedHotel>)> = records
                    .into_par_iter()
                    .map(|record| self.resolve_tracked(record, progress))
                    .collect();
                StageOutput::collect(outcomes, Stage::Geocoding, self.policy)
            }
        })?;

        tracing::info!(
            "Geocoded {} of {} hotels ({} skipped)",
            output.completed.len(),
            total,
            output.failures.len()
        );

        Ok(output)
    }

    fn resolve_tracked(
        &self,
        record: RawLocationRecord,
        progress: Option<&ProgressReporter>,
    ) -> (String, Result<ResolvedHotel>) {
        let subject = format!("{} ({})", record.name, record.coordinates_label());
        let outcome = self.resolve_one(record);

        if let Some(p) = progress {
            p.increment(1);
        }

        (subject, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::geocoding::GeocodedAddress;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread::ThreadId;

    /// Answers from the latitude: < 0 fails, 0..10 has a city, 10..20 a town,
    /// 20..30 a village, anything else no locality at all.
    struct FakeGeocoder {
        calls: AtomicUsize,
        threads: Mutex<HashSet<ThreadId>>,
    }

    impl FakeGeocoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                threads: Mutex::new(HashSet::new()),
            }
        }
    }

    impl Geocoder for FakeGeocoder {
        fn reverse(&self, latitude: f64, longitude: f64) -> Result<GeocodedAddress> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut threads) = self.threads.lock() {
                threads.insert(std::thread::current().id());
            }
            std::thread::sleep(std::time::Duration::from_millis(5));

            if latitude < 0.0 {
                return Err(ProcessingError::Geocoding {
                    latitude,
                    longitude,
                    message: "no result".to_string(),
                    transient: false,
                });
            }

            let name = |tag: &str| Some(format!("{}-{}", tag, latitude as i64));
            Ok(GeocodedAddress {
                display_address: format!("addr {}", latitude),
                country_code: "de".to_string(),
                city: (latitude < 10.0).then(|| name("city")).flatten(),
                town: (latitude < 20.0).then(|| name("town")).flatten(),
                village: (latitude < 30.0).then(|| name("village")).flatten(),
            })
        }
    }

    fn record(name: &str, latitude: f64, city: Option<&str>) -> RawLocationRecord {
        RawLocationRecord::new(
            name.to_string(),
            Some("XX".to_string()),
            city.map(str::to_string),
            latitude,
            10.0,
        )
        .unwrap()
    }

    #[test]
    fn test_precedence_and_country_override() {
        let resolver = AddressResolver::new(FakeGeocoder::new(), 2);
        let records = vec![
            record("a", 5.0, Some("Source")),
            record("b", 15.0, Some("Source")),
            record("c", 25.0, Some("Source")),
            record("d", 35.0, Some("Source")),
            record("e", 45.0, None),
        ];

        let output = resolver.resolve_all(records, None).unwrap();
        let cities: Vec<&str> = output.completed.iter().map(|h| h.city.as_str()).collect();
        assert_eq!(cities, vec!["city-5", "town-15", "village-25", "Source", ""]);
        assert!(output.completed.iter().all(|h| h.country == "DE"));
        assert_eq!(output.completed[0].address, "addr 5");
    }

    #[test]
    fn test_runs_on_parallel_workers_and_keeps_order() {
        let resolver = AddressResolver::new(FakeGeocoder::new(), 4);
        let records: Vec<_> = (0..32).map(|i| record(&i.to_string(), i as f64 % 9.0, None)).collect();

        let output = resolver.resolve_all(records, None).unwrap();
        let names: Vec<String> = output.completed.iter().map(|h| h.name.clone()).collect();
        let expected: Vec<String> = (0..32).map(|i: i32| i.to_string()).collect();
        assert_eq!(names, expected);
        assert_eq!(resolver.geocoder.calls.load(Ordering::SeqCst), 32);
        assert!(resolver.geocoder.threads.lock().unwrap().len() > 1);
    }

    #[test]
    fn test_skip_policy_reports_failed_records() {
        let resolver = AddressResolver::new(FakeGeocoder::new(), 2)
            .with_failure_policy(FailurePolicy::Skip);
        let output = resolver
            .resolve_all(vec![record("ok", 5.0, None), record("bad", -5.0, None)], None)
            .unwrap();

        assert_eq!(output.completed.len(), 1);
        assert_eq!(output.failures.len(), 1);
        assert!(output.failures[0].subject.starts_with("bad"));
    }

    #[test]
    fn test_abort_policy_fails_the_stage() {
        let resolver = AddressResolver::new(FakeGeocoder::new(), 2)
            .with_failure_policy(FailurePolicy::Abort);
        let result = resolver.resolve_all(vec![record("ok", 5.0, None), record("bad", -5.0, None)], None);
        assert!(matches!(result, Err(ProcessingError::Geocoding { .. })));
    }

    #[test]
    fn test_abort_policy_stops_issuing_requests() {
        let resolver = AddressResolver::new(FakeGeocoder::new(), 2)
            .with_retry(RetryConfig::disabled())
            .with_failure_policy(FailurePolicy::Abort);
        let records: Vec<_> = (0..200).map(|i| record(&i.to_string(), -1.0 - i as f64 % 50.0, None)).collect();

        let result = resolver.resolve_all(records, None);

        assert!(matches!(result, Err(ProcessingError::Geocoding { .. })));
        let calls = resolver.geocoder.calls.load(Ordering::SeqCst);
        assert!(calls < 20, "{} requests issued after the first failure", calls);
    }
}
