use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotel_weather::analyzers::ClimateAnalyzer;
use hotel_weather::models::{CityKey, ObservationSource, ResolvedHotel, WeatherObservation};
use hotel_weather::processors::CentroidAggregator;
use hotel_weather::readers::HotelReader;
use hotel_weather::utils::coordinates::parse_position;

// Create test data for benchmarking
fn create_test_hotels(city_count: usize, hotels_per_city: usize) -> Vec<ResolvedHotel> {
    let mut hotels = Vec::with_capacity(city_count * hotels_per_city);

    for city in 0..city_count {
        for hotel in 0..hotels_per_city {
            hotels.push(ResolvedHotel {
                name: format!("Hotel {}-{}", city, hotel),
                country: format!("C{}", city % 7),
                city: format!("City {}", city),
                address: String::new(),
                latitude: -60.0 + (city as f64) * 0.1 + (hotel as f64) * 0.001,
                longitude: -170.0 + (city as f64) * 0.2 - (hotel as f64) * 0.001,
            });
        }
    }

    hotels
}

fn create_test_observations(city_count: usize) -> Vec<WeatherObservation> {
    let base_date = NaiveDate::from_ymd_opt(2021, 5, 20).unwrap();
    let mut observations = Vec::with_capacity(city_count * 11);

    for city in 0..city_count {
        let key = CityKey::new(format!("C{}", city % 7), format!("City {}", city));
        for day in 0..11 {
            let temp = 10.0 + (city % 13) as f64 + (day as f64) * 0.7;
            observations.push(WeatherObservation::new(
                key.clone(),
                base_date + chrono::Duration::days(day),
                temp,
                temp - 3.0 - (day % 4) as f64,
                temp + 2.5 + (city % 5) as f64,
                if day < 5 {
                    ObservationSource::Historical
                } else {
                    ObservationSource::Forecast
                },
            ));
        }
    }

    observations
}

fn create_test_csv(rows: usize) -> String {
    let mut csv = String::from("Id,Name,Country,City,Latitude,Longitude\n");
    for i in 0..rows {
        // Every tenth row carries an unusable coordinate
        let latitude = if i % 10 == 9 {
            "n/a".to_string()
        } else {
            format!("{:.4}", 40.0 + (i % 100) as f64 * 0.01)
        };
        csv.push_str(&format!("{},Hotel {},GB,London,{},-0.12\n", i, i, latitude));
    }
    csv
}

fn benchmark_centroid_aggregation(c: &mut Criterion) {
    let hotels = create_test_hotels(200, 50);

    c.bench_function("centroid_aggregation", |b| {
        b.iter(|| {
            let aggregator = CentroidAggregator::new();
            black_box(aggregator.compute_centroids(&hotels).len())
        })
    });
}

fn benchmark_analytics(c: &mut Criterion) {
    let observations = create_test_observations(500);

    c.bench_function("climate_analytics", |b| {
        b.iter(|| {
            let analyzer = ClimateAnalyzer::new();
            black_box(analyzer.analyze(&observations).map(|r| r.max_city_high_swing.delta).unwrap_or(0.0))
        })
    });
}

fn benchmark_coordinate_parsing(c: &mut Criterion) {
    let positions = vec![
        ("51.5074", "-0.1278"),
        ("48.2082", "16.3738"),
        ("abc", "2.35"),
        ("95.0", "10.0"),
        ("-33.8688", "151.2093"),
    ];

    c.bench_function("coordinate_parsing", |b| {
        b.iter(|| {
            let valid = positions
                .iter()
                .filter(|(lat, lon)| parse_position(lat, lon).is_ok())
                .count();
            black_box(valid)
        })
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("hotel_loading_by_size");

    for &size in &[100, 1_000, 10_000] {
        let csv = create_test_csv(size);
        group.bench_with_input(BenchmarkId::new("rows", size), &csv, |b, csv| {
            let reader = HotelReader::new();
            b.iter(|| {
                let parsed = reader.read_hotels(csv.as_bytes(), "bench.csv");
                black_box(parsed.map(|p| p.records.len()).unwrap_or(0))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_centroid_aggregation,
    benchmark_analytics,
    benchmark_coordinate_parsing,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
