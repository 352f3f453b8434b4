/// Hotel CSV column names (matched case-insensitively)
pub const COLUMN_NAME: &str = "Name";
pub const COLUMN_COUNTRY: &str = "Country";
pub const COLUMN_CITY: &str = "City";
pub const COLUMN_LATITUDE: &str = "Latitude";
pub const COLUMN_LONGITUDE: &str = "Longitude";

/// Coordinate bounds, exclusive
pub const MAX_ABS_LATITUDE: f64 = 90.0;
pub const MAX_ABS_LONGITUDE: f64 = 180.0;

/// Forecast series shape: 5 days at 3-hour resolution
pub const FORECAST_SAMPLE_COUNT: usize = 40;
pub const FORECAST_SAMPLE_INDICES: [usize; 6] = [0, 8, 16, 24, 32, 39];

/// Historical lookback, one request per day
pub const HISTORICAL_DAYS: i64 = 5;

/// Observations a fully fetched city contributes
pub const OBSERVATIONS_PER_CITY: usize = HISTORICAL_DAYS as usize + FORECAST_SAMPLE_INDICES.len();

/// Export defaults
pub const HOTELS_CHUNK_SIZE: usize = 100;
pub const CENTROIDS_FILE: &str = "city_centres.csv";
pub const OBSERVATIONS_FILE: &str = "weather.csv";
pub const HOTTEST_FILE: &str = "hottest_city_and_day.csv";
pub const COLDEST_FILE: &str = "coldest_city_and_day.csv";
pub const INTRADAY_SWING_FILE: &str = "biggest_daily_temp_change_city_and_day.csv";
pub const CITY_SWING_FILE: &str = "biggest_max_temp_change_city_and_day.csv";
pub const FAILURES_FILE: &str = "failures.csv";

/// Service defaults
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_USER_AGENT: &str = "hotel-weather/0.1";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONFIG_FILE: &str = "hotel-weather.toml";
pub const ENV_PREFIX: &str = "HOTEL_WEATHER";
