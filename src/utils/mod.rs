pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;
pub mod retry;

pub use constants::*;
pub use coordinates::{parse_coordinate, parse_position, validate_coordinates};
pub use filename::{city_dir, hotel_chunk_filename, sanitize_component, temperature_series_filename};
pub use progress::ProgressReporter;
pub use retry::RetryConfig;
