pub mod hotel_reader;
pub mod observation_reader;
pub mod source_loader;

pub use hotel_reader::{HotelReader, ParsedRows};
pub use observation_reader::ObservationReader;
pub use source_loader::{LoadReport, SourceLoader};
