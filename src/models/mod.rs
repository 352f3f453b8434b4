pub mod city;
pub mod hotel;
pub mod observation;
pub mod outcome;

pub use city::{BoundingBox, CityCentroid, CityKey};
pub use hotel::{RawLocationRecord, ResolvedHotel};
pub use observation::{ObservationRow, ObservationSource, WeatherObservation};
pub use outcome::{FailurePolicy, Stage, StageFailure, StageOutput};
