pub mod climate_analyzer;

pub use climate_analyzer::{AnalyticsResult, CityHighSwing, ClimateAnalyzer, IntradaySwing};
