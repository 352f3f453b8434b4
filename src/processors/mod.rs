pub mod centroid_aggregator;
pub mod pipeline;

pub use centroid_aggregator::CentroidAggregator;
pub use pipeline::{Pipeline, PipelineOutput};
