mod crawler;
mod error;
mod fetch;
mod normalize;
mod registry;
mod sink;
mod utils;

pub use error::CrawlError;

pub use crawler::{CrawlSummary, Crawler, FetchFailure};

pub use fetch::coordinator::{
    FetchCoordinator, LocationFetch, DEFAULT_EXCLUDE_ARGS, FORECAST_URL_TEMPLATE,
};
pub use fetch::error::FetchError;
pub use fetch::response::{AlertEntry, DataBlock, DataPoint, ForecastResponse};

pub use normalize::normalizer::{normalize, Datasets, DropTally, Normalized};
pub use normalize::records::{
    AlertRecord, AlertRegionRecord, DailyStatsRecord, Entity, FieldIssue, FieldViolation,
    HourlyStatsRecord, InfoRecord, StatsCore,
};

pub use registry::{mapping_locations, LatLon};

pub use sink::error::SinkError;
pub use sink::writer::{DatasetSink, EntityWrite, SinkReport};

pub use utils::encode_geohash;
