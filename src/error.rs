use crate::fetch::error::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Dark Sky API key is empty")]
    MissingApiKey,

    #[error("No target locations configured for this cycle")]
    NoLocations,

    #[error("Failed to load target locations from the mapping table")]
    Registry(#[source] sqlx::Error),
}
