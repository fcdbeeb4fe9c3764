use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to construct the HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Forecast request for ({lat}, {lon}) failed")]
    NetworkRequest {
        lat: f64,
        lon: f64,
        #[source]
        source: reqwest::Error,
    },

    #[error("Forecast request for ({lat}, {lon}) returned status {status}")]
    HttpStatus {
        lat: f64,
        lon: f64,
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode the forecast payload for ({lat}, {lon})")]
    BodyDecode {
        lat: f64,
        lon: f64,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// True when the failure was the per-request timeout firing.
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::NetworkRequest { source, .. } | FetchError::BodyDecode { source, .. } => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}
