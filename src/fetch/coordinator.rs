//! Concurrent per-location retrieval of forecast responses under one shared
//! credential and a bounded request window.

use crate::fetch::error::FetchError;
use crate::fetch::response::ForecastResponse;
use crate::registry::LatLon;
use bon::bon;
use futures_util::stream::{self, StreamExt};
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;

/// Default Dark Sky forecast endpoint, parameterized by credential and
/// coordinates.
pub const FORECAST_URL_TEMPLATE: &str =
    "https://api.darksky.net/forecast/{key}/{latitude},{longitude}";

/// Response blocks stripped from every request unless configured otherwise.
pub const DEFAULT_EXCLUDE_ARGS: &[&str] = &["currently", "minutely", "flags"];

const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The outcome of one location's fetch. A failed location carries its error
/// here instead of aborting the cycle.
#[derive(Debug)]
pub struct LocationFetch {
    pub location: LatLon,
    pub result: Result<ForecastResponse, FetchError>,
}

/// Issues one forecast request per location, concurrently, under a bounded
/// issuance window.
///
/// The credential is attached to every request via the URL template, and the
/// configured exclusion set is appended as a single `exclude=` argument so
/// that excluded blocks are never requested. Failures are per location; the
/// coordinator applies no retry policy of its own.
pub struct FetchCoordinator {
    client: Client,
    api_key: String,
    url_template: String,
    exclude_args: Vec<String>,
    concurrency: usize,
}

#[bon]
impl FetchCoordinator {
    /// Creates a coordinator for one credential.
    ///
    /// * `.api_key(String)`: **Required.** The shared Dark Sky credential.
    /// * `.url_template(String)`: Optional. Defaults to [`FORECAST_URL_TEMPLATE`].
    /// * `.exclude_args(Vec<String>)`: Optional. Defaults to [`DEFAULT_EXCLUDE_ARGS`].
    /// * `.concurrency(usize)`: Optional. Width of the issuance window, default 8.
    /// * `.request_timeout(Duration)`: Optional. Per-request ceiling, default 30s.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the underlying HTTP client
    /// cannot be constructed.
    #[builder]
    pub fn new(
        api_key: String,
        url_template: Option<String>,
        exclude_args: Option<Vec<String>>,
        concurrency: Option<usize>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            client,
            api_key,
            url_template: url_template.unwrap_or_else(|| FORECAST_URL_TEMPLATE.to_string()),
            exclude_args: exclude_args.unwrap_or_else(|| {
                DEFAULT_EXCLUDE_ARGS.iter().map(|s| s.to_string()).collect()
            }),
            concurrency: concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1),
        })
    }

    /// Fetches every location concurrently and fans the results back in.
    ///
    /// Issuance is throttled to the configured window rather than firing all
    /// requests simultaneously. One location's transport failure, error
    /// status, or timeout never aborts the others.
    pub async fn fetch_all(&self, locations: &[LatLon]) -> Vec<LocationFetch> {
        let fetches = stream::iter(locations.iter().copied().map(|location| async move {
            let result = self.fetch_one(location).await;
            LocationFetch { location, result }
        }))
        .buffer_unordered(self.concurrency)
        .collect::<Vec<_>>()
        .await;

        let failed = fetches.iter().filter(|f| f.result.is_err()).count();
        info!(
            "fetched {} of {} locations ({} failed)",
            fetches.len() - failed,
            fetches.len(),
            failed
        );
        fetches
    }

    async fn fetch_one(&self, location: LatLon) -> Result<ForecastResponse, FetchError> {
        let LatLon(lat, lon) = location;
        let url = self.request_url(location);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("forecast request for ({lat}, {lon}) failed: {e}");
            FetchError::NetworkRequest {
                lat,
                lon,
                source: e,
            }
        })?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                warn!("forecast request for ({lat}, {lon}) returned an error status: {e}");
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        lat,
                        lon,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest {
                        lat,
                        lon,
                        source: e,
                    }
                });
            }
        };

        response.json::<ForecastResponse>().await.map_err(|e| {
            warn!("failed to decode the forecast payload for ({lat}, {lon}): {e}");
            FetchError::BodyDecode {
                lat,
                lon,
                source: e,
            }
        })
    }

    fn request_url(&self, location: LatLon) -> String {
        let mut url = self
            .url_template
            .replace("{key}", &self.api_key)
            .replace("{latitude}", &location.0.to_string())
            .replace("{longitude}", &location.1.to_string());
        if !self.exclude_args.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str("exclude=");
            url.push_str(&self.exclude_args.join(","));
        }
        url
    }
}
