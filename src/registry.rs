use crate::error::CrawlError;
use log::info;
use sqlx::PgPool;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64`.
///
/// # Examples
///
/// ```
/// use darksky_crawler::LatLon;
///
/// let manhattan = LatLon(40.7831, -73.9712);
/// assert_eq!(manhattan.0, 40.7831); // Latitude
/// assert_eq!(manhattan.1, -73.9712); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Reads the crawl targets from the external `mapping_data` table.
///
/// The registry is read once per cycle; rows added or removed while a cycle
/// is in flight only take effect on the next cycle.
///
/// # Errors
///
/// Returns [`CrawlError::Registry`] when the mapping table cannot be read,
/// which includes the destination being unreachable at acquisition time.
pub async fn mapping_locations(pool: &PgPool) -> Result<Vec<LatLon>, CrawlError> {
    let rows: Vec<(f64, f64)> = sqlx::query_as("SELECT latitude, longitude FROM mapping_data")
        .fetch_all(pool)
        .await
        .map_err(CrawlError::Registry)?;
    info!("loaded {} locations from the mapping table", rows.len());
    Ok(rows.into_iter().map(|(lat, lon)| LatLon(lat, lon)).collect())
}
