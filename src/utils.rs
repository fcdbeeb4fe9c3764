use geohash::Coord;
use log::warn;

pub(crate) const GEOHASH_PRECISION: usize = 12;

/// Derives the spatial identity key for a coordinate pair.
///
/// Returns `None` (and logs the failure) when the coordinates fall outside
/// the encodable range; records keep a null geohash in that case.
pub fn encode_geohash(latitude: f64, longitude: f64) -> Option<String> {
    match geohash::encode(
        Coord {
            x: longitude,
            y: latitude,
        },
        GEOHASH_PRECISION,
    ) {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!("failed to derive geohash for ({latitude}, {longitude}): {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_at_full_precision() {
        let hash = encode_geohash(57.64911, 10.40744).expect("valid coordinates");
        assert_eq!(hash.len(), GEOHASH_PRECISION);
        // Well-known reference hash for this coordinate pair.
        assert!(hash.starts_with("u4pruydqqvj"));
    }

    #[test]
    fn out_of_range_latitude_yields_none() {
        assert_eq!(encode_geohash(95.0, 10.0), None);
    }
}
