//! Serde views over the vendor's forecast payload.
//!
//! The wire schema is vendor-defined and treated as a black box beyond the
//! fields the pipeline consumes; everything else is ignored. Alert and data
//! point entries are kept as raw [`Value`]s so that one malformed entry can
//! be rejected on its own instead of poisoning the whole response.

use serde::Deserialize;
use serde_json::Value;

/// One location's raw forecast response.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub alerts: Vec<Value>,
    pub hourly: Option<DataBlock>,
    pub daily: Option<DataBlock>,
}

/// The hourly or daily block: a summary plus its run of data points.
#[derive(Debug, Clone, Deserialize)]
pub struct DataBlock {
    pub summary: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub data: Vec<Value>,
}

/// A severe weather alert entry. All fields are required; an entry missing
/// any of them fails to decode and is dropped as a validation failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry {
    pub title: String,
    pub time: i64,
    pub expires: i64,
    pub description: String,
    pub uri: String,
    pub severity: String,
    #[serde(default)]
    pub regions: Vec<String>,
}

/// One hourly or daily data point. Only `time` is structurally required
/// here; presence of the measurement fields is enforced per record type
/// during normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub time: i64,
    pub precip_type: Option<String>,
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub cloud_cover: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub ozone: Option<f64>,
    pub precip_accumulation: Option<f64>,
    pub precip_intensity: Option<f64>,
    pub precip_probability: Option<f64>,
    pub pressure: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_speed: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub temperature: Option<f64>,
    // Daily-only extremes; absent on hourly points.
    pub apparent_temperature_high: Option<f64>,
    pub apparent_temperature_high_time: Option<i64>,
    pub apparent_temperature_low: Option<f64>,
    pub apparent_temperature_low_time: Option<i64>,
    pub apparent_temperature_max: Option<f64>,
    pub apparent_temperature_max_time: Option<i64>,
    pub apparent_temperature_min: Option<f64>,
    pub apparent_temperature_min_time: Option<i64>,
    pub moon_phase: Option<f64>,
    pub precip_intensity_max: Option<f64>,
    pub precip_intensity_max_time: Option<i64>,
    pub sunrise_time: Option<i64>,
    pub sunset_time: Option<i64>,
    pub wind_gust_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_response() {
        let response: ForecastResponse = serde_json::from_value(json!({
            "latitude": 40.0,
            "longitude": -74.0,
            "timezone": "America/New_York",
            "currently": { "time": 1580511600, "summary": "Clear" },
            "alerts": [{
                "title": "Winter Storm Warning",
                "time": 1580511600,
                "expires": 1580515200,
                "description": "Heavy snow expected.",
                "uri": "https://alerts.weather.gov/x",
                "severity": "warning",
                "regions": ["NY-North"]
            }],
            "hourly": {
                "summary": "Snow throughout the day.",
                "icon": "snow",
                "data": [{ "time": 1580511600, "temperature": -1.2 }]
            },
            "daily": { "data": [] }
        }))
        .expect("well-formed payload");

        assert_eq!(response.latitude, Some(40.0));
        assert_eq!(response.alerts.len(), 1);
        let hourly = response.hourly.expect("hourly block");
        assert_eq!(hourly.icon.as_deref(), Some("snow"));
        assert_eq!(hourly.data.len(), 1);
        assert!(response.daily.expect("daily block").data.is_empty());
    }

    #[test]
    fn missing_blocks_decode_to_empty() {
        let response: ForecastResponse =
            serde_json::from_value(json!({ "latitude": 1.0, "longitude": 2.0 }))
                .expect("minimal payload");
        assert!(response.alerts.is_empty());
        assert!(response.hourly.is_none());
        assert!(response.daily.is_none());
    }

    #[test]
    fn alert_entry_requires_expires() {
        let entry = serde_json::from_value::<AlertEntry>(json!({
            "title": "Flood Watch",
            "time": 1580511600,
            "description": "",
            "uri": "https://alerts.weather.gov/y",
            "severity": "watch"
        }));
        assert!(entry.is_err());
    }

    #[test]
    fn data_point_measurements_are_optional() {
        let point: DataPoint = serde_json::from_value(json!({ "time": 1580511600 }))
            .expect("time alone is structurally valid");
        assert!(point.temperature.is_none());
        assert!(point.precip_type.is_none());
    }
}
