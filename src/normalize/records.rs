//! Typed record shapes for the six datasets, plus the field validation that
//! admits a record into its dataset.
//!
//! Validation rejects, never clamps: a bounded value outside its range, a
//! missing required measurement, or a fractional value in an integer field
//! drops the whole record. Identity fields (`geohash`, `time`, and `expires`
//! where applicable) come from the owning location and the entry's own
//! timestamps.

use crate::fetch::response::{AlertEntry, DataPoint};
use crate::registry::LatLon;
use crate::utils::encode_geohash;
use chrono::{DateTime, Utc};
use std::fmt;

/// One of the six tabular datasets produced by a crawl cycle.
///
/// # Examples
///
/// ```
/// use darksky_crawler::Entity;
///
/// assert_eq!(Entity::AlertRegions.table_name(), "alert_regions");
/// assert_eq!(Entity::HourlyStats.to_string(), "hourly_stats");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Alerts,
    AlertRegions,
    HourlyInfo,
    HourlyStats,
    DailyInfo,
    DailyStats,
}

impl Entity {
    /// Every entity, in the order the sink commits them: alerts before their
    /// regions, info before its paired stats.
    pub const ALL: [Entity; 6] = [
        Entity::Alerts,
        Entity::AlertRegions,
        Entity::HourlyInfo,
        Entity::HourlyStats,
        Entity::DailyInfo,
        Entity::DailyStats,
    ];

    /// Destination table name, also the snapshot file stem.
    pub fn table_name(&self) -> &'static str {
        match self {
            Entity::Alerts => "alerts",
            Entity::AlertRegions => "alert_regions",
            Entity::HourlyInfo => "hourly_info",
            Entity::HourlyStats => "hourly_stats",
            Entity::DailyInfo => "daily_info",
            Entity::DailyStats => "daily_stats",
        }
    }

    pub fn snapshot_file(&self) -> String {
        format!("{}.csv", self.table_name())
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// Why a record was rejected during normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldIssue {
    Missing,
    OutOfRange(f64),
    NotAnInteger(f64),
    InvalidTimestamp(i64),
}

/// A single field-level rejection, carrying enough context to diagnose the
/// offending payload value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub issue: FieldIssue,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issue {
            FieldIssue::Missing => write!(f, "field '{}' is missing", self.field),
            FieldIssue::OutOfRange(v) => {
                write!(f, "field '{}' value {v} is out of range", self.field)
            }
            FieldIssue::NotAnInteger(v) => {
                write!(f, "field '{}' value {v} is not an integer", self.field)
            }
            FieldIssue::InvalidTimestamp(v) => {
                write!(f, "field '{}' value {v} is not a valid timestamp", self.field)
            }
        }
    }
}

fn violation(field: &'static str, issue: FieldIssue) -> FieldViolation {
    FieldViolation { field, issue }
}

fn require(field: &'static str, value: Option<f64>) -> Result<f64, FieldViolation> {
    value.ok_or_else(|| violation(field, FieldIssue::Missing))
}

fn bounded(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<f64, FieldViolation> {
    let v = require(field, value)?;
    if v < min || v > max {
        return Err(violation(field, FieldIssue::OutOfRange(v)));
    }
    Ok(v)
}

fn at_least(field: &'static str, value: Option<f64>, min: f64) -> Result<f64, FieldViolation> {
    let v = require(field, value)?;
    if v < min {
        return Err(violation(field, FieldIssue::OutOfRange(v)));
    }
    Ok(v)
}

fn bounded_int(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<i32, FieldViolation> {
    let v = bounded(field, value, min, max)?;
    if v.fract() != 0.0 {
        return Err(violation(field, FieldIssue::NotAnInteger(v)));
    }
    Ok(v as i32)
}

fn epoch(field: &'static str, value: Option<i64>) -> Result<DateTime<Utc>, FieldViolation> {
    let secs = value.ok_or_else(|| violation(field, FieldIssue::Missing))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| violation(field, FieldIssue::InvalidTimestamp(secs)))
}

/// Location annotation stamped onto every record extracted from one
/// response.
#[derive(Debug, Clone)]
pub(crate) struct RecordContext {
    pub geohash: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl RecordContext {
    pub(crate) fn new(location: LatLon) -> Self {
        Self {
            geohash: encode_geohash(location.0, location.1),
            latitude: location.0,
            longitude: location.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub geohash: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    pub title: String,
    pub severity: String,
    pub expires: DateTime<Utc>,
    pub description: String,
    pub uri: String,
}

impl AlertRecord {
    pub(crate) fn from_entry(
        ctx: &RecordContext,
        entry: &AlertEntry,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            geohash: ctx.geohash.clone(),
            latitude: ctx.latitude,
            longitude: ctx.longitude,
            time: epoch("time", Some(entry.time))?,
            expires: epoch("expires", Some(entry.expires))?,
            title: entry.title.clone(),
            severity: entry.severity.clone(),
            description: entry.description.clone(),
            uri: entry.uri.clone(),
        })
    }

    pub(crate) fn identity(&self) -> (Option<String>, i64, i64) {
        (
            self.geohash.clone(),
            self.time.timestamp(),
            self.expires.timestamp(),
        )
    }
}

/// A named region covered by a parent alert. Region rows carry the parent's
/// identity fields; the destination enforces the parent relationship and its
/// delete cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRegionRecord {
    pub geohash: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    pub region: String,
    pub expires: DateTime<Utc>,
}

impl AlertRegionRecord {
    pub(crate) fn from_alert(alert: &AlertRecord, region: &str) -> Self {
        Self {
            geohash: alert.geohash.clone(),
            latitude: alert.latitude,
            longitude: alert.longitude,
            time: alert.time,
            region: region.to_string(),
            expires: alert.expires,
        }
    }

    pub(crate) fn identity(&self) -> (Option<String>, String, i64, i64) {
        (
            self.geohash.clone(),
            self.region.clone(),
            self.time.timestamp(),
            self.expires.timestamp(),
        )
    }
}

/// Descriptive fields for one hourly or daily data point. The same shape
/// backs both granularities; the vendor omits these fields freely so all
/// three are nullable.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRecord {
    pub geohash: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    pub precip_type: Option<String>,
    pub summary: Option<String>,
    pub icon: Option<String>,
}

impl InfoRecord {
    pub(crate) fn from_point(
        ctx: &RecordContext,
        point: &DataPoint,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            geohash: ctx.geohash.clone(),
            latitude: ctx.latitude,
            longitude: ctx.longitude,
            time: epoch("time", Some(point.time))?,
            precip_type: point.precip_type.clone(),
            summary: point.summary.clone(),
            icon: point.icon.clone(),
        })
    }

    pub(crate) fn identity(&self) -> (Option<String>, i64) {
        (self.geohash.clone(), self.time.timestamp())
    }
}

/// Bounded measurement fields shared by hourly and daily stats.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsCore {
    pub cloud_cover: f64,
    pub dew_point: f64,
    pub humidity: f64,
    pub ozone: f64,
    pub precip_accumulation: f64,
    pub precip_intensity: f64,
    pub precip_probability: f64,
    pub pressure: f64,
    pub uv_index: i32,
    pub visibility: f64,
    pub wind_bearing: i32,
    pub wind_gust: f64,
    pub wind_speed: f64,
}

impl StatsCore {
    fn from_point(point: &DataPoint) -> Result<Self, FieldViolation> {
        Ok(Self {
            cloud_cover: bounded("cloudCover", point.cloud_cover, 0.0, 1.0)?,
            // The vendor omits dew point in some regions; it defaults rather
            // than rejecting the record.
            dew_point: point.dew_point.unwrap_or(0.0),
            humidity: bounded("humidity", point.humidity, 0.0, 1.0)?,
            ozone: require("ozone", point.ozone)?,
            precip_accumulation: at_least("precipAccumulation", point.precip_accumulation, 0.0)?,
            precip_intensity: require("precipIntensity", point.precip_intensity)?,
            precip_probability: bounded("precipProbability", point.precip_probability, 0.0, 1.0)?,
            pressure: require("pressure", point.pressure)?,
            uv_index: bounded_int("uvIndex", point.uv_index, 0.0, 10.0)?,
            visibility: bounded("visibility", point.visibility, 0.0, 10.0)?,
            wind_bearing: bounded_int("windBearing", point.wind_bearing, 0.0, 360.0)?,
            wind_gust: at_least("windGust", point.wind_gust, 0.0)?,
            wind_speed: at_least("windSpeed", point.wind_speed, 0.0)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyStatsRecord {
    pub geohash: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    pub stats: StatsCore,
    pub apparent_temperature: f64,
    pub temperature: f64,
}

impl HourlyStatsRecord {
    pub(crate) fn from_point(
        ctx: &RecordContext,
        point: &DataPoint,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            geohash: ctx.geohash.clone(),
            latitude: ctx.latitude,
            longitude: ctx.longitude,
            time: epoch("time", Some(point.time))?,
            stats: StatsCore::from_point(point)?,
            apparent_temperature: require("apparentTemperature", point.apparent_temperature)?,
            temperature: require("temperature", point.temperature)?,
        })
    }

    pub(crate) fn identity(&self) -> (Option<String>, i64) {
        (self.geohash.clone(), self.time.timestamp())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStatsRecord {
    pub geohash: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub time: DateTime<Utc>,
    pub stats: StatsCore,
    pub apparent_temperature_high: f64,
    pub apparent_temperature_high_time: DateTime<Utc>,
    pub apparent_temperature_low: f64,
    pub apparent_temperature_low_time: DateTime<Utc>,
    pub apparent_temperature_max: f64,
    pub apparent_temperature_max_time: DateTime<Utc>,
    pub apparent_temperature_min: f64,
    pub apparent_temperature_min_time: DateTime<Utc>,
    pub moon_phase: f64,
    pub precip_intensity_max: f64,
    pub precip_intensity_max_time: DateTime<Utc>,
    pub sunrise_time: DateTime<Utc>,
    pub sunset_time: DateTime<Utc>,
    pub temperature_high: f64,
    pub temperature_high_time: DateTime<Utc>,
    pub temperature_low: f64,
    pub temperature_low_time: DateTime<Utc>,
    pub temperature_max: f64,
    pub temperature_max_time: DateTime<Utc>,
    pub temperature_min: f64,
    pub temperature_min_time: DateTime<Utc>,
    pub wind_gust_time: DateTime<Utc>,
}

impl DailyStatsRecord {
    pub(crate) fn from_point(
        ctx: &RecordContext,
        point: &DataPoint,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            geohash: ctx.geohash.clone(),
            latitude: ctx.latitude,
            longitude: ctx.longitude,
            time: epoch("time", Some(point.time))?,
            stats: StatsCore::from_point(point)?,
            apparent_temperature_high: require(
                "apparentTemperatureHigh",
                point.apparent_temperature_high,
            )?,
            apparent_temperature_high_time: epoch(
                "apparentTemperatureHighTime",
                point.apparent_temperature_high_time,
            )?,
            apparent_temperature_low: require(
                "apparentTemperatureLow",
                point.apparent_temperature_low,
            )?,
            apparent_temperature_low_time: epoch(
                "apparentTemperatureLowTime",
                point.apparent_temperature_low_time,
            )?,
            apparent_temperature_max: require(
                "apparentTemperatureMax",
                point.apparent_temperature_max,
            )?,
            apparent_temperature_max_time: epoch(
                "apparentTemperatureMaxTime",
                point.apparent_temperature_max_time,
            )?,
            apparent_temperature_min: require(
                "apparentTemperatureMin",
                point.apparent_temperature_min,
            )?,
            apparent_temperature_min_time: epoch(
                "apparentTemperatureMinTime",
                point.apparent_temperature_min_time,
            )?,
            moon_phase: bounded("moonPhase", point.moon_phase, 0.0, 1.0)?,
            precip_intensity_max: require("precipIntensityMax", point.precip_intensity_max)?,
            precip_intensity_max_time: epoch(
                "precipIntensityMaxTime",
                point.precip_intensity_max_time,
            )?,
            sunrise_time: epoch("sunriseTime", point.sunrise_time)?,
            sunset_time: epoch("sunsetTime", point.sunset_time)?,
            temperature_high: require("temperatureHigh", point.temperature_high)?,
            temperature_high_time: epoch("temperatureHighTime", point.temperature_high_time)?,
            temperature_low: require("temperatureLow", point.temperature_low)?,
            temperature_low_time: epoch("temperatureLowTime", point.temperature_low_time)?,
            temperature_max: require("temperatureMax", point.temperature_max)?,
            temperature_max_time: epoch("temperatureMaxTime", point.temperature_max_time)?,
            temperature_min: require("temperatureMin", point.temperature_min)?,
            temperature_min_time: epoch("temperatureMinTime", point.temperature_min_time)?,
            wind_gust_time: epoch("windGustTime", point.wind_gust_time)?,
        })
    }

    pub(crate) fn identity(&self) -> (Option<String>, i64) {
        (self.geohash.clone(), self.time.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RecordContext {
        RecordContext::new(LatLon(40.0, -74.0))
    }

    fn hourly_point(overrides: serde_json::Value) -> DataPoint {
        let mut base = json!({
            "time": 1580511600,
            "precipType": "snow",
            "summary": "Light snow",
            "icon": "snow",
            "cloudCover": 0.8,
            "dewPoint": -3.1,
            "humidity": 0.9,
            "ozone": 310.2,
            "precipAccumulation": 1.2,
            "precipIntensity": 0.4,
            "precipProbability": 0.7,
            "pressure": 1012.3,
            "uvIndex": 1,
            "visibility": 4.5,
            "windBearing": 270,
            "windGust": 12.0,
            "windSpeed": 6.1,
            "apparentTemperature": -5.0,
            "temperature": -1.5
        });
        if let (Some(base_map), Some(override_map)) =
            (base.as_object_mut(), overrides.as_object())
        {
            for (key, value) in override_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base).expect("point decodes")
    }

    #[test]
    fn valid_hourly_point_is_admitted() {
        let record = HourlyStatsRecord::from_point(&ctx(), &hourly_point(json!({})))
            .expect("within bounds");
        assert_eq!(record.stats.uv_index, 1);
        assert_eq!(record.stats.wind_bearing, 270);
        assert_eq!(record.temperature, -1.5);
        assert!(record.geohash.is_some());
    }

    #[test]
    fn humidity_above_one_is_rejected_not_clamped() {
        let err = HourlyStatsRecord::from_point(&ctx(), &hourly_point(json!({"humidity": 1.4})))
            .expect_err("out of range");
        assert_eq!(err.field, "humidity");
        assert_eq!(err.issue, FieldIssue::OutOfRange(1.4));
    }

    #[test]
    fn boundary_values_are_admitted() {
        let point = hourly_point(json!({
            "humidity": 1.0,
            "visibility": 10.0,
            "uvIndex": 10,
            "windBearing": 360,
            "windSpeed": 0.0
        }));
        assert!(HourlyStatsRecord::from_point(&ctx(), &point).is_ok());
    }

    #[test]
    fn fractional_uv_index_is_rejected() {
        let err = HourlyStatsRecord::from_point(&ctx(), &hourly_point(json!({"uvIndex": 3.5})))
            .expect_err("not an integer");
        assert_eq!(err.field, "uvIndex");
        assert_eq!(err.issue, FieldIssue::NotAnInteger(3.5));
    }

    #[test]
    fn wind_bearing_above_360_is_rejected() {
        let err =
            HourlyStatsRecord::from_point(&ctx(), &hourly_point(json!({"windBearing": 361})))
                .expect_err("out of range");
        assert_eq!(err.field, "windBearing");
    }

    #[test]
    fn negative_precip_accumulation_is_rejected() {
        let err = HourlyStatsRecord::from_point(
            &ctx(),
            &hourly_point(json!({"precipAccumulation": -0.1})),
        )
        .expect_err("out of range");
        assert_eq!(err.field, "precipAccumulation");
    }

    #[test]
    fn missing_pressure_is_a_violation() {
        let mut point = hourly_point(json!({}));
        point.pressure = None;
        let err = HourlyStatsRecord::from_point(&ctx(), &point).expect_err("missing");
        assert_eq!(err.field, "pressure");
        assert_eq!(err.issue, FieldIssue::Missing);
    }

    #[test]
    fn missing_dew_point_defaults_to_zero() {
        let mut point = hourly_point(json!({}));
        point.dew_point = None;
        let record = HourlyStatsRecord::from_point(&ctx(), &point).expect("admitted");
        assert_eq!(record.stats.dew_point, 0.0);
    }

    #[test]
    fn info_record_tolerates_absent_descriptive_fields() {
        let point: DataPoint =
            serde_json::from_value(json!({ "time": 1580511600 })).expect("decodes");
        let record = InfoRecord::from_point(&ctx(), &point).expect("admitted");
        assert_eq!(record.precip_type, None);
        assert_eq!(record.summary, None);
        assert_eq!(record.icon, None);
    }

    #[test]
    fn daily_point_requires_its_extremes() {
        // An hourly-shaped point has no sunrise time.
        let err = DailyStatsRecord::from_point(&ctx(), &hourly_point(json!({})))
            .expect_err("missing extremes");
        assert_eq!(err.issue, FieldIssue::Missing);
    }

    #[test]
    fn moon_phase_above_one_is_rejected() {
        let point = hourly_point(json!({
            "apparentTemperatureHigh": 1.0, "apparentTemperatureHighTime": 1580511600,
            "apparentTemperatureLow": -2.0, "apparentTemperatureLowTime": 1580511600,
            "apparentTemperatureMax": 1.0, "apparentTemperatureMaxTime": 1580511600,
            "apparentTemperatureMin": -2.0, "apparentTemperatureMinTime": 1580511600,
            "moonPhase": 1.2,
            "precipIntensityMax": 0.5, "precipIntensityMaxTime": 1580511600,
            "sunriseTime": 1580480000, "sunsetTime": 1580515200,
            "temperatureHigh": 2.0, "temperatureHighTime": 1580511600,
            "temperatureLow": -3.0, "temperatureLowTime": 1580511600,
            "temperatureMax": 2.0, "temperatureMaxTime": 1580511600,
            "temperatureMin": -3.0, "temperatureMinTime": 1580511600,
            "windGustTime": 1580511600
        }));
        let err = DailyStatsRecord::from_point(&ctx(), &point).expect_err("out of range");
        assert_eq!(err.field, "moonPhase");
    }

    #[test]
    fn region_rows_share_the_parent_identity() {
        let entry: AlertEntry = serde_json::from_value(json!({
            "title": "Winter Storm Warning",
            "time": 1580511600,
            "expires": 1580515200,
            "description": "Heavy snow expected.",
            "uri": "https://alerts.weather.gov/x",
            "severity": "warning",
            "regions": ["NY-North"]
        }))
        .expect("entry decodes");
        let alert = AlertRecord::from_entry(&ctx(), &entry).expect("admitted");
        let region = AlertRegionRecord::from_alert(&alert, "NY-North");
        assert_eq!(region.geohash, alert.geohash);
        assert_eq!(region.time, alert.time);
        assert_eq!(region.expires, alert.expires);
        assert_eq!(region.region, "NY-North");
    }
}
