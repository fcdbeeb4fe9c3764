//! DataFrame builders for the snapshot files: one column-for-column view per
//! entity, in the same column order the upsert statements bind.

use crate::normalize::records::{
    AlertRecord, AlertRegionRecord, DailyStatsRecord, HourlyStatsRecord, InfoRecord,
};
use polars::prelude::*;

pub(crate) fn alerts_frame(rows: &[AlertRecord]) -> PolarsResult<DataFrame> {
    df!(
        "geohash" => rows.iter().map(|r| r.geohash.clone()).collect::<Vec<_>>(),
        "latitude" => rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "longitude" => rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "time" => rows.iter().map(|r| r.time.naive_utc()).collect::<Vec<_>>(),
        "title" => rows.iter().map(|r| r.title.clone()).collect::<Vec<_>>(),
        "severity" => rows.iter().map(|r| r.severity.clone()).collect::<Vec<_>>(),
        "expires" => rows.iter().map(|r| r.expires.naive_utc()).collect::<Vec<_>>(),
        "description" => rows.iter().map(|r| r.description.clone()).collect::<Vec<_>>(),
        "uri" => rows.iter().map(|r| r.uri.clone()).collect::<Vec<_>>(),
    )
}

pub(crate) fn alert_regions_frame(rows: &[AlertRegionRecord]) -> PolarsResult<DataFrame> {
    df!(
        "geohash" => rows.iter().map(|r| r.geohash.clone()).collect::<Vec<_>>(),
        "latitude" => rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "longitude" => rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "time" => rows.iter().map(|r| r.time.naive_utc()).collect::<Vec<_>>(),
        "region" => rows.iter().map(|r| r.region.clone()).collect::<Vec<_>>(),
        "expires" => rows.iter().map(|r| r.expires.naive_utc()).collect::<Vec<_>>(),
    )
}

pub(crate) fn info_frame(rows: &[InfoRecord]) -> PolarsResult<DataFrame> {
    df!(
        "geohash" => rows.iter().map(|r| r.geohash.clone()).collect::<Vec<_>>(),
        "latitude" => rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "longitude" => rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "time" => rows.iter().map(|r| r.time.naive_utc()).collect::<Vec<_>>(),
        "precip_type" => rows.iter().map(|r| r.precip_type.clone()).collect::<Vec<_>>(),
        "summary" => rows.iter().map(|r| r.summary.clone()).collect::<Vec<_>>(),
        "icon" => rows.iter().map(|r| r.icon.clone()).collect::<Vec<_>>(),
    )
}

pub(crate) fn hourly_stats_frame(rows: &[HourlyStatsRecord]) -> PolarsResult<DataFrame> {
    df!(
        "geohash" => rows.iter().map(|r| r.geohash.clone()).collect::<Vec<_>>(),
        "latitude" => rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "longitude" => rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "time" => rows.iter().map(|r| r.time.naive_utc()).collect::<Vec<_>>(),
        "cloud_cover" => rows.iter().map(|r| r.stats.cloud_cover).collect::<Vec<_>>(),
        "dew_point" => rows.iter().map(|r| r.stats.dew_point).collect::<Vec<_>>(),
        "humidity" => rows.iter().map(|r| r.stats.humidity).collect::<Vec<_>>(),
        "ozone" => rows.iter().map(|r| r.stats.ozone).collect::<Vec<_>>(),
        "precip_accumulation" => rows.iter().map(|r| r.stats.precip_accumulation).collect::<Vec<_>>(),
        "precip_intensity" => rows.iter().map(|r| r.stats.precip_intensity).collect::<Vec<_>>(),
        "precip_probability" => rows.iter().map(|r| r.stats.precip_probability).collect::<Vec<_>>(),
        "pressure" => rows.iter().map(|r| r.stats.pressure).collect::<Vec<_>>(),
        "uv_index" => rows.iter().map(|r| r.stats.uv_index).collect::<Vec<_>>(),
        "visibility" => rows.iter().map(|r| r.stats.visibility).collect::<Vec<_>>(),
        "wind_bearing" => rows.iter().map(|r| r.stats.wind_bearing).collect::<Vec<_>>(),
        "wind_gust" => rows.iter().map(|r| r.stats.wind_gust).collect::<Vec<_>>(),
        "wind_speed" => rows.iter().map(|r| r.stats.wind_speed).collect::<Vec<_>>(),
        "apparent_temperature" => rows.iter().map(|r| r.apparent_temperature).collect::<Vec<_>>(),
        "temperature" => rows.iter().map(|r| r.temperature).collect::<Vec<_>>(),
    )
}

pub(crate) fn daily_stats_frame(rows: &[DailyStatsRecord]) -> PolarsResult<DataFrame> {
    df!(
        "geohash" => rows.iter().map(|r| r.geohash.clone()).collect::<Vec<_>>(),
        "latitude" => rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
        "longitude" => rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
        "time" => rows.iter().map(|r| r.time.naive_utc()).collect::<Vec<_>>(),
        "cloud_cover" => rows.iter().map(|r| r.stats.cloud_cover).collect::<Vec<_>>(),
        "dew_point" => rows.iter().map(|r| r.stats.dew_point).collect::<Vec<_>>(),
        "humidity" => rows.iter().map(|r| r.stats.humidity).collect::<Vec<_>>(),
        "ozone" => rows.iter().map(|r| r.stats.ozone).collect::<Vec<_>>(),
        "precip_accumulation" => rows.iter().map(|r| r.stats.precip_accumulation).collect::<Vec<_>>(),
        "precip_intensity" => rows.iter().map(|r| r.stats.precip_intensity).collect::<Vec<_>>(),
        "precip_probability" => rows.iter().map(|r| r.stats.precip_probability).collect::<Vec<_>>(),
        "pressure" => rows.iter().map(|r| r.stats.pressure).collect::<Vec<_>>(),
        "uv_index" => rows.iter().map(|r| r.stats.uv_index).collect::<Vec<_>>(),
        "visibility" => rows.iter().map(|r| r.stats.visibility).collect::<Vec<_>>(),
        "wind_bearing" => rows.iter().map(|r| r.stats.wind_bearing).collect::<Vec<_>>(),
        "wind_gust" => rows.iter().map(|r| r.stats.wind_gust).collect::<Vec<_>>(),
        "wind_speed" => rows.iter().map(|r| r.stats.wind_speed).collect::<Vec<_>>(),
        "apparent_temperature_high" => rows.iter().map(|r| r.apparent_temperature_high).collect::<Vec<_>>(),
        "apparent_temperature_high_time" => rows.iter().map(|r| r.apparent_temperature_high_time.naive_utc()).collect::<Vec<_>>(),
        "apparent_temperature_low" => rows.iter().map(|r| r.apparent_temperature_low).collect::<Vec<_>>(),
        "apparent_temperature_low_time" => rows.iter().map(|r| r.apparent_temperature_low_time.naive_utc()).collect::<Vec<_>>(),
        "apparent_temperature_max" => rows.iter().map(|r| r.apparent_temperature_max).collect::<Vec<_>>(),
        "apparent_temperature_max_time" => rows.iter().map(|r| r.apparent_temperature_max_time.naive_utc()).collect::<Vec<_>>(),
        "apparent_temperature_min" => rows.iter().map(|r| r.apparent_temperature_min).collect::<Vec<_>>(),
        "apparent_temperature_min_time" => rows.iter().map(|r| r.apparent_temperature_min_time.naive_utc()).collect::<Vec<_>>(),
        "moon_phase" => rows.iter().map(|r| r.moon_phase).collect::<Vec<_>>(),
        "precip_intensity_max" => rows.iter().map(|r| r.precip_intensity_max).collect::<Vec<_>>(),
        "precip_intensity_max_time" => rows.iter().map(|r| r.precip_intensity_max_time.naive_utc()).collect::<Vec<_>>(),
        "sunrise_time" => rows.iter().map(|r| r.sunrise_time.naive_utc()).collect::<Vec<_>>(),
        "sunset_time" => rows.iter().map(|r| r.sunset_time.naive_utc()).collect::<Vec<_>>(),
        "temperature_high" => rows.iter().map(|r| r.temperature_high).collect::<Vec<_>>(),
        "temperature_high_time" => rows.iter().map(|r| r.temperature_high_time.naive_utc()).collect::<Vec<_>>(),
        "temperature_low" => rows.iter().map(|r| r.temperature_low).collect::<Vec<_>>(),
        "temperature_low_time" => rows.iter().map(|r| r.temperature_low_time.naive_utc()).collect::<Vec<_>>(),
        "temperature_max" => rows.iter().map(|r| r.temperature_max).collect::<Vec<_>>(),
        "temperature_max_time" => rows.iter().map(|r| r.temperature_max_time.naive_utc()).collect::<Vec<_>>(),
        "temperature_min" => rows.iter().map(|r| r.temperature_min).collect::<Vec<_>>(),
        "temperature_min_time" => rows.iter().map(|r| r.temperature_min_time.naive_utc()).collect::<Vec<_>>(),
        "wind_gust_time" => rows.iter().map(|r| r.wind_gust_time.naive_utc()).collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::records::StatsCore;
    use chrono::{DateTime, Utc};

    fn when(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    fn stats_core() -> StatsCore {
        StatsCore {
            cloud_cover: 0.5,
            dew_point: 1.0,
            humidity: 0.6,
            ozone: 300.0,
            precip_accumulation: 0.0,
            precip_intensity: 0.1,
            precip_probability: 0.2,
            pressure: 1015.0,
            uv_index: 3,
            visibility: 9.0,
            wind_bearing: 180,
            wind_gust: 8.0,
            wind_speed: 4.0,
        }
    }

    #[test]
    fn alerts_frame_has_one_row_per_record() {
        let rows = vec![AlertRecord {
            geohash: Some("dr5regw3pg6s".to_string()),
            latitude: 40.0,
            longitude: -74.0,
            time: when(1580511600),
            title: "Winter Storm Warning".to_string(),
            severity: "warning".to_string(),
            expires: when(1580515200),
            description: "Heavy snow expected.".to_string(),
            uri: "https://alerts.weather.gov/x".to_string(),
        }];
        let frame = alerts_frame(&rows).expect("frame builds");
        assert_eq!(frame.shape(), (1, 9));
        let names: Vec<&str> = frame.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            [
                "geohash",
                "latitude",
                "longitude",
                "time",
                "title",
                "severity",
                "expires",
                "description",
                "uri"
            ]
        );
    }

    #[test]
    fn daily_stats_frame_carries_every_extreme() {
        let rows = vec![DailyStatsRecord {
            geohash: None,
            latitude: 34.0,
            longitude: -118.0,
            time: when(1580511600),
            stats: stats_core(),
            apparent_temperature_high: 18.0,
            apparent_temperature_high_time: when(1580540400),
            apparent_temperature_low: 9.0,
            apparent_temperature_low_time: when(1580490000),
            apparent_temperature_max: 18.0,
            apparent_temperature_max_time: when(1580540400),
            apparent_temperature_min: 9.0,
            apparent_temperature_min_time: when(1580490000),
            moon_phase: 0.25,
            precip_intensity_max: 0.3,
            precip_intensity_max_time: when(1580520000),
            sunrise_time: when(1580480000),
            sunset_time: when(1580518800),
            temperature_high: 19.0,
            temperature_high_time: when(1580540400),
            temperature_low: 10.0,
            temperature_low_time: when(1580490000),
            temperature_max: 19.0,
            temperature_max_time: when(1580540400),
            temperature_min: 10.0,
            temperature_min_time: when(1580490000),
            wind_gust_time: when(1580530000),
        }];
        let frame = daily_stats_frame(&rows).expect("frame builds");
        assert_eq!(frame.shape(), (1, 39));
    }

    #[test]
    fn hourly_stats_frame_column_order_matches_the_upsert() {
        let rows = vec![HourlyStatsRecord {
            geohash: None,
            latitude: 40.0,
            longitude: -74.0,
            time: when(1580511600),
            stats: stats_core(),
            apparent_temperature: -5.0,
            temperature: -1.5,
        }];
        let frame = hourly_stats_frame(&rows).expect("frame builds");
        let names: Vec<&str> = frame.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, crate::sink::upsert::HOURLY_STATS_COLUMNS);
    }
}
