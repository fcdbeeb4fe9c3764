//! Idempotent row writes: one `INSERT ... ON CONFLICT ... DO UPDATE`
//! statement per entity, executed row by row inside a single transaction.
//!
//! A conflicting uniqueness key replaces the stored row wholesale; partial
//! field updates are never issued. The destination schema owns the
//! constraints themselves (including the alert → region cascade).

use crate::normalize::records::{
    AlertRecord, AlertRegionRecord, DailyStatsRecord, HourlyStatsRecord, InfoRecord, StatsCore,
};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

pub(crate) const ALERTS_COLUMNS: &[&str] = &[
    "geohash",
    "latitude",
    "longitude",
    "time",
    "title",
    "severity",
    "expires",
    "description",
    "uri",
];
const ALERTS_KEY: &[&str] = &["geohash", "time", "expires"];

pub(crate) const ALERT_REGIONS_COLUMNS: &[&str] = &[
    "geohash",
    "latitude",
    "longitude",
    "time",
    "region",
    "expires",
];
const ALERT_REGIONS_KEY: &[&str] = &["geohash", "region", "time", "expires"];

pub(crate) const INFO_COLUMNS: &[&str] = &[
    "geohash",
    "latitude",
    "longitude",
    "time",
    "precip_type",
    "summary",
    "icon",
];

pub(crate) const HOURLY_STATS_COLUMNS: &[&str] = &[
    "geohash",
    "latitude",
    "longitude",
    "time",
    "cloud_cover",
    "dew_point",
    "humidity",
    "ozone",
    "precip_accumulation",
    "precip_intensity",
    "precip_probability",
    "pressure",
    "uv_index",
    "visibility",
    "wind_bearing",
    "wind_gust",
    "wind_speed",
    "apparent_temperature",
    "temperature",
];

pub(crate) const DAILY_STATS_COLUMNS: &[&str] = &[
    "geohash",
    "latitude",
    "longitude",
    "time",
    "cloud_cover",
    "dew_point",
    "humidity",
    "ozone",
    "precip_accumulation",
    "precip_intensity",
    "precip_probability",
    "pressure",
    "uv_index",
    "visibility",
    "wind_bearing",
    "wind_gust",
    "wind_speed",
    "apparent_temperature_high",
    "apparent_temperature_high_time",
    "apparent_temperature_low",
    "apparent_temperature_low_time",
    "apparent_temperature_max",
    "apparent_temperature_max_time",
    "apparent_temperature_min",
    "apparent_temperature_min_time",
    "moon_phase",
    "precip_intensity_max",
    "precip_intensity_max_time",
    "sunrise_time",
    "sunset_time",
    "temperature_high",
    "temperature_high_time",
    "temperature_low",
    "temperature_low_time",
    "temperature_max",
    "temperature_max_time",
    "temperature_min",
    "temperature_min_time",
    "wind_gust_time",
];

const POINT_KEY: &[&str] = &["geohash", "time"];

/// Assembles the upsert statement for one table: every column bound
/// positionally, every non-key column replaced from `EXCLUDED` on conflict.
pub(crate) fn upsert_statement(table: &str, columns: &[&str], key: &[&str]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    let conflict: Vec<String> = key.iter().map(|c| format!("\"{c}\"")).collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|c| !key.contains(*c))
        .map(|c| format!("\"{c}\" = EXCLUDED.\"{c}\""))
        .collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
        quoted.join(", "),
        placeholders.join(", "),
        conflict.join(", "),
        updates.join(", ")
    )
}

fn bind_stats<'q>(
    query: Query<'q, Postgres, PgArguments>,
    stats: &StatsCore,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(stats.cloud_cover)
        .bind(stats.dew_point)
        .bind(stats.humidity)
        .bind(stats.ozone)
        .bind(stats.precip_accumulation)
        .bind(stats.precip_intensity)
        .bind(stats.precip_probability)
        .bind(stats.pressure)
        .bind(stats.uv_index)
        .bind(stats.visibility)
        .bind(stats.wind_bearing)
        .bind(stats.wind_gust)
        .bind(stats.wind_speed)
}

pub(crate) async fn upsert_alerts(
    pool: &PgPool,
    rows: &[AlertRecord],
) -> Result<usize, sqlx::Error> {
    let sql = upsert_statement("alerts", ALERTS_COLUMNS, ALERTS_KEY);
    let mut tx = pool.begin().await?;
    for row in rows {
        sqlx::query(&sql)
            .bind(&row.geohash)
            .bind(row.latitude)
            .bind(row.longitude)
            .bind(row.time)
            .bind(&row.title)
            .bind(&row.severity)
            .bind(row.expires)
            .bind(&row.description)
            .bind(&row.uri)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

pub(crate) async fn upsert_alert_regions(
    pool: &PgPool,
    rows: &[AlertRegionRecord],
) -> Result<usize, sqlx::Error> {
    let sql = upsert_statement("alert_regions", ALERT_REGIONS_COLUMNS, ALERT_REGIONS_KEY);
    let mut tx = pool.begin().await?;
    for row in rows {
        sqlx::query(&sql)
            .bind(&row.geohash)
            .bind(row.latitude)
            .bind(row.longitude)
            .bind(row.time)
            .bind(&row.region)
            .bind(row.expires)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

/// Hourly and daily info rows share a shape; the destination table is the
/// caller's choice.
pub(crate) async fn upsert_info(
    pool: &PgPool,
    table: &str,
    rows: &[InfoRecord],
) -> Result<usize, sqlx::Error> {
    let sql = upsert_statement(table, INFO_COLUMNS, POINT_KEY);
    let mut tx = pool.begin().await?;
    for row in rows {
        sqlx::query(&sql)
            .bind(&row.geohash)
            .bind(row.latitude)
            .bind(row.longitude)
            .bind(row.time)
            .bind(&row.precip_type)
            .bind(&row.summary)
            .bind(&row.icon)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

pub(crate) async fn upsert_hourly_stats(
    pool: &PgPool,
    rows: &[HourlyStatsRecord],
) -> Result<usize, sqlx::Error> {
    let sql = upsert_statement("hourly_stats", HOURLY_STATS_COLUMNS, POINT_KEY);
    let mut tx = pool.begin().await?;
    for row in rows {
        let query = sqlx::query(&sql)
            .bind(&row.geohash)
            .bind(row.latitude)
            .bind(row.longitude)
            .bind(row.time);
        bind_stats(query, &row.stats)
            .bind(row.apparent_temperature)
            .bind(row.temperature)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

pub(crate) async fn upsert_daily_stats(
    pool: &PgPool,
    rows: &[DailyStatsRecord],
) -> Result<usize, sqlx::Error> {
    let sql = upsert_statement("daily_stats", DAILY_STATS_COLUMNS, POINT_KEY);
    let mut tx = pool.begin().await?;
    for row in rows {
        let query = sqlx::query(&sql)
            .bind(&row.geohash)
            .bind(row.latitude)
            .bind(row.longitude)
            .bind(row.time);
        bind_stats(query, &row.stats)
            .bind(row.apparent_temperature_high)
            .bind(row.apparent_temperature_high_time)
            .bind(row.apparent_temperature_low)
            .bind(row.apparent_temperature_low_time)
            .bind(row.apparent_temperature_max)
            .bind(row.apparent_temperature_max_time)
            .bind(row.apparent_temperature_min)
            .bind(row.apparent_temperature_min_time)
            .bind(row.moon_phase)
            .bind(row.precip_intensity_max)
            .bind(row.precip_intensity_max_time)
            .bind(row.sunrise_time)
            .bind(row.sunset_time)
            .bind(row.temperature_high)
            .bind(row.temperature_high_time)
            .bind(row.temperature_low)
            .bind(row.temperature_low_time)
            .bind(row.temperature_max)
            .bind(row.temperature_max_time)
            .bind(row.temperature_min)
            .bind(row.temperature_min_time)
            .bind(row.wind_gust_time)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_replaces_non_key_columns_wholesale() {
        let sql = upsert_statement("t", &["a", "b", "c"], &["a"]);
        assert_eq!(
            sql,
            "INSERT INTO t (\"a\", \"b\", \"c\") VALUES ($1, $2, $3) \
             ON CONFLICT (\"a\") DO UPDATE SET \"b\" = EXCLUDED.\"b\", \"c\" = EXCLUDED.\"c\""
        );
    }

    #[test]
    fn alerts_conflict_on_their_three_part_identity() {
        let sql = upsert_statement("alerts", ALERTS_COLUMNS, ALERTS_KEY);
        assert!(sql.contains("ON CONFLICT (\"geohash\", \"time\", \"expires\")"));
        assert!(!sql.contains("\"geohash\" = EXCLUDED"));
        assert!(sql.contains("\"severity\" = EXCLUDED.\"severity\""));
    }

    #[test]
    fn region_identity_includes_the_region_name() {
        let sql = upsert_statement("alert_regions", ALERT_REGIONS_COLUMNS, ALERT_REGIONS_KEY);
        assert!(sql.contains("ON CONFLICT (\"geohash\", \"region\", \"time\", \"expires\")"));
    }

    #[test]
    fn point_datasets_conflict_on_geohash_and_time() {
        for (table, columns) in [
            ("hourly_info", INFO_COLUMNS),
            ("hourly_stats", HOURLY_STATS_COLUMNS),
            ("daily_stats", DAILY_STATS_COLUMNS),
        ] {
            let sql = upsert_statement(table, columns, POINT_KEY);
            assert!(sql.contains("ON CONFLICT (\"geohash\", \"time\") DO UPDATE SET"));
        }
    }

    #[test]
    fn column_lists_match_their_bind_counts() {
        assert_eq!(ALERTS_COLUMNS.len(), 9);
        assert_eq!(ALERT_REGIONS_COLUMNS.len(), 6);
        assert_eq!(INFO_COLUMNS.len(), 7);
        assert_eq!(HOURLY_STATS_COLUMNS.len(), 19);
        assert_eq!(DAILY_STATS_COLUMNS.len(), 39);
    }
}
