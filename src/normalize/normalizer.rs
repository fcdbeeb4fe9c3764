//! Decomposes raw per-location responses into the six canonical datasets.
//!
//! Normalization runs after every fetch has settled: each location's payload
//! contributes zero or more records per entity type, records failing field
//! validation are dropped individually, and the merged datasets are deduped
//! on their uniqueness keys before ingest.

use crate::fetch::coordinator::LocationFetch;
use crate::fetch::response::{AlertEntry, DataBlock, DataPoint, ForecastResponse};
use crate::normalize::records::{
    AlertRecord, AlertRegionRecord, DailyStatsRecord, Entity, HourlyStatsRecord, InfoRecord,
    RecordContext,
};
use log::{debug, warn};
use std::collections::HashSet;
use std::hash::Hash;

/// Per-entity tabular output of one crawl cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub alerts: Vec<AlertRecord>,
    pub alert_regions: Vec<AlertRegionRecord>,
    pub hourly_info: Vec<InfoRecord>,
    pub hourly_stats: Vec<HourlyStatsRecord>,
    pub daily_info: Vec<InfoRecord>,
    pub daily_stats: Vec<DailyStatsRecord>,
}

impl Datasets {
    pub fn len(&self, entity: Entity) -> usize {
        match entity {
            Entity::Alerts => self.alerts.len(),
            Entity::AlertRegions => self.alert_regions.len(),
            Entity::HourlyInfo => self.hourly_info.len(),
            Entity::HourlyStats => self.hourly_stats.len(),
            Entity::DailyInfo => self.daily_info.len(),
            Entity::DailyStats => self.daily_stats.len(),
        }
    }

    /// An empty dataset is excluded from the ingest step entirely.
    pub fn is_empty(&self, entity: Entity) -> bool {
        self.len(entity) == 0
    }
}

/// Count of records dropped per entity during normalization, covering both
/// validation failures and uniqueness-key duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropTally {
    counts: [usize; 6],
}

impl DropTally {
    pub(crate) fn bump(&mut self, entity: Entity) {
        self.counts[entity.index()] += 1;
    }

    pub fn get(&self, entity: Entity) -> usize {
        self.counts[entity.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// The normalizer's output: merged datasets plus the per-entity drop tally
/// for the cycle summary.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub datasets: Datasets,
    pub dropped: DropTally,
}

/// Turns the settled fetch results into one dataset per entity type.
///
/// Failed locations contribute nothing (their failures were already recorded
/// by the coordinator). A record failing validation is dropped and logged
/// with field-level context; its siblings are unaffected. Within each
/// dataset the first record with a given uniqueness key wins.
pub fn normalize(fetches: &[LocationFetch]) -> Normalized {
    let mut out = Normalized::default();
    for fetch in fetches {
        let response = match &fetch.result {
            Ok(response) => response,
            Err(_) => continue,
        };
        let ctx = RecordContext::new(fetch.location);
        collect_alerts(&ctx, response, &mut out);
        collect_hourly(&ctx, response, &mut out);
        collect_daily(&ctx, response, &mut out);
    }
    dedup(&mut out);
    out
}

fn collect_alerts(ctx: &RecordContext, response: &ForecastResponse, out: &mut Normalized) {
    for value in &response.alerts {
        let entry = match serde_json::from_value::<AlertEntry>(value.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    "dropping malformed alert for ({}, {}): {e}",
                    ctx.latitude, ctx.longitude
                );
                out.dropped.bump(Entity::Alerts);
                continue;
            }
        };
        match AlertRecord::from_entry(ctx, &entry) {
            Ok(alert) => {
                for region in &entry.regions {
                    out.datasets
                        .alert_regions
                        .push(AlertRegionRecord::from_alert(&alert, region));
                }
                out.datasets.alerts.push(alert);
            }
            Err(violation) => {
                warn!(
                    "dropping alerts record for ({}, {}): {violation}",
                    ctx.latitude, ctx.longitude
                );
                out.dropped.bump(Entity::Alerts);
            }
        }
    }
}

fn collect_hourly(ctx: &RecordContext, response: &ForecastResponse, out: &mut Normalized) {
    let Some(block) = &response.hourly else {
        debug!(
            "no hourly block for ({}, {})",
            ctx.latitude, ctx.longitude
        );
        return;
    };
    for point in decode_points(ctx, block, Entity::HourlyInfo, Entity::HourlyStats, out) {
        match InfoRecord::from_point(ctx, &point) {
            Ok(info) => out.datasets.hourly_info.push(info),
            Err(violation) => {
                warn!(
                    "dropping hourly_info record for ({}, {}): {violation}",
                    ctx.latitude, ctx.longitude
                );
                out.dropped.bump(Entity::HourlyInfo);
            }
        }
        match HourlyStatsRecord::from_point(ctx, &point) {
            Ok(stats) => out.datasets.hourly_stats.push(stats),
            Err(violation) => {
                warn!(
                    "dropping hourly_stats record for ({}, {}) at {}: {violation}",
                    ctx.latitude, ctx.longitude, point.time
                );
                out.dropped.bump(Entity::HourlyStats);
            }
        }
    }
}

fn collect_daily(ctx: &RecordContext, response: &ForecastResponse, out: &mut Normalized) {
    let Some(block) = &response.daily else {
        debug!("no daily block for ({}, {})", ctx.latitude, ctx.longitude);
        return;
    };
    for point in decode_points(ctx, block, Entity::DailyInfo, Entity::DailyStats, out) {
        match InfoRecord::from_point(ctx, &point) {
            Ok(info) => out.datasets.daily_info.push(info),
            Err(violation) => {
                warn!(
                    "dropping daily_info record for ({}, {}): {violation}",
                    ctx.latitude, ctx.longitude
                );
                out.dropped.bump(Entity::DailyInfo);
            }
        }
        match DailyStatsRecord::from_point(ctx, &point) {
            Ok(stats) => out.datasets.daily_stats.push(stats),
            Err(violation) => {
                warn!(
                    "dropping daily_stats record for ({}, {}) at {}: {violation}",
                    ctx.latitude, ctx.longitude, point.time
                );
                out.dropped.bump(Entity::DailyStats);
            }
        }
    }
}

/// Decodes a block's raw points one at a time so a mistyped entry drops only
/// itself (counted against both the info and stats datasets it would have
/// fed) and never its siblings.
fn decode_points(
    ctx: &RecordContext,
    block: &DataBlock,
    info_entity: Entity,
    stats_entity: Entity,
    out: &mut Normalized,
) -> Vec<DataPoint> {
    let mut points = Vec::with_capacity(block.data.len());
    for value in &block.data {
        match serde_json::from_value::<DataPoint>(value.clone()) {
            Ok(point) => points.push(point),
            Err(e) => {
                warn!(
                    "dropping malformed {info_entity}/{stats_entity} entry for ({}, {}): {e}",
                    ctx.latitude, ctx.longitude
                );
                out.dropped.bump(info_entity);
                out.dropped.bump(stats_entity);
            }
        }
    }
    points
}

fn dedup(out: &mut Normalized) {
    let Normalized { datasets, dropped } = out;
    dedup_by_key(&mut datasets.alerts, Entity::Alerts, dropped, AlertRecord::identity);
    dedup_by_key(
        &mut datasets.alert_regions,
        Entity::AlertRegions,
        dropped,
        AlertRegionRecord::identity,
    );
    dedup_by_key(
        &mut datasets.hourly_info,
        Entity::HourlyInfo,
        dropped,
        InfoRecord::identity,
    );
    dedup_by_key(
        &mut datasets.hourly_stats,
        Entity::HourlyStats,
        dropped,
        HourlyStatsRecord::identity,
    );
    dedup_by_key(
        &mut datasets.daily_info,
        Entity::DailyInfo,
        dropped,
        InfoRecord::identity,
    );
    dedup_by_key(
        &mut datasets.daily_stats,
        Entity::DailyStats,
        dropped,
        DailyStatsRecord::identity,
    );
}

fn dedup_by_key<T, K>(
    rows: &mut Vec<T>,
    entity: Entity,
    dropped: &mut DropTally,
    key: impl Fn(&T) -> K,
) where
    K: Eq + Hash,
{
    let mut seen = HashSet::new();
    rows.retain(|row| {
        if seen.insert(key(row)) {
            true
        } else {
            debug!("dropping duplicate {entity} record");
            dropped.bump(entity);
            false
        }
    });
}
