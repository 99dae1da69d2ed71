use log::debug;

use crate::models::{AnalysisConfig, AnnualCount, TemperatureMetric, UNDETERMINED};
use crate::record::DailyRecord;
use crate::spring::estimate_spring_onset;

/// True when the pair of days `(idx, idx + 1)` is a thaw-freeze event:
/// `tavg` strictly above freezing at `idx` and at or below freezing at
/// `idx + 1`. The pair test always reads `tavg`, regardless of which metric
/// located spring onset.
///
/// A day at exactly 0 °C qualifies as the freezing half of a transition but
/// never as the thawing half. Pairs with a missing `tavg` on either side
/// never qualify.
pub fn is_thaw_freeze_pair(record: &DailyRecord, idx: usize, config: &AnalysisConfig) -> bool {
    let Some(first) = record.get(idx) else {
        return false;
    };
    let Some(second) = record.get(idx + 1) else {
        return false;
    };
    first.tavg.is_some_and(|t| t > config.freezing_temp)
        && second.tavg.is_some_and(|t| t <= config.freezing_temp)
}

/// Count thaw-freeze events in the fixed window preceding `anchor`.
///
/// The window runs pairs `(i, i+1)` for `i` in `[anchor - W, anchor - 2]`,
/// W - 1 pairs ending on the day before the anchor. The pair
/// `(anchor - 1, anchor)` is deliberately excluded, matching the historical
/// counting behavior this tool reproduces. Returns [`UNDETERMINED`] for an
/// absent anchor or when the anchor has fewer than W days behind it.
pub fn count_thaw_freeze(
    record: &DailyRecord,
    config: &AnalysisConfig,
    anchor: Option<usize>,
) -> i64 {
    let Some(anchor) = anchor else {
        return UNDETERMINED;
    };
    let interval = config.thaw_freeze_interval;
    if anchor < interval || interval < 2 {
        return UNDETERMINED;
    }
    let mut count = 0;
    for i in (anchor - interval)..(anchor - 1) {
        if is_thaw_freeze_pair(record, i, config) {
            count += 1;
        }
    }
    count
}

/// Walk every year in the configured range, estimate its spring onset, and
/// count thaw-freeze events in the pre-spring window.
///
/// A single cursor threads through the record: each located anchor becomes
/// the lower bound for the next year's search, so the whole run is one
/// forward pass. Years whose onset cannot be located leave the cursor
/// untouched and contribute [`UNDETERMINED`].
pub fn generate_series(
    record: &DailyRecord,
    config: &AnalysisConfig,
    start: usize,
) -> Vec<AnnualCount> {
    let mut series = Vec::with_capacity(config.year_span());
    let mut cursor = start;
    for year in config.years() {
        match estimate_spring_onset(
            record,
            config,
            TemperatureMetric::Tavg,
            year,
            Some(cursor),
        ) {
            Some(anchor) => {
                cursor = anchor;
                let count = count_thaw_freeze(record, config, Some(anchor));
                debug!("{year}: spring onset at row {anchor}, {count} thaw-freeze events");
                series.push(AnnualCount { year, count });
            }
            None => {
                debug!("{year}: spring onset not locatable, marking undetermined");
                series.push(AnnualCount {
                    year,
                    count: UNDETERMINED,
                });
            }
        }
    }
    series
}
