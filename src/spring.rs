use crate::models::{AnalysisConfig, DailyRow, TemperatureMetric};
use crate::record::DailyRecord;

/// True when the selected metric reads strictly below the freezing
/// threshold. A missing measurement is never a freezing day.
///
/// Note the asymmetry with the thaw-freeze pair test: freezing here is
/// strict `<`, while the pair test uses `>` on the thaw side and `<=` on
/// the freeze side. A day at exactly 0 °C does not reset the spring
/// candidate.
pub fn is_freezing_day(row: &DailyRow, metric: TemperatureMetric, config: &AnalysisConfig) -> bool {
    metric
        .value(row)
        .is_some_and(|t| t < config.freezing_temp)
}

/// Find the index of the first January row of `year`, scanning forward from
/// `start_idx`. Returns `None` when the cursor is absent, already past
/// January of the target year, or the record ends without a match. The scan
/// never backtracks.
pub fn locate_year_start(
    record: &DailyRecord,
    year: i32,
    start_idx: Option<usize>,
) -> Option<usize> {
    let start = start_idx?;
    let first = record.get(start)?;
    if first.year > year || (first.year == year && first.month > 1) {
        return None;
    }
    (start..record.len()).find(|&idx| {
        record
            .get(idx)
            .is_some_and(|row| row.year == year && row.month == 1)
    })
}

/// Estimate the first day of spring for `year`: the first day of a run of
/// `month_len` consecutive days with no freezing day under `metric`.
///
/// The candidate cursor resets to the day after every freeze encountered;
/// the returned index is the day the surviving run began. The scan is
/// bounded by the record length — if the record ends before a full run
/// completes, the year is reported absent.
pub fn estimate_spring_onset(
    record: &DailyRecord,
    config: &AnalysisConfig,
    metric: TemperatureMetric,
    year: i32,
    start_idx: Option<usize>,
) -> Option<usize> {
    let year_start = locate_year_start(record, year, start_idx)?;
    let mut spring = year_start;
    let mut scan = year_start;
    loop {
        if scan - spring >= config.month_len {
            return Some(scan - config.month_len);
        }
        let row = record.get(scan)?;
        if is_freezing_day(row, metric, config) {
            spring = scan + 1;
        }
        scan += 1;
    }
}
