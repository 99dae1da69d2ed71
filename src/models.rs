use serde::Serialize;

/// Value used in the output series for years where no thaw-freeze count
/// could be determined.
pub const UNDETERMINED: i64 = -1;

/// One calendar day of station measurements. Temperatures are independent
/// measurements; `tavg` is not derived from `tmax`/`tmin`. A missing
/// measurement is `None`, never 0.0 — zero is a meaningful boundary value.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub month: u32,
    pub day: u32,
    pub year: i32,
    pub tmax: Option<f64>,
    pub tmax_flag: String,
    pub tmin: Option<f64>,
    pub tmin_flag: String,
    pub tavg: Option<f64>,
}

/// Which per-day temperature field a freezing comparison consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureMetric {
    Tmax,
    Tmin,
    Tavg,
}

impl TemperatureMetric {
    pub fn value(&self, row: &DailyRow) -> Option<f64> {
        match self {
            TemperatureMetric::Tmax => row.tmax,
            TemperatureMetric::Tmin => row.tmin,
            TemperatureMetric::Tavg => row.tavg,
        }
    }
}

/// One entry of the output series: the thaw-freeze count for a year, or
/// [`UNDETERMINED`] when spring onset could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualCount {
    pub year: i32,
    pub count: i64,
}

/// Tunable constants for the analysis. Every core operation takes this by
/// reference so tests can vary window lengths, the flag set, and the year
/// range.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Freezing threshold in degrees Celsius.
    pub freezing_temp: f64,
    /// Length of the sustained non-freezing run that marks spring onset.
    pub month_len: usize,
    /// Length of the pre-spring window scanned for thaw-freeze pairs.
    pub thaw_freeze_interval: usize,
    /// Quality-flag characters that invalidate a row.
    pub unacceptable_flags: Vec<char>,
    /// First year of the output series, inclusive.
    pub first_year: i32,
    /// Final year of the output series, inclusive.
    pub final_year: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            freezing_temp: 0.0,
            month_len: 30,
            thaw_freeze_interval: 40,
            unacceptable_flags: vec!['I'],
            first_year: 1958,
            final_year: 2018,
        }
    }
}

impl AnalysisConfig {
    /// Number of entries the output series will hold.
    pub fn year_span(&self) -> usize {
        (self.final_year - self.first_year + 1).max(0) as usize
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.first_year..=self.final_year
    }
}
