use std::fmt::Write;

use chrono::Utc;

use crate::models::{AnalysisConfig, AnnualCount};
use crate::trend;

pub fn build_report(
    station_label: &str,
    config: &AnalysisConfig,
    series: &[AnnualCount],
) -> String {
    let mut output = String::new();
    let determined: Vec<&AnnualCount> = series.iter().filter(|e| e.count >= 0).collect();
    let undetermined: Vec<&AnnualCount> = series.iter().filter(|e| e.count < 0).collect();

    let _ = writeln!(output, "# Thaw-Freeze Events Before Spring Onset");
    let _ = writeln!(
        output,
        "Station: {} | Years {}-{} | Generated {}",
        station_label,
        config.first_year,
        config.final_year,
        Utc::now().date_naive()
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Counts cover the {} days before each year's estimated spring onset \
         (first day of a {}-day run with no day below {} degC).",
        config.thaw_freeze_interval, config.month_len, config.freezing_temp
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Trend");

    match trend::fit_series(series) {
        Some(line) => {
            let _ = writeln!(output, "- fit: {}", line.equation());
            let _ = writeln!(output, "- R^2: {:.3}", line.r_squared);
            let _ = writeln!(
                output,
                "- change over the range: {:+.2} events",
                line.predict(config.final_year) - line.predict(config.first_year)
            );
        }
        None => {
            let _ = writeln!(output, "Too few determined years to fit a trend.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Yearly Counts");

    if determined.is_empty() {
        let _ = writeln!(output, "No year in the range could be determined.");
    } else {
        let _ = writeln!(output, "| Year | Thaw-freeze events |");
        let _ = writeln!(output, "|------|--------------------|");
        for entry in &determined {
            let _ = writeln!(output, "| {} | {} |", entry.year, entry.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Undetermined Years");

    if undetermined.is_empty() {
        let _ = writeln!(output, "Every year in the range was determined.");
    } else {
        let years: Vec<String> = undetermined.iter().map(|e| e.year.to_string()).collect();
        let _ = writeln!(
            output,
            "{} of {} years could not be determined: {}",
            undetermined.len(),
            series.len(),
            years.join(", ")
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNDETERMINED;

    fn sample_series() -> Vec<AnnualCount> {
        vec![
            AnnualCount { year: 1958, count: 2 },
            AnnualCount { year: 1959, count: UNDETERMINED },
            AnnualCount { year: 1960, count: 4 },
            AnnualCount { year: 1961, count: 3 },
        ]
    }

    fn sample_config() -> AnalysisConfig {
        AnalysisConfig {
            first_year: 1958,
            final_year: 1961,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn report_carries_all_sections() {
        let report = build_report("Paamiut, Greenland", &sample_config(), &sample_series());
        assert!(report.contains("# Thaw-Freeze Events Before Spring Onset"));
        assert!(report.contains("## Trend"));
        assert!(report.contains("## Yearly Counts"));
        assert!(report.contains("## Undetermined Years"));
        assert!(report.contains("Paamiut, Greenland"));
    }

    #[test]
    fn determined_years_appear_in_the_table() {
        let report = build_report("Paamiut", &sample_config(), &sample_series());
        assert!(report.contains("| 1958 | 2 |"));
        assert!(report.contains("| 1960 | 4 |"));
        assert!(!report.contains("| 1959 |"));
    }

    #[test]
    fn undetermined_years_are_listed_not_tabulated() {
        let report = build_report("Paamiut", &sample_config(), &sample_series());
        assert!(report.contains("1 of 4 years could not be determined: 1959"));
    }

    #[test]
    fn empty_series_still_renders() {
        let report = build_report("Paamiut", &sample_config(), &[]);
        assert!(report.contains("Too few determined years"));
        assert!(report.contains("No year in the range could be determined."));
        assert!(report.contains("Every year in the range was determined."));
    }
}
