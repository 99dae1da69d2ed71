use crate::models::AnnualCount;

/// First-degree least-squares fit over the determined entries of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl TrendLine {
    pub fn predict(&self, year: i32) -> f64 {
        self.slope * f64::from(year) + self.intercept
    }

    /// Equation label in the form drawn on the figure, e.g.
    /// `y = 0.002x + 0.378`.
    pub fn equation(&self) -> String {
        if self.intercept < 0.0 {
            format!("y = {:.3}x - {:.3}", self.slope, self.intercept.abs())
        } else {
            format!("y = {:.3}x + {:.3}", self.slope, self.intercept)
        }
    }
}

/// The series entries that carry a real count, as (year, count) points.
pub fn determined_points(series: &[AnnualCount]) -> Vec<(f64, f64)> {
    series
        .iter()
        .filter(|entry| entry.count >= 0)
        .map(|entry| (f64::from(entry.year), entry.count as f64))
        .collect()
}

/// Ordinary least squares over (x, y) points, with R² taken from the
/// Pearson correlation coefficient. `None` when fewer than two points exist
/// or the x values carry no variance.
pub fn fit(points: &[(f64, f64)]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov_xy = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in points {
        cov_xy += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 {
        return None;
    }

    let slope = cov_xy / var_x;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if var_y == 0.0 {
        // a perfectly flat series is matched exactly by the flat fit
        1.0
    } else {
        let r = cov_xy / (var_x.sqrt() * var_y.sqrt());
        r * r
    };
    Some(TrendLine {
        slope,
        intercept,
        r_squared,
    })
}

/// Fit the trendline over a yearly series, skipping undetermined entries.
pub fn fit_series(series: &[AnnualCount]) -> Option<TrendLine> {
    fit(&determined_points(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNDETERMINED;

    #[test]
    fn perfect_line_is_recovered_exactly() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let line = fit(&points).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert!((line.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_series_has_zero_slope() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 3.0)).collect();
        let line = fit(&points).unwrap();
        assert_eq!(line.slope, 0.0);
        assert_eq!(line.intercept, 3.0);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(fit(&[]).is_none());
        assert!(fit(&[(1.0, 2.0)]).is_none());
        assert!(fit(&[(1.0, 2.0), (1.0, 5.0)]).is_none());
    }

    #[test]
    fn undetermined_years_are_skipped() {
        let series = vec![
            AnnualCount { year: 1958, count: 1 },
            AnnualCount { year: 1959, count: UNDETERMINED },
            AnnualCount { year: 1960, count: 3 },
        ];
        assert_eq!(
            determined_points(&series),
            vec![(1958.0, 1.0), (1960.0, 3.0)]
        );
        let line = fit_series(&series).unwrap();
        assert!((line.slope - 1.0).abs() < 1e-12);
    }

    #[test]
    fn equation_label_formats_both_signs() {
        let rising = TrendLine {
            slope: 0.002,
            intercept: 0.378,
            r_squared: 0.5,
        };
        assert_eq!(rising.equation(), "y = 0.002x + 0.378");
        let falling = TrendLine {
            slope: -0.004,
            intercept: -1.25,
            r_squared: 0.5,
        };
        assert_eq!(falling.equation(), "y = -0.004x - 1.250");
    }
}
