use std::path::Path;

use plotters::prelude::*;

use crate::models::{AnalysisConfig, AnnualCount};
use crate::trend;

const CHART_SIZE: (u32, u32) = (1280, 720);
const TITLE: &str = "Frequency of Thaw-Freeze Events in Early Spring";
const X_LABEL: &str = "Year";
const Y_LABEL: &str = "Frequency of Thaw-Freeze Events";

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow::anyhow!("chart rendering failed: {e}")
}

/// Y axis ceiling: at least 10 events, stretched when a year exceeds that.
fn y_axis_max(points: &[(f64, f64)]) -> f64 {
    let data_max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    data_max.ceil().max(10.0)
}

/// Render the yearly series as a PNG scatter chart: black circles per
/// determined year, dashed blue least-squares trendline, and the fitted
/// equation with R² in the corner. Undetermined years are left off the
/// figure.
pub fn render_chart(
    path: &Path,
    config: &AnalysisConfig,
    series: &[AnnualCount],
) -> anyhow::Result<()> {
    let points = trend::determined_points(series);
    anyhow::ensure!(!points.is_empty(), "no determined years to plot");
    let line = trend::fit(&points);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let x_min = f64::from(config.first_year) - 3.0;
    let x_max = f64::from(config.final_year) + 2.0;
    let y_max = y_axis_max(&points);

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 28))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, BLACK.filled())),
        )
        .map_err(draw_err)?;

    if let Some(line) = line {
        chart
            .draw_series(DashedLineSeries::new(
                [
                    (x_min, line.slope * x_min + line.intercept),
                    (x_max, line.slope * x_max + line.intercept),
                ],
                8,
                4,
                BLUE.stroke_width(2),
            ))
            .map_err(draw_err)?;

        let label = format!("{}   R^2 = {:.3}", line.equation(), line.r_squared);
        root.draw(&Text::new(
            label,
            (90, 80),
            ("sans-serif", 20).into_font().color(&BLUE),
        ))
        .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_ceiling_never_drops_below_ten() {
        assert_eq!(y_axis_max(&[(1958.0, 2.0), (1959.0, 4.0)]), 10.0);
    }

    #[test]
    fn axis_ceiling_stretches_for_busy_years() {
        assert_eq!(y_axis_max(&[(1958.0, 2.0), (1959.0, 13.4)]), 14.0);
    }
}
