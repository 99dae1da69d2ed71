use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod chart;
mod models;
mod record;
mod report;
mod spring;
mod thawfreeze;
mod trend;

use models::AnalysisConfig;
use record::DailyRecord;

const DEFAULT_INPUT: &str = "data/paamiut_tempdata2.xlsx";
const STATION_LABEL: &str = "Paamiut, Greenland";

#[derive(Parser)]
#[command(name = "paamiut-thaw-freeze")]
#[command(about = "Thaw-freeze events before spring onset, from a daily temperature record", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Daily record spreadsheet (.xlsx/.xls) or headered CSV export
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,
    /// First year of the output series, inclusive
    #[arg(long, default_value_t = 1958)]
    first_year: i32,
    /// Final year of the output series, inclusive
    #[arg(long, default_value_t = 2018)]
    final_year: i32,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the yearly thaw-freeze series
    Series {
        #[command(flatten)]
        input: InputArgs,
        /// Emit the series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report with the trend fit
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Render the scatter chart with a trendline
    Chart {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "thawfreeze_paamiut.png")]
        out: PathBuf,
    },
    /// List rows the quality screen would reject
    Audit {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Series { input, json } => {
            let (record, config) = load(&input)?;
            let series = thawfreeze::generate_series(&record, &config, 0);
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for entry in &series {
                    println!("{}\t{}", entry.year, entry.count);
                }
            }
        }
        Commands::Report { input, out } => {
            let (record, config) = load(&input)?;
            let series = thawfreeze::generate_series(&record, &config, 0);
            let report = report::build_report(STATION_LABEL, &config, &series);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Chart { input, out } => {
            let (record, config) = load(&input)?;
            let series = thawfreeze::generate_series(&record, &config, 0);
            chart::render_chart(&out, &config, &series)?;
            println!("Chart written to {}.", out.display());
        }
        Commands::Audit { input } => {
            let (record, config) = load(&input)?;
            let invalid = record.invalid_rows(&config.unacceptable_flags);
            if invalid.is_empty() {
                println!("All {} rows pass the quality screen.", record.len());
            } else {
                println!(
                    "{} of {} rows fail the quality screen:",
                    invalid.len(),
                    record.len()
                );
                for &idx in invalid.iter().take(20) {
                    if let Some(row) = record.get(idx) {
                        println!(
                            "- row {idx}: {}-{:02}-{:02}",
                            row.year, row.month, row.day
                        );
                    }
                }
                if invalid.len() > 20 {
                    println!("... and {} more.", invalid.len() - 20);
                }
            }
            println!("The yearly series does not filter on this screen.");
        }
    }

    Ok(())
}

fn load(args: &InputArgs) -> anyhow::Result<(DailyRecord, AnalysisConfig)> {
    anyhow::ensure!(
        args.first_year <= args.final_year,
        "--first-year must not exceed --final-year"
    );
    let record = DailyRecord::load(&args.input)
        .with_context(|| format!("failed to load daily record from {}", args.input.display()))?;
    let config = AnalysisConfig {
        first_year: args.first_year,
        final_year: args.final_year,
        ..AnalysisConfig::default()
    };
    Ok((record, config))
}
