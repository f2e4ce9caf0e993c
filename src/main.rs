use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use fitimport::import::{fit::FitImporter, ImportFormat, ImportManager};
use fitimport::logging::{self, LogConfig, LogFormat, LogLevel};
use fitimport::models::WorkoutImport;

/// fitimport - FIT activity file decoder
///
/// Decodes Garmin FIT activity files into a typed workout summary and
/// per-lap intervals with normalized units.
#[derive(Parser)]
#[command(name = "fitimport")]
#[command(version = "0.1.0")]
#[command(about = "FIT activity file decoder", long_about = None)]
struct Cli {
    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a FIT file (or every FIT file in a directory)
    Import {
        /// Input file or directory
        path: PathBuf,

        /// Emit the decoded result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the per-lap interval breakdown of a FIT file
    Intervals {
        /// Input file
        file: PathBuf,
    },
}

#[derive(Tabled)]
struct IntervalRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "start")]
    start: String,
    #[tabled(rename = "end")]
    end: String,
    #[tabled(rename = "distance (m)")]
    distance: String,
    #[tabled(rename = "calories")]
    calories: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        format: cli.log_format,
        ..LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    match cli.command {
        Commands::Import { path, json } => {
            if path.is_dir() {
                let imports = ImportManager::new().import_directory(&path)?;
                if json {
                    let payload: Vec<&WorkoutImport> =
                        imports.iter().map(|(_, import)| import).collect();
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                } else {
                    println!(
                        "{}",
                        format!("✓ Imported {} activities", imports.len()).green()
                    );
                }
            } else {
                let import = ImportManager::new().import_file(&path)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&import)?);
                } else {
                    print_summary(&import);
                }
            }
        }

        Commands::Intervals { file } => {
            let import = FitImporter::new().import_file(&file)?;
            let rows: Vec<IntervalRow> = import
                .intervals
                .iter()
                .enumerate()
                .map(|(i, interval)| IntervalRow {
                    index: i + 1,
                    start: format_instant(interval.start_time),
                    end: format_instant(interval.end_time),
                    distance: format_metric(interval.distance),
                    calories: format_metric(interval.calories),
                })
                .collect();

            if rows.is_empty() {
                println!("{}", "No intervals in this activity".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }
    }

    Ok(())
}

fn print_summary(import: &WorkoutImport) {
    let summary = &import.summary;

    println!("{}", "Workout summary".green().bold());
    println!("  start:       {}", format_instant(summary.start_time));
    println!("  timestamp:   {}", format_instant(summary.timestamp));
    println!(
        "  elapsed:     {} s (timer {} s)",
        format_metric(summary.total_elapsed_time),
        format_metric(summary.total_timer_time)
    );
    if let Some(position) = summary.start_position {
        println!(
            "  position:    {:.5}, {:.5}",
            position.latitude, position.longitude
        );
    }
    println!("  distance:    {} m", format_metric(summary.total_distance));
    println!(
        "  calories:    {} kcal",
        format_metric(summary.total_calories)
    );
    println!(
        "  speed:       avg {} / max {} m/s",
        format_metric(summary.avg_speed),
        format_metric(summary.max_speed)
    );
    println!(
        "  heart rate:  avg {} / max {} bpm",
        format_metric(summary.avg_heart_rate),
        format_metric(summary.max_heart_rate)
    );
    println!(
        "  cadence:     avg {} / max {} rpm",
        format_metric(summary.avg_cadence),
        format_metric(summary.max_cadence)
    );
    println!(
        "  temperature: avg {} / max {} °C",
        format_metric(summary.avg_temperature),
        format_metric(summary.max_temperature)
    );
    println!("  intervals:   {}", import.intervals.len());

    if !import.warnings.is_empty() {
        println!(
            "{}",
            format!("{} decode warnings", import.warnings.len()).yellow()
        );
        for warning in &import.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }
}

fn format_instant(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_rfc3339())
}

fn format_metric<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
