// src/main.rs

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hwt_trace_render::batch::{ensure_directory, run_clock_cycle_batch, run_propagation_batch, BatchOutcome};
use hwt_trace_render::config::AnalysisConfig;
use hwt_trace_render::crate_version;
use hwt_trace_render::data_analysis::return_loss::load_return_loss_curves;
use hwt_trace_render::error::AnalysisError;
use hwt_trace_render::logging::{init_logging, LogLevel};
use hwt_trace_render::plot_functions::plot_cycle_delay_scatter::plot_cycle_delay_scatter;
use hwt_trace_render::plot_functions::plot_edge_delay_scatter::plot_edge_delay_scatter;
use hwt_trace_render::plot_functions::plot_propagation_boxplot::plot_propagation_boxplot;
use hwt_trace_render::plot_functions::plot_return_loss::plot_return_loss;
use hwt_trace_render::report::{print_clock_cycle_summary, print_propagation_summary};

#[derive(Parser)]
#[command(
    name = "hwt_trace_render",
    version,
    about = "Timing and return-loss analysis of hardware-trojan test captures"
)]
struct Cli {
    /// TOML file overriding column layout, header rows, time unit and naming rules
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory for PNG output (defaults to the input directory)
    #[arg(short, long, value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Diagnostic verbosity; RUST_LOG takes precedence when set
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clock cycles from enable to output change, and clock-to-output propagation delay
    CycleDelay {
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,
    },
    /// Mean rising and falling input-to-output delay per device
    PropDelay {
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,
    },
    /// S11 return loss of one-port network files, coloured by category
    ReturnLoss {
        #[arg(value_name = "DIR", required = true)]
        input_dirs: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    println!("hwt_trace_render {}", crate_version());

    // --- Configuration ---
    let config = match &cli.config {
        Some(path) => {
            println!("Loading configuration from '{}'", path.display());
            AnalysisConfig::load(path)?
        }
        None => AnalysisConfig::default(),
    };

    match &cli.command {
        Command::CycleDelay { input_dir } => {
            ensure_directory(input_dir)?;
            let output_dir = prepare_output_dir(cli.output_dir.as_deref(), input_dir)?;
            let root_name = root_name_of(input_dir);
            let unit = config.capture.time_unit;

            println!("\n--- Analysing Clock Cycle Captures in '{}' ---", input_dir.display());
            let outcome = run_clock_cycle_batch(input_dir, &config)?;
            print_batch_status(&outcome);
            print_clock_cycle_summary(&outcome.records, unit);

            println!("\n--- Generating Clock Cycle Delay Scatter Plot ---");
            plot_cycle_delay_scatter(&outcome.records.cycle_delays, &output_dir, &root_name)?;
            println!("\n--- Generating Propagation Delay Box Plot ---");
            plot_propagation_boxplot(&outcome.records.propagation_delays, unit, &output_dir, &root_name)?;
        }
        Command::PropDelay { input_dir } => {
            ensure_directory(input_dir)?;
            let output_dir = prepare_output_dir(cli.output_dir.as_deref(), input_dir)?;
            let root_name = root_name_of(input_dir);
            let unit = config.capture.time_unit;

            println!("\n--- Analysing Propagation Captures in '{}' ---", input_dir.display());
            let outcome = run_propagation_batch(input_dir, &config)?;
            print_batch_status(&outcome);
            print_propagation_summary(&outcome.records, unit);

            println!("\n--- Generating Edge Delay Scatter Plot ---");
            plot_edge_delay_scatter(&outcome.records, unit, &output_dir, &root_name)?;
        }
        Command::ReturnLoss { input_dirs } => {
            for dir in input_dirs {
                ensure_directory(dir)?;
            }
            let first_dir = input_dirs.first().ok_or_else(|| AnalysisError::InvalidConfig(
                "return-loss needs at least one input directory".to_string(),
            ))?;
            let output_dir = prepare_output_dir(cli.output_dir.as_deref(), first_dir)?;
            let root_name = root_name_of(first_dir);

            println!("\n--- Loading Network Files ---");
            let set = load_return_loss_curves(input_dirs, &config.return_loss)?;
            println!(
                "  Loaded {} curve(s); {} failed to parse, {} matched no category.",
                set.curves.len(),
                set.failed.len(),
                set.unclassified.len()
            );
            for (idx, category) in config.return_loss.categories.iter().enumerate() {
                println!("    {}: {} file(s)", category.label, set.curves_in(idx).count());
            }

            println!("\n--- Generating Return Loss Plot ---");
            plot_return_loss(&set, &config.return_loss, &output_dir, &root_name)?;
        }
    }
    Ok(())
}

fn print_batch_status<R>(outcome: &BatchOutcome<R>) {
    println!(
        "  Processed {} file(s), skipped {}.",
        outcome.processed,
        outcome.skipped_count()
    );
    for (path, reason) in &outcome.skipped {
        println!("    Skipped '{}': {reason}", path.display());
    }
    if outcome.skipped_rows > 0 {
        println!("  Dropped {} malformed data row(s).", outcome.skipped_rows);
    }
}

fn prepare_output_dir(requested: Option<&Path>, input_dir: &Path) -> Result<PathBuf, AnalysisError> {
    let dir = requested.unwrap_or(input_dir).to_path_buf();
    fs::create_dir_all(&dir).map_err(|e| AnalysisError::io(&dir, e))?;
    Ok(dir)
}

/// Prefix for output files: the input directory's own name.
fn root_name_of(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "captures".to_string())
}

// src/main.rs
