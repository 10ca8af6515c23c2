//! TRAJEVAL: combined absolute pose error evaluation of aligned trajectory segments.
//!
//! The program reads one or more aligned estimate/reference segments (CSV, see
//! [trajeval::records]), evaluates each on its own, pools them into a single
//! set of statistics, and writes the pooled statistics (JSON) and error series
//! (CSV) to a results directory.
//!
//! You can run an evaluation either by:
//!   1. Loading all parameters from a configuration file (TOML/JSON/YAML)
//!   2. Specifying parameters via command-line flags

mod common;

use clap::{Args, Parser, Subcommand, ValueEnum};
use common::{init_logger, validate_input_file, validate_output_dir};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use trajeval::config::{EvaluationConfig, SegmentConfig};
use trajeval::evaluation::{self, RunOutput};
use trajeval::metrics::MetricKind;
use trajeval::report::LogReporter;
use trajeval::timeline::DEFAULT_SEGMENT_GAP;

const LONG_ABOUT: &str = "TRAJEVAL: combined absolute pose error evaluation of aligned trajectory segments.

Each input is a CSV file of associated and aligned samples with the header
  timestamp,est_x,est_y,est_z,ref_x,ref_y,ref_z

- combine: evaluates two segments (e.g. two agents covering parts of the same
  route) on their own and pooled into one combined trajectory.
- segment: evaluates a single segment.

You can run evaluations either by:
  1. Loading all parameters from a configuration file (TOML/JSON/YAML)
  2. Specifying parameters via command-line flags";

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about = "Combined absolute pose error evaluation of aligned trajectory segments.", long_about = LONG_ABOUT)]
struct Cli {
    /// Run an evaluation from a configuration file (TOML/JSON/YAML)
    /// This option overrides any subcommand arguments
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Command to execute (ignored if --config is provided)
    #[command(subcommand)]
    command: Option<Command>,

    /// Log level (off, error, warn, info, debug, trace) [default: info, or the
    /// configuration file's level with --config]
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log file path (if not specified, logs to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

/// Top-level commands
#[derive(Subcommand, Clone)]
enum Command {
    #[command(
        name = "combine",
        about = "Evaluate two aligned segments separately and pooled",
        long_about = "Evaluate two aligned segments. Each segment's APE is reported on its own, then the segments are concatenated (A first) and the pooled APE statistics are computed over all samples and written to the output directory."
    )]
    Combine(CombineArgs),
    #[command(
        name = "segment",
        about = "Evaluate a single aligned segment"
    )]
    Segment(SegmentArgs),
    #[command(name = "config", about = "Generate a template configuration file")]
    CreateConfig(CreateConfigArgs),
}

/// Metric selection on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
enum MetricArg {
    /// Full 3D translation error
    Translation,
    /// Translation error in the xy plane
    Xy,
    /// Translation error in the xz plane
    Xz,
    /// Translation error in the yz plane
    Yz,
}

impl From<MetricArg> for MetricKind {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Translation => MetricKind::Translation,
            MetricArg::Xy => MetricKind::Xy,
            MetricArg::Xz => MetricKind::Xz,
            MetricArg::Yz => MetricKind::Yz,
        }
    }
}

#[derive(Args, Clone, Debug)]
struct CombineArgs {
    /// Aligned CSV file of the first segment
    #[arg(short = 'a', long, value_parser)]
    segment_a: PathBuf,
    /// Aligned CSV file of the second segment
    #[arg(short = 'b', long, value_parser)]
    segment_b: PathBuf,
    /// Label of the first segment
    #[arg(long, default_value = "A")]
    label_a: String,
    /// Label of the second segment
    #[arg(long, default_value = "B")]
    label_b: String,
    /// Label of the pooled result
    #[arg(long, default_value = "combined trajectory AB")]
    label: String,
    /// Results directory
    #[arg(short, long, value_parser)]
    output: PathBuf,
    /// Error metric
    #[arg(long, value_enum, default_value_t = MetricArg::Translation)]
    metric: MetricArg,
    /// Gap in seconds between the two segments on the combined time axis
    #[arg(long, default_value_t = DEFAULT_SEGMENT_GAP)]
    gap: f64,
}

#[derive(Args, Clone, Debug)]
struct SegmentArgs {
    /// Aligned CSV file of the segment
    #[arg(short, long, value_parser)]
    input: PathBuf,
    /// Label of the segment
    #[arg(long, default_value = "trajectory")]
    label: String,
    /// Results directory
    #[arg(short, long, value_parser)]
    output: PathBuf,
    /// Error metric
    #[arg(long, value_enum, default_value_t = MetricArg::Translation)]
    metric: MetricArg,
}

#[derive(Args, Clone, Debug)]
struct CreateConfigArgs {
    /// Output configuration file; the extension selects the format (.json, .yaml/.yml, or .toml)
    #[arg(short, long, value_parser, default_value = "trajeval.toml")]
    output: PathBuf,
}

fn combine_config(args: &CombineArgs) -> EvaluationConfig {
    EvaluationConfig {
        metric: args.metric.into(),
        segment_gap: args.gap,
        label: args.label.clone(),
        results_dir: args.output.clone(),
        segments: vec![
            SegmentConfig {
                label: args.label_a.clone(),
                file: args.segment_a.clone(),
            },
            SegmentConfig {
                label: args.label_b.clone(),
                file: args.segment_b.clone(),
            },
        ],
        ..Default::default()
    }
}

fn segment_config(args: &SegmentArgs) -> EvaluationConfig {
    EvaluationConfig {
        metric: args.metric.into(),
        label: args.label.clone(),
        results_dir: args.output.clone(),
        statistics_file: "ape_statistics.json".to_string(),
        error_series_file: "ape_errors.csv".to_string(),
        segments: vec![SegmentConfig {
            label: args.label.clone(),
            file: args.input.clone(),
        }],
        ..Default::default()
    }
}

fn run_evaluation(config: &EvaluationConfig) -> Result<(), Box<dyn Error>> {
    for segment in &config.segments {
        validate_input_file(&config.resolve(&segment.file))?;
    }
    validate_output_dir(&config.results_path())?;

    match evaluation::run(config, &LogReporter) {
        Ok(RunOutput {
            evaluation,
            statistics_path,
            error_series_path,
        }) => {
            for segment in &evaluation.segments {
                println!("{}: {}", segment.label, segment.result.statistics);
            }
            println!("{}: {}", config.label, evaluation.combined.statistics);
            info!("Statistics written to {}", statistics_path.display());
            info!("Error series written to {}", error_series_path.display());
            Ok(())
        }
        Err(e) => {
            error!("Evaluation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Log level for a run: an explicit --log-level wins over the configuration file.
fn effective_log_level<'a>(cli: &'a Cli, config: Option<&'a EvaluationConfig>) -> &'a str {
    match (cli.log_level.as_deref(), config) {
        (Some(level), _) => level,
        (None, Some(config)) => config.logging.level.as_str(),
        (None, None) => "info",
    }
}

fn create_config_file(args: &CreateConfigArgs) -> Result<(), Box<dyn Error>> {
    let config = EvaluationConfig::default();
    config.to_file(&args.output)?;
    println!("Configuration written to {}", args.output.display());
    println!("\nYou can now run the evaluation with:");
    println!("  trajeval --config {}", args.output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // A configuration file carries its own logging preferences; explicit flags still win.
    if let Some(ref config_path) = cli.config {
        let config = EvaluationConfig::load(config_path)?;
        let config_log_file = config.logging.file.as_ref().map(PathBuf::from);
        let log_file = cli.log_file.as_ref().or(config_log_file.as_ref());
        init_logger(effective_log_level(&cli, Some(&config)), log_file)?;

        info!("Running evaluation from configuration {}", config_path.display());
        return run_evaluation(&config);
    }

    init_logger(effective_log_level(&cli, None), cli.log_file.as_ref())?;

    match cli.command {
        Some(Command::Combine(args)) => {
            info!(
                "Combining segments {} and {}",
                args.segment_a.display(),
                args.segment_b.display()
            );
            run_evaluation(&combine_config(&args))
        }
        Some(Command::Segment(args)) => {
            info!("Evaluating segment {}", args.input.display());
            run_evaluation(&segment_config(&args))
        }
        Some(Command::CreateConfig(args)) => create_config_file(&args),
        None => {
            eprintln!("Error: No command provided. Use -h or --help for usage information.");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_combine() {
        let cli = Cli::try_parse_from([
            "trajeval",
            "combine",
            "-a",
            "agent_a.csv",
            "-b",
            "agent_b.csv",
            "-o",
            "results",
            "--metric",
            "xy",
        ])
        .unwrap();
        let Some(Command::Combine(args)) = cli.command else {
            panic!("expected combine command");
        };
        let config = combine_config(&args);
        assert_eq!(config.segments.len(), 2);
        assert_eq!(config.segments[0].file, PathBuf::from("agent_a.csv"));
        assert_eq!(config.segments[1].label, "B");
        assert_eq!(config.metric, MetricKind::Xy);
        assert_eq!(config.segment_gap, DEFAULT_SEGMENT_GAP);
        assert_eq!(config.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_parse_segment() {
        let cli = Cli::try_parse_from(["trajeval", "segment", "-i", "a.csv", "-o", "out"]).unwrap();
        let Some(Command::Segment(args)) = cli.command else {
            panic!("expected segment command");
        };
        let config = segment_config(&args);
        assert_eq!(config.segments.len(), 1);
        assert_eq!(config.metric, MetricKind::Translation);
        assert_eq!(config.statistics_file, "ape_statistics.json");
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from(["trajeval", "--config", "run.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("run.toml")));
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, None);
        assert_eq!(effective_log_level(&cli, None), "info");
    }

    #[test]
    fn test_log_level_flag_overrides_config() {
        let mut config = EvaluationConfig::default();
        config.logging.level = trajeval::config::LogLevel::Warn;

        let cli = Cli::try_parse_from(["trajeval", "--config", "run.toml"]).unwrap();
        assert_eq!(effective_log_level(&cli, Some(&config)), "warn");

        let cli = Cli::try_parse_from(["trajeval", "--config", "run.toml", "--log-level", "debug"])
            .unwrap();
        assert_eq!(effective_log_level(&cli, Some(&config)), "debug");
    }

    #[test]
    fn test_create_config_file_reads_back() {
        let output = std::env::temp_dir().join(format!("trajeval_cli_{}_template.yaml", std::process::id()));
        create_config_file(&CreateConfigArgs {
            output: output.clone(),
        })
        .unwrap();

        let config = EvaluationConfig::from_file(&output).unwrap();
        assert_eq!(config, EvaluationConfig::default());
        assert_eq!(config.segments.len(), 2);
        let _ = std::fs::remove_file(&output);
    }
}
