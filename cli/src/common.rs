//! Shared utilities for the command line front end:
//! - Logger initialization
//! - Input and output path validation

use std::error::Error;
use std::path::{Path, PathBuf};

/// Initialize the logger with the specified configuration.
///
/// # Arguments
/// * `log_level` - Log level string (off, error, warn, info, debug, trace)
/// * `log_file` - Optional path to log file (logs to stderr if None)
///
/// # Errors
/// Returns an error if the log file cannot be opened or logger initialization fails.
pub fn init_logger(log_level: &str, log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    use std::io::Write;

    let level = parse_level(log_level);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let target = Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.try_init()?;
    Ok(())
}

/// Parse a log level, falling back to `info` for unknown values.
pub fn parse_level(log_level: &str) -> log::LevelFilter {
    log_level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
        log::LevelFilter::Info
    })
}

/// Validate that an input path exists and is a CSV file.
///
/// # Errors
/// Returns an error if the path does not exist, is not a file, or does not have a `.csv` extension.
pub fn validate_input_file(input: &Path) -> Result<(), Box<dyn Error>> {
    if !input.exists() {
        return Err(format!("Input path '{}' does not exist.", input.display()).into());
    }
    if !input.is_file() {
        return Err(format!("Input path '{}' is not a file.", input.display()).into());
    }
    if input.extension().and_then(|s| s.to_str()) != Some("csv") {
        return Err(format!("Input file '{}' is not a CSV file.", input.display()).into());
    }
    Ok(())
}

/// Validate output path and create it as a directory if needed.
///
/// # Errors
/// Returns an error if the path exists but is not a directory, or if directory creation fails.
pub fn validate_output_dir(output: &Path) -> Result<(), Box<dyn Error>> {
    if !output.exists() {
        std::fs::create_dir_all(output)?;
    } else if !output.is_dir() {
        return Err(format!("Output path '{}' is not a directory.", output.display()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trajeval_cli_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), log::LevelFilter::Debug);
        assert_eq!(parse_level("OFF"), log::LevelFilter::Off);
        assert_eq!(parse_level("loud"), log::LevelFilter::Info);
    }

    #[test]
    fn test_validate_input_file() {
        let csv = temp_path("input.csv");
        std::fs::write(&csv, "timestamp,est_x,est_y,est_z,ref_x,ref_y,ref_z\n").unwrap();
        assert!(validate_input_file(&csv).is_ok());

        let txt = temp_path("input.txt");
        std::fs::write(&txt, "").unwrap();
        assert!(validate_input_file(&txt).is_err());
        assert!(validate_input_file(&temp_path("missing.csv")).is_err());

        let _ = std::fs::remove_file(&csv);
        let _ = std::fs::remove_file(&txt);
    }

    #[test]
    fn test_validate_output_dir_creates_directory() {
        let dir = temp_path("out").join("nested");
        assert!(validate_output_dir(&dir).is_ok());
        assert!(dir.is_dir());

        let file = temp_path("out_file.csv");
        std::fs::write(&file, "").unwrap();
        assert!(validate_output_dir(&file).is_err());

        let _ = std::fs::remove_dir_all(temp_path("out"));
        let _ = std::fs::remove_file(&file);
    }
}
