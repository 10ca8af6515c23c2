//! Configuration of a combined evaluation run.
//!
//! A configuration names the two aligned segment files, the results directory and the metric, plus the
//! logging preferences of the command line front end. It can be stored as JSON, YAML or TOML; the format is
//! chosen by file extension.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metrics::MetricKind;
use crate::timeline::DEFAULT_SEGMENT_GAP;

/// Log verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Logging preferences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Log file path; logs go to stderr when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// One aligned segment to evaluate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Label used in reports, e.g. the agent name
    pub label: String,
    /// Aligned pair CSV file, relative to `base_dir` unless absolute
    pub file: PathBuf,
}

fn default_gap() -> f64 {
    DEFAULT_SEGMENT_GAP
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_statistics_file() -> String {
    "combined_ape_statistics.json".to_string()
}

fn default_error_series_file() -> String {
    "combined_ape_errors.csv".to_string()
}

fn default_label() -> String {
    "combined trajectory AB".to_string()
}

/// Everything needed to run a combined evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Directory relative paths are resolved against
    #[serde(default)]
    pub base_dir: PathBuf,
    #[serde(default)]
    pub metric: MetricKind,
    /// Gap in seconds between consecutive segments on the combined time axis
    #[serde(default = "default_gap")]
    pub segment_gap: f64,
    /// Label of the pooled result
    #[serde(default = "default_label")]
    pub label: String,
    /// Results directory, relative to `base_dir` unless absolute
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_statistics_file")]
    pub statistics_file: String,
    #[serde(default = "default_error_series_file")]
    pub error_series_file: String,
    /// Segments in concatenation order
    pub segments: Vec<SegmentConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            base_dir: PathBuf::new(),
            metric: MetricKind::default(),
            segment_gap: DEFAULT_SEGMENT_GAP,
            label: default_label(),
            results_dir: default_results_dir(),
            statistics_file: default_statistics_file(),
            error_series_file: default_error_series_file(),
            segments: vec![
                SegmentConfig {
                    label: "A".to_string(),
                    file: PathBuf::from("agent_a_aligned.csv"),
                },
                SegmentConfig {
                    label: "B".to_string(),
                    file: PathBuf::from("agent_b_aligned.csv"),
                },
            ],
            logging: LoggingConfig::default(),
        }
    }
}

impl EvaluationConfig {
    /// Resolve a path against `base_dir`; absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.resolve(&self.results_dir)
    }

    /// Check the configuration can describe a run.
    pub fn validate(&self) -> io::Result<()> {
        if self.segments.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "configuration lists no segments",
            ));
        }
        if !self.segment_gap.is_finite() || self.segment_gap < 0.0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("segment gap must be finite and non-negative, got {}", self.segment_gap),
            ));
        }
        Ok(())
    }

    /// Write the configuration to a JSON file (pretty-printed).
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(io::Error::other)
    }

    /// Read the configuration from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as YAML.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = serde_yaml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }

    /// Read the configuration from YAML.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_yaml::from_reader(file).map_err(io::Error::other)
    }
    /// Write the configuration as TOML.
    pub fn to_toml<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        let s = toml::to_string(self).map_err(io::Error::other)?;
        file.write_all(s.as_bytes())
    }
    /// Read the configuration from TOML.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut s = String::new();
        let mut file = File::open(path)?;
        file.read_to_string(&mut s)?;
        toml::from_str(&s).map_err(io::Error::other)
    }
    /// Generic write: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => self.to_json(p),
            Some("yaml") | Some("yml") => self.to_yaml(p),
            Some("toml") => self.to_toml(p),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported file extension",
            )),
        }
    }
    /// Generic read: choose format by file extension (.json/.yaml/.yml/.toml)
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref();
        match extension(p).as_deref() {
            Some("json") => Self::from_json(p),
            Some("yaml") | Some("yml") => Self::from_yaml(p),
            Some("toml") => Self::from_toml(p),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported file extension",
            )),
        }
    }

    /// Read a configuration for running it: like [EvaluationConfig::from_file], but a relative `base_dir`
    /// (including the empty default) is taken relative to the directory holding the configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let p = path.as_ref();
        let mut config = Self::from_file(p)?;
        if config.base_dir.is_relative()
            && let Some(parent) = p.parent()
        {
            config.base_dir = parent.join(&config.base_dir);
        }
        Ok(config)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}
