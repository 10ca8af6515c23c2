//! Persisting evaluation results to a results directory.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::statistics::ErrorStatistics;

/// Statistics as written to disk, with the label of what they describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub label: String,
    pub statistics: ErrorStatistics,
}

impl StatisticsRecord {
    /// Read a statistics record written by [ResultsSink::write_statistics].
    pub fn from_json<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(io::Error::other)
    }
}

/// One row of an error series file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorSeriesRecord {
    pub timestamp: f64,
    pub error: f64,
}

/// Writes results under a single directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct ResultsSink {
    results_dir: PathBuf,
}

impl ResultsSink {
    pub fn new<P: Into<PathBuf>>(results_dir: P) -> Self {
        ResultsSink {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    fn prepare(&self, file_name: &str) -> io::Result<PathBuf> {
        if !self.results_dir.exists() {
            fs::create_dir_all(&self.results_dir)?;
        }
        Ok(self.results_dir.join(file_name))
    }

    /// Writes a labelled statistics record as pretty-printed JSON.
    ///
    /// # Returns
    /// * The path of the written file.
    pub fn write_statistics(
        &self,
        file_name: &str,
        label: &str,
        statistics: &ErrorStatistics,
    ) -> io::Result<PathBuf> {
        let path = self.prepare(file_name)?;
        let record = StatisticsRecord {
            label: label.to_string(),
            statistics: *statistics,
        };
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, &record).map_err(io::Error::other)?;
        Ok(path)
    }

    /// Writes an error series as a `timestamp,error` CSV file.
    ///
    /// # Errors
    /// * `InvalidInput` if `timestamps` and `errors` differ in length.
    pub fn write_error_series(
        &self,
        file_name: &str,
        timestamps: &[f64],
        errors: &[f64],
    ) -> io::Result<PathBuf> {
        if timestamps.len() != errors.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} timestamps for {} error samples",
                    timestamps.len(),
                    errors.len()
                ),
            ));
        }
        let path = self.prepare(file_name)?;
        let mut writer = csv::Writer::from_path(&path).map_err(io::Error::other)?;
        for (&timestamp, &error) in timestamps.iter().zip(errors) {
            writer
                .serialize(ErrorSeriesRecord { timestamp, error })
                .map_err(io::Error::other)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

/// Read an error series file written by [ResultsSink::write_error_series].
pub fn read_error_series<P: AsRef<Path>>(path: P) -> io::Result<Vec<ErrorSeriesRecord>> {
    let mut rdr = csv::Reader::from_path(path).map_err(io::Error::other)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result.map_err(io::Error::other)?);
    }
    Ok(records)
}
