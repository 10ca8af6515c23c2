//! CSV records for associated and aligned estimate/reference pairs.
//!
//! This is the hand-off format between an external association and alignment step and this crate: one row per
//! sample, holding the timestamp, the aligned estimated position and the corresponding reference position.
//!
//! ```text
//! timestamp,est_x,est_y,est_z,ref_x,ref_y,ref_z
//! 127.00,0.512,-0.034,0.000,0.498,-0.041,0.000
//! ```

use std::io;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{ApeError, PositionArray};

/// A single aligned sample.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct AlignedPairRecord {
    /// Timestamp in seconds
    pub timestamp: f64,
    /// Aligned estimated position
    pub est_x: f64,
    pub est_y: f64,
    pub est_z: f64,
    /// Reference (ground truth) position
    pub ref_x: f64,
    pub ref_y: f64,
    pub ref_z: f64,
}

/// An aligned segment in columnar form, ready to be handed to the aggregator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSegment {
    pub timestamps: Vec<f64>,
    pub estimate: PositionArray,
    pub reference: PositionArray,
}

impl AlignedSegment {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Checks that the timestamp, estimate and reference columns have the same length.
    pub fn check_columns(&self) -> Result<(), ApeError> {
        let (t, e, r) = (self.timestamps.len(), self.estimate.len(), self.reference.len());
        if t != e || t != r {
            return Err(ApeError::ShapeMismatch(format!(
                "{} timestamps, {} estimated and {} reference positions",
                t, e, r
            )));
        }
        Ok(())
    }

    /// Row form of the segment.
    ///
    /// # Errors
    /// * `ApeError::ShapeMismatch` if the columns differ in length.
    pub fn to_records(&self) -> Result<Vec<AlignedPairRecord>, ApeError> {
        self.check_columns()?;
        Ok(self
            .timestamps
            .iter()
            .zip(self.estimate.iter())
            .zip(self.reference.iter())
            .map(|((t, e), r)| AlignedPairRecord {
                timestamp: *t,
                est_x: e.x,
                est_y: e.y,
                est_z: e.z,
                ref_x: r.x,
                ref_y: r.y,
                ref_z: r.z,
            })
            .collect())
    }
}

impl From<&[AlignedPairRecord]> for AlignedSegment {
    fn from(records: &[AlignedPairRecord]) -> Self {
        let mut segment = AlignedSegment {
            timestamps: Vec::with_capacity(records.len()),
            ..Default::default()
        };
        for record in records {
            segment.timestamps.push(record.timestamp);
            segment
                .estimate
                .push(Vector3::new(record.est_x, record.est_y, record.est_z));
            segment
                .reference
                .push(Vector3::new(record.ref_x, record.ref_y, record.ref_z));
        }
        segment
    }
}

/// Reads an aligned pair CSV file into a segment.
///
/// # Arguments
/// * `path` - Path to the CSV file to read.
///
/// # Returns
/// * `Ok(AlignedSegment)` if successful.
/// * `Err` if the file cannot be opened or a row cannot be parsed.
pub fn read_aligned_pairs<P: AsRef<Path>>(path: P) -> io::Result<AlignedSegment> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(io::Error::other)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: AlignedPairRecord = result.map_err(io::Error::other)?;
        records.push(record);
    }
    Ok(AlignedSegment::from(records.as_slice()))
}

/// Writes a segment as an aligned pair CSV file.
///
/// # Errors
/// * `InvalidInput` if the segment's columns differ in length; nothing is written.
pub fn write_aligned_pairs<P: AsRef<Path>>(segment: &AlignedSegment, path: P) -> io::Result<()> {
    let records = segment
        .to_records()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut writer = csv::Writer::from_path(path).map_err(io::Error::other)?;
    for record in records {
        writer.serialize(record).map_err(io::Error::other)?;
    }
    writer.flush()?;
    Ok(())
}
