//! Combined absolute pose error toolbox
//!
//! This crate provides the tools for evaluating the absolute pose error (APE) of one or more estimated trajectory
//! segments against a ground-truth reference and for pooling the errors of several segments into a single set of
//! summary statistics. The typical use case is a multi-agent SLAM experiment where two agents each cover a part of
//! the same route: each agent's trajectory is associated and aligned against the ground truth on its own, and the
//! two aligned segments are then evaluated together as if they were a single trajectory.
//!
//! This crate does NOT load trajectory files, associate samples by timestamp, or align trajectories. Those steps
//! are assumed to be done by an external trajectory-evaluation tool. The input to this crate is a set of
//! _already aligned_ position arrays, one estimate and one reference per segment, with index `i` of the estimate
//! corresponding to index `i` of the reference.
//!
//! Primarily built off of:
//! - [`nalgebra`](https://crates.io/crates/nalgebra): Provides the vector types for positions.
//! - [`serde`](https://crates.io/crates/serde): Provides (de)serialization for statistics, configuration and records.
//!
//! ## Crate overview
//!
//! This crate is organized into several modules:
//! - [aggregate]: The error aggregator that pools the per-sample errors of several segments.
//! - [metrics]: The [metrics::ErrorMetric] trait and the translation based metrics.
//! - [statistics]: The [statistics::ErrorStatistics] record and its computation.
//! - [timeline]: Helpers to build the combined time axis used to display a pooled error series.
//! - [records]: CSV records for aligned estimate/reference pairs.
//! - [sink]: Persists statistics and error series to a results directory.
//! - [report]: Injectable progress and result reporting.
//! - [config]: Configuration structures for an evaluation run.
//! - [evaluation]: Runs a configured evaluation end to end: load, evaluate, pool and persist.
//!
//! ## Pooled statistics
//!
//! Given segments $A$ and $B$ with $N_A$ and $N_B$ samples, the combined estimate and reference sequences are the
//! concatenations $\hat{p} = [\hat{p}_A, \hat{p}_B]$ and $p = [p_A, p_B]$. The per-sample error is
//!
//! $$
//! e_i = \lVert \hat{p}_i - p_i \rVert_2
//! $$
//!
//! and the statistics are computed over all $N_A + N_B$ samples at once:
//!
//! $$
//! \text{rmse} = \sqrt{\frac{1}{N} \sum_i e_i^2}, \quad \text{sse} = \sum_i e_i^2
//! $$
//!
//! Median and standard deviation are recomputed over the pooled samples, never averaged from per-segment values.
pub mod aggregate;
pub mod config;
pub mod evaluation;
pub mod metrics;
pub mod records;
pub mod report;
pub mod sink;
pub mod statistics;
pub mod timeline;

use std::fmt::{self, Debug, Display};
use std::io;

use nalgebra::{DMatrix, Vector3};
use thiserror::Error;

/// A single 3D position sample.
pub type Position = Vector3<f64>;

/// Errors raised while aggregating absolute pose errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApeError {
    /// Corresponding arrays differ in length, or a position does not have three components.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// There are no samples to compute statistics over.
    #[error("empty input: no error samples to aggregate")]
    EmptyInput,
}

impl From<ApeError> for io::Error {
    fn from(err: ApeError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// Ordered sequence of 3D positions, one per pose sample.
///
/// Insertion order is temporal order. The array is always three dimensional; row or matrix based data with
/// any other number of components is rejected when converted.
#[derive(Clone, Default, PartialEq)]
pub struct PositionArray {
    positions: Vec<Position>,
}

impl PositionArray {
    /// Creates an empty position array.
    pub fn new() -> Self {
        PositionArray {
            positions: Vec::new(),
        }
    }
    /// Number of position samples.
    pub fn len(&self) -> usize {
        self.positions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
    /// Appends a position at the end of the array.
    pub fn push(&mut self, position: Position) {
        self.positions.push(position);
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.positions.iter()
    }
    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }
    /// Returns a new array holding `self` followed by `other`.
    pub fn concat(&self, other: &PositionArray) -> PositionArray {
        let mut positions = Vec::with_capacity(self.len() + other.len());
        positions.extend_from_slice(&self.positions);
        positions.extend_from_slice(&other.positions);
        PositionArray { positions }
    }
    /// Returns the positions as an `N x 3` matrix.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.len(), 3, |row, col| self.positions[row][col])
    }
}

impl Debug for PositionArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionArray")
            .field("len", &self.positions.len())
            .field("positions", &self.positions)
            .finish()
    }
}

impl Display for PositionArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.positions.first(), self.positions.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "PositionArray({} samples, first: [{:.3}, {:.3}, {:.3}], last: [{:.3}, {:.3}, {:.3}])",
                self.positions.len(),
                first.x,
                first.y,
                first.z,
                last.x,
                last.y,
                last.z
            ),
            _ => write!(f, "PositionArray(0 samples)"),
        }
    }
}

impl From<Vec<Position>> for PositionArray {
    fn from(positions: Vec<Position>) -> Self {
        PositionArray { positions }
    }
}

impl From<&[[f64; 3]]> for PositionArray {
    fn from(rows: &[[f64; 3]]) -> Self {
        PositionArray {
            positions: rows.iter().map(|r| Vector3::new(r[0], r[1], r[2])).collect(),
        }
    }
}

impl From<PositionArray> for Vec<Position> {
    fn from(array: PositionArray) -> Self {
        array.positions
    }
}

impl TryFrom<&[Vec<f64>]> for PositionArray {
    type Error = ApeError;

    fn try_from(rows: &[Vec<f64>]) -> Result<Self, Self::Error> {
        let mut positions = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != 3 {
                return Err(ApeError::ShapeMismatch(format!(
                    "position {} has {} components, expected 3",
                    i,
                    row.len()
                )));
            }
            positions.push(Vector3::new(row[0], row[1], row[2]));
        }
        Ok(PositionArray { positions })
    }
}

impl TryFrom<Vec<Vec<f64>>> for PositionArray {
    type Error = ApeError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        PositionArray::try_from(rows.as_slice())
    }
}

/// Converts an `N x 3` matrix, one position per row.
impl TryFrom<&DMatrix<f64>> for PositionArray {
    type Error = ApeError;

    fn try_from(matrix: &DMatrix<f64>) -> Result<Self, Self::Error> {
        if matrix.ncols() != 3 {
            return Err(ApeError::ShapeMismatch(format!(
                "position matrix has {} columns, expected 3",
                matrix.ncols()
            )));
        }
        let positions = matrix
            .row_iter()
            .map(|row| Vector3::new(row[0], row[1], row[2]))
            .collect();
        Ok(PositionArray { positions })
    }
}

impl<'a> IntoIterator for &'a PositionArray {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

impl FromIterator<Position> for PositionArray {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        PositionArray {
            positions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_array_from_rows() {
        let rows = vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]];
        let array = PositionArray::try_from(rows).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array.as_slice()[1], Vector3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_position_array_from_rows_wrong_dimension() {
        let rows = vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0]];
        let result = PositionArray::try_from(rows);
        assert!(matches!(result, Err(ApeError::ShapeMismatch(_))));
    }

    #[test]
    fn test_position_array_from_matrix() {
        let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let array = PositionArray::try_from(&matrix).unwrap();
        assert_eq!(array.as_slice()[0], Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(array.to_matrix(), matrix);
    }

    #[test]
    fn test_position_array_from_matrix_wrong_columns() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            PositionArray::try_from(&matrix),
            Err(ApeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_concat_keeps_order() {
        let a = PositionArray::from(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]][..]);
        let b = PositionArray::from(&[[2.0, 0.0, 0.0]][..]);
        let ab = a.concat(&b);
        assert_eq!(ab.len(), 3);
        let xs: Vec<f64> = ab.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_ape_error_into_io_error() {
        let err: io::Error = ApeError::EmptyInput.into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(PositionArray::new().to_string(), "PositionArray(0 samples)");
    }
}
