//! Pooled absolute pose error over several aligned trajectory segments.
//!
//! Each segment is an (estimate, reference) pair that has already been associated and aligned by an external
//! tool, so sample `i` of the estimate corresponds to sample `i` of the reference. The aggregator concatenates
//! the segments in the order given, computes one error per sample with its [ErrorMetric], and derives the
//! [ErrorStatistics] over the whole pooled set.
//!
//! ```
//! use trajeval::PositionArray;
//! use trajeval::aggregate::aggregate;
//!
//! let est_a = PositionArray::from(&[[0.0, 0.0, 0.0]][..]);
//! let ref_a = est_a.clone();
//! let est_b = PositionArray::from(&[[1.0, 0.0, 0.0]][..]);
//! let ref_b = PositionArray::from(&[[0.0, 0.0, 0.0]][..]);
//!
//! let result = aggregate(&est_a, &ref_a, &est_b, &ref_b).unwrap();
//! assert_eq!(result.errors, vec![0.0, 1.0]);
//! assert_eq!(result.statistics.median, 0.5);
//! ```

use crate::metrics::{ErrorMetric, TranslationError};
use crate::statistics::ErrorStatistics;
use crate::{ApeError, PositionArray};

/// One aligned (estimate, reference) pair.
#[derive(Clone, Copy, Debug)]
pub struct Segment<'a> {
    pub estimate: &'a PositionArray,
    pub reference: &'a PositionArray,
}

impl<'a> Segment<'a> {
    pub fn new(estimate: &'a PositionArray, reference: &'a PositionArray) -> Self {
        Segment {
            estimate,
            reference,
        }
    }
}

/// Statistics together with the per-sample errors they were computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateResult {
    pub statistics: ErrorStatistics,
    /// Per-sample errors in concatenation order.
    pub errors: Vec<f64>,
    /// Number of samples contributed by each segment, in concatenation order.
    pub segment_lengths: Vec<usize>,
}

impl AggregateResult {
    /// Errors contributed by the segment at `index`.
    pub fn segment_errors(&self, index: usize) -> Option<&[f64]> {
        let len = *self.segment_lengths.get(index)?;
        let start: usize = self.segment_lengths[..index].iter().sum();
        self.errors.get(start..start + len)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pools the errors of aligned segments under a given metric.
#[derive(Clone, Debug, Default)]
pub struct ErrorAggregator<M: ErrorMetric = TranslationError> {
    metric: M,
}

impl<M: ErrorMetric> ErrorAggregator<M> {
    pub fn new(metric: M) -> Self {
        ErrorAggregator { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Absolute pose error of a single aligned segment.
    pub fn evaluate_segment(
        &self,
        estimate: &PositionArray,
        reference: &PositionArray,
    ) -> Result<AggregateResult, ApeError> {
        self.aggregate_segments(&[Segment::new(estimate, reference)])
    }

    /// Pooled absolute pose error of two aligned segments, `A` first then `B`.
    ///
    /// # Errors
    /// * `ApeError::ShapeMismatch` if `est_a`/`ref_a` or `est_b`/`ref_b` differ in length.
    /// * `ApeError::EmptyInput` if both segments are empty.
    pub fn aggregate(
        &self,
        est_a: &PositionArray,
        ref_a: &PositionArray,
        est_b: &PositionArray,
        ref_b: &PositionArray,
    ) -> Result<AggregateResult, ApeError> {
        self.aggregate_segments(&[Segment::new(est_a, ref_a), Segment::new(est_b, ref_b)])
    }

    /// Pooled absolute pose error of any number of aligned segments, in the order given.
    ///
    /// All segments are validated before any error is computed, so a mismatch anywhere yields no result.
    pub fn aggregate_segments(&self, segments: &[Segment<'_>]) -> Result<AggregateResult, ApeError> {
        for (i, segment) in segments.iter().enumerate() {
            if segment.estimate.len() != segment.reference.len() {
                return Err(ApeError::ShapeMismatch(format!(
                    "segment {}: estimate has {} positions but reference has {}",
                    i,
                    segment.estimate.len(),
                    segment.reference.len()
                )));
            }
        }

        let errors: Vec<f64> = segments
            .iter()
            .flat_map(|segment| segment.estimate.iter().zip(segment.reference.iter()))
            .map(|(e, r)| self.metric.compute_error(e, r))
            .collect();
        let statistics = ErrorStatistics::from_errors(&errors)?;

        Ok(AggregateResult {
            statistics,
            errors,
            segment_lengths: segments.iter().map(|s| s.estimate.len()).collect(),
        })
    }
}

/// Pooled translation error of two aligned segments. See [ErrorAggregator::aggregate].
pub fn aggregate(
    est_a: &PositionArray,
    ref_a: &PositionArray,
    est_b: &PositionArray,
    ref_b: &PositionArray,
) -> Result<AggregateResult, ApeError> {
    ErrorAggregator::new(TranslationError).aggregate(est_a, ref_a, est_b, ref_b)
}
