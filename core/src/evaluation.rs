//! End-to-end combined evaluation.
//!
//! This module wires the pieces of the crate together the way an evaluation run uses them:
//! - Load every aligned segment listed in an [EvaluationConfig]
//! - Evaluate each segment on its own (per-agent APE)
//! - Pool all segments with the [ErrorAggregator] (combined APE)
//! - Build the combined time axis and the shared colour range
//! - Persist the pooled statistics and error series with the [ResultsSink]
//!
//! Progress and results are sent to an injected [Reporter].

use std::io;
use std::path::PathBuf;

use crate::aggregate::{AggregateResult, ErrorAggregator, Segment};
use crate::config::EvaluationConfig;
use crate::metrics::ErrorMetric;
use crate::records::{AlignedSegment, read_aligned_pairs};
use crate::report::Reporter;
use crate::sink::ResultsSink;
use crate::statistics::ErrorStatistics;
use crate::timeline;
use crate::ApeError;

/// A loaded segment and its label.
#[derive(Debug, Clone)]
pub struct LabeledSegment {
    pub label: String,
    pub segment: AlignedSegment,
}

/// Result of evaluating one segment on its own.
#[derive(Debug, Clone)]
pub struct SegmentEvaluation {
    pub label: String,
    pub result: AggregateResult,
}

/// Result of a combined evaluation.
#[derive(Debug, Clone)]
pub struct CombinedEvaluation {
    /// Per-segment results, in concatenation order
    pub segments: Vec<SegmentEvaluation>,
    /// Pooled result over all segments
    pub combined: AggregateResult,
    /// Combined time axis, index-aligned with `combined.errors`
    pub timestamps: Vec<f64>,
    /// Common error range of all segments, for colouring them on one scale
    pub color_range: (f64, f64),
}

/// Evaluates every segment on its own and all of them pooled.
///
/// Per-segment statistics are only reported for non-empty segments; the pooled statistics require at least
/// one sample overall.
pub fn evaluate<M: ErrorMetric>(
    aggregator: &ErrorAggregator<M>,
    segments: &[LabeledSegment],
    segment_gap: f64,
    reporter: &dyn Reporter,
    label: &str,
) -> Result<CombinedEvaluation, ApeError> {
    reporter.progress("calculating APE");
    let views: Vec<Segment<'_>> = segments
        .iter()
        .map(|s| Segment::new(&s.segment.estimate, &s.segment.reference))
        .collect();
    let combined = aggregator.aggregate_segments(&views)?;

    let axes: Vec<&[f64]> = segments
        .iter()
        .map(|s| s.segment.timestamps.as_slice())
        .collect();
    let timestamps = timeline::concatenate_all(&axes, segment_gap);
    if timestamps.len() != combined.errors.len() {
        return Err(ApeError::ShapeMismatch(format!(
            "{} timestamps for {} error samples",
            timestamps.len(),
            combined.errors.len()
        )));
    }

    let mut evaluations = Vec::with_capacity(segments.len());
    for labeled in segments.iter().filter(|s| !s.segment.is_empty()) {
        let result =
            aggregator.evaluate_segment(&labeled.segment.estimate, &labeled.segment.reference)?;
        evaluations.push(SegmentEvaluation {
            label: labeled.label.clone(),
            result,
        });
    }

    let per_segment: Vec<&[f64]> = evaluations.iter().map(|e| e.result.errors.as_slice()).collect();
    let color_range = ErrorStatistics::shared_range(&per_segment)
        .unwrap_or((combined.statistics.min, combined.statistics.max));

    // Results are only reported once every check has passed.
    for evaluation in &evaluations {
        reporter.segment(&evaluation.label, &evaluation.result.statistics);
    }
    reporter.combined(label, &combined.statistics);

    Ok(CombinedEvaluation {
        segments: evaluations,
        combined,
        timestamps,
        color_range,
    })
}

/// Output files of a run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub evaluation: CombinedEvaluation,
    pub statistics_path: PathBuf,
    pub error_series_path: PathBuf,
}

/// Runs the evaluation described by a configuration and writes its results.
pub fn run(config: &EvaluationConfig, reporter: &dyn Reporter) -> io::Result<RunOutput> {
    config.validate()?;

    reporter.progress("loading aligned segments");
    let mut segments = Vec::with_capacity(config.segments.len());
    for segment_config in &config.segments {
        let path = config.resolve(&segment_config.file);
        let segment = read_aligned_pairs(&path).map_err(|e| {
            io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
        })?;
        reporter.progress(&format!(
            "loaded {} aligned samples for {} from {}",
            segment.len(),
            segment_config.label,
            path.display()
        ));
        segments.push(LabeledSegment {
            label: segment_config.label.clone(),
            segment,
        });
    }

    let aggregator = ErrorAggregator::new(config.metric.build());
    reporter.progress(&format!("metric: {}", aggregator.metric().name()));
    let evaluation = evaluate(
        &aggregator,
        &segments,
        config.segment_gap,
        reporter,
        &config.label,
    )?;

    let sink = ResultsSink::new(config.results_path());
    let statistics_path =
        sink.write_statistics(&config.statistics_file, &config.label, &evaluation.combined.statistics)?;
    let error_series_path = sink.write_error_series(
        &config.error_series_file,
        &evaluation.timestamps,
        &evaluation.combined.errors,
    )?;
    reporter.progress(&format!("results written to {}", sink.results_dir().display()));

    Ok(RunOutput {
        evaluation,
        statistics_path,
        error_series_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TranslationError;
    use crate::report::tests::RecordingReporter;
    use crate::report::SilentReporter;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Vector3;

    fn segment(timestamps: &[f64], offsets: &[f64]) -> AlignedSegment {
        AlignedSegment {
            timestamps: timestamps.to_vec(),
            estimate: offsets.iter().map(|&dx| Vector3::new(dx, 0.0, 0.0)).collect(),
            reference: offsets.iter().map(|_| Vector3::zeros()).collect(),
        }
    }

    fn labeled(label: &str, segment: AlignedSegment) -> LabeledSegment {
        LabeledSegment {
            label: label.to_string(),
            segment,
        }
    }

    #[test]
    fn test_evaluate_two_segments() {
        let segments = vec![
            labeled("A", segment(&[10.0, 11.0], &[0.0, 1.0])),
            labeled("B", segment(&[127.0, 128.0, 129.0], &[2.0, 2.0, 3.0])),
        ];
        let aggregator = ErrorAggregator::new(TranslationError);
        let reporter = RecordingReporter::default();
        let evaluation = evaluate(&aggregator, &segments, 0.3, &reporter, "AB").unwrap();

        assert_eq!(evaluation.combined.errors, vec![0.0, 1.0, 2.0, 2.0, 3.0]);
        assert_eq!(evaluation.segments.len(), 2);
        assert_approx_eq!(evaluation.segments[0].result.statistics.mean, 0.5, 1e-12);
        assert_approx_eq!(evaluation.segments[1].result.statistics.mean, 7.0 / 3.0, 1e-12);
        assert_eq!(evaluation.timestamps.len(), 5);
        assert_approx_eq!(evaluation.timestamps[2], 11.3, 1e-12);
        assert_eq!(evaluation.color_range, (0.0, 3.0));

        let messages = reporter.messages.borrow();
        assert_eq!(messages.first().map(String::as_str), Some("calculating APE"));
        assert!(messages.iter().any(|m| m.starts_with("segment A")));
        assert!(messages.iter().any(|m| m.starts_with("combined AB")));
    }

    #[test]
    fn test_evaluate_skips_empty_segment_statistics() {
        let segments = vec![
            labeled("A", AlignedSegment::default()),
            labeled("B", segment(&[1.0], &[4.0])),
        ];
        let aggregator = ErrorAggregator::new(TranslationError);
        let evaluation = evaluate(&aggregator, &segments, 0.3, &SilentReporter, "AB").unwrap();
        assert_eq!(evaluation.segments.len(), 1);
        assert_eq!(evaluation.segments[0].label, "B");
        assert_eq!(evaluation.combined.errors, vec![4.0]);
    }

    #[test]
    fn test_evaluate_all_empty() {
        let segments = vec![
            labeled("A", AlignedSegment::default()),
            labeled("B", AlignedSegment::default()),
        ];
        let aggregator = ErrorAggregator::new(TranslationError);
        let result = evaluate(&aggregator, &segments, 0.3, &SilentReporter, "AB");
        assert!(matches!(result, Err(ApeError::EmptyInput)));
    }

    #[test]
    fn test_evaluate_timestamp_count_mismatch() {
        let mut broken = segment(&[1.0, 2.0], &[0.0, 1.0]);
        broken.timestamps.pop();
        let segments = vec![labeled("A", broken)];
        let aggregator = ErrorAggregator::new(TranslationError);
        let reporter = RecordingReporter::default();
        let result = evaluate(&aggregator, &segments, 0.3, &reporter, "A");
        assert!(matches!(result, Err(ApeError::ShapeMismatch(_))));

        let messages = reporter.messages.borrow();
        assert!(
            messages
                .iter()
                .all(|m| !m.starts_with("segment") && !m.starts_with("combined"))
        );
    }
}
