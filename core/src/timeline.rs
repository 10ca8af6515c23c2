//! Time axis helpers for pooled error series.
//!
//! Two agents usually cover different, possibly overlapping, time windows. To display the pooled error series
//! as one continuous curve the second segment's timestamps are re-based so that they start right after the
//! first segment ends. The resulting axis stays index-aligned with [crate::aggregate::AggregateResult::errors].

/// Default gap, in seconds, inserted between the end of one segment and the start of the next.
pub const DEFAULT_SEGMENT_GAP: f64 = 0.3;

/// Shifts timestamps so that the first one equals `offset`.
///
/// # Example
///
/// ```
/// use trajeval::timeline::to_relative;
///
/// assert_eq!(to_relative(&[100.0, 101.5, 103.0], 10.0), vec![10.0, 11.5, 13.0]);
/// ```
pub fn to_relative(timestamps: &[f64], offset: f64) -> Vec<f64> {
    match timestamps.first() {
        Some(&start) => timestamps.iter().map(|t| t - start + offset).collect(),
        None => Vec::new(),
    }
}

/// Appends the timestamps of `b` after those of `a`, re-based to start at `last(a) + gap`.
///
/// If `a` is empty, `b` is re-based to start at `gap`. The returned axis always has
/// `a.len() + b.len()` entries.
pub fn concatenate(a: &[f64], b: &[f64], gap: f64) -> Vec<f64> {
    let start = a.last().copied().unwrap_or(0.0) + gap;
    let mut combined = Vec::with_capacity(a.len() + b.len());
    combined.extend_from_slice(a);
    combined.extend(to_relative(b, start));
    combined
}

/// Concatenates any number of time axes, each re-based after the previous one with the same gap.
///
/// The first axis is kept as-is.
pub fn concatenate_all(axes: &[&[f64]], gap: f64) -> Vec<f64> {
    let mut iter = axes.iter();
    let first = match iter.next() {
        Some(first) => first.to_vec(),
        None => return Vec::new(),
    };
    iter.fold(first, |combined, axis| concatenate(&combined, axis, gap))
}

/// Elapsed time between the first and last timestamp, zero for fewer than two samples.
pub fn duration(timestamps: &[f64]) -> f64 {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_to_relative_zero_offset() {
        let rel = to_relative(&[1688465598.5, 1688465599.0, 1688465600.25], 0.0);
        assert_eq!(rel, vec![0.0, 0.5, 1.75]);
    }

    #[test]
    fn test_to_relative_empty() {
        assert!(to_relative(&[], 10.0).is_empty());
    }

    #[test]
    fn test_concatenate_rebases_second_axis() {
        let a = [10.0, 11.0, 12.0];
        let b = [500.0, 500.5];
        let combined = concatenate(&a, &b, DEFAULT_SEGMENT_GAP);
        assert_eq!(combined.len(), 5);
        assert_eq!(&combined[..3], &a[..]);
        assert_approx_eq!(combined[3], 12.3, 1e-12);
        assert_approx_eq!(combined[4], 12.8, 1e-12);
    }

    #[test]
    fn test_concatenate_empty_first() {
        let combined = concatenate(&[], &[7.0, 8.0], 0.5);
        assert_eq!(combined, vec![0.5, 1.5]);
    }

    #[test]
    fn test_concatenate_empty_second() {
        let combined = concatenate(&[1.0, 2.0], &[], 0.5);
        assert_eq!(combined, vec![1.0, 2.0]);
    }

    #[test]
    fn test_concatenate_all() {
        let a: &[f64] = &[0.0, 1.0];
        let b: &[f64] = &[50.0];
        let c: &[f64] = &[90.0, 92.0];
        let combined = concatenate_all(&[a, b, c], 1.0);
        assert_eq!(combined, vec![0.0, 1.0, 2.0, 3.0, 5.0]);
        assert!(concatenate_all(&[], 1.0).is_empty());
    }

    #[test]
    fn test_concatenate_is_monotonic() {
        let combined = concatenate(&[0.0, 0.1, 0.2], &[-5.0, -4.9], DEFAULT_SEGMENT_GAP);
        assert!(combined.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(&[2.0, 3.0, 7.5]), 5.5);
        assert_eq!(duration(&[2.0]), 0.0);
        assert_eq!(duration(&[]), 0.0);
    }
}
