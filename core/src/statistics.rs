//! Summary statistics over a sequence of error samples.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::ApeError;

/// Named scalar aggregate of an error sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticKind {
    Rmse,
    Mean,
    Median,
    Std,
    Min,
    Max,
    Sse,
}

impl StatisticKind {
    /// All statistics, in the order they are reported.
    pub const ALL: [StatisticKind; 7] = [
        StatisticKind::Rmse,
        StatisticKind::Mean,
        StatisticKind::Median,
        StatisticKind::Std,
        StatisticKind::Min,
        StatisticKind::Max,
        StatisticKind::Sse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticKind::Rmse => "rmse",
            StatisticKind::Mean => "mean",
            StatisticKind::Median => "median",
            StatisticKind::Std => "std",
            StatisticKind::Min => "min",
            StatisticKind::Max => "max",
            StatisticKind::Sse => "sse",
        }
    }
}

impl Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary statistics of an error sequence.
///
/// `std` is the population standard deviation and `median` is the mean of the two middle values when the
/// number of samples is even.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorStatistics {
    /// Root-mean-square error
    pub rmse: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Sum of squared errors
    pub sse: f64,
}

impl Display for ErrorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ErrorStatistics(rmse: {:.6}, mean: {:.6}, median: {:.6}, std: {:.6}, min: {:.6}, max: {:.6}, sse: {:.6})",
            self.rmse, self.mean, self.median, self.std, self.min, self.max, self.sse
        )
    }
}

impl ErrorStatistics {
    /// Computes the statistics of an error sequence.
    ///
    /// # Arguments
    /// * `errors` - Per-sample errors; the order does not matter.
    ///
    /// # Returns
    /// * `Ok(ErrorStatistics)` if there is at least one sample.
    /// * `Err(ApeError::EmptyInput)` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use trajeval::statistics::ErrorStatistics;
    ///
    /// let stats = ErrorStatistics::from_errors(&[0.0, 1.0]).unwrap();
    /// assert_eq!(stats.mean, 0.5);
    /// assert_eq!(stats.sse, 1.0);
    /// ```
    pub fn from_errors(errors: &[f64]) -> Result<Self, ApeError> {
        if errors.is_empty() {
            return Err(ApeError::EmptyInput);
        }
        let n = errors.len() as f64;
        let sse: f64 = errors.iter().map(|e| e * e).sum();
        let mean = errors.iter().sum::<f64>() / n;
        let variance = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        let min = errors.iter().copied().fold(f64::INFINITY, f64::min);
        let max = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(ErrorStatistics {
            rmse: (sse / n).sqrt(),
            mean,
            median: median(errors),
            std: variance.sqrt(),
            min,
            max,
            sse,
        })
    }

    /// Returns a single statistic.
    pub fn get(&self, kind: StatisticKind) -> f64 {
        match kind {
            StatisticKind::Rmse => self.rmse,
            StatisticKind::Mean => self.mean,
            StatisticKind::Median => self.median,
            StatisticKind::Std => self.std,
            StatisticKind::Min => self.min,
            StatisticKind::Max => self.max,
            StatisticKind::Sse => self.sse,
        }
    }

    /// Name to value map of the statistics. `sse` is left out unless requested, since it does not share
    /// the unit of the other values and is not drawn next to the error series.
    pub fn to_map(&self, include_sse: bool) -> BTreeMap<String, f64> {
        StatisticKind::ALL
            .iter()
            .filter(|kind| include_sse || **kind != StatisticKind::Sse)
            .map(|kind| (kind.to_string(), self.get(*kind)))
            .collect()
    }

    /// Common `(min, max)` range over several error sequences.
    ///
    /// Used to colour several trajectories on a single shared scale. Returns `None` when every sequence
    /// is empty.
    pub fn shared_range(sequences: &[&[f64]]) -> Option<(f64, f64)> {
        let mut values = sequences.iter().flat_map(|s| s.iter().copied()).peekable();
        values.peek()?;
        Some(values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
            (lo.min(e), hi.max(e))
        }))
    }
}

/// Median of a non-empty slice.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_from_errors_two_samples() {
        let stats = ErrorStatistics::from_errors(&[0.0, 1.0]).unwrap();
        assert_approx_eq!(stats.rmse, 0.5f64.sqrt(), 1e-12);
        assert_approx_eq!(stats.mean, 0.5, 1e-12);
        assert_approx_eq!(stats.median, 0.5, 1e-12);
        assert_approx_eq!(stats.std, 0.5, 1e-12);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
        assert_approx_eq!(stats.sse, 1.0, 1e-12);
    }

    #[test]
    fn test_from_errors_single_sample() {
        let stats = ErrorStatistics::from_errors(&[2.5]).unwrap();
        assert_eq!(stats.rmse, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, 2.5);
        assert_eq!(stats.max, 2.5);
        assert_eq!(stats.sse, 6.25);
    }

    #[test]
    fn test_from_errors_empty() {
        assert_eq!(ErrorStatistics::from_errors(&[]), Err(ApeError::EmptyInput));
    }

    #[test]
    fn test_median_odd_unsorted() {
        let stats = ErrorStatistics::from_errors(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.0);
    }

    #[test]
    fn test_median_even_unsorted() {
        let stats = ErrorStatistics::from_errors(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_approx_eq!(stats.median, 2.5, 1e-12);
    }

    #[test]
    fn test_population_std() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let stats = ErrorStatistics::from_errors(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_approx_eq!(stats.mean, 5.0, 1e-12);
        assert_approx_eq!(stats.std, 2.0, 1e-12);
    }

    #[test]
    fn test_to_map_without_sse() {
        let stats = ErrorStatistics::from_errors(&[1.0, 2.0]).unwrap();
        let map = stats.to_map(false);
        assert_eq!(map.len(), 6);
        assert!(!map.contains_key("sse"));
        assert_eq!(map["max"], 2.0);
        assert_eq!(stats.to_map(true).len(), 7);
    }

    #[test]
    fn test_get_matches_fields() {
        let stats = ErrorStatistics::from_errors(&[0.5, 1.5, 4.0]).unwrap();
        assert_eq!(stats.get(StatisticKind::Rmse), stats.rmse);
        assert_eq!(stats.get(StatisticKind::Median), stats.median);
        assert_eq!(stats.get(StatisticKind::Sse), stats.sse);
    }

    #[test]
    fn test_shared_range() {
        let a: &[f64] = &[0.2, 0.8];
        let b: &[f64] = &[0.1, 1.4, 0.5];
        assert_eq!(ErrorStatistics::shared_range(&[a, b]), Some((0.1, 1.4)));
        let empty: &[f64] = &[];
        assert_eq!(ErrorStatistics::shared_range(&[empty, empty]), None);
    }

    #[test]
    fn test_serialize_field_names() {
        let stats = ErrorStatistics::from_errors(&[1.0]).unwrap();
        let json = serde_json::to_value(stats).unwrap();
        for kind in StatisticKind::ALL {
            assert!(json.get(kind.as_str()).is_some(), "missing {kind}");
        }
    }
}
