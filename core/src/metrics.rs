//! Per-sample error metrics.
//!
//! An [ErrorMetric] maps one estimated position and its corresponding reference position to a single
//! non-negative error value. The aggregator only depends on this trait, so any metric can be pooled.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Generic error metric trait for a pair of corresponding positions
pub trait ErrorMetric {
    /// Short, human readable name of the metric used in reports
    fn name(&self) -> String;
    /// Compute the error between an estimated position and its reference
    fn compute_error(&self, estimate: &Position, reference: &Position) -> f64;
}

/// Translation error: Euclidean norm of the full 3D position difference.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TranslationError;

impl Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ErrorMetric for TranslationError {
    fn name(&self) -> String {
        "APE w.r.t. translation part (m)".to_string()
    }
    fn compute_error(&self, estimate: &Position, reference: &Position) -> f64 {
        (estimate - reference).norm()
    }
}

/// Coordinate plane a position difference can be projected onto.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    #[default]
    Xy,
    Xz,
    Yz,
}

impl Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Xy => write!(f, "xy"),
            Plane::Xz => write!(f, "xz"),
            Plane::Yz => write!(f, "yz"),
        }
    }
}

impl Plane {
    /// Indices of the two axes spanning the plane.
    pub fn axes(&self) -> (usize, usize) {
        match self {
            Plane::Xy => (0, 1),
            Plane::Xz => (0, 2),
            Plane::Yz => (1, 2),
        }
    }
}

/// Planar translation error: Euclidean norm of the position difference projected onto a coordinate plane.
///
/// Useful for ground vehicles where the reference altitude is unreliable (e.g. RTK GPS ground truth).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanarTranslationError {
    pub plane: Plane,
}

impl PlanarTranslationError {
    pub fn new(plane: Plane) -> Self {
        PlanarTranslationError { plane }
    }
}

impl Display for PlanarTranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ErrorMetric for PlanarTranslationError {
    fn name(&self) -> String {
        format!("APE w.r.t. translation part, {} plane (m)", self.plane)
    }
    fn compute_error(&self, estimate: &Position, reference: &Position) -> f64 {
        let (i, j) = self.plane.axes();
        let diff = estimate - reference;
        diff[i].hypot(diff[j])
    }
}

/// Selectable metric, as named in configuration files and on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Full 3D translation error
    #[default]
    Translation,
    /// Translation error in the xy plane
    Xy,
    /// Translation error in the xz plane
    Xz,
    /// Translation error in the yz plane
    Yz,
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Translation => write!(f, "translation"),
            MetricKind::Xy => write!(f, "xy"),
            MetricKind::Xz => write!(f, "xz"),
            MetricKind::Yz => write!(f, "yz"),
        }
    }
}

impl MetricKind {
    /// Build the metric this kind names.
    pub fn build(&self) -> Box<dyn ErrorMetric + Send + Sync> {
        match self {
            MetricKind::Translation => Box::new(TranslationError),
            MetricKind::Xy => Box::new(PlanarTranslationError::new(Plane::Xy)),
            MetricKind::Xz => Box::new(PlanarTranslationError::new(Plane::Xz)),
            MetricKind::Yz => Box::new(PlanarTranslationError::new(Plane::Yz)),
        }
    }
}

impl<M: ErrorMetric + ?Sized> ErrorMetric for Box<M> {
    fn name(&self) -> String {
        (**self).name()
    }
    fn compute_error(&self, estimate: &Position, reference: &Position) -> f64 {
        (**self).compute_error(estimate, reference)
    }
}
