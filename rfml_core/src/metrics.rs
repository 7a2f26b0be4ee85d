//! Localization error metrics.

use crate::error::RfError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Euclidean error per run between estimated and true positions.
///
/// Both matrices are (runs x dims).
pub fn localization_errors(estimates: &DMatrix<f64>, truth: &DMatrix<f64>) -> Result<DVector<f64>, RfError> {
    if estimates.shape() != truth.shape() {
        return Err(RfError::shape(format!(
            "estimates are {:?} but truth is {:?}",
            estimates.shape(),
            truth.shape()
        )));
    }
    let diff = estimates - truth;
    Ok(DVector::from_iterator(
        diff.nrows(),
        diff.row_iter().map(|row| row.norm()),
    ))
}

/// Summary of localization accuracy over a test scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationReport {
    /// Number of evaluated runs
    pub runs: usize,

    /// Root mean squared error (m)
    pub rmse: f64,

    /// Mean error (m)
    pub mean_error: f64,

    /// Median error (m)
    pub median_error: f64,

    /// Worst-case error (m)
    pub max_error: f64,
}

impl LocalizationReport {
    /// Builds a report from estimated and true positions.
    pub fn from_estimates(estimates: &DMatrix<f64>, truth: &DMatrix<f64>) -> Result<Self, RfError> {
        let errors = localization_errors(estimates, truth)?;
        let runs = errors.len();
        if runs == 0 {
            return Err(RfError::shape("no runs to evaluate"));
        }

        let mut sorted: Vec<f64> = errors.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let median_error = if runs % 2 == 1 {
            sorted[runs / 2]
        } else {
            0.5 * (sorted[runs / 2 - 1] + sorted[runs / 2])
        };

        Ok(Self {
            runs,
            rmse: (errors.norm_squared() / runs as f64).sqrt(),
            mean_error: errors.mean(),
            median_error,
            max_error: sorted[runs - 1],
        })
    }
}
