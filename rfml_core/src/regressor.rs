//! Regressors mapping feature matrices to transmitter locations.
//!
//! [`Regressor`] is the fit/predict capability; [`RidgeRegressor`] is a
//! closed-form linear model, [`ElasticNetRegressor`] fits an L1/L2
//! penalized one by coordinate descent, and [`KernelTrickRegressor`] lifts
//! any base regressor onto the blended kernel matrix of the training
//! dictionary.

use crate::composer::FeatureSet;
use crate::error::RfError;
use crate::kernel::{kernel_matrix, normalize_rows, Kernel};
use nalgebra::{DMatrix, RowDVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fit/predict capability.
pub trait Regressor {
    /// Fitted state produced by [`Regressor::fit`].
    type Model;

    /// Fits `targets` (runs x outputs) from `features` (runs x features).
    fn fit(&self, features: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<Self::Model, RfError>;

    /// Predicts (runs x outputs) for new `features`.
    fn predict(&self, model: &Self::Model, features: &DMatrix<f64>) -> Result<DMatrix<f64>, RfError>;
}

fn check_rows(features: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<(), RfError> {
    if features.nrows() != targets.nrows() {
        return Err(RfError::shape(format!(
            "features have {} rows but targets have {}",
            features.nrows(),
            targets.nrows()
        )));
    }
    if features.nrows() == 0 {
        return Err(RfError::shape("cannot fit on zero samples"));
    }
    Ok(())
}

// =============================================================================
// RIDGE
// =============================================================================

/// L2-penalized least squares with optional intercept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegressor {
    /// Penalty strength
    pub alpha: f64,

    /// Center features and targets before solving
    pub fit_intercept: bool,
}

impl Default for RidgeRegressor {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
        }
    }
}

impl RidgeRegressor {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            ..Default::default()
        }
    }
}

/// Fitted linear coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// (features x outputs)
    pub coef: DMatrix<f64>,

    /// One intercept per output
    pub intercept: RowDVector<f64>,
}

impl Regressor for RidgeRegressor {
    type Model = LinearModel;

    fn fit(&self, features: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<LinearModel, RfError> {
        check_rows(features, targets)?;
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(RfError::config(format!(
                "ridge alpha must be positive, got {}",
                self.alpha
            )));
        }

        let (n, p) = features.shape();
        let d = targets.ncols();
        let x_mean = centering(features, self.fit_intercept);
        let y_mean = centering(targets, self.fit_intercept);
        let xc = centered(features, &x_mean);
        let yc = centered(targets, &y_mean);

        // Solve in whichever space is smaller; both give the same coefficients
        let coef = if p <= n {
            let gram = xc.transpose() * &xc + DMatrix::identity(p, p) * self.alpha;
            let chol = gram
                .cholesky()
                .ok_or_else(|| RfError::Numerical("primal ridge system not positive definite".into()))?;
            chol.solve(&(xc.transpose() * &yc))
        } else {
            let gram = &xc * xc.transpose() + DMatrix::identity(n, n) * self.alpha;
            let chol = gram
                .cholesky()
                .ok_or_else(|| RfError::Numerical("dual ridge system not positive definite".into()))?;
            xc.transpose() * chol.solve(&yc)
        };

        let intercept = y_mean - x_mean * &coef;
        debug!("Ridge fit: n={} p={} outputs={} alpha={}", n, p, d, self.alpha);
        Ok(LinearModel { coef, intercept })
    }

    fn predict(&self, model: &LinearModel, features: &DMatrix<f64>) -> Result<DMatrix<f64>, RfError> {
        model.apply(features)
    }
}

impl LinearModel {
    /// `features * coef + intercept`.
    pub fn apply(&self, features: &DMatrix<f64>) -> Result<DMatrix<f64>, RfError> {
        if features.ncols() != self.coef.nrows() {
            return Err(RfError::shape(format!(
                "model expects {} features, got {}",
                self.coef.nrows(),
                features.ncols()
            )));
        }
        let raw = features * &self.coef;
        Ok(DMatrix::from_fn(raw.nrows(), raw.ncols(), |i, j| {
            raw[(i, j)] + self.intercept[j]
        }))
    }
}

/// Column means, or zeros when no intercept is fitted.
fn centering(m: &DMatrix<f64>, fit_intercept: bool) -> RowDVector<f64> {
    if fit_intercept {
        column_means(m)
    } else {
        RowDVector::zeros(m.ncols())
    }
}

fn centered(m: &DMatrix<f64>, mean: &RowDVector<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)] - mean[j])
}

fn column_means(m: &DMatrix<f64>) -> RowDVector<f64> {
    RowDVector::from_fn(m.ncols(), |_, j| m.column(j).mean())
}

// =============================================================================
// ELASTIC NET
// =============================================================================

/// L1/L2-penalized least squares fitted by cyclic coordinate descent.
///
/// Minimizes, per output column,
///
/// ```text
/// 1/(2n) ||y - Xw||^2 + alpha * l1_ratio * ||w||_1 + alpha * (1 - l1_ratio) / 2 * ||w||^2
/// ```
///
/// `l1_ratio = 1` is the lasso.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetRegressor {
    /// Overall penalty strength
    pub alpha: f64,

    /// Share of the penalty on the L1 term, in [0, 1]
    pub l1_ratio: f64,

    /// Center features and targets before solving
    pub fit_intercept: bool,

    /// Maximum full sweeps over the coefficients
    pub max_iter: usize,

    /// Stop once the largest coefficient update falls below this
    pub tol: f64,
}

impl Default for ElasticNetRegressor {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            l1_ratio: 0.5,
            fit_intercept: true,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl ElasticNetRegressor {
    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio,
            ..Default::default()
        }
    }

    /// Pure L1 penalty.
    pub fn lasso(alpha: f64) -> Self {
        Self::new(alpha, 1.0)
    }

    fn validate(&self) -> Result<(), RfError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(RfError::config(format!(
                "elastic net alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(RfError::config(format!(
                "l1_ratio must lie in [0, 1], got {}",
                self.l1_ratio
            )));
        }
        if self.max_iter == 0 {
            return Err(RfError::config("max_iter must be at least 1"));
        }
        Ok(())
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    value.signum() * (value.abs() - threshold).max(0.0)
}

impl Regressor for ElasticNetRegressor {
    type Model = LinearModel;

    fn fit(&self, features: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<LinearModel, RfError> {
        check_rows(features, targets)?;
        self.validate()?;

        let (n, p) = features.shape();
        let d = targets.ncols();
        let x_mean = centering(features, self.fit_intercept);
        let y_mean = centering(targets, self.fit_intercept);
        let xc = centered(features, &x_mean);
        let yc = centered(targets, &y_mean);

        let l1 = self.alpha * self.l1_ratio * n as f64;
        let l2 = self.alpha * (1.0 - self.l1_ratio) * n as f64;
        let col_norms: Vec<f64> = (0..p).map(|j| xc.column(j).norm_squared()).collect();

        let mut coef = DMatrix::zeros(p, d);
        let mut sweeps = 0;
        for out in 0..d {
            let mut w = vec![0.0; p];
            let mut residual = yc.column(out).clone_owned();

            for sweep in 0..self.max_iter {
                sweeps = sweeps.max(sweep + 1);
                let mut max_step: f64 = 0.0;
                for j in 0..p {
                    let denom = col_norms[j] + l2;
                    if denom == 0.0 {
                        continue;
                    }
                    let column = xc.column(j);
                    let rho = column.dot(&residual) + col_norms[j] * w[j];
                    let updated = soft_threshold(rho, l1) / denom;
                    let step = updated - w[j];
                    if step != 0.0 {
                        residual.axpy(-step, &column, 1.0);
                        w[j] = updated;
                    }
                    max_step = max_step.max(step.abs());
                }
                if max_step < self.tol {
                    break;
                }
            }

            for (j, value) in w.into_iter().enumerate() {
                coef[(j, out)] = value;
            }
        }

        if !coef.iter().all(|c| c.is_finite()) {
            return Err(RfError::Numerical("elastic net coefficients diverged".into()));
        }

        let intercept = y_mean - x_mean * &coef;
        debug!(
            "Elastic net fit: n={} p={} outputs={} alpha={} l1_ratio={} sweeps={}",
            n, p, d, self.alpha, self.l1_ratio, sweeps
        );
        Ok(LinearModel { coef, intercept })
    }

    fn predict(&self, model: &LinearModel, features: &DMatrix<f64>) -> Result<DMatrix<f64>, RfError> {
        model.apply(features)
    }
}

// =============================================================================
// KERNEL TRICK
// =============================================================================

/// Kernelizes features against the training dictionary, L2-normalizes the
/// rows and hands the result to a base regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelTrickRegressor<R> {
    /// Base linear model fitted on the kernel matrix
    pub base: R,

    /// Pairwise kernel applied per block
    pub kernel: Kernel,

    /// Columns per measurement type, in feature order
    pub block_counts: Vec<usize>,

    /// Kernel scale per block
    pub scales: Vec<f64>,
}

/// Training dictionary plus the fitted base model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelTrickModel<M> {
    pub training_features: DMatrix<f64>,
    pub base_model: M,
}

impl<R: Regressor> KernelTrickRegressor<R> {
    /// Single-block regressor with unit scale.
    pub fn new(base: R, kernel: Kernel) -> Self {
        Self {
            base,
            kernel,
            block_counts: Vec::new(),
            scales: Vec::new(),
        }
    }

    /// Sets the per-type block layout and scales.
    pub fn with_blocks(mut self, block_counts: Vec<usize>, scales: Vec<f64>) -> Self {
        self.block_counts = block_counts;
        self.scales = scales;
        self
    }

    /// Takes the block layout from a composed feature set.
    pub fn for_features(base: R, kernel: Kernel, features: &FeatureSet, scales: Vec<f64>) -> Self {
        Self::new(base, kernel).with_blocks(features.block_counts(), scales)
    }

    fn check_layout(&self, n_features: usize) -> Result<(), RfError> {
        if self.scales.len() != self.block_counts.len() {
            return Err(RfError::config(format!(
                "{} kernel scales given for {} measurement types",
                self.scales.len(),
                self.block_counts.len()
            )));
        }
        let declared: usize = self.block_counts.iter().sum();
        if !self.block_counts.is_empty() && declared != n_features {
            return Err(RfError::config(format!(
                "block counts sum to {} but features have {} columns",
                declared, n_features
            )));
        }
        Ok(())
    }

    fn kernelize(&self, reference: &DMatrix<f64>, query: Option<&DMatrix<f64>>) -> Result<DMatrix<f64>, RfError> {
        let k = kernel_matrix(reference, query, self.kernel, &self.block_counts, &self.scales)?;
        Ok(normalize_rows(&k))
    }
}

impl<R: Regressor> Regressor for KernelTrickRegressor<R> {
    type Model = KernelTrickModel<R::Model>;

    fn fit(&self, features: &DMatrix<f64>, targets: &DMatrix<f64>) -> Result<Self::Model, RfError> {
        check_rows(features, targets)?;
        self.check_layout(features.ncols())?;

        let k = self.kernelize(features, None)?;
        let base_model = self.base.fit(&k, targets)?;
        debug!(
            "Kernel-trick fit: kernel={} blocks={:?} -> {:?}",
            self.kernel,
            self.block_counts,
            k.shape()
        );
        Ok(KernelTrickModel {
            training_features: features.clone(),
            base_model,
        })
    }

    fn predict(&self, model: &Self::Model, features: &DMatrix<f64>) -> Result<DMatrix<f64>, RfError> {
        self.check_layout(features.ncols())?;
        let k = self.kernelize(&model.training_features, Some(features))?;
        self.base.predict(&model.base_model, &k)
    }
}
