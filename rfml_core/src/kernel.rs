//! Kernel feature mapper for type-aware kernel-trick regression.
//!
//! A composed feature matrix mixes measurement types with very different
//! scales (ns, dB, rad). The mapper slices it back into homogeneous
//! blocks, computes one pairwise kernel per block with its own scale and
//! concatenates the blocks side by side:
//!
//! ```text
//! K = [ k(Q_delay, R_delay; g0) | k(Q_gain, R_gain; g1) | k(Q_angle, R_angle; g2) ]
//! ```

use crate::error::RfError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Degree of the polynomial kernel.
const POLY_DEGREE: i32 = 3;
/// Constant term of the polynomial and sigmoid kernels.
const COEF0: f64 = 1.0;

/// Pairwise similarity function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kernel {
    /// exp(-g * ||x - y||_1)
    Laplacian,
    /// exp(-g * ||x - y||_2^2)
    Rbf,
    /// x . y
    Linear,
    /// (g * x . y + 1)^3
    Polynomial,
    /// tanh(g * x . y + 1)
    Sigmoid,
    /// x . y / (||x|| ||y||)
    Cosine,
}

impl Kernel {
    /// Returns the kernel name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Laplacian => "laplacian",
            Self::Rbf => "rbf",
            Self::Linear => "linear",
            Self::Polynomial => "polynomial",
            Self::Sigmoid => "sigmoid",
            Self::Cosine => "cosine",
        }
    }

    /// Evaluates the kernel on two rows restricted to `cols` columns
    /// starting at `start`.
    fn eval(&self, a: &DMatrix<f64>, i: usize, b: &DMatrix<f64>, j: usize, start: usize, cols: usize, gamma: f64) -> f64 {
        let pairs = (start..start + cols).map(|c| (a[(i, c)], b[(j, c)]));
        match self {
            Self::Laplacian => (-gamma * pairs.map(|(x, y)| (x - y).abs()).sum::<f64>()).exp(),
            Self::Rbf => (-gamma * pairs.map(|(x, y)| (x - y) * (x - y)).sum::<f64>()).exp(),
            Self::Linear => pairs.map(|(x, y)| x * y).sum(),
            Self::Polynomial => (gamma * pairs.map(|(x, y)| x * y).sum::<f64>() + COEF0).powi(POLY_DEGREE),
            Self::Sigmoid => (gamma * pairs.map(|(x, y)| x * y).sum::<f64>() + COEF0).tanh(),
            Self::Cosine => {
                let (dot, na, nb) = pairs.fold((0.0, 0.0, 0.0), |(d, na, nb), (x, y)| {
                    (d + x * y, na + x * x, nb + y * y)
                });
                if na == 0.0 || nb == 0.0 {
                    0.0
                } else {
                    dot / (na.sqrt() * nb.sqrt())
                }
            }
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::Laplacian
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Kernel {
    type Err = RfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "laplacian" | "manhattan" => Ok(Self::Laplacian),
            "rbf" | "gaussian" => Ok(Self::Rbf),
            "linear" => Ok(Self::Linear),
            "poly" | "polynomial" => Ok(Self::Polynomial),
            "sigmoid" => Ok(Self::Sigmoid),
            "cosine" => Ok(Self::Cosine),
            _ => Err(RfError::config(format!("Unknown kernel: {}", s))),
        }
    }
}

fn pairwise_block(
    query: &DMatrix<f64>,
    reference: &DMatrix<f64>,
    kernel: Kernel,
    start: usize,
    cols: usize,
    gamma: f64,
) -> DMatrix<f64> {
    DMatrix::from_fn(query.nrows(), reference.nrows(), |i, j| {
        kernel.eval(query, i, reference, j, start, cols, gamma)
    })
}

/// Pairwise kernel over all columns: (query rows x reference rows).
pub fn pairwise_kernel(query: &DMatrix<f64>, reference: &DMatrix<f64>, kernel: Kernel, gamma: f64) -> Result<DMatrix<f64>, RfError> {
    if query.ncols() != reference.ncols() {
        return Err(RfError::shape(format!(
            "query has {} features, reference has {}",
            query.ncols(),
            reference.ncols()
        )));
    }
    Ok(pairwise_block(query, reference, kernel, 0, reference.ncols(), gamma))
}

/// Blended kernel matrix of shape (n_query, n_reference * n_blocks).
///
/// * `reference` - dictionary of reference observations (runs x features)
/// * `query` - observations to compare; `None` compares the reference with itself
/// * `block_counts` - columns per measurement type; empty means one block
/// * `scales` - kernel scale per block; empty means all ones
pub fn kernel_matrix(
    reference: &DMatrix<f64>,
    query: Option<&DMatrix<f64>>,
    kernel: Kernel,
    block_counts: &[usize],
    scales: &[f64],
) -> Result<DMatrix<f64>, RfError> {
    if block_counts.len() != scales.len() {
        return Err(RfError::config(format!(
            "number of scales, {}, doesn't match number of feature types, {}",
            scales.len(),
            block_counts.len()
        )));
    }
    let query = query.unwrap_or(reference);
    if query.ncols() != reference.ncols() {
        return Err(RfError::shape(format!(
            "query has {} features, reference has {}",
            query.ncols(),
            reference.ncols()
        )));
    }

    let n_features = reference.ncols();
    let counts = if block_counts.is_empty() {
        vec![n_features]
    } else {
        block_counts.to_vec()
    };
    let scales = if scales.is_empty() {
        vec![1.0; counts.len()]
    } else {
        scales.to_vec()
    };
    let declared: usize = counts.iter().sum();
    if declared != n_features {
        return Err(RfError::config(format!(
            "block counts sum to {} but the matrix has {} features",
            declared, n_features
        )));
    }

    let n_ref = reference.nrows();
    let mut out = DMatrix::zeros(query.nrows(), n_ref * counts.len());
    let mut start = 0;
    for (b, (&cols, &gamma)) in counts.iter().zip(scales.iter()).enumerate() {
        let block = pairwise_block(query, reference, kernel, start, cols, gamma);
        out.view_mut((0, b * n_ref), (query.nrows(), n_ref)).copy_from(&block);
        start += cols;
    }
    Ok(out)
}

/// Scales every row to unit L2 norm; all-zero rows are left as is.
pub fn normalize_rows(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = matrix.clone();
    for mut row in out.row_iter_mut() {
        let norm = row.norm();
        if norm > 0.0 {
            row /= norm;
        }
    }
    out
}
