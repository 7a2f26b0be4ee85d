//! Measurement matrices and the pairwise-differential column ordering.
//!
//! Engines work on (rx x run) matrices internally and emit (run x column)
//! matrices: either `n_rx` absolute columns or `C(n_rx, 2)` differences
//! ordered (rx1-rx2, rx1-rx3, ..., rx1-rxN, rx2-rx3, ..., rx(N-1)-rxN).

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Kind of physical measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// Propagation delay (ToF / TDOA), nanoseconds
    Delay,

    /// Path loss (RSS / DRSS), dB
    Gain,

    /// Bearing (AoA / DAoA), radians
    Angle,
}

impl MeasurementKind {
    /// Returns the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delay => "delay",
            Self::Gain => "gain",
            Self::Angle => "angle",
        }
    }

    /// Unit of the measurement values.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Delay => "ns",
            Self::Gain => "dB",
            Self::Angle => "rad",
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One engine's output: rows are runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// What was measured
    pub kind: MeasurementKind,

    /// Pairwise differences instead of absolute values
    pub differential: bool,

    /// (run x column) values
    pub values: DMatrix<f64>,
}

impl Measurement {
    /// Arranges (rx x run) values into a measurement.
    pub fn from_receivers(kind: MeasurementKind, per_receiver: &DMatrix<f64>, differential: bool) -> Self {
        Self {
            kind,
            differential,
            values: arrange(per_receiver, differential),
        }
    }

    /// Number of runs (rows).
    pub fn n_runs(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }
}

/// C(n, 2).
pub fn pair_count(n_rx: usize) -> usize {
    n_rx * n_rx.saturating_sub(1) / 2
}

/// Receiver index pairs in lexicographic order.
pub fn receiver_pairs(n_rx: usize) -> Vec<(usize, usize)> {
    (0..n_rx)
        .flat_map(|j| ((j + 1)..n_rx).map(move |k| (j, k)))
        .collect()
}

/// Turns (rx x run) values into (run x column) output.
pub fn arrange(per_receiver: &DMatrix<f64>, differential: bool) -> DMatrix<f64> {
    if !differential {
        return per_receiver.transpose();
    }
    let (n_rx, n_runs) = per_receiver.shape();
    let mut out = DMatrix::zeros(n_runs, pair_count(n_rx));
    for (col, (j, k)) in receiver_pairs(n_rx).into_iter().enumerate() {
        for r in 0..n_runs {
            out[(r, col)] = per_receiver[(j, r)] - per_receiver[(k, r)];
        }
    }
    out
}
