//! Feature Composer - concatenates selected measurement types per run.
//!
//! Columns are always laid out delay, gain, angle (restricted to the
//! selection). The per-type column counts travel with the matrix so the
//! kernel mapper can slice it back into homogeneous blocks.

use crate::aoa::{self, AoaOptions};
use crate::delay::{self, DelayOptions};
use crate::error::RfError;
use crate::gain::{self, GainOptions};
use crate::measurement::{Measurement, MeasurementKind};
use crate::params::PropagationParams;
use crate::scene::Scene;
use nalgebra::{DMatrix, DMatrixView};
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// SELECTOR
// =============================================================================

/// Which measurement types make up the feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementSelector {
    /// 0: TDOA / ToF only
    Delay,
    /// 1: RSS / DRSS only
    Gain,
    /// 2: AoA / DAoA only
    Angle,
    /// 3: delay + gain
    DelayGain,
    /// 4: delay + angle
    DelayAngle,
    /// 5: gain + angle
    GainAngle,
    /// 6: all three
    All,
}

impl MeasurementSelector {
    /// Parses the integer selector 0-6.
    pub fn from_index(index: u8) -> Result<Self, RfError> {
        match index {
            0 => Ok(Self::Delay),
            1 => Ok(Self::Gain),
            2 => Ok(Self::Angle),
            3 => Ok(Self::DelayGain),
            4 => Ok(Self::DelayAngle),
            5 => Ok(Self::GainAngle),
            6 => Ok(Self::All),
            other => Err(RfError::config(format!(
                "measurement selector {} not recognized, expected 0-6",
                other
            ))),
        }
    }

    /// Integer selector value.
    pub fn index(&self) -> u8 {
        match self {
            Self::Delay => 0,
            Self::Gain => 1,
            Self::Angle => 2,
            Self::DelayGain => 3,
            Self::DelayAngle => 4,
            Self::GainAngle => 5,
            Self::All => 6,
        }
    }

    /// Selected kinds in column order.
    pub fn kinds(&self) -> &'static [MeasurementKind] {
        use MeasurementKind::*;
        match self {
            Self::Delay => &[Delay],
            Self::Gain => &[Gain],
            Self::Angle => &[Angle],
            Self::DelayGain => &[Delay, Gain],
            Self::DelayAngle => &[Delay, Angle],
            Self::GainAngle => &[Gain, Angle],
            Self::All => &[Delay, Gain, Angle],
        }
    }

    /// Returns the selector name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delay => "tdoa",
            Self::Gain => "drss",
            Self::Angle => "aoa",
            Self::DelayGain => "tdoa_drss",
            Self::DelayAngle => "tdoa_aoa",
            Self::GainAngle => "drss_aoa",
            Self::All => "all",
        }
    }
}

impl Default for MeasurementSelector {
    fn default() -> Self {
        Self::All
    }
}

impl std::fmt::Display for MeasurementSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for MeasurementSelector {
    type Err = RfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        if let Ok(index) = s.parse::<u8>() {
            return Self::from_index(index);
        }
        match s.as_str() {
            "tdoa" | "delay" => Ok(Self::Delay),
            "drss" | "rss" | "gain" => Ok(Self::Gain),
            "aoa" | "angle" => Ok(Self::Angle),
            "tdoa_drss" => Ok(Self::DelayGain),
            "tdoa_aoa" => Ok(Self::DelayAngle),
            "drss_aoa" => Ok(Self::GainAngle),
            "all" | "tdoa_drss_aoa" => Ok(Self::All),
            _ => Err(RfError::config(format!("Unknown measurement selector: {}", s))),
        }
    }
}

// =============================================================================
// REQUEST / RESULT
// =============================================================================

/// Everything the composer needs besides the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub delay: DelayOptions,
    pub gain: GainOptions,
    pub aoa: AoaOptions,
    pub selector: MeasurementSelector,
    /// Shared by all three engines
    pub seed: Option<u64>,
}

impl Default for ComposeRequest {
    fn default() -> Self {
        Self {
            delay: DelayOptions::default(),
            gain: GainOptions::default(),
            aoa: AoaOptions::default(),
            selector: MeasurementSelector::All,
            seed: None,
        }
    }
}

impl ComposeRequest {
    /// Builds a request from the flat flag form.
    ///
    /// `perturb` and `differential` are ordered (delay, gain, angle);
    /// `selector` is the integer selector 0-6.
    pub fn from_flags(
        perturb: [bool; 3],
        differential: [bool; 3],
        selector: u8,
        seed: Option<u64>,
    ) -> Result<Self, RfError> {
        Ok(Self {
            delay: DelayOptions {
                multipath: perturb[0],
                differential: differential[0],
            },
            gain: GainOptions {
                shadowing: perturb[1],
                differential: differential[1],
            },
            aoa: AoaOptions {
                perturbed: perturb[2],
                differential: differential[2],
            },
            selector: MeasurementSelector::from_index(selector)?,
            seed,
        })
    }

    /// Same request with every perturbation disabled.
    pub fn ideal(mut self) -> Self {
        self.delay.multipath = false;
        self.gain.shadowing = false;
        self.aoa.perturbed = false;
        self
    }
}

/// Column count of one homogeneous block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureBlock {
    pub kind: MeasurementKind,
    pub columns: usize,
}

/// Composed (run x feature) matrix plus its block layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub selector: MeasurementSelector,
    pub matrix: DMatrix<f64>,
    pub blocks: Vec<FeatureBlock>,
}

impl FeatureSet {
    /// Per-block column counts in column order.
    pub fn block_counts(&self) -> Vec<usize> {
        self.blocks.iter().map(|b| b.columns).collect()
    }

    /// Total number of feature columns.
    pub fn n_features(&self) -> usize {
        self.matrix.ncols()
    }

    /// Number of runs (rows).
    pub fn n_runs(&self) -> usize {
        self.matrix.nrows()
    }

    /// View of the columns belonging to `kind`, if selected.
    pub fn block(&self, kind: MeasurementKind) -> Option<DMatrixView<'_, f64>> {
        let mut offset = 0;
        for block in &self.blocks {
            if block.kind == kind {
                return Some(self.matrix.columns(offset, block.columns));
            }
            offset += block.columns;
        }
        None
    }
}

/// Output of one composer call: the three engine results and the
/// composed feature set.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub delay: Measurement,
    pub gain: Measurement,
    pub angle: Measurement,
    pub features: FeatureSet,
}

impl Composition {
    /// Engine result for `kind`.
    pub fn measurement(&self, kind: MeasurementKind) -> &Measurement {
        match kind {
            MeasurementKind::Delay => &self.delay,
            MeasurementKind::Gain => &self.gain,
            MeasurementKind::Angle => &self.angle,
        }
    }
}

/// Concatenates measurements column-wise; all must share the run count.
pub fn concatenate(selector: MeasurementSelector, parts: &[&Measurement]) -> Result<FeatureSet, RfError> {
    let n_runs = parts.first().map(|m| m.n_runs()).unwrap_or(0);
    if let Some(bad) = parts.iter().find(|m| m.n_runs() != n_runs) {
        return Err(RfError::shape(format!(
            "{} measurement has {} runs, expected {}",
            bad.kind,
            bad.n_runs(),
            n_runs
        )));
    }

    let total: usize = parts.iter().map(|m| m.n_columns()).sum();
    let mut matrix = DMatrix::zeros(n_runs, total);
    let mut blocks = Vec::with_capacity(parts.len());
    let mut offset = 0;
    for part in parts {
        matrix
            .view_mut((0, offset), (n_runs, part.n_columns()))
            .copy_from(&part.values);
        blocks.push(FeatureBlock {
            kind: part.kind,
            columns: part.n_columns(),
        });
        offset += part.n_columns();
    }

    Ok(FeatureSet {
        selector,
        matrix,
        blocks,
    })
}

/// Runs the three engines against `scene` with a shared seed and
/// composes the selected measurements.
pub fn compose(
    scene: &Scene,
    params: &PropagationParams,
    request: &ComposeRequest,
) -> Result<Composition, RfError> {
    let delay = delay::compute(scene, params, request.delay, request.seed)?;
    let gain = gain::compute(scene, params, request.gain, request.seed)?;
    let angle = aoa::compute(scene, params, request.aoa, request.seed)?;

    let parts: Vec<&Measurement> = request
        .selector
        .kinds()
        .iter()
        .map(|kind| match kind {
            MeasurementKind::Delay => &delay,
            MeasurementKind::Gain => &gain,
            MeasurementKind::Angle => &angle,
        })
        .collect();
    let features = concatenate(request.selector, &parts)?;

    debug!(
        "Composed {} features: {:?} over {} runs",
        request.selector,
        features.block_counts(),
        features.n_runs()
    );

    Ok(Composition {
        delay,
        gain,
        angle,
        features,
    })
}
