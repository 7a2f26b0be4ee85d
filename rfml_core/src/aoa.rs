//! Angle-of-Arrival Engine - AoA / DAoA bearings from receiver to transmitter.
//!
//! Clusters arrive uniformly in direction and each cluster spreads around
//! its mean bearing with a Laplacian profile. The strongest (specular)
//! component is assumed to sit on the line of sight, so the perturbed
//! bearing is the exact bearing plus a Laplacian error.

use crate::error::RfError;
use crate::measurement::{Measurement, MeasurementKind};
use crate::params::PropagationParams;
use crate::rng::call_rng;
use crate::scene::Scene;
use rand::Rng;
use rand_distr::{Distribution, Exp1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// AoA engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AoaOptions {
    /// Add Laplacian angular-spread noise
    pub perturbed: bool,

    /// Emit pairwise differences (DAoA) instead of absolute AoA
    pub differential: bool,
}

impl Default for AoaOptions {
    fn default() -> Self {
        Self {
            perturbed: true,
            differential: false,
        }
    }
}

/// Zero-mean Laplace distribution with scale `b`.
///
/// Sampled as `b` times a unit exponential with a fair random sign; a
/// scale of zero always yields zero.
#[derive(Debug, Clone, Copy)]
pub struct Laplace {
    scale: f64,
}

impl Laplace {
    /// Creates a Laplace distribution; `scale` must be finite and non-negative.
    pub fn new(scale: f64) -> Result<Self, RfError> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(RfError::Distribution(format!(
                "Laplace scale must be non-negative, got {}",
                scale
            )));
        }
        Ok(Self { scale })
    }
}

impl Distribution<f64> for Laplace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let unit: f64 = Exp1.sample(rng);
        let magnitude = self.scale * unit;
        if rng.gen::<bool>() {
            magnitude
        } else {
            -magnitude
        }
    }
}

/// Computes bearings for every (receiver, run) of `scene`.
pub fn compute(
    scene: &Scene,
    params: &PropagationParams,
    options: AoaOptions,
    seed: Option<u64>,
) -> Result<Measurement, RfError> {
    params.validate_aoa(options.perturbed)?;

    let [dx, dy] = scene.tx_offsets();
    let mut bearings = dy.zip_map(&dx, f64::atan2);

    if options.perturbed {
        let spread = Laplace::new(params.aoa_sigma)?;
        let mut rng = call_rng(seed);
        for r in 0..bearings.ncols() {
            for i in 0..bearings.nrows() {
                bearings[(i, r)] += spread.sample(&mut rng);
            }
        }
    }

    let measurement = Measurement::from_receivers(MeasurementKind::Angle, &bearings, options.differential);
    debug!(
        "AoA engine: perturbed={} differential={} seed={:?} -> {:?}",
        options.perturbed,
        options.differential,
        seed,
        measurement.values.shape()
    );
    Ok(measurement)
}
