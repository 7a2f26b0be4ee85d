//! Shadowing Gain Engine - RSS / DRSS from a log-distance path loss model.
//!
//! ```text
//! PL(d) = PL(d0) + 10 * n * log10(d) + X_sigma,   X_sigma ~ N(0, sigma^2)
//! PL(d0) = -10 * log10(lambda^2 / (16 * pi^2))
//! ```
//!
//! The ideal variant is free space (`n = 2`, no shadowing). Distance zero
//! is outside the model: transmitter and receivers must never coincide.

use crate::error::RfError;
use crate::measurement::{Measurement, MeasurementKind};
use crate::params::PropagationParams;
use crate::rng::call_rng;
use crate::scene::Scene;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Free-space path loss exponent.
pub const FREE_SPACE_EXPONENT: f64 = 2.0;

/// Gain engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainOptions {
    /// Use the configured exponent plus log-normal shadowing
    pub shadowing: bool,

    /// Emit pairwise differences (DRSS) instead of absolute RSS
    pub differential: bool,
}

impl Default for GainOptions {
    fn default() -> Self {
        Self {
            shadowing: true,
            differential: false,
        }
    }
}

/// Free-space path loss at `distance` meters (dB).
pub fn free_space_loss(distance: f64, params: &PropagationParams) -> f64 {
    params.reference_loss_db() + 10.0 * FREE_SPACE_EXPONENT * distance.log10()
}

/// Computes path loss for every (receiver, run) of `scene`.
pub fn compute(
    scene: &Scene,
    params: &PropagationParams,
    options: GainOptions,
    seed: Option<u64>,
) -> Result<Measurement, RfError> {
    params.validate_gain(options.shadowing)?;

    let reference = params.reference_loss_db();
    let distances = scene.distances();

    let losses = if options.shadowing {
        let shadowing = Normal::new(0.0, params.shadowing_sigma).map_err(RfError::distribution)?;
        let mut rng = call_rng(seed);
        let mut losses = distances.map(|d| reference + 10.0 * params.path_loss_exponent * d.log10());
        // Runs are drawn in order: extending n_runs leaves earlier runs unchanged
        for r in 0..losses.ncols() {
            for i in 0..losses.nrows() {
                losses[(i, r)] += shadowing.sample(&mut rng);
            }
        }
        losses
    } else {
        distances.map(|d| free_space_loss(d, params))
    };

    let measurement = Measurement::from_receivers(MeasurementKind::Gain, &losses, options.differential);
    debug!(
        "Gain engine: shadowing={} differential={} seed={:?} -> {:?}",
        options.shadowing,
        options.differential,
        seed,
        measurement.values.shape()
    );
    Ok(measurement)
}
