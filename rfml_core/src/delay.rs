//! Multipath Delay Engine - ToF / TDOA with a Saleh-Valenzuela channel.
//!
//! The ideal delay is the line-of-sight distance converted to
//! nanoseconds. With multipath enabled, every (receiver, run) draws a
//! two-level Poisson arrival process:
//!
//! ```text
//! T_l   ~ Gamma(shape = l, scale = 1/Lambda)        cluster l
//! tau_k ~ Gamma(shape = k, scale = 1/lambda)        ray k
//! beta  ~ Rayleigh(exp(-T_l/Gamma) * exp(-tau_k/gamma) / 2)
//! ```
//!
//! and the offset added to the ideal delay is `T_l + tau_k` of the
//! strongest path.

use crate::error::RfError;
use crate::measurement::{Measurement, MeasurementKind};
use crate::params::{PropagationParams, NS_PER_METER};
use crate::rng::call_rng;
use crate::scene::Scene;
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, Gamma, Weibull};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use tracing::debug;

/// Delay engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayOptions {
    /// Add the strongest-path multipath offset
    pub multipath: bool,

    /// Emit pairwise TDOA instead of absolute ToF
    pub differential: bool,
}

impl Default for DelayOptions {
    fn default() -> Self {
        Self {
            multipath: true,
            differential: true,
        }
    }
}

/// Arrival-time draw; a shape of zero is a point mass at zero.
enum Arrival {
    Immediate,
    Gamma(Gamma<f64>),
}

impl Arrival {
    fn new(index: usize, scale: f64) -> Result<Self, RfError> {
        if index == 0 {
            return Ok(Self::Immediate);
        }
        Gamma::new(index as f64, scale)
            .map(Self::Gamma)
            .map_err(RfError::distribution)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Immediate => 0.0,
            Self::Gamma(gamma) => gamma.sample(rng),
        }
    }
}

/// Line-of-sight delays (rx x run), nanoseconds.
pub fn ideal_delays(scene: &Scene) -> DMatrix<f64> {
    scene.distances().map(|d| d * NS_PER_METER)
}

/// Strongest-path offsets (rx x run), nanoseconds.
pub fn multipath_offsets<R: Rng + ?Sized>(
    n_rx: usize,
    n_runs: usize,
    params: &PropagationParams,
    rng: &mut R,
) -> Result<DMatrix<f64>, RfError> {
    let clusters = (0..params.cluster_count())
        .map(|l| Arrival::new(l, params.cluster_arrival))
        .collect::<Result<Vec<_>, _>>()?;
    let rays = (0..params.rays_per_cluster())
        .map(|k| Arrival::new(k, params.ray_arrival))
        .collect::<Result<Vec<_>, _>>()?;

    // Rayleigh(sigma) is sigma times a unit Rayleigh, i.e. Weibull(sqrt(2), 2)
    let unit_rayleigh = Weibull::new(SQRT_2, 2.0).map_err(RfError::distribution)?;

    let mut offsets = DMatrix::zeros(n_rx, n_runs);
    for r in 0..n_runs {
        for i in 0..n_rx {
            let mut best_gain = f64::NEG_INFINITY;
            let mut best_offset = 0.0;

            for cluster in &clusters {
                let cluster_time = cluster.sample(rng);
                let cluster_decay = (-cluster_time / params.cluster_decay).exp();

                for ray in &rays {
                    let ray_time = ray.sample(rng);
                    let sigma = cluster_decay * (-ray_time / params.ray_decay).exp() / 2.0;
                    let gain = sigma * unit_rayleigh.sample(rng);

                    // First maximum wins ties
                    if gain > best_gain {
                        best_gain = gain;
                        best_offset = cluster_time + ray_time;
                    }
                }
            }

            offsets[(i, r)] = best_offset;
        }
    }

    Ok(offsets)
}

/// Computes delays for every (receiver, run) of `scene`.
pub fn compute(
    scene: &Scene,
    params: &PropagationParams,
    options: DelayOptions,
    seed: Option<u64>,
) -> Result<Measurement, RfError> {
    params.validate_delay(options.multipath)?;

    let mut delays = ideal_delays(scene);
    if options.multipath {
        let mut rng = call_rng(seed);
        delays += multipath_offsets(scene.n_rx(), scene.n_runs(), params, &mut rng)?;
    }

    let measurement = Measurement::from_receivers(MeasurementKind::Delay, &delays, options.differential);
    debug!(
        "Delay engine: multipath={} differential={} seed={:?} -> {:?}",
        options.multipath,
        options.differential,
        seed,
        measurement.values.shape()
    );
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{generate, ReceiverLayout, SceneConfig};
    use approx::assert_relative_eq;

    fn layout_scene(n_runs: usize, seed: u64) -> Scene {
        generate(&SceneConfig::default().with_runs(n_runs).with_seed(seed)).unwrap()
    }

    #[test]
    fn test_reference_tdoa_scenario() {
        let scene = layout_scene(1000, 11);
        let options = DelayOptions {
            multipath: false,
            differential: true,
        };
        let m = compute(&scene, &PropagationParams::default(), options, None).unwrap();
        assert_eq!(m.values.shape(), (1000, 15));

        for r in 0..1000 {
            let tx = scene.transmitter(r);
            let d1 = (tx - scene.receiver(0, r)).norm();
            let d2 = (tx - scene.receiver(1, r)).norm();
            assert_relative_eq!(m.values[(r, 0)], (d1 - d2) * 10.0 / 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_ideal_absolute_delay() {
        let scene = layout_scene(25, 5);
        let options = DelayOptions {
            multipath: false,
            differential: false,
        };
        let m = compute(&scene, &PropagationParams::default(), options, Some(1)).unwrap();
        assert_eq!(m.values.shape(), (25, 6));
        let distances = scene.distances();
        for r in 0..25 {
            for i in 0..6 {
                assert_eq!(m.values[(r, i)], distances[(i, r)] * NS_PER_METER);
            }
        }
    }

    #[test]
    fn test_ideal_ignores_seed() {
        let scene = layout_scene(10, 5);
        let options = DelayOptions {
            multipath: false,
            differential: true,
        };
        let params = PropagationParams::default();
        let a = compute(&scene, &params, options, Some(1)).unwrap();
        let b = compute(&scene, &params, options, Some(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_multipath_reproducible() {
        let scene = layout_scene(40, 8);
        let params = PropagationParams::default();
        let a = compute(&scene, &params, DelayOptions::default(), Some(77)).unwrap();
        let b = compute(&scene, &params, DelayOptions::default(), Some(77)).unwrap();
        assert_eq!(a, b);

        let c = compute(&scene, &params, DelayOptions::default(), Some(78)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_multipath_offsets_non_negative() {
        let params = PropagationParams::default();
        let mut rng = call_rng(Some(3));
        let offsets = multipath_offsets(6, 200, &params, &mut rng).unwrap();
        assert_eq!(offsets.shape(), (6, 200));
        assert!(offsets.iter().all(|o| *o >= 0.0 && o.is_finite()));
        // With 2 clusters and 10 rays some strongest paths arrive late
        assert!(offsets.iter().any(|o| *o > 0.0));
    }

    #[test]
    fn test_single_path_has_zero_offset() {
        // One cluster with one ray: both arrivals have shape 0
        let params = PropagationParams {
            max_delay_spread: 10.0,
            cluster_arrival: 50.0,
            ray_arrival: 200.0,
            ..Default::default()
        };
        assert_eq!(params.cluster_count(), 1);
        assert_eq!(params.rays_per_cluster(), 1);

        let mut rng = call_rng(Some(3));
        let offsets = multipath_offsets(3, 10, &params, &mut rng).unwrap();
        assert!(offsets.iter().all(|o| *o == 0.0));
    }

    #[test]
    fn test_multipath_delays_exceed_ideal() {
        let x = DMatrix::from_row_slice(3, 1, &[0.0, 3.0, 0.0]);
        let y = DMatrix::from_row_slice(3, 1, &[0.0, 4.0, 12.0]);
        let scene = Scene::from_axes(x, y).unwrap();
        let options = DelayOptions {
            multipath: true,
            differential: false,
        };
        let m = compute(&scene, &PropagationParams::default(), options, Some(4)).unwrap();
        assert!(m.values[(0, 0)] >= 5.0 * NS_PER_METER);
        assert!(m.values[(0, 1)] >= 12.0 * NS_PER_METER);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let scene = generate(&SceneConfig {
            n_rx: 2,
            n_runs: 3,
            layout: ReceiverLayout::from_coords(&[1.0, 2.0], &[1.0, 2.0]).unwrap(),
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        let params = PropagationParams {
            cluster_decay: -1.0,
            ..Default::default()
        };
        assert!(compute(&scene, &params, DelayOptions::default(), Some(1)).is_err());

        // The ideal delay never reads the multipath constants
        let ideal = DelayOptions {
            multipath: false,
            differential: true,
        };
        let m = compute(&scene, &params, ideal, Some(1)).unwrap();
        assert_eq!(m.values.shape(), (3, 1));
    }
}
