//! Propagation parameter set shared by the three measurement engines.
//!
//! Defaults describe an average office building:
//! - Time domain: Saleh-Valenzuela cluster/ray arrival model
//! - Power domain: log-distance path loss with log-normal shadowing
//! - Bearing domain: Laplacian angular spread around the line of sight

use crate::error::RfError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Meters to nanoseconds (propagation at 0.3 m/ns).
pub const NS_PER_METER: f64 = 10.0 / 3.0;

/// Statistical channel parameters.
///
/// Immutable for the lifetime of an [`RfChannel`](crate::RfChannel) unless
/// replaced through `set_params`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationParams {
    /// Max delay spread to check (ns)
    pub max_delay_spread: f64,

    /// Cluster arrival constant, 1/Lambda (ns)
    pub cluster_arrival: f64,

    /// Ray arrival constant, 1/lambda (ns)
    pub ray_arrival: f64,

    /// Cluster amplitude decay constant, Gamma (ns)
    pub cluster_decay: f64,

    /// Ray amplitude decay constant, gamma (ns)
    pub ray_decay: f64,

    /// Path loss exponent (2 is free space)
    pub path_loss_exponent: f64,

    /// Shadowing standard deviation (dB)
    pub shadowing_sigma: f64,

    /// Carrier wavelength (m)
    pub wavelength: f64,

    /// Angular spread of the Laplacian bearing noise (rad)
    pub aoa_sigma: f64,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            max_delay_spread: 100.0,
            cluster_arrival: 50.0,
            ray_arrival: 10.0,
            cluster_decay: 50.0,
            ray_decay: 29.0,
            path_loss_exponent: 3.0,
            shadowing_sigma: 7.0,
            wavelength: 3.0e8 / 205.267e6,
            aoa_sigma: 26.0 * PI / 180.0,
        }
    }
}

impl PropagationParams {
    /// Checks every parameter: all finite, noise spreads non-negative,
    /// everything else strictly positive.
    pub fn validate(&self) -> Result<(), RfError> {
        self.validate_delay(true)?;
        self.validate_gain(true)?;
        self.validate_aoa(true)
    }

    /// Checks the parameters the delay engine reads.
    ///
    /// The ideal delay is pure geometry and reads none of them.
    pub fn validate_delay(&self, multipath: bool) -> Result<(), RfError> {
        if !multipath {
            return Ok(());
        }
        require_positive("max_delay_spread", self.max_delay_spread)?;
        require_positive("cluster_arrival", self.cluster_arrival)?;
        require_positive("ray_arrival", self.ray_arrival)?;
        require_positive("cluster_decay", self.cluster_decay)?;
        require_positive("ray_decay", self.ray_decay)
    }

    /// Checks the parameters the gain engine reads.
    pub fn validate_gain(&self, shadowing: bool) -> Result<(), RfError> {
        require_positive("wavelength", self.wavelength)?;
        if shadowing {
            require_positive("path_loss_exponent", self.path_loss_exponent)?;
            require_non_negative("shadowing_sigma", self.shadowing_sigma)?;
        }
        Ok(())
    }

    /// Checks the parameters the AoA engine reads.
    pub fn validate_aoa(&self, perturbed: bool) -> Result<(), RfError> {
        if perturbed {
            require_non_negative("aoa_sigma", self.aoa_sigma)?;
        }
        Ok(())
    }

    /// Number of multipath clusters, never less than one.
    pub fn cluster_count(&self) -> usize {
        ((self.max_delay_spread / self.cluster_arrival).floor() as usize).max(1)
    }

    /// Number of rays per cluster, never less than one.
    pub fn rays_per_cluster(&self) -> usize {
        ((2.0 * self.cluster_arrival / self.ray_arrival).floor() as usize).max(1)
    }

    /// Path loss at the unit reference distance (dB).
    pub fn reference_loss_db(&self) -> f64 {
        -10.0 * (self.wavelength * self.wavelength / (16.0 * PI * PI)).log10()
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), RfError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RfError::config(format!(
            "propagation parameter {} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<(), RfError> {
    if !value.is_finite() || value < 0.0 {
        return Err(RfError::config(format!(
            "propagation parameter {} must be non-negative and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_counts() {
        let params = PropagationParams::default();
        assert_eq!(params.cluster_count(), 2);
        assert_eq!(params.rays_per_cluster(), 10);
    }

    #[test]
    fn test_cluster_count_clamped_to_one() {
        let params = PropagationParams {
            max_delay_spread: 10.0,
            cluster_arrival: 50.0,
            ..Default::default()
        };
        assert_eq!(params.cluster_count(), 1);
    }

    #[test]
    fn test_reference_loss() {
        let params = PropagationParams::default();
        let expected = -10.0 * (params.wavelength.powi(2) / (16.0 * PI * PI)).log10();
        assert_relative_eq!(params.reference_loss_db(), expected);
        // ~205 MHz carrier
        assert!(params.reference_loss_db() > 18.0 && params.reference_loss_db() < 19.5);
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        assert!(PropagationParams::default().validate().is_ok());

        let bad = PropagationParams {
            ray_arrival: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().unwrap_err().is_config());

        let nan = PropagationParams {
            wavelength: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_zero_noise_spreads_accepted() {
        let quiet = PropagationParams {
            shadowing_sigma: 0.0,
            aoa_sigma: 0.0,
            ..Default::default()
        };
        assert!(quiet.validate().is_ok());

        let negative = PropagationParams {
            shadowing_sigma: -0.5,
            ..Default::default()
        };
        assert!(negative.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_engine_checks_are_independent() {
        let params = PropagationParams {
            aoa_sigma: f64::NAN,
            cluster_decay: -1.0,
            ..Default::default()
        };
        assert!(params.validate_gain(true).is_ok());
        assert!(params.validate_delay(false).is_ok());
        assert!(params.validate_delay(true).is_err());
        assert!(params.validate_aoa(false).is_ok());
        assert!(params.validate_aoa(true).is_err());
    }
}
