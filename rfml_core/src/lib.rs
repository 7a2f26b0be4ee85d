//! RFML Core - statistical RF channel simulation for learned localization.
//!
//! The crate turns transmitter/receiver geometries into the three
//! measurement families used for RF localization:
//! 1. **Delay**: TOA/TDOA with Saleh-Valenzuela multipath
//! 2. **Gain**: RSS/DRSS with log-distance path loss and log-normal shadowing
//! 3. **Angle**: AoA/DAoA with Laplacian angular spread
//!
//! and composes them into feature matrices for kernel-trick regression.
//!
//! # Pipeline
//!
//! ```text
//! SceneConfig ──► Scene ──┬──► delay::compute ──┐
//!                         ├──► gain::compute  ──┼──► FeatureSet ──► KernelTrickRegressor
//!                         └──► aoa::compute   ──┘                         │
//!                                                                         ▼
//!                                                              LocalizationReport
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use rfml_core::{ComposeRequest, RfChannel, SceneConfig};
//!
//! let mut channel = RfChannel::default();
//! channel.generate_scene(SceneConfig::default().with_seed(7))?;
//! let features = channel.compose(ComposeRequest::default())?;
//! ```

pub mod error;
pub mod params;
pub mod scene;
pub mod measurement;
pub mod delay;
pub mod gain;
pub mod aoa;
pub mod composer;
pub mod channel;
pub mod kernel;
pub mod regressor;
pub mod metrics;
mod rng;

// Re-export key types for convenience
pub use error::RfError;
pub use params::{PropagationParams, NS_PER_METER};
pub use scene::{PlacementMode, ReceiverLayout, Scene, SceneConfig};
pub use measurement::{Measurement, MeasurementKind};
pub use delay::DelayOptions;
pub use gain::GainOptions;
pub use aoa::AoaOptions;
pub use composer::{ComposeRequest, FeatureSet, MeasurementSelector};
pub use channel::RfChannel;
pub use kernel::Kernel;
pub use regressor::{ElasticNetRegressor, KernelTrickRegressor, LinearModel, Regressor, RidgeRegressor};
pub use metrics::LocalizationReport;
