//! RFML Experiment Harness
//!
//! Drives `rfml_core` end to end: build a training dictionary, compose
//! features, fit a kernel-trick regressor on the transmitter positions,
//! predict on a held-out scene and report localization error.
//!
//! # Usage
//!
//! ```ignore
//! use rfml_sim::{ExperimentConfig, ExperimentRunner};
//! use rfml_sim::experiments::ExperimentId;
//!
//! let runner = ExperimentRunner::new(42, ExperimentConfig::default());
//! let result = runner.run(ExperimentId::FingerprintGrid)?;
//! println!("rmse = {:.2} m", result.report.rmse);
//! ```

mod error;
mod exporter;
mod runner;
pub mod experiments;

pub use error::SimError;
pub use exporter::ExperimentExport;
pub use runner::{ExperimentConfig, ExperimentResult, ExperimentRunner};
