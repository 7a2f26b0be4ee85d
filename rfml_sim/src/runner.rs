//! Experiment runner.
//!
//! Each experiment builds a training scene, composes features, fits a
//! kernel-trick ridge regressor on the transmitter positions and scores
//! the predictions on an independent test scene.

use crate::error::SimError;
use crate::experiments::ExperimentId;
use nalgebra::DMatrix;
use rfml_core::{
    ComposeRequest, Kernel, KernelTrickRegressor, LocalizationReport, MeasurementKind, MeasurementSelector, PlacementMode,
    PropagationParams, ReceiverLayout, Regressor, RfChannel, RidgeRegressor, SceneConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Mask separating the test stream from the training stream.
const SEED_MIX: u64 = 0x9e3779b97f4a7c15;

/// (train, test) scene seeds for a master seed; never equal.
fn stream_seeds(seed: u64) -> (u64, u64) {
    (seed, seed ^ SEED_MIX)
}

/// Experiment settings shared by every experiment id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Channel parameters
    pub params: PropagationParams,

    /// Floor extent [width, length] in whole meters
    pub extent: [f64; 2],

    /// Receiver placement
    pub layout: ReceiverLayout,

    /// Engine options and selector; the seed is set per scene
    pub request: ComposeRequest,

    /// Pairwise kernel
    pub kernel: Kernel,

    /// Kernel scale per measurement kind (delay, gain, angle)
    pub kernel_scales: [f64; 3],

    /// Ridge penalty of the base regressor
    pub ridge_alpha: f64,

    /// Training runs for random (non-grid) dictionaries
    pub train_runs: usize,

    /// Test runs
    pub test_runs: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            params: PropagationParams::default(),
            extent: [20.0, 60.0],
            layout: ReceiverLayout::reference(),
            request: ComposeRequest::default(),
            kernel: Kernel::Laplacian,
            kernel_scales: [0.01, 0.05, 0.3],
            ridge_alpha: 1e-3,
            train_runs: 1200,
            test_runs: 200,
        }
    }
}

impl ExperimentConfig {
    /// Replaces the layout with `n_rx` receivers spread along a
    /// rectangle inset half a meter from the walls.
    ///
    /// The inset keeps receivers off the integer grid points.
    pub fn with_receivers(mut self, n_rx: usize) -> Result<Self, SimError> {
        self.layout = perimeter_layout(n_rx, self.extent)?;
        Ok(self)
    }

    /// Sets the test run count.
    pub fn with_test_runs(mut self, runs: usize) -> Self {
        self.test_runs = runs;
        self
    }

    /// Sets the feature selector.
    pub fn with_selector(mut self, selector: MeasurementSelector) -> Self {
        self.request.selector = selector;
        self
    }

    /// Number of receivers in the layout.
    pub fn n_rx(&self) -> usize {
        self.layout.shape().1
    }

    /// Kernel scales for the selected measurement kinds, in block order.
    pub fn selected_scales(&self) -> Vec<f64> {
        self.request
            .selector
            .kinds()
            .iter()
            .map(|kind| match kind {
                MeasurementKind::Delay => self.kernel_scales[0],
                MeasurementKind::Gain => self.kernel_scales[1],
                MeasurementKind::Angle => self.kernel_scales[2],
            })
            .collect()
    }

    fn random_scene(&self, n_runs: usize, seed: u64) -> SceneConfig {
        SceneConfig {
            n_rx: self.n_rx(),
            extent: self.extent.to_vec(),
            n_runs,
            layout: self.layout.clone(),
            placement: PlacementMode::RandomTxFixedLayout,
            grid: false,
            seed: Some(seed),
        }
    }
}

fn perimeter_layout(n_rx: usize, extent: [f64; 2]) -> Result<ReceiverLayout, SimError> {
    let (w, l) = (extent[0] - 1.0, extent[1] - 1.0);
    if n_rx == 0 || w <= 0.0 || l <= 0.0 {
        return Err(rfml_core::RfError::config(format!(
            "cannot place {} receivers inside {:?}",
            n_rx, extent
        ))
        .into());
    }

    let perimeter = 2.0 * (w + l);
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..n_rx)
        .map(|k| {
            let t = perimeter * k as f64 / n_rx as f64;
            let (x, y) = if t < w {
                (t, 0.0)
            } else if t < w + l {
                (w, t - w)
            } else if t < 2.0 * w + l {
                (2.0 * w + l - t, l)
            } else {
                (0.0, perimeter - t)
            };
            (x + 0.5, y + 0.5)
        })
        .unzip();
    Ok(ReceiverLayout::from_coords(&xs, &ys)?)
}

/// Results from running an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Experiment that was run
    pub experiment: ExperimentId,

    /// Seed used
    pub seed: u64,

    /// Training runs
    pub train_runs: usize,

    /// Feature columns per selected measurement kind
    pub block_counts: Vec<usize>,

    /// Accuracy on the test scene
    pub report: LocalizationReport,

    /// RMSE threshold (m)
    pub error_bound: f64,

    /// Whether the RMSE stayed under the threshold
    pub passed: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs localization experiments.
pub struct ExperimentRunner {
    /// Configuration seed
    seed: u64,

    /// Shared settings
    config: ExperimentConfig,
}

impl ExperimentRunner {
    /// Creates a new experiment runner.
    pub fn new(seed: u64, config: ExperimentConfig) -> Self {
        Self { seed, config }
    }

    /// Settings used by this runner.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Runs an experiment and returns the result.
    pub fn run(&self, experiment: ExperimentId) -> Result<ExperimentResult, SimError> {
        info!("Starting experiment: {} (seed={})", experiment.name(), self.seed);

        let config = &self.config;
        let (train_seed, test_seed) = stream_seeds(self.seed);

        let mut request = config.request;
        if experiment.is_ideal() {
            request = request.ideal();
        }

        let train_scene = if experiment.uses_grid() {
            SceneConfig::grid_dictionary(config.extent, config.layout.clone())
        } else {
            config.random_scene(config.train_runs, train_seed)
        };

        let mut channel = RfChannel::new(config.params)?;

        // Training dictionary
        channel.generate_scene(train_scene)?;
        let train_features = channel
            .compose(ComposeRequest {
                seed: Some(train_seed.wrapping_add(1)),
                ..request
            })?
            .clone();
        let train_targets = scene_targets(&channel)?;

        let regressor = KernelTrickRegressor::for_features(
            RidgeRegressor::new(config.ridge_alpha),
            config.kernel,
            &train_features,
            config.selected_scales(),
        );
        let model = regressor.fit(&train_features.matrix, &train_targets)?;
        debug!(
            "Fitted {} kernel on {} runs x {} features",
            config.kernel,
            train_features.n_runs(),
            train_features.n_features()
        );

        // Held-out scene
        channel.generate_scene(config.random_scene(config.test_runs, test_seed))?;
        let test_features = channel
            .compose(ComposeRequest {
                seed: Some(test_seed.wrapping_add(1)),
                ..request
            })?
            .clone();
        let test_targets = scene_targets(&channel)?;

        let estimates = regressor.predict(&model, &test_features.matrix)?;
        let report = LocalizationReport::from_estimates(&estimates, &test_targets)?;

        let diagonal = config.extent[0].hypot(config.extent[1]);
        let error_bound = experiment.error_bound_fraction() * diagonal;
        let passed = report.rmse < error_bound;

        info!(
            "{}: rmse={:.2}m median={:.2}m max={:.2}m over {} runs",
            experiment.name(),
            report.rmse,
            report.median_error,
            report.max_error,
            report.runs
        );

        Ok(ExperimentResult {
            experiment,
            seed: self.seed,
            train_runs: train_features.n_runs(),
            block_counts: train_features.block_counts(),
            failure_reason: if !passed {
                Some(format!(
                    "RMSE {:.2}m exceeds threshold {:.2}m",
                    report.rmse, error_bound
                ))
            } else {
                None
            },
            report,
            error_bound,
            passed,
        })
    }
}

fn scene_targets(channel: &RfChannel) -> Result<DMatrix<f64>, SimError> {
    let scene = channel.scene().ok_or(rfml_core::RfError::NoScene)?;
    Ok(scene.transmitter_positions())
}
