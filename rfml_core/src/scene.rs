//! Scene Generator - transmitter/receiver placements across many runs.
//!
//! A scene is a (dimension, entity, run) tensor of 2-D Cartesian
//! coordinates in meters. Entity 0 is the transmitter, entities
//! `1..=n_rx` are receivers.

use crate::error::RfError;
use crate::rng::call_rng;
use nalgebra::{DMatrix, Vector2};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Only planar scenes are supported.
pub const SPATIAL_DIMS: usize = 2;

/// Unchecked serialized form of a per-axis coordinate tensor.
#[derive(Deserialize)]
struct RawAxes {
    axes: [DMatrix<f64>; SPATIAL_DIMS],
}

// =============================================================================
// PLACEMENT MODE
// =============================================================================

/// Which entities are re-randomized on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementMode {
    /// 0: run-0 transmitter broadcast to every run, receivers random
    FixedTxRandomRx,

    /// 1: random transmitter, run-0 receivers broadcast to every run
    RandomTxFixedRx,

    /// 2: everything random
    RandomTxRandomRx,

    /// 3: random transmitter, receivers from the supplied layout
    RandomTxFixedLayout,
}

impl PlacementMode {
    /// Parses the integer selector 0-3.
    pub fn from_index(index: u8) -> Result<Self, RfError> {
        match index {
            0 => Ok(Self::FixedTxRandomRx),
            1 => Ok(Self::RandomTxFixedRx),
            2 => Ok(Self::RandomTxRandomRx),
            3 => Ok(Self::RandomTxFixedLayout),
            other => Err(RfError::config(format!(
                "placement mode {} not recognized, expected 0-3",
                other
            ))),
        }
    }

    /// Integer selector for this mode.
    pub fn index(&self) -> u8 {
        match self {
            Self::FixedTxRandomRx => 0,
            Self::RandomTxFixedRx => 1,
            Self::RandomTxRandomRx => 2,
            Self::RandomTxFixedLayout => 3,
        }
    }

    /// Returns the mode name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FixedTxRandomRx => "fixed_tx_random_rx",
            Self::RandomTxFixedRx => "random_tx_fixed_rx",
            Self::RandomTxRandomRx => "random_tx_random_rx",
            Self::RandomTxFixedLayout => "random_tx_fixed_layout",
        }
    }
}

impl std::fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PlacementMode {
    type Err = RfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "fixed_tx_random_rx" | "fixed_tx" => Ok(Self::FixedTxRandomRx),
            "1" | "random_tx_fixed_rx" | "fixed_rx" => Ok(Self::RandomTxFixedRx),
            "2" | "random_tx_random_rx" | "random" => Ok(Self::RandomTxRandomRx),
            "3" | "random_tx_fixed_layout" | "layout" => Ok(Self::RandomTxFixedLayout),
            _ => Err(RfError::config(format!("Unknown placement mode: {}", s))),
        }
    }
}

// =============================================================================
// RECEIVER LAYOUT
// =============================================================================

/// Fixed receiver coordinates, shaped (2, rx, runs).
///
/// The receiver and run axes may each have length 1, in which case they
/// broadcast against the scene's receiver count and run count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxes")]
pub struct ReceiverLayout {
    /// One (rx x runs) matrix per spatial axis
    axes: [DMatrix<f64>; SPATIAL_DIMS],
}

impl ReceiverLayout {
    /// Builds a single-run layout from per-receiver x and y coordinates.
    pub fn from_coords(xs: &[f64], ys: &[f64]) -> Result<Self, RfError> {
        if xs.len() != ys.len() {
            return Err(RfError::shape(format!(
                "layout has {} x coordinates but {} y coordinates",
                xs.len(),
                ys.len()
            )));
        }
        Ok(Self {
            axes: [
                DMatrix::from_column_slice(xs.len(), 1, xs),
                DMatrix::from_column_slice(ys.len(), 1, ys),
            ],
        })
    }

    /// Builds a layout from full (rx x runs) coordinate matrices.
    pub fn from_axes(x: DMatrix<f64>, y: DMatrix<f64>) -> Result<Self, RfError> {
        if x.shape() != y.shape() {
            return Err(RfError::shape(format!(
                "layout axes disagree: x is {:?}, y is {:?}",
                x.shape(),
                y.shape()
            )));
        }
        Ok(Self { axes: [x, y] })
    }

    /// Six receivers along the two long walls of a 20 m x 60 m floor.
    pub fn reference() -> Self {
        Self {
            axes: [
                DMatrix::from_column_slice(6, 1, &[6.3, 14.1, 7.2, 14.5, 7.5, 13.5]),
                DMatrix::from_column_slice(6, 1, &[15.3, 15.1, 30.1, 30.5, 44.9, 44.5]),
            ],
        }
    }

    /// Layout shape as (dims, rx, runs).
    pub fn shape(&self) -> (usize, usize, usize) {
        let (rx, runs) = self.axes[0].shape();
        (SPATIAL_DIMS, rx, runs)
    }

    /// Broadcasts the layout to (n_rx x n_runs) per axis.
    ///
    /// A layout that cannot broadcast is reported as a diagnostic and
    /// rejected; it is never truncated or padded.
    pub fn broadcast(&self, n_rx: usize, n_runs: usize) -> Result<[DMatrix<f64>; SPATIAL_DIMS], RfError> {
        let (_, rx, runs) = self.shape();
        let rx_ok = rx == n_rx || rx == 1;
        let runs_ok = runs == n_runs || runs == 1;
        if !rx_ok || !runs_ok {
            warn!(
                "Receiver layout of shape {:?} does not broadcast against (2, {}, {})",
                self.shape(),
                n_rx,
                n_runs
            );
            return Err(RfError::shape(format!(
                "receiver layout {:?} cannot broadcast to (2, {}, {})",
                self.shape(),
                n_rx,
                n_runs
            )));
        }
        Ok([
            broadcast_axis(&self.axes[0], n_rx, n_runs),
            broadcast_axis(&self.axes[1], n_rx, n_runs),
        ])
    }
}

impl TryFrom<RawAxes> for ReceiverLayout {
    type Error = RfError;

    fn try_from(raw: RawAxes) -> Result<Self, Self::Error> {
        let [x, y] = raw.axes;
        Self::from_axes(x, y)
    }
}

impl Default for ReceiverLayout {
    fn default() -> Self {
        Self::reference()
    }
}

fn broadcast_axis(axis: &DMatrix<f64>, n_rx: usize, n_runs: usize) -> DMatrix<f64> {
    let (rx, runs) = axis.shape();
    DMatrix::from_fn(n_rx, n_runs, |i, r| {
        axis[(if rx == 1 { 0 } else { i }, if runs == 1 { 0 } else { r })]
    })
}

// =============================================================================
// SCENE CONFIG
// =============================================================================

/// Parameters for one scene generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Number of receivers
    pub n_rx: usize,

    /// Bounding extent [width, length] in meters
    pub extent: Vec<f64>,

    /// Number of independent runs
    pub n_runs: usize,

    /// Receiver layout (used by `RandomTxFixedLayout` and grid scenes)
    pub layout: ReceiverLayout,

    /// Placement policy
    pub placement: PlacementMode,

    /// Place the transmitter on every integer grid point, one per run
    pub grid: bool,

    /// Seed for reproducible placements
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            n_rx: 6,
            extent: vec![20.0, 60.0],
            n_runs: 1000,
            layout: ReceiverLayout::reference(),
            placement: PlacementMode::RandomTxFixedLayout,
            grid: false,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Grid dictionary over `extent` with receivers from `layout`.
    ///
    /// The run count is set to the number of grid cells.
    pub fn grid_dictionary(extent: [f64; 2], layout: ReceiverLayout) -> Self {
        let (_, n_rx, _) = layout.shape();
        Self {
            n_rx,
            extent: extent.to_vec(),
            n_runs: (extent[0].max(0.0) * extent[1].max(0.0)) as usize,
            layout,
            placement: PlacementMode::RandomTxFixedLayout,
            grid: true,
            seed: None,
        }
    }

    /// Sets the run count.
    pub fn with_runs(mut self, n_runs: usize) -> Self {
        self.n_runs = n_runs;
        self
    }

    /// Sets the placement mode.
    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), RfError> {
        if self.extent.len() != SPATIAL_DIMS {
            return Err(RfError::config(format!(
                "bounding extent of {} dimensions not supported, only 2",
                self.extent.len()
            )));
        }
        if let Some(bad) = self.extent.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(RfError::config(format!(
                "bounding extent must be positive, got {}",
                bad
            )));
        }
        if self.n_rx == 0 {
            return Err(RfError::config("at least one receiver is required"));
        }
        if self.n_runs == 0 {
            return Err(RfError::config("at least one run is required"));
        }
        if self.grid {
            if self.extent.iter().any(|v| v.fract() != 0.0) {
                return Err(RfError::config(format!(
                    "grid scenes need a whole-meter extent, got {:?}",
                    self.extent
                )));
            }
            let cells = (self.extent[0] * self.extent[1]) as usize;
            if self.n_runs != cells {
                return Err(RfError::config(format!(
                    "n_runs is {} but the grid has {} cells",
                    self.n_runs, cells
                )));
            }
            if self.placement != PlacementMode::RandomTxFixedLayout {
                return Err(RfError::config(format!(
                    "grid scenes require placement mode {}, got {}",
                    PlacementMode::RandomTxFixedLayout,
                    self.placement
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// SCENE
// =============================================================================

/// Coordinates of one transmitter and `n_rx` receivers over `n_runs` runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxes")]
pub struct Scene {
    /// One (entity x run) matrix per spatial axis; entity 0 is the Tx
    axes: [DMatrix<f64>; SPATIAL_DIMS],
}

impl Scene {
    /// Builds a scene from explicit (entity x run) coordinate matrices.
    pub fn from_axes(x: DMatrix<f64>, y: DMatrix<f64>) -> Result<Self, RfError> {
        if x.shape() != y.shape() {
            return Err(RfError::shape(format!(
                "scene axes disagree: x is {:?}, y is {:?}",
                x.shape(),
                y.shape()
            )));
        }
        if x.nrows() < 2 || x.ncols() == 0 {
            return Err(RfError::shape(format!(
                "scene needs a transmitter, a receiver and a run, got {:?}",
                x.shape()
            )));
        }
        Ok(Self { axes: [x, y] })
    }

    /// Tensor shape as (dims, entities, runs).
    pub fn shape(&self) -> (usize, usize, usize) {
        let (entities, runs) = self.axes[0].shape();
        (SPATIAL_DIMS, entities, runs)
    }

    /// Number of receivers.
    pub fn n_rx(&self) -> usize {
        self.axes[0].nrows() - 1
    }

    /// Number of runs.
    pub fn n_runs(&self) -> usize {
        self.axes[0].ncols()
    }

    /// Coordinate along `dim` of `entity` in `run`.
    pub fn coord(&self, dim: usize, entity: usize, run: usize) -> f64 {
        self.axes[dim][(entity, run)]
    }

    /// (entity x run) coordinates along one axis.
    pub fn axis(&self, dim: usize) -> &DMatrix<f64> {
        &self.axes[dim]
    }

    /// Transmitter position in `run`.
    pub fn transmitter(&self, run: usize) -> Vector2<f64> {
        Vector2::new(self.axes[0][(0, run)], self.axes[1][(0, run)])
    }

    /// Position of receiver `rx` (0-based) in `run`.
    pub fn receiver(&self, rx: usize, run: usize) -> Vector2<f64> {
        Vector2::new(self.axes[0][(rx + 1, run)], self.axes[1][(rx + 1, run)])
    }

    /// Transmitter minus receiver vectors, one (rx x run) matrix per axis.
    pub fn tx_offsets(&self) -> [DMatrix<f64>; SPATIAL_DIMS] {
        let (n_rx, n_runs) = (self.n_rx(), self.n_runs());
        [0, 1].map(|d| {
            DMatrix::from_fn(n_rx, n_runs, |i, r| self.axes[d][(0, r)] - self.axes[d][(i + 1, r)])
        })
    }

    /// Transmitter-receiver distances (rx x run), meters.
    pub fn distances(&self) -> DMatrix<f64> {
        let [dx, dy] = self.tx_offsets();
        dx.zip_map(&dy, |a, b| (a * a + b * b).sqrt())
    }

    /// Transmitter positions as (runs x 2), the localization targets.
    pub fn transmitter_positions(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.n_runs(), SPATIAL_DIMS, |r, d| self.axes[d][(0, r)])
    }
}

impl TryFrom<RawAxes> for Scene {
    type Error = RfError;

    fn try_from(raw: RawAxes) -> Result<Self, Self::Error> {
        let [x, y] = raw.axes;
        Self::from_axes(x, y)
    }
}

/// Generates a scene tensor of shape (2, n_rx + 1, n_runs).
pub fn generate(config: &SceneConfig) -> Result<Scene, RfError> {
    config.validate()?;
    let (n_rx, n_runs) = (config.n_rx, config.n_runs);

    // Layout problems surface before any randomness is consumed
    let layout = if config.placement == PlacementMode::RandomTxFixedLayout {
        Some(config.layout.broadcast(n_rx, n_runs)?)
    } else {
        None
    };

    let mut axes = if config.grid {
        grid_transmitters(config.extent[1] as usize, n_rx, n_runs)
    } else {
        random_entities(&config.extent, n_rx, n_runs, config.seed)
    };

    match config.placement {
        PlacementMode::FixedTxRandomRx => {
            for axis in axes.iter_mut() {
                let tx = axis[(0, 0)];
                axis.row_mut(0).fill(tx);
            }
        }
        PlacementMode::RandomTxFixedRx => {
            for axis in axes.iter_mut() {
                let first = axis.view((1, 0), (n_rx, 1)).clone_owned();
                for r in 1..n_runs {
                    axis.view_mut((1, r), (n_rx, 1)).copy_from(&first);
                }
            }
        }
        PlacementMode::RandomTxRandomRx => {}
        PlacementMode::RandomTxFixedLayout => {
            if let Some(layout) = layout {
                for (axis, rx) in axes.iter_mut().zip(layout.iter()) {
                    axis.view_mut((1, 0), (n_rx, n_runs)).copy_from(rx);
                }
            }
        }
    }

    debug!(
        "Generated scene: n_rx={} n_runs={} placement={} grid={} seed={:?}",
        n_rx, n_runs, config.placement, config.grid, config.seed
    );

    Ok(Scene { axes })
}

/// Transmitter on every integer grid point in row-major order; receiver
/// rows are left at zero for the layout to overwrite.
fn grid_transmitters(length: usize, n_rx: usize, n_runs: usize) -> [DMatrix<f64>; SPATIAL_DIMS] {
    let mut x = DMatrix::zeros(n_rx + 1, n_runs);
    let mut y = DMatrix::zeros(n_rx + 1, n_runs);
    for r in 0..n_runs {
        x[(0, r)] = (r / length + 1) as f64;
        y[(0, r)] = (r % length + 1) as f64;
    }
    [x, y]
}

fn random_entities(extent: &[f64], n_rx: usize, n_runs: usize, seed: Option<u64>) -> [DMatrix<f64>; SPATIAL_DIMS] {
    let mut rng = call_rng(seed);
    [0, 1].map(|d| {
        let uniform = Uniform::new(0.0, extent[d]);
        let mut axis = DMatrix::zeros(n_rx + 1, n_runs);
        for e in 0..=n_rx {
            for r in 0..n_runs {
                axis[(e, r)] = uniform.sample(&mut rng);
            }
        }
        axis
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_config(placement: PlacementMode) -> SceneConfig {
        SceneConfig {
            n_rx: 4,
            n_runs: 50,
            placement,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_scene_shape() {
        let scene = generate(&SceneConfig::default().with_seed(1)).unwrap();
        assert_eq!(scene.shape(), (2, 7, 1000));
        assert_eq!(scene.n_rx(), 6);
        assert_eq!(scene.n_runs(), 1000);
    }

    #[test]
    fn test_random_positions_within_extent() {
        let scene = generate(&random_config(PlacementMode::RandomTxRandomRx)).unwrap();
        for e in 0..5 {
            for r in 0..50 {
                let x = scene.coord(0, e, r);
                let y = scene.coord(1, e, r);
                assert!((0.0..20.0).contains(&x));
                assert!((0.0..60.0).contains(&y));
            }
        }
    }

    #[test]
    fn test_fixed_tx_broadcast() {
        let scene = generate(&random_config(PlacementMode::FixedTxRandomRx)).unwrap();
        let tx0 = scene.transmitter(0);
        for r in 1..scene.n_runs() {
            assert_eq!(scene.transmitter(r), tx0);
        }
        // Receivers still vary
        assert_ne!(scene.receiver(0, 0), scene.receiver(0, 1));
    }

    #[test]
    fn test_fixed_rx_broadcast() {
        let scene = generate(&random_config(PlacementMode::RandomTxFixedRx)).unwrap();
        for rx in 0..scene.n_rx() {
            let first = scene.receiver(rx, 0);
            for r in 1..scene.n_runs() {
                assert_eq!(scene.receiver(rx, r), first);
            }
        }
        assert_ne!(scene.transmitter(0), scene.transmitter(1));
    }

    #[test]
    fn test_fixed_layout_overwrites_receivers() {
        let config = SceneConfig::default().with_runs(20).with_seed(3);
        let scene = generate(&config).unwrap();
        for r in 0..20 {
            assert_eq!(scene.receiver(0, r), Vector2::new(6.3, 15.3));
            assert_eq!(scene.receiver(5, r), Vector2::new(13.5, 44.5));
        }
    }

    #[test]
    fn test_layout_shape_mismatch_fails() {
        let layout = ReceiverLayout::from_coords(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        let config = SceneConfig {
            n_rx: 6,
            layout,
            ..Default::default()
        };
        let err = generate(&config).unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_layout_broadcasts_single_receiver() {
        let layout = ReceiverLayout::from_coords(&[5.0], &[7.0]).unwrap();
        let config = SceneConfig {
            n_rx: 3,
            n_runs: 4,
            layout,
            seed: Some(9),
            ..Default::default()
        };
        let scene = generate(&config).unwrap();
        for rx in 0..3 {
            assert_eq!(scene.receiver(rx, 2), Vector2::new(5.0, 7.0));
        }
    }

    #[test]
    fn test_per_run_layout_placed_verbatim() {
        // Three receivers that move on every one of four runs
        let x = DMatrix::from_fn(3, 4, |i, r| 1.0 + i as f64 + 0.25 * r as f64);
        let y = DMatrix::from_fn(3, 4, |i, r| 10.0 * (i + 1) as f64 + r as f64);
        let layout = ReceiverLayout::from_axes(x.clone(), y.clone()).unwrap();
        assert_eq!(layout.shape(), (2, 3, 4));

        let [bx, by] = layout.broadcast(3, 4).unwrap();
        assert_eq!(bx, x);
        assert_eq!(by, y);

        let config = SceneConfig {
            n_rx: 3,
            n_runs: 4,
            layout: layout.clone(),
            seed: Some(11),
            ..Default::default()
        };
        let scene = generate(&config).unwrap();
        for rx in 0..3 {
            for r in 0..4 {
                assert_eq!(scene.receiver(rx, r), Vector2::new(x[(rx, r)], y[(rx, r)]));
            }
        }
        assert_ne!(scene.receiver(0, 0), scene.receiver(0, 3));

        // The run axis must match exactly once it is longer than one
        let err = generate(&SceneConfig { n_runs: 5, ..config }).unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_deserialize_rejects_mismatched_axes() {
        let good = ReceiverLayout::from_coords(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        let json = serde_json::to_value(&good).unwrap();
        assert_eq!(serde_json::from_value::<ReceiverLayout>(json.clone()).unwrap(), good);

        let longer = ReceiverLayout::from_coords(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        let mut bad = json;
        bad["axes"][1] = serde_json::to_value(&longer).unwrap()["axes"][1].clone();
        assert!(serde_json::from_value::<ReceiverLayout>(bad).is_err());
    }

    #[test]
    fn test_scene_deserialize_validates() {
        let x = DMatrix::from_fn(3, 2, |e, r| (e + r) as f64);
        let y = DMatrix::from_fn(3, 2, |e, r| (2 * e + r) as f64 + 0.5);
        let scene = Scene::from_axes(x, y).unwrap();
        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(serde_json::from_value::<Scene>(json.clone()).unwrap(), scene);

        // A lone transmitter is not a scene
        let tx_only = ReceiverLayout::from_coords(&[1.0], &[2.0]).unwrap();
        let axis = serde_json::to_value(&tx_only).unwrap()["axes"][0].clone();
        let bad = serde_json::json!({ "axes": [axis.clone(), axis] });
        assert!(serde_json::from_value::<Scene>(bad).is_err());
    }

    #[test]
    fn test_extent_arity_rejected() {
        let config = SceneConfig {
            extent: vec![20.0, 60.0, 3.0],
            ..Default::default()
        };
        assert!(generate(&config).unwrap_err().is_config());
    }

    #[test]
    fn test_grid_transmitters_row_major() {
        let config = SceneConfig::grid_dictionary([3.0, 4.0], ReceiverLayout::reference());
        assert_eq!(config.n_runs, 12);
        let scene = generate(&config).unwrap();
        assert_eq!(scene.transmitter(0), Vector2::new(1.0, 1.0));
        assert_eq!(scene.transmitter(1), Vector2::new(1.0, 2.0));
        assert_eq!(scene.transmitter(4), Vector2::new(2.0, 1.0));
        assert_eq!(scene.transmitter(11), Vector2::new(3.0, 4.0));
        assert_eq!(scene.receiver(2, 7), Vector2::new(7.2, 30.1));
    }

    #[test]
    fn test_grid_run_count_mismatch() {
        let config = SceneConfig::grid_dictionary([3.0, 4.0], ReceiverLayout::reference()).with_runs(10);
        assert!(generate(&config).unwrap_err().is_config());
    }

    #[test]
    fn test_grid_requires_layout_mode() {
        let config = SceneConfig::grid_dictionary([3.0, 4.0], ReceiverLayout::reference())
            .with_placement(PlacementMode::RandomTxRandomRx);
        assert!(generate(&config).unwrap_err().is_config());
    }

    #[test]
    fn test_placement_mode_parsing() {
        assert_eq!(PlacementMode::from_index(2).unwrap(), PlacementMode::RandomTxRandomRx);
        assert!(PlacementMode::from_index(4).unwrap_err().is_config());
        assert_eq!("layout".parse::<PlacementMode>().unwrap(), PlacementMode::RandomTxFixedLayout);
        assert_eq!("0".parse::<PlacementMode>().unwrap(), PlacementMode::FixedTxRandomRx);
        for index in 0..4 {
            assert_eq!(PlacementMode::from_index(index).unwrap().index(), index);
        }
    }

    #[test]
    fn test_seeded_generation_reproducible() {
        let config = random_config(PlacementMode::RandomTxRandomRx);
        assert_eq!(generate(&config).unwrap(), generate(&config).unwrap());
    }

    #[test]
    fn test_distances_and_targets() {
        let x = DMatrix::from_row_slice(2, 1, &[0.0, 3.0]);
        let y = DMatrix::from_row_slice(2, 1, &[0.0, 4.0]);
        let scene = Scene::from_axes(x, y).unwrap();
        assert_eq!(scene.distances()[(0, 0)], 5.0);
        assert_eq!(scene.transmitter_positions().shape(), (1, 2));
    }
}
