//! RfChannel - one simulator instance with its current scene and the
//! record of the last call to every engine.
//!
//! Calls either succeed and overwrite exactly the record they own, or
//! fail and leave the instance untouched.

use crate::aoa::{self, AoaOptions};
use crate::composer::{self, ComposeRequest, FeatureSet};
use crate::delay::{self, DelayOptions};
use crate::error::RfError;
use crate::gain::{self, GainOptions};
use crate::measurement::Measurement;
use crate::params::PropagationParams;
use crate::scene::{self, Scene, SceneConfig};
use serde::{Deserialize, Serialize};

/// Last call to one engine: options, seed and result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRecord<O> {
    pub options: O,
    pub seed: Option<u64>,
    pub result: Measurement,
}

pub type DelayRecord = EngineRecord<DelayOptions>;
pub type GainRecord = EngineRecord<GainOptions>;
pub type AoaRecord = EngineRecord<AoaOptions>;

/// Last composer call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub request: ComposeRequest,
    pub features: FeatureSet,
}

/// A parameterized RF channel environment.
///
/// Not meant to be shared across threads without external locking; each
/// call creates its own seeded generator.
#[derive(Debug, Clone, Default)]
pub struct RfChannel {
    /// Propagation parameters used by every engine
    params: PropagationParams,

    /// Active scene and the configuration that produced it
    scene: Option<(SceneConfig, Scene)>,

    delay: Option<DelayRecord>,
    gain: Option<GainRecord>,
    aoa: Option<AoaRecord>,
    features: Option<FeatureRecord>,
}

impl RfChannel {
    /// Creates a channel with validated parameters.
    pub fn new(params: PropagationParams) -> Result<Self, RfError> {
        params.validate()?;
        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Current propagation parameters.
    pub fn params(&self) -> &PropagationParams {
        &self.params
    }

    /// Replaces the propagation parameters.
    pub fn set_params(&mut self, params: PropagationParams) -> Result<(), RfError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Generates and stores a new scene, replacing the previous one.
    pub fn generate_scene(&mut self, config: SceneConfig) -> Result<&Scene, RfError> {
        let scene = scene::generate(&config)?;
        Ok(&self.scene.insert((config, scene)).1)
    }

    /// Installs an externally built scene.
    pub fn set_scene(&mut self, config: SceneConfig, scene: Scene) {
        self.scene = Some((config, scene));
    }

    /// Active scene.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref().map(|(_, s)| s)
    }

    /// Configuration of the active scene.
    pub fn scene_config(&self) -> Option<&SceneConfig> {
        self.scene.as_ref().map(|(c, _)| c)
    }

    fn require_scene(&self) -> Result<&Scene, RfError> {
        self.scene().ok_or(RfError::NoScene)
    }

    /// Computes delays against the active scene.
    pub fn calculate_delay(&mut self, options: DelayOptions, seed: Option<u64>) -> Result<&Measurement, RfError> {
        let result = delay::compute(self.require_scene()?, &self.params, options, seed)?;
        let record = self.delay.insert(EngineRecord { options, seed, result });
        Ok(&record.result)
    }

    /// Computes path loss against the active scene.
    pub fn calculate_gain(&mut self, options: GainOptions, seed: Option<u64>) -> Result<&Measurement, RfError> {
        let result = gain::compute(self.require_scene()?, &self.params, options, seed)?;
        let record = self.gain.insert(EngineRecord { options, seed, result });
        Ok(&record.result)
    }

    /// Computes bearings against the active scene.
    pub fn calculate_aoa(&mut self, options: AoaOptions, seed: Option<u64>) -> Result<&Measurement, RfError> {
        let result = aoa::compute(self.require_scene()?, &self.params, options, seed)?;
        let record = self.aoa.insert(EngineRecord { options, seed, result });
        Ok(&record.result)
    }

    /// Runs all three engines and composes the selected features.
    ///
    /// Updates the three engine records as well as the feature record.
    pub fn compose(&mut self, request: ComposeRequest) -> Result<&FeatureSet, RfError> {
        let composition = composer::compose(self.require_scene()?, &self.params, &request)?;

        self.delay = Some(EngineRecord {
            options: request.delay,
            seed: request.seed,
            result: composition.delay,
        });
        self.gain = Some(EngineRecord {
            options: request.gain,
            seed: request.seed,
            result: composition.gain,
        });
        self.aoa = Some(EngineRecord {
            options: request.aoa,
            seed: request.seed,
            result: composition.angle,
        });
        let record = self.features.insert(FeatureRecord {
            request,
            features: composition.features,
        });
        Ok(&record.features)
    }

    /// Last delay call.
    pub fn last_delay(&self) -> Option<&DelayRecord> {
        self.delay.as_ref()
    }

    /// Last gain call.
    pub fn last_gain(&self) -> Option<&GainRecord> {
        self.gain.as_ref()
    }

    /// Last AoA call.
    pub fn last_aoa(&self) -> Option<&AoaRecord> {
        self.aoa.as_ref()
    }

    /// Last composer call.
    pub fn last_features(&self) -> Option<&FeatureRecord> {
        self.features.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::MeasurementSelector;
    use crate::scene::PlacementMode;

    fn channel_with_scene(n_runs: usize) -> RfChannel {
        let mut channel = RfChannel::default();
        channel
            .generate_scene(SceneConfig::default().with_runs(n_runs).with_seed(1))
            .unwrap();
        channel
    }

    #[test]
    fn test_engine_before_scene_fails() {
        let mut channel = RfChannel::default();
        let err = channel.calculate_delay(DelayOptions::default(), Some(1)).unwrap_err();
        assert!(matches!(err, RfError::NoScene));
        assert!(channel.last_delay().is_none());
    }

    #[test]
    fn test_records_store_options_and_seed() {
        let mut channel = channel_with_scene(30);
        let options = GainOptions {
            shadowing: false,
            differential: true,
        };
        let shape = channel.calculate_gain(options, Some(8)).unwrap().values.shape();
        assert_eq!(shape, (30, 15));

        let record = channel.last_gain().unwrap();
        assert_eq!(record.options, options);
        assert_eq!(record.seed, Some(8));
        assert!(channel.last_delay().is_none());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let mut channel = channel_with_scene(25);
        let first = channel.calculate_delay(DelayOptions::default(), Some(4)).unwrap().clone();
        let second = channel.calculate_delay(DelayOptions::default(), Some(4)).unwrap().clone();
        assert_eq!(first, second);

        let a = channel.calculate_aoa(AoaOptions::default(), Some(4)).unwrap().clone();
        let b = channel.calculate_aoa(AoaOptions::default(), Some(4)).unwrap().clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_failed_scene_keeps_previous() {
        let mut channel = channel_with_scene(10);
        let before = channel.scene().unwrap().clone();

        let bad = SceneConfig {
            extent: vec![10.0],
            ..Default::default()
        };
        assert!(channel.generate_scene(bad).is_err());
        assert_eq!(channel.scene().unwrap(), &before);
        assert_eq!(channel.scene_config().unwrap().n_runs, 10);
    }

    #[test]
    fn test_rejected_params_keep_previous() {
        let mut channel = RfChannel::default();
        let err = channel
            .set_params(PropagationParams {
                aoa_sigma: -1.0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(channel.params(), &PropagationParams::default());
    }

    #[test]
    fn test_zero_noise_params_accepted() {
        let params = PropagationParams {
            shadowing_sigma: 0.0,
            aoa_sigma: 0.0,
            ..Default::default()
        };
        let mut channel = RfChannel::new(params).unwrap();
        channel
            .generate_scene(SceneConfig::default().with_runs(5).with_seed(4))
            .unwrap();
        let noisy = channel.calculate_aoa(AoaOptions::default(), Some(1)).unwrap().clone();
        let exact = channel
            .calculate_aoa(
                AoaOptions {
                    perturbed: false,
                    differential: false,
                },
                None,
            )
            .unwrap()
            .clone();
        assert_eq!(noisy.values.shape(), exact.values.shape());
        approx::assert_relative_eq!(noisy.values, exact.values);
    }

    #[test]
    fn test_compose_updates_engine_records() {
        let mut channel = channel_with_scene(10);
        channel.calculate_delay(DelayOptions::default(), Some(2)).unwrap();
        let before = channel.last_delay().unwrap().clone();

        let request = ComposeRequest {
            seed: Some(3),
            ..Default::default()
        };
        let features = channel.compose(request).unwrap().clone();
        assert_eq!(features.selector, MeasurementSelector::All);
        assert_ne!(channel.last_delay().unwrap(), &before);
        assert_eq!(channel.last_delay().unwrap().seed, Some(3));
        assert!(channel.last_gain().is_some());
        assert!(channel.last_aoa().is_some());
        assert_eq!(channel.last_features().unwrap().features, features);
    }

    #[test]
    fn test_compose_matches_engine_calls() {
        let mut channel = channel_with_scene(15);
        let request = ComposeRequest {
            selector: MeasurementSelector::DelayGain,
            seed: Some(19),
            ..Default::default()
        };
        let features = channel.compose(request).unwrap().clone();

        let delay = channel.calculate_delay(request.delay, Some(19)).unwrap().clone();
        let gain = channel.calculate_gain(request.gain, Some(19)).unwrap().clone();
        let n_delay = delay.n_columns();

        assert_eq!(features.matrix.columns(0, n_delay).clone_owned(), delay.values);
        assert_eq!(
            features.matrix.columns(n_delay, gain.n_columns()).clone_owned(),
            gain.values
        );
    }

    #[test]
    fn test_regenerating_replaces_scene() {
        let mut channel = channel_with_scene(10);
        let config = SceneConfig {
            n_rx: 3,
            n_runs: 12,
            placement: PlacementMode::RandomTxRandomRx,
            seed: Some(2),
            ..Default::default()
        };
        channel.generate_scene(config).unwrap();
        assert_eq!(channel.scene().unwrap().shape(), (2, 4, 12));
        let m = channel.calculate_delay(DelayOptions::default(), Some(3)).unwrap();
        assert_eq!(m.values.shape(), (12, 3));
    }
}
