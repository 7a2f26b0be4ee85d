//! Localization experiments.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Experiment identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentId {
    /// EXP-001: grid fingerprint dictionary, random test transmitters
    FingerprintGrid,

    /// EXP-002: random training and test scenes
    RandomSplit,

    /// EXP-003: grid dictionary with every perturbation disabled
    IdealChannel,
}

impl ExperimentId {
    /// Returns a list of all experiments.
    pub fn all() -> Vec<ExperimentId> {
        vec![
            ExperimentId::FingerprintGrid,
            ExperimentId::RandomSplit,
            ExperimentId::IdealChannel,
        ]
    }

    /// Returns the experiment name.
    pub fn name(&self) -> &'static str {
        match self {
            ExperimentId::FingerprintGrid => "fingerprint_grid",
            ExperimentId::RandomSplit => "random_split",
            ExperimentId::IdealChannel => "ideal_channel",
        }
    }

    /// Returns a description of the experiment.
    pub fn description(&self) -> &'static str {
        match self {
            ExperimentId::FingerprintGrid => "Kernel-trick fit on a 1 m grid dictionary, tested on random transmitters",
            ExperimentId::RandomSplit => "Kernel-trick fit on random transmitters, tested on a fresh random scene",
            ExperimentId::IdealChannel => "Grid dictionary with multipath, shadowing and angular spread disabled",
        }
    }

    /// Returns true if the training set is the integer grid dictionary.
    pub fn uses_grid(&self) -> bool {
        matches!(self, ExperimentId::FingerprintGrid | ExperimentId::IdealChannel)
    }

    /// Returns true if every perturbation is switched off.
    pub fn is_ideal(&self) -> bool {
        matches!(self, ExperimentId::IdealChannel)
    }

    /// Pass threshold on RMSE, as a fraction of the area diagonal.
    ///
    /// Guessing the area center scores about 0.29 of the diagonal.
    pub fn error_bound_fraction(&self) -> f64 {
        match self {
            ExperimentId::FingerprintGrid => 0.25,
            ExperimentId::RandomSplit => 0.25,
            ExperimentId::IdealChannel => 0.1,
        }
    }
}

impl std::fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ExperimentId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fingerprint_grid" | "grid" | "exp-001" => Ok(ExperimentId::FingerprintGrid),
            "random_split" | "random" | "exp-002" => Ok(ExperimentId::RandomSplit),
            "ideal_channel" | "ideal" | "exp-003" => Ok(ExperimentId::IdealChannel),
            _ => Err(SimError::UnknownExperiment(s.to_string())),
        }
    }
}
