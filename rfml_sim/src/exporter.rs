//! JSON exporter for experiment results.

use crate::error::SimError;
use crate::runner::{ExperimentConfig, ExperimentResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Complete experiment export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentExport {
    /// Master seed
    pub seed: u64,

    /// Settings shared by every experiment
    pub config: ExperimentConfig,

    /// One entry per experiment run
    pub results: Vec<ExperimentResult>,

    /// True if every experiment passed
    pub passed: bool,
}

impl ExperimentExport {
    /// Creates a new export container.
    pub fn new(seed: u64, config: ExperimentConfig) -> Self {
        Self {
            seed,
            config,
            results: Vec::new(),
            passed: true,
        }
    }

    /// Adds a result.
    pub fn add_result(&mut self, result: ExperimentResult) {
        self.passed &= result.passed;
        self.results.push(result);
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
