//! Trained Model Artifact
//!
//! The serialized form of a fitted forest plus everything needed to map its
//! class indices back to fertilizer names. Written once by the training
//! binary, loaded read-only by the server.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::forest::RandomForest;
use super::Classifier;
use crate::error::{AdvisorError, Result};
use crate::soil::{SoilReading, FEATURE_NAMES};

/// Bumped whenever the on-disk layout changes
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Held-out evaluation recorded at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_samples: usize,
    pub test_samples: usize,
    pub test_accuracy: f64,
    pub samples_per_class: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    /// Fertilizer names, indexed by forest class
    pub classes: Vec<String>,
    pub forest: RandomForest,
    #[serde(default)]
    pub summary: Option<TrainingSummary>,
}

impl ModelArtifact {
    pub fn new(classes: Vec<String>, forest: RandomForest, summary: Option<TrainingSummary>) -> Result<Self> {
        let artifact = ModelArtifact {
            format_version: MODEL_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            classes,
            forest,
            summary,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Read and validate an artifact from JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&contents)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(AdvisorError::Model(format!(
                "unsupported model format version {} (expected {})",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.feature_names != FEATURE_NAMES {
            return Err(AdvisorError::Model(format!(
                "model features {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if self.classes.is_empty() {
            return Err(AdvisorError::Model("model has no classes".to_string()));
        }
        if self.classes.len() != self.forest.n_classes() {
            return Err(AdvisorError::Model(format!(
                "{} class labels for a forest of {} classes",
                self.classes.len(),
                self.forest.n_classes()
            )));
        }
        self.forest.validate()
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, reading: &SoilReading) -> Result<String> {
        reading.validate()?;
        let class = self.forest.predict(&reading.features());
        Ok(self.classes[class].clone())
    }

    fn labels(&self) -> &[String] {
        &self.classes
    }
}
