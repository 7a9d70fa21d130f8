//! Fertilizer Classifier
//!
//! `Classifier` is the only thing the rest of the crate knows about the model:
//! five soil features in, one fertilizer label out. The bundled implementation
//! is a random forest of CART trees stored as a JSON artifact.

pub mod forest;
pub mod model;
pub mod tree;

pub use forest::{ForestParams, RandomForest};
pub use model::{ModelArtifact, TrainingSummary, MODEL_FORMAT_VERSION};
pub use tree::{DecisionTree, FeatureRow, TreeParams, N_FEATURES};

use crate::error::Result;
use crate::soil::SoilReading;

/// Maps a soil reading to a fertilizer label. Deterministic for a given
/// trained artifact.
pub trait Classifier: Send + Sync {
    fn predict(&self, reading: &SoilReading) -> Result<String>;

    /// Every label this classifier can return
    fn labels(&self) -> &[String];
}
