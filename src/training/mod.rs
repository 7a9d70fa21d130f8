//! Offline Training Pipeline
//!
//! load CSV -> balance classes -> seeded split -> fit forest -> evaluate -> artifact.
//!
//! Runs as a manual batch job (`train_model` binary). There is no online update
//! path: the server only ever loads a finished artifact.

pub mod balance;
pub mod dataset;
pub mod split;

pub use balance::{balance_classes, Balanced};
pub use dataset::{Dataset, LABEL_COLUMN};
pub use split::train_test_split;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::classifier::{ForestParams, ModelArtifact, RandomForest, TrainingSummary, TreeParams};

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub samples_per_class: usize,
    pub test_fraction: f64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            samples_per_class: 100,
            test_fraction: 0.2,
            n_estimators: 100,
            max_depth: None,
            seed: 42,
        }
    }
}

/// Fraction of rows where `predict` matches the label
pub fn accuracy(forest: &RandomForest, dataset: &Dataset, labels: &[usize]) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let correct = dataset
        .rows
        .iter()
        .zip(labels)
        .filter(|&(row, label)| forest.predict(row) == *label)
        .count();
    correct as f64 / dataset.len() as f64
}

/// Balance, split, fit and evaluate an already-loaded dataset.
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<ModelArtifact> {
    if dataset.is_empty() {
        anyhow::bail!("Training dataset is empty");
    }
    if config.samples_per_class == 0 {
        anyhow::bail!("samples_per_class must be at least 1");
    }

    let classes = dataset.classes();
    tracing::info!("Unique fertilizers ({}): {:?}", classes.len(), classes);

    // One RNG drives balancing and splitting so the whole run replays from the seed
    let mut rng = StdRng::seed_from_u64(config.seed);

    let Balanced { dataset: balanced, distinct_source_rows } =
        balance_classes(dataset, config.samples_per_class, &mut rng);
    tracing::info!(
        "Balanced to {} rows ({} per class) from {} distinct source rows of {}",
        balanced.len(),
        config.samples_per_class,
        distinct_source_rows,
        dataset.len()
    );
    if distinct_source_rows < balanced.len() {
        tracing::warn!(
            "Resampling with replacement duplicated {} rows; duplicates can appear in both train and test sets",
            balanced.len() - distinct_source_rows
        );
    }

    let (train_idx, test_idx) = train_test_split(balanced.len(), config.test_fraction, &mut rng);
    let train_set = balanced.select(&train_idx);
    let test_set = balanced.select(&test_idx);
    tracing::info!("Split: {} train / {} test", train_set.len(), test_set.len());

    let train_labels = train_set.encode_labels(&classes)?;
    let test_labels = test_set.encode_labels(&classes)?;

    let params = ForestParams {
        n_estimators: config.n_estimators,
        seed: config.seed,
        tree: TreeParams {
            max_depth: config.max_depth,
            ..TreeParams::default()
        },
    };

    let start = Instant::now();
    let forest = RandomForest::fit(&train_set.rows, &train_labels, classes.len(), params)
        .context("Failed to fit random forest")?;
    tracing::info!("Fitted {} trees in {:.2}s", forest.n_trees(), start.elapsed().as_secs_f64());

    let test_accuracy = accuracy(&forest, &test_set, &test_labels);
    tracing::info!("Held-out accuracy: {:.3}", test_accuracy);

    let summary = TrainingSummary {
        train_samples: train_set.len(),
        test_samples: test_set.len(),
        test_accuracy,
        samples_per_class: config.samples_per_class,
        seed: config.seed,
    };

    ModelArtifact::new(classes, forest, Some(summary)).context("Trained model failed validation")
}

/// Full pipeline from a CSV path
pub fn train_from_csv(path: &str, config: &TrainingConfig) -> Result<ModelArtifact> {
    tracing::info!("Loading dataset from {}", path);
    let dataset = Dataset::from_csv(path)?;
    tracing::info!("Loaded {} rows", dataset.len());
    train(&dataset, config)
}
