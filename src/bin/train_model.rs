//! Offline Model Training
//!
//! Loads the labelled soil dataset, balances classes by resampling with
//! replacement, fits the random forest and writes the JSON artifact the API
//! server loads at startup.
//!
//! Usage:
//!   DATASET_PATH=dataset.csv MODEL_PATH=models/fertilizer_model.json \
//!     cargo run --release --bin train_model

use fertilizer_advisor::training::{train_from_csv, TrainingConfig};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fertilizer_advisor=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dataset_path = std::env::var("DATASET_PATH").unwrap_or_else(|_| "dataset.csv".to_string());
    let model_path = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "models/fertilizer_model.json".to_string());

    let defaults = TrainingConfig::default();
    let config = TrainingConfig {
        samples_per_class: env_or("SAMPLES_PER_CLASS", defaults.samples_per_class),
        test_fraction: env_or("TEST_FRACTION", defaults.test_fraction),
        n_estimators: env_or("N_ESTIMATORS", defaults.n_estimators),
        max_depth: std::env::var("MAX_DEPTH").ok().and_then(|v| v.parse().ok()),
        seed: env_or("RANDOM_SEED", defaults.seed),
    };

    tracing::info!("Training configuration: {:?}", config);

    let start = Instant::now();
    let artifact = train_from_csv(&dataset_path, &config)?;

    artifact.save(Path::new(&model_path))?;
    tracing::info!(
        "Model trained and saved to {} in {:.1}s",
        model_path,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
