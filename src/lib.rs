//! Fertilizer Advisor
//!
//! Soil-driven fertilizer recommendation: a classifier from soil readings to a
//! fertilizer label, plus the nutrient-gap and dosage arithmetic that turns a
//! crop's targets into product quantities.
//!
//! - `soil`: soil readings and validation
//! - `reference`: static crop and fertilizer tables
//! - `nutrients`: deficit, dosage and the combined nutrient plan
//! - `weather`: application-timing caveats from current conditions
//! - `classifier`: `Classifier` trait and the random forest behind it
//! - `training`: offline dataset balancing and model fitting
//! - `api_server`: Axum routes (feature `api`)

pub mod classifier;
pub mod error;
pub mod nutrients;
pub mod reference;
pub mod soil;
pub mod training;
pub mod weather;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use classifier::{Classifier, ModelArtifact};
pub use error::{AdvisorError, Result};
pub use nutrients::{calculate_deficit, dosage, DosageRecommendation, NutrientDeficit, NutrientPlan};
pub use reference::{CropProfile, FertilizerProduct, ReferenceData};
pub use soil::{Nutrient, SoilReading};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
