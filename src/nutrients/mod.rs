//! Nutrient gap and fertilizer dosage calculations
//!
//! - `deficit`: per-nutrient shortfall against crop targets
//! - `dosage`: deficit to product mass via guaranteed content fraction
//! - `plan`: combined view for one reading and one crop

pub mod deficit;
pub mod dosage;
pub mod plan;

pub use deficit::{calculate_deficit, deficit_for_crop, nutrient_deficit, NutrientDeficit};
pub use dosage::{dosage, recommend_dosages, round_for_display, DosageRecommendation};
pub use plan::{NutrientPlan, PhAssessment, PhStatus};
