//! Built-in Crop and Fertilizer Tables
//!
//! Embedded defaults used when no reference file is configured. Crop targets
//! are seasonal N/P/K requirements in kg/ha; fertilizer fractions are the
//! guaranteed nutrient content by mass.

use super::{CropProfile, FertilizerProduct};
use crate::soil::Nutrient;

/// Version tag of the embedded tables
pub const BUILTIN_VERSION: &str = "builtin-2024.1";

struct CropRow {
    name: &'static str,
    n: f64,
    p: f64,
    k: f64,
    ph_min: f64,
    ph_max: f64,
    growth_stages: &'static [&'static str],
    season: &'static str,
    water_need: &'static str,
}

struct FertilizerRow {
    nutrient: Nutrient,
    name: &'static str,
    fraction: f64,
}

// ============================================================================
// EMBEDDED CROP PROFILES
// ============================================================================

static CROPS: &[CropRow] = &[
    CropRow {
        name: "Rice",
        n: 120.0, p: 60.0, k: 40.0,
        ph_min: 5.5, ph_max: 6.5,
        growth_stages: &["Nursery", "Transplanting", "Tillering", "Panicle Initiation", "Flowering", "Maturity"],
        season: "Kharif",
        water_need: "High",
    },
    CropRow {
        name: "Wheat",
        n: 100.0, p: 50.0, k: 40.0,
        ph_min: 6.0, ph_max: 7.5,
        growth_stages: &["Sowing", "Crown Root Initiation", "Tillering", "Jointing", "Flowering", "Grain Filling"],
        season: "Rabi",
        water_need: "Medium",
    },
    CropRow {
        name: "Maize",
        n: 150.0, p: 75.0, k: 50.0,
        ph_min: 5.8, ph_max: 7.0,
        growth_stages: &["Emergence", "Vegetative", "Tasseling", "Silking", "Grain Filling", "Maturity"],
        season: "Kharif",
        water_need: "Medium",
    },
    CropRow {
        name: "Cotton",
        n: 120.0, p: 60.0, k: 60.0,
        ph_min: 5.8, ph_max: 8.0,
        growth_stages: &["Germination", "Squaring", "Flowering", "Boll Development", "Boll Opening"],
        season: "Kharif",
        water_need: "Medium",
    },
    CropRow {
        name: "Sugarcane",
        n: 250.0, p: 100.0, k: 120.0,
        ph_min: 6.0, ph_max: 7.5,
        growth_stages: &["Germination", "Tillering", "Grand Growth", "Maturity"],
        season: "Annual",
        water_need: "High",
    },
    CropRow {
        name: "Potato",
        n: 180.0, p: 80.0, k: 150.0,
        ph_min: 5.0, ph_max: 6.5,
        growth_stages: &["Sprouting", "Vegetative", "Tuber Initiation", "Tuber Bulking", "Maturity"],
        season: "Rabi",
        water_need: "Medium",
    },
    CropRow {
        name: "Tomato",
        n: 150.0, p: 100.0, k: 120.0,
        ph_min: 6.0, ph_max: 7.0,
        growth_stages: &["Seedling", "Vegetative", "Flowering", "Fruit Set", "Ripening"],
        season: "Rabi",
        water_need: "Medium",
    },
];

// ============================================================================
// EMBEDDED FERTILIZER PRODUCTS
// ============================================================================

static FERTILIZERS: &[FertilizerRow] = &[
    FertilizerRow { nutrient: Nutrient::Nitrogen, name: "Urea", fraction: 0.46 },
    FertilizerRow { nutrient: Nutrient::Nitrogen, name: "Ammonium Nitrate", fraction: 0.34 },
    FertilizerRow { nutrient: Nutrient::Nitrogen, name: "Ammonium Sulphate", fraction: 0.21 },
    FertilizerRow { nutrient: Nutrient::Phosphorus, name: "DAP", fraction: 0.46 },
    FertilizerRow { nutrient: Nutrient::Phosphorus, name: "Single Super Phosphate", fraction: 0.16 },
    FertilizerRow { nutrient: Nutrient::Potassium, name: "Muriate of Potash", fraction: 0.60 },
    FertilizerRow { nutrient: Nutrient::Potassium, name: "Sulphate of Potash", fraction: 0.50 },
];

pub(super) fn builtin_crops() -> Vec<CropProfile> {
    CROPS
        .iter()
        .map(|row| CropProfile {
            name: row.name.to_string(),
            target_n: row.n,
            target_p: row.p,
            target_k: row.k,
            ph_min: row.ph_min,
            ph_max: row.ph_max,
            growth_stages: row.growth_stages.iter().map(|s| s.to_string()).collect(),
            season: row.season.to_string(),
            water_need: row.water_need.to_string(),
        })
        .collect()
}

pub(super) fn builtin_fertilizers() -> Vec<FertilizerProduct> {
    FERTILIZERS
        .iter()
        .map(|row| FertilizerProduct {
            name: row.name.to_string(),
            nutrient: row.nutrient,
            content_fraction: row.fraction,
        })
        .collect()
}
