//! Nutrient Deficit Calculator
//!
//! deficit[x] = max(0, target[x] - current[x]) for each macro-nutrient,
//! independently. Surpluses clamp to zero.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reference::{CropProfile, ReferenceData};
use crate::soil::{Nutrient, SoilReading};

/// Shortfall per macro-nutrient, never negative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientDeficit {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
}

impl NutrientDeficit {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen,
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
        }
    }

    /// True when every nutrient meets or exceeds its target
    pub fn is_satisfied(&self) -> bool {
        Nutrient::ALL.iter().all(|&n| self.get(n) == 0.0)
    }
}

/// Shortfall of a single nutrient
pub fn nutrient_deficit(target: f64, current: f64) -> f64 {
    (target - current).max(0.0)
}

/// Deficit of a reading against a crop's targets
pub fn calculate_deficit(reading: &SoilReading, crop: &CropProfile) -> NutrientDeficit {
    NutrientDeficit {
        nitrogen: nutrient_deficit(crop.target_n, reading.nitrogen),
        phosphorus: nutrient_deficit(crop.target_p, reading.phosphorus),
        potassium: nutrient_deficit(crop.target_k, reading.potassium),
    }
}

/// Validate the reading, resolve the crop by name, then compute the deficit.
///
/// Unknown crops fail with a lookup error before any arithmetic happens.
pub fn deficit_for_crop(
    reading: &SoilReading,
    crop_name: &str,
    reference: &ReferenceData,
) -> Result<NutrientDeficit> {
    reading.validate()?;
    let crop = reference.crop(crop_name)?;
    Ok(calculate_deficit(reading, crop))
}
