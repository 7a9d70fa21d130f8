//! Dosage Converter
//!
//! dosage = deficit / content_fraction, in kg of product per hectare.
//! Values are carried at full precision; only serialization rounds to 0.1.

use serde::{Serialize, Serializer};

use super::deficit::NutrientDeficit;
use crate::error::{AdvisorError, Result};
use crate::reference::{FertilizerProduct, ReferenceData};
use crate::soil::Nutrient;

/// Mass of product needed to supply `deficit`.
///
/// A content fraction outside (0, 1] is a reference-table defect and is
/// reported as a configuration error.
pub fn dosage(deficit: f64, content_fraction: f64) -> Result<f64> {
    if !(content_fraction.is_finite() && content_fraction > 0.0 && content_fraction <= 1.0) {
        return Err(AdvisorError::InvalidContentFraction {
            product: "<unnamed>".to_string(),
            fraction: content_fraction,
        });
    }
    if !deficit.is_finite() || deficit < 0.0 {
        return Err(AdvisorError::invalid_reading(
            "deficit",
            format!("must be finite and non-negative, got {}", deficit),
        ));
    }
    Ok(deficit / content_fraction)
}

/// Round to one decimal place for presentation
pub fn round_for_display(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn serialize_one_decimal<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_for_display(*value))
}

/// Dosage of one product for one nutrient deficit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosageRecommendation {
    pub product: String,
    pub nutrient: Nutrient,
    pub content_fraction: f64,
    #[serde(serialize_with = "serialize_one_decimal")]
    pub deficit_kg_per_ha: f64,
    #[serde(serialize_with = "serialize_one_decimal")]
    pub dosage_kg_per_ha: f64,
}

impl DosageRecommendation {
    pub fn for_product(deficit: f64, product: &FertilizerProduct) -> Result<Self> {
        let dosage_kg_per_ha = dosage(deficit, product.content_fraction).map_err(|e| match e {
            AdvisorError::InvalidContentFraction { fraction, .. } => AdvisorError::InvalidContentFraction {
                product: product.name.clone(),
                fraction,
            },
            other => other,
        })?;

        Ok(DosageRecommendation {
            product: product.name.clone(),
            nutrient: product.nutrient,
            content_fraction: product.content_fraction,
            deficit_kg_per_ha: deficit,
            dosage_kg_per_ha,
        })
    }

    /// Dosage rounded to one decimal place
    pub fn display_dosage(&self) -> f64 {
        round_for_display(self.dosage_kg_per_ha)
    }
}

/// Independent dosage for every product of every nutrient, in table order.
///
/// Nutrients with no deficit still get entries (all zero) so callers can show
/// that nothing is needed.
pub fn recommend_dosages(deficit: &NutrientDeficit, reference: &ReferenceData) -> Result<Vec<DosageRecommendation>> {
    let mut out = Vec::new();
    for nutrient in Nutrient::ALL {
        for product in reference.fertilizers_for(nutrient) {
            out.push(DosageRecommendation::for_product(deficit.get(nutrient), product)?);
        }
    }
    Ok(out)
}
