//! Reference Data
//!
//! Crop profiles and fertilizer product compositions. Loaded once at process
//! start (embedded tables or a JSON file), validated, then shared read-only
//! for the lifetime of the process.

mod tables;

use std::fs;
use std::path::Path;

use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::soil::Nutrient;

pub use tables::BUILTIN_VERSION;

/// Static per-crop targets and descriptive metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    /// Target nitrogen (kg/ha)
    pub target_n: f64,
    /// Target phosphorus (kg/ha)
    pub target_p: f64,
    /// Target potassium (kg/ha)
    pub target_k: f64,
    pub ph_min: f64,
    pub ph_max: f64,
    #[serde(default)]
    pub growth_stages: Vec<String>,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub water_need: String,
}

impl CropProfile {
    pub fn target(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Nitrogen => self.target_n,
            Nutrient::Phosphorus => self.target_p,
            Nutrient::Potassium => self.target_k,
        }
    }
}

/// A fertilizer product and its guaranteed content of one nutrient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerProduct {
    pub name: String,
    pub nutrient: Nutrient,
    /// Mass fraction of `nutrient` in the product, in (0, 1]. A missing value
    /// deserializes as 0 and fails validation.
    #[serde(default)]
    pub content_fraction: f64,
}

impl FertilizerProduct {
    /// Fail if the content fraction is zero, negative, above 1, or not finite.
    pub fn validate(&self) -> Result<()> {
        let f = self.content_fraction;
        if !(f.is_finite() && f > 0.0 && f <= 1.0) {
            return Err(AdvisorError::InvalidContentFraction {
                product: self.name.clone(),
                fraction: f,
            });
        }
        Ok(())
    }
}

/// On-disk layout of a reference file
#[derive(Debug, Serialize, Deserialize)]
struct ReferenceFile {
    version: String,
    crops: Vec<CropProfile>,
    fertilizers: Vec<FertilizerProduct>,
}

/// Immutable keyed tables of crops and fertilizer products.
///
/// Crop lookups are case-insensitive; products keep their table order within
/// each nutrient.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    version: String,
    crops: FxHashMap<String, CropProfile>,
    crop_order: Vec<String>,
    fertilizers: FxHashMap<Nutrient, Vec<FertilizerProduct>>,
}

impl ReferenceData {
    /// Embedded default tables
    pub fn builtin() -> Result<Self> {
        Self::from_parts(
            BUILTIN_VERSION.to_string(),
            tables::builtin_crops(),
            tables::builtin_fertilizers(),
        )
    }

    /// Load tables from a JSON file with `version`, `crops`, `fertilizers`.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read reference data file: {:?}", path))?;

        let file: ReferenceFile = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse reference data JSON")?;

        Self::from_parts(file.version, file.crops, file.fertilizers)
            .with_context(|| format!("Reference data in {:?} failed validation", path))
    }

    /// Validate and index a set of tables.
    pub fn from_parts(
        version: String,
        crops: Vec<CropProfile>,
        fertilizers: Vec<FertilizerProduct>,
    ) -> Result<Self> {
        let mut crop_map = FxHashMap::default();
        let mut crop_order = Vec::with_capacity(crops.len());

        for crop in crops {
            validate_crop(&crop)?;
            let key = crop_key(&crop.name);
            if crop_map.contains_key(&key) {
                return Err(AdvisorError::InvalidReference(format!("duplicate crop '{}'", crop.name)));
            }
            crop_order.push(key.clone());
            crop_map.insert(key, crop);
        }

        let mut fert_map: FxHashMap<Nutrient, Vec<FertilizerProduct>> = FxHashMap::default();
        for product in fertilizers {
            product.validate()?;
            let products = fert_map.entry(product.nutrient).or_default();
            if products.iter().any(|p| p.name == product.name) {
                return Err(AdvisorError::InvalidReference(format!(
                    "duplicate {} product '{}'",
                    product.nutrient.symbol(),
                    product.name
                )));
            }
            products.push(product);
        }

        Ok(ReferenceData {
            version,
            crops: crop_map,
            crop_order,
            fertilizers: fert_map,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a crop by name. Unknown names are a lookup error.
    pub fn crop(&self, name: &str) -> Result<&CropProfile> {
        self.crops
            .get(&crop_key(name))
            .ok_or_else(|| AdvisorError::UnknownCrop(name.to_string()))
    }

    /// All crops in table order
    pub fn crops(&self) -> impl Iterator<Item = &CropProfile> {
        self.crop_order.iter().filter_map(|key| self.crops.get(key))
    }

    /// Products supplying one nutrient, in table order
    pub fn fertilizers_for(&self, nutrient: Nutrient) -> &[FertilizerProduct] {
        self.fertilizers.get(&nutrient).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Look up a product by nutrient category and name.
    pub fn fertilizer(&self, nutrient: Nutrient, name: &str) -> Option<&FertilizerProduct> {
        self.fertilizers_for(nutrient)
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

fn crop_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_crop(crop: &CropProfile) -> Result<()> {
    if crop.name.trim().is_empty() {
        return Err(AdvisorError::InvalidReference("crop with empty name".to_string()));
    }
    for nutrient in Nutrient::ALL {
        let target = crop.target(nutrient);
        if !target.is_finite() || target < 0.0 {
            return Err(AdvisorError::InvalidReference(format!(
                "crop '{}' has invalid {} target {}",
                crop.name,
                nutrient.symbol(),
                target
            )));
        }
    }
    let ph_ok = crop.ph_min.is_finite()
        && crop.ph_max.is_finite()
        && crop.ph_min >= 0.0
        && crop.ph_max <= 14.0
        && crop.ph_min <= crop.ph_max;
    if !ph_ok {
        return Err(AdvisorError::InvalidReference(format!(
            "crop '{}' has invalid pH range {}-{}",
            crop.name, crop.ph_min, crop.ph_max
        )));
    }
    Ok(())
}
