//! Soil Readings
//!
//! A single captured sample of pH, macro-nutrients and moisture. Readings come
//! from outside (sensor hardware or a simulator) and are consumed once per
//! analysis; nothing here mutates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AdvisorError, Result};

/// Wire names of the five classifier features, in feature order.
pub const FEATURE_NAMES: [&str; 5] = ["pH", "N", "P", "K", "Moisture"];

/// Macro-nutrient identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];

    /// Chemical symbol used on the wire ("N", "P", "K")
    pub fn symbol(self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "N",
            Nutrient::Phosphorus => "P",
            Nutrient::Potassium => "K",
        }
    }
}

/// One soil sample. Nutrients in ppm, moisture in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    #[serde(rename = "Moisture")]
    pub moisture: f64,
}

impl SoilReading {
    /// Build a validated reading.
    pub fn new(ph: f64, nitrogen: f64, phosphorus: f64, potassium: f64, moisture: f64) -> Result<Self> {
        let reading = SoilReading { ph, nitrogen, phosphorus, potassium, moisture };
        reading.validate()?;
        Ok(reading)
    }

    /// Parse a reading from a JSON object keyed by `pH`, `N`, `P`, `K`, `Moisture`.
    ///
    /// Reports the first missing or non-numeric field by name, then validates
    /// the domain of every value.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AdvisorError::invalid_reading("body", "must be a JSON object"))?;

        let mut values = [0.0_f64; 5];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            *slot = match obj.get(name) {
                None | Some(Value::Null) => {
                    return Err(AdvisorError::invalid_reading(name, "is missing"))
                }
                Some(v) => v
                    .as_f64()
                    .ok_or_else(|| AdvisorError::invalid_reading(name, "must be a number"))?,
            };
        }

        SoilReading::from_features(values)
    }

    /// Rebuild a reading from a feature vector in [`FEATURE_NAMES`] order.
    pub fn from_features(features: [f64; 5]) -> Result<Self> {
        let [ph, n, p, k, moisture] = features;
        SoilReading::new(ph, n, p, k, moisture)
    }

    /// Feature vector in [`FEATURE_NAMES`] order
    pub fn features(&self) -> [f64; 5] {
        [self.ph, self.nitrogen, self.phosphorus, self.potassium, self.moisture]
    }

    /// Current level of one macro-nutrient
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen,
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
        }
    }

    /// Reject non-finite or negative values, pH outside 0-14, moisture above 100%.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in FEATURE_NAMES.into_iter().zip(self.features()) {
            if !value.is_finite() {
                return Err(AdvisorError::invalid_reading(name, "must be finite"));
            }
            if value < 0.0 {
                return Err(AdvisorError::invalid_reading(
                    name,
                    format!("must be non-negative, got {}", value),
                ));
            }
        }
        if self.ph > 14.0 {
            return Err(AdvisorError::invalid_reading("pH", format!("must be within 0-14, got {}", self.ph)));
        }
        if self.moisture > 100.0 {
            return Err(AdvisorError::invalid_reading(
                "Moisture",
                format!("must be a percentage (0-100), got {}", self.moisture),
            ));
        }
        Ok(())
    }
}
