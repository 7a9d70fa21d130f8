//! Application-Timing Caveats
//!
//! The core consumes a single current-conditions record (from a weather API
//! or a local simulator, both outside this crate) and turns it into advisory
//! cards about when to spread fertilizer. Dosages themselves never change.

use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};
use crate::nutrients::NutrientDeficit;
use crate::soil::SoilReading;

/// Rain probability at or above which runoff is likely (%)
pub const RAIN_PROBABILITY_LIMIT: f64 = 60.0;
/// Air temperature above which surface urea volatilises (°C)
pub const HEAT_LIMIT_C: f64 = 32.0;
/// Wind speed above which granular/foliar spreading drifts (km/h)
pub const WIND_LIMIT_KMH: f64 = 25.0;
/// Soil moisture bounds for application (%)
pub const DRY_SOIL_PCT: f64 = 20.0;
pub const WET_SOIL_PCT: f64 = 80.0;

/// Current weather at the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    /// Reported for display only; no caveat depends on it
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    pub rain_probability_pct: f64,
    #[serde(default)]
    pub wind_speed_kmh: f64,
}

impl CurrentConditions {
    /// Finite temperature, percentages within 0-100, non-negative wind.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature_c.is_finite() {
            return Err(AdvisorError::invalid_conditions("temperature_c", "must be finite"));
        }
        let percentages = [
            ("rain_probability_pct", Some(self.rain_probability_pct)),
            ("humidity_pct", self.humidity_pct),
        ];
        for (field, value) in percentages {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    return Err(AdvisorError::invalid_conditions(
                        field,
                        format!("must be a percentage (0-100), got {}", v),
                    ));
                }
            }
        }
        if !self.wind_speed_kmh.is_finite() || self.wind_speed_kmh < 0.0 {
            return Err(AdvisorError::invalid_conditions(
                "wind_speed_kmh",
                format!("must be non-negative, got {}", self.wind_speed_kmh),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Advisory card for the analysis response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub advisory_type: String, // "rain_runoff", "heat_volatilisation", ...
    pub severity: Severity,
    pub message: String,
    pub advice: String,
}

/// Timing caveats for the given soil state and (optional) weather.
///
/// Soil-moisture caveats are produced without weather data; the rest need a
/// conditions record. Nothing is reported when there is no deficit to apply.
pub fn timing_caveats(
    reading: &SoilReading,
    deficit: &NutrientDeficit,
    conditions: Option<&CurrentConditions>,
) -> Vec<Advisory> {
    let mut out = Vec::new();
    if deficit.is_satisfied() {
        return out;
    }

    if reading.moisture < DRY_SOIL_PCT {
        out.push(Advisory {
            advisory_type: "dry_soil".to_string(),
            severity: Severity::Medium,
            message: format!("Soil moisture is low ({:.1}%)", reading.moisture),
            advice: "Irrigate lightly before applying so nutrients can dissolve into the root zone".to_string(),
        });
    } else if reading.moisture > WET_SOIL_PCT {
        out.push(Advisory {
            advisory_type: "saturated_soil".to_string(),
            severity: Severity::Medium,
            message: format!("Soil is near saturation ({:.1}%)", reading.moisture),
            advice: "Delay application until the soil drains; nitrate and potash leach from waterlogged soil".to_string(),
        });
    }

    let Some(weather) = conditions else {
        return out;
    };

    if weather.rain_probability_pct >= RAIN_PROBABILITY_LIMIT {
        let severity = if weather.rain_probability_pct >= 85.0 { Severity::High } else { Severity::Medium };
        out.push(Advisory {
            advisory_type: "rain_runoff".to_string(),
            severity,
            message: format!("{:.0}% chance of rain", weather.rain_probability_pct),
            advice: "Postpone spreading until after the rain to avoid runoff".to_string(),
        });
    }

    if weather.temperature_c > HEAT_LIMIT_C && deficit.nitrogen > 0.0 {
        out.push(Advisory {
            advisory_type: "heat_volatilisation".to_string(),
            severity: Severity::Medium,
            message: format!("Air temperature is {:.1}°C", weather.temperature_c),
            advice: "Apply nitrogen in the early morning or evening, and incorporate urea into the soil".to_string(),
        });
    }

    if weather.wind_speed_kmh > WIND_LIMIT_KMH {
        out.push(Advisory {
            advisory_type: "wind_drift".to_string(),
            severity: Severity::Low,
            message: format!("Wind speed is {:.0} km/h", weather.wind_speed_kmh),
            advice: "Spread granules close to the ground or wait for calmer conditions".to_string(),
        });
    }

    out
}
