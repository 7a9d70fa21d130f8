//! Nutrient Plan
//!
//! Bundles everything the analysis view derives from one reading and one crop:
//! deficits, per-product dosages, pH status and timing caveats. Built fresh for
//! every request.

use serde::Serialize;

use super::deficit::{deficit_for_crop, NutrientDeficit};
use super::dosage::{recommend_dosages, DosageRecommendation};
use crate::error::Result;
use crate::reference::{CropProfile, ReferenceData};
use crate::soil::SoilReading;
use crate::weather::{timing_caveats, Advisory, CurrentConditions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhStatus {
    Acidic,
    Optimal,
    Alkaline,
}

/// Reading pH against the crop's optimal range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhAssessment {
    pub status: PhStatus,
    pub current: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    /// Distance to the nearest bound, 0 when inside the range
    pub deviation: f64,
}

impl PhAssessment {
    pub fn assess(ph: f64, crop: &CropProfile) -> Self {
        let (status, deviation) = if ph < crop.ph_min {
            (PhStatus::Acidic, crop.ph_min - ph)
        } else if ph > crop.ph_max {
            (PhStatus::Alkaline, ph - crop.ph_max)
        } else {
            (PhStatus::Optimal, 0.0)
        };

        PhAssessment {
            status,
            current: ph,
            optimal_min: crop.ph_min,
            optimal_max: crop.ph_max,
            deviation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NutrientPlan {
    pub crop: String,
    pub reference_version: String,
    pub reading: SoilReading,
    pub deficit: NutrientDeficit,
    pub dosages: Vec<DosageRecommendation>,
    pub ph: PhAssessment,
    pub caveats: Vec<Advisory>,
}

impl NutrientPlan {
    /// Compute the plan for `crop_name`. Unknown crops and invalid readings fail
    /// before any calculation.
    pub fn build(
        reading: &SoilReading,
        crop_name: &str,
        reference: &ReferenceData,
        conditions: Option<&CurrentConditions>,
    ) -> Result<Self> {
        let deficit = deficit_for_crop(reading, crop_name, reference)?;
        let crop = reference.crop(crop_name)?;
        if let Some(weather) = conditions {
            weather.validate()?;
        }
        let dosages = recommend_dosages(&deficit, reference)?;

        Ok(NutrientPlan {
            crop: crop.name.clone(),
            reference_version: reference.version().to_string(),
            reading: *reading,
            deficit,
            dosages,
            ph: PhAssessment::assess(reading.ph, crop),
            caveats: timing_caveats(reading, &deficit, conditions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;
    use approx::assert_relative_eq;

    #[test]
    fn test_rice_plan() {
        let reference = ReferenceData::builtin().unwrap();
        let reading = SoilReading::new(5.0, 20.0, 80.0, 10.0, 50.0).unwrap();
        let plan = NutrientPlan::build(&reading, "rice", &reference, None).unwrap();

        assert_eq!(plan.crop, "Rice");
        assert_relative_eq!(plan.deficit.nitrogen, 100.0);
        assert_eq!(plan.deficit.phosphorus, 0.0);

        let urea = plan.dosages.iter().find(|d| d.product == "Urea").unwrap();
        assert_eq!(urea.display_dosage(), 217.4);

        assert_eq!(plan.ph.status, PhStatus::Acidic);
        assert_relative_eq!(plan.ph.deviation, 0.5);
        assert!(plan.caveats.is_empty());
    }

    #[test]
    fn test_ph_assessment_bounds() {
        let reference = ReferenceData::builtin().unwrap();
        let wheat = reference.crop("Wheat").unwrap();
        assert_eq!(PhAssessment::assess(6.0, wheat).status, PhStatus::Optimal);
        assert_eq!(PhAssessment::assess(7.5, wheat).status, PhStatus::Optimal);
        let alk = PhAssessment::assess(8.0, wheat);
        assert_eq!(alk.status, PhStatus::Alkaline);
        assert_relative_eq!(alk.deviation, 0.5);
    }

    #[test]
    fn test_unknown_crop() {
        let reference = ReferenceData::builtin().unwrap();
        let reading = SoilReading::new(6.0, 20.0, 20.0, 20.0, 50.0).unwrap();
        let err = NutrientPlan::build(&reading, "Quinoa", &reference, None).unwrap_err();
        assert!(matches!(err, AdvisorError::UnknownCrop(_)));
    }

    #[test]
    fn test_out_of_range_weather_rejected() {
        let reference = ReferenceData::builtin().unwrap();
        let reading = SoilReading::new(6.0, 20.0, 20.0, 20.0, 50.0).unwrap();
        let weather = CurrentConditions {
            temperature_c: 25.0,
            humidity_pct: None,
            rain_probability_pct: 150.0,
            wind_speed_kmh: 5.0,
        };
        let err = NutrientPlan::build(&reading, "Rice", &reference, Some(&weather)).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidConditions { field: "rain_probability_pct", .. }));
    }

    #[test]
    fn test_plans_are_independent() {
        let reference = ReferenceData::builtin().unwrap();
        let a = SoilReading::new(6.0, 20.0, 20.0, 20.0, 50.0).unwrap();
        let b = SoilReading::new(6.0, 90.0, 20.0, 20.0, 50.0).unwrap();

        let first = NutrientPlan::build(&a, "Maize", &reference, None).unwrap();
        let _ = NutrientPlan::build(&b, "Maize", &reference, None).unwrap();
        let again = NutrientPlan::build(&a, "Maize", &reference, None).unwrap();
        assert_eq!(first.deficit, again.deficit);
        assert_eq!(first.dosages, again.dosages);
    }
}
