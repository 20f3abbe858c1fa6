//! Derived metrics computed from a recommendation and user parameters
//!
//! Everything here is pure: identical inputs always give identical outputs.
//! Efficiency percentages are not clamped; values outside 0-100 simply
//! produce yields outside the usual range.

use serde::{Deserialize, Serialize};

use super::recommendation::Recommendation;

/// User-tunable parameters for the derived-metric panels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FarmParameters {
    pub area_hectares: f64,
    pub irrigation_efficiency_pct: f64,
    pub pest_control_efficiency_pct: f64,
}

impl Default for FarmParameters {
    fn default() -> Self {
        Self {
            area_hectares: 1.0,
            irrigation_efficiency_pct: 100.0,
            pest_control_efficiency_pct: 100.0,
        }
    }
}

/// Total fertilizer needed for a farm area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilizerPlan {
    pub area_hectares: f64,
    pub total_kg: f64,
}

/// Yield adjusted for irrigation and pest-control efficiency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldEstimate {
    pub irrigation_efficiency_pct: f64,
    pub pest_control_efficiency_pct: f64,
    /// Adjusted yield in kg/ha
    pub adjusted_yield: f64,
}

/// Both derived metrics for the current recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedMetrics {
    pub fertilizer_plan: FertilizerPlan,
    pub yield_estimate: YieldEstimate,
}

/// Total fertilizer in kg: advised dosage per hectare times area
pub fn fertilizer_total_kg(amount_per_hectare: f64, area_hectares: f64) -> f64 {
    amount_per_hectare * area_hectares
}

/// `yield × (irrigation / 100) × (pest / 100)`
pub fn adjusted_yield(yield_prediction: f64, irrigation_pct: f64, pest_pct: f64) -> f64 {
    yield_prediction * (irrigation_pct / 100.0) * (pest_pct / 100.0)
}

pub fn fertilizer_plan(recommendation: &Recommendation, area_hectares: f64) -> FertilizerPlan {
    FertilizerPlan {
        area_hectares,
        total_kg: fertilizer_total_kg(recommendation.fertilizer_advice.amount, area_hectares),
    }
}

pub fn yield_estimate(
    recommendation: &Recommendation,
    irrigation_efficiency_pct: f64,
    pest_control_efficiency_pct: f64,
) -> YieldEstimate {
    YieldEstimate {
        irrigation_efficiency_pct,
        pest_control_efficiency_pct,
        adjusted_yield: adjusted_yield(
            recommendation.yield_prediction,
            irrigation_efficiency_pct,
            pest_control_efficiency_pct,
        ),
    }
}

/// Compute both panels from a recommendation and the current parameters
pub fn derive_metrics(recommendation: &Recommendation, params: &FarmParameters) -> DerivedMetrics {
    DerivedMetrics {
        fertilizer_plan: fertilizer_plan(recommendation, params.area_hectares),
        yield_estimate: yield_estimate(
            recommendation,
            params.irrigation_efficiency_pct,
            params.pest_control_efficiency_pct,
        ),
    }
}
