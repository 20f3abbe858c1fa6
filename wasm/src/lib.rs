//! WebAssembly module for the NovaFarm dashboard
//!
//! Provides client-side computation for:
//! - Fertilizer totals for a farm area
//! - Yield adjusted for irrigation and pest-control efficiency
//! - Parsing legacy fertilizer advice strings

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("novafarm-wasm loaded"));
}

fn parse_recommendation(recommendation_json: &str) -> Result<Recommendation, String> {
    serde_json::from_str(recommendation_json).map_err(|e| format!("Invalid recommendation JSON: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn plan_json(recommendation_json: &str, area_hectares: f64) -> Result<String, String> {
    let recommendation = parse_recommendation(recommendation_json)?;
    let area = validate_area(area_hectares).map_err(|e| e.to_string())?;
    to_json(&fertilizer_plan(&recommendation, area))
}

fn estimate_json(recommendation_json: &str, irrigation_pct: f64, pest_pct: f64) -> Result<String, String> {
    let recommendation = parse_recommendation(recommendation_json)?;
    let irrigation = validate_efficiency_pct("irrigation_efficiency_pct", irrigation_pct)
        .map_err(|e| e.to_string())?;
    let pest = validate_efficiency_pct("pest_control_efficiency_pct", pest_pct).map_err(|e| e.to_string())?;
    to_json(&yield_estimate(&recommendation, irrigation, pest))
}

/// Total fertilizer in kg for an advised dosage (kg/ha) and an area
#[wasm_bindgen]
pub fn fertilizer_total_kg(amount_per_hectare: f64, area_hectares: f64) -> f64 {
    shared::fertilizer_total_kg(amount_per_hectare, area_hectares)
}

/// Yield adjusted by irrigation and pest-control efficiency (not clamped)
#[wasm_bindgen]
pub fn adjusted_yield(yield_prediction: f64, irrigation_pct: f64, pest_pct: f64) -> f64 {
    shared::adjusted_yield(yield_prediction, irrigation_pct, pest_pct)
}

/// Fertilizer plan JSON for a recommendation JSON and an area in hectares
#[wasm_bindgen]
pub fn fertilizer_plan_json(recommendation_json: &str, area_hectares: f64) -> Result<String, JsValue> {
    plan_json(recommendation_json, area_hectares).map_err(|e| JsValue::from_str(&e))
}

/// Yield estimate JSON for a recommendation JSON and efficiency percentages
#[wasm_bindgen]
pub fn yield_estimate_json(
    recommendation_json: &str,
    irrigation_pct: f64,
    pest_pct: f64,
) -> Result<String, JsValue> {
    estimate_json(recommendation_json, irrigation_pct, pest_pct).map_err(|e| JsValue::from_str(&e))
}

/// Parse a legacy advice string such as "96 kg NPK/ha" into `{amount, unit}` JSON
#[wasm_bindgen]
pub fn parse_fertilizer_advice(text: &str) -> Result<String, JsValue> {
    to_json(&FertilizerAdvice::parse(text)).map_err(|e| JsValue::from_str(&e))
}

/// Selectable crop names, in display order
#[wasm_bindgen]
pub fn crop_types() -> js_sys::Array {
    CropType::ALL
        .into_iter()
        .map(|crop| JsValue::from_str(&crop.to_string()))
        .collect()
}
