//! Validation utilities for dashboard user input
//!
//! Input is rejected at the boundary; callers keep their previous values when
//! validation fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::models::{FarmParameters, PipelineError};
use crate::types::Location;

/// A rejected user input
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid {field}: {message}")]
pub struct InputError {
    pub field: String,
    pub message: String,
}

impl InputError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<InputError> for PipelineError {
    fn from(err: InputError) -> Self {
        PipelineError::InvalidUserInput {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<validator::ValidationErrors> for InputError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().copied().collect();
        fields.sort_unstable();

        match fields.first() {
            Some(field) => {
                let message = field_errors[field]
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "value out of range".to_string());
                InputError::new(*field, message)
            }
            None => InputError::new("input", "validation failed"),
        }
    }
}

/// Manual location override from a map interaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct LocationInput {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub lng: f64,
}

/// Partial update of the derived-metric parameters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Validate)]
pub struct FarmParametersInput {
    #[validate(range(min = 0.0, message = "area must be positive"))]
    pub area_hectares: Option<f64>,
    pub irrigation_efficiency_pct: Option<f64>,
    pub pest_control_efficiency_pct: Option<f64>,
}

/// Validate a map-click location
pub fn validate_location(input: &LocationInput) -> Result<Location, InputError> {
    if !input.lat.is_finite() {
        return Err(InputError::new("lat", "latitude must be a finite number"));
    }
    if !input.lng.is_finite() {
        return Err(InputError::new("lng", "longitude must be a finite number"));
    }
    input.validate()?;
    Ok(Location::new(input.lat, input.lng))
}

/// Validate a farm area in hectares (finite, strictly positive)
pub fn validate_area(area_hectares: f64) -> Result<f64, InputError> {
    if !area_hectares.is_finite() {
        return Err(InputError::new("area_hectares", "area must be a finite number"));
    }
    if area_hectares <= 0.0 {
        return Err(InputError::new("area_hectares", "area must be positive"));
    }
    Ok(area_hectares)
}

/// Validate an efficiency percentage
///
/// Values outside 0-100 are accepted unclamped; only non-finite values are
/// rejected.
pub fn validate_efficiency_pct(field: &str, pct: f64) -> Result<f64, InputError> {
    if !pct.is_finite() {
        return Err(InputError::new(field, "percentage must be a finite number"));
    }
    Ok(pct)
}

/// Apply a partial parameter update on top of `current`
///
/// Either every supplied field is valid and the merged parameters are
/// returned, or nothing is applied.
pub fn apply_parameters(
    current: &FarmParameters,
    input: &FarmParametersInput,
) -> Result<FarmParameters, InputError> {
    let mut next = *current;

    if let Some(area) = input.area_hectares {
        next.area_hectares = validate_area(area)?;
    }
    if let Some(pct) = input.irrigation_efficiency_pct {
        next.irrigation_efficiency_pct = validate_efficiency_pct("irrigation_efficiency_pct", pct)?;
    }
    if let Some(pct) = input.pest_control_efficiency_pct {
        next.pest_control_efficiency_pct =
            validate_efficiency_pct("pest_control_efficiency_pct", pct)?;
    }
    input.validate()?;

    Ok(next)
}
