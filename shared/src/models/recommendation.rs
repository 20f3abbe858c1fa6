//! Recommendation models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Crop names offered when the provider suggests none
pub const DEFAULT_CROP_SUGGESTIONS: &[&str] = &["Wheat", "Corn", "Soybean"];

/// Fertilizer dosage as a magnitude plus unit, e.g. 96 "kg NPK/ha"
///
/// Kept structured from the provider boundary inward; `Display` produces the
/// human-readable form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FertilizerAdvice {
    /// Dosage per hectare
    pub amount: f64,
    pub unit: String,
}

impl FertilizerAdvice {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Self {
            amount,
            unit: unit.into(),
        }
    }

    /// Parse a legacy advice string such as "96 kg NPK/ha"
    ///
    /// The magnitude is the leading integer of the text. Text without one
    /// yields an amount of 0 and keeps the whole text as the unit.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim_start();
        let mut chars = trimmed.char_indices().peekable();
        let mut end = 0;
        if let Some((_, c)) = chars.peek() {
            if *c == '-' || *c == '+' {
                chars.next();
            }
        }
        let mut digits = 0;
        for (idx, c) in chars {
            if c.is_ascii_digit() {
                end = idx + c.len_utf8();
                digits += 1;
            } else {
                break;
            }
        }

        if digits == 0 {
            return Self::new(0.0, text.trim());
        }

        let amount = trimmed[..end].parse::<f64>().unwrap_or(0.0);
        let rest = trimmed[end..].trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
        Self::new(amount, rest.trim())
    }
}

impl fmt::Display for FertilizerAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.amount.fract() == 0.0 {
            write!(f, "{:.0}", self.amount)?;
        } else {
            write!(f, "{:.1}", self.amount)?;
        }
        if !self.unit.is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

/// Agronomic recommendation derived from weather, soil and crop type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub fertilizer_advice: FertilizerAdvice,
    pub crop_suggestions: Vec<String>,
    /// Expected yield in kg/ha
    pub yield_prediction: f64,
}

impl Recommendation {
    /// Deduplicate crop suggestions and substitute the default set when empty
    ///
    /// Returns the normalised recommendation and whether the default set was
    /// substituted.
    pub fn with_crop_suggestions_ensured(mut self) -> (Self, bool) {
        let mut seen = Vec::with_capacity(self.crop_suggestions.len());
        for name in self.crop_suggestions.drain(..) {
            let name = name.trim().to_string();
            if !name.is_empty() && !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(&name)) {
                seen.push(name);
            }
        }

        if seen.is_empty() {
            self.crop_suggestions = DEFAULT_CROP_SUGGESTIONS
                .iter()
                .map(|s| s.to_string())
                .collect();
            (self, true)
        } else {
            self.crop_suggestions = seen;
            (self, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_advice() {
        let advice = FertilizerAdvice::parse("96 kg NPK/ha");
        assert_eq!(advice.amount, 96.0);
        assert_eq!(advice.unit, "kg NPK/ha");
    }

    #[test]
    fn test_parse_leading_integer_only() {
        let advice = FertilizerAdvice::parse("  12.5 kg urea/ha");
        assert_eq!(advice.amount, 12.0);
        assert_eq!(advice.unit, "kg urea/ha");
    }

    #[test]
    fn test_parse_integer_wider_than_i64() {
        let advice = FertilizerAdvice::parse("99999999999999999999 kg NPK/ha");
        assert_eq!(advice.amount, 1e20);
        assert_eq!(advice.unit, "kg NPK/ha");

        assert_eq!(FertilizerAdvice::parse("-40 kg/ha").amount, -40.0);
    }

    #[test]
    fn test_parse_without_number_is_zero() {
        let advice = FertilizerAdvice::parse("apply compost");
        assert_eq!(advice.amount, 0.0);
        assert_eq!(advice.unit, "apply compost");

        assert_eq!(FertilizerAdvice::parse("").amount, 0.0);
        assert_eq!(FertilizerAdvice::parse("-").amount, 0.0);
    }

    #[test]
    fn test_advice_display() {
        assert_eq!(FertilizerAdvice::new(80.0, "kg NPK/ha").to_string(), "80 kg NPK/ha");
        assert_eq!(FertilizerAdvice::new(72.5, "kg NPK/ha").to_string(), "72.5 kg NPK/ha");
    }

    #[test]
    fn test_empty_suggestions_replaced() {
        let rec = Recommendation {
            fertilizer_advice: FertilizerAdvice::new(80.0, "kg NPK/ha"),
            crop_suggestions: vec![" ".to_string()],
            yield_prediction: 6000.0,
        };
        let (rec, substituted) = rec.with_crop_suggestions_ensured();
        assert!(substituted);
        assert_eq!(rec.crop_suggestions, vec!["Wheat", "Corn", "Soybean"]);
    }

    #[test]
    fn test_suggestions_deduplicated() {
        let rec = Recommendation {
            fertilizer_advice: FertilizerAdvice::new(80.0, "kg NPK/ha"),
            crop_suggestions: vec!["Wheat".into(), "wheat".into(), "Corn".into()],
            yield_prediction: 6000.0,
        };
        let (rec, substituted) = rec.with_crop_suggestions_ensured();
        assert!(!substituted);
        assert_eq!(rec.crop_suggestions, vec!["Wheat", "Corn"]);
    }
}
