//! Soil data models

use serde::{Deserialize, Serialize};

/// A soil reading for one location request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilSnapshot {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub moisture: f64,
}

impl SoilSnapshot {
    /// All readings non-negative and pH on the 0-14 scale
    pub fn is_physical(&self) -> bool {
        let readings = [
            self.ph,
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.moisture,
        ];
        readings.iter().all(|v| v.is_finite() && *v >= 0.0) && self.ph <= 14.0
    }

    /// Sum of the three macronutrient readings
    pub fn npk_total(&self) -> f64 {
        self.nitrogen + self.phosphorus + self.potassium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_soil() {
        let soil = SoilSnapshot {
            ph: 6.8,
            nitrogen: 40.0,
            phosphorus: 20.0,
            potassium: 30.0,
            moisture: 25.0,
        };
        assert!(soil.is_physical());
        assert_eq!(soil.npk_total(), 90.0);
    }

    #[test]
    fn test_unphysical_soil() {
        let mut soil = SoilSnapshot {
            ph: 15.0,
            nitrogen: 0.0,
            phosphorus: 0.0,
            potassium: 0.0,
            moisture: 0.0,
        };
        assert!(!soil.is_physical());
        soil.ph = 7.0;
        soil.moisture = -1.0;
        assert!(!soil.is_physical());
    }
}
