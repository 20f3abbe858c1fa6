//! Crop types selectable on the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Crop types the recommendation provider understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    #[default]
    Wheat,
    Rice,
    Corn,
    Soybean,
    Cotton,
    Potato,
}

impl CropType {
    pub const ALL: [CropType; 6] = [
        CropType::Wheat,
        CropType::Rice,
        CropType::Corn,
        CropType::Soybean,
        CropType::Cotton,
        CropType::Potato,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CropType::Wheat => "wheat",
            CropType::Rice => "rice",
            CropType::Corn => "corn",
            CropType::Soybean => "soybean",
            CropType::Cotton => "cotton",
            CropType::Potato => "potato",
        }
    }

    /// Typical nitrogen demand in kg/ha for a full season
    pub fn nitrogen_demand(&self) -> f64 {
        match self {
            CropType::Wheat => 120.0,
            CropType::Rice => 100.0,
            CropType::Corn => 160.0,
            CropType::Soybean => 40.0,
            CropType::Cotton => 110.0,
            CropType::Potato => 140.0,
        }
    }

    /// Attainable yield in kg/ha under good management
    pub fn base_yield(&self) -> f64 {
        match self {
            CropType::Wheat => 5000.0,
            CropType::Rice => 6000.0,
            CropType::Corn => 9000.0,
            CropType::Soybean => 3000.0,
            CropType::Cotton => 2500.0,
            CropType::Potato => 25000.0,
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropType::Wheat => write!(f, "Wheat"),
            CropType::Rice => write!(f, "Rice"),
            CropType::Corn => write!(f, "Corn"),
            CropType::Soybean => write!(f, "Soybean"),
            CropType::Cotton => write!(f, "Cotton"),
            CropType::Potato => write!(f, "Potato"),
        }
    }
}

impl FromStr for CropType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CropType::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| format!("unknown crop type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_type_parsing() {
        assert_eq!("wheat".parse::<CropType>().unwrap(), CropType::Wheat);
        assert_eq!(" Corn ".parse::<CropType>().unwrap(), CropType::Corn);
        assert!("barley".parse::<CropType>().is_err());
    }

    #[test]
    fn test_crop_type_serde() {
        let json = serde_json::to_string(&CropType::Soybean).unwrap();
        assert_eq!(json, "\"soybean\"");
        let crop: CropType = serde_json::from_str("\"potato\"").unwrap();
        assert_eq!(crop, CropType::Potato);
    }
}
