use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Delivery role of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeliveryClass {
    /// Delivery Origin: shops, restaurants, warehouses.
    DO,
    /// Delivery Destination: residential buildings.
    DD,
    /// Unlikely Delivery: everything else.
    UD,
}

impl DeliveryClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryClass::DO => "DO",
            DeliveryClass::DD => "DD",
            DeliveryClass::UD => "UD",
        }
    }

    pub fn all() -> [DeliveryClass; 3] {
        [DeliveryClass::DO, DeliveryClass::DD, DeliveryClass::UD]
    }
}

impl fmt::Display for DeliveryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DO" => Ok(DeliveryClass::DO),
            "DD" => Ok(DeliveryClass::DD),
            "UD" => Ok(DeliveryClass::UD),
            other => Err(format!("unknown delivery class '{other}' (expected DO, DD or UD)")),
        }
    }
}

/// Where a building's height came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeightSource {
    #[serde(rename = "height")]
    Native,
    #[serde(rename = "building:levels")]
    Levels,
    #[serde(rename = "k-NN")]
    Knn,
    #[serde(rename = "default")]
    Default,
}

impl HeightSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeightSource::Native => "height",
            HeightSource::Levels => "building:levels",
            HeightSource::Knn => "k-NN",
            HeightSource::Default => "default",
        }
    }
}

impl fmt::Display for HeightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The known-height buildings a k-NN height was averaged from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborInfo {
    /// Positions of the neighbors in the building collection.
    pub indices: Vec<usize>,
    pub heights: Vec<f64>,
    /// Neighbor centroids as (lat, lon).
    pub coords: Vec<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_class_parses_its_own_names() {
        for class in DeliveryClass::all() {
            assert_eq!(class.as_str().parse::<DeliveryClass>(), Ok(class));
        }
        assert!("XX".parse::<DeliveryClass>().is_err());
    }

    #[test]
    fn height_source_serializes_as_tag_name() {
        assert_eq!(serde_json::to_string(&HeightSource::Levels).unwrap(), "\"building:levels\"");
        assert_eq!(serde_json::to_string(&HeightSource::Knn).unwrap(), "\"k-NN\"");
        assert_eq!(HeightSource::Native.to_string(), "height");
    }
}
