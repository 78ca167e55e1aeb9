use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::vessel_metadata::VesselMetadata;

/// GeoJSON FeatureCollection of vessel positions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String, // Always "FeatureCollection"
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

/// Properties object of a stored feature, kept exactly as read so day files
/// written by other tools pass through untouched
pub type Properties = Map<String, Value>;

/// GeoJSON Point feature for a single position report
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String, // Always "Feature"
    pub geometry: PointGeometry,
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    pub fn point(longitude: f64, latitude: f64, properties: VesselProperties) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            geometry: PointGeometry::new(longitude, latitude),
            properties: properties.into_map(),
        }
    }

    /// Property value, `Null` when the key is absent
    pub fn property(&self, key: &str) -> &Value {
        self.properties.get(key).unwrap_or(&Value::Null)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String, // Always "Point"
    /// GeoJSON order: [longitude, latitude]
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            geometry_type: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Properties the converter writes: the position report's pass-through columns
/// joined with the vessel list attributes. Absent values are written as `null`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct VesselProperties {
    pub timestamp: Option<Value>,
    pub mmsi: Option<String>,
    pub name: Option<String>,
    pub callsign: Option<Value>,
    pub nav_status: Option<Value>,
    pub sog: Option<Value>,
    pub cog: Option<Value>,
    pub shiptype: Option<Value>,
    pub length: Option<Value>,
    pub width: Option<Value>,
    pub draught: Option<Value>,
    pub destination: Option<String>,
    pub eta: Option<Value>,
    pub country: Option<String>,
    pub duration: Option<f64>,
    pub distance: Option<f64>,
}

impl VesselProperties {
    pub fn with_metadata(mut self, metadata: &VesselMetadata) -> Self {
        self.country = metadata.country.clone();
        self.duration = metadata.duration;
        self.distance = metadata.distance;
        self
    }

    /// JSON object in field order
    pub fn into_map(self) -> Properties {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Properties::new(),
        }
    }
}
