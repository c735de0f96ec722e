use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::constants::NAME_PROPERTY;
use crate::geo::distance::GeoPoint;

/// Feature properties keep their insertion order when written back out
pub type Properties = Map<String, Value>;

pub const FEATURE_TYPE: &str = "Feature";
pub const FEATURE_COLLECTION_TYPE: &str = "FeatureCollection";

fn feature_type() -> String {
    FEATURE_TYPE.to_string()
}

fn feature_collection_type() -> String {
    FEATURE_COLLECTION_TYPE.to_string()
}

/// `"properties": null` is legal GeoJSON; treat it like an empty mapping
fn properties_or_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

/// One school as a GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    /// Passed through untouched; only point coordinates are ever read
    #[serde(default)]
    pub geometry: Value,
    #[serde(default, deserialize_with = "properties_or_empty")]
    pub properties: Properties,
    /// Any other members (`id`, `bbox`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Value, properties: Properties) -> Self {
        Self {
            kind: feature_type(),
            geometry,
            properties,
            extra: Map::new(),
        }
    }

    /// Build a point feature, mostly useful for fixtures
    pub fn point(lon: f64, lat: f64, properties: Properties) -> Self {
        let geometry = serde_json::json!({
            "type": "Point",
            "coordinates": [lon, lat],
        });
        Self::new(geometry, properties)
    }

    /// The raw `[lon, lat]` numbers of the geometry, in file order
    pub fn coordinate_numbers(&self) -> Option<(&Number, &Number)> {
        let coordinates = self.geometry.get("coordinates")?.as_array()?;
        match coordinates.as_slice() {
            [Value::Number(lon), Value::Number(lat), ..] => Some((lon, lat)),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<GeoPoint> {
        let (lon, lat) = self.coordinate_numbers()?;
        Some(GeoPoint::new(lat.as_f64()?, lon.as_f64()?))
    }

    /// The `name` property, or "" when missing or not a string
    pub fn name(&self) -> &str {
        self.property_str(NAME_PROPERTY).unwrap_or("")
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// A scalar property rendered as text; "" when missing or not scalar
    pub fn property_text(&self, key: &str) -> String {
        match self.properties.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}

/// An ordered GeoJSON feature collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Any other top-level members (`name`, `crs`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: feature_collection_type(),
            features,
            extra: Map::new(),
        }
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
        Self::new(Vec::new())
    }
}
