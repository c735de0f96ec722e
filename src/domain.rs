use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::constants::{GRADE_FIELD, RATING_FIELD, TUITION_FIELD, TYPE_FIELD};
use crate::geo::{Feature, GeoPoint, Properties};

/// Canonical form of a school name for matching: trimmed and uppercased
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Exact-match identity of a school: `NAME_lat_lon` with the coordinates
/// exactly as written in the source data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn new(name: &str, lat: &str, lon: &str) -> Self {
        Self(format!("{}_{}_{}", normalize_name(name), lat, lon))
    }

    /// Key for a GeoJSON feature, `None` when it has no point coordinates
    pub fn for_feature(feature: &Feature) -> Option<Self> {
        let (lon, lat) = feature.coordinate_numbers()?;
        Some(Self::new(feature.name(), &lat.to_string(), &lon.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four fields joined onto each feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolDetails {
    pub grade: String,
    pub rating: String,
    pub tuition: String,
    pub school_type: String,
}

impl SchoolDetails {
    /// Overwrite the enrichment properties of a feature with these values
    pub fn write_to(&self, properties: &mut Properties) {
        properties.insert(GRADE_FIELD.to_string(), Value::String(self.grade.clone()));
        properties.insert(RATING_FIELD.to_string(), Value::String(self.rating.clone()));
        properties.insert(TUITION_FIELD.to_string(), Value::String(self.tuition.clone()));
        properties.insert(TYPE_FIELD.to_string(), Value::String(self.school_type.clone()));
    }

    pub fn from_properties(properties: &Properties) -> Self {
        let field = |key: &str| {
            properties
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            grade: field(GRADE_FIELD),
            rating: field(RATING_FIELD),
            tuition: field(TUITION_FIELD),
            school_type: field(TYPE_FIELD),
        }
    }
}

/// One usable row of the grades CSV
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolRecord {
    /// Normalized school name
    pub name: String,
    /// Raw coordinate text as it appeared in the CSV
    pub lat: String,
    pub lon: String,
    /// Parsed coordinates; `None` when the text is not a number
    pub location: Option<GeoPoint>,
    pub details: SchoolDetails,
}

impl SchoolRecord {
    pub fn new(name: &str, lat: &str, lon: &str, details: SchoolDetails) -> Self {
        let location = match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };
        Self {
            name: normalize_name(name),
            lat: lat.to_string(),
            lon: lon.to_string(),
            location,
            details,
        }
    }

    pub fn key(&self) -> LookupKey {
        LookupKey::new(&self.name, &self.lat, &self.lon)
    }
}
