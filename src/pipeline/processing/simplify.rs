use serde_json::Value;

use crate::constants::{PRIVATE_STYLE_URL, SIMPLIFIED_FIELDS, STYLE_URL_KEY};
use crate::geo::{Feature, FeatureCollection, Properties};

/// Trait for reducing features to their display attributes
pub trait Projector {
    fn project(&self, feature: &Feature) -> Feature;

    /// Project every feature, keeping count and order
    fn project_collection(&self, collection: &FeatureCollection) -> FeatureCollection {
        FeatureCollection::new(collection.features.iter().map(|f| self.project(f)).collect())
    }
}

/// Keeps geometry plus an allow-list of properties and stamps a style tag
#[derive(Debug, Clone)]
pub struct AllowListProjector {
    fields: Vec<String>,
    style_url: String,
}

impl Default for AllowListProjector {
    fn default() -> Self {
        Self::new(SIMPLIFIED_FIELDS.iter().copied(), PRIVATE_STYLE_URL)
    }
}

impl AllowListProjector {
    pub fn new<I, S>(fields: I, style_url: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            style_url: style_url.to_string(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Projector for AllowListProjector {
    fn project(&self, feature: &Feature) -> Feature {
        let mut properties = Properties::new();
        for field in &self.fields {
            if let Some(value) = feature.properties.get(field) {
                properties.insert(field.clone(), value.clone());
            }
        }
        properties.insert(STYLE_URL_KEY.to_string(), Value::String(self.style_url.clone()));

        Feature::new(feature.geometry.clone(), properties)
    }
}
