//! GeoJSON feature model and great-circle distance

pub mod distance;
pub mod feature;

pub use distance::{haversine_miles, GeoPoint};
pub use feature::{Feature, FeatureCollection, Properties};
