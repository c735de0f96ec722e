use anyhow::Result;

use crate::geo::FeatureCollection;
use crate::pipeline::ingestion::SchoolRow;

/// Somewhere a feature collection can be loaded from
pub trait FeatureSourcePort {
    fn load_features(&self) -> Result<FeatureCollection>;
}

/// Somewhere a finished feature collection is written to
pub trait FeatureOutputPort {
    fn write_features(&self, collection: &FeatureCollection) -> Result<()>;
}

/// Source of grades CSV rows
pub trait SchoolRowSourcePort {
    fn load_school_rows(&self) -> Result<Vec<SchoolRow>>;
}
