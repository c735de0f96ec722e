use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::app::ports::{FeatureOutputPort, FeatureSourcePort};
use crate::pipeline::processing::{AllowListProjector, Projector};

/// Use case for reducing a feature collection to its display attributes
pub struct SimplifyUseCase {
    projector: Box<dyn Projector>,
    source: Box<dyn FeatureSourcePort>,
    output: Box<dyn FeatureOutputPort>,
}

/// Feature counts on either side of a simplify run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimplifyOutcome {
    pub input_features: usize,
    pub output_features: usize,
}

impl SimplifyUseCase {
    pub fn new(
        projector: Box<dyn Projector>,
        source: Box<dyn FeatureSourcePort>,
        output: Box<dyn FeatureOutputPort>,
    ) -> Self {
        Self {
            projector,
            source,
            output,
        }
    }

    /// Create a use case with the standard allow-list and `#private` style
    pub fn with_default_projector(source: Box<dyn FeatureSourcePort>, output: Box<dyn FeatureOutputPort>) -> Self {
        Self::new(Box::new(AllowListProjector::default()), source, output)
    }

    pub fn run(&self) -> Result<SimplifyOutcome> {
        let collection = self.source.load_features()?;
        info!("Loaded {} features", collection.len());

        let simplified = self.projector.project_collection(&collection);
        info!("Simplified to {} features", simplified.len());

        self.output.write_features(&simplified)?;
        crate::observability::metrics::simplify::features_projected(simplified.len());

        Ok(SimplifyOutcome {
            input_features: collection.len(),
            output_features: simplified.len(),
        })
    }
}
