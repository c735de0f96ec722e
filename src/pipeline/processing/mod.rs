// Core transforms: simplify, enrich, and nearby search

pub mod enrich;
pub mod nearby;
pub mod simplify;

pub use enrich::{enrich_collection, Enricher, EnrichmentStats, LookupEnricher, MatchOutcome, SchoolLookup};
pub use nearby::{format_grade_range, format_tuition, nearby_schools, GradeTier, NearbySchool};
pub use simplify::{AllowListProjector, Projector};
