pub mod enrich_use_case;
pub mod ports;
pub mod simplify_use_case;

pub use enrich_use_case::{EnrichOutcome, EnrichUseCase};
pub use simplify_use_case::{SimplifyOutcome, SimplifyUseCase};
