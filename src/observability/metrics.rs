//! Metrics for the school data pipelines.
//!
//! Everything goes through the `metrics` facade. No recorder is installed
//! here; a host program that installs one (Prometheus, statsd, ...) picks
//! these up automatically.

use std::fmt;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Simplify metrics
    SimplifyFeaturesProjected,
    SimplifyDuration,

    // Lookup metrics
    LookupRowsLoaded,
    LookupRowsSkipped,

    // Enrich metrics
    EnrichMatches,
    EnrichUnmatched,
    EnrichDuration,

    // Nearby metrics
    NearbyHits,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SimplifyFeaturesProjected => "schools_features_projected_total",
            MetricName::SimplifyDuration => "schools_simplify_duration_seconds",
            MetricName::LookupRowsLoaded => "schools_lookup_rows_loaded_total",
            MetricName::LookupRowsSkipped => "schools_lookup_rows_skipped_total",
            MetricName::EnrichMatches => "schools_enrich_matches_total",
            MetricName::EnrichUnmatched => "schools_enrich_unmatched_total",
            MetricName::EnrichDuration => "schools_enrich_duration_seconds",
            MetricName::NearbyHits => "schools_nearby_hits_total",
        }
    }

    /// Returns (phase, description)
    pub fn metadata(&self) -> (&'static str, &'static str) {
        match self {
            MetricName::SimplifyFeaturesProjected => ("simplify", "Features written by the simplify step"),
            MetricName::SimplifyDuration => ("simplify", "Simplify run duration"),
            MetricName::LookupRowsLoaded => ("lookup", "CSV rows inserted into the school lookup"),
            MetricName::LookupRowsSkipped => ("lookup", "CSV rows skipped for missing coordinates"),
            MetricName::EnrichMatches => ("enrich", "Features matched to a CSV row, by method"),
            MetricName::EnrichUnmatched => ("enrich", "Features with no CSV match"),
            MetricName::EnrichDuration => ("enrich", "Enrich run duration"),
            MetricName::NearbyHits => ("nearby", "Schools returned by nearby searches"),
        }
    }
}

pub mod simplify {
    use super::MetricName;

    pub fn features_projected(count: usize) {
        ::metrics::counter!(MetricName::SimplifyFeaturesProjected.as_str()).increment(count as u64);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::SimplifyDuration.as_str()).record(secs);
    }
}

pub mod lookup {
    use super::MetricName;

    pub fn rows_loaded(count: usize) {
        ::metrics::counter!(MetricName::LookupRowsLoaded.as_str()).increment(count as u64);
    }

    pub fn rows_skipped(count: usize) {
        ::metrics::counter!(MetricName::LookupRowsSkipped.as_str()).increment(count as u64);
    }
}

pub mod enrich {
    use super::MetricName;

    /// Record matches for one method label ("exact" or "proximity")
    pub fn matches(method: &'static str, count: usize) {
        ::metrics::counter!(MetricName::EnrichMatches.as_str(), "method" => method).increment(count as u64);
    }

    pub fn unmatched(count: usize) {
        ::metrics::counter!(MetricName::EnrichUnmatched.as_str()).increment(count as u64);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::EnrichDuration.as_str()).record(secs);
    }
}

pub mod nearby {
    use super::MetricName;

    pub fn hits(count: usize) {
        ::metrics::counter!(MetricName::NearbyHits.as_str()).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        assert_eq!(MetricName::EnrichMatches.to_string(), "schools_enrich_matches_total");
        assert_eq!(MetricName::SimplifyDuration.metadata().0, "simplify");
    }

    #[test]
    fn names_are_unique_and_described() {
        let all = [
            MetricName::SimplifyFeaturesProjected,
            MetricName::SimplifyDuration,
            MetricName::LookupRowsLoaded,
            MetricName::LookupRowsSkipped,
            MetricName::EnrichMatches,
            MetricName::EnrichUnmatched,
            MetricName::EnrichDuration,
            MetricName::NearbyHits,
        ];
        let names: std::collections::HashSet<&str> = all.iter().map(MetricName::as_str).collect();
        assert_eq!(names.len(), all.len());

        for metric in all {
            let (phase, description) = metric.metadata();
            assert!(metric.as_str().starts_with("schools_"), "{metric}");
            assert!(["simplify", "lookup", "enrich", "nearby"].contains(&phase), "{metric}");
            assert!(!description.is_empty(), "{metric}");
        }
    }
}
