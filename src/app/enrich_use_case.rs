use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::app::ports::{FeatureOutputPort, FeatureSourcePort, SchoolRowSourcePort};
use crate::constants::DEFAULT_MATCH_RADIUS_MILES;
use crate::observability::metrics;
use crate::pipeline::processing::{enrich_collection, EnrichmentStats, LookupEnricher, SchoolLookup};

/// Use case for joining the grades CSV onto a feature collection
pub struct EnrichUseCase {
    schools: Box<dyn SchoolRowSourcePort>,
    features: Box<dyn FeatureSourcePort>,
    output: Box<dyn FeatureOutputPort>,
    match_radius_miles: f64,
}

/// What an enrich run read and how the features matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrichOutcome {
    pub rows_read: usize,
    pub lookup_records: usize,
    pub skipped_rows: usize,
    pub stats: EnrichmentStats,
}

impl EnrichUseCase {
    pub fn new(
        schools: Box<dyn SchoolRowSourcePort>,
        features: Box<dyn FeatureSourcePort>,
        output: Box<dyn FeatureOutputPort>,
    ) -> Self {
        Self {
            schools,
            features,
            output,
            match_radius_miles: DEFAULT_MATCH_RADIUS_MILES,
        }
    }

    pub fn with_match_radius(mut self, match_radius_miles: f64) -> Self {
        self.match_radius_miles = match_radius_miles;
        self
    }

    pub fn run(&self) -> Result<EnrichOutcome> {
        let rows = self.schools.load_school_rows()?;
        let rows_read = rows.len();
        let lookup = SchoolLookup::from_rows(rows);
        info!("Found {} schools in the CSV file", lookup.len());
        metrics::lookup::rows_loaded(lookup.len());
        metrics::lookup::rows_skipped(lookup.skipped_rows());

        let mut collection = self.features.load_features()?;
        let enricher = LookupEnricher::with_radius(&lookup, self.match_radius_miles);
        let stats = enrich_collection(&enricher, &mut collection);
        info!(
            exact = stats.exact_matches,
            proximity = stats.proximity_matches,
            unmatched = stats.unmatched,
            "Enriched {} features",
            stats.total()
        );

        self.output.write_features(&collection)?;
        metrics::enrich::matches("exact", stats.exact_matches);
        metrics::enrich::matches("proximity", stats.proximity_matches);
        metrics::enrich::unmatched(stats.unmatched);

        Ok(EnrichOutcome {
            rows_read,
            lookup_records: lookup.len(),
            skipped_rows: lookup.skipped_rows(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Feature, FeatureCollection, Properties};
    use crate::pipeline::ingestion::SchoolRow;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct StaticRows(Vec<SchoolRow>);

    impl SchoolRowSourcePort for StaticRows {
        fn load_school_rows(&self) -> Result<Vec<SchoolRow>> {
            Ok(self.0.clone())
        }
    }

    struct StaticSource(FeatureCollection);

    impl FeatureSourcePort for StaticSource {
        fn load_features(&self) -> Result<FeatureCollection> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl FeatureSourcePort for FailingSource {
        fn load_features(&self) -> Result<FeatureCollection> {
            anyhow::bail!("malformed geojson")
        }
    }

    #[derive(Clone, Default)]
    struct MockOutput {
        written: Arc<Mutex<Vec<FeatureCollection>>>,
    }

    impl FeatureOutputPort for MockOutput {
        fn write_features(&self, collection: &FeatureCollection) -> Result<()> {
            self.written.lock().unwrap().push(collection.clone());
            Ok(())
        }
    }

    fn school(name: &str, lon: f64, lat: f64) -> Feature {
        let mut props = Properties::new();
        props.insert("name".into(), json!(name));
        Feature::point(lon, lat, props)
    }

    #[test]
    fn counts_matches_and_writes_every_feature() {
        let rows = vec![
            SchoolRow {
                grade: Some("A".into()),
                tuition: Some("10000".into()),
                ..SchoolRow::new("ABC SCHOOL", "40.0", "-73.0")
            },
            SchoolRow::new("No Coordinates", "", ""),
        ];
        let features = FeatureCollection::new(vec![school("abc school", -73.0, 40.0), school("Unknown", 0.0, 0.0)]);
        let output = MockOutput::default();

        let use_case = EnrichUseCase::new(
            Box::new(StaticRows(rows)),
            Box::new(StaticSource(features)),
            Box::new(output.clone()),
        );
        let outcome = use_case.run().unwrap();

        assert_eq!(outcome.rows_read, 2);
        assert_eq!(outcome.lookup_records, 1);
        assert_eq!(outcome.skipped_rows, 1);
        assert_eq!(outcome.stats.matches(), 1);
        assert_eq!(outcome.stats.unmatched, 1);

        let written = output.written.lock().unwrap();
        let enriched = &written[0];
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched.features[0].property_str("Grade"), Some("A"));
        assert_eq!(enriched.features[0].property_str("Tuition"), Some("10000"));
        assert_eq!(enriched.features[1].property_str("Grade"), Some(""));
    }

    #[test]
    fn match_radius_is_configurable() {
        // about 0.35 miles north
        let rows = vec![SchoolRow {
            grade: Some("B".into()),
            ..SchoolRow::new("Hill", "40.005", "-73.0")
        }];
        let features = FeatureCollection::new(vec![school("Hill", -73.0, 40.0)]);

        let narrow = EnrichUseCase::new(
            Box::new(StaticRows(rows.clone())),
            Box::new(StaticSource(features.clone())),
            Box::new(MockOutput::default()),
        );
        assert_eq!(narrow.run().unwrap().stats.unmatched, 1);

        let wide = EnrichUseCase::new(
            Box::new(StaticRows(rows)),
            Box::new(StaticSource(features)),
            Box::new(MockOutput::default()),
        )
        .with_match_radius(0.5);
        assert_eq!(wide.run().unwrap().stats.proximity_matches, 1);
    }

    #[test]
    fn feature_read_failure_writes_nothing() {
        let output = MockOutput::default();
        let use_case = EnrichUseCase::new(
            Box::new(StaticRows(Vec::new())),
            Box::new(FailingSource),
            Box::new(output.clone()),
        );
        assert!(use_case.run().is_err());
        assert!(output.written.lock().unwrap().is_empty());
    }
}
