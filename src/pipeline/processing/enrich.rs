use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::constants::DEFAULT_MATCH_RADIUS_MILES;
use crate::domain::{normalize_name, LookupKey, SchoolDetails, SchoolRecord};
use crate::geo::{Feature, FeatureCollection, GeoPoint};
use crate::pipeline::ingestion::SchoolRow;

/// Grades CSV records indexed for exact and by-name matching.
///
/// Records keep the order they were first inserted in. A later record with an
/// already-seen key replaces the earlier one in place (last write wins).
#[derive(Debug, Default)]
pub struct SchoolLookup {
    records: Vec<SchoolRecord>,
    by_key: HashMap<LookupKey, usize>,
    by_name: HashMap<String, Vec<usize>>,
    skipped_rows: usize,
}

impl SchoolLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lookup from CSV rows, skipping rows with an empty coordinate
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = SchoolRow>,
    {
        let mut lookup = Self::new();
        for row in rows {
            match row.into_record() {
                Some(record) => lookup.insert(record),
                None => lookup.skipped_rows += 1,
            }
        }

        let unlocated = lookup.records.iter().filter(|r| r.location.is_none()).count();
        if unlocated > 0 {
            warn!(
                "{} school rows have non-numeric coordinates and can only match exactly",
                unlocated
            );
        }
        debug!(
            "Built school lookup with {} records ({} rows skipped)",
            lookup.len(),
            lookup.skipped_rows
        );
        lookup
    }

    pub fn insert(&mut self, record: SchoolRecord) {
        let key = record.key();
        match self.by_key.get(&key).copied() {
            Some(idx) => {
                let previous_name = self.records[idx].name.clone();
                if previous_name != record.name {
                    if let Some(bucket) = self.by_name.get_mut(&previous_name) {
                        bucket.retain(|&i| i != idx);
                    }
                    let bucket = self.by_name.entry(record.name.clone()).or_default();
                    let pos = bucket.partition_point(|&i| i < idx);
                    bucket.insert(pos, idx);
                }
                self.records[idx] = record;
            }
            None => {
                let idx = self.records.len();
                self.by_name.entry(record.name.clone()).or_default().push(idx);
                self.by_key.insert(key, idx);
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, key: &LookupKey) -> Option<&SchoolRecord> {
        self.by_key.get(key).map(|&idx| &self.records[idx])
    }

    /// Records whose normalized name equals `normalized_name`, in lookup order
    pub fn named<'a>(&'a self, normalized_name: &str) -> impl Iterator<Item = &'a SchoolRecord> + 'a {
        self.by_name
            .get(normalized_name)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[SchoolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped during construction for an empty coordinate
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Pick the candidate with the smallest distance strictly below `threshold`.
///
/// Equal distances keep the earliest candidate. NaN distances never win.
pub fn closest_within<T, I>(candidates: I, threshold: f64) -> Option<(T, f64)>
where
    I: IntoIterator<Item = (T, f64)>,
{
    let mut best = None;
    let mut min_distance = threshold;
    for (candidate, distance) in candidates {
        if distance < min_distance {
            min_distance = distance;
            best = Some((candidate, distance));
        }
    }
    best
}

/// How a feature was joined to the grades data
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MatchOutcome {
    /// Name and raw coordinates matched a row exactly
    Exact,
    /// Same name within the match radius
    Proximity { distance_miles: f64 },
    Unmatched,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchOutcome::Unmatched)
    }
}

/// Trait for enriching features with school details
pub trait Enricher {
    /// Write the enrichment properties onto `feature` and report how it matched
    fn enrich(&self, feature: &mut Feature) -> MatchOutcome;
}

/// Enricher backed by a [`SchoolLookup`]: exact key first, then the closest
/// same-name record inside the match radius
pub struct LookupEnricher<'a> {
    lookup: &'a SchoolLookup,
    match_radius_miles: f64,
}

impl<'a> LookupEnricher<'a> {
    pub fn new(lookup: &'a SchoolLookup) -> Self {
        Self::with_radius(lookup, DEFAULT_MATCH_RADIUS_MILES)
    }

    pub fn with_radius(lookup: &'a SchoolLookup, match_radius_miles: f64) -> Self {
        Self {
            lookup,
            match_radius_miles,
        }
    }

    /// Find the record a feature should take its details from
    pub fn find_match(&self, feature: &Feature) -> Option<(&'a SchoolRecord, MatchOutcome)> {
        let key = LookupKey::for_feature(feature)?;
        if let Some(record) = self.lookup.get(&key) {
            return Some((record, MatchOutcome::Exact));
        }

        let origin = feature.location()?;
        self.closest_named(&normalize_name(feature.name()), &origin)
            .map(|(record, distance_miles)| (record, MatchOutcome::Proximity { distance_miles }))
    }

    fn closest_named(&self, normalized_name: &str, origin: &GeoPoint) -> Option<(&'a SchoolRecord, f64)> {
        let candidates = self.lookup.named(normalized_name).filter_map(|record| {
            let location = record.location?;
            Some((record, origin.distance_to(&location)))
        });
        closest_within(candidates, self.match_radius_miles)
    }
}

impl Enricher for LookupEnricher<'_> {
    fn enrich(&self, feature: &mut Feature) -> MatchOutcome {
        SchoolDetails::default().write_to(&mut feature.properties);

        if feature.coordinate_numbers().is_none() {
            warn!("Feature '{}' has no point coordinates; leaving it unmatched", feature.name());
            return MatchOutcome::Unmatched;
        }

        match self.find_match(feature) {
            Some((record, outcome)) => {
                record.details.write_to(&mut feature.properties);
                outcome
            }
            None => MatchOutcome::Unmatched,
        }
    }
}

/// Match/non-match counts for one enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    pub exact_matches: usize,
    pub proximity_matches: usize,
    pub unmatched: usize,
}

impl EnrichmentStats {
    pub fn record(&mut self, outcome: &MatchOutcome) {
        match outcome {
            MatchOutcome::Exact => self.exact_matches += 1,
            MatchOutcome::Proximity { .. } => self.proximity_matches += 1,
            MatchOutcome::Unmatched => self.unmatched += 1,
        }
    }

    pub fn matches(&self) -> usize {
        self.exact_matches + self.proximity_matches
    }

    pub fn total(&self) -> usize {
        self.matches() + self.unmatched
    }
}

/// Enrich every feature of `collection` in place, preserving order
pub fn enrich_collection(enricher: &dyn Enricher, collection: &mut FeatureCollection) -> EnrichmentStats {
    let mut stats = EnrichmentStats::default();
    for feature in &mut collection.features {
        let outcome = enricher.enrich(feature);
        stats.record(&outcome);
    }
    stats
}
