use serde::Serialize;
use std::collections::HashSet;

use crate::constants::{GRADE_FIELD, REMOVED_GRADE};
use crate::geo::{Feature, FeatureCollection, GeoPoint};

/// A school found near one of the reference points
#[derive(Debug, Clone, Serialize)]
pub struct NearbySchool {
    pub feature: Feature,
    pub distance_miles: f64,
    /// The reference point the school was found from
    pub reference: GeoPoint,
}

/// Schools within `radius_miles` (inclusive) of any reference point.
///
/// Schools graded "Remove" are hidden. A school close to several reference
/// points is reported once, for the first point that finds it. Results are
/// ordered nearest first.
pub fn nearby_schools(
    collection: &FeatureCollection,
    references: &[GeoPoint],
    radius_miles: f64,
) -> Vec<NearbySchool> {
    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    for reference in references {
        for feature in &collection.features {
            if feature.property_str(GRADE_FIELD) == Some(REMOVED_GRADE) {
                continue;
            }
            let Some(location) = feature.location() else {
                continue;
            };
            let distance_miles = reference.distance_to(&location);
            if distance_miles > radius_miles {
                continue;
            }
            if !seen.insert(school_identity(feature)) {
                continue;
            }
            hits.push(NearbySchool {
                feature: feature.clone(),
                distance_miles,
                reference: *reference,
            });
        }
    }

    hits.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    hits
}

fn school_identity(feature: &Feature) -> String {
    let coordinates = feature
        .coordinate_numbers()
        .map(|(lon, lat)| format!("{},{}", lon, lat))
        .unwrap_or_default();
    format!("{}_{}", feature.name(), coordinates)
}

fn grade_label(code: &str) -> &str {
    match code {
        "PK" => "Pre-K",
        "KG" => "Kindergarten",
        "1" => "1st",
        "2" => "2nd",
        "3" => "3rd",
        "4" => "4th",
        "5" => "5th",
        "6" => "6th",
        "7" => "7th",
        "8" => "8th",
        "9" => "9th",
        "10" => "10th",
        "11" => "11th",
        "12" => "12th",
        other => other,
    }
}

/// Human readable grade span, e.g. `PK`/`8` becomes "Pre-K - 8th"
pub fn format_grade_range(start_grade: &str, end_grade: &str) -> String {
    let start = grade_label(start_grade);
    let end = grade_label(end_grade);
    match (start.is_empty(), end.is_empty()) {
        (true, true) => "N/A".to_string(),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (false, false) => format!("{} - {}", start, end),
    }
}

/// Tuition for display: numeric values become `$12,500`, anything else is
/// shown as written, and an empty value is "N/A"
pub fn format_tuition(tuition: &str) -> String {
    let raw = tuition.trim();
    if raw.is_empty() {
        return "N/A".to_string();
    }

    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => format!("${}", group_thousands(amount)),
        _ => raw.to_string(),
    }
}

fn group_thousands(amount: f64) -> String {
    let cents = (amount * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match cents % 100 {
        0 => grouped,
        fraction => format!("{}.{:02}", grouped, fraction),
    }
}

/// Coarse bucket of a letter grade, used to colour map pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GradeTier {
    Top,
    Middle,
    Low,
    Unrated,
}

impl GradeTier {
    pub fn from_grade(grade: &str) -> Self {
        if grade.is_empty() || grade == "N/A" || grade == "Unknown" {
            return GradeTier::Unrated;
        }
        match grade.chars().next() {
            Some('A') => GradeTier::Top,
            Some('B') => GradeTier::Middle,
            Some('C') | Some('D') => GradeTier::Low,
            _ => GradeTier::Unrated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeTier::Top => "top",
            GradeTier::Middle => "middle",
            GradeTier::Low => "low",
            GradeTier::Unrated => "unrated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EARTH_RADIUS_MILES;
    use crate::geo::Properties;
    use serde_json::json;

    fn school(name: &str, lon: f64, lat: f64, grade: &str) -> Feature {
        let mut props = Properties::new();
        props.insert("name".into(), json!(name));
        props.insert("Grade".into(), json!(grade));
        Feature::point(lon, lat, props)
    }

    fn degrees_for(miles: f64) -> f64 {
        miles / (EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0)
    }

    #[test]
    fn finds_schools_within_radius_nearest_first() {
        let home = GeoPoint::new(47.0, -122.0);
        let collection = FeatureCollection::new(vec![
            school("Far", -122.0, 47.0 + degrees_for(8.0), "A"),
            school("Outside", -122.0, 47.0 + degrees_for(12.0), "A"),
            school("Near", -122.0, 47.0 + degrees_for(1.0), "B"),
        ]);

        let hits = nearby_schools(&collection, &[home], 10.0);
        let names: Vec<&str> = hits.iter().map(|h| h.feature.name()).collect();
        assert_eq!(names, ["Near", "Far"]);
        assert!((hits[0].distance_miles - 1.0).abs() < 1e-6);
        assert_eq!(hits[0].reference, GeoPoint::new(47.0, -122.0));
    }

    #[test]
    fn removed_schools_are_hidden() {
        let collection = FeatureCollection::new(vec![school("Gone", 0.0, 0.0, "Remove")]);
        assert!(nearby_schools(&collection, &[GeoPoint::new(0.0, 0.0)], 10.0).is_empty());
    }

    #[test]
    fn schools_near_several_points_are_reported_once() {
        let collection = FeatureCollection::new(vec![school("Shared", 0.0, 0.0, "")]);
        let refs = [GeoPoint::new(0.0, 0.01), GeoPoint::new(0.0, -0.01)];
        let hits = nearby_schools(&collection, &refs, 10.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reference, GeoPoint::new(0.0, 0.01));
    }

    #[test]
    fn features_without_coordinates_are_ignored() {
        let collection = FeatureCollection::new(vec![Feature::new(json!(null), Properties::new())]);
        assert!(nearby_schools(&collection, &[GeoPoint::new(0.0, 0.0)], 10.0).is_empty());
    }

    #[test]
    fn grade_range_formatting() {
        assert_eq!(format_grade_range("PK", "8"), "Pre-K - 8th");
        assert_eq!(format_grade_range("KG", "12"), "Kindergarten - 12th");
        assert_eq!(format_grade_range("", "3"), "3rd");
        assert_eq!(format_grade_range("9", ""), "9th");
        assert_eq!(format_grade_range("", ""), "N/A");
        assert_eq!(format_grade_range("UG", "13"), "UG - 13");
    }

    #[test]
    fn tuition_formatting() {
        assert_eq!(format_tuition("12500"), "$12,500");
        assert_eq!(format_tuition("$1,234,567"), "$1,234,567");
        assert_eq!(format_tuition("950"), "$950");
        assert_eq!(format_tuition("10000.5"), "$10,000.50");
        assert_eq!(format_tuition(" 0 "), "$0");
        assert_eq!(format_tuition("Contact school"), "Contact school");
        assert_eq!(format_tuition(""), "N/A");
    }

    #[test]
    fn grade_tiers() {
        assert_eq!(GradeTier::from_grade("A+"), GradeTier::Top);
        assert_eq!(GradeTier::from_grade("B-"), GradeTier::Middle);
        assert_eq!(GradeTier::from_grade("C"), GradeTier::Low);
        assert_eq!(GradeTier::from_grade("D+"), GradeTier::Low);
        assert_eq!(GradeTier::from_grade("N/A"), GradeTier::Unrated);
        assert_eq!(GradeTier::from_grade("Unknown"), GradeTier::Unrated);
        assert_eq!(GradeTier::from_grade("F"), GradeTier::Unrated);
        assert_eq!(GradeTier::from_grade(""), GradeTier::Unrated);
    }
}
