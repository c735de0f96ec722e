use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use tracing::debug;

use crate::constants::{SCHOOL_LAT_COLUMN, SCHOOL_LON_COLUMN, SCHOOL_NAME_COLUMN};
use crate::domain::{SchoolDetails, SchoolRecord};
use crate::error::{Result, SchoolDataError};

/// A row of the grades CSV exactly as read; empty cells come through as `None`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchoolRow {
    pub school_name: String,
    #[serde(default)]
    pub school_lat: Option<String>,
    #[serde(default)]
    pub school_lon: Option<String>,
    #[serde(rename = "Grade", default)]
    pub grade: Option<String>,
    #[serde(rename = "Great Schools Rating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Tuition", default)]
    pub tuition: Option<String>,
    #[serde(rename = "Type", default)]
    pub school_type: Option<String>,
}

impl SchoolRow {
    pub fn new(school_name: &str, lat: &str, lon: &str) -> Self {
        Self {
            school_name: school_name.to_string(),
            school_lat: Some(lat.to_string()),
            school_lon: Some(lon.to_string()),
            ..Default::default()
        }
    }

    /// Convert to a lookup record; `None` when either coordinate is empty
    pub fn into_record(self) -> Option<SchoolRecord> {
        let lat = self.school_lat.filter(|s| !s.is_empty())?;
        let lon = self.school_lon.filter(|s| !s.is_empty())?;
        let details = SchoolDetails {
            grade: self.grade.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            tuition: self.tuition.unwrap_or_default(),
            school_type: self.school_type.unwrap_or_default(),
        };
        Some(SchoolRecord::new(&self.school_name, &lat, &lon, details))
    }
}

/// Read every row of a grades CSV with a header line.
///
/// Fails when the identity columns are missing from the header or a row
/// cannot be decoded; short rows are tolerated.
pub fn read_school_rows<R: Read>(reader: R) -> Result<Vec<SchoolRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in [SCHOOL_NAME_COLUMN, SCHOOL_LAT_COLUMN, SCHOOL_LON_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(SchoolDataError::MissingField(format!("CSV column '{}'", column)));
        }
    }

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        let row: SchoolRow = row?;
        rows.push(row);
    }
    debug!("Read {} rows from school CSV", rows.len());
    Ok(rows)
}
