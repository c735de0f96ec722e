use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::SchoolRowSourcePort;
use crate::pipeline::ingestion::{read_school_rows, SchoolRow};

/// Grades CSV on disk
#[derive(Debug, Clone)]
pub struct CsvSchoolFile {
    path: PathBuf,
}

impl CsvSchoolFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchoolRowSourcePort for CsvSchoolFile {
    fn load_school_rows(&self) -> anyhow::Result<Vec<SchoolRow>> {
        info!("Reading CSV data from {}", self.path.display());
        let file = File::open(&self.path)
            .with_context(|| format!("Error opening CSV file {}", self.path.display()))?;
        let rows = read_school_rows(BufReader::new(file))
            .with_context(|| format!("Error parsing CSV file {}", self.path.display()))?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_rows_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grades.csv");
        fs::write(&path, "school_name,school_lat,school_lon,Grade\nA,1,2,B\n").unwrap();

        let rows = CsvSchoolFile::new(&path).load_school_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].grade.as_deref(), Some("B"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = CsvSchoolFile::new("/no/such/grades.csv").load_school_rows().unwrap_err();
        assert!(format!("{err}").contains("/no/such/grades.csv"));
    }
}
