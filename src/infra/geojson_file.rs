use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::app::ports::{FeatureOutputPort, FeatureSourcePort};
use crate::error::Result;
use crate::geo::FeatureCollection;

/// Read a whole GeoJSON feature collection into memory
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let file = File::open(path)?;
    let collection = serde_json::from_reader(BufReader::new(file))?;
    Ok(collection)
}

/// Write a feature collection so that `path` either keeps its previous
/// content or holds the complete new document.
///
/// The document goes to a temporary file next to `path` which is renamed
/// over it only after everything was flushed.
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, collection)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    // keep the permissions of a file being replaced
    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            fs::set_permissions(tmp.path(), existing.permissions())?;
        }
    }

    tmp.persist(path)?;
    debug!("Wrote {} features to {}", collection.len(), path.display());
    Ok(())
}

/// File-backed feature source and sink
#[derive(Debug, Clone)]
pub struct GeoJsonFile {
    path: PathBuf,
}

impl GeoJsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeatureSourcePort for GeoJsonFile {
    fn load_features(&self) -> anyhow::Result<FeatureCollection> {
        info!("Reading file: {}", self.path.display());
        read_feature_collection(&self.path)
            .with_context(|| format!("Error reading file {}", self.path.display()))
    }
}

impl FeatureOutputPort for GeoJsonFile {
    fn write_features(&self, collection: &FeatureCollection) -> anyhow::Result<()> {
        write_feature_collection(&self.path, collection)
            .with_context(|| format!("Error writing file {}", self.path.display()))?;
        info!("Successfully wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchoolDataError;
    use crate::geo::{Feature, Properties};
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> FeatureCollection {
        let mut props = Properties::new();
        props.insert("name".into(), json!("Sample"));
        FeatureCollection::new(vec![Feature::point(-73.0, 40.0, props)])
    }

    #[test]
    fn writes_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.geojson");

        write_feature_collection(&path, &sample()).unwrap();
        assert_eq!(read_feature_collection(&path).unwrap(), sample());

        // only the target is left behind
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn malformed_input_is_a_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        fs::write(&path, "{\"features\": [").unwrap();
        assert!(matches!(read_feature_collection(&path), Err(SchoolDataError::Json(_))));
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.geojson");
        assert!(matches!(read_feature_collection(&path), Err(SchoolDataError::Io(_))));
    }

    #[test]
    fn failed_write_keeps_previous_content() {
        let dir = tempdir().unwrap();
        // a directory where the output file should be makes the final rename fail
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "keep").unwrap();

        assert!(write_feature_collection(&path, &sample()).is_err());
        assert_eq!(fs::read_to_string(path.join("keep.txt")).unwrap(), "keep");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn port_adapter_round_trip() {
        let dir = tempdir().unwrap();
        let file = GeoJsonFile::new(dir.path().join("schools.geojson"));
        file.write_features(&sample()).unwrap();
        assert_eq!(file.load_features().unwrap().len(), 1);
    }
}
