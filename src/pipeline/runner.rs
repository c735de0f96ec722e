use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::app::{EnrichOutcome, EnrichUseCase, SimplifyOutcome, SimplifyUseCase};
use crate::config::Config;
use crate::geo::GeoPoint;
use crate::infra::backup::ensure_backup;
use crate::infra::geojson_file::read_feature_collection;
use crate::infra::{CsvSchoolFile, GeoJsonFile};
use crate::observability::metrics;
use crate::pipeline::processing::{nearby_schools, NearbySchool};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Input and output file sizes of a simplify run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    pub original_bytes: u64,
    pub simplified_bytes: u64,
}

impl SizeReport {
    pub fn measure(original: &Path, simplified: &Path) -> std::io::Result<Self> {
        Ok(Self {
            original_bytes: fs::metadata(original)?.len(),
            simplified_bytes: fs::metadata(simplified)?.len(),
        })
    }

    /// Like `measure`, but a failure only costs the report, not the run
    pub fn measure_or_skip(original: &Path, simplified: &Path) -> Option<Self> {
        match Self::measure(original, simplified) {
            Ok(size) => Some(size),
            Err(e) => {
                warn!("Skipping size report, could not read file sizes: {}", e);
                None
            }
        }
    }

    pub fn original_mb(&self) -> f64 {
        self.original_bytes as f64 / BYTES_PER_MB
    }

    pub fn simplified_mb(&self) -> f64 {
        self.simplified_bytes as f64 / BYTES_PER_MB
    }

    pub fn reduction_mb(&self) -> f64 {
        self.original_mb() - self.simplified_mb()
    }

    /// Share of the original size saved, in percent; 0 for an empty original
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.simplified_bytes as f64 / self.original_bytes as f64) * 100.0
    }
}

/// Result of a complete simplify run
#[derive(Debug, Clone, Serialize)]
pub struct SimplifyResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: SimplifyOutcome,
    /// `None` when the file sizes could not be read after the write
    pub size: Option<SizeReport>,
    pub finished_at: DateTime<Utc>,
}

/// Result of a complete enrich run
#[derive(Debug, Clone, Serialize)]
pub struct EnrichResult {
    pub csv_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: EnrichOutcome,
    /// Set when this run created the backup of the input
    pub backup_path: Option<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

/// Wires the use cases to the configured files
pub struct Pipeline;

impl Pipeline {
    /// Simplify the full schools file into the display file
    #[instrument(skip(config))]
    pub fn simplify(config: &Config) -> Result<SimplifyResult> {
        let started = Instant::now();
        let input_path = config.paths.schools_geojson();
        let output_path = config.paths.simplified_geojson();

        let use_case = SimplifyUseCase::with_default_projector(
            Box::new(GeoJsonFile::new(&input_path)),
            Box::new(GeoJsonFile::new(&output_path)),
        );
        let outcome = use_case.run()?;

        let size = SizeReport::measure_or_skip(&input_path, &output_path);
        metrics::simplify::duration(started.elapsed().as_secs_f64());

        Ok(SimplifyResult {
            input_path,
            output_path,
            outcome,
            size,
            finished_at: Utc::now(),
        })
    }

    /// Join the grades CSV onto the simplified schools file
    #[instrument(skip(config))]
    pub fn enrich(config: &Config) -> Result<EnrichResult> {
        let started = Instant::now();
        let csv_path = config.paths.school_grades_csv();
        let input_path = config.paths.simplified_geojson();
        let output_path = config.paths.enriched_geojson();

        let use_case = EnrichUseCase::new(
            Box::new(CsvSchoolFile::new(&csv_path)),
            Box::new(GeoJsonFile::new(&input_path)),
            Box::new(GeoJsonFile::new(&output_path)),
        )
        .with_match_radius(config.enrich.match_radius_miles);

        // Copy the input before the run: the output may be the input itself
        let backup_path = if config.enrich.create_backup {
            ensure_backup(&input_path)
                .with_context(|| format!("Failed to back up {}", input_path.display()))?
        } else {
            None
        };

        let outcome = match use_case.run() {
            Ok(outcome) => outcome,
            Err(e) => {
                // a backup only exists after a successful write
                if let Some(backup) = &backup_path {
                    if let Err(remove_err) = fs::remove_file(backup) {
                        warn!("Failed to remove backup {}: {}", backup.display(), remove_err);
                    }
                }
                return Err(e);
            }
        };
        info!("Saved updated GeoJSON to {}", output_path.display());
        metrics::enrich::duration(started.elapsed().as_secs_f64());

        Ok(EnrichResult {
            csv_path,
            input_path,
            output_path,
            outcome,
            backup_path,
            finished_at: Utc::now(),
        })
    }

    /// Schools near `references`, read from `input` or the enriched file
    #[instrument(skip(config, references), fields(points = references.len()))]
    pub fn nearby(
        config: &Config,
        input: Option<&Path>,
        references: &[GeoPoint],
        radius_miles: Option<f64>,
    ) -> Result<Vec<NearbySchool>> {
        let path = input
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.paths.enriched_geojson());
        let radius = radius_miles.unwrap_or(config.nearby.radius_miles);

        let collection = read_feature_collection(&path)
            .with_context(|| format!("Error reading file {}", path.display()))?;
        let hits = nearby_schools(&collection, references, radius);
        info!("Found {} schools within {} miles", hits.len(), radius);
        metrics::nearby::hits(hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_report_math() {
        let report = SizeReport {
            original_bytes: 4 * 1024 * 1024,
            simplified_bytes: 1024 * 1024,
        };
        assert_eq!(report.original_mb(), 4.0);
        assert_eq!(report.simplified_mb(), 1.0);
        assert_eq!(report.reduction_mb(), 3.0);
        assert_eq!(report.reduction_percent(), 75.0);
    }

    #[test]
    fn empty_original_reports_no_reduction() {
        let report = SizeReport {
            original_bytes: 0,
            simplified_bytes: 10,
        };
        assert_eq!(report.reduction_percent(), 0.0);
    }

    #[test]
    fn unreadable_sizes_skip_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let written = dir.path().join("simplified.geojson");
        fs::write(&written, "{}").unwrap();

        assert_eq!(SizeReport::measure_or_skip(&dir.path().join("gone.geojson"), &written), None);

        let original = dir.path().join("original.geojson");
        fs::write(&original, "{\"features\": []}").unwrap();
        let report = SizeReport::measure_or_skip(&original, &written).unwrap();
        assert_eq!(report.original_bytes, 16);
        assert_eq!(report.simplified_bytes, 2);
    }
}
