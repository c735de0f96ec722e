// File-system adapters for the app ports

pub mod backup;
pub mod csv_school_file;
pub mod geojson_file;

pub use csv_school_file::CsvSchoolFile;
pub use geojson_file::GeoJsonFile;
