/// Property names kept by the simplify step, in output order
pub const SIMPLIFIED_FIELDS: [&str; 8] = [
    "name",
    "address",
    "city",
    "state",
    "zip",
    "enrollment",
    "st_grade",
    "end_grade",
];

/// Display style stamped onto every simplified feature
pub const STYLE_URL_KEY: &str = "styleUrl";
pub const PRIVATE_STYLE_URL: &str = "#private";

// Enrichment properties written onto every feature (also the CSV column names)
pub const GRADE_FIELD: &str = "Grade";
pub const RATING_FIELD: &str = "Great Schools Rating";
pub const TUITION_FIELD: &str = "Tuition";
pub const TYPE_FIELD: &str = "Type";

pub const ENRICHMENT_FIELDS: [&str; 4] = [GRADE_FIELD, RATING_FIELD, TUITION_FIELD, TYPE_FIELD];

// CSV identity columns
pub const SCHOOL_NAME_COLUMN: &str = "school_name";
pub const SCHOOL_LAT_COLUMN: &str = "school_lat";
pub const SCHOOL_LON_COLUMN: &str = "school_lon";

/// Feature property holding the school name
pub const NAME_PROPERTY: &str = "name";

/// Mean Earth radius in miles used for all distance calculations
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Proximity matches must be strictly closer than this
pub const DEFAULT_MATCH_RADIUS_MILES: f64 = 0.1;

/// Default radius for nearby school searches
pub const DEFAULT_NEARBY_RADIUS_MILES: f64 = 10.0;

/// Grade value used upstream to hide a school from search results
pub const REMOVED_GRADE: &str = "Remove";

pub const BACKUP_EXTENSION: &str = "geojson.bak";
