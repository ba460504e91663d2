//! Database schema definitions

/// SQL to create the swift_codes table
pub const CREATE_SWIFT_CODES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS swift_codes (
    swift_code TEXT PRIMARY KEY CHECK (length(swift_code) = 11),
    country_iso2 TEXT NOT NULL CHECK (length(country_iso2) = 2),
    code_type TEXT NOT NULL CHECK (length(code_type) <= 5),
    name TEXT NOT NULL,
    address TEXT,
    town_name TEXT,
    country_name TEXT NOT NULL,
    is_headquarter INTEGER NOT NULL DEFAULT 0,
    time_zone TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_swift_codes_country ON swift_codes(country_iso2, is_headquarter, swift_code)",
];

/// Columns in the order every `SELECT` reads them
pub const RECORD_COLUMNS: &str = "swift_code, country_iso2, code_type, name, address, town_name, \
     country_name, is_headquarter, time_zone, created_at, updated_at";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_SWIFT_CODES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
