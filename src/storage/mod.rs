//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - swift_codes(swift_code, country_iso2, code_type, name, address, town_name,
//!   country_name, is_headquarter, time_zone, created_at, updated_at)
//!
//! The registry only talks to storage through `RecordStore`, so the
//! headquarters/branch rules never depend on SQL.

pub mod schema;
pub mod sqlite;

pub use sqlite::{CountryCount, SqliteStore, StoreStats};

use crate::Result;
use crate::code::{CountryCode, SwiftCode};
use crate::record::SwiftRecord;

/// Record store consumed by the registry service.
///
/// Implementations own no business logic. `insert` must report a primary key
/// collision as `Error::Duplicate` so the registry can classify it.
pub trait RecordStore: Send + Sync {
    /// Point lookup by primary key
    fn get(&self, code: &SwiftCode) -> Result<Option<SwiftRecord>>;

    /// All records of one country, headquarters first, then by code
    fn scan_by_country(&self, country: &CountryCode) -> Result<Vec<SwiftRecord>>;

    /// All records whose code starts with `prefix`, except `exclude`, ordered by code
    fn scan_by_prefix(&self, prefix: &str, exclude: &SwiftCode) -> Result<Vec<SwiftRecord>>;

    /// Insert a new record
    fn insert(&self, record: &SwiftRecord) -> Result<()>;

    /// Delete by primary key, returning the number of rows removed
    fn delete(&self, code: &SwiftCode) -> Result<usize>;
}
