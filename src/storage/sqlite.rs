//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use serde::Serialize;
use crate::{Error, Result};
use crate::code::{CountryCode, SwiftCode};
use crate::record::SwiftRecord;
use super::{schema, RecordStore};

/// SQLite-backed storage for SWIFT records
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn();
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // A panic while holding the lock cannot leave a half-applied statement
    // behind, so a poisoned connection is still usable.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn query_records(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<SwiftRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let records = stmt
            .query_map(params, row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    // ========== Bulk Operations ==========

    /// Replace the whole table with `records` in one transaction.
    ///
    /// Rows are written in groups of `batch_size`; `on_batch` is called with
    /// the number of rows written so far after each group.
    pub fn replace_all(
        &self,
        records: &[SwiftRecord],
        batch_size: usize,
        mut on_batch: impl FnMut(usize),
    ) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM swift_codes", [])?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for batch in records.chunks(batch_size.max(1)) {
                for record in batch {
                    execute_insert(&mut stmt, record)
                        .map_err(|e| classify_insert_error(e, &record.swift_code))?;
                }
                written += batch.len();
                on_batch(written);
            }
        }

        tx.commit()?;
        Ok(written)
    }

    /// Count all records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn().query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count headquarters records
    pub fn count_headquarters(&self) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM swift_codes WHERE is_headquarter = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Record count per country, ordered by country code
    pub fn count_by_country(&self) -> Result<Vec<CountryCount>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT country_iso2, MIN(country_name), COUNT(*) FROM swift_codes GROUP BY country_iso2 ORDER BY country_iso2",
        )?;

        let counts = stmt
            .query_map([], |row| {
                let iso: String = row.get(0)?;
                let country_iso2 = CountryCode::parse(&iso).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
                })?;
                let count: i64 = row.get(2)?;
                Ok(CountryCount {
                    country_iso2,
                    country_name: row.get(1)?,
                    count: count as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(counts)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let records = self.count()?;
        let headquarters = self.count_headquarters()?;
        Ok(StoreStats {
            records,
            headquarters,
            branches: records - headquarters,
            countries: self.count_by_country()?.len(),
        })
    }
}

impl RecordStore for SqliteStore {
    fn get(&self, code: &SwiftCode) -> Result<Option<SwiftRecord>> {
        let sql = format!("SELECT {} FROM swift_codes WHERE swift_code = ?1", schema::RECORD_COLUMNS);
        self.conn()
            .query_row(&sql, [code.as_str()], row_to_record)
            .optional()
            .map_err(Into::into)
    }

    fn scan_by_country(&self, country: &CountryCode) -> Result<Vec<SwiftRecord>> {
        let sql = format!(
            "SELECT {} FROM swift_codes WHERE country_iso2 = ?1 ORDER BY is_headquarter DESC, swift_code ASC",
            schema::RECORD_COLUMNS
        );
        self.query_records(&sql, [country.as_str()])
    }

    fn scan_by_prefix(&self, prefix: &str, exclude: &SwiftCode) -> Result<Vec<SwiftRecord>> {
        let sql = format!(
            "SELECT {} FROM swift_codes WHERE substr(swift_code, 1, ?2) = ?1 AND swift_code <> ?3 ORDER BY swift_code",
            schema::RECORD_COLUMNS
        );
        self.query_records(&sql, params![prefix, prefix.len() as i64, exclude.as_str()])
    }

    fn insert(&self, record: &SwiftRecord) -> Result<()> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(INSERT_SQL)?;
        execute_insert(&mut stmt, record).map_err(|e| classify_insert_error(e, &record.swift_code))?;
        Ok(())
    }

    fn delete(&self, code: &SwiftCode) -> Result<usize> {
        let removed = self.conn().execute("DELETE FROM swift_codes WHERE swift_code = ?1", [code.as_str()])?;
        Ok(removed)
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO swift_codes (swift_code, country_iso2, code_type, name, address, town_name,
                             country_name, is_headquarter, time_zone, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

fn execute_insert(stmt: &mut rusqlite::Statement<'_>, record: &SwiftRecord) -> rusqlite::Result<usize> {
    stmt.execute(params![
        record.swift_code.as_str(),
        record.country_iso2.as_str(),
        record.code_type,
        record.bank_name,
        record.address,
        record.town_name,
        record.country_name,
        record.is_headquarter,
        record.time_zone,
        record.created_at,
        record.updated_at,
    ])
}

/// Primary key collisions become `Error::Duplicate`; everything else stays a storage error.
fn classify_insert_error(err: rusqlite::Error, code: &SwiftCode) -> Error {
    let key_collision = matches!(
        &err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
    );

    if key_collision {
        Error::Duplicate(code.clone())
    } else {
        Error::Storage(err)
    }
}

/// Helper to convert a row to a SwiftRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<SwiftRecord> {
    let code_str: String = row.get(0)?;
    let iso_str: String = row.get(1)?;

    let swift_code = SwiftCode::parse(&code_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let country_iso2 = CountryCode::parse(&iso_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(SwiftRecord {
        swift_code,
        country_iso2,
        code_type: row.get(2)?,
        bank_name: row.get(3)?,
        address: row.get(4)?,
        town_name: row.get(5)?,
        country_name: row.get(6)?,
        is_headquarter: row.get(7)?,
        time_zone: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Records per country
#[derive(Debug, Clone, Serialize)]
pub struct CountryCount {
    pub country_iso2: CountryCode,
    pub country_name: String,
    pub count: usize,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub records: usize,
    pub headquarters: usize,
    pub branches: usize,
    pub countries: usize,
}
