//! CSV bulk loader
//!
//! Reads the SWIFT code spreadsheet export and replaces the store contents
//! with its valid rows. Expected headers (surrounding whitespace ignored):
//! `COUNTRY ISO2 CODE`, `SWIFT CODE`, `CODE TYPE`, `NAME`, `ADDRESS`,
//! `TOWN NAME`, `COUNTRY NAME`, `TIME ZONE`.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::Result;
use crate::code::{CountryCode, SwiftCode};
use crate::record::SwiftRecord;
use crate::storage::SqliteStore;

/// Rows written per batch
pub const BATCH_SIZE: usize = 500;

/// One spreadsheet row, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "COUNTRY ISO2 CODE", default)]
    pub country_iso2: Option<String>,
    #[serde(rename = "SWIFT CODE", default)]
    pub swift_code: Option<String>,
    #[serde(rename = "CODE TYPE", default)]
    pub code_type: Option<String>,
    #[serde(rename = "NAME", default)]
    pub name: Option<String>,
    #[serde(rename = "ADDRESS", default)]
    pub address: Option<String>,
    #[serde(rename = "TOWN NAME", default)]
    pub town_name: Option<String>,
    #[serde(rename = "COUNTRY NAME", default)]
    pub country_name: Option<String>,
    #[serde(rename = "TIME ZONE", default)]
    pub time_zone: Option<String>,
}

impl CsvRow {
    /// Turn the row into a record, or explain why it is skipped.
    pub fn to_record(&self, now: DateTime<Utc>) -> std::result::Result<SwiftRecord, String> {
        let raw_code = trimmed(&self.swift_code).unwrap_or_default();
        let swift_code = SwiftCode::parse(raw_code)
            .map_err(|_| format!("invalid SWIFT code: {:?}", raw_code))?;

        let raw_iso = trimmed(&self.country_iso2).unwrap_or_default();
        let country_iso2 = CountryCode::parse(raw_iso)
            .map_err(|_| format!("invalid ISO2 code {:?} for {}", raw_iso, swift_code))?;

        let country_name = trimmed(&self.country_name)
            .ok_or_else(|| format!("missing country name for {}", swift_code))?
            .to_uppercase();
        let bank_name = trimmed(&self.name)
            .ok_or_else(|| format!("missing bank name for {}", swift_code))?
            .to_string();
        let code_type = trimmed(&self.code_type)
            .ok_or_else(|| format!("missing code type for {}", swift_code))?
            .to_string();

        Ok(SwiftRecord {
            is_headquarter: swift_code.is_headquarter(),
            swift_code,
            country_iso2,
            country_name,
            bank_name,
            address: trimmed(&self.address).map(str::to_string),
            town_name: trimmed(&self.town_name).map(str::to_string),
            code_type,
            time_zone: trimmed(&self.time_zone).map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Outcome of a load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Data rows read from the file
    pub parsed: usize,
    /// Rows written to the store
    pub loaded: usize,
    /// Rows rejected by validation or duplicates
    pub skipped: usize,
}

/// Parse and validate every row, dropping the bad ones.
///
/// The first occurrence of a code wins; later duplicates are skipped.
pub fn read_records<R: Read>(reader: R) -> Result<(Vec<SwiftRecord>, LoadReport)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let now = Utc::now();
    let mut report = LoadReport::default();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (idx, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        report.parsed += 1;

        match row.to_record(now) {
            Ok(record) => {
                if seen.insert(record.swift_code.clone()) {
                    records.push(record);
                } else {
                    warn!("Skipping row {}: duplicate SWIFT code {}", idx + 1, record.swift_code);
                    report.skipped += 1;
                }
            }
            Err(reason) => {
                warn!("Skipping row {}: {}", idx + 1, reason);
                report.skipped += 1;
            }
        }
    }

    Ok((records, report))
}

/// Replace the store contents with the valid rows of `reader`.
///
/// A file without a single valid row leaves the store untouched.
pub fn load<R: Read>(store: &SqliteStore, reader: R, mut on_batch: impl FnMut(usize, usize)) -> Result<LoadReport> {
    let (records, mut report) = read_records(reader)?;
    info!("Parsed {} rows, {} valid", report.parsed, records.len());

    if records.is_empty() {
        info!("No valid data to insert");
        return Ok(report);
    }

    let total = records.len();
    report.loaded = store.replace_all(&records, BATCH_SIZE, |written| {
        info!("Inserted {}/{} codes", written, total);
        on_batch(written, total);
    })?;

    info!("Database seeded with {} codes", report.loaded);
    Ok(report)
}

/// Load a CSV file from disk
pub fn load_file(store: &SqliteStore, path: &Path, on_batch: impl FnMut(usize, usize)) -> Result<LoadReport> {
    info!("Reading CSV: {}", path.display());
    let file = std::fs::File::open(path)?;
    load(store, file, on_batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordStore;

    const SAMPLE: &str = "\
COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE
AL,AAISALTRXXX,BIC11,UNITED BANK OF ALBANIA SH.A,\"HYRJA 3 RR. DRITAN HOXHA ND. 11 TIRANA, TIRANA, 1023\",TIRANA,ALBANIA,Europe/Tirane
bg,abiebgsfxxx,BIC11,ABV INVESTMENTS LTD,\"TSAR ASEN 20  VARNA, VARNA, 9002\",VARNA,bulgaria,Europe/Sofia
BG,ABIEBGSF001,BIC11,ABV INVESTMENTS LTD,  ,VARNA,BULGARIA,Europe/Sofia
CL,SHORT,BIC11,BAD CODE BANK,,SANTIAGO,CHILE,Pacific/Easter
C1,BCHICLRMXXX,BIC11,BAD COUNTRY BANK,,SANTIAGO,CHILE,Pacific/Easter
PL,BPKOPLPWXXX,BIC11,,,WARSZAWA,POLAND,Europe/Warsaw
PL,ALBPPLPWXXX,,ALIOR BANK,,WARSZAWA,POLAND,Europe/Warsaw
AL,AAISALTRXXX,BIC11,DUPLICATE,,TIRANA,ALBANIA,Europe/Tirane
";

    #[test]
    fn test_read_records_skips_invalid_rows() {
        let (records, report) = read_records(SAMPLE.as_bytes()).unwrap();

        assert_eq!(report.parsed, 8);
        assert_eq!(report.skipped, 5);
        let codes: Vec<_> = records.iter().map(|r| r.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["AAISALTRXXX", "ABIEBGSFXXX", "ABIEBGSF001"]);
    }

    #[test]
    fn test_rows_are_canonicalized() {
        let (records, _) = read_records(SAMPLE.as_bytes()).unwrap();

        let hq = &records[1];
        assert_eq!(hq.country_iso2.as_str(), "BG");
        assert_eq!(hq.country_name, "BULGARIA");
        assert!(hq.is_headquarter);

        let branch = &records[2];
        assert!(!branch.is_headquarter);
        assert_eq!(branch.address, None);
        assert_eq!(branch.time_zone.as_deref(), Some("Europe/Sofia"));
    }

    #[test]
    fn test_load_replaces_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut batches = Vec::new();
        let report = load(&store, SAMPLE.as_bytes(), |written, total| batches.push((written, total))).unwrap();

        assert_eq!(report.loaded, 3);
        assert_eq!(batches, vec![(3, 3)]);
        assert_eq!(store.count().unwrap(), 3);

        let hq = store.get(&SwiftCode::parse("ABIEBGSFXXX").unwrap()).unwrap().unwrap();
        let branches = store.scan_by_prefix(hq.swift_code.prefix(), &hq.swift_code).unwrap();
        assert_eq!(branches.len(), 1);
    }

    #[test]
    fn test_load_without_valid_rows_keeps_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        load(&store, SAMPLE.as_bytes(), |_, _| {}).unwrap();

        let only_bad = "COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE\nXX,BAD,BIC11,N,,T,C,Z\n";
        let report = load(&store, only_bad.as_bytes(), |_, _| {}).unwrap();

        assert_eq!(report.loaded, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let report = load_file(&store, &path, |_, _| {}).unwrap();
        assert_eq!(report.loaded, 3);

        assert!(load_file(&store, &dir.path().join("missing.csv"), |_, _| {}).is_err());
    }
}
