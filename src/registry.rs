//! Registry service
//!
//! The headquarters/branch rules live here:
//! - a headquarters is a code ending in `XXX`
//! - its branch group is every other code sharing its first 8 characters
//! - a headquarters with a non-empty branch group cannot be deleted
//!
//! The service keeps no state between calls; every operation reads the
//! store afresh and writes at most once.

use chrono::Utc;
use tracing::{error, info, warn};
use crate::{Error, Result};
use crate::code::{CountryCode, SwiftCode};
use crate::record::{NewSwiftRecord, SwiftRecord};
use crate::storage::RecordStore;
use crate::view::{CountryView, SwiftCodeDetail};

/// Registry service over a record store
pub struct Registry<S> {
    store: S,
}

impl<S: RecordStore> Registry<S> {
    /// Create a new registry
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up a single code.
    ///
    /// A headquarters comes back with its branch group attached; a branch
    /// comes back on its own.
    pub fn find_one(&self, code: &SwiftCode) -> Result<SwiftCodeDetail> {
        info!("Finding details for SWIFT code: {}", code);

        let Some(record) = self.store.get(code)? else {
            warn!("SWIFT code not found: {}", code);
            return Err(Error::NotFound(code.clone()));
        };

        if record.is_headquarter {
            let branches = self.branch_group(&record.swift_code)?;
            info!("Found {} branches for {}", branches.len(), code);
            Ok(SwiftCodeDetail::headquarters(&record, &branches))
        } else {
            info!("Code {} is a branch", code);
            Ok(SwiftCodeDetail::branch(&record))
        }
    }

    /// List every code registered for a country.
    ///
    /// An unknown country is not an error: the view comes back empty with
    /// the country name `Unknown`.
    pub fn find_by_country(&self, country: &CountryCode) -> Result<CountryView> {
        info!("Finding SWIFT codes for country: {}", country);

        let records = self.store.scan_by_country(country)?;
        if records.is_empty() {
            info!("No SWIFT codes found for country {}", country);
        } else {
            info!("Found {} codes for country {}", records.len(), country);
        }

        Ok(CountryView::from_records(country.clone(), &records))
    }

    /// Validate and store a new record.
    ///
    /// Nothing is written unless validation passes and the code is free.
    pub fn create(&self, candidate: &NewSwiftRecord) -> Result<SwiftRecord> {
        let record = candidate.validate(Utc::now()).map_err(|errors| {
            warn!("Rejected SWIFT code candidate: {}", errors);
            Error::Validation(errors)
        })?;

        if self.store.get(&record.swift_code)?.is_some() {
            warn!("SWIFT code {} already exists", record.swift_code);
            return Err(Error::AlreadyExists(record.swift_code));
        }

        match self.store.insert(&record) {
            Ok(()) => {
                info!("Created SWIFT code {}", record.swift_code);
                Ok(record)
            }
            // Lost the race against a concurrent insert of the same code
            Err(Error::Duplicate(code)) => {
                warn!("SWIFT code {} already exists (rejected by store)", code);
                Err(Error::AlreadyExists(code))
            }
            Err(e) => {
                error!("Error creating SWIFT code {}: {}", record.swift_code, e);
                Err(e)
            }
        }
    }

    /// Delete a code.
    ///
    /// A headquarters is only removed once its branch group is empty. The
    /// branch check and the delete are not atomic; a branch inserted in
    /// between is not detected.
    pub fn remove(&self, code: &SwiftCode) -> Result<()> {
        info!("Attempting to delete SWIFT code: {}", code);

        let Some(record) = self.store.get(code)? else {
            warn!("Delete failed: SWIFT code {} not found", code);
            return Err(Error::NotFound(code.clone()));
        };

        if record.is_headquarter {
            let count = self.branch_group(&record.swift_code)?.len();
            if count > 0 {
                warn!("Cannot delete HQ {}: {} branches exist", code, count);
                return Err(Error::BranchesExist { code: code.clone(), count });
            }
        }

        let removed = self.store.delete(code)?;
        if removed == 0 {
            error!("Delete failed unexpectedly after check for SWIFT code: {}", code);
            return Err(Error::DeleteFailed(code.clone()));
        }

        info!("Successfully deleted SWIFT code: {}", code);
        Ok(())
    }

    fn branch_group(&self, headquarters: &SwiftCode) -> Result<Vec<SwiftRecord>> {
        self.store.scan_by_prefix(headquarters.prefix(), headquarters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::storage::SqliteStore;

    fn candidate(code: &str, country: &str) -> NewSwiftRecord {
        NewSwiftRecord {
            swift_code: Some(code.to_string()),
            bank_name: Some(format!("Bank {}", code)),
            address: Some("1 Main St".to_string()),
            town_name: Some("Town".to_string()),
            country_name: Some(format!("country {}", country)),
            country_iso2: Some(country.to_string()),
            is_headquarter: Some(code.to_ascii_uppercase().ends_with("XXX")),
            time_zone: Some("UTC".to_string()),
            code_type: Some("BIC11".to_string()),
        }
    }

    fn code(s: &str) -> SwiftCode {
        SwiftCode::parse(s).unwrap()
    }

    fn registry() -> Registry<SqliteStore> {
        Registry::new(SqliteStore::open_in_memory().unwrap())
    }

    #[test]
    fn test_create_then_find() {
        let registry = registry();
        let created = registry.create(&candidate("deutdeff500", "de")).unwrap();
        assert_eq!(created.swift_code.as_str(), "DEUTDEFF500");

        let detail = registry.find_one(&code("DEUTDEFF500")).unwrap();
        let details = detail.details();
        assert_eq!(details.summary.swift_code, created.swift_code);
        assert_eq!(details.summary.country_iso2.as_str(), "DE");
        assert_eq!(details.summary.bank_name, "Bank deutdeff500");
        assert_eq!(details.summary.address, "1 Main St");
        assert!(!details.summary.is_headquarter);
        assert_eq!(details.country_name, "COUNTRY DE");
        assert!(detail.branches().is_none());

        let stored = registry.store().get(&created.swift_code).unwrap().unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn test_create_twice_conflicts() {
        let registry = registry();
        registry.create(&candidate("DEUTDEFFXXX", "DE")).unwrap();

        let err = registry.create(&candidate("deutdeffxxx", "DE")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_create_rejects_flag_mismatch() {
        let registry = registry();
        let mut c = candidate("DEUTDEFFXXX", "DE");
        c.is_headquarter = Some(false);

        let err = registry.create(&c).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(registry.store().count().unwrap(), 0);
    }

    #[test]
    fn test_validation_runs_before_conflict_check() {
        let registry = registry();
        registry.create(&candidate("DEUTDEFF500", "DE")).unwrap();

        let mut c = candidate("DEUTDEFF500", "DE");
        c.is_headquarter = Some(true);
        let err = registry.create(&c).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_headquarters_detail_lists_branches() {
        let registry = registry();
        for c in ["DEUTDEFFXXX", "DEUTDEFF500", "DEUTDEFF100", "DEUTDEMMXXX"] {
            registry.create(&candidate(c, "DE")).unwrap();
        }

        let detail = registry.find_one(&code("DEUTDEFFXXX")).unwrap();
        let branches = detail.branches().unwrap();
        let codes: Vec<_> = branches.iter().map(|b| b.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["DEUTDEFF100", "DEUTDEFF500"]);

        let json = serde_json::to_value(&detail).unwrap();
        for branch in json["branches"].as_array().unwrap() {
            assert!(branch.get("countryName").is_none());
        }

        let branch = registry.find_one(&code("DEUTDEFF500")).unwrap();
        assert!(serde_json::to_value(&branch).unwrap().get("branches").is_none());
    }

    #[test]
    fn test_headquarters_without_branches() {
        let registry = registry();
        registry.create(&candidate("BPKOPLPWXXX", "PL")).unwrap();

        let detail = registry.find_one(&code("BPKOPLPWXXX")).unwrap();
        assert_eq!(detail.branches().map(<[_]>::len), Some(0));
    }

    #[test]
    fn test_find_one_missing() {
        let err = registry().find_one(&code("NONEXISTCD1")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_find_by_country() {
        let registry = registry();
        for c in ["ALBPPLPW001", "BPKOPLPWXXX", "ALBPPLPWXXX"] {
            registry.create(&candidate(c, "PL")).unwrap();
        }
        registry.create(&candidate("DEUTDEFFXXX", "DE")).unwrap();

        let view = registry.find_by_country(&CountryCode::parse("pl").unwrap()).unwrap();
        assert_eq!(view.country_iso2.as_str(), "PL");
        assert_eq!(view.country_name, "COUNTRY PL");

        let codes: Vec<_> = view.swift_codes.iter().map(|s| s.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["ALBPPLPWXXX", "BPKOPLPWXXX", "ALBPPLPW001"]);
    }

    #[test]
    fn test_find_by_country_empty_is_not_an_error() {
        let view = registry().find_by_country(&CountryCode::parse("XX").unwrap()).unwrap();
        assert_eq!(view.country_iso2.as_str(), "XX");
        assert_eq!(view.country_name, "Unknown");
        assert!(view.swift_codes.is_empty());
    }

    #[test]
    fn test_remove_headquarters_guarded_by_branches() {
        let registry = registry();
        registry.create(&candidate("DEUTDEFFXXX", "DE")).unwrap();
        registry.create(&candidate("DEUTDEFF500", "DE")).unwrap();

        let err = registry.remove(&code("DEUTDEFFXXX")).unwrap_err();
        assert!(matches!(err, Error::BranchesExist { count: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        registry.remove(&code("DEUTDEFF500")).unwrap();
        registry.remove(&code("DEUTDEFFXXX")).unwrap();
        assert_eq!(registry.store().count().unwrap(), 0);
    }

    #[test]
    fn test_remove_counts_all_branches() {
        let registry = registry();
        for c in ["E2ETESTAXXX", "E2ETESTAB1A", "E2ETESTAC2B"] {
            registry.create(&candidate(c, "AL")).unwrap();
        }

        let err = registry.remove(&code("E2ETESTAXXX")).unwrap_err();
        assert!(matches!(err, Error::BranchesExist { count: 2, .. }));

        registry.remove(&code("E2ETESTAB1A")).unwrap();
        assert!(registry.remove(&code("E2ETESTAXXX")).is_err());
        registry.remove(&code("E2ETESTAC2B")).unwrap();
        registry.remove(&code("E2ETESTAXXX")).unwrap();
    }

    #[test]
    fn test_remove_missing() {
        let err = registry().remove(&code("NONEXISTDEL")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    /// Store that hides existing rows from `get`, like a concurrent writer
    /// slipping in between the existence check and the insert.
    struct BlindStore(SqliteStore);

    impl RecordStore for BlindStore {
        fn get(&self, _code: &SwiftCode) -> Result<Option<SwiftRecord>> {
            Ok(None)
        }
        fn scan_by_country(&self, country: &CountryCode) -> Result<Vec<SwiftRecord>> {
            self.0.scan_by_country(country)
        }
        fn scan_by_prefix(&self, prefix: &str, exclude: &SwiftCode) -> Result<Vec<SwiftRecord>> {
            self.0.scan_by_prefix(prefix, exclude)
        }
        fn insert(&self, record: &SwiftRecord) -> Result<()> {
            self.0.insert(record)
        }
        fn delete(&self, code: &SwiftCode) -> Result<usize> {
            self.0.delete(code)
        }
    }

    #[test]
    fn test_store_level_duplicate_becomes_conflict() {
        let registry = Registry::new(BlindStore(SqliteStore::open_in_memory().unwrap()));
        registry.create(&candidate("DEUTDEFFXXX", "DE")).unwrap();

        let err = registry.create(&candidate("DEUTDEFFXXX", "DE")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    /// Store whose deletes never find the row
    struct LossyStore(SqliteStore);

    impl RecordStore for LossyStore {
        fn get(&self, code: &SwiftCode) -> Result<Option<SwiftRecord>> {
            self.0.get(code)
        }
        fn scan_by_country(&self, country: &CountryCode) -> Result<Vec<SwiftRecord>> {
            self.0.scan_by_country(country)
        }
        fn scan_by_prefix(&self, prefix: &str, exclude: &SwiftCode) -> Result<Vec<SwiftRecord>> {
            self.0.scan_by_prefix(prefix, exclude)
        }
        fn insert(&self, record: &SwiftRecord) -> Result<()> {
            self.0.insert(record)
        }
        fn delete(&self, _code: &SwiftCode) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_lost_delete_is_internal() {
        let registry = Registry::new(LossyStore(SqliteStore::open_in_memory().unwrap()));
        registry.create(&candidate("DEUTDEFF500", "DE")).unwrap();

        let err = registry.remove(&code("DEUTDEFF500")).unwrap_err();
        assert!(matches!(err, Error::DeleteFailed(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
