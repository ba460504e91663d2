//! Response shapes produced by the registry
//!
//! - `SwiftCodeSummary`: one row inside a list, no country name
//! - `SwiftCodeDetail`: a single code, composite for headquarters
//! - `CountryView`: every code registered for one country

use crate::code::{CountryCode, SwiftCode};
use crate::record::SwiftRecord;
use serde::{Deserialize, Serialize};

/// Country name reported for a country with no registered codes
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// List entry for a SWIFT code.
///
/// The country name is left out; the enclosing view already carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftCodeSummary {
    /// Empty when the record has no address
    pub address: String,
    pub bank_name: String,
    #[serde(rename = "countryISO2")]
    pub country_iso2: CountryCode,
    pub is_headquarter: bool,
    pub swift_code: SwiftCode,
}

impl From<&SwiftRecord> for SwiftCodeSummary {
    fn from(record: &SwiftRecord) -> Self {
        Self {
            address: record.address.clone().unwrap_or_default(),
            bank_name: record.bank_name.clone(),
            country_iso2: record.country_iso2.clone(),
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code.clone(),
        }
    }
}

/// Fields shared by both detail variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDetails {
    #[serde(flatten)]
    pub summary: SwiftCodeSummary,
    pub country_name: String,
}

impl From<&SwiftRecord> for CodeDetails {
    fn from(record: &SwiftRecord) -> Self {
        Self {
            summary: SwiftCodeSummary::from(record),
            country_name: record.country_name.clone(),
        }
    }
}

/// Detail view of one code.
///
/// Serialized flat: a headquarters carries an extra `branches` array, a
/// branch has no such field at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SwiftCodeDetail {
    Headquarters {
        #[serde(flatten)]
        details: CodeDetails,
        branches: Vec<SwiftCodeSummary>,
    },
    Branch {
        #[serde(flatten)]
        details: CodeDetails,
    },
}

impl SwiftCodeDetail {
    pub fn headquarters(record: &SwiftRecord, branches: &[SwiftRecord]) -> Self {
        SwiftCodeDetail::Headquarters {
            details: CodeDetails::from(record),
            branches: branches.iter().map(SwiftCodeSummary::from).collect(),
        }
    }

    pub fn branch(record: &SwiftRecord) -> Self {
        SwiftCodeDetail::Branch {
            details: CodeDetails::from(record),
        }
    }

    pub fn details(&self) -> &CodeDetails {
        match self {
            SwiftCodeDetail::Headquarters { details, .. } | SwiftCodeDetail::Branch { details } => {
                details
            }
        }
    }

    /// Branch summaries; `None` for a branch detail
    pub fn branches(&self) -> Option<&[SwiftCodeSummary]> {
        match self {
            SwiftCodeDetail::Headquarters { branches, .. } => Some(branches),
            SwiftCodeDetail::Branch { .. } => None,
        }
    }

    pub fn swift_code(&self) -> &SwiftCode {
        &self.details().summary.swift_code
    }
}

/// All codes registered for one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryView {
    #[serde(rename = "countryISO2")]
    pub country_iso2: CountryCode,
    pub country_name: String,
    pub swift_codes: Vec<SwiftCodeSummary>,
}

impl CountryView {
    /// Build the view from rows already in display order.
    ///
    /// The country name comes from the first row, or `Unknown` when empty.
    pub fn from_records(country_iso2: CountryCode, records: &[SwiftRecord]) -> Self {
        let country_name = records
            .first()
            .map(|r| r.country_name.clone())
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

        Self {
            country_iso2,
            country_name,
            swift_codes: records.iter().map(SwiftCodeSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(code: &str) -> SwiftRecord {
        let swift_code = SwiftCode::parse(code).unwrap();
        SwiftRecord {
            is_headquarter: swift_code.is_headquarter(),
            swift_code,
            country_iso2: CountryCode::parse("DE").unwrap(),
            country_name: "GERMANY".to_string(),
            bank_name: "Deutsche Bank AG".to_string(),
            address: None,
            town_name: None,
            code_type: "BIC11".to_string(),
            time_zone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_headquarters_json_shape() {
        let hq = record("DEUTDEFFXXX");
        let branch = record("DEUTDEFF500");
        let view = SwiftCodeDetail::headquarters(&hq, &[branch]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["swiftCode"], "DEUTDEFFXXX");
        assert_eq!(json["isHeadquarter"], true);
        assert_eq!(json["countryName"], "GERMANY");
        assert_eq!(json["address"], "");

        let branches = json["branches"].as_array().unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0]["swiftCode"], "DEUTDEFF500");
        assert!(branches[0].get("countryName").is_none());
    }

    #[test]
    fn test_branch_json_has_no_branches_field() {
        let view = SwiftCodeDetail::branch(&record("DEUTDEFF500"));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["countryISO2"], "DE");
        assert!(json.get("branches").is_none());
        assert!(view.branches().is_none());
    }

    #[test]
    fn test_empty_country_view() {
        let view = CountryView::from_records(CountryCode::parse("XX").unwrap(), &[]);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["countryISO2"], "XX");
        assert_eq!(json["countryName"], "Unknown");
        assert_eq!(json["swiftCodes"], serde_json::json!([]));
    }
}
