//! SWIFT records - the stored entity and the create candidate
//!
//! `NewSwiftRecord` is what callers hand in; `validate` turns it into a
//! canonical `SwiftRecord` or a field-keyed list of problems.

use crate::code::{CountryCode, SwiftCode, HEADQUARTER_SUFFIX, SWIFT_CODE_LEN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest accepted `codeType` value (e.g. `BIC11`)
pub const MAX_CODE_TYPE_LEN: usize = 5;

/// A SWIFT code row as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwiftRecord {
    pub swift_code: SwiftCode,
    #[serde(rename = "countryISO2")]
    pub country_iso2: CountryCode,
    /// Uppercase country name
    pub country_name: String,
    pub bank_name: String,
    pub address: Option<String>,
    pub town_name: Option<String>,
    /// Code type, e.g. `BIC11`
    pub code_type: String,
    /// Always equal to `swift_code.is_headquarter()` for records accepted by `validate`
    pub is_headquarter: bool,
    pub time_zone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate for a new record, as received from a caller.
///
/// Every field is optional so that a missing field is reported as a
/// validation problem on that field rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSwiftRecord {
    #[serde(default)]
    pub swift_code: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub town_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default, rename = "countryISO2")]
    pub country_iso2: Option<String>,
    #[serde(default)]
    pub is_headquarter: Option<bool>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub code_type: Option<String>,
}

/// Field name -> human readable problems, in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Problems reported for one field
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl NewSwiftRecord {
    /// Canonicalize and check the candidate.
    ///
    /// All problems are collected before returning, so the caller sees every
    /// bad field at once. `now` becomes both timestamps.
    pub fn validate(&self, now: DateTime<Utc>) -> std::result::Result<SwiftRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let swift_code = match self.swift_code.as_deref() {
            None => {
                errors.add("swiftCode", "SWIFT code must be a string.");
                None
            }
            Some(raw) => {
                if raw.len() != SWIFT_CODE_LEN {
                    errors.add("swiftCode", "SWIFT code must be exactly 11 characters long.");
                }
                match SwiftCode::parse(raw) {
                    Ok(code) => Some(code),
                    Err(_) => {
                        errors.add("swiftCode", "SWIFT code must be alphanumeric.");
                        None
                    }
                }
            }
        };

        match (self.is_headquarter, self.swift_code.as_deref()) {
            (None, _) => {
                errors.add(
                    "isHeadquarter",
                    "isHeadquarter must be a boolean value (true or false).",
                );
            }
            (Some(is_hq), Some(raw)) => {
                let ends_with_suffix = raw.to_ascii_uppercase().ends_with(HEADQUARTER_SUFFIX);
                if is_hq && !ends_with_suffix {
                    errors.add(
                        "isHeadquarter",
                        "isHeadquarter is true, but SWIFT code must end with XXX",
                    );
                } else if !is_hq && ends_with_suffix {
                    errors.add(
                        "isHeadquarter",
                        "isHeadquarter is false, but SWIFT code must not end with XXX",
                    );
                }
            }
            (Some(is_hq), None) => {
                let message = if is_hq {
                    "isHeadquarter is true, but SWIFT code must end with XXX"
                } else {
                    "isHeadquarter is false, but SWIFT code must not end with XXX"
                };
                errors.add("isHeadquarter", message);
            }
        }

        let bank_name = non_empty(&self.bank_name);
        if bank_name.is_none() {
            errors.add("bankName", "Bank name cannot be empty.");
        }

        let country_name = non_empty(&self.country_name).map(|name| name.to_uppercase());
        if country_name.is_none() {
            errors.add("countryName", "Country name cannot be empty.");
        }

        let country_iso2 = match self.country_iso2.as_deref() {
            None => {
                errors.add("countryISO2", "Country ISO2 code must be exactly 2 characters.");
                None
            }
            Some(raw) => {
                if raw.chars().count() != 2 {
                    errors.add("countryISO2", "Country ISO2 code must be exactly 2 characters.");
                }
                if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
                    errors.add("countryISO2", "Country ISO2 code must contain only letters.");
                }
                CountryCode::parse(raw).ok()
            }
        };

        let code_type = non_empty(&self.code_type);
        match code_type {
            None => errors.add("codeType", "Code type cannot be empty."),
            Some(ct) if ct.chars().count() > MAX_CODE_TYPE_LEN => {
                errors.add("codeType", "Code type cannot exceed 5 characters.")
            }
            Some(_) => {}
        }

        match (swift_code, country_iso2, country_name, bank_name, code_type) {
            (Some(swift_code), Some(country_iso2), Some(country_name), Some(bank_name), Some(code_type))
                if errors.is_empty() =>
            {
                Ok(SwiftRecord {
                    is_headquarter: swift_code.is_headquarter(),
                    swift_code,
                    country_iso2,
                    country_name,
                    bank_name: bank_name.to_string(),
                    address: self.address.clone(),
                    town_name: self.town_name.clone(),
                    code_type: code_type.to_string(),
                    time_zone: self.time_zone.clone(),
                    created_at: now,
                    updated_at: now,
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(code: &str, is_hq: bool) -> NewSwiftRecord {
        NewSwiftRecord {
            swift_code: Some(code.to_string()),
            bank_name: Some("Deutsche Bank AG".to_string()),
            address: Some("Taunusanlage 12".to_string()),
            town_name: Some("Frankfurt am Main".to_string()),
            country_name: Some("Germany".to_string()),
            country_iso2: Some("de".to_string()),
            is_headquarter: Some(is_hq),
            time_zone: Some("Europe/Berlin".to_string()),
            code_type: Some("BIC11".to_string()),
        }
    }

    #[test]
    fn test_validate_canonicalizes() {
        let now = Utc::now();
        let record = candidate("deutdeffxxx", true).validate(now).unwrap();

        assert_eq!(record.swift_code.as_str(), "DEUTDEFFXXX");
        assert_eq!(record.country_iso2.as_str(), "DE");
        assert_eq!(record.country_name, "GERMANY");
        assert_eq!(record.bank_name, "Deutsche Bank AG");
        assert!(record.is_headquarter);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_headquarter_flag_mismatch() {
        let errors = candidate("DEUTDEFFXXX", false).validate(Utc::now()).unwrap_err();
        assert_eq!(
            errors.field("isHeadquarter"),
            ["isHeadquarter is false, but SWIFT code must not end with XXX"]
        );

        let errors = candidate("DEUTDEFF500", true).validate(Utc::now()).unwrap_err();
        assert_eq!(
            errors.field("isHeadquarter"),
            ["isHeadquarter is true, but SWIFT code must end with XXX"]
        );
    }

    #[test]
    fn test_short_code_reports_both_problems() {
        let errors = candidate("SHORT", false).validate(Utc::now()).unwrap_err();
        let messages = errors.field("swiftCode");
        assert!(messages.iter().any(|m| m.contains("11 characters")));
        assert!(messages.iter().any(|m| m.contains("alphanumeric")));
    }

    #[test]
    fn test_missing_fields() {
        let mut c = candidate("DEUTDEFF500", false);
        c.bank_name = None;
        c.code_type = None;
        let errors = c.validate(Utc::now()).unwrap_err();

        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["bankName", "codeType"]);
    }

    #[test]
    fn test_code_type_too_long() {
        let mut c = candidate("DEUTDEFF500", false);
        c.code_type = Some("BIC111".to_string());
        let errors = c.validate(Utc::now()).unwrap_err();
        assert_eq!(errors.field("codeType"), ["Code type cannot exceed 5 characters."]);
    }

    #[test]
    fn test_bad_country_iso() {
        let mut c = candidate("DEUTDEFF500", false);
        c.country_iso2 = Some("D1E".to_string());
        let errors = c.validate(Utc::now()).unwrap_err();
        assert_eq!(errors.field("countryISO2").len(), 2);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"swiftCode":"DEUTDEFFXXX","color":"blue"}"#;
        assert!(serde_json::from_str::<NewSwiftRecord>(json).is_err());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "swiftCode": "DEUTDEFF500",
            "bankName": "Deutsche Bank AG",
            "countryName": "GERMANY",
            "countryISO2": "DE",
            "isHeadquarter": false,
            "codeType": "BIC11"
        }"#;
        let c: NewSwiftRecord = serde_json::from_str(json).unwrap();
        assert_eq!(c.country_iso2.as_deref(), Some("DE"));
        assert!(c.validate(Utc::now()).is_ok());
    }
}
