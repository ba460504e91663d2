//! SWIFT/BIC and country identifiers
//!
//! A SWIFT code is 11 alphanumeric characters:
//! - characters 1-8 identify the institution and its location
//! - characters 9-11 identify the branch, `XXX` marks the headquarters
//!
//! Examples:
//! - `DEUTDEFFXXX` - Deutsche Bank headquarters
//! - `DEUTDEFF500` - a branch of the same institution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Branch suffix carried by every headquarters code
pub const HEADQUARTER_SUFFIX: &str = "XXX";

/// Length of the institution/location part shared by a headquarters and its branches
pub const PREFIX_LEN: usize = 8;

pub const SWIFT_CODE_LEN: usize = 11;

/// A validated, uppercase 11-character SWIFT/BIC code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwiftCode(String);

impl SwiftCode {
    /// Parse a code, uppercasing it first.
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.to_ascii_uppercase();
        if code.len() != SWIFT_CODE_LEN {
            return Err(Error::InvalidCode(format!(
                "SWIFT code must be exactly 11 characters long: {}",
                raw
            )));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidCode(format!(
                "SWIFT code must be alphanumeric: {}",
                raw
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 8-character institution/location part
    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN]
    }

    /// Whether the code names a headquarters (ends with `XXX`)
    pub fn is_headquarter(&self) -> bool {
        self.0.ends_with(HEADQUARTER_SUFFIX)
    }

    /// Whether `other` belongs to this code's branch group.
    ///
    /// A code is never a member of its own branch group.
    pub fn is_branch_of(&self, other: &SwiftCode) -> bool {
        self != other && self.prefix() == other.prefix()
    }
}

impl fmt::Display for SwiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SwiftCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for SwiftCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SwiftCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SwiftCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SwiftCode::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated, uppercase ISO 3166-1 alpha-2 country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code, uppercasing it first.
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.to_ascii_uppercase();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidCode(format!(
                "Country ISO2 code must be exactly 2 letters: {}",
                raw
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for CountryCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CountryCode::parse(&s).map_err(serde::de::Error::custom)
    }
}
