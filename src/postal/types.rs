//! Core types for postal-code lookups.

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A Brazilian CEP reduced to its 8 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Keep only ASCII digits; accept the result only if exactly 8 remain.
    ///
    /// "01001-000", " 01001000 " and "CEP 01001.000" all parse to "01001000".
    pub fn parse(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 8 {
            Some(Self(digits))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form with the usual hyphen, e.g. "01001-000".
    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl TryFrom<String> for PostalCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("invalid CEP '{}': expected 8 digits", raw))
    }
}

impl From<PostalCode> for String {
    fn from(postal: PostalCode) -> Self {
        postal.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the postal lookup knows about a CEP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalRegion {
    pub city: String,
    /// Two-letter state code (UF).
    pub state_code: String,
    /// IBGE municipality code, usually 7 digits.
    pub region_code: String,
}

/// Everything the ranking core needs for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PostalQuery {
    pub postal: PostalCode,
    pub region: PostalRegion,
    /// None when the CEP could not be geocoded.
    pub reference: Option<Coordinates>,
}

/// Postal lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("CEP {0} not found")]
    NotFound(String),
}

// ─── Collaborator seams ──────────────────────────────────────────

/// CEP → city, state and IBGE code.
pub trait RegionLookup: Send + Sync {
    fn lookup(&self, postal: &PostalCode) -> Result<PostalRegion, LookupError>;
}

/// CEP → approximate coordinates. Absence is an expected outcome, so this
/// never fails; implementations log and return None.
pub trait CoordinateLookup: Send + Sync {
    fn lookup(&self, postal: &PostalCode) -> Option<Coordinates>;
}
