//! Resolver errors and their classification.

use crate::facility::CatalogError;
use crate::postal::LookupError;
use std::fmt;
use thiserror::Error;

/// Broad classes of failure a caller can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input the user can fix (malformed or unknown CEP).
    InvalidInput,
    /// The postal service could not be reached or answered nonsense.
    UpstreamUnavailable,
    /// The facility catalog could not be read.
    DataUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::UpstreamUnavailable => write!(f, "upstream unavailable"),
            Self::DataUnavailable => write!(f, "data unavailable"),
        }
    }
}

/// Conditions the resolver recovers from. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Geocoding failed; results are returned unranked.
    NoCoordinates,
    /// Nothing matched; an empty list is returned.
    EmptyResult,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCoordinates => write!(f, "degraded lookup (no coordinates)"),
            Self::EmptyResult => write!(f, "empty result"),
        }
    }
}

/// Reasons a resolution stops.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid CEP '{0}'. Use exactly 8 digits.")]
    InvalidPostalCode(String),

    #[error("Postal lookup failed: {0}")]
    RegionLookupFailed(#[source] LookupError),

    #[error("CEP {0} not found or has no IBGE code")]
    RegionNotFound(String),

    #[error("Facility data unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPostalCode(_) | Self::RegionNotFound(_) => ErrorKind::InvalidInput,
            Self::RegionLookupFailed(_) => ErrorKind::UpstreamUnavailable,
            Self::CatalogUnavailable(_) => ErrorKind::DataUnavailable,
        }
    }
}

impl From<LookupError> for ResolveError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotFound(cep) => Self::RegionNotFound(cep),
            other => Self::RegionLookupFailed(other),
        }
    }
}
