//! Region filter: municipality first, whole state as fallback.

use super::types::FacilityRecord;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Number of leading IBGE digits that identify a municipality.
pub const MUNICIPALITY_PREFIX_LEN: usize = 6;

/// Which rule produced the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchScope {
    /// Facilities share the query's municipality prefix.
    #[serde(rename = "municipio")]
    Municipality,
    /// No facility in the municipality; every facility of the state.
    #[serde(rename = "estado")]
    State,
}

impl fmt::Display for MatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Municipality => write!(f, "municipality"),
            Self::State => write!(f, "state"),
        }
    }
}

/// Candidates for ranking, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMatch<'a> {
    pub scope: MatchScope,
    pub records: Vec<&'a FacilityRecord>,
}

/// First six characters of an IBGE code (the whole code when shorter).
pub fn municipality_prefix(code: &str) -> &str {
    let code = code.trim();
    match code.char_indices().nth(MUNICIPALITY_PREFIX_LEN) {
        Some((idx, _)) => &code[..idx],
        None => code,
    }
}

/// Narrow the catalog to the query's municipality, or to its state when the
/// municipality has no facility. An empty result is valid.
pub fn filter_region<'a>(
    records: &'a [FacilityRecord],
    region_code: &str,
    state_code: &str,
) -> RegionMatch<'a> {
    let prefix = municipality_prefix(region_code);

    if !prefix.is_empty() {
        let matched: Vec<&FacilityRecord> = records
            .iter()
            .filter(|r| municipality_prefix(&r.region_code) == prefix)
            .collect();
        if !matched.is_empty() {
            debug!("{} facilities in municipality {}", matched.len(), prefix);
            return RegionMatch {
                scope: MatchScope::Municipality,
                records: matched,
            };
        }
    }

    let state = state_code.trim();
    let matched: Vec<&FacilityRecord> = if state.is_empty() {
        Vec::new()
    } else {
        records
            .iter()
            .filter(|r| r.state_code.trim().eq_ignore_ascii_case(state))
            .collect()
    };

    warn!(
        "No facility in municipality '{}'; falling back to state {} ({} facilities)",
        prefix,
        state,
        matched.len()
    );

    RegionMatch {
        scope: MatchScope::State,
        records: matched,
    }
}
