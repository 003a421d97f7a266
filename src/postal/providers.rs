//! Postal lookup providers: ViaCEP, Nominatim, and fixed values for
//! offline or manual use.

use super::types::{CoordinateLookup, LookupError, PostalCode, PostalRegion, RegionLookup};
use crate::geo::Coordinates;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const VIACEP_URL: &str = "https://viacep.com.br";
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "consulta-certa-app";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn build_agent(timeout: Duration, user_agent: &str) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ─── ViaCEP ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    #[serde(default)]
    ibge: Option<String>,
}

/// Region lookup against the ViaCEP web service.
pub struct ViaCepLookup {
    agent: ureq::Agent,
    base_url: String,
}

impl ViaCepLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        Self {
            agent: build_agent(timeout, user_agent),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ViaCepLookup {
    fn default() -> Self {
        Self::new(VIACEP_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }
}

impl RegionLookup for ViaCepLookup {
    fn lookup(&self, postal: &PostalCode) -> Result<PostalRegion, LookupError> {
        let url = format!("{}/ws/{}/json/", self.base_url, postal);
        debug!("ViaCEP request: {}", url);

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let body: ViaCepResponse = response
            .into_json()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        // Unknown CEPs come back as {"erro": true} with none of these fields.
        match (non_empty(body.localidade), non_empty(body.uf), non_empty(body.ibge)) {
            (Some(city), Some(state_code), Some(region_code)) => Ok(PostalRegion {
                city,
                state_code,
                region_code,
            }),
            _ => Err(LookupError::NotFound(postal.to_string())),
        }
    }
}

// ─── Nominatim ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

/// Coordinate lookup against OpenStreetMap Nominatim's postal-code search.
pub struct NominatimLookup {
    agent: ureq::Agent,
    base_url: String,
}

impl NominatimLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        Self {
            agent: build_agent(timeout, user_agent),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn fetch(&self, postal: &PostalCode) -> Result<Option<Coordinates>, LookupError> {
        let url = format!(
            "{}/search?postalcode={}&country=Brazil&format=json",
            self.base_url, postal
        );
        debug!("Nominatim request: {}", url);

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let hits: Vec<NominatimHit> = response
            .into_json()
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        let Some(first) = hits.first() else {
            return Ok(None);
        };

        let lat: f64 = first
            .lat
            .trim()
            .parse()
            .map_err(|_| LookupError::InvalidResponse(format!("bad latitude '{}'", first.lat)))?;
        let lon: f64 = first
            .lon
            .trim()
            .parse()
            .map_err(|_| LookupError::InvalidResponse(format!("bad longitude '{}'", first.lon)))?;

        Coordinates::new(lat, lon)
            .map(Some)
            .ok_or_else(|| LookupError::InvalidResponse(format!("coordinates out of range: {}, {}", lat, lon)))
    }
}

impl Default for NominatimLookup {
    fn default() -> Self {
        Self::new(NOMINATIM_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }
}

impl CoordinateLookup for NominatimLookup {
    fn lookup(&self, postal: &PostalCode) -> Option<Coordinates> {
        match self.fetch(postal) {
            Ok(Some(coords)) => {
                debug!("Approximate location for {}: {}, {}", postal, coords.lat, coords.lon);
                Some(coords)
            }
            Ok(None) => {
                warn!("No coordinates for CEP {}; results will not be ranked by distance", postal);
                None
            }
            Err(e) => {
                warn!("Coordinate lookup for CEP {} failed: {}", postal, e);
                None
            }
        }
    }
}

// ─── Fixed values ───────────────────────────────────────────────

/// A region supplied by hand; every CEP maps to it.
#[derive(Debug, Clone)]
pub struct ManualRegion(pub PostalRegion);

impl RegionLookup for ManualRegion {
    fn lookup(&self, _postal: &PostalCode) -> Result<PostalRegion, LookupError> {
        Ok(self.0.clone())
    }
}

/// Fixed coordinates, or none at all (offline mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCoordinates(pub Option<Coordinates>);

impl FixedCoordinates {
    /// Never geocode; results come back in catalog order.
    pub fn none() -> Self {
        Self(None)
    }
}

impl CoordinateLookup for FixedCoordinates {
    fn lookup(&self, _postal: &PostalCode) -> Option<Coordinates> {
        self.0
    }
}
