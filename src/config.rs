//! Resolver configuration.
//!
//! Built from CLI flags in `main.rs`; `Default` gives the production setup.

use crate::facility::DEFAULT_LIMIT;
use crate::geo::Coordinates;
use crate::postal::providers::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, NOMINATIM_URL, VIACEP_URL};
use crate::postal::PostalRegion;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATA_PATH: &str = "Unidades_Basicas_Saude-UBS.csv";

#[derive(Debug, Error)]
#[error("invalid configuration for {field}: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// `;`-delimited UBS dataset.
    pub data_path: PathBuf,
    /// Maximum facilities per answer.
    pub limit: usize,
    /// Timeout applied to each postal lookup.
    pub timeout: Duration,
    pub viacep_url: String,
    pub nominatim_url: String,
    pub user_agent: String,
    /// Write each result to this JSON file.
    pub export_path: Option<PathBuf>,
    /// Skip geocoding entirely.
    pub offline: bool,
    /// Use this region instead of asking ViaCEP.
    pub manual_region: Option<PostalRegion>,
    /// Use these coordinates instead of asking Nominatim.
    pub manual_coordinates: Option<Coordinates>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            limit: DEFAULT_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            viacep_url: VIACEP_URL.to_string(),
            nominatim_url: NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            export_path: None,
            offline: false,
            manual_region: None,
            manual_coordinates: None,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(invalid("limit", "must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout", "must be greater than zero"));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(invalid("data", "path cannot be empty"));
        }
        validate_url("viacep_url", &self.viacep_url)?;
        validate_url("nominatim_url", &self.nominatim_url)?;
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "cannot be empty"));
        }
        if let Some(region) = &self.manual_region {
            if region.city.trim().is_empty()
                || region.state_code.trim().is_empty()
                || region.region_code.trim().is_empty()
            {
                return Err(invalid("manual region", "city, UF and IBGE code are all required"));
            }
        }
        Ok(())
    }
}

fn validate_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(invalid(field, format!("'{}' is not an http(s) URL", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = ResolverConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.limit, 5);
        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cfg = ResolverConfig { limit: 0, ..Default::default() };
        assert_eq!(cfg.validate().unwrap_err().field, "limit");

        let cfg = ResolverConfig { timeout: Duration::ZERO, ..Default::default() };
        assert_eq!(cfg.validate().unwrap_err().field, "timeout");

        let cfg = ResolverConfig { viacep_url: "viacep.com.br".into(), ..Default::default() };
        assert_eq!(cfg.validate().unwrap_err().field, "viacep_url");

        let cfg = ResolverConfig {
            manual_region: Some(PostalRegion {
                city: "São Paulo".into(),
                state_code: "SP".into(),
                region_code: " ".into(),
            }),
            ..Default::default()
        };
        assert_eq!(cfg.validate().unwrap_err().field, "manual region");
    }
}
