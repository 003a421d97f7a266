//! Facility records, raw catalog rows and the per-request result entry.

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One row of the UBS dataset exactly as it appears in the source file.
///
/// Every field is kept as text; validation happens in
/// [`FacilityRecord::from_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFacilityRow {
    #[serde(rename = "NOME", alias = "NAME", default)]
    pub name: String,
    #[serde(rename = "LOGRADOURO", default)]
    pub street: String,
    #[serde(rename = "BAIRRO", default)]
    pub neighborhood: String,
    #[serde(rename = "LATITUDE", default)]
    pub latitude: Option<String>,
    #[serde(rename = "LONGITUDE", default)]
    pub longitude: Option<String>,
    #[serde(rename = "IBGE", default)]
    pub region_code: String,
    #[serde(rename = "UF", default)]
    pub state_code: String,
}

/// A validated facility with usable coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityRecord {
    pub name: String,
    pub street: String,
    pub neighborhood: String,
    /// IBGE municipality code; the first 6 digits identify the municipality.
    pub region_code: String,
    pub state_code: String,
    pub location: Coordinates,
}

impl FacilityRecord {
    /// Validate a raw row. Returns None when either coordinate is missing,
    /// unparseable or out of range.
    pub fn from_raw(raw: RawFacilityRow) -> Option<Self> {
        let lat = parse_coordinate(raw.latitude.as_deref()?)?;
        let lon = parse_coordinate(raw.longitude.as_deref()?)?;
        let location = Coordinates::new(lat, lon)?;

        Some(Self {
            name: raw.name.trim().to_string(),
            street: raw.street.trim().to_string(),
            neighborhood: raw.neighborhood.trim().to_string(),
            region_code: raw.region_code.trim().to_string(),
            state_code: raw.state_code.trim().to_string(),
            location,
        })
    }
}

/// Parse a coordinate that may use a decimal comma ("-23,5505").
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One ranked facility as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "endereco")]
    pub address: String,
    /// Kilometres from the reference point, two decimals. Null when the CEP
    /// could not be geocoded.
    #[serde(rename = "distancia_km")]
    pub distance_km: Option<f64>,
}

impl ResultEntry {
    /// Build the entry shown to the user. City and state come from the
    /// postal lookup, not from the facility row.
    pub fn new(record: &FacilityRecord, city: &str, state: &str, distance_km: Option<f64>) -> Self {
        Self {
            name: record.name.clone(),
            address: format_address(&record.street, &record.neighborhood, city, state),
            distance_km,
        }
    }
}

/// "street, neighborhood, city - UF". Blank parts stay blank.
pub fn format_address(street: &str, neighborhood: &str, city: &str, state: &str) -> String {
    format!("{}, {}, {} - {}", street, neighborhood, city, state)
}

/// Catalog loading errors. Any of these makes the catalog unavailable.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("data file {} not found", .0.display())]
    Missing(PathBuf),

    #[error("cannot read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse data file: {0}")]
    Csv(#[from] csv::Error),

    #[error("data file has no column '{0}'")]
    MissingColumn(&'static str),

    #[error("data file has no rows")]
    Empty,
}
