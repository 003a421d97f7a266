//! Facility resolver: orchestrates one request.
//!
//! Flow: validate CEP → region lookup → coordinate lookup (best effort)
//!       → catalog → region filter → proximity ranking → export

use crate::config::ResolverConfig;
use crate::error::{Degradation, ResolveError};
use crate::export::{JsonFileSink, NoopSink, ResultSink};
use crate::facility::{self, Catalog, CatalogSource, CsvCatalog, MatchScope, ResultEntry, DEFAULT_LIMIT};
use crate::postal::{
    CoordinateLookup, FixedCoordinates, ManualRegion, NominatimLookup, PostalCode, PostalQuery,
    RegionLookup, ViaCepLookup,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The answer for one CEP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveResult {
    #[serde(rename = "cep")]
    pub postal_code: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "uf")]
    pub state_code: String,
    /// Whether the list came from the municipality or the state-wide fallback.
    #[serde(rename = "escopo")]
    pub scope: MatchScope,
    #[serde(rename = "ubs_proximas")]
    pub results: Vec<ResultEntry>,
}

/// Filter and rank the catalog for an already-resolved query.
///
/// Pure: the same query against the same catalog always gives the same result.
pub fn resolve_nearby(query: &PostalQuery, catalog: &Catalog, limit: usize) -> ResolveResult {
    let region = &query.region;
    let matched = facility::filter_region(catalog.records(), &region.region_code, &region.state_code);
    let ranked = facility::rank(&matched.records, query.reference, limit);

    let results = ranked
        .iter()
        .map(|r| ResultEntry::new(r.record, &region.city, &region.state_code, r.distance_km))
        .collect();

    ResolveResult {
        postal_code: query.postal.to_string(),
        city: region.city.clone(),
        state_code: region.state_code.clone(),
        scope: matched.scope,
        results,
    }
}

/// Resolves CEPs to nearby facilities using injected collaborators.
///
/// Holds no per-request state, so one instance can serve concurrent requests
/// behind an `Arc`.
pub struct FacilityResolver {
    regions: Box<dyn RegionLookup>,
    coordinates: Box<dyn CoordinateLookup>,
    catalog: Box<dyn CatalogSource>,
    sink: Box<dyn ResultSink>,
    limit: usize,
}

impl FacilityResolver {
    pub fn new(
        regions: impl RegionLookup + 'static,
        coordinates: impl CoordinateLookup + 'static,
        catalog: impl CatalogSource + 'static,
    ) -> Self {
        Self {
            regions: Box::new(regions),
            coordinates: Box::new(coordinates),
            catalog: Box::new(catalog),
            sink: Box::new(NoopSink),
            limit: DEFAULT_LIMIT,
        }
    }

    /// Production wiring: ViaCEP, Nominatim and a lazily loaded CSV file,
    /// with manual and offline overrides applied.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let regions: Box<dyn RegionLookup> = match &config.manual_region {
            Some(region) => Box::new(ManualRegion(region.clone())),
            None => Box::new(ViaCepLookup::new(
                config.viacep_url.as_str(),
                config.timeout,
                &config.user_agent,
            )),
        };

        let coordinates: Box<dyn CoordinateLookup> = match (config.manual_coordinates, config.offline) {
            (Some(coords), _) => Box::new(FixedCoordinates(Some(coords))),
            (None, true) => Box::new(FixedCoordinates::none()),
            (None, false) => Box::new(NominatimLookup::new(
                config.nominatim_url.as_str(),
                config.timeout,
                &config.user_agent,
            )),
        };

        let sink: Box<dyn ResultSink> = match &config.export_path {
            Some(path) => Box::new(JsonFileSink::new(path)),
            None => Box::new(NoopSink),
        };

        Self {
            regions,
            coordinates,
            catalog: Box::new(CsvCatalog::new(&config.data_path)),
            sink,
            limit: config.limit,
        }
    }

    /// Maximum number of facilities per answer.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Send every successful result to `sink`.
    pub fn with_sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The current catalog, loading it if needed.
    pub fn catalog(&self) -> Result<Arc<Catalog>, ResolveError> {
        Ok(self.catalog.catalog()?)
    }

    /// Resolve a raw, user-typed CEP.
    pub fn resolve(&self, raw_postal: &str) -> Result<ResolveResult, ResolveError> {
        let postal = PostalCode::parse(raw_postal)
            .ok_or_else(|| ResolveError::InvalidPostalCode(raw_postal.trim().to_string()))?;
        debug!("Resolving facilities for CEP {}", postal.formatted());

        let region = self.regions.lookup(&postal).map_err(|e| {
            warn!("Region lookup for CEP {} failed: {}", postal, e);
            ResolveError::from(e)
        })?;
        debug!(
            "CEP {} is in {} - {} (IBGE {})",
            postal, region.city, region.state_code, region.region_code
        );

        let reference = self.coordinates.lookup(&postal);
        if reference.is_none() {
            debug!("CEP {}: {}", postal, Degradation::NoCoordinates);
        }

        let catalog = self.catalog()?;

        let query = PostalQuery {
            postal,
            region,
            reference,
        };
        let result = resolve_nearby(&query, &catalog, self.limit);

        if result.results.is_empty() {
            info!("CEP {}: {} in {}", query.postal, Degradation::EmptyResult, query.region.state_code);
        } else {
            info!(
                "CEP {} -> {} facilities ({}, {})",
                query.postal,
                result.results.len(),
                result.scope,
                if reference.is_some() { "by distance" } else { "unranked" },
            );
        }

        if let Err(e) = self.sink.export(&result) {
            warn!("Could not export result for CEP {}: {}", query.postal, e);
        }

        Ok(result)
    }
}
