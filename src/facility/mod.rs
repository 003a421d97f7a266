//! Facility catalog, region filter and proximity ranker.

pub mod catalog;
pub mod filter;
pub mod rank;
pub mod types;

pub use catalog::{Catalog, CatalogSource, CsvCatalog};
pub use filter::{filter_region, MatchScope, RegionMatch};
pub use rank::{rank, RankedFacility, DEFAULT_LIMIT};
pub use types::{CatalogError, FacilityRecord, RawFacilityRow, ResultEntry};
