//! Postal-code collaborators.
//!
//! The resolver only sees the [`RegionLookup`] and [`CoordinateLookup`]
//! traits; ViaCEP and Nominatim are the production implementations.

pub mod providers;
pub mod types;

pub use providers::{FixedCoordinates, ManualRegion, NominatimLookup, ViaCepLookup};
pub use types::{CoordinateLookup, LookupError, PostalCode, PostalQuery, PostalRegion, RegionLookup};
