//! Consulta Certa: finds the public health units (UBS) nearest to a CEP.
//!
//! A CEP is resolved to its municipality through a postal lookup, geocoded
//! on a best-effort basis, and matched against an in-memory facility
//! catalog. Results are ranked by great-circle distance when coordinates
//! are known.

pub mod config;
pub mod error;
pub mod export;
pub mod facility;
pub mod geo;
pub mod logging;
pub mod postal;
pub mod resolver;
pub mod server;

pub use config::ResolverConfig;
pub use error::{Degradation, ErrorKind, ResolveError};
pub use resolver::{resolve_nearby, FacilityResolver, ResolveResult};
