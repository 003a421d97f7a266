use crate::resolver::FacilityResolver;

/// Shared across handlers. The resolver takes `&self`, so no lock is needed.
pub struct AppState {
    pub resolver: FacilityResolver,
}
