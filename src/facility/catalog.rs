//! In-memory facility catalog and the sources that produce it.
//!
//! The catalog is built once, then shared read-only behind an `Arc`.
//! Malformed rows are dropped at load time and counted, never fatal.

use super::types::{CatalogError, FacilityRecord, RawFacilityRow};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Columns that must be present in the header row.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("NOME", &["NOME", "NAME"]),
    ("LATITUDE", &["LATITUDE"]),
    ("LONGITUDE", &["LONGITUDE"]),
    ("IBGE", &["IBGE"]),
    ("UF", &["UF"]),
];

/// A validated, immutable list of facilities.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FacilityRecord>,
    skipped: usize,
}

impl Catalog {
    /// Wrap already-validated records.
    pub fn from_records(records: Vec<FacilityRecord>) -> Self {
        Self { records, skipped: 0 }
    }

    /// Validate raw rows. Rows with missing or bad coordinates are skipped.
    ///
    /// Fails with [`CatalogError::Empty`] only when there are no rows at all.
    pub fn load<I>(rows: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = RawFacilityRow>,
    {
        let mut records = Vec::new();
        let mut seen = 0usize;
        let mut skipped = 0usize;

        for raw in rows {
            seen += 1;
            let name = raw.name.clone();
            match FacilityRecord::from_raw(raw) {
                Some(rec) => records.push(rec),
                None => {
                    skipped += 1;
                    debug!("Skipping facility '{}': missing or invalid coordinates", name);
                }
            }
        }

        if seen == 0 {
            return Err(CatalogError::Empty);
        }

        Ok(Self { records, skipped })
    }

    /// Parse a `;`-delimited UBS file from any reader.
    ///
    /// Rows that cannot be decoded are skipped like rows with bad coordinates.
    /// Non-UTF-8 bytes are replaced rather than rejected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = StringRecord::from_byte_record_lossy(csv_reader.byte_headers()?.clone());
        check_columns(&headers)?;

        let mut rows = Vec::new();
        let mut malformed = 0usize;

        for result in csv_reader.byte_records() {
            let byte_record = match result {
                Ok(r) => r,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    malformed += 1;
                    debug!("Skipping unreadable row: {}", e);
                    continue;
                }
            };
            let record = StringRecord::from_byte_record_lossy(byte_record);
            match record.deserialize::<RawFacilityRow>(Some(&headers)) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    malformed += 1;
                    debug!("Skipping malformed row: {}", e);
                }
            }
        }

        let mut catalog = Self::load(rows)?;
        catalog.skipped += malformed;
        Ok(catalog)
    }

    /// Load the catalog from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::Missing(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!(
            "Loaded {} facilities from {} ({} rows skipped)",
            catalog.len(),
            path.display(),
            catalog.skipped()
        );
        Ok(catalog)
    }

    pub fn records(&self) -> &[FacilityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped during loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn check_columns(headers: &StringRecord) -> Result<(), CatalogError> {
    for (label, accepted) in REQUIRED_COLUMNS {
        let present = headers
            .iter()
            .any(|h| accepted.iter().any(|a| h.trim() == *a));
        if !present {
            return Err(CatalogError::MissingColumn(label));
        }
    }
    Ok(())
}

// ─── Catalog sources ─────────────────────────────────────────────

/// Something that can hand out the current catalog.
pub trait CatalogSource: Send + Sync {
    fn catalog(&self) -> Result<Arc<Catalog>, CatalogError>;
}

/// A catalog that is already in memory is always available.
impl CatalogSource for Arc<Catalog> {
    fn catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        Ok(Arc::clone(self))
    }
}

/// A CSV file loaded on first use and kept in memory afterwards.
///
/// While the file is missing or unreadable every call reports the error,
/// so a file dropped in place later is picked up without a restart.
pub struct CsvCatalog {
    path: PathBuf,
    loaded: RwLock<Option<Arc<Catalog>>>,
}

impl CsvCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: RwLock::new(None),
        }
    }

    /// Re-read the file and swap the in-memory catalog.
    ///
    /// On failure the previously loaded catalog, if any, stays in place.
    pub fn reload(&self) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = Arc::new(Catalog::from_path(&self.path)?);
        let mut slot = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }
}

impl CatalogSource for CsvCatalog {
    fn catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        {
            let slot = self.loaded.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(catalog) = slot.as_ref() {
                return Ok(Arc::clone(catalog));
            }
        }
        self.reload()
    }
}
