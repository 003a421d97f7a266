//! Opt-in export of resolution results.
//!
//! The resolver hands every successful result to a [`ResultSink`]. The
//! default sink drops it; [`JsonFileSink`] keeps the latest result on disk.

use crate::resolver::ResolveResult;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives each successful result. Failures are logged by the caller and
/// never fail the request.
pub trait ResultSink: Send + Sync {
    fn export(&self, result: &ResolveResult) -> Result<(), ExportError>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn export(&self, _result: &ResolveResult) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Overwrites one JSON file with the latest result.
///
/// Writes go through a sibling temp file and a rename, one at a time, so a
/// reader never sees a half-written file.
pub struct JsonFileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ResultSink for JsonFileSink {
    fn export(&self, result: &ResolveResult) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(result)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::{MatchScope, ResultEntry};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample(city: &str) -> ResolveResult {
        ResolveResult {
            postal_code: "01001000".into(),
            city: city.into(),
            state_code: "SP".into(),
            scope: MatchScope::Municipality,
            results: vec![ResultEntry {
                name: "UBS Sé".into(),
                address: "Rua Frederico Alvarenga, 259, Sé, São Paulo - SP".into(),
                distance_km: Some(0.3),
            }],
        }
    }

    #[test]
    fn test_json_file_sink_writes_latest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("ubs_resultado.json");
        let sink = JsonFileSink::new(&path);

        sink.export(&sample("São Paulo")).unwrap();
        sink.export(&sample("Osasco")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        // Non-ASCII stays readable.
        assert!(text.contains("UBS Sé"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["cidade"], "Osasco");
        assert_eq!(value["ubs_proximas"][0]["distancia_km"], 0.3);
        assert!(!sink.temp_path().exists());
    }

    #[test]
    fn test_json_file_sink_concurrent_writes_stay_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ubs_resultado.json");
        let sink = Arc::new(JsonFileSink::new(&path));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || sink.export(&sample(&format!("Cidade {}", i))).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["cidade"].as_str().unwrap().starts_with("Cidade "));
    }

    #[test]
    fn test_noop_sink() {
        assert!(NoopSink.export(&sample("São Paulo")).is_ok());
    }
}
