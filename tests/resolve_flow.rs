use consulta_certa::facility::{CsvCatalog, MatchScope};
use consulta_certa::geo::Coordinates;
use consulta_certa::postal::{
    CoordinateLookup, FixedCoordinates, LookupError, ManualRegion, PostalCode, PostalRegion,
    RegionLookup, ViaCepLookup,
};
use consulta_certa::{ErrorKind, FacilityResolver, ResolveError};
use httpmock::prelude::*;
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const HEADER: &str = "CNES;UF;IBGE;NOME;LOGRADOURO;BAIRRO;LATITUDE;LONGITUDE";

fn write_dataset(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join("Unidades_Basicas_Saude-UBS.csv");
    let mut text = String::from(HEADER);
    for r in rows {
        text.push('\n');
        text.push_str(r);
    }
    text.push('\n');
    std::fs::write(&path, text).unwrap();
    path
}

fn sao_paulo() -> PostalRegion {
    PostalRegion {
        city: "São Paulo".into(),
        state_code: "SP".into(),
        region_code: "3550308".into(),
    }
}

/// Counts calls so tests can check the lookup order.
struct CountingCoordinates {
    calls: Arc<AtomicUsize>,
    answer: Option<Coordinates>,
}

impl CoordinateLookup for CountingCoordinates {
    fn lookup(&self, _postal: &PostalCode) -> Option<Coordinates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

struct TimedOut;

impl RegionLookup for TimedOut {
    fn lookup(&self, _postal: &PostalCode) -> Result<PostalRegion, LookupError> {
        Err(LookupError::Network("timed out".into()))
    }
}

#[test]
fn test_municipality_scenario_without_coordinates() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(
        dir.path(),
        &[
            "1;SP;355030;UBS SE;RUA FREDERICO ALVARENGA 259;SE;-23,5489;-46,6305",
            "2;RJ;330455;UBS TIJUCA;RUA CONDE DE BONFIM;TIJUCA;-22,92;-43,23",
            "3;SP;355030;UBS REPUBLICA;PRACA DA REPUBLICA;REPUBLICA;-23,5432;-46,6425",
            "4;SP;355030;UBS BOM RETIRO;RUA TENENTE PENA;BOM RETIRO;-23,5270;-46,6370",
            "5;SP;355030;UBS SEM COORDENADA;RUA X;SE;;",
        ],
    );

    let resolver = FacilityResolver::new(
        ManualRegion(sao_paulo()),
        FixedCoordinates::none(),
        CsvCatalog::new(data),
    );
    let result = resolver.resolve("01001000").unwrap();

    assert_eq!(result.scope, MatchScope::Municipality);
    assert_eq!(result.results.len(), 3);
    assert!(result.results.iter().all(|r| r.distance_km.is_none()));
    assert_eq!(result.results[0].name, "UBS SE");
    assert_eq!(result.results[0].address, "RUA FREDERICO ALVARENGA 259, SE, São Paulo - SP");
}

#[test]
fn test_distance_scenario() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(
        dir.path(),
        &[
            "1;SP;355030;UBS LONGE;RUA A;CENTRO;-23.539208;-46.63",
            "2;SP;355030;UBS PERTO;RUA B;CENTRO;-23.547302;-46.63",
        ],
    );

    let here = Coordinates::new(-23.55, -46.63).unwrap();
    let resolver = FacilityResolver::new(
        ManualRegion(sao_paulo()),
        FixedCoordinates(Some(here)),
        CsvCatalog::new(data),
    );
    let result = resolver.resolve("01001-000").unwrap();

    let distances: Vec<f64> = result.results.iter().map(|r| r.distance_km.unwrap()).collect();
    assert_eq!(distances, vec![0.3, 1.2]);
    assert_eq!(result.results[0].name, "UBS PERTO");
}

#[test]
fn test_state_fallback_scenario() {
    let dir = TempDir::new().unwrap();
    let rows: Vec<String> = (0..50)
        .map(|i| format!("{};SP;350950;UBS CAMPINAS {};RUA {};CENTRO;-22.90;-47.06", i, i, i))
        .collect();
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let data = write_dataset(dir.path(), &row_refs);

    let resolver = FacilityResolver::new(
        ManualRegion(sao_paulo()),
        FixedCoordinates::none(),
        CsvCatalog::new(data),
    );
    let result = resolver.resolve("01001000").unwrap();

    assert_eq!(result.scope, MatchScope::State);
    assert_eq!(result.results.len(), 5);
    assert_eq!(result.results[0].name, "UBS CAMPINAS 0");
}

#[test]
fn test_viacep_end_to_end() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(dir.path(), &["1;SP;355030;UBS SE;RUA A;SE;-23.5489;-46.6305"]);

    let server = MockServer::start();
    let viacep = server.mock(|when, then| {
        when.method(GET).path("/ws/01001000/json/");
        then.status(200).json_body(json!({
            "cep": "01001-000",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        }));
    });

    let resolver = FacilityResolver::new(
        ViaCepLookup::new(server.base_url(), Duration::from_secs(2), "test"),
        FixedCoordinates::none(),
        CsvCatalog::new(data),
    );
    let result = resolver.resolve("01001-000").unwrap();

    viacep.assert();
    assert_eq!(result.city, "São Paulo");
    assert_eq!(result.results.len(), 1);
}

#[test]
fn test_region_failure_skips_geocoding() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(dir.path(), &["1;SP;355030;UBS SE;RUA A;SE;-23.5489;-46.6305"]);
    let calls = Arc::new(AtomicUsize::new(0));

    let resolver = FacilityResolver::new(
        TimedOut,
        CountingCoordinates {
            calls: Arc::clone(&calls),
            answer: None,
        },
        CsvCatalog::new(data),
    );
    let err = resolver.resolve("01001000").unwrap_err();

    assert!(matches!(err, ResolveError::RegionLookupFailed(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_dataset_is_fatal_after_lookups() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let resolver = FacilityResolver::new(
        ManualRegion(sao_paulo()),
        CountingCoordinates {
            calls: Arc::clone(&calls),
            answer: Coordinates::new(-23.55, -46.63),
        },
        CsvCatalog::new(dir.path().join("missing.csv")),
    );
    let err = resolver.resolve("01001000").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_repeated_queries_are_identical() {
    let dir = TempDir::new().unwrap();
    let data = write_dataset(
        dir.path(),
        &[
            "1;SP;355030;UBS A;RUA A;CENTRO;-23.56;-46.63",
            "2;SP;355030;UBS B;RUA B;CENTRO;-23.54;-46.62",
            "3;SP;355030;UBS C;RUA C;CENTRO;-23.58;-46.61",
        ],
    );
    let resolver = FacilityResolver::new(
        ManualRegion(sao_paulo()),
        FixedCoordinates(Coordinates::new(-23.55, -46.63)),
        CsvCatalog::new(data),
    );

    let first = resolver.resolve("01001000").unwrap();
    let second = resolver.resolve("01001000").unwrap();
    assert_eq!(first, second);
}
