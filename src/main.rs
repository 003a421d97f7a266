use clap::Parser;
use consulta_certa::facility::DEFAULT_LIMIT;
use consulta_certa::geo::Coordinates;
use consulta_certa::postal::PostalRegion;
use consulta_certa::{logging, server, FacilityResolver, ResolverConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Consulta Certa: nearest public health units (UBS) for a CEP
///
/// Looks the CEP up on ViaCEP, geocodes it on Nominatim, and ranks the
/// facilities of the same municipality by distance.
///
/// Examples:
///   consulta 01001-000
///   consulta 01001000 --limit 10 --export ubs_resultado.json
///   consulta 01001000 --offline
///   consulta 01001000 --city "São Paulo" --uf SP --ibge 3550308 --lat -23.55 --lon -46.63
///   consulta --serve --port 5000
#[derive(Parser)]
#[command(name = "consulta", version, about, long_about = None)]
struct Cli {
    /// CEP to resolve (8 digits, punctuation ignored).
    #[arg(index = 1, required_unless_present = "serve")]
    cep: Option<String>,

    /// Start the HTTP server instead of resolving a single CEP.
    #[arg(long)]
    serve: bool,

    /// Server bind address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// UBS dataset (';'-delimited CSV).
    #[arg(long, default_value = consulta_certa::config::DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Maximum number of facilities returned.
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    /// Timeout for each postal lookup, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Write every result to this JSON file.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Offline mode: do not geocode; results are not ranked by distance.
    #[arg(long)]
    offline: bool,

    /// Manual region: city name (requires --uf and --ibge).
    #[arg(long, requires_all = ["uf", "ibge"])]
    city: Option<String>,

    /// Manual region: state code, e.g. SP.
    #[arg(long, requires = "city")]
    uf: Option<String>,

    /// Manual region: IBGE municipality code, e.g. 3550308.
    #[arg(long, requires = "city")]
    ibge: Option<String>,

    /// Manual reference latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Manual reference longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// ViaCEP base URL.
    #[arg(long, default_value = consulta_certa::postal::providers::VIACEP_URL)]
    viacep_url: String,

    /// Nominatim base URL.
    #[arg(long, default_value = consulta_certa::postal::providers::NOMINATIM_URL)]
    nominatim_url: String,

    /// User-Agent sent to the lookup services.
    #[arg(long, default_value = consulta_certa::postal::providers::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<ResolverConfig, String> {
        let manual_region = match (&self.city, &self.uf, &self.ibge) {
            (Some(city), Some(uf), Some(ibge)) => Some(PostalRegion {
                city: city.clone(),
                state_code: uf.to_uppercase(),
                region_code: ibge.clone(),
            }),
            _ => None,
        };

        let manual_coordinates = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon).ok_or_else(|| {
                "Invalid coordinates. Lat: -90..90, Lon: -180..180".to_string()
            })?),
            _ => None,
        };

        let config = ResolverConfig {
            data_path: self.data.clone(),
            limit: self.limit,
            timeout: Duration::from_secs(self.timeout),
            viacep_url: self.viacep_url.clone(),
            nominatim_url: self.nominatim_url.clone(),
            user_agent: self.user_agent.clone(),
            export_path: self.export.clone(),
            offline: self.offline,
            manual_region,
            manual_coordinates,
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.to_config().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let resolver = FacilityResolver::from_config(&config);

    if cli.serve {
        // Warm the catalog. A missing file is not fatal: requests answer 503
        // until it appears.
        if let Err(e) = resolver.catalog() {
            eprintln!("Warning: {}", e);
        }
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: cannot start runtime: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = runtime.block_on(server::start(&cli.host, cli.port, resolver)) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let Some(cep) = cli.cep.as_deref() else {
        eprintln!("Error: No CEP specified. Usage: consulta 01001-000");
        std::process::exit(1);
    };

    match resolver.resolve(cep) {
        Ok(result) => {
            eprintln!(
                "  \u{1F4CD} {} - {} ({} UBS, {})",
                result.city,
                result.state_code,
                result.results.len(),
                result.scope
            );
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(match e.kind() {
                consulta_certa::ErrorKind::InvalidInput => 2,
                _ => 1,
            });
        }
    }
}
