use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use atlas_proveedores::catalog::ProviderCatalog;
use atlas_proveedores::geo::{format_coords, format_distance};
use atlas_proveedores::ids::UuidIds;
use atlas_proveedores::import::import_providers;
use atlas_proveedores::location::{ProviderLocator, SearchLocation};
use atlas_proveedores::provider::{FilterState, ImportResult};
use atlas_proveedores::server;

/// Atlas Proveedores — provider directory engine.
///
/// Imports provider spreadsheets, resolves locations from map links,
/// coordinates, or addresses, and filters providers by distance.
///
/// Examples:
///   atlas import proveedores.csv
///   atlas resolve "https://maps.google.com/?q=-34.6037,-58.3816"
///   atlas resolve "La Plata, Buenos Aires"
///   atlas list proveedores.csv --near "Obelisco, Buenos Aires" --radius 20
///   atlas serve --port 8080
#[derive(Parser)]
#[command(name = "atlas", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate and import a provider spreadsheet, reporting per-row errors.
    Import {
        /// CSV file with the provider columns.
        file: PathBuf,

        /// Print the full import result as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Resolve a location query: map link, "lat,lng", or address text.
    Resolve {
        query: String,

        /// Skip network calls (map links and coordinates still work).
        #[arg(long)]
        offline: bool,

        /// Print the resolved location as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Import a file and list providers, optionally filtered and
    /// sorted by distance from a search location.
    List {
        /// CSV file with the provider columns.
        file: PathBuf,

        /// Search location (map link, coordinates, or address).
        #[arg(long)]
        near: Option<String>,

        /// Radius cut in km (only with --near). Default 20.
        #[arg(long)]
        radius: Option<f64>,

        /// Exact category filter.
        #[arg(long)]
        categoria: Option<String>,

        /// Exact province filter.
        #[arg(long)]
        provincia: Option<String>,

        /// Exact city filter.
        #[arg(long)]
        ciudad: Option<String>,

        /// Free-text filter over name, contact, and city.
        #[arg(long)]
        buscar: Option<String>,

        /// Skip network calls when resolving --near.
        #[arg(long)]
        offline: bool,

        /// Print the filtered providers as JSON to stdout.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP JSON API server.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Import { file, json } => {
            let result = run_import(&file);
            report_import(&result);
            if json {
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            }
            if !result.success {
                std::process::exit(1);
            }
        }

        Command::Resolve { query, offline, json } => {
            let mut locator = ProviderLocator::new();
            locator.set_offline(offline);

            match locator.resolve(&query) {
                Some(loc) => {
                    eprintln!("  \u{1F4CD} {}", loc.address);
                    eprintln!("  \u{1F4D0} {}", format_coords(loc.lat, loc.lng));
                    if json {
                        println!("{}", serde_json::to_string_pretty(&loc).unwrap());
                    }
                }
                None => {
                    eprintln!("Error: Location not found: '{}'", query);
                    std::process::exit(1);
                }
            }
        }

        Command::List {
            file,
            near,
            radius,
            categoria,
            provincia,
            ciudad,
            buscar,
            offline,
            json,
        } => {
            let result = run_import(&file);
            report_import(&result);
            if !result.success {
                std::process::exit(1);
            }

            let mut catalog = ProviderCatalog::new();
            catalog.set_providers(result.providers);

            if let Some(ref query) = near {
                catalog.set_search_location(Some(resolve_or_exit(query, offline)));
            }

            catalog.set_filters(FilterState {
                categoria: categoria.unwrap_or_default(),
                provincia: provincia.unwrap_or_default(),
                ciudad: ciudad.unwrap_or_default(),
                search_query: buscar.unwrap_or_default(),
                radius: match (&near, radius) {
                    (None, _) => None,
                    (Some(_), r) => r.or(FilterState::default().radius),
                },
            });

            let view = catalog.filtered_providers();

            if json {
                println!("{}", serde_json::to_string_pretty(&view).unwrap());
            } else {
                for p in &view {
                    let distance = match p.distance {
                        Some(km) => format!(" \u{2014} {}", format_distance(km)),
                        None => String::new(),
                    };
                    println!(
                        "{} \u{2014} {}, {} [{}]{}",
                        p.nombre_proveedor, p.ciudad, p.provincia, p.categoria, distance,
                    );
                }
                eprintln!("  {} proveedores", view.len());
            }
        }

        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
                eprintln!("Error: Cannot start runtime: {}", e);
                std::process::exit(1);
            });
            runtime.block_on(server::start(&host, port));
        }
    }
}

fn run_import(file: &Path) -> ImportResult {
    let bytes = std::fs::read(file).unwrap_or_else(|e| {
        eprintln!("Error: Cannot read {}: {}", file.display(), e);
        std::process::exit(1);
    });

    let mut ids = UuidIds;
    import_providers(&bytes, &mut ids)
}

fn report_import(result: &ImportResult) {
    for error in &result.errors {
        eprintln!("  \u{2717} {}", error);
    }
    for warning in &result.warnings {
        eprintln!("  \u{26A0} {}", warning);
    }
    eprintln!(
        "  {} proveedores importados, {} filas rechazadas",
        result.providers.len(),
        result.errors.len(),
    );
}

fn resolve_or_exit(query: &str, offline: bool) -> SearchLocation {
    let mut locator = ProviderLocator::new();
    locator.set_offline(offline);
    locator.resolve(query).unwrap_or_else(|| {
        eprintln!("Error: Location not found: '{}'", query);
        std::process::exit(1);
    })
}
