use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use hr_core::{GeoPoint, PointId, RouteConfig};
use hr_service::{Envelope, RouteRequest, RouteResponse, RouteService, ServiceResult};
use hr_store::SqliteStore;

#[derive(Parser)]
#[command(name = "hubroute")]
#[command(about = "Road routes from bus hubs to colleges", long_about = None)]
struct Cli {
    /// TOML settings file (default_speed_kmh, database, busy_timeout_ms)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database; overrides the settings file
    #[arg(long, global = true, env = "HUBROUTE_DB")]
    db: Option<PathBuf>,

    /// Default travel speed in km/h; overrides the settings file
    #[arg(long, global = true, env = "SPEED_KMH")]
    default_speed: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and all tables
    Init,
    /// Report the detected schema
    Probe,
    /// Compute a route between a hub and a college
    Route {
        /// Hub position as lon,lat
        #[arg(long, value_parser = parse_position, conflicts_with = "hub_id")]
        hub: Option<GeoPoint>,
        /// Hub id (bus_hubs.id)
        #[arg(long)]
        hub_id: Option<i64>,
        /// College position as lon,lat
        #[arg(long, value_parser = parse_position, conflicts_with = "college_id")]
        college: Option<GeoPoint>,
        /// College id (data.id)
        #[arg(long)]
        college_id: Option<i64>,
        /// Travel speed in km/h for this route
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Find the bus hub nearest to a college
    NearestHub {
        #[arg(long)]
        college_id: i64,
    },
    /// Save a student's college choice with its route
    SaveChoice {
        #[arg(long)]
        student_id: i64,
        #[arg(long)]
        college_id: i64,
        /// Hub id; the nearest hub is used when omitted
        #[arg(long)]
        hub_id: Option<i64>,
        /// How the hub was picked: manual or auto (default manual)
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn parse_position(s: &str) -> Result<GeoPoint, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lon,lat, got {s:?}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    Ok(GeoPoint::new(lon, lat))
}

/// Defaults, then the settings file, then flags and environment.
fn load_config(cli: &Cli) -> Result<RouteConfig> {
    let mut config = match &cli.config {
        Some(path) => RouteConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => RouteConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    if let Some(speed) = cli.default_speed {
        config.default_speed_kmh = speed;
    }
    config.validate()?;
    Ok(config)
}

/// Print `result` as a JSON envelope; failure maps to exit code 1.
fn emit<T: Serialize>(result: ServiceResult<T>) -> Result<ExitCode> {
    let code = if result.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    let envelope = Envelope::from(result);
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(code)
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let timeout = Duration::from_millis(config.busy_timeout_ms);

    // An unreachable store or a failed schema probe ends the process.
    let open = || {
        RouteService::from_config(config.clone())
            .with_context(|| format!("opening {}", config.database.display()))
    };

    match cli.command {
        Commands::Init => {
            let store = SqliteStore::init(&config.database, timeout)
                .with_context(|| format!("initialising {}", config.database.display()))?;
            info!("initialised {}", config.database.display());
            emit(Ok(store.schema().clone()))
        }
        Commands::Probe => emit(Ok(open()?.store().schema().clone())),
        Commands::Route { hub, hub_id, college, college_id, speed } => {
            let request = RouteRequest {
                hub_position:     hub,
                hub_id:           hub_id.map(PointId),
                college_position: college,
                college_id:       college_id.map(PointId),
                speed_kmh:        speed,
            };
            emit(open()?.route(&request).map(|r| RouteResponse::from(&r)))
        }
        Commands::NearestHub { college_id } => emit(open()?.nearest_hub(PointId(college_id))),
        Commands::SaveChoice { student_id, college_id, hub_id, source, notes } => emit(open()?.save_choice(
            student_id,
            PointId(college_id),
            hub_id.map(PointId),
            source.as_deref(),
            &notes,
        )),
    }
}
