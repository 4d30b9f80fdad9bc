use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use api::{AppState, run_server};
use clap::{Parser, Subcommand};
use dashboard::DashboardView;
use dotenvy::dotenv;
use geo::Coordinates;
use itertools::Itertools;
use model::{FLEET, Route, Stop, Vehicle};
use store::RouteStore;
use tokio::sync::RwLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracker::{ProgressState, RouteTracker, StopReached};

mod api;
mod dashboard;
mod geo;
mod model;
mod store;
mod tracker;
mod utils;

#[derive(Parser)]
#[command(name = "bus_progress")]
#[command(about = "Follows a bus along its stops using live GPS fixes")]
struct Cli {
    /// JSON file mapping route names to their stops
    #[arg(long, env = "ROUTES_FILE", default_value = "lignes_config.json")]
    routes_file: PathBuf,

    /// Directory for the daily rolling log files
    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP session service
    Serve {
        #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
        port: u16,
    },
    /// List routes and how many stops they have
    Routes,
    /// List the fleet
    Vehicles,
    /// Create an empty route
    AddRoute { name: String },
    /// Append a stop to the end of a route
    AddStop {
        route: String,
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Scheduled time, HH:MM
        #[arg(long)]
        time: String,
    },
    /// Feed recorded fixes through the tracker. One JSON object
    /// `{"latitude": .., "longitude": ..}` or `null` per line.
    Replay {
        route: String,
        positions: PathBuf,
        #[arg(long, default_value = "102")]
        vehicle: String,
    },
}

fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily(log_dir, "bus_progress.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    let console_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .pretty();

    Registry::default()
        .with(file_log)
        .with(console_log)
        .with(env_filter)
        .init();

    guard
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    _ = dotenv();
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_dir);

    let mut store = RouteStore::open(&cli.routes_file)?;
    info!(
        "loaded {} routes from {}",
        store.routes().len(),
        store.path().display()
    );

    match cli.command {
        Command::Serve { port } => {
            let state = Arc::new(RwLock::new(AppState::new(store)));
            run_server(state, port).await?;
        }
        Command::Routes => {
            for (name, stops) in store.routes() {
                println!("{name} ({} stops)", stops.len());
            }
        }
        Command::Vehicles => {
            for vehicle in FLEET.iter() {
                println!("{vehicle}");
            }
        }
        Command::AddRoute { name } => {
            store.add_route(&name)?;
            println!("Route {} created", name.trim());
        }
        Command::AddStop {
            route,
            name,
            lat,
            lon,
            time,
        } => {
            store.add_stop(&route, Stop::new(name, lat, lon, time))?;
            println!("Stop added to {route}");
        }
        Command::Replay {
            route,
            positions,
            vehicle,
        } => {
            let vehicle = Vehicle::find(&vehicle)
                .ok_or_else(|| anyhow!("no vehicle with fleet number {vehicle}"))?;
            let route = store
                .route(&route)
                .ok_or_else(|| anyhow!("no route named {route}"))?;
            let fixes = read_positions(&positions)?;

            print!("{}", replay(&route, vehicle, fixes));
        }
    }

    Ok(())
}

fn read_positions(path: &Path) -> Result<Vec<Option<Coordinates>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("couldn't read {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{} line {}: bad position", path.display(), i + 1))
        })
        .collect()
}

/// Runs every fix through a fresh trip and renders the arrivals and the final dashboard.
fn replay(route: &Route, vehicle: Vehicle, fixes: Vec<Option<Coordinates>>) -> String {
    let mut state = ProgressState::default();
    let mut tracker = RouteTracker::new(&route.stops, &mut state);
    let mut arrivals: Vec<StopReached> = Vec::new();
    let mut last = None;

    for fix in fixes {
        last = Some(tracker.evaluate(fix, &mut arrivals));
    }

    let mut out = arrivals
        .iter()
        .map(|a| format!("Arrived at {}\n", a.stop))
        .join("");
    let view = DashboardView::build(&route.name, vehicle, &tracker, last.as_ref());
    out.push_str(&view.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_route_book;

    #[test]
    fn test_replay_walks_route() {
        let stops = default_route_book().remove("Ligne Test").unwrap();
        let route = Route::new("Ligne Test", stops.clone());
        let fixes = vec![
            None,
            Some(stops[0].coordinates()),
            Some(stops[0].coordinates()),
            Some(stops[1].coordinates()),
            Some(stops[2].coordinates()),
        ];

        let out = replay(&route, Vehicle::default_vehicle(), fixes);

        assert!(out.starts_with("Arrived at Départ\nArrived at Centre\n"));
        assert!(out.contains("NEXT STOP: Terminus"));
        assert!(out.contains("GPS: 0 m"));
        assert!(out.contains("➡ 08:30 - Terminus"));
    }

    #[test]
    fn test_read_positions() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir()
            .join(format!("bus_progress_fixes_{}.jsonl", std::process::id()));
        std::fs::write(&path, "null\n{\"latitude\": 47.6, \"longitude\": 7.2}\n\n")?;

        let fixes = read_positions(&path)?;

        assert_eq!(fixes, vec![None, Some(Coordinates::new(47.6, 7.2))]);

        std::fs::write(&path, "{\"latitude\": \"north\"}\n")?;
        assert!(read_positions(&path).is_err());

        std::fs::remove_file(&path)?;
        Ok(())
    }
}
