//! fleet-demo — runs the fleet engine in real time against a loopback
//! transport and persists its state between runs.
//!
//! The first run generates a population around the base coordinate; later
//! runs reload `drivers.json` from the output directory unless `--reset` is
//! given.  Every broadcast update is logged to `positions.csv`.
//!
//! ```text
//! RUST_LOG=info cargo run -p fleet-demo -- --seconds 20 --seed 7
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use fleet_core::{DriverStatus, EngineConfig};
use fleet_output::{CsvPositionLog, JsonSnapshotFile, PersistenceObserver};
use fleet_sim::{spawn_loopback, EngineBuilder, EngineHandle};
use fleet_state::{SortField, SortOrder};

#[derive(Parser)]
#[command(name = "fleet-demo")]
#[command(about = "Simulated delivery fleet with optimistic actions and persistence")]
struct Cli {
    /// Seconds of wall-clock time to run
    #[arg(long, default_value = "20")]
    seconds: u64,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON engine config; defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for drivers.json and the CSV logs
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Ignore any saved snapshot and generate a fresh population
    #[arg(long)]
    reset: bool,

    /// Keep driver status and ETA fixed in broadcast updates
    #[arg(long)]
    stable_status: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.stable_status {
        config.broadcast_mutates_status = false;
    }

    // ── Persistence ───────────────────────────────────────────────────────
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;
    let snapshot = JsonSnapshotFile::new(cli.out_dir.join("drivers.json"));
    let restored = if cli.reset { None } else { snapshot.load()? };
    match &restored {
        Some(d) => info!("restored {} drivers from {}", d.len(), snapshot.path().display()),
        None    => info!("no snapshot; generating {} drivers", config.population),
    }
    let csv = CsvPositionLog::new(&cli.out_dir)?;

    // ── Engine ────────────────────────────────────────────────────────────
    let base = config.base;
    let geofence_km = config.geofence_radius_km;
    let engine = EngineBuilder::new(config)
        .initial_drivers(restored.unwrap_or_default())
        .observer(PersistenceObserver::new((snapshot, csv)))
        .build()?;

    let task = EngineHandle::spawn(engine);
    let handle = task.handle();
    let loopback = spawn_loopback(&handle);
    handle.start().await?;

    // Reassign the first driver that is not mid-delivery.
    let drivers = handle.drivers().await?;
    if let Some(d) = drivers.iter().find(|d| d.status != DriverStatus::Delivering) {
        handle.select_driver(Some(d.id)).await?;
        let id = handle.reassign_selected().await?;
        info!("reassigned {} ({id})", d.name);
    }

    // ── Run ───────────────────────────────────────────────────────────────
    let started = Instant::now();
    let mut report = tokio::time::interval(Duration::from_secs(2));
    while started.elapsed() < Duration::from_secs(cli.seconds) {
        report.tick().await;
        let counts = handle.call(|e| e.store().counts()).await?;
        let pending = handle.pending_actions().await?.len();
        println!(
            "t={:>4.1}s  active {:>2}/{:<2}  pending {}",
            started.elapsed().as_secs_f64(),
            counts.active,
            counts.total,
            pending,
        );
    }

    handle.stop().await?;
    let engine = task.shutdown().await?;
    loopback.await.context("loopback task")?;

    // ── Summary ───────────────────────────────────────────────────────────
    let store = engine.store();
    let counts = store.counts();
    println!();
    println!("=== {} broadcast ticks, revision {} ===", engine.broadcast_ticks().0, engine.revision());
    println!("active {} / total {}", counts.active, counts.total);
    println!(
        "within {geofence_km} km of {base}: {}",
        store.within_geofence(base, geofence_km).len()
    );
    println!("soonest ETAs:");
    for d in store.search_and_sort("", SortField::Eta, SortOrder::Asc).iter().take(5) {
        println!(
            "  {:<20} {:<10} trail {:>3} pts  eta {}",
            d.name,
            d.status,
            d.route_history.len(),
            d.eta
        );
    }
    Ok(())
}
