mod scenario;
mod watcher;

use clap::{Parser, Subcommand};
use scenario::Scenario;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use villager_compass::assets::{load_calibration, load_calibration_file};
use villager_compass::snapshot::MpscChannel;
use villager_compass::{
    CalibrationTable, Config, CoordinateMapper, PeerRole, SnapshotChannel, TilePos,
};
use watcher::SnapshotWatcher;

/// Host ticks per second.
const TICK_RATE: u64 = 60;

/// Maps villager positions onto the world map and computes off-screen locators
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Calibration table to use instead of the embedded one
    #[arg(long, global = true)]
    calibration: Option<PathBuf>,

    /// Config file; defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the map-page pixel for a tile in a location; `-1 -1` picks its fixed point
    Map {
        location: String,
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },
    /// Run a single tick from a JSON scenario and print the output as JSON
    Tick { scenario: PathBuf },
    /// Follow snapshots dropped into a directory as a secondary peer
    Watch { dir: PathBuf, scenario: PathBuf },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let table = match &args.calibration {
        Some(path) => load_calibration_file(path)?,
        None => load_calibration()?,
    };
    log::debug!("Loaded calibration for {} locations", table.len());

    match args.command {
        Command::Map { location, x, y } => {
            let pos = CoordinateMapper::new(table).map(&location, TilePos::new(x, y));
            println!("{}", serde_json::to_string(&pos)?);
        }
        Command::Tick { scenario } => {
            let config = load_config(args.config.as_deref())?;
            run_tick(table, &scenario, &config)?;
        }
        Command::Watch { dir, scenario } => {
            let config = load_config(args.config.as_deref())?;
            run_watch(table, &dir, &scenario, &config)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    match path.map(Path::to_path_buf).or_else(Config::default_path) {
        Some(path) => Ok(Config::load_or_default(&path)?),
        None => Ok(Config::default()),
    }
}

fn run_tick(table: CalibrationTable, path: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let scenario = Scenario::load(path)?;
    let mut tracker = scenario.tracker(table, scenario.role);
    let (mut local, mut remote) = MpscChannel::pair();

    if let Some(incoming) = &scenario.incoming {
        remote.send(incoming.encode()?)?;
    }

    let output = tracker.on_tick(&scenario.frame, config, &mut local);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_watch(
    table: CalibrationTable,
    dir: &Path,
    path: &Path,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let scenario = Scenario::load(path)?;
    let mut tracker = scenario.tracker(table, PeerRole::Secondary);
    let (_watcher, mut channel) = SnapshotWatcher::new(dir)?;

    let mut frame = scenario.frame.clone();
    let mut last_snapshot = None;
    loop {
        let output = tracker.on_tick(&frame, config, &mut channel);

        let snapshot = tracker.snapshots().tick();
        if snapshot != last_snapshot {
            last_snapshot = snapshot;
            for group in &output.locators {
                if let Some(locator) = group.active_locator() {
                    log::info!(
                        "[{}] {} of {}: {:?} edge at ({:.0}, {:.0}), {} tiles",
                        group.key,
                        locator.entity_id,
                        group.locators.len(),
                        locator.quadrant,
                        locator.screen_position.x,
                        locator.screen_position.y,
                        locator.distance_in_tiles()
                    );
                }
            }
        }

        frame.tick += 1;
        thread::sleep(Duration::from_millis(1000 / TICK_RATE));
    }
}
