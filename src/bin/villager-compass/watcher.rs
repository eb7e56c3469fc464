//! Directory watcher acting as the receive side of the snapshot channel.
//!
//! Peers drop snapshots into the directory as `snapshot-<tick>.json`. The tick
//! in the file name stamps messages that do not carry one.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use villager_compass::snapshot::{MpscChannel, SyncedLocationData};

/// Keeps the file watcher alive; events stop when this is dropped.
pub struct SnapshotWatcher {
    _watcher: RecommendedWatcher,
}

impl SnapshotWatcher {
    /// Watches `dir` and returns the channel its snapshots arrive on. The
    /// newest snapshot already in the directory is delivered first.
    pub fn new(dir: &Path) -> Result<(Self, MpscChannel), notify::Error> {
        let (tx, rx) = mpsc::channel();

        let initial = Self::find_newest_snapshot(dir).and_then(|path| Self::read_snapshot(&path));
        if let Some(message) = initial {
            log::info!("Loaded initial snapshot from {}", dir.display());
            let _ = tx.send(message);
        }

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    log::warn!("Snapshot watch error: {err}");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            for path in event.paths {
                if let Some(message) = Self::read_snapshot(&path) {
                    log::debug!("New snapshot: {}", path.display());
                    let _ = tx.send(message);
                }
            }
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching snapshot folder: {}", dir.display());

        Ok((Self { _watcher: watcher }, MpscChannel::from_receiver(rx)))
    }

    /// Finds the snapshot with the highest tick in `dir`.
    fn find_newest_snapshot(dir: &Path) -> Option<PathBuf> {
        fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                parse_snapshot_filename(&path).map(|tick| (tick, path))
            })
            .max_by_key(|(tick, _)| *tick)
            .map(|(_, path)| path)
    }

    /// Reads and re-encodes a snapshot file, stamping it with the file's tick.
    /// Half-written or malformed files are skipped.
    fn read_snapshot(path: &Path) -> Option<Vec<u8>> {
        let tick = parse_snapshot_filename(path)?;
        let bytes = fs::read(path).ok().filter(|bytes| !bytes.is_empty())?;
        let mut snapshot = match SyncedLocationData::decode(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::debug!("Skipping {}: {err}", path.display());
                return None;
            }
        };
        if snapshot.tick == 0 {
            snapshot.tick = tick;
        }
        snapshot.encode().ok()
    }
}

/// Extracts the tick from a `snapshot-<tick>.json` file name.
pub fn parse_snapshot_filename(path: &Path) -> Option<u64> {
    let filename = path.file_name()?.to_str()?;
    let re = Regex::new(r"^snapshot-(?<tick>\d+)\.json$").ok()?;
    let caps = re.captures(filename)?;
    caps.name("tick")?.as_str().parse().ok()
}
