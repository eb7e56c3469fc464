//! Character whereabouts shared between multiplayer peers.
//!
//! The primary peer sees every character and broadcasts their locations at a
//! fixed cadence. Secondaries replace their cached copy wholesale with the
//! newest message they receive.

use crate::constants::SYNC_INTERVAL_TICKS;
use crate::entity::EntitySnapshot;
use crate::geometry::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to encode or decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot channel is closed")]
    ChannelClosed,
}

/// Where one character was at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub location_name: String,
    /// World position in pixels
    pub x: f32,
    pub y: f32,
}

/// The message exchanged between peers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedLocationData {
    /// Tick the snapshot was captured on
    #[serde(default)]
    pub tick: u64,
    pub locations: HashMap<String, LocationData>,
}

impl SyncedLocationData {
    pub fn capture<'a>(tick: u64, entities: impl IntoIterator<Item = &'a EntitySnapshot>) -> Self {
        let locations = entities
            .into_iter()
            .map(|entity| {
                (
                    entity.id.clone(),
                    LocationData {
                        location_name: entity.location.clone(),
                        x: entity.position.x,
                        y: entity.position.y,
                    },
                )
            })
            .collect();
        Self { tick, locations }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeerRole {
    /// The single writer; captures and broadcasts snapshots.
    #[default]
    Primary,
    /// Read-only consumer of the primary's snapshots.
    Secondary,
}

/// Opaque transport for encoded snapshots.
pub trait SnapshotChannel {
    fn send(&mut self, message: Vec<u8>) -> Result<(), SnapshotError>;

    /// Next pending message, if any. Never blocks.
    fn try_recv(&mut self) -> Option<Vec<u8>>;
}

/// In-process channel over `std::sync::mpsc`.
#[derive(Debug)]
pub struct MpscChannel {
    tx: Option<Sender<Vec<u8>>>,
    rx: Option<Receiver<Vec<u8>>>,
}

impl MpscChannel {
    /// Two connected ends; whatever one sends the other receives.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (
            Self {
                tx: Some(a_tx),
                rx: Some(a_rx),
            },
            Self {
                tx: Some(b_tx),
                rx: Some(b_rx),
            },
        )
    }

    /// A receive-only end fed by another thread.
    pub fn from_receiver(rx: Receiver<Vec<u8>>) -> Self {
        Self { tx: None, rx: Some(rx) }
    }
}

impl SnapshotChannel for MpscChannel {
    fn send(&mut self, message: Vec<u8>) -> Result<(), SnapshotError> {
        let tx = self.tx.as_ref().ok_or(SnapshotError::ChannelClosed)?;
        tx.send(message).map_err(|_| SnapshotError::ChannelClosed)
    }

    fn try_recv(&mut self) -> Option<Vec<u8>> {
        match self.rx.as_ref()?.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Snapshot channel disconnected");
                self.rx = None;
                None
            }
        }
    }
}

/// The latest snapshot this peer knows of.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    latest: SyncedLocationData,
    stamped: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick of the snapshot currently held.
    pub fn tick(&self) -> Option<u64> {
        self.stamped.then_some(self.latest.tick)
    }

    pub fn latest(&self) -> &SyncedLocationData {
        &self.latest
    }

    /// Swaps in `snapshot` unless it is older than the one held.
    pub fn replace(&mut self, snapshot: SyncedLocationData) -> bool {
        if let Some(current) = self.tick()
            && snapshot.tick < current
        {
            log::debug!(
                "Ignoring snapshot from tick {} older than tick {current}",
                snapshot.tick
            );
            return false;
        }
        self.set_latest(snapshot);
        true
    }

    fn set_latest(&mut self, snapshot: SyncedLocationData) {
        self.latest = snapshot;
        self.stamped = true;
    }

    /// Brings the store up to date for `tick`.
    ///
    /// A primary captures `live` and broadcasts it every
    /// [`SYNC_INTERVAL_TICKS`]. A secondary drains `channel` instead.
    ///
    /// The primary's own capture always wins, even if the host tick went
    /// backwards; only received snapshots are checked against the held stamp.
    pub fn sync(
        &mut self,
        role: PeerRole,
        tick: u64,
        live: &[EntitySnapshot],
        channel: &mut dyn SnapshotChannel,
    ) {
        match role {
            PeerRole::Primary => {
                self.set_latest(SyncedLocationData::capture(tick, live));
                if tick % SYNC_INTERVAL_TICKS != 0 {
                    return;
                }
                let sent = self.latest.encode().and_then(|message| channel.send(message));
                if let Err(err) = sent {
                    log::warn!("Failed to broadcast snapshot: {err}");
                }
            }
            PeerRole::Secondary => {
                while let Some(message) = channel.try_recv() {
                    match SyncedLocationData::decode(&message) {
                        Ok(snapshot) => {
                            self.replace(snapshot);
                        }
                        Err(err) => log::warn!("Dropping malformed snapshot: {err}"),
                    }
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<EntitySnapshot> {
        let data = self.latest.locations.get(id)?;
        Some(EntitySnapshot::new(id, &data.location_name, Vec2::new(data.x, data.y)))
    }

    pub fn len(&self) -> usize {
        self.latest.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.locations.is_empty()
    }
}
