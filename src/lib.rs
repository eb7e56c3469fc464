//! Coordinate mapping and spatial indicators for villager tracking.
//!
//! Entity world positions are turned into two presentations: off-screen
//! locator arrows pointing at characters outside the viewport, and markers on
//! a cropped minimap of the static map page.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod assets;
pub mod compass;
pub mod config;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod geometry;
pub mod location;
pub mod locator;
pub mod mapper;
pub mod markers;
pub mod minimap;
pub mod quadrant;
pub mod snapshot;

pub use compass::{Compass, LocatorGroup};
pub use config::Config;
pub use engine::{Frame, TickOutput, Tracker};
pub use entity::{Character, CharacterKind, EntitySnapshot, PlayerState, Quest, QuestKind, QuestLog};
pub use geometry::{PixelPos, Rect, TilePos, Vec2};
pub use location::{LocationContext, LocationContexts, LocationGraph, LocationKind, StaticGraph};
pub use locator::Locator;
pub use mapper::CoordinateMapper;
pub use markers::{FarmerTracker, MapMarker};
pub use minimap::{MinimapView, MinimapWindow};
pub use quadrant::Quadrant;
pub use snapshot::{PeerRole, SnapshotChannel, SnapshotStore, SyncedLocationData};

/// A calibration point tying a game tile to a pixel on the static map page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    /// Tile column in the game location
    pub tile_x: i32,
    /// Tile row in the game location
    pub tile_y: i32,
    /// Horizontal pixel on the map page
    pub pixel_x: i32,
    /// Vertical pixel on the map page
    pub pixel_y: i32,
}

impl Landmark {
    pub const fn new(tile_x: i32, tile_y: i32, pixel_x: i32, pixel_y: i32) -> Self {
        Self {
            tile_x,
            tile_y,
            pixel_x,
            pixel_y,
        }
    }

    pub fn pixel(&self) -> PixelPos {
        PixelPos::new(self.pixel_x, self.pixel_y)
    }
}

/// Calibration data for a single game location (e.g., "Town", "ScienceHouse")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationEntry {
    /// Location name as reported by the host
    pub name: String,
    /// Whether the location is outdoors
    #[serde(default)]
    pub outdoors: bool,
    /// Known tile -> pixel pairs. A single landmark marks a fixed-point region.
    pub landmarks: Vec<Landmark>,
}

/// Root type for the calibration data file
pub type CalibrationData = Vec<CalibrationEntry>;

/// Read-only lookup of calibration entries by location name.
#[derive(Debug, Clone, Default)]
pub struct CalibrationTable {
    entries: HashMap<String, CalibrationEntry>,
}

impl CalibrationTable {
    /// Builds a table, dropping entries that carry no landmarks.
    pub fn new(data: CalibrationData) -> Self {
        let entries = data
            .into_iter()
            .filter(|entry| {
                if entry.landmarks.is_empty() {
                    log::warn!("Calibration entry '{}' has no landmarks", entry.name);
                    false
                } else {
                    true
                }
            })
            .map(|entry| (entry.name.clone(), entry))
            .collect();

        Self { entries }
    }

    /// Parses a table from RON text in the same format as the embedded asset.
    pub fn from_ron_str(source: &str) -> Result<Self, ron::de::SpannedError> {
        let data: CalibrationData = ron::from_str(source)?;
        Ok(Self::new(data))
    }

    pub fn get(&self, location: &str) -> Option<&CalibrationEntry> {
        self.entries.get(location)
    }

    pub fn landmarks(&self, location: &str) -> Option<&[Landmark]> {
        self.entries
            .get(location)
            .map(|entry| entry.landmarks.as_slice())
    }

    pub fn is_outdoors(&self, location: &str) -> bool {
        self.entries
            .get(location)
            .is_some_and(|entry| entry.outdoors)
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<CalibrationEntry> for CalibrationTable {
    fn from_iter<T: IntoIterator<Item = CalibrationEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
