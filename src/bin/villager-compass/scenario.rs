//! JSON scenarios standing in for a live host.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use villager_compass::snapshot::SyncedLocationData;
use villager_compass::{
    CalibrationTable, CoordinateMapper, Frame, PeerRole, StaticGraph, TilePos, Tracker,
};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A building placed at runtime, e.g. a coop on the farm.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPlacement {
    pub interior: String,
    pub host: String,
    pub tile: TilePos,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub graph: StaticGraph,
    pub frame: Frame,
    #[serde(default)]
    pub role: PeerRole,
    #[serde(default)]
    pub buildings: Vec<BuildingPlacement>,
    /// Snapshot delivered to a secondary before the tick runs
    #[serde(default)]
    pub incoming: Option<SyncedLocationData>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&source)?)
    }

    /// A tracker primed with this scenario's locations and buildings.
    pub fn tracker(&self, table: CalibrationTable, role: PeerRole) -> Tracker {
        let mut tracker = Tracker::new(CoordinateMapper::new(table), role);
        for building in &self.buildings {
            tracker
                .mapper_mut()
                .register_building(&building.interior, &building.host, building.tile);
        }
        tracker.on_location_graph_changed(&self.graph);
        tracker
    }
}
