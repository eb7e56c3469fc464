//! The per-tick entry point the host adapter drives.

use crate::compass::{Compass, LocatorGroup};
use crate::config::Config;
use crate::entity::{Character, EntitySnapshot, PlayerState, QuestLog};
use crate::geometry::Rect;
use crate::location::{LocationContexts, LocationGraph};
use crate::mapper::CoordinateMapper;
use crate::markers::{self, FarmerTracker, MapMarker};
use crate::minimap::{Minimap, MinimapView};
use crate::snapshot::{PeerRole, SnapshotChannel, SnapshotStore};
use serde::{Deserialize, Serialize};

/// Everything the host reports for one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub tick: u64,
    pub player: PlayerState,
    /// Visible world rectangle in pixels
    pub viewport: Rect,
    /// Characters that may be tracked
    pub roster: Vec<Character>,
    /// Live positions of the other online players
    #[serde(default)]
    pub peers: Vec<EntitySnapshot>,
    /// Live positions of non-players; only the primary peer sees these
    #[serde(default)]
    pub npc_positions: Vec<EntitySnapshot>,
    #[serde(default)]
    pub quests: QuestLog,
}

/// What the renderer draws this tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutput {
    pub locators: Vec<LocatorGroup>,
    pub map_markers: Vec<MapMarker>,
    pub minimap: Option<MinimapView>,
}

/// Owns every cache that survives between ticks.
#[derive(Debug)]
pub struct Tracker {
    mapper: CoordinateMapper,
    contexts: LocationContexts,
    compass: Compass,
    farmers: FarmerTracker,
    snapshots: SnapshotStore,
    role: PeerRole,
}

impl Tracker {
    pub fn new(mapper: CoordinateMapper, role: PeerRole) -> Self {
        Self {
            mapper,
            contexts: LocationContexts::default(),
            compass: Compass::new(),
            farmers: FarmerTracker::new(),
            snapshots: SnapshotStore::new(),
            role,
        }
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// For registering buildings placed at runtime.
    pub fn mapper_mut(&mut self) -> &mut CoordinateMapper {
        &mut self.mapper
    }

    pub fn contexts(&self) -> &LocationContexts {
        &self.contexts
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Cycles every door aggregate to its next character.
    pub fn cycle_warp_stacks(&mut self) {
        self.compass.cycle_warp_stacks();
    }

    /// Rebuilds the location hierarchy after the host's location list changed.
    pub fn on_location_graph_changed(&mut self, graph: &impl LocationGraph) {
        self.contexts.rebuild(graph);
        log::info!("Location graph changed, {} contexts cached", self.contexts.len());
    }

    pub fn on_tick(
        &mut self,
        frame: &Frame,
        config: &Config,
        channel: &mut dyn SnapshotChannel,
    ) -> TickOutput {
        self.snapshots.sync(self.role, frame.tick, &frame.npc_positions, channel);

        // Players are live; everyone else is read from the latest snapshot.
        let resolved: Vec<(&Character, EntitySnapshot)> = frame
            .roster
            .iter()
            .filter(|character| character.id != frame.player.id)
            .filter_map(|character| {
                let snapshot = if character.is_player() {
                    frame.peers.iter().find(|peer| peer.id == character.id).cloned()
                } else {
                    self.snapshots.get(&character.id)
                };
                snapshot.map(|snapshot| (character, snapshot))
            })
            .collect();
        let entities: Vec<(&Character, &EntitySnapshot)> =
            resolved.iter().map(|(character, snapshot)| (*character, snapshot)).collect();

        let quest_targets = frame.quests.active_targets();

        let locators = self.compass.update(
            &frame.player,
            frame.viewport,
            &entities,
            &self.contexts,
            &quest_targets,
            config,
        );

        let mut online = vec![EntitySnapshot {
            is_player_controlled: true,
            ..EntitySnapshot::new(&frame.player.id, &frame.player.location, frame.player.position)
        }];
        online.extend(frame.peers.iter().cloned());
        self.farmers.update(&self.mapper, &online);

        let mut map_markers = markers::build_villager_markers(
            &self.mapper,
            &self.contexts,
            &frame.player,
            &entities,
            &quest_targets,
            config,
        );
        map_markers.extend(self.farmers.markers());

        let minimap = config
            .minimap
            .enabled
            .then(|| self.minimap(frame, config, &map_markers))
            .flatten();

        TickOutput {
            locators,
            map_markers,
            minimap,
        }
    }

    fn minimap(
        &self,
        frame: &Frame,
        config: &Config,
        markers: &[MapMarker],
    ) -> Option<MinimapView> {
        let player_map_pos = self
            .mapper
            .resolve(&frame.player.location, frame.player.position.tile());
        if player_map_pos.is_zero() {
            log::trace!("No minimap for unmapped location '{}'", frame.player.location);
            return None;
        }
        let window = Minimap::from_config(&config.minimap).window(player_map_pos);
        Some(Minimap::project(window, markers))
    }
}
