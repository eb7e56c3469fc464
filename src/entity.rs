//! Tracked characters, their per-tick snapshots, and the quest log.

use crate::geometry::{TilePos, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What kind of character an entity is, with the fields only that kind has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CharacterKind {
    /// A player-controlled farmer, local or remote.
    #[serde(rename_all = "camelCase")]
    Player { name: String },
    /// A villager.
    #[serde(rename_all = "camelCase")]
    NonPlayer {
        display_name: String,
        /// Row of the head crop in the character's sprite sheet
        #[serde(default)]
        sprite_crop_y: i32,
        /// Birthday today and no gift given yet
        #[serde(default)]
        birthday_gift_pending: bool,
    },
    Mount,
}

/// A character on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub kind: CharacterKind,
}

impl Character {
    pub fn player(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: CharacterKind::Player {
                name: name.to_string(),
            },
        }
    }

    pub fn villager(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: CharacterKind::NonPlayer {
                display_name: id.to_string(),
                sprite_crop_y: 0,
                birthday_gift_pending: false,
            },
        }
    }

    pub fn mount(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: CharacterKind::Mount,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, CharacterKind::Player { .. })
    }

    pub fn is_villager(&self) -> bool {
        matches!(self.kind, CharacterKind::NonPlayer { .. })
    }

    pub fn is_mount(&self) -> bool {
        matches!(self.kind, CharacterKind::Mount)
    }

    pub fn display_name(&self) -> &str {
        match &self.kind {
            CharacterKind::Player { name } => name,
            CharacterKind::NonPlayer { display_name, .. } => display_name,
            CharacterKind::Mount => &self.id,
        }
    }

    pub fn birthday_gift_pending(&self) -> bool {
        match self.kind {
            CharacterKind::NonPlayer {
                birthday_gift_pending,
                ..
            } => birthday_gift_pending,
            _ => false,
        }
    }
}

/// Latest known whereabouts of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: String,
    pub location: String,
    /// World position in pixels
    pub position: Vec2,
    #[serde(default)]
    pub is_player_controlled: bool,
}

impl EntitySnapshot {
    pub fn new(id: &str, location: &str, position: Vec2) -> Self {
        Self {
            id: id.to_string(),
            location: location.to_string(),
            position,
            is_player_controlled: false,
        }
    }

    pub fn tile(&self) -> TilePos {
        self.position.tile()
    }
}

/// The local player's position, the reference point for every locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: String,
    pub location: String,
    pub position: Vec2,
}

impl PlayerState {
    pub fn new(id: &str, location: &str, position: Vec2) -> Self {
        Self {
            id: id.to_string(),
            location: location.to_string(),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestKind {
    ItemDelivery,
    SlayMonster,
    Fishing,
    ResourceCollection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub kind: QuestKind,
    /// Entity id of the character the quest is for
    pub target: String,
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub daily: bool,
    #[serde(default)]
    pub completed: bool,
}

impl Quest {
    /// The character this quest points at while it is open.
    pub fn open_target(&self) -> Option<&str> {
        if !(self.accepted && self.daily && !self.completed) {
            return None;
        }
        match self.kind {
            QuestKind::ItemDelivery
            | QuestKind::SlayMonster
            | QuestKind::Fishing
            | QuestKind::ResourceCollection => Some(self.target.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLog {
    pub quests: Vec<Quest>,
}

impl QuestLog {
    /// Ids targeted by accepted, unfinished daily quests.
    pub fn active_targets(&self) -> HashSet<&str> {
        self.quests.iter().filter_map(Quest::open_target).collect()
    }
}
