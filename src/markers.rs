//! Character markers on the map page.

use crate::config::Config;
use crate::constants::{FARMER_DRAW_DELAY, FARMER_JUMP_THRESHOLD};
use crate::entity::{Character, EntitySnapshot, PlayerState};
use crate::geometry::{PixelPos, Vec2};
use crate::location::LocationContexts;
use crate::mapper::CoordinateMapper;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Draw layer of outdoor villager markers; indoor ones sit below.
const OUTDOOR_LAYER: i32 = 6;
const INDOOR_LAYER: i32 = 2;
const HIDDEN_LAYER_OFFSET: i32 = -2;
/// Farmers draw above every villager layer.
const FARMER_LAYER: i32 = OUTDOOR_LAYER + 2;

/// A character's position on the map page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub entity_id: String,
    pub map_position: PixelPos,
    /// Higher layers draw on top
    pub layer: i32,
    pub is_outdoors: bool,
    /// Filtered out by the config, drawn dimmed when hidden markers are shown
    pub is_hidden: bool,
    pub has_quest: bool,
    pub is_birthday: bool,
}

/// Projects villagers onto the map page, ordered bottom layer first.
pub fn build_villager_markers(
    mapper: &CoordinateMapper,
    contexts: &LocationContexts,
    player: &PlayerState,
    villagers: &[(&Character, &EntitySnapshot)],
    quest_targets: &HashSet<&str>,
    config: &Config,
) -> Vec<MapMarker> {
    let player_root = contexts.get(&player.location).map(|ctx| ctx.root.as_str());

    let mut markers: Vec<MapMarker> = villagers
        .iter()
        .filter(|(character, _)| character.is_villager())
        .filter_map(|&(character, snapshot)| {
            if config.is_hidden_villager(&character.id) || !mapper.knows(&snapshot.location) {
                return None;
            }

            let root = contexts.get(&snapshot.location).map(|ctx| ctx.root.as_str());
            let is_hidden = config.same_location_only && (root.is_none() || root != player_root);
            if is_hidden && !config.show_hidden {
                return None;
            }

            let is_outdoors = mapper.table().is_outdoors(&snapshot.location);
            let has_quest = quest_targets.contains(character.id.as_str());
            let is_birthday = character.birthday_gift_pending();

            let mut layer = if is_outdoors { OUTDOOR_LAYER } else { INDOOR_LAYER };
            if is_hidden {
                layer += HIDDEN_LAYER_OFFSET;
            }
            if has_quest || is_birthday {
                layer += 1;
            }

            Some(MapMarker {
                entity_id: character.id.clone(),
                map_position: mapper.resolve(&snapshot.location, snapshot.tile()),
                layer,
                is_outdoors,
                is_hidden,
                has_quest,
                is_birthday,
            })
        })
        .collect();

    markers.sort_by(|a, b| a.layer.cmp(&b.layer).then_with(|| a.entity_id.cmp(&b.entity_id)));
    markers
}

#[derive(Debug, Clone)]
struct FarmerState {
    location: String,
    map_position: PixelPos,
    is_outdoors: bool,
    draw_delay: u32,
}

/// Map positions of online farmers.
///
/// A peer's location can update a few ticks before its tile does, which makes
/// its marker flash across the map. A jump within the same location holds the
/// marker back for a few ticks until the position settles.
#[derive(Debug, Default)]
pub struct FarmerTracker {
    farmers: HashMap<String, FarmerState>,
}

impl FarmerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current positions of every online farmer. Farmers missing
    /// from `farmers` are forgotten.
    pub fn update(&mut self, mapper: &CoordinateMapper, farmers: &[EntitySnapshot]) {
        let online: HashSet<&str> = farmers.iter().map(|farmer| farmer.id.as_str()).collect();
        self.farmers.retain(|id, _| online.contains(id.as_str()));

        for snapshot in farmers {
            let map_position = mapper.resolve(&snapshot.location, snapshot.tile());
            if map_position.is_zero() {
                continue;
            }
            let is_outdoors = mapper.table().is_outdoors(&snapshot.location);

            match self.farmers.get_mut(&snapshot.id) {
                Some(state) => {
                    let jump = Vec2::from(map_position).distance(Vec2::from(state.map_position));
                    if state.location == snapshot.location
                        && jump > f64::from(FARMER_JUMP_THRESHOLD)
                    {
                        log::trace!("Farmer {} jumped {jump:.0}px, delaying marker", snapshot.id);
                        state.draw_delay = FARMER_DRAW_DELAY;
                    } else if state.draw_delay > 0 {
                        state.draw_delay -= 1;
                    }
                    state.location = snapshot.location.clone();
                    state.map_position = map_position;
                    state.is_outdoors = is_outdoors;
                }
                None => {
                    self.farmers.insert(
                        snapshot.id.clone(),
                        FarmerState {
                            location: snapshot.location.clone(),
                            map_position,
                            is_outdoors,
                            draw_delay: 0,
                        },
                    );
                }
            }
        }
    }

    pub fn is_drawable(&self, id: &str) -> bool {
        self.farmers.get(id).is_some_and(|state| state.draw_delay == 0)
    }

    /// Markers for every farmer whose position has settled.
    pub fn markers(&self) -> Vec<MapMarker> {
        let mut markers: Vec<MapMarker> = self
            .farmers
            .iter()
            .filter(|(_, state)| state.draw_delay == 0)
            .map(|(id, state)| MapMarker {
                entity_id: id.clone(),
                map_position: state.map_position,
                layer: FARMER_LAYER,
                is_outdoors: state.is_outdoors,
                is_hidden: false,
                has_quest: false,
                is_birthday: false,
            })
            .collect();
        markers.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CharacterKind;
    use crate::location::tests::valley;
    use crate::{CalibrationEntry, CalibrationTable, Landmark};

    fn mapper() -> CoordinateMapper {
        let entry = |name: &str, outdoors: bool, landmarks: Vec<Landmark>| CalibrationEntry {
            name: name.to_string(),
            outdoors,
            landmarks,
        };
        CoordinateMapper::new(CalibrationTable::new(vec![
            entry(
                "Town",
                true,
                vec![Landmark::new(0, 0, 600, 160), Landmark::new(100, 100, 800, 400)],
            ),
            entry(
                "Mountain",
                true,
                vec![Landmark::new(0, 0, 700, 60), Landmark::new(100, 50, 900, 160)],
            ),
            entry("ScienceHouse", false, vec![Landmark::new(0, 0, 730, 80)]),
            entry("SebastianRoom", false, vec![Landmark::new(0, 0, 730, 80)]),
        ]))
    }

    fn at(id: &str, location: &str, tile_x: f32, tile_y: f32) -> EntitySnapshot {
        EntitySnapshot::new(id, location, Vec2::new(tile_x * 64.0, tile_y * 64.0))
    }

    fn birthday(id: &str) -> Character {
        Character {
            id: id.to_string(),
            kind: CharacterKind::NonPlayer {
                display_name: id.to_string(),
                sprite_crop_y: 0,
                birthday_gift_pending: true,
            },
        }
    }

    #[test]
    fn layers_reflect_indoors_quests_and_birthdays() {
        let contexts = crate::LocationContexts::build(&valley());
        let player = PlayerState::new("me", "Town", Vec2::ZERO);
        let (emily, maru, sam) =
            (Character::villager("Emily"), Character::villager("Maru"), birthday("Sam"));
        let s1 = at("Emily", "Town", 50.0, 50.0);
        let s2 = at("Maru", "ScienceHouse", 3.0, 3.0);
        let s3 = at("Sam", "Town", 10.0, 10.0);
        let quests = HashSet::from(["Maru"]);

        let markers = build_villager_markers(
            &mapper(),
            &contexts,
            &player,
            &[(&emily, &s1), (&maru, &s2), (&sam, &s3)],
            &quests,
            &Config::default(),
        );

        let summary: Vec<_> = markers.iter().map(|m| (m.entity_id.as_str(), m.layer)).collect();
        assert_eq!(summary, [("Maru", 3), ("Emily", 6), ("Sam", 7)]);
        assert_eq!(markers[1].map_position, PixelPos::new(700, 280));
        assert_eq!(markers[0].map_position, PixelPos::new(730, 80));
    }

    #[test]
    fn uncalibrated_and_blacklisted_villagers_are_skipped() {
        let contexts = crate::LocationContexts::build(&valley());
        let player = PlayerState::new("me", "Town", Vec2::ZERO);
        let gus = Character::villager("Gus");
        let krobus = Character::villager("Krobus");
        let pam = Character::villager("Pam");
        let s1 = at("Gus", "Saloon", 1.0, 1.0);
        let s2 = at("Krobus", "Town", 1.0, 1.0);
        let s3 = at("Pam", "Town", 2.0, 2.0);
        let mut config = Config::default();
        config.hidden_villagers.insert("Krobus".to_string());

        let markers = build_villager_markers(
            &mapper(),
            &contexts,
            &player,
            &[(&gus, &s1), (&krobus, &s2), (&pam, &s3)],
            &HashSet::new(),
            &config,
        );

        let ids: Vec<_> = markers.iter().map(|m| m.entity_id.as_str()).collect();
        assert_eq!(ids, ["Pam"]);
    }

    #[test]
    fn other_roots_are_hidden_when_same_location_only() {
        let contexts = crate::LocationContexts::build(&valley());
        let player = PlayerState::new("me", "Mountain", Vec2::ZERO);
        let (linus, lewis) = (Character::villager("Linus"), Character::villager("Lewis"));
        let (s1, s2) = (at("Linus", "Mountain", 5.0, 5.0), at("Lewis", "Town", 5.0, 5.0));
        let villagers = [(&linus, &s1), (&lewis, &s2)];
        let mut config = Config::default();
        config.same_location_only = true;

        let markers = build_villager_markers(
            &mapper(),
            &contexts,
            &player,
            &villagers,
            &HashSet::new(),
            &config,
        );
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].entity_id, "Linus");

        config.show_hidden = true;
        let markers = build_villager_markers(
            &mapper(),
            &contexts,
            &player,
            &villagers,
            &HashSet::new(),
            &config,
        );
        let lewis = markers.iter().find(|m| m.entity_id == "Lewis").expect("hidden marker");
        assert!(lewis.is_hidden);
        assert_eq!(lewis.layer, OUTDOOR_LAYER + HIDDEN_LAYER_OFFSET);
    }

    #[test]
    fn farmer_jumps_delay_the_marker() {
        let mapper = mapper();
        let mut tracker = FarmerTracker::new();

        tracker.update(&mapper, &[at("p2", "Town", 10.0, 10.0)]);
        assert!(tracker.is_drawable("p2"));

        // Same location, far away: held back for the full delay.
        tracker.update(&mapper, &[at("p2", "Town", 90.0, 90.0)]);
        assert!(!tracker.is_drawable("p2"));
        for _ in 1..FARMER_DRAW_DELAY {
            tracker.update(&mapper, &[at("p2", "Town", 90.0, 90.0)]);
            assert!(!tracker.is_drawable("p2"));
        }
        tracker.update(&mapper, &[at("p2", "Town", 90.0, 90.0)]);
        assert!(tracker.is_drawable("p2"));
        assert_eq!(tracker.markers().len(), 1);

        // Changing location is not a jump.
        tracker.update(&mapper, &[at("p2", "Mountain", 0.0, 0.0)]);
        assert!(tracker.is_drawable("p2"));

        tracker.update(&mapper, &[]);
        assert!(tracker.markers().is_empty());
    }
}
