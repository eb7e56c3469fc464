//! Off-screen locators and the door aggregates they collapse into.
//!
//! Characters in the player's location get their own locator. Characters
//! anywhere else point at the door the player would take to reach them, and
//! everyone behind the same door shares one [`LocatorGroup`] whose visible
//! member cycles through a persistent [`WarpStack`].

use crate::config::Config;
use crate::constants::SPRITE_CENTER_OFFSET;
use crate::entity::{Character, EntitySnapshot, PlayerState};
use crate::geometry::{Rect, Vec2};
use crate::location::{LocationContext, LocationContexts, LocationKind};
use crate::locator::{self, Locator};
use crate::quadrant::{classify, player_to_target_angle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::f64::consts::FRAC_PI_2;

/// Characters aggregated behind one door, plus which of them is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarpStack {
    pub characters: Vec<String>,
    pub index: usize,
}

impl WarpStack {
    fn insert(&mut self, id: &str) {
        if !self.characters.iter().any(|c| c == id) {
            self.characters.push(id.to_string());
        }
    }

    /// Index of the shown character, kept in range as members come and go.
    pub fn active(&self) -> usize {
        if self.characters.is_empty() {
            0
        } else {
            self.index % self.characters.len()
        }
    }

    fn cycle(&mut self) {
        if self.characters.len() > 1 {
            self.index = (self.active() + 1) % self.characters.len();
        }
    }
}

/// Locators sharing one key: a single character's location, or a door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorGroup {
    pub key: String,
    pub locators: Vec<Locator>,
    pub is_warp: bool,
    pub is_outdoors: bool,
    /// Index into `locators` of the one drawn on top
    pub active: usize,
}

impl LocatorGroup {
    fn new(key: String) -> Self {
        Self {
            key,
            locators: Vec::new(),
            is_warp: false,
            is_outdoors: false,
            active: 0,
        }
    }

    pub fn active_locator(&self) -> Option<&Locator> {
        self.locators.get(self.active)
    }
}

/// Where a locator should point and under which key it is grouped.
struct Aim {
    key: String,
    target: Vec2,
    is_warp: bool,
    is_outdoors: bool,
}

#[derive(Debug, Default)]
pub struct Compass {
    warp_stacks: HashMap<String, WarpStack>,
}

impl Compass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warp_stack(&self, key: &str) -> Option<&WarpStack> {
        self.warp_stacks.get(key)
    }

    /// Shows the next character in every door aggregate with more than one.
    pub fn cycle_warp_stacks(&mut self) {
        for stack in self.warp_stacks.values_mut() {
            stack.cycle();
        }
    }

    /// Computes this tick's locators for `entities`.
    ///
    /// Entities whose location has no context are skipped, as is everything
    /// when the player's own location is unknown.
    pub fn update(
        &mut self,
        player: &PlayerState,
        viewport: Rect,
        entities: &[(&Character, &EntitySnapshot)],
        contexts: &LocationContexts,
        quest_targets: &HashSet<&str>,
        config: &Config,
    ) -> Vec<LocatorGroup> {
        for stack in self.warp_stacks.values_mut() {
            stack.characters.clear();
        }

        let Some(player_ctx) = contexts.get(&player.location) else {
            log::trace!("Player is in '{}', which has no context", player.location);
            return Vec::new();
        };

        let mut groups: BTreeMap<String, LocatorGroup> = BTreeMap::new();
        for &(character, snapshot) in entities {
            if !is_tracked(character, quest_targets, config) {
                continue;
            }
            let Some(aim) =
                resolve_aim(player, player_ctx, snapshot, contexts, viewport, config)
            else {
                continue;
            };
            if aim.is_warp {
                self.warp_stacks
                    .entry(aim.key.clone())
                    .or_default()
                    .insert(&character.id);
            }

            let locator = build_locator(player, viewport, character, &aim);
            let group = groups
                .entry(aim.key.clone())
                .or_insert_with(|| LocatorGroup::new(aim.key));
            if group.locators.is_empty() {
                group.is_warp = locator.is_warp;
                group.is_outdoors = locator.is_outdoors;
            }
            group.locators.push(locator);
        }

        let mut groups: Vec<LocatorGroup> = groups
            .into_values()
            .map(|group| self.finish(group))
            .collect();
        // Stable, so keys stay sorted within each half.
        groups.sort_by_key(|group| !group.is_outdoors);
        groups
    }

    fn finish(&self, mut group: LocatorGroup) -> LocatorGroup {
        if !group.is_warp {
            return group;
        }
        if let Some(stack) = self.warp_stacks.get(&group.key) {
            group.active = stack.active().min(group.locators.len().saturating_sub(1));
        }
        for locator in group.locators.iter_mut().filter(|l| l.is_on_screen) {
            locator.angle = 3.0 * FRAC_PI_2;
            locator.proximity = 0.0;
        }
        group
    }
}

/// Decides where a locator points and which group it joins.
fn resolve_aim(
    player: &PlayerState,
    player_ctx: &LocationContext,
    snapshot: &EntitySnapshot,
    contexts: &LocationContexts,
    viewport: Rect,
    config: &Config,
) -> Option<Aim> {
    let character_ctx = contexts.get(&snapshot.location)?;
    if config.same_location_only && character_ctx.root != player_ctx.root {
        return None;
    }

    if snapshot.location == player.location {
        if locator::is_on_screen(viewport, snapshot.position) {
            return None;
        }
        return Some(Aim {
            key: snapshot.location.clone(),
            target: Vec2::new(
                snapshot.position.x + SPRITE_CENTER_OFFSET,
                snapshot.position.y,
            ),
            is_warp: false,
            is_outdoors: false,
        });
    }

    let building = contexts.building_of(&snapshot.location);
    if config.same_location_only {
        let building = building?;
        if player.location != character_ctx.root && player.location != building {
            return None;
        }
    }

    let player_outdoors = player_ctx.is_outdoor();
    let key = if player_outdoors || character_ctx.kind != LocationKind::Room {
        building.map(str::to_string)
    } else {
        Some(snapshot.location.clone())
    };

    if !player_outdoors {
        if character_ctx.root != player_ctx.root {
            return None;
        }
        let parent = character_ctx.parent.as_deref()?;
        let door = if parent == player.location {
            character_ctx.warp?
        } else {
            contexts.get(parent)?.warp?
        };
        return Some(Aim {
            key: key?,
            target: locator::warp_point(door),
            is_warp: true,
            is_outdoors: false,
        });
    }

    if character_ctx.root == player_ctx.root {
        let key = key?;
        let door = contexts.get(&key)?.warp?;
        return Some(Aim {
            key,
            target: locator::warp_point(door),
            is_warp: true,
            is_outdoors: false,
        });
    }

    if config.same_location_only {
        return None;
    }
    let door = player_ctx
        .neighbors
        .get(&character_ctx.root)
        .or_else(|| key.as_ref().and_then(|key| player_ctx.neighbors.get(key)))?;
    Some(Aim {
        key: character_ctx.root.clone(),
        target: locator::warp_point(*door),
        is_warp: true,
        is_outdoors: true,
    })
}

fn is_tracked(character: &Character, quest_targets: &HashSet<&str>, config: &Config) -> bool {
    if character.is_mount() && !config.show_horses {
        return false;
    }
    if config.farmers_only && character.is_villager() {
        return false;
    }
    if config.quests_only
        && character.is_villager()
        && !character.birthday_gift_pending()
        && !quest_targets.contains(character.id.as_str())
    {
        return false;
    }
    true
}

fn build_locator(
    player: &PlayerState,
    viewport: Rect,
    character: &Character,
    aim: &Aim,
) -> Locator {
    let angle = player_to_target_angle(player.position, aim.target);
    let quadrant = classify(angle, player.position, viewport);
    Locator {
        entity_id: character.id.clone(),
        screen_position: locator::place(
            angle,
            quadrant,
            player.position,
            aim.target,
            viewport,
            aim.is_warp,
        ),
        angle,
        quadrant,
        proximity: locator::proximity(player.position, aim.target),
        is_on_screen: locator::is_on_screen(viewport, aim.target),
        is_warp: aim.is_warp,
        is_outdoors: aim.is_outdoors,
        is_mount: character.is_mount(),
    }
}
