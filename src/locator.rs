//! Screen placement of off-screen locators.

use crate::constants::{LOCATOR_MARGIN, MAX_PROXIMITY, ON_SCREEN_BUFFER, TILE_SIZE};
use crate::geometry::{Rect, TilePos, Vec2};
use crate::quadrant::Quadrant;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// One indicator pointing from the player toward an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    pub entity_id: String,
    /// Position relative to the viewport's top-left corner
    pub screen_position: Vec2,
    pub angle: f64,
    pub quadrant: Quadrant,
    /// World-pixel distance from the player to the locator target
    pub proximity: f64,
    pub is_on_screen: bool,
    /// Points at a door or warp rather than the character itself
    pub is_warp: bool,
    /// Points at a warp into a neighboring outdoor location
    pub is_outdoors: bool,
    pub is_mount: bool,
}

impl Locator {
    pub fn is_offscreen(&self) -> bool {
        !self.is_on_screen
    }

    pub fn distance_in_tiles(&self) -> i64 {
        distance_in_tiles(self.proximity)
    }

    pub fn opacity(&self) -> f64 {
        opacity(self.proximity, self.is_outdoors)
    }
}

/// Straight-line distance between the player and a target, in world pixels.
pub fn proximity(player: Vec2, target: Vec2) -> f64 {
    player.distance(target)
}

/// Distance readout in whole tiles.
pub fn distance_in_tiles(proximity: f64) -> i64 {
    (proximity / f64::from(TILE_SIZE)).round() as i64
}

/// Opacity falloff with distance; warps to neighboring outdoor locations fade
/// from a lower floor.
pub fn opacity(proximity: f64, outdoor_warp: bool) -> f64 {
    let (floor, range) = if outdoor_warp { (0.3, 0.7) } else { (0.35, 0.65) };
    if proximity > MAX_PROXIMITY {
        floor
    } else {
        floor + (MAX_PROXIMITY - proximity) / MAX_PROXIMITY * range
    }
}

/// World position a door locator aims at: centered on the warp tile and lifted
/// above it.
pub fn warp_point(tile: TilePos) -> Vec2 {
    Vec2::new(
        (tile.x * TILE_SIZE + TILE_SIZE / 2) as f32,
        (tile.y * TILE_SIZE - TILE_SIZE * 3 / 2) as f32,
    )
}

/// Host visibility test for a world position.
pub fn is_on_screen(viewport: Rect, position: Vec2) -> bool {
    viewport.contains_with_buffer(position, ON_SCREEN_BUFFER)
}

/// Keeps a coordinate between the margins of an edge. Viewports narrower than
/// both margins pin to the leading margin instead of panicking.
fn clamp_to_edge(value: f32, extent: f32) -> f32 {
    value.min(extent - LOCATOR_MARGIN).max(LOCATOR_MARGIN)
}

/// Places a locator on the viewport edge the target lies toward.
///
/// Door locators whose target is already visible are placed on the door. All
/// other locators land on the edge for `quadrant`, inset by the margin, where
/// the player-to-target ray crosses it.
pub fn place(
    angle: f64,
    quadrant: Quadrant,
    player: Vec2,
    target: Vec2,
    viewport: Rect,
    is_warp: bool,
) -> Vec2 {
    if is_warp && is_on_screen(viewport, target) {
        return target - viewport.origin();
    }

    let mut x = player.x - viewport.x;
    let mut y = player.y - viewport.y;
    let to_left = f64::from(player.x - viewport.x);
    let to_top = f64::from(player.y - viewport.y);
    let to_right = f64::from(viewport.right() - player.x);
    let to_bottom = f64::from(viewport.bottom() - player.y);

    match quadrant {
        Quadrant::Left => {
            y += (to_left * (TAU - angle).tan()) as f32;
            Vec2::new(LOCATOR_MARGIN, clamp_to_edge(y, viewport.height))
        }
        Quadrant::Top => {
            x -= (to_top * (FRAC_PI_2 - angle).tan()) as f32;
            Vec2::new(clamp_to_edge(x, viewport.width), LOCATOR_MARGIN)
        }
        Quadrant::Right => {
            y -= (to_right * (PI - angle).tan()) as f32;
            Vec2::new(
                viewport.width - LOCATOR_MARGIN,
                clamp_to_edge(y, viewport.height),
            )
        }
        Quadrant::Bottom => {
            x += (to_bottom * (3.0 * FRAC_PI_2 - angle).tan()) as f32;
            Vec2::new(
                clamp_to_edge(x, viewport.width),
                viewport.height - LOCATOR_MARGIN,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrant::{classify, player_to_target_angle};

    const VIEWPORT: Rect = Rect::new(1000.0, 2000.0, 1280.0, 720.0);

    fn locate(player: Vec2, target: Vec2) -> (Quadrant, Vec2) {
        let angle = player_to_target_angle(player, target);
        let quadrant = classify(angle, player, VIEWPORT);
        (quadrant, place(angle, quadrant, player, target, VIEWPORT, false))
    }

    #[test]
    fn straight_left_lands_mid_left_edge() {
        let player = VIEWPORT.center();
        let (quadrant, pos) = locate(player, player + Vec2::new(-2000.0, 0.0));

        assert_eq!(quadrant, Quadrant::Left);
        assert_eq!(pos.x, LOCATOR_MARGIN);
        assert!((pos.y - 360.0).abs() < 0.01);
    }

    #[test]
    fn ray_intersects_the_edge() {
        let player = VIEWPORT.center();
        // 45 degrees up-right from the center of a 1280x720 viewport crosses the
        // top edge 360 px right of the player.
        let (quadrant, pos) = locate(player, player + Vec2::new(1000.0, -1000.0));

        assert_eq!(quadrant, Quadrant::Top);
        assert_eq!(pos.y, LOCATOR_MARGIN);
        assert!((pos.x - 1000.0).abs() < 0.01);

        let (quadrant, pos) = locate(player, player + Vec2::new(-1000.0, 1000.0));
        assert_eq!(quadrant, Quadrant::Bottom);
        assert_eq!(pos.y, 720.0 - LOCATOR_MARGIN);
        assert!((pos.x - 280.0).abs() < 0.01);

        let (quadrant, pos) = locate(player, player + Vec2::new(2000.0, 500.0));
        assert_eq!(quadrant, Quadrant::Right);
        assert_eq!(pos.x, 1280.0 - LOCATOR_MARGIN);
        assert!((pos.y - 520.0).abs() < 0.01);
    }

    #[test]
    fn placement_stays_inside_the_margins() {
        let players = [
            VIEWPORT.center(),
            Vec2::new(1010.0, 2010.0),
            Vec2::new(2270.0, 2710.0),
        ];

        for player in players {
            for step in 0..720 {
                let angle = TAU * f64::from(step) / 720.0;
                let quadrant = classify(angle, player, VIEWPORT);
                let target = player
                    + Vec2::new(
                        (-(angle.cos()) * 5000.0) as f32,
                        (-(angle.sin()) * 5000.0) as f32,
                    );
                let pos = place(angle, quadrant, player, target, VIEWPORT, false);

                assert!(pos.x >= LOCATOR_MARGIN && pos.x <= VIEWPORT.width - LOCATOR_MARGIN);
                assert!(pos.y >= LOCATOR_MARGIN && pos.y <= VIEWPORT.height - LOCATOR_MARGIN);
                let on_edge = pos.x == LOCATOR_MARGIN
                    || pos.y == LOCATOR_MARGIN
                    || pos.x == VIEWPORT.width - LOCATOR_MARGIN
                    || pos.y == VIEWPORT.height - LOCATOR_MARGIN;
                assert!(on_edge, "angle {angle} placed off the edges at {pos:?}");
            }
        }
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let viewport = Rect::new(0.0, 0.0, 60.0, 40.0);
        let player = viewport.center();
        let angle = player_to_target_angle(player, Vec2::new(-500.0, 10.0));
        let quadrant = classify(angle, player, viewport);
        let pos = place(angle, quadrant, player, Vec2::new(-500.0, 10.0), viewport, false);
        assert_eq!(pos.x, LOCATOR_MARGIN);
    }

    #[test]
    fn visible_warp_targets_are_placed_on_the_door() {
        let player = VIEWPORT.center();
        let door = Vec2::new(1200.0, 2300.0);
        let angle = player_to_target_angle(player, door);
        let quadrant = classify(angle, player, VIEWPORT);

        let pos = place(angle, quadrant, player, door, VIEWPORT, true);
        assert_eq!(pos, Vec2::new(200.0, 300.0));

        let edge = place(angle, quadrant, player, door, VIEWPORT, false);
        assert_ne!(edge, pos);
    }

    #[test]
    fn proximity_drives_distance_and_opacity() {
        assert_eq!(distance_in_tiles(proximity(Vec2::ZERO, Vec2::new(0.0, 640.0))), 10);
        assert_eq!(distance_in_tiles(95.0), 1);
        assert_eq!(distance_in_tiles(97.0), 2);

        assert!((opacity(0.0, false) - 1.0).abs() < 1e-9);
        assert!((opacity(0.0, true) - 1.0).abs() < 1e-9);
        assert!((opacity(2400.0, false) - 0.675).abs() < 1e-9);
        assert_eq!(opacity(10_000.0, false), 0.35);
        assert_eq!(opacity(10_000.0, true), 0.3);
    }

    #[test]
    fn warp_point_aims_above_the_door() {
        assert_eq!(warp_point(TilePos::new(10, 5)), Vec2::new(672.0, 224.0));
    }
}
