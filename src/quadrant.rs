//! Which viewport edge an off-screen target lies toward.
//!
//! ```text
//!  _________
//! | \  2  / |
//! |   \ /   |
//! | 1  |  3 |
//! |   / \   |
//! | /__4__\_|
//! ```
//!
//! Angles are `atan2(dy, dx) + π`, so 0 points from the player toward the
//! left edge and the angle grows clockwise on screen (y points down).

use crate::geometry::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quadrant {
    Left = 1,
    Top = 2,
    Right = 3,
    Bottom = 4,
}

impl Quadrant {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Angle in `[0, 2π]` from the player toward the target.
pub fn player_to_target_angle(player: Vec2, target: Vec2) -> f64 {
    let opposite = f64::from(target.y) - f64::from(player.y);
    let adjacent = f64::from(target.x) - f64::from(player.x);
    opposite.atan2(adjacent) + PI
}

/// Classifies `angle` by the rays from the player to the viewport corners.
///
/// The player need not be centered, so the corner angles are recomputed for
/// every call. Tests run in edge order with strict `<`; anything past the
/// bottom-left corner wraps back to [`Quadrant::Left`].
pub fn classify(angle: f64, player: Vec2, viewport: Rect) -> Quadrant {
    let px = f64::from(player.x);
    let py = f64::from(player.y);
    let left = px - f64::from(viewport.x);
    let top = py - f64::from(viewport.y);
    let right = f64::from(viewport.right()) - px;
    let bottom = f64::from(viewport.bottom()) - py;

    if angle < top.atan2(left) {
        Quadrant::Left
    } else if angle < PI - top.atan2(right) {
        Quadrant::Top
    } else if angle < PI + bottom.atan2(right) {
        Quadrant::Right
    } else if angle < TAU - bottom.atan2(left) {
        Quadrant::Bottom
    } else {
        Quadrant::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(1000.0, 2000.0, 1280.0, 720.0);

    fn centered() -> Vec2 {
        VIEWPORT.center()
    }

    #[test]
    fn cardinal_directions_hit_their_edges() {
        let player = centered();
        let cases = [
            (Vec2::new(-500.0, 0.0), Quadrant::Left),
            (Vec2::new(0.0, -500.0), Quadrant::Top),
            (Vec2::new(500.0, 0.0), Quadrant::Right),
            (Vec2::new(0.0, 500.0), Quadrant::Bottom),
        ];

        for (offset, expected) in cases {
            let angle = player_to_target_angle(player, player + offset);
            assert_eq!(classify(angle, player, VIEWPORT), expected, "offset {offset:?}");
        }
    }

    #[test]
    fn angle_starts_at_the_left_edge() {
        let player = Vec2::new(0.0, 0.0);
        let up = player_to_target_angle(player, Vec2::new(0.0, -1.0));
        let right = player_to_target_angle(player, Vec2::new(1.0, 0.0));
        let down = player_to_target_angle(player, Vec2::new(0.0, 1.0));

        assert!((up - PI / 2.0).abs() < 1e-9);
        assert!((right - PI).abs() < 1e-9);
        assert!((down - 3.0 * PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn wide_viewport_gives_top_and_bottom_narrow_wedges() {
        // Just above the horizontal on a wide screen is still the left edge.
        let player = centered();
        let angle = player_to_target_angle(player, player + Vec2::new(-1000.0, -100.0));
        assert_eq!(classify(angle, player, VIEWPORT), Quadrant::Left);
    }

    #[test]
    fn off_center_player_shifts_boundaries() {
        // The same up-left direction meets the top edge from the center, but
        // the left edge when the player hugs it.
        let diagonal = Vec2::new(-100.0, -100.0);
        let angle = player_to_target_angle(centered(), centered() + diagonal);
        assert_eq!(classify(angle, centered(), VIEWPORT), Quadrant::Top);

        let player = Vec2::new(VIEWPORT.x + 10.0, VIEWPORT.y + 360.0);
        let angle = player_to_target_angle(player, player + diagonal);
        assert_eq!(classify(angle, player, VIEWPORT), Quadrant::Left);

        // A shallow up-left direction is the left edge from the center, but
        // the top edge from the far right.
        let shallow = Vec2::new(-300.0, -100.0);
        let angle = player_to_target_angle(centered(), centered() + shallow);
        assert_eq!(classify(angle, centered(), VIEWPORT), Quadrant::Left);

        let player = Vec2::new(VIEWPORT.right() - 10.0, VIEWPORT.y + 360.0);
        let angle = player_to_target_angle(player, player + shallow);
        assert_eq!(classify(angle, player, VIEWPORT), Quadrant::Top);
    }

    #[test]
    fn classification_is_total_and_ordered() {
        let viewports = [
            (VIEWPORT, centered()),
            (VIEWPORT, Vec2::new(1100.0, 2100.0)),
            (Rect::new(0.0, 0.0, 200.0, 900.0), Vec2::new(150.0, 850.0)),
        ];

        for (viewport, player) in viewports {
            let steps = 3600;
            let mut sequence = Vec::new();
            for step in 0..steps {
                let angle = TAU * f64::from(step) / f64::from(steps);
                let quadrant = classify(angle, player, viewport);
                if sequence.last() != Some(&quadrant) {
                    sequence.push(quadrant);
                }
            }

            // Sweeping once around visits each edge in order and wraps to left.
            assert_eq!(
                sequence,
                vec![
                    Quadrant::Left,
                    Quadrant::Top,
                    Quadrant::Right,
                    Quadrant::Bottom,
                    Quadrant::Left
                ]
            );
        }
    }
}
