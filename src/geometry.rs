//! Plain value types for world, screen and map-page coordinates.

use crate::constants::{PIXEL_ZOOM, TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A position in world or screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points, computed in `f64`.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// The tile containing this world position.
    pub fn tile(self) -> TilePos {
        let size = TILE_SIZE as f32;
        TilePos::new((self.x / size).floor() as i32, (self.y / size).floor() as i32)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<PixelPos> for Vec2 {
    fn from(pos: PixelPos) -> Self {
        Self::new(pos.x as f32, pos.y as f32)
    }
}

/// An integer pixel on the map page. `PixelPos::ZERO` doubles as the
/// "could not be mapped" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl Add for PixelPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A tile coordinate inside a game location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    /// Marker for "no particular tile", used for fixed-point lookups.
    pub const UNSPECIFIED: Self = Self { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Either axis set to `-1` asks for a location's fixed point.
    pub fn is_unspecified(self) -> bool {
        self.x == -1 || self.y == -1
    }

    /// Negative coordinates never name a real tile.
    pub fn is_negative(self) -> bool {
        self.x < 0 || self.y < 0
    }
}

/// An axis-aligned rectangle; the viewport is one, in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.contains_with_buffer(point, 0.0)
    }

    /// Strict containment after growing the rectangle by `buffer` on every side.
    pub fn contains_with_buffer(&self, point: Vec2, buffer: f32) -> bool {
        point.x > self.x - buffer
            && point.x < self.right() + buffer
            && point.y > self.y - buffer
            && point.y < self.bottom() + buffer
    }
}

/// Snaps a coordinate down onto the map texture's pixel grid.
pub fn snap_to_zoom(value: f32) -> f32 {
    let zoom = PIXEL_ZOOM as f32;
    (value / zoom).floor() * zoom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_floor_world_positions() {
        assert_eq!(Vec2::new(130.0, 64.0).tile(), TilePos::new(2, 1));
        assert_eq!(Vec2::new(-1.0, 0.0).tile(), TilePos::new(-1, 0));
        assert!(TilePos::UNSPECIFIED.is_unspecified());
        assert!(TilePos::new(4, -1).is_unspecified());
        assert!(!TilePos::new(-2, 4).is_unspecified());
        assert!(TilePos::new(-2, 4).is_negative());
        assert!(!TilePos::new(0, 0).is_negative());
    }

    #[test]
    fn buffered_containment_is_strict() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains(Vec2::new(1.0, 1.0)));
        assert!(!rect.contains(Vec2::new(0.0, 10.0)));
        assert!(rect.contains_with_buffer(Vec2::new(-15.0, 60.0), 16.0));
        assert!(!rect.contains_with_buffer(Vec2::new(-16.0, 10.0), 16.0));
    }

    #[test]
    fn snapping_floors_to_the_zoom_grid() {
        assert_eq!(snap_to_zoom(503.0), 500.0);
        assert_eq!(snap_to_zoom(500.0), 500.0);
        assert_eq!(snap_to_zoom(-1.0), -4.0);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Vec2::new(0.0, 0.0).distance(Vec2::new(3.0, 4.0)), 5.0);
    }
}
