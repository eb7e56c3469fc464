//! Tile to map-page pixel conversion using calibration landmarks.
//!
//! A query is placed inside a box spanned by a "lower" landmark (tile
//! coordinates at or below the query on both axes) and an "upper" landmark (at
//! or above on both axes), then each axis is interpolated independently.

use crate::geometry::{PixelPos, TilePos};
use crate::{CalibrationTable, Landmark};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Remembers which diagnostics were already logged this session.
#[derive(Debug, Default)]
pub struct DiagnosticGuard {
    seen: RefCell<HashSet<String>>,
    last: RefCell<Option<String>>,
}

impl DiagnosticGuard {
    /// Returns `true` the first time `key` is seen, `false` afterwards.
    pub fn should_emit(&self, key: &str) -> bool {
        if self.last.borrow().as_deref() == Some(key) {
            return false;
        }
        *self.last.borrow_mut() = Some(key.to_string());
        self.seen.borrow_mut().insert(key.to_string())
    }

    pub fn reset(&self) {
        self.seen.borrow_mut().clear();
        self.last.borrow_mut().take();
    }
}

/// The pair of landmarks chosen to interpolate a query tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub lower: Landmark,
    pub upper: Landmark,
    /// No landmark was at or below the query; `lower` is a nearest-neighbor fallback.
    pub lower_fallback: bool,
    /// No landmark was at or above the query; `upper` is a nearest-neighbor fallback.
    pub upper_fallback: bool,
}

/// Picks the lower/upper landmarks for `tile`, scanning nearest first.
///
/// Returns `None` for an empty slice. With a single landmark both bounds are
/// that landmark.
pub fn select_bounds(landmarks: &[Landmark], tile: TilePos) -> Option<Bounds> {
    let mut order: Vec<usize> = (0..landmarks.len()).collect();
    order.sort_by(|&a, &b| {
        tile_distance(&landmarks[a], tile).total_cmp(&tile_distance(&landmarks[b], tile))
    });

    let first = *order.first()?;
    let second = order.get(1).copied().unwrap_or(first);

    let mut lower: Option<usize> = None;
    let mut upper: Option<usize> = None;
    let mut has_equal_tile = false;

    for &index in &order {
        if let (Some(lo), Some(hi)) = (lower, upper) {
            let (lo, hi) = (&landmarks[lo], &landmarks[hi]);
            if lo.tile_x == hi.tile_x || lo.tile_y == hi.tile_y {
                has_equal_tile = true;
            } else {
                break;
            }
        }

        let candidate = &landmarks[index];
        if (lower.is_none() || has_equal_tile)
            && tile.x >= candidate.tile_x
            && tile.y >= candidate.tile_y
        {
            lower = Some(index);
            continue;
        }
        if (upper.is_none() || has_equal_tile)
            && tile.x <= candidate.tile_x
            && tile.y <= candidate.tile_y
        {
            upper = Some(index);
        }
    }

    let lower_fallback = lower.is_none();
    let upper_fallback = upper.is_none();

    // Nearest landmark unless it is already the other bound.
    let lower = lower.unwrap_or(if upper == Some(first) { second } else { first });
    let upper = upper.unwrap_or(if lower == first { second } else { first });

    Some(Bounds {
        lower: landmarks[lower],
        upper: landmarks[upper],
        lower_fallback,
        upper_fallback,
    })
}

fn tile_distance(landmark: &Landmark, tile: TilePos) -> f64 {
    let dx = f64::from(landmark.tile_x - tile.x);
    let dy = f64::from(landmark.tile_y - tile.y);
    dx.hypot(dy)
}

/// Linear interpolation on one axis. A degenerate axis keeps the lower pixel.
fn interpolate_axis(
    query: i32,
    lower_tile: i32,
    upper_tile: i32,
    lower_px: i32,
    upper_px: i32,
) -> i32 {
    if upper_tile == lower_tile {
        return lower_px;
    }
    let ratio = f64::from(query - lower_tile) / f64::from(upper_tile - lower_tile);
    (f64::from(lower_px) + ratio * f64::from(upper_px - lower_px)) as i32
}

/// Converts `(location, tile)` pairs into map-page pixels.
#[derive(Debug, Default)]
pub struct CoordinateMapper {
    table: CalibrationTable,
    page_origin: PixelPos,
    buildings: HashMap<String, PixelPos>,
    diagnostics: DiagnosticGuard,
}

impl CoordinateMapper {
    pub fn new(table: CalibrationTable) -> Self {
        Self {
            table,
            ..Default::default()
        }
    }

    /// Offsets every mapped position by the on-screen origin of the map page.
    pub fn with_page_origin(mut self, origin: PixelPos) -> Self {
        self.page_origin = origin;
        self
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    pub fn page_origin(&self) -> PixelPos {
        self.page_origin
    }

    /// Maps a tile in `location` to an absolute map-page pixel.
    ///
    /// Unknown locations map to [`PixelPos::ZERO`].
    pub fn map(&self, location: &str, tile: TilePos) -> PixelPos {
        let Some(landmarks) = self.table.landmarks(location) else {
            let key = format!("UnknownLocation:{location}");
            if self.diagnostics.should_emit(&key) {
                log::trace!("Unknown location: {location}.");
            }
            return PixelPos::ZERO;
        };

        let relative = if landmarks.len() == 1 || tile.is_unspecified() {
            landmarks[0].pixel()
        } else {
            match select_bounds(landmarks, tile) {
                Some(bounds) => {
                    self.report_fallback(location, tile, &bounds);
                    PixelPos::new(
                        interpolate_axis(
                            tile.x,
                            bounds.lower.tile_x,
                            bounds.upper.tile_x,
                            bounds.lower.pixel_x,
                            bounds.upper.pixel_x,
                        ),
                        interpolate_axis(
                            tile.y,
                            bounds.lower.tile_y,
                            bounds.upper.tile_y,
                            bounds.lower.pixel_y,
                            bounds.upper.pixel_y,
                        ),
                    )
                }
                None => landmarks[0].pixel(),
            }
        };

        self.page_origin + relative
    }

    /// Like [`map`](Self::map), but buildings registered at runtime win over
    /// the calibration table. Negative tiles are off the map and resolve to
    /// [`PixelPos::ZERO`].
    pub fn resolve(&self, location: &str, tile: TilePos) -> PixelPos {
        if tile.is_negative() {
            return PixelPos::ZERO;
        }
        if let Some(&pos) = self.buildings.get(location) {
            return pos;
        }
        self.map(location, tile)
    }

    /// Pins the interior `interior` to where its building stands in `host`.
    pub fn register_building(&mut self, interior: &str, host: &str, tile: TilePos) {
        let pos = self.map(host, tile);
        if pos.is_zero() {
            log::debug!("Building '{interior}' sits in unmapped location '{host}'");
            return;
        }
        self.buildings.insert(interior.to_string(), pos);
    }

    pub fn clear_buildings(&mut self) {
        self.buildings.clear();
    }

    /// Whether a location can be mapped at all.
    pub fn knows(&self, location: &str) -> bool {
        self.buildings.contains_key(location) || self.table.contains(location)
    }

    fn report_fallback(&self, location: &str, tile: TilePos, bounds: &Bounds) {
        if !bounds.lower_fallback && !bounds.upper_fallback {
            return;
        }
        let key = format!("NullBound:{location}:({}, {})", tile.x, tile.y);
        if !self.diagnostics.should_emit(&key) {
            return;
        }
        if bounds.lower_fallback {
            log::trace!(
                "Null lower bound: no landmark at or below ({}, {}) in {location}",
                tile.x,
                tile.y
            );
        }
        if bounds.upper_fallback {
            log::trace!(
                "Null upper bound: no landmark at or above ({}, {}) in {location}",
                tile.x,
                tile.y
            );
        }
    }
}
