//! The minimap: a window onto the map page that follows the player.

use crate::config::MinimapConfig;
use crate::constants::{MAP_PAGE_HEIGHT, MAP_PAGE_WIDTH, MINIMAP_EDGE_BUFFER, PIXEL_ZOOM};
use crate::geometry::{PixelPos, Rect, Vec2, snap_to_zoom};
use crate::markers::MapMarker;
use serde::{Deserialize, Serialize};

fn snap(pos: PixelPos) -> PixelPos {
    PixelPos::new(
        snap_to_zoom(pos.x as f32) as i32,
        snap_to_zoom(pos.y as f32) as i32,
    )
}

/// Keeps `value` in `[0, max(0, limit)]` without panicking when the window is
/// larger than the map.
fn clamp_crop(value: i32, limit: i32) -> i32 {
    value.min(limit).max(0)
}

/// Which part of the map page the minimap shows this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimapWindow {
    /// Screen position of the widget's top-left corner
    pub top_left: PixelPos,
    pub size: PixelPos,
    /// Top-left of the cropped region, in map-page pixels
    pub crop_origin: PixelPos,
    /// Map-page point shown at the widget's center, after edge clamping
    pub center: PixelPos,
    /// Added to a map-page position to get its screen position in the widget
    pub marker_offset: PixelPos,
}

impl MinimapWindow {
    /// Centers the window on the player, sliding it back inside the map page
    /// near the edges. Map positions are snapped to the zoom grid first so the
    /// background and the markers move in lockstep.
    pub fn compute(
        player_map_pos: PixelPos,
        top_left: PixelPos,
        size: PixelPos,
        full_map: PixelPos,
    ) -> Self {
        let player = snap(player_map_pos);
        let half = PixelPos::new(size.x / 2, size.y / 2);

        let crop_origin = PixelPos::new(
            clamp_crop(player.x - half.x, full_map.x - size.x),
            clamp_crop(player.y - half.y, full_map.y - size.y),
        );
        let center = crop_origin + half;
        let marker_offset = PixelPos::new(
            top_left.x - center.x + half.x,
            top_left.y - center.y + half.y,
        );

        Self {
            top_left,
            size,
            crop_origin,
            center,
            marker_offset,
        }
    }

    /// Screen position of a map-page point inside the widget.
    pub fn place(&self, map_pos: PixelPos) -> Vec2 {
        Vec2::from(snap(map_pos) + self.marker_offset)
    }

    /// Whether a map-page point lands inside the widget, away from its border.
    pub fn contains(&self, map_pos: PixelPos) -> bool {
        let bounds = Rect::new(
            self.top_left.x as f32 + MINIMAP_EDGE_BUFFER,
            self.top_left.y as f32 + MINIMAP_EDGE_BUFFER,
            self.size.x as f32 - 2.0 * MINIMAP_EDGE_BUFFER,
            self.size.y as f32 - 2.0 * MINIMAP_EDGE_BUFFER,
        );
        bounds.contains(self.place(map_pos))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimapMarker {
    pub entity_id: String,
    pub screen_position: Vec2,
    pub layer: i32,
    pub is_hidden: bool,
}

/// What the minimap draws this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimapView {
    pub window: MinimapWindow,
    pub markers: Vec<MinimapMarker>,
}

/// Placement of the minimap widget, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Minimap {
    pub top_left: PixelPos,
    pub size: PixelPos,
    pub full_map: PixelPos,
}

impl Minimap {
    pub fn from_config(config: &MinimapConfig) -> Self {
        Self {
            top_left: PixelPos::new(config.x, config.y),
            size: PixelPos::new(config.width * PIXEL_ZOOM, config.height * PIXEL_ZOOM),
            full_map: PixelPos::new(MAP_PAGE_WIDTH, MAP_PAGE_HEIGHT),
        }
    }

    pub fn window(&self, player_map_pos: PixelPos) -> MinimapWindow {
        MinimapWindow::compute(player_map_pos, self.top_left, self.size, self.full_map)
    }

    /// Keeps the markers that fall inside `window`, in their draw order.
    pub fn project(window: MinimapWindow, markers: &[MapMarker]) -> MinimapView {
        let markers = markers
            .iter()
            .filter(|marker| !marker.map_position.is_zero() && window.contains(marker.map_position))
            .map(|marker| MinimapMarker {
                entity_id: marker.entity_id.clone(),
                screen_position: window.place(marker.map_position),
                layer: marker.layer,
                is_hidden: marker.is_hidden,
            })
            .collect();

        MinimapView { window, markers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: PixelPos = PixelPos::new(300, 180);
    const TOP_LEFT: PixelPos = PixelPos::new(50, 50);
    const FULL: PixelPos = PixelPos::new(1200, 720);

    fn marker(id: &str, x: i32, y: i32) -> MapMarker {
        MapMarker {
            entity_id: id.to_string(),
            map_position: PixelPos::new(x, y),
            layer: 6,
            is_outdoors: true,
            is_hidden: false,
            has_quest: false,
            is_birthday: false,
        }
    }

    #[test]
    fn centers_on_the_player() {
        let window = MinimapWindow::compute(PixelPos::new(500, 500), TOP_LEFT, SIZE, FULL);

        assert_eq!(window.crop_origin, PixelPos::new(350, 410));
        assert_eq!(window.center, PixelPos::new(500, 500));
        // The player sits in the middle of the widget.
        assert_eq!(window.place(PixelPos::new(500, 500)), Vec2::new(200.0, 140.0));
        assert_eq!(window.place(PixelPos::new(520, 512)), Vec2::new(220.0, 152.0));
    }

    #[test]
    fn crop_never_leaves_the_map_page() {
        let corners = [
            PixelPos::new(0, 0),
            PixelPos::new(1200, 0),
            PixelPos::new(0, 720),
            PixelPos::new(1200, 720),
            PixelPos::new(-40, 9000),
        ];

        for player in corners {
            let window = MinimapWindow::compute(player, TOP_LEFT, SIZE, FULL);
            assert!(window.crop_origin.x >= 0 && window.crop_origin.x <= FULL.x - SIZE.x);
            assert!(window.crop_origin.y >= 0 && window.crop_origin.y <= FULL.y - SIZE.y);
            // Markers stay aligned with the clamped crop.
            let crop_screen = window.place(window.crop_origin);
            assert_eq!(crop_screen, Vec2::new(50.0, 50.0));
        }

        let window = MinimapWindow::compute(PixelPos::new(0, 0), TOP_LEFT, SIZE, FULL);
        assert_eq!(window.crop_origin, PixelPos::ZERO);
        assert_eq!(window.place(PixelPos::new(0, 0)), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn minimap_larger_than_the_map_pins_to_the_origin() {
        let window =
            MinimapWindow::compute(PixelPos::new(60, 60), TOP_LEFT, SIZE, PixelPos::new(100, 100));
        assert_eq!(window.crop_origin, PixelPos::ZERO);
    }

    #[test]
    fn positions_snap_to_the_zoom_grid() {
        let window = MinimapWindow::compute(PixelPos::new(503, 502), TOP_LEFT, SIZE, FULL);
        assert_eq!(window.center, PixelPos::new(500, 500));
        assert_eq!(window.place(PixelPos::new(521, 511)), Vec2::new(220.0, 148.0));
    }

    #[test]
    fn project_keeps_markers_inside_the_border() {
        let window = MinimapWindow::compute(PixelPos::new(500, 500), TOP_LEFT, SIZE, FULL);
        let view = Minimap::project(
            window,
            &[
                marker("near", 520, 510),
                marker("edge", 352, 412),
                marker("far", 1100, 100),
                marker("unmapped", 0, 0),
            ],
        );

        let ids: Vec<_> = view.markers.iter().map(|m| m.entity_id.as_str()).collect();
        assert_eq!(ids, ["near"]);
        assert_eq!(view.markers[0].screen_position, Vec2::new(220.0, 148.0));
    }

    #[test]
    fn config_sizes_are_in_map_units() {
        let minimap = Minimap::from_config(&MinimapConfig::default());
        assert_eq!(minimap.size, SIZE);
        assert_eq!(minimap.full_map, FULL);
    }
}
