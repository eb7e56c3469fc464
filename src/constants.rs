/// World pixels per game tile; also the on-screen tile display unit.
pub const TILE_SIZE: i32 = 64;

/// Scale between the map page texture and the pixels it is drawn at.
pub const PIXEL_ZOOM: i32 = 4;

/// Inset from the viewport edges for off-screen locators.
pub const LOCATOR_MARGIN: f32 = (TILE_SIZE * 3 / 4 + 2) as f32;

/// Slack used when deciding whether a world position is on screen.
pub const ON_SCREEN_BUFFER: f32 = (TILE_SIZE / 4) as f32;

/// Proximity (world pixels) beyond which locators stay at their faintest.
pub const MAX_PROXIMITY: f64 = 4800.0;

/// Ticks between snapshot broadcasts from the primary peer.
pub const SYNC_INTERVAL_TICKS: u64 = 15;

/// Width of the full map page in pixels.
pub const MAP_PAGE_WIDTH: i32 = 300 * PIXEL_ZOOM;

/// Height of the full map page in pixels.
pub const MAP_PAGE_HEIGHT: i32 = 180 * PIXEL_ZOOM;

/// Ticks a farmhand marker stays hidden after jumping across the map.
pub const FARMER_DRAW_DELAY: u32 = 3;

/// Map-pixel distance that counts as a jump for farmhand markers.
pub const FARMER_JUMP_THRESHOLD: f32 = 15.0;

/// Inset applied when testing whether a marker falls inside the minimap.
pub const MINIMAP_EDGE_BUFFER: f32 = (TILE_SIZE / 4 + 2) as f32;

/// Height of a character sprite in texture pixels.
pub const CHARACTER_SPRITE_HEIGHT: i32 = 32;

/// Offset in world pixels used to aim at a character's center.
pub const SPRITE_CENTER_OFFSET: f32 = (CHARACTER_SPRITE_HEIGHT / 2 * PIXEL_ZOOM) as f32;
