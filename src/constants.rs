//! This module contains the default tuning values used by the simulation.

use glam::UVec2;

/// The size of each map tile, in pixels.
pub const TILE_SIZE: f32 = 32.0;
/// The size of each map tile, in pixels, as an integer.
pub const TILE_SIZE_PX: i32 = 32;

/// The default number of pixels an entity advances per discrete move.
pub const DEFAULT_GRID: f32 = 1.0;
/// The default move-speed delta applied while travelling diagonally.
pub const DEFAULT_DIAGONAL_SPEED: f32 = -0.5;
/// The default move speed of every character (engine "normal" speed).
pub const DEFAULT_MOVE_SPEED: f32 = 4.0;

/// The default player bounding box, as `[width, height, ox, oy]`.
pub const DEFAULT_PLAYER_BOX: [f32; 4] = [24.0, 16.0, 4.0, 16.0];
/// The default event bounding box, as `[width, height, ox, oy]`.
pub const DEFAULT_EVENT_BOX: [f32; 4] = [24.0, 16.0, 4.0, 16.0];
/// Pixels a character's box is raised above its tile, matching the sprite's lift.
pub const CHARACTER_LIFT: f32 = 4.0;
/// The default vehicle bounding box, as `[width, height, ox, oy]`.
pub const DEFAULT_VEHICLE_BOX: [f32; 4] = [32.0, 32.0, 0.0, 0.0];

/// The visible screen size, in tiles (544x416 pixels).
pub const SCREEN_TILES: UVec2 = UVec2::new(17, 13);
/// The default number of tiles the culling rectangle extends past each screen edge.
pub const DEFAULT_CULL_PADDING: u32 = 2;

/// Smart-move stops lowering the speed once it drops below this value.
pub const SMART_MOVE_MIN_SPEED: f32 = 1.0;
/// The amount smart-move lowers the speed by on every retry.
pub const SMART_MOVE_SPEED_STEP: f32 = 0.5;

/// The number of recent failures remembered per entity and per check kind.
pub const FAILURE_CACHE_SLOTS: usize = 2;

/// The number of frames a default-speed event scroll takes.
pub const SCROLL_BASE_FRAMES: f32 = 60.0;

/// The distance, in pixels, a follower keeps from the character it trails.
pub const FOLLOWER_GAP: f32 = TILE_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_size_consistency() {
        assert_eq!(TILE_SIZE as i32, TILE_SIZE_PX);
    }

    #[test]
    fn test_default_boxes_fit_in_a_tile() {
        for b in [DEFAULT_PLAYER_BOX, DEFAULT_EVENT_BOX, DEFAULT_VEHICLE_BOX] {
            assert!(b[0] + b[2] <= TILE_SIZE);
            assert!(b[1] + b[3] <= TILE_SIZE);
        }
    }

    #[test]
    fn test_screen_tiles() {
        assert_eq!(SCREEN_TILES.x * TILE_SIZE_PX as u32, 544);
        assert_eq!(SCREEN_TILES.y * TILE_SIZE_PX as u32, 416);
    }
}
