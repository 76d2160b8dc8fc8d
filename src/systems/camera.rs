//! The display position and scripted screen scrolling.
//!
//! Everything here is measured in tiles, with fractional values for positions
//! between tiles. Non-looping axes clamp the display to the map; looping axes wrap.

use glam::{UVec2, Vec2};
use tracing::debug;

use crate::constants::{SCROLL_BASE_FRAMES, TILE_SIZE};
use crate::map::direction::Dir8;
use crate::map::grid::Grid;

/// Converts an interpreter scroll speed (1 slowest, 6 fastest) into a duration in frames.
pub fn scroll_frames(speed: u8) -> f32 {
    let factor = match speed {
        0 | 1 => 8.0,
        2 => 4.0,
        3 => 2.0,
        4 => 1.0,
        5 => 0.5,
        _ => 0.25,
    };
    SCROLL_BASE_FRAMES * factor
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Scroll {
    /// Signed tiles per frame on each axis.
    velocity: Vec2,
    /// Remaining path length along the slope.
    rest: f32,
    /// Path length covered per frame.
    step: f32,
}

#[derive(Debug, Clone)]
pub struct Camera {
    display: Vec2,
    screen: UVec2,
    scroll: Option<Scroll>,
}

impl Camera {
    pub fn new(screen: UVec2) -> Self {
        Self {
            display: Vec2::ZERO,
            screen,
            scroll: None,
        }
    }

    pub fn display(&self) -> Vec2 {
        self.display
    }

    pub fn screen(&self) -> UVec2 {
        self.screen
    }

    /// The screen-relative tile the display is centred on.
    pub fn center(&self) -> Vec2 {
        (self.screen.as_vec2() - Vec2::ONE) / 2.0
    }

    fn limit(&self, grid: &Grid) -> Vec2 {
        Vec2::new(
            (grid.width as f32 - self.screen.x as f32).max(0.0),
            (grid.height as f32 - self.screen.y as f32).max(0.0),
        )
    }

    fn normalize(&self, grid: &Grid, pos: Vec2) -> Vec2 {
        let limit = self.limit(grid);
        Vec2::new(
            if grid.loop_horizontal {
                pos.x.rem_euclid(grid.width as f32)
            } else {
                pos.x.clamp(0.0, limit.x)
            },
            if grid.loop_vertical {
                pos.y.rem_euclid(grid.height as f32)
            } else {
                pos.y.clamp(0.0, limit.y)
            },
        )
    }

    pub fn set_display_pos(&mut self, grid: &Grid, pos: Vec2) {
        self.display = self.normalize(grid, pos);
    }

    /// Puts `tile` at the centre of the screen, as far as the map edges allow.
    pub fn center_on(&mut self, grid: &Grid, tile: Vec2) {
        self.set_display_pos(grid, tile - self.center());
    }

    /// Starts a scripted scroll of `distance` tiles per axis along `dir`, lasting `frames` frames.
    ///
    /// Axes that `dir` does not move along are ignored. Diagonal scrolls move both axes
    /// so that they finish together.
    pub fn start_scroll(&mut self, grid: &Grid, dir: Dir8, distance: Vec2, frames: f32) {
        let sign = dir.as_ivec2().as_vec2();
        let mut travel = distance.abs() * sign.abs();

        // A diagonal scroll toward a clamped edge stops at the edge.
        if dir.is_diagonal() {
            if sign.x < 0.0 && !grid.loop_horizontal {
                travel.x = travel.x.min(self.display.x);
            }
            if sign.y < 0.0 && !grid.loop_vertical {
                travel.y = travel.y.min(self.display.y);
            }
        }

        let length = travel.length();
        if length <= 0.0 {
            self.scroll = None;
            return;
        }
        let frames = frames.max(1.0);
        debug!(direction = dir.as_ref(), dx = travel.x, dy = travel.y, frames, "Scroll started");
        self.scroll = Some(Scroll {
            velocity: travel * sign / frames,
            rest: length,
            step: length / frames,
        });
    }

    /// Scrolls until `tile` sits at the centre of the screen, taking the short way around looping axes.
    pub fn scroll_to(&mut self, grid: &Grid, tile: Vec2, frames: f32) {
        let center = (self.display + self.center()).round();
        let delta = Vec2::new(grid.delta_x(center.x, tile.x), grid.delta_y(center.y, tile.y)).round();
        let Some(dir) = Dir8::from_signs(delta.x as i32, delta.y as i32) else {
            return;
        };
        self.start_scroll(grid, dir, delta.abs(), frames);
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some_and(|s| s.rest > 0.0)
    }

    /// Advances a scripted scroll by one frame. Returns `true` if the display moved.
    pub fn update(&mut self, grid: &Grid) -> bool {
        let Some(mut scroll) = self.scroll else {
            return false;
        };
        let before = self.display;
        self.set_display_pos(grid, self.display + scroll.velocity);
        scroll.rest = (scroll.rest - scroll.step).max(0.0);
        self.scroll = (scroll.rest > 0.0).then_some(scroll);
        self.display != before
    }

    /// Scrolls along with a character moving from `before` to `after` (pixels) once it passes the centre.
    pub fn follow(&mut self, grid: &Grid, before: Vec2, after: Vec2) {
        let moved = grid.pixel_delta(before, after) / TILE_SIZE;
        if moved == Vec2::ZERO {
            return;
        }
        let on_screen = self.relative(grid, after / TILE_SIZE);
        let center = self.center();
        let mut shift = Vec2::ZERO;
        if (moved.x > 0.0 && on_screen.x > center.x) || (moved.x < 0.0 && on_screen.x < center.x) {
            shift.x = moved.x;
        }
        if (moved.y > 0.0 && on_screen.y > center.y) || (moved.y < 0.0 && on_screen.y < center.y) {
            shift.y = moved.y;
        }
        if shift != Vec2::ZERO {
            self.set_display_pos(grid, self.display + shift);
        }
    }

    /// `tile` relative to the top-left of the display, wrapped on looping axes.
    fn relative(&self, grid: &Grid, tile: Vec2) -> Vec2 {
        let offset = tile - self.display;
        Vec2::new(
            if grid.loop_horizontal { offset.x.rem_euclid(grid.width as f32) } else { offset.x },
            if grid.loop_vertical { offset.y.rem_euclid(grid.height as f32) } else { offset.y },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_frames_table() {
        assert_eq!(scroll_frames(1), 480.0);
        assert_eq!(scroll_frames(4), 60.0);
        assert_eq!(scroll_frames(6), 15.0);
    }

    #[test]
    fn test_straight_scroll_finishes_on_time() {
        let grid = Grid::new(40, 40, false, false);
        let mut camera = Camera::new(UVec2::new(10, 10));
        camera.start_scroll(&grid, Dir8::Right, Vec2::new(4.0, 0.0), 4.0);
        assert!(camera.is_scrolling());
        for _ in 0..4 {
            assert!(camera.update(&grid));
        }
        assert!(!camera.is_scrolling());
        assert_eq!(camera.display(), Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_diagonal_scroll_stops_at_edge() {
        let grid = Grid::new(40, 40, false, false);
        let mut camera = Camera::new(UVec2::new(10, 10));
        camera.set_display_pos(&grid, Vec2::new(2.0, 6.0));
        camera.start_scroll(&grid, Dir8::UpLeft, Vec2::new(6.0, 6.0), 2.0);
        while camera.update(&grid) {}
        assert_eq!(camera.display(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_clamps_and_wraps() {
        let mut camera = Camera::new(UVec2::new(10, 10));
        let fixed = Grid::new(20, 20, false, false);
        camera.set_display_pos(&fixed, Vec2::new(15.0, -3.0));
        assert_eq!(camera.display(), Vec2::new(10.0, 0.0));

        let looping = Grid::new(20, 20, true, true);
        camera.set_display_pos(&looping, Vec2::new(-1.0, 21.0));
        assert_eq!(camera.display(), Vec2::new(19.0, 1.0));
    }

    #[test]
    fn test_scroll_to_takes_short_way_around_seam() {
        let grid = Grid::new(40, 20, true, false);
        let mut camera = Camera::new(UVec2::new(11, 11));
        camera.set_display_pos(&grid, Vec2::new(30.0, 0.0));
        // The centre is tile 35; tile 2 is 7 tiles to the right across the seam.
        camera.scroll_to(&grid, Vec2::new(2.0, 5.0), 7.0);
        while camera.update(&grid) {}
        assert_eq!(camera.display(), Vec2::new(37.0, 0.0));
    }

    #[test]
    fn test_follow_past_center() {
        let grid = Grid::new(40, 40, false, false);
        let mut camera = Camera::new(UVec2::new(11, 11));
        let before = Vec2::new(4.0 * TILE_SIZE, 0.0);
        camera.follow(&grid, before, before + Vec2::new(TILE_SIZE, 0.0));
        assert_eq!(camera.display(), Vec2::ZERO);

        let before = Vec2::new(5.0 * TILE_SIZE, 0.0);
        camera.follow(&grid, before, before + Vec2::new(TILE_SIZE, 0.0));
        assert_eq!(camera.display(), Vec2::new(1.0, 0.0));
    }
}
