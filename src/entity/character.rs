//! Movement state shared by every kind of character.

use glam::{IVec2, Vec2};

use crate::constants::{CHARACTER_LIFT, DEFAULT_DIAGONAL_SPEED, DEFAULT_GRID, DEFAULT_MOVE_SPEED};
use crate::entity::bounds::{BoxShape, PixelRect};
use crate::entity::route::RouteCursor;
use crate::entity::{HasBoundingBox, Priority};
use crate::map::direction::Direction;
use crate::map::grid::{tile_of, tile_to_pixel};
use crate::systems::cache::FailureCache;

/// Pixel position, pending target and speed of a single character.
///
/// `position` trails `target` by the remaining `velocity` while a step is being
/// interpolated; the tile coordinate is always derived from `position`.
#[derive(Debug)]
pub struct Character {
    pub position: Vec2,
    pub target: Vec2,
    pub velocity: f32,
    pub diagonal: bool,
    pub direction: Direction,
    pub move_speed: f32,
    pub dashing: bool,
    pub through: bool,
    pub priority: Priority,
    /// Minimum pixels advanced per discrete move.
    pub grid: f32,
    /// Move-speed delta applied while `diagonal` is set.
    pub diagonal_delta: f32,
    pub steps: u32,
    pub shape: Option<BoxShape>,
    /// Pixels the box sits above `position`.
    pub lift: f32,
    pub failures: FailureCache,
    /// A forced route overriding input or autonomous movement.
    pub forced_route: Option<RouteCursor>,
}

impl Default for Character {
    fn default() -> Self {
        Self::new(DEFAULT_GRID, DEFAULT_DIAGONAL_SPEED, None)
    }
}

impl Character {
    pub fn new(grid: f32, diagonal_delta: f32, shape: Option<BoxShape>) -> Self {
        Self {
            position: Vec2::ZERO,
            target: Vec2::ZERO,
            velocity: 0.0,
            diagonal: false,
            direction: Direction::Down,
            move_speed: DEFAULT_MOVE_SPEED,
            dashing: false,
            through: false,
            priority: Priority::Same,
            grid,
            diagonal_delta,
            steps: 0,
            shape,
            lift: CHARACTER_LIFT,
            failures: FailureCache::new(),
            forced_route: None,
        }
    }

    /// The tile containing the current pixel position.
    pub fn tile(&self) -> IVec2 {
        tile_of(self.position)
    }

    /// Places the character on `tile`, shifted by `offset` pixels, and stops any step in progress.
    pub fn move_to(&mut self, tile: IVec2, offset: Vec2) {
        let pos = Vec2::new(tile_to_pixel(tile.x), tile_to_pixel(tile.y)) + offset;
        self.move_to_pixel(pos);
    }

    pub fn move_to_pixel(&mut self, pos: Vec2) {
        self.position = pos;
        self.target = pos;
        self.velocity = 0.0;
        self.diagonal = false;
    }

    /// Move speed including dash and the diagonal delta.
    pub fn real_move_speed(&self, diagonal: bool) -> f32 {
        self.move_speed + if self.dashing { 1.0 } else { 0.0 } + if diagonal { self.diagonal_delta } else { 0.0 }
    }

    /// Pixels travelled by one discrete move.
    pub fn move_distance(&self, diagonal: bool) -> f32 {
        self.grid.max(self.real_move_speed(diagonal))
    }

    /// Pixels interpolated per tick.
    pub fn speed(&self) -> f32 {
        2f32.powf(self.real_move_speed(self.diagonal)) / 8.0
    }

    pub fn is_moving(&self) -> bool {
        self.velocity > 0.0
    }

    /// Advances one tick toward the target. Returns `true` on the tick the step completes.
    pub fn update_move(&mut self) -> bool {
        if !self.is_moving() {
            return false;
        }
        let speed = self.speed();
        self.position.x = approach(self.position.x, self.target.x, speed);
        self.position.y = approach(self.position.y, self.target.y, speed);
        self.velocity = (self.velocity - speed).max(0.0);
        if self.velocity == 0.0 {
            self.position = self.target;
            self.diagonal = false;
            return true;
        }
        false
    }

    pub fn set_direction(&mut self, dir: Direction) {
        self.direction = dir;
    }

    /// Replaces the collision shape and forgets failures observed with the old one.
    pub fn set_shape(&mut self, shape: Option<BoxShape>) {
        self.shape = shape;
        self.failures.clear();
    }

    /// The box at the current target position, facing the current direction.
    pub fn target_box(&self) -> Option<PixelRect> {
        self.box_at(self.target)
    }

    pub fn is_route_forced(&self) -> bool {
        self.forced_route.is_some()
    }
}

fn approach(from: f32, to: f32, step: f32) -> f32 {
    if from < to {
        (from + step).min(to)
    } else if from > to {
        (from - step).max(to)
    } else {
        from
    }
}

impl HasBoundingBox for Character {
    fn bounding_box(&self) -> Option<&BoxShape> {
        self.shape.as_ref()
    }

    fn facing(&self) -> Direction {
        self.direction
    }

    fn lift(&self) -> f32 {
        self.lift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::bounds::BoundingBox;

    #[test]
    fn test_speed_and_distance() {
        let mut c = Character::default();
        assert_eq!(c.speed(), 2.0);
        assert_eq!(c.move_distance(false), 4.0);
        assert_eq!(c.move_distance(true), 3.5);
        c.move_speed = 0.5;
        assert_eq!(c.move_distance(false), 1.0);
        c.dashing = true;
        c.move_speed = 4.0;
        assert_eq!(c.move_distance(false), 5.0);
    }

    #[test]
    fn test_update_move_reaches_target() {
        let mut c = Character::default();
        c.move_to(IVec2::new(1, 1), Vec2::ZERO);
        c.target = c.position + Vec2::new(4.0, 0.0);
        c.velocity = 4.0;

        assert!(!c.update_move());
        assert_eq!(c.position.x, 34.0);
        assert!(c.update_move());
        assert_eq!(c.position, Vec2::new(36.0, 32.0));
        assert!(!c.is_moving());
        assert!(!c.update_move());
    }

    #[test]
    fn test_move_to_applies_offset() {
        let mut c = Character::new(1.0, 0.0, BoxShape::new(BoundingBox::new(24.0, 16.0, 4.0, 16.0), &[]));
        c.move_to(IVec2::new(2, 3), Vec2::new(0.0, -4.0));
        assert_eq!(c.position, Vec2::new(64.0, 92.0));
        assert_eq!(c.target, c.position);
        assert_eq!(c.tile(), IVec2::new(2, 2));
        // 92 - CHARACTER_LIFT + 16
        assert_eq!(c.target_box().unwrap().min, Vec2::new(68.0, 104.0));
    }
}
