//! Decides whether a character may step in a direction and commits the step.

use glam::{IVec2, Vec2};
use tracing::trace;

use crate::config::MovementConfig;
use crate::constants::{SMART_MOVE_MIN_SPEED, SMART_MOVE_SPEED_STEP, TILE_SIZE};
use crate::entity::bounds::PixelRect;
use crate::entity::Movable;
use crate::map::direction::{Dir8, Direction};
use crate::map::passability::Mobility;
use crate::map::Map;
use crate::systems::collision::{ColliderKind, CollisionBroker, CollisionQuery};

/// The result of a single move request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// The direction actually travelled, if any.
    pub moved: Option<Dir8>,
    /// Pixels the step covers.
    pub distance: f32,
    /// The request failed but the mover turned to face it; whatever is ahead may be touched.
    pub bumped: bool,
}

impl MoveOutcome {
    fn moved(dir: Dir8, distance: f32) -> Self {
        Self {
            moved: Some(dir),
            distance,
            bumped: false,
        }
    }

    pub(crate) fn failed(bumped: bool) -> Self {
        Self {
            moved: None,
            distance: 0.0,
            bumped,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.moved.is_some()
    }
}

/// Passability checks and step commits against one map and one collider snapshot.
pub struct Resolver<'a> {
    map: &'a Map,
    broker: &'a CollisionBroker,
    config: &'a MovementConfig,
    revision: u64,
}

impl<'a> Resolver<'a> {
    pub fn new(map: &'a Map, broker: &'a CollisionBroker, config: &'a MovementConfig, revision: u64) -> Self {
        Self {
            map,
            broker,
            config,
            revision,
        }
    }

    /// The box used for tile checks: the mover's own box, or its tile-centre point when it has none.
    fn tile_rect<M: Movable + ?Sized>(mover: &M, pos: Vec2, dir: Direction) -> PixelRect {
        mover.box_facing(pos, dir).unwrap_or_else(|| {
            let center = pos + Vec2::splat(TILE_SIZE / 2.0);
            PixelRect::new(center, center)
        })
    }

    fn query<M: Movable + ?Sized>(mover: &M) -> CollisionQuery {
        CollisionQuery {
            mover: mover.id(),
            ignored: mover.ignored_collider(),
            mover_kind: mover.collider_kind(),
        }
    }

    /// Tile shapes along the leading edge at `pos`, facing `edge`.
    fn tiles_passable<M: Movable + ?Sized>(&self, mover: &mut M, pos: Vec2, dir: Direction, edge: Direction) -> bool {
        let mobility = mover.mobility();
        // Only leading-edge checks are cached; the key has no room for the box direction.
        let cached = edge == dir;
        if cached && mover.character().failures.tile_blocked(pos, edge, mobility) {
            return false;
        }
        let sample = Self::tile_rect(mover, pos, dir);
        let passable = self.map.map_passable(&sample, edge, mobility);
        if cached && !passable {
            mover.character_mut().failures.remember_tile(pos, edge, mobility);
        }
        passable
    }

    /// Whether another character's box overlaps the mover's box at `pos`.
    fn collides<M: Movable + ?Sized>(&self, mover: &mut M, pos: Vec2, dir: Direction) -> bool {
        if mover.mobility().ignores_collision() {
            return false;
        }
        let Some(rect) = mover.box_facing(pos, dir) else {
            return false;
        };
        if mover.character().failures.box_blocked(pos, dir, self.revision) {
            return true;
        }
        let blocked = self.broker.collides(&rect, &Self::query(mover));
        if blocked {
            mover.character_mut().failures.remember_box(pos, dir, self.revision);
        }
        blocked
    }

    fn midpoint_passable<M: Movable + ?Sized>(&self, mover: &mut M, from: Vec2, dir: Direction, distance: f32) -> bool {
        let mid = self.map.grid().round_shift(from, dir, distance / 2.0);
        self.tiles_passable(mover, mid, dir, dir)
            && self.tiles_passable(mover, mid, dir, dir.opposite())
            && !self.collides(mover, mid, dir)
    }

    /// Whether the mover standing at `from` may travel `distance` pixels along `dir`.
    pub fn passable<M: Movable + ?Sized>(&self, mover: &mut M, from: Vec2, dir: Direction, distance: f32) -> bool {
        let grid = self.map.grid();
        let unwrapped = grid.shift(from, dir, distance);
        if !self.map.contains(unwrapped) {
            return false;
        }
        if mover.character().through || mover.mobility().ignores_collision() {
            return true;
        }
        if self.config.midpoint_check && !self.midpoint_passable(mover, from, dir, distance) {
            return false;
        }
        let target = grid.round_pos(unwrapped);
        self.tiles_passable(mover, target, dir, dir) && !self.collides(mover, target, dir)
    }

    /// Either leg order may clear a diagonal.
    pub fn diagonal_passable<M: Movable + ?Sized>(
        &self,
        mover: &mut M,
        from: Vec2,
        horz: Direction,
        vert: Direction,
        distance: f32,
    ) -> bool {
        let grid = self.map.grid();
        let shifted_y = grid.round_shift(from, vert, distance);
        let shifted_x = grid.round_shift(from, horz, distance);
        (self.passable(mover, from, vert, distance) && self.passable(mover, shifted_y, horz, distance))
            || (self.passable(mover, from, horz, distance) && self.passable(mover, shifted_x, vert, distance))
    }

    fn commit<M: Movable + ?Sized>(&self, mover: &mut M, dir: Dir8, distance: f32) -> MoveOutcome {
        let grid = *self.map.grid();
        let c = mover.character_mut();
        match dir.split() {
            Some((horz, vert)) => {
                if c.direction == horz.opposite() {
                    c.set_direction(horz);
                }
                if c.direction == vert.opposite() {
                    c.set_direction(vert);
                }
            }
            None => c.set_direction(dir.to_dir4()),
        }
        let delta = dir.as_ivec2().as_vec2() * distance;
        c.diagonal = dir.is_diagonal();
        c.velocity = distance;
        c.target = grid.round_pos(c.position + delta);
        c.position = c.target - delta;
        c.steps += 1;
        MoveOutcome::moved(dir, distance)
    }

    /// Runs `attempt` at progressively lower speeds until it succeeds or the speed floor is hit.
    ///
    /// The original speed is always restored; the returned distance is the one that worked.
    fn with_speed_retry<M, F>(&self, mover: &mut M, diagonal: bool, mut attempt: F) -> Option<f32>
    where
        M: Movable + ?Sized,
        F: FnMut(&Self, &mut M, f32) -> bool,
    {
        let distance = mover.character().move_distance(diagonal);
        if attempt(self, mover, distance) {
            return Some(distance);
        }
        if !(mover.smart_move() && self.config.smart_move.speed) {
            return None;
        }

        let original = mover.character().move_speed;
        let mut found = None;
        while mover.character().move_speed >= SMART_MOVE_MIN_SPEED {
            mover.character_mut().move_speed -= SMART_MOVE_SPEED_STEP;
            let distance = mover.character().move_distance(diagonal);
            trace!(entity = %mover.id(), speed = mover.character().move_speed, distance, "Retrying at lower speed");
            if attempt(self, mover, distance) {
                found = Some(distance);
                break;
            }
        }
        mover.character_mut().move_speed = original;
        found
    }

    /// Moves one step along a cardinal direction.
    pub fn move_straight<M: Movable + ?Sized>(&self, mover: &mut M, dir: Direction, turn_ok: bool) -> MoveOutcome {
        let from = mover.character().position;
        if let Some(distance) = self.with_speed_retry(mover, false, |r, m, d| r.passable(m, from, dir, d)) {
            return self.commit(mover, Dir8::from(dir), distance);
        }

        if mover.smart_move() && self.config.smart_move.direction {
            for diagonal in dir.adjacent_diagonals() {
                let Some((horz, vert)) = diagonal.split() else { continue };
                let distance = mover.character().move_distance(true);
                if self.diagonal_passable(mover, from, horz, vert, distance) {
                    trace!(entity = %mover.id(), requested = dir.as_ref(), diagonal = diagonal.as_ref(), "Sliding along diagonal");
                    return self.commit(mover, diagonal, distance);
                }
            }
        }

        if turn_ok {
            mover.character_mut().set_direction(dir);
        }
        MoveOutcome::failed(turn_ok)
    }

    /// Moves one step diagonally, falling back to either leg alone.
    pub fn move_diagonal<M: Movable + ?Sized>(&self, mover: &mut M, horz: Direction, vert: Direction) -> MoveOutcome {
        let from = mover.character().position;
        let Some(dir) = Dir8::from_parts(horz, vert) else {
            return self.move_straight(mover, vert, true);
        };
        if let Some(distance) =
            self.with_speed_retry(mover, true, |r, m, d| r.diagonal_passable(m, from, horz, vert, d))
        {
            return self.commit(mover, dir, distance);
        }

        let c = mover.character_mut();
        if c.direction == horz.opposite() {
            c.set_direction(horz);
        }
        if c.direction == vert.opposite() {
            c.set_direction(vert);
        }

        let distance = mover.character().move_distance(false);
        if self.passable(mover, from, horz, distance) {
            self.move_straight(mover, horz, true)
        } else if self.passable(mover, from, vert, distance) {
            self.move_straight(mover, vert, true)
        } else {
            MoveOutcome::failed(false)
        }
    }

    /// Dispatches an eight-way request.
    pub fn move_dir8<M: Movable + ?Sized>(&self, mover: &mut M, dir: Dir8, turn_ok: bool) -> MoveOutcome {
        match dir.split() {
            Some((horz, vert)) => self.move_diagonal(mover, horz, vert),
            None => self.move_straight(mover, dir.to_dir4(), turn_ok),
        }
    }

    /// Whether a walker could stand at `pos` facing `dir`, as checked when leaving a vehicle.
    pub fn can_land<M: Movable + ?Sized>(&self, mover: &M, pos: Vec2, dir: Direction) -> bool {
        if !self.map.contains(pos) {
            return false;
        }
        let rect = mover.box_facing(pos, dir);
        let sample = Self::tile_rect(mover, pos, dir);
        let (first, last) = sample.tile_span();
        let tiles_clear = (first.y..=last.y)
            .flat_map(|y| (first.x..=last.x).map(move |x| IVec2::new(x, y)))
            .all(|cell| self.map.shapes().cell_passable(cell, &sample, Mobility::Walker));
        let mut query = Self::query(mover);
        query.mover_kind = ColliderKind::Character;
        tiles_clear && rect.is_none_or(|r| !self.broker.collides(&r, &query))
    }
}
