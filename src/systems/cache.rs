//! Remembers the most recent failed passability checks of a single character.
//!
//! Tile failures depend only on the map and stay valid until the next map load.
//! Box failures depend on where everybody else is, so they carry the world
//! revision they were observed at and stop matching once anything moves.

use circular_buffer::CircularBuffer;
use glam::Vec2;

use crate::constants::FAILURE_CACHE_SLOTS;
use crate::map::direction::Direction;
use crate::map::passability::Mobility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileFailure {
    x: u32,
    y: u32,
    dir: Direction,
    mobility: Mobility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxFailure {
    x: u32,
    y: u32,
    dir: Direction,
    revision: u64,
}

#[derive(Debug, Default)]
pub struct FailureCache {
    tiles: CircularBuffer<FAILURE_CACHE_SLOTS, TileFailure>,
    boxes: CircularBuffer<FAILURE_CACHE_SLOTS, BoxFailure>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn tile_key(pos: Vec2, dir: Direction, mobility: Mobility) -> TileFailure {
        TileFailure {
            x: pos.x.to_bits(),
            y: pos.y.to_bits(),
            dir,
            mobility,
        }
    }

    fn box_key(pos: Vec2, dir: Direction, revision: u64) -> BoxFailure {
        BoxFailure {
            x: pos.x.to_bits(),
            y: pos.y.to_bits(),
            dir,
            revision,
        }
    }

    pub fn tile_blocked(&self, pos: Vec2, dir: Direction, mobility: Mobility) -> bool {
        let key = Self::tile_key(pos, dir, mobility);
        self.tiles.iter().any(|entry| *entry == key)
    }

    pub fn remember_tile(&mut self, pos: Vec2, dir: Direction, mobility: Mobility) {
        if !self.tile_blocked(pos, dir, mobility) {
            self.tiles.push_back(Self::tile_key(pos, dir, mobility));
        }
    }

    pub fn box_blocked(&self, pos: Vec2, dir: Direction, revision: u64) -> bool {
        let key = Self::box_key(pos, dir, revision);
        self.boxes.iter().any(|entry| *entry == key)
    }

    pub fn remember_box(&mut self, pos: Vec2, dir: Direction, revision: u64) {
        if !self.box_blocked(pos, dir, revision) {
            self.boxes.push_back(Self::box_key(pos, dir, revision));
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len() + self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.boxes.clear();
    }
}
