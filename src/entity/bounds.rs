//! Axis-aligned bounding boxes attached to characters and tiles.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::warn;

use crate::map::direction::Direction;
use crate::map::grid::{pixel_to_tile, tile_of};

/// A box relative to its owner's pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
    pub ox: f32,
    pub oy: f32,
}

impl BoundingBox {
    pub const fn new(width: f32, height: f32, ox: f32, oy: f32) -> Self {
        Self { width, height, ox, oy }
    }

    /// Builds a box from a `[width, height, ox?, oy?]` list. Missing offsets default to zero.
    ///
    /// Returns `None` when fewer than two or more than four values are given.
    pub fn from_values(values: &[f32]) -> Option<Self> {
        match values {
            [w, h] => Some(Self::new(*w, *h, 0.0, 0.0)),
            [w, h, ox] => Some(Self::new(*w, *h, *ox, 0.0)),
            [w, h, ox, oy] => Some(Self::new(*w, *h, *ox, *oy)),
            _ => None,
        }
    }

    pub const fn from_array(values: [f32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// A box with no area can never collide with anything.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// The absolute rectangle covered by this box when its owner stands at `pos`.
    pub fn at(&self, pos: Vec2) -> PixelRect {
        let min = pos + Vec2::new(self.ox, self.oy);
        PixelRect {
            min,
            max: min + Vec2::new(self.width, self.height),
        }
    }
}

/// A box definition that may change with the owner's facing.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxShape {
    Fixed(BoundingBox),
    PerDirection {
        main: BoundingBox,
        facing: [Option<BoundingBox>; 4],
    },
}

impl BoxShape {
    /// Builds a shape, discarding degenerate boxes.
    ///
    /// A degenerate `main` box means the owner has no geometry at all and `None` is returned.
    pub fn new(main: BoundingBox, overrides: &[(Direction, BoundingBox)]) -> Option<Self> {
        if main.is_degenerate() {
            warn!(?main, "Ignoring degenerate bounding box");
            return None;
        }
        if overrides.is_empty() {
            return Some(BoxShape::Fixed(main));
        }

        let mut facing = [None; 4];
        for (dir, bbox) in overrides {
            if bbox.is_degenerate() {
                warn!(?bbox, direction = dir.as_ref(), "Ignoring degenerate directional bounding box");
                continue;
            }
            facing[dir.index()] = Some(*bbox);
        }
        Some(BoxShape::PerDirection { main, facing })
    }

    /// The box in effect while facing `dir`.
    pub fn for_direction(&self, dir: Direction) -> &BoundingBox {
        match self {
            BoxShape::Fixed(bbox) => bbox,
            BoxShape::PerDirection { main, facing } => facing[dir.index()].as_ref().unwrap_or(main),
        }
    }

    pub fn main(&self) -> &BoundingBox {
        match self {
            BoxShape::Fixed(bbox) => bbox,
            BoxShape::PerDirection { main, .. } => main,
        }
    }

    pub fn rect_at(&self, pos: Vec2, dir: Direction) -> PixelRect {
        self.for_direction(dir).at(pos)
    }
}

/// An absolute, closed pixel rectangle `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl PixelRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Closed-interval overlap: touching edges count as a collision.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x && self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    pub fn translate(&self, offset: Vec2) -> PixelRect {
        PixelRect {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Corner points in the order top-left, top-right, bottom-left, bottom-right.
    pub fn vertices(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            Vec2::new(self.min.x, self.max.y),
            self.max,
        ]
    }

    /// The two tile cells holding the corners of the edge facing `dir`.
    pub fn edge(&self, dir: Direction) -> [IVec2; 2] {
        let [tl, tr, bl, br] = self.vertices().map(tile_of);
        match dir {
            Direction::Down => [bl, br],
            Direction::Left => [tl, bl],
            Direction::Right => [tr, br],
            Direction::Up => [tl, tr],
        }
    }

    /// Every tile cell touched by the edge facing `dir`, corner cells included.
    ///
    /// Boxes wider than a tile would otherwise skip the cells between the corners.
    pub fn edge_cells(&self, dir: Direction) -> SmallVec<[IVec2; 4]> {
        let [first, second] = self.edge(dir);
        let mut cells = SmallVec::new();
        if dir.is_horizontal() {
            for y in first.y..=second.y {
                cells.push(IVec2::new(first.x, y));
            }
        } else {
            for x in first.x..=second.x {
                cells.push(IVec2::new(x, first.y));
            }
        }
        cells
    }

    /// The range of tile cells this rectangle overlaps.
    pub fn tile_span(&self) -> (IVec2, IVec2) {
        (
            IVec2::new(pixel_to_tile(self.min.x), pixel_to_tile(self.min.y)),
            IVec2::new(pixel_to_tile(self.max.x), pixel_to_tile(self.max.y)),
        )
    }
}
