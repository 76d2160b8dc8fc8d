//! Per-tile collision shapes built from region and tileset tables.

use std::collections::BTreeMap;

use glam::{IVec2, Vec2};
use smallvec::SmallVec;
use strum_macros::AsRefStr;
use tracing::{debug, warn};

use crate::config::{MovementConfig, ShapeDef, ShapeTag};
use crate::constants::TILE_SIZE;
use crate::entity::bounds::{BoundingBox, PixelRect};
use crate::map::grid::tile_to_pixel;
use crate::map::layout::{MapData, TilesetFlags};

/// How a character interacts with tile shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr)]
pub enum Mobility {
    /// Blocked by any shape it touches.
    #[default]
    Walker,
    /// Only enters water.
    Boat,
    /// Enters water and deep water.
    Ship,
    /// Flies over everything.
    Airship,
}

impl Mobility {
    /// Whether a vehicle of this kind may enter a cell tagged `tag`.
    pub fn accepts(&self, tag: ShapeTag) -> bool {
        match self {
            Mobility::Walker | Mobility::Airship => true,
            Mobility::Boat => tag == ShapeTag::Water,
            Mobility::Ship => matches!(tag, ShapeTag::Water | ShapeTag::DeepWater),
        }
    }

    /// Airships ignore tiles and other characters.
    pub fn ignores_collision(&self) -> bool {
        matches!(self, Mobility::Airship)
    }
}

/// A shape definition with its boxes resolved and degenerate boxes dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledShape {
    pub boxes: SmallVec<[BoundingBox; 2]>,
    pub tag: ShapeTag,
}

impl CompiledShape {
    fn compile(def: &ShapeDef, source: &str, key: u32) -> Self {
        let mut boxes = SmallVec::new();
        for spec in &def.boxes {
            match spec.resolve() {
                Some(bbox) if bbox.is_degenerate() => {
                    warn!(source, key, ?bbox, "Degenerate shape box never blocks, dropping it");
                }
                Some(bbox) => boxes.push(bbox),
                None => warn!(source, key, ?spec, "Malformed shape box, dropping it"),
            }
        }
        Self { boxes, tag: def.tag }
    }
}

/// Region and tileset shapes compiled once from the configuration.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    tiles: BTreeMap<u32, CompiledShape>,
    regions: BTreeMap<u8, CompiledShape>,
}

impl ShapeCatalog {
    pub fn compile(config: &MovementConfig) -> Self {
        let tiles = config
            .tile_shapes
            .iter()
            .map(|(&flag, def)| (flag, CompiledShape::compile(def, "tile", flag)))
            .collect();
        let regions = config
            .region_shapes
            .iter()
            .map(|(&region, def)| (region, CompiledShape::compile(def, "region", region as u32)))
            .collect();
        Self { tiles, regions }
    }

    /// Region zero is the unpainted default and never carries a shape.
    pub fn region(&self, region: u8) -> Option<&CompiledShape> {
        if region == 0 {
            return None;
        }
        self.regions.get(&region)
    }

    pub fn tile(&self, flags: TilesetFlags) -> Option<&CompiledShape> {
        self.tiles.get(&flags.bits())
    }
}

/// Where a cell's shape came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSource {
    Region(u8),
    Tile(TilesetFlags),
}

/// The absolute boxes covering one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileShape {
    pub boxes: SmallVec<[PixelRect; 2]>,
    pub tag: ShapeTag,
    pub source: ShapeSource,
}

impl TileShape {
    fn anchor(shape: &CompiledShape, origin: Vec2, source: ShapeSource) -> Self {
        Self {
            boxes: shape.boxes.iter().map(|b| b.at(origin)).collect(),
            tag: shape.tag,
            source,
        }
    }

    /// Blocked if any sub-box touches `rect`.
    pub fn intersects(&self, rect: &PixelRect) -> bool {
        self.boxes.iter().any(|b| b.intersects(rect))
    }
}

/// The precomputed shape of every map cell.
///
/// Looping maps carry one extra column and/or row holding copies of column 0 and
/// row 0, shifted to sit past the seam.
#[derive(Debug, Clone)]
pub struct ShapeTable {
    width: u32,
    height: u32,
    loop_horizontal: bool,
    loop_vertical: bool,
    columns: u32,
    cells: Vec<Option<TileShape>>,
}

impl ShapeTable {
    pub fn build(data: &MapData, catalog: &ShapeCatalog) -> Self {
        let columns = data.width + data.loop_horizontal as u32;
        let rows = data.height + data.loop_vertical as u32;
        let mut cells = Vec::with_capacity((columns * rows) as usize);

        for y in 0..rows {
            for x in 0..columns {
                let wrapped = IVec2::new((x % data.width) as i32, (y % data.height) as i32);
                let origin = Vec2::new(tile_to_pixel(x as i32), tile_to_pixel(y as i32));
                cells.push(Self::resolve_cell(data, catalog, wrapped, origin));
            }
        }

        let table = Self {
            width: data.width,
            height: data.height,
            loop_horizontal: data.loop_horizontal,
            loop_vertical: data.loop_vertical,
            columns,
            cells,
        };
        debug!(
            width = data.width,
            height = data.height,
            shapes = table.shape_count(),
            "Built tile shape table"
        );
        table
    }

    fn resolve_cell(data: &MapData, catalog: &ShapeCatalog, cell: IVec2, origin: Vec2) -> Option<TileShape> {
        let region = data.region_id(cell);
        if let Some(shape) = catalog.region(region) {
            return Some(TileShape::anchor(shape, origin, ShapeSource::Region(region)));
        }
        data.stacked_flags(cell)
            .filter(|flags| !flags.is_star())
            .find_map(|flags| catalog.tile(flags).map(|shape| (flags, shape)))
            .map(|(flags, shape)| TileShape::anchor(shape, origin, ShapeSource::Tile(flags)))
    }

    fn rows(&self) -> u32 {
        self.cells.len() as u32 / self.columns.max(1)
    }

    /// The shape registered at `cell`, if any. Cells outside the table have none.
    pub fn get(&self, cell: IVec2) -> Option<&TileShape> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.columns as i32 || cell.y >= self.rows() as i32 {
            return None;
        }
        self.cells[(cell.y as u32 * self.columns + cell.x as u32) as usize].as_ref()
    }

    pub fn shape_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Brings a cell that lies past a looping seam back onto the table, moving `rect` along with it.
    fn normalize(&self, cell: IVec2, rect: &PixelRect) -> (IVec2, PixelRect) {
        let mut cell = cell;
        let mut offset = Vec2::ZERO;
        if self.loop_horizontal && (cell.x < 0 || cell.x > self.width as i32) {
            let laps = cell.x.div_euclid(self.width as i32);
            cell.x -= laps * self.width as i32;
            offset.x -= laps as f32 * self.width as f32 * TILE_SIZE;
        }
        if self.loop_vertical && (cell.y < 0 || cell.y > self.height as i32) {
            let laps = cell.y.div_euclid(self.height as i32);
            cell.y -= laps * self.height as i32;
            offset.y -= laps as f32 * self.height as f32 * TILE_SIZE;
        }
        (cell, rect.translate(offset))
    }

    /// Whether `candidate` may occupy space in `cell`.
    pub fn cell_passable(&self, cell: IVec2, candidate: &PixelRect, mobility: Mobility) -> bool {
        if mobility.ignores_collision() {
            return true;
        }
        let (cell, candidate) = self.normalize(cell, candidate);
        let shape = self.get(cell);
        match mobility {
            Mobility::Walker => shape.is_none_or(|s| !s.intersects(&candidate)),
            _ => shape.is_some_and(|s| mobility.accepts(s.tag)),
        }
    }
}
