//! This module defines the loaded map and its passability queries.

pub mod direction;
pub mod grid;
pub mod layout;
pub mod passability;

use glam::{IVec2, Vec2};
use tracing::debug;

use crate::constants::TILE_SIZE;
use crate::entity::bounds::PixelRect;
use crate::error::MapError;
use crate::map::direction::Direction;
use crate::map::grid::Grid;
use crate::map::layout::{MapData, TilesetFlags};
use crate::map::passability::{Mobility, ShapeCatalog, ShapeTable};

/// A map ready for movement queries.
#[derive(Debug, Clone)]
pub struct Map {
    grid: Grid,
    data: MapData,
    shapes: ShapeTable,
}

impl Map {
    /// Validates `data` and precomputes its shape table.
    pub fn load(data: MapData, catalog: &ShapeCatalog) -> Result<Self, MapError> {
        data.validate()?;
        let grid = Grid::new(data.width, data.height, data.loop_horizontal, data.loop_vertical);
        let shapes = ShapeTable::build(&data, catalog);
        debug!(
            width = data.width,
            height = data.height,
            loop_horizontal = data.loop_horizontal,
            loop_vertical = data.loop_vertical,
            "Map loaded"
        );
        Ok(Self { grid, data, shapes })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    pub fn width(&self) -> u32 {
        self.grid.width
    }

    pub fn height(&self) -> u32 {
        self.grid.height
    }

    pub fn region_id(&self, cell: IVec2) -> u8 {
        self.data.region_id(self.grid.round_tile(cell))
    }

    /// Whether any layer at `cell` is flagged `flag`.
    pub fn has_flag(&self, cell: IVec2, flag: TilesetFlags) -> bool {
        let cell = self.grid.round_tile(cell);
        self.grid.is_valid(cell) && self.data.stacked_flags(cell).any(|f| f.contains(flag))
    }

    pub fn is_bush(&self, cell: IVec2) -> bool {
        self.has_flag(cell, TilesetFlags::BUSH)
    }

    /// Whether a character standing at `pos` is on the map.
    ///
    /// Only the nearest tile counts; boxes hanging over the edge are left to the shape checks.
    pub fn contains(&self, pos: Vec2) -> bool {
        let tile = (pos / TILE_SIZE).round().as_ivec2();
        self.grid.is_valid(self.grid.round_tile(tile))
    }

    /// Checks every tile cell along the leading edge of `candidate` when facing `dir`.
    pub fn map_passable(&self, candidate: &PixelRect, dir: Direction, mobility: Mobility) -> bool {
        candidate
            .edge_cells(dir)
            .into_iter()
            .all(|cell| self.shapes.cell_passable(cell, candidate, mobility))
    }
}
