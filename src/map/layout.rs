//! Raw map data handed to the simulation at load time.

use bitflags::bitflags;
use glam::IVec2;

use crate::error::MapError;

bitflags! {
    /// The passage word a tileset stores for every tile id.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TilesetFlags: u32 {
        const BLOCK_DOWN = 0x0001;
        const BLOCK_LEFT = 0x0002;
        const BLOCK_RIGHT = 0x0004;
        const BLOCK_UP = 0x0008;
        /// Drawn above characters with no directional restriction.
        const STAR = 0x0010;
        const LADDER = 0x0020;
        const BUSH = 0x0040;
        const COUNTER = 0x0080;
        const DAMAGE = 0x0100;
        const BOAT_BLOCKED = 0x0200;
        const SHIP_BLOCKED = 0x0400;
        const AIRSHIP_NO_LANDING = 0x0800;
    }
}

impl TilesetFlags {
    /// Tiles drawn above characters never contribute collision geometry.
    pub fn is_star(&self) -> bool {
        self.contains(TilesetFlags::STAR)
    }
}

/// Per-tile-id passage flags.
#[derive(Debug, Clone, Default)]
pub struct Tileset {
    flags: Vec<TilesetFlags>,
}

impl Tileset {
    pub fn new(flags: Vec<TilesetFlags>) -> Self {
        Self { flags }
    }

    /// Builds a tileset from raw passage words, keeping unknown bits intact.
    pub fn from_raw(words: &[u32]) -> Self {
        Self::new(words.iter().map(|&w| TilesetFlags::from_bits_retain(w)).collect())
    }

    /// Flags for `tile_id`; ids outside the table carry no flags.
    pub fn flags(&self, tile_id: u16) -> TilesetFlags {
        self.flags.get(tile_id as usize).copied().unwrap_or_default()
    }
}

/// Everything needed to load a map: dimensions, loop flags, tile layers and regions.
///
/// Layers are ordered bottom to top and stored row-major.
#[derive(Debug, Clone)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub loop_horizontal: bool,
    pub loop_vertical: bool,
    pub layers: Vec<Vec<u16>>,
    pub regions: Vec<u8>,
    pub tileset: Tileset,
}

impl MapData {
    /// An empty map with no layers and every region set to zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            loop_horizontal: false,
            loop_vertical: false,
            layers: Vec::new(),
            regions: vec![0; (width * height) as usize],
            tileset: Tileset::default(),
        }
    }

    pub fn with_loops(mut self, horizontal: bool, vertical: bool) -> Self {
        self.loop_horizontal = horizontal;
        self.loop_vertical = vertical;
        self
    }

    pub fn with_tileset(mut self, tileset: Tileset) -> Self {
        self.tileset = tileset;
        self
    }

    /// Appends a layer above the existing ones.
    pub fn push_layer(&mut self, tiles: Vec<u16>) {
        self.layers.push(tiles);
    }

    pub fn set_region(&mut self, x: u32, y: u32, region: u8) {
        if x < self.width && y < self.height {
            let index = (y * self.width + x) as usize;
            self.regions[index] = region;
        }
    }

    fn area(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Checks dimensions and layer sizes.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::EmptyMap {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.area();
        for (layer, tiles) in self.layers.iter().enumerate() {
            if tiles.len() != expected {
                return Err(MapError::LayerSize {
                    layer,
                    found: tiles.len(),
                    expected,
                });
            }
        }
        if self.regions.len() != expected {
            return Err(MapError::RegionSize {
                found: self.regions.len(),
                expected,
            });
        }
        Ok(())
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width as i32 || cell.y >= self.height as i32 {
            return None;
        }
        Some((cell.y as u32 * self.width + cell.x as u32) as usize)
    }

    pub fn region_id(&self, cell: IVec2) -> u8 {
        self.index(cell).map(|i| self.regions[i]).unwrap_or(0)
    }

    /// Flags of every layer at `cell`, top layer first.
    pub fn stacked_flags(&self, cell: IVec2) -> impl Iterator<Item = TilesetFlags> + '_ {
        let index = self.index(cell);
        self.layers
            .iter()
            .rev()
            .filter_map(move |layer| index.map(|i| self.tileset.flags(layer[i])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_sizes() {
        assert!(matches!(MapData::new(0, 3).validate(), Err(MapError::EmptyMap { .. })));

        let mut data = MapData::new(2, 2);
        data.push_layer(vec![0; 3]);
        assert!(matches!(
            data.validate(),
            Err(MapError::LayerSize {
                layer: 0,
                found: 3,
                expected: 4
            })
        ));
    }

    #[test]
    fn test_stacked_flags_top_first() {
        let tileset = Tileset::from_raw(&[0, 0x10, 0x40]);
        let mut data = MapData::new(1, 1).with_tileset(tileset);
        data.push_layer(vec![2]);
        data.push_layer(vec![1]);
        let flags: Vec<_> = data.stacked_flags(IVec2::ZERO).collect();
        assert_eq!(flags, vec![TilesetFlags::STAR, TilesetFlags::BUSH]);
    }

    #[test]
    fn test_raw_flags_keep_unknown_bits() {
        let tileset = Tileset::from_raw(&[1551]);
        assert_eq!(tileset.flags(0).bits(), 1551);
        assert_eq!(tileset.flags(7), TilesetFlags::empty());
    }

    #[test]
    fn test_region_lookup_out_of_bounds() {
        let mut data = MapData::new(2, 2);
        data.set_region(1, 1, 63);
        assert_eq!(data.region_id(IVec2::new(1, 1)), 63);
        assert_eq!(data.region_id(IVec2::new(5, 1)), 0);
    }
}
