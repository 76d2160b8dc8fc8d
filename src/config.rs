//! Movement tuning and collision shape tables, loadable from JSON.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{
    DEFAULT_CULL_PADDING, DEFAULT_DIAGONAL_SPEED, DEFAULT_EVENT_BOX, DEFAULT_GRID, DEFAULT_PLAYER_BOX, DEFAULT_VEHICLE_BOX,
    SCREEN_TILES,
};
use crate::entity::bounds::{BoundingBox, BoxShape};
use crate::error::ConfigError;
use crate::map::direction::Direction;

/// Terrain a collision shape stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeTag {
    #[default]
    Solid,
    Water,
    DeepWater,
}

/// A raw `[width, height, ox?, oy?]` list as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxSpec(pub Vec<f32>);

impl BoxSpec {
    /// The box this list describes, or `None` when it has the wrong number of values.
    pub fn resolve(&self) -> Option<BoundingBox> {
        BoundingBox::from_values(&self.0)
    }
}

impl From<[f32; 4]> for BoxSpec {
    fn from(values: [f32; 4]) -> Self {
        BoxSpec(values.to_vec())
    }
}

impl From<&[f32]> for BoxSpec {
    fn from(values: &[f32]) -> Self {
        BoxSpec(values.to_vec())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BoxList {
    Single(BoxSpec),
    Multiple(Vec<BoxSpec>),
}

impl From<BoxList> for Vec<BoxSpec> {
    fn from(list: BoxList) -> Self {
        match list {
            BoxList::Single(spec) => vec![spec],
            BoxList::Multiple(specs) => specs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ShapeDefRepr {
    Bare(BoxList),
    Tagged {
        boxes: BoxList,
        #[serde(default)]
        tag: ShapeTag,
    },
}

/// One or more boxes anchored to a tile, plus the terrain they represent.
///
/// Accepts `[32, 32]`, `[[32, 4], [4, 32, 28]]` or `{"boxes": ..., "tag": "water"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ShapeDefRepr")]
pub struct ShapeDef {
    pub boxes: Vec<BoxSpec>,
    pub tag: ShapeTag,
}

impl From<ShapeDefRepr> for ShapeDef {
    fn from(repr: ShapeDefRepr) -> Self {
        match repr {
            ShapeDefRepr::Bare(list) => ShapeDef {
                boxes: list.into(),
                tag: ShapeTag::Solid,
            },
            ShapeDefRepr::Tagged { boxes, tag } => ShapeDef { boxes: boxes.into(), tag },
        }
    }
}

impl ShapeDef {
    pub fn single(values: &[f32]) -> Self {
        Self {
            boxes: vec![BoxSpec::from(values)],
            tag: ShapeTag::Solid,
        }
    }

    pub fn multiple(boxes: &[&[f32]]) -> Self {
        Self {
            boxes: boxes.iter().map(|&b| BoxSpec::from(b)).collect(),
            tag: ShapeTag::Solid,
        }
    }

    pub fn with_tag(mut self, tag: ShapeTag) -> Self {
        self.tag = tag;
        self
    }
}

/// Which retries a failed player move may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartMove {
    /// Retry at progressively lower speeds.
    pub speed: bool,
    /// Retry along the two diagonals next to the requested direction.
    pub direction: bool,
}

impl Default for SmartMove {
    fn default() -> Self {
        Self {
            speed: true,
            direction: false,
        }
    }
}

/// Per-entity overrides authored next to an entity's definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntityProfile {
    pub bbox: Option<BoxSpec>,
    pub down: Option<BoxSpec>,
    pub left: Option<BoxSpec>,
    pub right: Option<BoxSpec>,
    pub up: Option<BoxSpec>,
    /// Pixel offset applied when the entity is placed on a tile.
    pub offset: Option<[f32; 2]>,
}

impl EntityProfile {
    pub fn with_box(values: &[f32]) -> Self {
        Self {
            bbox: Some(BoxSpec::from(values)),
            ..Self::default()
        }
    }

    /// Resolves the collision shape, falling back to `default` when the main box is malformed.
    ///
    /// Returns `None` when the resulting box has no area.
    pub fn resolve_shape(&self, default: &BoxSpec) -> Option<BoxShape> {
        let main = match &self.bbox {
            Some(spec) => spec.resolve().or_else(|| {
                warn!(?spec, "Malformed bounding box, using the default");
                default.resolve()
            }),
            None => default.resolve(),
        }?;

        let mut overrides = Vec::new();
        for (dir, spec) in [
            (Direction::Down, &self.down),
            (Direction::Left, &self.left),
            (Direction::Right, &self.right),
            (Direction::Up, &self.up),
        ] {
            let Some(spec) = spec else { continue };
            match spec.resolve() {
                Some(bbox) => overrides.push((dir, bbox)),
                None => warn!(?spec, direction = dir.as_ref(), "Malformed directional bounding box, ignoring"),
            }
        }
        BoxShape::new(main, &overrides)
    }

    pub fn spawn_offset(&self) -> Vec2 {
        self.offset.map(Vec2::from).unwrap_or(Vec2::ZERO)
    }
}

/// All tuning the movement engine reads at load time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Minimum pixels advanced per discrete move.
    pub grid: f32,
    /// Allow eight-way input.
    pub dir8: bool,
    /// Move-speed delta applied while travelling diagonally.
    pub diagonal_speed: f32,
    /// Repeat the passability checks at the half step.
    pub midpoint_check: bool,
    pub smart_move: SmartMove,
    pub player_box: BoxSpec,
    pub event_box: BoxSpec,
    pub vehicle_box: BoxSpec,
    /// Shapes keyed by raw tileset passage word.
    pub tile_shapes: BTreeMap<u32, ShapeDef>,
    /// Shapes keyed by region id; these take priority over tile shapes.
    pub region_shapes: BTreeMap<u8, ShapeDef>,
    /// Visible screen size in tiles.
    pub screen_tiles: [u32; 2],
    /// Tiles the culling rectangle extends past each screen edge.
    pub cull_padding: u32,
    /// Let culled events keep running their autonomous movement.
    pub offscreen_movement: bool,
    pub random_seed: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            grid: DEFAULT_GRID,
            dir8: true,
            diagonal_speed: DEFAULT_DIAGONAL_SPEED,
            midpoint_check: true,
            smart_move: SmartMove::default(),
            player_box: DEFAULT_PLAYER_BOX.into(),
            event_box: DEFAULT_EVENT_BOX.into(),
            vehicle_box: DEFAULT_VEHICLE_BOX.into(),
            tile_shapes: default_tile_shapes(),
            region_shapes: BTreeMap::new(),
            screen_tiles: [SCREEN_TILES.x, SCREEN_TILES.y],
            cull_padding: DEFAULT_CULL_PADDING,
            offscreen_movement: false,
            random_seed: 0,
        }
    }
}

/// Shapes for the passage words of the stock wall and counter tiles.
fn default_tile_shapes() -> BTreeMap<u32, ShapeDef> {
    BTreeMap::from([
        (1537, ShapeDef::single(&[32.0, 4.0, 0.0, 28.0])),
        (1538, ShapeDef::single(&[4.0, 32.0])),
        (1539, ShapeDef::multiple(&[&[32.0, 4.0, 0.0, 28.0], &[4.0, 32.0]])),
        (1540, ShapeDef::single(&[4.0, 32.0, 28.0])),
        (1541, ShapeDef::multiple(&[&[32.0, 4.0, 0.0, 28.0], &[4.0, 32.0, 28.0]])),
        (1544, ShapeDef::single(&[32.0, 4.0])),
        (1546, ShapeDef::multiple(&[&[32.0, 4.0], &[4.0, 32.0]])),
        (1548, ShapeDef::multiple(&[&[32.0, 4.0], &[4.0, 32.0, 28.0]])),
        (1551, ShapeDef::single(&[32.0, 32.0])),
        (3586, ShapeDef::single(&[4.0, 32.0])),
        (3588, ShapeDef::single(&[4.0, 32.0, 28.0])),
        (3592, ShapeDef::single(&[32.0, 4.0])),
        (3594, ShapeDef::multiple(&[&[32.0, 4.0], &[4.0, 32.0]])),
        (3596, ShapeDef::multiple(&[&[32.0, 4.0], &[4.0, 32.0, 28.0]])),
        (3599, ShapeDef::single(&[32.0, 32.0])),
    ])
}

impl MovementConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MovementConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.is_finite() && self.grid > 0.0) {
            return Err(ConfigError::InvalidGrid(self.grid));
        }
        let [w, h] = self.screen_tiles;
        if w == 0 || h == 0 {
            return Err(ConfigError::InvalidScreen(w, h));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_def_forms() {
        let single: ShapeDef = serde_json::from_str("[32, 32]").unwrap();
        assert_eq!(single, ShapeDef::single(&[32.0, 32.0]));

        let multi: ShapeDef = serde_json::from_str("[[32, 4], [4, 32, 28]]").unwrap();
        assert_eq!(multi.boxes.len(), 2);

        let tagged: ShapeDef = serde_json::from_str(r#"{"boxes": [32, 32], "tag": "deep_water"}"#).unwrap();
        assert_eq!(tagged.tag, ShapeTag::DeepWater);
    }

    #[test]
    fn test_malformed_profile_falls_back() {
        let profile = EntityProfile::with_box(&[10.0]);
        let shape = profile.resolve_shape(&DEFAULT_EVENT_BOX.into()).unwrap();
        assert_eq!(shape.main(), &BoundingBox::from_array(DEFAULT_EVENT_BOX));
    }

    #[test]
    fn test_degenerate_profile_has_no_shape() {
        let profile = EntityProfile::with_box(&[0.0, 0.0]);
        assert!(profile.resolve_shape(&DEFAULT_EVENT_BOX.into()).is_none());
    }

    #[test]
    fn test_default_validates() {
        assert!(MovementConfig::default().validate().is_ok());
        assert_eq!(MovementConfig::default().tile_shapes.len(), 15);
    }
}
