#![allow(dead_code)]

use glam::IVec2;
use pixmove::config::{MovementConfig, ShapeDef};
use pixmove::map::direction::Dir8;
use pixmove::map::layout::MapData;
use pixmove::map::passability::ShapeCatalog;
use pixmove::map::Map;
use pixmove::simulation::Simulation;

/// Region painted on cells that should be solid walls.
pub const WALL_REGION: u8 = 63;

pub fn wall_config() -> MovementConfig {
    let mut config = MovementConfig::default();
    config.region_shapes.insert(WALL_REGION, ShapeDef::single(&[32.0, 32.0]));
    config
}

pub fn walled_data(width: u32, height: u32, walls: &[(u32, u32)]) -> MapData {
    let mut data = MapData::new(width, height);
    for &(x, y) in walls {
        data.set_region(x, y, WALL_REGION);
    }
    data
}

pub fn load_map(data: MapData, config: &MovementConfig) -> Map {
    Map::load(data, &ShapeCatalog::compile(config)).unwrap()
}

pub fn simulation(width: u32, height: u32, walls: &[(u32, u32)]) -> Simulation {
    Simulation::new(wall_config(), walled_data(width, height, walls)).unwrap()
}

/// Holds `input` for `ticks` updates.
pub fn hold(sim: &mut Simulation, input: Option<Dir8>, ticks: u32) {
    for _ in 0..ticks {
        sim.update(input);
    }
}

pub fn tile(x: i32, y: i32) -> IVec2 {
    IVec2::new(x, y)
}
