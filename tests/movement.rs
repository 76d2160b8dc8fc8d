use glam::{IVec2, Vec2};
use pixmove::config::{EntityProfile, MovementConfig, ShapeDef, SmartMove};
use pixmove::entity::event::{EventPage, EventSpec};
use pixmove::entity::{EntityId, TriggerKind};
use pixmove::map::direction::{Dir8, Direction};
use pixmove::simulation::Simulation;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

/// A half-height wall along the top of tile (1, 1).
const LEDGE_REGION: u8 = 7;

fn ledge_sim(smart_move: SmartMove) -> Simulation {
    let mut config = MovementConfig {
        smart_move,
        ..common::wall_config()
    };
    config.region_shapes.insert(LEDGE_REGION, ShapeDef::single(&[32.0, 16.0]));
    let mut data = common::walled_data(5, 5, &[]);
    data.set_region(1, 1, LEDGE_REGION);
    let mut sim = Simulation::new(config, data).unwrap();
    sim.move_to_pixel(EntityId::Player, Vec2::new(0.0, 24.0)).unwrap();
    sim
}

#[test]
fn test_walking_into_a_wall_creeps_up_to_it() {
    let mut sim = common::simulation(5, 5, &[(2, 0)]);
    common::hold(&mut sim, Some(Dir8::Right), 40);

    let player = &sim.player().character;
    assert_eq!(player.position, Vec2::new(35.5, 0.0));
    assert_eq!(player.direction, Direction::Right);
    assert_that(&player.is_moving()).is_false();
    assert_eq!(player.move_speed, 4.0);
}

#[test]
fn test_blocked_move_slides_along_diagonal_when_enabled() {
    let mut sliding = ledge_sim(SmartMove {
        speed: false,
        direction: true,
    });
    let outcome = sliding.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_eq!(outcome.moved, Some(Dir8::UpRight));
    assert_eq!(sliding.player().character.target, Vec2::new(3.5, 20.5));

    let mut stuck = ledge_sim(SmartMove {
        speed: false,
        direction: false,
    });
    let outcome = stuck.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_that(&outcome.succeeded()).is_false();
    assert_that(&outcome.bumped).is_true();
    assert_eq!(stuck.player().character.direction, Direction::Right);
}

#[test]
fn test_blocked_diagonal_falls_back_to_open_leg() {
    // The box bottom sits half a pixel above the wall: any step down reaches it, sideways stays clear.
    let mut sim = common::simulation(5, 5, &[(0, 1)]);
    sim.move_to_pixel(EntityId::Player, Vec2::new(0.0, 3.5)).unwrap();
    assert_eq!(sim.bounding_box_of(EntityId::Player).unwrap().map(|r| r.max.y), Some(31.5));

    let outcome = sim.resolve_diagonal(EntityId::Player, Direction::Right, Direction::Down).unwrap();
    assert_eq!(outcome.moved, Some(Dir8::Right));
    assert_eq!(outcome.distance, 4.0);
    assert_eq!(sim.player().character.target, Vec2::new(4.0, 3.5));
    assert_that(&sim.player().character.diagonal).is_false();
}

#[test]
fn test_open_diagonal_uses_diagonal_speed() {
    let mut sim = common::simulation(5, 5, &[]);
    sim.move_to_pixel(EntityId::Player, Vec2::new(32.0, 32.0)).unwrap();
    let outcome = sim.resolve_diagonal(EntityId::Player, Direction::Left, Direction::Down).unwrap();
    assert_eq!(outcome.moved, Some(Dir8::DownLeft));
    assert_eq!(outcome.distance, 3.5);
    assert_eq!(sim.player().character.target, Vec2::new(28.5, 35.5));
}

#[test]
fn test_removed_blocker_is_not_remembered() {
    let mut sim = common::simulation(10, 10, &[]);
    sim.add_event(EventSpec::new(1, IVec2::new(1, 0), EventPage::new(TriggerKind::Action)))
        .unwrap();
    sim.move_to_pixel(EntityId::Player, Vec2::new(8.0, 0.0)).unwrap();

    let blocked = sim.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_that(&blocked.succeeded()).is_false();
    let again = sim.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_eq!(blocked, again);

    sim.erase_event(1).unwrap();
    let moved = sim.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_that(&moved.succeeded()).is_true();
    assert_eq!(sim.player().character.target, Vec2::new(12.0, 0.0));
}

#[test]
fn test_four_way_input_keeps_horizontal() {
    let config = MovementConfig {
        dir8: false,
        ..MovementConfig::default()
    };
    let mut sim = Simulation::new(config, common::walled_data(5, 5, &[])).unwrap();
    sim.move_to_pixel(EntityId::Player, Vec2::new(32.0, 32.0)).unwrap();
    sim.update(Some(Dir8::DownRight));
    assert_eq!(sim.player().character.target, Vec2::new(36.0, 32.0));
}

#[test]
fn test_is_passable_queries_without_moving() {
    let mut sim = common::simulation(5, 5, &[(1, 0)]);
    assert_that(&sim.is_passable(EntityId::Player, Vec2::ZERO, Direction::Right).unwrap()).is_false();
    assert_that(&sim.is_passable(EntityId::Player, Vec2::ZERO, Direction::Down).unwrap()).is_true();
    assert_eq!(sim.player().character.position, Vec2::ZERO);
    assert_that(&sim.is_passable(EntityId::Follower(3), Vec2::ZERO, Direction::Down)).is_err();
}

#[test]
fn test_full_tile_box_walks_along_top_row() {
    let mut sim = common::simulation(5, 5, &[]);
    sim.set_player_profile(&EntityProfile::with_box(&[32.0, 32.0]));
    sim.warp(EntityId::Player, common::tile(1, 0)).unwrap();
    assert_that(&sim.bounding_box_of(EntityId::Player).unwrap().map(|r| r.min.y)).is_equal_to(Some(-4.0));

    let right = sim.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_eq!(right.moved, Some(Dir8::Right));
    assert_eq!(sim.player().character.target, Vec2::new(36.0, 0.0));

    sim.warp(EntityId::Player, common::tile(1, 0)).unwrap();
    let left = sim.resolve_move(EntityId::Player, Direction::Left).unwrap();
    assert_eq!(left.moved, Some(Dir8::Left));
    assert_eq!(sim.player().character.target, Vec2::new(28.0, 0.0));
}

#[test]
fn test_map_edge_checks_the_destination_tile() {
    let mut sim = common::simulation(4, 3, &[]);
    // The box hangs past the right edge, but the nearest tile is still column 3.
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(100.0, 32.0), Direction::Right).unwrap()).is_true();
    // 116 / 32 rounds to column 4, off the map.
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(112.0, 32.0), Direction::Right).unwrap()).is_false();
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(0.0, 32.0), Direction::Left).unwrap()).is_true();
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(-12.0, 32.0), Direction::Left).unwrap()).is_false();
}

#[test]
fn test_looping_seam_walls_and_wrapping_steps() {
    let data = common::walled_data(4, 3, &[(0, 1)]).with_loops(true, false);
    let mut sim = Simulation::new(common::wall_config(), data).unwrap();

    // Column 0's wall is met again past the right edge.
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(100.0, 32.0), Direction::Right).unwrap()).is_false();
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(100.0, 64.0), Direction::Right).unwrap()).is_true();

    sim.move_to_pixel(EntityId::Player, Vec2::new(124.0, 64.0)).unwrap();
    let outcome = sim.resolve_move(EntityId::Player, Direction::Right).unwrap();
    assert_eq!(outcome.moved, Some(Dir8::Right));
    assert_eq!(sim.player().character.target, Vec2::new(0.0, 64.0));
    assert_eq!(sim.player().character.position, Vec2::new(-4.0, 64.0));

    sim.move_to_pixel(EntityId::Player, Vec2::new(0.0, 64.0)).unwrap();
    sim.resolve_move(EntityId::Player, Direction::Left).unwrap();
    assert_eq!(sim.player().character.target, Vec2::new(124.0, 64.0));
}
