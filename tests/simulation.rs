use glam::{IVec2, Vec2};
use pixmove::config::{EntityProfile, MovementConfig};
use pixmove::entity::event::{EventPage, EventSpec};
use pixmove::entity::route::{MoveCommand, MoveRoute, MoveType};
use pixmove::entity::{EntityId, TriggerKind, VehicleKind};
use pixmove::error::{EntityError, SimError};
use pixmove::events::SimEvent;
use pixmove::map::direction::{Dir8, Direction};
use pixmove::map::layout::{MapData, Tileset};
use pixmove::simulation::{Simulation, Snapshot};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn no_landing_data() -> MapData {
    let mut data = MapData::new(5, 5).with_tileset(Tileset::from_raw(&[0x0000, 0x0800]));
    let mut tiles = vec![0; 25];
    tiles[2 * 5 + 2] = 1;
    data.push_layer(tiles);
    data
}

#[test]
fn test_airship_lands_only_where_allowed() {
    let mut sim = Simulation::new(MovementConfig::default(), no_landing_data()).unwrap();
    sim.place_vehicle(VehicleKind::Airship, IVec2::new(2, 2));
    sim.warp(EntityId::Player, IVec2::new(2, 2)).unwrap();

    assert_that(&sim.board_vehicle()).is_true();
    assert_that(&sim.player().in_airship()).is_true();
    assert_that(&sim.leave_vehicle()).is_false();

    sim.warp(EntityId::Player, IVec2::new(3, 3)).unwrap();
    assert_eq!(sim.vehicle(VehicleKind::Airship).character.position, Vec2::new(96.0, 96.0));
    assert_that(&sim.leave_vehicle()).is_true();
    assert_eq!(sim.player().character.position, Vec2::new(96.0, 96.0));
    assert_that(&sim.vehicle(VehicleKind::Airship).driven).is_false();
}

#[test]
fn test_airship_flies_over_walls() {
    let mut sim = common::simulation(6, 3, &[(1, 1), (2, 1)]);
    sim.place_vehicle(VehicleKind::Airship, IVec2::new(0, 1));
    sim.warp(EntityId::Player, IVec2::new(0, 1)).unwrap();
    assert_that(&sim.board_vehicle()).is_true();

    common::hold(&mut sim, Some(Dir8::Right), 24);
    assert_that(&sim.player().character.position.x).is_greater_than(64.0);
    assert_eq!(
        sim.vehicle(VehicleKind::Airship).character.position,
        sim.player().character.position
    );
}

#[test]
fn test_map_change_keeps_only_the_ridden_vehicle() {
    let mut sim = common::simulation(10, 10, &[]);
    sim.place_vehicle(VehicleKind::Boat, IVec2::new(1, 0));
    sim.place_vehicle(VehicleKind::Ship, IVec2::new(5, 5));
    sim.force_move_route(EntityId::Player, MoveRoute::new(vec![MoveCommand::Turn(Direction::Right)]))
        .unwrap();
    sim.update(None);
    assert_that(&sim.board_vehicle()).is_true();

    sim.load_map(MapData::new(8, 8)).unwrap();
    assert_that(&sim.vehicle(VehicleKind::Boat).placed).is_true();
    assert_that(&sim.vehicle(VehicleKind::Ship).placed).is_false();
    assert_eq!(sim.player().riding, Some(VehicleKind::Boat));
}

#[test]
fn test_random_walk_is_reproducible() {
    let run = || {
        let mut sim = common::simulation(12, 12, &[(6, 6)]);
        let page = EventPage::default().with_move_type(MoveType::Random);
        sim.add_event(EventSpec::new(1, IVec2::new(5, 5), page)).unwrap();
        common::hold(&mut sim, None, 300);
        sim.event(1).unwrap().character.position
    };
    let first = run();
    assert_eq!(first, run());
    assert_that(&first.x).is_greater_than_or_equal_to(-4.0);
    assert_that(&first.x).is_less_than_or_equal_to(12.0 * 32.0 - 28.0);
}

#[test]
fn test_approaching_event_closes_in_and_touches() {
    let mut sim = common::simulation(12, 3, &[]);
    let page = EventPage::new(TriggerKind::EventTouch).with_move_type(MoveType::Approach);
    sim.add_event(EventSpec::new(4, IVec2::new(8, 0), page)).unwrap();

    common::hold(&mut sim, None, 200);
    let event = sim.event(4).unwrap().character.position;
    assert_that(&event.x).is_less_than(40.0);
    let touched = sim
        .drain_notifications()
        .contains(&SimEvent::EventStarted { event: 4, trigger: TriggerKind::EventTouch });
    assert_that(&touched).is_true();
}

#[test]
fn test_followers_gather_on_warp() {
    let mut sim = common::simulation(10, 10, &[]);
    let first = sim.add_follower(&EntityProfile::default());
    let second = sim.add_follower(&EntityProfile::default());
    assert_eq!((first, second), (EntityId::Follower(0), EntityId::Follower(1)));

    common::hold(&mut sim, Some(Dir8::Down), 40);
    sim.warp(EntityId::Player, IVec2::new(7, 2)).unwrap();
    for follower in sim.followers() {
        assert_eq!(follower.character.position, Vec2::new(224.0, 64.0));
    }
}

#[test]
fn test_snapshot_survives_serialization() {
    let mut sim = common::simulation(10, 10, &[]);
    sim.add_event(EventSpec::new(2, IVec2::new(4, 4), EventPage::default())).unwrap();
    sim.warp(EntityId::Player, IVec2::new(1, 6)).unwrap();
    let json = serde_json::to_string(&sim.snapshot()).unwrap();

    sim.warp(EntityId::Player, IVec2::new(9, 9)).unwrap();
    sim.warp(EntityId::Event(2), IVec2::new(0, 0)).unwrap();
    let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
    sim.restore(&snapshot).unwrap();

    assert_eq!(sim.player().character.position, Vec2::new(32.0, 192.0));
    assert_eq!(sim.event(2).unwrap().character.position, Vec2::new(128.0, 128.0));
}

#[test]
fn test_unknown_entities_are_errors() {
    let mut sim = common::simulation(4, 4, &[]);
    let missing = EntityId::Event(42);
    assert_that(&matches!(
        sim.resolve_move(missing, Direction::Down),
        Err(SimError::Entity(EntityError::NotFound(id))) if id == missing
    ))
    .is_true();
    assert_that(&sim.erase_event(42).is_err()).is_true();
    assert_that(&sim.bounding_box_of(missing).is_err()).is_true();

    sim.add_event(EventSpec::new(42, IVec2::new(1, 1), EventPage::default())).unwrap();
    assert_that(&matches!(
        sim.set_event_page(42, Some(3)),
        Err(SimError::Entity(EntityError::PageNotFound { event: 42, page: 3 }))
    ))
    .is_true();
}

#[test]
fn test_page_without_geometry_stops_blocking() {
    let mut sim = common::simulation(10, 10, &[]);
    let spec = EventSpec {
        pages: vec![
            EventPage::new(TriggerKind::Action),
            EventPage::new(TriggerKind::Action).with_profile(EntityProfile::with_box(&[0.0, 0.0])),
        ],
        ..EventSpec::new(1, IVec2::new(1, 0), EventPage::default())
    };
    sim.add_event(spec).unwrap();
    sim.move_to_pixel(EntityId::Player, Vec2::new(8.0, 0.0)).unwrap();
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(8.0, 0.0), Direction::Right).unwrap()).is_false();

    sim.set_event_page(1, Some(1)).unwrap();
    assert_that(&sim.bounding_box_of(EntityId::Event(1)).unwrap()).is_none();
    assert_that(&sim.is_passable(EntityId::Player, Vec2::new(8.0, 0.0), Direction::Right).unwrap()).is_true();
}

#[test]
fn test_tick_counter_and_busy_flag() {
    let mut sim = common::simulation(6, 6, &[]);
    sim.force_move_route(
        EntityId::Player,
        MoveRoute::new(vec![MoveCommand::Wait(3), MoveCommand::Step(Dir8::Down)]),
    )
    .unwrap();
    let mut ticks = 0;
    while sim.is_busy() && ticks < 20 {
        sim.update(None);
        ticks += 1;
    }
    assert_eq!(sim.tick(), ticks);
    assert_eq!(sim.player().character.target, Vec2::new(0.0, 4.0));
    assert_that(&ticks).is_less_than(20);
}
