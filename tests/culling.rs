use glam::{IVec2, Vec2};
use pixmove::config::MovementConfig;
use pixmove::entity::event::{EventPage, EventSpec};
use pixmove::entity::route::MoveType;
use pixmove::entity::EntityId;
use pixmove::events::SimEvent;
use pixmove::map::layout::MapData;
use pixmove::simulation::Simulation;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn small_screen(offscreen_movement: bool) -> MovementConfig {
    MovementConfig {
        screen_tiles: [10, 10],
        cull_padding: 2,
        offscreen_movement,
        ..MovementConfig::default()
    }
}

#[test]
fn test_looping_map_culls_across_the_seam() {
    let data = MapData::new(40, 40).with_loops(true, false);
    let mut sim = Simulation::new(small_screen(false), data).unwrap();
    sim.add_event(EventSpec::new(1, IVec2::new(38, 5), EventPage::default())).unwrap();
    sim.add_event(EventSpec::new(2, IVec2::new(37, 5), EventPage::default())).unwrap();
    sim.add_event(EventSpec::new(3, IVec2::new(12, 12), EventPage::default())).unwrap();

    assert_eq!(sim.active_events(), vec![1, 3]);
    assert_eq!(
        sim.drain_notifications(),
        vec![SimEvent::Spawned(EntityId::Event(1)), SimEvent::Spawned(EntityId::Event(3))]
    );
}

#[test]
fn test_moving_display_despawns_and_spawns() {
    let mut sim = Simulation::new(small_screen(false), MapData::new(60, 60)).unwrap();
    sim.add_event(EventSpec::new(1, IVec2::new(2, 2), EventPage::default())).unwrap();
    sim.add_event(EventSpec::new(2, IVec2::new(30, 30), EventPage::default())).unwrap();
    sim.drain_notifications();

    sim.set_display_pos(Vec2::new(25.0, 25.0));
    assert_eq!(
        sim.drain_notifications(),
        vec![SimEvent::Spawned(EntityId::Event(2)), SimEvent::Despawned(EntityId::Event(1))]
    );

    sim.set_display_pos(Vec2::new(25.0, 25.0));
    assert_that(&sim.drain_notifications()).is_empty();
}

#[test]
fn test_opted_out_events() {
    let mut sim = Simulation::new(small_screen(false), MapData::new(60, 60)).unwrap();
    let mut always = EventSpec::new(1, IVec2::new(50, 50), EventPage::default());
    always.always_active = true;
    let mut silent = EventSpec::new(2, IVec2::new(3, 3), EventPage::default());
    silent.no_visual = true;
    sim.add_event(always).unwrap();
    sim.add_event(silent).unwrap();

    assert_eq!(sim.active_events(), vec![1, 2]);
    assert_eq!(sim.drain_notifications(), vec![SimEvent::Spawned(EntityId::Event(1))]);

    sim.erase_event(2).unwrap();
    assert_eq!(sim.active_events(), vec![1]);
    assert_that(&sim.drain_notifications()).is_empty();

    sim.erase_event(1).unwrap();
    assert_eq!(sim.drain_notifications(), vec![SimEvent::Despawned(EntityId::Event(1))]);
}

#[test]
fn test_visual_opt_out_follows_reconfiguration() {
    let mut sim = Simulation::new(small_screen(false), MapData::new(60, 60)).unwrap();
    let mut hidden = EventSpec::new(3, IVec2::new(4, 4), EventPage::default());
    hidden.no_visual = true;
    sim.add_event(hidden).unwrap();
    assert_that(&sim.drain_notifications()).is_empty();

    sim.set_event_no_visual(3, false).unwrap();
    assert_eq!(sim.drain_notifications(), vec![SimEvent::Spawned(EntityId::Event(3))]);

    sim.set_display_pos(Vec2::new(40.0, 40.0));
    assert_eq!(sim.drain_notifications(), vec![SimEvent::Despawned(EntityId::Event(3))]);
    assert_that(&sim.set_event_no_visual(9, true)).is_err();
}

#[test]
fn test_culled_events_hold_still_unless_allowed() {
    let wander = || EventSpec::new(1, IVec2::new(40, 40), EventPage::default().with_move_type(MoveType::Random));

    let mut frozen = Simulation::new(small_screen(false), MapData::new(60, 60)).unwrap();
    frozen.add_event(wander()).unwrap();
    common::hold(&mut frozen, None, 30);
    assert_eq!(frozen.event(1).unwrap().character.position, Vec2::new(1280.0, 1280.0));

    let mut roaming = Simulation::new(small_screen(true), MapData::new(60, 60)).unwrap();
    roaming.add_event(wander()).unwrap();
    common::hold(&mut roaming, None, 30);
    assert_ne!(roaming.event(1).unwrap().character.position, Vec2::new(1280.0, 1280.0));
    assert_that(&roaming.active_events()).is_empty();
}
