//! Walks a scripted player around a small looping map and logs everything the simulation reports.
//!
//! Pass a JSON movement config as the first argument to override the defaults.

use anyhow::{Context, Result};
use glam::IVec2;
use pixmove::config::{EntityProfile, MovementConfig, ShapeDef, ShapeTag};
use pixmove::entity::event::{EventPage, EventSpec};
use pixmove::entity::route::{MoveCommand, MoveRoute, MoveType};
use pixmove::entity::{EntityId, TriggerKind, VehicleKind};
use pixmove::events::SimEvent;
use pixmove::formatter::TickFormatter;
use pixmove::map::direction::{Dir8, Direction};
use pixmove::map::layout::{MapData, Tileset};
use pixmove::simulation::Simulation;
use tracing::{debug, info, info_span};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const WIDTH: u32 = 24;
const HEIGHT: u32 = 18;

const FLOOR: u16 = 0;
const WALL: u16 = 1;
const BUSH: u16 = 2;
const WATER: u16 = 3;

/// Passage word of the water tile; walkers are blocked, boats and ships float.
const WATER_WORD: u32 = 0x000F;

/// Input held for a number of ticks.
const SCRIPT: &[(Option<Dir8>, u32)] = &[
    (Some(Dir8::Right), 48),
    (Some(Dir8::DownRight), 32),
    (None, 10),
    (Some(Dir8::Up), 80),
    (Some(Dir8::Left), 120),
    (Some(Dir8::Down), 40),
];

fn build_map() -> MapData {
    // Floor, full wall, bush, and water that only boats and ships cross.
    let tileset = Tileset::from_raw(&[0x0000, 0x060F, 0x0040, WATER_WORD]);
    let mut data = MapData::new(WIDTH, HEIGHT).with_loops(true, false).with_tileset(tileset);

    let mut tiles = vec![FLOOR; (WIDTH * HEIGHT) as usize];
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let tile = match (x, y) {
                (_, 0) => WALL,
                (10..=11, 5..=7) => WALL,
                (4..=6, 9..=10) => BUSH,
                (_, 15..) => WATER,
                _ => FLOOR,
            };
            tiles[(y * WIDTH + x) as usize] = tile;
        }
    }
    data.push_layer(tiles);
    data
}

fn load_config() -> Result<MovementConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("Failed to read config from {path}"))?;
            let config = MovementConfig::from_json(&json).with_context(|| format!("Invalid config in {path}"))?;
            info!(path, "Loaded movement config");
            config
        }
        None => MovementConfig::default(),
    };
    config
        .tile_shapes
        .entry(WATER_WORD)
        .or_insert_with(|| ShapeDef::single(&[32.0, 32.0]).with_tag(ShapeTag::Water));
    Ok(config)
}

fn populate(sim: &mut Simulation) -> Result<()> {
    sim.warp(EntityId::Player, IVec2::new(3, 3))?;
    sim.add_follower(&EntityProfile::default());

    sim.add_event(EventSpec::new(
        1,
        IVec2::new(14, 4),
        EventPage::new(TriggerKind::Action).with_move_type(MoveType::Random),
    ))?;
    sim.add_event(EventSpec::new(2, IVec2::new(8, 3), EventPage::new(TriggerKind::PlayerTouch)))?;
    sim.add_event(EventSpec::new(
        3,
        IVec2::new(18, 12),
        EventPage::new(TriggerKind::EventTouch).with_move_type(MoveType::Approach),
    ))?;
    sim.place_vehicle(VehicleKind::Boat, IVec2::new(12, 15));
    Ok(())
}

fn report(sim: &mut Simulation) {
    for note in sim.drain_notifications() {
        match note {
            SimEvent::MoveFinished { entity, bush } => debug!(%entity, bush, "Step finished"),
            SimEvent::EventStarted { event, trigger } => info!(event, trigger = trigger.as_ref(), "Event started"),
            other => info!(?other),
        }
    }
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().event_format(TickFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).context("Could not set global default")?;

    let config = load_config()?;
    let mut sim = Simulation::new(config, build_map()).context("Failed to start the simulation")?;
    populate(&mut sim)?;
    report(&mut sim);

    for &(input, ticks) in SCRIPT {
        let _span = info_span!("input", dir = ?input).entered();
        for _ in 0..ticks {
            sim.update(input);
            report(&mut sim);
        }
    }

    // Ride the boat out onto the water and back.
    sim.warp(EntityId::Player, IVec2::new(12, 14))?;
    sim.force_move_route(
        EntityId::Player,
        MoveRoute::new(vec![MoveCommand::Turn(Direction::Down)]),
    )?;
    while sim.is_busy() {
        sim.update(None);
    }
    if sim.board_vehicle() {
        for _ in 0..64 {
            sim.update(Some(Dir8::Right));
        }
        sim.update(Some(Dir8::Up));
        let landed = sim.leave_vehicle();
        info!(landed, "Tried to go ashore");
    }
    report(&mut sim);

    let snapshot = sim.snapshot();
    info!(
        ticks = sim.tick(),
        player = ?sim.player().character.position,
        entities = snapshot.entities.len(),
        "Demo finished"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
