//! The simulation of one map: owns the map and every character on it and advances them a tick at a time.

use glam::{IVec2, UVec2, Vec2};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::{EntityProfile, MovementConfig};
use crate::constants::{FOLLOWER_GAP, TILE_SIZE};
use crate::entity::bounds::PixelRect;
use crate::entity::event::{Event, EventSpec};
use crate::entity::player::{Follower, Player};
use crate::entity::roster::Roster;
use crate::entity::route::{MoveRoute, RouteCursor};
use crate::entity::vehicle::Vehicle;
use crate::entity::{Collidable, EntityId, HasBoundingBox, Movable, TriggerKind, TriggerSet, VehicleKind};
use crate::error::{EntityError, SimResult};
use crate::events::SimEvent;
use crate::formatter::record_tick;
use crate::map::direction::{Dir8, Direction};
use crate::map::grid::tile_of;
use crate::map::layout::{MapData, TilesetFlags};
use crate::map::passability::ShapeCatalog;
use crate::map::Map;
use crate::systems::camera::Camera;
use crate::systems::collision::{CollisionBroker, CollisionQuery};
use crate::systems::culling::{CullCandidate, Culler};
use crate::systems::movement::{MoveOutcome, Resolver};
use crate::systems::routes::{run_route, RouteAction, RouteContext};

/// Where one character stands, as saved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    /// The pixel position the character is at, or heading to if mid-step.
    pub position: Vec2,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entities: Vec<EntitySnapshot>,
}

/// A loaded map with its characters.
///
/// Each call to [`Simulation::update`] runs one tick: scripted scrolling, player input,
/// event movement, interpolation, trigger checks, then culling. Notifications for the
/// host pile up until [`Simulation::drain_notifications`].
pub struct Simulation {
    config: MovementConfig,
    catalog: ShapeCatalog,
    map: Map,
    roster: Roster,
    culler: Culler,
    camera: Camera,
    /// Bumped whenever any character commits a step or is placed; stale box failures key off it.
    revision: u64,
    tick: u64,
    interpreter_running: bool,
    notifications: Vec<SimEvent>,
    rng: SmallRng,
}

impl Simulation {
    pub fn new(config: MovementConfig, data: MapData) -> SimResult<Self> {
        config.validate()?;
        let catalog = ShapeCatalog::compile(&config);
        let map = Map::load(data, &catalog)?;
        let screen = UVec2::from(config.screen_tiles);
        let player = Player::new(&config, &EntityProfile::default());

        let mut sim = Self {
            roster: Roster::new(player, &config),
            culler: Culler::new(screen, config.cull_padding),
            camera: Camera::new(screen),
            rng: SmallRng::seed_from_u64(config.random_seed),
            config,
            catalog,
            map,
            revision: 0,
            tick: 0,
            interpreter_running: false,
            notifications: Vec::new(),
        };
        sim.refresh_culling(true);
        info!(
            width = sim.map.width(),
            height = sim.map.height(),
            shapes = sim.map.shapes().shape_count(),
            "Simulation ready"
        );
        Ok(sim)
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.roster.player
    }

    pub fn followers(&self) -> &[Follower] {
        &self.roster.followers
    }

    pub fn event(&self, id: u32) -> Option<&Event> {
        self.roster.events.get(&id)
    }

    pub fn vehicle(&self, kind: VehicleKind) -> &Vehicle {
        self.roster.vehicle(kind)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The top-left tile of the display.
    pub fn display(&self) -> Vec2 {
        self.camera.display()
    }

    /// Events currently simulated, in id order.
    pub fn active_events(&self) -> Vec<u32> {
        self.culler.active().collect()
    }

    pub fn drain_notifications(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.notifications)
    }

    fn broker(&self) -> CollisionBroker {
        CollisionBroker::new(*self.map.grid(), self.roster.colliders(|id| self.culler.is_active(id)))
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // Setup

    /// Replaces the player's collision shape.
    pub fn set_player_profile(&mut self, profile: &EntityProfile) {
        let shape = profile.resolve_shape(&self.config.player_box);
        self.roster.player.character.set_shape(shape);
        self.touch();
    }

    /// Adds a party follower standing on the player.
    pub fn add_follower(&mut self, profile: &EntityProfile) -> EntityId {
        let index = self.roster.followers.len();
        let mut follower = Follower::new(index, &self.config, profile);
        follower.character.move_to_pixel(self.roster.player.character.position);
        self.roster.followers.push(follower);
        EntityId::Follower(index)
    }

    pub fn add_event(&mut self, spec: EventSpec) -> SimResult<()> {
        if self.roster.events.contains_key(&spec.id) {
            return Err(EntityError::DuplicateEvent(spec.id).into());
        }
        let event = Event::new(spec, &self.config);
        debug!(event = event.id, tile = ?event.character.tile(), "Event added");
        self.roster.events.insert(event.id, event);
        self.touch();
        self.refresh_culling(true);
        Ok(())
    }

    pub fn place_vehicle(&mut self, kind: VehicleKind, tile: IVec2) {
        self.roster.vehicle_mut(kind).place(tile);
        self.touch();
    }

    /// Swaps in a new map. Events are dropped, vehicles not being ridden are removed, and every
    /// cached failure is forgotten.
    pub fn load_map(&mut self, data: MapData) -> SimResult<()> {
        let map = Map::load(data, &self.catalog)?;
        let despawned: Vec<u32> = self
            .culler
            .active()
            .filter(|id| self.roster.events.get(id).is_some_and(|e| !e.no_visual))
            .collect();
        self.notifications
            .extend(despawned.into_iter().map(|id| SimEvent::Despawned(EntityId::Event(id))));

        self.roster.events.clear();
        for vehicle in &mut self.roster.vehicles {
            if !vehicle.driven {
                vehicle.remove();
            }
        }
        for id in self.roster.ids() {
            if let Ok(mover) = self.roster.get_mut(id) {
                mover.character_mut().failures.clear();
            }
        }
        self.map = map;
        self.culler.reset();
        self.touch();
        self.center_camera();
        self.refresh_culling(true);
        Ok(())
    }

    // Host requests

    pub fn set_interpreter_running(&mut self, running: bool) {
        self.interpreter_running = running;
    }

    /// Whether a forced route is still playing out.
    pub fn is_busy(&self) -> bool {
        self.roster.player.character.is_route_forced()
            || self.roster.events.values().any(|e| e.character.is_route_forced())
    }

    fn drive<F>(&mut self, id: EntityId, f: F) -> SimResult<MoveOutcome>
    where
        F: FnOnce(&Resolver<'_>, &mut dyn Movable) -> MoveOutcome,
    {
        let broker = self.broker();
        let resolver = Resolver::new(&self.map, &broker, &self.config, self.revision);
        let mover = self.roster.get_mut(id)?;
        if mover.character().is_moving() {
            return Ok(MoveOutcome::failed(false));
        }
        Ok(f(&resolver, mover))
    }

    /// One straight step for `id`. Characters still finishing a step do not move.
    pub fn resolve_move(&mut self, id: EntityId, dir: Direction) -> SimResult<MoveOutcome> {
        let outcome = self.drive(id, |resolver, mover| resolver.move_straight(mover, dir, true))?;
        self.after_move(id, outcome);
        Ok(outcome)
    }

    pub fn resolve_diagonal(&mut self, id: EntityId, horz: Direction, vert: Direction) -> SimResult<MoveOutcome> {
        let outcome = self.drive(id, |resolver, mover| resolver.move_diagonal(mover, horz, vert))?;
        self.after_move(id, outcome);
        Ok(outcome)
    }

    /// Whether `id`, standing at the pixel position `pos`, could take one step along `dir`.
    pub fn is_passable(&mut self, id: EntityId, pos: Vec2, dir: Direction) -> SimResult<bool> {
        let broker = self.broker();
        let resolver = Resolver::new(&self.map, &broker, &self.config, self.revision);
        let mover = self.roster.get_mut(id)?;
        let distance = mover.character().move_distance(false);
        Ok(resolver.passable(mover, pos, dir, distance))
    }

    /// The absolute box of `id` where it stands, or `None` if it has no geometry.
    pub fn bounding_box_of(&self, id: EntityId) -> SimResult<Option<PixelRect>> {
        let mover = self.roster.get(id)?;
        Ok(mover.box_at(mover.character().position))
    }

    /// Teleports `id` to a tile. Moving the player also gathers the followers and recentres the display.
    pub fn warp(&mut self, id: EntityId, tile: IVec2) -> SimResult<()> {
        self.move_to_pixel(id, tile.as_vec2() * TILE_SIZE)
    }

    pub fn move_to_pixel(&mut self, id: EntityId, pos: Vec2) -> SimResult<()> {
        self.roster.get_mut(id)?.character_mut().move_to_pixel(pos);
        if id == EntityId::Player {
            for follower in &mut self.roster.followers {
                follower.character.move_to_pixel(pos);
            }
            self.sync_ridden_vehicle();
            self.center_camera();
        }
        debug!(entity = %id, x = pos.x, y = pos.y, "Warped");
        self.touch();
        self.refresh_culling(true);
        Ok(())
    }

    pub fn force_move_route(&mut self, id: EntityId, route: MoveRoute) -> SimResult<()> {
        self.roster.get_mut(id)?.character_mut().forced_route = Some(RouteCursor::new(route));
        Ok(())
    }

    pub fn erase_event(&mut self, id: u32) -> SimResult<()> {
        self.roster
            .events
            .get_mut(&id)
            .ok_or(EntityError::NotFound(EntityId::Event(id)))?
            .erase();
        self.touch();
        self.refresh_culling(true);
        Ok(())
    }

    pub fn set_event_page(&mut self, id: u32, page: Option<usize>) -> SimResult<()> {
        self.roster
            .events
            .get_mut(&id)
            .ok_or(EntityError::NotFound(EntityId::Event(id)))?
            .set_page(page, &self.config)?;
        self.touch();
        self.refresh_culling(true);
        Ok(())
    }

    /// Turns the visual of an event off or back on.
    pub fn set_event_no_visual(&mut self, id: u32, no_visual: bool) -> SimResult<()> {
        self.roster
            .events
            .get_mut(&id)
            .ok_or(EntityError::NotFound(EntityId::Event(id)))?
            .no_visual = no_visual;
        self.refresh_culling(true);
        Ok(())
    }

    /// Boards the vehicle in front of the player (or under it, for the airship).
    pub fn board_vehicle(&mut self) -> bool {
        let player = &self.roster.player;
        if player.riding.is_some() || player.character.is_moving() {
            return false;
        }
        let pos = player.character.position;
        let dir = player.character.direction;
        let front = self.map.grid().round_shift(pos, dir, TILE_SIZE);

        let boarded = VehicleKind::ALL.into_iter().find(|&kind| {
            let vehicle = self.roster.vehicle(kind);
            if !vehicle.placed {
                return false;
            }
            let sample = if kind == VehicleKind::Airship { pos } else { front };
            match (player.box_facing(sample, dir), vehicle.box_at(vehicle.character.position)) {
                (Some(mine), Some(theirs)) => self
                    .map
                    .grid()
                    .loop_images()
                    .into_iter()
                    .any(|offset| theirs.intersects(&mine.translate(offset))),
                _ => self.map.grid().round_tile(tile_of(sample)) == vehicle.character.tile(),
            }
        });
        let Some(kind) = boarded else {
            return false;
        };

        let vehicle = self.roster.vehicle_mut(kind);
        vehicle.driven = true;
        let seat = vehicle.character.position;
        self.roster.player.board(kind);
        self.roster.player.character.move_to_pixel(seat);
        for follower in &mut self.roster.followers {
            follower.character.move_to_pixel(seat);
        }
        debug!(vehicle = kind.as_ref(), "Vehicle boarded");
        self.notifications.push(SimEvent::VehicleBoarded(kind));
        self.touch();
        true
    }

    /// Steps off the ridden vehicle onto the walkable position in front (or below, for the airship).
    pub fn leave_vehicle(&mut self) -> bool {
        let Some(kind) = self.roster.player.riding else {
            return false;
        };
        if self.roster.player.character.is_moving() {
            return false;
        }
        let pos = self.roster.player.character.position;
        let dir = self.roster.player.character.direction;
        let landing = if kind == VehicleKind::Airship {
            if self.map.has_flag(self.roster.player.character.tile(), TilesetFlags::AIRSHIP_NO_LANDING) {
                return false;
            }
            pos
        } else {
            self.map.grid().round_shift(pos, dir, TILE_SIZE)
        };

        let broker = self.broker();
        let resolver = Resolver::new(&self.map, &broker, &self.config, self.revision);
        if !resolver.can_land(&self.roster.player, landing, dir) {
            trace!(vehicle = kind.as_ref(), "No place to land");
            return false;
        }

        let vehicle = self.roster.vehicle_mut(kind);
        vehicle.driven = false;
        vehicle.character.move_to_pixel(pos);
        self.roster.player.disembark();
        self.roster.player.character.move_to_pixel(landing);
        for follower in &mut self.roster.followers {
            follower.character.move_to_pixel(landing);
        }
        debug!(vehicle = kind.as_ref(), "Vehicle left");
        self.notifications.push(SimEvent::VehicleLeft(kind));
        self.touch();
        true
    }

    /// The action button: events underfoot, then events in front.
    pub fn trigger_action(&mut self) {
        if self.interpreter_running || self.roster.player.character.is_moving() {
            return;
        }
        if !self.check_trigger_here(TriggerSet::ACTION) {
            self.check_trigger_there(TriggerSet::ACTION);
        }
    }

    // Camera

    pub fn set_display_pos(&mut self, pos: Vec2) {
        self.camera.set_display_pos(self.map.grid(), pos);
        self.refresh_culling(false);
    }

    pub fn start_scroll(&mut self, dir: Dir8, distance: Vec2, frames: f32) {
        self.camera.start_scroll(self.map.grid(), dir, distance, frames);
    }

    /// Scrolls until `id` is centred on screen.
    pub fn scroll_to(&mut self, id: EntityId, frames: f32) -> SimResult<()> {
        let tile = self.roster.get(id)?.character().position / TILE_SIZE;
        self.camera.scroll_to(self.map.grid(), tile.round(), frames);
        Ok(())
    }

    pub fn is_scrolling(&self) -> bool {
        self.camera.is_scrolling()
    }

    fn center_camera(&mut self) {
        let tile = self.roster.player.character.position / TILE_SIZE;
        self.camera.center_on(self.map.grid(), tile);
    }

    // Tick

    /// Runs one tick with the directional input held this frame, if any.
    pub fn update(&mut self, input: Option<Dir8>) {
        self.tick += 1;
        record_tick(self.tick);

        self.camera.update(self.map.grid());
        self.update_player(input);
        self.update_events();
        self.interpolate();
        self.check_autorun();
        self.refresh_culling(false);
    }

    fn update_player(&mut self, input: Option<Dir8>) {
        if self.roster.player.character.is_moving() {
            return;
        }
        let broker = self.broker();
        let resolver = Resolver::new(&self.map, &broker, &self.config, self.revision);

        let outcome = if let Some(mut cursor) = self.roster.player.character.forced_route.take() {
            let ctx = RouteContext {
                resolver: &resolver,
                grid: self.map.grid(),
                player_position: self.roster.player.character.position,
                dir8: self.config.dir8,
            };
            let action = run_route(&mut cursor, &mut self.roster.player, &ctx, &mut self.rng);
            if action == RouteAction::Finished {
                debug!("Player route finished");
            } else {
                self.roster.player.character.forced_route = Some(cursor);
            }
            match action {
                RouteAction::Moved(outcome) => Some(outcome),
                _ => None,
            }
        } else {
            match input {
                Some(dir) if !self.interpreter_running => {
                    let dir = if self.config.dir8 { dir } else { Dir8::from(dir.to_dir4()) };
                    Some(resolver.move_dir8(&mut self.roster.player, dir, true))
                }
                _ => None,
            }
        };

        if let Some(outcome) = outcome {
            self.after_move(EntityId::Player, outcome);
        }
    }

    fn update_events(&mut self) {
        let ids: Vec<u32> = self.roster.events.keys().copied().collect();
        for id in ids {
            let Some(event) = self.roster.events.get(&id) else {
                continue;
            };
            if !event.is_present() || event.character.is_moving() {
                continue;
            }
            let autonomous = self.culler.is_active(id) || self.config.offscreen_movement || event.always_active;

            let broker = self.broker();
            let resolver = Resolver::new(&self.map, &broker, &self.config, self.revision);
            let ctx = RouteContext {
                resolver: &resolver,
                grid: self.map.grid(),
                player_position: self.roster.player.character.position,
                dir8: self.config.dir8,
            };
            let Some(event) = self.roster.events.get_mut(&id) else {
                continue;
            };

            let action = if let Some(mut cursor) = event.character.forced_route.take() {
                let action = run_route(&mut cursor, event, &ctx, &mut self.rng);
                if action != RouteAction::Finished {
                    event.character.forced_route = Some(cursor);
                }
                action
            } else if autonomous {
                match event.autonomous.take() {
                    Some(mut cursor) => {
                        let action = run_route(&mut cursor, event, &ctx, &mut self.rng);
                        if action != RouteAction::Finished {
                            event.autonomous = Some(cursor);
                        }
                        action
                    }
                    None => RouteAction::Idle,
                }
            } else {
                RouteAction::Idle
            };

            if let RouteAction::Moved(outcome) = action {
                self.after_move(EntityId::Event(id), outcome);
            }
        }
    }

    fn after_move(&mut self, id: EntityId, outcome: MoveOutcome) {
        if outcome.succeeded() {
            self.touch();
            if id == EntityId::Player {
                self.move_followers();
            }
            return;
        }
        if !outcome.bumped || self.interpreter_running {
            return;
        }
        match id {
            EntityId::Player if !self.roster.player.in_airship() => {
                let player = &self.roster.player.character;
                let front = self
                    .map
                    .grid()
                    .round_shift(player.position, player.direction, player.move_distance(false));
                if let Some(rect) = self.roster.player.box_facing(front, player.direction) {
                    self.start_events_at(&rect, TriggerSet::TOUCH, true);
                }
            }
            EntityId::Event(event) => self.check_event_touch(event),
            _ => {}
        }
    }

    /// An event with an event-touch trigger bumping into the player starts.
    fn check_event_touch(&mut self, id: u32) {
        let Some(event) = self.roster.events.get(&id) else {
            return;
        };
        if event.trigger() != Some(TriggerKind::EventTouch) || !event.character.priority.is_normal() {
            return;
        }
        let c = &event.character;
        let front = self.map.grid().round_shift(c.position, c.direction, c.move_distance(false));
        let Some(rect) = event.box_facing(front, c.direction) else {
            return;
        };
        let touched = self
            .broker()
            .overlapping(&rect, &CollisionQuery::new(EntityId::Event(id)))
            .contains(&EntityId::Player);
        if touched {
            self.start_event(id, TriggerKind::EventTouch);
        }
    }

    /// Followers step after their leader once the gap grows past a tile.
    fn move_followers(&mut self) {
        let grid = *self.map.grid();
        let broker = self.broker();
        let resolver = Resolver::new(&self.map, &broker, &self.config, self.revision);
        let speed = self.roster.player.character.move_speed;
        let dashing = self.roster.player.character.dashing;
        let mut leader = self.roster.player.character.target;

        for follower in &mut self.roster.followers {
            let next_leader = follower.character.target;
            if !follower.character.is_moving() {
                let gap = grid.pixel_delta(follower.character.position, leader);
                if gap.abs().max_element() > FOLLOWER_GAP {
                    follower.character.move_speed = speed;
                    follower.character.dashing = dashing;
                    let step = follower.character.move_distance(false);
                    let sign = |d: f32| if d.abs() >= step { d.signum() as i32 } else { 0 };
                    if let Some(dir) = Dir8::from_signs(sign(gap.x), sign(gap.y)) {
                        resolver.move_dir8(follower, dir, false);
                    }
                }
            }
            leader = next_leader;
        }
    }

    fn interpolate(&mut self) {
        let grid = *self.map.grid();
        let before = self.roster.player.character.position;
        let player_done = self.roster.player.character.update_move();
        self.camera.follow(&grid, before, self.roster.player.character.position);
        self.sync_ridden_vehicle();

        let mut finished = Vec::new();
        if player_done {
            finished.push(EntityId::Player);
        }
        for follower in &mut self.roster.followers {
            if follower.character.update_move() {
                finished.push(follower.id());
            }
        }
        for vehicle in &mut self.roster.vehicles {
            if !vehicle.driven && vehicle.character.update_move() {
                finished.push(vehicle.id());
            }
        }
        for event in self.roster.events.values_mut() {
            if event.character.update_move() {
                finished.push(event.id());
            }
        }

        for id in finished {
            let Ok(mover) = self.roster.get(id) else { continue };
            let bush = self.map.is_bush(mover.character().tile());
            self.notifications.push(SimEvent::MoveFinished { entity: id, bush });
        }

        if player_done && !self.interpreter_running && !self.roster.player.in_airship() {
            self.check_trigger_here(TriggerSet::TOUCH);
        }
    }

    fn sync_ridden_vehicle(&mut self) {
        let Some(kind) = self.roster.player.riding else {
            return;
        };
        let (position, target, direction) = {
            let c = &self.roster.player.character;
            (c.position, c.target, c.direction)
        };
        let vehicle = &mut self.roster.vehicle_mut(kind).character;
        vehicle.position = position;
        vehicle.target = target;
        vehicle.direction = direction;
    }

    // Triggers

    /// Starts every event overlapping `rect` whose trigger is in `triggers`. Returns whether any started.
    fn start_events_at(&mut self, rect: &PixelRect, triggers: TriggerSet, normal: bool) -> bool {
        if self.interpreter_running {
            return false;
        }
        let hits = self.broker().triggered(rect, triggers, normal);
        for &(id, trigger) in &hits {
            self.start_event(id, trigger);
        }
        !hits.is_empty()
    }

    /// Events below or above characters that overlap the player.
    fn check_trigger_here(&mut self, triggers: TriggerSet) -> bool {
        let player = &self.roster.player;
        let Some(rect) = player.box_at(player.character.position) else {
            return false;
        };
        self.start_events_at(&rect, triggers, false)
    }

    /// Same-level events one step in front of the player, then one step further.
    fn check_trigger_there(&mut self, triggers: TriggerSet) -> bool {
        let player = &self.roster.player;
        let c = &player.character;
        let grid = *self.map.grid();
        let distance = c.move_distance(false);
        let front = grid.round_shift(c.position, c.direction, distance);
        let beyond = grid.round_shift(front, c.direction, distance);
        let ahead = [player.box_facing(front, c.direction), player.box_facing(beyond, c.direction)];
        for rect in ahead.into_iter().flatten() {
            if self.start_events_at(&rect, triggers, true) {
                return true;
            }
        }
        false
    }

    fn check_autorun(&mut self) {
        if self.interpreter_running {
            return;
        }
        let autoruns: Vec<u32> = self
            .roster
            .events
            .values()
            .filter(|e| e.is_present() && e.trigger() == Some(TriggerKind::Autorun))
            .map(|e| e.id)
            .collect();
        for id in autoruns {
            self.start_event(id, TriggerKind::Autorun);
        }
    }

    fn start_event(&mut self, id: u32, trigger: TriggerKind) {
        debug!(event = id, trigger = trigger.as_ref(), "Event started");
        self.notifications.push(SimEvent::EventStarted { event: id, trigger });
    }

    // Culling

    fn refresh_culling(&mut self, force: bool) {
        let grid = *self.map.grid();
        let display = self.camera.display();
        let player_tile = self.roster.player.character.tile();
        let candidates: Vec<CullCandidate> = self
            .roster
            .events
            .values()
            .filter(|e| e.is_present())
            .map(|e| CullCandidate {
                id: e.id,
                tile: e.character.tile(),
                always_active: e.always_active,
                no_visual: e.no_visual,
            })
            .collect();
        let changes = if force {
            self.culler.recompute(&grid, display, candidates)
        } else {
            self.culler.refresh(&grid, display, player_tile, candidates)
        };
        self.notifications
            .extend(changes.spawned.into_iter().map(|id| SimEvent::Spawned(EntityId::Event(id))));
        self.notifications
            .extend(changes.despawned.into_iter().map(|id| SimEvent::Despawned(EntityId::Event(id))));
    }

    // Snapshots

    pub fn snapshot(&self) -> Snapshot {
        let entities = self
            .roster
            .ids()
            .into_iter()
            .filter_map(|id| self.roster.get(id).ok())
            .map(|mover| EntitySnapshot {
                id: mover.id(),
                position: mover.character().target,
                direction: mover.character().direction,
            })
            .collect();
        Snapshot { entities }
    }

    /// Puts every character in `snapshot` back where it was. Unknown ids are an error and
    /// leave the characters restored so far in place.
    pub fn restore(&mut self, snapshot: &Snapshot) -> SimResult<()> {
        for entry in &snapshot.entities {
            let character = self.roster.get_mut(entry.id)?.character_mut();
            character.move_to_pixel(entry.position);
            character.set_direction(entry.direction);
        }
        self.touch();
        self.center_camera();
        self.refresh_culling(true);
        Ok(())
    }
}
