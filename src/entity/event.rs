use glam::{IVec2, Vec2};
use tracing::debug;

use crate::config::{EntityProfile, MovementConfig};
use crate::constants::DEFAULT_MOVE_SPEED;
use crate::entity::bounds::BoxShape;
use crate::entity::character::Character;
use crate::entity::route::{MoveType, RouteCursor};
use crate::entity::{Collidable, EntityId, HasBoundingBox, Movable, Priority, TriggerKind};
use crate::error::EntityError;
use crate::map::direction::Direction;

/// One page of an event: the settings in force while its conditions hold.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    pub profile: EntityProfile,
    pub trigger: TriggerKind,
    pub priority: Priority,
    pub through: bool,
    pub move_type: MoveType,
    pub move_speed: f32,
}

impl Default for EventPage {
    fn default() -> Self {
        Self {
            profile: EntityProfile::default(),
            trigger: TriggerKind::Action,
            priority: Priority::Same,
            through: false,
            move_type: MoveType::Fixed,
            move_speed: DEFAULT_MOVE_SPEED,
        }
    }
}

impl EventPage {
    pub fn new(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_through(mut self, through: bool) -> Self {
        self.through = through;
        self
    }

    pub fn with_move_type(mut self, move_type: MoveType) -> Self {
        self.move_type = move_type;
        self
    }

    pub fn with_profile(mut self, profile: EntityProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }
}

/// Everything needed to place an event on the map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventSpec {
    pub id: u32,
    pub tile: IVec2,
    pub pages: Vec<EventPage>,
    /// Keep it active while off screen.
    pub always_active: bool,
    /// Never announce it to the presentation layer.
    pub no_visual: bool,
}

impl EventSpec {
    pub fn new(id: u32, tile: IVec2, page: EventPage) -> Self {
        Self {
            id,
            tile,
            pages: vec![page],
            always_active: false,
            no_visual: false,
        }
    }
}

/// A map event.
#[derive(Debug)]
pub struct Event {
    pub id: u32,
    pub character: Character,
    pub always_active: bool,
    pub no_visual: bool,
    pub erased: bool,
    pages: Vec<EventPage>,
    page: Option<usize>,
    /// Autonomous movement derived from the active page.
    pub autonomous: Option<RouteCursor>,
}

impl Event {
    /// Places the event on its tile with its first page active.
    pub fn new(spec: EventSpec, config: &MovementConfig) -> Self {
        let mut event = Self {
            id: spec.id,
            character: Character::new(config.grid, config.diagonal_speed, None),
            always_active: spec.always_active,
            no_visual: spec.no_visual,
            erased: false,
            pages: spec.pages,
            page: None,
            autonomous: None,
        };
        let first = (!event.pages.is_empty()).then_some(0);
        event.apply_page(first, config);
        let offset = event.page().map(|p| p.profile.spawn_offset()).unwrap_or(Vec2::ZERO);
        event.character.move_to(spec.tile, offset);
        event
    }

    pub fn page(&self) -> Option<&EventPage> {
        self.page.and_then(|index| self.pages.get(index))
    }

    pub fn page_index(&self) -> Option<usize> {
        self.page
    }

    /// Switches to another page, or to none at all, and re-resolves the collision box.
    pub fn set_page(&mut self, page: Option<usize>, config: &MovementConfig) -> Result<(), EntityError> {
        if let Some(index) = page {
            if index >= self.pages.len() {
                return Err(EntityError::PageNotFound { event: self.id, page: index });
            }
        }
        if page != self.page {
            debug!(event = self.id, ?page, "Event page switched");
            self.apply_page(page, config);
        }
        Ok(())
    }

    fn apply_page(&mut self, page: Option<usize>, config: &MovementConfig) {
        self.page = page;
        let Some(settings) = page.and_then(|index| self.pages.get(index)) else {
            self.character.set_shape(None);
            self.autonomous = None;
            return;
        };
        let shape = settings.profile.resolve_shape(&config.event_box);
        let through = settings.through;
        let priority = settings.priority;
        let move_speed = settings.move_speed;
        let autonomous = settings.move_type.route().map(RouteCursor::new);

        self.character.set_shape(shape);
        self.character.through = through;
        self.character.priority = priority;
        self.character.move_speed = move_speed;
        self.autonomous = autonomous;
    }

    /// Removes the event from collision and culling until the map reloads.
    pub fn erase(&mut self) {
        debug!(event = self.id, "Event erased");
        self.erased = true;
    }
}

impl HasBoundingBox for Event {
    fn bounding_box(&self) -> Option<&BoxShape> {
        self.character.bounding_box()
    }

    fn facing(&self) -> Direction {
        self.character.direction
    }

    fn lift(&self) -> f32 {
        self.character.lift
    }
}

impl Collidable for Event {
    fn id(&self) -> EntityId {
        EntityId::Event(self.id)
    }

    fn blocks(&self) -> bool {
        self.is_present() && !self.character.through && self.character.priority.is_normal()
    }

    fn collision_position(&self) -> Vec2 {
        self.character.target
    }

    fn priority(&self) -> Priority {
        self.character.priority
    }

    fn trigger(&self) -> Option<TriggerKind> {
        self.page().map(|p| p.trigger)
    }

    fn is_present(&self) -> bool {
        !self.erased && self.page.is_some()
    }
}

impl Movable for Event {
    fn character(&self) -> &Character {
        &self.character
    }

    fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }
}
