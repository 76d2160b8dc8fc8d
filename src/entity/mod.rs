//! Characters that move around the map and the interfaces the resolver drives them through.

pub mod bounds;
pub mod character;
pub mod event;
pub mod player;
pub mod roster;
pub mod route;
pub mod vehicle;

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;

use crate::entity::bounds::{BoxShape, PixelRect};
use crate::entity::character::Character;
use crate::map::direction::Direction;
use crate::map::passability::Mobility;
use crate::systems::collision::{Collider, ColliderKind};

pub use crate::entity::vehicle::VehicleKind;

/// Identifies any character the simulation owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityId {
    Player,
    Follower(usize),
    Event(u32),
    Vehicle(VehicleKind),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Player => write!(f, "player"),
            EntityId::Follower(index) => write!(f, "follower #{index}"),
            EntityId::Event(id) => write!(f, "event #{id}"),
            EntityId::Vehicle(kind) => write!(f, "{}", kind.as_ref()),
        }
    }
}

/// Drawing layer relative to characters. Only `Same` takes part in blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsRefStr)]
pub enum Priority {
    Below,
    #[default]
    Same,
    Above,
}

impl Priority {
    pub fn is_normal(&self) -> bool {
        matches!(self, Priority::Same)
    }
}

/// What starts an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsRefStr)]
pub enum TriggerKind {
    /// The player presses the action button while facing or standing on it.
    #[default]
    Action,
    /// The player walks into it.
    PlayerTouch,
    /// It walks into the player, or the player walks into it.
    EventTouch,
    /// Starts as soon as nothing else is running.
    Autorun,
    /// Runs alongside everything else; never started by movement.
    Parallel,
}

impl TriggerKind {
    pub fn as_set(&self) -> TriggerSet {
        match self {
            TriggerKind::Action => TriggerSet::ACTION,
            TriggerKind::PlayerTouch => TriggerSet::PLAYER_TOUCH,
            TriggerKind::EventTouch => TriggerSet::EVENT_TOUCH,
            TriggerKind::Autorun => TriggerSet::AUTORUN,
            TriggerKind::Parallel => TriggerSet::PARALLEL,
        }
    }
}

bitflags! {
    /// A filter over [`TriggerKind`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TriggerSet: u8 {
        const ACTION = 1 << 0;
        const PLAYER_TOUCH = 1 << 1;
        const EVENT_TOUCH = 1 << 2;
        const AUTORUN = 1 << 3;
        const PARALLEL = 1 << 4;

        const TOUCH = Self::PLAYER_TOUCH.bits() | Self::EVENT_TOUCH.bits();
    }
}

impl TriggerSet {
    pub fn matches(&self, trigger: TriggerKind) -> bool {
        self.intersects(trigger.as_set())
    }
}

/// Anything with an optional, possibly direction-dependent collision box.
pub trait HasBoundingBox {
    /// `None` means the owner has no geometry and never collides.
    fn bounding_box(&self) -> Option<&BoxShape>;

    fn facing(&self) -> Direction;

    /// Pixels the box is raised above the position.
    fn lift(&self) -> f32 {
        0.0
    }

    /// The absolute box while standing at `pos` facing `dir`.
    fn box_facing(&self, pos: Vec2, dir: Direction) -> Option<PixelRect> {
        let lifted = pos - Vec2::new(0.0, self.lift());
        self.bounding_box().map(|shape| shape.rect_at(lifted, dir))
    }

    fn box_at(&self, pos: Vec2) -> Option<PixelRect> {
        self.box_facing(pos, self.facing())
    }
}

/// Something other characters can bump into.
pub trait Collidable: HasBoundingBox {
    fn id(&self) -> EntityId;

    /// Whether this currently stops other characters.
    fn blocks(&self) -> bool;

    /// The position other characters test against: where this one is heading.
    fn collision_position(&self) -> Vec2;

    fn priority(&self) -> Priority {
        Priority::Same
    }

    /// The trigger this starts on, for characters that can be started at all.
    fn trigger(&self) -> Option<TriggerKind> {
        None
    }

    fn collider_kind(&self) -> ColliderKind {
        ColliderKind::Character
    }

    /// Whether this is on the map at all.
    fn is_present(&self) -> bool {
        true
    }

    /// A snapshot for the collision broker, or `None` when this takes no part in collision.
    fn collider(&self) -> Option<Collider> {
        if !self.is_present() {
            return None;
        }
        let rect = self.box_at(self.collision_position())?;
        Some(Collider {
            id: self.id(),
            rect,
            blocks: self.blocks(),
            priority: self.priority(),
            trigger: self.trigger(),
            kind: self.collider_kind(),
        })
    }
}

/// Something the movement resolver can drive.
pub trait Movable: Collidable {
    fn character(&self) -> &Character;

    fn character_mut(&mut self) -> &mut Character;

    fn mobility(&self) -> Mobility {
        Mobility::Walker
    }

    /// Whether failed moves retry at lower speeds or along adjacent diagonals.
    fn smart_move(&self) -> bool {
        false
    }

    /// A collider the broker must ignore for this mover, such as the vehicle it rides.
    fn ignored_collider(&self) -> Option<EntityId> {
        None
    }
}
