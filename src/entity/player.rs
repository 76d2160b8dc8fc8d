use glam::Vec2;

use crate::config::{EntityProfile, MovementConfig};
use crate::entity::bounds::BoxShape;
use crate::entity::character::Character;
use crate::entity::{Collidable, EntityId, HasBoundingBox, Movable, VehicleKind};
use crate::map::direction::Direction;
use crate::map::passability::Mobility;

/// The character driven by input.
#[derive(Debug)]
pub struct Player {
    pub character: Character,
    /// The vehicle being ridden, if any.
    pub riding: Option<VehicleKind>,
    walk_speed: f32,
}

impl Player {
    pub fn new(config: &MovementConfig, profile: &EntityProfile) -> Self {
        let shape = profile.resolve_shape(&config.player_box);
        let character = Character::new(config.grid, config.diagonal_speed, shape);
        let walk_speed = character.move_speed;
        Self {
            character,
            riding: None,
            walk_speed,
        }
    }

    /// Starts riding `kind`, switching to its speed.
    pub fn board(&mut self, kind: VehicleKind) {
        self.walk_speed = self.character.move_speed;
        self.character.move_speed = kind.move_speed();
        self.character.failures.clear();
        self.riding = Some(kind);
    }

    /// Stops riding and returns the vehicle left behind.
    pub fn disembark(&mut self) -> Option<VehicleKind> {
        let kind = self.riding.take()?;
        self.character.move_speed = self.walk_speed;
        self.character.failures.clear();
        Some(kind)
    }

    pub fn in_airship(&self) -> bool {
        self.riding == Some(VehicleKind::Airship)
    }
}

impl HasBoundingBox for Player {
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

impl Collidable for Player {
    fn id(&self) -> EntityId {
        EntityId::Player
    }

    fn blocks(&self) -> bool {
        !self.character.through && !self.in_airship() && self.character.priority.is_normal()
    }

    fn collision_position(&self) -> Vec2 {
        self.character.target
    }
}

impl Movable for Player {
    fn character(&self) -> &Character {
        &self.character
    }

    fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    fn mobility(&self) -> Mobility {
        self.riding.map(|kind| kind.mobility()).unwrap_or_default()
    }

    fn smart_move(&self) -> bool {
        true
    }

    fn ignored_collider(&self) -> Option<EntityId> {
        self.riding.map(EntityId::Vehicle)
    }
}

/// A party member trailing the player.
#[derive(Debug)]
pub struct Follower {
    pub index: usize,
    pub character: Character,
}

impl Follower {
    /// Followers pass through everything unless told otherwise.
    pub fn new(index: usize, config: &MovementConfig, profile: &EntityProfile) -> Self {
        let shape = profile.resolve_shape(&config.player_box);
        let mut character = Character::new(config.grid, config.diagonal_speed, shape);
        character.through = true;
        Self { index, character }
    }
}

impl HasBoundingBox for Follower {
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

impl Collidable for Follower {
    fn id(&self) -> EntityId {
        EntityId::Follower(self.index)
    }

    fn blocks(&self) -> bool {
        !self.character.through && self.character.priority.is_normal()
    }

    fn collision_position(&self) -> Vec2 {
        self.character.target
    }
}

impl Movable for Follower {
    fn character(&self) -> &Character {
        &self.character
    }

    fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }
}
