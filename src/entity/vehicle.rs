use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumCount, EnumIter};

use crate::config::MovementConfig;
use crate::entity::bounds::BoxShape;
use crate::entity::character::Character;
use crate::entity::{Collidable, EntityId, HasBoundingBox, Movable, Priority};
use crate::map::direction::Direction;
use crate::map::passability::Mobility;
use crate::systems::collision::ColliderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, EnumCount, AsRefStr)]
pub enum VehicleKind {
    Boat,
    Ship,
    Airship,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Boat, VehicleKind::Ship, VehicleKind::Airship];

    pub fn mobility(&self) -> Mobility {
        match self {
            VehicleKind::Boat => Mobility::Boat,
            VehicleKind::Ship => Mobility::Ship,
            VehicleKind::Airship => Mobility::Airship,
        }
    }

    pub fn move_speed(&self) -> f32 {
        match self {
            VehicleKind::Boat => 4.0,
            VehicleKind::Ship => 5.0,
            VehicleKind::Airship => 6.0,
        }
    }

    /// Airships fly above everything and never stand in anyone's way.
    pub fn blocks_walkers(&self) -> bool {
        !matches!(self, VehicleKind::Airship)
    }

    pub fn index(&self) -> usize {
        match self {
            VehicleKind::Boat => 0,
            VehicleKind::Ship => 1,
            VehicleKind::Airship => 2,
        }
    }
}

/// A boardable vehicle.
#[derive(Debug)]
pub struct Vehicle {
    pub kind: VehicleKind,
    pub character: Character,
    /// Whether it stands on the current map.
    pub placed: bool,
    /// Whether the player is riding it.
    pub driven: bool,
}

impl Vehicle {
    pub fn new(kind: VehicleKind, config: &MovementConfig) -> Self {
        let shape = config.vehicle_box.resolve().and_then(|b| BoxShape::new(b, &[]));
        let mut character = Character::new(config.grid, config.diagonal_speed, shape);
        character.move_speed = kind.move_speed();
        character.lift = 0.0;
        if kind == VehicleKind::Airship {
            character.priority = Priority::Above;
        }
        Self {
            kind,
            character,
            placed: false,
            driven: false,
        }
    }

    pub fn place(&mut self, tile: IVec2) {
        self.character.move_to(tile, Vec2::ZERO);
        self.placed = true;
    }

    pub fn remove(&mut self) {
        self.placed = false;
    }
}

impl HasBoundingBox for Vehicle {
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

impl Collidable for Vehicle {
    fn id(&self) -> EntityId {
        EntityId::Vehicle(self.kind)
    }

    fn blocks(&self) -> bool {
        self.placed && !self.driven && self.kind.blocks_walkers()
    }

    fn collision_position(&self) -> Vec2 {
        self.character.target
    }

    fn priority(&self) -> Priority {
        self.character.priority
    }

    fn collider_kind(&self) -> ColliderKind {
        ColliderKind::Vehicle
    }

    fn is_present(&self) -> bool {
        self.placed
    }
}

impl Movable for Vehicle {
    fn character(&self) -> &Character {
        &self.character
    }

    fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    fn mobility(&self) -> Mobility {
        self.kind.mobility()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unplaced_vehicle_has_no_collider() {
        let mut boat = Vehicle::new(VehicleKind::Boat, &MovementConfig::default());
        assert!(boat.collider().is_none());
        boat.place(IVec2::new(2, 2));
        let collider = boat.collider().unwrap();
        assert!(collider.blocks);
        assert_eq!(collider.rect.min, Vec2::new(64.0, 64.0));
    }

    #[test]
    fn test_airship_never_blocks() {
        let mut airship = Vehicle::new(VehicleKind::Airship, &MovementConfig::default());
        airship.place(IVec2::ZERO);
        assert!(!airship.blocks());
        assert_eq!(airship.mobility(), Mobility::Airship);
    }
}
