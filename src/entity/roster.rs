//! Every character on the current map, addressable by [`EntityId`].

use std::collections::BTreeMap;

use crate::config::MovementConfig;
use crate::entity::event::Event;
use crate::entity::player::{Follower, Player};
use crate::entity::vehicle::Vehicle;
use crate::entity::{Collidable, EntityId, Movable, VehicleKind};
use crate::error::EntityError;
use crate::systems::collision::Collider;

#[derive(Debug)]
pub struct Roster {
    pub player: Player,
    pub followers: Vec<Follower>,
    pub events: BTreeMap<u32, Event>,
    /// One per [`VehicleKind`], in [`VehicleKind::ALL`] order.
    pub vehicles: Vec<Vehicle>,
}

impl Roster {
    pub fn new(player: Player, config: &MovementConfig) -> Self {
        Self {
            player,
            followers: Vec::new(),
            events: BTreeMap::new(),
            vehicles: VehicleKind::ALL.iter().map(|&kind| Vehicle::new(kind, config)).collect(),
        }
    }

    pub fn vehicle(&self, kind: VehicleKind) -> &Vehicle {
        &self.vehicles[kind.index()]
    }

    pub fn vehicle_mut(&mut self, kind: VehicleKind) -> &mut Vehicle {
        &mut self.vehicles[kind.index()]
    }

    pub fn get(&self, id: EntityId) -> Result<&dyn Movable, EntityError> {
        Ok(match id {
            EntityId::Player => &self.player,
            EntityId::Follower(index) => self.followers.get(index).ok_or(EntityError::NotFound(id))?,
            EntityId::Event(event) => self.events.get(&event).ok_or(EntityError::NotFound(id))?,
            EntityId::Vehicle(kind) => self.vehicle(kind),
        })
    }

    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut dyn Movable, EntityError> {
        Ok(match id {
            EntityId::Player => &mut self.player,
            EntityId::Follower(index) => self.followers.get_mut(index).ok_or(EntityError::NotFound(id))?,
            EntityId::Event(event) => self.events.get_mut(&event).ok_or(EntityError::NotFound(id))?,
            EntityId::Vehicle(kind) => self.vehicle_mut(kind),
        })
    }

    /// Every id currently on the roster, player first.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids = vec![EntityId::Player];
        ids.extend(self.followers.iter().map(|f| f.id()));
        ids.extend(self.vehicles.iter().map(|v| v.id()));
        ids.extend(self.events.keys().map(|&id| EntityId::Event(id)));
        ids
    }

    /// Colliders for a broker snapshot. Events are included only when `event_active` says so.
    pub fn colliders(&self, event_active: impl Fn(u32) -> bool) -> Vec<Collider> {
        let mut colliders = Vec::with_capacity(1 + self.followers.len() + self.vehicles.len() + self.events.len());
        colliders.extend(self.player.collider());
        colliders.extend(self.followers.iter().filter_map(|f| f.collider()));
        colliders.extend(self.vehicles.iter().filter_map(|v| v.collider()));
        colliders.extend(
            self.events
                .values()
                .filter(|e| event_active(e.id))
                .filter_map(|e| e.collider()),
        );
        colliders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityProfile;

    #[test]
    fn test_lookup_unknown_event() {
        let config = MovementConfig::default();
        let roster = Roster::new(Player::new(&config, &EntityProfile::default()), &config);
        assert_eq!(roster.get(EntityId::Event(3)).err(), Some(EntityError::NotFound(EntityId::Event(3))));
        assert_eq!(roster.get(EntityId::Vehicle(VehicleKind::Ship)).map(|m| m.id()).ok(), Some(EntityId::Vehicle(VehicleKind::Ship)));
        assert_eq!(roster.ids().len(), 4);
    }

    #[test]
    fn test_unplaced_vehicles_are_not_colliders() {
        let config = MovementConfig::default();
        let roster = Roster::new(Player::new(&config, &EntityProfile::default()), &config);
        let colliders = roster.colliders(|_| true);
        assert_eq!(colliders.len(), 1);
        assert_eq!(colliders[0].id, EntityId::Player);
    }
}
