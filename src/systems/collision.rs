//! Finds the characters whose boxes overlap a candidate box.

use smallvec::SmallVec;

use crate::entity::bounds::PixelRect;
use crate::entity::{EntityId, Priority, TriggerKind, TriggerSet};
use crate::map::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Character,
    Vehicle,
}

/// A character's box as seen by everyone else during one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: EntityId,
    pub rect: PixelRect,
    /// Whether it stops movement; triggers ignore this.
    pub blocks: bool,
    pub priority: Priority,
    pub trigger: Option<TriggerKind>,
    pub kind: ColliderKind,
}

/// Who is asking, and what they must not collide with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionQuery {
    pub mover: EntityId,
    pub ignored: Option<EntityId>,
    pub mover_kind: ColliderKind,
}

impl CollisionQuery {
    pub fn new(mover: EntityId) -> Self {
        Self {
            mover,
            ignored: None,
            mover_kind: ColliderKind::Character,
        }
    }

    fn excludes(&self, collider: &Collider) -> bool {
        collider.id == self.mover
            || Some(collider.id) == self.ignored
            || (self.mover_kind == ColliderKind::Vehicle && collider.kind == ColliderKind::Vehicle)
    }
}

/// A consistent snapshot of every collider on the map.
///
/// Seam images on looping maps are checked so boxes on either side of the seam meet.
#[derive(Debug, Clone)]
pub struct CollisionBroker {
    grid: Grid,
    colliders: Vec<Collider>,
}

impl CollisionBroker {
    pub fn new(grid: Grid, colliders: Vec<Collider>) -> Self {
        Self { grid, colliders }
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    fn overlaps(&self, collider: &Collider, rect: &PixelRect) -> bool {
        self.grid
            .loop_images()
            .into_iter()
            .any(|offset| collider.rect.intersects(&rect.translate(offset)))
    }

    /// Every blocking character overlapping `rect`.
    pub fn blocking(&self, rect: &PixelRect, query: &CollisionQuery) -> SmallVec<[EntityId; 4]> {
        self.colliders
            .iter()
            .filter(|c| c.blocks && !query.excludes(c))
            .filter(|c| self.overlaps(c, rect))
            .map(|c| c.id)
            .collect()
    }

    /// Every character overlapping `rect`, blocking or not.
    pub fn overlapping(&self, rect: &PixelRect, query: &CollisionQuery) -> SmallVec<[EntityId; 4]> {
        self.colliders
            .iter()
            .filter(|c| !query.excludes(c))
            .filter(|c| self.overlaps(c, rect))
            .map(|c| c.id)
            .collect()
    }

    pub fn collides(&self, rect: &PixelRect, query: &CollisionQuery) -> bool {
        self.colliders
            .iter()
            .any(|c| c.blocks && !query.excludes(c) && self.overlaps(c, rect))
    }

    /// Events overlapping `rect` that start on one of `triggers`, filtered by whether they
    /// share the characters' priority.
    pub fn triggered(&self, rect: &PixelRect, triggers: TriggerSet, normal: bool) -> SmallVec<[(u32, TriggerKind); 4]> {
        self.colliders
            .iter()
            .filter(|c| c.priority.is_normal() == normal)
            .filter_map(|c| match (c.id, c.trigger) {
                (EntityId::Event(id), Some(trigger)) if triggers.matches(trigger) => Some((c, id, trigger)),
                _ => None,
            })
            .filter(|(c, _, _)| self.overlaps(c, rect))
            .map(|(_, id, trigger)| (id, trigger))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::VehicleKind;
    use glam::Vec2;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> PixelRect {
        PixelRect::new(Vec2::new(x, y), Vec2::new(x + w, y + h))
    }

    fn collider(id: EntityId, r: PixelRect, kind: ColliderKind) -> Collider {
        Collider {
            id,
            rect: r,
            blocks: true,
            priority: Priority::Same,
            trigger: None,
            kind,
        }
    }

    #[test]
    fn test_excludes_self_and_non_blocking() {
        let mut ghost = collider(EntityId::Event(2), rect(0.0, 0.0, 32.0, 32.0), ColliderKind::Character);
        ghost.blocks = false;
        let broker = CollisionBroker::new(
            Grid::new(10, 10, false, false),
            vec![
                collider(EntityId::Event(1), rect(0.0, 0.0, 32.0, 32.0), ColliderKind::Character),
                ghost,
            ],
        );
        let query_rect = rect(10.0, 10.0, 4.0, 4.0);
        assert_eq!(broker.blocking(&query_rect, &CollisionQuery::new(EntityId::Player)).as_slice(), &[EntityId::Event(1)]);
        assert!(!broker.collides(&query_rect, &CollisionQuery::new(EntityId::Event(1))));
        assert_eq!(broker.overlapping(&query_rect, &CollisionQuery::new(EntityId::Player)).len(), 2);
    }

    #[test]
    fn test_vehicles_pass_vehicles() {
        let boat = EntityId::Vehicle(VehicleKind::Boat);
        let broker = CollisionBroker::new(
            Grid::new(10, 10, false, false),
            vec![collider(boat, rect(0.0, 0.0, 32.0, 32.0), ColliderKind::Vehicle)],
        );
        let query_rect = rect(0.0, 0.0, 32.0, 32.0);
        assert!(broker.collides(&query_rect, &CollisionQuery::new(EntityId::Player)));
        let ship = CollisionQuery {
            mover: EntityId::Vehicle(VehicleKind::Ship),
            ignored: None,
            mover_kind: ColliderKind::Vehicle,
        };
        assert!(!broker.collides(&query_rect, &ship));
        let rider = CollisionQuery {
            ignored: Some(boat),
            ..CollisionQuery::new(EntityId::Player)
        };
        assert!(!broker.collides(&query_rect, &rider));
    }

    #[test]
    fn test_seam_images_collide() {
        let broker = CollisionBroker::new(
            Grid::new(10, 10, true, false),
            vec![collider(EntityId::Event(1), rect(0.0, 0.0, 8.0, 8.0), ColliderKind::Character)],
        );
        let across_seam = rect(316.0, 0.0, 8.0, 8.0);
        assert!(broker.collides(&across_seam, &CollisionQuery::new(EntityId::Player)));
    }
}
