use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, TriggerKind, VehicleKind};

/// Notifications for the host, drained once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An event was started by a trigger and should be handed to the interpreter.
    EventStarted { event: u32, trigger: TriggerKind },
    /// The entity came into view; create its visual.
    Spawned(EntityId),
    /// The entity left view; tear down its visual.
    Despawned(EntityId),
    /// A step finished. `bush` says whether the resting cell is a bush.
    MoveFinished { entity: EntityId, bush: bool },
    VehicleBoarded(VehicleKind),
    VehicleLeft(VehicleKind),
}
