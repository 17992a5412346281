//! Gameplay events raised by contact handlers.
//!
//! Events are the resolver's submissions to the game's event bus: a gate
//! started opening, an item was collected, a body hit a death zone. They are
//! plain serializable records so the bus (or a test) can log or replay them.

use rebound_body::entity::EntityId;
use serde::{Deserialize, Serialize};

/// A gameplay event with the entities involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Event type, e.g. `"gate_triggered"`.
    pub event_type: String,
    /// Human-readable description.
    pub description: String,
    /// Entities involved, the acting entity first.
    pub involved_entities: Vec<EntityId>,
    /// Resolver tick during which the event occurred.
    pub tick: u64,
}

impl ContactEvent {
    /// A gate was triggered by the player.
    pub fn gate_triggered(gate: EntityId, player: EntityId, tick: u64) -> Self {
        Self {
            event_type: "gate_triggered".to_owned(),
            description: format!("Gate {gate} triggered by player {player}"),
            involved_entities: vec![gate, player],
            tick,
        }
    }

    /// The player collected an item.
    pub fn item_collected(item: EntityId, player: EntityId, tick: u64) -> Self {
        Self {
            event_type: "item_collected".to_owned(),
            description: format!("Item {item} collected by player {player}"),
            involved_entities: vec![item, player],
            tick,
        }
    }

    /// A damager landed a hit.
    pub fn damage_inflicted(damager: EntityId, target: EntityId, tick: u64) -> Self {
        Self {
            event_type: "damage_inflicted".to_owned(),
            description: format!("Entity {damager} damaged entity {target}"),
            involved_entities: vec![damager, target],
            tick,
        }
    }

    /// A damageable touched a death zone.
    pub fn lethal_contact(zone: EntityId, victim: EntityId, tick: u64) -> Self {
        Self {
            event_type: "lethal_contact".to_owned(),
            description: format!("Entity {victim} touched death zone {zone}"),
            involved_entities: vec![zone, victim],
            tick,
        }
    }
}
