//! Entity capabilities the resolver talks to.
//!
//! Behavior code (players, enemies, gates, items) lives outside this crate.
//! Each entity implements [`GameEntity`] and opts into the capabilities it
//! supports by overriding the matching `as_*` query. The resolver asks for a
//! capability only when a contact needs it, so an entity that never carries a
//! DAMAGEABLE fixture never has to implement [`Damageable`].
//!
//! Hooks that act (rather than answer a yes/no question) return
//! [`anyhow::Result`]. A failing hook is logged and the tick carries on.

use rebound_body::entity::EntityId;
use rebound_body::fixture::{Direction, Fixture};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameEntity
// ---------------------------------------------------------------------------

/// An entity in the contact scene, queried for capabilities on demand.
pub trait GameEntity {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "entity"
    }

    /// Damage dealer, for DAMAGER fixtures.
    fn as_damager(&mut self) -> Option<&mut dyn Damager> {
        None
    }

    /// Damage receiver, for DAMAGEABLE fixtures.
    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        None
    }

    /// Health pool, drained by DEATH fixtures.
    fn as_health(&mut self) -> Option<&mut dyn Health> {
        None
    }

    /// Projectile hooks, for PROJECTILE fixtures.
    fn as_projectile(&mut self) -> Option<&mut dyn Projectile> {
        None
    }

    /// Gate controls, for GATE fixtures.
    fn as_gate(&mut self) -> Option<&mut dyn Gate> {
        None
    }

    /// Gravity orientation, changed by GRAVITY_CHANGE fixtures.
    fn as_rotatable(&mut self) -> Option<&mut dyn DirectionRotatable> {
        None
    }

    /// Player-only controls. Returning `Some` marks the entity as the player.
    fn as_player(&mut self) -> Option<&mut dyn PlayerControl> {
        None
    }

    /// Collectible, for ITEM fixtures.
    fn as_item(&mut self) -> Option<&mut dyn Item> {
        None
    }
}

/// An entity with no capabilities. Blocks, ladders and water are usually this.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl GameEntity for Inert {
    fn name(&self) -> &str {
        "inert"
    }
}

// ---------------------------------------------------------------------------
// Damage
// ---------------------------------------------------------------------------

/// Deals damage. Either side of the handshake may veto.
pub trait Damager {
    /// Category used by damageables to look up damage amounts.
    fn damage_class(&self) -> &str {
        "generic"
    }

    /// Whether this damager may hurt `target` right now (e.g. not on cooldown).
    fn can_damage(&mut self, target: &dyn Damageable) -> bool;

    /// Called after `target` accepted damage from this damager.
    fn on_damage_inflicted_to(&mut self, _target: &dyn Damageable) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Receives damage. Computes amounts itself; the resolver only orchestrates.
pub trait Damageable {
    /// Whether `damager` may hurt this entity right now (e.g. not invincible).
    fn can_be_damaged_by(&mut self, damager: &dyn Damager) -> bool;

    /// Apply damage. `Ok(false)` means the damage was absorbed; the damager
    /// is still notified, but no damage event is emitted.
    fn take_damage_from(&mut self, damager: &dyn Damager) -> anyhow::Result<bool>;
}

/// A health pool with a floor.
pub trait Health {
    /// Current health.
    fn health(&self) -> i32;

    /// The floor health can be depleted to.
    fn min_health(&self) -> i32 {
        0
    }

    /// Overwrite current health.
    fn set_health(&mut self, value: i32);

    /// Drop health to its floor.
    fn deplete(&mut self) {
        let floor = self.min_health();
        self.set_health(floor);
    }
}

// ---------------------------------------------------------------------------
// Projectiles, gates, items
// ---------------------------------------------------------------------------

/// Hooks invoked when a projectile hits something.
pub trait Projectile {
    /// Hit solid terrain.
    fn hit_block(&mut self, _block: &Fixture) -> anyhow::Result<()> {
        Ok(())
    }

    /// Hit another entity's body.
    fn hit_body(&mut self, _body: &Fixture) -> anyhow::Result<()> {
        Ok(())
    }

    /// Hit a shield.
    fn hit_shield(&mut self, _shield: &Fixture) -> anyhow::Result<()> {
        Ok(())
    }

    /// Entered water.
    fn hit_water(&mut self, _water: &Fixture) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A gate the player opens by walking into it.
pub trait Gate {
    /// Whether the gate can be triggered right now (closed and unlocked).
    fn is_openable(&self) -> bool;

    /// Start opening.
    fn trigger(&mut self) -> anyhow::Result<()>;
}

/// A collectible.
pub trait Item {
    /// The player touched the item.
    fn collect(&mut self, collector: EntityId) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Orientation and player state
// ---------------------------------------------------------------------------

/// An entity whose "up" can be rotated by gravity zones.
pub trait DirectionRotatable {
    /// Current orientation.
    fn direction_rotation(&self) -> Direction;

    /// Change orientation.
    fn set_direction_rotation(&mut self, direction: Direction);
}

/// What the player's jump button does next while airborne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AirTask {
    /// Grounded: the button jumps.
    #[default]
    Jump,
    /// Submerged: the button swims upward.
    Swim,
    /// Airborne: the button air-dashes.
    AirDash,
}

/// Player-only state the resolver updates.
pub trait PlayerControl {
    /// Current jump-button task.
    fn air_task(&self) -> AirTask;

    /// Change the jump-button task.
    fn set_air_task(&mut self, task: AirTask);

    /// Whether the player is sliding down a wall.
    fn is_wall_sliding(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
