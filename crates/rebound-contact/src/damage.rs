//! The damage handshake.
//!
//! Either side may veto. Amounts are the damageable's business; the resolver
//! only sequences the calls:
//!
//! 1. `damageable.can_be_damaged_by(damager)`
//! 2. `damager.can_damage(damageable)` (skipped if 1 vetoed)
//! 3. `damageable.take_damage_from(damager)`
//! 4. `damager.on_damage_inflicted_to(damageable)`
//!
//! Steps 3 and 4 both run once the two predicates pass. The `bool` returned
//! by step 3 only decides whether the outcome is [`DamageOutcome::Applied`]
//! or [`DamageOutcome::Absorbed`].
//!
//! The handshake runs on BEGIN and on every CONTINUE, so a damager held
//! against a target keeps hitting it until the target's own invincibility
//! window vetoes.

use crate::capability::{Damageable, Damager};

/// How a handshake ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageOutcome {
    /// Damage was taken and the damager was notified.
    Applied,
    /// Both sides agreed and the damager was notified, but the damageable
    /// reported that nothing landed.
    Absorbed,
    /// One side refused; no damage hook ran.
    Vetoed,
}

/// Run the handshake between `damager` and `damageable`.
pub fn negotiate_damage(
    damager: &mut dyn Damager,
    damageable: &mut dyn Damageable,
) -> anyhow::Result<DamageOutcome> {
    if !damageable.can_be_damaged_by(damager) || !damager.can_damage(damageable) {
        return Ok(DamageOutcome::Vetoed);
    }
    let landed = damageable.take_damage_from(damager)?;
    damager.on_damage_inflicted_to(damageable)?;
    Ok(if landed {
        DamageOutcome::Applied
    } else {
        DamageOutcome::Absorbed
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
