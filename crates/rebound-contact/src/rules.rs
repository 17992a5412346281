//! The ordered role-pattern table.
//!
//! A contact is classified by the [`FixtureType`]s of its two fixtures. The
//! table is scanned top to bottom and the first rule that is enabled for the
//! contact's phase and matches the pair (in either orientation) wins. Several
//! pairs match more than one rule; CONSUMER, for instance, shadows every
//! other pattern. The order of [`RuleTable::standard`] is therefore part of
//! the gameplay contract and is tested as such.
//!
//! | # | Pattern | Phases |
//! |---|---|---|
//! | 1 | CONSUMER × any | B C E |
//! | 2 | DAMAGER × DAMAGEABLE | B C |
//! | 3 | DEATH × DAMAGEABLE | B C |
//! | 4 | BLOCK × SIDE | B C E |
//! | 5 | SIDE, FEET, HEAD × GATE | B |
//! | 6 | SIDE × ICE | B C E |
//! | 7 | FEET × BLOCK | B C E |
//! | 8 | FEET × ICE | B C E |
//! | 9 | BOUNCER × FEET, HEAD, SIDE | B |
//! | 10 | HEAD × BLOCK | B C E |
//! | 11 | WATER_LISTENER × WATER | B C E |
//! | 12 | HEAD, FEET × LADDER | B C E |
//! | 13 | BODY × FORCE | B C |
//! | 14 | BODY × GRAVITY_CHANGE | B C |
//! | 15 | PROJECTILE × BLOCK, BODY, SHIELD, WATER | B |
//! | 16 | PLAYER × ITEM | B |
//! | 17 | LASER × BLOCK | C |

use std::fmt;
use std::ops::BitOr;

use rebound_body::fixture::{ContactPhase, FixtureType};
use serde::{Deserialize, Serialize};

use rebound_body::fixture::FixtureType as F;

// ---------------------------------------------------------------------------
// RolePattern
// ---------------------------------------------------------------------------

/// A named classification of a contact. Selects the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolePattern {
    /// A CONSUMER fixture receives every phase of every contact.
    Consumer,
    /// Damage handshake.
    DamagerDamageable,
    /// Instant death.
    DeathDamageable,
    /// Side sensor against a wall.
    BlockSide,
    /// Sensor walking into a gate.
    SensorGate,
    /// Side sensor against an icy wall.
    SideIce,
    /// Standing on ground; carries riders of moving platforms.
    FeetBlock,
    /// Standing on ice.
    FeetIce,
    /// Bounce pad.
    Bouncer,
    /// Bumping into a ceiling.
    HeadBlock,
    /// Entering and leaving water.
    WaterListenerWater,
    /// Touching a ladder.
    Ladder,
    /// Force field.
    BodyForce,
    /// Gravity-direction zone.
    BodyGravityChange,
    /// Projectile impact.
    ProjectileHit,
    /// Item pickup.
    PlayerItem,
    /// Laser beam crossing terrain.
    LaserBlock,
}

impl fmt::Display for RolePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// PhaseMask
// ---------------------------------------------------------------------------

/// Set of lifecycle phases a rule is enabled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseMask(u8);

impl PhaseMask {
    /// BEGIN only.
    pub const BEGIN: PhaseMask = PhaseMask(0b001);
    /// CONTINUE only.
    pub const CONTINUE: PhaseMask = PhaseMask(0b010);
    /// END only.
    pub const END: PhaseMask = PhaseMask(0b100);
    /// BEGIN and CONTINUE.
    pub const ACTIVE: PhaseMask = PhaseMask(0b011);
    /// Every phase.
    pub const ALL: PhaseMask = PhaseMask(0b111);

    /// Mask containing a single phase.
    pub const fn of(phase: ContactPhase) -> PhaseMask {
        match phase {
            ContactPhase::Begin => Self::BEGIN,
            ContactPhase::Continue => Self::CONTINUE,
            ContactPhase::End => Self::END,
        }
    }

    /// Whether `phase` is in the mask.
    pub const fn contains(self, phase: ContactPhase) -> bool {
        self.0 & Self::of(phase).0 != 0
    }
}

impl BitOr for PhaseMask {
    type Output = PhaseMask;

    fn bitor(self, rhs: PhaseMask) -> PhaseMask {
        PhaseMask(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// RoleRule
// ---------------------------------------------------------------------------

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRule {
    /// Handler selected by this rule.
    pub pattern: RolePattern,
    /// Types accepted in the first role.
    pub first: &'static [FixtureType],
    /// Types accepted in the second role. `None` accepts any type.
    pub second: Option<&'static [FixtureType]>,
    /// Phases the rule is enabled for.
    pub phases: PhaseMask,
}

impl RoleRule {
    /// Whether `(first, second)` fills the rule's roles in that order.
    pub fn fits(&self, first: FixtureType, second: FixtureType) -> bool {
        self.first.contains(&first) && self.second.map_or(true, |s| s.contains(&second))
    }
}

/// A matched rule and which fixture of the contact plays the first role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Handler to run.
    pub pattern: RolePattern,
    /// `true` when the contact's `b` fixture plays the first role.
    pub swapped: bool,
}

// ---------------------------------------------------------------------------
// RuleTable
// ---------------------------------------------------------------------------

/// Ordered list of rules; first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<RoleRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

const fn rule(
    pattern: RolePattern,
    first: &'static [FixtureType],
    second: &'static [FixtureType],
    phases: PhaseMask,
) -> RoleRule {
    RoleRule {
        pattern,
        first,
        second: Some(second),
        phases,
    }
}

impl RuleTable {
    /// The platformer's rule set, in precedence order.
    pub fn standard() -> Self {
        use RolePattern as P;
        let rules = vec![
            RoleRule {
                pattern: P::Consumer,
                first: &[F::Consumer],
                second: None,
                phases: PhaseMask::ALL,
            },
            rule(P::DamagerDamageable, &[F::Damager], &[F::Damageable], PhaseMask::ACTIVE),
            rule(P::DeathDamageable, &[F::Death], &[F::Damageable], PhaseMask::ACTIVE),
            rule(P::BlockSide, &[F::Block], &[F::Side], PhaseMask::ALL),
            rule(P::SensorGate, &[F::Side, F::Feet, F::Head], &[F::Gate], PhaseMask::BEGIN),
            rule(P::SideIce, &[F::Side], &[F::Ice], PhaseMask::ALL),
            rule(P::FeetBlock, &[F::Feet], &[F::Block], PhaseMask::ALL),
            rule(P::FeetIce, &[F::Feet], &[F::Ice], PhaseMask::ALL),
            rule(P::Bouncer, &[F::Bouncer], &[F::Feet, F::Head, F::Side], PhaseMask::BEGIN),
            rule(P::HeadBlock, &[F::Head], &[F::Block], PhaseMask::ALL),
            rule(P::WaterListenerWater, &[F::WaterListener], &[F::Water], PhaseMask::ALL),
            rule(P::Ladder, &[F::Head, F::Feet], &[F::Ladder], PhaseMask::ALL),
            rule(P::BodyForce, &[F::Body], &[F::Force], PhaseMask::ACTIVE),
            rule(P::BodyGravityChange, &[F::Body], &[F::GravityChange], PhaseMask::ACTIVE),
            rule(
                P::ProjectileHit,
                &[F::Projectile],
                &[F::Block, F::Body, F::Shield, F::Water],
                PhaseMask::BEGIN,
            ),
            rule(P::PlayerItem, &[F::Player], &[F::Item], PhaseMask::BEGIN),
            rule(P::LaserBlock, &[F::Laser], &[F::Block], PhaseMask::CONTINUE),
        ];
        Self { rules }
    }

    /// A custom table. Rules are tried in the given order.
    pub fn from_rules(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    /// The rules, in precedence order.
    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    /// Classify a contact between fixtures of types `a` and `b` in `phase`.
    ///
    /// Returns `None` for pairs no enabled rule matches; those are no-ops.
    pub fn classify(
        &self,
        a: FixtureType,
        b: FixtureType,
        phase: ContactPhase,
    ) -> Option<Classification> {
        self.rules
            .iter()
            .filter(|r| r.phases.contains(phase))
            .find_map(|r| {
                if r.fits(a, b) {
                    Some(Classification {
                        pattern: r.pattern,
                        swapped: false,
                    })
                } else if r.fits(b, a) {
                    Some(Classification {
                        pattern: r.pattern,
                        swapped: true,
                    })
                } else {
                    None
                }
            })
    }

    /// Whether some rule matches the pair in some phase. Detectors use this
    /// to skip pairs that can never do anything.
    pub fn can_match(&self, a: FixtureType, b: FixtureType) -> bool {
        self.rules.iter().any(|r| r.fits(a, b) || r.fits(b, a))
    }

    /// Precedence rank of a pattern (0 is highest).
    pub fn position(&self, pattern: RolePattern) -> Option<usize> {
        self.rules.iter().position(|r| r.pattern == pattern)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const B: ContactPhase = ContactPhase::Begin;
    const C: ContactPhase = ContactPhase::Continue;
    const E: ContactPhase = ContactPhase::End;

    fn pattern(a: FixtureType, b: FixtureType, phase: ContactPhase) -> Option<RolePattern> {
        RuleTable::standard()
            .classify(a, b, phase)
            .map(|c| c.pattern)
    }

    #[test]
    fn standard_order_is_fixed() {
        use RolePattern as P;
        let order: Vec<RolePattern> = RuleTable::standard()
            .rules()
            .iter()
            .map(|r| r.pattern)
            .collect();
        assert_eq!(
            order,
            vec![
                P::Consumer,
                P::DamagerDamageable,
                P::DeathDamageable,
                P::BlockSide,
                P::SensorGate,
                P::SideIce,
                P::FeetBlock,
                P::FeetIce,
                P::Bouncer,
                P::HeadBlock,
                P::WaterListenerWater,
                P::Ladder,
                P::BodyForce,
                P::BodyGravityChange,
                P::ProjectileHit,
                P::PlayerItem,
                P::LaserBlock,
            ]
        );
    }

    #[test]
    fn consumer_shadows_everything() {
        for other in FixtureType::ALL {
            for phase in [B, C, E] {
                assert_eq!(pattern(F::Consumer, other, phase), Some(RolePattern::Consumer));
                assert_eq!(pattern(other, F::Consumer, phase), Some(RolePattern::Consumer));
            }
        }
    }

    #[test]
    fn orientation_is_reported() {
        let table = RuleTable::standard();
        let straight = table.classify(F::Feet, F::Block, B).unwrap();
        let swapped = table.classify(F::Block, F::Feet, B).unwrap();
        assert_eq!(straight.pattern, RolePattern::FeetBlock);
        assert!(!straight.swapped);
        assert_eq!(swapped.pattern, RolePattern::FeetBlock);
        assert!(swapped.swapped);
    }

    #[test]
    fn phase_coverage() {
        assert_eq!(pattern(F::Damager, F::Damageable, E), None);
        assert_eq!(pattern(F::Death, F::Damageable, C), Some(RolePattern::DeathDamageable));
        assert_eq!(pattern(F::Feet, F::Gate, C), None);
        assert_eq!(pattern(F::Bouncer, F::Head, B), Some(RolePattern::Bouncer));
        assert_eq!(pattern(F::Bouncer, F::Head, C), None);
        assert_eq!(pattern(F::Body, F::GravityChange, E), None);
        assert_eq!(pattern(F::Projectile, F::Water, B), Some(RolePattern::ProjectileHit));
        assert_eq!(pattern(F::Projectile, F::Water, E), None);
        assert_eq!(pattern(F::Player, F::Item, C), None);
    }

    #[test]
    fn laser_is_continue_only() {
        assert_eq!(pattern(F::Laser, F::Block, B), None);
        assert_eq!(pattern(F::Laser, F::Block, C), Some(RolePattern::LaserBlock));
        assert_eq!(pattern(F::Block, F::Laser, E), None);
    }

    #[test]
    fn unmatched_pairs_classify_to_none() {
        assert_eq!(pattern(F::Teleporter, F::Block, B), None);
        assert_eq!(pattern(F::Feet, F::Head, C), None);
        assert!(!RuleTable::standard().can_match(F::Teleporter, F::Water));
        assert!(RuleTable::standard().can_match(F::Block, F::Laser));
    }

    #[test]
    fn side_against_block_prefers_block_side() {
        let table = RuleTable::standard();
        assert!(
            table.position(RolePattern::BlockSide).unwrap()
                < table.position(RolePattern::SensorGate).unwrap()
        );
        assert_eq!(pattern(F::Side, F::Block, B), Some(RolePattern::BlockSide));
    }

    #[test]
    fn phase_mask_operations() {
        let mask = PhaseMask::BEGIN | PhaseMask::END;
        assert!(mask.contains(B));
        assert!(!mask.contains(C));
        assert!(mask.contains(E));
        assert_eq!(PhaseMask::BEGIN | PhaseMask::CONTINUE, PhaseMask::ACTIVE);
    }

    #[test]
    fn custom_tables_respect_their_own_order() {
        let table = RuleTable::from_rules(vec![
            rule(RolePattern::HeadBlock, &[F::Head], &[F::Block], PhaseMask::ALL),
            rule(RolePattern::FeetBlock, &[F::Head], &[F::Block], PhaseMask::ALL),
        ]);
        assert_eq!(
            table.classify(F::Block, F::Head, C).map(|c| c.pattern),
            Some(RolePattern::HeadBlock)
        );
    }
}
