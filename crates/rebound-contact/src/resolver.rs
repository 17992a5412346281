//! The contact resolver.
//!
//! [`Resolver::resolve`] consumes one tick's contacts in the order given and,
//! for each:
//!
//! 1. Drops self-contacts (both fixtures on one entity) and contacts naming a
//!    despawned entity or a missing fixture. [`Scene::despawn`] has already
//!    released the senses pointing at the entity; an END for such a pair
//!    still settles the surviving feet (self friction, air task).
//! 2. Tracks the pair's lifecycle. A CONTINUE for a pair that never began is
//!    repaired into a BEGIN; an END for an unknown pair still runs, since
//!    releasing a sense nobody asserted is a no-op.
//! 3. Skips BEGIN and CONTINUE when either fixture is inactive. END always
//!    runs so a fixture switched off mid-contact cannot leave a sense stuck.
//! 4. Classifies the pair against the [`RuleTable`] and runs the matching
//!    handler. Unmatched pairs are no-ops.
//!
//! A handler failure (missing fixture property, missing capability, a hook
//! returning `Err`) is logged and counted; the remaining contacts of the tick
//! still resolve.

use std::collections::HashSet;

use rebound_body::entity::EntityId;
use rebound_body::fixture::{ContactPhase, FixtureHandle, FixtureType};
use rebound_body::sense::BodySense;
use serde::{Deserialize, Serialize};

use crate::capability::AirTask;
use crate::config::ResolverConfig;
use crate::contact::{Contact, PairKey};
use crate::effects::ContactEffects;
use crate::handlers::{Dispatch, Side};
use crate::rules::{RolePattern, RuleTable};
use crate::scene::Scene;

// ---------------------------------------------------------------------------
// ResolveReport
// ---------------------------------------------------------------------------

/// A contact that matched a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The pair.
    pub pair: PairKey,
    /// The rule that matched.
    pub pattern: RolePattern,
    /// Phase the handler ran with (after lifecycle repair).
    pub phase: ContactPhase,
}

/// What happened during one call to [`Resolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    /// Contacts examined.
    pub processed: usize,
    /// Contacts dropped because both fixtures share an entity.
    pub skipped_self: usize,
    /// BEGIN/CONTINUE contacts dropped because a fixture was inactive.
    pub skipped_inactive: usize,
    /// Contacts dropped because an entity or fixture no longer exists.
    pub skipped_missing: usize,
    /// CONTINUE contacts treated as BEGIN.
    pub repaired: usize,
    /// Contacts no enabled rule matched.
    pub unmatched: usize,
    /// Handlers that returned an error.
    pub failures: usize,
    /// Every matched contact, in resolution order.
    pub matches: Vec<MatchRecord>,
}

impl ResolveReport {
    /// Patterns that matched, in resolution order.
    pub fn patterns(&self) -> impl Iterator<Item = RolePattern> + '_ {
        self.matches.iter().map(|m| m.pattern)
    }

    /// Whether `pattern` matched at least once.
    pub fn matched(&self, pattern: RolePattern) -> bool {
        self.patterns().any(|p| p == pattern)
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ResolveReport) {
        self.processed += other.processed;
        self.skipped_self += other.skipped_self;
        self.skipped_inactive += other.skipped_inactive;
        self.skipped_missing += other.skipped_missing;
        self.repaired += other.repaired;
        self.unmatched += other.unmatched;
        self.failures += other.failures;
        self.matches.extend(other.matches);
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Classifies contacts and runs their handlers.
#[derive(Debug, Clone)]
pub struct Resolver {
    table: RuleTable,
    config: ResolverConfig,
    active: HashSet<PairKey>,
    tick: u64,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    /// A resolver using the standard rule table.
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_table(RuleTable::standard(), config)
    }

    /// A resolver using a custom rule table.
    pub fn with_table(table: RuleTable, config: ResolverConfig) -> Self {
        Self {
            table,
            config,
            active: HashSet::new(),
            tick: 0,
        }
    }

    /// The rule table.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Handler tunables.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Number of completed `resolve` calls.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether the pair has begun and not yet ended.
    pub fn is_active(&self, pair: PairKey) -> bool {
        self.active.contains(&pair)
    }

    /// Number of pairs that have begun and not yet ended.
    pub fn active_pairs(&self) -> usize {
        self.active.len()
    }

    /// Forget every active pair involving `entity`.
    pub fn forget_entity(&mut self, entity: EntityId) {
        self.active
            .retain(|k| k.low.entity != entity && k.high.entity != entity);
    }

    /// Resolve one tick's contacts against `scene`.
    pub fn resolve(
        &mut self,
        scene: &mut Scene,
        contacts: &[Contact],
        dt: f64,
        effects: &mut dyn ContactEffects,
    ) -> ResolveReport {
        let mut report = ResolveReport::default();

        for contact in contacts {
            report.processed += 1;
            let pair = contact.pair_key();

            if contact.is_self_contact() {
                tracing::debug!(%pair, "self-contact ignored");
                report.skipped_self += 1;
                continue;
            }

            let kinds = scene
                .fixture(contact.a)
                .zip(scene.fixture(contact.b))
                .map(|(fa, fb)| ((fa.kind(), fa.active), (fb.kind(), fb.active)));
            let Some(((kind_a, active_a), (kind_b, active_b))) = kinds else {
                tracing::debug!(%pair, phase = ?contact.phase, "contact names a missing entity or fixture");
                self.active.remove(&pair);
                if contact.phase == ContactPhase::End {
                    self.settle_survivor(scene, contact.a);
                    self.settle_survivor(scene, contact.b);
                }
                report.skipped_missing += 1;
                continue;
            };

            let phase = match contact.phase {
                ContactPhase::Begin => {
                    self.active.insert(pair);
                    ContactPhase::Begin
                }
                ContactPhase::Continue => {
                    if self.active.insert(pair) && self.config.repair_lifecycle {
                        tracing::warn!(%pair, "CONTINUE without BEGIN, treating as BEGIN");
                        report.repaired += 1;
                        ContactPhase::Begin
                    } else {
                        ContactPhase::Continue
                    }
                }
                ContactPhase::End => {
                    if !self.active.remove(&pair) {
                        tracing::debug!(%pair, "END for a pair that never began");
                    }
                    ContactPhase::End
                }
            };

            if phase != ContactPhase::End && !(active_a && active_b) {
                tracing::debug!(%pair, "inactive fixture, contact skipped");
                report.skipped_inactive += 1;
                continue;
            }

            let Some(class) = self.table.classify(kind_a, kind_b, phase) else {
                report.unmatched += 1;
                continue;
            };
            report.matches.push(MatchRecord {
                pair,
                pattern: class.pattern,
                phase,
            });

            let (first, second) = if class.swapped {
                (contact.b, contact.a)
            } else {
                (contact.a, contact.b)
            };
            let Some((first_record, second_record)) = scene.pair_mut(first.entity, second.entity)
            else {
                report.skipped_missing += 1;
                continue;
            };

            let mut dispatch = Dispatch {
                first: Side {
                    handle: first,
                    record: first_record,
                },
                second: Side {
                    handle: second,
                    record: second_record,
                },
                phase,
                dt,
                tick: self.tick,
                config: &self.config,
                effects: &mut *effects,
            };
            if let Err(error) = dispatch.run(class.pattern) {
                tracing::error!(%pair, pattern = %class.pattern, phase = ?phase, %error, "contact handler failed");
                report.failures += 1;
            }
        }

        self.tick += 1;
        report
    }

    /// Feet whose ground vanished with its entity: restore self friction and
    /// pick the air task the way an ordinary END would.
    fn settle_survivor(&self, scene: &mut Scene, handle: FixtureHandle) {
        let Some(record) = scene.record_mut(handle.entity) else {
            return;
        };
        let is_feet = record
            .body
            .fixtures()
            .get(handle.index)
            .is_some_and(|f| f.kind() == FixtureType::Feet);
        if !is_feet {
            return;
        }
        let body = &mut record.body;
        if !body.is_sensing(BodySense::FeetOnIce) {
            body.friction_on_self.x = self.config.default_self_friction;
        }
        if body.is_sensing(BodySense::FeetOnGround) {
            return;
        }
        let task = if body.is_sensing(BodySense::InWater) {
            AirTask::Swim
        } else {
            AirTask::AirDash
        };
        if let Some(player) = record.entity.as_player() {
            player.set_air_task(task);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
