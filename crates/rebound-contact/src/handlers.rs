//! Per-pattern contact handlers.
//!
//! The resolver classifies a contact, orients its two records as
//! (first role, second role) and hands them to [`Dispatch::run`]. Each
//! handler assumes the orientation of its rule in
//! [`RuleTable::standard`](crate::rules::RuleTable::standard): for
//! `FeetBlock`, `first` owns the FEET fixture and `second` the BLOCK.

use rebound_body::alteration::{alter, AffectedFixture, VelocityAlteration};
use rebound_body::body::{Body, BodyLabel};
use rebound_body::entity::EntityId;
use rebound_body::fixture::{ContactPhase, Fixture, FixtureHandle, FixtureType, SideTag};
use rebound_body::geometry::Vec2;
use rebound_body::sense::{BodySense, SenseKey};

use crate::capability::AirTask;
use crate::config::ResolverConfig;
use crate::damage::{negotiate_damage, DamageOutcome};
use crate::effects::{ContactEffects, DecorationRequest, SoundRequest};
use crate::events::ContactEvent;
use crate::gravity;
use crate::rules::RolePattern;
use crate::scene::EntityRecord;
use crate::ContactError;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One participant of a contact: the fixture handle and its owner's record.
pub(crate) struct Side<'a> {
    pub handle: FixtureHandle,
    pub record: &'a mut EntityRecord,
}

impl Side<'_> {
    fn id(&self) -> EntityId {
        self.handle.entity
    }

    fn fixture(&self) -> Result<&Fixture, ContactError> {
        Ok(self.record.body.fixture(self.handle.index)?)
    }

    fn fixture_mut(&mut self) -> Result<&mut Fixture, ContactError> {
        Ok(self.record.body.fixture_mut(self.handle.index)?)
    }

    fn kind(&self) -> Result<FixtureType, ContactError> {
        Ok(self.fixture()?.kind())
    }

    fn side_tag(&self) -> Result<SideTag, ContactError> {
        let fixture = self.fixture()?;
        fixture.props.side.ok_or(ContactError::MissingProperty {
            fixture: self.handle,
            kind: fixture.kind(),
            property: "side",
        })
    }

    /// Key under which this side's fixture senses `other`.
    fn sense_key(&self, other: &Side<'_>) -> SenseKey {
        SenseKey::new(self.handle, other.handle)
    }

    fn set_air_task(&mut self, task: AirTask) {
        if let Some(player) = self.record.entity.as_player() {
            player.set_air_task(task);
        }
    }
}

fn missing_capability(entity: EntityId, kind: FixtureType, capability: &'static str) -> ContactError {
    ContactError::MissingCapability {
        entity,
        kind,
        capability,
    }
}

/// Assert on BEGIN and CONTINUE, release on END.
fn track(body: &mut Body, sense: BodySense, key: SenseKey, phase: ContactPhase) {
    match phase {
        ContactPhase::Begin | ContactPhase::Continue => {
            body.senses_mut().assert_from(sense, key);
        }
        ContactPhase::End => {
            body.senses_mut().release_from(sense, key);
        }
    }
}

/// Ask `source`'s alteration callback what to do to `target`.
fn source_alteration(
    source: &mut Side<'_>,
    target: &Side<'_>,
    dt: f64,
) -> Result<VelocityAlteration, ContactError> {
    let handle = source.handle;
    let affected = AffectedFixture {
        fixture: target.fixture()?,
        body: &target.record.body,
    };
    let fixture = source.fixture_mut()?;
    let kind = fixture.kind();
    let callback = fixture
        .props
        .velocity_alteration
        .as_mut()
        .ok_or(ContactError::MissingProperty {
            fixture: handle,
            kind,
            property: "velocity_alteration",
        })?;
    Ok(callback(affected, dt))
}

fn feed_consumer(
    consumer: &mut Side<'_>,
    other: &Side<'_>,
    phase: ContactPhase,
) -> Result<(), ContactError> {
    let handle = consumer.handle;
    let other_fixture = other.fixture()?;
    let fixture = consumer.fixture_mut()?;
    let kind = fixture.kind();
    let callback = fixture
        .props
        .consumer
        .as_mut()
        .ok_or(ContactError::MissingProperty {
            fixture: handle,
            kind,
            property: "consumer",
        })?;
    callback(phase, other_fixture);
    Ok(())
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Everything a handler may touch for one contact.
pub(crate) struct Dispatch<'a> {
    pub first: Side<'a>,
    pub second: Side<'a>,
    pub phase: ContactPhase,
    pub dt: f64,
    pub tick: u64,
    pub config: &'a ResolverConfig,
    pub effects: &'a mut dyn ContactEffects,
}

impl Dispatch<'_> {
    /// Run the handler for `pattern`.
    pub fn run(&mut self, pattern: RolePattern) -> Result<(), ContactError> {
        tracing::trace!(
            %pattern,
            first = %self.first.handle,
            second = %self.second.handle,
            phase = ?self.phase,
            "dispatch"
        );
        match pattern {
            RolePattern::Consumer => self.consumer(),
            RolePattern::DamagerDamageable => self.damage(),
            RolePattern::DeathDamageable => self.death(),
            RolePattern::BlockSide => self.block_side(),
            RolePattern::SensorGate => self.sensor_gate(),
            RolePattern::SideIce => self.side_ice(),
            RolePattern::FeetBlock => self.feet_block(),
            RolePattern::FeetIce => self.feet_ice(),
            RolePattern::Bouncer => self.bouncer(),
            RolePattern::HeadBlock => self.head_block(),
            RolePattern::WaterListenerWater => self.water(),
            RolePattern::Ladder => self.ladder(),
            RolePattern::BodyForce => self.force(),
            RolePattern::BodyGravityChange => self.gravity_zone(),
            RolePattern::ProjectileHit => self.projectile(),
            RolePattern::PlayerItem => self.item(),
            RolePattern::LaserBlock => self.laser(),
        }
    }

    fn is_active_phase(&self) -> bool {
        self.phase != ContactPhase::End
    }

    // -- callbacks ----------------------------------------------------------

    fn consumer(&mut self) -> Result<(), ContactError> {
        feed_consumer(&mut self.first, &self.second, self.phase)?;
        if self.second.kind()? == FixtureType::Consumer {
            feed_consumer(&mut self.second, &self.first, self.phase)?;
        }
        Ok(())
    }

    fn damage(&mut self) -> Result<(), ContactError> {
        let (damager_id, target_id) = (self.first.id(), self.second.id());
        let damager = self
            .first
            .record
            .entity
            .as_damager()
            .ok_or_else(|| missing_capability(damager_id, FixtureType::Damager, "Damager"))?;
        let damageable = self
            .second
            .record
            .entity
            .as_damageable()
            .ok_or_else(|| missing_capability(target_id, FixtureType::Damageable, "Damageable"))?;
        let outcome = negotiate_damage(damager, damageable)
            .map_err(|e| ContactError::hook(target_id, "damage_handshake", e))?;
        tracing::trace!(damager = %damager_id, target = %target_id, ?outcome, "damage handshake");
        if outcome == DamageOutcome::Applied {
            self.effects
                .submit_event(ContactEvent::damage_inflicted(damager_id, target_id, self.tick));
        }
        Ok(())
    }

    fn death(&mut self) -> Result<(), ContactError> {
        let (zone_id, victim_id) = (self.first.id(), self.second.id());
        let health = self
            .second
            .record
            .entity
            .as_health()
            .ok_or_else(|| missing_capability(victim_id, FixtureType::Damageable, "Health"))?;
        health.deplete();
        tracing::debug!(zone = %zone_id, victim = %victim_id, "lethal contact");
        self.effects
            .submit_event(ContactEvent::lethal_contact(zone_id, victim_id, self.tick));
        Ok(())
    }

    // -- walls and gates ----------------------------------------------------

    fn block_side(&mut self) -> Result<(), ContactError> {
        if self.is_active_phase() && self.first.record.body.has_label(BodyLabel::NoSideTouchie) {
            return Ok(());
        }
        let sense = match self.second.side_tag()? {
            SideTag::Left => BodySense::SideTouchingBlockLeft,
            SideTag::Right => BodySense::SideTouchingBlockRight,
        };
        let key = self.second.sense_key(&self.first);
        track(&mut self.second.record.body, sense, key, self.phase);
        Ok(())
    }

    fn sensor_gate(&mut self) -> Result<(), ContactError> {
        if self.first.record.entity.as_player().is_none() {
            return Ok(());
        }
        let (player_id, gate_id) = (self.first.id(), self.second.id());
        let gate = self
            .second
            .record
            .entity
            .as_gate()
            .ok_or_else(|| missing_capability(gate_id, FixtureType::Gate, "Gate"))?;
        if !gate.is_openable() {
            return Ok(());
        }
        gate.trigger()
            .map_err(|e| ContactError::hook(gate_id, "trigger", e))?;
        self.effects
            .submit_event(ContactEvent::gate_triggered(gate_id, player_id, self.tick));
        Ok(())
    }

    fn side_ice(&mut self) -> Result<(), ContactError> {
        let sense = match self.first.side_tag()? {
            SideTag::Left => BodySense::SideTouchingIceLeft,
            SideTag::Right => BodySense::SideTouchingIceRight,
        };
        let key = self.first.sense_key(&self.second);
        track(&mut self.first.record.body, sense, key, self.phase);
        Ok(())
    }

    // -- feet and head ------------------------------------------------------

    fn feet_block(&mut self) -> Result<(), ContactError> {
        let key = self.first.sense_key(&self.second);
        if self.is_active_phase() {
            let platform = self.second.id();
            let carry = self.second.record.body.position_delta();
            let body = &mut self.first.record.body;
            body.senses_mut().assert_from(BodySense::FeetOnGround, key);
            if body.claim_carry(platform, self.tick) {
                body.position += carry;
            }
            self.first.set_air_task(AirTask::Jump);
        } else {
            let body = &mut self.first.record.body;
            body.senses_mut().release_from(BodySense::FeetOnGround, key);
            if !body.is_sensing(BodySense::FeetOnGround) {
                let task = if body.is_sensing(BodySense::InWater) {
                    AirTask::Swim
                } else {
                    AirTask::AirDash
                };
                self.first.set_air_task(task);
            }
        }
        Ok(())
    }

    fn feet_ice(&mut self) -> Result<(), ContactError> {
        let key = self.first.sense_key(&self.second);
        let body = &mut self.first.record.body;
        track(body, BodySense::FeetOnIce, key, self.phase);
        if body.is_sensing(BodySense::FeetOnIce) {
            body.friction_on_self.x = self.config.ice_friction;
        } else {
            body.friction_on_self.x = self.config.default_self_friction;
        }
        Ok(())
    }

    fn head_block(&mut self) -> Result<(), ContactError> {
        if self.is_active_phase() && self.second.record.body.has_label(BodyLabel::CollideDownOnly)
        {
            return Ok(());
        }
        let active = self.is_active_phase();
        let key = self.first.sense_key(&self.second);
        let body = &mut self.first.record.body;
        track(body, BodySense::HeadTouchingBlock, key, self.phase);
        if active && body.velocity.y > 0.0 {
            body.velocity.y = 0.0;
        }
        Ok(())
    }

    fn ladder(&mut self) -> Result<(), ContactError> {
        let sense = match self.first.kind()? {
            FixtureType::Head => BodySense::HeadTouchingLadder,
            _ => BodySense::FeetTouchingLadder,
        };
        let active = self.is_active_phase();
        let key = self.first.sense_key(&self.second);
        let ladder_id = self.second.id();
        let body = &mut self.first.record.body;
        track(body, sense, key, self.phase);
        if active {
            body.set_ladder(Some(ladder_id));
        } else if !body.is_sensing(BodySense::HeadTouchingLadder)
            && !body.is_sensing(BodySense::FeetTouchingLadder)
        {
            body.set_ladder(None);
        }
        Ok(())
    }

    // -- water --------------------------------------------------------------

    fn water(&mut self) -> Result<(), ContactError> {
        let active = self.is_active_phase();
        let key = self.first.sense_key(&self.second);
        let body = &mut self.first.record.body;
        let was_in_water = body.is_sensing(BodySense::InWater);
        track(body, BodySense::InWater, key, self.phase);
        let grounded = body.is_sensing(BodySense::FeetOnGround);
        let in_water = body.is_sensing(BodySense::InWater);

        if active {
            if let Some(player) = self.first.record.entity.as_player() {
                if !grounded && !player.is_wall_sliding() {
                    player.set_air_task(AirTask::Swim);
                }
            }
        } else if !in_water {
            self.first.set_air_task(if grounded {
                AirTask::Jump
            } else {
                AirTask::AirDash
            });
        }

        // Only crossing the surface splashes, not a seam between two pools.
        if self.phase != ContactPhase::Continue && was_in_water != in_water {
            self.splash()?;
        }
        Ok(())
    }

    fn splash(&mut self) -> Result<(), ContactError> {
        let surface = self
            .second
            .fixture()?
            .placed(self.second.record.body.center())
            .bounds()
            .max
            .y;
        let position = Vec2::new(self.first.record.body.center().x, surface);
        self.effects.spawn_decoration(DecorationRequest {
            kind: self.config.splash_decoration.clone(),
            position,
            owner: self.second.id(),
        });
        if let Some(sound) = &self.config.splash_sound {
            self.effects.play_sound(SoundRequest {
                sound: sound.clone(),
                looped: false,
            });
        }
        Ok(())
    }

    // -- velocity -----------------------------------------------------------

    fn bouncer(&mut self) -> Result<(), ContactError> {
        let alteration = source_alteration(&mut self.first, &self.second, self.dt)?;
        alter(&mut self.second.record.body, &alteration);
        if let Some(run) = self.first.fixture_mut()?.props.runnable.as_mut() {
            run();
        }
        Ok(())
    }

    fn force(&mut self) -> Result<(), ContactError> {
        let alteration = source_alteration(&mut self.second, &self.first, self.dt)?;
        alter(&mut self.first.record.body, &alteration);
        Ok(())
    }

    fn gravity_zone(&mut self) -> Result<(), ContactError> {
        let zone_center = self.second.record.body.center();
        let zone = self.second.fixture()?;
        let record = &mut *self.first.record;
        gravity::apply_zone(
            &record.body,
            record.entity.as_mut(),
            zone,
            self.second.handle,
            zone_center,
        )?;
        Ok(())
    }

    // -- projectiles, items, lasers -----------------------------------------

    fn projectile(&mut self) -> Result<(), ContactError> {
        if self.second.record.body.has_label(BodyLabel::NoProjectileCollision) {
            return Ok(());
        }
        let projectile_id = self.first.id();
        let other = self.second.fixture()?;
        let projectile = self
            .first
            .record
            .entity
            .as_projectile()
            .ok_or_else(|| missing_capability(projectile_id, FixtureType::Projectile, "Projectile"))?;
        let (hook, result) = match other.kind() {
            FixtureType::Block => ("hit_block", projectile.hit_block(other)),
            FixtureType::Body => ("hit_body", projectile.hit_body(other)),
            FixtureType::Shield => ("hit_shield", projectile.hit_shield(other)),
            FixtureType::Water => ("hit_water", projectile.hit_water(other)),
            _ => return Ok(()),
        };
        result.map_err(|e| ContactError::hook(projectile_id, hook, e))
    }

    fn item(&mut self) -> Result<(), ContactError> {
        let (player_id, item_id) = (self.first.id(), self.second.id());
        let item = self
            .second
            .record
            .entity
            .as_item()
            .ok_or_else(|| missing_capability(item_id, FixtureType::Item, "Item"))?;
        item.collect(player_id)
            .map_err(|e| ContactError::hook(item_id, "collect", e))?;
        self.effects
            .submit_event(ContactEvent::item_collected(item_id, player_id, self.tick));
        Ok(())
    }

    fn laser(&mut self) -> Result<(), ContactError> {
        let block = self
            .second
            .fixture()?
            .placed(self.second.record.body.center());
        let center = self.first.record.body.center();
        let laser = self.first.fixture_mut()?;
        let hits = laser.placed(center).crossings(&block);
        laser.push_laser_hits(hits);
        Ok(())
    }
}
