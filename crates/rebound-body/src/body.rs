//! Bodies: physical state plus the fixtures and senses of one entity.
//!
//! Positions are bottom-left corners (up is positive `y`); fixture offsets are
//! measured from the body center. The body remembers where it was at the start
//! of the tick so the resolver can compute per-tick motion, which moving
//! platforms hand on to their riders and gravity zones use to pick a probe
//! point.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::fixture::{Fixture, FixtureHandle, FixtureType};
use crate::geometry::{Bounds, Vec2};
use crate::sense::{BodySense, BodySenses};
use crate::BodyError;

// ---------------------------------------------------------------------------
// BodyLabel
// ---------------------------------------------------------------------------

/// Authoring labels that switch off specific contact behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodyLabel {
    /// Side sensors ignore this block.
    NoSideTouchie,
    /// Block only collides from above; heads pass through it.
    CollideDownOnly,
    /// Projectiles pass through this body.
    NoProjectileCollision,
    /// Gravity zones never rotate this body's entity.
    NoGravityRotation,
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Physical state container owned by exactly one entity.
#[derive(Debug)]
pub struct Body {
    entity: EntityId,
    /// Bottom-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
    previous_position: Vec2,
    /// Current velocity in units per second.
    pub velocity: Vec2,
    /// Gravity applied by the movement integrator.
    pub gravity: Vec2,
    /// Friction this body applies to bodies resting on it.
    pub friction_to_apply: Vec2,
    /// Friction this body applies to itself (raised on ice).
    pub friction_on_self: Vec2,
    /// Whether the body takes part in collision at all.
    pub collision_on: bool,
    labels: HashSet<BodyLabel>,
    senses: BodySenses,
    ladder: Option<EntityId>,
    carry_tick: Option<u64>,
    carried_by: Vec<EntityId>,
    fixtures: Vec<Fixture>,
}

impl Body {
    /// Create a body for `entity` with its bottom-left corner at `position`.
    pub fn new(entity: EntityId, position: Vec2, size: Vec2) -> Self {
        Self {
            entity,
            position,
            size,
            previous_position: position,
            velocity: Vec2::ZERO,
            gravity: Vec2::ZERO,
            friction_to_apply: Vec2::new(1.0, 1.0),
            friction_on_self: Vec2::new(1.0, 1.0),
            collision_on: true,
            labels: HashSet::new(),
            senses: BodySenses::new(),
            ladder: None,
            carry_tick: None,
            carried_by: Vec::new(),
            fixtures: Vec::new(),
        }
    }

    // -- builders -----------------------------------------------------------

    /// Add a fixture and return the body.
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.add_fixture(fixture);
        self
    }

    /// Add a label and return the body.
    pub fn with_label(mut self, label: BodyLabel) -> Self {
        self.labels.insert(label);
        self
    }

    /// Set the initial velocity and return the body.
    pub fn with_velocity(mut self, x: f64, y: f64) -> Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    // -- identity and geometry ----------------------------------------------

    /// Owning entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// World-space bounding box.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.position,
            max: self.position + self.size,
        }
    }

    /// Movement since the last [`snapshot_position`](Self::snapshot_position).
    pub fn position_delta(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Remember the current position as the start-of-tick position.
    pub fn snapshot_position(&mut self) {
        self.previous_position = self.position;
    }

    /// Move the body without counting it as this tick's motion.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.previous_position = position;
    }

    // -- labels ---------------------------------------------------------------

    /// Whether the body carries `label`.
    pub fn has_label(&self, label: BodyLabel) -> bool {
        self.labels.contains(&label)
    }

    /// Add a label.
    pub fn add_label(&mut self, label: BodyLabel) {
        self.labels.insert(label);
    }

    /// Remove a label.
    pub fn remove_label(&mut self, label: BodyLabel) {
        self.labels.remove(&label);
    }

    // -- senses -------------------------------------------------------------

    /// Whether the body currently senses `sense`.
    pub fn is_sensing(&self, sense: BodySense) -> bool {
        self.senses.is_sensing(sense)
    }

    /// Read-only view of the sense set.
    pub fn senses(&self) -> &BodySenses {
        &self.senses
    }

    /// Mutable sense set. Reserved for the contact resolver; behavior code
    /// reads senses and never writes them.
    pub fn senses_mut(&mut self) -> &mut BodySenses {
        &mut self.senses
    }

    /// The ladder this body currently touches, if any.
    pub fn ladder(&self) -> Option<EntityId> {
        self.ladder
    }

    /// Set or clear the ladder back-reference. Reserved for the resolver.
    pub fn set_ladder(&mut self, ladder: Option<EntityId>) {
        self.ladder = ladder;
    }

    /// Claim the motion of `platform` for tick `tick`.
    ///
    /// Returns `false` if this body already rode `platform` during `tick`,
    /// however many fixture pairs connect the two.
    pub fn claim_carry(&mut self, platform: EntityId, tick: u64) -> bool {
        if self.carry_tick != Some(tick) {
            self.carry_tick = Some(tick);
            self.carried_by.clear();
        }
        if self.carried_by.contains(&platform) {
            return false;
        }
        self.carried_by.push(platform);
        true
    }

    /// Drop every sense contribution and the ladder back-reference that
    /// point at `entity`. Returns the number of contributions removed.
    pub fn forget_entity(&mut self, entity: EntityId) -> usize {
        if self.ladder == Some(entity) {
            self.ladder = None;
        }
        self.senses.release_other(entity)
    }

    // -- fixtures -----------------------------------------------------------

    /// Attach a fixture. Its owner becomes this body's entity. Returns the
    /// fixture's index.
    pub fn add_fixture(&mut self, mut fixture: Fixture) -> usize {
        fixture.attach(self.entity);
        self.fixtures.push(fixture);
        self.fixtures.len() - 1
    }

    /// All fixtures, in attachment order.
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Mutable fixtures.
    pub fn fixtures_mut(&mut self) -> &mut [Fixture] {
        &mut self.fixtures
    }

    /// Fixture by index.
    pub fn fixture(&self, index: usize) -> Result<&Fixture, BodyError> {
        let len = self.fixtures.len();
        self.fixtures.get(index).ok_or(BodyError::FixtureOutOfRange {
            entity: self.entity,
            index,
            len,
        })
    }

    /// Mutable fixture by index.
    pub fn fixture_mut(&mut self, index: usize) -> Result<&mut Fixture, BodyError> {
        let len = self.fixtures.len();
        self.fixtures
            .get_mut(index)
            .ok_or(BodyError::FixtureOutOfRange {
                entity: self.entity,
                index,
                len,
            })
    }

    /// Handle of the first fixture of `kind`, if any.
    pub fn find_fixture(&self, kind: FixtureType) -> Option<FixtureHandle> {
        self.fixtures
            .iter()
            .position(|f| f.kind() == kind)
            .map(|index| FixtureHandle::new(self.entity, index))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
