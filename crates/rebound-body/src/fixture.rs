//! Fixtures: typed collision volumes attached to a [`Body`](crate::body::Body).
//!
//! Every fixture carries exactly one [`FixtureType`]. The contact resolver
//! classifies a pair of overlapping fixtures purely by their two types, so the
//! type is the fixture's semantic role ("this is a body's feet", "this hurts",
//! "this is water").
//!
//! Per-fixture behavior lives in [`FixtureProps`]: strongly typed closures and
//! tags (consumer, runnable, velocity alteration, side, direction) plus a
//! free-form `extras` map for authoring data that the engine itself ignores.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alteration::{AffectedFixture, VelocityAlteration};
use crate::entity::EntityId;
use crate::geometry::{FixtureShape, PlacedShape, Vec2};

// ---------------------------------------------------------------------------
// FixtureType
// ---------------------------------------------------------------------------

/// The semantic role of a fixture. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixtureType {
    /// The physical body of an entity; target of forces and gravity zones.
    Body,
    /// Inflicts damage on damageables.
    Damager,
    /// Can receive damage.
    Damageable,
    /// Kills any damageable instantly.
    Death,
    /// Solid terrain.
    Block,
    /// Left or right side sensor.
    Side,
    /// Feet sensor.
    Feet,
    /// Head sensor.
    Head,
    /// Slippery terrain.
    Ice,
    /// Climbable ladder.
    Ladder,
    /// Water volume.
    Water,
    /// Detects when a body enters water.
    WaterListener,
    /// Bounces whatever touches it.
    Bouncer,
    /// Pushes bodies inside it.
    Force,
    /// Rotates the gravity direction of bodies crossing it.
    GravityChange,
    /// A projectile's hitbox.
    Projectile,
    /// Deflects projectiles.
    Shield,
    /// Receives every contact it takes part in through its consumer callback.
    Consumer,
    /// A collectible.
    Item,
    /// The player's pickup volume.
    Player,
    /// Teleporter pad.
    Teleporter,
    /// Boss-room gate.
    Gate,
    /// Laser beam, swept against blocks every tick.
    Laser,
}

impl FixtureType {
    /// Every fixture type, in declaration order.
    pub const ALL: [FixtureType; 23] = [
        FixtureType::Body,
        FixtureType::Damager,
        FixtureType::Damageable,
        FixtureType::Death,
        FixtureType::Block,
        FixtureType::Side,
        FixtureType::Feet,
        FixtureType::Head,
        FixtureType::Ice,
        FixtureType::Ladder,
        FixtureType::Water,
        FixtureType::WaterListener,
        FixtureType::Bouncer,
        FixtureType::Force,
        FixtureType::GravityChange,
        FixtureType::Projectile,
        FixtureType::Shield,
        FixtureType::Consumer,
        FixtureType::Item,
        FixtureType::Player,
        FixtureType::Teleporter,
        FixtureType::Gate,
        FixtureType::Laser,
    ];
}

// ---------------------------------------------------------------------------
// Tags and phases
// ---------------------------------------------------------------------------

/// Lifecycle phase of a contact, as tagged by the overlap detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactPhase {
    /// First tick of overlap.
    Begin,
    /// Overlap persists.
    Continue,
    /// Overlap ended this tick.
    End,
}

/// Which side of its body a SIDE fixture sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SideTag {
    /// Left side.
    Left,
    /// Right side.
    Right,
}

/// A cardinal direction. Used for gravity rotation and shield facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Gravity pulls down; the default orientation.
    #[default]
    Up,
    /// Upside down.
    Down,
    /// Rotated to the left wall.
    Left,
    /// Rotated to the right wall.
    Right,
}

/// Stable address of a fixture: its owning entity plus its index on the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureHandle {
    /// Entity owning the body the fixture is attached to.
    pub entity: EntityId,
    /// Index in the body's fixture list.
    pub index: usize,
}

impl FixtureHandle {
    /// Construct a handle.
    pub fn new(entity: EntityId, index: usize) -> Self {
        Self { entity, index }
    }
}

impl fmt::Display for FixtureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity, self.index)
    }
}

// ---------------------------------------------------------------------------
// FixtureProps
// ---------------------------------------------------------------------------

/// Callback invoked with every contact a CONSUMER fixture takes part in.
pub type ConsumerFn = Box<dyn FnMut(ContactPhase, &Fixture)>;

/// Side-effect hook run after a bouncer fires.
pub type RunnableFn = Box<dyn FnMut()>;

/// Computes the velocity change a force, bouncer or gravity zone applies to
/// the fixture it touches. The second argument is the tick's delta time.
pub type AlterationFn = Box<dyn FnMut(AffectedFixture<'_>, f64) -> VelocityAlteration>;

/// Per-fixture behavior and tags.
#[derive(Default)]
pub struct FixtureProps {
    /// Callback for CONSUMER fixtures.
    pub consumer: Option<ConsumerFn>,
    /// Hook for BOUNCER fixtures.
    pub runnable: Option<RunnableFn>,
    /// Alteration supplier for BOUNCER and FORCE fixtures.
    pub velocity_alteration: Option<AlterationFn>,
    /// Side tag for SIDE fixtures.
    pub side: Option<SideTag>,
    /// Target direction for GRAVITY_CHANGE fixtures, facing for SHIELD ones.
    pub direction: Option<Direction>,
    /// Free-form authoring data. Never read by the resolver.
    pub extras: HashMap<String, serde_json::Value>,
}

impl fmt::Debug for FixtureProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureProps")
            .field("consumer", &self.consumer.is_some())
            .field("runnable", &self.runnable.is_some())
            .field("velocity_alteration", &self.velocity_alteration.is_some())
            .field("side", &self.side)
            .field("direction", &self.direction)
            .field("extras", &self.extras)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A typed collision volume. The shape is fixed at construction; the offset
/// from the body center may change (e.g. a crouching player's head sensor).
#[derive(Debug)]
pub struct Fixture {
    owner: EntityId,
    kind: FixtureType,
    shape: FixtureShape,
    /// Offset of the fixture center from the body center.
    pub offset: Vec2,
    /// Inactive fixtures never take part in contact resolution.
    pub active: bool,
    attached: bool,
    /// Behavior and tags.
    pub props: FixtureProps,
    laser_hits: Vec<Vec2>,
}

impl Fixture {
    /// Create a detached fixture. It gets its owner when added to a body.
    pub fn new(kind: FixtureType, shape: FixtureShape) -> Self {
        Self {
            owner: EntityId::DETACHED,
            kind,
            shape,
            offset: Vec2::ZERO,
            active: true,
            attached: false,
            props: FixtureProps::default(),
            laser_hits: Vec::new(),
        }
    }

    /// Rectangle fixture shorthand.
    pub fn rect(kind: FixtureType, width: f64, height: f64) -> Self {
        Self::new(kind, FixtureShape::Rect { width, height })
    }

    // -- builders -----------------------------------------------------------

    /// Set the offset from the body center.
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    /// Tag a SIDE fixture.
    pub fn with_side(mut self, side: SideTag) -> Self {
        self.props.side = Some(side);
        self
    }

    /// Tag a GRAVITY_CHANGE or SHIELD fixture with a direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.props.direction = Some(direction);
        self
    }

    /// Install a consumer callback.
    pub fn with_consumer(mut self, f: impl FnMut(ContactPhase, &Fixture) + 'static) -> Self {
        self.props.consumer = Some(Box::new(f));
        self
    }

    /// Install a runnable hook.
    pub fn with_runnable(mut self, f: impl FnMut() + 'static) -> Self {
        self.props.runnable = Some(Box::new(f));
        self
    }

    /// Install a velocity alteration supplier.
    pub fn with_velocity_alteration(
        mut self,
        f: impl FnMut(AffectedFixture<'_>, f64) -> VelocityAlteration + 'static,
    ) -> Self {
        self.props.velocity_alteration = Some(Box::new(f));
        self
    }

    /// Attach free-form authoring data.
    pub fn with_extra(mut self, key: &str, value: serde_json::Value) -> Self {
        self.props.extras.insert(key.to_owned(), value);
        self
    }

    /// Start inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    // -- accessors ----------------------------------------------------------

    /// Entity owning the body this fixture is attached to.
    pub fn entity(&self) -> EntityId {
        self.owner
    }

    /// The fixture's semantic type.
    pub fn kind(&self) -> FixtureType {
        self.kind
    }

    /// The local shape.
    pub fn shape(&self) -> FixtureShape {
        self.shape
    }

    /// Whether the fixture has been attached to a body.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The shape placed in world space for a body centered at `body_center`.
    pub fn placed(&self, body_center: Vec2) -> PlacedShape {
        self.shape.at(body_center + self.offset)
    }

    /// Points where this LASER fixture crossed blocks during the current tick.
    pub fn laser_hits(&self) -> &[Vec2] {
        &self.laser_hits
    }

    /// Record laser crossing points. Called by the resolver.
    pub fn push_laser_hits(&mut self, points: impl IntoIterator<Item = Vec2>) {
        self.laser_hits.extend(points);
    }

    /// Forget the previous tick's laser crossings.
    pub fn clear_laser_hits(&mut self) {
        self.laser_hits.clear();
    }

    pub(crate) fn attach(&mut self, owner: EntityId) {
        self.owner = owner;
        self.attached = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
