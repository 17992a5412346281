//! Rebound Contact -- semantic contact resolution for a 2D platformer.
//!
//! Each physics tick, an overlap detector produces a stream of
//! [`Contact`](contact::Contact)s tagged BEGIN, CONTINUE or END. The
//! [`Resolver`](resolver::Resolver) classifies every contact by the
//! [`FixtureType`](rebound_body::fixture::FixtureType)s of its two fixtures
//! against an ordered [`RuleTable`](rules::RuleTable) and runs the first
//! matching handler: body senses are maintained, damage is negotiated,
//! velocities are altered, entity hooks fire, and sounds, decorations and
//! events go to a [`ContactEffects`](effects::ContactEffects) sink.
//!
//! # Quick Start
//!
//! ```
//! use rebound_contact::prelude::*;
//!
//! let mut scene = Scene::new();
//! let hero = scene.spawn(
//!     |id| {
//!         Body::new(id, Vec2::new(0.0, 10.0), Vec2::new(16.0, 24.0))
//!             .with_fixture(Fixture::rect(FixtureType::Feet, 12.0, 2.0).with_offset(0.0, -12.0))
//!     },
//!     Inert,
//! );
//! let _floor = scene.spawn(
//!     |id| {
//!         Body::new(id, Vec2::new(-50.0, 0.0), Vec2::new(100.0, 10.0))
//!             .with_fixture(Fixture::rect(FixtureType::Block, 100.0, 10.0))
//!     },
//!     Inert,
//! );
//!
//! let mut pipeline = ContactPipeline::new(scene, PipelineConfig::default()).unwrap();
//! let mut effects = RecordingEffects::default();
//! pipeline.tick(&mut effects);
//!
//! let body = pipeline.scene().body(hero).unwrap();
//! assert!(body.is_sensing(BodySense::FeetOnGround));
//! ```

#![deny(unsafe_code)]

pub mod capability;
pub mod config;
pub mod contact;
pub mod damage;
pub mod detect;
pub mod effects;
pub mod events;
pub mod gravity;
mod handlers;
pub mod pipeline;
pub mod resolver;
pub mod rules;
pub mod scene;

use rebound_body::entity::EntityId;
use rebound_body::fixture::{FixtureHandle, FixtureType};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while resolving contacts or configuring the resolver.
///
/// None of these abort a tick: the resolver logs them per contact and moves
/// on to the next one.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// A fixture lacks a property its type requires (e.g. a bouncer without
    /// an alteration callback).
    #[error("{kind:?} fixture {fixture} is missing its '{property}' property")]
    MissingProperty {
        /// The offending fixture.
        fixture: FixtureHandle,
        /// Its type.
        kind: FixtureType,
        /// Name of the missing property.
        property: &'static str,
    },

    /// An entity carries a fixture type but not the matching capability.
    #[error("entity {entity} has a {kind:?} fixture but does not implement {capability}")]
    MissingCapability {
        /// The entity owning the fixture.
        entity: EntityId,
        /// The fixture type that needs the capability.
        kind: FixtureType,
        /// Name of the capability trait.
        capability: &'static str,
    },

    /// An entity hook returned an error.
    #[error("hook '{hook}' on entity {entity} failed: {source}")]
    Hook {
        /// The entity whose hook failed.
        entity: EntityId,
        /// Hook name, e.g. `hit_block`.
        hook: &'static str,
        /// The hook's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A fixture handle did not resolve.
    #[error(transparent)]
    Fixture(#[from] rebound_body::BodyError),

    /// The resolver configuration could not be parsed.
    #[error("invalid resolver configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The pipeline was given a non-positive or non-finite timestep.
    #[error("fixed_dt must be positive and finite, got {0}")]
    InvalidTimestep(f64),
}

impl ContactError {
    /// Wrap an entity hook failure.
    pub fn hook(entity: EntityId, hook: &'static str, err: anyhow::Error) -> Self {
        ContactError::Hook {
            entity,
            hook,
            source: err.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use rebound_body::prelude::*;

    pub use crate::capability::{
        AirTask, Damageable, Damager, DirectionRotatable, Gate, GameEntity, Health, Inert, Item,
        PlayerControl, Projectile,
    };
    pub use crate::config::{PipelineConfig, ResolverConfig};
    pub use crate::contact::{Contact, PairKey};
    pub use crate::damage::{negotiate_damage, DamageOutcome};
    pub use crate::detect::ContactDetector;
    pub use crate::effects::{
        ContactEffects, DecorationRequest, NullEffects, RecordingEffects, SoundRequest,
    };
    pub use crate::events::ContactEvent;
    pub use crate::gravity::probe_point;
    pub use crate::pipeline::{ContactPipeline, PipelineDiagnostics};
    pub use crate::resolver::{MatchRecord, ResolveReport, Resolver};
    pub use crate::rules::{Classification, PhaseMask, RolePattern, RoleRule, RuleTable};
    pub use crate::scene::{EntityRecord, Scene};
    pub use crate::ContactError;
}
