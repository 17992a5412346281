//! Rebound Body -- fixtures, bodies and senses for 2D platformer contacts.
//!
//! This crate is the data model the contact resolver works on. An entity owns
//! one [`Body`](body::Body); the body owns typed
//! [`Fixture`](fixture::Fixture)s and a reference-counted set of
//! [`BodySense`](sense::BodySense) flags that behavior code reads each tick.
//!
//! # Quick Start
//!
//! ```
//! use rebound_body::prelude::*;
//!
//! let mut ids = EntityAllocator::new();
//! let player = ids.allocate();
//!
//! let body = Body::new(player, Vec2::new(0.0, 0.0), Vec2::new(16.0, 24.0))
//!     .with_fixture(Fixture::rect(FixtureType::Body, 16.0, 24.0))
//!     .with_fixture(Fixture::rect(FixtureType::Feet, 12.0, 1.0).with_offset(0.0, -12.0));
//!
//! assert_eq!(body.fixtures().len(), 2);
//! assert!(!body.is_sensing(BodySense::FeetOnGround));
//! ```

#![deny(unsafe_code)]

pub mod alteration;
pub mod body;
pub mod entity;
pub mod fixture;
pub mod geometry;
pub mod sense;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by body and fixture lookups.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    /// A fixture index past the end of the body's fixture list.
    #[error("entity {entity} has no fixture #{index} (it has {len})")]
    FixtureOutOfRange {
        entity: entity::EntityId,
        index: usize,
        len: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::alteration::{
        alter, AffectedFixture, AlterationMode, AxisAlteration, VelocityAlteration, VelocityClamp,
    };
    pub use crate::body::{Body, BodyLabel};
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::fixture::{
        ContactPhase, Direction, Fixture, FixtureHandle, FixtureProps, FixtureType, SideTag,
    };
    pub use crate::geometry::{Bounds, FixtureShape, PlacedShape, Vec2};
    pub use crate::sense::{BodySense, BodySenses, SenseKey};
    pub use crate::BodyError;
}
