//! Contacts: one overlapping fixture pair for one tick.

use std::fmt;

use rebound_body::fixture::{ContactPhase, FixtureHandle};
use serde::{Deserialize, Serialize};

/// A candidate overlapping pair, tagged with its lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    /// First fixture.
    pub a: FixtureHandle,
    /// Second fixture.
    pub b: FixtureHandle,
    /// Lifecycle phase this tick.
    pub phase: ContactPhase,
}

impl Contact {
    /// Construct a contact.
    pub fn new(a: FixtureHandle, b: FixtureHandle, phase: ContactPhase) -> Self {
        Self { a, b, phase }
    }

    /// A BEGIN contact.
    pub fn begin(a: FixtureHandle, b: FixtureHandle) -> Self {
        Self::new(a, b, ContactPhase::Begin)
    }

    /// A CONTINUE contact.
    pub fn continuing(a: FixtureHandle, b: FixtureHandle) -> Self {
        Self::new(a, b, ContactPhase::Continue)
    }

    /// An END contact.
    pub fn end(a: FixtureHandle, b: FixtureHandle) -> Self {
        Self::new(a, b, ContactPhase::End)
    }

    /// Order-independent key of the pair.
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.a, self.b)
    }

    /// Whether both fixtures belong to the same entity.
    pub fn is_self_contact(&self) -> bool {
        self.a.entity == self.b.entity
    }
}

/// Order-independent identity of a fixture pair across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    /// The smaller handle.
    pub low: FixtureHandle,
    /// The larger handle.
    pub high: FixtureHandle,
}

impl PairKey {
    /// Key for the unordered pair `{a, b}`.
    pub fn new(a: FixtureHandle, b: FixtureHandle) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebound_body::entity::EntityId;

    #[test]
    fn pair_key_ignores_order() {
        let a = FixtureHandle::new(EntityId::new(1, 0), 0);
        let b = FixtureHandle::new(EntityId::new(2, 0), 3);
        assert_eq!(Contact::begin(a, b).pair_key(), Contact::end(b, a).pair_key());
        assert_eq!(PairKey::new(b, a).low, a);
    }

    #[test]
    fn self_contact_is_detected_by_entity() {
        let e = EntityId::new(4, 2);
        let c = Contact::continuing(FixtureHandle::new(e, 0), FixtureHandle::new(e, 1));
        assert!(c.is_self_contact());
    }
}
