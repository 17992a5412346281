//! Reference overlap detector.
//!
//! Games with their own broad phase feed contacts straight into
//! [`Resolver::resolve`](crate::resolver::Resolver::resolve). For everyone
//! else, [`ContactDetector`] tests every pair of fixtures that some rule could
//! match and tags each overlapping pair against the previous tick:
//!
//! - overlapping now, not before: BEGIN
//! - overlapping now and before: CONTINUE
//! - overlapping before, not now: END (also when a fixture was deactivated or
//!   its entity despawned)
//!
//! It is an overlap test only: there is no push-out and no sweep. The output
//! is sorted by pair key so the same scene always yields the same contact
//! order.

use std::collections::BTreeSet;

use rebound_body::fixture::{FixtureHandle, FixtureType};
use rebound_body::geometry::PlacedShape;

use crate::contact::{Contact, PairKey};
use crate::rules::RuleTable;
use crate::scene::Scene;

/// A fixture placed in world space for this tick's overlap pass.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    handle: FixtureHandle,
    kind: FixtureType,
    shape: PlacedShape,
}

/// Tags overlapping fixture pairs BEGIN, CONTINUE or END.
#[derive(Debug, Clone, Default)]
pub struct ContactDetector {
    table: RuleTable,
    previous: BTreeSet<PairKey>,
}

impl ContactDetector {
    /// A detector that only reports pairs `table` can classify.
    pub fn new(table: RuleTable) -> Self {
        Self {
            table,
            previous: BTreeSet::new(),
        }
    }

    /// Pairs overlapping as of the last [`detect`](Self::detect).
    pub fn overlapping(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.previous.iter().copied()
    }

    /// Forget the previous tick. The next pass reports every overlap as
    /// BEGIN and nothing as END.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    /// Run one overlap pass over `scene`.
    pub fn detect(&mut self, scene: &Scene) -> Vec<Contact> {
        let candidates: Vec<Candidate> = scene
            .records()
            .filter(|r| r.body.collision_on)
            .flat_map(|r| {
                let center = r.body.center();
                let entity = r.id();
                r.body
                    .fixtures()
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.active)
                    .map(move |(index, f)| Candidate {
                        handle: FixtureHandle::new(entity, index),
                        kind: f.kind(),
                        shape: f.placed(center),
                    })
            })
            .collect();

        let mut current = BTreeSet::new();
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                if a.handle.entity == b.handle.entity || !self.table.can_match(a.kind, b.kind) {
                    continue;
                }
                // Bounding boxes are compared first inside `overlaps`.
                if a.shape.overlaps(&b.shape) {
                    current.insert(PairKey::new(a.handle, b.handle));
                }
            }
        }

        let mut contacts: Vec<Contact> = current
            .iter()
            .map(|&key| {
                if self.previous.contains(&key) {
                    Contact::continuing(key.low, key.high)
                } else {
                    Contact::begin(key.low, key.high)
                }
            })
            .chain(
                self.previous
                    .difference(&current)
                    .map(|&key| Contact::end(key.low, key.high)),
            )
            .collect();
        contacts.sort_by_key(Contact::pair_key);

        tracing::trace!(
            candidates = candidates.len(),
            overlapping = current.len(),
            contacts = contacts.len(),
            "overlap pass"
        );
        self.previous = current;
        contacts
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
