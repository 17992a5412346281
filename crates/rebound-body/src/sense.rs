//! Body senses: derived boolean flags such as "feet on ground".
//!
//! A sense is never stored as a plain bool. Each sense keeps the set of
//! contacts currently contributing to it, keyed by the (own fixture, other
//! fixture) pair, and reads as `true` while that set is non-empty. This makes
//! re-asserting a sense on every CONTINUE idempotent, and it keeps
//! `FeetOnGround` up while a body stands across two blocks and steps off only
//! one of them.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::fixture::FixtureHandle;

/// A derived sensor flag on a body. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BodySense {
    /// Feet rest on a block.
    FeetOnGround,
    /// Feet rest on ice.
    FeetOnIce,
    /// Feet overlap a ladder.
    FeetTouchingLadder,
    /// Head presses against a block.
    HeadTouchingBlock,
    /// Head overlaps a ladder.
    HeadTouchingLadder,
    /// Left side presses against a block.
    SideTouchingBlockLeft,
    /// Right side presses against a block.
    SideTouchingBlockRight,
    /// Left side presses against ice.
    SideTouchingIceLeft,
    /// Right side presses against ice.
    SideTouchingIceRight,
    /// Submerged in water.
    InWater,
}

impl BodySense {
    /// Every sense, in declaration order.
    pub const ALL: [BodySense; 10] = [
        BodySense::FeetOnGround,
        BodySense::FeetOnIce,
        BodySense::FeetTouchingLadder,
        BodySense::HeadTouchingBlock,
        BodySense::HeadTouchingLadder,
        BodySense::SideTouchingBlockLeft,
        BodySense::SideTouchingBlockRight,
        BodySense::SideTouchingIceLeft,
        BodySense::SideTouchingIceRight,
        BodySense::InWater,
    ];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Identifies one contact's contribution to a sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenseKey {
    /// The sensing fixture (feet, head, side, water listener).
    pub own: FixtureHandle,
    /// The fixture being sensed (block, ice, ladder, water).
    pub other: FixtureHandle,
}

impl SenseKey {
    /// Construct a key.
    pub fn new(own: FixtureHandle, other: FixtureHandle) -> Self {
        Self { own, other }
    }
}

/// The reference-counted sense set of one body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodySenses {
    contributions: [Vec<SenseKey>; BodySense::ALL.len()],
}

impl BodySenses {
    /// All senses off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one contact currently asserts `sense`.
    #[inline]
    pub fn is_sensing(&self, sense: BodySense) -> bool {
        !self.contributions[sense.slot()].is_empty()
    }

    /// Number of contacts currently asserting `sense`.
    pub fn contributors(&self, sense: BodySense) -> usize {
        self.contributions[sense.slot()].len()
    }

    /// Senses that are currently on.
    pub fn active(&self) -> impl Iterator<Item = BodySense> + '_ {
        BodySense::ALL.into_iter().filter(|s| self.is_sensing(*s))
    }

    /// Record that the contact `key` asserts `sense`.
    ///
    /// Returns `true` when this is a new contribution. Asserting the same key
    /// again is a no-op.
    pub fn assert_from(&mut self, sense: BodySense, key: SenseKey) -> bool {
        let keys = &mut self.contributions[sense.slot()];
        if keys.contains(&key) {
            return false;
        }
        keys.push(key);
        true
    }

    /// Withdraw the contribution of `key` to `sense`.
    ///
    /// Returns `true` when a contribution was removed. Other contacts keep
    /// the sense on.
    pub fn release_from(&mut self, sense: BodySense, key: SenseKey) -> bool {
        let keys = &mut self.contributions[sense.slot()];
        match keys.iter().position(|k| *k == key) {
            Some(pos) => {
                keys.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Withdraw every contribution whose sensed fixture belongs to `entity`.
    ///
    /// Returns the number of contributions removed.
    pub fn release_other(&mut self, entity: EntityId) -> usize {
        let mut removed = 0;
        for keys in &mut self.contributions {
            let before = keys.len();
            keys.retain(|k| k.other.entity != entity);
            removed += before - keys.len();
        }
        removed
    }

    /// Drop every contribution.
    pub fn clear(&mut self) {
        for keys in &mut self.contributions {
            keys.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
