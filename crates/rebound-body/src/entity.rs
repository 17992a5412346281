//! Entity ids for the bodies of a contact scene.
//!
//! Fixtures name their owner by [`EntityId`], and contacts name fixtures, so
//! a contact can outlive the entity it refers to. Each slot carries a
//! generation that is bumped when its entity is removed; an id whose
//! generation no longer matches its slot is stale and resolves to nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot index plus the generation the slot had when the id was issued.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Owner of a fixture that is not attached to any body yet.
    pub const DETACHED: EntityId = EntityId {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// An id for `index` at `generation`.
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot the entity lives in.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn is_detached(self) -> bool {
        self == Self::DETACHED
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            f.write_str("EntityId(detached)")
        } else {
            write!(f, "EntityId({self})")
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    occupied: bool,
}

/// Issues ids for a scene and tells live ids from stale ones.
///
/// Freed slots are reused most-recent-first; the bumped generation keeps old
/// ids from reaching the new occupant.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
    live: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue an id for a new entity.
    pub fn allocate(&mut self) -> EntityId {
        self.live += 1;
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.occupied = true;
                EntityId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    occupied: true,
                });
                EntityId::new(index, 0)
            }
        }
    }

    /// Retire `id`. Returns `false` if it was already stale.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = &mut self.slots[id.index as usize];
        slot.occupied = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(id.index);
        self.live -= 1;
        true
    }

    /// Whether `id` names the current occupant of its slot.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.occupied && slot.generation == id.generation)
    }

    /// Number of live entities.
    pub fn alive_count(&self) -> usize {
        self.live
    }
}
