//! The scene: every live entity's body paired with its behavior object.
//!
//! Records live in a slot vector indexed by [`EntityId::index`]. A stale id
//! (despawned, or an older generation of a reused slot) resolves to `None`,
//! which is how the resolver detects contacts that outlived their entity.

use rebound_body::body::Body;
use rebound_body::entity::{EntityAllocator, EntityId};
use rebound_body::fixture::{Fixture, FixtureHandle, FixtureType};

use crate::capability::GameEntity;

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// A body and the entity that owns it.
pub struct EntityRecord {
    /// Physical state and fixtures.
    pub body: Body,
    /// Behavior object queried for capabilities.
    pub entity: Box<dyn GameEntity>,
}

impl EntityRecord {
    /// The owning entity's id.
    pub fn id(&self) -> EntityId {
        self.body.entity()
    }
}

impl std::fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRecord")
            .field("entity", &self.entity.name())
            .field("body", &self.body)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Owner of all entity records taking part in contact resolution.
#[derive(Debug, Default)]
pub struct Scene {
    allocator: EntityAllocator,
    slots: Vec<Option<EntityRecord>>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an entity. `build` receives the new id and returns its body;
    /// the body must be created for that id.
    pub fn spawn(
        &mut self,
        build: impl FnOnce(EntityId) -> Body,
        entity: impl GameEntity + 'static,
    ) -> EntityId {
        let id = self.allocator.allocate();
        let body = build(id);
        debug_assert_eq!(body.entity(), id, "body built for a different entity");

        let slot = id.index() as usize;
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        let record = EntityRecord {
            body,
            entity: Box::new(entity),
        };
        tracing::debug!(entity = %id, name = record.entity.name(), "spawned");
        self.slots[slot] = Some(record);
        id
    }

    /// Remove an entity together with its body and fixtures.
    ///
    /// Every surviving body drops the sense contributions and the ladder
    /// back-reference that pointed at the removed entity. Returns the record,
    /// or `None` if the id was stale.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityRecord> {
        if !self.allocator.deallocate(id) {
            return None;
        }
        let record = self.slots.get_mut(id.index() as usize)?.take();
        let released: usize = self
            .slots
            .iter_mut()
            .flatten()
            .map(|r| r.body.forget_entity(id))
            .sum();
        tracing::debug!(entity = %id, released, "despawned");
        record
    }

    /// Whether `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Whether the scene has no live entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record of a live entity.
    pub fn record(&self, id: EntityId) -> Option<&EntityRecord> {
        if !self.contains(id) {
            return None;
        }
        self.slots.get(id.index() as usize)?.as_ref()
    }

    /// Mutable record of a live entity.
    pub fn record_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        if !self.contains(id) {
            return None;
        }
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    /// Body of a live entity.
    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.record(id).map(|r| &r.body)
    }

    /// Mutable body of a live entity.
    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.record_mut(id).map(|r| &mut r.body)
    }

    /// Behavior object of a live entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut (dyn GameEntity + 'static)> {
        self.record_mut(id).map(|r| r.entity.as_mut())
    }

    /// Fixture behind a handle.
    pub fn fixture(&self, handle: FixtureHandle) -> Option<&Fixture> {
        self.body(handle.entity)?.fixtures().get(handle.index)
    }

    /// Mutable records of two different live entities at once.
    ///
    /// Returns `None` if either id is stale or both name the same slot.
    pub fn pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Option<(&mut EntityRecord, &mut EntityRecord)> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (ia, ib) = (a.index() as usize, b.index() as usize);
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            return None;
        }
        if ia < ib {
            let (head, tail) = self.slots.split_at_mut(ib);
            Some((head[ia].as_mut()?, tail[0].as_mut()?))
        } else {
            let (head, tail) = self.slots.split_at_mut(ia);
            Some((tail[0].as_mut()?, head[ib].as_mut()?))
        }
    }

    /// Ids of live entities in slot order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.records().map(EntityRecord::id)
    }

    /// Live records in slot order.
    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.slots.iter().flatten()
    }

    /// Start-of-tick housekeeping: forget last tick's laser crossings.
    pub fn begin_tick(&mut self) {
        for record in self.slots.iter_mut().flatten() {
            for fixture in record.body.fixtures_mut() {
                if fixture.kind() == FixtureType::Laser {
                    fixture.clear_laser_hits();
                }
            }
        }
    }

    /// End-of-tick housekeeping: the current positions become the reference
    /// for next tick's motion.
    pub fn end_tick(&mut self) {
        for record in self.slots.iter_mut().flatten() {
            record.body.snapshot_position();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
