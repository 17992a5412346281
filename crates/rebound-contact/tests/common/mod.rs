//! Mock entities and scene helpers shared by the integration tests.
//!
//! Entities are boxed into the scene, so each mock keeps its observable state
//! behind an `Rc<RefCell<_>>` that the test holds a clone of.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rebound_contact::prelude::*;

pub type Shared<T> = Rc<RefCell<T>>;

pub const DT: f64 = 1.0 / 60.0;

/// Install a test-writer subscriber once. `RUST_LOG` selects levels.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Hero: the player
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct HeroState {
    pub health: i32,
    pub min_health: i32,
    pub invincible: bool,
    pub shielded: bool,
    pub hits_taken: u32,
    pub air_task: AirTask,
    pub wall_sliding: bool,
    pub direction: Direction,
}

impl Default for HeroState {
    fn default() -> Self {
        Self {
            health: 10,
            min_health: 0,
            invincible: false,
            shielded: false,
            hits_taken: 0,
            air_task: AirTask::Jump,
            wall_sliding: false,
            direction: Direction::Up,
        }
    }
}

/// The player: damageable, rotatable, with a health pool.
#[derive(Clone, Default)]
pub struct Hero {
    pub state: Shared<HeroState>,
}

impl Hero {
    pub fn new() -> (Self, Shared<HeroState>) {
        let hero = Hero::default();
        let state = hero.state.clone();
        (hero, state)
    }
}

impl GameEntity for Hero {
    fn name(&self) -> &str {
        "hero"
    }
    fn as_damageable(&mut self) -> Option<&mut dyn Damageable> {
        Some(self)
    }
    fn as_health(&mut self) -> Option<&mut dyn Health> {
        Some(self)
    }
    fn as_rotatable(&mut self) -> Option<&mut dyn DirectionRotatable> {
        Some(self)
    }
    fn as_player(&mut self) -> Option<&mut dyn PlayerControl> {
        Some(self)
    }
}

impl Damageable for Hero {
    fn can_be_damaged_by(&mut self, _damager: &dyn Damager) -> bool {
        !self.state.borrow().invincible
    }
    fn take_damage_from(&mut self, _damager: &dyn Damager) -> anyhow::Result<bool> {
        let mut state = self.state.borrow_mut();
        state.hits_taken += 1;
        if state.shielded {
            return Ok(false);
        }
        state.health -= 1;
        Ok(true)
    }
}

impl Health for Hero {
    fn health(&self) -> i32 {
        self.state.borrow().health
    }
    fn min_health(&self) -> i32 {
        self.state.borrow().min_health
    }
    fn set_health(&mut self, value: i32) {
        self.state.borrow_mut().health = value;
    }
}

impl DirectionRotatable for Hero {
    fn direction_rotation(&self) -> Direction {
        self.state.borrow().direction
    }
    fn set_direction_rotation(&mut self, direction: Direction) {
        self.state.borrow_mut().direction = direction;
    }
}

impl PlayerControl for Hero {
    fn air_task(&self) -> AirTask {
        self.state.borrow().air_task
    }
    fn set_air_task(&mut self, task: AirTask) {
        self.state.borrow_mut().air_task = task;
    }
    fn is_wall_sliding(&self) -> bool {
        self.state.borrow().wall_sliding
    }
}

// ---------------------------------------------------------------------------
// Walker: a rotatable non-player
// ---------------------------------------------------------------------------

/// An enemy that follows gravity zones but is not the player.
#[derive(Clone, Default)]
pub struct Walker {
    pub direction: Shared<Direction>,
}

impl GameEntity for Walker {
    fn as_rotatable(&mut self) -> Option<&mut dyn DirectionRotatable> {
        Some(self)
    }
}

impl DirectionRotatable for Walker {
    fn direction_rotation(&self) -> Direction {
        *self.direction.borrow()
    }
    fn set_direction_rotation(&mut self, direction: Direction) {
        *self.direction.borrow_mut() = direction;
    }
}

// ---------------------------------------------------------------------------
// Spikes: a damager
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SpikeState {
    pub willing: bool,
    pub inflicted: u32,
}

impl Default for SpikeState {
    fn default() -> Self {
        Self {
            willing: true,
            inflicted: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct Spikes {
    pub state: Shared<SpikeState>,
}

impl GameEntity for Spikes {
    fn name(&self) -> &str {
        "spikes"
    }
    fn as_damager(&mut self) -> Option<&mut dyn Damager> {
        Some(self)
    }
}

impl Damager for Spikes {
    fn damage_class(&self) -> &str {
        "spikes"
    }
    fn can_damage(&mut self, _target: &dyn Damageable) -> bool {
        self.state.borrow().willing
    }
    fn on_damage_inflicted_to(&mut self, _target: &dyn Damageable) -> anyhow::Result<()> {
        self.state.borrow_mut().inflicted += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Door, coin, bullet
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DoorState {
    pub locked: bool,
    pub triggered: u32,
}

#[derive(Clone, Default)]
pub struct Door {
    pub state: Shared<DoorState>,
}

impl GameEntity for Door {
    fn as_gate(&mut self) -> Option<&mut dyn Gate> {
        Some(self)
    }
}

impl Gate for Door {
    fn is_openable(&self) -> bool {
        let state = self.state.borrow();
        !state.locked && state.triggered == 0
    }
    fn trigger(&mut self) -> anyhow::Result<()> {
        self.state.borrow_mut().triggered += 1;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct Coin {
    pub collected_by: Shared<Vec<EntityId>>,
}

impl GameEntity for Coin {
    fn as_item(&mut self) -> Option<&mut dyn Item> {
        Some(self)
    }
}

impl Item for Coin {
    fn collect(&mut self, collector: EntityId) -> anyhow::Result<()> {
        self.collected_by.borrow_mut().push(collector);
        Ok(())
    }
}

/// A projectile that records which hooks ran. With `jammed`, `hit_block`
/// fails.
#[derive(Clone, Default)]
pub struct Bullet {
    pub hits: Shared<Vec<&'static str>>,
    pub jammed: bool,
}

impl GameEntity for Bullet {
    fn as_projectile(&mut self) -> Option<&mut dyn Projectile> {
        Some(self)
    }
}

impl Projectile for Bullet {
    fn hit_block(&mut self, _block: &Fixture) -> anyhow::Result<()> {
        if self.jammed {
            anyhow::bail!("bullet jammed");
        }
        self.hits.borrow_mut().push("block");
        Ok(())
    }
    fn hit_body(&mut self, _body: &Fixture) -> anyhow::Result<()> {
        self.hits.borrow_mut().push("body");
        Ok(())
    }
    fn hit_shield(&mut self, _shield: &Fixture) -> anyhow::Result<()> {
        self.hits.borrow_mut().push("shield");
        Ok(())
    }
    fn hit_water(&mut self, _water: &Fixture) -> anyhow::Result<()> {
        self.hits.borrow_mut().push("water");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scene helpers
// ---------------------------------------------------------------------------

/// Spawn a body at `position` (bottom-left) of `size` carrying `fixtures`.
/// Returns one handle per fixture, in order.
pub fn spawn(
    scene: &mut Scene,
    position: Vec2,
    size: Vec2,
    fixtures: Vec<Fixture>,
    entity: impl GameEntity + 'static,
) -> Vec<FixtureHandle> {
    let count = fixtures.len();
    let id = scene.spawn(
        |id| {
            fixtures
                .into_iter()
                .fold(Body::new(id, position, size), Body::with_fixture)
        },
        entity,
    );
    (0..count).map(|i| FixtureHandle::new(id, i)).collect()
}

/// Spawn an inert body whose single fixture covers the whole body.
pub fn spawn_solid(scene: &mut Scene, kind: FixtureType, position: Vec2, size: Vec2) -> FixtureHandle {
    spawn(
        scene,
        position,
        size,
        vec![Fixture::rect(kind, size.x, size.y)],
        Inert,
    )[0]
}

pub fn senses_of(scene: &Scene, handle: FixtureHandle) -> Vec<BodySense> {
    scene
        .body(handle.entity)
        .map(|b| b.senses().active().collect())
        .unwrap_or_default()
}
