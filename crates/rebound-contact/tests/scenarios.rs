//! Gameplay scenarios and resolver-wide guarantees.
//!
//! Validates:
//! 1. Riders are carried by moving platforms
//! 2. Death zones deplete health to the configured minimum
//! 3. Gravity zones rotate one way only
//! 4. CONSUMER shadows more specific patterns
//! 5. The damage handshake needs both sides to agree
//! 6. Self-contacts never do anything
//! 7. CONTINUE is idempotent and END clears exactly its own sense
//! 8. Senses are reference-counted across contacts
//! 9. A failing hook does not stop the rest of the tick

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use rebound_contact::prelude::*;

// ---------------------------------------------------------------------------
// 1. Moving platform
// ---------------------------------------------------------------------------

#[test]
fn moving_platform_carries_rider() {
    init_tracing();
    let mut scene = Scene::new();
    let (hero, _state) = Hero::new();
    let rider = spawn(
        &mut scene,
        Vec2::new(0.0, 10.0),
        Vec2::new(4.0, 4.0),
        vec![Fixture::rect(FixtureType::Feet, 4.0, 1.0).with_offset(0.0, -2.0)],
        hero,
    )[0];
    let platform = spawn_solid(
        &mut scene,
        FixtureType::Block,
        Vec2::new(-10.0, 0.0),
        Vec2::new(20.0, 10.0),
    );

    let mut pipeline = ContactPipeline::new(scene, PipelineConfig::default()).unwrap();
    let mut fx = NullEffects;
    let report = pipeline.tick(&mut fx);
    assert!(report.matched(RolePattern::FeetBlock));
    assert_eq!(pipeline.scene().body(rider.entity).unwrap().position.x, 0.0);

    for step in 1..=3 {
        pipeline
            .scene_mut()
            .body_mut(platform.entity)
            .unwrap()
            .position
            .x += 2.0;
        pipeline.tick(&mut fx);
        assert_eq!(pipeline.last_diagnostics().continued, 1);

        let body = pipeline.scene().body(rider.entity).unwrap();
        assert_eq!(body.position.x, 2.0 * step as f64);
        assert!(body.is_sensing(BodySense::FeetOnGround));
    }
}

#[test]
fn platform_with_two_blocks_carries_once() {
    let mut scene = Scene::new();
    let rider = spawn(
        &mut scene,
        Vec2::new(0.0, 10.0),
        Vec2::new(4.0, 4.0),
        vec![
            Fixture::rect(FixtureType::Feet, 4.0, 1.0).with_offset(0.0, -2.0),
            Fixture::rect(FixtureType::Feet, 2.0, 1.0).with_offset(0.0, -2.0),
        ],
        Inert,
    )[0];
    let platform = spawn(
        &mut scene,
        Vec2::new(-10.0, 0.0),
        Vec2::new(20.0, 10.0),
        vec![
            Fixture::rect(FixtureType::Block, 20.0, 10.0),
            Fixture::rect(FixtureType::Block, 10.0, 10.0),
        ],
        Inert,
    )[0];

    let mut pipeline = ContactPipeline::new(scene, PipelineConfig::default()).unwrap();
    pipeline.tick(&mut NullEffects);
    assert_eq!(pipeline.last_diagnostics().begun, 4);

    pipeline
        .scene_mut()
        .body_mut(platform.entity)
        .unwrap()
        .position
        .x += 2.0;
    pipeline.tick(&mut NullEffects);
    let body = pipeline.scene().body(rider.entity).unwrap();
    assert_eq!(body.position.x, 2.0);
    assert_eq!(body.senses().contributors(BodySense::FeetOnGround), 4);
}

#[test]
fn despawned_platform_drops_its_rider() {
    init_tracing();
    let mut scene = Scene::new();
    let (hero, state) = Hero::new();
    let rider = spawn(
        &mut scene,
        Vec2::new(0.0, 10.0),
        Vec2::new(4.0, 4.0),
        vec![Fixture::rect(FixtureType::Feet, 4.0, 1.0).with_offset(0.0, -2.0)],
        hero,
    )[0];
    let platform = spawn_solid(
        &mut scene,
        FixtureType::Block,
        Vec2::new(-10.0, 0.0),
        Vec2::new(20.0, 10.0),
    );

    let mut pipeline = ContactPipeline::new(scene, PipelineConfig::default()).unwrap();
    pipeline.tick(&mut NullEffects);
    assert!(pipeline.scene().body(rider.entity).unwrap().is_sensing(BodySense::FeetOnGround));
    assert_eq!(state.borrow().air_task, AirTask::Jump);

    assert!(pipeline.scene_mut().despawn(platform.entity).is_some());
    let report = pipeline.tick(&mut NullEffects);
    assert_eq!(report.skipped_missing, 1);
    for _ in 0..2 {
        let report = pipeline.tick(&mut NullEffects);
        assert_eq!(report.processed, 0);
    }

    assert!(!pipeline.scene().body(rider.entity).unwrap().is_sensing(BodySense::FeetOnGround));
    assert_eq!(state.borrow().air_task, AirTask::AirDash);
    assert_eq!(pipeline.resolver().active_pairs(), 0);
}

// ---------------------------------------------------------------------------
// 2. Lethal zone
// ---------------------------------------------------------------------------

#[test]
fn lethal_zone_depletes_health_to_minimum() {
    for (start, floor) in [(10, 0), (3, 0), (25, -5)] {
        let mut scene = Scene::new();
        let (hero, state) = Hero::new();
        {
            let mut s = state.borrow_mut();
            s.health = start;
            s.min_health = floor;
        }
        let victim = spawn(
            &mut scene,
            Vec2::ZERO,
            Vec2::new(4.0, 4.0),
            vec![Fixture::rect(FixtureType::Damageable, 4.0, 4.0)],
            hero,
        )[0];
        let lava = spawn_solid(&mut scene, FixtureType::Death, Vec2::ZERO, Vec2::new(10.0, 2.0));

        let mut fx = RecordingEffects::default();
        let mut resolver = Resolver::default();
        resolver.resolve(&mut scene, &[Contact::begin(victim, lava)], DT, &mut fx);

        assert_eq!(state.borrow().health, floor);
        let events: Vec<_> = fx.events_of("lethal_contact").collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].involved_entities, vec![lava.entity, victim.entity]);
    }
}

// ---------------------------------------------------------------------------
// 3. Gravity zones
// ---------------------------------------------------------------------------

/// A 4x4 body that moved `dx` to the right this tick, and a 10x10 DOWN zone
/// spanning x 5..15, y -5..5.
fn gravity_setup(
    dx: f64,
    entity: impl GameEntity + 'static,
    label: Option<BodyLabel>,
) -> (Scene, FixtureHandle, FixtureHandle) {
    let mut scene = Scene::new();
    let id = scene.spawn(
        |id| {
            let body = Body::new(id, Vec2::ZERO, Vec2::new(4.0, 4.0))
                .with_fixture(Fixture::rect(FixtureType::Body, 4.0, 4.0));
            match label {
                Some(label) => body.with_label(label),
                None => body,
            }
        },
        entity,
    );
    scene.body_mut(id).unwrap().position.x += dx;
    let zone = spawn(
        &mut scene,
        Vec2::new(5.0, -5.0),
        Vec2::new(10.0, 10.0),
        vec![Fixture::rect(FixtureType::GravityChange, 10.0, 10.0).with_direction(Direction::Down)],
        Inert,
    )[0];
    (scene, FixtureHandle::new(id, 0), zone)
}

#[test]
fn gravity_zone_rotates_one_way() {
    let (hero, state) = Hero::new();
    let (mut scene, body, zone) = gravity_setup(2.0, hero, None);
    let mut resolver = Resolver::default();

    resolver.resolve(&mut scene, &[Contact::begin(body, zone)], DT, &mut NullEffects);
    assert_eq!(state.borrow().direction, Direction::Down);

    resolver.resolve(&mut scene, &[Contact::end(body, zone)], DT, &mut NullEffects);
    assert_eq!(state.borrow().direction, Direction::Down);
}

#[test]
fn gravity_zone_ignores_trailing_edge() {
    let (hero, state) = Hero::new();
    // Moving left: the probe is the left edge at x = -2, outside the zone.
    let (mut scene, body, zone) = gravity_setup(-2.0, hero, None);
    Resolver::default().resolve(&mut scene, &[Contact::begin(zone, body)], DT, &mut NullEffects);
    assert_eq!(state.borrow().direction, Direction::Up);
}

#[test]
fn gravity_zone_respects_opt_out_and_capability() {
    let (hero, state) = Hero::new();
    let (mut scene, body, zone) = gravity_setup(2.0, hero, Some(BodyLabel::NoGravityRotation));
    Resolver::default().resolve(&mut scene, &[Contact::begin(body, zone)], DT, &mut NullEffects);
    assert_eq!(state.borrow().direction, Direction::Up);

    let walker = Walker::default();
    let direction = walker.direction.clone();
    let (mut scene, body, zone) = gravity_setup(2.0, walker, None);
    Resolver::default().resolve(&mut scene, &[Contact::continuing(body, zone)], DT, &mut NullEffects);
    assert_eq!(*direction.borrow(), Direction::Down);

    let (mut scene, body, zone) = gravity_setup(2.0, Inert, None);
    let report =
        Resolver::default().resolve(&mut scene, &[Contact::begin(body, zone)], DT, &mut NullEffects);
    assert_eq!(report.failures, 0);
}

// ---------------------------------------------------------------------------
// 4. Precedence
// ---------------------------------------------------------------------------

#[test]
fn consumer_wins_over_damage() {
    let mut scene = Scene::new();
    let seen: Rc<RefCell<Vec<(ContactPhase, FixtureType)>>> = Rc::default();
    let log = seen.clone();
    let spikes = Spikes::default();
    let spike_state = spikes.state.clone();
    let trap = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(4.0, 4.0),
        vec![Fixture::rect(FixtureType::Consumer, 4.0, 4.0)
            .with_consumer(move |phase, other| log.borrow_mut().push((phase, other.kind())))],
        spikes,
    )[0];
    let (hero, state) = Hero::new();
    let victim = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(4.0, 4.0),
        vec![Fixture::rect(FixtureType::Damageable, 4.0, 4.0)],
        hero,
    )[0];

    let mut resolver = Resolver::default();
    let contacts = [
        Contact::begin(victim, trap),
        Contact::continuing(trap, victim),
        Contact::end(victim, trap),
    ];
    let report = resolver.resolve(&mut scene, &contacts, DT, &mut NullEffects);

    assert!(report.patterns().all(|p| p == RolePattern::Consumer));
    assert_eq!(
        *seen.borrow(),
        vec![
            (ContactPhase::Begin, FixtureType::Damageable),
            (ContactPhase::Continue, FixtureType::Damageable),
            (ContactPhase::End, FixtureType::Damageable),
        ]
    );
    assert_eq!(state.borrow().hits_taken, 0);
    assert_eq!(spike_state.borrow().inflicted, 0);
}

#[test]
fn two_consumers_both_hear_the_contact() {
    let mut scene = Scene::new();
    let counter: Rc<RefCell<u32>> = Rc::default();
    let (c1, c2) = (counter.clone(), counter.clone());
    let a = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(1.0, 1.0),
        vec![Fixture::rect(FixtureType::Consumer, 1.0, 1.0).with_consumer(move |_, _| *c1.borrow_mut() += 1)],
        Inert,
    )[0];
    let b = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(1.0, 1.0),
        vec![Fixture::rect(FixtureType::Consumer, 1.0, 1.0).with_consumer(move |_, _| *c2.borrow_mut() += 10)],
        Inert,
    )[0];
    Resolver::default().resolve(&mut scene, &[Contact::begin(a, b)], DT, &mut NullEffects);
    assert_eq!(*counter.borrow(), 11);
}

// ---------------------------------------------------------------------------
// 5. Damage handshake
// ---------------------------------------------------------------------------

#[test]
fn damage_requires_both_sides() {
    for (vulnerable, willing) in [(true, true), (true, false), (false, true), (false, false)] {
        let mut scene = Scene::new();
        let spikes = Spikes::default();
        let spike_state = spikes.state.clone();
        spike_state.borrow_mut().willing = willing;
        let damager = spawn(
            &mut scene,
            Vec2::ZERO,
            Vec2::new(2.0, 2.0),
            vec![Fixture::rect(FixtureType::Damager, 2.0, 2.0)],
            spikes,
        )[0];
        let (hero, state) = Hero::new();
        state.borrow_mut().invincible = !vulnerable;
        let target = spawn(
            &mut scene,
            Vec2::ZERO,
            Vec2::new(2.0, 2.0),
            vec![Fixture::rect(FixtureType::Damageable, 2.0, 2.0)],
            hero,
        )[0];

        let mut fx = RecordingEffects::default();
        let mut resolver = Resolver::default();
        resolver.resolve(&mut scene, &[Contact::begin(target, damager)], DT, &mut fx);
        resolver.resolve(&mut scene, &[Contact::continuing(target, damager)], DT, &mut fx);

        let expected = if vulnerable && willing { 2 } else { 0 };
        assert_eq!(state.borrow().hits_taken, expected, "vulnerable={vulnerable} willing={willing}");
        assert_eq!(spike_state.borrow().inflicted, expected);
        assert_eq!(fx.events_of("damage_inflicted").count(), expected as usize);
    }
}

#[test]
fn absorbed_hit_still_reaches_the_damager() {
    let mut scene = Scene::new();
    let spikes = Spikes::default();
    let spike_state = spikes.state.clone();
    spike_state.borrow_mut().willing = true;
    let damager = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(2.0, 2.0),
        vec![Fixture::rect(FixtureType::Damager, 2.0, 2.0)],
        spikes,
    )[0];
    let (hero, state) = Hero::new();
    state.borrow_mut().shielded = true;
    let target = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(2.0, 2.0),
        vec![Fixture::rect(FixtureType::Damageable, 2.0, 2.0)],
        hero,
    )[0];

    let mut fx = RecordingEffects::default();
    let report = Resolver::default().resolve(&mut scene, &[Contact::begin(damager, target)], DT, &mut fx);
    assert_eq!(report.failures, 0);
    assert_eq!(state.borrow().hits_taken, 1);
    assert_eq!(state.borrow().health, 10);
    assert_eq!(spike_state.borrow().inflicted, 1);
    assert_eq!(fx.events_of("damage_inflicted").count(), 0);
}

#[test]
fn damage_without_capability_is_a_logged_failure() {
    init_tracing();
    let mut scene = Scene::new();
    let damager = spawn_solid(&mut scene, FixtureType::Damager, Vec2::ZERO, Vec2::new(2.0, 2.0));
    let (hero, state) = Hero::new();
    let target = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(2.0, 2.0),
        vec![Fixture::rect(FixtureType::Damageable, 2.0, 2.0)],
        hero,
    )[0];
    let report =
        Resolver::default().resolve(&mut scene, &[Contact::begin(damager, target)], DT, &mut NullEffects);
    assert_eq!(report.failures, 1);
    assert_eq!(state.borrow().hits_taken, 0);
}

// ---------------------------------------------------------------------------
// 6. Self-contact
// ---------------------------------------------------------------------------

#[test]
fn self_contact_has_no_effect() {
    let mut scene = Scene::new();
    let (hero, state) = Hero::new();
    let fixtures = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(4.0, 4.0),
        vec![
            Fixture::rect(FixtureType::Feet, 4.0, 1.0),
            Fixture::rect(FixtureType::Block, 4.0, 4.0),
            Fixture::rect(FixtureType::Death, 4.0, 4.0),
            Fixture::rect(FixtureType::Damageable, 4.0, 4.0),
        ],
        hero,
    );
    let mut fx = RecordingEffects::default();
    let mut resolver = Resolver::default();
    for phase in [ContactPhase::Begin, ContactPhase::Continue, ContactPhase::End] {
        let contacts = [
            Contact::new(fixtures[0], fixtures[1], phase),
            Contact::new(fixtures[2], fixtures[3], phase),
        ];
        let report = resolver.resolve(&mut scene, &contacts, DT, &mut fx);
        assert_eq!(report.skipped_self, 2);
        assert!(report.matches.is_empty());
    }
    assert!(senses_of(&scene, fixtures[0]).is_empty());
    assert_eq!(state.borrow().health, 10);
    assert!(fx.is_empty());
    assert_eq!(resolver.active_pairs(), 0);
}

// ---------------------------------------------------------------------------
// 7. Idempotence and symmetric END
// ---------------------------------------------------------------------------

#[test]
fn continue_is_idempotent() {
    let mut scene = Scene::new();
    let (hero, _state) = Hero::new();
    let sensors = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(4.0, 8.0),
        vec![
            Fixture::rect(FixtureType::Feet, 4.0, 1.0),
            Fixture::rect(FixtureType::Head, 4.0, 1.0),
            Fixture::rect(FixtureType::Side, 1.0, 8.0).with_side(SideTag::Right),
            Fixture::rect(FixtureType::WaterListener, 4.0, 8.0),
        ],
        hero,
    );
    let block = spawn_solid(&mut scene, FixtureType::Block, Vec2::ZERO, Vec2::new(50.0, 50.0));
    let water = spawn_solid(&mut scene, FixtureType::Water, Vec2::ZERO, Vec2::new(50.0, 50.0));
    let pairs = [
        (sensors[0], block),
        (sensors[1], block),
        (sensors[2], block),
        (sensors[3], water),
    ];

    let mut resolver = Resolver::default();
    let begin: Vec<Contact> = pairs.iter().map(|&(a, b)| Contact::begin(a, b)).collect();
    resolver.resolve(&mut scene, &begin, DT, &mut NullEffects);
    let once = scene.body(sensors[0].entity).unwrap().senses().clone();

    let cont: Vec<Contact> = pairs.iter().map(|&(a, b)| Contact::continuing(a, b)).collect();
    for _ in 0..25 {
        resolver.resolve(&mut scene, &cont, DT, &mut NullEffects);
    }
    let after = scene.body(sensors[0].entity).unwrap().senses().clone();
    assert_eq!(once, after);
    for sense in after.active() {
        assert_eq!(after.contributors(sense), 1, "{sense:?}");
    }
}

#[test]
fn end_clears_exactly_its_sense() {
    let mut scene = Scene::new();
    let (hero, _state) = Hero::new();
    let sensors = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(4.0, 8.0),
        vec![
            Fixture::rect(FixtureType::Feet, 4.0, 1.0),
            Fixture::rect(FixtureType::Head, 4.0, 1.0),
            Fixture::rect(FixtureType::Side, 1.0, 8.0).with_side(SideTag::Left),
            Fixture::rect(FixtureType::WaterListener, 4.0, 8.0),
        ],
        hero,
    );
    let block = spawn_solid(&mut scene, FixtureType::Block, Vec2::ZERO, Vec2::new(50.0, 50.0));
    let ice = spawn_solid(&mut scene, FixtureType::Ice, Vec2::ZERO, Vec2::new(50.0, 50.0));
    let water = spawn_solid(&mut scene, FixtureType::Water, Vec2::ZERO, Vec2::new(50.0, 50.0));
    let ladder = spawn_solid(&mut scene, FixtureType::Ladder, Vec2::ZERO, Vec2::new(50.0, 50.0));

    let cases = [
        ((sensors[0], block), BodySense::FeetOnGround),
        ((sensors[0], ice), BodySense::FeetOnIce),
        ((sensors[0], ladder), BodySense::FeetTouchingLadder),
        ((sensors[1], block), BodySense::HeadTouchingBlock),
        ((sensors[1], ladder), BodySense::HeadTouchingLadder),
        ((block, sensors[2]), BodySense::SideTouchingBlockLeft),
        ((sensors[2], ice), BodySense::SideTouchingIceLeft),
        ((sensors[3], water), BodySense::InWater),
    ];
    let mut resolver = Resolver::default();
    let begin: Vec<Contact> = cases.iter().map(|&((a, b), _)| Contact::begin(a, b)).collect();
    resolver.resolve(&mut scene, &begin, DT, &mut NullEffects);
    assert_eq!(senses_of(&scene, sensors[0]).len(), cases.len());

    for (i, &((a, b), sense)) in cases.iter().enumerate() {
        let before = senses_of(&scene, sensors[0]);
        resolver.resolve(&mut scene, &[Contact::end(b, a)], DT, &mut NullEffects);
        let after = senses_of(&scene, sensors[0]);
        assert!(!after.contains(&sense), "{sense:?} still set");
        assert_eq!(after.len(), before.len() - 1, "END for {sense:?} touched other senses");
        assert_eq!(after.len(), cases.len() - i - 1);
    }
}

// ---------------------------------------------------------------------------
// 8. Reference counting
// ---------------------------------------------------------------------------

#[test]
fn ground_sense_survives_until_last_block_ends() {
    let mut scene = Scene::new();
    let feet = spawn(
        &mut scene,
        Vec2::new(8.0, 10.0),
        Vec2::new(4.0, 4.0),
        vec![Fixture::rect(FixtureType::Feet, 4.0, 1.0).with_offset(0.0, -2.0)],
        Inert,
    )[0];
    let left = spawn_solid(&mut scene, FixtureType::Block, Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
    let right = spawn_solid(&mut scene, FixtureType::Block, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
    let mut resolver = Resolver::default();
    let on_ground = |scene: &Scene| scene.body(feet.entity).unwrap().is_sensing(BodySense::FeetOnGround);

    resolver.resolve(
        &mut scene,
        &[Contact::begin(feet, left), Contact::begin(feet, right)],
        DT,
        &mut NullEffects,
    );
    assert_eq!(
        scene.body(feet.entity).unwrap().senses().contributors(BodySense::FeetOnGround),
        2
    );

    resolver.resolve(
        &mut scene,
        &[Contact::end(feet, left), Contact::continuing(feet, right)],
        DT,
        &mut NullEffects,
    );
    assert!(on_ground(&scene));

    resolver.resolve(&mut scene, &[Contact::end(right, feet)], DT, &mut NullEffects);
    assert!(!on_ground(&scene));
}

// ---------------------------------------------------------------------------
// 9. Failure isolation
// ---------------------------------------------------------------------------

#[test]
fn failing_hook_does_not_stop_the_tick() {
    init_tracing();
    let mut scene = Scene::new();
    let bullet = Bullet {
        jammed: true,
        ..Default::default()
    };
    let hits = bullet.hits.clone();
    let shot = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(1.0, 1.0),
        vec![Fixture::rect(FixtureType::Projectile, 1.0, 1.0)],
        bullet,
    )[0];
    let wall = spawn_solid(&mut scene, FixtureType::Block, Vec2::ZERO, Vec2::new(10.0, 10.0));
    let bouncer = spawn_solid(&mut scene, FixtureType::Bouncer, Vec2::ZERO, Vec2::new(10.0, 1.0));
    let feet = spawn(
        &mut scene,
        Vec2::ZERO,
        Vec2::new(4.0, 4.0),
        vec![Fixture::rect(FixtureType::Feet, 4.0, 1.0)],
        Inert,
    )[0];

    let contacts = [
        Contact::begin(shot, wall),
        Contact::begin(bouncer, feet),
        Contact::begin(feet, wall),
    ];
    let report = Resolver::default().resolve(&mut scene, &contacts, DT, &mut NullEffects);

    assert_eq!(report.processed, 3);
    assert_eq!(report.failures, 2);
    assert_eq!(report.matches.len(), 3);
    assert!(hits.borrow().is_empty());
    assert!(scene
        .body(feet.entity)
        .unwrap()
        .is_sensing(BodySense::FeetOnGround));
}
