use glam::Vec2;
use voidmaw::boss::{impact_damage, suction_force, suction_strength};
use voidmaw::combat::CombatPhase;
use voidmaw::config::SimConfig;
use voidmaw::constants::{BOSS_INITIAL_RADIUS, BOSS_REST_X_FRACTION, DAMAGE_THRESHOLD, FIXED_DT};
use voidmaw::events::GameEvent;
use voidmaw::physics::BodyFlags;
use voidmaw::registry::{EntityKind, RenderAttrs};
use voidmaw::Simulation;

/// Builds a simulation and drives the boss through its entry motion
/// until the state machine reports combat.
fn combat_ready_sim() -> Simulation {
    let mut sim = Simulation::new(SimConfig::default());
    assert!(sim.start_encounter(), "encounter should start from idle");
    for _ in 0..2000 {
        sim.tick(FIXED_DT);
        if sim.combat().phase() == CombatPhase::Combat {
            return sim;
        }
    }
    panic!("boss never finished its entry motion");
}

#[test]
fn suction_strictly_weakens_with_distance() {
    let mut previous = f32::INFINITY;
    for distance in [40.0, 80.0, 160.0, 320.0, 640.0] {
        let strength = suction_strength(BOSS_INITIAL_RADIUS, distance);
        assert!(
            strength < previous,
            "suction at distance {distance} should be weaker than at the previous sample"
        );
        previous = strength;
    }
}

#[test]
fn suction_always_points_at_the_center() {
    let center = Vec2::new(600.0, 400.0);
    for position in [
        Vec2::new(100.0, 100.0),
        Vec2::new(1200.0, 80.0),
        Vec2::new(600.0, 40.0),
        Vec2::new(20.0, 400.0),
    ] {
        let force = suction_force(center, position, 120.0);
        let expected = (center - position).normalize();
        let actual = force.normalize();
        assert!(
            (actual - expected).length() < 1e-4,
            "force at {position:?} should point toward the center"
        );
    }
}

#[test]
fn suction_skips_the_singularity_around_the_center() {
    let center = Vec2::new(600.0, 400.0);
    let force = suction_force(center, center + Vec2::splat(0.1), 120.0);
    assert_eq!(force, Vec2::ZERO, "bodies inside the guard radius must feel no pull");
}

#[test]
fn impact_damage_boundary_cases() {
    // mass=2 at speed 5 lands below the threshold and must be ignored.
    let soft = impact_damage(5.0, 2.0);
    assert!((soft - 0.05).abs() < 1e-6);
    assert!(soft < DAMAGE_THRESHOLD);

    // mass=4 at speed 10 crosses it and deals exactly 0.2.
    let hard = impact_damage(10.0, 4.0);
    assert!((hard - 0.2).abs() < 1e-6);
    assert!(hard > DAMAGE_THRESHOLD);
}

#[test]
fn scenery_detaches_exactly_once_at_the_threshold() {
    let mut sim = Simulation::new(SimConfig::default());
    let field = sim.config().field.clone();
    let rest = Vec2::new(field.width * BOSS_REST_X_FRACTION, field.height * 0.5);
    let near = sim.spawn_scenery_at(rest - Vec2::new(100.0, 0.0), Vec2::splat(14.0));
    let far = sim.spawn_scenery_at(rest - Vec2::new(400.0, 0.0), Vec2::splat(14.0));

    assert!(sim.start_encounter());
    let mut detach_events = 0usize;
    for _ in 0..2400 {
        for event in sim.tick(FIXED_DT) {
            if matches!(event, GameEvent::SceneryDetached { entity: Some(id) } if id == near) {
                detach_events += 1;
            }
        }
        if sim.combat().phase() == CombatPhase::Combat {
            break;
        }
    }
    assert_eq!(sim.combat().phase(), CombatPhase::Combat);

    // A few combat ticks with the field at full strength over the near body.
    for _ in 0..60 {
        for event in sim.tick(FIXED_DT) {
            if matches!(event, GameEvent::SceneryDetached { entity: Some(id) } if id == near) {
                detach_events += 1;
            }
        }
    }

    let near_body = sim.context().registry.get(near).expect("near scenery tracked").body;
    let far_body = sim.context().registry.get(far).expect("far scenery tracked").body;
    assert!(
        sim.context().physics.body(near_body).expect("near body").is_dynamic(),
        "scenery inside the detach radius must have torn loose"
    );
    assert!(
        sim.context().physics.body(far_body).expect("far body").is_fixed(),
        "scenery far outside the detach radius must stay static"
    );
    assert_eq!(detach_events, 1, "detachment must happen exactly once");
}

#[test]
fn core_contact_consumes_and_destroys_after_drain() {
    let mut sim = combat_ready_sim();
    let center = sim.boss().expect("boss alive").center();

    let id = {
        let ctx = sim.context_mut();
        let (body, _collider) =
            ctx.physics.spawn_dynamic_ball(center, 5.0, 1.0, Vec2::ZERO, BodyFlags::empty());
        let id = ctx.registry.register(EntityKind::Scripted, body, RenderAttrs::default());
        if let Some(entry) = ctx.registry.get_mut(id) {
            entry.spawned = true;
        }
        id
    };

    let mut consumed_events = 0usize;
    for _ in 0..10 {
        for event in sim.tick(FIXED_DT) {
            if matches!(event, GameEvent::ObjectConsumed { entity: Some(seen) } if seen == id) {
                consumed_events += 1;
            }
        }
    }

    assert!(sim.context().registry.get(id).is_none(), "consumed entity must leave the registry");
    assert_eq!(sim.combat().stats().objects_consumed, 1, "one body, one consumption");
    assert_eq!(consumed_events, 1, "consumption must be reported exactly once");
}

#[test]
fn fast_heavy_body_damages_the_eye() {
    let mut sim = combat_ready_sim();
    let boss_center = sim.boss().expect("boss alive").center();
    let eye = sim.boss().expect("boss alive").eye_position();
    let aim = (boss_center - eye).normalize_or_zero();

    {
        let ctx = sim.context_mut();
        let (body, _collider) =
            ctx.physics.spawn_dynamic_ball(eye, 6.0, 10.0, aim * 40.0, BodyFlags::empty());
        let id = ctx.registry.register(EntityKind::Scripted, body, RenderAttrs::default());
        if let Some(entry) = ctx.registry.get_mut(id) {
            entry.spawned = true;
        }
    }

    let mut struck = false;
    for _ in 0..20 {
        let events = sim.tick(FIXED_DT);
        if events.iter().any(|event| matches!(event, GameEvent::EyeStruck { .. })) {
            struck = true;
            break;
        }
    }

    assert!(struck, "a heavy fast body overlapping the eye should strike it");
    assert!(sim.health_value() < 100.0, "a qualifying strike must drain health");
    assert!(sim.combat().stats().total_damage_dealt > 0.0);
    assert!(sim.combat().damage_flash() > 0.0, "a qualifying strike must set the flash timer");
}

#[test]
fn ephemeral_projectile_bursts_on_the_eye() {
    let mut sim = combat_ready_sim();
    let eye = sim.boss().expect("boss alive").eye_position();

    let id = {
        let ctx = sim.context_mut();
        let (body, _collider) =
            ctx.physics.spawn_dynamic_ball(eye, 4.0, 0.0, Vec2::ZERO, BodyFlags::EPHEMERAL);
        let id = ctx.registry.register(EntityKind::Scripted, body, RenderAttrs::default());
        if let Some(entry) = ctx.registry.get_mut(id) {
            entry.spawned = true;
            entry.ephemeral = true;
        }
        id
    };

    for _ in 0..10 {
        sim.tick(FIXED_DT);
        if sim.context().registry.get(id).is_none() {
            break;
        }
    }
    assert!(
        sim.context().registry.get(id).is_none(),
        "an ephemeral body touching the eye is destroyed regardless of damage"
    );
}
