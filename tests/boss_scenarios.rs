//! Boss encounter scenarios driven through the bosses' public state types.

use std::time::Duration;

use bevy::prelude::*;

use hazelrun::bosses::plant::{phase_for_hp, PhaseTuning, PlantBoss, PlantHit, PlantPhase};
use hazelrun::bosses::shaman::{ShamanBoss, ShamanHit};
use hazelrun::bosses::Fireball;

#[test]
fn shaman_two_hits_teleport_alternately_and_ramp_difficulty() {
    let front = Vec3::new(0.0, 0.5, 24.0);
    let back = Vec3::new(0.0, 0.5, 16.0);
    let mut boss = ShamanBoss::new(3, front, back, vec![Vec3::Y]);

    let mut speeds = vec![boss.fireball_speed];
    let mut intervals = vec![boss.shoot_interval];

    // First hit: front anchor -> back anchor.
    match boss.register_hit(1) {
        ShamanHit::Teleport { destination } => assert_eq!(destination, back),
        other => panic!("expected a teleport, got {other:?}"),
    }
    boss.complete_teleport();
    assert!(!boss.at_front);
    speeds.push(boss.fireball_speed);
    intervals.push(boss.shoot_interval);

    // Second hit: back anchor -> front anchor.
    match boss.register_hit(1) {
        ShamanHit::Teleport { destination } => assert_eq!(destination, front),
        other => panic!("expected a teleport, got {other:?}"),
    }
    boss.complete_teleport();
    assert!(boss.at_front);
    speeds.push(boss.fireball_speed);
    intervals.push(boss.shoot_interval);

    // The ramp is strictly monotonic across hits.
    assert!(speeds.windows(2).all(|w| w[1] > w[0]));
    assert!(intervals.windows(2).all(|w| w[1] < w[0]));
    assert!(!boss.defeated);
}

#[test]
fn ramped_shoot_interval_makes_the_loop_fire_sooner() {
    let mut boss = ShamanBoss::new(3, Vec3::Z, -Vec3::Z, vec![Vec3::Y]);
    let original = boss.shoot_interval;
    boss.register_hit(1);
    boss.complete_teleport();
    assert!(boss.shoot_interval < original);

    // A wait started after the hit elapses before the original interval.
    let stage = *boss.routine.stage();
    boss.routine.advance(stage, boss.shoot_interval);
    let ramped_wait = Duration::from_secs_f32(boss.shoot_interval);
    assert!(boss.routine.ready(ramped_wait));

    let mut fresh = ShamanBoss::new(3, Vec3::Z, -Vec3::Z, vec![Vec3::Y]);
    let stage = *fresh.routine.stage();
    fresh.routine.advance(stage, fresh.shoot_interval);
    assert!(!fresh.routine.ready(ramped_wait));
}

#[test]
fn defeated_shaman_stops_shooting_for_good() {
    let mut boss = ShamanBoss::new(1, Vec3::Z, -Vec3::Z, vec![Vec3::Y]);
    assert_eq!(boss.register_hit(1), ShamanHit::Defeated);
    assert!(boss.defeated);
    assert!(!boss.routine.ready(Duration::from_secs(60)));
}

#[test]
fn plant_walks_its_phases_and_never_runs_two_at_once() {
    let mut boss = PlantBoss::new(3, vec![Vec3::ZERO], "goblin");
    assert_eq!(boss.phase, PlantPhase::One);

    match boss.register_hit(1) {
        PlantHit::PhaseShift(phase) => assert_eq!(phase, PlantPhase::Two),
        other => panic!("expected a phase shift, got {other:?}"),
    }
    // The phase-two routines are live; anything from phase one is gone.
    assert!(!boss.behavior.is_cancelled());
    assert!(!boss.spawner.is_cancelled());

    let (old_behavior, old_spawner) = boss.enter_phase(PlantPhase::Three);
    assert!(old_behavior.is_cancelled());
    assert!(old_spawner.is_cancelled());
    assert_eq!(boss.phase, PlantPhase::Three);

    assert_eq!(boss.register_hit(2), PlantHit::Defeated);
    assert!(boss.behavior.is_cancelled());
    assert!(boss.spawner.is_cancelled());
}

#[test]
fn phase_mapping_matches_the_hp_thirds() {
    assert_eq!(phase_for_hp(3, 3), PlantPhase::One);
    assert_eq!(phase_for_hp(2, 3), PlantPhase::Two);
    assert_eq!(phase_for_hp(1, 3), PlantPhase::Three);

    // Larger pools partition the same way.
    assert_eq!(phase_for_hp(9, 9), PlantPhase::One);
    assert_eq!(phase_for_hp(6, 9), PlantPhase::Two);
    assert_eq!(phase_for_hp(3, 9), PlantPhase::Three);
}

#[test]
fn each_plant_phase_raises_the_stakes() {
    let tunings: Vec<PhaseTuning> = [PlantPhase::One, PlantPhase::Two, PlantPhase::Three]
        .into_iter()
        .map(PhaseTuning::for_phase)
        .collect();
    for pair in tunings.windows(2) {
        assert!(pair[1].vine_count > pair[0].vine_count);
        assert!(pair[1].minion_count >= pair[0].minion_count);
        assert!(pair[1].spawn_interval < pair[0].spawn_interval);
        assert!(pair[1].wave_interval < pair[0].wave_interval);
    }
}

#[test]
fn a_reflected_fireball_flies_back_faster_at_the_boss() {
    let mut fireball = Fireball::hostile(Vec3::new(0.0, 0.0, -1.0), 5.0, 1.0);
    assert!(fireball.hostile);

    fireball.reflect();
    assert_eq!(fireball.direction, Vec3::new(0.0, 0.0, 1.0));
    assert!(fireball.speed > 5.0);
    assert!(!fireball.hostile);

    // A second reflection is never triggered by the shield (the fireball is
    // no longer hostile), but the operation itself stays an involution on
    // direction.
    let dir = fireball.direction;
    fireball.reflect();
    assert_eq!(fireball.direction, -dir);
}
