//! Enemy behavior systems: detection, patrol, ambush, attack, death.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use super::data::{BehaviorKind, EnemyDefinition};
use crate::core::{KillEnemyEvent, PlayerDamageEvent, RewardEvent, StompedEvent};
use crate::player::Player;
use crate::world::props::Stompable;

/// Spawn one enemy from its definition.
pub fn spawn_enemy(
    commands: &mut Commands,
    definition: &EnemyDefinition,
    position: Vec3,
    waypoints: Vec<Vec3>,
) -> Entity {
    let behavior = match definition.behavior {
        BehaviorKind::Stationary => EnemyBehavior::Stationary,
        BehaviorKind::Patrol => EnemyBehavior::patrol(waypoints, definition.patrol_pause),
        BehaviorKind::Ambush => EnemyBehavior::ambush(definition.ambush_cooldown),
    };

    commands
        .spawn((
            Enemy,
            definition.to_stats(),
            AiState::default(),
            behavior,
            AttackTimer(Timer::from_seconds(
                definition.attack_cooldown,
                TimerMode::Once,
            )),
            ResumeTimer::default(),
            EnemyAnim::default(),
            // Landing on an enemy bounces the player; the stomp event then
            // runs through the same kill rules as a light hit.
            Stompable::default(),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::capsule_y(0.5, 0.3),
        ))
        .id()
}

/// Horizontal distance between two positions.
fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(a.x - b.x, 0.0, a.z - b.z).length()
}

/// Rotate an enemy to face the player around the Y axis.
fn face_player(enemy_transform: &mut Transform, player_pos: Vec3) {
    let look_target = Vec3::new(player_pos.x, enemy_transform.translation.y, player_pos.z);
    if (look_target - enemy_transform.translation).length_squared() > 1e-6 {
        enemy_transform.look_at(look_target, Vec3::Y);
    }
}

/// Detection-range state transitions, with a resume delay on the way out so
/// patrol does not flap at the boundary.
pub fn detect_player(
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<
        (&Transform, &EnemyStats, &mut AiState, &mut ResumeTimer),
        (With<Enemy>, Without<Player>),
    >,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    for (enemy_transform, stats, mut ai_state, mut resume) in enemy_query.iter_mut() {
        if *ai_state == AiState::Dying {
            continue;
        }

        let distance = planar_distance(
            player_transform.translation,
            enemy_transform.translation,
        );

        match *ai_state {
            AiState::Calm => {
                if distance <= stats.detection_range {
                    *ai_state = AiState::Alert;
                    resume.0.reset();
                }
            }
            AiState::Alert => {
                // Hysteresis buffer, then a delay before patrol resumes.
                if distance > stats.detection_range * 1.2 {
                    resume.0.tick(time.delta());
                    if resume.0.finished() {
                        *ai_state = AiState::Calm;
                    }
                } else {
                    resume.0.reset();
                }
            }
            AiState::Dying => {}
        }
    }
}

/// Walk patrol waypoints while calm; the routine is simply not ticked while
/// the enemy is alert, which is what suspends it.
pub fn patrol_move(
    time: Res<Time>,
    mut enemy_query: Query<(&mut Transform, &EnemyStats, &AiState, &mut EnemyBehavior), With<Enemy>>,
) {
    for (mut transform, stats, ai_state, mut behavior) in enemy_query.iter_mut() {
        if *ai_state != AiState::Calm {
            continue;
        }
        let EnemyBehavior::Patrol {
            waypoints,
            next,
            routine,
            pause_secs,
        } = &mut *behavior
        else {
            continue;
        };
        if waypoints.is_empty() {
            continue;
        }

        if !routine.ready(time.delta()) {
            continue;
        }

        match routine.stage() {
            PatrolStage::Walking => {
                let target = waypoints[*next];
                let to_target = Vec3::new(
                    target.x - transform.translation.x,
                    0.0,
                    target.z - transform.translation.z,
                );
                let distance = to_target.length();

                if distance < 0.2 {
                    routine.advance(PatrolStage::Pausing, *pause_secs);
                    *next = (*next + 1) % waypoints.len();
                } else {
                    let step = to_target.normalize() * stats.move_speed * time.delta_secs();
                    transform.translation += step.clamp_length_max(distance);
                    let facing = transform.translation + to_target;
                    transform.look_at(facing, Vec3::Y);
                }
            }
            PatrolStage::Pausing => {
                routine.advance(PatrolStage::Walking, 0.0);
            }
        }
    }
}

/// Ambushers close distance while alert, except during the post-attack
/// movement cooldown.
pub fn ambush_close(
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<
        (&mut Transform, &EnemyStats, &AiState, &mut EnemyBehavior),
        (With<Enemy>, Without<Player>),
    >,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    for (mut transform, stats, ai_state, mut behavior) in enemy_query.iter_mut() {
        if *ai_state != AiState::Alert {
            continue;
        }
        let EnemyBehavior::Ambush { move_cooldown } = &mut *behavior else {
            continue;
        };

        move_cooldown.tick(time.delta());
        if !move_cooldown.finished() {
            continue;
        }

        let player_pos = player_transform.translation;
        let distance = planar_distance(player_pos, transform.translation);
        if distance <= stats.attack_range {
            continue;
        }

        let direction = Vec3::new(
            player_pos.x - transform.translation.x,
            0.0,
            player_pos.z - transform.translation.z,
        )
        .normalize_or_zero();
        transform.translation += direction * stats.move_speed * time.delta_secs();
        face_player(&mut transform, player_pos);
    }
}

/// Face and attack the player while in range, gated by the cooldown timer.
pub fn enemy_attack(
    time: Res<Time>,
    player_query: Query<(Entity, &Transform), (With<Player>, Without<Enemy>)>,
    mut enemy_query: Query<
        (
            Entity,
            &mut Transform,
            &EnemyStats,
            &AiState,
            &mut AttackTimer,
            &mut EnemyAnim,
            &mut EnemyBehavior,
        ),
        (With<Enemy>, Without<Player>),
    >,
    mut damage_events: EventWriter<PlayerDamageEvent>,
) {
    let Ok((_player_entity, player_transform)) = player_query.get_single() else {
        return;
    };

    for (entity, mut transform, stats, ai_state, mut attack_timer, mut anim, mut behavior) in
        enemy_query.iter_mut()
    {
        if *ai_state == AiState::Dying {
            continue;
        }

        let player_pos = player_transform.translation;
        let distance = planar_distance(player_pos, transform.translation);

        if distance > stats.attack_range {
            anim.attacking = false;
            continue;
        }

        face_player(&mut transform, player_pos);
        anim.attacking = true;

        attack_timer.0.tick(time.delta());
        if attack_timer.0.finished() {
            damage_events.send(PlayerDamageEvent {
                source: entity,
                source_pos: transform.translation,
                amount: stats.damage,
            });
            attack_timer
                .0
                .set_duration(std::time::Duration::from_secs_f32(stats.attack_cooldown));
            attack_timer.0.reset();

            // Ambushers hold position briefly after striking.
            if let EnemyBehavior::Ambush { move_cooldown } = &mut *behavior {
                move_cooldown.reset();
            }
        }
    }
}

/// What a kill attempt does to an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KillOutcome {
    /// Armored target shrugs the hit off with a deflect feedback.
    Deflect,
    Die,
}

/// Armored enemies only die to heavy attacks or explosions.
pub fn kill_outcome(armored: bool, heavy: bool, explosion: bool) -> KillOutcome {
    if armored && !heavy && !explosion {
        KillOutcome::Deflect
    } else {
        KillOutcome::Die
    }
}

/// Resolve kill attempts from weapons, stomps and explosions.
pub fn resolve_kill_attempts(
    mut commands: Commands,
    mut kill_events: EventReader<KillEnemyEvent>,
    mut stomp_events: EventReader<StompedEvent>,
    mut enemy_query: Query<
        (&Transform, &EnemyStats, &mut AiState, &mut EnemyAnim),
        With<Enemy>,
    >,
    mut rewards: EventWriter<RewardEvent>,
) {
    // A stomp is a plain, non-heavy kill attempt.
    let attempts = kill_events
        .read()
        .map(|e| (e.target, e.heavy, e.explosion))
        .chain(stomp_events.read().map(|e| (e.target, false, false)))
        .collect::<Vec<_>>();

    for (target, heavy, explosion) in attempts {
        let Ok((transform, stats, mut ai_state, mut anim)) = enemy_query.get_mut(target) else {
            continue;
        };
        // Already dying: the Dying state is the consumed flag here.
        if *ai_state == AiState::Dying {
            continue;
        }

        match kill_outcome(stats.armored, heavy, explosion) {
            KillOutcome::Deflect => {
                anim.deflect_cue = true;
            }
            KillOutcome::Die => {
                *ai_state = AiState::Dying;
                anim.dead = true;
                anim.attacking = false;
                rewards.send(RewardEvent {
                    position: transform.translation,
                });
                // Disable collision so the corpse cannot hurt or be hit.
                commands
                    .entity(target)
                    .remove::<Collider>()
                    .insert(DeathTimer::default());
            }
        }
    }
}

/// Clear one-shot deflect cues after the animation side had a frame to see
/// them.
pub fn clear_deflect_cues(mut query: Query<&mut EnemyAnim, With<Enemy>>) {
    for mut anim in query.iter_mut() {
        anim.deflect_cue = false;
    }
}

/// Despawn enemies once the death animation has played out.
pub fn despawn_dead_enemies(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut DeathTimer)>,
) {
    for (entity, mut death_timer) in query.iter_mut() {
        death_timer.0.tick(time.delta());

        if death_timer.0.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}
