//! Interactive props: crates, explosives, jump pads, checkpoints, coins.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::core::{
    store_session, BreakCrateEvent, CheckpointEvent, CoinCollectedEvent, GameSession,
    KillEnemyEvent, PlayerDamageEvent, RewardEvent, StompedEvent, TriggerExplosionEvent, SAVE_PATH,
};
use crate::enemies::Enemy;
use crate::player::{Player, PlayerHealth};

/// How far from a coin the player can pick it up.
const COIN_PICKUP_RADIUS: f32 = 0.8;

/// Something the player can bounce off by landing on it.
#[derive(Component, Clone, Copy, Debug)]
pub struct Stompable {
    /// Upward launch force handed to the player on landing.
    pub bounce_force: f32,
    /// Multiplier applied when jump is held at the moment of landing.
    pub jump_boost: f32,
    /// Whether the stomp also destroys the target. Jump pads set false.
    pub breaks: bool,
}

impl Default for Stompable {
    fn default() -> Self {
        Self {
            bounce_force: 9.0,
            jump_boost: 1.5,
            breaks: true,
        }
    }
}

/// A crate that shatters on a weapon hit or a stomp.
///
/// The consumed flag makes the break path fire at most once even when a
/// stomp and a weapon hit land on the same frame.
#[derive(Component, Default)]
pub struct BreakableCrate {
    pub consumed: bool,
}

/// A barrel that detonates when struck, killing everything nearby.
#[derive(Component)]
pub struct Explosive {
    pub consumed: bool,
    pub radius: f32,
}

impl Default for Explosive {
    fn default() -> Self {
        Self {
            consumed: false,
            radius: 3.5,
        }
    }
}

/// Rest point: heals the player and records the respawn position.
#[derive(Component, Default)]
pub struct Checkpoint {
    pub activated: bool,
}

/// A pickup dropped by rewards or placed in the level.
#[derive(Component, Default)]
pub struct Coin {
    pub consumed: bool,
}

pub fn spawn_crate(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            BreakableCrate::default(),
            Stompable::default(),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cuboid(0.5, 0.5, 0.5),
        ))
        .id()
}

pub fn spawn_explosive(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            Explosive::default(),
            Stompable::default(),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cylinder(0.6, 0.4),
        ))
        .id()
}

/// A jump pad is a stompable that never breaks and launches harder.
pub fn spawn_jump_pad(commands: &mut Commands, position: Vec3, launch_force: f32) -> Entity {
    commands
        .spawn((
            Stompable {
                bounce_force: launch_force,
                jump_boost: 1.5,
                breaks: false,
            },
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cylinder(0.2, 0.8),
        ))
        .id()
}

pub fn spawn_checkpoint(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            Checkpoint::default(),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cuboid(0.4, 1.0, 0.4),
        ))
        .id()
}

pub fn spawn_coin(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            Coin::default(),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
        ))
        .id()
}

/// Route stomps on props: breakable targets take the break path, jump pads
/// just bounce. Enemy stomps are resolved by the enemy module.
pub fn handle_prop_stomps(
    mut stomp_events: EventReader<StompedEvent>,
    stompables: Query<&Stompable>,
    crates: Query<(), With<BreakableCrate>>,
    explosives: Query<(), With<Explosive>>,
    mut breaks: EventWriter<BreakCrateEvent>,
    mut explosions: EventWriter<TriggerExplosionEvent>,
) {
    for event in stomp_events.read() {
        let Ok(stompable) = stompables.get(event.target) else {
            continue;
        };
        if !stompable.breaks {
            continue;
        }
        if explosives.get(event.target).is_ok() {
            explosions.send(TriggerExplosionEvent {
                target: event.target,
            });
        } else if crates.get(event.target).is_ok() {
            breaks.send(BreakCrateEvent {
                target: event.target,
            });
        }
    }
}

/// Break crates: one reward, one destruction, no matter how many break
/// requests landed this frame.
pub fn handle_crate_breaks(
    mut commands: Commands,
    mut break_events: EventReader<BreakCrateEvent>,
    mut crates: Query<(&Transform, &mut BreakableCrate)>,
    mut rewards: EventWriter<RewardEvent>,
) {
    for event in break_events.read() {
        let Ok((transform, mut broken)) = crates.get_mut(event.target) else {
            continue;
        };
        if broken.consumed {
            continue;
        }
        broken.consumed = true;

        rewards.send(RewardEvent {
            position: transform.translation,
        });
        commands.entity(event.target).despawn_recursive();
    }
}

/// Detonate explosives: kill everything in the blast radius (armored enemies
/// included), hurt a close player, and chain into nearby props.
#[allow(clippy::too_many_arguments)]
pub fn handle_explosions(
    mut commands: Commands,
    mut explosion_events: EventReader<TriggerExplosionEvent>,
    mut explosives: Query<(Entity, &Transform, &mut Explosive)>,
    enemies: Query<(Entity, &Transform), With<Enemy>>,
    crates: Query<(Entity, &Transform), With<BreakableCrate>>,
    player_query: Query<(Entity, &Transform), With<Player>>,
    mut kills: EventWriter<KillEnemyEvent>,
    mut breaks: EventWriter<BreakCrateEvent>,
    mut player_damage: EventWriter<PlayerDamageEvent>,
    mut chain: EventWriter<TriggerExplosionEvent>,
) {
    for event in explosion_events.read() {
        let Ok((_, transform, mut explosive)) = explosives.get_mut(event.target) else {
            continue;
        };
        if explosive.consumed {
            continue;
        }
        explosive.consumed = true;

        let center = transform.translation;
        let radius = explosive.radius;
        info!("Explosion at {:?}", center);

        for (enemy, enemy_transform) in enemies.iter() {
            if enemy_transform.translation.distance(center) <= radius {
                kills.send(KillEnemyEvent {
                    target: enemy,
                    heavy: false,
                    explosion: true,
                });
            }
        }

        for (crate_entity, crate_transform) in crates.iter() {
            if crate_transform.translation.distance(center) <= radius {
                breaks.send(BreakCrateEvent {
                    target: crate_entity,
                });
            }
        }

        // Chain to other barrels caught in the blast; their detonation
        // resolves on the next frame's events.
        for (other, other_transform, other_explosive) in explosives.iter() {
            if other != event.target
                && !other_explosive.consumed
                && other_transform.translation.distance(center) <= radius
            {
                chain.send(TriggerExplosionEvent { target: other });
            }
        }

        if let Ok((_, player_transform)) = player_query.get_single() {
            if player_transform.translation.distance(center) <= radius {
                player_damage.send(PlayerDamageEvent {
                    source: event.target,
                    source_pos: center,
                    amount: 1.0,
                });
            }
        }

        commands.entity(event.target).despawn_recursive();
    }
}

/// Activate checkpoints: heal the player, remember the respawn point, and
/// write the session to disk.
pub fn handle_checkpoints(
    mut checkpoint_events: EventReader<CheckpointEvent>,
    mut checkpoints: Query<&mut Checkpoint>,
    mut player_query: Query<&mut PlayerHealth, With<Player>>,
    mut session: ResMut<GameSession>,
) {
    for event in checkpoint_events.read() {
        if let Ok(mut checkpoint) = checkpoints.get_mut(event.checkpoint) {
            checkpoint.activated = true;
        }

        if let Ok(mut health) = player_query.get_single_mut() {
            health.heal_full();
        }

        session.checkpoint = Some(event.position);
        match store_session(SAVE_PATH, &session.to_save()) {
            Ok(()) => info!("Checkpoint saved at {:?}", event.position),
            Err(e) => error!("Failed to save session: {}", e),
        }
    }
}

/// Destroyed props and enemies drop a coin at their position.
pub fn spawn_rewards(mut commands: Commands, mut reward_events: EventReader<RewardEvent>) {
    for event in reward_events.read() {
        spawn_coin(&mut commands, event.position + Vec3::Y * 0.5);
    }
}

/// Collect coins the player walks over.
pub fn pick_up_coins(
    mut commands: Commands,
    player_query: Query<&Transform, With<Player>>,
    mut coins: Query<(Entity, &Transform, &mut Coin), Without<Player>>,
    mut collected: EventWriter<CoinCollectedEvent>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    for (entity, transform, mut coin) in coins.iter_mut() {
        if coin.consumed {
            continue;
        }
        if player_transform.translation.distance(transform.translation) <= COIN_PICKUP_RADIUS {
            coin.consumed = true;
            collected.send(CoinCollectedEvent);
            commands.entity(entity).despawn_recursive();
        }
    }
}
