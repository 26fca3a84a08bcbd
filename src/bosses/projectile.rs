//! Boss fireballs: straight-line projectiles the shield can send back.

use bevy::prelude::*;

use super::Boss;
use crate::core::{BossDamageEvent, PlayerDamageEvent};
use crate::player::{Player, ShieldActive};

/// How close a fireball must get to count as a hit.
const CONTACT_RADIUS: f32 = 0.7;

/// Speed multiplier applied when the shield sends a fireball back.
const REFLECT_BOOST: f32 = 1.5;

/// A boss projectile travelling in a straight line until it hits or expires.
#[derive(Component, Clone, Debug)]
pub struct Fireball {
    pub direction: Vec3,
    pub speed: f32,
    /// Hostile fireballs hurt the player; reflected ones hurt bosses.
    pub hostile: bool,
    pub damage: f32,
    pub lifetime: Timer,
}

impl Fireball {
    pub fn hostile(direction: Vec3, speed: f32, damage: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            speed,
            hostile: true,
            damage,
            lifetime: Timer::from_seconds(6.0, TimerMode::Once),
        }
    }

    /// Shield deflection: reverse course, speed up, and switch sides.
    pub fn reflect(&mut self) {
        self.direction = -self.direction;
        self.speed *= REFLECT_BOOST;
        self.hostile = false;
        self.lifetime.reset();
    }
}

/// Spawn a fireball flying from `origin` toward `target`.
pub fn spawn_fireball(commands: &mut Commands, origin: Vec3, target: Vec3, speed: f32) -> Entity {
    commands
        .spawn((
            Fireball::hostile(target - origin, speed, 1.0),
            Transform::from_translation(origin),
            GlobalTransform::default(),
            Visibility::default(),
        ))
        .id()
}

/// Advance fireballs and expire the ones that never hit anything.
pub fn move_fireballs(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut Fireball)>,
) {
    for (entity, mut transform, mut fireball) in query.iter_mut() {
        transform.translation += fireball.direction * fireball.speed * time.delta_secs();

        fireball.lifetime.tick(time.delta());
        if fireball.lifetime.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Resolve fireball contacts: hostile ones against the player (or the raised
/// shield), reflected ones against bosses.
pub fn fireball_contacts(
    mut commands: Commands,
    mut fireballs: Query<(Entity, &Transform, &mut Fireball)>,
    player_query: Query<(&Transform, &ShieldActive), With<Player>>,
    boss_query: Query<(Entity, &Transform), With<Boss>>,
    mut player_damage: EventWriter<PlayerDamageEvent>,
    mut boss_damage: EventWriter<BossDamageEvent>,
) {
    for (entity, transform, mut fireball) in fireballs.iter_mut() {
        let position = transform.translation;

        if fireball.hostile {
            let Ok((player_transform, shield)) = player_query.get_single() else {
                continue;
            };
            if position.distance(player_transform.translation) > CONTACT_RADIUS {
                continue;
            }
            if shield.0 {
                fireball.reflect();
            } else {
                player_damage.send(PlayerDamageEvent {
                    source: entity,
                    source_pos: position,
                    amount: fireball.damage,
                });
                commands.entity(entity).despawn_recursive();
            }
        } else {
            for (boss_entity, boss_transform) in boss_query.iter() {
                if position.distance(boss_transform.translation) <= CONTACT_RADIUS {
                    boss_damage.send(BossDamageEvent {
                        boss: boss_entity,
                        amount: 1,
                    });
                    commands.entity(entity).despawn_recursive();
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_reverses_and_accelerates() {
        let mut fireball = Fireball::hostile(Vec3::Z, 4.0, 1.0);
        fireball.reflect();
        assert_eq!(fireball.direction, -Vec3::Z);
        assert!(fireball.speed > 4.0);
        assert!(!fireball.hostile);
    }

    #[test]
    fn hostile_constructor_normalizes_direction() {
        let fireball = Fireball::hostile(Vec3::new(0.0, 0.0, 10.0), 4.0, 1.0);
        assert!((fireball.direction.length() - 1.0).abs() < 1e-6);
    }
}
