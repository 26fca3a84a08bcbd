//! Weapon damage with per-swing hit deduplication.
//!
//! Each swing has a bounded active window, opened and closed by the Attack
//! state through `WeaponWindowEvent`. Within one window a collider can be
//! damaged at most once; opening the next window resets the hit set. Contact
//! detection (Rapier) and hit routing are separate systems so the routing
//! rules stay physics-free.

use bevy::prelude::*;
use bevy::utils::HashSet;
use bevy_rapier3d::prelude::*;

use crate::core::{
    BossDamageEvent, BreakCrateEvent, CheckpointEvent, KillEnemyEvent, TriggerExplosionEvent,
    WeaponWindowEvent,
};
use crate::player::Player;

/// A raw weapon-to-collider contact, before dedup routing decides what it
/// means for the target.
#[derive(Event)]
pub struct WeaponContactEvent {
    pub target: Entity,
}

/// The player's spin-attack hit zone and its per-swing hit set.
#[derive(Component)]
pub struct WeaponDamage {
    pub active: bool,
    pub heavy: bool,
    /// Horizontal reach of the spin.
    pub reach: f32,
    hit: HashSet<Entity>,
}

impl Default for WeaponDamage {
    fn default() -> Self {
        Self {
            active: false,
            heavy: false,
            reach: 1.4,
            hit: HashSet::default(),
        }
    }
}

impl WeaponDamage {
    /// Clear the hit set for a fresh swing.
    pub fn reset_collision(&mut self) {
        self.hit.clear();
    }

    /// Record a contact. Returns true only the first time `target` is seen
    /// within the current window, and never while the window is closed.
    pub fn register_hit(&mut self, target: Entity) -> bool {
        self.active && self.hit.insert(target)
    }
}

/// Open/close the weapon window. Opening resets the hit set.
pub fn apply_weapon_window(
    mut events: EventReader<WeaponWindowEvent>,
    mut query: Query<&mut WeaponDamage>,
) {
    let Ok(mut weapon) = query.get_single_mut() else {
        return;
    };
    for event in events.read() {
        weapon.active = event.active;
        weapon.heavy = event.heavy;
        if event.active {
            weapon.reset_collision();
        }
    }
}

/// Sphere overlap around the player while the window is open; deduplicated
/// contacts become `WeaponContactEvent`s.
pub fn detect_weapon_contacts(
    rapier_context: Query<&RapierContext>,
    mut player_query: Query<(Entity, &Transform, &mut WeaponDamage), With<Player>>,
    mut contacts: EventWriter<WeaponContactEvent>,
) {
    let Ok((player_entity, transform, mut weapon)) = player_query.get_single_mut() else {
        return;
    };
    if !weapon.active {
        return;
    }
    let Ok(context) = rapier_context.get_single() else {
        return;
    };

    let shape = Collider::ball(weapon.reach);
    let center = transform.translation + Vec3::Y * 0.5;
    let mut hits = Vec::new();
    context.intersections_with_shape(
        center,
        Quat::IDENTITY,
        &shape,
        QueryFilter::default().exclude_collider(player_entity),
        |hit_entity| {
            hits.push(hit_entity);
            true
        },
    );

    for hit_entity in hits {
        if weapon.register_hit(hit_entity) {
            contacts.send(WeaponContactEvent { target: hit_entity });
        }
    }
}

/// Route deduplicated weapon contacts by target capability.
#[allow(clippy::too_many_arguments)]
pub fn route_weapon_hits(
    mut contacts: EventReader<WeaponContactEvent>,
    weapon_query: Query<&WeaponDamage>,
    bosses: Query<&Transform, With<crate::bosses::Boss>>,
    enemies: Query<(), With<crate::enemies::Enemy>>,
    crates: Query<(), With<crate::world::props::BreakableCrate>>,
    explosives: Query<(), With<crate::world::props::Explosive>>,
    checkpoints: Query<&Transform, With<crate::world::props::Checkpoint>>,
    mut boss_damage: EventWriter<BossDamageEvent>,
    mut kills: EventWriter<KillEnemyEvent>,
    mut breaks: EventWriter<BreakCrateEvent>,
    mut explosions: EventWriter<TriggerExplosionEvent>,
    mut rests: EventWriter<CheckpointEvent>,
) {
    let Ok(weapon) = weapon_query.get_single() else {
        return;
    };

    for event in contacts.read() {
        let target = event.target;
        if bosses.get(target).is_ok() {
            boss_damage.send(BossDamageEvent {
                boss: target,
                amount: 1,
            });
        } else if enemies.get(target).is_ok() {
            kills.send(KillEnemyEvent {
                target,
                heavy: weapon.heavy,
                explosion: false,
            });
        } else if explosives.get(target).is_ok() {
            explosions.send(TriggerExplosionEvent { target });
        } else if crates.get(target).is_ok() {
            breaks.send(BreakCrateEvent { target });
        } else if let Ok(transform) = checkpoints.get(target) {
            rests.send(CheckpointEvent {
                checkpoint: target,
                position: transform.translation,
            });
        }
    }
}
