//! The goblin shaman: a teleporting caster that ramps up as it gets hurt.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;
use std::f32::consts::PI;

use super::projectile::spawn_fireball;
use super::{Boss, BossAnim, BossDeathTimer};
use crate::core::{BossDamageEvent, Routine};
use crate::player::Player;

/// Per-hit attack ramp.
const FIREBALL_SPEED_RAMP: f32 = 1.15;
const SHOOT_INTERVAL_RAMP: f32 = 0.85;

/// Below this HP the shaman needs rest cycles between shot bursts.
const LOW_HP: i32 = 1;
const SHOTS_PER_REST: u32 = 3;
const REST_SECS: f32 = 2.5;

/// Visual lead time between the hit reaction and the reposition.
const TELEPORT_LEAD_SECS: f32 = 0.4;

/// Attempts to avoid reusing the previous spawn point before giving up.
const SPAWN_RETRIES: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShamanStage {
    Shooting,
    Waiting,
    Resting,
}

/// What one point of damage does to the shaman.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShamanHit {
    Teleport { destination: Vec3 },
    Defeated,
}

#[derive(Component)]
pub struct ShamanBoss {
    pub hp: i32,
    pub max_hp: i32,
    pub front_anchor: Vec3,
    pub back_anchor: Vec3,
    pub at_front: bool,
    pub fireball_speed: f32,
    pub shoot_interval: f32,
    /// Fireball origins, relative to the boss.
    pub spawn_offsets: Vec<Vec3>,
    pub last_spawn: Option<usize>,
    pub shots_since_rest: u32,
    pub routine: Routine<ShamanStage>,
    pub defeated: bool,
}

impl ShamanBoss {
    pub fn new(hp: i32, front_anchor: Vec3, back_anchor: Vec3, spawn_offsets: Vec<Vec3>) -> Self {
        Self {
            hp,
            max_hp: hp,
            front_anchor,
            back_anchor,
            at_front: true,
            fireball_speed: 5.0,
            shoot_interval: 1.6,
            spawn_offsets,
            last_spawn: None,
            shots_since_rest: 0,
            routine: Routine::new(ShamanStage::Shooting, 1.0),
            defeated: false,
        }
    }

    /// The anchor the next teleport lands on.
    pub fn opposite_anchor(&self) -> Vec3 {
        if self.at_front {
            self.back_anchor
        } else {
            self.front_anchor
        }
    }

    /// Pick a fireball spawn offset, avoiding the previous one with a
    /// bounded number of retries before accepting a repeat.
    pub fn pick_spawn<R: Rng>(&mut self, rng: &mut R) -> Option<Vec3> {
        if self.spawn_offsets.is_empty() {
            return None;
        }
        let mut index = rng.gen_range(0..self.spawn_offsets.len());
        for _ in 0..SPAWN_RETRIES {
            if Some(index) != self.last_spawn {
                break;
            }
            index = rng.gen_range(0..self.spawn_offsets.len());
        }
        self.last_spawn = Some(index);
        Some(self.spawn_offsets[index])
    }

    /// Apply one point of damage: either a ramped teleport or defeat.
    pub fn register_hit(&mut self, amount: i32) -> ShamanHit {
        self.hp -= amount;
        if self.hp <= 0 {
            self.defeated = true;
            self.routine.cancel();
            return ShamanHit::Defeated;
        }
        self.fireball_speed *= FIREBALL_SPEED_RAMP;
        self.shoot_interval *= SHOOT_INTERVAL_RAMP;
        ShamanHit::Teleport {
            destination: self.opposite_anchor(),
        }
    }

    /// Called once the teleport lands.
    pub fn complete_teleport(&mut self) {
        self.at_front = !self.at_front;
    }
}

/// Hit reaction in flight: lead time, then the actual reposition.
#[derive(Component)]
pub struct PendingTeleport {
    pub timer: Timer,
    pub destination: Vec3,
}

pub fn spawn_shaman(
    commands: &mut Commands,
    front_anchor: Vec3,
    back_anchor: Vec3,
    spawn_offsets: Vec<Vec3>,
) -> Entity {
    commands
        .spawn((
            Boss,
            ShamanBoss::new(3, front_anchor, back_anchor, spawn_offsets),
            BossAnim::default(),
            Transform::from_translation(front_anchor),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::capsule_y(0.6, 0.4),
        ))
        .id()
}

/// The shoot/wait loop, with rest cycles once HP is critical.
pub fn shaman_shoot_loop(
    mut commands: Commands,
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<ShamanBoss>)>,
    mut boss_query: Query<(&Transform, &mut ShamanBoss), Without<PendingTeleport>>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    for (transform, mut boss) in boss_query.iter_mut() {
        if boss.defeated || !boss.routine.ready(time.delta()) {
            continue;
        }

        match boss.routine.stage() {
            ShamanStage::Shooting => {
                let interval = boss.shoot_interval;
                let mut rng = rand::thread_rng();
                let Some(offset) = boss.pick_spawn(&mut rng) else {
                    warn!("Shaman has no fireball spawn points");
                    boss.routine.advance(ShamanStage::Waiting, interval);
                    continue;
                };
                spawn_fireball(
                    &mut commands,
                    transform.translation + offset,
                    player_transform.translation,
                    boss.fireball_speed,
                );
                boss.shots_since_rest += 1;

                if boss.hp <= LOW_HP && boss.shots_since_rest >= SHOTS_PER_REST {
                    boss.shots_since_rest = 0;
                    boss.routine.advance(ShamanStage::Resting, REST_SECS);
                } else {
                    boss.routine.advance(ShamanStage::Waiting, interval);
                }
            }
            ShamanStage::Waiting | ShamanStage::Resting => {
                boss.routine.advance(ShamanStage::Shooting, 0.0);
            }
        }
    }
}

/// Apply weapon and reflected-fireball damage to the shaman.
pub fn shaman_take_hits(
    mut commands: Commands,
    mut damage_events: EventReader<BossDamageEvent>,
    mut boss_query: Query<(&mut ShamanBoss, &mut BossAnim)>,
) {
    for event in damage_events.read() {
        let Ok((mut boss, mut anim)) = boss_query.get_mut(event.boss) else {
            continue;
        };
        if boss.defeated {
            continue;
        }

        anim.hit_cue = true;

        match boss.register_hit(event.amount) {
            ShamanHit::Defeated => {
                anim.dead = true;
                info!("Shaman defeated");
                commands
                    .entity(event.boss)
                    .remove::<Collider>()
                    .insert(BossDeathTimer::default());
            }
            ShamanHit::Teleport { destination } => {
                // Colliders stay off until the teleport lands.
                commands
                    .entity(event.boss)
                    .remove::<Collider>()
                    .insert(PendingTeleport {
                        timer: Timer::from_seconds(TELEPORT_LEAD_SECS, TimerMode::Once),
                        destination,
                    });
            }
        }
    }
}

/// Land pending teleports: move to the anchor and flip facing.
pub fn complete_teleports(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut ShamanBoss, &mut PendingTeleport)>,
) {
    for (entity, mut transform, mut boss, mut pending) in query.iter_mut() {
        pending.timer.tick(time.delta());
        if !pending.timer.finished() {
            continue;
        }

        transform.translation = pending.destination;
        transform.rotate_y(PI);
        boss.complete_teleport();

        commands
            .entity(entity)
            .remove::<PendingTeleport>()
            .insert(Collider::capsule_y(0.6, 0.4));
    }
}
