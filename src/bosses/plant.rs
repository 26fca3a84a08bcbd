//! The giant plant: a three-phase arena boss driving vines and minion waves.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::{Boss, BossAnim, BossDeathTimer};
use crate::core::{BossDamageEvent, PlayerDamageEvent, Routine};
use crate::enemies::{spawn_enemy, EnemyRegistry};
use crate::player::Player;

/// HP-driven phase, split into thirds of max HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlantPhase {
    One,
    Two,
    Three,
}

/// Map remaining HP to a phase: full third = One, middle = Two, last = Three.
pub fn phase_for_hp(hp: i32, max_hp: i32) -> PlantPhase {
    if hp * 3 > max_hp * 2 {
        PlantPhase::One
    } else if hp * 3 > max_hp {
        PlantPhase::Two
    } else {
        PlantPhase::Three
    }
}

/// Per-phase tuning: how many vines rise and how minions trickle in.
#[derive(Clone, Copy, Debug)]
pub struct PhaseTuning {
    pub vine_count: usize,
    pub minion_count: usize,
    pub spawn_interval: f32,
    pub wave_interval: f32,
}

impl PhaseTuning {
    pub fn for_phase(phase: PlantPhase) -> Self {
        match phase {
            PlantPhase::One => Self {
                vine_count: 2,
                minion_count: 1,
                spawn_interval: 8.0,
                wave_interval: 3.0,
            },
            PlantPhase::Two => Self {
                vine_count: 4,
                minion_count: 2,
                spawn_interval: 6.0,
                wave_interval: 2.2,
            },
            PlantPhase::Three => Self {
                vine_count: 6,
                minion_count: 3,
                spawn_interval: 4.5,
                wave_interval: 1.6,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VineStage {
    Extended,
    Retracted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnStage {
    Spawning,
    Waiting,
}

/// What one point of damage does to the plant.
#[derive(Debug, PartialEq)]
pub enum PlantHit {
    Staggered,
    PhaseShift(PlantPhase),
    Defeated,
}

#[derive(Component)]
pub struct PlantBoss {
    pub hp: i32,
    pub max_hp: i32,
    pub phase: PlantPhase,
    /// Vine wave choreography for the current phase.
    pub behavior: Routine<VineStage>,
    /// Minion trickle for the current phase.
    pub spawner: Routine<SpawnStage>,
    /// Anchor points vines can rise from, in rising-phase order.
    pub vine_slots: Vec<Vec3>,
    /// Registry key of the minion definition this boss summons.
    pub minion_type: String,
    pub contact_range: f32,
    pub contact_damage: f32,
    pub contact_cooldown: Timer,
    pub defeated: bool,
}

impl PlantBoss {
    pub fn new(hp: i32, vine_slots: Vec<Vec3>, minion_type: impl Into<String>) -> Self {
        let tuning = PhaseTuning::for_phase(PlantPhase::One);
        Self {
            hp,
            max_hp: hp,
            phase: PlantPhase::One,
            behavior: Routine::new(VineStage::Retracted, tuning.wave_interval),
            spawner: Routine::new(SpawnStage::Spawning, tuning.spawn_interval),
            vine_slots,
            minion_type: minion_type.into(),
            contact_range: 2.5,
            contact_damage: 1.0,
            contact_cooldown: Timer::from_seconds(1.5, TimerMode::Once),
            defeated: false,
        }
    }

    pub fn tuning(&self) -> PhaseTuning {
        PhaseTuning::for_phase(self.phase)
    }

    /// Switch phases: the superseded routines are cancelled before the new
    /// ones start, and handed back so nothing can keep driving them.
    pub fn enter_phase(&mut self, phase: PlantPhase) -> (Routine<VineStage>, Routine<SpawnStage>) {
        self.behavior.cancel();
        self.spawner.cancel();
        let tuning = PhaseTuning::for_phase(phase);
        self.phase = phase;
        let old_behavior = std::mem::replace(
            &mut self.behavior,
            Routine::new(VineStage::Retracted, tuning.wave_interval),
        );
        let old_spawner = std::mem::replace(
            &mut self.spawner,
            Routine::new(SpawnStage::Spawning, tuning.spawn_interval),
        );
        (old_behavior, old_spawner)
    }

    /// Apply one point of damage.
    pub fn register_hit(&mut self, amount: i32) -> PlantHit {
        self.hp -= amount;
        if self.hp <= 0 {
            self.defeated = true;
            self.behavior.cancel();
            self.spawner.cancel();
            return PlantHit::Defeated;
        }
        let phase = phase_for_hp(self.hp, self.max_hp);
        if phase != self.phase {
            self.enter_phase(phase);
            PlantHit::PhaseShift(phase)
        } else {
            PlantHit::Staggered
        }
    }
}

/// A vine trigger raised by the plant. Damages the player while extended.
#[derive(Component)]
pub struct Vine {
    pub owner: Entity,
    pub extended: bool,
    pub radius: f32,
    pub damage: f32,
    pub strike_cooldown: Timer,
}

impl Vine {
    fn new(owner: Entity) -> Self {
        Self {
            owner,
            extended: false,
            radius: 1.2,
            damage: 1.0,
            strike_cooldown: Timer::from_seconds(1.0, TimerMode::Once),
        }
    }
}

pub fn spawn_plant(
    commands: &mut Commands,
    position: Vec3,
    vine_slots: Vec<Vec3>,
    minion_type: impl Into<String>,
) -> Entity {
    let boss = PlantBoss::new(3, vine_slots, minion_type);
    let entity = commands
        .spawn((
            Boss,
            BossAnim::default(),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cylinder(1.5, 1.2),
        ))
        .id();
    sync_vines(commands, entity, &boss);
    commands.entity(entity).insert(boss);
    entity
}

/// Replace the plant's vines with the current phase's subset.
fn sync_vines(commands: &mut Commands, plant: Entity, boss: &PlantBoss) {
    let count = boss.tuning().vine_count.min(boss.vine_slots.len());
    for slot in boss.vine_slots.iter().take(count) {
        commands.spawn((
            Vine::new(plant),
            Transform::from_translation(*slot),
            GlobalTransform::default(),
            Visibility::default(),
        ));
    }
}

/// Apply damage to the plant: stagger, phase shift, or death.
pub fn plant_take_hits(
    mut commands: Commands,
    mut damage_events: EventReader<BossDamageEvent>,
    mut boss_query: Query<(&mut PlantBoss, &mut BossAnim)>,
    vines: Query<(Entity, &Vine)>,
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
            PlantHit::Staggered => {}
            PlantHit::PhaseShift(phase) => {
                info!("Plant boss entering {:?}", phase);
                for (vine_entity, vine) in vines.iter() {
                    if vine.owner == event.boss {
                        commands.entity(vine_entity).despawn_recursive();
                    }
                }
                sync_vines(&mut commands, event.boss, &boss);
            }
            PlantHit::Defeated => {
                anim.dead = true;
                info!("Plant boss defeated");
                for (vine_entity, vine) in vines.iter() {
                    if vine.owner == event.boss {
                        commands.entity(vine_entity).despawn_recursive();
                    }
                }
                commands
                    .entity(event.boss)
                    .remove::<Collider>()
                    .insert(BossDeathTimer::default());
            }
        }
    }
}

/// Drive the vine wave: all of the plant's vines extend and retract together
/// on the phase's interval.
pub fn plant_wave_vines(
    time: Res<Time>,
    mut boss_query: Query<(Entity, &mut PlantBoss)>,
    mut vines: Query<&mut Vine>,
) {
    for (plant, mut boss) in boss_query.iter_mut() {
        if boss.defeated || !boss.behavior.ready(time.delta()) {
            continue;
        }

        let interval = boss.tuning().wave_interval;
        let next = match boss.behavior.stage() {
            VineStage::Retracted => VineStage::Extended,
            VineStage::Extended => VineStage::Retracted,
        };
        boss.behavior.advance(next, interval);

        for mut vine in vines.iter_mut() {
            if vine.owner == plant {
                vine.extended = next == VineStage::Extended;
            }
        }
    }
}

/// Minion trickle: each phase summons its own batch on its own interval.
pub fn plant_spawn_minions(
    mut commands: Commands,
    time: Res<Time>,
    registry: Res<EnemyRegistry>,
    mut boss_query: Query<(&Transform, &mut PlantBoss)>,
) {
    for (transform, mut boss) in boss_query.iter_mut() {
        if boss.defeated || !boss.spawner.ready(time.delta()) {
            continue;
        }

        match boss.spawner.stage() {
            SpawnStage::Spawning => {
                let tuning = boss.tuning();
                if let Some(definition) = registry.get(&boss.minion_type) {
                    for i in 0..tuning.minion_count {
                        let angle = i as f32 / tuning.minion_count as f32 * std::f32::consts::TAU;
                        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * 3.0;
                        spawn_enemy(
                            &mut commands,
                            definition,
                            transform.translation + offset,
                            Vec::new(),
                        );
                    }
                } else {
                    warn!("Unknown plant minion type '{}'", boss.minion_type);
                }
                boss.spawner.advance(SpawnStage::Waiting, tuning.spawn_interval);
            }
            SpawnStage::Waiting => {
                boss.spawner.advance(SpawnStage::Spawning, 0.0);
            }
        }
    }
}

/// Periodic close-range contact damage, independent of phase.
pub fn plant_contact_damage(
    time: Res<Time>,
    player_query: Query<&Transform, (With<Player>, Without<PlantBoss>)>,
    mut boss_query: Query<(Entity, &Transform, &mut PlantBoss), Without<Player>>,
    mut damage_events: EventWriter<PlayerDamageEvent>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    for (entity, transform, mut boss) in boss_query.iter_mut() {
        if boss.defeated {
            continue;
        }
        boss.contact_cooldown.tick(time.delta());

        let distance = player_transform.translation.distance(transform.translation);
        if distance <= boss.contact_range && boss.contact_cooldown.finished() {
            damage_events.send(PlayerDamageEvent {
                source: entity,
                source_pos: transform.translation,
                amount: boss.contact_damage,
            });
            boss.contact_cooldown.reset();
        }
    }
}

/// Extended vines strike the player on their own cooldown.
pub fn vine_strikes(
    time: Res<Time>,
    player_query: Query<&Transform, With<Player>>,
    mut vines: Query<(Entity, &Transform, &mut Vine), Without<Player>>,
    mut damage_events: EventWriter<PlayerDamageEvent>,
) {
    let Ok(player_transform) = player_query.get_single() else {
        return;
    };

    for (entity, transform, mut vine) in vines.iter_mut() {
        vine.strike_cooldown.tick(time.delta());
        if !vine.extended || !vine.strike_cooldown.finished() {
            continue;
        }
        if player_transform.translation.distance(transform.translation) <= vine.radius {
            damage_events.send(PlayerDamageEvent {
                source: entity,
                source_pos: transform.translation,
                amount: vine.damage,
            });
            vine.strike_cooldown.reset();
        }
    }
}
