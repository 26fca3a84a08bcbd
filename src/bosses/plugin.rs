//! Boss plugin - shaman loop, plant phases, projectiles, and death flow.

use bevy::prelude::*;

use super::plant::{
    plant_contact_damage, plant_spawn_minions, plant_take_hits, plant_wave_vines, vine_strikes,
};
use super::projectile::{fireball_contacts, move_fireballs};
use super::shaman::{complete_teleports, shaman_shoot_loop, shaman_take_hits};
use super::{Boss, BossAnim, BossDeathTimer};
use crate::core::{GameState, VictoryEvent};
use crate::player::PlayerSet;

pub struct BossesPlugin;

impl Plugin for BossesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                shaman_shoot_loop,
                complete_teleports,
                plant_wave_vines,
                plant_spawn_minions,
                plant_contact_damage,
                vine_strikes,
                move_fireballs,
                fireball_contacts,
                // Damage intake last, so hits landed this frame resolve after
                // the attack loops have acted on the pre-hit tuning.
                shaman_take_hits,
                plant_take_hits,
                resolve_boss_deaths,
            )
                .chain()
                .after(PlayerSet::Apply)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            PreUpdate,
            clear_boss_cues.run_if(in_state(GameState::InGame)),
        );
    }
}

/// Remove defeated bosses after the death delay and declare victory.
fn resolve_boss_deaths(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut BossDeathTimer), With<Boss>>,
    mut victories: EventWriter<VictoryEvent>,
) {
    for (entity, mut timer) in query.iter_mut() {
        timer.0.tick(time.delta());
        if timer.0.finished() {
            commands.entity(entity).despawn_recursive();
            victories.send(VictoryEvent);
        }
    }
}

/// One-shot hit cues last a full frame; reset before the next one.
fn clear_boss_cues(mut query: Query<&mut BossAnim>) {
    for mut anim in query.iter_mut() {
        anim.hit_cue = false;
    }
}
