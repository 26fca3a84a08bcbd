//! Enemy plugin - detection, movement, attacks and death resolution.

use bevy::prelude::*;

use super::data::{load_enemy_definitions, EnemyRegistry};
use super::systems::{
    ambush_close, clear_deflect_cues, despawn_dead_enemies, detect_player, enemy_attack,
    patrol_move, resolve_kill_attempts,
};
use crate::core::GameState;
use crate::player::PlayerSet;

pub struct EnemiesPlugin;

impl Plugin for EnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyRegistry>()
            .add_systems(OnEnter(GameState::Loading), load_enemy_definitions)
            .add_systems(
                Update,
                (
                    detect_player,
                    patrol_move,
                    ambush_close,
                    enemy_attack,
                    resolve_kill_attempts,
                    despawn_dead_enemies,
                )
                    .chain()
                    .after(PlayerSet::Apply)
                    .run_if(in_state(GameState::InGame)),
            )
            // One-shot cues last a full frame; reset before the next one.
            .add_systems(
                PreUpdate,
                clear_deflect_cues.run_if(in_state(GameState::InGame)),
            );
    }
}
