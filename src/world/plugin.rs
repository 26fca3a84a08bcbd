//! World plugin - level content, props, and platform motion.

use bevy::prelude::*;

use super::level::setup_level;
use super::platforms::move_platforms;
use super::props::{
    handle_checkpoints, handle_crate_breaks, handle_explosions, handle_prop_stomps, pick_up_coins,
    spawn_rewards,
};
use crate::core::GameState;
use crate::player::PlayerSet;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::InGame), setup_level)
            // Platforms move before the ground probe reads their velocity.
            .add_systems(
                Update,
                move_platforms
                    .before(PlayerSet::Sense)
                    .run_if(in_state(GameState::InGame)),
            )
            .add_systems(
                Update,
                (
                    handle_prop_stomps,
                    handle_crate_breaks,
                    handle_explosions,
                    handle_checkpoints,
                    spawn_rewards,
                    pick_up_coins,
                )
                    .chain()
                    .after(PlayerSet::Apply)
                    .run_if(in_state(GameState::InGame)),
            );
    }
}
