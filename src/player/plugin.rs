//! Player plugin - wires the per-frame pipeline in its fixed order.

use bevy::prelude::*;

use super::components::{CameraFrame, PlayerTunables};
use super::input::read_input;
use super::movement::{
    apply_movement, apply_player_damage, drive_spin_cycles, ground_sense, handle_player_death,
    spawn_player, tick_state_machine, SpinClock,
};
use super::stomp::stomp_probe;
use crate::core::GameState;

/// Ordering for the player pipeline: input sampling, sensing, state tick,
/// then the physics move. Timing correctness depends on this chain.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerSet {
    ReadInput,
    Sense,
    Tick,
    Apply,
}

/// Player plugin - state machine, forces, input, stomping.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerTunables>()
            .init_resource::<CameraFrame>()
            .init_resource::<SpinClock>()
            .configure_sets(
                Update,
                (
                    PlayerSet::ReadInput,
                    PlayerSet::Sense,
                    PlayerSet::Tick,
                    PlayerSet::Apply,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame).or(in_state(GameState::Paused))),
            )
            .add_systems(OnEnter(GameState::InGame), setup_player)
            .add_systems(Update, read_input.in_set(PlayerSet::ReadInput))
            .add_systems(
                Update,
                (ground_sense, stomp_probe, drive_spin_cycles)
                    .chain()
                    .in_set(PlayerSet::Sense),
            )
            .add_systems(Update, tick_state_machine.in_set(PlayerSet::Tick))
            .add_systems(
                Update,
                (apply_movement, apply_player_damage, handle_player_death)
                    .chain()
                    .in_set(PlayerSet::Apply)
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

/// Spawn the player on entering gameplay, or reset the surviving entity
/// when a previous run left one behind.
fn setup_player(
    mut commands: Commands,
    mut existing: Query<
        (&mut Transform, &mut super::components::PlayerHealth),
        With<super::components::Player>,
    >,
    tunables: Res<PlayerTunables>,
    session: Option<Res<crate::core::GameSession>>,
) {
    let start = session
        .and_then(|s| s.checkpoint)
        .unwrap_or(Vec3::new(0.0, 1.0, 0.0));

    if let Ok((mut transform, mut health)) = existing.get_single_mut() {
        transform.translation = start;
        health.heal_full();
        return;
    }

    let player = spawn_player(&mut commands, start, &tunables);
    info!("Spawned player {:?} at {:?}", player, start);
}
