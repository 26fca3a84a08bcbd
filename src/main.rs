//! Hazelrun - Entry Point
//!
//! A 3D platformer gameplay core: run, jump, roll, spin-attack, stomp.
//!
//! Controls:
//! - WASD: Move
//! - Space: Jump (hold for full height, tap for a short hop)
//! - J: Spin attack
//! - K: Dodge roll
//! - L: Hold to shield
//! - Escape: Pause/Unpause

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

fn main() {
    App::new()
        // Bevy default plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Hazelrun".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Our game plugin
        .add_plugins(hazelrun::HazelrunPlugin)
        .run();
}
