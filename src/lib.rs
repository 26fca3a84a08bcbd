//! Hazelrun - a 3D platformer's gameplay core in Bevy.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, global events, routines, the persistent session
//! - **Player**: Locomotion state machine, forces, stomping, damage intake
//! - **Combat**: Weapon swing windows, hit dedup, hit routing
//! - **Enemies**: Data-driven enemies with patrol/ambush/stationary behaviors
//! - **Bosses**: The goblin shaman and the giant plant encounters
//! - **World**: Terrain tags, moving platforms, interactive props, the level

pub mod bosses;
pub mod combat;
pub mod core;
pub mod enemies;
pub mod player;
pub mod world;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
pub struct HazelrunPlugin;

impl Plugin for HazelrunPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)
            // Player systems
            .add_plugins(player::PlayerPlugin)
            // Combat systems
            .add_plugins(combat::CombatPlugin)
            // Enemy systems
            .add_plugins(enemies::EnemiesPlugin)
            // Boss systems
            .add_plugins(bosses::BossesPlugin)
            // World systems
            .add_plugins(world::WorldPlugin);
    }
}
