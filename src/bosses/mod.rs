//! Boss module - the goblin shaman and the giant plant encounters.

pub mod plant;
pub mod plugin;
pub mod projectile;
pub mod shaman;

use bevy::prelude::*;

pub use plant::{PlantBoss, PlantPhase, Vine};
pub use plugin::BossesPlugin;
pub use projectile::Fireball;
pub use shaman::ShamanBoss;

/// Marker for boss entities; weapon hits against these route to direct
/// damage instead of the kill rules.
#[derive(Component)]
pub struct Boss;

/// Animation flags pushed to the boss's animation side.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct BossAnim {
    /// One-shot hit reaction.
    pub hit_cue: bool,
    pub dead: bool,
}

/// Delay between a boss reaching zero HP and its removal, so the death
/// animation can play out.
#[derive(Component)]
pub struct BossDeathTimer(pub Timer);

impl Default for BossDeathTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(3.0, TimerMode::Once))
    }
}
