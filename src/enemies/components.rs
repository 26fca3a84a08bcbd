//! Enemy components.
//!
//! One enemy entity with a pluggable movement behavior replaces the
//! original's near-identical per-variant classes: the strategy is data, the
//! shared attack/death logic lives in the systems.

use bevy::prelude::*;

use crate::core::Routine;

/// Marker component for all enemies.
#[derive(Component)]
pub struct Enemy;

/// Shared enemy tuning.
#[derive(Component, Clone, Debug)]
pub struct EnemyStats {
    pub damage: f32,
    pub move_speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Armored enemies only die to heavy attacks or explosions.
    pub armored: bool,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            damage: 1.0,
            move_speed: 3.0,
            detection_range: 8.0,
            attack_range: 2.0,
            attack_cooldown: 1.5,
            armored: false,
        }
    }
}

/// Detection-driven behavior state.
#[derive(Component, Default, PartialEq, Clone, Debug)]
pub enum AiState {
    /// No player in range; patrol or stand.
    #[default]
    Calm,
    /// Player detected; face, chase (ambush) or hold and attack.
    Alert,
    /// Playing the death animation before despawn.
    Dying,
}

/// Stage of a patrol walk between waypoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PatrolStage {
    Walking,
    Pausing,
}

/// Movement strategy, chosen per enemy from its definition.
#[derive(Component)]
pub enum EnemyBehavior {
    /// Holds position; attacks whatever comes close.
    Stationary,
    /// Walks ordered waypoints, pausing at each; suspended while alert.
    Patrol {
        waypoints: Vec<Vec3>,
        next: usize,
        routine: Routine<PatrolStage>,
        pause_secs: f32,
    },
    /// Continuously closes distance, except right after an attack.
    Ambush { move_cooldown: Timer },
}

impl EnemyBehavior {
    pub fn patrol(waypoints: Vec<Vec3>, pause_secs: f32) -> Self {
        Self::Patrol {
            waypoints,
            next: 0,
            routine: Routine::new(PatrolStage::Walking, 0.0),
            pause_secs,
        }
    }

    pub fn ambush(post_attack_cooldown: f32) -> Self {
        let mut move_cooldown = Timer::from_seconds(post_attack_cooldown, TimerMode::Once);
        // Start expired: free to move until the first attack.
        move_cooldown.tick(std::time::Duration::from_secs_f32(post_attack_cooldown));
        Self::Ambush { move_cooldown }
    }
}

/// Cooldown between enemy attacks.
#[derive(Component)]
pub struct AttackTimer(pub Timer);

impl Default for AttackTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.5, TimerMode::Once))
    }
}

/// Delay before a suspended patrol resumes once the player leaves range.
/// Prevents rapid patrol/detect flapping at the detection boundary.
#[derive(Component)]
pub struct ResumeTimer(pub Timer);

impl Default for ResumeTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Once))
    }
}

/// Timer for the death animation before despawn.
#[derive(Component)]
pub struct DeathTimer(pub Timer);

impl Default for DeathTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(2.0, TimerMode::Once))
    }
}

/// Animation flags pushed to the enemy's animation side.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct EnemyAnim {
    pub attacking: bool,
    /// One-shot: an armored enemy shrugged off a non-heavy hit.
    pub deflect_cue: bool,
    pub dead: bool,
}
