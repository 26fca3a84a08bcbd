//! Enemies module - data-driven definitions, behaviors, and kill rules.

pub mod components;
pub mod data;
pub mod plugin;
pub mod systems;

pub use components::{
    AiState, AttackTimer, DeathTimer, Enemy, EnemyAnim, EnemyBehavior, EnemyStats, PatrolStage,
    ResumeTimer,
};
pub use data::{BehaviorKind, EnemyDefinition, EnemyRegistry};
pub use plugin::EnemiesPlugin;
pub use systems::{kill_outcome, spawn_enemy, KillOutcome};
