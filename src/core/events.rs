//! Global events used for cross-system communication.
//!
//! Events allow decoupled systems to communicate. For example, the weapon
//! system sends KillEnemyEvents, and the enemy module receives them to
//! resolve the armored-vs-heavy rules. This keeps systems independent and
//! testable.

use bevy::prelude::*;

/// Sent when the player takes damage.
///
/// The player damage system applies the health reduction, i-frames and
/// knockback through the force receiver.
#[derive(Event)]
pub struct PlayerDamageEvent {
    /// Entity that caused the damage (its position drives knockback direction)
    pub source: Entity,
    /// World position of the damage source
    pub source_pos: Vec3,
    /// Damage amount before i-frame gating
    pub amount: f32,
}

/// Sent when something tries to kill an enemy (weapon hit, stomp, explosion).
///
/// Armored enemies ignore kills that are neither heavy nor explosive and
/// play a deflect feedback instead.
#[derive(Event)]
pub struct KillEnemyEvent {
    pub target: Entity,
    /// True for the heavy attack variant (roll attack)
    pub heavy: bool,
    /// True when caused by an explosion (kills armored enemies too)
    pub explosion: bool,
}

/// Sent when the player lands on top of a stompable target.
///
/// The stomp probe emits this in the same step that arms the player's
/// bounce re-launch, so bounce and destruction are decided together.
#[derive(Event)]
pub struct StompedEvent {
    pub target: Entity,
}

/// Sent when a boss takes a point of damage.
#[derive(Event)]
pub struct BossDamageEvent {
    pub boss: Entity,
    pub amount: i32,
}

/// Opens or closes the weapon's active window.
///
/// Opening the window clears the per-swing hit set so the next swing can
/// damage targets the previous one already touched.
#[derive(Event)]
pub struct WeaponWindowEvent {
    pub active: bool,
    /// Whether the swing counts as a heavy attack
    pub heavy: bool,
}

/// One completed spin cycle of the attack animation.
///
/// Emitted by the animation-side driver; the Attack state counts these
/// until the configured cap and then clears the spinning flag.
#[derive(Event)]
pub struct SpinCycleEvent;

/// Sent when something breaks a crate (weapon hit or stomp).
#[derive(Event)]
pub struct BreakCrateEvent {
    pub target: Entity,
}

/// Sent when something sets off an explosive prop.
#[derive(Event)]
pub struct TriggerExplosionEvent {
    pub target: Entity,
}

/// Sent when the player activates a checkpoint (heal + save).
#[derive(Event)]
pub struct CheckpointEvent {
    pub checkpoint: Entity,
    pub position: Vec3,
}

/// Sent when a destructible prop releases its reward.
#[derive(Event)]
pub struct RewardEvent {
    pub position: Vec3,
}

/// Sent when the player picks up a coin.
#[derive(Event)]
pub struct CoinCollectedEvent;

/// Sent when the player loses all health.
#[derive(Event)]
pub struct PlayerDiedEvent;

/// Sent when a boss dies; the game-flow system reacts by entering Victory.
#[derive(Event)]
pub struct VictoryEvent;
