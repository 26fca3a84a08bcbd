//! Player components and tunables.

use bevy::prelude::*;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Tunable movement and combat parameters.
///
/// Gravity and jump force are not tuned directly: they are derived once from
/// `jump_height` and `time_to_apex` via the projectile-motion equations, so
/// designers tune the feel of the arc rather than raw accelerations.
#[derive(Resource, Clone, Copy, Debug)]
pub struct PlayerTunables {
    pub move_speed: f32,
    /// Facing smoothing rate (higher = snappier turns).
    pub rotation_speed: f32,
    pub jump_height: f32,
    pub time_to_apex: f32,
    /// Grace interval after leaving the ground during which a jump input is
    /// still honored.
    pub coyote_time: f32,
    /// A jump press this close before landing still registers.
    pub jump_buffer_time: f32,
    pub attack_cooldown: f32,
    /// Spin cycles per attack before the spinning flag clears.
    pub attack_spin_cap: u32,
    pub roll_duration: f32,
    pub roll_speed: f32,
    pub roll_cooldown: f32,
    /// Seconds a roll may hang off a ledge before it bails into a fall.
    pub roll_air_grace: f32,
    /// Continuous time off the ground before Move concedes it is falling.
    pub fall_debounce: f32,
    pub fall_multiplier: f32,
    pub knockback_strength: f32,
    pub knockback_smooth_time: f32,
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            rotation_speed: 12.0,
            jump_height: 2.2,
            time_to_apex: 0.45,
            coyote_time: 0.15,
            jump_buffer_time: 0.1,
            attack_cooldown: 0.6,
            attack_spin_cap: 3,
            roll_duration: 0.45,
            roll_speed: 9.0,
            roll_cooldown: 0.8,
            roll_air_grace: 0.15,
            fall_debounce: 0.08,
            fall_multiplier: 1.8,
            knockback_strength: 6.0,
            knockback_smooth_time: 0.3,
        }
    }
}

impl PlayerTunables {
    /// Downward acceleration: `-(2 * jumpHeight) / timeToApex^2`.
    pub fn gravity(&self) -> f32 {
        -(2.0 * self.jump_height) / (self.time_to_apex * self.time_to_apex)
    }

    /// Initial jump velocity: `|gravity| * timeToApex`.
    pub fn jump_force(&self) -> f32 {
        self.gravity().abs() * self.time_to_apex
    }
}

/// Player health with brief invulnerability after a hit.
#[derive(Component, Clone, Copy, Debug)]
pub struct PlayerHealth {
    pub current: f32,
    pub maximum: f32,
    pub i_frames: f32,
}

impl PlayerHealth {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
            i_frames: 0.0,
        }
    }

    /// Apply damage unless i-frames are active. Returns true if it landed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.i_frames > 0.0 {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.i_frames = 1.0;
        true
    }

    pub fn heal_full(&mut self) {
        self.current = self.maximum;
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// What the landing surface under the player is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SurfaceKind {
    #[default]
    None,
    Walkable,
    MovingPlatform,
}

/// Ground and surface probe results for one frame.
///
/// Written by the rapier-backed sensing system; consumed by the state
/// machine. Tests fill this in directly.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct GroundSensor {
    pub grounded: bool,
    /// Vertical velocity as reported by the character controller.
    pub vertical_velocity: f32,
    pub surface: SurfaceKind,
    /// Velocity of the platform underfoot, if it is moving.
    pub platform_velocity: Vec3,
}

impl GroundSensor {
    /// True when the surface below is something the player may land on.
    pub fn landing_surface(&self) -> bool {
        matches!(self.surface, SurfaceKind::Walkable | SurfaceKind::MovingPlatform)
    }
}

/// Named animation parameters pushed to the animation side.
///
/// The core only ever writes these, with a single read-back: `spinning`,
/// observed by the Attack state as its exit condition.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct AnimationSink {
    pub is_grounded: bool,
    pub is_jumping: bool,
    pub is_rolling: bool,
    pub is_shielding: bool,
    pub velocity_speed: f32,
    pub spinning: bool,
    /// One-shot cue: spin-jump flourish. Cleared by the animation side.
    pub spin_jump_cue: bool,
    /// One-shot cue: attack wind-up.
    pub attack_cue: bool,
}

/// Runtime timers and flags mutated by states.
#[derive(Component, Clone, Copy, Debug)]
pub struct PlayerTimers {
    pub last_grounded: f32,
    pub last_roll: f32,
    pub last_attack: f32,
    pub can_double_jump: bool,
    pub has_played_spin_jump: bool,
    pub attack_spin_count: u32,
}

impl Default for PlayerTimers {
    fn default() -> Self {
        Self {
            last_grounded: f32::NEG_INFINITY,
            last_roll: f32::NEG_INFINITY,
            last_attack: f32::NEG_INFINITY,
            can_double_jump: true,
            has_played_spin_jump: false,
            attack_spin_count: 0,
        }
    }
}

/// Camera orientation injected into the movement mapping.
///
/// The camera itself is an external collaborator; the core only needs its
/// yaw to turn stick input into a world direction.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct CameraFrame {
    pub yaw: f32,
}

impl CameraFrame {
    /// Map a 2D input axis into a camera-relative world direction (y = 0).
    pub fn world_direction(&self, axis: Vec2) -> Vec3 {
        let local = Vec3::new(axis.x, 0.0, -axis.y);
        let dir = Quat::from_rotation_y(self.yaw) * local;
        dir.normalize_or_zero()
    }
}

/// Raise or lower the player's shield collider flag for projectile reflect.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct ShieldActive(pub bool);
