//! The cooperative state machine and the per-tick context states run against.
//!
//! The machine owns exactly one active state. Every transition runs the
//! outgoing state's `exit` strictly before the incoming state's `enter`;
//! this ordering is the system's main correctness invariant - it is what
//! keeps two states' side effects (capsule resizing, weapon windows,
//! subscriptions) from overlapping.

use bevy::prelude::*;

use super::components::{AnimationSink, CameraFrame, GroundSensor, PlayerTimers, PlayerTunables};
use super::forces::ForceReceiver;
use super::input::InputSnapshot;

/// A cooperative state. One live instance per activation; the machine never
/// reuses an instance after it exits.
pub trait State<C>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called once when the state becomes active.
    fn enter(&mut self, _ctx: &mut C) {}

    /// Called every frame while active. Returning a state requests a
    /// transition; the machine performs the exit/enter pair.
    fn tick(&mut self, ctx: &mut C) -> Option<Box<dyn State<C>>>;

    /// Called once before the state is replaced.
    fn exit(&mut self, _ctx: &mut C) {}
}

/// Generic cooperative state machine: holds one active state, ticks it every
/// frame, and performs ordered exit -> enter transitions on switch.
pub struct Machine<C> {
    active: Box<dyn State<C>>,
    entered: bool,
}

impl<C> Machine<C> {
    pub fn new(initial: Box<dyn State<C>>) -> Self {
        Self {
            active: initial,
            entered: false,
        }
    }

    pub fn state_name(&self) -> &'static str {
        self.active.name()
    }

    /// Tick the active state, entering it first if it never has been, and
    /// perform at most one transition.
    pub fn tick(&mut self, ctx: &mut C) {
        if !self.entered {
            self.active.enter(ctx);
            self.entered = true;
        }
        if let Some(next) = self.active.tick(ctx) {
            self.switch(next, ctx);
        }
    }

    /// Force a transition from outside the state graph (pause/unpause).
    pub fn switch(&mut self, next: Box<dyn State<C>>, ctx: &mut C) {
        if self.entered {
            self.active.exit(ctx);
        }
        self.active = next;
        self.active.enter(ctx);
        self.entered = true;
    }
}

/// Collision capsule request raised by states; applied by the physics-side
/// system after the tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CapsuleRequest {
    #[default]
    Keep,
    /// Roll entry: shrink the capsule.
    Shrink,
    /// Roll exit: restore original dimensions.
    Restore,
}

/// Weapon window request raised by the Attack state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponRequest {
    pub active: bool,
    pub heavy: bool,
}

/// Everything a player state reads and writes during one tick.
///
/// Built by value from the player's components each frame and written back
/// afterwards, so states stay pure and directly testable.
#[derive(Clone, Copy, Debug)]
pub struct StateCtx {
    pub dt: f32,
    /// Seconds since startup.
    pub now: f32,
    pub input: InputSnapshot,
    pub last_jump_pressed: f32,
    pub sensor: GroundSensor,
    pub forces: ForceReceiver,
    pub timers: PlayerTimers,
    pub anim: AnimationSink,
    pub tunables: PlayerTunables,
    pub camera: CameraFrame,
    /// Current world-space facing direction of the character.
    pub facing_dir: Vec3,
    pub double_jump_unlocked: bool,
    /// Spin cycles completed by the animation side this frame.
    pub spin_cycles: u32,
    /// Stomp re-launch force armed by the stomp probe while airborne.
    pub armed_bounce: Option<f32>,

    // Outputs, consumed by the apply systems after the tick.
    /// Desired planar movement velocity (world units per second).
    pub planar_velocity: Vec3,
    /// Direction the character should smoothly rotate toward.
    pub facing: Option<Vec3>,
    pub capsule: CapsuleRequest,
    pub weapon: Option<WeaponRequest>,
    /// Pausing toggles input sampling through this.
    pub set_input_enabled: Option<bool>,
    /// Set when a buffered jump press was honored.
    pub consume_jump_buffer: bool,
}

impl StateCtx {
    /// Camera-relative world direction of the current move input.
    pub fn move_direction(&self) -> Vec3 {
        self.camera.world_direction(self.input.move_axis)
    }

    /// Request a planar velocity and face along it.
    pub fn walk(&mut self, velocity: Vec3) {
        self.planar_velocity = velocity;
        if velocity.length_squared() > 1e-4 {
            self.facing = Some(velocity.normalize());
        }
        self.anim.velocity_speed = velocity.length() / self.tunables.move_speed.max(1e-4);
    }

    /// Jump press within the buffer window, counting a press this frame.
    pub fn jump_buffered(&self) -> bool {
        self.input.jump_pressed
            || self.now - self.last_jump_pressed <= self.tunables.jump_buffer_time
    }

    /// Ground contact recent enough for a coyote jump.
    pub fn within_coyote_time(&self) -> bool {
        self.now - self.timers.last_grounded <= self.tunables.coyote_time
    }
}
