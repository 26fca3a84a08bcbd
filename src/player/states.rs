//! The player state graph: Move, Air, Fall, Roll, Attack, Shield, Pausing.
//!
//! Each state is a fresh instance per activation, optionally constructed
//! with parameters from the exiting state's context - a roll-jump keeps the
//! roll's direction and speed into the air, a stomp bounce re-enters Air
//! with the bounce force. Transition conditions live in `tick`; side effects
//! that must not overlap (capsule resize, weapon window, jump-release
//! subscription) live in `enter`/`exit`.

use bevy::prelude::*;

use super::machine::{CapsuleRequest, State, StateCtx, WeaponRequest};

/// Downward speed below which Move still treats a lost ground contact as
/// ledge flicker rather than a real fall.
const FALL_SPEED_THRESHOLD: f32 = 0.6;

/// Air-steering blend: how much of the frozen launch vector survives when
/// the player also holds a direction.
const LAUNCH_BLEND: f32 = 0.8;

type Next = Option<Box<dyn State<StateCtx>>>;

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Grounded locomotion. The hub of the graph.
pub struct MoveState {
    /// When the ground contact was lost, for the ledge-flicker debounce.
    ungrounded_since: Option<f32>,
}

impl MoveState {
    pub fn new() -> Self {
        Self {
            ungrounded_since: None,
        }
    }
}

impl Default for MoveState {
    fn default() -> Self {
        Self::new()
    }
}

impl State<StateCtx> for MoveState {
    fn name(&self) -> &'static str {
        "Move"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        // Landing re-arms the double jump and the spin-jump flourish.
        ctx.timers.can_double_jump = true;
        ctx.timers.has_played_spin_jump = false;
        // A bounce still armed once the feet are down is stale; it must not
        // hijack a later jump.
        ctx.armed_bounce = None;
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        let tun = ctx.tunables;
        let dir = ctx.move_direction();
        ctx.walk(dir * tun.move_speed);
        ctx.anim.is_grounded = ctx.sensor.grounded;

        // Jump: pressed now, or buffered shortly before landing; grounded or
        // within coyote time.
        if ctx.jump_buffered() && (ctx.sensor.grounded || ctx.within_coyote_time()) {
            ctx.consume_jump_buffer = true;
            let launch = LaunchParams {
                dir,
                speed: tun.move_speed,
            };
            if ctx.sensor.grounded {
                // Shed the ground stick so the launch is exactly jump_force.
                ctx.forces.vertical = 0.0;
                return Some(Box::new(AirState::jump(launch)));
            }
            // Coyote path: the impulse is applied here, replacing whatever
            // downward velocity accumulated since the ledge.
            ctx.forces.vertical = 0.0;
            ctx.forces.jump(tun.jump_force());
            return Some(Box::new(AirState::already_launched(launch)));
        }

        if ctx.input.shield_held {
            return Some(Box::new(ShieldState));
        }

        if ctx.input.roll_pressed
            && ctx.sensor.grounded
            && ctx.now - ctx.timers.last_roll >= tun.roll_cooldown
        {
            let roll_dir = if dir.length_squared() > 1e-4 {
                dir
            } else {
                ctx.facing_dir
            };
            return Some(Box::new(RollState::new(roll_dir)));
        }

        if ctx.input.attack_pressed && ctx.now - ctx.timers.last_attack >= tun.attack_cooldown {
            return Some(Box::new(AttackState::new(false)));
        }

        // Debounced ledge fall: only concede the ground after a continuous
        // window off it with real downward speed, and never right after a
        // jump press (the jump transition above must win).
        if ctx.sensor.grounded {
            self.ungrounded_since = None;
        } else {
            let since = *self.ungrounded_since.get_or_insert(ctx.now);
            let falling = ctx.sensor.vertical_velocity < -FALL_SPEED_THRESHOLD;
            let debounced = ctx.now - since >= tun.fall_debounce;
            let jump_pending = ctx.now - ctx.last_jump_pressed <= tun.jump_buffer_time;
            if falling && debounced && !jump_pending {
                return Some(Box::new(AirState::falling(LaunchParams {
                    dir,
                    speed: tun.move_speed,
                })));
            }
        }

        None
    }
}

// ---------------------------------------------------------------------------
// Air
// ---------------------------------------------------------------------------

/// The frozen launch vector an airborne state carries from its origin.
#[derive(Clone, Copy, Debug)]
pub struct LaunchParams {
    pub dir: Vec3,
    pub speed: f32,
}

/// Jump ascent and descent in one state, parameterized by its origin:
/// a plain jump, a coyote jump (impulse already applied), a roll jump
/// (keeps roll direction/speed, no variable jump height), a stomp or
/// jump-pad launch (custom force), or a plain fall off a ledge.
pub struct AirState {
    launch: LaunchParams,
    custom_force: Option<f32>,
    impulse_applied: bool,
    roll_jump: bool,
    /// Live while the jump-release subscription is armed. Owned by this
    /// instance, so the subscription cannot outlive the state.
    cancel_armed: bool,
}

impl AirState {
    /// A standard jump; applies the derived jump force on enter.
    pub fn jump(launch: LaunchParams) -> Self {
        Self {
            launch,
            custom_force: None,
            impulse_applied: false,
            roll_jump: false,
            cancel_armed: false,
        }
    }

    /// Caller already applied the impulse (coyote path).
    pub fn already_launched(launch: LaunchParams) -> Self {
        Self {
            impulse_applied: true,
            ..Self::jump(launch)
        }
    }

    /// A jump with an externally decided force (stomp bounce, jump pad).
    pub fn launched_with(launch: LaunchParams, force: f32) -> Self {
        Self {
            custom_force: Some(force),
            ..Self::jump(launch)
        }
    }

    /// A jump out of a roll: keeps the roll vector, no early-release cut.
    pub fn from_roll(launch: LaunchParams) -> Self {
        Self {
            roll_jump: true,
            ..Self::jump(launch)
        }
    }

    /// Walked off a ledge; no impulse at all.
    pub fn falling(launch: LaunchParams) -> Self {
        Self {
            impulse_applied: true,
            ..Self::jump(launch)
        }
    }
}

impl State<StateCtx> for AirState {
    fn name(&self) -> &'static str {
        "Air"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        // Spin-jump flourish: once per airborne cycle, and not when the jump
        // came out of the buffer (the camera is already mid-landing there).
        if !ctx.timers.has_played_spin_jump
            && ctx.now - ctx.last_jump_pressed > ctx.tunables.jump_buffer_time
        {
            ctx.anim.spin_jump_cue = true;
            ctx.timers.has_played_spin_jump = true;
        }

        if !self.impulse_applied {
            let force = self.custom_force.unwrap_or(ctx.tunables.jump_force());
            ctx.forces.jump(force);
            self.impulse_applied = true;
        }

        // Variable jump height: only for player-initiated, non-roll jumps.
        if !self.roll_jump {
            self.cancel_armed = true;
        }

        ctx.anim.is_jumping = true;
        ctx.anim.is_grounded = false;
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        let tun = ctx.tunables;

        if self.cancel_armed && ctx.input.jump_released {
            ctx.forces.cancel_jump();
            self.cancel_armed = false;
        }

        // Blend the frozen launch vector with live input: limited air
        // steering that preserves the jump arc.
        let input_dir = ctx.move_direction();
        let launch_vec = self.launch.dir * self.launch.speed;
        let planar = if input_dir.length_squared() > 1e-4 {
            if launch_vec.length_squared() > 1e-4 {
                launch_vec * LAUNCH_BLEND + input_dir * tun.move_speed * (1.0 - LAUNCH_BLEND)
            } else {
                input_dir * tun.move_speed
            }
        } else {
            launch_vec
        };
        ctx.walk(planar);
        ctx.anim.is_grounded = false;

        // Stomp bounce armed while airborne: re-enter Air with the bounce
        // force instead of landing.
        if let Some(force) = ctx.armed_bounce.take() {
            ctx.timers.can_double_jump = false;
            ctx.forces.vertical = 0.0;
            return Some(Box::new(AirState::launched_with(self.launch, force)));
        }

        // Mid-air jump, if the ability is unlocked and still armed.
        if ctx.input.jump_pressed && ctx.timers.can_double_jump && ctx.double_jump_unlocked {
            ctx.timers.can_double_jump = false;
            ctx.forces.vertical = ctx.forces.vertical.max(0.0);
            return Some(Box::new(AirState::jump(LaunchParams {
                dir: input_dir,
                speed: tun.move_speed,
            })));
        }

        // Land only on a confirmed walkable or moving-platform surface.
        if ctx.sensor.grounded && ctx.forces.vertical <= 0.0 && ctx.sensor.landing_surface() {
            return Some(Box::new(MoveState::new()));
        }

        None
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        self.cancel_armed = false;
        ctx.anim.is_jumping = false;
    }
}

// ---------------------------------------------------------------------------
// Fall
// ---------------------------------------------------------------------------

/// Simple airborne descent with no steering: the exact velocity captured at
/// entry is retained until ground contact. Used when a roll runs off a ledge.
pub struct FallState {
    velocity: Vec3,
}

impl FallState {
    pub fn new(velocity: Vec3) -> Self {
        Self { velocity }
    }
}

impl State<StateCtx> for FallState {
    fn name(&self) -> &'static str {
        "Fall"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        ctx.anim.is_jumping = true;
        ctx.anim.is_grounded = false;
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        ctx.walk(self.velocity);
        if ctx.sensor.grounded {
            return Some(Box::new(MoveState::new()));
        }
        None
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.anim.is_jumping = false;
    }
}

// ---------------------------------------------------------------------------
// Roll
// ---------------------------------------------------------------------------

/// Fixed-duration dash with a shrunken capsule and a locked direction.
pub struct RollState {
    dir: Vec3,
    entered_at: f32,
    airborne_since: Option<f32>,
}

impl RollState {
    pub fn new(dir: Vec3) -> Self {
        Self {
            dir: dir.normalize_or_zero(),
            entered_at: 0.0,
            airborne_since: None,
        }
    }
}

impl State<StateCtx> for RollState {
    fn name(&self) -> &'static str {
        "Roll"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        self.entered_at = ctx.now;
        ctx.capsule = CapsuleRequest::Shrink;
        // Knockback must not hijack the roll direction.
        ctx.forces.clear_horizontal();
        ctx.timers.last_roll = ctx.now;
        ctx.anim.is_rolling = true;
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        let tun = ctx.tunables;

        // Horizontal forces stay cleared for the whole roll; knockback
        // applied mid-roll is discarded until Move resumes.
        ctx.forces.clear_horizontal();
        ctx.walk(self.dir * tun.roll_speed);

        // Mid-roll jump: the roll becomes the air launch.
        if ctx.input.jump_pressed {
            return Some(Box::new(AirState::from_roll(LaunchParams {
                dir: self.dir,
                speed: tun.roll_speed,
            })));
        }

        // Attack out of a roll is the heavy variant.
        if ctx.input.attack_pressed {
            return Some(Box::new(AttackState::new(true)));
        }

        // Rolled off an edge: bail into a plain fall after a short grace.
        if ctx.sensor.grounded {
            self.airborne_since = None;
        } else {
            let since = *self.airborne_since.get_or_insert(ctx.now);
            if ctx.now - since > tun.roll_air_grace {
                return Some(Box::new(FallState::new(self.dir * tun.roll_speed)));
            }
        }

        if ctx.now - self.entered_at >= tun.roll_duration {
            return Some(Box::new(MoveState::new()));
        }

        None
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        // Always restore the capsule, whatever path we leave by.
        ctx.capsule = CapsuleRequest::Restore;
        ctx.anim.is_rolling = false;
    }
}

// ---------------------------------------------------------------------------
// Attack
// ---------------------------------------------------------------------------

/// The spin attack. Opens the weapon window on enter, counts spin cycles
/// reported by the animation side, clears the spinning flag at the cap, and
/// exits once the flag is observed false.
pub struct AttackState {
    heavy: bool,
}

impl AttackState {
    pub fn new(heavy: bool) -> Self {
        Self { heavy }
    }
}

impl State<StateCtx> for AttackState {
    fn name(&self) -> &'static str {
        "Attack"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        ctx.anim.attack_cue = true;
        ctx.anim.spinning = true;
        ctx.timers.attack_spin_count = 0;
        ctx.timers.last_attack = ctx.now;
        // Opening the window also resets the weapon's hit set.
        ctx.weapon = Some(WeaponRequest {
            active: true,
            heavy: self.heavy,
        });
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        // Player-directed movement is allowed during the spin.
        let dir = ctx.move_direction();
        ctx.walk(dir * ctx.tunables.move_speed);

        ctx.timers.attack_spin_count += ctx.spin_cycles;
        if ctx.timers.attack_spin_count >= ctx.tunables.attack_spin_cap {
            ctx.anim.spinning = false;
        }

        // Exit on the one animation read-back the core performs.
        if !ctx.anim.spinning {
            return Some(Box::new(MoveState::new()));
        }

        None
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.weapon = Some(WeaponRequest {
            active: false,
            heavy: self.heavy,
        });
        ctx.anim.spinning = false;
        ctx.anim.attack_cue = false;
    }
}

// ---------------------------------------------------------------------------
// Shield
// ---------------------------------------------------------------------------

/// Held state: active only while the shield button is down. The raised
/// shield flag is what lets the projectile system reflect fireballs.
pub struct ShieldState;

impl State<StateCtx> for ShieldState {
    fn name(&self) -> &'static str {
        "Shield"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        ctx.anim.is_shielding = true;
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        ctx.walk(Vec3::ZERO);
        if !ctx.input.shield_held {
            return Some(Box::new(MoveState::new()));
        }
        None
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.anim.is_shielding = false;
    }
}

// ---------------------------------------------------------------------------
// Pausing
// ---------------------------------------------------------------------------

/// Cutscene/pause hold: input processing is disabled on enter and restored
/// on exit; the tick itself does nothing.
pub struct PausingState;

impl State<StateCtx> for PausingState {
    fn name(&self) -> &'static str {
        "Pausing"
    }

    fn enter(&mut self, ctx: &mut StateCtx) {
        ctx.set_input_enabled = Some(false);
    }

    fn tick(&mut self, ctx: &mut StateCtx) -> Next {
        ctx.walk(Vec3::ZERO);
        None
    }

    fn exit(&mut self, ctx: &mut StateCtx) {
        ctx.set_input_enabled = Some(true);
    }
}

/// Where the machine resumes after a forced Pausing hold: grounded players
/// return to Move, airborne players keep falling until a validated landing.
pub fn resume_state(grounded: bool) -> Box<dyn State<StateCtx>> {
    if grounded {
        Box::new(MoveState::new())
    } else {
        Box::new(AirState::falling(LaunchParams {
            dir: Vec3::ZERO,
            speed: 0.0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::components::{
        AnimationSink, CameraFrame, GroundSensor, PlayerTimers, PlayerTunables, SurfaceKind,
    };
    use crate::player::forces::ForceReceiver;
    use crate::player::input::InputSnapshot;
    use crate::player::machine::Machine;

    fn test_ctx() -> StateCtx {
        let tun = PlayerTunables::default();
        StateCtx {
            dt: 1.0 / 60.0,
            now: 10.0,
            input: InputSnapshot::default(),
            last_jump_pressed: f32::NEG_INFINITY,
            sensor: GroundSensor {
                grounded: true,
                vertical_velocity: 0.0,
                surface: SurfaceKind::Walkable,
                platform_velocity: Vec3::ZERO,
            },
            forces: ForceReceiver::new(
                tun.gravity(),
                tun.fall_multiplier,
                tun.knockback_strength,
                tun.knockback_smooth_time,
            ),
            timers: PlayerTimers::default(),
            anim: AnimationSink::default(),
            tunables: tun,
            camera: CameraFrame::default(),
            facing_dir: Vec3::NEG_Z,
            double_jump_unlocked: false,
            spin_cycles: 0,
            armed_bounce: None,
            planar_velocity: Vec3::ZERO,
            facing: None,
            capsule: CapsuleRequest::Keep,
            weapon: None,
            set_input_enabled: None,
            consume_jump_buffer: false,
        }
    }

    fn machine() -> Machine<StateCtx> {
        Machine::new(Box::new(MoveState::new()))
    }

    #[test]
    fn grounded_jump_applies_the_derived_jump_force() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx); // settle into Move

        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);

        assert_eq!(m.state_name(), "Air");
        assert!((ctx.forces.vertical - ctx.tunables.jump_force()).abs() < 1e-5);
        assert!(ctx.anim.is_jumping);
    }

    #[test]
    fn ground_stick_does_not_shave_the_jump_launch() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);

        // Grounded frames carry the small downward stick velocity.
        ctx.forces.vertical = -1.5;
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);

        assert_eq!(m.state_name(), "Air");
        assert!((ctx.forces.vertical - ctx.tunables.jump_force()).abs() < 1e-5);
    }

    #[test]
    fn landing_drops_a_stale_bounce_so_the_next_jump_is_clean() {
        let mut ctx = test_ctx();
        ctx.sensor.grounded = false;
        ctx.forces.vertical = -1.0;
        // A bounce that was armed but never consumed before touchdown.
        ctx.armed_bounce = Some(14.0);
        let mut m: Machine<StateCtx> = Machine::new(Box::new(FallState::new(Vec3::ZERO)));
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Fall");

        ctx.sensor.grounded = true;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Move");
        assert!(ctx.armed_bounce.is_none());

        // The later jump launches with the jump force, not the pad force.
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");
        assert!((ctx.forces.vertical - ctx.tunables.jump_force()).abs() < 1e-5);
    }

    #[test]
    fn unpausing_mid_air_resumes_falling_not_standing() {
        let mut ctx = test_ctx();
        ctx.sensor.grounded = false;
        ctx.sensor.surface = SurfaceKind::None;
        let mut m: Machine<StateCtx> = Machine::new(Box::new(PausingState));
        m.tick(&mut ctx);

        m.switch(resume_state(false), &mut ctx);
        assert_eq!(m.state_name(), "Air");

        // Still airborne: no landing until a real surface contact.
        ctx.forces.vertical = -3.0;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");

        ctx.sensor.grounded = true;
        ctx.sensor.surface = SurfaceKind::Walkable;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Move");

        // A grounded unpause goes straight back to Move.
        assert_eq!(resume_state(true).name(), "Move");
    }

    #[test]
    fn coyote_jump_is_honored_shortly_after_leaving_the_ground() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);

        // Off the ledge, but ground contact was recent.
        ctx.sensor.grounded = false;
        ctx.sensor.vertical_velocity = -2.0;
        ctx.timers.last_grounded = ctx.now - 0.05;
        ctx.forces.vertical = -2.0;
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);

        assert_eq!(m.state_name(), "Air");
        // Coyote path replaces the accumulated fall instead of adding to it.
        assert!((ctx.forces.vertical - ctx.tunables.jump_force()).abs() < 1e-5);
    }

    #[test]
    fn air_lands_back_into_move_on_a_walkable_surface() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);

        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");

        // Airborne ticks: not grounded.
        ctx.input = InputSnapshot::default();
        ctx.sensor.grounded = false;
        ctx.now += 0.3;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");

        // Touch down with downward velocity on a tagged surface.
        ctx.sensor.grounded = true;
        ctx.forces.vertical = -1.0;
        ctx.now += 0.3;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Move");
        assert!(!ctx.anim.is_jumping);
    }

    #[test]
    fn landing_is_refused_without_a_walkable_surface_tag() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);

        ctx.input = InputSnapshot::default();
        ctx.sensor.grounded = true;
        ctx.sensor.surface = SurfaceKind::None;
        ctx.forces.vertical = -1.0;
        ctx.now += 0.5;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");
    }

    #[test]
    fn buffered_press_still_jumps_and_consumes_the_buffer() {
        let mut ctx = test_ctx();
        let mut m = machine();
        // Press registered 0.05s ago, inside the buffer window.
        ctx.last_jump_pressed = ctx.now - 0.05;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");
        assert!(ctx.consume_jump_buffer);
    }

    #[test]
    fn ledge_fall_is_debounced() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);

        ctx.sensor.grounded = false;
        ctx.sensor.vertical_velocity = -3.0;
        m.tick(&mut ctx);
        // First frame off the ledge: still Move.
        assert_eq!(m.state_name(), "Move");

        ctx.now += ctx.tunables.fall_debounce + 0.01;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");
    }

    #[test]
    fn roll_locks_direction_even_under_mid_roll_knockback() {
        let mut ctx = test_ctx();
        let dir = Vec3::new(1.0, 0.0, 0.0);
        let mut m: Machine<StateCtx> = Machine::new(Box::new(RollState::new(dir)));
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Roll");
        assert_eq!(ctx.capsule, CapsuleRequest::Shrink);
        assert_eq!(ctx.planar_velocity, dir * ctx.tunables.roll_speed);

        // Knockback mid-roll is discarded; the roll vector is unchanged.
        ctx.forces
            .apply_knockback(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO);
        ctx.now += 0.1;
        m.tick(&mut ctx);
        assert_eq!(ctx.planar_velocity, dir * ctx.tunables.roll_speed);
        assert_eq!(ctx.forces.impact, Vec3::ZERO);

        // Runs to completion and restores the capsule.
        ctx.now += ctx.tunables.roll_duration;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Move");
        assert_eq!(ctx.capsule, CapsuleRequest::Restore);
    }

    #[test]
    fn mid_roll_jump_keeps_the_roll_vector_and_skips_the_release_cut() {
        let mut ctx = test_ctx();
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let mut m: Machine<StateCtx> = Machine::new(Box::new(RollState::new(dir)));
        m.tick(&mut ctx);

        ctx.input.jump_pressed = true;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");
        let v0 = ctx.forces.vertical;
        assert!(v0 > 0.0);

        // Releasing jump must not halve a roll-jump.
        ctx.input = InputSnapshot::default();
        ctx.input.jump_released = true;
        ctx.sensor.grounded = false;
        m.tick(&mut ctx);
        assert_eq!(ctx.forces.vertical, v0);
        // And the launch vector is the roll's.
        assert_eq!(ctx.planar_velocity, dir * ctx.tunables.roll_speed);
    }

    #[test]
    fn early_release_halves_a_normal_jump() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);
        let v0 = ctx.forces.vertical;

        ctx.input = InputSnapshot::default();
        ctx.input.jump_released = true;
        ctx.sensor.grounded = false;
        m.tick(&mut ctx);
        assert!((ctx.forces.vertical - v0 * 0.5).abs() < 1e-5);
    }

    #[test]
    fn armed_stomp_bounce_relaunches_instead_of_landing() {
        let mut ctx = test_ctx();
        ctx.sensor.grounded = false;
        ctx.forces.vertical = -6.0;
        let mut m: Machine<StateCtx> = Machine::new(Box::new(AirState::falling(LaunchParams {
            dir: Vec3::ZERO,
            speed: 0.0,
        })));
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");
        ctx.armed_bounce = Some(12.0);
        m.tick(&mut ctx);

        assert_eq!(m.state_name(), "Air");
        assert!((ctx.forces.vertical - 12.0).abs() < 1e-5);
        assert!(ctx.armed_bounce.is_none());
        assert!(!ctx.timers.can_double_jump);
    }

    #[test]
    fn attack_counts_spin_cycles_and_exits_when_spinning_clears() {
        let mut ctx = test_ctx();
        let mut m: Machine<StateCtx> = Machine::new(Box::new(AttackState::new(false)));
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Attack");
        assert!(ctx.anim.spinning);
        assert_eq!(
            ctx.weapon,
            Some(WeaponRequest {
                active: true,
                heavy: false
            })
        );

        // Two cycles: below the cap of three, still spinning.
        ctx.weapon = None;
        ctx.spin_cycles = 2;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Attack");
        assert!(ctx.anim.spinning);

        // Third cycle reaches the cap; the flag clears and the state exits,
        // closing the weapon window.
        ctx.spin_cycles = 1;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Move");
        assert!(!ctx.anim.spinning);
        assert_eq!(
            ctx.weapon,
            Some(WeaponRequest {
                active: false,
                heavy: false
            })
        );
    }

    #[test]
    fn shield_drops_the_instant_the_button_releases() {
        let mut ctx = test_ctx();
        ctx.input.shield_held = true;
        let mut m: Machine<StateCtx> = Machine::new(Box::new(ShieldState));
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Shield");
        assert!(ctx.anim.is_shielding);

        ctx.input.shield_held = false;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Move");
        assert!(!ctx.anim.is_shielding);
    }

    #[test]
    fn pausing_disables_input_and_restores_it_on_exit() {
        let mut ctx = test_ctx();
        let mut m = machine();
        m.tick(&mut ctx);

        m.switch(Box::new(PausingState), &mut ctx);
        assert_eq!(ctx.set_input_enabled, Some(false));

        m.switch(Box::new(MoveState::new()), &mut ctx);
        assert_eq!(ctx.set_input_enabled, Some(true));
    }

    #[test]
    fn double_jump_requires_the_unlock_and_arms_once() {
        let mut ctx = test_ctx();
        ctx.double_jump_unlocked = true;
        let mut m = machine();
        m.tick(&mut ctx);
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        m.tick(&mut ctx);
        assert_eq!(m.state_name(), "Air");

        ctx.sensor.grounded = false;
        ctx.input = InputSnapshot::default();
        ctx.input.jump_pressed = true;
        ctx.forces.vertical = -4.0;
        m.tick(&mut ctx);
        // Second jump re-entered Air with a fresh impulse from rest.
        assert!((ctx.forces.vertical - ctx.tunables.jump_force()).abs() < 1e-5);
        assert!(!ctx.timers.can_double_jump);

        // A third press does nothing.
        ctx.input = InputSnapshot::default();
        ctx.input.jump_pressed = true;
        let v = ctx.forces.vertical;
        m.tick(&mut ctx);
        assert_eq!(ctx.forces.vertical, v);
    }
}
