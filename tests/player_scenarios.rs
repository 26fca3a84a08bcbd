//! End-to-end player journeys: whole jump arcs, rolls under fire, and the
//! heavy-attack path, driven frame by frame against the real force
//! integration.

use bevy::prelude::*;

use hazelrun::player::{
    AirState, AnimationSink, AttackState, CameraFrame, CapsuleRequest, ForceReceiver, GroundSensor,
    InputSnapshot, LaunchParams, Machine, MoveState, PlayerTimers, PlayerTunables, RollState,
    StateCtx, SurfaceKind, WeaponRequest,
};

const DT: f32 = 1.0 / 120.0;

fn fresh_ctx() -> StateCtx {
    let tun = PlayerTunables::default();
    StateCtx {
        dt: DT,
        now: 5.0,
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

/// One frame: integrate forces the way the per-frame pipeline does, then
/// tick the machine.
fn step(machine: &mut Machine<StateCtx>, ctx: &mut StateCtx) {
    ctx.forces.integrate(DT, ctx.sensor.grounded);
    if ctx.sensor.grounded {
        ctx.timers.last_grounded = ctx.now;
    }
    machine.tick(ctx);
    ctx.now += DT;
    ctx.input = InputSnapshot::default();
    ctx.spin_cycles = 0;
}

#[test]
fn full_jump_arc_peaks_near_the_configured_apex_time() {
    let mut ctx = fresh_ctx();
    let mut machine: Machine<StateCtx> = Machine::new(Box::new(MoveState::new()));
    step(&mut machine, &mut ctx);

    ctx.input.jump_pressed = true;
    ctx.input.jump_held = true;
    ctx.last_jump_pressed = ctx.now;
    step(&mut machine, &mut ctx);
    assert_eq!(machine.state_name(), "Air");
    // The ground stick must not shave the launch velocity.
    assert!((ctx.forces.vertical - ctx.tunables.jump_force()).abs() < 1e-4);

    ctx.sensor.grounded = false;

    // Ride the ascent until vertical velocity crosses zero.
    let mut ascent_frames = 0;
    while ctx.forces.vertical > 0.0 {
        ctx.input.jump_held = true;
        step(&mut machine, &mut ctx);
        ascent_frames += 1;
        assert!(ascent_frames < 600, "ascent never ended");
    }

    let ascent_secs = ascent_frames as f32 * DT;
    let apex = ctx.tunables.time_to_apex;
    assert!(
        (ascent_secs - apex).abs() < 0.05,
        "ascent took {ascent_secs}s, expected about {apex}s"
    );

    // Keep falling until touchdown; the fall multiplier makes it faster
    // than the ascent.
    let mut fall_frames = 0;
    while machine.state_name() == "Air" {
        step(&mut machine, &mut ctx);
        fall_frames += 1;
        if fall_frames as f32 * DT > ctx.tunables.time_to_apex {
            ctx.sensor.grounded = true;
        }
        assert!(fall_frames < 600, "never landed");
    }
    assert_eq!(machine.state_name(), "Move");
    assert!(fall_frames <= ascent_frames + 30);
}

#[test]
fn tapping_jump_produces_a_lower_hop_than_holding_it() {
    let apex_height = |hold: bool| -> f32 {
        let mut ctx = fresh_ctx();
        let mut machine: Machine<StateCtx> = Machine::new(Box::new(MoveState::new()));
        step(&mut machine, &mut ctx);
        ctx.input.jump_pressed = true;
        ctx.last_jump_pressed = ctx.now;
        step(&mut machine, &mut ctx);
        ctx.sensor.grounded = false;

        let mut height: f32 = 0.0;
        let mut y = 0.0;
        let mut released = false;
        for _ in 0..600 {
            if !hold && !released && ctx.forces.vertical > 0.0 {
                ctx.input.jump_released = true;
                released = true;
            }
            step(&mut machine, &mut ctx);
            y += ctx.forces.vertical * DT;
            height = height.max(y);
            if ctx.forces.vertical <= 0.0 {
                break;
            }
        }
        height
    };

    let tap = apex_height(false);
    let hold = apex_height(true);
    assert!(
        tap < hold * 0.8,
        "tap height {tap} should be well below hold height {hold}"
    );
}

#[test]
fn knockback_during_a_roll_never_bends_its_path() {
    let mut ctx = fresh_ctx();
    let roll_dir = Vec3::X;
    let mut machine: Machine<StateCtx> = Machine::new(Box::new(RollState::new(roll_dir)));
    step(&mut machine, &mut ctx);
    assert_eq!(machine.state_name(), "Roll");

    // A hit lands every frame of the roll; the locked vector must hold.
    let mut frames = 0;
    while machine.state_name() == "Roll" {
        ctx.forces
            .apply_knockback(Vec3::new(5.0, 0.0, 5.0), Vec3::ZERO);
        step(&mut machine, &mut ctx);
        if machine.state_name() == "Roll" {
            assert_eq!(
                ctx.planar_velocity,
                roll_dir * ctx.tunables.roll_speed,
                "roll path bent at frame {frames}"
            );
            assert_eq!(ctx.forces.impact, Vec3::ZERO);
        }
        frames += 1;
        assert!(frames < 600, "roll never ended");
    }
    assert_eq!(machine.state_name(), "Move");
    assert_eq!(ctx.capsule, CapsuleRequest::Restore);
}

#[test]
fn attack_out_of_a_roll_opens_a_heavy_weapon_window() {
    let mut ctx = fresh_ctx();
    let mut machine: Machine<StateCtx> = Machine::new(Box::new(RollState::new(Vec3::X)));
    step(&mut machine, &mut ctx);

    ctx.input.attack_pressed = true;
    step(&mut machine, &mut ctx);
    assert_eq!(machine.state_name(), "Attack");
    assert_eq!(
        ctx.weapon,
        Some(WeaponRequest {
            active: true,
            heavy: true
        })
    );

    // Ride out the spin; the closing window is heavy too.
    ctx.weapon = None;
    ctx.spin_cycles = ctx.tunables.attack_spin_cap;
    step(&mut machine, &mut ctx);
    assert_eq!(machine.state_name(), "Move");
    assert_eq!(
        ctx.weapon,
        Some(WeaponRequest {
            active: false,
            heavy: true
        })
    );
}

#[test]
fn a_standalone_attack_stays_light() {
    let mut ctx = fresh_ctx();
    let mut machine: Machine<StateCtx> = Machine::new(Box::new(AttackState::new(false)));
    step(&mut machine, &mut ctx);
    assert_eq!(
        ctx.weapon,
        Some(WeaponRequest {
            active: true,
            heavy: false
        })
    );
}

#[test]
fn stomp_bounce_chains_into_a_second_bounce() {
    let mut ctx = fresh_ctx();
    ctx.sensor.grounded = false;
    ctx.forces.vertical = -8.0;
    let mut machine: Machine<StateCtx> = Machine::new(Box::new(AirState::falling(LaunchParams {
        dir: Vec3::ZERO,
        speed: 0.0,
    })));
    step(&mut machine, &mut ctx);

    // First stomp lands: the probe armed a bounce.
    ctx.armed_bounce = Some(10.0);
    step(&mut machine, &mut ctx);
    assert!(ctx.forces.vertical > 9.0);

    // Fall again onto a second target.
    while ctx.forces.vertical > -1.0 {
        step(&mut machine, &mut ctx);
    }
    ctx.armed_bounce = Some(10.0);
    step(&mut machine, &mut ctx);
    assert!(ctx.forces.vertical > 9.0);
    assert_eq!(machine.state_name(), "Air");
}

#[test]
fn knockback_fades_out_within_the_smoothing_window() {
    let mut ctx = fresh_ctx();
    let mut machine: Machine<StateCtx> = Machine::new(Box::new(MoveState::new()));
    step(&mut machine, &mut ctx);

    ctx.forces
        .apply_knockback(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO);
    let initial = ctx.forces.impact.length();
    assert!(initial > 0.0);

    let mut previous = initial;
    // A few multiples of the smooth time, then the rest snap has the push
    // fully zeroed.
    let frames = (ctx.tunables.knockback_smooth_time * 5.0 / DT) as usize;
    for _ in 0..frames {
        step(&mut machine, &mut ctx);
        let magnitude = ctx.forces.impact.length();
        assert!(magnitude <= previous + 1e-4, "impact grew back");
        previous = magnitude;
    }
    assert_eq!(ctx.forces.impact, Vec3::ZERO, "impact never reached rest");
}
