//! Per-frame player orchestration: sensing, machine tick, and movement apply.
//!
//! The fixed ordering here is the system's timing contract: input sampling,
//! then ground sensing, then the stomp probe, then the state-machine tick,
//! then the physics move. States themselves never touch Rapier; everything
//! physics-flavored happens in the sensing and apply systems on either side
//! of the tick.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use super::forces::ForceReceiver;
use super::input::InputReader;
use super::machine::{CapsuleRequest, Machine, StateCtx};
use super::states::{resume_state, MoveState, PausingState};
use super::stomp::ArmedBounce;
use crate::core::{
    GameSession, GameState, PlayerDamageEvent, PlayerDiedEvent, SpinCycleEvent, WeaponWindowEvent,
};

/// Standing capsule dimensions.
const CAPSULE_HALF_HEIGHT: f32 = 0.5;
const CAPSULE_RADIUS: f32 = 0.3;
/// Rolling shrinks the capsule to half height.
const ROLL_CAPSULE_HALF_HEIGHT: f32 = 0.25;

/// Platform velocities below this are treated as standing still.
const PLATFORM_VELOCITY_EPSILON: f32 = 0.05;

/// The player's cooperative state machine.
#[derive(Component)]
pub struct PlayerMachine {
    pub machine: Machine<StateCtx>,
}

impl Default for PlayerMachine {
    fn default() -> Self {
        Self {
            machine: Machine::new(Box::new(MoveState::new())),
        }
    }
}

/// Frame displacement computed by the tick, consumed by the apply system.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PendingMove {
    /// World velocity for this frame (planar + forces + platform).
    pub velocity: Vec3,
    /// Direction the character should smoothly rotate toward.
    pub facing: Option<Vec3>,
}

/// Tracks the capsule resize requested by the roll state.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct CapsuleState {
    pub shrunk: bool,
}

/// Emits one spin-cycle event per animation cycle while the spin flag is up.
/// Stands in for the animation clip's per-cycle callback.
#[derive(Resource)]
pub struct SpinClock(pub Timer);

impl Default for SpinClock {
    fn default() -> Self {
        Self(Timer::from_seconds(0.35, TimerMode::Repeating))
    }
}

/// Spawn the player entity with its physics and state components.
pub fn spawn_player(commands: &mut Commands, position: Vec3, tunables: &PlayerTunables) -> Entity {
    commands
        .spawn((
            Player,
            PlayerMachine::default(),
            InputReader::default(),
            PlayerTimers::default(),
            GroundSensor::default(),
            AnimationSink::default(),
            ForceReceiver::new(
                tunables.gravity(),
                tunables.fall_multiplier,
                tunables.knockback_strength,
                tunables.knockback_smooth_time,
            ),
            (
                ArmedBounce::default(),
                PendingMove::default(),
                CapsuleState::default(),
                ShieldActive::default(),
                PlayerHealth::new(6.0),
            ),
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            // Rapier physics components
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS),
            KinematicCharacterController {
                offset: CharacterLength::Absolute(0.01),
                max_slope_climb_angle: 45_f32.to_radians(),
                min_slope_slide_angle: 30_f32.to_radians(),
                snap_to_ground: Some(CharacterLength::Absolute(0.3)),
                ..default()
            },
        ))
        .id()
}

/// Ground and surface probe via a short downward raycast.
///
/// Writes grounded state, the landing-surface kind, and the velocity of a
/// moving platform underfoot so the player rides it without parenting.
pub fn ground_sense(
    time: Res<Time>,
    rapier_context: Query<&RapierContext>,
    mut player_query: Query<
        (
            Entity,
            &Transform,
            &mut GroundSensor,
            Option<&KinematicCharacterControllerOutput>,
        ),
        With<Player>,
    >,
    surfaces: Query<&crate::world::platforms::SurfaceTag>,
    platforms: Query<&crate::world::platforms::MovingPlatform>,
) {
    let Ok((player_entity, transform, mut sensor, output)) = player_query.get_single_mut() else {
        return;
    };

    let dt = time.delta_secs().max(1e-6);
    sensor.vertical_velocity = output
        .map(|o| o.effective_translation.y / dt)
        .unwrap_or(0.0);

    let Ok(context) = rapier_context.get_single() else {
        // No physics context (tests): leave the sensor as externally set.
        return;
    };

    let ray_origin = transform.translation - Vec3::Y * 0.75;
    let hit = context.cast_ray(
        ray_origin,
        Vec3::NEG_Y,
        0.15,
        true,
        QueryFilter::default().exclude_collider(player_entity),
    );

    sensor.grounded = hit.is_some() || output.map(|o| o.grounded).unwrap_or(false);
    sensor.surface = SurfaceKind::None;
    sensor.platform_velocity = Vec3::ZERO;

    if let Some((hit_entity, _)) = hit {
        match surfaces.get(hit_entity) {
            Ok(crate::world::platforms::SurfaceTag::Walkable) => {
                sensor.surface = SurfaceKind::Walkable;
            }
            Ok(crate::world::platforms::SurfaceTag::MovingPlatform) => {
                sensor.surface = SurfaceKind::MovingPlatform;
                if let Ok(platform) = platforms.get(hit_entity) {
                    if platform.velocity.length() > PLATFORM_VELOCITY_EPSILON {
                        sensor.platform_velocity = platform.velocity;
                    }
                }
            }
            Err(_) => {}
        }
    }
}

/// Tick the active state against a by-value context, then write the results
/// back into the player's components.
pub fn tick_state_machine(
    time: Res<Time>,
    game_state: Res<State<GameState>>,
    camera: Res<CameraFrame>,
    tunables: Res<PlayerTunables>,
    session: Res<GameSession>,
    mut spin_events: EventReader<SpinCycleEvent>,
    mut weapon_events: EventWriter<WeaponWindowEvent>,
    mut query: Query<
        (
            &mut PlayerMachine,
            &mut InputReader,
            &mut ForceReceiver,
            &mut PlayerTimers,
            &mut AnimationSink,
            &GroundSensor,
            &Transform,
            &mut ArmedBounce,
            &mut PendingMove,
            &mut CapsuleState,
            &mut ShieldActive,
        ),
        With<Player>,
    >,
) {
    let Ok((
        mut machine,
        mut input,
        mut forces,
        mut timers,
        mut anim,
        sensor,
        transform,
        mut armed,
        mut pending,
        mut capsule,
        mut shield,
    )) = query.get_single_mut()
    else {
        return;
    };

    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    // A pause freezes the force simulation: no gravity or knockback decay
    // accrues while the machine is held in Pausing.
    let paused = matches!(game_state.get(), GameState::Paused);
    if !paused {
        forces.integrate(dt, sensor.grounded);
    }
    if sensor.grounded {
        timers.last_grounded = now;
    }

    let spin_cycles = spin_events.read().count() as u32;

    let mut ctx = StateCtx {
        dt,
        now,
        input: input.snapshot,
        last_jump_pressed: input.last_jump_pressed,
        sensor: *sensor,
        forces: *forces,
        timers: *timers,
        anim: *anim,
        tunables: *tunables,
        camera: *camera,
        facing_dir: (transform.rotation * Vec3::NEG_Z).normalize_or_zero(),
        double_jump_unlocked: session.abilities.double_jump,
        spin_cycles,
        armed_bounce: armed.0,
        planar_velocity: Vec3::ZERO,
        facing: None,
        capsule: CapsuleRequest::Keep,
        weapon: None,
        set_input_enabled: None,
        consume_jump_buffer: false,
    };

    // Pausing is forced from outside the state graph; everything else is
    // the graph's own business. Resuming respects whether the player was
    // airborne when the pause hit.
    if paused && machine.machine.state_name() != "Pausing" {
        machine.machine.switch(Box::new(PausingState), &mut ctx);
    } else if !paused && machine.machine.state_name() == "Pausing" {
        machine.machine.switch(resume_state(ctx.sensor.grounded), &mut ctx);
    } else {
        machine.machine.tick(&mut ctx);
    }

    // Write back everything the state mutated.
    *forces = ctx.forces;
    *timers = ctx.timers;
    *anim = ctx.anim;
    armed.0 = ctx.armed_bounce;
    shield.0 = ctx.anim.is_shielding;

    if ctx.consume_jump_buffer {
        input.consume_jump_buffer();
    }
    if let Some(enabled) = ctx.set_input_enabled {
        input.enabled = enabled;
    }
    if let Some(request) = ctx.weapon {
        weapon_events.send(WeaponWindowEvent {
            active: request.active,
            heavy: request.heavy,
        });
    }
    match ctx.capsule {
        CapsuleRequest::Shrink => capsule.shrunk = true,
        CapsuleRequest::Restore => capsule.shrunk = false,
        CapsuleRequest::Keep => {}
    }

    pending.velocity = ctx.planar_velocity + ctx.forces.movement() + ctx.sensor.platform_velocity;
    pending.facing = ctx.facing;
}

/// Apply the computed frame displacement through the character controller
/// and smooth the facing rotation toward the requested direction.
pub fn apply_movement(
    time: Res<Time>,
    tunables: Res<PlayerTunables>,
    mut query: Query<
        (
            &PendingMove,
            Ref<CapsuleState>,
            &mut Transform,
            &mut Collider,
            &mut KinematicCharacterController,
        ),
        With<Player>,
    >,
) {
    let Ok((pending, capsule, mut transform, mut collider, mut controller)) =
        query.get_single_mut()
    else {
        return;
    };

    let dt = time.delta_secs();
    controller.translation = Some(pending.velocity * dt);

    if let Some(dir) = pending.facing {
        let target = Quat::from_rotation_arc(Vec3::NEG_Z, dir.normalize_or_zero());
        let t = (tunables.rotation_speed * dt).min(1.0);
        transform.rotation = transform.rotation.slerp(target, t);
    }

    // Roll capsule resize; rebuilt only when the shrunk flag actually flips
    // (and once on spawn), not every frame.
    if capsule.is_changed() {
        *collider = Collider::capsule_y(capsule_half_height(capsule.shrunk), CAPSULE_RADIUS);
    }
}

/// Collision capsule half height for the current roll state.
fn capsule_half_height(shrunk: bool) -> f32 {
    if shrunk {
        ROLL_CAPSULE_HALF_HEIGHT
    } else {
        CAPSULE_HALF_HEIGHT
    }
}

/// Drive spin-cycle callbacks while the spin flag is up.
pub fn drive_spin_cycles(
    time: Res<Time>,
    mut clock: ResMut<SpinClock>,
    query: Query<&AnimationSink, With<Player>>,
    mut events: EventWriter<SpinCycleEvent>,
) {
    let Ok(anim) = query.get_single() else {
        return;
    };

    if anim.spinning {
        clock.0.tick(time.delta());
        for _ in 0..clock.0.times_finished_this_tick() {
            events.send(SpinCycleEvent);
        }
    } else {
        clock.0.reset();
    }
}

/// Apply incoming damage: health, i-frames, knockback, death notification.
pub fn apply_player_damage(
    time: Res<Time>,
    mut damage_events: EventReader<PlayerDamageEvent>,
    mut died_events: EventWriter<PlayerDiedEvent>,
    mut query: Query<(&Transform, &mut PlayerHealth, &mut ForceReceiver), With<Player>>,
) {
    let Ok((transform, mut health, mut forces)) = query.get_single_mut() else {
        return;
    };

    health.i_frames = (health.i_frames - time.delta_secs()).max(0.0);

    for event in damage_events.read() {
        if health.is_dead() {
            continue;
        }
        if health.take_damage(event.amount) {
            forces.apply_knockback(event.source_pos, transform.translation);
            if health.is_dead() {
                died_events.send(PlayerDiedEvent);
            }
        }
    }
}

/// Losing all health costs a life; respawn at the checkpoint, or game over.
pub fn handle_player_death(
    mut died_events: EventReader<PlayerDiedEvent>,
    mut session: ResMut<GameSession>,
    mut next_state: ResMut<NextState<crate::core::GameState>>,
    mut query: Query<(&mut Transform, &mut PlayerHealth), With<Player>>,
) {
    if died_events.read().next().is_none() {
        return;
    }
    let Ok((mut transform, mut health)) = query.get_single_mut() else {
        return;
    };

    if session.lose_life() {
        let respawn = session.respawn_point(Vec3::new(0.0, 1.0, 0.0));
        info!("Player died, respawning at {:?} ({} lives left)", respawn, session.lives);
        transform.translation = respawn;
        health.heal_full();
    } else {
        info!("Out of lives! Transitioning to Game Over...");
        next_state.set(crate::core::GameState::GameOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capsule_resize_only_has_two_shapes() {
        assert_eq!(capsule_half_height(true), ROLL_CAPSULE_HALF_HEIGHT);
        assert_eq!(capsule_half_height(false), CAPSULE_HALF_HEIGHT);
        assert!(capsule_half_height(true) < capsule_half_height(false));
    }
}
