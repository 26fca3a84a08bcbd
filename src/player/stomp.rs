//! Stomp resolution: landing on top of enemies and props.
//!
//! The probe runs while the player is airborne and descending. When it finds
//! a stompable target underfoot it computes the bounce force (amplified if
//! jump is held at the moment of landing), arms the Air state's re-launch,
//! and emits the target's stomp event - bounce and destruction are decided
//! in one step, not across frames.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{GroundSensor, Player};
use super::forces::ForceReceiver;
use super::input::InputReader;
use crate::core::StompedEvent;
use crate::world::props::Stompable;

/// How far below the capsule bottom the stomp probe reaches.
const PROBE_DISTANCE: f32 = 0.3;

/// Pending stomp bounce, consumed by the Air state on its next tick.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct ArmedBounce(pub Option<f32>);

/// Airborne, descending, and no bounce already pending. Grounded players
/// always carry the ground-stick velocity, so the grounded check is what
/// keeps walking over a jump pad from arming a bounce.
fn probe_active(sensor: &GroundSensor, forces: &ForceReceiver, armed: &ArmedBounce) -> bool {
    !sensor.grounded && forces.vertical < 0.0 && armed.0.is_none()
}

/// Probe below the player for stompable targets while falling.
pub fn stomp_probe(
    rapier_context: Query<&RapierContext>,
    mut player_query: Query<
        (
            Entity,
            &Transform,
            &ForceReceiver,
            &InputReader,
            &GroundSensor,
            &mut ArmedBounce,
        ),
        With<Player>,
    >,
    stompables: Query<&Stompable>,
    mut stomp_events: EventWriter<StompedEvent>,
) {
    let Ok((player_entity, transform, forces, input, sensor, mut armed)) =
        player_query.get_single_mut()
    else {
        return;
    };

    if !probe_active(sensor, forces, &armed) {
        return;
    }

    let Ok(context) = rapier_context.get_single() else {
        return;
    };

    let ray_origin = transform.translation - Vec3::Y * 0.75;
    let Some((hit_entity, _)) = context.cast_ray(
        ray_origin,
        Vec3::NEG_Y,
        PROBE_DISTANCE,
        true,
        QueryFilter::default().exclude_collider(player_entity),
    ) else {
        return;
    };

    let Ok(stompable) = stompables.get(hit_entity) else {
        return;
    };

    let boost = if input.snapshot.jump_held {
        stompable.jump_boost
    } else {
        1.0
    };
    armed.0 = Some(stompable.bounce_force * boost);
    stomp_events.send(StompedEvent { target: hit_entity });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descending_forces() -> ForceReceiver {
        let mut forces = ForceReceiver::new(-16.0, 1.8, 6.0, 0.3);
        forces.vertical = -1.5;
        forces
    }

    #[test]
    fn grounded_players_never_arm_a_bounce() {
        // Walking carries the ground-stick velocity; that alone must not
        // trigger the probe.
        let sensor = GroundSensor {
            grounded: true,
            ..Default::default()
        };
        assert!(!probe_active(
            &sensor,
            &descending_forces(),
            &ArmedBounce::default()
        ));
    }

    #[test]
    fn probe_runs_only_while_airborne_descending_and_unarmed() {
        let airborne = GroundSensor::default();
        let forces = descending_forces();
        assert!(probe_active(&airborne, &forces, &ArmedBounce::default()));

        let mut rising = forces;
        rising.vertical = 3.0;
        assert!(!probe_active(&airborne, &rising, &ArmedBounce::default()));

        assert!(!probe_active(&airborne, &forces, &ArmedBounce(Some(9.0))));
    }

    #[test]
    fn bounce_force_is_boosted_while_jump_is_held() {
        let stompable = Stompable {
            bounce_force: 10.0,
            jump_boost: 1.5,
            breaks: true,
        };
        assert_eq!(stompable.bounce_force * stompable.jump_boost, 15.0);
    }
}
