//! Vertical velocity and knockback integration for the player.
//!
//! The force receiver is the only channel through which external forces move
//! the player: states read its combined movement vector, they never write
//! world positions directly. Knockback decays with critically damped
//! smoothing so its influence vanishes within a bounded, tunable window.

use bevy::prelude::*;

/// Small downward velocity applied while grounded so the character stays
/// stuck to slopes instead of hopping down them.
const GROUND_STICK: f32 = -1.5;

/// Knockback below this speed snaps straight to rest.
const KNOCKBACK_REST: f32 = 0.05;

/// Integrates gravity, jump impulses, and horizontal knockback.
#[derive(Component, Clone, Copy, Debug)]
pub struct ForceReceiver {
    /// Signed vertical velocity, gravity-integrated.
    pub vertical: f32,
    /// Horizontal knockback vector, damped toward zero.
    pub impact: Vec3,
    impact_velocity: Vec3,
    /// Downward acceleration (negative), derived from jump tuning.
    gravity: f32,
    /// Gravity multiplier while descending, for snappier falls.
    fall_multiplier: f32,
    /// Seconds for knockback influence to smooth out.
    knockback_smooth_time: f32,
    knockback_strength: f32,
    /// Fixed upward pop applied with every knockback.
    knockback_pop: f32,
}

impl ForceReceiver {
    pub fn new(
        gravity: f32,
        fall_multiplier: f32,
        knockback_strength: f32,
        knockback_smooth_time: f32,
    ) -> Self {
        Self {
            vertical: 0.0,
            impact: Vec3::ZERO,
            impact_velocity: Vec3::ZERO,
            gravity,
            fall_multiplier,
            knockback_smooth_time,
            knockback_strength,
            knockback_pop: 4.0,
        }
    }

    /// Add a jump impulse. Additive, so a stomp bounce landing into another
    /// jump in the same tick stacks correctly.
    pub fn jump(&mut self, force: f32) {
        self.vertical += force;
    }

    /// Halve remaining upward velocity if still ascending (variable jump
    /// height on early release).
    pub fn cancel_jump(&mut self) {
        if self.vertical > 0.0 {
            self.vertical *= 0.5;
        }
    }

    /// Push the player horizontally away from `source`, with an upward pop.
    pub fn apply_knockback(&mut self, source: Vec3, at: Vec3) {
        let mut away = at - source;
        away.y = 0.0;
        let dir = away.normalize_or_zero();
        self.impact += dir * self.knockback_strength;
        self.vertical = self.knockback_pop;
    }

    /// Zero out horizontal knockback (roll entry - knockback must not hijack
    /// the roll direction).
    pub fn clear_horizontal(&mut self) {
        self.impact = Vec3::ZERO;
        self.impact_velocity = Vec3::ZERO;
    }

    /// Per-tick integration of gravity and knockback decay.
    pub fn integrate(&mut self, dt: f32, grounded: bool) {
        if grounded && self.vertical < 0.0 {
            self.vertical = GROUND_STICK;
        } else if self.vertical < 0.0 {
            self.vertical += self.gravity * self.fall_multiplier * dt;
        } else {
            self.vertical += self.gravity * dt;
        }

        self.impact = smooth_damp(
            self.impact,
            Vec3::ZERO,
            &mut self.impact_velocity,
            self.knockback_smooth_time,
            dt,
        );
        // The damped tail is asymptotic; below a perceptible floor the push
        // snaps to rest so the decay window stays bounded.
        if self.impact.length_squared() < KNOCKBACK_REST * KNOCKBACK_REST {
            self.impact = Vec3::ZERO;
            self.impact_velocity = Vec3::ZERO;
        }
    }

    /// Combined per-tick displacement velocity from external forces.
    pub fn movement(&self) -> Vec3 {
        self.impact + Vec3::Y * self.vertical
    }
}

/// Critically damped spring toward `target`, reaching it (within epsilon) in
/// roughly `smooth_time` seconds.
fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * exp;
    target + (change + temp) * exp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> ForceReceiver {
        // gravity derived from jumpHeight=2, timeToApex=0.5
        ForceReceiver::new(-16.0, 2.0, 6.0, 0.3)
    }

    #[test]
    fn jump_impulses_are_additive() {
        let mut forces = receiver();
        forces.jump(8.0);
        forces.jump(4.0);
        assert_eq!(forces.vertical, 12.0);
    }

    #[test]
    fn cancel_jump_halves_only_upward_velocity() {
        let mut forces = receiver();
        forces.jump(8.0);
        forces.cancel_jump();
        assert_eq!(forces.vertical, 4.0);

        forces.vertical = -3.0;
        forces.cancel_jump();
        assert_eq!(forces.vertical, -3.0);
    }

    #[test]
    fn knockback_pushes_away_from_source_with_upward_pop() {
        let mut forces = receiver();
        forces.apply_knockback(Vec3::new(-1.0, 0.0, 0.0), Vec3::ZERO);
        assert!(forces.impact.x > 0.0);
        assert_eq!(forces.impact.y, 0.0);
        assert!(forces.vertical > 0.0);
    }

    #[test]
    fn knockback_snaps_to_rest_within_a_few_smooth_times() {
        let mut forces = receiver();
        forces.apply_knockback(Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO);
        let initial = forces.impact.length();
        assert!(initial > 0.0);

        let dt = 1.0 / 60.0;
        let mut previous = initial;
        // The critically damped tail needs a few multiples of the smooth
        // time before the rest snap catches it.
        let ticks = (5.0 * 0.3 / dt) as usize;
        for _ in 0..ticks {
            forces.integrate(dt, true);
            let now = forces.impact.length();
            assert!(now <= previous + 1e-6, "impact magnitude must not grow");
            previous = now;
        }
        assert_eq!(forces.impact, Vec3::ZERO);
    }

    #[test]
    fn grounded_descent_sticks_to_the_ground() {
        let mut forces = receiver();
        forces.vertical = -10.0;
        forces.integrate(1.0 / 60.0, true);
        assert_eq!(forces.vertical, -1.5);
    }

    #[test]
    fn falling_uses_the_fall_multiplier() {
        let dt = 1.0 / 60.0;

        let mut rising = receiver();
        rising.vertical = 5.0;
        rising.integrate(dt, false);
        let rise_delta = 5.0 - rising.vertical;

        let mut falling = receiver();
        falling.vertical = -5.0;
        falling.integrate(dt, false);
        let fall_delta = -5.0 - falling.vertical;

        assert!(fall_delta > rise_delta, "descent must accelerate faster");
    }
}
