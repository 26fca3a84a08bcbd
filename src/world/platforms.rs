//! Walkable surfaces and moving platforms.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Landing-surface tag read by the player's ground probe. Landing only
/// completes on tagged surfaces.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceTag {
    Walkable,
    MovingPlatform,
}

/// A platform shuttling between waypoints. Its current velocity is reported
/// to the ground probe so a standing player rides along.
#[derive(Component, Clone, Debug)]
pub struct MovingPlatform {
    pub waypoints: Vec<Vec3>,
    pub next: usize,
    pub speed: f32,
    /// Velocity over the last update, world units per second.
    pub velocity: Vec3,
}

impl MovingPlatform {
    pub fn new(waypoints: Vec<Vec3>, speed: f32) -> Self {
        Self {
            waypoints,
            next: 0,
            speed,
            velocity: Vec3::ZERO,
        }
    }
}

/// Spawn a static walkable slab.
pub fn spawn_ground(commands: &mut Commands, position: Vec3, half_extents: Vec3) -> Entity {
    commands
        .spawn((
            SurfaceTag::Walkable,
            Transform::from_translation(position),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        ))
        .id()
}

/// Spawn a platform that shuttles along `waypoints`.
pub fn spawn_moving_platform(
    commands: &mut Commands,
    waypoints: Vec<Vec3>,
    speed: f32,
) -> Entity {
    let start = waypoints.first().copied().unwrap_or_default();
    commands
        .spawn((
            SurfaceTag::MovingPlatform,
            MovingPlatform::new(waypoints, speed),
            Transform::from_translation(start),
            GlobalTransform::default(),
            Visibility::default(),
            Collider::cuboid(1.5, 0.2, 1.5),
        ))
        .id()
}

/// One integration step toward the current waypoint. Snaps onto the
/// waypoint when within reach and wraps to the next one.
fn advance_platform(position: &mut Vec3, platform: &mut MovingPlatform, dt: f32) {
    if platform.waypoints.is_empty() {
        platform.velocity = Vec3::ZERO;
        return;
    }

    let target = platform.waypoints[platform.next];
    let to_target = target - *position;
    let distance = to_target.length();
    let step = platform.speed * dt;

    if distance <= step {
        *position = target;
        platform.next = (platform.next + 1) % platform.waypoints.len();
        platform.velocity = to_target / dt;
    } else {
        let motion = to_target / distance * step;
        *position += motion;
        platform.velocity = motion / dt;
    }
}

/// Advance moving platforms toward their next waypoint.
pub fn move_platforms(time: Res<Time>, mut query: Query<(&mut Transform, &mut MovingPlatform)>) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (mut transform, mut platform) in query.iter_mut() {
        advance_platform(&mut transform.translation, &mut platform, dt);
    }
}
