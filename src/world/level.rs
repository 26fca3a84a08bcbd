//! Level assembly: terrain, props, enemies and the boss arenas.

use bevy::prelude::*;

use super::platforms::{spawn_ground, spawn_moving_platform};
use super::props::{
    spawn_checkpoint, spawn_coin, spawn_crate, spawn_explosive, spawn_jump_pad,
};
use crate::bosses::{plant::spawn_plant, shaman::spawn_shaman};
use crate::enemies::{spawn_enemy, EnemyRegistry};

/// Marker on the root of spawned level content, so re-entering gameplay does
/// not double-spawn the world.
#[derive(Component)]
pub struct LevelRoot;

pub fn setup_level(
    mut commands: Commands,
    registry: Res<EnemyRegistry>,
    existing: Query<(), With<LevelRoot>>,
) {
    if !existing.is_empty() {
        return;
    }
    commands.spawn((LevelRoot, Transform::default(), GlobalTransform::default()));

    // Terrain.
    spawn_ground(&mut commands, Vec3::new(0.0, -0.5, 0.0), Vec3::new(30.0, 0.5, 30.0));
    spawn_ground(&mut commands, Vec3::new(8.0, 1.0, 6.0), Vec3::new(2.0, 0.3, 2.0));
    spawn_moving_platform(
        &mut commands,
        vec![Vec3::new(4.0, 1.5, -4.0), Vec3::new(10.0, 1.5, -4.0)],
        2.0,
    );

    // Props.
    spawn_crate(&mut commands, Vec3::new(3.0, 0.5, 2.0));
    spawn_crate(&mut commands, Vec3::new(3.5, 0.5, 3.0));
    spawn_explosive(&mut commands, Vec3::new(-4.0, 0.6, 5.0));
    spawn_jump_pad(&mut commands, Vec3::new(6.0, 0.2, 0.0), 14.0);
    spawn_checkpoint(&mut commands, Vec3::new(0.0, 1.0, 10.0));
    for x in 0..4 {
        spawn_coin(&mut commands, Vec3::new(-2.0 + x as f32, 0.8, -3.0));
    }

    // Enemies from the data registry.
    if let Some(goblin) = registry.get("goblin") {
        spawn_enemy(
            &mut commands,
            goblin,
            Vec3::new(-6.0, 0.0, -6.0),
            vec![Vec3::new(-6.0, 0.0, -6.0), Vec3::new(-6.0, 0.0, 2.0)],
        );
    } else {
        warn!("No 'goblin' definition loaded; skipping patrol spawns");
    }
    if let Some(armored) = registry.get("armored_goblin") {
        spawn_enemy(&mut commands, armored, Vec3::new(10.0, 0.0, 10.0), Vec::new());
    }
    if let Some(shroom) = registry.get("shroom") {
        spawn_enemy(&mut commands, shroom, Vec3::new(-10.0, 0.0, 8.0), Vec::new());
    }

    // Boss arenas, far apart.
    spawn_shaman(
        &mut commands,
        Vec3::new(0.0, 0.5, 24.0),
        Vec3::new(0.0, 0.5, 16.0),
        vec![
            Vec3::new(-1.0, 1.5, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(1.0, 1.5, 0.0),
        ],
    );
    spawn_plant(
        &mut commands,
        Vec3::new(-22.0, 0.0, -22.0),
        vec![
            Vec3::new(-20.0, 0.0, -22.0),
            Vec3::new(-24.0, 0.0, -22.0),
            Vec3::new(-22.0, 0.0, -20.0),
            Vec3::new(-22.0, 0.0, -24.0),
            Vec3::new(-20.0, 0.0, -20.0),
            Vec3::new(-24.0, 0.0, -24.0),
        ],
        "goblin",
    );

    info!("Level assembled");
}
