//! Semantic input sampling for the player.
//!
//! Raw key state is sampled once per frame into a snapshot of edge events
//! (jump pressed/released, attack, roll) and level state (move axis, shield
//! held, jump held). States consume the snapshot, never the raw input
//! resource, which keeps them testable and lets the Pausing state disable
//! input wholesale.

use bevy::prelude::*;

/// Per-frame semantic input snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputSnapshot {
    /// Raw 2D movement axis: +y forward, +x right. Not normalized.
    pub move_axis: Vec2,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub attack_pressed: bool,
    pub roll_pressed: bool,
    pub shield_held: bool,
    pub jump_held: bool,
}

/// Component holding the player's sampled input and press timestamps.
#[derive(Component, Clone, Copy, Debug)]
pub struct InputReader {
    pub snapshot: InputSnapshot,
    /// Seconds-since-startup of the last jump press, for jump buffering.
    pub last_jump_pressed: f32,
    /// Cleared by the Pausing state; restored on its exit.
    pub enabled: bool,
}

impl Default for InputReader {
    fn default() -> Self {
        Self {
            snapshot: InputSnapshot::default(),
            last_jump_pressed: f32::NEG_INFINITY,
            enabled: true,
        }
    }
}

impl InputReader {
    /// Consume the buffered jump press so it cannot trigger twice.
    pub fn consume_jump_buffer(&mut self) {
        self.last_jump_pressed = f32::NEG_INFINITY;
    }
}

/// Sample keyboard state into the player's input reader.
pub fn read_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<&mut InputReader>,
) {
    let Ok(mut reader) = query.get_single_mut() else {
        return;
    };

    if !reader.enabled {
        reader.snapshot = InputSnapshot::default();
        return;
    }

    let mut axis = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }

    let jump_pressed = keyboard.just_pressed(KeyCode::Space);

    reader.snapshot = InputSnapshot {
        move_axis: axis,
        jump_pressed,
        jump_released: keyboard.just_released(KeyCode::Space),
        attack_pressed: keyboard.just_pressed(KeyCode::KeyJ),
        roll_pressed: keyboard.just_pressed(KeyCode::KeyK),
        shield_held: keyboard.pressed(KeyCode::KeyL),
        jump_held: keyboard.pressed(KeyCode::Space),
    };

    if jump_pressed {
        reader.last_jump_pressed = time.elapsed_secs();
    }
}
