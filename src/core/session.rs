//! Game session bookkeeping and persistence.
//!
//! The session owns everything that outlives a single life: coins, lives,
//! unlocked abilities, and the active checkpoint. It replaces the global
//! game-manager/checkpoint singletons of the original design; systems that
//! need it receive it as an explicit resource.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default save file location, relative to the working directory.
pub const SAVE_PATH: &str = "save/session.ron";

/// Errors that can occur while persisting the session record.
#[derive(Debug, Error)]
pub enum SaveError {
    /// File could not be read or written.
    #[error("Failed to access save file '{path}': {details}")]
    Io { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in save file '{path}': {details}")]
    Parse { path: String, details: String },

    /// RON serialization failed.
    #[error("Failed to serialize session: {0}")]
    Serialize(String),
}

/// Abilities the player has unlocked so far.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Abilities {
    pub double_jump: bool,
}

/// The flat record written to disk on checkpoint activation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SaveData {
    pub coins: u32,
    pub lives: u32,
    pub abilities: Abilities,
    /// World position of the last activated checkpoint, if any.
    pub checkpoint: Option<(f32, f32, f32)>,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            coins: 0,
            lives: 3,
            abilities: Abilities::default(),
            checkpoint: None,
        }
    }
}

/// Live session state, injected into systems instead of accessed statically.
#[derive(Resource, Clone, Debug)]
pub struct GameSession {
    pub coins: u32,
    pub lives: u32,
    pub abilities: Abilities,
    pub checkpoint: Option<Vec3>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::from_save(SaveData::default())
    }
}

impl GameSession {
    pub fn from_save(data: SaveData) -> Self {
        Self {
            coins: data.coins,
            lives: data.lives,
            abilities: data.abilities,
            checkpoint: data.checkpoint.map(|(x, y, z)| Vec3::new(x, y, z)),
        }
    }

    pub fn to_save(&self) -> SaveData {
        SaveData {
            coins: self.coins,
            lives: self.lives,
            abilities: self.abilities,
            checkpoint: self.checkpoint.map(|p| (p.x, p.y, p.z)),
        }
    }

    pub fn add_coin(&mut self) {
        self.coins += 1;
    }

    /// Consume one life. Returns false when no lives remain.
    pub fn lose_life(&mut self) -> bool {
        if self.lives == 0 {
            return false;
        }
        self.lives -= 1;
        self.lives > 0
    }

    /// Where the player respawns after losing a life.
    pub fn respawn_point(&self, fallback: Vec3) -> Vec3 {
        self.checkpoint.unwrap_or(fallback)
    }
}

/// Load the session record, falling back to defaults when no save exists.
pub fn load_session(path: &str) -> Result<SaveData, SaveError> {
    if !Path::new(path).exists() {
        return Ok(SaveData::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| SaveError::Io {
        path: path.to_string(),
        details: e.to_string(),
    })?;

    ron::from_str(&contents).map_err(|e| SaveError::Parse {
        path: path.to_string(),
        details: e.to_string(),
    })
}

/// Write the session record, creating the save directory if needed.
pub fn store_session(path: &str, data: &SaveData) -> Result<(), SaveError> {
    let serialized = ron::ser::to_string_pretty(data, Default::default())
        .map_err(|e| SaveError::Serialize(e.to_string()))?;

    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).map_err(|e| SaveError::Io {
            path: path.to_string(),
            details: e.to_string(),
        })?;
    }

    fs::write(path, serialized).map_err(|e| SaveError::Io {
        path: path.to_string(),
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_round_trip_preserves_record() {
        let data = SaveData {
            coins: 42,
            lives: 2,
            abilities: Abilities { double_jump: true },
            checkpoint: Some((1.0, 2.0, 3.0)),
        };
        let text = ron::ser::to_string_pretty(&data, Default::default()).unwrap();
        let back: SaveData = ron::from_str(&text).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn losing_the_last_life_reports_game_over() {
        let mut session = GameSession::from_save(SaveData {
            lives: 1,
            ..Default::default()
        });
        assert!(!session.lose_life());
        assert_eq!(session.lives, 0);
        assert!(!session.lose_life());
    }

    #[test]
    fn respawn_prefers_the_checkpoint() {
        let mut session = GameSession::default();
        let fallback = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(session.respawn_point(fallback), fallback);
        session.checkpoint = Some(Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(session.respawn_point(fallback), Vec3::new(5.0, 0.0, 5.0));
    }
}
