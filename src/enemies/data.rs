//! Enemy data loading from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::components::EnemyStats;

/// Movement strategy named in the data file.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub enum BehaviorKind {
    #[default]
    Stationary,
    Patrol,
    Ambush,
}

/// Enemy definition loaded from a RON file.
#[derive(Deserialize, Clone, Debug)]
pub struct EnemyDefinition {
    pub name: String,
    pub damage: f32,
    pub move_speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    #[serde(default)]
    pub armored: bool,
    #[serde(default)]
    pub behavior: BehaviorKind,
    /// Seconds to pause at each patrol waypoint.
    #[serde(default = "default_patrol_pause")]
    pub patrol_pause: f32,
    /// Post-attack movement cooldown for ambushers.
    #[serde(default = "default_ambush_cooldown")]
    pub ambush_cooldown: f32,
}

fn default_patrol_pause() -> f32 {
    1.0
}

fn default_ambush_cooldown() -> f32 {
    0.75
}

impl EnemyDefinition {
    /// Convert to the EnemyStats component.
    pub fn to_stats(&self) -> EnemyStats {
        EnemyStats {
            damage: self.damage,
            move_speed: self.move_speed,
            detection_range: self.detection_range,
            attack_range: self.attack_range,
            attack_cooldown: self.attack_cooldown,
            armored: self.armored,
        }
    }
}

/// Resource holding all loaded enemy definitions.
#[derive(Resource, Default)]
pub struct EnemyRegistry {
    pub definitions: HashMap<String, EnemyDefinition>,
}

impl EnemyRegistry {
    pub fn get(&self, enemy_type: &str) -> Option<&EnemyDefinition> {
        self.definitions.get(enemy_type)
    }
}

/// Load all enemy definitions from the assets/data/enemies/ directory.
pub fn load_enemy_definitions(mut registry: ResMut<EnemyRegistry>) {
    let enemies_dir = Path::new("assets/data/enemies");

    if !enemies_dir.exists() {
        warn!("Enemy definitions directory not found: {:?}", enemies_dir);
        return;
    }

    let Ok(entries) = fs::read_dir(enemies_dir) else {
        warn!("Failed to read enemy definitions directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == "ron") {
            let enemy_type = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();

            match fs::read_to_string(&path) {
                Ok(contents) => match ron::from_str::<EnemyDefinition>(&contents) {
                    Ok(definition) => {
                        info!("Loaded enemy definition: {} ({})", definition.name, enemy_type);
                        registry.definitions.insert(enemy_type, definition);
                    }
                    Err(e) => {
                        error!("Failed to parse enemy definition {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    error!("Failed to read enemy definition {:?}: {}", path, e);
                }
            }
        }
    }

    info!("Loaded {} enemy definitions", registry.definitions.len());
}
