//! Combat plugin - weapon window, contact detection, hit routing.

use bevy::prelude::*;

use super::weapon::{
    apply_weapon_window, detect_weapon_contacts, route_weapon_hits, WeaponContactEvent,
    WeaponDamage,
};
use crate::core::GameState;
use crate::player::{Player, PlayerSet};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WeaponContactEvent>()
            // The window reacts to the tick's requests, then contacts are
            // gathered and routed, all after the player tick.
            .add_systems(
                Update,
                (
                    attach_weapon,
                    apply_weapon_window,
                    detect_weapon_contacts,
                    route_weapon_hits,
                )
                    .chain()
                    .after(PlayerSet::Tick)
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

/// Give the player its weapon once it exists.
fn attach_weapon(
    mut commands: Commands,
    query: Query<Entity, (With<Player>, Without<WeaponDamage>)>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert(WeaponDamage::default());
    }
}
