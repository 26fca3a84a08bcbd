//! Combat module - weapon windows, hit dedup, hit routing.

pub mod plugin;
pub mod weapon;

pub use plugin::CombatPlugin;
pub use weapon::{WeaponContactEvent, WeaponDamage};
