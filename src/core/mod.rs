//! Core module - game states, global events, routines, and the session.

pub mod events;
pub mod plugin;
pub mod routine;
pub mod session;
pub mod states;

pub use events::*;
pub use plugin::CorePlugin;
pub use routine::Routine;
pub use session::{
    load_session, store_session, Abilities, GameSession, SaveData, SaveError, SAVE_PATH,
};
pub use states::GameState;
