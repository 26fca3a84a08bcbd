//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. For example,
//! player and enemy systems only run in the InGame state, while menu
//! systems only run in the MainMenu state.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// The game transitions between these states based on player actions:
/// - Start in `Loading` to load data files and the saved session
/// - Move to `MainMenu` when loading completes
/// - Enter `InGame` when the player starts/continues
/// - `Paused` freezes gameplay but keeps the world visible
/// - `GameOver` when the player runs out of lives
/// - `Victory` when the final boss falls
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files and the saved session
    #[default]
    Loading,
    /// Main menu / title screen
    MainMenu,
    /// Active gameplay
    InGame,
    /// Game is paused (overlay on gameplay)
    Paused,
    /// Player is out of lives
    GameOver,
    /// Final boss defeated
    Victory,
}
