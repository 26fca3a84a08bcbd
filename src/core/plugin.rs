//! Core plugin that sets up game states, events, the session, and game flow.

use bevy::prelude::*;

use super::events::*;
use super::session::{load_session, GameSession, SAVE_PATH};
use super::states::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, MainMenu, InGame, etc.)
/// - Global events (KillEnemyEvent, StompedEvent, etc.)
/// - The persistent session resource and basic game-flow systems
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()
            // Register global events
            .add_event::<PlayerDamageEvent>()
            .add_event::<KillEnemyEvent>()
            .add_event::<StompedEvent>()
            .add_event::<BossDamageEvent>()
            .add_event::<WeaponWindowEvent>()
            .add_event::<BreakCrateEvent>()
            .add_event::<TriggerExplosionEvent>()
            .add_event::<SpinCycleEvent>()
            .add_event::<CheckpointEvent>()
            .add_event::<RewardEvent>()
            .add_event::<CoinCollectedEvent>()
            .add_event::<PlayerDiedEvent>()
            .add_event::<VictoryEvent>()
            // Loading state - read the saved session, then to MainMenu
            .add_systems(OnEnter(GameState::Loading), load_saved_session)
            // Pause/unpause with Escape key
            .add_systems(
                Update,
                handle_pause_input
                    .run_if(in_state(GameState::InGame).or(in_state(GameState::Paused))),
            )
            // Menu confirm starts the run; end screens return to the menu
            .add_systems(Update, start_game.run_if(in_state(GameState::MainMenu)))
            .add_systems(
                Update,
                return_to_menu
                    .run_if(in_state(GameState::GameOver).or(in_state(GameState::Victory))),
            )
            // Coin bookkeeping and victory flow run in all play states
            .add_systems(Update, (collect_coins, handle_victory));
    }
}

/// Read the session record from disk and move on to the main menu.
fn load_saved_session(mut commands: Commands, mut next_state: ResMut<NextState<GameState>>) {
    match load_session(SAVE_PATH) {
        Ok(data) => {
            info!(
                "Loaded session: {} coins, {} lives, checkpoint: {:?}",
                data.coins, data.lives, data.checkpoint
            );
            commands.insert_resource(GameSession::from_save(data));
        }
        Err(e) => {
            warn!("Failed to load session, starting fresh: {}", e);
            commands.insert_resource(GameSession::default());
        }
    }
    next_state.set(GameState::MainMenu);
}

/// Start or continue a run from the main menu.
fn start_game(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) || keyboard.just_pressed(KeyCode::Space) {
        info!("Starting game");
        next_state.set(GameState::InGame);
    }
}

/// Leave the game-over or victory screen back to the menu with a fresh
/// session (the save file still holds the last checkpoint).
fn return_to_menu(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        match load_session(SAVE_PATH) {
            Ok(data) => commands.insert_resource(GameSession::from_save(data)),
            Err(_) => commands.insert_resource(GameSession::default()),
        }
        next_state.set(GameState::MainMenu);
    }
}

/// Handle Escape key to pause/unpause the game.
fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current_state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        match current_state.get() {
            GameState::InGame => next_state.set(GameState::Paused),
            GameState::Paused => next_state.set(GameState::InGame),
            _ => {}
        }
    }
}

/// Count collected coins into the session.
fn collect_coins(mut events: EventReader<CoinCollectedEvent>, session: Option<ResMut<GameSession>>) {
    let Some(mut session) = session else {
        return;
    };
    for _ in events.read() {
        session.add_coin();
    }
}

/// A boss death ends the run in victory.
fn handle_victory(
    mut events: EventReader<VictoryEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().next().is_some() {
        info!("Boss defeated! Transitioning to Victory...");
        next_state.set(GameState::Victory);
    }
}
