//! Player module - the control core: input, forces, state machine, stomping.

pub mod components;
pub mod forces;
pub mod input;
pub mod machine;
pub mod movement;
pub mod plugin;
pub mod states;
pub mod stomp;

pub use components::{
    AnimationSink, CameraFrame, GroundSensor, Player, PlayerHealth, PlayerTimers, PlayerTunables,
    ShieldActive, SurfaceKind,
};
pub use forces::ForceReceiver;
pub use input::{InputReader, InputSnapshot};
pub use machine::{CapsuleRequest, Machine, State, StateCtx, WeaponRequest};
pub use movement::{PendingMove, PlayerMachine};
pub use plugin::{PlayerPlugin, PlayerSet};
pub use states::{AirState, AttackState, FallState, LaunchParams, MoveState, PausingState, RollState, ShieldState};
pub use stomp::ArmedBounce;
