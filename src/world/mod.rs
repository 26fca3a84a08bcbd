//! World module - terrain tags, interactive props, and level assembly.

pub mod level;
pub mod platforms;
pub mod plugin;
pub mod props;

pub use platforms::{MovingPlatform, SurfaceTag};
pub use plugin::WorldPlugin;
pub use props::{BreakableCrate, Checkpoint, Coin, Explosive, Stompable};
