//! Pixel Survivors simulation core.
//!
//! A single hero auto-fights waves of enemies, levels up through upgrade
//! choices and collects drops. Rendering, menus and input polling live
//! outside this crate; they talk to [`GameState`] through its entry points,
//! [`GameEvent`]s and render snapshots.

pub mod class;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod events;
pub mod passive;
pub mod persistence;
pub mod pickup;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod snapshot;
pub mod spawner;
pub mod state;
mod update;
pub mod vacuum;
pub mod weapons;
pub mod world;

pub use class::{Form, PlayerClass};
pub use config::GameConfig;
pub use events::{GameEvent, RunSummary};
pub use state::{GamePhase, GameState};
pub use world::WorldState;
