//! Mob population governor for a block-world game server.
//!
//! [`manager::MobManager`] decides which spawns are admitted and which idle
//! monsters are purged; [`listener::EntityListener`] feeds it engine events.
//! The engine itself is abstracted behind [`host::Host`], with
//! [`sim::SimWorld`] as an in-memory implementation driven by [`engine`].

pub mod bounded;
pub mod classify;
pub mod clock;
pub mod config;
pub mod engine;
pub mod grinder;
pub mod host;
pub mod keys;
pub mod listener;
pub mod manager;
pub mod report;
pub mod rng;
pub mod sim;
pub mod store;
pub mod systems;
pub mod telemetry;

pub use config::{ConfigError, MobConfig};
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use listener::EntityListener;
pub use manager::{MobManager, SweepStats};
