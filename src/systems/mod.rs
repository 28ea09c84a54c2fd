mod combat;
mod spawner;
mod wander;

pub use combat::CombatSystem;
pub use spawner::SpawnerSystem;
pub use wander::WanderSystem;
