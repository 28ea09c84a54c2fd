use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::classify::EntityKind;
use crate::keys::BlockPos;
use crate::sim::SimWorld;

fn default_tick_millis() -> u64 {
    50
}

fn default_spawn_radius() -> u32 {
    3
}

fn default_attempts_per_tick() -> u32 {
    1
}

fn default_wander_chance() -> f64 {
    0.2
}

fn default_target_chance() -> f64 {
    0.05
}

fn default_melee_chance() -> f64 {
    0.02
}

fn default_arrow_chance() -> f64 {
    0.01
}

fn default_hazard_chance() -> f64 {
    0.001
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    /// Wall-clock length of one tick.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    pub worlds: Vec<ScenarioWorld>,
    #[serde(default)]
    pub spawning: Spawning,
    #[serde(default)]
    pub behaviour: Behaviour,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioWorld {
    pub name: String,
    #[serde(default)]
    pub loaded_radius: Option<u32>,
    #[serde(default)]
    pub players: Vec<ScenarioPlayer>,
    #[serde(default)]
    pub residents: Vec<Residents>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPlayer {
    pub name: String,
    pub at: BlockPos,
}

/// A group of mobs present when the scenario starts, scattered up to
/// `spread` blocks around `at`.
#[derive(Debug, Clone, Deserialize)]
pub struct Residents {
    pub kind: EntityKind,
    pub count: u32,
    pub at: BlockPos,
    #[serde(default)]
    pub spread: i32,
    #[serde(default)]
    pub tamed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Spawning {
    #[serde(default = "default_attempts_per_tick")]
    pub attempts_per_tick: u32,
    /// Spawns land within this many chunks of a random player.
    #[serde(default = "default_spawn_radius")]
    pub radius_chunks: u32,
    #[serde(default)]
    pub weights: BTreeMap<EntityKind, u32>,
}

impl Default for Spawning {
    fn default() -> Self {
        Self {
            attempts_per_tick: default_attempts_per_tick(),
            radius_chunks: default_spawn_radius(),
            weights: BTreeMap::new(),
        }
    }
}

/// Per-tick, per-mob probabilities.
#[derive(Debug, Clone, Deserialize)]
pub struct Behaviour {
    #[serde(default = "default_wander_chance")]
    pub wander_chance: f64,
    #[serde(default = "default_target_chance")]
    pub target_chance: f64,
    #[serde(default = "default_melee_chance")]
    pub melee_chance: f64,
    #[serde(default = "default_arrow_chance")]
    pub arrow_chance: f64,
    /// Lethal damage from the environment (lava, falls); no attacker.
    #[serde(default = "default_hazard_chance")]
    pub hazard_chance: f64,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            wander_chance: default_wander_chance(),
            target_chance: default_target_chance(),
            melee_chance: default_melee_chance(),
            arrow_chance: default_arrow_chance(),
            hazard_chance: default_hazard_chance(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Build the starting world. Resident placement is seeded, so the same
    /// scenario always yields the same world.
    pub fn build_world(&self) -> SimWorld {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut world = SimWorld::new();
        for layout in &self.worlds {
            world.add_world(layout.name.clone(), layout.loaded_radius);
            for player in &layout.players {
                world.add_player(&layout.name, player.name.clone(), player.at);
            }
            for group in &layout.residents {
                for _ in 0..group.count {
                    let at = scatter(&mut rng, group.at, group.spread);
                    let handle = world.spawn_mob(&layout.name, group.kind, at);
                    if let Some(mob) = world.mob_mut(handle) {
                        mob.tamed = group.tamed;
                    }
                }
            }
        }
        world
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(2400)
    }
}

pub(crate) fn scatter(rng: &mut impl Rng, at: BlockPos, spread: i32) -> BlockPos {
    if spread <= 0 {
        return at;
    }
    BlockPos::new(
        at.x + rng.gen_range(-spread..=spread),
        at.y,
        at.z + rng.gen_range(-spread..=spread),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;

    const YAML: &str = r#"
name: pasture
seed: 7
worlds:
  - name: overworld
    players:
      - name: alex
        at: { x: 0, y: 64, z: 0 }
    residents:
      - kind: cow
        count: 5
        at: { x: 8, y: 64, z: 8 }
        spread: 4
      - kind: wolf
        count: 1
        at: { x: 0, y: 64, z: 0 }
        tamed: true
spawning:
  weights: { zombie: 3, sheep: 1 }
"#;

    #[test]
    fn defaults_fill_missing_sections() {
        let scenario: Scenario = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(scenario.tick_millis, 50);
        assert_eq!(scenario.ticks(None), 2400);
        assert_eq!(scenario.ticks(Some(10)), 10);
        assert_eq!(scenario.spawning.radius_chunks, 3);
        assert_eq!(scenario.spawning.weights.get(&EntityKind::Zombie), Some(&3));
        assert!((scenario.behaviour.wander_chance - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn build_world_is_seeded() {
        let scenario: Scenario = serde_yaml::from_str(YAML).unwrap();
        let a = scenario.build_world();
        let b = scenario.build_world();
        let blocks = |world: &SimWorld| {
            world
                .entities("overworld")
                .into_iter()
                .map(|view| view.block)
                .collect::<Vec<_>>()
        };
        assert_eq!(blocks(&a).len(), 6);
        assert_eq!(blocks(&a), blocks(&b));
        assert!(a
            .entities("overworld")
            .iter()
            .any(|view| view.kind == EntityKind::Wolf && view.tamed));
        assert_eq!(a.players("overworld").len(), 1);
    }
}
