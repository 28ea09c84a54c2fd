use anyhow::Result;
use rand::Rng;

use crate::{
    classify::EntityKind,
    engine::{System, SystemContext},
    keys::{BlockPos, CHUNK_SIZE},
    listener::{EntityListener, SpawnDecision},
    rng::SystemRng,
    sim::{scenario::Spawning, SimWorld},
};

/// Natural spawning: weighted random kinds placed near random players, each
/// going through the listener's admission check.
pub struct SpawnerSystem {
    spawning: Spawning,
    total_weight: u32,
}

impl SpawnerSystem {
    pub fn new(spawning: Spawning) -> Self {
        let total_weight = spawning.weights.values().sum();
        Self {
            spawning,
            total_weight,
        }
    }

    fn pick_kind(&self, rng: &mut SystemRng<'_>) -> Option<EntityKind> {
        if self.total_weight == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..self.total_weight);
        for (kind, weight) in &self.spawning.weights {
            if roll < *weight {
                return Some(*kind);
            }
            roll -= weight;
        }
        None
    }
}

impl System for SpawnerSystem {
    fn name(&self) -> &str {
        "spawner"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut SimWorld,
        listener: &mut EntityListener<SimWorld>,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let populated: Vec<String> = world
            .world_names()
            .into_iter()
            .filter(|name| !world.players(name).is_empty())
            .collect();
        if populated.is_empty() {
            return Ok(());
        }

        let reach = self.spawning.radius_chunks as i32 * CHUNK_SIZE;
        for _ in 0..self.spawning.attempts_per_tick {
            let Some(kind) = self.pick_kind(rng) else {
                return Ok(());
            };
            let name = &populated[rng.gen_range(0..populated.len())];
            let anchor = {
                let players = world.players(name);
                players[rng.gen_range(0..players.len())].block
            };
            let at = BlockPos::new(
                anchor.x + rng.gen_range(-reach..=reach),
                anchor.y,
                anchor.z + rng.gen_range(-reach..=reach),
            );

            let handle = world.spawn_mob(name, kind, at);
            let Some(candidate) = world.view(handle) else {
                continue;
            };
            if listener.on_creature_spawn(world, &candidate) == SpawnDecision::Allowed {
                listener.on_spawned(world, &candidate);
            }
        }
        Ok(())
    }
}
