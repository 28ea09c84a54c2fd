use anyhow::Result;
use rand::Rng;

use crate::{
    classify::{EntityKind, MobCategory},
    engine::{System, SystemContext},
    keys::BlockPos,
    listener::EntityListener,
    rng::SystemRng,
    sim::{scenario::Behaviour, SimWorld},
};

/// Monsters notice players within this many blocks.
const SIGHT_RANGE: u32 = 16;
/// and forget them beyond this many.
const LOSE_RANGE: u32 = 24;

/// Random one-block steps, plus monsters acquiring and dropping players as
/// targets.
pub struct WanderSystem {
    behaviour: Behaviour,
}

impl WanderSystem {
    pub fn new(behaviour: Behaviour) -> Self {
        Self { behaviour }
    }
}

impl System for WanderSystem {
    fn name(&self) -> &str {
        "wander"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut SimWorld,
        listener: &mut EntityListener<SimWorld>,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let wander = self.behaviour.wander_chance.clamp(0.0, 1.0);
        let notice = self.behaviour.target_chance.clamp(0.0, 1.0);

        for handle in world.handles() {
            let Some(view) = world.view(handle) else {
                continue;
            };
            if !view.valid {
                continue;
            }

            if rng.gen_bool(wander) {
                let step = BlockPos::new(
                    view.block.x + rng.gen_range(-1..=1),
                    view.block.y,
                    view.block.z + rng.gen_range(-1..=1),
                );
                if let Some(mob) = world.mob_mut(handle) {
                    mob.block = step;
                }
            }

            if view.category != MobCategory::Monster {
                continue;
            }
            let distance = world.nearest_player_distance(&view.world, view.block);
            match view.target {
                None if distance.is_some_and(|d| d <= SIGHT_RANGE) && rng.gen_bool(notice) => {
                    if let Some(mob) = world.mob_mut(handle) {
                        mob.target = Some(EntityKind::Player);
                    }
                    listener.on_target(&view, Some(EntityKind::Player));
                }
                Some(_) if distance.map_or(true, |d| d > LOSE_RANGE) => {
                    if let Some(mob) = world.mob_mut(handle) {
                        mob.target = None;
                    }
                    listener.on_target(&view, None);
                }
                _ => {}
            }
        }
        Ok(())
    }
}
