use anyhow::Result;
use rand::Rng;

use crate::{
    classify::{EntityKind, MobCategory},
    engine::{System, SystemContext},
    host::Host,
    listener::{Damager, EntityListener},
    rng::SystemRng,
    sim::{scenario::Behaviour, SimWorld},
};

const MELEE_RANGE: u32 = 4;
const BOW_RANGE: u32 = 16;
const MELEE_DAMAGE: f64 = 7.0;
const ARROW_DAMAGE: f64 = 5.0;
const HAZARD_DAMAGE: f64 = 100.0;

/// Players fighting nearby monsters, and the occasional environmental death
/// with no attacker at all.
pub struct CombatSystem {
    behaviour: Behaviour,
}

impl CombatSystem {
    pub fn new(behaviour: Behaviour) -> Self {
        Self { behaviour }
    }
}

impl System for CombatSystem {
    fn name(&self) -> &str {
        "combat"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut SimWorld,
        listener: &mut EntityListener<SimWorld>,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let melee = self.behaviour.melee_chance.clamp(0.0, 1.0);
        let arrow = self.behaviour.arrow_chance.clamp(0.0, 1.0);
        let hazard = self.behaviour.hazard_chance.clamp(0.0, 1.0);

        for handle in world.handles() {
            let Some(view) = world.view(handle) else {
                continue;
            };
            if !view.valid {
                continue;
            }

            if rng.gen_bool(hazard) {
                world.damage_entity(&handle, HAZARD_DAMAGE);
                continue;
            }
            if view.category != MobCategory::Monster {
                continue;
            }
            let Some(distance) = world.nearest_player_distance(&view.world, view.block) else {
                continue;
            };

            if distance <= MELEE_RANGE && rng.gen_bool(melee) {
                listener.on_damaged_by(&view, Damager::Player);
                world.damage_entity(&handle, MELEE_DAMAGE);
            } else if distance <= BOW_RANGE && rng.gen_bool(arrow) {
                let shot = Damager::Projectile {
                    shooter: Some(EntityKind::Player),
                };
                listener.on_damaged_by(&view, shot);
                world.damage_entity(&handle, ARROW_DAMAGE);
            }
        }
        Ok(())
    }
}
