//! Closed classification of entity kinds into the categories the governor
//! makes decisions about.

use serde::{Deserialize, Serialize};

/// Every entity kind the host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Blaze,
    CaveSpider,
    Creeper,
    EnderDragon,
    Enderman,
    Ghast,
    Giant,
    MagmaCube,
    PigZombie,
    Skeleton,
    Slime,
    Silverfish,
    Spider,
    Zombie,
    Chicken,
    Cow,
    MushroomCow,
    Ocelot,
    Pig,
    Sheep,
    Snowman,
    Squid,
    Wolf,
    Villager,
    IronGolem,
    Player,
    Other,
}

impl EntityKind {
    pub fn is_player(self) -> bool {
        matches!(self, EntityKind::Player)
    }

    pub fn category(self) -> MobCategory {
        classify(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobCategory {
    /// Hostile; eligible for idle purge.
    Monster,
    /// Passive; subject to segment admission limits.
    Animal,
    VillageEntity,
    Other,
}

pub const fn classify(kind: EntityKind) -> MobCategory {
    use EntityKind::*;
    match kind {
        Blaze | CaveSpider | Creeper | EnderDragon | Enderman | Ghast | Giant | MagmaCube
        | PigZombie | Skeleton | Slime | Silverfish | Spider | Zombie => MobCategory::Monster,
        Chicken | Cow | MushroomCow | Ocelot | Pig | Sheep | Snowman | Squid | Wolf => {
            MobCategory::Animal
        }
        Villager | IronGolem => MobCategory::VillageEntity,
        Player | Other => MobCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monsters_are_classified() {
        for kind in [
            EntityKind::Zombie,
            EntityKind::CaveSpider,
            EntityKind::MagmaCube,
            EntityKind::EnderDragon,
        ] {
            assert_eq!(classify(kind), MobCategory::Monster, "{kind:?}");
        }
    }

    #[test]
    fn animals_include_snowman_and_squid() {
        assert_eq!(classify(EntityKind::Snowman), MobCategory::Animal);
        assert_eq!(classify(EntityKind::Squid), MobCategory::Animal);
        assert_eq!(classify(EntityKind::Wolf), MobCategory::Animal);
    }

    #[test]
    fn villagers_golems_and_players() {
        assert_eq!(classify(EntityKind::Villager), MobCategory::VillageEntity);
        assert_eq!(classify(EntityKind::IronGolem), MobCategory::VillageEntity);
        assert_eq!(classify(EntityKind::Player), MobCategory::Other);
        assert_eq!(classify(EntityKind::Other), MobCategory::Other);
    }

    #[test]
    fn kinds_parse_from_snake_case() {
        let kind: EntityKind = serde_yaml::from_str("mushroom_cow").unwrap();
        assert_eq!(kind, EntityKind::MushroomCow);
    }
}
