//! Combatants shared by the engine's unit tests.

use crate::{CombatStats, HealProfile, Hero, Monster};

/// A hero that always hits for 10-20 and never blocks.
pub(crate) fn hero(speed: i32) -> Hero {
    let stats = CombatStats {
        max_hp: 100,
        min_damage: 10,
        max_damage: 20,
        attack_speed: speed,
        hit_chance: 100,
    };
    Hero::with_stats("Hero", stats, 0, 20).unwrap()
}

/// A monster hitting for 1-5 that never heals and is worth 25 xp.
pub(crate) fn monster(name: &str, max_hp: i32, speed: i32, hit_chance: i32) -> Monster {
    let stats = CombatStats {
        max_hp,
        min_damage: 1,
        max_damage: 5,
        attack_speed: speed,
        hit_chance,
    };
    let heal = HealProfile {
        chance: 0,
        min: 0,
        max: 0,
    };
    Monster::new(name, stats, heal, 25).unwrap()
}
