//! # Loot Generation
//!
//! Rolls the weapons scattered through a dungeon and the potions found in rooms
//! and monster pockets.

use crate::{Dice, GenerationConfig, Generator, Item, PillarsError, PillarsResult, Potion, Weapon};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Weapons that can turn up: name, min bonus, max bonus, weight.
const ARMORY: [(&str, i32, i32, u32); 4] = [
    ("Dagger", 1, 4, 2),
    ("Short Sword", 2, 6, 5),
    ("Mace", 3, 8, 8),
    ("War Axe", 5, 10, 12),
];

/// Generates the loose weapons of a dungeon.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemGenerator;

impl ItemGenerator {
    pub fn new() -> Self {
        Self
    }

    /// A healing potion with probability `chance` percent.
    pub fn roll_potion(&self, chance: i32, rng: &mut StdRng) -> Option<Item> {
        rng.chance(chance).then(|| Item::Potion(Potion::healing()))
    }
}

impl Generator<Vec<Item>> for ItemGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> PillarsResult<Vec<Item>> {
        let mut weapons = Vec::with_capacity(config.weapon_count as usize);
        for _ in 0..config.weapon_count {
            let &(name, min, max, weight) = ARMORY.choose(rng).ok_or_else(|| {
                PillarsError::GenerationFailed("the armory is empty".to_string())
            })?;
            weapons.push(Item::Weapon(Weapon::new(name, min, max, weight)?));
        }
        Ok(weapons)
    }

    fn validate(&self, content: &Vec<Item>, config: &GenerationConfig) -> PillarsResult<()> {
        if content.len() != config.weapon_count as usize {
            return Err(PillarsError::GenerationFailed(format!(
                "expected {} weapons, rolled {}",
                config.weapon_count,
                content.len()
            )));
        }
        if content.iter().any(|item| !matches!(item, Item::Weapon(_))) {
            return Err(PillarsError::GenerationFailed(
                "non-weapon in the weapon roll".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ItemGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    #[test]
    fn test_generates_requested_weapon_count() {
        let config = GenerationConfig::new(3);
        let generator = ItemGenerator::new();
        let weapons = generator.generate(&config, &mut create_rng(&config)).unwrap();
        assert_eq!(weapons.len(), 2);
        assert!(generator.validate(&weapons, &config).is_ok());
    }

    #[test]
    fn test_potion_roll_extremes() {
        let config = GenerationConfig::new(3);
        let mut rng = create_rng(&config);
        let generator = ItemGenerator::new();
        assert!(generator.roll_potion(100, &mut rng).is_some());
        assert!(generator.roll_potion(0, &mut rng).is_none());
    }
}
