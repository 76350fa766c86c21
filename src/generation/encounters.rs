//! # Encounter Generation
//!
//! Rolls the group of monsters waiting in a room.

use crate::{
    Dice, GenerationConfig, Generator, ItemGenerator, Monster, MonsterKind, PillarsError,
    PillarsResult,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Largest group a single room can hold.
pub const MAX_GROUP_SIZE: i32 = 2;

/// Generates one room's worth of monsters.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncounterGenerator {
    items: ItemGenerator,
}

impl EncounterGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Generator<Vec<Monster>> for EncounterGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> PillarsResult<Vec<Monster>> {
        let size = rng.roll_range(1, MAX_GROUP_SIZE);
        let mut group = Vec::with_capacity(size as usize);
        for _ in 0..size {
            let kind = *MonsterKind::ALL
                .choose(rng)
                .ok_or_else(|| PillarsError::GenerationFailed("empty bestiary".to_string()))?;
            let loot = self.items.roll_potion(config.loot_chance, rng);
            group.push(Monster::spawn(kind)?.with_loot(loot));
        }
        Ok(group)
    }

    fn validate(&self, content: &Vec<Monster>, _config: &GenerationConfig) -> PillarsResult<()> {
        if content.is_empty() || content.len() > MAX_GROUP_SIZE as usize {
            return Err(PillarsError::GenerationFailed(format!(
                "encounter of {} monsters",
                content.len()
            )));
        }
        if content.iter().any(|monster| !monster.is_alive()) {
            return Err(PillarsError::GenerationFailed(
                "encounter spawned a dead monster".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
