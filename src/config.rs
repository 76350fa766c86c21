//! # Engine Configuration
//!
//! Tunable rules for combat and exploration, loadable from a JSON file. Every field
//! has a default, so a config file only needs the keys it changes.

use crate::{GenerationConfig, PillarsError, PillarsResult, TieBreak};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default percent chance for a flee attempt to succeed.
pub const DEFAULT_FLEE_CHANCE: i32 = 50;

/// Default upper bound of pit damage.
pub const DEFAULT_PIT_MAX_DAMAGE: i32 = 20;

/// Default carry weight of a new hero.
pub const DEFAULT_INVENTORY_CAPACITY: u32 = 25;

/// Rules the engine plays by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Percent chance a flee attempt succeeds
    pub flee_chance: i32,
    /// Where the hero lands among equally fast monsters
    pub tie_break: TieBreak,
    /// Pit damage is rolled in `[1, pit_max_damage]`
    pub pit_max_damage: i32,
    /// Carry weight of a new hero
    pub inventory_capacity: u32,
    /// Dungeon layout and population
    pub generation: GenerationConfig,
}

impl EngineConfig {
    /// Creates the default rules with a specific dungeon seed.
    pub fn new(seed: u64) -> Self {
        Self {
            flee_chance: DEFAULT_FLEE_CHANCE,
            tie_break: TieBreak::default(),
            pit_max_damage: DEFAULT_PIT_MAX_DAMAGE,
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            generation: GenerationConfig::new(seed),
        }
    }

    /// Small dungeon and generous odds for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::for_testing(seed),
            ..Self::new(seed)
        }
    }

    /// Reads a config from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> PillarsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Rejects values the engine cannot play with.
    pub fn validate(&self) -> PillarsResult<()> {
        if !(0..=100).contains(&self.flee_chance) {
            return Err(PillarsError::InvalidState(format!(
                "flee_chance {} is not a percentage",
                self.flee_chance
            )));
        }
        if self.pit_max_damage < 1 {
            return Err(PillarsError::InvalidState(format!(
                "pit_max_damage must be at least 1, got {}",
                self.pit_max_damage
            )));
        }
        self.generation.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(GenerationConfig::default().seed)
    }
}
