//! # Generation Module
//!
//! Procedural content generation for dungeons, items, and encounters.
//!
//! The engine plays on any valid [`RoomGraph`](crate::RoomGraph); this module is
//! one way to build and populate one from a seed. Every generator is deterministic
//! for a given [`GenerationConfig`].

pub mod dungeon;
pub mod encounters;
pub mod loot;

pub use dungeon::*;
pub use encounters::*;
pub use loot::*;

use crate::{PillarsError, PillarsResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Rooms a dungeon needs at minimum: entrance, exit, and one per pillar.
pub const MIN_ROOMS: u32 = 6;
/// Longest grid side generation accepts.
pub const MAX_GRID_SIDE: u32 = 64;

/// Configuration for procedural generation.
///
/// Chances are whole percents rolled once per room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Grid columns
    pub width: u32,
    /// Grid rows
    pub height: u32,
    /// Chance of an extra door between neighbouring rooms, adding loops
    pub extra_connection_chance: i32,
    /// Chance a room holds monsters
    pub monster_chance: i32,
    /// Chance a room holds a healing potion
    pub potion_chance: i32,
    /// Chance a room without a pillar is a pit
    pub pit_chance: i32,
    /// Chance a monster carries a potion as loot
    pub loot_chance: i32,
    /// Weapons scattered through the dungeon
    pub weapon_count: u32,
}

impl GenerationConfig {
    /// Creates the default configuration with a specific seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: 5,
            height: 5,
            extra_connection_chance: 10,
            monster_chance: 30,
            potion_chance: 20,
            pit_chance: 10,
            loot_chance: 25,
            weapon_count: 2,
        }
    }

    /// Creates a configuration for testing with a small, sparse dungeon.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 3,
            height: 3,
            extra_connection_chance: 0,
            monster_chance: 20,
            potion_chance: 50,
            pit_chance: 0,
            loot_chance: 0,
            weapon_count: 1,
        }
    }

    /// Number of rooms the grid produces.
    pub fn room_count(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }

    /// Rejects layouts too small to hold the entrance, exit, and pillars, sides
    /// longer than [`MAX_GRID_SIDE`], and chances outside 0..=100.
    pub fn validate(&self) -> PillarsResult<()> {
        if self.width == 0 || self.height == 0 || self.room_count() < MIN_ROOMS {
            return Err(PillarsError::GenerationFailed(format!(
                "a {}x{} grid cannot hold {} rooms",
                self.width, self.height, MIN_ROOMS
            )));
        }
        if self.width > MAX_GRID_SIDE || self.height > MAX_GRID_SIDE {
            return Err(PillarsError::GenerationFailed(format!(
                "a {}x{} grid exceeds the {} room side limit",
                self.width, self.height, MAX_GRID_SIDE
            )));
        }
        let chances = [
            ("extra_connection_chance", self.extra_connection_chance),
            ("monster_chance", self.monster_chance),
            ("potion_chance", self.potion_chance),
            ("pit_chance", self.pit_chance),
            ("loot_chance", self.loot_chance),
        ];
        for (name, value) in chances {
            if !(0..=100).contains(&value) {
                return Err(PillarsError::GenerationFailed(format!(
                    "{} {} is not a percentage",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for content generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> PillarsResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> PillarsResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::Position;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Room id of a grid cell.
    pub fn cell_id(cell: Position) -> String {
        format!("r{}_{}", cell.x, cell.y)
    }

    /// Whether `cell` lies inside the configured grid.
    pub fn in_bounds(cell: Position, config: &GenerationConfig) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < config.width && (cell.y as u32) < config.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.room_count(), 25);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing(1).validate().is_ok());
    }

    #[test]
    fn test_too_small_grid_rejected() {
        let config = GenerationConfig {
            width: 1,
            height: 5,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PillarsError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let config = GenerationConfig {
            width: 200,
            height: 200,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PillarsError::GenerationFailed(_))
        ));
        let widest = GenerationConfig {
            width: MAX_GRID_SIDE,
            height: 1,
            ..GenerationConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn test_bad_chance_rejected() {
        let config = GenerationConfig {
            monster_chance: 101,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cell_helpers() {
        let config = GenerationConfig::for_testing(1);
        assert_eq!(utils::cell_id(Position::new(2, 0)), "r2_0");
        assert!(utils::in_bounds(Position::new(2, 2), &config));
        assert!(!utils::in_bounds(Position::new(3, 0), &config));
        assert!(!utils::in_bounds(Position::new(0, -1), &config));
    }
}
