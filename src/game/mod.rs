//! # Game Module
//!
//! Core engine state: the room graph, characters, combat, navigation, and the
//! session that orchestrates them.
//!
//! This module contains the fundamental building blocks of the engine:
//! - Room graph and room contents
//! - Heroes, monsters, and the shared combat core
//! - Turn ordering and the combat state machine
//! - Navigation and minimap coordinates
//! - Game session orchestration and persistence

pub mod combat;
pub mod entities;
pub mod events;
#[cfg(test)]
mod fixtures;
pub mod items;
pub mod navigator;
pub mod rooms;
pub mod state;
pub mod turn_order;

pub use combat::*;
pub use entities::*;
pub use events::*;
pub use items::*;
pub use navigator::*;
pub use rooms::*;
pub use state::*;
pub use turn_order::*;

use crate::{PillarsError, PillarsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Represents a 2D map coordinate.
///
/// # Examples
///
/// ```
/// use pillars::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// The four directions a room can connect in.
///
/// Declaration order (north, south, east, west) is the order used whenever
/// directions are listed or traversed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions in traversal order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a map delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, -1));
    /// assert_eq!(Direction::East.to_delta(), Position::new(1, 0));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// The direction pointing back the way this one came.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = PillarsError;

    fn from_str(s: &str) -> PillarsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "n" | "north" | "up" => Ok(Direction::North),
            "s" | "south" | "down" => Ok(Direction::South),
            "e" | "east" | "right" => Ok(Direction::East),
            "w" | "west" | "left" => Ok(Direction::West),
            other => Err(PillarsError::InvalidAction(format!(
                "'{}' is not a direction",
                other
            ))),
        }
    }
}

/// Unique identifier for heroes and monsters.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}
