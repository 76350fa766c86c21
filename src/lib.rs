//! # Pillars Dungeon Engine
//!
//! A turn-based dungeon crawler core: a hero explores a graph of rooms, picks up
//! items, and fights monsters in a speed-ordered combat loop while hunting for the
//! four pillars and the exit.
//!
//! ## Architecture Overview
//!
//! - **Room graph**: arena of rooms keyed by id, connected in four directions
//! - **Characters**: heroes and monsters sharing one combat core with pluggable
//!   mitigation and recovery capabilities
//! - **Turn order**: speed-sorted, stable ordering fixed for an encounter
//! - **Combat session**: the per-encounter state machine
//! - **Navigator**: movement across the graph and minimap coordinates
//! - **Game session**: mode orchestration, save/load, room-entry effects
//!
//! All randomness is injected through the [`Dice`] trait so every probabilistic
//! outcome can be scripted in tests.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

pub use config::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

/// Core error type for the Pillars engine.
#[derive(thiserror::Error, Debug)]
pub enum PillarsError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A room with this id already exists
    #[error("Duplicate room: {0}")]
    DuplicateRoom(String),

    /// No room with this id exists
    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    /// The room graph is malformed
    #[error("Structural error: {0}")]
    Structural(String),

    /// Action cannot be performed; game state is unchanged
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A combat or character invariant does not hold
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl PillarsError {
    /// Whether the error is a user-level no-op rather than a defect.
    pub fn is_invalid_action(&self) -> bool {
        matches!(self, PillarsError::InvalidAction(_))
    }
}

/// Result type used throughout the Pillars codebase.
pub type PillarsResult<T> = Result<T, PillarsError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
