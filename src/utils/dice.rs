//! # Dice
//!
//! Injectable source of randomness for every probabilistic outcome in the engine.
//!
//! Gameplay code never touches a global generator. Callers hand in something that
//! implements [`Dice`]: a seeded [`StdRng`] during play, or [`LoadedDice`] when a
//! test needs to force a hit, a block, or a successful flee.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// A source of uniform integer rolls.
pub trait Dice {
    /// Rolls a uniform integer in `[low, high]`.
    ///
    /// Callers guarantee `low <= high`.
    fn roll_range(&mut self, low: i32, high: i32) -> i32;

    /// Rolls a percentile die, uniform in `[1, 100]`.
    fn roll_percent(&mut self) -> i32 {
        self.roll_range(1, 100)
    }

    /// Returns true when a percentile roll lands at or under `percent`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Dice, LoadedDice};
    ///
    /// let mut dice = LoadedDice::new([30, 80]);
    /// assert!(dice.chance(50));
    /// assert!(!dice.chance(50));
    /// ```
    fn chance(&mut self, percent: i32) -> bool {
        self.roll_percent() <= percent
    }
}

impl Dice for StdRng {
    fn roll_range(&mut self, low: i32, high: i32) -> i32 {
        self.gen_range(low..=high)
    }
}

/// Creates a seeded generator for reproducible play.
pub fn seeded_dice(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Scripted dice that replay a fixed sequence of rolls.
///
/// Each roll consumes the next scripted value, clamped into the requested range.
/// Once the script runs out the fallback value is used, or the low end of the range
/// if no fallback was set.
#[derive(Debug, Clone, Default)]
pub struct LoadedDice {
    rolls: VecDeque<i32>,
    fallback: Option<i32>,
}

impl LoadedDice {
    /// Creates dice that replay `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: None,
        }
    }

    /// Creates dice that always roll `value` (clamped per roll).
    pub fn always(value: i32) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: Some(value),
        }
    }

    /// Sets the value used after the script is exhausted.
    pub fn then_always(mut self, value: i32) -> Self {
        self.fallback = Some(value);
        self
    }

    /// Number of scripted rolls not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for LoadedDice {
    fn roll_range(&mut self, low: i32, high: i32) -> i32 {
        let value = self.rolls.pop_front().or(self.fallback).unwrap_or(low);
        value.max(low).min(high)
    }
}
