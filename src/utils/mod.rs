//! # Utilities Module
//!
//! Random-source abstraction shared by combat, navigation, and generation.

pub mod dice;

pub use dice::*;
