//! # Items
//!
//! Weapons, potions, and pillars, plus the weight-limited inventory that carries them.
//!
//! Items are plain values. Picking one up moves or clones the value; nothing is
//! shared between rooms or players.

use crate::{PillarsError, PillarsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four artifacts needed to finish the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pillar {
    Abstraction,
    Encapsulation,
    Inheritance,
    Polymorphism,
}

impl Pillar {
    /// All pillars in placement order.
    pub const ALL: [Pillar; 4] = [
        Pillar::Abstraction,
        Pillar::Encapsulation,
        Pillar::Inheritance,
        Pillar::Polymorphism,
    ];

    /// Display name of the pillar.
    pub fn name(self) -> &'static str {
        match self {
            Pillar::Abstraction => "Pillar of Abstraction",
            Pillar::Encapsulation => "Pillar of Encapsulation",
            Pillar::Inheritance => "Pillar of Inheritance",
            Pillar::Polymorphism => "Pillar of Polymorphism",
        }
    }
}

/// A weapon adding flat bonuses to both damage bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub min_damage_bonus: i32,
    pub max_damage_bonus: i32,
    pub weight: u32,
}

impl Weapon {
    /// Creates a weapon.
    ///
    /// The minimum bonus may not exceed the maximum bonus, so equipping a weapon
    /// can never push effective minimum damage above effective maximum damage.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::Weapon;
    ///
    /// let sword = Weapon::new("Short Sword", 2, 6, 5).unwrap();
    /// assert_eq!(sword.max_damage_bonus, 6);
    /// assert!(Weapon::new("Broken", 5, 1, 1).is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        min_damage_bonus: i32,
        max_damage_bonus: i32,
        weight: u32,
    ) -> PillarsResult<Self> {
        let name = name.into();
        if min_damage_bonus > max_damage_bonus {
            return Err(PillarsError::InvariantViolation(format!(
                "weapon {} has min bonus {} above max bonus {}",
                name, min_damage_bonus, max_damage_bonus
            )));
        }
        Ok(Self {
            name,
            min_damage_bonus,
            max_damage_bonus,
            weight,
        })
    }
}

/// A single-use healing potion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potion {
    pub name: String,
    pub heal_amount: i32,
    pub weight: u32,
}

impl Potion {
    /// Creates a potion healing a fixed amount.
    pub fn new(name: impl Into<String>, heal_amount: i32, weight: u32) -> Self {
        Self {
            name: name.into(),
            heal_amount: heal_amount.max(0),
            weight,
        }
    }

    /// The standard healing potion found in the dungeon.
    pub fn healing() -> Self {
        Self::new("Healing Potion", 15, 1)
    }
}

/// Anything that can lie in a room or sit in an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Weapon(Weapon),
    Potion(Potion),
    Pillar(Pillar),
}

impl Item {
    /// Display name of the item.
    pub fn name(&self) -> &str {
        match self {
            Item::Weapon(weapon) => &weapon.name,
            Item::Potion(potion) => &potion.name,
            Item::Pillar(pillar) => pillar.name(),
        }
    }

    /// Carry weight; pillars weigh nothing.
    pub fn weight(&self) -> u32 {
        match self {
            Item::Weapon(weapon) => weapon.weight,
            Item::Potion(potion) => potion.weight,
            Item::Pillar(_) => 0,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Weapon(weapon) => write!(
                f,
                "{} (+{}-{} dmg, wt {})",
                weapon.name, weapon.min_damage_bonus, weapon.max_damage_bonus, weapon.weight
            ),
            Item::Potion(potion) => write!(f, "{} (+{} hp)", potion.name, potion.heal_amount),
            Item::Pillar(pillar) => f.write_str(pillar.name()),
        }
    }
}

/// Weight-limited bag of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    capacity: u32,
}

impl Inventory {
    /// Creates an empty inventory holding up to `capacity` weight.
    pub fn new(capacity: u32) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Items in pickup order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total weight currently carried.
    pub fn total_weight(&self) -> u32 {
        self.items.iter().map(Item::weight).sum()
    }

    /// Whether `item` fits in the remaining capacity.
    pub fn can_carry(&self, item: &Item) -> bool {
        self.total_weight() + item.weight() <= self.capacity
    }

    /// Adds an item, handing it back if it does not fit.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Inventory, Item, Potion};
    ///
    /// let mut bag = Inventory::new(1);
    /// assert!(bag.add(Item::Potion(Potion::healing())).is_ok());
    /// assert!(bag.add(Item::Potion(Potion::healing())).is_err());
    /// ```
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        if !self.can_carry(&item) {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Looks at the item in slot `index`.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Removes and returns the item in slot `index`.
    pub fn take(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Slot of the first potion, if any.
    pub fn first_potion(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, Item::Potion(_)))
    }
}
