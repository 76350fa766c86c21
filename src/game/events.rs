//! # Game Events
//!
//! Plain-data record of everything that happened during an action. The engine never
//! formats output for a particular front end; callers receive events and decide how
//! to show them. [`Display`](std::fmt::Display) gives a default one-line message.

use crate::{Direction, Pillar, RoomId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How prominently a message should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageImportance {
    Normal,
    Important,
    Critical,
}

/// Something that happened in the dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Free-form message
    Message {
        text: String,
        importance: MessageImportance,
    },
    HeroMoved {
        from: RoomId,
        to: RoomId,
        direction: Direction,
    },
    FellIntoPit {
        damage: i32,
        hp_left: i32,
    },
    ItemPickedUp {
        item: String,
    },
    /// The item was too heavy and stays in the room
    ItemLeftBehind {
        item: String,
    },
    PillarFound {
        pillar: Pillar,
    },
    EncounterStarted {
        monsters: Vec<String>,
    },
    Attack {
        attacker: String,
        target: String,
        /// The hero swung; otherwise a monster swung at the hero
        by_hero: bool,
        hit: bool,
        damage: i32,
        target_hp: i32,
    },
    Healed {
        name: String,
        amount: i32,
    },
    MonsterDefeated {
        name: String,
        xp_reward: u32,
    },
    LevelUp {
        level: u32,
    },
    LootDropped {
        item: String,
    },
    PotionDrunk {
        potion: String,
        healed: i32,
    },
    WeaponEquipped {
        weapon: String,
        previous: Option<String>,
    },
    FleeSucceeded,
    FleeFailed,
    CombatWon {
        xp_gained: u32,
        monsters_defeated: u32,
    },
    HeroDefeated {
        name: String,
    },
    Victory,
}

impl GameEvent {
    /// Shorthand for a normal-importance message.
    pub fn message(text: impl Into<String>) -> Self {
        GameEvent::Message {
            text: text.into(),
            importance: MessageImportance::Normal,
        }
    }

    /// How prominently the event should be shown.
    pub fn importance(&self) -> MessageImportance {
        match self {
            GameEvent::Message { importance, .. } => *importance,
            GameEvent::HeroDefeated { .. } | GameEvent::Victory => MessageImportance::Critical,
            GameEvent::PillarFound { .. }
            | GameEvent::EncounterStarted { .. }
            | GameEvent::LevelUp { .. }
            | GameEvent::CombatWon { .. }
            | GameEvent::FellIntoPit { .. } => MessageImportance::Important,
            _ => MessageImportance::Normal,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::Message { text, .. } => f.write_str(text),
            GameEvent::HeroMoved { to, direction, .. } => {
                write!(f, "You head {} into {}.", direction, to)
            }
            GameEvent::FellIntoPit { damage, hp_left } => write!(
                f,
                "You fall into a pit and take {} damage ({} hp left).",
                damage, hp_left
            ),
            GameEvent::ItemPickedUp { item } => write!(f, "You pick up {}.", item),
            GameEvent::ItemLeftBehind { item } => {
                write!(f, "{} is too heavy to carry; you leave it.", item)
            }
            GameEvent::PillarFound { pillar } => write!(f, "You found the {}!", pillar.name()),
            GameEvent::EncounterStarted { monsters } => {
                write!(f, "Ambush! You face: {}.", monsters.join(", "))
            }
            GameEvent::Attack {
                attacker,
                target,
                hit,
                damage,
                target_hp,
                ..
            } => {
                if *hit {
                    write!(
                        f,
                        "{} hits {} for {} ({} hp left).",
                        attacker, target, damage, target_hp
                    )
                } else {
                    write!(f, "{} misses {}.", attacker, target)
                }
            }
            GameEvent::Healed { name, amount } => write!(f, "{} heals {} hp.", name, amount),
            GameEvent::MonsterDefeated { name, xp_reward } => {
                write!(f, "{} is defeated! (+{} xp)", name, xp_reward)
            }
            GameEvent::LevelUp { level } => write!(f, "You reached level {}!", level),
            GameEvent::LootDropped { item } => write!(f, "{} falls to the floor.", item),
            GameEvent::PotionDrunk { potion, healed } => {
                write!(f, "You drink the {} and recover {} hp.", potion, healed)
            }
            GameEvent::WeaponEquipped { weapon, previous } => match previous {
                Some(previous) => write!(f, "You swap {} for {}.", previous, weapon),
                None => write!(f, "You equip {}.", weapon),
            },
            GameEvent::FleeSucceeded => f.write_str("You escape!"),
            GameEvent::FleeFailed => f.write_str("You fail to escape."),
            GameEvent::CombatWon {
                xp_gained,
                monsters_defeated,
            } => write!(
                f,
                "Victory! {} monster(s) defeated, {} xp gained.",
                monsters_defeated, xp_gained
            ),
            GameEvent::HeroDefeated { name } => write!(f, "{} has fallen. Game over.", name),
            GameEvent::Victory => {
                f.write_str("You carry all four pillars out of the dungeon. You win!")
            }
        }
    }
}
