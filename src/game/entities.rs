//! # Entities
//!
//! Combat-capable characters: the shared [`Character`] core, the player's [`Hero`],
//! and [`Monster`]s.
//!
//! Heroes and monsters differ only in the capabilities their character carries. A
//! hero blocks incoming blows through its [`Mitigation`]; a monster may patch itself
//! up after every swing through its [`Recovery`]. Turn ordering and combat work on
//! `Character` alone and never ask which kind of combatant they are holding.

use crate::{
    new_entity_id, Dice, EntityId, Inventory, Item, Pillar, PillarsError, PillarsResult, Potion,
    Weapon,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Hit points gained per level.
pub const LEVEL_UP_HP: i32 = 10;
/// Damage added to both bounds per level.
pub const LEVEL_UP_DAMAGE: i32 = 2;
/// Experience needed to reach level 2.
pub const INITIAL_XP_THRESHOLD: u32 = 100;

/// Stats that named modifiers can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    MinDamage,
    MaxDamage,
    HitChance,
}

/// Base numbers for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_hp: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    /// Turn-order sort key; higher acts earlier
    pub attack_speed: i32,
    /// Percent chance to land a blow
    pub hit_chance: i32,
}

/// How a character softens incoming damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mitigation {
    /// Full damage applies
    #[default]
    None,
    /// A percentile roll at or under `chance` halves the blow
    Block { chance: i32 },
}

impl Mitigation {
    /// Applies the mitigation to an incoming amount.
    pub fn mitigate<D: Dice + ?Sized>(&self, amount: i32, dice: &mut D) -> i32 {
        match *self {
            Mitigation::None => amount,
            Mitigation::Block { chance } => {
                if dice.chance(chance) {
                    amount / 2
                } else {
                    amount
                }
            }
        }
    }
}

/// What a character does for itself after each attack attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Recovery {
    #[default]
    None,
    /// A percentile roll at or under `chance` heals a uniform amount in `[min, max]`
    SelfHeal { chance: i32, min: i32, max: i32 },
}

impl Recovery {
    fn check(&self, owner: &str) -> PillarsResult<()> {
        match *self {
            Recovery::SelfHeal { min, max, .. } if min > max => {
                Err(PillarsError::InvariantViolation(format!(
                    "{} heals {}-{}: min heal above max heal",
                    owner, min, max
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Result of one attack attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub hit: bool,
    /// Damage applied to the target after its mitigation
    pub damage: i32,
    /// Hit points the attacker restored to itself afterwards
    pub healed: i32,
}

/// The combat core shared by heroes and monsters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    id: EntityId,
    name: String,
    max_hp: i32,
    hp: i32,
    min_damage: i32,
    max_damage: i32,
    attack_speed: i32,
    hit_chance: i32,
    modifiers: BTreeMap<Stat, i32>,
    mitigation: Mitigation,
    recovery: Recovery,
}

impl Character {
    /// Creates a character at full health.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Character, CombatStats};
    ///
    /// let stats = CombatStats { max_hp: 30, min_damage: 2, max_damage: 5, attack_speed: 3, hit_chance: 70 };
    /// let rat = Character::new("Rat", stats).unwrap();
    /// assert_eq!(rat.hp(), 30);
    /// assert!(rat.is_alive());
    /// ```
    pub fn new(name: impl Into<String>, stats: CombatStats) -> PillarsResult<Self> {
        let character = Self {
            id: new_entity_id(),
            name: name.into(),
            max_hp: stats.max_hp,
            hp: stats.max_hp,
            min_damage: stats.min_damage,
            max_damage: stats.max_damage,
            attack_speed: stats.attack_speed,
            hit_chance: stats.hit_chance,
            modifiers: BTreeMap::new(),
            mitigation: Mitigation::None,
            recovery: Recovery::None,
        };
        character.validate()?;
        Ok(character)
    }

    /// Replaces the mitigation capability.
    pub fn with_mitigation(mut self, mitigation: Mitigation) -> Self {
        self.mitigation = mitigation;
        self
    }

    /// Replaces the post-attack recovery capability.
    pub fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn attack_speed(&self) -> i32 {
        self.attack_speed
    }

    pub fn base_min_damage(&self) -> i32 {
        self.min_damage
    }

    pub fn base_max_damage(&self) -> i32 {
        self.max_damage
    }

    pub fn base_hit_chance(&self) -> i32 {
        self.hit_chance
    }

    pub fn mitigation(&self) -> Mitigation {
        self.mitigation
    }

    pub fn recovery(&self) -> Recovery {
        self.recovery
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Sum of all active deltas for `stat`.
    pub fn modifier(&self, stat: Stat) -> i32 {
        self.modifiers.get(&stat).copied().unwrap_or(0)
    }

    /// Adds a delta to a named modifier. Modifiers that net to zero are dropped.
    pub fn add_modifier(&mut self, stat: Stat, delta: i32) {
        let total = self.modifier(stat) + delta;
        if total == 0 {
            self.modifiers.remove(&stat);
        } else {
            self.modifiers.insert(stat, total);
        }
    }

    pub fn effective_min_damage(&self) -> i32 {
        self.min_damage + self.modifier(Stat::MinDamage)
    }

    pub fn effective_max_damage(&self) -> i32 {
        self.max_damage + self.modifier(Stat::MaxDamage)
    }

    pub fn effective_hit_chance(&self) -> i32 {
        self.hit_chance + self.modifier(Stat::HitChance)
    }

    /// Applies incoming damage through this character's mitigation.
    ///
    /// Negative amounts count as zero. Hit points never drop below zero. Returns the
    /// amount left after mitigation.
    pub fn take_damage<D: Dice + ?Sized>(&mut self, amount: i32, dice: &mut D) -> i32 {
        let mitigated = self.mitigation.mitigate(amount.max(0), dice).max(0);
        self.hp = (self.hp - mitigated).max(0);
        mitigated
    }

    /// Restores hit points up to the maximum. The dead stay dead.
    ///
    /// Returns the hit points actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    /// Swings at `target`.
    ///
    /// Nothing happens if either side is already dead. Otherwise a percentile roll at
    /// or under the effective hit chance lands a blow for a uniform amount between the
    /// effective damage bounds, and the attacker's recovery capability runs whether or
    /// not the blow landed.
    pub fn attempt_attack<D: Dice + ?Sized>(
        &mut self,
        target: &mut Character,
        dice: &mut D,
    ) -> PillarsResult<AttackOutcome> {
        if !self.is_alive() || !target.is_alive() {
            return Ok(AttackOutcome::default());
        }

        let low = self.effective_min_damage();
        let high = self.effective_max_damage();
        if low > high {
            return Err(PillarsError::InvariantViolation(format!(
                "{} deals {}-{}: min damage above max damage",
                self.name, low, high
            )));
        }
        self.recovery.check(&self.name)?;

        let mut outcome = AttackOutcome::default();
        if dice.roll_percent() <= self.effective_hit_chance() {
            let rolled = dice.roll_range(low, high);
            outcome.hit = true;
            outcome.damage = target.take_damage(rolled, dice);
        }
        outcome.healed = self.attempt_recovery(dice)?;
        Ok(outcome)
    }

    /// Runs the recovery capability once. Returns hit points restored.
    pub fn attempt_recovery<D: Dice + ?Sized>(&mut self, dice: &mut D) -> PillarsResult<i32> {
        self.recovery.check(&self.name)?;
        match self.recovery {
            Recovery::None => Ok(0),
            Recovery::SelfHeal { chance, min, max } => {
                if !self.is_alive() || !dice.chance(chance) {
                    return Ok(0);
                }
                let amount = dice.roll_range(min, max);
                Ok(self.heal(amount))
            }
        }
    }

    /// Grows the character by a level's worth of hit points and damage, fully healed.
    fn grow(&mut self, hp_gain: i32, damage_gain: i32) {
        self.max_hp += hp_gain;
        self.hp = self.max_hp;
        self.min_damage += damage_gain;
        self.max_damage += damage_gain;
    }

    /// Checks the invariants a restored or hand-built character must satisfy.
    pub fn validate(&self) -> PillarsResult<()> {
        if self.max_hp <= 0 {
            return Err(PillarsError::InvariantViolation(format!(
                "{} has non-positive max hp {}",
                self.name, self.max_hp
            )));
        }
        if self.hp < 0 || self.hp > self.max_hp {
            return Err(PillarsError::InvariantViolation(format!(
                "{} has hp {} outside 0..={}",
                self.name, self.hp, self.max_hp
            )));
        }
        if self.effective_min_damage() > self.effective_max_damage() {
            return Err(PillarsError::InvariantViolation(format!(
                "{} has min damage {} above max damage {}",
                self.name,
                self.effective_min_damage(),
                self.effective_max_damage()
            )));
        }
        self.recovery.check(&self.name)
    }
}

/// Playable hero classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroArchetype {
    Warrior,
    Priestess,
    Thief,
}

impl HeroArchetype {
    pub const ALL: [HeroArchetype; 3] = [
        HeroArchetype::Warrior,
        HeroArchetype::Priestess,
        HeroArchetype::Thief,
    ];

    /// Starting stat block.
    pub fn stats(self) -> CombatStats {
        match self {
            HeroArchetype::Warrior => CombatStats {
                max_hp: 125,
                min_damage: 35,
                max_damage: 60,
                attack_speed: 4,
                hit_chance: 80,
            },
            HeroArchetype::Priestess => CombatStats {
                max_hp: 75,
                min_damage: 25,
                max_damage: 45,
                attack_speed: 5,
                hit_chance: 70,
            },
            HeroArchetype::Thief => CombatStats {
                max_hp: 75,
                min_damage: 20,
                max_damage: 40,
                attack_speed: 6,
                hit_chance: 80,
            },
        }
    }

    /// Percent chance to halve an incoming blow.
    pub fn block_chance(self) -> i32 {
        match self {
            HeroArchetype::Warrior => 20,
            HeroArchetype::Priestess => 30,
            HeroArchetype::Thief => 40,
        }
    }
}

impl fmt::Display for HeroArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeroArchetype::Warrior => "Warrior",
            HeroArchetype::Priestess => "Priestess",
            HeroArchetype::Thief => "Thief",
        };
        f.write_str(name)
    }
}

impl FromStr for HeroArchetype {
    type Err = PillarsError;

    fn from_str(s: &str) -> PillarsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "warrior" => Ok(HeroArchetype::Warrior),
            "priestess" => Ok(HeroArchetype::Priestess),
            "thief" => Ok(HeroArchetype::Thief),
            other => Err(PillarsError::InvalidAction(format!(
                "unknown hero class '{}'",
                other
            ))),
        }
    }
}

/// The player's character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub character: Character,
    level: u32,
    xp: u32,
    xp_to_next_level: u32,
    weapon: Option<Weapon>,
    pub inventory: Inventory,
    pillars: BTreeSet<Pillar>,
}

impl Hero {
    /// Creates a level 1 hero of the given class.
    pub fn new(
        name: impl Into<String>,
        archetype: HeroArchetype,
        inventory_capacity: u32,
    ) -> PillarsResult<Self> {
        Self::with_stats(
            name,
            archetype.stats(),
            archetype.block_chance(),
            inventory_capacity,
        )
    }

    /// Creates a level 1 hero from a custom stat block.
    pub fn with_stats(
        name: impl Into<String>,
        stats: CombatStats,
        block_chance: i32,
        inventory_capacity: u32,
    ) -> PillarsResult<Self> {
        let character = Character::new(name, stats)?.with_mitigation(Mitigation::Block {
            chance: block_chance,
        });
        Ok(Self {
            character,
            level: 1,
            xp: 0,
            xp_to_next_level: INITIAL_XP_THRESHOLD,
            weapon: None,
            inventory: Inventory::new(inventory_capacity),
            pillars: BTreeSet::new(),
        })
    }

    pub fn id(&self) -> EntityId {
        self.character.id()
    }

    pub fn name(&self) -> &str {
        self.character.name()
    }

    pub fn is_alive(&self) -> bool {
        self.character.is_alive()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn xp_to_next_level(&self) -> u32 {
        self.xp_to_next_level
    }

    pub fn block_chance(&self) -> i32 {
        match self.character.mitigation() {
            Mitigation::Block { chance } => chance,
            Mitigation::None => 0,
        }
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Awards experience, levelling up as many times as the total allows.
    ///
    /// Each level adds hit points and damage, refills health, spends the current
    /// threshold, and raises the next threshold by half. Returns the levels gained.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Hero, HeroArchetype};
    ///
    /// let mut hero = Hero::new("Ada", HeroArchetype::Thief, 20).unwrap();
    /// assert_eq!(hero.gain_xp(250), 2); // 100 for level 2, 150 for level 3
    /// assert_eq!(hero.level(), 3);
    /// assert_eq!(hero.xp(), 0);
    /// assert_eq!(hero.xp_to_next_level(), 225);
    /// ```
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut levels = 0;
        while self.xp >= self.xp_to_next_level {
            self.xp -= self.xp_to_next_level;
            self.level += 1;
            self.character.grow(LEVEL_UP_HP, LEVEL_UP_DAMAGE);
            self.xp_to_next_level = self
                .xp_to_next_level
                .saturating_add(self.xp_to_next_level / 2)
                .max(1);
            levels += 1;
        }
        levels
    }

    /// Equips `weapon`, returning whatever was equipped before.
    ///
    /// The old weapon's bonuses are removed before the new one's are applied, so
    /// exactly one weapon's bonuses are ever active. The caller owns the returned
    /// weapon and is expected to put it back in the inventory.
    pub fn equip_weapon(&mut self, weapon: Weapon) -> Option<Weapon> {
        let previous = self.unequip_weapon();
        self.character
            .add_modifier(Stat::MinDamage, weapon.min_damage_bonus);
        self.character
            .add_modifier(Stat::MaxDamage, weapon.max_damage_bonus);
        self.weapon = Some(weapon);
        previous
    }

    /// Removes the equipped weapon and its bonuses.
    pub fn unequip_weapon(&mut self) -> Option<Weapon> {
        let weapon = self.weapon.take()?;
        self.character
            .add_modifier(Stat::MinDamage, -weapon.min_damage_bonus);
        self.character
            .add_modifier(Stat::MaxDamage, -weapon.max_damage_bonus);
        Some(weapon)
    }

    /// Drinks the potion in inventory slot `index`.
    ///
    /// Returns the potion and the hit points actually restored. Anything other than a
    /// potion stays where it is.
    pub fn drink_potion(&mut self, index: usize) -> PillarsResult<(Potion, i32)> {
        match self.inventory.get(index) {
            Some(Item::Potion(_)) => {}
            Some(other) => {
                return Err(PillarsError::InvalidAction(format!(
                    "{} is not something you can drink",
                    other.name()
                )))
            }
            None => {
                return Err(PillarsError::InvalidAction(format!(
                    "no item in slot {}",
                    index + 1
                )))
            }
        }
        let Some(Item::Potion(potion)) = self.inventory.take(index) else {
            return Err(PillarsError::InvalidState(format!(
                "slot {} changed while drinking",
                index + 1
            )));
        };
        let healed = self.character.heal(potion.heal_amount);
        Ok((potion, healed))
    }

    /// Equips the weapon in inventory slot `index`; the old weapon goes back into
    /// the inventory.
    ///
    /// Refused without any change if the old weapon would not fit once the new one
    /// leaves the bag. Returns the names of the new and previous weapons.
    pub fn equip_from_inventory(
        &mut self,
        index: usize,
    ) -> PillarsResult<(String, Option<String>)> {
        let incoming = match self.inventory.get(index) {
            Some(Item::Weapon(weapon)) => weapon.weight,
            Some(other) => {
                return Err(PillarsError::InvalidAction(format!(
                    "{} is not a weapon",
                    other.name()
                )))
            }
            None => {
                return Err(PillarsError::InvalidAction(format!(
                    "no item in slot {}",
                    index + 1
                )))
            }
        };
        if let Some(current) = &self.weapon {
            let after = self.inventory.total_weight() - incoming + current.weight;
            if after > self.inventory.capacity() {
                return Err(PillarsError::InvalidAction(format!(
                    "no room to stow {}",
                    current.name
                )));
            }
        }

        let Some(Item::Weapon(weapon)) = self.inventory.take(index) else {
            return Err(PillarsError::InvalidState(format!(
                "slot {} changed while equipping",
                index + 1
            )));
        };
        let name = weapon.name.clone();
        let previous = match self.equip_weapon(weapon) {
            Some(old) => {
                let old_name = old.name.clone();
                self.inventory.add(Item::Weapon(old)).map_err(|item| {
                    PillarsError::InvalidState(format!("{} no longer fits", item.name()))
                })?;
                Some(old_name)
            }
            None => None,
        };
        Ok((name, previous))
    }

    /// Records a pillar. Returns false if it was already held.
    pub fn collect_pillar(&mut self, pillar: Pillar) -> bool {
        self.pillars.insert(pillar)
    }

    pub fn pillars(&self) -> &BTreeSet<Pillar> {
        &self.pillars
    }

    pub fn has_all_pillars(&self) -> bool {
        Pillar::ALL.iter().all(|pillar| self.pillars.contains(pillar))
    }

    /// Checks restored-state invariants.
    pub fn validate(&self) -> PillarsResult<()> {
        self.character.validate()?;
        if self.level == 0 {
            return Err(PillarsError::InvariantViolation(format!(
                "{} is level 0",
                self.name()
            )));
        }
        if self.xp >= self.xp_to_next_level {
            return Err(PillarsError::InvariantViolation(format!(
                "{} holds {} xp past the {} threshold",
                self.name(),
                self.xp,
                self.xp_to_next_level
            )));
        }
        Ok(())
    }
}

/// Heal behaviour of a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealProfile {
    pub chance: i32,
    pub min: i32,
    pub max: i32,
}

/// Monster species in the bestiary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Ogre,
    Gremlin,
    Skeleton,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 3] = [MonsterKind::Ogre, MonsterKind::Gremlin, MonsterKind::Skeleton];

    pub fn name(self) -> &'static str {
        match self {
            MonsterKind::Ogre => "Ogre",
            MonsterKind::Gremlin => "Gremlin",
            MonsterKind::Skeleton => "Skeleton",
        }
    }

    pub fn stats(self) -> CombatStats {
        match self {
            MonsterKind::Ogre => CombatStats {
                max_hp: 200,
                min_damage: 30,
                max_damage: 60,
                attack_speed: 2,
                hit_chance: 60,
            },
            MonsterKind::Gremlin => CombatStats {
                max_hp: 70,
                min_damage: 15,
                max_damage: 30,
                attack_speed: 5,
                hit_chance: 80,
            },
            MonsterKind::Skeleton => CombatStats {
                max_hp: 100,
                min_damage: 30,
                max_damage: 50,
                attack_speed: 3,
                hit_chance: 80,
            },
        }
    }

    pub fn heal_profile(self) -> HealProfile {
        match self {
            MonsterKind::Ogre => HealProfile { chance: 10, min: 30, max: 60 },
            MonsterKind::Gremlin => HealProfile { chance: 40, min: 20, max: 40 },
            MonsterKind::Skeleton => HealProfile { chance: 30, min: 30, max: 50 },
        }
    }

    pub fn xp_reward(self) -> u32 {
        match self {
            MonsterKind::Ogre => 60,
            MonsterKind::Gremlin => 30,
            MonsterKind::Skeleton => 40,
        }
    }
}

/// A hostile character living in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub character: Character,
    xp_reward: u32,
    loot: Vec<Item>,
}

impl Monster {
    /// Creates a monster that may heal itself after each attack.
    pub fn new(
        name: impl Into<String>,
        stats: CombatStats,
        heal: HealProfile,
        xp_reward: u32,
    ) -> PillarsResult<Self> {
        let character = Character::new(name, stats)?.with_recovery(Recovery::SelfHeal {
            chance: heal.chance,
            min: heal.min,
            max: heal.max,
        });
        character.validate()?;
        Ok(Self {
            character,
            xp_reward,
            loot: Vec::new(),
        })
    }

    /// Spawns a bestiary monster.
    pub fn spawn(kind: MonsterKind) -> PillarsResult<Self> {
        Self::new(kind.name(), kind.stats(), kind.heal_profile(), kind.xp_reward())
    }

    /// Adds items dropped on defeat.
    pub fn with_loot(mut self, loot: impl IntoIterator<Item = Item>) -> Self {
        self.loot.extend(loot);
        self
    }

    pub fn id(&self) -> EntityId {
        self.character.id()
    }

    pub fn name(&self) -> &str {
        self.character.name()
    }

    pub fn is_alive(&self) -> bool {
        self.character.is_alive()
    }

    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    pub fn loot(&self) -> &[Item] {
        &self.loot
    }

    /// Hands over the loot, leaving the monster empty-handed.
    pub fn take_loot(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.loot)
    }

    pub fn heal_chance(&self) -> i32 {
        match self.character.recovery() {
            Recovery::SelfHeal { chance, .. } => chance,
            Recovery::None => 0,
        }
    }

    /// Attacks a target; the self-heal roll follows every attempt.
    pub fn attempt_attack<D: Dice + ?Sized>(
        &mut self,
        target: &mut Character,
        dice: &mut D,
    ) -> PillarsResult<AttackOutcome> {
        self.character.attempt_attack(target, dice)
    }

    /// Rolls the heal chance once. Returns hit points restored.
    pub fn attempt_heal<D: Dice + ?Sized>(&mut self, dice: &mut D) -> PillarsResult<i32> {
        self.character.attempt_recovery(dice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoadedDice;

    fn stats(max_hp: i32, min: i32, max: i32, speed: i32, hit: i32) -> CombatStats {
        CombatStats {
            max_hp,
            min_damage: min,
            max_damage: max,
            attack_speed: speed,
            hit_chance: hit,
        }
    }

    #[test]
    fn test_character_rejects_inverted_damage() {
        assert!(Character::new("Bad", stats(10, 5, 1, 1, 50)).is_err());
        assert!(Character::new("Dead", stats(0, 1, 2, 1, 50)).is_err());
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut dice = LoadedDice::default();
        let mut target = Character::new("Target", stats(10, 1, 2, 1, 50)).unwrap();
        assert_eq!(target.take_damage(4, &mut dice), 4);
        assert_eq!(target.hp(), 6);
        target.take_damage(100, &mut dice);
        assert_eq!(target.hp(), 0);
        assert!(!target.is_alive());
        target.take_damage(-5, &mut dice);
        assert_eq!(target.hp(), 0);
    }

    #[test]
    fn test_attack_hits_when_roll_under_hit_chance() {
        let mut attacker = Character::new("A", stats(10, 3, 8, 1, 60)).unwrap();
        let mut target = Character::new("T", stats(20, 1, 1, 1, 0)).unwrap();
        // hit roll 60, damage roll 5
        let mut dice = LoadedDice::new([60, 5]);
        let outcome = attacker.attempt_attack(&mut target, &mut dice).unwrap();
        assert!(outcome.hit);
        assert_eq!(outcome.damage, 5);
        assert_eq!(target.hp(), 15);
    }

    #[test]
    fn test_attack_misses_when_roll_over_hit_chance() {
        let mut attacker = Character::new("A", stats(10, 3, 8, 1, 60)).unwrap();
        let mut target = Character::new("T", stats(20, 1, 1, 1, 0)).unwrap();
        let mut dice = LoadedDice::new([61]);
        let outcome = attacker.attempt_attack(&mut target, &mut dice).unwrap();
        assert_eq!(outcome, AttackOutcome::default());
        assert_eq!(target.hp(), 20);
    }

    #[test]
    fn test_hit_chance_modifier_applies() {
        let mut attacker = Character::new("A", stats(10, 1, 1, 1, 50)).unwrap();
        attacker.add_modifier(Stat::HitChance, 20);
        let mut target = Character::new("T", stats(20, 1, 1, 1, 0)).unwrap();
        let mut dice = LoadedDice::new([70, 1]);
        assert!(attacker.attempt_attack(&mut target, &mut dice).unwrap().hit);
        attacker.add_modifier(Stat::HitChance, -20);
        assert_eq!(attacker.modifier(Stat::HitChance), 0);
    }

    #[test]
    fn test_dead_attacker_or_target_does_nothing() {
        let mut dice = LoadedDice::always(1);
        let mut attacker = Character::new("A", stats(10, 5, 5, 1, 100)).unwrap();
        let mut target = Character::new("T", stats(5, 1, 1, 1, 0)).unwrap();
        target.take_damage(5, &mut dice);

        let outcome = attacker.attempt_attack(&mut target, &mut dice).unwrap();
        assert_eq!(outcome, AttackOutcome::default());
        assert_eq!(target.hp(), 0);

        let mut fresh = Character::new("F", stats(5, 1, 1, 1, 0)).unwrap();
        attacker.take_damage(100, &mut dice);
        let outcome = attacker.attempt_attack(&mut fresh, &mut dice).unwrap();
        assert_eq!(outcome, AttackOutcome::default());
        assert_eq!(fresh.hp(), 5);
    }

    #[test]
    fn test_inverted_effective_damage_aborts_attack() {
        let mut attacker = Character::new("A", stats(10, 5, 6, 1, 100)).unwrap();
        attacker.add_modifier(Stat::MinDamage, 10);
        let mut target = Character::new("T", stats(20, 1, 1, 1, 0)).unwrap();
        let mut dice = LoadedDice::always(1);
        let err = attacker.attempt_attack(&mut target, &mut dice).unwrap_err();
        assert!(matches!(err, PillarsError::InvariantViolation(_)));
        assert_eq!(target.hp(), 20);
    }

    #[test]
    fn test_block_halves_damage() {
        let mut hero = Hero::with_stats("H", stats(100, 1, 1, 1, 100), 50, 10).unwrap();
        // block roll 50 succeeds
        let mut dice = LoadedDice::new([50]);
        assert_eq!(hero.character.take_damage(15, &mut dice), 7);
        assert_eq!(hero.character.hp(), 93);
        // block roll 51 fails
        let mut dice = LoadedDice::new([51]);
        assert_eq!(hero.character.take_damage(15, &mut dice), 15);
        assert_eq!(hero.character.hp(), 78);
    }

    #[test]
    fn test_gain_xp_levels_repeatedly() {
        let mut hero = Hero::with_stats("H", stats(50, 10, 20, 1, 80), 0, 10).unwrap();
        let mut dice = LoadedDice::default();
        hero.character.take_damage(30, &mut dice);

        assert_eq!(hero.gain_xp(99), 0);
        assert_eq!(hero.level(), 1);
        assert_eq!(hero.character.hp(), 20);

        // 99 + 302 = 401 -> spends 100, 150, leaves 151 < 225
        assert_eq!(hero.gain_xp(302), 2);
        assert_eq!(hero.level(), 3);
        assert_eq!(hero.xp(), 151);
        assert_eq!(hero.xp_to_next_level(), 225);
        assert_eq!(hero.character.max_hp(), 70);
        assert_eq!(hero.character.hp(), 70);
        assert_eq!(hero.character.base_min_damage(), 14);
        assert_eq!(hero.character.base_max_damage(), 24);
    }

    #[test]
    fn test_gain_xp_threshold_saturates_near_u32_max() {
        let mut hero = Hero::with_stats("H", stats(50, 10, 20, 1, 80), 0, 10).unwrap();
        hero.xp_to_next_level = u32::MAX - 5;

        assert_eq!(hero.gain_xp(u32::MAX), 1);
        assert_eq!(hero.level(), 2);
        assert_eq!(hero.xp(), 5);
        assert_eq!(hero.xp_to_next_level(), u32::MAX);
        // 5 + u32::MAX saturates to exactly one more level
        assert_eq!(hero.gain_xp(u32::MAX), 1);
        assert_eq!(hero.level(), 3);
        assert_eq!(hero.xp(), 0);
    }

    #[test]
    fn test_equip_weapon_swaps_bonuses() {
        let mut hero = Hero::new("H", HeroArchetype::Warrior, 30).unwrap();
        let base_min = hero.character.effective_min_damage();
        let base_max = hero.character.effective_max_damage();

        let dagger = Weapon::new("Dagger", 1, 3, 2).unwrap();
        let axe = Weapon::new("Axe", 5, 10, 8).unwrap();

        assert!(hero.equip_weapon(dagger.clone()).is_none());
        assert_eq!(hero.character.effective_min_damage(), base_min + 1);

        let returned = hero.equip_weapon(axe).unwrap();
        assert_eq!(returned, dagger);
        assert_eq!(hero.character.effective_min_damage(), base_min + 5);
        assert_eq!(hero.character.effective_max_damage(), base_max + 10);

        hero.unequip_weapon();
        assert_eq!(hero.character.effective_min_damage(), base_min);
        assert_eq!(hero.character.effective_max_damage(), base_max);
        assert!(hero.weapon().is_none());
    }

    #[test]
    fn test_monster_heal_roll() {
        let mut monster = Monster::spawn(MonsterKind::Gremlin).unwrap();
        let mut dice = LoadedDice::default();
        monster.character.take_damage(50, &mut dice);

        // heal roll 40 succeeds (chance 40), amount 25
        let mut dice = LoadedDice::new([40, 25]);
        assert_eq!(monster.attempt_heal(&mut dice).unwrap(), 25);
        assert_eq!(monster.character.hp(), 45);

        let mut dice = LoadedDice::new([41]);
        assert_eq!(monster.attempt_heal(&mut dice).unwrap(), 0);
    }

    #[test]
    fn test_monster_heal_clamps_to_max() {
        let mut monster = Monster::spawn(MonsterKind::Skeleton).unwrap();
        let mut dice = LoadedDice::default();
        monster.character.take_damage(10, &mut dice);
        let mut dice = LoadedDice::new([1, 50]);
        assert_eq!(monster.attempt_heal(&mut dice).unwrap(), 10);
        assert_eq!(monster.character.hp(), monster.character.max_hp());
    }

    #[test]
    fn test_monster_heals_after_a_miss() {
        let mut monster = Monster::spawn(MonsterKind::Ogre).unwrap();
        let mut noop = LoadedDice::default();
        monster.character.take_damage(100, &mut noop);
        let mut hero = Hero::new("H", HeroArchetype::Thief, 10).unwrap();

        // miss (61 > 60), heal roll 10 succeeds, heal 30
        let mut dice = LoadedDice::new([61, 10, 30]);
        let outcome = monster.attempt_attack(&mut hero.character, &mut dice).unwrap();
        assert!(!outcome.hit);
        assert_eq!(outcome.healed, 30);
        assert_eq!(monster.character.hp(), 130);
        assert_eq!(hero.character.hp(), hero.character.max_hp());
    }

    #[test]
    fn test_monster_loot_handed_over_once() {
        let mut monster = Monster::spawn(MonsterKind::Skeleton)
            .unwrap()
            .with_loot([Item::Pillar(Pillar::Polymorphism)]);
        assert_eq!(monster.take_loot().len(), 1);
        assert!(monster.take_loot().is_empty());
    }

    #[test]
    fn test_inverted_heal_profile_rejected() {
        let heal = HealProfile { chance: 50, min: 9, max: 2 };
        assert!(Monster::new("Odd", stats(10, 1, 2, 1, 50), heal, 5).is_err());
    }

    #[test]
    fn test_drink_and_equip_from_inventory() {
        let mut hero = Hero::with_stats("H", stats(50, 10, 20, 1, 80), 0, 10).unwrap();
        let mut dice = LoadedDice::default();
        hero.character.take_damage(20, &mut dice);
        hero.inventory.add(Item::Potion(Potion::healing())).unwrap();
        hero.inventory
            .add(Item::Weapon(Weapon::new("Dagger", 1, 2, 2).unwrap()))
            .unwrap();

        assert!(hero.drink_potion(1).is_err());
        let (potion, healed) = hero.drink_potion(0).unwrap();
        assert_eq!(potion.name, "Healing Potion");
        assert_eq!(healed, 15);
        assert_eq!(hero.inventory.len(), 1);

        assert_eq!(hero.equip_from_inventory(0).unwrap(), ("Dagger".to_string(), None));
        assert!(hero.inventory.is_empty());

        hero.inventory
            .add(Item::Weapon(Weapon::new("Pike", 2, 4, 9).unwrap()))
            .unwrap();
        let (name, previous) = hero.equip_from_inventory(0).unwrap();
        assert_eq!(name, "Pike");
        assert_eq!(previous.as_deref(), Some("Dagger"));
        assert_eq!(hero.inventory.items()[0].name(), "Dagger");
    }

    #[test]
    fn test_equip_refused_when_old_weapon_would_not_fit() {
        let mut hero = Hero::with_stats("H", stats(50, 10, 20, 1, 80), 0, 5).unwrap();
        hero.equip_weapon(Weapon::new("Maul", 4, 8, 9).unwrap());
        hero.inventory
            .add(Item::Weapon(Weapon::new("Dagger", 1, 2, 2).unwrap()))
            .unwrap();
        assert!(hero.equip_from_inventory(0).is_err());
        assert_eq!(hero.weapon().unwrap().name, "Maul");
        assert_eq!(hero.inventory.len(), 1);
    }

    #[test]
    fn test_archetype_parsing() {
        assert_eq!("Thief".parse::<HeroArchetype>().unwrap(), HeroArchetype::Thief);
        assert!("bard".parse::<HeroArchetype>().is_err());
    }
}
