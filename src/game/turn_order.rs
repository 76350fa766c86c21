//! # Turn Order
//!
//! Speed-sorted ordering of everyone in an encounter.
//!
//! The order is computed once when combat begins and never re-sorted. Defeated
//! combatants are cut out in place, and the cursor is adjusted so whoever was due
//! next still goes next.

use crate::{EntityId, Hero, Monster, PillarsError, PillarsResult};
use serde::{Deserialize, Serialize};

/// A slot in the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combatant {
    Hero,
    Monster(EntityId),
}

/// Where the hero lands among monsters of equal speed.
///
/// Monsters of equal speed always keep their encounter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// The hero acts before equally fast monsters
    #[default]
    HeroFirst,
    /// The hero acts after equally fast monsters
    HeroLast,
}

/// Fixed cycle of combatants with a cursor on whoever is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    slots: Vec<Combatant>,
    current: usize,
}

impl TurnOrder {
    /// Orders the hero and every live monster by descending attack speed.
    ///
    /// The sort is stable, so ties keep insertion order: the hero is inserted ahead
    /// of or behind the monsters according to `tie_break`, and monsters are
    /// inserted in the order they appear in `monsters`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Combatant, Hero, HeroArchetype, Monster, MonsterKind, TieBreak, TurnOrder};
    ///
    /// let hero = Hero::new("Ada", HeroArchetype::Thief, 10).unwrap(); // speed 6
    /// let ogre = Monster::spawn(MonsterKind::Ogre).unwrap(); // speed 2
    /// let order = TurnOrder::build(&hero, &[ogre.clone()], TieBreak::HeroFirst);
    /// assert_eq!(order.slots(), &[Combatant::Hero, Combatant::Monster(ogre.id())]);
    /// ```
    pub fn build(hero: &Hero, monsters: &[Monster], tie_break: TieBreak) -> Self {
        let mut entries: Vec<(i32, Combatant)> = Vec::with_capacity(monsters.len() + 1);
        let hero_entry = (hero.character.attack_speed(), Combatant::Hero);

        if tie_break == TieBreak::HeroFirst {
            entries.push(hero_entry);
        }
        entries.extend(
            monsters
                .iter()
                .filter(|monster| monster.is_alive())
                .map(|monster| (monster.character.attack_speed(), Combatant::Monster(monster.id()))),
        );
        if tie_break == TieBreak::HeroLast {
            entries.push(hero_entry);
        }

        entries.sort_by(|a, b| b.0.cmp(&a.0));

        Self {
            slots: entries.into_iter().map(|(_, combatant)| combatant).collect(),
            current: 0,
        }
    }

    /// Combatants in acting order.
    pub fn slots(&self) -> &[Combatant] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Whoever is acting now.
    pub fn current(&self) -> Option<Combatant> {
        self.slots.get(self.current).copied()
    }

    pub fn contains(&self, combatant: Combatant) -> bool {
        self.slots.contains(&combatant)
    }

    /// Number of monsters still in the order.
    pub fn monster_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Combatant::Monster(_)))
            .count()
    }

    /// Moves the cursor to the next combatant, wrapping at the end.
    pub fn advance(&mut self) -> PillarsResult<Combatant> {
        if self.slots.is_empty() {
            return Err(PillarsError::InvariantViolation(
                "cannot advance an empty turn order".to_string(),
            ));
        }
        self.current = (self.current + 1) % self.slots.len();
        Ok(self.slots[self.current])
    }

    /// Cuts `combatant` out of the order without re-sorting the rest.
    ///
    /// Returns false if it was not in the order. The cursor keeps pointing at the
    /// same combatant when someone else is removed. If the acting combatant itself is
    /// removed, the cursor steps back so the next [`advance`](Self::advance) lands on
    /// its successor.
    pub fn remove(&mut self, combatant: Combatant) -> bool {
        let Some(index) = self.slots.iter().position(|slot| *slot == combatant) else {
            return false;
        };
        self.slots.remove(index);

        if self.slots.is_empty() {
            self.current = 0;
        } else if index < self.current {
            self.current -= 1;
        } else if index == self.current {
            self.current = (index + self.slots.len() - 1) % self.slots.len();
        }
        true
    }

    /// Checks that the cursor points inside the order and the hero is present.
    pub fn validate(&self) -> PillarsResult<()> {
        if !self.slots.is_empty() && self.current >= self.slots.len() {
            return Err(PillarsError::InvariantViolation(format!(
                "turn cursor {} past {} combatants",
                self.current,
                self.slots.len()
            )));
        }
        let heroes = self
            .slots
            .iter()
            .filter(|slot| **slot == Combatant::Hero)
            .count();
        if heroes != 1 {
            return Err(PillarsError::InvariantViolation(format!(
                "turn order holds {} heroes",
                heroes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fixtures::{hero, monster};

    #[test]
    fn test_orders_by_descending_speed() {
        let monsters = vec![
            monster("slow", 10, 1, 50),
            monster("fast", 10, 9, 50),
            monster("mid", 10, 4, 50),
        ];
        let order = TurnOrder::build(&hero(5), &monsters, TieBreak::HeroFirst);
        assert_eq!(
            order.slots(),
            &[
                Combatant::Monster(monsters[1].id()),
                Combatant::Hero,
                Combatant::Monster(monsters[2].id()),
                Combatant::Monster(monsters[0].id()),
            ]
        );
    }

    #[test]
    fn test_ties_keep_encounter_order_and_tie_break() {
        let monsters = vec![monster("first", 10, 3, 50), monster("second", 10, 3, 50)];
        let first = Combatant::Monster(monsters[0].id());
        let second = Combatant::Monster(monsters[1].id());

        let order = TurnOrder::build(&hero(3), &monsters, TieBreak::HeroFirst);
        assert_eq!(order.slots(), &[Combatant::Hero, first, second]);

        let order = TurnOrder::build(&hero(3), &monsters, TieBreak::HeroLast);
        assert_eq!(order.slots(), &[first, second, Combatant::Hero]);
    }

    #[test]
    fn test_dead_monsters_are_left_out() {
        let mut monsters = vec![monster("alive", 10, 2, 50), monster("dead", 10, 2, 50)];
        let mut dice = crate::LoadedDice::default();
        monsters[1].character.take_damage(100, &mut dice);
        let order = TurnOrder::build(&hero(1), &monsters, TieBreak::HeroFirst);
        assert_eq!(order.len(), 2);
        assert_eq!(order.monster_count(), 1);
    }

    #[test]
    fn test_advance_wraps() {
        let monsters = vec![monster("m", 10, 1, 50)];
        let mut order = TurnOrder::build(&hero(5), &monsters, TieBreak::HeroFirst);
        assert_eq!(order.current(), Some(Combatant::Hero));
        assert_eq!(order.advance().unwrap(), Combatant::Monster(monsters[0].id()));
        assert_eq!(order.advance().unwrap(), Combatant::Hero);
        assert_eq!(order.current_index(), 0);
    }

    #[test]
    fn test_remove_keeps_cursor_on_same_combatant() {
        let monsters = vec![
            monster("a", 10, 9, 50),
            monster("b", 10, 8, 50),
            monster("c", 10, 1, 50),
        ];
        let mut order = TurnOrder::build(&hero(5), &monsters, TieBreak::HeroFirst);
        // a, b, hero, c
        order.advance().unwrap();
        order.advance().unwrap();
        assert_eq!(order.current(), Some(Combatant::Hero));

        assert!(order.remove(Combatant::Monster(monsters[0].id())));
        assert_eq!(order.current(), Some(Combatant::Hero));
        assert_eq!(order.advance().unwrap(), Combatant::Monster(monsters[2].id()));

        assert!(!order.remove(Combatant::Monster(monsters[0].id())));
    }

    #[test]
    fn test_removing_current_hands_turn_to_successor() {
        let monsters = vec![monster("a", 10, 9, 50), monster("b", 10, 1, 50)];
        let mut order = TurnOrder::build(&hero(5), &monsters, TieBreak::HeroFirst);
        // a, hero, b; cursor on a
        order.remove(Combatant::Monster(monsters[0].id()));
        assert_eq!(order.advance().unwrap(), Combatant::Hero);

        // hero, b; remove b while it is acting: successor wraps to hero
        order.advance().unwrap();
        order.remove(Combatant::Monster(monsters[1].id()));
        assert_eq!(order.advance().unwrap(), Combatant::Hero);
    }

    #[test]
    fn test_empty_order_cannot_advance() {
        let monsters = vec![monster("m", 10, 1, 50)];
        let mut order = TurnOrder::build(&hero(5), &monsters, TieBreak::HeroFirst);
        order.remove(Combatant::Hero);
        order.remove(Combatant::Monster(monsters[0].id()));
        assert!(order.is_empty());
        assert!(matches!(order.advance(), Err(PillarsError::InvariantViolation(_))));
        assert!(order.validate().is_err());
    }
}
