//! # Combat Session
//!
//! State machine for one encounter between the hero and the monsters of a room.
//!
//! A session walks `Waiting -> PlayerTurn <-> MonsterTurn -> Summary`. The hero acts
//! through [`CombatSession::attack`], [`CombatSession::use_item`], and
//! [`CombatSession::flee`]; monsters act through [`CombatSession::monster_turn`].
//! After every action the cursor moves on and the state follows whoever now holds
//! the turn. A fled or lost session is finished and accepts no more actions.
//!
//! Monsters stay owned by their [`Room`]. The session keeps only the turn order and
//! the running tally, and borrows the hero and room for each action.

use crate::{
    Combatant, Dice, EngineConfig, EntityId, GameEvent, Hero, PillarsError, PillarsResult, Room,
    RoomId, TurnOrder,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatState {
    /// Before the first turn, and after a successful escape
    Waiting,
    PlayerTurn,
    MonsterTurn,
    /// Every monster is defeated; waiting for the player to acknowledge
    Summary,
}

/// How the encounter ended, if it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Ongoing,
    Victory,
    Fled,
    HeroDefeated,
}

/// Running tally shown when the encounter is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatSummary {
    pub xp_gained: u32,
    pub monsters_defeated: u32,
    pub levels_gained: u32,
}

/// One encounter in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSession {
    room_id: RoomId,
    order: TurnOrder,
    state: CombatState,
    outcome: CombatOutcome,
    summary: CombatSummary,
    flee_chance: i32,
}

impl CombatSession {
    /// Starts an encounter against every live monster in `room`.
    ///
    /// The turn order is computed once here. The session then leaves `Waiting` for
    /// whichever side holds the first slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{CombatSession, CombatState, EngineConfig, Hero, HeroArchetype, Monster, MonsterKind, Room, RoomKind};
    ///
    /// let hero = Hero::new("Ada", HeroArchetype::Thief, 10).unwrap();
    /// let mut room = Room::new("lair", RoomKind::Normal);
    /// room.add_monster(Monster::spawn(MonsterKind::Ogre).unwrap());
    ///
    /// let session = CombatSession::begin(&room, &hero, &EngineConfig::default()).unwrap();
    /// assert_eq!(session.state(), CombatState::PlayerTurn);
    /// ```
    pub fn begin(room: &Room, hero: &Hero, config: &EngineConfig) -> PillarsResult<Self> {
        if !hero.is_alive() {
            return Err(PillarsError::InvariantViolation(format!(
                "{} cannot fight at 0 hp",
                hero.name()
            )));
        }
        if !room.has_live_monsters() {
            return Err(PillarsError::InvalidAction(format!(
                "nothing to fight in {}",
                room.id
            )));
        }

        let mut session = Self {
            room_id: room.id.clone(),
            order: TurnOrder::build(hero, &room.monsters, config.tie_break),
            state: CombatState::Waiting,
            outcome: CombatOutcome::Ongoing,
            summary: CombatSummary::default(),
            flee_chance: config.flee_chance,
        };
        session.follow_cursor();
        info!(
            "Combat begins in {} with {} monster(s)",
            session.room_id,
            session.order.monster_count()
        );
        Ok(session)
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn outcome(&self) -> CombatOutcome {
        self.outcome
    }

    pub fn summary(&self) -> CombatSummary {
        self.summary
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn turn_order(&self) -> &TurnOrder {
        &self.order
    }

    pub fn flee_chance(&self) -> i32 {
        self.flee_chance
    }

    /// Whether the session has ended and accepts no more actions.
    pub fn is_over(&self) -> bool {
        self.outcome != CombatOutcome::Ongoing
    }

    /// Monsters still fighting, in turn order.
    pub fn foes(&self) -> Vec<EntityId> {
        self.order
            .slots()
            .iter()
            .filter_map(|slot| match slot {
                Combatant::Monster(id) => Some(*id),
                Combatant::Hero => None,
            })
            .collect()
    }

    /// The hero swings at `target`.
    ///
    /// A defeated target leaves the room and the turn order, its xp goes to the hero,
    /// and its loot drops into the room. Beating the last monster moves the session
    /// to `Summary`.
    pub fn attack<D: Dice + ?Sized>(
        &mut self,
        hero: &mut Hero,
        room: &mut Room,
        target: EntityId,
        dice: &mut D,
    ) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_player_turn()?;
        self.ensure_room(room)?;
        if !self.order.contains(Combatant::Monster(target)) {
            return Err(PillarsError::InvalidAction(
                "that foe is not in this fight".to_string(),
            ));
        }
        let monster = room
            .monster_mut(target)
            .filter(|monster| monster.is_alive())
            .ok_or_else(|| {
                PillarsError::InvariantViolation(format!(
                    "turn order references missing monster {}",
                    target
                ))
            })?;

        let outcome = hero.character.attempt_attack(&mut monster.character, dice)?;
        let mut events = vec![GameEvent::Attack {
            attacker: hero.name().to_string(),
            target: monster.name().to_string(),
            by_hero: true,
            hit: outcome.hit,
            damage: outcome.damage,
            target_hp: monster.character.hp(),
        }];
        if outcome.healed > 0 {
            events.push(GameEvent::Healed {
                name: hero.name().to_string(),
                amount: outcome.healed,
            });
        }

        if !monster.is_alive() {
            self.defeat(hero, room, target, &mut events)?;
        }

        if self.order.monster_count() == 0 {
            self.state = CombatState::Summary;
            self.outcome = CombatOutcome::Victory;
            info!(
                "Combat won: {} defeated, {} xp",
                self.summary.monsters_defeated, self.summary.xp_gained
            );
            events.push(GameEvent::CombatWon {
                xp_gained: self.summary.xp_gained,
                monsters_defeated: self.summary.monsters_defeated,
            });
        } else {
            self.advance()?;
        }
        Ok(events)
    }

    /// The hero drinks the potion in inventory slot `index`, using up the turn.
    pub fn use_item(&mut self, hero: &mut Hero, index: usize) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_player_turn()?;
        let (potion, healed) = hero.drink_potion(index)?;
        self.advance()?;
        Ok(vec![GameEvent::PotionDrunk {
            potion: potion.name,
            healed,
        }])
    }

    /// The hero tries to escape.
    ///
    /// Success ends the session back in `Waiting`; failure spends the turn.
    pub fn flee<D: Dice + ?Sized>(&mut self, dice: &mut D) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_player_turn()?;
        if dice.chance(self.flee_chance) {
            self.state = CombatState::Waiting;
            self.outcome = CombatOutcome::Fled;
            info!("Hero fled from {}", self.room_id);
            Ok(vec![GameEvent::FleeSucceeded])
        } else {
            self.advance()?;
            Ok(vec![GameEvent::FleeFailed])
        }
    }

    /// The monster holding the turn attacks the hero.
    pub fn monster_turn<D: Dice + ?Sized>(
        &mut self,
        hero: &mut Hero,
        room: &mut Room,
        dice: &mut D,
    ) -> PillarsResult<Vec<GameEvent>> {
        if self.is_over() {
            return Err(PillarsError::InvalidAction("combat is over".to_string()));
        }
        if self.state != CombatState::MonsterTurn {
            return Err(PillarsError::InvalidAction(
                "it is not a monster's turn".to_string(),
            ));
        }
        self.ensure_room(room)?;
        let Some(Combatant::Monster(id)) = self.order.current() else {
            return Err(PillarsError::InvariantViolation(
                "monster turn without a monster in the slot".to_string(),
            ));
        };
        let monster = room.monster_mut(id).ok_or_else(|| {
            PillarsError::InvariantViolation(format!(
                "turn order references missing monster {}",
                id
            ))
        })?;

        let outcome = monster.attempt_attack(&mut hero.character, dice)?;
        let mut events = vec![GameEvent::Attack {
            attacker: monster.name().to_string(),
            target: hero.name().to_string(),
            by_hero: false,
            hit: outcome.hit,
            damage: outcome.damage,
            target_hp: hero.character.hp(),
        }];
        if outcome.healed > 0 {
            events.push(GameEvent::Healed {
                name: monster.name().to_string(),
                amount: outcome.healed,
            });
        }

        if hero.is_alive() {
            self.advance()?;
        } else {
            self.outcome = CombatOutcome::HeroDefeated;
            info!("{} fell in {}", hero.name(), self.room_id);
            events.push(GameEvent::HeroDefeated {
                name: hero.name().to_string(),
            });
        }
        Ok(events)
    }

    /// Checks the session against the hero and room it was started for.
    pub fn validate(&self, hero: &Hero, room: &Room) -> PillarsResult<()> {
        self.ensure_room(room)?;
        match self.outcome {
            CombatOutcome::Victory => {
                if self.state != CombatState::Summary || self.order.monster_count() != 0 {
                    return Err(PillarsError::InvariantViolation(
                        "won combat with monsters left".to_string(),
                    ));
                }
                return Ok(());
            }
            CombatOutcome::Fled => return Ok(()),
            CombatOutcome::HeroDefeated => {
                if hero.is_alive() {
                    return Err(PillarsError::InvariantViolation(format!(
                        "{} is marked defeated but still standing",
                        hero.name()
                    )));
                }
                return Ok(());
            }
            CombatOutcome::Ongoing => {}
        }

        self.order.validate()?;
        for id in self.foes() {
            if !room.monster(id).is_some_and(|monster| monster.is_alive()) {
                return Err(PillarsError::InvariantViolation(format!(
                    "turn order references missing monster {}",
                    id
                )));
            }
        }
        let expected = match self.order.current() {
            Some(Combatant::Hero) => CombatState::PlayerTurn,
            _ => CombatState::MonsterTurn,
        };
        if self.state != expected {
            return Err(PillarsError::InvariantViolation(format!(
                "state {:?} does not match the acting combatant",
                self.state
            )));
        }
        Ok(())
    }

    fn defeat(
        &mut self,
        hero: &mut Hero,
        room: &mut Room,
        id: EntityId,
        events: &mut Vec<GameEvent>,
    ) -> PillarsResult<()> {
        let mut monster = room.remove_monster(id).ok_or_else(|| {
            PillarsError::InvariantViolation(format!("defeated monster {} vanished", id))
        })?;
        self.order.remove(Combatant::Monster(id));

        let xp = monster.xp_reward();
        debug!("{} defeated for {} xp", monster.name(), xp);
        events.push(GameEvent::MonsterDefeated {
            name: monster.name().to_string(),
            xp_reward: xp,
        });

        let before = hero.level();
        let levels = hero.gain_xp(xp);
        events.extend((1..=levels).map(|step| GameEvent::LevelUp {
            level: before + step,
        }));

        for item in monster.take_loot() {
            events.push(GameEvent::LootDropped {
                item: item.name().to_string(),
            });
            room.add_item(item);
        }

        self.summary.xp_gained += xp;
        self.summary.monsters_defeated += 1;
        self.summary.levels_gained += levels;
        Ok(())
    }

    fn advance(&mut self) -> PillarsResult<()> {
        self.order.advance()?;
        self.follow_cursor();
        Ok(())
    }

    fn follow_cursor(&mut self) {
        self.state = match self.order.current() {
            Some(Combatant::Hero) => CombatState::PlayerTurn,
            Some(Combatant::Monster(_)) => CombatState::MonsterTurn,
            None => CombatState::Waiting,
        };
    }

    fn ensure_player_turn(&self) -> PillarsResult<()> {
        if self.is_over() {
            return Err(PillarsError::InvalidAction("combat is over".to_string()));
        }
        if self.state != CombatState::PlayerTurn {
            return Err(PillarsError::InvalidAction(
                "it is not your turn".to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_room(&self, room: &Room) -> PillarsResult<()> {
        if room.id != self.room_id {
            return Err(PillarsError::InvariantViolation(format!(
                "combat in {} given room {}",
                self.room_id, room.id
            )));
        }
        Ok(())
    }
}
