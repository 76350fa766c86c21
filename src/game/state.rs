//! # Game Session
//!
//! Top-level orchestration of a play-through.
//!
//! [`GameSession`] owns the room graph, the hero, the navigator, and the combat
//! session while one is running. It switches between modes, applies the effects
//! of entering a room, drives monster turns after each hero action, and saves or
//! restores the whole thing as JSON. Actions issued in the wrong mode are refused
//! without touching anything.

use crate::{
    CombatOutcome, CombatSession, CombatState, Dice, Direction, DungeonGenerator,
    DungeonNavigator, EngineConfig, EntityId, GameEvent, Generator, Hero, HeroArchetype, Item,
    MessageImportance, PillarsError, PillarsResult, Pillar, Position, Room, RoomGraph, RoomId,
    RoomKind,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What the game is currently waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Title,
    PlayerCreation,
    Exploring,
    InCombat,
    GameOver,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The hero walked out of the exit with every pillar
    Victory,
    Defeated,
}

/// Running totals for the end-of-game screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Rooms walked into
    pub steps_taken: u32,
    pub monsters_defeated: u32,
    pub items_collected: u32,
    pub pillars_found: u32,
    pub potions_drunk: u32,
    pub encounters: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub levels_gained: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the totals from one event. Attacks count as dealt when the hero
    /// swung and as taken otherwise.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::HeroMoved { .. } => self.steps_taken += 1,
            GameEvent::Attack {
                by_hero, damage, ..
            } => {
                if *by_hero {
                    self.damage_dealt += *damage as u64;
                } else {
                    self.damage_taken += *damage as u64;
                }
            }
            GameEvent::FellIntoPit { damage, .. } => self.damage_taken += *damage as u64,
            GameEvent::MonsterDefeated { .. } => self.monsters_defeated += 1,
            GameEvent::ItemPickedUp { .. } => self.items_collected += 1,
            GameEvent::PillarFound { .. } => self.pillars_found += 1,
            GameEvent::PotionDrunk { .. } => self.potions_drunk += 1,
            GameEvent::EncounterStarted { .. } => self.encounters += 1,
            GameEvent::LevelUp { .. } => self.levels_gained += 1,
            _ => {}
        }
    }
}

/// A whole play-through, from the title screen to game over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    mode: GameMode,
    graph: RoomGraph,
    hero: Option<Hero>,
    navigator: Option<DungeonNavigator>,
    /// Present only while in combat
    combat: Option<CombatSession>,
    config: EngineConfig,
    outcome: Option<GameOutcome>,
    statistics: GameStatistics,
}

impl GameSession {
    /// Wraps a prepared dungeon. The graph must pass structural validation.
    pub fn new(graph: RoomGraph, config: EngineConfig) -> PillarsResult<Self> {
        config.validate()?;
        graph.validate()?;
        info!("New game session over {} rooms", graph.len());
        Ok(Self {
            mode: GameMode::Title,
            graph,
            hero: None,
            navigator: None,
            combat: None,
            config,
            outcome: None,
            statistics: GameStatistics::new(),
        })
    }

    /// Generates a dungeon from `config.generation` and wraps it.
    pub fn generate(config: EngineConfig) -> PillarsResult<Self> {
        let generator = DungeonGenerator::new();
        let mut rng = crate::generation::utils::create_rng(&config.generation);
        let graph = generator.generate(&config.generation, &mut rng)?;
        Self::new(graph, config)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn hero(&self) -> Option<&Hero> {
        self.hero.as_ref()
    }

    pub fn combat(&self) -> Option<&CombatSession> {
        self.combat.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn statistics(&self) -> &GameStatistics {
        &self.statistics
    }

    pub fn is_over(&self) -> bool {
        self.mode == GameMode::GameOver
    }

    /// The room the hero stands in, once a hero exists.
    pub fn current_room(&self) -> Option<&Room> {
        let navigator = self.navigator.as_ref()?;
        self.graph.get_room(navigator.current_room())
    }

    /// Map offsets of every room reachable from the entrance.
    pub fn map_coordinates(&self) -> BTreeMap<RoomId, Position> {
        DungeonNavigator::assign_coordinates(&self.graph)
    }

    /// Leaves the title screen.
    pub fn start_creation(&mut self) -> PillarsResult<()> {
        self.ensure_mode(GameMode::Title)?;
        self.mode = GameMode::PlayerCreation;
        Ok(())
    }

    /// Creates the hero and places it at the entrance.
    pub fn create_hero(
        &mut self,
        name: &str,
        archetype: HeroArchetype,
    ) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_mode(GameMode::PlayerCreation)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(PillarsError::InvalidAction(
                "your hero needs a name".to_string(),
            ));
        }

        let hero = Hero::new(name, archetype, self.config.inventory_capacity)?;
        let navigator = DungeonNavigator::enter(&mut self.graph)?;
        info!("{} the {} enters at {}", name, archetype, navigator.current_room());
        self.hero = Some(hero);
        self.navigator = Some(navigator);
        self.mode = GameMode::Exploring;
        Ok(vec![GameEvent::Message {
            text: format!(
                "{} the {} descends into the dungeon in search of the four pillars.",
                name, archetype
            ),
            importance: MessageImportance::Important,
        }])
    }

    /// Walks the hero one room in `direction` and resolves what happens there.
    ///
    /// In order: a pit hurts the hero, items are picked up, live monsters start an
    /// encounter, and reaching the exit with every pillar wins the game.
    pub fn move_hero<D: Dice + ?Sized>(
        &mut self,
        direction: Direction,
        dice: &mut D,
    ) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_mode(GameMode::Exploring)?;
        let navigator = self
            .navigator
            .as_mut()
            .ok_or_else(|| PillarsError::InvalidState("no hero in the dungeon".to_string()))?;
        let moved = navigator.move_hero(&mut self.graph, direction)?;

        let mut events = vec![GameEvent::HeroMoved {
            from: moved.from,
            to: moved.to,
            direction,
        }];
        self.enter_room(dice, &mut events)?;
        self.record(&events);
        Ok(events)
    }

    /// Swings at `target` in the current encounter.
    pub fn attack<D: Dice + ?Sized>(
        &mut self,
        target: EntityId,
        dice: &mut D,
    ) -> PillarsResult<Vec<GameEvent>> {
        self.combat_action(dice, |combat, hero, room, dice| {
            combat.attack(hero, room, target, dice)
        })
    }

    /// Id of the `index`-th foe (zero based) in turn order.
    pub fn foe_at(&self, index: usize) -> Option<EntityId> {
        self.combat.as_ref()?.foes().get(index).copied()
    }

    /// Drinks a potion in the middle of a fight, spending the turn.
    pub fn use_item<D: Dice + ?Sized>(
        &mut self,
        index: usize,
        dice: &mut D,
    ) -> PillarsResult<Vec<GameEvent>> {
        self.combat_action(dice, |combat, hero, _room, _dice| {
            combat.use_item(hero, index)
        })
    }

    /// Tries to run from the current encounter.
    pub fn flee<D: Dice + ?Sized>(&mut self, dice: &mut D) -> PillarsResult<Vec<GameEvent>> {
        self.combat_action(dice, |combat, _hero, _room, dice| combat.flee(dice))
    }

    /// Closes a won encounter's summary and returns to exploring.
    ///
    /// Loot the defeated monsters dropped is picked up on the way out.
    pub fn acknowledge_summary(&mut self) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_mode(GameMode::InCombat)?;
        if self.combat.as_ref().map(CombatSession::state) != Some(CombatState::Summary) {
            return Err(PillarsError::InvalidAction(
                "the fight is not over yet".to_string(),
            ));
        }
        self.combat = None;
        self.mode = GameMode::Exploring;

        let mut events = Vec::new();
        let (hero, room) = self.hero_and_room()?;
        pick_up_items(hero, room, &mut events);
        self.check_exit(&mut events)?;
        self.record(&events);
        Ok(events)
    }

    /// Drinks a potion while exploring.
    pub fn drink_potion(&mut self, index: usize) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_mode(GameMode::Exploring)?;
        let hero = self.hero_mut()?;
        let (potion, healed) = hero.drink_potion(index)?;
        let events = vec![GameEvent::PotionDrunk {
            potion: potion.name,
            healed,
        }];
        self.record(&events);
        Ok(events)
    }

    /// Equips a weapon from the inventory while exploring.
    pub fn equip(&mut self, index: usize) -> PillarsResult<Vec<GameEvent>> {
        self.ensure_mode(GameMode::Exploring)?;
        let hero = self.hero_mut()?;
        let (weapon, previous) = hero.equip_from_inventory(index)?;
        Ok(vec![GameEvent::WeaponEquipped { weapon, previous }])
    }

    /// Saves the session to JSON.
    pub fn save_to_json(&self) -> PillarsResult<String> {
        serde_json::to_string_pretty(self).map_err(PillarsError::from)
    }

    /// Loads a session from JSON, rejecting state that breaks any invariant.
    pub fn load_from_json(json: &str) -> PillarsResult<Self> {
        let session: Self = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> PillarsResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.save_to_json()?)?;
        info!("Saved game to {}", path.display());
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> PillarsResult<Self> {
        let path = path.as_ref();
        let session = Self::load_from_json(&std::fs::read_to_string(path)?)?;
        info!("Loaded game from {}", path.display());
        Ok(session)
    }

    /// Checks every invariant a freshly built session satisfies.
    pub fn validate(&self) -> PillarsResult<()> {
        self.config.validate()?;
        self.graph.validate()?;
        for room in self.graph.rooms() {
            for monster in &room.monsters {
                monster.character.validate()?;
            }
        }
        if let Some(hero) = &self.hero {
            hero.validate()?;
        }

        match (self.mode, self.outcome) {
            (GameMode::GameOver, None) => {
                return Err(PillarsError::InvalidState(
                    "game over without an outcome".to_string(),
                ))
            }
            (GameMode::GameOver, Some(_)) => {}
            (_, Some(_)) => {
                return Err(PillarsError::InvalidState(format!(
                    "{:?} mode with a final outcome",
                    self.mode
                )))
            }
            (_, None) => {}
        }

        let in_dungeon = !matches!(self.mode, GameMode::Title | GameMode::PlayerCreation);
        if in_dungeon != (self.hero.is_some() && self.navigator.is_some()) {
            return Err(PillarsError::InvalidState(format!(
                "{:?} mode does not match hero presence",
                self.mode
            )));
        }
        if (self.mode == GameMode::InCombat) != self.combat.is_some() {
            return Err(PillarsError::InvalidState(format!(
                "{:?} mode does not match combat presence",
                self.mode
            )));
        }

        if let (Some(hero), Some(navigator)) = (&self.hero, &self.navigator) {
            let room = self
                .graph
                .get_room(navigator.current_room())
                .ok_or_else(|| PillarsError::UnknownRoom(navigator.current_room().to_string()))?;
            if self.mode != GameMode::GameOver && !hero.is_alive() {
                return Err(PillarsError::InvariantViolation(format!(
                    "{} is at 0 hp outside game over",
                    hero.name()
                )));
            }
            if let Some(combat) = &self.combat {
                if combat.outcome() != CombatOutcome::Ongoing
                    && combat.outcome() != CombatOutcome::Victory
                {
                    return Err(PillarsError::InvalidState(
                        "finished combat left in place".to_string(),
                    ));
                }
                combat.validate(hero, room)?;
            }
        }
        Ok(())
    }

    fn enter_room<D: Dice + ?Sized>(
        &mut self,
        dice: &mut D,
        events: &mut Vec<GameEvent>,
    ) -> PillarsResult<()> {
        let config = self.config.clone();
        let (hero, room) = self.hero_and_room()?;

        if room.kind == RoomKind::Pit {
            let rolled = dice.roll_range(1, config.pit_max_damage);
            let damage = hero.character.take_damage(rolled, dice);
            debug!("Pit in {} dealt {} damage", room.id, damage);
            events.push(GameEvent::FellIntoPit {
                damage,
                hp_left: hero.character.hp(),
            });
            if !hero.is_alive() {
                events.push(GameEvent::HeroDefeated {
                    name: hero.name().to_string(),
                });
                self.finish(GameOutcome::Defeated);
                return Ok(());
            }
        }

        pick_up_items(hero, room, events);

        if room.has_live_monsters() {
            let combat = CombatSession::begin(room, hero, &config)?;
            events.push(GameEvent::EncounterStarted {
                monsters: room.live_monsters().map(|m| m.name().to_string()).collect(),
            });
            self.combat = Some(combat);
            self.mode = GameMode::InCombat;

            let (combat, hero, room) = self.combat_parts()?;
            run_monster_turns(combat, hero, room, dice, events)?;
            self.settle_combat();
            return Ok(());
        }

        self.check_exit(events)
    }

    fn check_exit(&mut self, events: &mut Vec<GameEvent>) -> PillarsResult<()> {
        let (hero, room) = self.hero_and_room()?;
        if room.kind != RoomKind::Exit {
            return Ok(());
        }
        if hero.has_all_pillars() {
            events.push(GameEvent::Victory);
            self.finish(GameOutcome::Victory);
        } else {
            let missing = Pillar::ALL.len() - hero.pillars().len();
            events.push(GameEvent::message(format!(
                "The exit is here, but {} pillar(s) are still missing.",
                missing
            )));
        }
        Ok(())
    }

    fn combat_action<D, F>(&mut self, dice: &mut D, action: F) -> PillarsResult<Vec<GameEvent>>
    where
        D: Dice + ?Sized,
        F: FnOnce(&mut CombatSession, &mut Hero, &mut Room, &mut D) -> PillarsResult<Vec<GameEvent>>,
    {
        self.ensure_mode(GameMode::InCombat)?;
        let (combat, hero, room) = self.combat_parts()?;
        let mut events = action(combat, hero, room, dice)?;
        run_monster_turns(combat, hero, room, dice, &mut events)?;
        self.settle_combat();
        self.record(&events);
        Ok(events)
    }

    /// Moves the game on once a combat session has fled or been lost.
    fn settle_combat(&mut self) {
        match self.combat.as_ref().map(CombatSession::outcome) {
            Some(CombatOutcome::Fled) => {
                self.combat = None;
                self.mode = GameMode::Exploring;
            }
            Some(CombatOutcome::HeroDefeated) => self.finish(GameOutcome::Defeated),
            _ => {}
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Victory => info!("Game won"),
            GameOutcome::Defeated => warn!("Hero defeated; game over"),
        }
        self.combat = None;
        self.mode = GameMode::GameOver;
        self.outcome = Some(outcome);
    }

    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            self.statistics.update_from_event(event);
        }
    }

    fn ensure_mode(&self, expected: GameMode) -> PillarsResult<()> {
        if self.mode != expected {
            return Err(PillarsError::InvalidAction(format!(
                "cannot do that while in {:?} mode",
                self.mode
            )));
        }
        Ok(())
    }

    fn hero_mut(&mut self) -> PillarsResult<&mut Hero> {
        self.hero
            .as_mut()
            .ok_or_else(|| PillarsError::InvalidState("no hero has been created".to_string()))
    }

    fn hero_and_room(&mut self) -> PillarsResult<(&mut Hero, &mut Room)> {
        let hero = self
            .hero
            .as_mut()
            .ok_or_else(|| PillarsError::InvalidState("no hero has been created".to_string()))?;
        let id = self
            .navigator
            .as_ref()
            .ok_or_else(|| PillarsError::InvalidState("no hero in the dungeon".to_string()))?
            .current_room();
        let room = self
            .graph
            .get_room_mut(id)
            .ok_or_else(|| PillarsError::UnknownRoom(id.to_string()))?;
        Ok((hero, room))
    }

    fn combat_parts(&mut self) -> PillarsResult<(&mut CombatSession, &mut Hero, &mut Room)> {
        let combat = self
            .combat
            .as_mut()
            .ok_or_else(|| PillarsError::InvalidState("no combat in progress".to_string()))?;
        let hero = self
            .hero
            .as_mut()
            .ok_or_else(|| PillarsError::InvalidState("no hero has been created".to_string()))?;
        let id = self
            .navigator
            .as_ref()
            .ok_or_else(|| PillarsError::InvalidState("no hero in the dungeon".to_string()))?
            .current_room();
        let room = self
            .graph
            .get_room_mut(id)
            .ok_or_else(|| PillarsError::UnknownRoom(id.to_string()))?;
        Ok((combat, hero, room))
    }
}

/// Lets monsters act until the hero's turn comes round or the fight ends.
/// Moves everything on the floor into the hero's pack. Pillars always fit; items
/// over the weight limit stay in the room.
fn pick_up_items(hero: &mut Hero, room: &mut Room, events: &mut Vec<GameEvent>) {
    let mut left_behind = Vec::new();
    for item in room.take_items() {
        match item {
            Item::Pillar(pillar) => {
                if hero.collect_pillar(pillar) {
                    events.push(GameEvent::PillarFound { pillar });
                }
            }
            item => {
                let name = item.name().to_string();
                match hero.inventory.add(item) {
                    Ok(()) => events.push(GameEvent::ItemPickedUp { item: name }),
                    Err(item) => {
                        events.push(GameEvent::ItemLeftBehind { item: name });
                        left_behind.push(item);
                    }
                }
            }
        }
    }
    room.items = left_behind;
}

fn run_monster_turns<D: Dice + ?Sized>(
    combat: &mut CombatSession,
    hero: &mut Hero,
    room: &mut Room,
    dice: &mut D,
    events: &mut Vec<GameEvent>,
) -> PillarsResult<()> {
    while !combat.is_over() && combat.state() == CombatState::MonsterTurn {
        events.extend(combat.monster_turn(hero, room, dice)?);
    }
    Ok(())
}
