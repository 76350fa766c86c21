//! # Input Module
//!
//! Turns parsed player commands into game session actions.

pub mod commands;

pub use commands::*;

use crate::{Dice, GameEvent, GameMode, GameSession, PillarsError, PillarsResult};

/// Applies player commands to a game session.
///
/// View-only commands are left to the front end; everything else becomes a call on
/// the session.
#[derive(Debug, Clone, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Creates a new input handler.
    pub fn new() -> Self {
        Self
    }

    /// Runs `command` against the session.
    ///
    /// Returns `None` for view-only commands, otherwise the events the action
    /// produced. `use` drinks in combat as an action that spends the turn, and
    /// outside combat as a free action.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Command, EngineConfig, GameSession, HeroArchetype, InputHandler, LoadedDice};
    ///
    /// let mut session = GameSession::generate(EngineConfig::for_testing(3)).unwrap();
    /// session.start_creation().unwrap();
    /// session.create_hero("Ada", HeroArchetype::Warrior).unwrap();
    ///
    /// let handler = InputHandler::new();
    /// let mut dice = LoadedDice::always(1);
    /// assert!(handler.apply(&Command::Map, &mut session, &mut dice).unwrap().is_none());
    /// ```
    pub fn apply<D: Dice + ?Sized>(
        &self,
        command: &Command,
        session: &mut GameSession,
        dice: &mut D,
    ) -> PillarsResult<Option<Vec<GameEvent>>> {
        let events = match command {
            Command::Move(direction) => session.move_hero(*direction, dice)?,
            Command::Attack(index) => {
                let target = session.foe_at(*index).ok_or_else(|| {
                    PillarsError::InvalidAction(format!("there is no foe number {}", index + 1))
                })?;
                session.attack(target, dice)?
            }
            Command::Use(index) => match session.mode() {
                GameMode::InCombat => session.use_item(*index, dice)?,
                _ => session.drink_potion(*index)?,
            },
            Command::Equip(index) => session.equip(*index)?,
            Command::Flee => session.flee(dice)?,
            Command::Continue => session.acknowledge_summary()?,
            _ => return Ok(None),
        };
        Ok(Some(events))
    }
}

/// Parses one line of player input.
pub fn parse_command(line: &str) -> PillarsResult<Command> {
    line.parse()
}

/// Commands that make sense in `mode`, for the help screen.
pub fn help_text(mode: GameMode) -> String {
    let mut lines = match mode {
        GameMode::InCombat => vec![
            "attack <n>   strike the n-th foe (default 1)",
            "use <n>      drink the potion in slot n; spends your turn",
            "flee         try to escape",
            "continue     close the summary after a won fight",
        ],
        GameMode::Exploring => vec![
            "n/s/e/w      walk north, south, east, or west",
            "use <n>      drink the potion in slot n",
            "equip <n>    wield the weapon in slot n",
            "look         describe the room",
            "map          draw the explored dungeon",
        ],
        _ => Vec::new(),
    };
    lines.extend([
        "inv          list your inventory",
        "stats        show your hero",
        "save [path]  save the game",
        "help         this text",
        "quit         leave the game",
    ]);
    lines.join("\n")
}
