//! # Commands
//!
//! Text commands a player can type, parsed from a single line.

use crate::{Direction, PillarsError, PillarsResult};
use std::fmt;
use std::str::FromStr;

/// One parsed player command.
///
/// Slot and foe numbers are typed one based and stored zero based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Attack the n-th foe in turn order
    Attack(usize),
    /// Use (drink) the item in an inventory slot
    Use(usize),
    /// Equip the weapon in an inventory slot
    Equip(usize),
    Flee,
    /// Close the combat summary
    Continue,
    Map,
    Look,
    Inventory,
    Stats,
    /// Save to the given path, or the default save path
    Save(Option<String>),
    Help,
    Quit,
}

impl Command {
    /// Whether the command only shows information and never changes the game.
    pub fn is_view_only(&self) -> bool {
        matches!(
            self,
            Command::Map
                | Command::Look
                | Command::Inventory
                | Command::Stats
                | Command::Save(_)
                | Command::Help
                | Command::Quit
        )
    }
}

fn parse_slot(verb: &str, argument: Option<&str>) -> PillarsResult<usize> {
    let Some(argument) = argument else {
        return Ok(0);
    };
    match argument.parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number - 1),
        _ => Err(PillarsError::InvalidAction(format!(
            "'{}' needs a number starting at 1, got '{}'",
            verb, argument
        ))),
    }
}

impl FromStr for Command {
    type Err = PillarsError;

    /// Parses a command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Command, Direction};
    ///
    /// assert_eq!("n".parse::<Command>().unwrap(), Command::Move(Direction::North));
    /// assert_eq!("attack 2".parse::<Command>().unwrap(), Command::Attack(1));
    /// assert_eq!("use".parse::<Command>().unwrap(), Command::Use(0));
    /// assert!("dance".parse::<Command>().is_err());
    /// ```
    fn from_str(line: &str) -> PillarsResult<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next().map(str::to_lowercase) else {
            return Err(PillarsError::InvalidAction("say something".to_string()));
        };
        let verb = verb.as_str();
        let argument = words.next();
        if words.next().is_some() {
            return Err(PillarsError::InvalidAction(format!(
                "too many words for '{}'",
                verb
            )));
        }

        let command = match verb {
            "go" | "move" => match argument {
                Some(direction) => Command::Move(direction.parse()?),
                None => {
                    return Err(PillarsError::InvalidAction(
                        "go where? try north, south, east, or west".to_string(),
                    ))
                }
            },
            "attack" | "a" | "hit" => Command::Attack(parse_slot(verb, argument)?),
            "use" | "drink" | "u" => Command::Use(parse_slot(verb, argument)?),
            "equip" | "wield" => Command::Equip(parse_slot(verb, argument)?),
            "flee" | "run" => Command::Flee,
            "continue" | "c" | "ok" => Command::Continue,
            "map" | "m" => Command::Map,
            "look" | "l" => Command::Look,
            "inventory" | "inv" | "i" => Command::Inventory,
            "stats" | "status" => Command::Stats,
            "save" => Command::Save(argument.map(str::to_string)),
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => match other.parse::<Direction>() {
                Ok(direction) if argument.is_none() => Command::Move(direction),
                _ => {
                    return Err(PillarsError::InvalidAction(format!(
                        "unknown command '{}'; type help",
                        other
                    )))
                }
            },
        };

        if argument.is_some()
            && !matches!(
                command,
                Command::Move(_)
                    | Command::Attack(_)
                    | Command::Use(_)
                    | Command::Equip(_)
                    | Command::Save(_)
            )
        {
            return Err(PillarsError::InvalidAction(format!(
                "'{}' takes no argument",
                verb
            )));
        }
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(direction) => write!(f, "go {}", direction),
            Command::Attack(index) => write!(f, "attack {}", index + 1),
            Command::Use(index) => write!(f, "use {}", index + 1),
            Command::Equip(index) => write!(f, "equip {}", index + 1),
            Command::Flee => f.write_str("flee"),
            Command::Continue => f.write_str("continue"),
            Command::Map => f.write_str("map"),
            Command::Look => f.write_str("look"),
            Command::Inventory => f.write_str("inventory"),
            Command::Stats => f.write_str("stats"),
            Command::Save(Some(path)) => write!(f, "save {}", path),
            Command::Save(None) => f.write_str("save"),
            Command::Help => f.write_str("help"),
            Command::Quit => f.write_str("quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_aliases() {
        for line in ["n", "north", "go north", "  GO N  ", "up"] {
            assert_eq!(line.parse::<Command>().unwrap(), Command::Move(Direction::North));
        }
        assert_eq!("w".parse::<Command>().unwrap(), Command::Move(Direction::West));
        assert!("go".parse::<Command>().is_err());
        assert!("go sideways".parse::<Command>().is_err());
    }

    #[test]
    fn test_numbered_commands() {
        assert_eq!("attack".parse::<Command>().unwrap(), Command::Attack(0));
        assert_eq!("a 3".parse::<Command>().unwrap(), Command::Attack(2));
        assert_eq!("equip 1".parse::<Command>().unwrap(), Command::Equip(0));
        assert!("use 0".parse::<Command>().is_err());
        assert!("use two".parse::<Command>().is_err());
    }

    #[test]
    fn test_arguments_only_where_expected() {
        assert!("flee now".parse::<Command>().is_err());
        assert!("attack 1 2".parse::<Command>().is_err());
        assert_eq!(
            "SAVE Run.json".parse::<Command>().unwrap(),
            Command::Save(Some("Run.json".to_string()))
        );
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_display_reparses() {
        for command in [Command::Attack(1), Command::Move(Direction::East), Command::Flee] {
            assert_eq!(command.to_string().parse::<Command>().unwrap(), command);
        }
    }
}
