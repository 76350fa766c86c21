//! # Dungeon Navigator
//!
//! Tracks which room the hero stands in and moves it along the room graph.

use crate::{Direction, PillarsError, PillarsResult, Position, RoomGraph, RoomId, RoomKind};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the hero walked into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: RoomId,
    pub to: RoomId,
    pub direction: Direction,
    pub kind: RoomKind,
    /// Live monsters wait in the destination
    pub encounter: bool,
    /// The destination had never been explored before this move
    pub first_visit: bool,
}

/// The hero's position in the dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonNavigator {
    current: RoomId,
}

impl DungeonNavigator {
    /// Places the hero at the entrance and marks it explored.
    pub fn enter(graph: &mut RoomGraph) -> PillarsResult<Self> {
        let entrance = graph
            .entrance()
            .map(|room| room.id.clone())
            .ok_or_else(|| PillarsError::Structural("dungeon has no entrance".to_string()))?;
        Self::place_at(graph, &entrance)
    }

    /// Places the hero in room `id` and marks it explored.
    pub fn place_at(graph: &mut RoomGraph, id: &str) -> PillarsResult<Self> {
        let room = graph
            .get_room_mut(id)
            .ok_or_else(|| PillarsError::UnknownRoom(id.to_string()))?;
        room.explored = true;
        Ok(Self {
            current: room.id.clone(),
        })
    }

    /// Id of the room the hero stands in.
    pub fn current_room(&self) -> &str {
        &self.current
    }

    /// Moves the hero one room in `direction`.
    ///
    /// Fails without moving if the current room has no connection that way.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Direction, DungeonNavigator, RoomGraph, RoomKind};
    ///
    /// let mut graph = RoomGraph::new();
    /// graph.add_room_of_kind("a", RoomKind::Entrance).unwrap();
    /// graph.add_room("b").unwrap();
    /// graph.connect("a", Direction::North, "b").unwrap();
    ///
    /// let mut navigator = DungeonNavigator::enter(&mut graph).unwrap();
    /// navigator.move_hero(&mut graph, Direction::North).unwrap();
    /// assert_eq!(navigator.current_room(), "b");
    /// assert!(navigator.move_hero(&mut graph, Direction::East).is_err());
    /// ```
    pub fn move_hero(
        &mut self,
        graph: &mut RoomGraph,
        direction: Direction,
    ) -> PillarsResult<MoveOutcome> {
        let here = graph
            .get_room(&self.current)
            .ok_or_else(|| PillarsError::UnknownRoom(self.current.clone()))?;
        let target = here.neighbor(direction).cloned().ok_or_else(|| {
            PillarsError::InvalidAction(format!("there is no way {} from here", direction))
        })?;
        let room = graph
            .get_room_mut(&target)
            .ok_or_else(|| PillarsError::UnknownRoom(target.clone()))?;

        let first_visit = !room.explored;
        room.explored = true;
        let outcome = MoveOutcome {
            from: std::mem::replace(&mut self.current, target.clone()),
            to: target,
            direction,
            kind: room.kind,
            encounter: room.has_live_monsters(),
            first_visit,
        };
        debug!("Hero moved {} from {} to {}", direction, outcome.from, outcome.to);
        Ok(outcome)
    }

    /// Map offsets for every room reachable from the entrance.
    ///
    /// Walks the graph depth first from the entrance at the origin, stepping by
    /// each direction's delta. The first path to reach a room fixes its
    /// coordinate. Rooms the entrance cannot reach are left out.
    pub fn assign_coordinates(graph: &RoomGraph) -> BTreeMap<RoomId, Position> {
        let mut coordinates = BTreeMap::new();
        let Some(entrance) = graph.entrance() else {
            return coordinates;
        };

        // Neighbours go on the stack in reverse so they pop in north, south, east, west order.
        let mut stack: Vec<(&RoomId, Position)> = vec![(&entrance.id, Position::origin())];
        while let Some((id, position)) = stack.pop() {
            if coordinates.contains_key(id) {
                continue;
            }
            let Some(room) = graph.get_room(id) else {
                continue;
            };
            coordinates.insert(id.clone(), position);
            let neighbors: Vec<_> = room.connections().collect();
            for (direction, neighbor_id) in neighbors.into_iter().rev() {
                if !coordinates.contains_key(neighbor_id) {
                    stack.push((neighbor_id, position + direction.to_delta()));
                }
            }
        }
        coordinates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Monster, MonsterKind};

    fn two_rooms() -> RoomGraph {
        let mut graph = RoomGraph::new();
        graph.add_room_of_kind("a", RoomKind::Entrance).unwrap();
        graph.add_room("b").unwrap();
        graph.connect("a", Direction::North, "b").unwrap();
        graph
    }

    #[test]
    fn test_enter_marks_entrance_explored() {
        let mut graph = two_rooms();
        let navigator = DungeonNavigator::enter(&mut graph).unwrap();
        assert_eq!(navigator.current_room(), "a");
        assert!(graph.get_room("a").unwrap().explored);
        assert!(!graph.get_room("b").unwrap().explored);
    }

    #[test]
    fn test_enter_without_entrance_fails() {
        let mut graph = RoomGraph::new();
        graph.add_room("lonely").unwrap();
        assert!(matches!(
            DungeonNavigator::enter(&mut graph),
            Err(PillarsError::Structural(_))
        ));
    }

    #[test]
    fn test_move_reports_encounter_and_first_visit() {
        let mut graph = two_rooms();
        graph
            .get_room_mut("b")
            .unwrap()
            .add_monster(Monster::spawn(MonsterKind::Gremlin).unwrap());
        let mut navigator = DungeonNavigator::enter(&mut graph).unwrap();

        let outcome = navigator.move_hero(&mut graph, Direction::North).unwrap();
        assert_eq!(outcome.from, "a");
        assert_eq!(outcome.to, "b");
        assert!(outcome.encounter);
        assert!(outcome.first_visit);
        assert!(graph.get_room("b").unwrap().explored);

        let back = navigator.move_hero(&mut graph, Direction::South).unwrap();
        assert!(!back.first_visit);
        assert!(!back.encounter);
    }

    #[test]
    fn test_blocked_move_changes_nothing() {
        let mut graph = two_rooms();
        let mut navigator = DungeonNavigator::enter(&mut graph).unwrap();
        let err = navigator
            .move_hero(&mut graph, Direction::West)
            .unwrap_err();
        assert!(err.is_invalid_action());
        assert_eq!(navigator.current_room(), "a");
    }

    #[test]
    fn test_coordinates_follow_direction_deltas() {
        let mut graph = two_rooms();
        graph.add_room("c").unwrap();
        graph.add_room("island").unwrap();
        graph.connect("b", Direction::East, "c").unwrap();

        let coordinates = DungeonNavigator::assign_coordinates(&graph);
        assert_eq!(coordinates["a"], Position::new(0, 0));
        assert_eq!(coordinates["b"], Position::new(0, -1));
        assert_eq!(coordinates["c"], Position::new(1, -1));
        assert!(!coordinates.contains_key("island"));
    }

    #[test]
    fn test_coordinates_first_path_wins_on_loops() {
        // a -N-> b -E-> c, and a -E-> d -N-> c closes a square
        let mut graph = two_rooms();
        graph.add_room("c").unwrap();
        graph.add_room("d").unwrap();
        graph.connect("b", Direction::East, "c").unwrap();
        graph.connect("a", Direction::East, "d").unwrap();
        graph.connect("d", Direction::North, "c").unwrap();

        let coordinates = DungeonNavigator::assign_coordinates(&graph);
        assert_eq!(coordinates.len(), 4);
        assert_eq!(coordinates["c"], Position::new(1, -1));
        assert_eq!(coordinates["d"], Position::new(1, 0));
    }

    #[test]
    fn test_coordinates_on_a_very_long_corridor() {
        const LENGTH: usize = 60_000;
        let mut graph = RoomGraph::new();
        graph.add_room_of_kind("c0", RoomKind::Entrance).unwrap();
        for step in 1..LENGTH {
            let id = format!("c{}", step);
            graph.add_room(&id).unwrap();
            graph
                .connect(&format!("c{}", step - 1), Direction::East, &id)
                .unwrap();
        }

        let coordinates = DungeonNavigator::assign_coordinates(&graph);
        assert_eq!(coordinates.len(), LENGTH);
        assert_eq!(
            coordinates[&format!("c{}", LENGTH - 1)],
            Position::new(LENGTH as i32 - 1, 0)
        );
    }

    #[test]
    fn test_place_at_unknown_room_fails() {
        let mut graph = two_rooms();
        assert!(matches!(
            DungeonNavigator::place_at(&mut graph, "z"),
            Err(PillarsError::UnknownRoom(_))
        ));
    }
}
