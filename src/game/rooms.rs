//! # Room Graph
//!
//! The dungeon as an arena of rooms keyed by id.
//!
//! Rooms never hold references to each other. Each connection stores the id of the
//! neighbouring room, and the graph keeps every connection symmetric: linking A north
//! to B also links B south to A.

use crate::{Direction, EntityId, Item, Monster, PillarsError, PillarsResult};
use log::debug;
use pathfinding::prelude::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Identifier of a room; unique within a graph.
pub type RoomId = String;

/// Special role a room plays in the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Normal,
    Entrance,
    Exit,
    /// Hurts whoever walks in
    Pit,
}

/// A single room and everything in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub kind: RoomKind,
    connections: BTreeMap<Direction, RoomId>,
    pub items: Vec<Item>,
    pub monsters: Vec<Monster>,
    pub explored: bool,
}

impl Room {
    /// Creates an empty, unexplored room.
    pub fn new(id: impl Into<RoomId>, kind: RoomKind) -> Self {
        Self {
            id: id.into(),
            kind,
            connections: BTreeMap::new(),
            items: Vec::new(),
            monsters: Vec::new(),
            explored: false,
        }
    }

    /// Id of the room reached by going `direction`, if any.
    pub fn neighbor(&self, direction: Direction) -> Option<&RoomId> {
        self.connections.get(&direction)
    }

    /// All connections in north, south, east, west order.
    pub fn connections(&self) -> impl Iterator<Item = (Direction, &RoomId)> {
        self.connections.iter().map(|(dir, id)| (*dir, id))
    }

    /// Directions with a connection, in north, south, east, west order.
    pub fn open_directions(&self) -> Vec<Direction> {
        self.connections.keys().copied().collect()
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Removes every item from the room.
    pub fn take_items(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.items)
    }

    pub fn add_monster(&mut self, monster: Monster) {
        self.monsters.push(monster);
    }

    /// Monsters still standing, in encounter order.
    pub fn live_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|monster| monster.is_alive())
    }

    pub fn has_live_monsters(&self) -> bool {
        self.live_monsters().next().is_some()
    }

    pub fn monster(&self, id: EntityId) -> Option<&Monster> {
        self.monsters.iter().find(|monster| monster.id() == id)
    }

    pub fn monster_mut(&mut self, id: EntityId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|monster| monster.id() == id)
    }

    /// Takes a monster out of the room.
    pub fn remove_monster(&mut self, id: EntityId) -> Option<Monster> {
        let index = self.monsters.iter().position(|monster| monster.id() == id)?;
        Some(self.monsters.remove(index))
    }
}

/// Owner of every room in the dungeon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomGraph {
    rooms: BTreeMap<RoomId, Room>,
}

impl RoomGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a normal room.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::RoomGraph;
    ///
    /// let mut graph = RoomGraph::new();
    /// graph.add_room("hall").unwrap();
    /// assert!(graph.add_room("hall").is_err());
    /// ```
    pub fn add_room(&mut self, id: impl Into<RoomId>) -> PillarsResult<&mut Room> {
        self.add_room_of_kind(id, RoomKind::Normal)
    }

    /// Adds a room with an explicit kind.
    pub fn add_room_of_kind(
        &mut self,
        id: impl Into<RoomId>,
        kind: RoomKind,
    ) -> PillarsResult<&mut Room> {
        let id = id.into();
        if self.rooms.contains_key(&id) {
            return Err(PillarsError::DuplicateRoom(id));
        }
        debug!("Adding {:?} room {}", kind, id);
        Ok(self
            .rooms
            .entry(id.clone())
            .or_insert_with(|| Room::new(id, kind)))
    }

    /// Links `from` to `to` in `direction`, and `to` back to `from` the opposite way.
    ///
    /// Any connection either room previously had on those sides is replaced; the
    /// rooms it pointed at lose their back-link so no one-sided edge survives.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{Direction, RoomGraph};
    ///
    /// let mut graph = RoomGraph::new();
    /// graph.add_room("a").unwrap();
    /// graph.add_room("b").unwrap();
    /// graph.connect("a", Direction::North, "b").unwrap();
    /// assert_eq!(graph.get_room("b").unwrap().neighbor(Direction::South).unwrap(), "a");
    /// ```
    pub fn connect(&mut self, from: &str, direction: Direction, to: &str) -> PillarsResult<()> {
        for id in [from, to] {
            if !self.rooms.contains_key(id) {
                return Err(PillarsError::UnknownRoom(id.to_string()));
            }
        }
        if from == to {
            return Err(PillarsError::Structural(format!(
                "room {} cannot connect to itself",
                from
            )));
        }

        self.unlink(from, direction);
        self.unlink(to, direction.opposite());

        if let Some(room) = self.rooms.get_mut(from) {
            room.connections.insert(direction, to.to_string());
        }
        if let Some(room) = self.rooms.get_mut(to) {
            room.connections.insert(direction.opposite(), from.to_string());
        }
        Ok(())
    }

    /// Drops `id`'s connection in `direction` together with its back-link.
    fn unlink(&mut self, id: &str, direction: Direction) {
        let old = self
            .rooms
            .get_mut(id)
            .and_then(|room| room.connections.remove(&direction));
        if let Some(old) = old {
            if let Some(neighbor) = self.rooms.get_mut(&old) {
                neighbor.connections.remove(&direction.opposite());
            }
        }
    }

    /// Looks a room up. Absence is not an error.
    pub fn get_room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn get_room_mut(&mut self, id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rooms.contains_key(id)
    }

    /// Directions out of `id` that lead somewhere. Empty for unknown rooms.
    pub fn open_directions(&self, id: &str) -> Vec<Direction> {
        self.rooms
            .get(id)
            .map(Room::open_directions)
            .unwrap_or_default()
    }

    /// Rooms in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.values_mut()
    }

    /// Room ids in sorted order.
    pub fn room_ids(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.keys()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// The first room marked as the entrance.
    pub fn entrance(&self) -> Option<&Room> {
        self.rooms().find(|room| room.kind == RoomKind::Entrance)
    }

    /// The first room marked as the exit.
    pub fn exit(&self) -> Option<&Room> {
        self.rooms().find(|room| room.kind == RoomKind::Exit)
    }

    /// Rooms reachable from `start`, including `start` itself.
    pub fn reachable_from(&self, start: &str) -> HashSet<RoomId> {
        if !self.contains(start) {
            return HashSet::new();
        }
        bfs_reach(start.to_string(), |id: &RoomId| {
            self.rooms
                .get(id)
                .map(|room| room.connections.values().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        })
        .collect()
    }

    /// Rooms the entrance cannot reach, in id order. Everything, if there is no
    /// entrance.
    pub fn unreachable_rooms(&self) -> Vec<RoomId> {
        let reachable = self
            .entrance()
            .map(|entrance| self.reachable_from(&entrance.id))
            .unwrap_or_default();
        self.room_ids()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect()
    }

    /// Checks the structural invariants: one entrance, symmetric connections to
    /// existing rooms, everything reachable from the entrance.
    pub fn validate(&self) -> PillarsResult<()> {
        let entrances = self
            .rooms()
            .filter(|room| room.kind == RoomKind::Entrance)
            .count();
        if entrances != 1 {
            return Err(PillarsError::Structural(format!(
                "expected exactly one entrance, found {}",
                entrances
            )));
        }

        for room in self.rooms() {
            for (direction, neighbor_id) in room.connections() {
                let neighbor = self
                    .rooms
                    .get(neighbor_id)
                    .ok_or_else(|| PillarsError::UnknownRoom(neighbor_id.clone()))?;
                if neighbor.neighbor(direction.opposite()) != Some(&room.id) {
                    return Err(PillarsError::Structural(format!(
                        "{} leads {} to {}, but {} does not lead back",
                        room.id, direction, neighbor_id, neighbor_id
                    )));
                }
            }
        }

        let unreachable = self.unreachable_rooms();
        if !unreachable.is_empty() {
            return Err(PillarsError::Structural(format!(
                "rooms unreachable from the entrance: {}",
                unreachable.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MonsterKind, Potion};

    fn line_graph() -> RoomGraph {
        let mut graph = RoomGraph::new();
        graph.add_room_of_kind("a", RoomKind::Entrance).unwrap();
        graph.add_room("b").unwrap();
        graph.add_room_of_kind("c", RoomKind::Exit).unwrap();
        graph.connect("a", Direction::East, "b").unwrap();
        graph.connect("b", Direction::East, "c").unwrap();
        graph
    }

    #[test]
    fn test_add_room_rejects_duplicates() {
        let mut graph = RoomGraph::new();
        graph.add_room("x").unwrap();
        let err = graph.add_room_of_kind("x", RoomKind::Pit).unwrap_err();
        assert!(matches!(err, PillarsError::DuplicateRoom(id) if id == "x"));
        assert_eq!(graph.get_room("x").unwrap().kind, RoomKind::Normal);
    }

    #[test]
    fn test_connect_is_symmetric() {
        let graph = line_graph();
        let b = graph.get_room("b").unwrap();
        assert_eq!(b.neighbor(Direction::West).unwrap(), "a");
        assert_eq!(b.neighbor(Direction::East).unwrap(), "c");
        assert_eq!(graph.open_directions("b"), vec![Direction::East, Direction::West]);
        assert_eq!(graph.open_directions("a"), vec![Direction::East]);
        assert!(graph.open_directions("missing").is_empty());
    }

    #[test]
    fn test_connect_unknown_room_fails_without_change() {
        let mut graph = line_graph();
        let err = graph.connect("a", Direction::North, "nowhere").unwrap_err();
        assert!(matches!(err, PillarsError::UnknownRoom(id) if id == "nowhere"));
        assert!(graph.get_room("a").unwrap().neighbor(Direction::North).is_none());
        assert!(graph.connect("a", Direction::North, "a").is_err());
    }

    #[test]
    fn test_reconnect_drops_stale_back_link() {
        let mut graph = line_graph();
        graph.add_room("d").unwrap();
        graph.connect("a", Direction::East, "d").unwrap();
        assert!(graph.get_room("b").unwrap().neighbor(Direction::West).is_none());
        assert_eq!(graph.get_room("d").unwrap().neighbor(Direction::West).unwrap(), "a");
        // b and c now only link to each other
        assert_eq!(graph.unreachable_rooms(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_lookups_never_fail() {
        let graph = line_graph();
        assert!(graph.get_room("zzz").is_none());
        assert_eq!(graph.entrance().unwrap().id, "a");
        assert_eq!(graph.exit().unwrap().id, "c");
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_validate_flags_unreachable_and_entrances() {
        let mut graph = line_graph();
        assert!(graph.validate().is_ok());

        graph.add_room("island").unwrap();
        assert_eq!(graph.unreachable_rooms(), vec!["island".to_string()]);
        assert!(matches!(graph.validate(), Err(PillarsError::Structural(_))));

        let mut no_entrance = RoomGraph::new();
        no_entrance.add_room("lonely").unwrap();
        assert!(no_entrance.validate().is_err());
    }

    #[test]
    fn test_room_contents() {
        let mut room = Room::new("r", RoomKind::Normal);
        let monster = Monster::spawn(MonsterKind::Gremlin).unwrap();
        let id = monster.id();
        room.add_monster(monster);
        room.add_item(Item::Potion(Potion::healing()));

        assert!(room.has_live_monsters());
        assert!(room.monster(id).is_some());
        assert_eq!(room.take_items().len(), 1);
        assert!(room.items.is_empty());
        assert!(room.remove_monster(id).is_some());
        assert!(!room.has_live_monsters());
    }
}
