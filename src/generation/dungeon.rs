//! # Dungeon Generation
//!
//! Builds a populated [`RoomGraph`] on a rectangular grid.
//!
//! The generator:
//! 1. Creates one room per grid cell, named `r{x}_{y}`
//! 2. Carves a spanning tree with a randomized depth-first walk from the entrance
//! 3. Opens a few extra doors between neighbours to add loops
//! 4. Marks the room farthest from the entrance as the exit
//! 5. Hides the four pillars, then scatters pits, potions, weapons, and monsters
//!
//! The entrance and exit never hold monsters or pits.

use crate::generation::utils::{cell_id, in_bounds};
use crate::{
    Dice, Direction, EncounterGenerator, GenerationConfig, Generator, Item, ItemGenerator,
    Pillar, PillarsError, PillarsResult, Position, RoomGraph, RoomId, RoomKind,
};
use log::{debug, info};
use pathfinding::prelude::dijkstra_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Grid maze generator producing a complete dungeon.
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonGenerator {
    encounters: EncounterGenerator,
    items: ItemGenerator,
}

impl DungeonGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use pillars::{DungeonGenerator, GenerationConfig, Generator};
    /// use pillars::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::for_testing(9);
    /// let graph = DungeonGenerator::new().generate(&config, &mut create_rng(&config)).unwrap();
    /// assert_eq!(graph.len(), 9);
    /// assert!(graph.exit().is_some());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    fn carve_rooms(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> PillarsResult<(RoomGraph, Position)> {
        let mut graph = RoomGraph::new();
        for y in 0..config.height as i32 {
            for x in 0..config.width as i32 {
                graph.add_room(cell_id(Position::new(x, y)))?;
            }
        }

        let start = Position::new(
            rng.gen_range(0..config.width as i32),
            rng.gen_range(0..config.height as i32),
        );
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(&cell) = stack.last() {
            let options: Vec<(Direction, Position)> = Direction::ALL
                .iter()
                .map(|&direction| (direction, cell + direction.to_delta()))
                .filter(|(_, next)| in_bounds(*next, config) && !visited.contains(next))
                .collect();
            match options.choose(rng) {
                Some(&(direction, next)) => {
                    graph.connect(&cell_id(cell), direction, &cell_id(next))?;
                    visited.insert(next);
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok((graph, start))
    }

    fn add_loops(
        &self,
        graph: &mut RoomGraph,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> PillarsResult<()> {
        let mut added = 0;
        for y in 0..config.height as i32 {
            for x in 0..config.width as i32 {
                let cell = Position::new(x, y);
                for direction in [Direction::East, Direction::South] {
                    let next = cell + direction.to_delta();
                    let id = cell_id(cell);
                    let already_open = graph
                        .get_room(&id)
                        .is_some_and(|room| room.neighbor(direction).is_some());
                    if in_bounds(next, config)
                        && !already_open
                        && rng.chance(config.extra_connection_chance)
                    {
                        graph.connect(&id, direction, &cell_id(next))?;
                        added += 1;
                    }
                }
            }
        }
        debug!("Opened {} extra doors", added);
        Ok(())
    }

    /// The room with the longest shortest path from `entrance`; ties go to the
    /// smallest id.
    fn farthest_room(&self, graph: &RoomGraph, entrance: &str) -> PillarsResult<RoomId> {
        let distances = dijkstra_all(&entrance.to_string(), |id: &RoomId| {
            graph
                .get_room(id)
                .map(|room| {
                    room.connections()
                        .map(|(_, next)| (next.clone(), 1u32))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        });
        distances
            .into_iter()
            .max_by_key(|(id, (_, cost))| (*cost, Reverse(id.clone())))
            .map(|(id, _)| id)
            .ok_or_else(|| {
                PillarsError::GenerationFailed("entrance has no neighbours".to_string())
            })
    }

    fn set_kind(graph: &mut RoomGraph, id: &str, kind: RoomKind) -> PillarsResult<()> {
        graph
            .get_room_mut(id)
            .ok_or_else(|| PillarsError::UnknownRoom(id.to_string()))?
            .kind = kind;
        Ok(())
    }

    fn populate(
        &self,
        graph: &mut RoomGraph,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> PillarsResult<()> {
        let mut candidates: Vec<RoomId> = graph
            .rooms()
            .filter(|room| room.kind == RoomKind::Normal)
            .map(|room| room.id.clone())
            .collect();
        if candidates.len() < Pillar::ALL.len() {
            return Err(PillarsError::GenerationFailed(format!(
                "{} free rooms cannot hide {} pillars",
                candidates.len(),
                Pillar::ALL.len()
            )));
        }
        candidates.shuffle(rng);

        for (pillar, id) in Pillar::ALL.iter().zip(&candidates) {
            if let Some(room) = graph.get_room_mut(id) {
                room.add_item(Item::Pillar(*pillar));
            }
            debug!("{} hidden in {}", pillar.name(), id);
        }

        for (index, id) in candidates.iter().enumerate() {
            let Some(room) = graph.get_room_mut(id) else {
                continue;
            };
            if index >= Pillar::ALL.len() && rng.chance(config.pit_chance) {
                room.kind = RoomKind::Pit;
            }
            if let Some(potion) = self.items.roll_potion(config.potion_chance, rng) {
                room.add_item(potion);
            }
            if rng.chance(config.monster_chance) {
                for monster in self.encounters.generate(config, rng)? {
                    room.add_monster(monster);
                }
            }
        }

        for weapon in self.items.generate(config, rng)? {
            if let Some(id) = candidates.choose(rng) {
                if let Some(room) = graph.get_room_mut(id) {
                    room.add_item(weapon);
                }
            }
        }
        Ok(())
    }
}

impl Generator<RoomGraph> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> PillarsResult<RoomGraph> {
        config.validate()?;
        let (mut graph, start) = self.carve_rooms(config, rng)?;
        self.add_loops(&mut graph, config, rng)?;

        let entrance = cell_id(start);
        Self::set_kind(&mut graph, &entrance, RoomKind::Entrance)?;
        let exit = self.farthest_room(&graph, &entrance)?;
        Self::set_kind(&mut graph, &exit, RoomKind::Exit)?;

        self.populate(&mut graph, config, rng)?;
        self.validate(&graph, config)?;
        info!(
            "Generated {}x{} dungeon (seed {}): entrance {}, exit {}",
            config.width, config.height, config.seed, entrance, exit
        );
        Ok(graph)
    }

    fn validate(&self, graph: &RoomGraph, config: &GenerationConfig) -> PillarsResult<()> {
        graph.validate()?;
        if graph.len() != config.room_count() as usize {
            return Err(PillarsError::GenerationFailed(format!(
                "expected {} rooms, built {}",
                config.room_count(),
                graph.len()
            )));
        }
        let exit = graph
            .exit()
            .ok_or_else(|| PillarsError::GenerationFailed("dungeon has no exit".to_string()))?;
        for room in [graph.entrance(), Some(exit)].into_iter().flatten() {
            if !room.monsters.is_empty() || room.kind == RoomKind::Pit {
                return Err(PillarsError::GenerationFailed(format!(
                    "{} must stay safe",
                    room.id
                )));
            }
        }
        let pillars = graph
            .rooms()
            .flat_map(|room| &room.items)
            .filter(|item| matches!(item, Item::Pillar(_)))
            .count();
        if pillars != Pillar::ALL.len() {
            return Err(PillarsError::GenerationFailed(format!(
                "dungeon holds {} pillars",
                pillars
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;
    use crate::DungeonNavigator;

    fn generate(config: &GenerationConfig) -> RoomGraph {
        DungeonGenerator::new()
            .generate(config, &mut create_rng(config))
            .unwrap()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = GenerationConfig::new(77);
        assert_eq!(generate(&config), generate(&config));
    }

    #[test]
    fn test_generated_dungeon_is_complete() {
        for seed in 0..10 {
            let config = GenerationConfig::new(seed);
            let graph = generate(&config);
            assert_eq!(graph.len(), 25);
            assert!(graph.unreachable_rooms().is_empty());
            let entrance = graph.entrance().unwrap();
            let exit = graph.exit().unwrap();
            assert_ne!(entrance.id, exit.id);
            assert!(entrance.monsters.is_empty());
            assert!(exit.monsters.is_empty());
        }
    }

    #[test]
    fn test_coordinates_match_grid_offsets() {
        let config = GenerationConfig::new(5);
        let graph = generate(&config);
        let coordinates = DungeonNavigator::assign_coordinates(&graph);
        assert_eq!(coordinates.len(), graph.len());

        let origin = coordinates
            .iter()
            .find(|(id, _)| graph.get_room(id).unwrap().kind == RoomKind::Entrance)
            .map(|(id, _)| id.clone())
            .unwrap();
        let parse = |id: &str| {
            let (x, y) = id.trim_start_matches('r').split_once('_').unwrap();
            Position::new(x.parse().unwrap(), y.parse().unwrap())
        };
        let base = parse(&origin);
        for (id, position) in &coordinates {
            assert_eq!(*position, parse(id) - base);
        }
    }

    #[test]
    fn test_full_loop_chance_still_validates() {
        let config = GenerationConfig {
            extra_connection_chance: 100,
            monster_chance: 100,
            pit_chance: 100,
            ..GenerationConfig::for_testing(4)
        };
        let graph = generate(&config);
        // every interior edge of a 3x3 grid is open
        let doors: usize = graph.rooms().map(|room| room.open_directions().len()).sum();
        assert_eq!(doors, 24);
    }

    #[test]
    fn test_validate_rejects_missing_pillars() {
        let config = GenerationConfig::for_testing(2);
        let mut graph = generate(&config);
        for room in graph.rooms_mut() {
            room.items.retain(|item| !matches!(item, Item::Pillar(_)));
        }
        assert!(DungeonGenerator::new().validate(&graph, &config).is_err());
    }
}
