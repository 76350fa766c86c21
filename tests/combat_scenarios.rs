//! End-to-end encounter and movement scenarios.

use pillars::{
    CombatOutcome, CombatSession, CombatState, CombatStats, Direction, DungeonNavigator,
    EngineConfig, GameMode, GameSession, HealProfile, Hero, HeroArchetype, LoadedDice, Monster,
    PillarsResult, Room, RoomGraph, RoomKind,
};

fn scenario_hero() -> Hero {
    let stats = CombatStats {
        max_hp: 100,
        min_damage: 10,
        max_damage: 20,
        attack_speed: 5,
        hit_chance: 100,
    };
    Hero::with_stats("Tester", stats, 0, 20).unwrap()
}

fn scenario_monster() -> Monster {
    let stats = CombatStats {
        max_hp: 20,
        min_damage: 1,
        max_damage: 5,
        attack_speed: 1,
        hit_chance: 0,
    };
    let heal = HealProfile {
        chance: 0,
        min: 0,
        max: 0,
    };
    Monster::new("Gremlin", stats, heal, 40).unwrap()
}

#[test]
fn test_single_blow_wins_and_awards_xp_once() -> PillarsResult<()> {
    let mut room = Room::new("cellar", RoomKind::Normal);
    room.add_monster(scenario_monster());
    let target = room.monsters[0].id();
    let mut hero = scenario_hero();

    let mut session = CombatSession::begin(&room, &hero, &EngineConfig::default())?;
    assert_eq!(session.state(), CombatState::PlayerTurn);

    // hit roll 1, damage roll 20
    let mut dice = LoadedDice::new([1, 20]);
    session.attack(&mut hero, &mut room, target, &mut dice)?;

    assert_eq!(session.state(), CombatState::Summary);
    assert_eq!(session.outcome(), CombatOutcome::Victory);
    assert!(room.monsters.is_empty());
    assert_eq!(hero.xp(), 40);
    assert_eq!(session.summary().xp_gained, 40);

    // a finished fight refuses further swings and pays nothing more
    let again = session.attack(&mut hero, &mut room, target, &mut LoadedDice::always(1));
    assert!(again.unwrap_err().is_invalid_action());
    assert_eq!(hero.xp(), 40);
    Ok(())
}

#[test]
fn test_navigation_between_two_rooms() -> PillarsResult<()> {
    let mut graph = RoomGraph::new();
    graph.add_room_of_kind("A", RoomKind::Entrance)?;
    graph.add_room("B")?;
    graph.connect("A", Direction::North, "B")?;

    let mut navigator = DungeonNavigator::enter(&mut graph)?;
    assert_eq!(navigator.current_room(), "A");

    let moved = navigator.move_hero(&mut graph, Direction::North)?;
    assert_eq!(moved.to, "B");
    assert!(moved.first_visit);
    assert_eq!(navigator.current_room(), "B");
    assert!(graph.get_room("B").unwrap().explored);

    let err = navigator
        .move_hero(&mut graph, Direction::East)
        .unwrap_err();
    assert!(err.is_invalid_action());
    assert_eq!(navigator.current_room(), "B");
    Ok(())
}

#[test]
fn test_successful_flee_returns_to_exploring_unharmed() -> PillarsResult<()> {
    let mut graph = RoomGraph::new();
    graph.add_room_of_kind("hall", RoomKind::Entrance)?;
    graph.add_room("den")?.add_monster(scenario_monster());
    graph.connect("hall", Direction::East, "den")?;

    let mut session = GameSession::new(graph, EngineConfig::default())?;
    session.start_creation()?;
    session.create_hero("Ada", HeroArchetype::Warrior)?;
    session.move_hero(Direction::East, &mut LoadedDice::always(1))?;

    assert_eq!(session.mode(), GameMode::InCombat);
    assert_eq!(
        session.combat().map(CombatSession::state),
        Some(CombatState::PlayerTurn)
    );
    let hero_hp = session.hero().unwrap().character.hp();

    session.flee(&mut LoadedDice::always(1))?;

    assert_eq!(session.mode(), GameMode::Exploring);
    assert!(session.combat().is_none());
    assert_eq!(session.hero().unwrap().character.hp(), hero_hp);
    let den = session.current_room().unwrap();
    assert_eq!(den.monsters.len(), 1);
    assert_eq!(den.monsters[0].character.hp(), 20);
    Ok(())
}

#[test]
fn test_failed_flee_hands_turn_to_monster_then_back() -> PillarsResult<()> {
    let mut graph = RoomGraph::new();
    graph.add_room_of_kind("hall", RoomKind::Entrance)?;
    graph.add_room("den")?.add_monster(scenario_monster());
    graph.connect("hall", Direction::East, "den")?;

    let mut session = GameSession::new(graph, EngineConfig::default())?;
    session.start_creation()?;
    session.create_hero("Ada", HeroArchetype::Warrior)?;
    session.move_hero(Direction::East, &mut LoadedDice::always(1))?;

    // flee roll 100 fails; the monster's swing then misses on the same dice
    session.flee(&mut LoadedDice::always(100))?;

    assert_eq!(session.mode(), GameMode::InCombat);
    assert_eq!(
        session.combat().map(CombatSession::state),
        Some(CombatState::PlayerTurn)
    );
    assert_eq!(session.hero().unwrap().character.hp(), 125);
    Ok(())
}
