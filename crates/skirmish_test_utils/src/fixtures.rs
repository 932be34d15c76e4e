//! Test fixtures and helpers.
//!
//! Pre-built sessions, maps and decision logic for consistent testing.

use fixed::types::I32F32;
use skirmish_core::prelude::*;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a position from integer coordinates.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_num(x, y)
}

/// A registry plus the logic driving it.
pub struct Session {
    /// The world.
    pub registry: EntityRegistry,
    /// Both teams' decision logic.
    pub controllers: TeamControllers,
    /// Last tick run.
    pub tick: u64,
}

impl Session {
    /// Wrap an existing registry.
    #[must_use]
    pub fn new(registry: EntityRegistry, controllers: TeamControllers) -> Self {
        Self {
            registry,
            controllers,
            tick: 0,
        }
    }

    /// Run the next tick.
    ///
    /// # Errors
    ///
    /// Propagates decision faults from the registry.
    pub fn step(&mut self) -> Result<TickReport> {
        self.tick += 1;
        self.registry.update(self.tick, &mut self.controllers)
    }

    /// Run `ticks` ticks, stopping at the first fault.
    ///
    /// # Errors
    ///
    /// Propagates decision faults from the registry.
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// State hash of the registry.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.registry.state_hash()
    }
}

/// Scripted all-out attack used by scenario tests.
///
/// Bases build fighters whenever affordable, harvesters hold still and
/// fighters charge the nearest enemy unit at full speed, firing once it is
/// in range. There is no economy, so a match settles on combat alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggressor;

impl DecisionLogic for Aggressor {
    fn decide(&mut self, _: u64, unit: &Unit, world: &WorldView<'_>) -> std::result::Result<Action, DecisionError> {
        let action = match unit.class() {
            UnitClass::Base => Action::default().with_task(Task::Build(UnitClass::Fighter)),
            UnitClass::Harvester => Action::default(),
            UnitClass::Fighter => {
                let enemy = world.nearest(unit.position(), |e| {
                    e.as_unit().is_some_and(|u| u.team() != unit.team())
                });
                match enemy {
                    Some(enemy) => Action::default()
                        .toward_entity(enemy.id())
                        .at_speed(unit.motion().nominal_speed())
                        .with_task(Task::Fire(enemy.id())),
                    None => Action::default(),
                }
            }
        };
        Ok(action)
    }
}

/// Controllers with [`Aggressor`] on both sides.
#[must_use]
pub fn aggressors() -> TeamControllers {
    TeamControllers::new(Box::new(Aggressor), Box::new(Aggressor))
}

/// A symmetric two-base arena in map coordinates.
#[must_use]
pub fn arena_map() -> MapFile {
    let item = |kind: &str, x: f64, y: f64, team: Option<&str>| MapItem {
        kind: Some(kind.to_string()),
        x: Some(x),
        y: Some(y),
        team: team.map(str::to_string),
    };
    MapFile {
        items: vec![
            item("MINERAL", 0.0, 60.0, None),
            item("MINERAL", 0.0, -60.0, None),
            item("BASE", -150.0, 0.0, Some("BLUE")),
            item("MININGSHIP", -130.0, 10.0, Some("BLUE")),
            item("FIGHTER", -130.0, -10.0, Some("BLUE")),
            item("BASE", 150.0, 0.0, Some("RED")),
            item("MININGSHIP", 130.0, 10.0, Some("RED")),
            item("FIGHTER", 130.0, -10.0, Some("RED")),
        ],
    }
}

/// The arena loaded with a seeded offset and driven by [`Aggressor`]s.
///
/// # Panics
///
/// Panics if the built-in map fails to load.
#[must_use]
pub fn arena_session(seed: u64) -> Session {
    let mut registry = EntityRegistry::with_seed(seed, Rules::default());
    registry
        .load_map(&arena_map())
        .expect("built-in arena map is valid");
    Session::new(registry, aggressors())
}

/// Two fighters facing each other across `gap` units, both idle.
#[must_use]
pub fn duel(gap: i32) -> EntityRegistry {
    let mut registry = EntityRegistry::default();
    registry.create_fighter(pos(0, 0), Team::Blue);
    registry.create_fighter(pos(gap, 0), Team::Red);
    registry
}
