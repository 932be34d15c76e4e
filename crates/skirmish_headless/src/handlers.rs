//! Built-in decision logic selectable from the command line.
//!
//! - `idle`: no unit ever acts.
//! - `example`: a simple complete player. Bases refuel nearby friends and
//!   build while affordable, harvesters shuttle minerals from the nearest
//!   node to the nearest friendly base, fighters hunt the nearest enemy.
//! - `faulty`: fails every decision, so the team forfeits on its first turn.

use clap::ValueEnum;
use skirmish_core::prelude::*;

/// Decision logic names accepted by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum HandlerKind {
    /// Never acts.
    Idle,
    /// [`ExampleLogic`].
    Example,
    /// [`FaultyLogic`].
    Faulty,
}

impl HandlerKind {
    /// Name as given on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Example => "example",
            Self::Faulty => "faulty",
        }
    }

    /// Instantiate the logic.
    #[must_use]
    pub fn build(self) -> Box<dyn DecisionLogic> {
        match self {
            Self::Idle => Box::new(Idle),
            Self::Example => Box::new(ExampleLogic::default()),
            Self::Faulty => Box::new(FaultyLogic),
        }
    }
}

/// Controllers for a blue and a red handler.
#[must_use]
pub fn controllers(blue: HandlerKind, red: HandlerKind) -> TeamControllers {
    TeamControllers::new(blue.build(), red.build())
}

/// Reference player used for demos and smoke tests.
#[derive(Debug, Clone, Default)]
pub struct ExampleLogic {
    builds: u64,
}

impl ExampleLogic {
    fn base(&mut self, unit: &Unit, world: &WorldView<'_>) -> Action {
        let rules = world.rules();
        let here = unit.position();
        let range = Fixed::from_num(rules.interaction_range);

        let thirsty = world.nearest(here, |e| {
            e.as_unit().is_some_and(|u| {
                u.team() == unit.team()
                    && u.class() != UnitClass::Base
                    && u.motion().fuel() < u.motion().fuel_capacity()
            })
        });
        if let Some(Entity::Unit(friend)) = thirsty {
            if here.distance(friend.position()) <= range {
                let missing = friend.motion().fuel_capacity() - friend.motion().fuel();
                return Action::default().with_task(Task::Refuel {
                    target: friend.id(),
                    amount: missing,
                });
            }
        }

        // Two fighters for every harvester.
        let class = if self.builds % 3 == 0 {
            UnitClass::Harvester
        } else {
            UnitClass::Fighter
        };
        match (rules.price(class), unit.minerals()) {
            (Some(price), Some(stock)) if stock >= price => {
                self.builds += 1;
                Action::default().with_task(Task::Build(class))
            }
            _ => Action::default(),
        }
    }

    fn harvester(unit: &Unit, world: &WorldView<'_>) -> Action {
        let rules = world.rules();
        let here = unit.position();
        let full = unit.cargo().unwrap_or(0) >= rules.cargo_capacity;

        let goal = if full {
            world.nearest(here, |e| {
                e.class() == Some(UnitClass::Base) && e.team() == Some(unit.team())
            })
        } else {
            world.nearest(here, |e| {
                e.as_resource_node().is_some_and(|node| !node.is_depleted())
            })
        };
        let Some(goal) = goal else {
            return Action::default();
        };

        let task = if full {
            Task::Unload(goal.id())
        } else {
            Task::Extract(goal.id())
        };
        Action::default()
            .toward_entity(goal.id())
            .at_speed(here.distance(goal.position()))
            .with_task(task)
    }

    fn fighter(unit: &Unit, world: &WorldView<'_>) -> Action {
        let rules = world.rules();
        let here = unit.position();
        let enemy = world.nearest(here, |e| {
            e.as_unit().is_some_and(|u| u.team() != unit.team())
        });
        let Some(enemy) = enemy else {
            return Action::default();
        };

        let distance = here.distance(enemy.position());
        let fire_range = Fixed::from_num(rules.fire_range);
        let standoff = fire_range / Fixed::from_num(2);
        let mut action = Action::default().toward_entity(enemy.id());
        if distance > standoff {
            action = action.at_speed(distance - standoff);
        }
        if distance <= fire_range && unit.missiles().unwrap_or(0) > 0 {
            action = action.with_task(Task::Fire(enemy.id()));
        }
        action
    }
}

impl DecisionLogic for ExampleLogic {
    fn decide(
        &mut self,
        _tick: u64,
        unit: &Unit,
        world: &WorldView<'_>,
    ) -> std::result::Result<Action, DecisionError> {
        Ok(match unit.class() {
            UnitClass::Base => self.base(unit, world),
            UnitClass::Harvester => Self::harvester(unit, world),
            UnitClass::Fighter => Self::fighter(unit, world),
        })
    }
}

/// Logic that fails every decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyLogic;

impl DecisionLogic for FaultyLogic {
    fn decide(
        &mut self,
        _tick: u64,
        unit: &Unit,
        _world: &WorldView<'_>,
    ) -> std::result::Result<Action, DecisionError> {
        Err(DecisionError::new(format!(
            "faulty handler refused to decide for unit {}",
            unit.id()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::from_num(x, y)
    }

    fn run(registry: &mut EntityRegistry, controllers: &mut TeamControllers, ticks: u64) {
        for tick in 0..ticks {
            registry.update(tick, controllers).unwrap();
        }
    }

    #[test]
    fn test_names_match_value_enum() {
        for kind in HandlerKind::value_variants() {
            assert_eq!(HandlerKind::from_str(kind.name(), false), Ok(*kind));
        }
    }

    #[test]
    fn test_example_base_builds_until_broke() {
        let mut registry = EntityRegistry::default();
        let base = registry.create_base(p(0, 0), Team::Blue);
        let mut controllers = controllers(HandlerKind::Example, HandlerKind::Idle);

        // 200 minerals: harvester (50), fighter (60), fighter (60), then 30 left.
        run(&mut registry, &mut controllers, 5);
        let blue = registry.statistics().team(Team::Blue);
        assert_eq!(blue.created(UnitClass::Harvester), 1);
        assert_eq!(blue.created(UnitClass::Fighter), 2);
        let stock = registry.get(base).and_then(Entity::as_unit).and_then(Unit::minerals);
        assert_eq!(stock, Some(30));
    }

    #[test]
    fn test_example_harvester_delivers() {
        let mut rules = Rules::default();
        rules.base_start_minerals = 0;
        let mut registry = EntityRegistry::new(WorldOffset::NONE, rules);
        let base = registry.create_base(p(0, 0), Team::Blue);
        registry.create_resource_node(p(40, 0));
        registry.create_harvester(p(0, 0), Team::Blue);
        let mut controllers = controllers(HandlerKind::Example, HandlerKind::Idle);

        // One round trip: twenty ticks out, ten loading, twenty back.
        run(&mut registry, &mut controllers, 80);
        let blue = registry.statistics().team(Team::Blue);
        assert!(blue.minerals_extracted >= 50);
        // The first delivery paid for a second harvester.
        assert_eq!(blue.created(UnitClass::Harvester), 2);
        assert!(registry.exists(base));
    }

    #[test]
    fn test_example_fighter_fires_in_range() {
        let mut registry = EntityRegistry::default();
        let blue = registry.create_fighter(p(0, 0), Team::Blue);
        registry.create_fighter(p(90, 0), Team::Red);
        let mut controllers = controllers(HandlerKind::Example, HandlerKind::Idle);

        run(&mut registry, &mut controllers, 1);
        let fighter = registry.get(blue).and_then(Entity::as_unit).unwrap();
        assert_eq!(fighter.missiles(), Some(9));
        // Closed in toward the standoff distance.
        assert_eq!(fighter.position(), p(4, 0));
        assert_eq!(registry.statistics().team(Team::Blue).missiles_launched, 1);
    }

    #[test]
    fn test_faulty_logic_faults() {
        let mut registry = EntityRegistry::default();
        let id = registry.create_fighter(p(0, 0), Team::Red);
        let mut controllers = controllers(HandlerKind::Idle, HandlerKind::Faulty);

        match registry.update(0, &mut controllers) {
            Err(GameError::DecisionFault { team, entity, .. }) => {
                assert_eq!(team, Team::Red);
                assert_eq!(entity, id);
            }
            other => panic!("expected a fault, got {other:?}"),
        }
    }
}
