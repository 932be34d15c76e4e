//! Decision-logic seam.
//!
//! Each team supplies a [`DecisionLogic`] that the registry consults exactly
//! once per tick for every unit the team owns. The logic sees the unit and a
//! read-only [`WorldView`] and answers with an [`Action`]; the unit then
//! applies the physical consequences itself.
//!
//! Both teams go through the same interface and the same view. The view
//! never exposes the world offset, so logic cannot translate positions back
//! into map coordinates.

use crate::components::{EntityId, Team, UnitClass};
use crate::entity::Entity;
use crate::error::DecisionError;
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::EntityRegistry;
use crate::rules::Rules;
use crate::traits::Item;
use crate::unit::Unit;

/// Where a unit should turn this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    /// Turn toward a world position.
    Point(Vec2Fixed),
    /// Turn toward an entity's current position. Ignored if it does not resolve.
    Entity(EntityId),
}

/// A class-specific task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Base: build a unit of the given class.
    Build(UnitClass),
    /// Base: transfer fuel to a friendly unit in range.
    Refuel {
        /// Unit receiving the fuel.
        target: EntityId,
        /// Fuel offered. The receiver accepts up to its free capacity.
        amount: Fixed,
    },
    /// Harvester: extract minerals from a resource node in range.
    Extract(EntityId),
    /// Harvester: unload all cargo into a friendly base in range.
    Unload(EntityId),
    /// Fighter: launch a projectile at a living entity in range.
    Fire(EntityId),
}

/// A unit's decision for one tick.
///
/// Every part is optional; [`Action::default`] does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    /// Heading change.
    pub steer: Option<Steer>,
    /// Requested travel distance, capped by nominal speed and fuel.
    pub speed: Option<Fixed>,
    /// Task to perform after moving.
    pub task: Option<Task>,
}

impl Action {
    /// Turn toward a point.
    #[must_use]
    pub const fn toward(mut self, point: Vec2Fixed) -> Self {
        self.steer = Some(Steer::Point(point));
        self
    }

    /// Turn toward an entity.
    #[must_use]
    pub const fn toward_entity(mut self, id: EntityId) -> Self {
        self.steer = Some(Steer::Entity(id));
        self
    }

    /// Request a travel distance.
    #[must_use]
    pub const fn at_speed(mut self, speed: Fixed) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Perform a task.
    #[must_use]
    pub const fn with_task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }
}

/// Read-only observation of the world handed to decision logic.
///
/// The unit being decided for is still registered while its logic runs, so
/// it appears in [`iter`](Self::iter) and resolves through [`get`](Self::get).
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> WorldView<'a> {
    pub(crate) const fn new(registry: &'a EntityRegistry) -> Self {
        Self { registry }
    }

    /// Tick being processed.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.registry.tick()
    }

    /// Gameplay tuning in force.
    #[must_use]
    pub fn rules(&self) -> &'a Rules {
        self.registry.rules()
    }

    /// Look up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.registry.get(id)
    }

    /// Whether `id` resolves.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.registry.exists(id)
    }

    /// All registered entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.registry.iter()
    }

    /// Closest entity to `from` satisfying `filter`, ties broken by lowest id.
    #[must_use]
    pub fn nearest<F>(&self, from: Vec2Fixed, mut filter: F) -> Option<&'a Entity>
    where
        F: FnMut(&Entity) -> bool,
    {
        self.iter()
            .filter(|entity| !entity.is_pending_removal() && filter(*entity))
            .min_by_key(|entity| (from.distance(entity.position()), entity.id()))
    }
}

/// Per-team decision logic.
pub trait DecisionLogic {
    /// Choose `unit`'s action for `tick`.
    ///
    /// # Errors
    ///
    /// An error is a fault of the whole team: the registry stops the pass
    /// and reports it as [`GameError::DecisionFault`](crate::error::GameError::DecisionFault).
    fn decide(&mut self, tick: u64, unit: &Unit, world: &WorldView<'_>) -> Result<Action, DecisionError>;
}

impl<F> DecisionLogic for F
where
    F: FnMut(u64, &Unit, &WorldView<'_>) -> Result<Action, DecisionError>,
{
    fn decide(&mut self, tick: u64, unit: &Unit, world: &WorldView<'_>) -> Result<Action, DecisionError> {
        self(tick, unit, world)
    }
}

/// Decision logic that never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl DecisionLogic for Idle {
    fn decide(&mut self, _tick: u64, _unit: &Unit, _world: &WorldView<'_>) -> Result<Action, DecisionError> {
        Ok(Action::default())
    }
}

/// The decision logic of both teams.
pub struct TeamControllers {
    blue: Box<dyn DecisionLogic>,
    red: Box<dyn DecisionLogic>,
}

impl TeamControllers {
    /// Pair up the two teams' logic.
    #[must_use]
    pub fn new(blue: Box<dyn DecisionLogic>, red: Box<dyn DecisionLogic>) -> Self {
        Self { blue, red }
    }

    /// Both teams idle.
    #[must_use]
    pub fn idle() -> Self {
        Self::new(Box::new(Idle), Box::new(Idle))
    }

    /// Logic for `team`.
    pub fn logic_mut(&mut self, team: Team) -> &mut dyn DecisionLogic {
        match team {
            Team::Blue => self.blue.as_mut(),
            Team::Red => self.red.as_mut(),
        }
    }
}

impl std::fmt::Debug for TeamControllers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamControllers").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::WorldOffset;

    #[test]
    fn test_action_builders() {
        let action = Action::default()
            .toward(Vec2Fixed::from_num(1, 2))
            .at_speed(Fixed::from_num(3))
            .with_task(Task::Fire(4));
        assert_eq!(action.steer, Some(Steer::Point(Vec2Fixed::from_num(1, 2))));
        assert_eq!(action.speed, Some(Fixed::from_num(3)));
        assert_eq!(action.task, Some(Task::Fire(4)));
    }

    #[test]
    fn test_nearest_prefers_distance_then_id() {
        let mut registry = EntityRegistry::new(WorldOffset::NONE, Rules::default());
        let far = registry.create_resource_node(Vec2Fixed::from_num(100, 0));
        let a = registry.create_resource_node(Vec2Fixed::from_num(0, 10));
        let b = registry.create_resource_node(Vec2Fixed::from_num(10, 0));

        let view = WorldView::new(&registry);
        let nearest = view.nearest(Vec2Fixed::ZERO, |_| true).map(Item::id);
        // a and b tie on distance; the older one wins
        assert_eq!(nearest, Some(a));
        assert_ne!(nearest, Some(b));

        let filtered = view.nearest(Vec2Fixed::ZERO, |e| e.id() == far).map(Item::id);
        assert_eq!(filtered, Some(far));
    }

    #[test]
    fn test_nearest_skips_pending_removal() {
        let mut registry = EntityRegistry::new(WorldOffset::NONE, Rules::default());
        let near = registry.create_resource_node(Vec2Fixed::from_num(1, 0));
        let far = registry.create_resource_node(Vec2Fixed::from_num(9, 0));
        registry.mark_for_removal(near).unwrap();

        let view = WorldView::new(&registry);
        assert_eq!(view.nearest(Vec2Fixed::ZERO, |_| true).map(Item::id), Some(far));
    }
}
