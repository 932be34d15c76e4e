//! Team-owned units: bases, harvesters and fighters.
//!
//! Units are steered from outside. Each tick a unit asks its team's
//! [`DecisionLogic`](crate::handler::DecisionLogic) for an [`Action`] and
//! then applies it in a fixed order: steer, move, task. A task that does not
//! apply (wrong class, missing or out-of-range target, not enough resources)
//! is dropped with a debug event; it never faults the team.

use serde::{Deserialize, Serialize};

use crate::components::{Body, EntityId, Life, Motion, Team, UnitClass};
use crate::entity::Entity;
use crate::error::{GameError, Result};
use crate::handler::{Action, Steer, Task, TeamControllers, WorldView};
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::EntityRegistry;
use crate::rules::Rules;
use crate::traits::{Item, Living, Mobile};

/// Class-specific inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loadout {
    /// Mineral stock of a base.
    Base {
        /// Minerals available for building.
        minerals: u32,
    },
    /// Cargo hold of a harvester.
    Harvester {
        /// Minerals carried.
        cargo: u32,
    },
    /// Magazine of a fighter.
    Fighter {
        /// Projectiles left.
        missiles: u32,
    },
}

impl Loadout {
    /// Fresh loadout for `class`.
    #[must_use]
    pub const fn new(class: UnitClass, rules: &Rules) -> Self {
        match class {
            UnitClass::Base => Self::Base {
                minerals: rules.base_start_minerals,
            },
            UnitClass::Harvester => Self::Harvester { cargo: 0 },
            UnitClass::Fighter => Self::Fighter {
                missiles: rules.fighter_missiles,
            },
        }
    }

    /// Class this loadout belongs to.
    #[must_use]
    pub const fn class(&self) -> UnitClass {
        match self {
            Self::Base { .. } => UnitClass::Base,
            Self::Harvester { .. } => UnitClass::Harvester,
            Self::Fighter { .. } => UnitClass::Fighter,
        }
    }
}

/// A team-owned unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    body: Body,
    motion: Motion,
    life: Life,
    team: Team,
    loadout: Loadout,
}

impl Unit {
    pub(crate) fn new(
        id: EntityId,
        class: UnitClass,
        position: Vec2Fixed,
        team: Team,
        rules: &Rules,
    ) -> Self {
        let stats = rules.unit(class);
        Self {
            body: Body::new(id, position, stats.footprint()),
            motion: stats.motion(),
            life: stats.life(),
            team,
            loadout: Loadout::new(class, rules),
        }
    }

    /// Owning team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Unit class.
    #[must_use]
    pub const fn class(&self) -> UnitClass {
        self.loadout.class()
    }

    /// Class-specific inventory.
    #[must_use]
    pub const fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    /// Minerals stored, for bases.
    #[must_use]
    pub const fn minerals(&self) -> Option<u32> {
        match self.loadout {
            Loadout::Base { minerals } => Some(minerals),
            _ => None,
        }
    }

    /// Minerals carried, for harvesters.
    #[must_use]
    pub const fn cargo(&self) -> Option<u32> {
        match self.loadout {
            Loadout::Harvester { cargo } => Some(cargo),
            _ => None,
        }
    }

    /// Projectiles left, for fighters.
    #[must_use]
    pub const fn missiles(&self) -> Option<u32> {
        match self.loadout {
            Loadout::Fighter { missiles } => Some(missiles),
            _ => None,
        }
    }

    /// Ask the team's logic for this tick's action.
    ///
    /// The unit is still registered, so the view the logic receives
    /// includes it.
    pub(crate) fn decide(
        &self,
        tick: u64,
        registry: &EntityRegistry,
        controllers: &mut TeamControllers,
    ) -> Result<Action> {
        let view = WorldView::new(registry);
        controllers
            .logic_mut(self.team)
            .decide(tick, self, &view)
            .map_err(|err| GameError::DecisionFault {
                team: self.team,
                entity: self.id(),
                message: err.message,
            })
    }

    /// Carry out a decided action.
    ///
    /// The unit must not be stored in `registry` while this runs.
    pub(crate) fn act(&mut self, action: Action, registry: &mut EntityRegistry) {
        self.pre_update();
        self.apply(action, registry);
    }

    fn apply(&mut self, action: Action, registry: &mut EntityRegistry) {
        if let Some(steer) = action.steer {
            let point = match steer {
                Steer::Point(point) => Some(point),
                Steer::Entity(id) if id == self.id() => Some(self.body.position),
                Steer::Entity(id) => registry.get(id).map(Item::position),
            };
            if let Some(point) = point {
                self.rotate_to(point);
            }
        }

        if let Some(requested) = action.speed {
            let speed = requested
                .min(self.motion.nominal_speed())
                .min(self.max_travel());
            if speed > Fixed::ZERO {
                self.motion.speed = speed;
                self.advance();
            }
        }

        if let Some(task) = action.task {
            let outcome = match task {
                Task::Build(class) => self.build(class, registry),
                Task::Refuel { target, amount } => self.give_fuel(target, amount, registry),
                Task::Extract(node) => self.extract(node, registry),
                Task::Unload(base) => self.unload(base, registry),
                Task::Fire(target) => self.fire(target, registry),
            };
            if let Err(reason) = outcome {
                tracing::debug!(unit = self.id(), class = %self.class(), ?task, reason, "task ignored");
            }
        }
    }

    fn in_range(&self, other: Vec2Fixed, range: u32) -> bool {
        self.body.position.distance(other) <= Fixed::from_num(range)
    }

    fn build(&mut self, class: UnitClass, registry: &mut EntityRegistry) -> std::result::Result<(), &'static str> {
        let Loadout::Base { minerals } = &mut self.loadout else {
            return Err("only bases build");
        };
        let price = registry.rules().price(class).ok_or("class cannot be built")?;
        if *minerals < price {
            return Err("not enough minerals");
        }
        *minerals -= price;
        registry.create_unit(class, self.body.position, self.team);
        Ok(())
    }

    fn give_fuel(
        &mut self,
        target: EntityId,
        amount: Fixed,
        registry: &mut EntityRegistry,
    ) -> std::result::Result<(), &'static str> {
        if self.class() != UnitClass::Base {
            return Err("only bases refuel");
        }
        let range = registry.rules().interaction_range;
        let Some(Entity::Unit(receiver)) = registry.get_mut(target) else {
            return Err("refuel target is not a unit");
        };
        if receiver.team != self.team {
            return Err("refuel target is hostile");
        }
        if !self.in_range(receiver.position(), range) {
            return Err("refuel target out of range");
        }
        receiver.refuel(amount);
        Ok(())
    }

    fn extract(&mut self, node: EntityId, registry: &mut EntityRegistry) -> std::result::Result<(), &'static str> {
        let rules = registry.rules();
        let (rate, capacity, range) = (rules.extract_rate, rules.cargo_capacity, rules.interaction_range);
        let Loadout::Harvester { cargo } = &mut self.loadout else {
            return Err("only harvesters extract");
        };
        let Some(Entity::ResourceNode(deposit)) = registry.get_mut(node) else {
            return Err("extract target is not a resource node");
        };
        if self.body.position.distance(deposit.position()) > Fixed::from_num(range) {
            return Err("resource node out of range");
        }
        let extracted = deposit.extract(rate.min(capacity.saturating_sub(*cargo)));
        if deposit.is_depleted() {
            deposit.mark_for_removal();
        }
        if extracted == 0 {
            return Err("nothing to extract");
        }
        *cargo += extracted;
        registry.statistics_mut().minerals_extracted(self.team, extracted);
        Ok(())
    }

    fn unload(&mut self, base: EntityId, registry: &mut EntityRegistry) -> std::result::Result<(), &'static str> {
        let range = registry.rules().interaction_range;
        let Loadout::Harvester { cargo } = &mut self.loadout else {
            return Err("only harvesters unload");
        };
        let Some(Entity::Unit(receiver)) = registry.get_mut(base) else {
            return Err("unload target is not a unit");
        };
        if receiver.team != self.team {
            return Err("unload target is hostile");
        }
        if self.body.position.distance(receiver.position()) > Fixed::from_num(range) {
            return Err("unload target out of range");
        }
        let Loadout::Base { minerals } = &mut receiver.loadout else {
            return Err("unload target is not a base");
        };
        *minerals = minerals.saturating_add(*cargo);
        *cargo = 0;
        Ok(())
    }

    fn fire(&mut self, target: EntityId, registry: &mut EntityRegistry) -> std::result::Result<(), &'static str> {
        let range = registry.rules().fire_range;
        let Loadout::Fighter { missiles } = &mut self.loadout else {
            return Err("only fighters fire");
        };
        if *missiles == 0 {
            return Err("out of missiles");
        }
        let target_position = registry
            .get(target)
            .filter(|entity| entity.as_living().is_some())
            .map(Item::position)
            .ok_or("fire target is not living")?;
        if self.body.position.distance(target_position) > Fixed::from_num(range) {
            return Err("fire target out of range");
        }
        *missiles -= 1;
        registry.create_projectile(self.body.position, target, self.team);
        registry.statistics_mut().missile_launched(self.team);
        Ok(())
    }
}

impl Item for Unit {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Mobile for Unit {
    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }
}

impl Living for Unit {
    fn life(&self) -> &Life {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Life {
        &mut self.life
    }
}
