//! The entity registry.
//!
//! The registry owns every entity, hands out ids, runs the per-tick update
//! pass and is the only place entities are erased.
//!
//! # Update pass
//!
//! A pass visits the entities registered when it starts, in ascending id
//! order, and nothing else:
//!
//! - entities created during the pass get larger ids and are first updated
//!   on the next pass
//! - an entity flagged for removal is never updated again
//! - a flagged entity stays queryable until the pass after the one that
//!   observed the flag, which is where it is erased
//!
//! Removal is staged on [`Body`](crate::components::Body): a flag raised
//! during a pass is sealed when the pass completes, and a sealed entity is
//! erased when the next pass reaches it.
//!
//! # Determinism
//!
//! Entities live in a `BTreeMap` keyed by id, so iteration order is creation
//! order on every platform. The only randomness is the world offset, drawn
//! from a seeded PRNG.
//!
//! # Example
//!
//! ```
//! use skirmish_core::prelude::*;
//!
//! let mut registry = EntityRegistry::new(WorldOffset::NONE, Rules::default());
//! let node = registry.create_resource_node(Vec2Fixed::from_num(10, 10));
//! let mut controllers = TeamControllers::idle();
//!
//! registry.update(1, &mut controllers).unwrap();
//! assert!(registry.exists(node));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, Footprint, Team, UnitClass};
use crate::entity::Entity;
use crate::error::{GameError, Result};
use crate::handler::TeamControllers;
use crate::math::Vec2Fixed;
use crate::offset::WorldOffset;
use crate::projectile::Projectile;
use crate::resource::ResourceNode;
use crate::rules::Rules;
use crate::statistics::Statistics;
use crate::traits::Item;
use crate::unit::Unit;

/// Snapshot format version, bumped on incompatible layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// What a single update pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick the pass ran for.
    pub tick: u64,
    /// Entities registered when the pass started.
    pub scheduled: usize,
    /// Entities the pass reached.
    pub visited: usize,
    /// Entities whose behaviour ran.
    pub updated: usize,
    /// Entities erased, in id order.
    pub removed: Vec<EntityId>,
}

/// Owner of all entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistry {
    tick: u64,
    next_id: EntityId,
    offset: WorldOffset,
    rules: Rules,
    entities: BTreeMap<EntityId, Entity>,
    statistics: Statistics,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    registry: EntityRegistry,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(offset: WorldOffset, rules: Rules) -> Self {
        Self {
            tick: 0,
            next_id: 1,
            offset,
            rules,
            entities: BTreeMap::new(),
            statistics: Statistics::new(),
        }
    }

    /// Create an empty registry whose offset is drawn from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64, rules: Rules) -> Self {
        let offset = WorldOffset::from_seed(seed);
        tracing::info!(seed, x = %offset.x(), y = %offset.y(), "World offset sampled");
        Self::new(offset, rules)
    }

    /// Last tick passed to [`update`](Self::update).
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Gameplay tuning.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Match statistics.
    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub(crate) fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }

    /// The session's world offset.
    ///
    /// Not reachable from decision logic.
    #[must_use]
    pub const fn offset(&self) -> WorldOffset {
        self.offset
    }

    /// Map coordinates to world coordinates.
    #[must_use]
    pub fn apply_offset(&self, position: Vec2Fixed) -> Vec2Fixed {
        self.offset.apply(position)
    }

    /// World coordinates back to map coordinates.
    #[must_use]
    pub fn undo_offset(&self, position: Vec2Fixed) -> Vec2Fixed {
        self.offset.undo(position)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        tracing::trace!(id, position = ?entity.position(), "Entity created");
        self.entities.insert(id, entity);
        id
    }

    /// Create a resource node at a world position.
    pub fn create_resource_node(&mut self, position: Vec2Fixed) -> EntityId {
        let id = self.allocate_id();
        let size = self.rules.node_size;
        let node = ResourceNode::new(id, position, Footprint::new(size, size), self.rules.node_minerals);
        self.insert(node.into())
    }

    /// Create a unit of any class at a world position.
    pub fn create_unit(&mut self, class: UnitClass, position: Vec2Fixed, team: Team) -> EntityId {
        let id = self.allocate_id();
        let unit = Unit::new(id, class, position, team, &self.rules);
        self.statistics.unit_created(team, class);
        self.insert(unit.into())
    }

    /// Create a base.
    pub fn create_base(&mut self, position: Vec2Fixed, team: Team) -> EntityId {
        self.create_unit(UnitClass::Base, position, team)
    }

    /// Create a harvester.
    pub fn create_harvester(&mut self, position: Vec2Fixed, team: Team) -> EntityId {
        self.create_unit(UnitClass::Harvester, position, team)
    }

    /// Create a fighter.
    pub fn create_fighter(&mut self, position: Vec2Fixed, team: Team) -> EntityId {
        self.create_unit(UnitClass::Fighter, position, team)
    }

    /// Create a projectile homing on `target`.
    pub fn create_projectile(&mut self, position: Vec2Fixed, target: EntityId, owner: Team) -> EntityId {
        let id = self.allocate_id();
        let projectile = Projectile::new(id, position, target, owner, &self.rules);
        self.insert(projectile.into())
    }

    /// Get an entity by ID.
    ///
    /// `None` for ids never issued and for erased entities.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Iterate over all entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Iterate over the units of `team`.
    pub fn units(&self, team: Team) -> impl Iterator<Item = &Unit> + '_ {
        self.iter()
            .filter_map(Entity::as_unit)
            .filter(move |unit| unit.team() == team)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Flag an entity for removal from outside the update pass.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if `id` does not resolve.
    pub fn mark_for_removal(&mut self, id: EntityId) -> Result<()> {
        let entity = self.get_mut(id).ok_or(GameError::EntityNotFound(id))?;
        entity.mark_for_removal();
        Ok(())
    }

    /// Run one update pass.
    ///
    /// # Errors
    ///
    /// A decision fault stops the pass where it happened and is returned
    /// as is. The faulting unit stays in the registry; entities after it
    /// were not visited.
    pub fn update(&mut self, tick: u64, controllers: &mut TeamControllers) -> Result<TickReport> {
        self.tick = tick;
        let scheduled: Vec<EntityId> = self.entities.keys().copied().collect();
        let mut report = TickReport {
            tick,
            scheduled: scheduled.len(),
            ..TickReport::default()
        };

        for id in scheduled {
            let Some(stored) = self.entities.get(&id) else {
                continue;
            };
            report.visited += 1;

            if stored.body().is_removal_sealed() {
                if let Some(entity) = self.entities.remove(&id) {
                    self.erase(&entity);
                }
                report.removed.push(id);
                continue;
            }
            if stored.is_pending_removal() {
                continue;
            }

            // Decide in place, then detach only to apply.
            let action = match stored {
                Entity::Unit(unit) => Some(unit.decide(tick, self, controllers)?),
                _ => None,
            };
            let Some(mut entity) = self.entities.remove(&id) else {
                continue;
            };
            entity.update(action, self);
            self.entities.insert(id, entity);
            report.updated += 1;
        }

        for entity in self.entities.values_mut() {
            entity.body_mut().seal_removal();
        }
        self.statistics.round_completed();

        #[cfg(feature = "debug-validation")]
        self.validate();

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick, state_hash = hash, "Registry state hash");
        }

        Ok(report)
    }

    fn erase(&mut self, entity: &Entity) {
        if let Entity::Unit(unit) = entity {
            self.statistics.unit_lost(unit.team(), unit.class());
        }
        tracing::trace!(id = entity.id(), "Entity erased");
    }

    /// Check structural invariants, panicking on violation.
    #[cfg(feature = "debug-validation")]
    fn validate(&self) {
        for (&id, entity) in &self.entities {
            assert_eq!(id, entity.id(), "entity stored under a foreign key");
            assert!(id < self.next_id, "entity id {id} was never issued");
            if let Some(living) = entity.as_living() {
                assert!(living.life().current <= living.life().max, "entity {id} over max life");
            }
            if let Some(mobile) = entity.as_mobile() {
                let motion = mobile.motion();
                assert!(motion.fuel() <= motion.fuel_capacity(), "entity {id} over fuel capacity");
            }
        }
    }

    /// Calculate a hash of the current registry state.
    ///
    /// Two registries with equal hashes are, for all practical purposes,
    /// identical. Used by determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.next_id.hash(&mut hasher);
        self.offset.hash(&mut hasher);

        self.entities.len().hash(&mut hasher);
        for (id, entity) in &self.entities {
            id.hash(&mut hasher);
            entity.hash(&mut hasher);
        }

        self.statistics.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the registry to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            registry: self.clone(),
        };
        bincode::serialize(&snapshot)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize registry: {e}")))
    }

    /// Deserialize a registry from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the snapshot was written by an
    /// incompatible version.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize registry: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(GameError::InvalidState(format!(
                "Snapshot version {} is not supported (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot.registry)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new(WorldOffset::NONE, Rules::default())
    }
}
