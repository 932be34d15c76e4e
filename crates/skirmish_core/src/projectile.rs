//! Self-steered homing projectiles.
//!
//! A projectile holds its target by id and resolves it every tick. Each
//! update ends in one of the [`Homing`] outcomes:
//!
//! - the target no longer resolves: flagged for removal, no move
//! - the target is closer than a full step and the remaining distance is
//!   funded: lands on it, deals damage, flagged for removal
//! - fuel can fund no travel: flagged for removal, no damage
//! - otherwise: one full step toward the target

use serde::{Deserialize, Serialize};

use crate::components::{Body, EntityId, Life, Motion, Team};
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::EntityRegistry;
use crate::rules::Rules;
use crate::traits::{Item, Living, Mobile};

/// Outcome of one projectile update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Homing {
    /// Moved toward a live target without reaching it.
    Seeking,
    /// Reached the target and dealt damage.
    Arrived,
    /// The target id no longer resolves to a living entity.
    LostTarget,
    /// Out of fuel before reaching the target.
    Exhausted,
}

/// A homing missile launched by a fighter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    body: Body,
    motion: Motion,
    life: Life,
    target: EntityId,
    damage: u32,
    owner: Team,
}

impl Projectile {
    pub(crate) fn new(
        id: EntityId,
        position: Vec2Fixed,
        target: EntityId,
        owner: Team,
        rules: &Rules,
    ) -> Self {
        let stats = &rules.projectile;
        Self {
            body: Body::new(id, position, stats.footprint()),
            motion: stats.motion(),
            life: stats.life(),
            target,
            damage: rules.projectile_damage,
            owner,
        }
    }

    /// Id of the entity this projectile homes on.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        self.target
    }

    /// Damage dealt on arrival.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Team credited with the hit.
    #[must_use]
    pub const fn owner(&self) -> Team {
        self.owner
    }

    /// Run one tick of homing.
    ///
    /// The projectile must not be stored in `registry` while this runs.
    pub(crate) fn update(&mut self, registry: &mut EntityRegistry) -> Homing {
        self.pre_update();

        let target_position = registry
            .get(self.target)
            .filter(|entity| entity.as_living().is_some())
            .map(Item::position);
        let Some(target_position) = target_position else {
            self.mark_for_removal();
            return Homing::LostTarget;
        };

        self.rotate_to(target_position);
        let distance = self.distance_to(target_position);
        let reach = self.max_travel();
        let travel = self.motion.speed.min(reach);

        // Arrival is judged against the full step; fuel only has to fund the
        // remaining distance, which is nothing when already on the target.
        let arrived = distance < self.motion.speed && distance <= reach;
        if !arrived && travel <= Fixed::ZERO {
            self.mark_for_removal();
            return Homing::Exhausted;
        }
        self.motion.speed = if arrived { distance } else { travel };
        self.advance();

        if !arrived {
            return Homing::Seeking;
        }

        // Heading rounding can leave the step a hair short.
        self.body.position = target_position;
        if let Some(target) = registry.get_mut(self.target).and_then(|e| e.as_living_mut()) {
            target.take_life(self.damage, true);
        }
        registry.statistics_mut().hit_landed(self.owner);
        tracing::trace!(projectile = self.id(), target = self.target, "projectile hit");
        self.mark_for_removal();
        Homing::Arrived
    }
}

impl Item for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Mobile for Projectile {
    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }
}

impl Living for Projectile {
    fn life(&self) -> &Life {
        &self.life
    }

    fn life_mut(&mut self) -> &mut Life {
        &mut self.life
    }
}
