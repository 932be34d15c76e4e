//! Component definitions.
//!
//! Components are plain data shared by the concrete entity kinds. The
//! behaviour built on top of them lives in [`crate::traits`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for entities.
///
/// Assigned once by the registry, strictly increasing, never reused. Entities
/// refer to each other only through this key, so a destroyed referent shows up
/// as a failed lookup rather than a dangling reference.
pub type EntityId = u64;

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// The blue side.
    Blue,
    /// The red side.
    Red,
}

impl Team {
    /// Both teams, in a fixed order.
    pub const ALL: [Self; 2] = [Self::Blue, Self::Red];

    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }

    /// Index into per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Blue => 0,
            Self::Red => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
        })
    }
}

/// The team-owned unit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitClass {
    /// Stationary headquarters: stores minerals, builds units, refuels.
    Base,
    /// Mining ship: carries minerals from resource nodes to bases.
    Harvester,
    /// Combat ship: launches homing projectiles.
    Fighter,
}

impl UnitClass {
    /// All unit classes, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Base, Self::Harvester, Self::Fighter];

    /// Index into per-class arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Base => 0,
            Self::Harvester => 1,
            Self::Fighter => 2,
        }
    }
}

impl fmt::Display for UnitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::Harvester => "harvester",
            Self::Fighter => "fighter",
        })
    }
}

/// Fixed footprint of an entity, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Footprint {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Footprint {
    /// Create a footprint.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Removal stage of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
enum Removal {
    #[default]
    Alive,
    /// Flagged, not yet observed by a completed registry pass.
    Pending,
    /// Flagged and observed; erased on the next registry visit.
    Sealed,
}

/// State every entity carries: identity, position, footprint, removal flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Body {
    id: EntityId,
    /// World position (offset already applied).
    pub position: Vec2Fixed,
    footprint: Footprint,
    removal: Removal,
}

impl Body {
    /// Create a live body.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2Fixed, footprint: Footprint) -> Self {
        Self {
            id,
            position,
            footprint,
            removal: Removal::Alive,
        }
    }

    /// Identity of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Footprint of the entity.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Whether the entity has been flagged for removal. Never clears.
    #[must_use]
    pub const fn is_pending_removal(&self) -> bool {
        !matches!(self.removal, Removal::Alive)
    }

    /// Flag the entity for removal.
    pub fn mark_for_removal(&mut self) {
        if self.removal == Removal::Alive {
            self.removal = Removal::Pending;
        }
    }

    /// Whether a full registry pass has completed since the flag was raised.
    pub(crate) const fn is_removal_sealed(&self) -> bool {
        matches!(self.removal, Removal::Sealed)
    }

    /// Record that a registry pass has completed with the flag raised.
    pub(crate) fn seal_removal(&mut self) {
        if self.removal == Removal::Pending {
            self.removal = Removal::Sealed;
        }
    }
}

/// Movement and fuel state for mobile entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Motion {
    /// Speed restored at the start of every tick.
    #[serde(with = "fixed_serde")]
    nominal_speed: Fixed,
    /// Distance the next move travels.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    #[serde(with = "fixed_serde")]
    fuel: Fixed,
    #[serde(with = "fixed_serde")]
    fuel_capacity: Fixed,
    /// Fuel spent by a full move at nominal speed.
    #[serde(with = "fixed_serde")]
    consumption: Fixed,
    /// Unit heading vector.
    pub heading: Vec2Fixed,
}

impl Motion {
    /// Create a motion component heading along +x.
    ///
    /// The starting fuel is clamped to the capacity.
    #[must_use]
    pub fn new(nominal_speed: Fixed, fuel: Fixed, fuel_capacity: Fixed, consumption: Fixed) -> Self {
        Self {
            nominal_speed,
            speed: nominal_speed,
            fuel: fuel.clamp(Fixed::ZERO, fuel_capacity),
            fuel_capacity,
            consumption,
            heading: Vec2Fixed::UNIT_X,
        }
    }

    /// Speed restored every tick.
    #[must_use]
    pub const fn nominal_speed(&self) -> Fixed {
        self.nominal_speed
    }

    /// Current fuel level.
    #[must_use]
    pub const fn fuel(&self) -> Fixed {
        self.fuel
    }

    /// Maximum fuel level.
    #[must_use]
    pub const fn fuel_capacity(&self) -> Fixed {
        self.fuel_capacity
    }

    /// Fuel spent by a full move.
    #[must_use]
    pub const fn consumption(&self) -> Fixed {
        self.consumption
    }

    /// Fuel needed to travel `distance`.
    ///
    /// A full move at nominal speed costs exactly `consumption`; shorter moves
    /// pay their proportional share.
    #[must_use]
    pub fn fuel_cost(&self, distance: Fixed) -> Fixed {
        if self.nominal_speed == Fixed::ZERO || distance <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        if distance == self.nominal_speed {
            return self.consumption;
        }
        self.consumption.saturating_mul(distance) / self.nominal_speed
    }

    /// Longest distance the remaining fuel can fund.
    #[must_use]
    pub fn max_travel(&self) -> Fixed {
        if self.consumption == Fixed::ZERO {
            return Fixed::MAX;
        }
        self.fuel.saturating_mul(self.nominal_speed) / self.consumption
    }

    /// Add fuel, clamped to capacity. Returns the amount accepted.
    pub fn add_fuel(&mut self, amount: Fixed) -> Fixed {
        let headroom = self.fuel_capacity - self.fuel;
        let accepted = amount.clamp(Fixed::ZERO, headroom);
        self.fuel += accepted;
        accepted
    }

    /// Remove fuel for a move, never going below zero.
    pub(crate) fn burn(&mut self, amount: Fixed) {
        debug_assert!(amount <= self.fuel, "move exceeds available fuel");
        self.fuel = (self.fuel - amount).max(Fixed::ZERO);
    }

    /// Reset per-tick state.
    pub(crate) fn reset_speed(&mut self) {
        self.speed = self.nominal_speed;
    }
}

/// Life component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Life {
    /// Current life points.
    pub current: u32,
    /// Maximum life points.
    pub max: u32,
}

impl Life {
    /// Create new life component at full life.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the entity is dead (life == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }
}
