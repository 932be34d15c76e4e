//! # Skirmish Core
//!
//! Deterministic entity simulation for a two-team arena battle.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No stdout
//! - No system randomness (the world offset comes from a seeded PRNG)
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! This separation enables:
//! - Headless matches and batch runs
//! - Snapshots and replays
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`registry`] - Entity ownership, ids and the per-tick update pass
//! - [`traits`] - `Item`, `Mobile` and `Living` capability traits
//! - [`unit`], [`projectile`], [`resource`] - Concrete entity kinds
//! - [`handler`] - Decision-logic seam between teams and their units
//! - [`map`] - Declarative map loading
//! - [`rules`] - Data-driven gameplay tuning
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod components;
pub mod entity;
pub mod error;
pub mod handler;
pub mod map;
pub mod math;
pub mod offset;
pub mod projectile;
pub mod registry;
pub mod resource;
pub mod rules;
pub mod statistics;
pub mod traits;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::entity::Entity;
    pub use crate::error::{DecisionError, GameError, Result};
    pub use crate::handler::{Action, DecisionLogic, Idle, Steer, Task, TeamControllers, WorldView};
    pub use crate::map::{MapError, MapFile, MapItem};
    pub use crate::math::{Fixed, Vec2Fixed, WORLD_BOUND};
    pub use crate::offset::WorldOffset;
    pub use crate::projectile::{Homing, Projectile};
    pub use crate::registry::{EntityRegistry, TickReport};
    pub use crate::resource::ResourceNode;
    pub use crate::rules::{KindStats, Rules, RulesError};
    pub use crate::statistics::{Statistics, TeamStats};
    pub use crate::traits::{Item, Living, Mobile};
    pub use crate::unit::{Loadout, Unit};
}
