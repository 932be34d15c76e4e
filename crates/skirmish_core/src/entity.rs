//! The closed set of entity kinds stored by the registry.

use serde::{Deserialize, Serialize};

use crate::components::{Body, Team, UnitClass};
use crate::handler::Action;
use crate::projectile::Projectile;
use crate::registry::EntityRegistry;
use crate::resource::ResourceNode;
use crate::traits::{Item, Living, Mobile};
use crate::unit::Unit;

/// Any entity in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    /// A mineral deposit.
    ResourceNode(ResourceNode),
    /// A base, harvester or fighter.
    Unit(Unit),
    /// A homing projectile.
    Projectile(Projectile),
}

impl Entity {
    /// The entity as something with life points.
    #[must_use]
    pub fn as_living(&self) -> Option<&dyn Living> {
        match self {
            Self::ResourceNode(_) => None,
            Self::Unit(unit) => Some(unit),
            Self::Projectile(projectile) => Some(projectile),
        }
    }

    /// Mutable access to life points.
    pub fn as_living_mut(&mut self) -> Option<&mut dyn Living> {
        match self {
            Self::ResourceNode(_) => None,
            Self::Unit(unit) => Some(unit),
            Self::Projectile(projectile) => Some(projectile),
        }
    }

    /// The entity as something that moves.
    #[must_use]
    pub fn as_mobile(&self) -> Option<&dyn Mobile> {
        match self {
            Self::ResourceNode(_) => None,
            Self::Unit(unit) => Some(unit),
            Self::Projectile(projectile) => Some(projectile),
        }
    }

    /// The entity as a unit.
    #[must_use]
    pub const fn as_unit(&self) -> Option<&Unit> {
        match self {
            Self::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// The entity as a resource node.
    #[must_use]
    pub const fn as_resource_node(&self) -> Option<&ResourceNode> {
        match self {
            Self::ResourceNode(node) => Some(node),
            _ => None,
        }
    }

    /// The entity as a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&Projectile> {
        match self {
            Self::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Owning team of units and projectiles.
    #[must_use]
    pub const fn team(&self) -> Option<Team> {
        match self {
            Self::ResourceNode(_) => None,
            Self::Unit(unit) => Some(unit.team()),
            Self::Projectile(projectile) => Some(projectile.owner()),
        }
    }

    /// Class of units.
    #[must_use]
    pub const fn class(&self) -> Option<UnitClass> {
        match self {
            Self::Unit(unit) => Some(unit.class()),
            _ => None,
        }
    }

    /// Run the kind's per-tick behaviour. Units carry out `action`, the
    /// decision taken for them earlier in the pass.
    ///
    /// The entity must be detached from `registry` while this runs.
    pub(crate) fn update(&mut self, action: Option<Action>, registry: &mut EntityRegistry) {
        match self {
            Self::ResourceNode(_) => {}
            Self::Unit(unit) => unit.act(action.unwrap_or_default(), registry),
            Self::Projectile(projectile) => {
                let outcome = projectile.update(registry);
                tracing::trace!(projectile = projectile.id(), ?outcome, "projectile updated");
            }
        }
    }
}

impl Item for Entity {
    fn body(&self) -> &Body {
        match self {
            Self::ResourceNode(node) => node.body(),
            Self::Unit(unit) => unit.body(),
            Self::Projectile(projectile) => projectile.body(),
        }
    }

    fn body_mut(&mut self) -> &mut Body {
        match self {
            Self::ResourceNode(node) => node.body_mut(),
            Self::Unit(unit) => unit.body_mut(),
            Self::Projectile(projectile) => projectile.body_mut(),
        }
    }
}

impl From<ResourceNode> for Entity {
    fn from(node: ResourceNode) -> Self {
        Self::ResourceNode(node)
    }
}

impl From<Unit> for Entity {
    fn from(unit: Unit) -> Self {
        Self::Unit(unit)
    }
}

impl From<Projectile> for Entity {
    fn from(projectile: Projectile) -> Self {
        Self::Projectile(projectile)
    }
}
