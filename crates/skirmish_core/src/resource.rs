//! Stationary mineral deposits.

use serde::{Deserialize, Serialize};

use crate::components::{Body, EntityId, Footprint};
use crate::math::Vec2Fixed;
use crate::traits::Item;

/// A mineral deposit harvesters extract from.
///
/// Never moves and cannot be damaged. Flagged for removal once empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceNode {
    body: Body,
    remaining: u32,
}

impl ResourceNode {
    /// Create a new resource node.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2Fixed, footprint: Footprint, minerals: u32) -> Self {
        Self {
            body: Body::new(id, position, footprint),
            remaining: minerals,
        }
    }

    /// Minerals left in this node.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Check if this node is depleted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.remaining == 0
    }

    /// Extract minerals from this node.
    ///
    /// Returns the actual amount extracted (may be less than requested if node is nearly depleted).
    pub fn extract(&mut self, requested: u32) -> u32 {
        let extracted = requested.min(self.remaining);
        self.remaining -= extracted;
        extracted
    }
}

impl Item for ResourceNode {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_is_bounded_by_remaining() {
        let mut node = ResourceNode::new(1, Vec2Fixed::ZERO, Footprint::new(4, 4), 12);
        assert_eq!(node.extract(5), 5);
        assert_eq!(node.extract(50), 7);
        assert!(node.is_depleted());
        assert_eq!(node.extract(1), 0);
    }
}
