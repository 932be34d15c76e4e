//! Per-session world offset.
//!
//! Maps are authored around a small, fixed origin. Every loaded coordinate is
//! shifted by a per-session offset so decision logic cannot hard-code
//! absolute positions. The offset is drawn from a seeded PRNG: the same seed
//! always yields the same world.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Smallest offset on each axis.
pub const MIN_OFFSET: i32 = 1;

/// Largest offset on each axis.
pub const MAX_OFFSET: i32 = 50_000;

/// Translation applied to every loaded position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldOffset {
    #[serde(with = "fixed_serde")]
    x: Fixed,
    #[serde(with = "fixed_serde")]
    y: Fixed,
}

impl WorldOffset {
    /// An explicit offset.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// No translation. Useful for tests and tools.
    pub const NONE: Self = Self::new(Fixed::ZERO, Fixed::ZERO);

    /// Sample both axes independently from `MIN_OFFSET..=MAX_OFFSET`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let x = rng.gen_range(MIN_OFFSET..=MAX_OFFSET);
        let y = rng.gen_range(MIN_OFFSET..=MAX_OFFSET);
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Offset on the x axis.
    #[must_use]
    pub const fn x(&self) -> Fixed {
        self.x
    }

    /// Offset on the y axis.
    #[must_use]
    pub const fn y(&self) -> Fixed {
        self.y
    }

    /// Map coordinates to world coordinates.
    #[must_use]
    pub fn apply(&self, position: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(position.x + self.x, position.y + self.y)
    }

    /// World coordinates back to map coordinates. Exact inverse of [`apply`](Self::apply).
    #[must_use]
    pub fn undo(&self, position: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(position.x - self.x, position.y - self.y)
    }
}
