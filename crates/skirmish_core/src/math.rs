//! Fixed-point math utilities for deterministic simulation.
//!
//! All world coordinates, speeds and fuel levels use fixed-point
//! arithmetic so that a match replays bit-for-bit on every platform.
//! Addition and subtraction are exact, which is what makes the world
//! offset transform perfectly reversible.

use fixed::traits::ToFixed;
use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Largest coordinate magnitude a map may place an entity at (2^29).
///
/// The difference of two in-bound coordinates always fits in [`Fixed`].
pub const WORLD_BOUND: Fixed = Fixed::from_bits(1 << 61);

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Unit vector along +x, the heading every mobile entity starts with.
    pub const UNIT_X: Self = Self {
        x: Fixed::ONE,
        y: Fixed::ZERO,
    };

    /// Build a vector from any numeric pair (test and authoring helper).
    ///
    /// # Panics
    ///
    /// Panics if a component does not fit the fixed-point range.
    #[must_use]
    pub fn from_num<X: ToFixed, Y: ToFixed>(x: X, y: Y) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Euclidean length.
    ///
    /// Squares are accumulated on the raw bits in 128-bit integers, so the
    /// result never overflows and is exact for perfect squares.
    #[must_use]
    pub fn length(self) -> Fixed {
        let x = u128::from(self.x.to_bits().unsigned_abs());
        let y = u128::from(self.y.to_bits().unsigned_abs());
        // bits are scaled by 2^32, so the sum is scaled by 2^64 and its root by 2^32
        let sum = x * x + y * y;
        let root = isqrt(sum);
        Fixed::from_bits(i64::try_from(root).unwrap_or(i64::MAX))
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        (other - self).length()
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, k: Fixed) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// Normalize vector using fixed-point math.
    ///
    /// Returns `None` for the zero vector, which has no direction.
    #[must_use]
    pub fn normalize(self) -> Option<Self> {
        let len = self.length();
        if len == Fixed::ZERO {
            return None;
        }
        Some(Self::new(self.x / len, self.y / len))
    }
}

/// Integer square root (floor) by Newton iteration.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }

    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << ((bits + 1) / 2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
