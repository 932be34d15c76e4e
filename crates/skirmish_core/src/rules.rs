//! Data-driven gameplay tuning.
//!
//! Every number the entity kinds need (life, speed, fuel, prices, ranges)
//! comes from a [`Rules`] value. The built-in defaults describe the standard
//! game; a RON file can override any subset of them.
//!
//! # Example RON
//!
//! ```ron
//! Rules(
//!     fighter: KindStats(life: 120, speed: 5, start_fuel: 80, max_fuel: 80, consumption: 1, size: 10),
//!     projectile_damage: 30,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Footprint, Life, Motion, UnitClass};
use crate::math::Fixed;

/// Error type for rules loading.
#[derive(Error, Debug)]
pub enum RulesError {
    /// Failed to read file.
    #[error("Failed to read rules file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse rules: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// Physical statistics of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    /// Maximum (and starting) life.
    pub life: u32,
    /// Distance travelled by a full move.
    pub speed: u32,
    /// Fuel at creation.
    pub start_fuel: u32,
    /// Fuel capacity.
    pub max_fuel: u32,
    /// Fuel spent by a full move.
    pub consumption: u32,
    /// Square footprint side.
    pub size: u32,
}

impl KindStats {
    /// Fresh movement state for this kind.
    #[must_use]
    pub fn motion(&self) -> Motion {
        Motion::new(
            Fixed::from_num(self.speed),
            Fixed::from_num(self.start_fuel),
            Fixed::from_num(self.max_fuel),
            Fixed::from_num(self.consumption),
        )
    }

    /// Fresh life state for this kind.
    #[must_use]
    pub const fn life(&self) -> Life {
        Life::new(self.life)
    }

    /// Footprint of this kind.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        Footprint::new(self.size, self.size)
    }
}

/// Complete gameplay tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Base statistics. Bases never move.
    pub base: KindStats,
    /// Harvester statistics.
    pub harvester: KindStats,
    /// Fighter statistics.
    pub fighter: KindStats,
    /// Projectile statistics.
    pub projectile: KindStats,
    /// Resource node footprint side.
    pub node_size: u32,
    /// Minerals in a freshly created resource node.
    pub node_minerals: u32,
    /// Minerals a base starts with.
    pub base_start_minerals: u32,
    /// Price of a harvester.
    pub harvester_price: u32,
    /// Price of a fighter.
    pub fighter_price: u32,
    /// Maximum distance for extract, unload and refuel.
    pub interaction_range: u32,
    /// Maximum distance at which a fighter may launch.
    pub fire_range: u32,
    /// Minerals a harvester extracts per tick.
    pub extract_rate: u32,
    /// Harvester cargo capacity.
    pub cargo_capacity: u32,
    /// Projectiles a fighter is built with.
    pub fighter_missiles: u32,
    /// Damage dealt by a projectile hit.
    pub projectile_damage: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            base: KindStats {
                life: 1000,
                speed: 0,
                start_fuel: 0,
                max_fuel: 0,
                consumption: 0,
                size: 30,
            },
            harvester: KindStats {
                life: 500,
                speed: 2,
                start_fuel: 100,
                max_fuel: 100,
                consumption: 1,
                size: 8,
            },
            fighter: KindStats {
                life: 100,
                speed: 4,
                start_fuel: 100,
                max_fuel: 100,
                consumption: 1,
                size: 10,
            },
            projectile: KindStats {
                life: 1,
                speed: 5,
                start_fuel: 100,
                max_fuel: 100,
                consumption: 1,
                size: 2,
            },
            node_size: 12,
            node_minerals: 1000,
            base_start_minerals: 200,
            harvester_price: 50,
            fighter_price: 60,
            interaction_range: 16,
            fire_range: 100,
            extract_rate: 5,
            cargo_capacity: 50,
            fighter_missiles: 10,
            projectile_damage: 20,
        }
    }
}

impl Rules {
    /// Load rules from a RON file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RulesError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load rules from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, RulesError> {
        Ok(ron::from_str(ron)?)
    }

    /// Statistics for a unit class.
    #[must_use]
    pub const fn unit(&self, class: UnitClass) -> &KindStats {
        match class {
            UnitClass::Base => &self.base,
            UnitClass::Harvester => &self.harvester,
            UnitClass::Fighter => &self.fighter,
        }
    }

    /// Mineral price of a unit class, `None` when a base cannot build it.
    #[must_use]
    pub const fn price(&self, class: UnitClass) -> Option<u32> {
        match class {
            UnitClass::Base => None,
            UnitClass::Harvester => Some(self.harvester_price),
            UnitClass::Fighter => Some(self.fighter_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let rules = Rules::from_ron_str("Rules(projectile_damage: 33, fighter_price: 7)").unwrap();
        assert_eq!(rules.projectile_damage, 33);
        assert_eq!(rules.fighter_price, 7);
        assert_eq!(rules.harvester, Rules::default().harvester);
    }

    #[test]
    fn test_kind_stats_override() {
        let rules = Rules::from_ron_str(
            "Rules(fighter: KindStats(life: 5, speed: 9, start_fuel: 1, max_fuel: 2, consumption: 1, size: 3))",
        )
        .unwrap();
        assert_eq!(rules.unit(UnitClass::Fighter).speed, 9);
        assert_eq!(rules.fighter.motion().fuel(), Fixed::ONE);
    }

    #[test]
    fn test_bad_ron_is_reported() {
        let err = Rules::from_ron_str("Rules(projectile_damage: \"lots\")").unwrap_err();
        assert!(matches!(err, RulesError::ParseError(_)));
    }

    #[test]
    fn test_prices() {
        let rules = Rules::default();
        assert_eq!(rules.price(UnitClass::Base), None);
        assert_eq!(rules.price(UnitClass::Fighter), Some(60));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.ron");
        std::fs::write(&path, "Rules(extract_rate: 11)").unwrap();
        assert_eq!(Rules::load(&path).unwrap().extract_rate, 11);
    }
}
