//! Declarative map loading.
//!
//! A map is a RON document listing the entities present at the start of a
//! match. Coordinates are authored around the map origin; the loader pushes
//! every position through the registry's world offset before creating the
//! entity.
//!
//! # Example RON
//!
//! ```ron
//! MapFile(
//!     items: [
//!         MapItem(kind: Some("MINERAL"), x: Some(10.0), y: Some(10.0)),
//!         MapItem(kind: Some("BASE"), x: Some(0.0), y: Some(0.0), team: Some("BLUE")),
//!     ],
//! )
//! ```
//!
//! Loading is all or nothing: every item is checked before the first entity
//! is created. Offset coordinates must stay within
//! [`WORLD_BOUND`](crate::math::WORLD_BOUND) so that any two positions can
//! be subtracted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{EntityId, Team, UnitClass};
use crate::math::{Fixed, Vec2Fixed, WORLD_BOUND};
use crate::registry::EntityRegistry;

/// Error type for map loading.
#[derive(Error, Debug)]
pub enum MapError {
    /// Failed to read file.
    #[error("Cannot load map file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse map: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// An item has no coordinate on `axis`.
    #[error("Parse error - item {index}: no \"{axis}\" attribute")]
    MissingCoordinate {
        /// Position of the item in the list.
        index: usize,
        /// "x" or "y".
        axis: &'static str,
    },
    /// An item's coordinate is not finite or lies beyond
    /// [`WORLD_BOUND`](crate::math::WORLD_BOUND) once offset.
    #[error("Parse error - item {index}: bad \"{axis}\" attribute {value}")]
    InvalidCoordinate {
        /// Position of the item in the list.
        index: usize,
        /// "x" or "y".
        axis: &'static str,
        /// Value as written.
        value: f64,
    },
    /// An item has no kind.
    #[error("Parse error - item {index}: no \"type\" attribute")]
    MissingKind {
        /// Position of the item in the list.
        index: usize,
    },
    /// An item's kind is not one of the known kinds.
    #[error("Parse error - item {index}: unknown type \"{kind}\"")]
    UnknownKind {
        /// Position of the item in the list.
        index: usize,
        /// Kind as written.
        kind: String,
    },
    /// A team-owned item has no team.
    #[error("Parse error - item {index}: no \"team\" attribute")]
    MissingTeam {
        /// Position of the item in the list.
        index: usize,
    },
    /// A team-owned item names an unknown team.
    #[error("Parse error - item {index}: bad \"team\" attribute \"{team}\"")]
    BadTeam {
        /// Position of the item in the list.
        index: usize,
        /// Team as written.
        team: String,
    },
}

/// One declared entity. Every field is optional so that omissions are
/// reported as [`MapError`]s rather than generic parse failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapItem {
    /// `MINERAL`, `BASE`, `MININGSHIP` or `FIGHTER`.
    pub kind: Option<String>,
    /// Map x coordinate.
    pub x: Option<f64>,
    /// Map y coordinate.
    pub y: Option<f64>,
    /// `BLUE` or `RED`, required for team-owned kinds.
    pub team: Option<String>,
}

/// A whole map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapFile {
    /// Declared entities, created in this order.
    pub items: Vec<MapItem>,
}

impl MapFile {
    /// Load a map from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load a map from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, MapError> {
        Ok(ron::from_str(ron)?)
    }
}

#[derive(Debug, Clone, Copy)]
enum Declared {
    ResourceNode,
    Unit(UnitClass, Team),
}

fn coordinate(index: usize, axis: &'static str, value: Option<f64>, offset: Fixed) -> Result<Fixed, MapError> {
    let value = value.ok_or(MapError::MissingCoordinate { index, axis })?;
    Fixed::checked_from_num(value)
        .and_then(|v| v.checked_add(offset))
        .filter(|v| *v >= -WORLD_BOUND && *v <= WORLD_BOUND)
        .ok_or(MapError::InvalidCoordinate { index, axis, value })
}

fn team(index: usize, team: Option<&str>) -> Result<Team, MapError> {
    match team {
        None => Err(MapError::MissingTeam { index }),
        Some("BLUE") => Ok(Team::Blue),
        Some("RED") => Ok(Team::Red),
        Some(other) => Err(MapError::BadTeam {
            index,
            team: other.to_string(),
        }),
    }
}

fn declare(index: usize, item: &MapItem, registry: &EntityRegistry) -> Result<(Declared, Vec2Fixed), MapError> {
    let offset = registry.offset();
    let x = coordinate(index, "x", item.x, offset.x())?;
    let y = coordinate(index, "y", item.y, offset.y())?;

    let kind = item.kind.as_deref().ok_or(MapError::MissingKind { index })?;
    let class = match kind {
        "MINERAL" => return Ok((Declared::ResourceNode, Vec2Fixed::new(x, y))),
        "BASE" => UnitClass::Base,
        "MININGSHIP" => UnitClass::Harvester,
        "FIGHTER" => UnitClass::Fighter,
        other => {
            return Err(MapError::UnknownKind {
                index,
                kind: other.to_string(),
            })
        }
    };
    let team = team(index, item.team.as_deref())?;
    Ok((Declared::Unit(class, team), Vec2Fixed::new(x, y)))
}

impl EntityRegistry {
    /// Create every entity declared by `map`, in order.
    ///
    /// Positions are shifted by the world offset. Returns the new ids.
    ///
    /// # Errors
    ///
    /// Returns the first malformed item's error; the registry is left
    /// untouched in that case.
    pub fn load_map(&mut self, map: &MapFile) -> Result<Vec<EntityId>, MapError> {
        let declared = map
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| declare(index, item, self))
            .collect::<Result<Vec<_>, _>>()?;

        let ids = declared
            .into_iter()
            .map(|(kind, position)| match kind {
                Declared::ResourceNode => self.create_resource_node(position),
                Declared::Unit(class, team) => self.create_unit(class, position, team),
            })
            .collect::<Vec<_>>();
        tracing::info!(entities = ids.len(), "Map loaded");
        Ok(ids)
    }

    /// Read a RON map file and load it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any item
    /// is malformed.
    pub fn load_map_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<EntityId>, MapError> {
        let map = MapFile::load(path)?;
        self.load_map(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::error::DecisionError;
    use crate::handler::{Action, Idle, Task, TeamControllers, WorldView};
    use crate::offset::WorldOffset;
    use crate::rules::Rules;
    use crate::traits::Item;
    use crate::unit::Unit;

    fn registry() -> EntityRegistry {
        EntityRegistry::new(
            WorldOffset::new(Fixed::from_num(1000), Fixed::from_num(2000)),
            Rules::default(),
        )
    }

    #[test]
    fn test_load_applies_offset() {
        let map = MapFile::from_ron_str(
            r#"MapFile(items: [
                MapItem(kind: Some("MINERAL"), x: Some(10.0), y: Some(10.0)),
                MapItem(kind: Some("BASE"), x: Some(0.0), y: Some(0.0), team: Some("BLUE")),
                MapItem(kind: Some("MININGSHIP"), x: Some(-5.5), y: Some(3.0), team: Some("RED")),
                MapItem(kind: Some("FIGHTER"), x: Some(1.0), y: Some(2.0), team: Some("RED")),
            ])"#,
        )
        .unwrap();
        let mut registry = registry();
        let ids = registry.load_map(&map).unwrap();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let node = registry.get(1).unwrap();
        assert!(matches!(node, Entity::ResourceNode(_)));
        assert_eq!(node.position(), Vec2Fixed::from_num(1010, 2010));
        assert_eq!(registry.undo_offset(node.position()), Vec2Fixed::from_num(10, 10));

        assert_eq!(registry.get(3).and_then(Entity::class), Some(UnitClass::Harvester));
        assert_eq!(registry.get(3).and_then(Entity::team), Some(Team::Red));
        assert_eq!(registry.get(3).unwrap().position(), Vec2Fixed::from_num(994.5, 2003));
    }

    #[test]
    fn test_failed_load_creates_nothing() {
        let map = MapFile::from_ron_str(
            r#"MapFile(items: [
                MapItem(kind: Some("MINERAL"), x: Some(10.0), y: Some(10.0)),
                MapItem(kind: Some("BASE"), x: Some(0.0), y: Some(0.0), team: Some("GREEN")),
            ])"#,
        )
        .unwrap();
        let mut registry = registry();
        let err = registry.load_map(&map).unwrap_err();
        assert!(matches!(err, MapError::BadTeam { index: 1, ref team } if team == "GREEN"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_items() {
        let cases = [
            (MapItem { kind: Some("MINERAL".into()), y: Some(0.0), ..MapItem::default() }, "x"),
            (MapItem { kind: Some("MINERAL".into()), x: Some(0.0), ..MapItem::default() }, "y"),
        ];
        for (item, missing) in cases {
            let map = MapFile { items: vec![item] };
            match registry().load_map(&map) {
                Err(MapError::MissingCoordinate { axis, .. }) => assert_eq!(axis, missing),
                other => panic!("unexpected: {other:?}"),
            }
        }

        let no_kind = MapFile { items: vec![MapItem { x: Some(0.0), y: Some(0.0), ..MapItem::default() }] };
        assert!(matches!(registry().load_map(&no_kind), Err(MapError::MissingKind { index: 0 })));

        let unknown = MapFile {
            items: vec![MapItem { kind: Some("TOWER".into()), x: Some(0.0), y: Some(0.0), team: None }],
        };
        assert!(matches!(registry().load_map(&unknown), Err(MapError::UnknownKind { .. })));

        let no_team = MapFile {
            items: vec![MapItem { kind: Some("FIGHTER".into()), x: Some(0.0), y: Some(0.0), team: None }],
        };
        assert!(matches!(registry().load_map(&no_team), Err(MapError::MissingTeam { index: 0 })));

        let not_finite = MapFile {
            items: vec![MapItem { kind: Some("MINERAL".into()), x: Some(f64::NAN), y: Some(0.0), team: None }],
        };
        assert!(matches!(
            registry().load_map(&not_finite),
            Err(MapError::InvalidCoordinate { axis: "x", .. })
        ));
    }

    #[test]
    fn test_coordinates_beyond_world_bound_are_rejected() {
        let fighter = |x: f64, team: &str| MapItem {
            kind: Some("FIGHTER".into()),
            x: Some(x),
            y: Some(0.0),
            team: Some(team.into()),
        };

        // Fits I32F32 but two such points are too far apart to measure.
        let huge = MapFile { items: vec![fighter(2.0e9, "BLUE"), fighter(-2.0e9, "RED")] };
        let mut rejected = registry();
        assert!(matches!(
            rejected.load_map(&huge),
            Err(MapError::InvalidCoordinate { index: 0, axis: "x", .. })
        ));
        assert!(rejected.is_empty());

        // The bound applies after the offset of 1000 is added.
        let edge = MapFile { items: vec![fighter(536_869_912.0, "BLUE")] };
        assert!(registry().load_map(&edge).is_ok());
        let past = MapFile { items: vec![fighter(536_869_913.0, "BLUE")] };
        assert!(matches!(
            registry().load_map(&past),
            Err(MapError::InvalidCoordinate { axis: "x", .. })
        ));
    }

    #[test]
    fn test_far_apart_units_stay_measurable() {
        let far = MapFile::from_ron_str(
            r#"MapFile(items: [
                MapItem(kind: Some("FIGHTER"), x: Some(-500000000.0), y: Some(0.0), team: Some("BLUE")),
                MapItem(kind: Some("FIGHTER"), x: Some(500000000.0), y: Some(0.0), team: Some("RED")),
            ])"#,
        )
        .unwrap();
        let mut registry = registry();
        let ids = registry.load_map(&far).unwrap();
        let red = ids[1];

        let fire = move |_: u64, _: &Unit, _: &WorldView<'_>| -> std::result::Result<Action, DecisionError> {
            Ok(Action::default().toward_entity(red).with_task(Task::Fire(red)))
        };
        let mut controllers = TeamControllers::new(Box::new(fire), Box::new(Idle));
        registry.update(1, &mut controllers).unwrap();
        // Out of range: ignored, nothing launched.
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.statistics().team(Team::Blue).missiles_launched, 0);
    }

    #[test]
    fn test_load_map_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.ron");
        std::fs::write(
            &path,
            r#"MapFile(items: [MapItem(kind: Some("BASE"), x: Some(1.0), y: Some(1.0), team: Some("RED"))])"#,
        )
        .unwrap();

        let mut registry = registry();
        assert_eq!(registry.load_map_file(&path).unwrap(), vec![1]);
        assert!(matches!(
            registry.load_map_file(dir.path().join("missing.ron")),
            Err(MapError::ReadError(_))
        ));
    }
}
