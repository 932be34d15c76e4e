//! End-to-end registry scenarios.

use skirmish_core::prelude::*;
use skirmish_test_utils::determinism::{find_first_divergence, verify_snapshot_determinism};
use skirmish_test_utils::fixtures::{arena_session, fixed, pos, Session};

#[test]
fn node_and_base_load_through_offset() {
    let mut registry = EntityRegistry::with_seed(2024, Rules::default());
    let offset = registry.offset();
    let map = MapFile::from_ron_str(
        r#"MapFile(items: [
            MapItem(kind: Some("MINERAL"), x: Some(10.0), y: Some(10.0)),
            MapItem(kind: Some("BASE"), x: Some(0.0), y: Some(0.0), team: Some("BLUE")),
        ])"#,
    )
    .unwrap();

    let ids = registry.load_map(&map).unwrap();
    let node = registry.get(ids[0]).unwrap();
    assert_eq!(
        node.position(),
        Vec2Fixed::new(fixed(10) + offset.x(), fixed(10) + offset.y())
    );
    assert_eq!(registry.undo_offset(node.position()), pos(10, 10));

    let base = registry.get(ids[1]).and_then(Entity::as_unit).unwrap();
    assert_eq!(base.class(), UnitClass::Base);
    assert_eq!(base.team(), Team::Blue);
    assert_eq!(registry.undo_offset(base.position()), pos(0, 0));
    assert_eq!(registry.statistics().team(Team::Blue).created(UnitClass::Base), 1);
}

#[test]
fn fighter_kills_enemy_and_corpse_lingers_one_pass() {
    let mut rules = Rules::default();
    rules.fighter.life = 20;
    let mut registry = EntityRegistry::new(WorldOffset::NONE, rules);
    let red = registry.create_fighter(pos(30, 0), Team::Red);
    let blue = registry.create_fighter(pos(0, 0), Team::Blue);

    let fire = move |_: u64, unit: &Unit, _: &WorldView<'_>| -> std::result::Result<Action, DecisionError> {
        Ok(if unit.missiles() == Some(10) {
            Action::default().with_task(Task::Fire(red))
        } else {
            Action::default()
        })
    };
    let mut controllers = TeamControllers::new(Box::new(fire), Box::new(Idle));

    // Launch on tick 1, six full steps cover the 30 units, the hit lands on tick 8.
    let mut tick = 0;
    let mut died_on = None;
    while died_on.is_none() && tick < 20 {
        tick += 1;
        registry.update(tick, &mut controllers).unwrap();
        if registry.get(red).is_some_and(Item::is_pending_removal) {
            died_on = Some(tick);
        }
    }
    assert_eq!(died_on, Some(8));

    // Still queryable right after the killing pass.
    let corpse = registry.get(red).and_then(Entity::as_living).unwrap();
    assert_eq!(corpse.life().current, 0);

    let report = registry.update(tick + 1, &mut controllers).unwrap();
    assert!(!registry.exists(red));
    assert!(report.removed.contains(&red));
    assert!(registry.exists(blue));

    let stats = registry.statistics();
    assert_eq!(stats.team(Team::Blue).hits, 1);
    assert_eq!(stats.team(Team::Red).lost(UnitClass::Fighter), 1);
}

#[test]
fn projectile_loses_erased_target() {
    let mut registry = EntityRegistry::default();
    let target = registry.create_base(pos(100, 0), Team::Red);
    let projectile = registry.create_projectile(pos(0, 0), target, Team::Blue);
    let mut controllers = TeamControllers::idle();

    registry.mark_for_removal(target).unwrap();
    registry.update(1, &mut controllers).unwrap();
    // The flagged target still resolves, so the projectile kept homing.
    assert_eq!(registry.get(projectile).unwrap().position(), pos(5, 0));

    registry.update(2, &mut controllers).unwrap();
    assert!(!registry.exists(target));
    let stranded = registry.get(projectile).unwrap();
    assert_eq!(stranded.position(), pos(5, 0));
    assert!(stranded.is_pending_removal());

    registry.update(3, &mut controllers).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn two_projectiles_both_count_on_same_target() {
    let mut rules = Rules::default();
    rules.base.life = 20;
    let mut registry = EntityRegistry::new(WorldOffset::NONE, rules);
    let base = registry.create_base(pos(2, 0), Team::Red);
    registry.create_projectile(pos(0, 0), base, Team::Blue);
    registry.create_projectile(pos(0, 1), base, Team::Blue);

    registry.update(1, &mut TeamControllers::idle()).unwrap();
    let hit = registry.get(base).and_then(Entity::as_living).unwrap();
    assert_eq!(hit.life().current, 0);
    assert_eq!(registry.statistics().team(Team::Blue).hits, 2);
}

#[test]
fn faulting_team_is_reported() {
    let mut session = arena_session(3);
    let red = |_: u64, _: &Unit, _: &WorldView<'_>| -> std::result::Result<Action, DecisionError> {
        Err(DecisionError::new("script crashed"))
    };
    session.controllers = TeamControllers::new(Box::new(Idle), Box::new(red));

    match session.step() {
        Err(GameError::DecisionFault { team, message, .. }) => {
            assert_eq!(team, Team::Red);
            assert_eq!(message, "script crashed");
        }
        other => panic!("expected a decision fault, got {other:?}"),
    }
}

#[test]
fn arena_is_reproducible() {
    assert_eq!(find_first_divergence(|| arena_session(99), 250), None);
    assert!(verify_snapshot_determinism(|| arena_session(99), 100, 100).unwrap());
}

#[test]
fn map_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("duel.ron");
    std::fs::write(
        &path,
        r#"MapFile(items: [
            MapItem(kind: Some("FIGHTER"), x: Some(-20.0), y: Some(0.0), team: Some("BLUE")),
            MapItem(kind: Some("FIGHTER"), x: Some(20.0), y: Some(0.0), team: Some("RED")),
        ])"#,
    )
    .unwrap();

    let mut session = Session::new(EntityRegistry::with_seed(1, Rules::default()), TeamControllers::idle());
    assert_eq!(session.registry.load_map_file(&path).unwrap(), vec![1, 2]);
    session.run(10).unwrap();
    assert_eq!(session.registry.statistics().round(), 10);
}
