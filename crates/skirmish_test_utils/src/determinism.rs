//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the registry produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A match must replay bit-for-bit from its seed, map and decision logic.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`skirmish_core::math::Fixed`] throughout.
//!
//! - **Map iteration order**: Rust's default hasher is randomized.
//!   The registry stores entities in a `BTreeMap` keyed by id.
//!
//! - **System randomness**: The world offset is the only random value and
//!   it comes from a seeded PRNG.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual behaviours (homing, tasks, removal staging)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full match scenarios are reproducible
//! 4. **Parallel tests**: Running N sessions in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::registry::EntityRegistry;

use crate::fixtures::Session;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the session was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use skirmish_test_utils::determinism::verify_determinism;
/// use skirmish_test_utils::fixtures::arena_session;
///
/// let result = verify_determinism(
///     3,
///     50,
///     || arena_session(7),
///     |session| { session.step().unwrap(); },
///     |session| session.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run `session` for `ticks`, returning the final hash.
///
/// A decision fault ends the run early; the hash then covers the state at
/// the fault, which is just as reproducible.
fn final_hash(mut session: Session, ticks: u64) -> u64 {
    for _ in 0..ticks {
        if let Err(err) = session.step() {
            tracing::debug!(tick = session.tick, %err, "Session stopped on fault");
            break;
        }
    }
    session.state_hash()
}

/// Result of parallel session runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each session.
    pub hashes: Vec<u64>,
    /// Number of ticks each session ran.
    pub ticks: u64,
    /// Number of sessions run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all sessions produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all sessions matched.
    ///
    /// # Panics
    ///
    /// Panics if sessions produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel sessions diverged!\n\
                 Sessions: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run `num_sims` sessions on scoped threads and collect their final hashes.
///
/// Each session is built on its own thread, so decision logic does not
/// need to be `Send`.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_sessions_scoped<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Session + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| s.spawn(|| final_hash(setup_fn(), num_ticks)))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Find the first tick where two identically built sessions diverge.
///
/// Returns `None` if they stay identical for `num_ticks`. Tick 0 means the
/// initial states already differ.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Session,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let fault_a = a.step().is_err();
        let fault_b = b.step().is_err();

        if fault_a != fault_b || a.state_hash() != b.state_hash() {
            return Some(tick);
        }
        if fault_a {
            return None;
        }
    }

    None
}

/// Check that a snapshot taken mid-session resumes identically.
///
/// Runs one session for `split` ticks, snapshots it, restores the snapshot
/// under freshly built decision logic, and runs both for `rest` more ticks.
/// The logic built by `setup_fn` must therefore carry no state of its own.
///
/// # Errors
///
/// Propagates decision faults and snapshot encode or decode failures.
pub fn verify_snapshot_determinism<F>(setup_fn: F, split: u64, rest: u64) -> skirmish_core::error::Result<bool>
where
    F: Fn() -> Session,
{
    let mut original = setup_fn();
    original.run(split)?;

    let bytes = original.registry.serialize()?;
    let restored_registry = EntityRegistry::deserialize(&bytes)?;
    let mut restored = Session::new(restored_registry, setup_fn().controllers);
    restored.tick = original.tick;

    if restored.state_hash() != original.state_hash() {
        return Ok(false);
    }

    original.run(rest)?;
    restored.run(rest)?;
    Ok(original.state_hash() == restored.state_hash())
}

/// Compute a hash for any hashable value.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of registry determinism.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::components::{Team, UnitClass};
    use skirmish_core::map::{MapFile, MapItem};
    use skirmish_core::math::{Fixed, Vec2Fixed};

    /// Generate a fixed-point number in a reasonable range for positions.
    ///
    /// Range: -500 to 500 (typical arena size)
    pub fn arb_fixed_position() -> impl Strategy<Value = Fixed> {
        (-500i32..500i32).prop_map(Fixed::from_num)
    }

    /// Generate a fixed-point 2D vector for positions.
    pub fn arb_vec2_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_fixed_position(), arb_fixed_position()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate a team.
    pub fn arb_team() -> impl Strategy<Value = Team> {
        prop_oneof![Just(Team::Blue), Just(Team::Red)]
    }

    /// Generate a unit class.
    pub fn arb_unit_class() -> impl Strategy<Value = UnitClass> {
        prop_oneof![
            Just(UnitClass::Base),
            Just(UnitClass::Harvester),
            Just(UnitClass::Fighter),
        ]
    }

    /// Generate one valid map item.
    pub fn arb_map_item() -> impl Strategy<Value = MapItem> {
        let kind = prop_oneof![Just("MINERAL"), Just("BASE"), Just("MININGSHIP"), Just("FIGHTER")];
        let team = prop_oneof![Just("BLUE"), Just("RED")];
        (kind, team, -500i32..500, -500i32..500).prop_map(|(kind, team, x, y)| MapItem {
            kind: Some(kind.to_string()),
            x: Some(f64::from(x)),
            y: Some(f64::from(y)),
            team: (kind != "MINERAL").then(|| team.to_string()),
        })
    }

    /// Generate a valid map with up to `max_items` items.
    pub fn arb_map(max_items: usize) -> impl Strategy<Value = MapFile> {
        proptest::collection::vec(arb_map_item(), 1..max_items).prop_map(|items| MapFile { items })
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::{aggressors, arena_session, duel};
    use proptest::prelude::*;
    use skirmish_core::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        result.assert_deterministic();
        assert_eq!(result.hashes, vec![10, 10, 10]);
    }

    #[test]
    fn test_detects_nondeterminism() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            2,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    fn test_empty_registry_determinism() {
        let result = verify_determinism(
            3,
            20,
            || Session::new(EntityRegistry::default(), TeamControllers::idle()),
            |s| {
                s.step().unwrap();
            },
            Session::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_arena_determinism() {
        let result = verify_determinism(
            3,
            150,
            || arena_session(11),
            |s| {
                s.step().unwrap();
            },
            Session::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_different_seeds_diverge() {
        assert_ne!(arena_session(1).state_hash(), arena_session(2).state_hash());
    }

    #[test]
    fn test_find_divergence_on_deterministic_session() {
        assert_eq!(find_first_divergence(|| arena_session(5), 100), None);
    }

    #[test]
    fn test_parallel_arena_sessions() {
        run_parallel_sessions_scoped(|| arena_session(21), 4, 120).assert_deterministic();
    }

    #[test]
    fn test_parallel_duels() {
        run_parallel_sessions_scoped(|| Session::new(duel(60), aggressors()), 4, 80).assert_deterministic();
    }

    #[test]
    fn test_snapshot_resume_matches() {
        assert!(verify_snapshot_determinism(|| arena_session(8), 40, 60).unwrap());
    }

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash(&(1u8, "x")), compute_hash(&(1u8, "x")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_random_maps_are_deterministic(map in arb_map(24), seed in any::<u64>()) {
            let setup = || {
                let mut registry = EntityRegistry::with_seed(seed, Rules::default());
                registry.load_map(&map).unwrap();
                Session::new(registry, aggressors())
            };
            prop_assert_eq!(find_first_divergence(setup, 60), None);
        }

        #[test]
        fn prop_units_are_created_in_call_order(
            roster in proptest::collection::vec((arb_unit_class(), arb_vec2_position(), arb_team()), 1..20)
        ) {
            let build = || {
                let mut registry = EntityRegistry::default();
                let ids: Vec<EntityId> = roster
                    .iter()
                    .map(|&(class, position, team)| registry.create_unit(class, position, team))
                    .collect();
                (registry, ids)
            };
            let (registry, ids) = build();
            let expected: Vec<EntityId> = (1..).take(roster.len()).collect();
            prop_assert_eq!(&ids, &expected);
            prop_assert_eq!(registry.iter().map(|e| e.id()).collect::<Vec<_>>(), expected);

            for (&id, &(class, position, team)) in ids.iter().zip(&roster) {
                let entity = registry.get(id).unwrap();
                prop_assert_eq!(entity.class(), Some(class));
                prop_assert_eq!(entity.team(), Some(team));
                prop_assert_eq!(entity.position(), position);
            }
            prop_assert_eq!(build().0.state_hash(), registry.state_hash());
        }

        #[test]
        fn prop_offset_only_shifts_positions(map in arb_map(16), seed in any::<u64>()) {
            let mut plain = EntityRegistry::default();
            let mut shifted = EntityRegistry::with_seed(seed, Rules::default());
            let ids = plain.load_map(&map).unwrap();
            prop_assert_eq!(shifted.load_map(&map).unwrap(), ids.clone());

            for id in ids {
                let a = plain.get(id).unwrap().position();
                let b = shifted.get(id).unwrap().position();
                prop_assert_eq!(shifted.undo_offset(b), a);
            }
        }
    }
}
