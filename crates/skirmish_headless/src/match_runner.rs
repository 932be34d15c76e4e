//! Match orchestration.
//!
//! Drives the registry tick by tick, checks for a winner after every pass
//! and reports the result through [`Outcome::exit_code`].

use std::path::PathBuf;

use skirmish_core::prelude::*;
use thiserror::Error;

use crate::renderer::{Renderer, UnitCounts};

/// Process exit code for a match that could not be set up.
pub const SETUP_FAILURE_EXIT_CODE: i32 = -1;

/// Error type for match setup.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The rules file could not be loaded.
    #[error("Cannot load rules: {0}")]
    Rules(#[from] RulesError),
    /// The map could not be loaded.
    #[error("Cannot load map: {0}")]
    Map(#[from] MapError),
}

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No winner.
    Draw,
    /// The other team was eliminated.
    Victory(Team),
    /// `loser`'s decision logic failed.
    Forfeit {
        /// Team whose logic failed.
        loser: Team,
        /// Failure reported by the logic.
        message: String,
    },
}

impl Outcome {
    /// The winning team, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<Team> {
        match self {
            Self::Draw => None,
            Self::Victory(team) => Some(*team),
            Self::Forfeit { loser, .. } => Some(loser.opponent()),
        }
    }

    /// Process exit code: 0 draw, 1/2 blue/red wins, 11/12 blue/red forfeits.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Draw => 0,
            Self::Victory(Team::Blue) => 1,
            Self::Victory(Team::Red) => 2,
            Self::Forfeit { loser: Team::Blue, .. } => 11,
            Self::Forfeit { loser: Team::Red, .. } => 12,
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    /// At least one team has no units left.
    Elimination,
    /// A decision fault.
    Forfeit,
    /// The tick limit was reached.
    TickLimit,
    /// The renderer asked to stop.
    Stopped,
}

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    /// Final outcome.
    pub outcome: Outcome,
    /// Why the loop stopped.
    pub end: MatchEnd,
    /// Update passes run, including a faulted one.
    pub rounds: u64,
    /// Registry state hash after the last pass.
    pub state_hash: u64,
}

/// Decide whether the match is over from the registry alone.
///
/// A team is eliminated when it has no unit left that is not pending
/// removal. Returns `None` while both teams still have units.
#[must_use]
pub fn victory_check(registry: &EntityRegistry) -> Option<Outcome> {
    let alive = |team| UnitCounts::count(registry, team).total() > 0;
    match (alive(Team::Blue), alive(Team::Red)) {
        (true, true) => None,
        (true, false) => Some(Outcome::Victory(Team::Blue)),
        (false, true) => Some(Outcome::Victory(Team::Red)),
        (false, false) => Some(Outcome::Draw),
    }
}

/// Everything needed to set up a match from files.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// RON map file.
    pub map: PathBuf,
    /// Optional RON rules file; built-in rules otherwise.
    pub rules: Option<PathBuf>,
    /// Seed for the world offset.
    pub seed: u64,
    /// Stop with a draw after this many passes.
    pub max_ticks: Option<u64>,
}

/// A match in progress.
pub struct Match {
    registry: EntityRegistry,
    controllers: TeamControllers,
    max_ticks: Option<u64>,
    tick: u64,
}

impl Match {
    /// Wrap an already populated registry.
    #[must_use]
    pub fn new(registry: EntityRegistry, controllers: TeamControllers, max_ticks: Option<u64>) -> Self {
        Self {
            registry,
            controllers,
            max_ticks,
            tick: 0,
        }
    }

    /// Load rules and map from `config`.
    pub fn setup(config: &MatchConfig, controllers: TeamControllers) -> std::result::Result<Self, SetupError> {
        let rules = match &config.rules {
            Some(path) => Rules::load(path)?,
            None => Rules::default(),
        };
        let mut registry = EntityRegistry::with_seed(config.seed, rules);
        registry.load_map_file(&config.map)?;
        tracing::info!(
            map = %config.map.display(),
            seed = config.seed,
            entities = registry.len(),
            "Match ready"
        );
        Ok(Self::new(registry, controllers, config.max_ticks))
    }

    /// The world.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Play until the match ends.
    ///
    /// Renders once before the first pass and after every pass.
    ///
    /// # Errors
    ///
    /// Registry errors other than decision faults abort the match.
    pub fn run(&mut self, renderer: &mut dyn Renderer) -> Result<MatchReport> {
        tracing::info!(renderer = renderer.name(), "Battle started");

        let mut result = victory_check(&self.registry).map(|outcome| (outcome, MatchEnd::Elimination));
        let mut keep_going = self.render(renderer, result.as_ref());

        while result.is_none() {
            if !keep_going {
                result = Some((Outcome::Draw, MatchEnd::Stopped));
                break;
            }

            let tick = self.tick;
            self.tick += 1;
            result = match self.registry.update(tick, &mut self.controllers) {
                Ok(_) => victory_check(&self.registry).map(|outcome| (outcome, MatchEnd::Elimination)),
                Err(GameError::DecisionFault { team, entity, message }) => {
                    tracing::warn!(%team, entity, "Decision logic failed: {}", message);
                    Some((Outcome::Forfeit { loser: team, message }, MatchEnd::Forfeit))
                }
                Err(e) => return Err(e),
            };
            if result.is_none() && self.max_ticks.is_some_and(|max| self.tick >= max) {
                result = Some((Outcome::Draw, MatchEnd::TickLimit));
            }

            keep_going = self.render(renderer, result.as_ref());
        }

        let (outcome, end) = result.unwrap_or((Outcome::Draw, MatchEnd::Stopped));
        tracing::info!(rounds = self.tick, ?end, ?outcome, "Battle over");
        Ok(MatchReport {
            outcome,
            end,
            rounds: self.tick,
            state_hash: self.registry.state_hash(),
        })
    }

    fn render(&self, renderer: &mut dyn Renderer, result: Option<&(Outcome, MatchEnd)>) -> bool {
        let winner = result.and_then(|(outcome, _)| outcome.winner());
        renderer.render(&self.registry, self.registry.statistics(), result.is_some(), winner)
    }
}
