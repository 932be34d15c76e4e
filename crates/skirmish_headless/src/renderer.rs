//! Presentation of a running match.
//!
//! A renderer is called once before the first update and once after every
//! update. It only observes: the registry and statistics it receives are
//! borrowed for the duration of the call.

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use skirmish_core::prelude::*;

/// Observer of a running match.
pub trait Renderer {
    /// Renderer name, for logs.
    fn name(&self) -> &'static str;

    /// Present the current state.
    ///
    /// `winner` is only meaningful when `game_over` is set; the call with
    /// `game_over` set is the last one. Returning `false` stops the match.
    fn render(
        &mut self,
        registry: &EntityRegistry,
        statistics: &Statistics,
        game_over: bool,
        winner: Option<Team>,
    ) -> bool;
}

/// Renderer names accepted by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum RendererKind {
    /// [`DummyRenderer`].
    Dummy,
    /// [`SummaryRenderer`] writing to stdout.
    Summary,
}

impl RendererKind {
    /// Instantiate the renderer. `every` is the summary progress interval.
    #[must_use]
    pub fn build(self, every: u64) -> Box<dyn Renderer> {
        match self {
            Self::Dummy => Box::new(DummyRenderer),
            Self::Summary => Box::new(SummaryRenderer::new(std::io::stdout(), every)),
        }
    }
}

/// Renders nothing and never stops the match.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyRenderer;

impl Renderer for DummyRenderer {
    fn name(&self) -> &'static str {
        "dummy"
    }

    fn render(&mut self, _: &EntityRegistry, _: &Statistics, _: bool, _: Option<Team>) -> bool {
        true
    }
}

/// Unit counts for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    /// Bases alive.
    pub bases: u32,
    /// Harvesters alive.
    pub harvesters: u32,
    /// Fighters alive.
    pub fighters: u32,
}

impl UnitCounts {
    /// Count `team`'s units that are not pending removal.
    #[must_use]
    pub fn count(registry: &EntityRegistry, team: Team) -> Self {
        let mut counts = Self::default();
        for unit in registry.units(team).filter(|u| !u.is_pending_removal()) {
            match unit.class() {
                UnitClass::Base => counts.bases += 1,
                UnitClass::Harvester => counts.harvesters += 1,
                UnitClass::Fighter => counts.fighters += 1,
            }
        }
        counts
    }

    /// All units.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.bases + self.harvesters + self.fighters
    }
}

/// Final state of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    /// `BLUE` or `RED`.
    pub team: String,
    /// Surviving units.
    pub alive: UnitCounts,
    /// Match counters.
    pub stats: TeamStats,
}

/// Post-match summary, printed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Completed update passes.
    pub rounds: u64,
    /// Winning team, `None` for a draw.
    pub winner: Option<String>,
    /// Entities still registered.
    pub entities: usize,
    /// Final registry state hash.
    pub state_hash: u64,
    /// Blue then red.
    pub teams: Vec<TeamSummary>,
}

impl MatchSummary {
    /// Build the summary of the current state.
    #[must_use]
    pub fn collect(registry: &EntityRegistry, statistics: &Statistics, winner: Option<Team>) -> Self {
        Self {
            rounds: statistics.round(),
            winner: winner.map(|team| team.to_string()),
            entities: registry.len(),
            state_hash: registry.state_hash(),
            teams: Team::ALL
                .iter()
                .map(|&team| TeamSummary {
                    team: team.to_string(),
                    alive: UnitCounts::count(registry, team),
                    stats: statistics.team(team).clone(),
                })
                .collect(),
        }
    }
}

/// Logs progress every `every` rounds and writes a JSON [`MatchSummary`]
/// once the match is over.
pub struct SummaryRenderer<W: Write> {
    out: W,
    every: u64,
}

impl<W: Write> SummaryRenderer<W> {
    /// Write the final summary to `out`. An interval of 0 disables progress
    /// lines.
    pub fn new(out: W, every: u64) -> Self {
        Self { out, every }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for SummaryRenderer<W> {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn render(
        &mut self,
        registry: &EntityRegistry,
        statistics: &Statistics,
        game_over: bool,
        winner: Option<Team>,
    ) -> bool {
        let round = statistics.round();
        if !game_over {
            if self.every > 0 && round > 0 && round % self.every == 0 {
                let blue = UnitCounts::count(registry, Team::Blue);
                let red = UnitCounts::count(registry, Team::Red);
                tracing::info!(
                    round,
                    entities = registry.len(),
                    blue = blue.total(),
                    red = red.total(),
                    "Battle in progress"
                );
            }
            return true;
        }

        let summary = MatchSummary::collect(registry, statistics, winner);
        let written = serde_json::to_string_pretty(&summary)
            .map_err(std::io::Error::from)
            .and_then(|json| writeln!(self.out, "{json}"));
        if let Err(e) = written {
            tracing::warn!("Failed to write match summary: {}", e);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::from_num(x, y)
    }

    #[test]
    fn test_counts_skip_dying_units() {
        let mut registry = EntityRegistry::default();
        registry.create_base(p(0, 0), Team::Blue);
        registry.create_fighter(p(5, 0), Team::Blue);
        let doomed = registry.create_fighter(p(9, 0), Team::Blue);
        registry.create_harvester(p(0, 9), Team::Red);
        registry.mark_for_removal(doomed).unwrap();

        let blue = UnitCounts::count(&registry, Team::Blue);
        assert_eq!(blue, UnitCounts { bases: 1, harvesters: 0, fighters: 1 });
        assert_eq!(UnitCounts::count(&registry, Team::Red).total(), 1);
    }

    #[test]
    fn test_summary_written_only_at_game_over() {
        let mut registry = EntityRegistry::default();
        registry.create_base(p(0, 0), Team::Red);
        let statistics = registry.statistics().clone();

        let mut renderer = SummaryRenderer::new(Vec::new(), 1);
        assert!(renderer.render(&registry, &statistics, false, None));
        assert!(!renderer.render(&registry, &statistics, true, Some(Team::Red)));

        let out = renderer.into_inner();
        let summary: MatchSummary = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary.winner.as_deref(), Some("RED"));
        assert_eq!(summary.entities, 1);
        assert_eq!(summary.teams[1].alive.bases, 1);
        assert_eq!(summary.teams[1].stats.created(UnitClass::Base), 1);
        assert_eq!(summary.state_hash, registry.state_hash());
    }

    #[test]
    fn test_dummy_never_stops() {
        let registry = EntityRegistry::default();
        assert!(DummyRenderer.render(&registry, registry.statistics(), true, None));
    }
}
