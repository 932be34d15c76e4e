//! Match statistics.
//!
//! The registry reports unit creations, losses, launches and hits here.
//! Nothing in the simulation reads these numbers back; they exist for the
//! presentation layer and post-match summaries.

use serde::{Deserialize, Serialize};

use crate::components::{Team, UnitClass};

/// Counters for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamStats {
    /// Units created, indexed by [`UnitClass::index`].
    pub created: [u32; 3],
    /// Units erased after dying, indexed by [`UnitClass::index`].
    pub lost: [u32; 3],
    /// Projectiles launched.
    pub missiles_launched: u32,
    /// Projectile hits landed, including hits on targets already at zero life.
    pub hits: u32,
    /// Minerals extracted from resource nodes.
    pub minerals_extracted: u64,
}

impl TeamStats {
    /// Units of `class` created so far.
    #[must_use]
    pub const fn created(&self, class: UnitClass) -> u32 {
        self.created[class.index()]
    }

    /// Units of `class` lost so far.
    #[must_use]
    pub const fn lost(&self, class: UnitClass) -> u32 {
        self.lost[class.index()]
    }
}

/// Statistics for a whole match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statistics {
    round: u64,
    teams: [TeamStats; 2],
}

impl Statistics {
    /// Create empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed update passes.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Counters for `team`.
    #[must_use]
    pub const fn team(&self, team: Team) -> &TeamStats {
        &self.teams[team.index()]
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamStats {
        &mut self.teams[team.index()]
    }

    pub(crate) fn round_completed(&mut self) {
        self.round += 1;
    }

    pub(crate) fn unit_created(&mut self, team: Team, class: UnitClass) {
        self.team_mut(team).created[class.index()] += 1;
    }

    pub(crate) fn unit_lost(&mut self, team: Team, class: UnitClass) {
        self.team_mut(team).lost[class.index()] += 1;
    }

    pub(crate) fn missile_launched(&mut self, team: Team) {
        self.team_mut(team).missiles_launched += 1;
    }

    pub(crate) fn hit_landed(&mut self, team: Team) {
        self.team_mut(team).hits += 1;
    }

    pub(crate) fn minerals_extracted(&mut self, team: Team, amount: u32) {
        self.team_mut(team).minerals_extracted += u64::from(amount);
    }
}
