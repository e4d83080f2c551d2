//! The core data model: teams, lineups, matchups and their projections.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub type TeamId = u32;
pub type Week = u32;

/// League team identity. Immutable once loaded for a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMeta {
    pub team_id: TeamId,
    pub name: String,
    pub abbrev: Option<String>,
    pub owners: Vec<String>,
    pub logo_url: Option<String>,
}

/// One player slot in a weekly lineup. `points` is the actual score or the projection,
/// depending on which table the entry came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupEntry {
    pub player_id: Option<u64>,
    pub player_name: String,
    pub lineup_slot: String,
    pub position: String,
    pub points: f64,
    pub counts_for_score: bool,
}

/// A lineup entry tagged with its team: the row shape shared by the weekly score tables,
/// the projection tables and scenario overlays, so that merge logic is source-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupRow {
    pub team_id: TeamId,
    pub entry: LineupEntry,
}

/// A team's point total for one week, with the lineup split into the entries that count
/// toward the total and those that do not.
///
/// Invariant: `projected_points` equals the sum of the starters' points; bench entries
/// never contribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProjection {
    pub team: TeamMeta,
    pub projected_points: f64,
    pub starters: Vec<LineupEntry>,
    pub bench: Vec<LineupEntry>,
}

/// Two teams' weekly projections paired with model win probabilities (summing to 1).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupProjection {
    pub week: Week,
    pub matchup_id: String,
    pub home: TeamProjection,
    pub away: TeamProjection,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
}

impl MatchupProjection {
    /// The team the model favors; `None` on an exact tie.
    pub fn favorite_team_id(&self) -> Option<TeamId> {
        if self.home_win_probability > self.away_win_probability {
            Some(self.home.team.team_id)
        } else if self.away_win_probability > self.home_win_probability {
            Some(self.away.team.team_id)
        } else {
            None
        }
    }

    pub fn projected_margin(&self) -> f64 {
        self.home.projected_points - self.away.projected_points
    }
}

/// One scheduled game. `matchup_id` is unique within a week and stable across data sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMatchup {
    pub week: Week,
    pub matchup_id: String,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

/// Recorded winner flag in a matchup-result snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Winner {
    Home,
    Away,
    Tie,
}

/// Outcome of a reconciled matchup from one team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

impl GameResult {
    pub fn opposite(self) -> GameResult {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            GameResult::Tie => GameResult::Tie,
        }
    }
}

/// Resolution state of a recorded matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchupStatus {
    Final,
    InProgress,
    Scheduled,
}

/// Raw matchup-result snapshot: recorded or live scores plus an optional winner flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupResult {
    pub week: Week,
    pub matchup_id: String,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    #[serde(default)]
    pub home_points: f64,
    #[serde(default)]
    pub away_points: f64,
    #[serde(default)]
    pub winner: Option<Winner>,
}

impl MatchupResult {
    /// An explicit winner flag means the matchup is final; points on the board without one
    /// mean it is underway; otherwise it has not started.
    pub fn status(&self) -> MatchupStatus {
        if self.winner.is_some() {
            MatchupStatus::Final
        } else if self.home_points != 0.0 || self.away_points != 0.0 {
            MatchupStatus::InProgress
        } else {
            MatchupStatus::Scheduled
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
