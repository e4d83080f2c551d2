//! The JSON document produced by one build. The key set is stable and documented:
//! downstream dashboards key off these names, so renames are breaking changes.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::domain::{
    round2, round4, GameResult, MatchupProjection, MatchupStatus, TeamId, TeamMeta,
    TeamProjection, Week,
};
use crate::file;
use crate::mc::MonteCarloSummary;
use crate::overlay::ScenarioSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub season: u32,
    pub generated_at: String,
    pub start_week: Week,
    pub end_week: Week,
    pub projection_sigma: f64,
    pub teams: Vec<TeamMeta>,
    pub team_schedule: BTreeMap<String, Vec<TeamScheduleEntry>>,
    pub weeks: Vec<WeekBlock>,
    pub standings: Vec<StandingsEntry>,
    pub completed_weeks: Vec<Week>,
    pub sources: Sources,
    pub scenario: ScenarioSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<MonteCarloSummary>,
}

impl Dataset {
    /// Writes the dataset as pretty-printed JSON, creating parent directories.
    pub fn write(&self, path: impl AsRef<Path>) -> io::Result<()> {
        file::write_json(path, self)
    }
}

/// Where the build's weeks came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sources {
    pub projections_weeks: Vec<Week>,
    pub completed_weeks: Vec<Week>,
}

/// One row per (team, week): history entries carry a result and raw points, projected
/// entries only the forward-looking fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamScheduleEntry {
    pub week: Week,
    pub matchup_id: String,
    pub opponent_team_id: TeamId,
    pub is_home: bool,
    pub projected_points: f64,
    pub opponent_projected_points: f64,
    pub win_probability: f64,
    pub projected_margin: f64,
    pub is_actual: bool,
    /// `Some(None)` serializes as an explicit null: the week is reconciled but the
    /// matchup has not resolved yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Option<GameResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_actual_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBlock {
    pub week: Week,
    pub matchups: Vec<MatchupDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupDoc {
    pub matchup_id: String,
    pub week: Week,
    pub home: TeamProjection,
    pub away: TeamProjection,
    pub favorite_team_id: Option<TeamId>,
    pub projected_margin: f64,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub is_actual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchupStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<ScorePair>,
}

impl MatchupDoc {
    /// Document for a forward-looking matchup.
    pub fn projected(matchup: &MatchupProjection) -> Self {
        Self {
            matchup_id: matchup.matchup_id.clone(),
            week: matchup.week,
            home: matchup.home.clone(),
            away: matchup.away.clone(),
            favorite_team_id: matchup.favorite_team_id(),
            projected_margin: round2(matchup.projected_margin()),
            home_win_probability: round4(matchup.home_win_probability),
            away_win_probability: round4(matchup.away_win_probability),
            is_actual: false,
            status: None,
            result: None,
            final_score: None,
        }
    }

    /// Document for a reconciled matchup. `results` are per-side and absent while the
    /// matchup is still in flight.
    pub fn actual(
        matchup: &MatchupProjection,
        status: MatchupStatus,
        home_result: Option<GameResult>,
        away_result: Option<GameResult>,
        home_points: f64,
        away_points: f64,
    ) -> Self {
        let mut doc = Self::projected(matchup);
        doc.is_actual = true;
        doc.status = Some(status);
        doc.result = Some(ResultPair {
            home: home_result,
            away: away_result,
        });
        doc.final_score = Some(ScorePair {
            home: round2(home_points),
            away: round2(away_points),
        });
        doc
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPair {
    pub home: Option<GameResult>,
    pub away: Option<GameResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePair {
    pub home: f64,
    pub away: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsEntry {
    pub team: TeamMeta,
    pub projected_record: ProjectedRecord,
    pub projected_points: f64,
    pub average_projected_points: f64,
    pub games_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRecord {
    pub wins: f64,
    pub losses: f64,
    pub ties: f64,
}
