//! Read access to the tabular league artifacts: teams, schedule, weekly scores,
//! weekly projections, matchup-result snapshots and the live scoreboard.
//!
//! Parsing is deliberately lenient, the way the upstream normalizers emit these tables:
//! numeric fields tolerate float-formatted integers and blanks, boolean flags accept
//! `true`/`1`/`yes` case-insensitively, and rows with an unusable team id are dropped.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::{
    LineupEntry, LineupRow, MatchupResult, ScheduledMatchup, TeamMeta, Week,
};
use crate::file;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("malformed table at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Which column of a lineup table carries the point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsColumn {
    ScoreTotal,
    ProjectedPoints,
}

impl PointsColumn {
    /// The `counts_for_score` default when the flag column is absent: recorded lineups
    /// count by default, projected lineups must be explicitly marked as starting.
    pub fn default_counts_for_score(self) -> bool {
        match self {
            PointsColumn::ScoreTotal => true,
            PointsColumn::ProjectedPoints => false,
        }
    }
}

/// Entry in the live scoreboard feed, used to patch stale matchup-result snapshots.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoreboardEntry {
    pub week: Week,
    pub matchup_id: String,
    #[serde(default)]
    pub home_points: f64,
    #[serde(default)]
    pub away_points: f64,
}

pub struct LeagueStore<'a> {
    config: &'a AppConfig,
}

impl<'a> LeagueStore<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// Loads the team registry in table order. A missing table yields an empty list;
    /// the simulator decides whether that is fatal.
    pub fn load_teams(&self) -> Result<Vec<TeamMeta>, StoreError> {
        let records: Vec<RawTeamRecord> = match read_csv(&self.config.teams_csv())? {
            Some(records) => records,
            None => return Ok(vec![]),
        };
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let team_id = parse_u32(&record.team_id)?;
                Some(TeamMeta {
                    team_id,
                    name: if record.name.trim().is_empty() {
                        "Team".into()
                    } else {
                        record.name.trim().into()
                    },
                    abbrev: non_empty(&record.abbrev),
                    owners: record
                        .owners
                        .split(';')
                        .map(str::trim)
                        .filter(|owner| !owner.is_empty())
                        .map(String::from)
                        .collect(),
                    logo_url: non_empty(&record.logo_url),
                })
            })
            .collect())
    }

    /// Loads the season schedule, dropping rows without usable week or team ids.
    pub fn load_schedule(&self) -> Result<Vec<ScheduledMatchup>, StoreError> {
        let records: Vec<RawScheduleRecord> = match read_csv(&self.config.schedule_csv())? {
            Some(records) => records,
            None => return Ok(vec![]),
        };
        Ok(records
            .into_iter()
            .filter_map(|record| {
                Some(ScheduledMatchup {
                    week: parse_u32(&record.week)?,
                    matchup_id: record.matchup_id.trim().to_string(),
                    home_team_id: parse_u32(&record.home_team_id)?,
                    away_team_id: parse_u32(&record.away_team_id)?,
                })
            })
            .filter(|matchup| !matchup.matchup_id.is_empty())
            .collect())
    }

    /// Recorded lineup rows for a completed (or underway) week; empty when the week has
    /// no score table yet.
    pub fn load_week_scores(&self, week: Week) -> Result<Vec<LineupRow>, StoreError> {
        read_lineup_csv(&self.config.weekly_scores_csv(week), PointsColumn::ScoreTotal)
    }

    /// Projected lineup rows for a week; empty when no projection table exists.
    pub fn load_week_projection(&self, week: Week) -> Result<Vec<LineupRow>, StoreError> {
        read_lineup_csv(
            &self.config.projection_csv(week),
            PointsColumn::ProjectedPoints,
        )
    }

    /// The recorded matchup-result snapshots, keyed by (week, matchup id). Missing or
    /// malformed snapshots degrade to an empty map: results enrich the build, the
    /// schedule and score tables drive it.
    pub fn load_matchup_results(&self) -> FxHashMap<(Week, String), MatchupResult> {
        let path = self.config.matchup_results_json();
        if !path.exists() {
            return FxHashMap::default();
        }
        let doc: MatchupResultsDoc = match file::read_json(&path) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("ignoring malformed matchup results at {}: {err}", path.display());
                return FxHashMap::default();
            }
        };
        doc.schedule
            .into_iter()
            .map(|result| ((result.week, result.matchup_id.clone()), result))
            .collect()
    }

    /// The live scoreboard, when one has been captured; absent or malformed feeds yield
    /// an empty list.
    pub fn load_scoreboard(&self) -> Vec<ScoreboardEntry> {
        let path = self.config.scoreboard_json();
        if !path.exists() {
            return vec![];
        }
        match file::read_json::<ScoreboardDoc>(&path) {
            Ok(doc) => doc.matchups,
            Err(err) => {
                warn!("ignoring malformed scoreboard at {}: {err}", path.display());
                vec![]
            }
        }
    }

    /// Weeks for which a projection table exists, ascending.
    pub fn projection_weeks(&self) -> Vec<Week> {
        file::scan_week_files(
            self.config.projections_dir(),
            "projected_stats_week_",
            ".csv",
        )
    }

    /// Weeks for which a recorded score table exists, ascending.
    pub fn completed_weeks(&self) -> Vec<Week> {
        file::scan_week_files(
            self.config.weekly_scores_dir(),
            "weekly_scores_week_",
            ".csv",
        )
    }
}

#[derive(Debug, Deserialize)]
struct MatchupResultsDoc {
    #[serde(default)]
    schedule: Vec<MatchupResult>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardDoc {
    #[serde(default)]
    matchups: Vec<ScoreboardEntry>,
}

#[derive(Debug, Deserialize)]
struct RawTeamRecord {
    #[serde(default)]
    team_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    abbrev: String,
    #[serde(default)]
    owners: String,
    #[serde(default)]
    logo_url: String,
}

#[derive(Debug, Deserialize)]
struct RawScheduleRecord {
    #[serde(default)]
    week: String,
    #[serde(default)]
    matchup_id: String,
    #[serde(default)]
    home_team_id: String,
    #[serde(default)]
    away_team_id: String,
}

#[derive(Debug, Deserialize)]
struct RawLineupRecord {
    #[serde(default)]
    team_id: String,
    #[serde(default)]
    player_id: String,
    #[serde(default)]
    player_name: String,
    #[serde(default)]
    lineup_slot: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    score_total: String,
    #[serde(default)]
    projected_points: String,
    #[serde(default)]
    counts_for_score: Option<String>,
}

fn read_csv<R: DeserializeOwned>(path: &Path) -> Result<Option<Vec<R>>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    let mut records = vec![];
    for record in reader.deserialize() {
        records.push(record.map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?);
    }
    Ok(Some(records))
}

fn read_lineup_csv(path: &Path, points_column: PointsColumn) -> Result<Vec<LineupRow>, StoreError> {
    let records: Vec<RawLineupRecord> = match read_csv(path)? {
        Some(records) => records,
        None => return Ok(vec![]),
    };
    let default_counts = points_column.default_counts_for_score();
    Ok(records
        .into_iter()
        .filter_map(|record| {
            let team_id = parse_u32(&record.team_id)?;
            let raw_points = match points_column {
                PointsColumn::ScoreTotal => &record.score_total,
                PointsColumn::ProjectedPoints => &record.projected_points,
            };
            Some(LineupRow {
                team_id,
                entry: LineupEntry {
                    player_id: parse_u64(&record.player_id),
                    player_name: record.player_name.trim().to_string(),
                    lineup_slot: record.lineup_slot.trim().to_string(),
                    position: record.position.trim().to_string(),
                    points: parse_f64(raw_points).unwrap_or(0.0),
                    counts_for_score: record
                        .counts_for_score
                        .as_deref()
                        .map(parse_flag)
                        .unwrap_or(default_counts),
                },
            })
        })
        .collect())
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

fn parse_u32(raw: &str) -> Option<u32> {
    let value = parse_f64(raw)?;
    if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_u64(raw: &str) -> Option<u64> {
    let value = parse_f64(raw)?;
    if value.fract() == 0.0 && (0.0..=u64::MAX as f64).contains(&value) {
        Some(value as u64)
    } else {
        None
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
