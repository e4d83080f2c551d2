//! The rest-of-season simulator: reconciles completed weeks into a standings baseline,
//! projects the remaining schedule deterministically, and (optionally) estimates playoff
//! odds by Monte Carlo.
//!
//! A week is reconciled if and only if it lies strictly before the first projected week
//! and a recorded score table exists for it; every other requested week is projected.
//! Within a reconciled week, only matchups in a terminal state contribute wins, losses,
//! ties and points to the baseline; matchups still in flight appear in the output with a
//! neutral 0.5/0.5 probability and no result.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tinyrand::{Seeded, StdRand};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::dataset::{
    Dataset, MatchupDoc, ProjectedRecord, Sources, StandingsEntry, TeamScheduleEntry, WeekBlock,
};
use crate::domain::{
    round2, round3, GameResult, MatchupProjection, MatchupStatus, TeamId, TeamMeta, Week, Winner,
};
use crate::mc::{BaselineRecord, McError, MonteCarloEngine};
use crate::merge;
use crate::overlay::OverlayStore;
use crate::store::{LeagueStore, StoreError};
use crate::summary::summarize;
use crate::winprob;

pub const DEFAULT_SIGMA: f64 = 18.0;
pub const DEFAULT_ITERATIONS: u32 = 500;
pub const DEFAULT_PLAYOFF_SLOTS: usize = 4;

const TIE_EPSILON: f64 = 1e-6;

/// Caller-facing knobs for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct SimOptions {
    pub start_week: Option<Week>,
    pub end_week: Option<Week>,
    /// Point-spread standard deviation feeding the win-probability model.
    pub sigma: f64,
    /// Monte Carlo trials; zero omits the Monte Carlo section entirely.
    pub iterations: u32,
    pub playoff_slots: usize,
    pub random_seed: Option<u64>,
    /// Scenario overlay id; `None` and `"baseline"` both mean unmodified league data.
    pub scenario: Option<String>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            start_week: None,
            end_week: None,
            sigma: DEFAULT_SIGMA,
            iterations: 0,
            playoff_slots: DEFAULT_PLAYOFF_SLOTS,
            random_seed: None,
            scenario: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no team table at {path}; ingest league data for season {season} first")]
    MissingTeams { season: u32, path: PathBuf },

    #[error("no schedule table at {path}; ingest league data for season {season} first")]
    MissingSchedule { season: u32, path: PathBuf },

    #[error("no projection tables under {dir}; build weekly projections for season {season} first")]
    MissingProjections { season: u32, dir: PathBuf },

    #[error("start_week {start} must not exceed end_week {end}")]
    InvalidWeekRange { start: Week, end: Week },

    #[error("no projection tables fall within weeks {start}-{end}")]
    EmptyWeekRange { start: Week, end: Week },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    MonteCarlo(#[from] McError),
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    wins: f64,
    losses: f64,
    ties: f64,
    points: f64,
}

pub struct RestOfSeasonSimulator<'a> {
    config: &'a AppConfig,
    store: LeagueStore<'a>,
    overlays: OverlayStore<'a>,
}

impl<'a> RestOfSeasonSimulator<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            store: LeagueStore::new(config),
            overlays: OverlayStore::new(config),
        }
    }

    /// Builds one self-contained dataset for the configured season. Constructed fresh on
    /// every call; the underlying tables are never mutated.
    pub fn build_dataset(&self, options: &SimOptions) -> Result<Dataset, SimError> {
        let season = self.config.season;

        let teams = self.store.load_teams()?;
        if teams.is_empty() {
            return Err(SimError::MissingTeams {
                season,
                path: self.config.teams_csv(),
            });
        }
        let team_index: FxHashMap<TeamId, TeamMeta> = teams
            .iter()
            .map(|team| (team.team_id, team.clone()))
            .collect();

        let schedule = self.store.load_schedule()?;
        if schedule.is_empty() {
            return Err(SimError::MissingSchedule {
                season,
                path: self.config.schedule_csv(),
            });
        }

        let projection_weeks = self.store.projection_weeks();
        if projection_weeks.is_empty() {
            return Err(SimError::MissingProjections {
                season,
                dir: self.config.projections_dir(),
            });
        }
        let completed_weeks = self.store.completed_weeks();

        let effective_start = options
            .start_week
            .unwrap_or_else(|| default_start_week(&projection_weeks, &completed_weeks));
        let effective_end = options
            .end_week
            .unwrap_or_else(|| *projection_weeks.last().unwrap_or(&effective_start));
        if effective_start > effective_end {
            return Err(SimError::InvalidWeekRange {
                start: effective_start,
                end: effective_end,
            });
        }

        let weeks_to_process: Vec<Week> = projection_weeks
            .iter()
            .copied()
            .filter(|week| (effective_start..=effective_end).contains(week))
            .collect();
        if weeks_to_process.is_empty() {
            return Err(SimError::EmptyWeekRange {
                start: effective_start,
                end: effective_end,
            });
        }
        let history_weeks: Vec<Week> = completed_weeks
            .iter()
            .copied()
            .filter(|&week| week < effective_start)
            .collect();

        let overlay = self.overlays.load(options.scenario.as_deref());
        info!(
            "building season {season} dataset: weeks {}-{}, {} reconciled, scenario {}",
            effective_start,
            effective_end,
            history_weeks.len(),
            overlay.metadata.scenario_id
        );

        let mut results = self.store.load_matchup_results();
        merge::enrich_with_scoreboard(&mut results, &self.store.load_scoreboard());
        for (&week, week_override) in &overlay.completed_weeks {
            merge::apply_matchup_overrides(&mut results, week, &week_override.matchups);
        }

        let mut tracker: FxHashMap<TeamId, Tally> = teams
            .iter()
            .map(|team| (team.team_id, Tally::default()))
            .collect();
        let mut team_schedule: FxHashMap<TeamId, Vec<TeamScheduleEntry>> = teams
            .iter()
            .map(|team| (team.team_id, vec![]))
            .collect();
        let mut actual_weeks: BTreeMap<Week, Vec<MatchupDoc>> = BTreeMap::new();
        let mut future_weeks: BTreeMap<Week, Vec<MatchupProjection>> = BTreeMap::new();
        let mut matchup_rows: Vec<MatchupProjection> = vec![];

        // phase 1: history reconciliation
        for &week in &history_weeks {
            let scores = self.store.load_week_scores(week)?;
            let scores = match overlay.completed_week(week) {
                Some(week_override) => {
                    merge::apply_lineup_overrides(scores, &week_override.team_lineups)
                }
                None => scores,
            };
            if scores.is_empty() {
                debug!("week {week}: no recorded lineups, leaving a gap");
                continue;
            }
            let team_actuals = summarize(&team_index, &scores);

            for matchup in schedule.iter().filter(|matchup| matchup.week == week) {
                let key = (week, matchup.matchup_id.clone());
                let (Some(result), Some(home_actual), Some(away_actual)) = (
                    results.get(&key),
                    team_actuals.get(&matchup.home_team_id),
                    team_actuals.get(&matchup.away_team_id),
                ) else {
                    debug!(
                        "week {week}: skipping matchup {} with incomplete data",
                        matchup.matchup_id
                    );
                    continue;
                };

                let home_points = result.home_points;
                let away_points = result.away_points;
                let margin = home_points - away_points;
                let status = result.status();

                let (home_prob, home_result) = match (status, result.winner) {
                    (MatchupStatus::Final, Some(Winner::Home)) => (1.0, Some(GameResult::Win)),
                    (MatchupStatus::Final, Some(Winner::Away)) => (0.0, Some(GameResult::Loss)),
                    (MatchupStatus::Final, Some(Winner::Tie)) => (0.5, Some(GameResult::Tie)),
                    // in flight or not started: neutral placeholder, no result yet
                    _ => (0.5, None),
                };
                let away_prob = 1.0 - home_prob;
                let away_result = home_result.map(GameResult::opposite);

                if status == MatchupStatus::Final {
                    let home_tally = tracker.entry(matchup.home_team_id).or_default();
                    home_tally.points += home_points;
                    match home_result {
                        Some(GameResult::Win) => home_tally.wins += 1.0,
                        Some(GameResult::Loss) => home_tally.losses += 1.0,
                        _ => home_tally.ties += 1.0,
                    }
                    let away_tally = tracker.entry(matchup.away_team_id).or_default();
                    away_tally.points += away_points;
                    match away_result {
                        Some(GameResult::Win) => away_tally.wins += 1.0,
                        Some(GameResult::Loss) => away_tally.losses += 1.0,
                        _ => away_tally.ties += 1.0,
                    }
                }

                let mut home_projection = home_actual.clone();
                home_projection.projected_points = round2(home_points);
                let mut away_projection = away_actual.clone();
                away_projection.projected_points = round2(away_points);

                let schedule_rows = team_schedule.entry(matchup.home_team_id).or_default();
                schedule_rows.push(TeamScheduleEntry {
                    week,
                    matchup_id: matchup.matchup_id.clone(),
                    opponent_team_id: matchup.away_team_id,
                    is_home: true,
                    projected_points: home_points,
                    opponent_projected_points: away_points,
                    win_probability: home_prob,
                    projected_margin: margin,
                    is_actual: true,
                    result: Some(home_result),
                    actual_points: Some(home_points),
                    opponent_actual_points: Some(away_points),
                });
                let schedule_rows = team_schedule.entry(matchup.away_team_id).or_default();
                schedule_rows.push(TeamScheduleEntry {
                    week,
                    matchup_id: matchup.matchup_id.clone(),
                    opponent_team_id: matchup.home_team_id,
                    is_home: false,
                    projected_points: away_points,
                    opponent_projected_points: home_points,
                    win_probability: away_prob,
                    projected_margin: -margin,
                    is_actual: true,
                    result: Some(away_result),
                    actual_points: Some(away_points),
                    opponent_actual_points: Some(home_points),
                });

                let projection = MatchupProjection {
                    week,
                    matchup_id: matchup.matchup_id.clone(),
                    home: home_projection,
                    away: away_projection,
                    home_win_probability: home_prob,
                    away_win_probability: away_prob,
                };
                actual_weeks.entry(week).or_default().push(MatchupDoc::actual(
                    &projection,
                    status,
                    home_result,
                    away_result,
                    home_points,
                    away_points,
                ));
            }
        }

        let base_records: FxHashMap<TeamId, BaselineRecord> = tracker
            .iter()
            .map(|(&team_id, tally)| {
                (
                    team_id,
                    BaselineRecord {
                        wins: tally.wins,
                        losses: tally.losses,
                        points: tally.points,
                    },
                )
            })
            .collect();

        // phase 2: forward projection
        for &week in &weeks_to_process {
            let projections = self.store.load_week_projection(week)?;
            let projections = match overlay.projection_week(week) {
                Some(week_override) => {
                    merge::apply_lineup_overrides(projections, &week_override.team_lineups)
                }
                None => projections,
            };
            if projections.is_empty() {
                debug!("week {week}: no projection rows, leaving a gap");
                continue;
            }
            let team_projections = summarize(&team_index, &projections);

            for matchup in schedule.iter().filter(|matchup| matchup.week == week) {
                let (Some(home_projection), Some(away_projection)) = (
                    team_projections.get(&matchup.home_team_id),
                    team_projections.get(&matchup.away_team_id),
                ) else {
                    debug!(
                        "week {week}: skipping matchup {} with a missing side",
                        matchup.matchup_id
                    );
                    continue;
                };

                let (home_prob, away_prob) = winprob::estimate(
                    home_projection.projected_points,
                    away_projection.projected_points,
                    options.sigma,
                );
                let projection = MatchupProjection {
                    week,
                    matchup_id: matchup.matchup_id.clone(),
                    home: home_projection.clone(),
                    away: away_projection.clone(),
                    home_win_probability: home_prob,
                    away_win_probability: away_prob,
                };

                let home_tally = tracker.entry(matchup.home_team_id).or_default();
                home_tally.wins += home_prob;
                home_tally.losses += away_prob;
                home_tally.points += home_projection.projected_points;
                if (home_prob - away_prob).abs() < TIE_EPSILON {
                    home_tally.ties += 1.0;
                }
                let away_tally = tracker.entry(matchup.away_team_id).or_default();
                away_tally.wins += away_prob;
                away_tally.losses += home_prob;
                away_tally.points += away_projection.projected_points;
                if (home_prob - away_prob).abs() < TIE_EPSILON {
                    away_tally.ties += 1.0;
                }

                let margin = projection.projected_margin();
                let schedule_rows = team_schedule.entry(matchup.home_team_id).or_default();
                schedule_rows.push(TeamScheduleEntry {
                    week,
                    matchup_id: matchup.matchup_id.clone(),
                    opponent_team_id: matchup.away_team_id,
                    is_home: true,
                    projected_points: projection.home.projected_points,
                    opponent_projected_points: projection.away.projected_points,
                    win_probability: home_prob,
                    projected_margin: margin,
                    is_actual: false,
                    result: None,
                    actual_points: None,
                    opponent_actual_points: None,
                });
                let schedule_rows = team_schedule.entry(matchup.away_team_id).or_default();
                schedule_rows.push(TeamScheduleEntry {
                    week,
                    matchup_id: matchup.matchup_id.clone(),
                    opponent_team_id: matchup.home_team_id,
                    is_home: false,
                    projected_points: projection.away.projected_points,
                    opponent_projected_points: projection.home.projected_points,
                    win_probability: away_prob,
                    projected_margin: -margin,
                    is_actual: false,
                    result: None,
                    actual_points: None,
                    opponent_actual_points: None,
                });

                future_weeks
                    .entry(week)
                    .or_default()
                    .push(projection.clone());
                matchup_rows.push(projection);
            }
        }

        matchup_rows.sort_by(|a, b| (a.week, &a.matchup_id).cmp(&(b.week, &b.matchup_id)));
        for entries in team_schedule.values_mut() {
            entries.sort_by_key(|entry| entry.week);
        }
        let future_games: FxHashMap<TeamId, u32> = team_schedule
            .iter()
            .map(|(&team_id, entries)| {
                (
                    team_id,
                    entries.iter().filter(|entry| !entry.is_actual).count() as u32,
                )
            })
            .collect();

        let mut standings: Vec<StandingsEntry> = teams
            .iter()
            .map(|team| {
                let tally = tracker.get(&team.team_id).copied().unwrap_or_default();
                let games = tally.wins + tally.losses;
                let average = if games > 0.0 { tally.points / games } else { 0.0 };
                StandingsEntry {
                    team: team.clone(),
                    projected_record: ProjectedRecord {
                        wins: round3(tally.wins),
                        losses: round3(tally.losses),
                        ties: round3(tally.ties),
                    },
                    projected_points: round2(tally.points),
                    average_projected_points: round2(average),
                    games_remaining: future_games.get(&team.team_id).copied().unwrap_or(0),
                }
            })
            .collect();
        standings.sort_by(|a, b| {
            b.projected_record
                .wins
                .total_cmp(&a.projected_record.wins)
                .then(b.projected_points.total_cmp(&a.projected_points))
        });

        let all_weeks: BTreeSet<Week> = history_weeks
            .iter()
            .chain(weeks_to_process.iter())
            .copied()
            .collect();
        let mut weeks_payload: Vec<WeekBlock> = vec![];
        for week in all_weeks {
            if let Some(matchups) = actual_weeks.remove(&week) {
                weeks_payload.push(WeekBlock { week, matchups });
            } else if let Some(matchups) = future_weeks.remove(&week) {
                let matchups: Vec<MatchupDoc> =
                    matchups.iter().map(MatchupDoc::projected).collect();
                if !matchups.is_empty() {
                    weeks_payload.push(WeekBlock { week, matchups });
                }
            }
        }

        let mut dataset = Dataset {
            season,
            generated_at: Utc::now().to_rfc3339(),
            start_week: weeks_to_process[0],
            end_week: weeks_to_process[weeks_to_process.len() - 1],
            projection_sigma: options.sigma,
            teams: teams.clone(),
            team_schedule: team_schedule
                .into_iter()
                .map(|(team_id, entries)| (team_id.to_string(), entries))
                .collect(),
            weeks: weeks_payload,
            standings,
            completed_weeks: history_weeks.clone(),
            sources: Sources {
                projections_weeks: weeks_to_process,
                completed_weeks: history_weeks,
            },
            scenario: overlay.summary(),
            monte_carlo: None,
        };

        if options.iterations > 0 {
            let engine = MonteCarloEngine::new(
                &teams,
                &matchup_rows,
                &base_records,
                &future_games,
                options.playoff_slots,
                options.random_seed,
            );
            let mut rand = StdRand::seed(options.random_seed.unwrap_or_else(clock_seed));
            dataset.monte_carlo = Some(engine.run(options.iterations, &mut rand)?);
        }

        Ok(dataset)
    }
}

/// First projected week after the last reconciled one; the earliest projection week when
/// nothing is completed yet (or nothing projects beyond the completed weeks).
fn default_start_week(projection_weeks: &[Week], completed_weeks: &[Week]) -> Week {
    let Some(&last_completed) = completed_weeks.last() else {
        return projection_weeks[0];
    };
    projection_weeks
        .iter()
        .copied()
        .find(|&week| week > last_completed)
        .unwrap_or(projection_weeks[0])
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests;
