//! The Monte Carlo playoff estimator.
//!
//! Every iteration starts from the same reconciled baseline and replays each
//! forward-looking matchup in week order, drawing one uniform number per matchup against
//! its home-win probability. Seeds are then assigned by (wins, points) descending and
//! aggregated into playoff odds and a full seed distribution. The iteration loop is a
//! single RNG stream so that a fixed seed reproduces the run bit for bit.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;
use tinyrand::Rand;

use crate::domain::{round2, round3, MatchupProjection, TeamId, TeamMeta};

#[derive(Debug, Error)]
pub enum McError {
    #[error("iterations must be positive when the Monte Carlo estimator is requested")]
    NoIterations,
}

/// A team's starting position: whole wins/losses/points carried in from final matchups.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaselineRecord {
    pub wins: f64,
    pub losses: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub iterations: u32,
    pub playoff_slots: usize,
    pub random_seed: Option<u64>,
    pub teams: Vec<TeamOdds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamOdds {
    pub team: TeamMeta,
    pub average_wins: f64,
    pub average_losses: f64,
    pub average_points: f64,
    pub games_remaining: u32,
    pub playoff_odds: f64,
    pub top_seed_odds: f64,
    /// seed → fraction of iterations landing on that seed; values sum to 1.
    pub seed_distribution: BTreeMap<usize, f64>,
    pub best_seed: usize,
    pub worst_seed: usize,
    /// Smallest seed whose cumulative frequency reaches one half.
    pub median_seed: usize,
}

pub struct MonteCarloEngine<'a> {
    teams: &'a [TeamMeta],
    matchups: &'a [MatchupProjection],
    baseline: &'a FxHashMap<TeamId, BaselineRecord>,
    future_games: &'a FxHashMap<TeamId, u32>,
    playoff_slots: usize,
    random_seed: Option<u64>,
}

struct Game {
    home: usize,
    away: usize,
    home_points: f64,
    away_points: f64,
    home_prob: f64,
}

#[derive(Clone)]
struct Aggregate {
    win_total: f64,
    loss_total: f64,
    points_total: f64,
    seed_counts: Vec<u64>,
    playoff_count: u64,
    top_seed_count: u64,
    best_seed: usize,
    worst_seed: usize,
}

impl<'a> MonteCarloEngine<'a> {
    /// `matchups` must already be in week order; the replay preserves their order so a
    /// fixed seed reproduces the run.
    pub fn new(
        teams: &'a [TeamMeta],
        matchups: &'a [MatchupProjection],
        baseline: &'a FxHashMap<TeamId, BaselineRecord>,
        future_games: &'a FxHashMap<TeamId, u32>,
        playoff_slots: usize,
        random_seed: Option<u64>,
    ) -> Self {
        Self {
            teams,
            matchups,
            baseline,
            future_games,
            playoff_slots,
            random_seed,
        }
    }

    pub fn run(&self, iterations: u32, rand: &mut impl Rand) -> Result<MonteCarloSummary, McError> {
        if iterations == 0 {
            return Err(McError::NoIterations);
        }

        let team_count = self.teams.len();
        let index: FxHashMap<TeamId, usize> = self
            .teams
            .iter()
            .enumerate()
            .map(|(slot, team)| (team.team_id, slot))
            .collect();
        let games: Vec<Game> = self
            .matchups
            .iter()
            .filter_map(|matchup| {
                Some(Game {
                    home: *index.get(&matchup.home.team.team_id)?,
                    away: *index.get(&matchup.away.team.team_id)?,
                    home_points: matchup.home.projected_points,
                    away_points: matchup.away.projected_points,
                    home_prob: matchup.home_win_probability,
                })
            })
            .collect();

        let mut base_wins = vec![0.0; team_count];
        let mut base_losses = vec![0.0; team_count];
        let mut base_points = vec![0.0; team_count];
        for (slot, team) in self.teams.iter().enumerate() {
            if let Some(record) = self.baseline.get(&team.team_id) {
                base_wins[slot] = record.wins;
                base_losses[slot] = record.losses;
                base_points[slot] = record.points;
            }
        }

        let mut aggregates = vec![
            Aggregate {
                win_total: 0.0,
                loss_total: 0.0,
                points_total: 0.0,
                seed_counts: vec![0; team_count],
                playoff_count: 0,
                top_seed_count: 0,
                best_seed: usize::MAX,
                worst_seed: 0,
            };
            team_count
        ];

        for _ in 0..iterations {
            let mut wins = base_wins.clone();
            let mut losses = base_losses.clone();
            let mut points = base_points.clone();

            for game in &games {
                points[game.home] += game.home_points;
                points[game.away] += game.away_points;
                if random_f64(rand) < game.home_prob {
                    wins[game.home] += 1.0;
                    losses[game.away] += 1.0;
                } else {
                    wins[game.away] += 1.0;
                    losses[game.home] += 1.0;
                }
            }

            // (wins desc, points desc); the stable sort keeps team order on full ties
            let mut ranking: Vec<usize> = (0..team_count).collect();
            ranking.sort_by(|&a, &b| {
                wins[b]
                    .total_cmp(&wins[a])
                    .then(points[b].total_cmp(&points[a]))
            });

            for (rank, &slot) in ranking.iter().enumerate() {
                let seed = rank + 1;
                let agg = &mut aggregates[slot];
                agg.win_total += wins[slot];
                agg.loss_total += losses[slot];
                agg.points_total += points[slot];
                agg.seed_counts[rank] += 1;
                if seed <= self.playoff_slots {
                    agg.playoff_count += 1;
                }
                if seed == 1 {
                    agg.top_seed_count += 1;
                }
                agg.best_seed = agg.best_seed.min(seed);
                agg.worst_seed = agg.worst_seed.max(seed);
            }
        }

        let iterations_f = f64::from(iterations);
        let mut teams_payload: Vec<TeamOdds> = self
            .teams
            .iter()
            .zip(aggregates)
            .map(|(team, agg)| {
                let seed_distribution: BTreeMap<usize, f64> = agg
                    .seed_counts
                    .iter()
                    .enumerate()
                    .filter(|(_, &count)| count > 0)
                    .map(|(rank, &count)| (rank + 1, count as f64 / iterations_f))
                    .collect();
                let mut cumulative = 0.0;
                let mut median_seed = 0;
                for (&seed, &fraction) in &seed_distribution {
                    cumulative += fraction;
                    if cumulative >= 0.5 {
                        median_seed = seed;
                        break;
                    }
                }
                TeamOdds {
                    team: team.clone(),
                    average_wins: round3(agg.win_total / iterations_f),
                    average_losses: round3(agg.loss_total / iterations_f),
                    average_points: round2(agg.points_total / iterations_f),
                    games_remaining: self
                        .future_games
                        .get(&team.team_id)
                        .copied()
                        .unwrap_or(0),
                    playoff_odds: agg.playoff_count as f64 / iterations_f,
                    top_seed_odds: agg.top_seed_count as f64 / iterations_f,
                    seed_distribution,
                    best_seed: agg.best_seed,
                    worst_seed: agg.worst_seed,
                    median_seed,
                }
            })
            .collect();
        teams_payload.sort_by(|a, b| b.playoff_odds.total_cmp(&a.playoff_odds));

        Ok(MonteCarloSummary {
            iterations,
            playoff_slots: self.playoff_slots,
            random_seed: self.random_seed,
            teams: teams_payload,
        })
    }
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}
