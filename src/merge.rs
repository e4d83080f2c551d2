//! Pure merge functions that layer scenario overrides and live scores over the base
//! tables. Every function returns (or rebuilds) new collections; the loaded source data
//! is never mutated in place, so one base table can back any number of scenario builds.

use rustc_hash::FxHashMap;

use crate::domain::{LineupRow, MatchupResult, TeamId, Week};
use crate::overlay::MatchupOverride;
use crate::store::ScoreboardEntry;

/// Applies per-team lineup overrides to a week's lineup rows.
///
/// Overrides operate at team granularity: a team present in `overrides` has **all** of its
/// base rows replaced by the override rows (even when they are fewer, or none). Teams not
/// mentioned pass through unchanged. Replacement rows are appended in ascending team-id
/// order so merged output is reproducible.
pub fn apply_lineup_overrides(
    base: Vec<LineupRow>,
    overrides: &FxHashMap<TeamId, Vec<LineupRow>>,
) -> Vec<LineupRow> {
    if overrides.is_empty() {
        return base;
    }
    let mut merged: Vec<LineupRow> = base
        .into_iter()
        .filter(|row| !overrides.contains_key(&row.team_id))
        .collect();
    let mut replaced: Vec<&TeamId> = overrides.keys().collect();
    replaced.sort_unstable();
    for team_id in replaced {
        merged.extend(overrides[team_id].iter().cloned());
    }
    merged
}

/// Patches matchup-result rows with matchup-level overrides for one week.
///
/// Fields are overridden individually: an override may set the final score without naming a
/// winner, or vice versa. Lineup-derived team totals and these scores are deliberately not
/// reconciled; a scenario that edits both must keep them consistent itself. An override for
/// a matchup with no recorded row creates one only when it carries both team ids and both
/// point totals.
pub fn apply_matchup_overrides(
    results: &mut FxHashMap<(Week, String), MatchupResult>,
    week: Week,
    overrides: &FxHashMap<String, MatchupOverride>,
) {
    for (matchup_id, over) in overrides {
        let key = (week, matchup_id.clone());
        if let Some(result) = results.get_mut(&key) {
            if let Some(home_team_id) = over.home_team_id {
                result.home_team_id = home_team_id;
            }
            if let Some(away_team_id) = over.away_team_id {
                result.away_team_id = away_team_id;
            }
            if let Some(home_points) = over.home_points {
                result.home_points = home_points;
            }
            if let Some(away_points) = over.away_points {
                result.away_points = away_points;
            }
            if let Some(winner) = over.winner {
                result.winner = Some(winner);
            }
        } else if let (Some(home_team_id), Some(away_team_id), Some(home_points), Some(away_points)) = (
            over.home_team_id,
            over.away_team_id,
            over.home_points,
            over.away_points,
        ) {
            results.insert(
                key,
                MatchupResult {
                    week,
                    matchup_id: matchup_id.clone(),
                    home_team_id,
                    away_team_id,
                    home_points,
                    away_points,
                    winner: over.winner,
                },
            );
        }
    }
}

/// Enriches matchup-result rows from a live scoreboard capture.
///
/// Live points overwrite stored points only while the stored row is not terminal (no winner
/// flag) or where the stored side is still zero; a finalized score is never clobbered by
/// stale live data.
pub fn enrich_with_scoreboard(
    results: &mut FxHashMap<(Week, String), MatchupResult>,
    scoreboard: &[ScoreboardEntry],
) {
    for live in scoreboard {
        let key = (live.week, live.matchup_id.clone());
        let Some(result) = results.get_mut(&key) else {
            continue;
        };
        if result.winner.is_none() {
            result.home_points = live.home_points;
            result.away_points = live.away_points;
        } else {
            if result.home_points == 0.0 {
                result.home_points = live.home_points;
            }
            if result.away_points == 0.0 {
                result.away_points = live.away_points;
            }
        }
    }
}
