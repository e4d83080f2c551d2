//! Rolls weekly lineup rows up into one projection per team.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::domain::{round2, LineupEntry, LineupRow, TeamId, TeamMeta, TeamProjection};

/// Builds a [`TeamProjection`] for every team present in `rows`.
///
/// Entries flagged `counts_for_score` become starters and their points sum to the team
/// total; the rest ride the bench and never contribute. Both lists order by points
/// descending with a stable sort, so entries on equal points keep their source order.
/// Rows referencing a team id absent from `teams` are dropped: stale ids must not
/// invent teams. Pure function of its inputs.
pub fn summarize(
    teams: &FxHashMap<TeamId, TeamMeta>,
    rows: &[LineupRow],
) -> FxHashMap<TeamId, TeamProjection> {
    let mut grouped: FxHashMap<TeamId, Vec<&LineupRow>> = FxHashMap::default();
    for row in rows {
        if !teams.contains_key(&row.team_id) {
            continue;
        }
        grouped.entry(row.team_id).or_default().push(row);
    }

    grouped
        .into_iter()
        .map(|(team_id, team_rows)| {
            let mut starters: Vec<LineupEntry> = vec![];
            let mut bench: Vec<LineupEntry> = vec![];
            let mut total_points = 0.0;

            for row in team_rows {
                let entry = LineupEntry {
                    points: round2(row.entry.points),
                    ..row.entry.clone()
                };
                if entry.counts_for_score {
                    total_points += row.entry.points;
                    starters.push(entry);
                } else {
                    bench.push(entry);
                }
            }

            sort_by_points_descending(&mut starters);
            sort_by_points_descending(&mut bench);

            let projection = TeamProjection {
                team: teams[&team_id].clone(),
                projected_points: round2(total_points),
                starters,
                bench,
            };
            (team_id, projection)
        })
        .collect()
}

fn sort_by_points_descending(entries: &mut [LineupEntry]) {
    entries.sort_by(|a, b| b.points.partial_cmp(&a.points).unwrap_or(Ordering::Equal));
}
