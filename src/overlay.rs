//! Scenario overlays: sparse, user-edited "what if" substitutions for lineups and
//! matchup results, keyed by (season, scenario id).
//!
//! Overlay files are advisory. They are parsed and validated in a single pass into typed
//! structures here; malformed sections degrade to "no override for this scope" so the rest
//! of the engine never re-validates shapes. The reserved `baseline` id is always the empty
//! overlay and never needs a backing file.

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::domain::{LineupEntry, LineupRow, TeamId, Week, Winner};
use crate::file;
use crate::store::PointsColumn;

pub const BASELINE_SCENARIO_ID: &str = "baseline";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioMetadata {
    pub scenario_id: String,
    pub season: u32,
    pub label: Option<String>,
    pub description: Option<String>,
    pub path: Option<PathBuf>,
    pub updated_at: Option<String>,
    pub is_default: bool,
}

impl ScenarioMetadata {
    pub fn label_or_id(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.scenario_id)
    }

    pub fn is_baseline(&self) -> bool {
        self.scenario_id == BASELINE_SCENARIO_ID
    }
}

/// Matchup-level result substitution. Fields are patched individually; lineup-derived team
/// totals and these scores are never reconciled against each other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchupOverride {
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub home_points: Option<f64>,
    pub away_points: Option<f64>,
    pub winner: Option<Winner>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletedWeekOverride {
    pub team_lineups: FxHashMap<TeamId, Vec<LineupRow>>,
    pub matchups: FxHashMap<String, MatchupOverride>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectionWeekOverride {
    pub team_lineups: FxHashMap<TeamId, Vec<LineupRow>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOverlay {
    pub metadata: ScenarioMetadata,
    pub completed_weeks: FxHashMap<Week, CompletedWeekOverride>,
    pub projection_weeks: FxHashMap<Week, ProjectionWeekOverride>,
}

impl ScenarioOverlay {
    /// The empty overlay for a scenario id: baseline semantics, no substitutions.
    pub fn empty(season: u32, scenario_id: &str) -> Self {
        let is_baseline = scenario_id == BASELINE_SCENARIO_ID;
        Self {
            metadata: ScenarioMetadata {
                scenario_id: scenario_id.to_string(),
                season,
                label: is_baseline.then(|| "Baseline".to_string()),
                description: is_baseline
                    .then(|| "League data as recorded (no overrides)".to_string()),
                path: None,
                updated_at: None,
                is_default: is_baseline,
            },
            completed_weeks: FxHashMap::default(),
            projection_weeks: FxHashMap::default(),
        }
    }

    pub fn baseline(season: u32) -> Self {
        Self::empty(season, BASELINE_SCENARIO_ID)
    }

    pub fn completed_week(&self, week: Week) -> Option<&CompletedWeekOverride> {
        self.completed_weeks.get(&week)
    }

    pub fn projection_week(&self, week: Week) -> Option<&ProjectionWeekOverride> {
        self.projection_weeks.get(&week)
    }

    pub fn summary(&self) -> ScenarioSummary {
        let mut completed: Vec<Week> = self.completed_weeks.keys().copied().collect();
        completed.sort_unstable();
        let mut projection: Vec<Week> = self.projection_weeks.keys().copied().collect();
        projection.sort_unstable();
        ScenarioSummary {
            scenario_id: self.metadata.scenario_id.clone(),
            season: self.metadata.season,
            label: self.metadata.label.clone(),
            completed_weeks: completed,
            projection_weeks: projection,
        }
    }
}

/// The `scenario{}` block of the output dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    pub scenario_id: String,
    pub season: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub completed_weeks: Vec<Week>,
    pub projection_weeks: Vec<Week>,
}

/// File-backed overlay storage for a season.
pub struct OverlayStore<'a> {
    config: &'a AppConfig,
}

impl<'a> OverlayStore<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// Loads a scenario overlay. `None`, the reserved baseline id, a missing file and an
    /// unreadable file all yield an empty overlay: scenarios must degrade to baseline
    /// behavior rather than fail the build.
    pub fn load(&self, scenario_id: Option<&str>) -> ScenarioOverlay {
        let scenario_id = scenario_id.unwrap_or(BASELINE_SCENARIO_ID);
        if scenario_id == BASELINE_SCENARIO_ID {
            return ScenarioOverlay::empty(self.config.season, scenario_id);
        }

        let path = self.config.overlay_json(scenario_id);
        if !path.exists() {
            debug!("no overlay file at {}; using baseline data", path.display());
            return ScenarioOverlay::empty(self.config.season, scenario_id);
        }
        let raw: Value = match file::read_json(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("ignoring unreadable overlay at {}: {err}", path.display());
                return ScenarioOverlay::empty(self.config.season, scenario_id);
            }
        };
        parse_overlay(&raw, scenario_id, self.config.season, path)
    }

    /// All scenarios known for the configured season, the synthetic baseline entry
    /// included. Baseline sorts last; the rest sort by display label.
    pub fn list(&self) -> Vec<ScenarioMetadata> {
        let mut items = vec![];
        if let Ok(entries) = std::fs::read_dir(self.config.overlays_dir()) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    continue;
                }
                let raw: Value = match file::read_json(&path) {
                    Ok(raw) => raw,
                    Err(_) => continue,
                };
                let stem = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or_default()
                    .to_string();
                items.push(parse_metadata(&raw, &stem, self.config.season, path));
            }
        }
        items.push(ScenarioOverlay::baseline(self.config.season).metadata);
        items.sort_by(|a, b| {
            (a.is_baseline(), a.label_or_id().to_lowercase())
                .cmp(&(b.is_baseline(), b.label_or_id().to_lowercase()))
        });
        items
    }
}

fn parse_metadata(raw: &Value, fallback_id: &str, season: u32, path: PathBuf) -> ScenarioMetadata {
    ScenarioMetadata {
        scenario_id: raw
            .get("scenario_id")
            .and_then(Value::as_str)
            .unwrap_or(fallback_id)
            .to_string(),
        season,
        label: string_field(raw, "label"),
        description: string_field(raw, "description"),
        path: Some(path),
        updated_at: string_field(raw, "updated_at"),
        is_default: raw
            .get("is_default")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn parse_overlay(raw: &Value, scenario_id: &str, season: u32, path: PathBuf) -> ScenarioOverlay {
    if !raw.is_object() {
        warn!(
            "overlay at {} is not a JSON object; using baseline data",
            path.display()
        );
        return ScenarioOverlay::empty(season, scenario_id);
    }

    let metadata = parse_metadata(raw, scenario_id, season, path);

    let mut completed_weeks = FxHashMap::default();
    if let Some(weeks) = raw.get("completed_weeks").and_then(Value::as_object) {
        for (week_key, payload) in weeks {
            let (Some(week), Some(payload)) = (parse_week_key(week_key), payload.as_object())
            else {
                continue;
            };
            let mut over = CompletedWeekOverride {
                team_lineups: parse_team_lineups(payload.get("teams"), PointsColumn::ScoreTotal),
                matchups: FxHashMap::default(),
            };
            if let Some(matchups) = payload.get("matchups").and_then(Value::as_object) {
                for (matchup_id, matchup_payload) in matchups {
                    let Some(matchup_payload) = matchup_payload.as_object() else {
                        continue;
                    };
                    over.matchups.insert(
                        matchup_id.clone(),
                        MatchupOverride {
                            home_team_id: matchup_payload.get("home_team_id").and_then(coerce_u32),
                            away_team_id: matchup_payload.get("away_team_id").and_then(coerce_u32),
                            home_points: matchup_payload.get("home_points").and_then(coerce_f64),
                            away_points: matchup_payload.get("away_points").and_then(coerce_f64),
                            winner: matchup_payload
                                .get("winner")
                                .and_then(Value::as_str)
                                .and_then(|raw| raw.trim().to_uppercase().parse().ok()),
                        },
                    );
                }
            }
            completed_weeks.insert(week, over);
        }
    }

    let mut projection_weeks = FxHashMap::default();
    let projection_payload = raw
        .get("projection_weeks")
        .or_else(|| raw.get("projections"));
    if let Some(weeks) = projection_payload.and_then(Value::as_object) {
        for (week_key, payload) in weeks {
            let (Some(week), Some(payload)) = (parse_week_key(week_key), payload.as_object())
            else {
                continue;
            };
            projection_weeks.insert(
                week,
                ProjectionWeekOverride {
                    team_lineups: parse_team_lineups(
                        payload.get("teams"),
                        PointsColumn::ProjectedPoints,
                    ),
                },
            );
        }
    }

    ScenarioOverlay {
        metadata,
        completed_weeks,
        projection_weeks,
    }
}

fn parse_team_lineups(
    teams: Option<&Value>,
    points_column: PointsColumn,
) -> FxHashMap<TeamId, Vec<LineupRow>> {
    let mut lineups = FxHashMap::default();
    let Some(teams) = teams.and_then(Value::as_object) else {
        return lineups;
    };
    for (team_key, payload) in teams {
        let Some(team_id) = team_key.trim().parse::<TeamId>().ok() else {
            continue;
        };
        // a team payload is either {"entries": [...]} or the bare entry array
        let entries = match payload {
            Value::Object(map) => map.get("entries").and_then(Value::as_array),
            Value::Array(entries) => Some(entries),
            _ => None,
        };
        let Some(entries) = entries else {
            continue;
        };
        let rows: Vec<LineupRow> = entries
            .iter()
            .filter_map(|entry| parse_lineup_entry(entry, team_id, points_column))
            .collect();
        lineups.insert(team_id, rows);
    }
    lineups
}

fn parse_lineup_entry(
    entry: &Value,
    team_id: TeamId,
    points_column: PointsColumn,
) -> Option<LineupRow> {
    let entry = entry.as_object()?;
    let (value_key, other_key) = match points_column {
        PointsColumn::ScoreTotal => ("score_total", "projected_points"),
        PointsColumn::ProjectedPoints => ("projected_points", "score_total"),
    };
    let points = entry
        .get(value_key)
        .and_then(coerce_f64)
        .or_else(|| entry.get("points").and_then(coerce_f64))
        .or_else(|| entry.get(other_key).and_then(coerce_f64))
        .unwrap_or(0.0);
    Some(LineupRow {
        team_id,
        entry: LineupEntry {
            player_id: entry.get("player_id").and_then(coerce_u64),
            player_name: entry
                .get("player_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            lineup_slot: entry
                .get("lineup_slot")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            position: entry
                .get("position")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            points,
            counts_for_score: entry
                .get("counts_for_score")
                .and_then(coerce_bool)
                .unwrap_or(points_column.default_counts_for_score()),
        },
    })
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

fn parse_week_key(key: &str) -> Option<Week> {
    key.trim().parse().ok()
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_u32(value: &Value) -> Option<TeamId> {
    let value = coerce_f64(value)?;
    if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as TeamId)
    } else {
        None
    }
}

fn coerce_u64(value: &Value) -> Option<u64> {
    let value = coerce_f64(value)?;
    if value.fract() == 0.0 && (0.0..=u64::MAX as f64).contains(&value) {
        Some(value as u64)
    } else {
        None
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|value| value != 0.0),
        Value::String(raw) => Some(matches!(
            raw.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        )),
        _ => None,
    }
}
