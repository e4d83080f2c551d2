use std::fs;
use std::path::PathBuf;

use assert_float_eq::*;

use super::*;

fn scratch_config(name: &str) -> AppConfig {
    let root: PathBuf = std::env::temp_dir().join("gridcast-sim-tests").join(name);
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    AppConfig::new(root, 2025)
}

fn write(path: PathBuf, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_teams(config: &AppConfig) {
    write(
        config.teams_csv(),
        "team_id,name,abbrev,owners,logo_url\n\
         1,Alpha Squad,ALP,Alice,http://logo/alpha.png\n\
         2,Beta Crew,BET,Bob,http://logo/beta.png\n",
    );
}

fn write_schedule(config: &AppConfig) {
    write(
        config.schedule_csv(),
        "week,matchup_id,home_team_id,away_team_id\n\
         1,101,1,2\n\
         2,201,2,1\n",
    );
}

fn write_projection_weeks(config: &AppConfig) {
    write(
        config.projection_csv(1),
        "team_id,player_id,player_name,lineup_slot,position,projected_points,counts_for_score\n\
         1,11,Alpha QB,QB,QB,18.5,TRUE\n\
         1,12,Alpha RB,RB,RB,12.0,TRUE\n\
         2,21,Beta QB,QB,QB,19.0,TRUE\n\
         2,22,Beta WR,WR,WR,16.0,TRUE\n",
    );
    write(
        config.projection_csv(2),
        "team_id,player_id,player_name,lineup_slot,position,projected_points,counts_for_score\n\
         1,13,Alpha WR,WR,WR,17.5,TRUE\n\
         1,14,Alpha FLEX,FLEX,RB,11.2,TRUE\n\
         2,23,Beta RB,RB,RB,10.0,TRUE\n\
         2,24,Beta FLEX,FLEX,WR,13.3,TRUE\n",
    );
}

fn write_week1_scores(config: &AppConfig) {
    write(
        config.weekly_scores_csv(1),
        "team_id,player_id,player_name,lineup_slot,position,score_total,counts_for_score\n\
         1,11,Player One,QB,QB,120.0,TRUE\n\
         2,21,Player Two,QB,QB,110.0,TRUE\n",
    );
}

fn write_week1_result(config: &AppConfig, home_points: f64, away_points: f64, winner: &str) {
    let winner_field = if winner.is_empty() {
        "null".to_string()
    } else {
        format!("\"{winner}\"")
    };
    write(
        config.matchup_results_json(),
        &format!(
            r#"{{"schedule": [
                {{"week": 1, "matchup_id": "101", "home_team_id": 1, "away_team_id": 2,
                  "home_points": {home_points}, "away_points": {away_points},
                  "winner": {winner_field}}}
            ]}}"#
        ),
    );
}

#[test]
fn builds_a_two_week_projection_dataset() {
    let config = scratch_config("two-weeks");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);

    let simulator = RestOfSeasonSimulator::new(&config);
    let dataset = simulator
        .build_dataset(&SimOptions {
            start_week: Some(1),
            end_week: Some(2),
            ..SimOptions::default()
        })
        .unwrap();

    assert_eq!(1, dataset.start_week);
    assert_eq!(2, dataset.end_week);
    assert_eq!(2, dataset.weeks.len());
    assert!(dataset.monte_carlo.is_none());
    assert!(dataset.completed_weeks.is_empty());

    let week1 = &dataset.weeks[0];
    assert_eq!(1, week1.week);
    let matchup = &week1.matchups[0];
    assert_f64_near!(30.5, matchup.home.projected_points);
    assert_f64_near!(35.0, matchup.away.projected_points);
    assert_eq!("Alpha QB", matchup.home.starters[0].player_name);
    assert_eq!(Some(2), matchup.favorite_team_id);
    assert!(!matchup.is_actual);
    assert!(matchup.home_win_probability < 0.5);
    assert_f64_near!(
        1.0,
        matchup.home_win_probability + matchup.away_win_probability,
        16
    );

    let schedule_keys: Vec<&str> = dataset.team_schedule.keys().map(String::as_str).collect();
    assert_eq!(vec!["1", "2"], schedule_keys);
    let alpha_schedule = &dataset.team_schedule["1"];
    assert_eq!(2, alpha_schedule.len());
    assert_eq!(2, alpha_schedule[0].opponent_team_id);
    assert!(alpha_schedule[0].is_home);
    assert!(!alpha_schedule[1].is_home);
    assert!(alpha_schedule.iter().all(|entry| !entry.is_actual));

    assert_eq!(2, dataset.standings.len());
    let alpha = dataset
        .standings
        .iter()
        .find(|entry| entry.team.team_id == 1)
        .unwrap();
    let beta = dataset
        .standings
        .iter()
        .find(|entry| entry.team.team_id == 2)
        .unwrap();
    assert_float_absolute_eq!(30.5 + 28.7, alpha.projected_points, 1e-9);
    assert_float_absolute_eq!(35.0 + 23.3, beta.projected_points, 1e-9);
    assert_eq!(2, alpha.games_remaining);

    // fractional records: each team's wins and losses sum to the games played
    assert_float_absolute_eq!(
        2.0,
        alpha.projected_record.wins + alpha.projected_record.losses,
        1e-6
    );
}

#[test]
fn default_start_week_skips_completed_weeks() {
    let config = scratch_config("default-start");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);
    write(
        config.weekly_scores_csv(1),
        "team_id,player_name,lineup_slot,position,score_total\n\
         1,Player One,QB,QB,120\n",
    );

    let simulator = RestOfSeasonSimulator::new(&config);
    let dataset = simulator.build_dataset(&SimOptions::default()).unwrap();

    assert_eq!(2, dataset.start_week);
    assert_eq!(2, dataset.end_week);
    assert_eq!(vec![1], dataset.completed_weeks);
    // week 1 has no recorded matchup result, so it leaves a gap rather than a block
    assert_eq!(1, dataset.weeks.len());
    assert_eq!(2, dataset.weeks[0].week);
}

#[test]
fn monte_carlo_summary_is_deterministic_at_zero_sigma() {
    let config = scratch_config("mc-deterministic");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);

    let simulator = RestOfSeasonSimulator::new(&config);
    let options = SimOptions {
        start_week: Some(1),
        end_week: Some(2),
        sigma: 0.0,
        iterations: 200,
        playoff_slots: 1,
        random_seed: Some(123),
        ..SimOptions::default()
    };
    let dataset = simulator.build_dataset(&options).unwrap();

    let monte_carlo = dataset.monte_carlo.as_ref().unwrap();
    assert_eq!(200, monte_carlo.iterations);
    assert_eq!(1, monte_carlo.playoff_slots);
    assert_eq!(Some(123), monte_carlo.random_seed);

    let alpha = monte_carlo
        .teams
        .iter()
        .find(|odds| odds.team.team_id == 1)
        .unwrap();
    let beta = monte_carlo
        .teams
        .iter()
        .find(|odds| odds.team.team_id == 2)
        .unwrap();

    // at zero sigma both teams go 1-1 every trial; Alpha takes the points tiebreaker
    assert_f64_near!(1.0, alpha.playoff_odds);
    assert_f64_near!(0.0, beta.playoff_odds);
    assert_f64_near!(1.0, alpha.seed_distribution[&1]);
    assert_f64_near!(1.0, beta.seed_distribution[&2]);
    assert_f64_near!(1.0, alpha.average_wins);
    assert_f64_near!(1.0, beta.average_wins);

    // a second run with the same seed reproduces the summary exactly
    let again = simulator.build_dataset(&options).unwrap();
    assert_eq!(dataset.monte_carlo, again.monte_carlo);
}

#[test]
fn reconciled_weeks_contribute_whole_results() {
    let config = scratch_config("history");
    write_teams(&config);
    write_schedule(&config);
    write_week1_scores(&config);
    write(
        config.weekly_scores_csv(2),
        "team_id,player_name,lineup_slot,position,score_total,counts_for_score\n\
         1,Player One,QB,QB,95.0,TRUE\n\
         2,Player Two,QB,QB,99.0,TRUE\n",
    );
    write(
        config.matchup_results_json(),
        r#"{"schedule": [
            {"week": 1, "matchup_id": "101", "home_team_id": 1, "away_team_id": 2,
             "home_points": 120.0, "away_points": 110.0, "winner": "HOME"},
            {"week": 2, "matchup_id": "201", "home_team_id": 2, "away_team_id": 1,
             "home_points": 99.0, "away_points": 95.0, "winner": "HOME"}
        ]}"#,
    );
    // the lone week-3 projection covers one side only, so the matchup is skipped and
    // nothing fractional leaks into the standings
    write(
        config.projection_csv(3),
        "team_id,player_name,lineup_slot,position,projected_points,counts_for_score\n\
         1,Alpha QB,QB,QB,20.0,TRUE\n",
    );
    write(
        config.schedule_csv(),
        "week,matchup_id,home_team_id,away_team_id\n\
         1,101,1,2\n\
         2,201,2,1\n\
         3,301,1,2\n",
    );

    let simulator = RestOfSeasonSimulator::new(&config);
    let dataset = simulator.build_dataset(&SimOptions::default()).unwrap();

    assert_eq!(3, dataset.start_week);
    assert_eq!(vec![1, 2], dataset.completed_weeks);

    let alpha = dataset
        .standings
        .iter()
        .find(|entry| entry.team.team_id == 1)
        .unwrap();
    let beta = dataset
        .standings
        .iter()
        .find(|entry| entry.team.team_id == 2)
        .unwrap();
    assert_eq!(1.0, alpha.projected_record.wins);
    assert_eq!(1.0, alpha.projected_record.losses);
    assert_eq!(0.0, alpha.projected_record.ties);
    assert_eq!(1.0, beta.projected_record.wins);
    assert_eq!(1.0, beta.projected_record.losses);
    assert_f64_near!(215.0, alpha.projected_points);
    assert_f64_near!(209.0, beta.projected_points);
    // average per counted game
    assert_f64_near!(107.5, alpha.average_projected_points);

    let alpha_schedule = &dataset.team_schedule["1"];
    assert_eq!(2, alpha_schedule.len());
    assert_eq!(Some(Some(GameResult::Win)), alpha_schedule[0].result);
    assert_eq!(Some(Some(GameResult::Loss)), alpha_schedule[1].result);
    assert_eq!(Some(120.0), alpha_schedule[0].actual_points);
    assert_f64_near!(1.0, alpha_schedule[0].win_probability);

    let week1_doc = &dataset.weeks[0].matchups[0];
    assert!(week1_doc.is_actual);
    assert_eq!(Some(MatchupStatus::Final), week1_doc.status);
    assert_eq!(120.0, week1_doc.final_score.as_ref().unwrap().home);
}

#[test]
fn in_flight_matchups_report_even_odds_and_no_result() {
    let config = scratch_config("in-flight");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);
    write_week1_scores(&config);
    // points on the board, no winner flag: the matchup is underway
    write_week1_result(&config, 55.0, 40.0, "");

    let simulator = RestOfSeasonSimulator::new(&config);
    let dataset = simulator
        .build_dataset(&SimOptions {
            start_week: Some(2),
            ..SimOptions::default()
        })
        .unwrap();

    let alpha_schedule = &dataset.team_schedule["1"];
    let live = &alpha_schedule[0];
    assert!(live.is_actual);
    assert_eq!(Some(None), live.result);
    assert_eq!(0.5, live.win_probability);
    assert_eq!(Some(55.0), live.actual_points);

    let doc = &dataset.weeks[0].matchups[0];
    assert_eq!(Some(MatchupStatus::InProgress), doc.status);
    assert_eq!(None, doc.result.as_ref().unwrap().home);

    // nothing tallies until the matchup is final: only projected week 2 contributes
    let alpha = dataset
        .standings
        .iter()
        .find(|entry| entry.team.team_id == 1)
        .unwrap();
    let games_counted = alpha.projected_record.wins + alpha.projected_record.losses;
    assert_float_absolute_eq!(1.0, games_counted, 1e-6);
    assert_float_absolute_eq!(28.7, alpha.projected_points, 1e-9);
}

#[test]
fn live_scoreboard_fills_in_stale_snapshots() {
    let config = scratch_config("scoreboard");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);
    write_week1_scores(&config);
    write_week1_result(&config, 0.0, 0.0, "");
    write(
        config.scoreboard_json(),
        r#"{"matchups": [
            {"week": 1, "matchup_id": "101", "home_points": 62.5, "away_points": 48.0}
        ]}"#,
    );

    let simulator = RestOfSeasonSimulator::new(&config);
    let dataset = simulator
        .build_dataset(&SimOptions {
            start_week: Some(2),
            ..SimOptions::default()
        })
        .unwrap();

    let live = &dataset.team_schedule["1"][0];
    assert_eq!(Some(62.5), live.actual_points);
    assert_eq!(Some(None), live.result);
    assert_eq!(
        Some(MatchupStatus::InProgress),
        dataset.weeks[0].matchups[0].status
    );
}

#[test]
fn scenario_overlay_rewrites_history_transparently() {
    let config = scratch_config("scenario");
    write_teams(&config);
    write_schedule(&config);
    write_week1_scores(&config);
    write_week1_result(&config, 120.0, 110.0, "HOME");
    write(
        config.projection_csv(2),
        "team_id,player_name,lineup_slot,position,projected_points,counts_for_score\n\
         1,Alpha WR,WR,WR,17.5,TRUE\n\
         2,Beta RB,RB,RB,10.0,TRUE\n",
    );
    write(
        config.overlay_json("blowout"),
        r#"{
            "scenario_id": "blowout",
            "label": "Blowout",
            "completed_weeks": {
                "1": {
                    "matchups": {
                        "101": {"home_points": 150.0, "away_points": 90.0, "winner": "HOME"}
                    }
                }
            }
        }"#,
    );

    let simulator = RestOfSeasonSimulator::new(&config);

    let scenario = simulator
        .build_dataset(&SimOptions {
            scenario: Some("blowout".to_string()),
            ..SimOptions::default()
        })
        .unwrap();
    let entry = &scenario.team_schedule["1"][0];
    assert_eq!(Some(150.0), entry.actual_points);
    assert_eq!(Some(Some(GameResult::Win)), entry.result);
    assert_eq!("blowout", scenario.scenario.scenario_id);
    assert_eq!(vec![1], scenario.scenario.completed_weeks);

    // the baseline rebuild still reports the recorded score: the overlay never touched it
    let baseline = simulator.build_dataset(&SimOptions::default()).unwrap();
    let entry = &baseline.team_schedule["1"][0];
    assert_eq!(Some(120.0), entry.actual_points);
    assert_eq!(Some(Some(GameResult::Win)), entry.result);
}

#[test]
fn baseline_scenario_id_matches_omitting_the_scenario() {
    let config = scratch_config("baseline-transparent");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);
    write_week1_scores(&config);
    write_week1_result(&config, 120.0, 110.0, "HOME");

    let simulator = RestOfSeasonSimulator::new(&config);
    let options = SimOptions {
        iterations: 50,
        random_seed: Some(9),
        ..SimOptions::default()
    };
    let implicit = simulator.build_dataset(&options).unwrap();
    let explicit = simulator
        .build_dataset(&SimOptions {
            scenario: Some("baseline".to_string()),
            ..options
        })
        .unwrap();

    let mut implicit_json = serde_json::to_value(&implicit).unwrap();
    let mut explicit_json = serde_json::to_value(&explicit).unwrap();
    implicit_json["generated_at"] = serde_json::Value::Null;
    explicit_json["generated_at"] = serde_json::Value::Null;
    assert_eq!(implicit_json, explicit_json);
}

#[test]
fn overlay_replaces_only_the_mentioned_team() {
    let config = scratch_config("full-replacement");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);
    write(
        config.overlay_json("swap"),
        r#"{
            "scenario_id": "swap",
            "projection_weeks": {
                "1": {
                    "teams": {
                        "1": {"entries": [
                            {"player_name": "Alpha Star", "projected_points": 44.0,
                             "counts_for_score": true}
                        ]}
                    }
                }
            }
        }"#,
    );

    let simulator = RestOfSeasonSimulator::new(&config);
    let options = SimOptions {
        start_week: Some(1),
        end_week: Some(2),
        ..SimOptions::default()
    };
    let swapped = simulator
        .build_dataset(&SimOptions {
            scenario: Some("swap".to_string()),
            ..options.clone()
        })
        .unwrap();

    let week1 = &swapped.weeks[0].matchups[0];
    // team 1's lineup is entirely replaced by the single override entry
    assert_f64_near!(44.0, week1.home.projected_points);
    assert_eq!(1, week1.home.starters.len());
    assert_eq!("Alpha Star", week1.home.starters[0].player_name);
    // team 2 passes through from the base table untouched
    assert_f64_near!(35.0, week1.away.projected_points);
    assert_eq!(2, week1.away.starters.len());

    // dropping the overlay reverts team 1 to exactly the base rows
    let reverted = simulator.build_dataset(&options).unwrap();
    let week1 = &reverted.weeks[0].matchups[0];
    assert_f64_near!(30.5, week1.home.projected_points);
    assert_eq!(2, week1.home.starters.len());
}

#[test]
fn missing_prerequisites_are_fatal_with_remediation() {
    let config = scratch_config("missing-teams");
    let simulator = RestOfSeasonSimulator::new(&config);
    let err = simulator.build_dataset(&SimOptions::default()).unwrap_err();
    assert!(matches!(err, SimError::MissingTeams { season: 2025, .. }));
    assert!(err.to_string().contains("ingest league data"));

    write_teams(&config);
    let err = simulator.build_dataset(&SimOptions::default()).unwrap_err();
    assert!(matches!(err, SimError::MissingSchedule { .. }));

    write_schedule(&config);
    let err = simulator.build_dataset(&SimOptions::default()).unwrap_err();
    assert!(matches!(err, SimError::MissingProjections { .. }));
}

#[test]
fn inverted_week_range_is_rejected() {
    let config = scratch_config("bad-range");
    write_teams(&config);
    write_schedule(&config);
    write_projection_weeks(&config);

    let simulator = RestOfSeasonSimulator::new(&config);
    let err = simulator
        .build_dataset(&SimOptions {
            start_week: Some(5),
            end_week: Some(2),
            ..SimOptions::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidWeekRange { start: 5, end: 2 }
    ));

    let err = simulator
        .build_dataset(&SimOptions {
            start_week: Some(7),
            end_week: Some(9),
            ..SimOptions::default()
        })
        .unwrap_err();
    assert!(matches!(err, SimError::EmptyWeekRange { start: 7, end: 9 }));
}
