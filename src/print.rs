//! Console tables for datasets and scenario listings.

use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use crate::dataset::Dataset;
use crate::mc::MonteCarloSummary;
use crate::overlay::ScenarioMetadata;

pub fn tabulate_standings(dataset: &Dataset) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(14)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Team".into(),
                "W-L-T".into(),
                "Points".into(),
                "Avg".into(),
                "Left".into(),
            ],
        ));
    for entry in &dataset.standings {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                entry.team.name.clone().into(),
                format!(
                    "{:.1}-{:.1}-{:.1}",
                    entry.projected_record.wins,
                    entry.projected_record.losses,
                    entry.projected_record.ties
                )
                .into(),
                format!("{:.2}", entry.projected_points).into(),
                format!("{:.2}", entry.average_projected_points).into(),
                format!("{}", entry.games_remaining).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_monte_carlo(summary: &MonteCarloSummary) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(7)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Team".into(),
                "Avg W".into(),
                "Avg Pts".into(),
                "Playoff".into(),
                "Top seed".into(),
                "Best".into(),
                "Median".into(),
                "Worst".into(),
            ],
        ));
    for odds in &summary.teams {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                odds.team.name.clone().into(),
                format!("{:.2}", odds.average_wins).into(),
                format!("{:.1}", odds.average_points).into(),
                format!("{:.1}%", odds.playoff_odds * 100.0).into(),
                format!("{:.1}%", odds.top_seed_odds * 100.0).into(),
                format!("{}", odds.best_seed).into(),
                format!("{}", odds.median_seed).into(),
                format!("{}", odds.worst_seed).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_scenarios(scenarios: &[ScenarioMetadata]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(14)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Scenario".into(),
                "Label".into(),
                "Default".into(),
                "Updated".into(),
            ],
        ));
    for scenario in scenarios {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                scenario.scenario_id.clone().into(),
                scenario.label_or_id().to_string().into(),
                if scenario.is_default { "yes" } else { "" }.into(),
                scenario.updated_at.clone().unwrap_or_default().into(),
            ],
        ));
    }
    table
}
