//! Application configuration and the on-disk layout of league artifacts.
//!
//! A single [`AppConfig`] is constructed by the caller (CLI or embedding code) and passed by
//! reference into every component; nothing in this crate consults the environment or caches
//! configuration globally.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_root: PathBuf,
    pub season: u32,
}

impl AppConfig {
    pub fn new(data_root: impl Into<PathBuf>, season: u32) -> Self {
        Self {
            data_root: data_root.into(),
            season,
        }
    }

    fn league_dir(&self) -> PathBuf {
        self.data_root
            .join("out")
            .join("league")
            .join(self.season.to_string())
    }

    pub fn teams_csv(&self) -> PathBuf {
        self.league_dir().join("teams.csv")
    }

    pub fn schedule_csv(&self) -> PathBuf {
        self.league_dir().join("schedule.csv")
    }

    pub fn weekly_scores_dir(&self) -> PathBuf {
        self.league_dir()
    }

    pub fn weekly_scores_csv(&self, week: u32) -> PathBuf {
        self.league_dir()
            .join(format!("weekly_scores_week_{week}.csv"))
    }

    pub fn projections_dir(&self) -> PathBuf {
        self.data_root
            .join("out")
            .join("projections")
            .join(self.season.to_string())
    }

    pub fn projection_csv(&self, week: u32) -> PathBuf {
        self.projections_dir()
            .join(format!("projected_stats_week_{week}.csv"))
    }

    fn raw_dir(&self) -> PathBuf {
        self.data_root
            .join("raw")
            .join("league")
            .join(self.season.to_string())
    }

    pub fn matchup_results_json(&self) -> PathBuf {
        self.raw_dir().join("matchup_results.json")
    }

    pub fn scoreboard_json(&self) -> PathBuf {
        self.raw_dir().join("scoreboard.json")
    }

    pub fn overlays_dir(&self) -> PathBuf {
        self.data_root.join("overlays").join(self.season.to_string())
    }

    pub fn overlay_json(&self, scenario_id: &str) -> PathBuf {
        self.overlays_dir().join(format!("{scenario_id}.json"))
    }

    pub fn default_dataset_json(&self) -> PathBuf {
        self.data_root
            .join("out")
            .join("simulations")
            .join(self.season.to_string())
            .join("rest_of_season.json")
    }
}
