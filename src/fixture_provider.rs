use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cfbd::{
    AdvancedStatsRow, Classification, GameRow, PpaRow, SrsRow, StatsProvider,
    parse_advanced_stats_json, parse_games_json, parse_ppa_json, parse_srs_json,
};
use crate::config::SeasonType;

/// Offline provider backed by saved CFBD responses:
///
/// ```text
/// <root>/srs/<conference id>.json
/// <root>/ppa/<conference id>.json
/// <root>/advanced.json
/// <root>/games/week_<n>.json            (regular season)
/// <root>/games/postseason_week_<n>.json
/// ```
///
/// Season and garbage-time flags are ignored. A missing file is an error,
/// just like a failed request.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    root: PathBuf,
}

impl FixtureProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        debug!(path = %path.display(), "reading fixture");
        fs::read_to_string(&path).with_context(|| format!("read fixture {}", path.display()))
    }
}

impl StatsProvider for FixtureProvider {
    fn ratings(&self, _season: u16, conference: &str) -> Result<Vec<SrsRow>> {
        parse_srs_json(&self.read(&format!("srs/{conference}.json"))?)
    }

    fn team_ppa(
        &self,
        _season: u16,
        conference: &str,
        _exclude_garbage_time: bool,
    ) -> Result<Vec<PpaRow>> {
        parse_ppa_json(&self.read(&format!("ppa/{conference}.json"))?)
    }

    fn advanced_season_stats(
        &self,
        _season: u16,
        _exclude_garbage_time: bool,
    ) -> Result<Vec<AdvancedStatsRow>> {
        parse_advanced_stats_json(&self.read("advanced.json")?)
    }

    fn games(
        &self,
        _season: u16,
        week: u8,
        season_type: SeasonType,
        _classification: Classification,
    ) -> Result<Vec<GameRow>> {
        let name = match season_type {
            SeasonType::Regular => format!("games/week_{week}.json"),
            SeasonType::Postseason => format!("games/postseason_week_{week}.json"),
        };
        parse_games_json(&self.read(&name)?)
    }
}
