use tracing::info;

use crate::aggregate::{AdjustedLines, aggregate};
use crate::cfbd::StatsProvider;
use crate::conference::Conference;
use crate::config::ForecastConfig;
use crate::factors::{
    FactorSheet, HavocBottom, HavocTop, PpaFactor, SrsLine, havoc_bottom, havoc_top, ppa_factors,
    srs_baseline,
};
use crate::schedule::{Matchup, resolve_schedule};
use crate::team_tables::{
    SideStats, SourceFailure, TableBuild, build_havoc_table, build_ppa_table, build_srs_table,
};

/// Everything fetched for one week. Each table is built once here and only
/// borrowed afterwards.
#[derive(Debug, Clone)]
pub struct WeekData {
    pub season: u16,
    pub week: u8,
    pub games: Vec<Matchup>,
    pub srs: TableBuild<f64>,
    pub ppa: TableBuild<SideStats>,
    pub havoc: TableBuild<SideStats>,
}

impl WeekData {
    pub fn load(provider: &dyn StatsProvider, cfg: &ForecastConfig, week: u8) -> Self {
        info!(season = cfg.season, week, "loading week data");
        let games = resolve_schedule(provider, cfg.season, week, cfg.season_type);
        let srs = build_srs_table(provider, &Conference::ALL, cfg);
        let ppa = build_ppa_table(provider, &Conference::ALL, cfg);
        let havoc = build_havoc_table(provider, &Conference::ALL, cfg);
        Self {
            season: cfg.season,
            week,
            games,
            srs,
            ppa,
            havoc,
        }
    }

    /// Every source that failed while building the tables, tagged with the
    /// metric it belonged to.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &SourceFailure)> {
        let srs = self.srs.failures.iter().map(|f| ("srs", f));
        let ppa = self.ppa.failures.iter().map(|f| ("ppa", f));
        let havoc = self.havoc.failures.iter().map(|f| ("havoc", f));
        srs.chain(ppa).chain(havoc)
    }
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub baseline: FactorSheet<SrsLine>,
    pub ppa: FactorSheet<PpaFactor>,
    pub havoc_top: FactorSheet<HavocTop>,
    pub havoc_bottom: FactorSheet<HavocBottom>,
    pub adjusted: AdjustedLines,
}

pub fn run_forecast(data: &WeekData, cfg: &ForecastConfig) -> Forecast {
    let baseline = srs_baseline(&data.games, &data.srs.table, cfg.home_field_advantage);
    let ppa = ppa_factors(&data.games, &data.ppa.table);
    let top = havoc_top(&data.games, &data.havoc.table);
    let bottom = havoc_bottom(&data.games, &data.havoc.table);
    let adjusted = aggregate(&baseline, &ppa, &top, &bottom);
    info!(
        games = data.games.len(),
        baseline = baseline.len(),
        adjusted = adjusted.len(),
        "forecast complete"
    );
    Forecast {
        baseline,
        ppa,
        havoc_top: top,
        havoc_bottom: bottom,
        adjusted,
    }
}
