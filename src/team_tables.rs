//! Team-keyed statistic tables built from per-conference provider pulls.
//!
//! A conference whose fetch fails is simply missing from the table; the
//! failure is logged and recorded in [`TableBuild::failures`] and the build
//! carries on with the remaining conferences.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cfbd::StatsProvider;
use crate::conference::Conference;
use crate::config::ForecastConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct TeamTable<T> {
    rows: HashMap<String, T>,
}

impl<T> Default for TeamTable<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T> TeamTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, team: impl Into<String>, value: T) {
        self.rows.insert(team.into(), value);
    }

    pub fn get(&self, team: &str) -> Option<&T> {
        self.rows.get(team)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.rows.contains_key(team)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.rows.iter().map(|(team, value)| (team.as_str(), value))
    }

    fn entry_or_default(&mut self, team: String) -> &mut T
    where
        T: Default,
    {
        self.rows.entry(team).or_default()
    }
}

impl<T> FromIterator<(String, T)> for TeamTable<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Offense/defense pair; either half may be missing independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SideStats {
    pub offense: Option<f64>,
    pub defense: Option<f64>,
}

impl SideStats {
    pub fn new(offense: f64, defense: f64) -> Self {
        Self {
            offense: Some(offense),
            defense: Some(defense),
        }
    }
}

pub type SrsTable = TeamTable<f64>;
pub type PpaTable = TeamTable<SideStats>;
pub type HavocTable = TeamTable<SideStats>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Offense,
    Defense,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Offense => "offense",
            Side::Defense => "defense",
        }
    }
}

/// Why a lookup came back empty. Expected during normal runs, so it is data
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingStat {
    TeamAbsent { team: String },
    FieldAbsent { team: String, field: &'static str },
}

impl fmt::Display for MissingStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingStat::TeamAbsent { team } => write!(f, "{team} not in table"),
            MissingStat::FieldAbsent { team, field } => write!(f, "{team} has no {field} value"),
        }
    }
}

impl TeamTable<f64> {
    pub fn rating(&self, team: &str) -> Result<f64, MissingStat> {
        self.get(team).copied().ok_or_else(|| MissingStat::TeamAbsent {
            team: team.to_string(),
        })
    }
}

impl TeamTable<SideStats> {
    pub fn side(&self, team: &str, side: Side) -> Result<f64, MissingStat> {
        let stats = self.get(team).ok_or_else(|| MissingStat::TeamAbsent {
            team: team.to_string(),
        })?;
        let value = match side {
            Side::Offense => stats.offense,
            Side::Defense => stats.defense,
        };
        value.ok_or_else(|| MissingStat::FieldAbsent {
            team: team.to_string(),
            field: side.name(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    /// Conference identifier as sent to the endpoint, or the endpoint name
    /// for whole-season pulls.
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct TableBuild<T> {
    pub table: TeamTable<T>,
    pub failures: Vec<SourceFailure>,
}

impl<T> TableBuild<T> {
    fn record_failure(&mut self, metric: &str, source: &str, err: &anyhow::Error) {
        let error = format!("{err:#}");
        warn!(metric, source, error = %error, "fetch failed, source skipped");
        self.failures.push(SourceFailure {
            source: source.to_string(),
            error,
        });
    }

    fn finish(self, metric: &str) -> Self {
        info!(
            metric,
            teams = self.table.len(),
            failed_sources = self.failures.len(),
            "table built"
        );
        self
    }
}

impl<T> Default for TableBuild<T> {
    fn default() -> Self {
        Self {
            table: TeamTable::default(),
            failures: Vec::new(),
        }
    }
}

pub fn build_srs_table(
    provider: &dyn StatsProvider,
    conferences: &[Conference],
    cfg: &ForecastConfig,
) -> TableBuild<f64> {
    let season = cfg.season;
    let fetched = fetch_per_conference(conferences, cfg.fetch_parallelism, |conf| {
        provider.ratings(season, conf.srs_id())
    });

    let mut build = TableBuild::<f64>::default();
    for (conf, result) in fetched {
        match result {
            Ok(rows) => {
                for row in rows {
                    match row.rating {
                        Some(rating) => build.table.insert(row.team, rating),
                        None => debug!(team = %row.team, "srs rating missing"),
                    }
                }
            }
            Err(err) => build.record_failure("srs", conf.srs_id(), &err),
        }
    }
    build.finish("srs")
}

pub fn build_ppa_table(
    provider: &dyn StatsProvider,
    conferences: &[Conference],
    cfg: &ForecastConfig,
) -> TableBuild<SideStats> {
    let season = cfg.season;
    let exclude_garbage_time = cfg.exclude_garbage_time;
    let fetched = fetch_per_conference(conferences, cfg.fetch_parallelism, |conf| {
        provider.team_ppa(season, conf.ppa_id(), exclude_garbage_time)
    });

    let mut build = TableBuild::<SideStats>::default();
    for (conf, result) in fetched {
        let rows = match result {
            Ok(rows) => rows,
            Err(err) => {
                build.record_failure("ppa", conf.ppa_id(), &err);
                continue;
            }
        };
        for row in rows {
            let offense = row.offense.and_then(|split| split.overall);
            let defense = row.defense.and_then(|split| split.overall);
            if offense.is_none() {
                debug!(team = %row.team, "offense ppa missing");
            }
            if defense.is_none() {
                debug!(team = %row.team, "defense ppa missing");
            }
            let entry = build.table.entry_or_default(row.team);
            if offense.is_some() {
                entry.offense = offense;
            }
            if defense.is_some() {
                entry.defense = defense;
            }
        }
    }
    build.finish("ppa")
}

/// Havoc comes from one whole-season advanced-stats pull, so the conference
/// list acts as a filter on the returned rows instead of a query parameter.
pub fn build_havoc_table(
    provider: &dyn StatsProvider,
    conferences: &[Conference],
    cfg: &ForecastConfig,
) -> TableBuild<SideStats> {
    let mut build = TableBuild::<SideStats>::default();
    let rows = match provider.advanced_season_stats(cfg.season, cfg.exclude_garbage_time) {
        Ok(rows) => rows,
        Err(err) => {
            build.record_failure("havoc", "advanced season stats", &err);
            return build.finish("havoc");
        }
    };

    let mut excluded = 0usize;
    for row in rows {
        let recognised = row
            .conference
            .as_deref()
            .and_then(Conference::from_stats_name)
            .is_some_and(|conf| conferences.contains(&conf));
        if !recognised {
            excluded += 1;
            continue;
        }
        let stats = SideStats {
            offense: row.offense_havoc(),
            defense: row.defense_havoc(),
        };
        build.table.insert(row.team, stats);
    }
    if excluded > 0 {
        debug!(excluded, "havoc rows outside the fbs conferences dropped");
    }
    build.finish("havoc")
}

fn fetch_per_conference<R, F>(
    conferences: &[Conference],
    parallelism: usize,
    fetch: F,
) -> Vec<(Conference, Result<Vec<R>>)>
where
    R: Send,
    F: Fn(Conference) -> Result<Vec<R>> + Sync,
{
    if parallelism <= 1 {
        return conferences.iter().map(|&conf| (conf, fetch(conf))).collect();
    }
    // Collecting an indexed parallel iterator keeps list order, so the merge
    // below sees conferences in the same order as a sequential run.
    with_fetch_pool(parallelism, || {
        conferences
            .par_iter()
            .map(|&conf| (conf, fetch(conf)))
            .collect::<Vec<_>>()
    })
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
