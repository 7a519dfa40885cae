use std::env;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

pub const DEFAULT_HOME_FIELD_ADVANTAGE: f64 = 2.5;
const DEFAULT_FETCH_PARALLELISM: usize = 4;
const MAX_FETCH_PARALLELISM: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonType {
    Regular,
    Postseason,
}

impl SeasonType {
    pub fn as_query(self) -> &'static str {
        match self {
            SeasonType::Regular => "regular",
            SeasonType::Postseason => "postseason",
        }
    }

    pub fn parse(raw: &str) -> Option<SeasonType> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "regular" | "reg" => Some(SeasonType::Regular),
            "postseason" | "post" | "bowls" => Some(SeasonType::Postseason),
            _ => None,
        }
    }
}

/// Run-level knobs for table building and the line formulas.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub season: u16,
    pub season_type: SeasonType,
    /// Points added to the home team's rating before the SRS spread.
    pub home_field_advantage: f64,
    pub exclude_garbage_time: bool,
    pub fetch_parallelism: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            season: current_season(Local::now().date_naive()),
            season_type: SeasonType::Regular,
            home_field_advantage: DEFAULT_HOME_FIELD_ADVANTAGE,
            exclude_garbage_time: true,
            fetch_parallelism: DEFAULT_FETCH_PARALLELISM,
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(opt_env)
    }

    /// Builds the config from `lookup`, which returns a trimmed, non-empty
    /// value or `None`. Any value present but unparsable is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let season = match lookup("CFBD_SEASON") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("CFBD_SEASON is not a year: {raw:?}"))?,
            None => defaults.season,
        };
        let season_type = match lookup("CFBD_SEASON_TYPE") {
            Some(raw) => SeasonType::parse(&raw).ok_or_else(|| {
                anyhow!("CFBD_SEASON_TYPE must be regular or postseason, got {raw:?}")
            })?,
            None => defaults.season_type,
        };
        let home_field_advantage = match lookup("HOME_FIELD_ADVANTAGE") {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .with_context(|| format!("HOME_FIELD_ADVANTAGE is not a number: {raw:?}"))?,
            None => defaults.home_field_advantage,
        };
        let exclude_garbage_time =
            lookup_bool(&lookup, "EXCLUDE_GARBAGE_TIME", defaults.exclude_garbage_time)?;
        let fetch_parallelism = match lookup("FETCH_PARALLELISM") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("FETCH_PARALLELISM is not a count: {raw:?}"))?
                .clamp(1, MAX_FETCH_PARALLELISM),
            None => defaults.fetch_parallelism,
        };

        Ok(Self {
            season,
            season_type,
            home_field_advantage,
            exclude_garbage_time,
            fetch_parallelism,
        })
    }
}

/// CFBD seasons start in late August and end with January bowls, so
/// January and February still belong to the previous year's season.
pub fn current_season(today: NaiveDate) -> u16 {
    let year = if today.month() <= 2 {
        today.year() - 1
    } else {
        today.year()
    };
    u16::try_from(year).unwrap_or(u16::MAX)
}

pub fn lookup_bool(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool> {
    match lookup(key) {
        Some(raw) => {
            parse_bool(&raw).ok_or_else(|| anyhow!("{key} must be true or false, got {raw:?}"))
        }
        None => Ok(default),
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        let val = val.trim();
        if val.is_empty() { None } else { Some(val.to_string()) }
    })
}
