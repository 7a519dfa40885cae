use anyhow::{Context, Result};
use serde::Serialize;

use crate::aggregate::AdjustedLine;
use crate::factors::{FactorSheet, GameFactor, SrsLine};
use crate::pipeline::{Forecast, WeekData};
use crate::team_tables::SourceFailure;

pub fn format_baseline_line(label: &str, spread: f64) -> String {
    format!("{label}, {spread:.1}")
}

pub fn format_adjusted_line(label: &str, adjusted: f64) -> String {
    format!("{label}: {adjusted:?}")
}

pub fn baseline_lines(sheet: &FactorSheet<SrsLine>) -> Vec<String> {
    sheet
        .iter()
        .map(|row| format_baseline_line(&row.label, row.value.spread))
        .collect()
}

pub fn adjusted_lines(forecast: &Forecast) -> Vec<String> {
    forecast
        .adjusted
        .iter()
        .map(|line| format_adjusted_line(&line.label, line.adjusted))
        .collect()
}

#[derive(Debug, Serialize)]
struct ForecastReport<'a> {
    season: u16,
    week: u8,
    games: usize,
    baseline: Vec<&'a GameFactor<SrsLine>>,
    adjusted: Vec<&'a AdjustedLine>,
    failures: Vec<FailureReport<'a>>,
}

#[derive(Debug, Serialize)]
struct FailureReport<'a> {
    metric: &'static str,
    #[serde(flatten)]
    failure: &'a SourceFailure,
}

pub fn forecast_json(data: &WeekData, forecast: &Forecast) -> Result<String> {
    let report = ForecastReport {
        season: data.season,
        week: data.week,
        games: data.games.len(),
        baseline: forecast.baseline.iter().collect(),
        adjusted: forecast.adjusted.iter().collect(),
        failures: data
            .failures()
            .map(|(metric, failure)| FailureReport { metric, failure })
            .collect(),
    };
    serde_json::to_string_pretty(&report).context("serialize forecast report")
}
