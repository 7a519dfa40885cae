use std::fmt;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::cfbd::{Classification, GameRow, StatsProvider};
use crate::config::SeasonType;

/// One scheduled game, away team first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Matchup {
    pub away_team: String,
    pub home_team: String,
}

impl Matchup {
    pub fn new(away_team: impl Into<String>, home_team: impl Into<String>) -> Self {
        Self {
            away_team: away_team.into(),
            home_team: home_team.into(),
        }
    }

    /// `"{away} vs {home}"`, the key every factor sheet is joined on.
    pub fn label(&self) -> String {
        format!("{} vs {}", self.away_team, self.home_team)
    }
}

impl fmt::Display for Matchup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.away_team, self.home_team)
    }
}

/// FBS games for one week, in provider order. A failed fetch is logged and
/// yields no games; the caller cannot tell it from an empty week except
/// through the log.
pub fn resolve_schedule(
    provider: &dyn StatsProvider,
    season: u16,
    week: u8,
    season_type: SeasonType,
) -> Vec<Matchup> {
    match provider.games(season, week, season_type, Classification::Fbs) {
        Ok(rows) => {
            let games = matchups_from_rows(rows);
            info!(season, week, games = games.len(), "schedule resolved");
            games
        }
        Err(err) => {
            error!(season, week, error = %format!("{err:#}"), "schedule fetch failed");
            Vec::new()
        }
    }
}

pub fn matchups_from_rows(rows: Vec<GameRow>) -> Vec<Matchup> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match (row.away_team, row.home_team) {
            (Some(away), Some(home)) if !away.is_empty() && !home.is_empty() => {
                out.push(Matchup::new(away, home));
            }
            (away, home) => {
                warn!(game_id = ?row.id, ?away, ?home, "game row without both teams, skipped");
            }
        }
    }
    out
}
