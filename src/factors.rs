use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::schedule::Matchup;
use crate::team_tables::{HavocTable, MissingStat, PpaTable, Side, SrsTable};

/// One calculator's output for a week: rows in schedule order, indexed by
/// matchup label so sheets can be joined without relying on position.
#[derive(Debug, Clone)]
pub struct FactorSheet<T> {
    rows: Vec<GameFactor<T>>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameFactor<T> {
    pub label: String,
    pub matchup: Matchup,
    #[serde(flatten)]
    pub value: T,
}

impl<T> Default for FactorSheet<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> FactorSheet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row. A label already present keeps its first row and the
    /// new one is rejected.
    pub fn push(&mut self, matchup: Matchup, value: T) -> bool {
        let label = matchup.label();
        if self.index.contains_key(&label) {
            return false;
        }
        self.index.insert(label.clone(), self.rows.len());
        self.rows.push(GameFactor {
            label,
            matchup,
            value,
        });
        true
    }

    pub fn get(&self, label: &str) -> Option<&T> {
        self.row(label).map(|row| &row.value)
    }

    pub fn row(&self, label: &str) -> Option<&GameFactor<T>> {
        self.index.get(label).map(|&idx| &self.rows[idx])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameFactor<T>> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SrsLine {
    pub away_rating: f64,
    pub home_rating: f64,
    pub spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PpaFactor {
    pub offense_factor: f64,
    pub defense_factor: f64,
    pub total_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HavocTop {
    pub away_offense: f64,
    pub home_defense: f64,
    pub havoc_factor_top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HavocBottom {
    pub home_offense: f64,
    pub away_defense: f64,
    pub havoc_factor_bottom: f64,
}

pub fn srs_spread(away_rating: f64, home_rating: f64, home_field_advantage: f64) -> f64 {
    (home_rating + home_field_advantage) - away_rating
}

impl PpaFactor {
    pub fn from_ppa(
        away_offense: f64,
        away_defense: f64,
        home_offense: f64,
        home_defense: f64,
    ) -> Self {
        let offense_factor = home_offense - away_offense;
        let defense_factor = home_defense - away_defense;
        Self {
            offense_factor,
            defense_factor,
            total_factor: offense_factor - defense_factor,
        }
    }
}

/// Away offense against home defense.
pub fn havoc_top_factor(away_offense: f64, home_defense: f64) -> f64 {
    away_offense - home_defense
}

/// Home offense against away defense, measured from the defense's side:
/// the operands are deliberately not mirrored from [`havoc_top_factor`].
pub fn havoc_bottom_factor(home_offense: f64, away_defense: f64) -> f64 {
    away_defense - home_offense
}

pub fn srs_baseline(
    games: &[Matchup],
    table: &SrsTable,
    home_field_advantage: f64,
) -> FactorSheet<SrsLine> {
    calculate("srs", games, |game| {
        let away_rating = table.rating(&game.away_team)?;
        let home_rating = table.rating(&game.home_team)?;
        Ok(SrsLine {
            away_rating,
            home_rating,
            spread: srs_spread(away_rating, home_rating, home_field_advantage),
        })
    })
}

pub fn ppa_factors(games: &[Matchup], table: &PpaTable) -> FactorSheet<PpaFactor> {
    calculate("ppa", games, |game| {
        let away_offense = table.side(&game.away_team, Side::Offense)?;
        let away_defense = table.side(&game.away_team, Side::Defense)?;
        let home_offense = table.side(&game.home_team, Side::Offense)?;
        let home_defense = table.side(&game.home_team, Side::Defense)?;
        Ok(PpaFactor::from_ppa(
            away_offense,
            away_defense,
            home_offense,
            home_defense,
        ))
    })
}

pub fn havoc_top(games: &[Matchup], table: &HavocTable) -> FactorSheet<HavocTop> {
    calculate("havoc top", games, |game| {
        let away_offense = table.side(&game.away_team, Side::Offense)?;
        let home_defense = table.side(&game.home_team, Side::Defense)?;
        Ok(HavocTop {
            away_offense,
            home_defense,
            havoc_factor_top: havoc_top_factor(away_offense, home_defense),
        })
    })
}

pub fn havoc_bottom(games: &[Matchup], table: &HavocTable) -> FactorSheet<HavocBottom> {
    calculate("havoc bottom", games, |game| {
        let home_offense = table.side(&game.home_team, Side::Offense)?;
        let away_defense = table.side(&game.away_team, Side::Defense)?;
        Ok(HavocBottom {
            home_offense,
            away_defense,
            havoc_factor_bottom: havoc_bottom_factor(home_offense, away_defense),
        })
    })
}

fn calculate<T>(
    metric: &str,
    games: &[Matchup],
    factor: impl Fn(&Matchup) -> Result<T, MissingStat>,
) -> FactorSheet<T> {
    let mut sheet = FactorSheet::new();
    for game in games {
        match factor(game) {
            Ok(value) => {
                if !sheet.push(game.clone(), value) {
                    warn!(
                        metric,
                        matchup = %game,
                        "duplicate matchup in schedule, later row ignored"
                    );
                }
            }
            Err(missing) => {
                info!(metric, matchup = %game, reason = %missing, "matchup skipped");
            }
        }
    }
    debug!(metric, games = games.len(), rows = sheet.len(), "factors calculated");
    sheet
}

#[cfg(test)]
mod tests {
    use super::{FactorSheet, havoc_bottom_factor, havoc_top_factor, srs_spread};
    use crate::schedule::Matchup;

    #[test]
    fn spread_adds_home_field_to_home_rating() {
        assert!((srs_spread(10.0, 10.0, 2.5) - 2.5).abs() < 1e-12);
        assert!((srs_spread(14.0, 3.0, 0.0) + 11.0).abs() < 1e-12);
    }

    #[test]
    fn havoc_framings_are_not_mirror_images() {
        // Offense-minus-defense for the bottom framing would give +0.03.
        let bottom = havoc_bottom_factor(0.28, 0.25);
        assert!((bottom + 0.03).abs() < 1e-12);
        assert!((havoc_top_factor(0.28, 0.25) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn sheet_keeps_first_row_for_repeated_label() {
        let mut sheet = FactorSheet::new();
        assert!(sheet.push(Matchup::new("A", "B"), 1.0));
        assert!(!sheet.push(Matchup::new("A", "B"), 2.0));
        assert!(sheet.push(Matchup::new("B", "A"), 3.0));
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.get("A vs B"), Some(&1.0));
        assert_eq!(sheet.get("B vs A"), Some(&3.0));
        assert_eq!(sheet.get("C vs D"), None);
    }
}
