use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::factors::{FactorSheet, HavocBottom, HavocTop, PpaFactor, SrsLine};
use crate::schedule::Matchup;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedLine {
    pub label: String,
    pub matchup: Matchup,
    pub baseline: f64,
    pub ppa_total_factor: f64,
    pub havoc_factor_top: f64,
    pub havoc_factor_bottom: f64,
    pub adjusted: f64,
}

/// Final lines in schedule order, keyed by matchup label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustedLines {
    lines: Vec<AdjustedLine>,
    index: HashMap<String, usize>,
}

impl Serialize for AdjustedLines {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines.serialize(serializer)
    }
}

impl AdjustedLines {
    fn push(&mut self, line: AdjustedLine) {
        self.index.insert(line.label.clone(), self.lines.len());
        self.lines.push(line);
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.line(label).map(|line| line.adjusted)
    }

    pub fn line(&self, label: &str) -> Option<&AdjustedLine> {
        self.index.get(label).map(|&idx| &self.lines[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdjustedLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Folds the per-game factors into one line per matchup.
///
/// Rows are driven by the PPA sheet and every other component is looked up
/// by label. A matchup missing from any sheet is dropped whole and logged;
/// nothing is ever matched up by position.
pub fn aggregate(
    srs_baseline: &FactorSheet<SrsLine>,
    ppa: &FactorSheet<PpaFactor>,
    havoc_top: &FactorSheet<HavocTop>,
    havoc_bottom: &FactorSheet<HavocBottom>,
) -> AdjustedLines {
    let mut lines = AdjustedLines::default();

    for row in ppa.iter() {
        let label = row.label.as_str();
        let Some(baseline) = srs_baseline.get(label) else {
            info!(matchup = label, missing = "srs baseline", "matchup dropped");
            continue;
        };
        let Some(top) = havoc_top.get(label) else {
            info!(matchup = label, missing = "havoc top", "matchup dropped");
            continue;
        };
        let Some(bottom) = havoc_bottom.get(label) else {
            info!(matchup = label, missing = "havoc bottom", "matchup dropped");
            continue;
        };

        let ppa_total_factor = row.value.total_factor;
        let adjusted = baseline.spread
            + ppa_total_factor
            + top.havoc_factor_top
            + bottom.havoc_factor_bottom;
        lines.push(AdjustedLine {
            label: row.label.clone(),
            matchup: row.matchup.clone(),
            baseline: baseline.spread,
            ppa_total_factor,
            havoc_factor_top: top.havoc_factor_top,
            havoc_factor_bottom: bottom.havoc_factor_bottom,
            adjusted,
        });
    }

    for row in srs_baseline.iter().filter(|row| !ppa.contains(&row.label)) {
        info!(matchup = row.label.as_str(), missing = "ppa", "matchup dropped");
    }

    debug!(
        baseline = srs_baseline.len(),
        ppa = ppa.len(),
        adjusted = lines.len(),
        "lines aggregated"
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::aggregate;
    use crate::factors::{FactorSheet, HavocBottom, HavocTop, PpaFactor, SrsLine};
    use crate::schedule::Matchup;

    fn week(games: &[(&str, &str, f64)]) -> super::AdjustedLines {
        let mut srs = FactorSheet::new();
        let mut ppa = FactorSheet::new();
        let mut top = FactorSheet::new();
        let mut bottom = FactorSheet::new();
        for &(away, home, spread) in games {
            let game = Matchup::new(away, home);
            srs.push(
                game.clone(),
                SrsLine {
                    away_rating: 0.0,
                    home_rating: 0.0,
                    spread,
                },
            );
            ppa.push(game.clone(), PpaFactor::from_ppa(0.0, 0.0, 0.0, 0.0));
            top.push(
                game.clone(),
                HavocTop {
                    away_offense: 0.0,
                    home_defense: 0.0,
                    havoc_factor_top: 0.0,
                },
            );
            bottom.push(
                game,
                HavocBottom {
                    home_offense: 0.0,
                    away_defense: 0.0,
                    havoc_factor_bottom: 0.0,
                },
            );
        }
        aggregate(&srs, &ppa, &top, &bottom)
    }

    #[test]
    fn lines_are_found_by_label() {
        let lines = week(&[("Navy", "Army", 3.0), ("Rice", "Tulane", -7.0)]);
        assert_eq!(lines.get("Rice vs Tulane"), Some(-7.0));
        let navy = lines.line("Navy vs Army").expect("line");
        assert_eq!(navy.matchup.home_team, "Army");
        assert!(lines.line("Army vs Navy").is_none());
    }

    #[test]
    fn lines_serialize_as_an_ordered_array() {
        let lines = week(&[("Navy", "Army", 3.0), ("Rice", "Tulane", -7.0)]);
        let value = serde_json::to_value(&lines).expect("serialize");
        let rows = value.as_array().expect("array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["label"], "Navy vs Army");
        assert_eq!(rows[1]["adjusted"], -7.0);
    }
}
