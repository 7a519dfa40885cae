use statforge::factors::{havoc_bottom, havoc_top, ppa_factors, srs_baseline};
use statforge::schedule::Matchup;
use statforge::team_tables::{HavocTable, PpaTable, SideStats, SrsTable, TeamTable};

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn srs_table(rows: &[(&str, f64)]) -> SrsTable {
    rows.iter()
        .map(|(team, rating)| (team.to_string(), *rating))
        .collect()
}

fn side_table(rows: &[(&str, Option<f64>, Option<f64>)]) -> TeamTable<SideStats> {
    rows.iter()
        .map(|(team, offense, defense)| {
            (
                team.to_string(),
                SideStats {
                    offense: *offense,
                    defense: *defense,
                },
            )
        })
        .collect()
}

#[test]
fn srs_baseline_applies_home_field_advantage() {
    let games = vec![Matchup::new("Away", "Home")];
    let table = srs_table(&[("Away", 20.0), ("Home", 25.0)]);

    let sheet = srs_baseline(&games, &table, 2.5);

    let line = sheet.get("Away vs Home").expect("line should exist");
    assert!(approx(line.spread, 7.5));
    assert!(approx(line.away_rating, 20.0));
    assert!(approx(line.home_rating, 25.0));
}

#[test]
fn srs_baseline_uses_configured_home_field_advantage() {
    let games = vec![Matchup::new("Away", "Home")];
    let table = srs_table(&[("Away", 20.0), ("Home", 25.0)]);

    let sheet = srs_baseline(&games, &table, 0.0);
    assert!(approx(sheet.get("Away vs Home").expect("line").spread, 5.0));
}

#[test]
fn ppa_total_is_offense_factor_minus_defense_factor() {
    let games = vec![Matchup::new("Away", "Home")];
    let table: PpaTable = side_table(&[
        ("Away", Some(1.0), Some(-0.5)),
        ("Home", Some(2.0), Some(0.5)),
    ]);

    let sheet = ppa_factors(&games, &table);

    let factor = sheet.get("Away vs Home").expect("factor should exist");
    assert!(approx(factor.offense_factor, 1.0));
    assert!(approx(factor.defense_factor, 1.0));
    assert!(approx(factor.total_factor, 0.0));
}

#[test]
fn havoc_top_and_bottom_use_their_own_sign_conventions() {
    let games = vec![Matchup::new("Away", "Home")];
    let table: HavocTable = side_table(&[
        ("Away", Some(0.3), Some(0.25)),
        ("Home", Some(0.28), Some(0.22)),
    ]);

    let top = havoc_top(&games, &table);
    let bottom = havoc_bottom(&games, &table);

    let top = top.get("Away vs Home").expect("top factor");
    let bottom = bottom.get("Away vs Home").expect("bottom factor");
    assert!(approx(top.havoc_factor_top, 0.08));
    assert!(approx(bottom.havoc_factor_bottom, -0.03));
    assert!(approx(bottom.home_offense, 0.28));
    assert!(approx(bottom.away_defense, 0.25));
}

#[test]
fn absent_team_skips_every_matchup_it_plays_in() {
    let games = vec![
        Matchup::new("Ghost", "Home"),
        Matchup::new("Away", "Home"),
        Matchup::new("Away", "Ghost"),
    ];
    let srs = srs_table(&[("Away", 3.0), ("Home", 4.0)]);
    let sides = side_table(&[("Away", Some(0.1), Some(0.2)), ("Home", Some(0.3), Some(0.4))]);

    let baseline = srs_baseline(&games, &srs, 2.5);
    let ppa = ppa_factors(&games, &sides);
    let top = havoc_top(&games, &sides);
    let bottom = havoc_bottom(&games, &sides);

    for labels in [
        baseline.iter().map(|r| r.label.clone()).collect::<Vec<_>>(),
        ppa.iter().map(|r| r.label.clone()).collect(),
        top.iter().map(|r| r.label.clone()).collect(),
        bottom.iter().map(|r| r.label.clone()).collect(),
    ] {
        assert_eq!(labels, vec!["Away vs Home".to_string()]);
    }
}

#[test]
fn zero_rating_is_a_value_not_a_gap() {
    let games = vec![Matchup::new("Away", "Home")];
    let table = srs_table(&[("Away", 0.0), ("Home", 0.0)]);
    let sheet = srs_baseline(&games, &table, 2.5);
    assert!(approx(sheet.get("Away vs Home").expect("line").spread, 2.5));
}

#[test]
fn missing_field_skips_only_calculators_that_need_it() {
    let games = vec![Matchup::new("Away", "Home")];
    // Away lacks a defensive havoc value: top needs away offense and home
    // defense, bottom needs away defense.
    let table = side_table(&[("Away", Some(0.3), None), ("Home", Some(0.28), Some(0.22))]);

    assert_eq!(havoc_top(&games, &table).len(), 1);
    assert!(havoc_bottom(&games, &table).is_empty());
    assert!(ppa_factors(&games, &table).is_empty());
}

#[test]
fn output_follows_schedule_order() {
    let games = vec![
        Matchup::new("C", "D"),
        Matchup::new("A", "B"),
        Matchup::new("E", "F"),
    ];
    let table = srs_table(&[
        ("A", 1.0),
        ("B", 2.0),
        ("C", 3.0),
        ("D", 4.0),
        ("E", 5.0),
        ("F", 6.0),
    ]);
    let sheet = srs_baseline(&games, &table, 2.5);
    let labels: Vec<&str> = sheet.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["C vs D", "A vs B", "E vs F"]);
}
