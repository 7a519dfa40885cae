use anyhow::Result;

use statforge::cli;
use statforge::conference::Conference;
use statforge::config::ForecastConfig;
use statforge::factors::srs_baseline;
use statforge::report::baseline_lines;
use statforge::schedule::resolve_schedule;
use statforge::team_tables::build_srs_table;

// SRS-only odds: skips the PPA and havoc pulls entirely.
fn main() -> Result<()> {
    cli::load_dotenv();
    cli::init_tracing();

    let provider = cli::provider_from_env()?;
    let cfg = ForecastConfig::from_env()?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let week = cli::resolve_week(&args)?;

    let games = resolve_schedule(provider.as_ref(), cfg.season, week, cfg.season_type);
    let srs = build_srs_table(provider.as_ref(), &Conference::ALL, &cfg);
    let baseline = srs_baseline(&games, &srs.table, cfg.home_field_advantage);

    for line in baseline_lines(&baseline) {
        println!("{line}");
    }
    Ok(())
}
