use anyhow::Result;

use statforge::cli;
use statforge::config::ForecastConfig;
use statforge::pipeline::{WeekData, run_forecast};
use statforge::report;

fn main() -> Result<()> {
    cli::load_dotenv();
    cli::init_tracing();

    // Credentials are checked before anything else runs.
    let provider = cli::provider_from_env()?;
    let cfg = ForecastConfig::from_env()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let json = cli::has_flag(&args, "--json");
    let week = cli::resolve_week(&args)?;

    let data = WeekData::load(provider.as_ref(), &cfg, week);
    let forecast = run_forecast(&data, &cfg);

    if json {
        println!("{}", report::forecast_json(&data, &forecast)?);
        return Ok(());
    }

    for line in report::baseline_lines(&forecast.baseline) {
        println!("{line}");
    }
    println!();
    println!("Adjusted SRS Odds:");
    for line in report::adjusted_lines(&forecast) {
        println!("{line}");
    }
    Ok(())
}
