//! Startup plumbing shared by the binaries.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cfbd::{CfbdClient, StatsProvider};
use crate::config::opt_env;
use crate::fixture_provider::FixtureProvider;

pub const MAX_WEEK: u8 = 20;

/// Loads `.env.local` then `.env`; values already in the environment win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Logs go to stderr so stdout only carries results. `RUST_LOG` overrides
/// the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// `STATFORGE_FIXTURE_DIR` selects the offline provider; otherwise the CFBD
/// client is built and a missing `CFBD_API_KEY` is fatal.
pub fn provider_from_env() -> Result<Box<dyn StatsProvider>> {
    provider_from_lookup(opt_env)
}

pub fn provider_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn StatsProvider>> {
    if let Some(dir) = lookup("STATFORGE_FIXTURE_DIR") {
        tracing::info!(dir = dir.as_str(), "using offline fixture provider");
        return Ok(Box::new(FixtureProvider::new(dir)));
    }
    let client = CfbdClient::from_lookup(lookup)?;
    Ok(Box::new(client))
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

/// `--week N`, `--week=N` or a bare number among the arguments.
pub fn parse_week_arg(args: &[String]) -> Result<Option<u8>> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix("--week=") {
            return parse_week(raw).map(Some);
        }
        if arg == "--week" {
            let next = args
                .get(idx + 1)
                .ok_or_else(|| anyhow!("--week needs a value"))?;
            return parse_week(next).map(Some);
        }
    }
    match args.iter().find(|arg| !arg.starts_with('-')) {
        Some(raw) => parse_week(raw).map(Some),
        None => Ok(None),
    }
}

pub fn parse_week(raw: &str) -> Result<u8> {
    let week = raw
        .trim()
        .parse::<u8>()
        .with_context(|| format!("week must be a number, got {raw:?}"))?;
    if week == 0 || week > MAX_WEEK {
        bail!("week must be between 1 and {MAX_WEEK}, got {week}");
    }
    Ok(week)
}

/// Resolves the week from the arguments, then `CFBD_WEEK`, then stdin.
pub fn resolve_week(args: &[String]) -> Result<u8> {
    if let Some(week) = parse_week_arg(args)? {
        return Ok(week);
    }
    if let Some(raw) = opt_env("CFBD_WEEK") {
        return parse_week(&raw).context("CFBD_WEEK");
    }
    prompt_week()
}

/// The prompt goes to stderr so `--json` output on stdout stays clean.
fn prompt_week() -> Result<u8> {
    read_week_from(io::stdin().lock(), io::stderr())
}

fn read_week_from(mut input: impl BufRead, mut prompt: impl Write) -> Result<u8> {
    write!(prompt, "Enter the week you need data for: ").context("write prompt")?;
    prompt.flush().context("flush prompt")?;
    let mut line = String::new();
    input.read_line(&mut line).context("read week from stdin")?;
    parse_week(&line)
}
