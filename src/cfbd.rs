//! CollegeFootballData API access: wire rows, the `StatsProvider` seam the
//! table builders depend on, and the blocking HTTP implementation of it.

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::{SeasonType, lookup_bool, opt_env};
use crate::http_cache::fetch_json;
use crate::http_client::{DEFAULT_TIMEOUT_SECS, http_client};

pub const CFBD_BASE_URL: &str = "https://api.collegefootballdata.com";
pub const API_KEY_ENV: &str = "CFBD_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Fbs,
}

impl Classification {
    pub fn as_query(self) -> &'static str {
        match self {
            Classification::Fbs => "fbs",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SrsRow {
    pub team: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PpaRow {
    pub team: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub offense: Option<PpaSplit>,
    #[serde(default)]
    pub defense: Option<PpaSplit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PpaSplit {
    #[serde(default)]
    pub overall: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvancedStatsRow {
    pub team: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub offense: Option<AdvancedSplit>,
    #[serde(default)]
    pub defense: Option<AdvancedSplit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvancedSplit {
    #[serde(default)]
    pub havoc: Option<HavocSplit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HavocSplit {
    #[serde(default)]
    pub total: Option<f64>,
}

impl AdvancedStatsRow {
    pub fn offense_havoc(&self) -> Option<f64> {
        self.offense.as_ref()?.havoc.as_ref()?.total
    }

    pub fn defense_havoc(&self) -> Option<f64> {
        self.defense.as_ref()?.havoc.as_ref()?.total
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameRow {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, rename = "awayTeam", alias = "away_team")]
    pub away_team: Option<String>,
    #[serde(default, rename = "homeTeam", alias = "home_team")]
    pub home_team: Option<String>,
}

/// The provider capabilities the pipeline needs. Conference identifiers are
/// passed through verbatim; callers pick the spelling each endpoint expects.
pub trait StatsProvider: Sync {
    fn ratings(&self, season: u16, conference: &str) -> Result<Vec<SrsRow>>;

    fn team_ppa(
        &self,
        season: u16,
        conference: &str,
        exclude_garbage_time: bool,
    ) -> Result<Vec<PpaRow>>;

    fn advanced_season_stats(
        &self,
        season: u16,
        exclude_garbage_time: bool,
    ) -> Result<Vec<AdvancedStatsRow>>;

    fn games(
        &self,
        season: u16,
        week: u8,
        season_type: SeasonType,
        classification: Classification,
    ) -> Result<Vec<GameRow>>;
}

#[derive(Debug, Clone)]
pub struct CfbdClient {
    base_url: String,
    auth_header: String,
    use_cache: bool,
    timeout_secs: u64,
}

impl CfbdClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            base_url: CFBD_BASE_URL.to_string(),
            auth_header: format!("Bearer {}", api_key.trim()),
            use_cache: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reads `CFBD_API_KEY` (required) plus the optional transport knobs.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(opt_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("missing {API_KEY_ENV} environment variable"))?;
        let mut client = Self::new(&api_key);
        if let Some(base) = lookup("CFBD_BASE_URL") {
            client.base_url = base.trim_end_matches('/').to_string();
        }
        client.use_cache = lookup_bool(&lookup, "CFBD_HTTP_CACHE", true)?;
        if let Some(raw) = lookup("CFBD_TIMEOUT_SECS") {
            client.timeout_secs = raw
                .parse::<u64>()
                .with_context(|| format!("CFBD_TIMEOUT_SECS is not a number: {raw:?}"))?
                .clamp(1, 300);
        }
        Ok(client)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<T>> {
        let url = Url::parse_with_params(&format!("{}{path}", self.base_url), params)
            .with_context(|| format!("invalid url for {path}"))?;
        let client = http_client(self.timeout_secs)?;
        let body = fetch_json(
            client,
            url.as_str(),
            &[(AUTHORIZATION.as_str(), self.auth_header.as_str())],
            self.use_cache,
        )
        .with_context(|| format!("{path} request failed"))?;
        parse_rows(&body).with_context(|| format!("invalid {path} json"))
    }
}

impl StatsProvider for CfbdClient {
    fn ratings(&self, season: u16, conference: &str) -> Result<Vec<SrsRow>> {
        self.get(
            "/ratings/srs",
            &[
                ("year", season.to_string()),
                ("conference", conference.to_string()),
            ],
        )
    }

    fn team_ppa(
        &self,
        season: u16,
        conference: &str,
        exclude_garbage_time: bool,
    ) -> Result<Vec<PpaRow>> {
        self.get(
            "/ppa/teams",
            &[
                ("year", season.to_string()),
                ("conference", conference.to_string()),
                ("excludeGarbageTime", exclude_garbage_time.to_string()),
            ],
        )
    }

    fn advanced_season_stats(
        &self,
        season: u16,
        exclude_garbage_time: bool,
    ) -> Result<Vec<AdvancedStatsRow>> {
        self.get(
            "/stats/season/advanced",
            &[
                ("year", season.to_string()),
                ("excludeGarbageTime", exclude_garbage_time.to_string()),
            ],
        )
    }

    fn games(
        &self,
        season: u16,
        week: u8,
        season_type: SeasonType,
        classification: Classification,
    ) -> Result<Vec<GameRow>> {
        self.get(
            "/games",
            &[
                ("year", season.to_string()),
                ("week", week.to_string()),
                ("seasonType", season_type.as_query().to_string()),
                ("classification", classification.as_query().to_string()),
            ],
        )
    }
}

/// Decodes a JSON array body. An empty body or a literal `null` is no rows.
pub fn parse_rows<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

pub fn parse_srs_json(raw: &str) -> Result<Vec<SrsRow>> {
    parse_rows(raw).context("invalid srs json")
}

pub fn parse_ppa_json(raw: &str) -> Result<Vec<PpaRow>> {
    parse_rows(raw).context("invalid ppa json")
}

pub fn parse_advanced_stats_json(raw: &str) -> Result<Vec<AdvancedStatsRow>> {
    parse_rows(raw).context("invalid advanced stats json")
}

pub fn parse_games_json(raw: &str) -> Result<Vec<GameRow>> {
    parse_rows(raw).context("invalid games json")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{CFBD_BASE_URL, CfbdClient};

    fn client(pairs: &[(&str, &str)]) -> anyhow::Result<CfbdClient> {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        CfbdClient::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = client(&[]).unwrap_err();
        assert!(err.to_string().contains("CFBD_API_KEY"));
    }

    #[test]
    fn blank_api_key_is_fatal() {
        assert!(client(&[("CFBD_API_KEY", "")]).is_err());
        assert!(client(&[("CFBD_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn key_becomes_bearer_header_with_defaults() {
        let client = client(&[("CFBD_API_KEY", "abc123")]).unwrap();
        assert_eq!(client.auth_header, "Bearer abc123");
        assert_eq!(client.base_url, CFBD_BASE_URL);
        assert!(client.use_cache);
        assert_eq!(client.timeout_secs, 15);
    }

    #[test]
    fn transport_knobs_are_validated() {
        let client_ok = client(&[
            ("CFBD_API_KEY", "k"),
            ("CFBD_BASE_URL", "http://localhost:8080/"),
            ("CFBD_HTTP_CACHE", "off"),
            ("CFBD_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(client_ok.base_url, "http://localhost:8080");
        assert!(!client_ok.use_cache);
        assert_eq!(client_ok.timeout_secs, 30);

        assert!(client(&[("CFBD_API_KEY", "k"), ("CFBD_TIMEOUT_SECS", "abc")]).is_err());
        assert!(client(&[("CFBD_API_KEY", "k"), ("CFBD_HTTP_CACHE", "maybe")]).is_err());
    }
}
