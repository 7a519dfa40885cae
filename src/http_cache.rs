use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "statforge";
const CACHE_FILE: &str = "http_cache.json";
/// Entries older than this are dropped on the next write.
const MAX_ENTRY_AGE_SECS: u64 = 14 * 24 * 60 * 60;

static CACHE: Mutex<Option<HttpCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// GET `url` and return the body. With `use_cache`, a stored ETag /
/// Last-Modified pair is sent for revalidation and a 304 answers from disk.
/// Entries are keyed by URL only, so credentials must travel in headers.
pub fn fetch_json(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    use_cache: bool,
) -> Result<String> {
    let cached_entry = if use_cache { cached(url) } else { None };

    let mut req = client.get(url);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    if let Some(entry) = cached_entry.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    let resp_headers = resp.headers().clone();
    if status == StatusCode::NOT_MODIFIED {
        return match cached_entry {
            Some(entry) => {
                debug!(url, "served from http cache");
                Ok(entry.body)
            }
            None => Err(anyhow!("received 304 without cache body")),
        };
    }

    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body.trim()));
    }

    if use_cache {
        let header_str = |name: HeaderName| {
            resp_headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        let etag = header_str(ETAG);
        let last_modified = header_str(LAST_MODIFIED);
        if etag.is_some() || last_modified.is_some() {
            store(
                url,
                CacheEntry {
                    body: body.clone(),
                    etag,
                    last_modified,
                    fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
                },
            );
        }
    }
    Ok(body)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn cached(url: &str) -> Option<CacheEntry> {
    let mut guard = CACHE.lock().ok()?;
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.entries.get(url).cloned()
}

fn store(key: &str, entry: CacheEntry) {
    let Ok(mut guard) = CACHE.lock() else {
        return;
    };
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    let now = entry.fetched_at;
    cache.entries.insert(key.to_string(), entry);
    prune_stale(cache, now);
    if let Err(err) = save_cache_file(cache) {
        warn!(error = %err, "could not persist http cache");
    }
}

fn prune_stale(cache: &mut HttpCacheFile, now: u64) {
    let cutoff = now.saturating_sub(MAX_ENTRY_AGE_SECS);
    let before = cache.entries.len();
    cache.entries.retain(|_, entry| entry.fetched_at >= cutoff);
    let pruned = before - cache.entries.len();
    if pruned > 0 {
        debug!(pruned, "stale http cache entries dropped");
    }
}

fn load_cache_file() -> HttpCacheFile {
    let Some(path) = cache_path() else {
        return HttpCacheFile::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return HttpCacheFile::default();
    };
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return HttpCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &HttpCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create cache dir")?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::{CacheEntry, HttpCacheFile, MAX_ENTRY_AGE_SECS, prune_stale};

    fn entry(fetched_at: u64) -> CacheEntry {
        CacheEntry {
            body: "[]".to_string(),
            etag: Some("\"v1\"".to_string()),
            last_modified: None,
            fetched_at,
        }
    }

    #[test]
    fn entries_past_max_age_are_pruned() {
        let now = 10 * MAX_ENTRY_AGE_SECS;
        let mut cache = HttpCacheFile::default();
        cache.entries.insert("fresh".to_string(), entry(now - 60));
        cache.entries.insert("edge".to_string(), entry(now - MAX_ENTRY_AGE_SECS));
        cache.entries.insert("stale".to_string(), entry(now - MAX_ENTRY_AGE_SECS - 1));

        prune_stale(&mut cache, now);

        assert!(cache.entries.contains_key("fresh"));
        assert!(cache.entries.contains_key("edge"));
        assert!(!cache.entries.contains_key("stale"));
    }

    #[test]
    fn clock_before_max_age_keeps_everything() {
        let mut cache = HttpCacheFile::default();
        cache.entries.insert("a".to_string(), entry(0));
        prune_stale(&mut cache, 5);
        assert_eq!(cache.entries.len(), 1);
    }
}
