use crate::fetcher::{self, DEFAULT_MAX_REDIRECTS};
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use semver::Version;
use std::sync::Mutex;

static VERSION_CACHE: Lazy<Mutex<Option<Vec<Version>>>> = Lazy::new(|| Mutex::new(None));

const RELEASES_URL: &str =
    "https://api.github.com/repos/kubernetes/kubernetes/releases?per_page=100";

/// Resolve the current stable release identifier (e.g. "v1.31.0") from the
/// well-known metadata endpoint. Surrounding whitespace is trimmed before use.
pub fn fetch_stable(client: &Client, release_base: &str) -> Result<String> {
    let url = format!("{release_base}/release/stable.txt");
    let body =
        fetcher::fetch_text(client, &url, DEFAULT_MAX_REDIRECTS).with_context(|| format!("GET {url}"))?;
    let version = body.trim();
    if version.is_empty() {
        return Err(anyhow!("empty stable version from {url}"));
    }
    Ok(version.to_string())
}

/// Normalize a user-pinned version spec ("1.31.0" or "v1.31.0") to the
/// v-prefixed form used in download URLs.
pub fn normalize_pin(spec: &str) -> Result<String> {
    let clean = spec.trim().trim_start_matches('v');
    let v = Version::parse(clean).with_context(|| format!("invalid version spec '{spec}'"))?;
    Ok(format!("v{v}"))
}

/// List published releases (newest first), skipping prereleases.
pub fn fetch_published_versions(client: &Client) -> Result<Vec<Version>> {
    {
        let cache = VERSION_CACHE.lock().unwrap();
        if let Some(list) = cache.as_ref() {
            return Ok(list.clone());
        }
    }
    let body = fetcher::fetch_text(client, RELEASES_URL, DEFAULT_MAX_REDIRECTS)
        .with_context(|| format!("GET {RELEASES_URL}"))?;
    let value: serde_json::Value =
        serde_json::from_str(&body).with_context(|| "parsing GitHub releases response")?;
    let mut parsed = parse_release_versions(&value);
    parsed.sort_by(|a, b| b.cmp(a));
    let mut cache = VERSION_CACHE.lock().unwrap();
    *cache = Some(parsed.clone());
    Ok(parsed)
}

fn parse_release_versions(value: &serde_json::Value) -> Vec<Version> {
    let mut out = Vec::new();
    if let Some(items) = value.as_array() {
        for it in items {
            if it
                .get("prerelease")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                continue;
            }
            if let Some(tag) = it.get("tag_name").and_then(|v| v.as_str()) {
                if let Ok(v) = Version::parse(tag.trim_start_matches('v')) {
                    out.push(v);
                }
            }
        }
    }
    out.sort();
    out.dedup();
    out
}
