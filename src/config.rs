use std::path::PathBuf;

use url::Url;

/// Default API base URL.
/// Override at build time: SWEETSHOP_API_URL=https://example.com cargo build
pub const API_BASE_URL: &str = match option_env!("SWEETSHOP_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000",
};

/// Runtime override for the API base URL. Wins over the persisted setting.
pub const API_URL_ENV: &str = "SWEETSHOP_API_URL";

/// Runtime override for the data directory (database + log file).
pub const DATA_DIR_ENV: &str = "SWEETSHOP_DATA_DIR";

/// Settings key under which `config set-url` persists the base URL.
pub const API_URL_SETTING: &str = "api_base_url";

/// Resolve the API base URL: env var, then persisted setting, then the
/// build-time default. Values that do not parse as absolute http(s) URLs
/// are skipped.
pub fn resolve_api_base_url(persisted: Option<String>) -> String {
    resolve_from(std::env::var(API_URL_ENV).ok(), persisted)
}

fn resolve_from(env: Option<String>, persisted: Option<String>) -> String {
    let candidates = [env, persisted];
    for candidate in candidates.into_iter().flatten() {
        match validate_base_url(&candidate) {
            Ok(url) => return url,
            Err(e) => log::warn!("Ignoring API base URL {:?}: {}", candidate, e),
        }
    }
    API_BASE_URL.trim_end_matches('/').to_string()
}

/// Check that `raw` is an absolute http(s) URL and return it without a
/// trailing slash.
pub fn validate_base_url(raw: &str) -> Result<String, String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim().trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme {}", other)),
    }
}

pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".sweetshop"))
        .unwrap_or_else(|_| PathBuf::from(".sweetshop"))
}
