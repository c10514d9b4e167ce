// src/config.rs

//! Configuration loading utilities.
//!
//! Provider credentials are secrets and normally live in the environment
//! (or a `.env` file), not in the config file. `overlay_env` applies the
//! environment on top of whatever the file contained.

use std::path::Path;

use crate::models::Config;

/// Environment variables consulted by `overlay_env`.
const ENV_KEYS: [(&str, Overlay); 4] = [
    ("NEWSAPI_KEY", Overlay::NewsApiKey),
    ("GUARDIAN_KEY", Overlay::GuardianKey),
    ("NYTIMES_KEY", Overlay::NyTimesKey),
    ("NYTIMES_SECRET", Overlay::NyTimesSecret),
];

#[derive(Clone, Copy)]
enum Overlay {
    NewsApiKey,
    GuardianKey,
    NyTimesKey,
    NyTimesSecret,
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if loading fails.
pub fn load_or_default(path: impl AsRef<Path>) -> Config {
    Config::load(&path).unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {:?}: {}. Using defaults.",
            path.as_ref(),
            e
        );
        Config::default()
    })
}

/// Apply credential environment variables over the loaded config.
///
/// A set, non-empty variable wins over the file value.
pub fn overlay_env(config: &mut Config) {
    for (name, target) in ENV_KEYS {
        let Ok(value) = std::env::var(name) else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }

        let slot = match target {
            Overlay::NewsApiKey => &mut config.providers.newsapi.key,
            Overlay::GuardianKey => &mut config.providers.guardian.key,
            Overlay::NyTimesKey => &mut config.providers.nytimes.key,
            Overlay::NyTimesSecret => &mut config.providers.nytimes.secret,
        };
        *slot = Some(value);
    }
}
