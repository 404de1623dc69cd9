//! Runtime configuration loaded from environment variables.
//!
//! - `TOSABENDO_NARRATIVE_URL` - narrative generation endpoint (unset disables the call)
//! - `TOSABENDO_NARRATIVE_API_KEY` - bearer token for that endpoint (optional)
//! - `TOSABENDO_NARRATIVE_TIMEOUT_SECS` - request timeout, default 30
//! - `TOSABENDO_ROADMAP_YEAR` - year used to label the roadmap, default current year
//! - `TOSABENDO_DB` - database file, default in the platform data directory

use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for narrative generation requests.
pub const DEFAULT_NARRATIVE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct Config {
    pub narrative: NarrativeConfig,
    /// Fixed roadmap label year. `None` uses the current year at request time.
    pub roadmap_year: Option<i32>,
    pub database_path: Option<PathBuf>,
}

/// Connection settings for the external narrative generation service.
#[derive(Clone, Debug)]
pub struct NarrativeConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let roadmap_year = std::env::var("TOSABENDO_ROADMAP_YEAR")
            .ok()
            .and_then(|s| s.trim().parse::<i32>().ok());
        let database_path = std::env::var("TOSABENDO_DB").ok().map(PathBuf::from);

        Self {
            narrative: NarrativeConfig::from_env(),
            roadmap_year,
            database_path,
        }
    }

    /// A config with the narrative service switched off (for local use and tests).
    pub fn disabled() -> Self {
        Self {
            narrative: NarrativeConfig::disabled(),
            roadmap_year: None,
            database_path: None,
        }
    }

    /// A config pointing the narrative client at a specific endpoint.
    pub fn with_narrative_url(url: impl Into<String>) -> Self {
        Self {
            narrative: NarrativeConfig {
                url: Some(url.into()),
                ..NarrativeConfig::disabled()
            },
            ..Self::disabled()
        }
    }
}

impl NarrativeConfig {
    pub fn from_env() -> Self {
        let url = std::env::var("TOSABENDO_NARRATIVE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let api_key = std::env::var("TOSABENDO_NARRATIVE_API_KEY").ok();
        let timeout = std::env::var("TOSABENDO_NARRATIVE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_NARRATIVE_TIMEOUT);

        Self {
            url,
            api_key,
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout: DEFAULT_NARRATIVE_TIMEOUT,
        }
    }
}
