// Configuration for the server, read from the environment

use std::{path::PathBuf, time::Duration};

use copysynth_core::CopySynthesisConfig;

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    /// Budget for one copy-synthesis run; kept below the request timeout so
    /// the handler answers 504 before the timeout layer cuts the connection.
    pub synthesis_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub synthesis: CopySynthesisConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            rate_limit_per_minute: 60,
            request_timeout_secs: 60,
            synthesis_timeout_secs: 30,
            cors_allowed_origins: None,
            synthesis: CopySynthesisConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_parse("PORT").unwrap_or(defaults.port);

        let rate_limit_per_minute =
            env_parse("RATE_LIMIT_PER_MINUTE").unwrap_or(defaults.rate_limit_per_minute);

        let request_timeout_secs =
            env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.request_timeout_secs);

        let synthesis_timeout_secs =
            env_parse("SYNTHESIS_TIMEOUT_SECS").unwrap_or(defaults.synthesis_timeout_secs);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect()
            });

        let mut synthesis = defaults.synthesis;
        if let Ok(suffix) = std::env::var("MARKUP_SUFFIX") {
            synthesis.markup_suffix = suffix;
        }
        if let Ok(suffix) = std::env::var("FRAME_SUFFIX") {
            synthesis.frame_suffix = suffix;
        }
        synthesis.expected_columns = env_parse("FRAME_COLUMNS");
        synthesis.fetch_timeout_secs = env_parse("FETCH_TIMEOUT_SECS");
        synthesis.resource_root = std::env::var("RESOURCE_ROOT")
            .ok()
            .filter(|root| !root.trim().is_empty())
            .map(PathBuf::from);

        Self {
            port,
            rate_limit_per_minute,
            request_timeout_secs,
            synthesis_timeout_secs,
            cors_allowed_origins,
            synthesis,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }
}
