use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Knobs for fetching listing pages.
///
/// Example YAML:
/// ```yaml
/// ingest:
///   timeout: 15s
///   retries: 3
///   max_concurrent: 4
///   cache: true
///   cache_ttl: 6h
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Per-request timeout (humantime, e.g. "15s")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Attempts per URL, counting the first one
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Pages fetched at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Overrides the browser-like User-Agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Keep fetched pages on disk (disable per run with --no-cache)
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// How long a cached page is served before fetching again
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
}

fn default_timeout() -> String {
    "15s".to_string()
}

fn default_retries() -> usize {
    3
}

fn default_max_concurrent() -> usize {
    4
}

fn default_cache() -> bool {
    true
}

fn default_cache_ttl() -> String {
    "6h".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            max_concurrent: default_max_concurrent(),
            user_agent: None,
            cache: default_cache(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

impl IngestConfig {
    pub fn timeout_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.timeout)
    }

    pub fn cache_ttl_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.cache_ttl)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Validate ingestion settings. Returns all validation errors at once.
pub fn validate_ingest(config: &IngestConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match config.timeout_duration() {
        Ok(d) if d.is_zero() => errors.push("ingest.timeout: must be greater than zero".to_string()),
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "ingest.timeout: invalid duration '{}' - {}",
            config.timeout, e
        )),
    }

    if let Err(e) = config.cache_ttl_duration() {
        errors.push(format!(
            "ingest.cache_ttl: invalid duration '{}' - {}",
            config.cache_ttl, e
        ));
    }

    if config.retries == 0 {
        errors.push("ingest.retries: must be at least 1".to_string());
    }

    if config.max_concurrent == 0 {
        errors.push("ingest.max_concurrent: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.timeout_duration().unwrap(), Duration::from_secs(15));
        assert_eq!(config.retries, 3);
        assert!(config.user_agent().starts_with("Mozilla/5.0"));
        assert!(validate_ingest(&config).is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: IngestConfig = serde_saphyr::from_str("timeout: 30s\nmax_concurrent: 2\n").unwrap();
        assert_eq!(config.timeout_duration().unwrap(), Duration::from_secs(30));
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.retries, 3);
        assert!(config.cache);
    }

    #[test]
    fn test_invalid_values_collected() {
        let config = IngestConfig {
            timeout: "soon".to_string(),
            retries: 0,
            max_concurrent: 0,
            cache_ttl: "forever".to_string(),
            ..IngestConfig::default()
        };
        let errors = validate_ingest(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("ingest.timeout"));
        assert!(errors[1].starts_with("ingest.cache_ttl"));
        assert!(errors[2].starts_with("ingest.retries"));
        assert!(errors[3].starts_with("ingest.max_concurrent"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = IngestConfig {
            timeout: "0s".to_string(),
            ..IngestConfig::default()
        };
        assert!(validate_ingest(&config).is_err());
    }
}
