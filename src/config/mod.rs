pub mod init;
mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/autofinder/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("autofinder")
}

/// Get the default config file path (~/.config/autofinder/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Expand a leading "~/" to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/autofinder/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `autofinder init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}

/// Parse configuration YAML. An empty document is an empty config.
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_saphyr::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
}

/// Store path from the command line, then the config file, then the default.
pub fn resolve_store_path(cli: Option<PathBuf>, config: &Config) -> PathBuf {
    cli.or_else(|| config.listings.clone())
        .map(|p| expand_home(&p))
        .unwrap_or_else(crate::listing::get_store_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Group, ScoringMode, Subcriterion};

    #[test]
    fn test_load_missing_config_suggests_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("autofinder init"));
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
listings: /tmp/listings.json
matching:
  mode: flat
  limit: 5
  filters:
    min_year: 2015
    required_drivetrains: [AWD, 4x4]
  importance:
    groups:
      economic: 5
    subcriteria:
      fit:
        seating_fit_score: 5
  flat_weights:
    price: 5
  body_style_preference: SUV
ingest:
  timeout: 20s
  max_concurrent: 2
"#,
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.listings, Some(PathBuf::from("/tmp/listings.json")));

        let matching = config.matching.unwrap();
        assert_eq!(matching.mode, ScoringMode::Flat);
        assert_eq!(matching.limit, Some(5));
        assert_eq!(matching.filters.unwrap().min_year, Some(2015));
        assert_eq!(matching.importance.group_importance(Group::Economic), 5);
        assert_eq!(
            matching
                .importance
                .sub_importance(Group::Fit, Subcriterion::SeatingFit),
            5
        );
        assert_eq!(matching.flat_weights.price, 5);
        assert_eq!(matching.flat_weights.awd, 3);
        assert_eq!(matching.body_style_preference.as_deref(), Some("SUV"));

        let ingest = config.ingest.unwrap();
        assert_eq!(ingest.timeout, "20s");
        assert_eq!(ingest.max_concurrent, 2);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
        assert_eq!(parse_config("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_config("matching:\n  weights: {}\n").is_err());
    }

    #[test]
    fn test_resolve_store_path_precedence() {
        let config = Config {
            listings: Some(PathBuf::from("/data/from-config.json")),
            ..Config::default()
        };
        assert_eq!(
            resolve_store_path(Some(PathBuf::from("/data/cli.json")), &config),
            PathBuf::from("/data/cli.json")
        );
        assert_eq!(
            resolve_store_path(None, &config),
            PathBuf::from("/data/from-config.json")
        );
        assert!(resolve_store_path(None, &Config::default()).ends_with("autofinder/listings.json"));
    }
}
