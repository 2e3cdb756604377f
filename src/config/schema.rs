use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ingest::IngestConfig;
use crate::scoring::MatchConfig;

/// Top-level configuration file.
///
/// Example YAML:
/// ```yaml
/// listings: ~/autofinder/listings.json
/// matching:
///   limit: 10
///   filters:
///     required_rows: 3
/// ingest:
///   timeout: 20s
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listing store location (defaults to ~/.config/autofinder/listings.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listings: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching: Option<MatchConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestConfig>,
}
