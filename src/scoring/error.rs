use thiserror::Error;

/// Fatal configuration problems detected while deriving weights.
///
/// Degenerate ranges, missing attributes and empty candidate sets are not
/// errors; they resolve to neutral utilities or an empty response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("no importance values to normalize for {level}")]
    EmptyImportance { level: String },

    #[error("criteria hierarchy is empty")]
    EmptyHierarchy,
}
