pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod factors;
pub mod filter;
pub mod ranker;
pub mod validation;
pub mod weights;

pub use config::*;
pub use criteria::{hierarchy, AttributePolicy, Group, Normalization, Subcriterion};
pub use engine::{
    build_strategy, group_total, rank_listings, FlatStrategy, HierarchicalStrategy, MatchResponse,
    ScoreBreakdown, ScoredListing, ScoringStrategy,
};
pub use error::ScoringError;
pub use factors::{attribute_utility, CandidateBounds, ScoringContext};
pub use filter::{filter_listings, passes_filters};
pub use ranker::rank;
pub use validation::validate_matching;
pub use weights::{normalize_importance, scale_weight, HierarchicalWeights};
