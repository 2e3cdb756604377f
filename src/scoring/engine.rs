use serde::Serialize;
use std::collections::BTreeMap;

use super::config::{MatchConfig, ScoringMode};
use super::criteria::{Group, Subcriterion};
use super::error::ScoringError;
use super::factors::{
    attribute_utility, benefit_utility, cost_utility, numeric_value, CandidateBounds,
    ScoringContext,
};
use super::filter::filter_listings;
use super::ranker::rank;
use super::weights::{normalize_raw, HierarchicalWeights};
use crate::listing::Listing;

/// Everything that went into one listing's score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Utility in [0, 1] per criterion
    pub sub_scores: BTreeMap<String, f64>,
    /// Contribution (0-100 scale) per group
    pub group_scores: BTreeMap<String, f64>,
    /// Global weight per criterion
    pub weights_sub: BTreeMap<String, f64>,
    pub weights_groups: BTreeMap<String, f64>,
    /// Weighted sum before rescaling (flat mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    pub listing: Listing,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResponse {
    /// Listings left after hard filtering
    pub total_candidates: usize,
    /// Listings left after the limit
    pub returned: usize,
    pub results: Vec<ScoredListing>,
}

impl MatchResponse {
    fn empty() -> Self {
        Self {
            total_candidates: 0,
            returned: 0,
            results: Vec::new(),
        }
    }
}

/// A way of turning filtered candidates into scored results.
///
/// Implementations see the whole candidate set at once because some
/// utilities are relative to the observed range.
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, candidates: &[&Listing]) -> Vec<ScoredListing>;
}

/// Two-level weighting: groups, then subcriteria inside each group.
#[derive(Debug, Clone)]
pub struct HierarchicalStrategy {
    weights: HierarchicalWeights,
    required_rows: Option<u32>,
}

impl HierarchicalStrategy {
    pub fn new(config: &MatchConfig) -> Result<Self, ScoringError> {
        Ok(Self {
            weights: HierarchicalWeights::derive(&config.importance)?,
            required_rows: config.filters.as_ref().and_then(|f| f.required_rows),
        })
    }

    fn score_one(&self, listing: &Listing, ctx: &ScoringContext) -> ScoredListing {
        let mut sub_scores = BTreeMap::new();
        let mut group_scores = BTreeMap::new();
        let mut score = 0.0;

        for (group, subs) in &self.weights.local {
            let mut contribution = 0.0;
            for sub in subs.keys() {
                let utility = attribute_utility(listing, *sub, ctx);
                let weighted = 100.0 * self.weights.global_weight(*sub) * utility;
                contribution += weighted;
                score += weighted;
                sub_scores.insert(sub.as_str().to_string(), utility);
            }
            group_scores.insert(group.as_str().to_string(), contribution.clamp(0.0, 100.0));
        }

        // global weights sum to 1 only up to rounding
        ScoredListing {
            listing: listing.clone(),
            score: score.clamp(0.0, 100.0),
            breakdown: ScoreBreakdown {
                sub_scores,
                group_scores,
                weights_sub: self
                    .weights
                    .global
                    .iter()
                    .map(|(sub, w)| (sub.as_str().to_string(), *w))
                    .collect(),
                weights_groups: self
                    .weights
                    .groups
                    .iter()
                    .map(|(group, w)| (group.as_str().to_string(), *w))
                    .collect(),
                raw_score: None,
            },
        }
    }
}

impl ScoringStrategy for HierarchicalStrategy {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn score(&self, candidates: &[&Listing]) -> Vec<ScoredListing> {
        let ctx = ScoringContext {
            bounds: CandidateBounds::from_candidates(candidates),
            required_rows: self.required_rows,
        };
        candidates.iter().map(|l| self.score_one(l, &ctx)).collect()
    }
}

const FLAT_GROUP: &str = "flat";

/// Single-level weighting with scores rescaled across the candidate set.
///
/// A flat score says how a listing compares with the others in the same
/// request, not how good it is in absolute terms.
#[derive(Debug, Clone)]
pub struct FlatStrategy {
    weights: BTreeMap<&'static str, f64>,
    allowed_age_categories: Option<Vec<String>>,
    body_style_preference: Option<String>,
}

impl FlatStrategy {
    pub fn new(config: &MatchConfig) -> Result<Self, ScoringError> {
        let raw: BTreeMap<&'static str, f64> = config
            .flat_weights
            .entries()
            .into_iter()
            .map(|(name, w)| (name, f64::from(w.max(0))))
            .collect();

        Ok(Self {
            weights: normalize_raw(&raw, "flat weights")?,
            allowed_age_categories: config
                .filters
                .as_ref()
                .and_then(|f| f.age_categories_allowed.clone())
                .filter(|list| !list.is_empty()),
            body_style_preference: config
                .body_style_preference
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }

    fn utilities(&self, listing: &Listing, bounds: &CandidateBounds) -> BTreeMap<&'static str, f64> {
        let neutral = 0.5;
        let condition = match (&self.allowed_age_categories, listing.age_category.as_deref()) {
            (Some(allowed), Some(age)) => {
                if allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(age.trim())) {
                    1.0
                } else {
                    0.0
                }
            }
            (Some(_), None) => 0.0,
            (None, _) => neutral,
        };
        let body_style = match (&self.body_style_preference, listing.body_style.as_deref()) {
            (Some(preferred), Some(style)) => {
                if preferred.eq_ignore_ascii_case(style.trim()) {
                    1.0
                } else {
                    0.0
                }
            }
            _ => neutral,
        };

        BTreeMap::from([
            (
                "price",
                cost_utility(
                    numeric_value(listing, Subcriterion::Price),
                    bounds.price,
                    neutral,
                ),
            ),
            (
                "mileage",
                cost_utility(
                    numeric_value(listing, Subcriterion::Miles),
                    bounds.miles,
                    neutral,
                ),
            ),
            (
                "year",
                benefit_utility(
                    numeric_value(listing, Subcriterion::Year),
                    bounds.year,
                    neutral,
                ),
            ),
            ("third_row", if listing.has_third_row() { 1.0 } else { 0.0 }),
            ("awd", if listing.is_all_wheel_drive() { 1.0 } else { 0.0 }),
            ("condition", condition),
            ("body_style", body_style),
        ])
    }
}

impl ScoringStrategy for FlatStrategy {
    fn name(&self) -> &'static str {
        FLAT_GROUP
    }

    fn score(&self, candidates: &[&Listing]) -> Vec<ScoredListing> {
        let bounds = CandidateBounds::from_candidates(candidates);

        let raw: Vec<(BTreeMap<&'static str, f64>, f64)> = candidates
            .iter()
            .map(|listing| {
                let utilities = self.utilities(listing, &bounds);
                let raw_score = utilities
                    .iter()
                    .map(|(name, s)| self.weights.get(name).copied().unwrap_or(0.0) * s)
                    .sum();
                (utilities, raw_score)
            })
            .collect();

        let (min, max) = raw.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, r)| {
            (lo.min(*r), hi.max(*r))
        });

        candidates
            .iter()
            .zip(raw)
            .map(|(listing, (utilities, raw_score))| {
                let score = if max > min {
                    (raw_score - min) / (max - min) * 100.0
                } else {
                    50.0
                };

                ScoredListing {
                    listing: (*listing).clone(),
                    score,
                    breakdown: ScoreBreakdown {
                        sub_scores: utilities
                            .into_iter()
                            .map(|(name, s)| (name.to_string(), s))
                            .collect(),
                        group_scores: BTreeMap::from([(FLAT_GROUP.to_string(), 100.0 * raw_score)]),
                        weights_sub: self
                            .weights
                            .iter()
                            .map(|(name, w)| (name.to_string(), *w))
                            .collect(),
                        weights_groups: BTreeMap::from([(FLAT_GROUP.to_string(), 1.0)]),
                        raw_score: Some(raw_score),
                    },
                }
            })
            .collect()
    }
}

/// Pick the strategy the configuration asks for.
pub fn build_strategy(config: &MatchConfig) -> Result<Box<dyn ScoringStrategy>, ScoringError> {
    Ok(match config.mode {
        ScoringMode::Hierarchical => Box::new(HierarchicalStrategy::new(config)?),
        ScoringMode::Flat => Box::new(FlatStrategy::new(config)?),
    })
}

/// Filter, score and rank listings.
///
/// Weights are derived before anything else, so a broken configuration
/// fails even when no listing survives the filters.
pub fn rank_listings(listings: &[Listing], config: &MatchConfig) -> Result<MatchResponse, ScoringError> {
    let strategy = build_strategy(config)?;

    let candidates = filter_listings(listings, config.filters.as_ref());
    tracing::debug!(
        total = listings.len(),
        kept = candidates.len(),
        "applied hard filters"
    );

    if candidates.is_empty() {
        return Ok(MatchResponse::empty());
    }

    let scored = strategy.score(&candidates);
    tracing::debug!(strategy = strategy.name(), scored = scored.len(), "scored candidates");

    let results = rank(scored, config.limit);

    Ok(MatchResponse {
        total_candidates: candidates.len(),
        returned: results.len(),
        results,
    })
}

/// Sum of the per-group contributions; equals the overall score in
/// hierarchical mode.
pub fn group_total(breakdown: &ScoreBreakdown) -> f64 {
    Group::ALL
        .iter()
        .filter_map(|g| breakdown.group_scores.get(g.as_str()))
        .sum()
}
