use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::criteria::{Group, Subcriterion};
use super::weights::DEFAULT_IMPORTANCE;

/// Matching configuration: everything the engine needs besides the listings.
///
/// Example YAML:
/// ```yaml
/// matching:
///   mode: hierarchical
///   limit: 10
///   filters:
///     min_year: 2015
///     required_rows: 3
///     required_drivetrains: ["AWD", "4x4"]
///   importance:
///     groups: { economic: 5, risk: 4 }
///     subcriteria:
///       economic: { price: 5, fuel_efficiency: 2 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Which weighting scheme ranks the candidates (default: hierarchical)
    #[serde(default)]
    pub mode: ScoringMode,

    /// Maximum number of results (default: 20); 0 means no limit
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,

    /// Non-negotiable constraints applied before scoring
    #[serde(default)]
    pub filters: Option<HardFilters>,

    /// Importance levels (1-5) for the hierarchical mode
    #[serde(default)]
    pub importance: ImportanceConfig,

    /// Weights (0-5) for the flat mode
    #[serde(default)]
    pub flat_weights: FlatWeights,

    /// Preferred body style for the flat mode (e.g. "SUV")
    #[serde(default)]
    pub body_style_preference: Option<String>,
}

fn default_limit() -> Option<usize> {
    Some(20)
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Hierarchical,
            limit: default_limit(),
            filters: None,
            importance: ImportanceConfig::default(),
            flat_weights: FlatWeights::default(),
            body_style_preference: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Group and subcriterion weights, attribute policies, absolute 0-100 score
    #[default]
    Hierarchical,
    /// Single-level weights, score rescaled across the candidate set
    Flat,
}

/// Hard constraints. Every field is optional; an unset field (or an empty
/// list) does not constrain anything.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HardFilters {
    /// Accepted age categories, e.g. ["used", "cpo"]
    #[serde(default)]
    pub age_categories_allowed: Option<Vec<String>>,

    #[serde(default)]
    pub min_year: Option<i32>,

    #[serde(default)]
    pub max_year: Option<i32>,

    #[serde(default)]
    pub min_price: Option<u32>,

    #[serde(default)]
    pub max_price: Option<u32>,

    #[serde(default)]
    pub max_miles: Option<u32>,

    /// Minimum number of seating rows, e.g. 3 for a third row
    #[serde(default)]
    pub required_rows: Option<u32>,

    /// Accepted drivetrains, e.g. ["AWD", "4x4"]
    #[serde(default)]
    pub required_drivetrains: Option<Vec<String>>,

    #[serde(default)]
    pub allowed_makes: Option<Vec<String>>,

    #[serde(default)]
    pub allowed_models: Option<Vec<String>>,

    #[serde(default)]
    pub allowed_trims: Option<Vec<String>>,
}

/// Importance levels supplied by the buyer.
///
/// Omitting a whole map selects the built-in defaults; omitting a single
/// entry inside a map that is present selects medium importance (3).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ImportanceConfig {
    #[serde(default)]
    pub groups: Option<BTreeMap<Group, i32>>,

    #[serde(default)]
    pub subcriteria: Option<BTreeMap<Group, BTreeMap<Subcriterion, i32>>>,
}

impl ImportanceConfig {
    pub fn group_importance(&self, group: Group) -> i32 {
        match &self.groups {
            Some(groups) if !groups.is_empty() => {
                groups.get(&group).copied().unwrap_or(DEFAULT_IMPORTANCE)
            }
            _ => default_group_importance(group),
        }
    }

    pub fn sub_importance(&self, group: Group, sub: Subcriterion) -> i32 {
        let explicit = self
            .subcriteria
            .as_ref()
            .filter(|subs| !subs.is_empty())
            .and_then(|subs| subs.get(&group));

        match explicit {
            Some(entries) => entries.get(&sub).copied().unwrap_or(DEFAULT_IMPORTANCE),
            None => default_sub_importance(sub),
        }
    }
}

/// Shipped group importance: money and risk matter most.
pub fn default_group_importance(group: Group) -> i32 {
    match group {
        Group::Economic => 5,
        Group::Condition => 4,
        Group::Risk => 5,
        Group::Fit => 4,
    }
}

pub fn default_sub_importance(sub: Subcriterion) -> i32 {
    match sub {
        Subcriterion::Price => 5,
        Subcriterion::FuelEfficiency => 3,
        Subcriterion::Miles => 5,
        Subcriterion::Year => 3,
        Subcriterion::AgeCategory => 4,
        Subcriterion::MechanicalState => 3,
        Subcriterion::TitleCondition => 5,
        Subcriterion::AccidentsCount => 4,
        Subcriterion::OdometerIssue => 5,
        Subcriterion::RecallsOpen => 3,
        Subcriterion::SeatingFit => 5,
        Subcriterion::DrivetrainSnow => 5,
        Subcriterion::SafetyScore => 4,
        Subcriterion::ComfortTechScore => 3,
    }
}

/// Single-level weights for the flat mode, each 0-5.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FlatWeights {
    #[serde(default = "medium")]
    pub price: i32,
    #[serde(default = "medium")]
    pub mileage: i32,
    #[serde(default = "medium")]
    pub year: i32,
    #[serde(default = "medium")]
    pub third_row: i32,
    #[serde(default = "medium")]
    pub awd: i32,
    #[serde(default = "medium")]
    pub condition: i32,
    #[serde(default = "medium")]
    pub body_style: i32,
}

fn medium() -> i32 {
    DEFAULT_IMPORTANCE
}

impl Default for FlatWeights {
    fn default() -> Self {
        Self {
            price: 3,
            mileage: 3,
            year: 3,
            third_row: 3,
            awd: 3,
            condition: 3,
            body_style: 3,
        }
    }
}

impl FlatWeights {
    /// (criterion name, weight) pairs in display order.
    pub fn entries(&self) -> [(&'static str, i32); 7] {
        [
            ("price", self.price),
            ("mileage", self.mileage),
            ("year", self.year),
            ("third_row", self.third_row),
            ("awd", self.awd),
            ("condition", self.condition),
            ("body_style", self.body_style),
        ]
    }
}
