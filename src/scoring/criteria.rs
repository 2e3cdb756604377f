use serde::{Deserialize, Serialize};
use std::fmt;

/// Top level of the criteria hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Economic,
    Condition,
    Risk,
    Fit,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Economic, Group::Condition, Group::Risk, Group::Fit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Economic => "economic",
            Group::Condition => "condition",
            Group::Risk => "risk",
            Group::Fit => "fit",
        }
    }

    /// Subcriteria belonging to this group, in display order.
    pub fn subcriteria(&self) -> &'static [Subcriterion] {
        match self {
            Group::Economic => &[Subcriterion::Price, Subcriterion::FuelEfficiency],
            Group::Condition => &[
                Subcriterion::Miles,
                Subcriterion::Year,
                Subcriterion::AgeCategory,
                Subcriterion::MechanicalState,
            ],
            Group::Risk => &[
                Subcriterion::TitleCondition,
                Subcriterion::AccidentsCount,
                Subcriterion::OdometerIssue,
                Subcriterion::RecallsOpen,
            ],
            Group::Fit => &[
                Subcriterion::SeatingFit,
                Subcriterion::DrivetrainSnow,
                Subcriterion::SafetyScore,
                Subcriterion::ComfortTechScore,
            ],
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Second level of the criteria hierarchy. Serialized names match the
/// keys buyers use in their preference files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcriterion {
    Price,
    FuelEfficiency,
    Miles,
    Year,
    AgeCategory,
    MechanicalState,
    TitleCondition,
    AccidentsCount,
    OdometerIssue,
    RecallsOpen,
    #[serde(rename = "seating_fit_score")]
    SeatingFit,
    #[serde(rename = "drivetrain_snow_score")]
    DrivetrainSnow,
    SafetyScore,
    ComfortTechScore,
}

impl Subcriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcriterion::Price => "price",
            Subcriterion::FuelEfficiency => "fuel_efficiency",
            Subcriterion::Miles => "miles",
            Subcriterion::Year => "year",
            Subcriterion::AgeCategory => "age_category",
            Subcriterion::MechanicalState => "mechanical_state",
            Subcriterion::TitleCondition => "title_condition",
            Subcriterion::AccidentsCount => "accidents_count",
            Subcriterion::OdometerIssue => "odometer_issue",
            Subcriterion::RecallsOpen => "recalls_open",
            Subcriterion::SeatingFit => "seating_fit_score",
            Subcriterion::DrivetrainSnow => "drivetrain_snow_score",
            Subcriterion::SafetyScore => "safety_score",
            Subcriterion::ComfortTechScore => "comfort_tech_score",
        }
    }

    pub fn group(&self) -> Group {
        match self {
            Subcriterion::Price | Subcriterion::FuelEfficiency => Group::Economic,
            Subcriterion::Miles
            | Subcriterion::Year
            | Subcriterion::AgeCategory
            | Subcriterion::MechanicalState => Group::Condition,
            Subcriterion::TitleCondition
            | Subcriterion::AccidentsCount
            | Subcriterion::OdometerIssue
            | Subcriterion::RecallsOpen => Group::Risk,
            Subcriterion::SeatingFit
            | Subcriterion::DrivetrainSnow
            | Subcriterion::SafetyScore
            | Subcriterion::ComfortTechScore => Group::Fit,
        }
    }

    /// Normalization policy for this subcriterion.
    pub fn policy(&self) -> &'static AttributePolicy {
        ATTRIBUTE_POLICIES
            .iter()
            .find(|p| p.subcriterion == *self)
            .unwrap_or(&FALLBACK_POLICY)
    }
}

impl fmt::Display for Subcriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw listing attribute becomes a utility in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Lower is better, min/max taken over the candidate set.
    Cost,
    /// Higher is better, min/max taken over the candidate set.
    Benefit,
    /// Cost over counts; without variance an explicit zero scores 1.0 and
    /// any other count 0.7.
    CountCost,
    /// 0-5 rating divided by five.
    Rating5,
    /// Already on a 0-1 scale.
    Unit,
    TitleLookup,
    AgeLookup,
    /// A flag where `true` is bad.
    NegativeFlag,
    SeatingFit,
    DrivetrainSnow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributePolicy {
    pub subcriterion: Subcriterion,
    pub kind: Normalization,
    /// Utility used when the attribute (or its bounds) is unavailable.
    pub neutral: f64,
}

const fn policy(subcriterion: Subcriterion, kind: Normalization, neutral: f64) -> AttributePolicy {
    AttributePolicy {
        subcriterion,
        kind,
        neutral,
    }
}

pub static ATTRIBUTE_POLICIES: [AttributePolicy; 14] = [
    policy(Subcriterion::Price, Normalization::Cost, 0.5),
    policy(Subcriterion::FuelEfficiency, Normalization::Benefit, 0.5),
    policy(Subcriterion::Miles, Normalization::Cost, 0.5),
    policy(Subcriterion::Year, Normalization::Benefit, 0.5),
    policy(Subcriterion::AgeCategory, Normalization::AgeLookup, 0.7),
    policy(Subcriterion::MechanicalState, Normalization::Rating5, 0.5),
    policy(Subcriterion::TitleCondition, Normalization::TitleLookup, 0.4),
    policy(Subcriterion::AccidentsCount, Normalization::CountCost, 0.5),
    policy(Subcriterion::OdometerIssue, Normalization::NegativeFlag, 0.5),
    policy(Subcriterion::RecallsOpen, Normalization::CountCost, 0.5),
    policy(Subcriterion::SeatingFit, Normalization::SeatingFit, 0.5),
    policy(Subcriterion::DrivetrainSnow, Normalization::DrivetrainSnow, 0.5),
    policy(Subcriterion::SafetyScore, Normalization::Rating5, 0.5),
    policy(Subcriterion::ComfortTechScore, Normalization::Unit, 0.5),
];

// Unreachable while every subcriterion has a table entry.
static FALLBACK_POLICY: AttributePolicy = policy(Subcriterion::Price, Normalization::Unit, 0.5);

/// The static two-level hierarchy: every group with its subcriteria.
pub fn hierarchy() -> impl Iterator<Item = (Group, &'static [Subcriterion])> {
    Group::ALL.into_iter().map(|g| (g, g.subcriteria()))
}
