use super::criteria::{Normalization, Subcriterion};
use crate::listing::Listing;

/// Observed min/max of one numeric attribute across the candidate set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Range of the finite values, or None when there are none.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Range> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Range>, v| match acc {
                None => Some(Range { min: v, max: v }),
                Some(r) => Some(Range {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Bounds for every range-relative attribute, computed once per request
/// over the filtered candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateBounds {
    pub price: Option<Range>,
    pub miles: Option<Range>,
    pub year: Option<Range>,
    pub fuel_efficiency: Option<Range>,
    pub accidents_count: Option<Range>,
    pub recalls_open: Option<Range>,
}

impl CandidateBounds {
    pub fn from_candidates(candidates: &[&Listing]) -> Self {
        let range = |sub: Subcriterion| Range::of(candidates.iter().filter_map(|l| numeric_value(l, sub)));
        Self {
            price: range(Subcriterion::Price),
            miles: range(Subcriterion::Miles),
            year: range(Subcriterion::Year),
            fuel_efficiency: range(Subcriterion::FuelEfficiency),
            accidents_count: range(Subcriterion::AccidentsCount),
            recalls_open: range(Subcriterion::RecallsOpen),
        }
    }

    pub fn range(&self, sub: Subcriterion) -> Option<Range> {
        match sub {
            Subcriterion::Price => self.price,
            Subcriterion::Miles => self.miles,
            Subcriterion::Year => self.year,
            Subcriterion::FuelEfficiency => self.fuel_efficiency,
            Subcriterion::AccidentsCount => self.accidents_count,
            Subcriterion::RecallsOpen => self.recalls_open,
            _ => None,
        }
    }
}

/// Request-wide inputs the per-listing scorer needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringContext {
    pub bounds: CandidateBounds,
    pub required_rows: Option<u32>,
}

/// Numeric view of a listing attribute, for the subcriteria that have one.
pub fn numeric_value(listing: &Listing, sub: Subcriterion) -> Option<f64> {
    match sub {
        Subcriterion::Price => listing.price.map(f64::from),
        Subcriterion::Miles => listing.miles.map(f64::from),
        Subcriterion::Year => listing.year.map(f64::from),
        Subcriterion::FuelEfficiency => listing.fuel_efficiency,
        Subcriterion::AccidentsCount => listing.accidents_count.map(f64::from),
        Subcriterion::RecallsOpen => listing.recalls_open.map(f64::from),
        Subcriterion::MechanicalState => listing.mechanical_state,
        Subcriterion::SafetyScore => listing.safety_score,
        Subcriterion::ComfortTechScore => listing.comfort_tech_score,
        _ => None,
    }
}

/// Utility in [0, 1] of one subcriterion for one listing, driven by the
/// subcriterion's policy.
pub fn attribute_utility(listing: &Listing, sub: Subcriterion, ctx: &ScoringContext) -> f64 {
    let policy = sub.policy();
    let neutral = policy.neutral;
    let range = ctx.bounds.range(sub);
    let value = numeric_value(listing, sub);

    let utility = match policy.kind {
        Normalization::Cost => cost_utility(value, range, neutral),
        Normalization::Benefit => benefit_utility(value, range, neutral),
        Normalization::CountCost => count_cost_utility(value, range, neutral),
        Normalization::Rating5 => rating_utility(value, 5.0, neutral),
        Normalization::Unit => rating_utility(value, 1.0, neutral),
        Normalization::TitleLookup => title_condition_utility(listing.title_condition.as_deref(), neutral),
        Normalization::AgeLookup => age_category_utility(listing.age_category.as_deref(), neutral),
        Normalization::NegativeFlag => negative_flag_utility(listing.odometer_issue, neutral),
        Normalization::SeatingFit => seating_fit_utility(listing.rows, ctx.required_rows, neutral),
        Normalization::DrivetrainSnow => drivetrain_snow_utility(listing.drivetrain.as_deref(), neutral),
    };

    utility.clamp(0.0, 1.0)
}

/// Lower is better.
pub fn cost_utility(value: Option<f64>, range: Option<Range>, neutral: f64) -> f64 {
    match (value, range) {
        (Some(v), Some(r)) if v.is_finite() && !r.is_degenerate() => {
            ((r.max - v) / r.span()).clamp(0.0, 1.0)
        }
        _ => neutral,
    }
}

/// Higher is better.
pub fn benefit_utility(value: Option<f64>, range: Option<Range>, neutral: f64) -> f64 {
    match (value, range) {
        (Some(v), Some(r)) if v.is_finite() && !r.is_degenerate() => {
            ((v - r.min) / r.span()).clamp(0.0, 1.0)
        }
        _ => neutral,
    }
}

/// Cost over a count. Without variance, sparse data is not punished as
/// worst-case: a clean zero scores 1.0 and any other count 0.7.
pub fn count_cost_utility(value: Option<f64>, range: Option<Range>, neutral: f64) -> f64 {
    match (value, range) {
        (Some(v), Some(r)) if !r.is_degenerate() => cost_utility(Some(v), Some(r), neutral),
        (Some(v), _) if v == 0.0 => 1.0,
        (Some(_), _) => 0.7,
        (None, _) => neutral,
    }
}

/// Rating on a 0..=scale scale.
pub fn rating_utility(value: Option<f64>, scale: f64, neutral: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => (v / scale).clamp(0.0, 1.0),
        _ => neutral,
    }
}

pub fn title_condition_utility(title: Option<&str>, unknown: f64) -> f64 {
    match title.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        Some("clean") => 1.0,
        Some("cpo") => 0.95,
        Some("rebuilt") => 0.5,
        Some("salvage") => 0.1,
        _ => unknown,
    }
}

pub fn age_category_utility(age_category: Option<&str>, unknown: f64) -> f64 {
    match age_category.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("new") => 1.0,
        Some("cpo") => 0.9,
        Some("used") => 0.7,
        _ => unknown,
    }
}

/// For flags like odometer_issue where `true` is bad.
pub fn negative_flag_utility(flag: Option<bool>, neutral: f64) -> f64 {
    match flag {
        Some(true) => 0.1,
        Some(false) => 1.0,
        None => neutral,
    }
}

pub fn seating_fit_utility(rows: Option<u32>, required_rows: Option<u32>, neutral: f64) -> f64 {
    let (Some(required), Some(rows)) = (required_rows, rows) else {
        return neutral;
    };

    if rows >= required {
        1.0
    } else if required >= 3 && rows == 2 {
        // two rows still seats most of a family
        0.3
    } else {
        0.1
    }
}

pub fn drivetrain_snow_utility(drivetrain: Option<&str>, unknown: f64) -> f64 {
    match drivetrain.map(|d| d.trim().to_ascii_uppercase()).as_deref() {
        Some("AWD") | Some("4X4") | Some("4WD") => 1.0,
        Some("FWD") => 0.6,
        Some("RWD") => 0.3,
        _ => unknown,
    }
}
