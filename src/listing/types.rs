use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vehicle offered for sale. Only `id` is required; every other field may
/// be missing and scoring falls back to neutral values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Listing {
    /// Internal id, VIN, or source URL
    pub id: String,

    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default, alias = "mileage")]
    pub miles: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,

    /// "new", "used", "cpo"
    #[serde(default)]
    pub age_category: Option<String>,

    /// "clean", "rebuilt", "salvage", "cpo"
    #[serde(default)]
    pub title_condition: Option<String>,
    #[serde(default)]
    pub accidents_count: Option<u32>,
    #[serde(default)]
    pub odometer_issue: Option<bool>,
    #[serde(default)]
    pub recalls_open: Option<u32>,

    /// mpg or km/l, only compared within one candidate set
    #[serde(default)]
    pub fuel_efficiency: Option<f64>,
    /// 0-5
    #[serde(default)]
    pub mechanical_state: Option<f64>,
    /// 0-5
    #[serde(default)]
    pub safety_score: Option<f64>,
    /// 0-1
    #[serde(default)]
    pub comfort_tech_score: Option<f64>,

    /// "AWD", "4x4", "4WD", "FWD", "RWD"
    #[serde(default)]
    pub drivetrain: Option<String>,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub rows: Option<u32>,

    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub trim: Option<String>,
    #[serde(default)]
    pub body_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Domain the listing was ingested from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer: Option<Dealer>,
}

/// Seller contact, used only when composing lead e-mails.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Dealer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

const ALL_WHEEL_DRIVETRAINS: [&str; 3] = ["AWD", "4X4", "4WD"];

impl Listing {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// "2017 Honda Pilot EX-L", skipping whatever is unknown
    pub fn title(&self) -> String {
        let parts: Vec<String> = [
            self.year.map(|y| y.to_string()),
            self.make.clone(),
            self.model.clone(),
            self.trim.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect();

        if parts.is_empty() {
            self.id.clone()
        } else {
            parts.join(" ")
        }
    }

    /// True when the drivetrain sends power to all wheels.
    pub fn is_all_wheel_drive(&self) -> bool {
        self.drivetrain
            .as_deref()
            .map(|d| ALL_WHEEL_DRIVETRAINS.contains(&d.trim().to_ascii_uppercase().as_str()))
            .unwrap_or(false)
    }

    pub fn has_third_row(&self) -> bool {
        self.rows.map(|r| r >= 3).unwrap_or(false)
    }
}
