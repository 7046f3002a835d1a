//! Site and site money-movement models.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A construction site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Unique identifier for the site.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Location description.
    #[serde(default)]
    pub location: String,
    /// The day work started.
    pub start_at: NaiveDate,
    /// The day the site was handed over, if it has been.
    #[serde(default)]
    pub handover: Option<NaiveDate>,
}

/// Cash received by a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCash {
    /// Unique identifier.
    pub id: Uuid,
    /// The receiving site.
    pub site_id: String,
    /// The day the cash was received.
    pub date: NaiveDate,
    /// Short description.
    pub title: String,
    /// Amount received.
    pub amount: Decimal,
}

/// The two kinds of site cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    /// Materials and equipment.
    Equipment,
    /// Everything else.
    Other,
}

impl CostKind {
    /// The stored and serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            CostKind::Equipment => "equipment",
            CostKind::Other => "other",
        }
    }
}

impl FromStr for CostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equipment" => Ok(CostKind::Equipment),
            "other" => Ok(CostKind::Other),
            other => Err(format!("unknown cost kind '{other}'")),
        }
    }
}

/// Money spent by a site on something other than labour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCost {
    /// Unique identifier.
    pub id: Uuid,
    /// The spending site.
    pub site_id: String,
    /// The day the cost was incurred.
    pub date: NaiveDate,
    /// Equipment or other.
    pub kind: CostKind,
    /// Short description.
    pub title: String,
    /// Amount spent.
    pub amount: Decimal,
}

/// An amount billed to the client for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteBill {
    /// Unique identifier.
    pub id: Uuid,
    /// The billed site.
    pub site_id: String,
    /// The billing day.
    pub date: NaiveDate,
    /// Short description.
    pub title: String,
    /// Amount billed.
    pub amount: Decimal,
}
