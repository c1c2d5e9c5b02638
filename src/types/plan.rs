//! Subscription plan tiers and pricing

use crate::types::SubtrackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier for an external service.
///
/// A service with no stored assignment is on `Free`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Basic,
    Pro,
}

impl Plan {
    pub fn is_paid(self) -> bool {
        !matches!(self, Plan::Free)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = SubtrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "basic" => Ok(Plan::Basic),
            "pro" => Ok(Plan::Pro),
            other => Err(SubtrackError::Parse(format!("unknown plan '{}'", other))),
        }
    }
}

/// Monthly price table for the paid tiers, in whole dollars.
///
/// `Free` always costs 0. Injected into the statistics functions so tests
/// can substitute their own prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanCatalog {
    basic: u32,
    pro: u32,
}

impl PlanCatalog {
    pub const fn new(basic: u32, pro: u32) -> Self {
        Self { basic, pro }
    }

    /// Monthly price for a plan in whole dollars.
    pub fn monthly_price(&self, plan: Plan) -> u32 {
        match plan {
            Plan::Free => 0,
            Plan::Basic => self.basic,
            Plan::Pro => self.pro,
        }
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::new(9, 19)
    }
}

/// Stored plan assignment for one service.
///
/// At most one assignment exists per `service_name`; a service without one
/// resolves to `Plan::Free`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanAssignment {
    pub service_name: String,
    pub plan: Plan,
}
