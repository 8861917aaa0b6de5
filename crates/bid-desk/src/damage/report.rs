use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::severity::SeverityBreakdown;

/// Three-level severity bucket derived from a 1-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

impl SeverityLevel {
    /// `<= 3` low, `<= 6` medium, otherwise high.
    pub fn from_score(score: f64) -> Self {
        if score <= 3.0 {
            Self::Low
        } else if score <= 6.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Roadworthiness {
    Yes,
    No,
    #[default]
    Unknown,
}

/// Ordered `low <= mid <= high` estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostRange {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl CostRange {
    pub fn flat(value: f64) -> Self {
        Self {
            low: value,
            mid: value,
            high: value,
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            low: self.low * factor,
            mid: self.mid * factor,
            high: self.high * factor,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.low == 0.0 && self.mid == 0.0 && self.high == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartReplacement {
    pub part_name: String,
    pub reason: String,
    pub evidence: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInspection {
    pub part_name: String,
    pub suspicion: String,
    pub inspection_method: String,
    pub confidence: f64,
}

/// AED estimate. The scalar fields mirror the legacy single-number format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AedCostEstimate {
    pub parts_range: CostRange,
    pub labor_range: CostRange,
    pub total_range: CostRange,
    #[serde(alias = "teile")]
    pub parts: f64,
    #[serde(alias = "arbeit")]
    pub labor: f64,
    #[serde(alias = "gesamt")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EurCostEstimate {
    pub total_range: CostRange,
    pub exchange_rate_used: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborLineItem {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborHoursEstimate {
    pub hours_range: CostRange,
    pub line_items: Vec<LaborLineItem>,
}

/// Strictly-shaped result of one damage analysis run. Replaces any earlier report wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    pub component: String,
    pub damage_narrative: String,
    pub severity_score: u8,
    pub severity: SeverityLevel,
    pub repair_approach: String,
    pub parts_to_replace: Vec<PartReplacement>,
    pub parts_to_inspect: Vec<PartInspection>,
    pub cost_aed: AedCostEstimate,
    pub cost_eur: EurCostEstimate,
    /// EUR; mid of `cost_eur.total_range`. Feeds the cost model's AI fallback.
    pub estimated_repair_cost: f64,
    pub labor_hours_estimate: Option<LaborHoursEstimate>,
    pub location_recommendation: String,
    pub roadworthy: Roadworthiness,
    pub risk_flags: BTreeSet<String>,
    pub affected_parts: BTreeSet<String>,
    #[serde(default)]
    pub severity_breakdown: Option<SeverityBreakdown>,
}

impl DamageReport {
    /// Report with no findings, midpoint severity and the given rate.
    pub fn empty(exchange_rate: f64) -> Self {
        Self {
            component: String::new(),
            damage_narrative: String::new(),
            severity_score: 5,
            severity: SeverityLevel::Medium,
            repair_approach: String::new(),
            parts_to_replace: Vec::new(),
            parts_to_inspect: Vec::new(),
            cost_aed: AedCostEstimate::default(),
            cost_eur: EurCostEstimate {
                total_range: CostRange::default(),
                exchange_rate_used: exchange_rate,
            },
            estimated_repair_cost: 0.0,
            labor_hours_estimate: None,
            location_recommendation: String::new(),
            roadworthy: Roadworthiness::Unknown,
            risk_flags: BTreeSet::new(),
            affected_parts: BTreeSet::new(),
            severity_breakdown: None,
        }
    }
}
