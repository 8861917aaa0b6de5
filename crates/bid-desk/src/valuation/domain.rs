use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::damage::{DamageReport, SeverityLevel};

/// Opaque identifier assigned by the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Auction lot under evaluation. Bids are AED, market prices and costs EUR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub id: VehicleId,
    #[serde(default)]
    pub title: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub start_bid: Option<f64>,
    #[serde(default)]
    pub final_bid: Option<f64>,
    #[serde(default)]
    pub market_price_de: Option<f64>,
    /// Legacy name for `market_price_de`, still present on older records.
    #[serde(default)]
    pub expected_resale_de: Option<f64>,
    #[serde(default)]
    pub cost_inputs: CostInputs,
    #[serde(default)]
    pub reviews: Vec<MechanicReview>,
    #[serde(default)]
    pub ai_damage_report: Option<DamageReport>,
}

impl Vehicle {
    pub fn new(id: VehicleId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
            start_bid: None,
            final_bid: None,
            market_price_de: None,
            expected_resale_de: None,
            cost_inputs: CostInputs::default(),
            reviews: Vec::new(),
            ai_damage_report: None,
        }
    }

    /// Purchase price in AED: the final bid when set, otherwise the start bid.
    pub fn bid_price_aed(&self) -> f64 {
        first_positive(&[self.final_bid, self.start_bid])
    }

    /// Expected resale value in EUR, honoring the legacy field.
    pub fn market_price_eur(&self) -> f64 {
        first_positive(&[self.market_price_de, self.expected_resale_de])
    }

    pub fn ai_repair_estimate_eur(&self) -> Option<f64> {
        self.ai_damage_report
            .as_ref()
            .map(|report| report.estimated_repair_cost)
            .filter(|cost| cost.is_finite() && *cost > 0.0)
    }

    pub fn ai_severity(&self) -> Option<SeverityLevel> {
        self.ai_damage_report.as_ref().map(|report| report.severity)
    }
}

fn first_positive(candidates: &[Option<f64>]) -> f64 {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(0.0)
}

/// Per-vehicle cost overrides in EUR; unset entries use the settings defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    #[serde(default)]
    pub transport_cost: Option<f64>,
    #[serde(default)]
    pub tuv_cost: Option<f64>,
    #[serde(default)]
    pub misc_cost: Option<f64>,
    #[serde(default)]
    pub repair_buffer_pct: Option<f64>,
}

/// Cost inputs after applying settings defaults and clamping to non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResolvedCostInputs {
    pub transport_cost: f64,
    pub tuv_cost: f64,
    pub misc_cost: f64,
    pub repair_buffer_pct: f64,
}

impl CostInputs {
    pub(crate) fn resolve(&self, settings: &CalculationSettings) -> ResolvedCostInputs {
        ResolvedCostInputs {
            transport_cost: non_negative(self.transport_cost.unwrap_or(settings.transport_cost)),
            tuv_cost: non_negative(self.tuv_cost.unwrap_or(settings.tuv_cost)),
            misc_cost: non_negative(self.misc_cost.unwrap_or(settings.misc_cost)),
            repair_buffer_pct: non_negative(
                self.repair_buffer_pct.unwrap_or(settings.repair_buffer_pct),
            ),
        }
    }
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Business settings supplied on every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationSettings {
    pub target_profit_pct: f64,
    pub safety_deduction: f64,
    pub transport_cost: f64,
    pub tuv_cost: f64,
    pub misc_cost: f64,
    pub repair_buffer_pct: f64,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            target_profit_pct: 35.0,
            safety_deduction: 200.0,
            transport_cost: 2500.0,
            tuv_cost: 800.0,
            misc_cost: 500.0,
            repair_buffer_pct: 15.0,
        }
    }
}

/// Mechanic's vote on whether to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Green,
    Orange,
    Red,
}

impl Recommendation {
    pub const fn ordered() -> [Self; 3] {
        [Self::Green, Self::Orange, Self::Red]
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "green" | "gruen" | "grün" => Some(Self::Green),
            "orange" | "yellow" | "gelb" => Some(Self::Orange),
            "red" | "rot" => Some(Self::Red),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "niedrig" => Some(Self::Low),
            "medium" | "mittel" => Some(Self::Medium),
            "high" | "hoch" => Some(Self::High),
            _ => None,
        }
    }
}

/// One mechanic's assessment. Multiple reviews per mechanic are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicReview {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub mechanic_id: String,
    #[serde(default, deserialize_with = "lenient_recommendation")]
    pub recommendation: Option<Recommendation>,
    /// EUR.
    #[serde(default)]
    pub repair_estimate: f64,
    #[serde(default, deserialize_with = "lenient_risk")]
    pub risk: Option<RiskLevel>,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn lenient_recommendation<'de, D>(deserializer: D) -> Result<Option<Recommendation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Recommendation::parse))
}

fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(RiskLevel::parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn final_bid_wins_over_start_bid() {
        let mut vehicle = Vehicle::new(VehicleId("v-1".into()), "Patrol");
        vehicle.start_bid = Some(40_000.0);
        assert_eq!(vehicle.bid_price_aed(), 40_000.0);

        vehicle.final_bid = Some(45_500.0);
        assert_eq!(vehicle.bid_price_aed(), 45_500.0);

        vehicle.final_bid = Some(0.0);
        assert_eq!(vehicle.bid_price_aed(), 40_000.0);
    }

    #[test]
    fn legacy_resale_field_is_used_when_market_price_unset() {
        let vehicle: Vehicle = serde_json::from_value(json!({
            "expected_resale_de": 18_000.0
        }))
        .expect("vehicle parses");
        assert_eq!(vehicle.market_price_eur(), 18_000.0);

        let vehicle: Vehicle = serde_json::from_value(json!({
            "market_price_de": 21_000.0,
            "expected_resale_de": 18_000.0
        }))
        .expect("vehicle parses");
        assert_eq!(vehicle.market_price_eur(), 21_000.0);
    }

    #[test]
    fn unknown_recommendations_deserialize_as_none() {
        let review: MechanicReview = serde_json::from_value(json!({
            "mechanic_id": "m-7",
            "recommendation": "purple",
            "risk": "HIGH",
            "repair_estimate": 900.0
        }))
        .expect("review parses");
        assert_eq!(review.recommendation, None);
        assert_eq!(review.risk, Some(RiskLevel::High));
    }

    #[test]
    fn cost_inputs_fall_back_to_settings() {
        let inputs = CostInputs {
            transport_cost: Some(1800.0),
            tuv_cost: None,
            misc_cost: Some(-20.0),
            repair_buffer_pct: None,
        };
        let resolved = inputs.resolve(&CalculationSettings::default());
        assert_eq!(resolved.transport_cost, 1800.0);
        assert_eq!(resolved.tuv_cost, 800.0);
        assert_eq!(resolved.misc_cost, 0.0);
        assert_eq!(resolved.repair_buffer_pct, 15.0);
    }
}
