use serde::{Deserialize, Serialize};

use crate::valuation::{
    CalculationSettings, CostInputs, MechanicReview, Recommendation, RiskLevel, Vehicle, VehicleId,
};

/// Payload for registering a new auction lot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSubmission {
    pub title: String,
    #[serde(default)]
    pub start_bid: Option<f64>,
    #[serde(default)]
    pub final_bid: Option<f64>,
    #[serde(default, alias = "expected_resale_de")]
    pub market_price_de: Option<f64>,
    #[serde(default)]
    pub cost_inputs: CostInputs,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl VehicleSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.title.trim().is_empty() {
            return Err(SubmissionError::MissingTitle);
        }
        Ok(())
    }

    pub(crate) fn into_vehicle(self, id: VehicleId) -> Vehicle {
        let mut vehicle = Vehicle::new(id, self.title.trim());
        vehicle.start_bid = self.start_bid;
        vehicle.final_bid = self.final_bid;
        vehicle.market_price_de = self.market_price_de;
        vehicle.cost_inputs = self.cost_inputs;
        vehicle.updated_by = self.created_by.clone();
        vehicle.created_by = self.created_by;
        vehicle
    }
}

/// Payload for a mechanic's vote. Recommendation strings are read leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub mechanic_id: String,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub repair_estimate: f64,
    #[serde(default)]
    pub risk: Option<String>,
    #[serde(default)]
    pub comment: String,
}

impl ReviewSubmission {
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.mechanic_id.trim().is_empty() {
            return Err(SubmissionError::MissingMechanic);
        }
        if let Some(raw) = &self.recommendation {
            if Recommendation::parse(raw).is_none() {
                return Err(SubmissionError::UnknownRecommendation(raw.clone()));
            }
        }
        Ok(())
    }

    pub(crate) fn into_review(self, id: String) -> MechanicReview {
        MechanicReview {
            id,
            mechanic_id: self.mechanic_id.trim().to_string(),
            recommendation: self.recommendation.as_deref().and_then(Recommendation::parse),
            repair_estimate: self.repair_estimate,
            risk: self.risk.as_deref().and_then(RiskLevel::parse),
            comment: self.comment,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Raw describer text to attach to a stored vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageIngestRequest {
    pub raw_response: String,
}

/// Stateless normalization, optionally with a one-off rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeRequest {
    pub raw_response: String,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

/// Stateless evaluation of an unsaved vehicle. Omitted settings use the configured ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub vehicle: Vehicle,
    #[serde(default)]
    pub settings: Option<CalculationSettings>,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("vehicle title is required")]
    MissingTitle,
    #[error("mechanic_id is required")]
    MissingMechanic,
    #[error("unknown recommendation '{0}', expected green, orange or red")]
    UnknownRecommendation(String),
}
