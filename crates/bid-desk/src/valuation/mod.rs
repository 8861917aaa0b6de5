//! Landed-cost calculation and the traffic-light purchase verdict.

pub mod ampel;
pub mod consensus;
pub mod costs;
pub mod currency;
pub mod domain;
pub mod export;

pub use ampel::{decide, AmpelColor, AmpelSignals, AmpelStatus};
pub use consensus::{aggregate_reviews, Consensus};
pub use costs::{calculate_costs, CostBreakdown, RepairEstimateSource};
pub use currency::{ExchangeRate, DEFAULT_AED_PER_EUR};
pub use domain::{
    CalculationSettings, CostInputs, MechanicReview, Recommendation, RiskLevel, Vehicle, VehicleId,
};

use serde::{Deserialize, Serialize};

/// Everything derived for one vehicle. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleEvaluation {
    pub vehicle_id: VehicleId,
    pub title: String,
    pub costs: CostBreakdown,
    pub consensus: Consensus,
    pub ampel: AmpelStatus,
}

pub fn evaluate_vehicle(
    vehicle: &Vehicle,
    settings: &CalculationSettings,
    rate: ExchangeRate,
) -> VehicleEvaluation {
    let costs = calculate_costs(vehicle, settings, rate);
    let consensus = aggregate_reviews(&vehicle.reviews);
    let ampel = decide(&AmpelSignals::new(&costs, &consensus, vehicle.ai_severity()));

    VehicleEvaluation {
        vehicle_id: vehicle.id.clone(),
        title: vehicle.title.clone(),
        costs,
        consensus,
        ampel,
    }
}
