use serde::{Deserialize, Serialize};

use super::currency::ExchangeRate;
use super::domain::{non_negative, CalculationSettings, Vehicle};

/// Import duty on the converted bid price.
pub const DUTY_RATE: f64 = 0.10;
/// VAT on bid price plus duty. Always part of `total_cost`.
pub const VAT_RATE: f64 = 0.19;
/// `1 + DUTY_RATE + VAT_RATE * (1 + DUTY_RATE)`: converts a pre-duty bid into its loaded cost.
pub const LOADED_COST_MULTIPLIER: f64 = 1.309;
/// Maximum bids are rounded down to this step.
pub const MAX_BID_STEP: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairEstimateSource {
    Mechanics,
    Ai,
    None,
}

/// Every intermediate value of a landed-cost calculation. EUR unless suffixed `_aed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub bid_price: f64,
    pub bid_price_aed: f64,
    pub market_price: f64,
    pub duty: f64,
    pub vat_base: f64,
    pub vat: f64,
    pub transport_cost: f64,
    pub tuv_cost: f64,
    pub misc_cost: f64,
    pub repair_estimate_avg: f64,
    pub repair_estimate_source: RepairEstimateSource,
    pub repair_estimate_count: usize,
    pub repair_buffer_pct: f64,
    pub repair_buffered: f64,
    pub other_costs: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub roi_pct: f64,
    pub profit_pct: f64,
    pub max_bid: f64,
    pub max_bid_aed: f64,
    pub target_profit: f64,
    pub target_profit_pct: f64,
    pub safety_deduction: f64,
    pub exchange_rate_used: f64,
}

/// Landed cost, profit and maximum bid for one vehicle.
pub fn calculate_costs(
    vehicle: &Vehicle,
    settings: &CalculationSettings,
    rate: ExchangeRate,
) -> CostBreakdown {
    let inputs = vehicle.cost_inputs.resolve(settings);
    let target_profit_pct = non_negative(settings.target_profit_pct);
    let safety_deduction = non_negative(settings.safety_deduction);

    let bid_price_aed = vehicle.bid_price_aed();
    let bid_price = rate.to_eur(bid_price_aed);
    let market_price = vehicle.market_price_eur();
    let target_profit = market_price * target_profit_pct / 100.0;

    let duty = bid_price * DUTY_RATE;
    let vat_base = bid_price + duty;
    let vat = vat_base * VAT_RATE;

    let (repair_estimate_avg, repair_estimate_source, repair_estimate_count) =
        repair_estimate(vehicle);
    let repair_buffered = repair_estimate_avg * (1.0 + inputs.repair_buffer_pct / 100.0);

    let other_costs = inputs.transport_cost + inputs.tuv_cost + inputs.misc_cost + repair_buffered;
    let total_cost = bid_price + duty + vat + other_costs;

    let profit = market_price - total_cost;
    let roi_pct = if total_cost != 0.0 {
        profit / total_cost * 100.0
    } else {
        0.0
    };
    let profit_pct = if market_price != 0.0 {
        profit / market_price * 100.0
    } else {
        0.0
    };

    let max_bid_raw =
        (market_price - target_profit - safety_deduction - other_costs) / LOADED_COST_MULTIPLIER;
    let max_bid = round_down_to_step(max_bid_raw);

    CostBreakdown {
        bid_price,
        bid_price_aed,
        market_price,
        duty,
        vat_base,
        vat,
        transport_cost: inputs.transport_cost,
        tuv_cost: inputs.tuv_cost,
        misc_cost: inputs.misc_cost,
        repair_estimate_avg,
        repair_estimate_source,
        repair_estimate_count,
        repair_buffer_pct: inputs.repair_buffer_pct,
        repair_buffered,
        other_costs,
        total_cost,
        profit,
        roi_pct,
        profit_pct,
        max_bid,
        max_bid_aed: rate.to_aed(max_bid),
        target_profit,
        target_profit_pct,
        safety_deduction,
        exchange_rate_used: rate.aed_per_eur(),
    }
}

/// Mean of positive mechanic estimates, else the AI estimate, else zero.
fn repair_estimate(vehicle: &Vehicle) -> (f64, RepairEstimateSource, usize) {
    let estimates: Vec<f64> = vehicle
        .reviews
        .iter()
        .map(|review| review.repair_estimate)
        .filter(|estimate| estimate.is_finite() && *estimate > 0.0)
        .collect();

    if !estimates.is_empty() {
        let average = estimates.iter().sum::<f64>() / estimates.len() as f64;
        return (average, RepairEstimateSource::Mechanics, estimates.len());
    }

    match vehicle.ai_repair_estimate_eur() {
        Some(estimate) => (estimate, RepairEstimateSource::Ai, 0),
        None => (0.0, RepairEstimateSource::None, 0),
    }
}

/// Floors to a multiple of [`MAX_BID_STEP`], never below zero.
pub fn round_down_to_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    (raw / MAX_BID_STEP).floor() * MAX_BID_STEP
}
