use serde::Serialize;
use std::io::Write;

use super::VehicleEvaluation;

#[derive(Debug, Serialize)]
struct EvaluationRow<'a> {
    vehicle_id: &'a str,
    title: &'a str,
    bid_price_aed: f64,
    bid_price_eur: f64,
    market_price_eur: f64,
    total_cost_eur: f64,
    profit_eur: f64,
    roi_pct: f64,
    max_bid_eur: f64,
    max_bid_aed: f64,
    reviews: usize,
    ampel: &'static str,
    label: &'a str,
    reason: &'a str,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Writes one CSV row per evaluation, with a header.
pub fn write_evaluations_csv<W: Write>(
    writer: W,
    evaluations: &[VehicleEvaluation],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for evaluation in evaluations {
        let costs = &evaluation.costs;
        csv_writer.serialize(EvaluationRow {
            vehicle_id: &evaluation.vehicle_id.0,
            title: &evaluation.title,
            bid_price_aed: round2(costs.bid_price_aed),
            bid_price_eur: round2(costs.bid_price),
            market_price_eur: round2(costs.market_price),
            total_cost_eur: round2(costs.total_cost),
            profit_eur: round2(costs.profit),
            roi_pct: round2(costs.roi_pct),
            max_bid_eur: costs.max_bid,
            max_bid_aed: round2(costs.max_bid_aed),
            reviews: evaluation.consensus.total,
            ampel: evaluation.ampel.color.label(),
            label: &evaluation.ampel.label,
            reason: &evaluation.ampel.reason,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
