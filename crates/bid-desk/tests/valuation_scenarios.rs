//! End-to-end pricing scenarios through the public valuation API: landed cost,
//! maximum bid, mechanic consensus and the traffic-light verdict.

use bid_desk::damage::{DamageReport, SeverityLevel};
use bid_desk::valuation::costs::round_down_to_step;
use bid_desk::valuation::{
    aggregate_reviews, evaluate_vehicle, AmpelColor, CalculationSettings, ExchangeRate,
    MechanicReview, Recommendation, RepairEstimateSource, Vehicle, VehicleId,
};
use chrono::Utc;

fn vehicle(start_bid: f64, market_price: f64) -> Vehicle {
    let mut vehicle = Vehicle::new(VehicleId("veh-scenario".to_string()), "Scenario lot");
    vehicle.start_bid = Some(start_bid);
    vehicle.market_price_de = Some(market_price);
    vehicle
}

fn review(recommendation: Recommendation, repair_estimate: f64) -> MechanicReview {
    MechanicReview {
        id: String::new(),
        mechanic_id: "m-1".to_string(),
        recommendation: Some(recommendation),
        repair_estimate,
        risk: None,
        comment: String::new(),
        created_at: Utc::now(),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn loss_making_lot_is_red_with_exact_costs() {
    let evaluation = evaluate_vehicle(
        &vehicle(50_000.0, 15_000.0),
        &CalculationSettings::default(),
        ExchangeRate::new(4.0),
    );
    let costs = &evaluation.costs;

    assert_close(costs.bid_price, 12_500.0);
    assert_close(costs.duty, 1_250.0);
    assert_close(costs.vat, 2_612.5);
    assert_close(costs.other_costs, 3_800.0);
    assert_close(costs.total_cost, 20_162.5);
    assert_close(costs.profit, -5_162.5);
    assert_eq!(costs.max_bid, 4_350.0);
    assert_eq!(costs.max_bid_aed, 17_400.0);
    assert_eq!(costs.repair_estimate_source, RepairEstimateSource::None);

    assert_eq!(evaluation.ampel.color, AmpelColor::Red);
    assert_eq!(evaluation.ampel.reason, "Negatives Ergebnis");
}

#[test]
fn max_bid_is_a_non_negative_step_below_the_raw_value() {
    assert_eq!(round_down_to_step(17_842.37), 17_800.0);
    for raw in [-250.0, 0.0, 49.99, 50.0, 1_234.5, 99_999.0] {
        let rounded = round_down_to_step(raw);
        assert!(rounded >= 0.0);
        assert!(rounded <= raw.max(0.0));
        assert_eq!(rounded % 50.0, 0.0);
    }
}

#[test]
fn loss_rule_outranks_heavy_damage_and_red_votes() {
    let mut lot = vehicle(56_000.0, 15_000.0);
    lot.reviews = vec![
        review(Recommendation::Red, 0.0),
        review(Recommendation::Red, 0.0),
        review(Recommendation::Red, 0.0),
    ];
    let mut report = DamageReport::empty(4.0);
    report.severity_score = 9;
    report.severity = SeverityLevel::High;
    lot.ai_damage_report = Some(report);

    let evaluation = evaluate_vehicle(&lot, &CalculationSettings::default(), ExchangeRate::default());
    assert!(evaluation.costs.profit < -500.0);
    assert_eq!(evaluation.ampel.rule, 1);
    assert_eq!(evaluation.ampel.reason, "Negatives Ergebnis");
}

#[test]
fn tied_votes_resolve_to_green() {
    let consensus = aggregate_reviews(&[
        review(Recommendation::Red, 0.0),
        review(Recommendation::Green, 0.0),
    ]);
    assert_eq!(consensus.green, 1);
    assert_eq!(consensus.red, 1);
    assert_eq!(consensus.dominant, Some(Recommendation::Green));
}

#[test]
fn ai_estimate_is_used_when_no_mechanic_priced_the_repair() {
    let mut lot = vehicle(16_000.0, 15_000.0);
    lot.reviews = vec![review(Recommendation::Green, 0.0)];
    let mut report = DamageReport::empty(4.0);
    report.estimated_repair_cost = 1_200.0;
    lot.ai_damage_report = Some(report);

    let evaluation = evaluate_vehicle(&lot, &CalculationSettings::default(), ExchangeRate::default());
    assert_eq!(evaluation.costs.repair_estimate_source, RepairEstimateSource::Ai);
    assert_close(evaluation.costs.repair_estimate_avg, 1_200.0);
    assert_close(evaluation.costs.repair_buffered, 1_380.0);
}

#[test]
fn profitable_lot_with_moderate_damage_is_green() {
    let mut lot = vehicle(16_000.0, 15_000.0);
    lot.reviews = vec![review(Recommendation::Green, 300.0)];
    let mut report = DamageReport::empty(4.0);
    report.severity = SeverityLevel::Medium;
    lot.ai_damage_report = Some(report);

    let evaluation = evaluate_vehicle(&lot, &CalculationSettings::default(), ExchangeRate::default());
    assert!(evaluation.costs.profit_pct > 35.0);
    assert_eq!(evaluation.ampel.color, AmpelColor::Green);
    assert_eq!(evaluation.ampel.rule, 7);
}

#[test]
fn settings_are_taken_per_call() {
    let lot = vehicle(16_000.0, 15_000.0);
    let strict = CalculationSettings {
        target_profit_pct: 60.0,
        ..CalculationSettings::default()
    };

    let relaxed = evaluate_vehicle(&lot, &CalculationSettings::default(), ExchangeRate::default());
    let demanding = evaluate_vehicle(&lot, &strict, ExchangeRate::default());

    assert_eq!(relaxed.ampel.color, AmpelColor::Green);
    assert_eq!(demanding.ampel.color, AmpelColor::Yellow);
    assert_eq!(demanding.ampel.reason, "Grenzwertiger Profit");
    assert!(demanding.costs.max_bid < relaxed.costs.max_bid);
}
