//! Describer output from raw text to a reconciled report, using a recorded
//! answer with the usual defects (prose preamble, fences, trailing commas,
//! raw newlines inside strings).

use bid_desk::damage::{
    analyze_response, normalize_response, repair_and_parse, BreakdownStatus, CostRange,
    DamageReportError, Roadworthiness, SeverityBands, SeverityLevel, SeverityReconciler,
};
use bid_desk::valuation::ExchangeRate;

const RECORDED: &str = include_str!("fixtures/describer_response.txt");

#[test]
fn recorded_answer_survives_every_repair_pass() {
    let report = normalize_response(RECORDED, ExchangeRate::new(4.0)).expect("recorded answer normalizes");

    assert_eq!(report.component, "Frontpartie");
    assert_eq!(
        report.damage_narrative,
        "Frontalaufprall mit eingedrückter Stoßstange.\nScheinwerfer links gebrochen, Kühler vermutlich beschädigt."
    );
    assert_eq!(report.severity_score, 7);
    assert_eq!(report.severity, SeverityLevel::High);
    assert_eq!(report.roadworthy, Roadworthiness::No);
    assert_eq!(report.location_recommendation, "Sharjah Industrial Area");

    assert_eq!(report.parts_to_replace.len(), 2);
    assert_eq!(report.parts_to_replace[1].part_name, "Scheinwerfer links");
    assert_eq!(report.parts_to_replace[1].confidence, 0.8);
    assert_eq!(report.parts_to_inspect[0].suspicion, "Leck");

    assert_eq!(
        report.cost_aed.total_range,
        CostRange { low: 4_200.0, mid: 5_600.0, high: 7_200.0 }
    );
    assert_eq!(report.cost_aed.parts, 4_000.0);
    assert_eq!(
        report.cost_eur.total_range,
        CostRange { low: 1_050.0, mid: 1_400.0, high: 1_800.0 }
    );
    assert_eq!(report.estimated_repair_cost, 1_400.0);

    let labor = report.labor_hours_estimate.as_ref().expect("labor estimate");
    assert_eq!(labor.hours_range, CostRange::flat(8.0));
    assert_eq!(report.affected_parts.len(), 3);
    assert!(report.risk_flags.contains("Airbag ausgelöst"));
    assert!(report.severity_breakdown.is_none());
}

#[test]
fn reconciliation_attaches_a_breakdown() {
    let report = analyze_response(RECORDED, ExchangeRate::new(4.0), &SeverityReconciler::default())
        .expect("recorded answer analyzes");
    let breakdown = report.severity_breakdown.expect("breakdown");

    assert_eq!(breakdown.status, BreakdownStatus::Scored);
    assert_eq!(breakdown.technical_severity, 7.0);
    assert_eq!(breakdown.economic_severity, 5.0);
    assert_eq!(breakdown.combined_severity, 7.0);
    assert_eq!(breakdown.level, Some(SeverityLevel::High));
    assert_eq!(breakdown.deviation, 0.0);
    assert_eq!(breakdown.ai_severity_score, 7);
}

#[test]
fn configured_bands_change_only_the_economic_score() {
    let tight: SeverityBands = "1000,2000,3000".parse().expect("bands parse");
    let report = analyze_response(RECORDED, ExchangeRate::new(4.0), &SeverityReconciler::new(tight))
        .expect("recorded answer analyzes");
    let breakdown = report.severity_breakdown.expect("breakdown");

    assert_eq!(breakdown.economic_severity, 10.0);
    assert_eq!(breakdown.technical_severity, 7.0);
    assert_eq!(breakdown.combined_severity, 10.0);
}

#[test]
fn legacy_scalar_estimate_keeps_its_mirror() {
    let raw = r#"{"kosten_schaetzung_aed": {"teile": 500, "arbeit": 300, "gesamt": 800}}"#;
    let report = normalize_response(raw, ExchangeRate::new(4.0)).expect("legacy format normalizes");

    assert_eq!(report.cost_aed.total_range, CostRange::flat(800.0));
    assert_eq!(report.cost_aed.total, 800.0);
    assert_eq!(report.cost_aed.parts, 500.0);
    assert_eq!(report.cost_aed.labor, 300.0);
}

#[test]
fn english_field_names_are_accepted() {
    let raw = r#"{
        "component": "Rear door",
        "severity_score": 3,
        "parts_to_replace": [{ "part_name": "Door skin", "confidence": 0.7 }],
        "cost_estimate_aed": { "total_range": { "low": 900, "mid": 1200, "high": 1600 } },
        "roadworthy": "YES"
    }"#;
    let report = normalize_response(raw, ExchangeRate::new(4.0)).expect("english fields normalize");

    assert_eq!(report.component, "Rear door");
    assert_eq!(report.severity, SeverityLevel::Low);
    assert_eq!(report.parts_to_replace[0].part_name, "Door skin");
    assert_eq!(report.estimated_repair_cost, 300.0);
    assert_eq!(report.roadworthy, Roadworthiness::Yes);
}

#[test]
fn failures_carry_a_specific_kind() {
    assert!(matches!(
        repair_and_parse(""),
        Err(DamageReportError::EmptyResponse)
    ));
    assert!(matches!(
        normalize_response("Die Bilder sind zu dunkel.", ExchangeRate::default()),
        Err(DamageReportError::NoJsonFound)
    ));
    assert!(matches!(
        normalize_response("{ \"bauteil\": \"Tür\" \"schweregrad\": 4 }", ExchangeRate::default()),
        Err(DamageReportError::UnparsableJson { .. })
    ));
}
